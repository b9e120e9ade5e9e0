//! Carousel
//!
//! Cycles through `.carousel-item` slides. A slide runs in two steps: the
//! incoming item gets its order and direction classes, then once the
//! outgoing item's transition ends the classes settle and `slid` fires.
//! Only one slide can be in flight; `to` requests made meanwhile wait for
//! `slid`.

use std::cell::RefCell;
use std::rc::Rc;

use fos_dom::NodeId;

use crate::bridge::Plugin;
use crate::component::{
    bind, dispose_base, emit, get_element_from_selector, get_next_active_element, register, resolve_config, Component,
    Disposable,
};
use crate::config::{get_data_attribute, Config, TypeTable};
use crate::dispatch::Handler;
use crate::event::Event;
use crate::registry::ComponentKind;
use crate::timer::TimerId;
use crate::transition::{execute_after_transition, reflow};
use crate::value::Value;
use crate::{Runtime, WidgetError};

const ARROW_LEFT_KEY: &str = "ArrowLeft";
const ARROW_RIGHT_KEY: &str = "ArrowRight";

const CLASS_NAME_CAROUSEL: &str = "carousel";
const CLASS_NAME_ACTIVE: &str = "active";
const CLASS_NAME_SLIDE: &str = "slide";
const CLASS_NAME_END: &str = "carousel-item-end";
const CLASS_NAME_START: &str = "carousel-item-start";
const CLASS_NAME_NEXT: &str = "carousel-item-next";
const CLASS_NAME_PREV: &str = "carousel-item-prev";

const SELECTOR_ACTIVE: &str = ".active";
const SELECTOR_ITEM: &str = ".carousel-item";
const SELECTOR_ACTIVE_ITEM: &str = ".active.carousel-item";
const SELECTOR_INDICATORS: &str = ".carousel-indicators";
const SELECTOR_DATA_SLIDE: &str = "[data-bs-slide], [data-bs-slide-to]";
const SELECTOR_DATA_RIDE: &str = "[data-bs-ride=\"carousel\"]";

const EVENT_KEYDOWN: &str = "keydown.bs.carousel";
const EVENT_MOUSEENTER: &str = "mouseenter.bs.carousel";
const EVENT_MOUSELEAVE: &str = "mouseleave.bs.carousel";
const EVENT_CLICK_DATA_API: &str = "click.bs.carousel.data-api";
const EVENT_LOAD_DATA_API: &str = "load.bs.carousel.data-api";

const DEFAULT_TYPE: TypeTable = &[
    ("interval", "(number|boolean)"),
    ("keyboard", "boolean"),
    ("pause", "(string|boolean)"),
    ("ride", "(boolean|string)"),
    ("touch", "boolean"),
    ("wrap", "boolean"),
];

fn defaults() -> Config {
    Config::new()
        .with("interval", 5000u32)
        .with("keyboard", true)
        .with("pause", "hover")
        .with("ride", false)
        .with("touch", true)
        .with("wrap", true)
}

crate::plugin_commands! {
    pub enum CarouselCommand {
        Next => "next",
        Prev => "prev",
        NextWhenVisible => "nextWhenVisible",
        Pause => "pause",
        Cycle => "cycle",
        Dispose => "dispose",
    }
}

/// Position of the target slide relative to the active one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Next,
    Prev,
}

/// Visual direction the slides move in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

impl Order {
    fn direction(self) -> Direction {
        match self {
            Self::Next => Direction::Left,
            Self::Prev => Direction::Right,
        }
    }
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }

    fn order(self) -> Order {
        match self {
            Self::Left => Order::Next,
            Self::Right => Order::Prev,
        }
    }
}

#[derive(Debug)]
pub struct CarouselState {
    element: NodeId,
    config: Config,
    /// Configured interval; `interval` may be overridden per slide
    default_interval: Option<u64>,
    interval: Option<u64>,
    timer: Option<TimerId>,
    active_element: Option<NodeId>,
    is_sliding: bool,
    indicators: Option<NodeId>,
}

/// Carousel handle
#[derive(Debug, Clone)]
pub struct Carousel(Rc<RefCell<CarouselState>>);

impl Component for Carousel {
    const KIND: ComponentKind = ComponentKind::Carousel;
    type State = CarouselState;

    fn from_inner(inner: Rc<RefCell<CarouselState>>) -> Self {
        Self(inner)
    }

    fn inner(&self) -> &Rc<RefCell<CarouselState>> {
        &self.0
    }

    fn construct(rt: &mut Runtime, element: NodeId, config: Config) -> Result<Self, WidgetError> {
        let config = resolve_config(rt, Self::KIND, element, defaults(), DEFAULT_TYPE, config, |_, _| {})?;
        let interval = interval_ms(config.get("interval"));
        let ride_on_load = config.str("ride") == Some("carousel");
        let carousel = Self(Rc::new(RefCell::new(CarouselState {
            element,
            default_interval: interval,
            interval,
            timer: None,
            active_element: None,
            is_sliding: false,
            indicators: rt.document.query_selector(element, SELECTOR_INDICATORS),
            config,
        })));
        register(rt, element, &carousel);
        carousel.add_event_listeners(rt);
        if ride_on_load {
            carousel.cycle(rt);
        }
        Ok(carousel)
    }

    fn element(&self) -> NodeId {
        self.0.borrow().element
    }
}

/// Interval option in milliseconds; `false` disables cycling
fn interval_ms(value: Option<&Value>) -> Option<u64> {
    match value {
        Some(Value::Number(n)) if *n > 0.0 => Some(*n as u64),
        _ => None,
    }
}

impl Carousel {
    pub fn config(&self) -> Config {
        self.0.borrow().config.clone()
    }

    pub fn is_sliding(&self) -> bool {
        self.0.borrow().is_sliding
    }

    /// Whether the auto-advance timer is running
    pub fn is_cycling(&self) -> bool {
        self.0.borrow().timer.is_some()
    }

    /// Current auto-advance period
    pub fn interval(&self) -> Option<u64> {
        self.0.borrow().interval
    }

    pub fn items(&self, rt: &Runtime) -> Vec<NodeId> {
        rt.document.query_selector_all(self.element(), SELECTOR_ITEM)
    }

    pub fn active_item(&self, rt: &Runtime) -> Option<NodeId> {
        rt.document.query_selector(self.element(), SELECTOR_ACTIVE_ITEM)
    }

    pub fn active_index(&self, rt: &Runtime) -> Option<usize> {
        let active = self.active_item(rt)?;
        self.items(rt).iter().position(|&n| n == active)
    }

    pub fn next(&self, rt: &mut Runtime) {
        self.slide(rt, Order::Next, None);
    }

    /// `next`, unless the carousel is not visible
    pub fn next_when_visible(&self, rt: &mut Runtime) {
        if rt.document.is_visible(self.element()) {
            self.next(rt);
        }
    }

    pub fn prev(&self, rt: &mut Runtime) {
        self.slide(rt, Order::Prev, None);
    }

    /// Stop auto-advancing
    pub fn pause(&self, rt: &mut Runtime) {
        self.clear_interval(rt);
    }

    /// Start auto-advancing with the current slide's interval
    pub fn cycle(&self, rt: &mut Runtime) {
        self.clear_interval(rt);
        self.update_interval(rt);
        let Some(period) = self.interval() else {
            return;
        };
        let weak = self.downgrade();
        let id = rt.set_interval(period, move |rt| {
            if let Some(inner) = weak.upgrade() {
                Carousel(inner).next_when_visible(rt);
            }
        });
        self.0.borrow_mut().timer = Some(id);
    }

    /// Go to slide `index`; waits for a running slide to finish first
    pub fn to(&self, rt: &mut Runtime, index: usize) {
        let items = self.items(rt);
        let Some(&target) = items.get(index) else {
            return;
        };
        if self.is_sliding() {
            let element = self.element();
            rt.one(
                element,
                &Self::KIND.event_name("slid"),
                bind(self, move |carousel: &Carousel, rt, _| carousel.to(rt, index)),
            );
            return;
        }
        let active_index = self.active_index(rt);
        if active_index == Some(index) {
            return;
        }
        let order = active_index.map_or(Order::Next, |active| {
            if index > active { Order::Next } else { Order::Prev }
        });
        self.slide(rt, order, Some(target));
    }

    /// Resume cycling after user interaction when `ride` is set
    pub fn maybe_enable_cycle(&self, rt: &mut Runtime) {
        if !self.0.borrow().config.flag("ride") {
            return;
        }
        if self.is_sliding() {
            let element = self.element();
            rt.one(
                element,
                &Self::KIND.event_name("slid"),
                bind(self, |carousel: &Carousel, rt, _| carousel.cycle(rt)),
            );
            return;
        }
        self.cycle(rt);
    }

    fn clear_interval(&self, rt: &mut Runtime) {
        if let Some(id) = self.0.borrow_mut().timer.take() {
            rt.clear_timeout(id);
        }
    }

    fn update_interval(&self, rt: &Runtime) {
        let Some(item) = self.0.borrow().active_element.or_else(|| self.active_item(rt)) else {
            return;
        };
        let item_interval = rt
            .document
            .get_attribute(item, "data-bs-interval")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|&ms| ms > 0);
        let mut state = self.0.borrow_mut();
        state.interval = item_interval.or(state.default_interval);
    }

    fn set_active_indicator(&self, rt: &mut Runtime, index: usize) {
        let Some(indicators) = self.0.borrow().indicators else {
            return;
        };
        if let Some(active) = rt.document.query_selector(indicators, SELECTOR_ACTIVE) {
            rt.document.remove_class(active, &[CLASS_NAME_ACTIVE]);
            rt.document.remove_attribute(active, "aria-current");
        }
        let selector = format!("[data-bs-slide-to=\"{index}\"]");
        if let Some(indicator) = rt.document.query_selector(indicators, &selector) {
            rt.document.add_class(indicator, &[CLASS_NAME_ACTIVE]);
            rt.document.set_attribute(indicator, "aria-current", "true");
        }
    }

    fn slide(&self, rt: &mut Runtime, order: Order, target: Option<NodeId>) {
        if self.is_sliding() {
            return;
        }
        let element = self.element();
        let items = self.items(rt);
        let active = self.active_item(rt);
        let is_next = order == Order::Next;
        let wrap = self.0.borrow().config.flag("wrap");
        let next = target.or_else(|| get_next_active_element(&items, active, is_next, wrap));
        if next == active {
            return;
        }
        let index_of = |node: Option<NodeId>| -> Value {
            node.and_then(|n| items.iter().position(|&i| i == n))
                .map_or(Value::Number(-1.0), Value::from)
        };
        let slide_data = |next: Option<NodeId>| {
            [
                ("relatedTarget", Value::from(next)),
                ("direction", Value::from(order.direction().as_str())),
                ("from", index_of(active)),
                ("to", index_of(next)),
            ]
        };

        let prevented = emit(rt, element, Self::KIND, "slide", &slide_data(next)).is_none_or(|ev| ev.default_prevented());
        if prevented {
            return;
        }
        let Some(next) = next else {
            return;
        };
        let Some(active) = active else {
            // nothing to slide out; the target becomes active in place
            self.0.borrow_mut().active_element = Some(next);
            if let Some(index) = items.iter().position(|&i| i == next) {
                self.set_active_indicator(rt, index);
            }
            rt.document.add_class(next, &[CLASS_NAME_ACTIVE]);
            emit(rt, element, Self::KIND, "slid", &slide_data(Some(next)));
            return;
        };

        let was_cycling = self.is_cycling();
        self.pause(rt);
        {
            let mut state = self.0.borrow_mut();
            state.is_sliding = true;
            state.active_element = Some(next);
        }
        if let Some(index) = items.iter().position(|&i| i == next) {
            self.set_active_indicator(rt, index);
        }
        tracing::debug!("carousel {element} sliding {} to {next}", order.direction().as_str());

        let directional = if is_next { CLASS_NAME_START } else { CLASS_NAME_END };
        let order_class = if is_next { CLASS_NAME_NEXT } else { CLASS_NAME_PREV };
        rt.document.add_class(next, &[order_class]);
        reflow(&rt.document, next);
        rt.document.add_class(active, &[directional]);
        rt.document.add_class(next, &[directional]);

        let data = slide_data(Some(next));
        let this = self.clone();
        let animated = rt.document.has_class(element, CLASS_NAME_SLIDE);
        execute_after_transition(rt, active, animated, move |rt| {
            rt.document.remove_class(next, &[directional, order_class]);
            rt.document.add_class(next, &[CLASS_NAME_ACTIVE]);
            rt.document
                .remove_class(active, &[CLASS_NAME_ACTIVE, order_class, directional]);
            this.0.borrow_mut().is_sliding = false;
            emit(rt, element, Self::KIND, "slid", &data);
        });

        if was_cycling {
            self.cycle(rt);
        }
    }

    fn keydown(&self, rt: &mut Runtime, event: &mut Event) {
        if matches!(rt.document.tag_name(event.target()), "input" | "textarea") {
            return;
        }
        let direction = match event.key() {
            Some(ARROW_LEFT_KEY) => Direction::Right,
            Some(ARROW_RIGHT_KEY) => Direction::Left,
            _ => return,
        };
        event.prevent_default();
        self.slide(rt, direction.order(), None);
    }

    fn add_event_listeners(&self, rt: &mut Runtime) {
        let element = self.element();
        let (keyboard, pause_on_hover) = {
            let state = self.0.borrow();
            (state.config.flag("keyboard"), state.config.str("pause") == Some("hover"))
        };
        if keyboard {
            rt.on(element, EVENT_KEYDOWN, bind(self, |carousel: &Carousel, rt, ev| carousel.keydown(rt, ev)));
        }
        if pause_on_hover {
            rt.on(element, EVENT_MOUSEENTER, bind(self, |carousel: &Carousel, rt, _| carousel.pause(rt)));
            rt.on(
                element,
                EVENT_MOUSELEAVE,
                bind(self, |carousel: &Carousel, rt, _| carousel.maybe_enable_cycle(rt)),
            );
        }
    }
}

impl Disposable for Carousel {
    fn dispose(&self, rt: &mut Runtime) {
        self.clear_interval(rt);
        dispose_base(rt, self.element(), Self::KIND);
    }
}

impl Plugin for Carousel {
    type Command = CarouselCommand;

    fn execute(&self, rt: &mut Runtime, command: CarouselCommand) {
        match command {
            CarouselCommand::Next => self.next(rt),
            CarouselCommand::Prev => self.prev(rt),
            CarouselCommand::NextWhenVisible => self.next_when_visible(rt),
            CarouselCommand::Pause => self.pause(rt),
            CarouselCommand::Cycle => self.cycle(rt),
            CarouselCommand::Dispose => self.dispose(rt),
        }
    }
}

pub fn install_data_api(rt: &mut Runtime) {
    rt.on_delegated(
        NodeId::ROOT,
        EVENT_CLICK_DATA_API,
        SELECTOR_DATA_SLIDE,
        Handler::new(|rt, ev| {
            let trigger = ev.delegate_target();
            let Some(target) = get_element_from_selector(rt, trigger) else {
                return;
            };
            if !rt.document.has_class(target, CLASS_NAME_CAROUSEL) {
                return;
            }
            ev.prevent_default();
            let carousel = match Carousel::get_or_create_instance(rt, target, Config::new()) {
                Ok(carousel) => carousel,
                Err(err) => {
                    tracing::warn!("carousel {target}: {err}");
                    return;
                }
            };

            let slide_to = rt
                .document
                .get_attribute(trigger, "data-bs-slide-to")
                .and_then(|v| v.trim().parse::<usize>().ok());
            if let Some(index) = slide_to {
                carousel.to(rt, index);
            } else if get_data_attribute(&rt.document, trigger, "slide") == Some(Value::from("next")) {
                carousel.next(rt);
            } else {
                carousel.prev(rt);
            }
            carousel.maybe_enable_cycle(rt);
        }),
    );
    rt.on(
        NodeId::ROOT,
        EVENT_LOAD_DATA_API,
        Handler::new(|rt, _| {
            for element in rt.document.query_selector_all(NodeId::ROOT, SELECTOR_DATA_RIDE) {
                if let Err(err) = Carousel::get_or_create_instance(rt, element, Config::new()) {
                    tracing::warn!("carousel {element}: {err}");
                }
            }
        }),
    );
}
