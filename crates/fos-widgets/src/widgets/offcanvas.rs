//! Offcanvas
//!
//! Side panel that slides in over the page. Scrolling is locked while it is
//! open unless `scroll` is set.

use std::cell::RefCell;
use std::rc::Rc;

use fos_dom::NodeId;

use crate::backdrop::{Backdrop, BackdropConfig};
use crate::bridge::Plugin;
use crate::component::{
    bind, dispose_base, emit, emit_allowed, enable_dismiss_trigger, get_element_from_selector, is_link, register,
    resolve_config, Component, Disposable, Showable, TransitionState,
};
use crate::config::{Config, TypeTable};
use crate::dispatch::Handler;
use crate::focustrap::FocusTrap;
use crate::registry::ComponentKind;
use crate::scrollbar::ScrollBarHelper;
use crate::transition::execute_after_transition;
use crate::value::Value;
use crate::{Runtime, WidgetError};

const ESCAPE_KEY: &str = "Escape";

const CLASS_NAME_SHOW: &str = "show";
const CLASS_NAME_SHOWING: &str = "showing";
const CLASS_NAME_HIDING: &str = "hiding";
const CLASS_NAME_BACKDROP: &str = "offcanvas-backdrop";
const OPEN_SELECTOR: &str = ".offcanvas.show";
const SELECTOR_DATA_TOGGLE: &str = "[data-bs-toggle=\"offcanvas\"]";
const SELECTOR_RESPONSIVE_OPEN: &str = "[aria-modal][class*=show][class*=offcanvas-]";

const EVENT_KEYDOWN_DISMISS: &str = "keydown.dismiss.bs.offcanvas";
const EVENT_CLICK_DATA_API: &str = "click.bs.offcanvas.data-api";
const EVENT_LOAD_DATA_API: &str = "load.bs.offcanvas.data-api";
const EVENT_RESIZE: &str = "resize.bs.offcanvas";

const DEFAULT_TYPE: TypeTable = &[
    ("backdrop", "(boolean|string)"),
    ("keyboard", "boolean"),
    ("scroll", "boolean"),
];

fn defaults() -> Config {
    Config::new()
        .with("backdrop", true)
        .with("keyboard", true)
        .with("scroll", false)
}

crate::plugin_commands! {
    pub enum OffcanvasCommand {
        Show => "show",
        Hide => "hide",
        Toggle => "toggle",
        Dispose => "dispose",
    }
}

#[derive(Debug)]
pub struct OffcanvasState {
    element: NodeId,
    config: Config,
    backdrop: Backdrop,
    focustrap: FocusTrap,
    state: TransitionState,
}

/// Offcanvas handle
#[derive(Debug, Clone)]
pub struct Offcanvas(Rc<RefCell<OffcanvasState>>);

impl Component for Offcanvas {
    const KIND: ComponentKind = ComponentKind::Offcanvas;
    type State = OffcanvasState;

    fn from_inner(inner: Rc<RefCell<OffcanvasState>>) -> Self {
        Self(inner)
    }

    fn inner(&self) -> &Rc<RefCell<OffcanvasState>> {
        &self.0
    }

    fn construct(rt: &mut Runtime, element: NodeId, config: Config) -> Result<Self, WidgetError> {
        let config = resolve_config(rt, Self::KIND, element, defaults(), DEFAULT_TYPE, config, |_, _| {})?;
        let offcanvas = Self(Rc::new(RefCell::new(OffcanvasState {
            element,
            backdrop: Backdrop::new(BackdropConfig::default()),
            focustrap: FocusTrap::new(element, true),
            config,
            state: TransitionState::Hidden,
        })));
        let backdrop = offcanvas.initialize_backdrop(rt);
        offcanvas.0.borrow_mut().backdrop = backdrop;
        register(rt, element, &offcanvas);
        offcanvas.add_event_listeners(rt);
        Ok(offcanvas)
    }

    fn element(&self) -> NodeId {
        self.0.borrow().element
    }
}

impl Offcanvas {
    pub fn config(&self) -> Config {
        self.0.borrow().config.clone()
    }

    pub fn backdrop(&self) -> Backdrop {
        self.0.borrow().backdrop.clone()
    }

    pub fn focus_trap(&self) -> FocusTrap {
        self.0.borrow().focustrap.clone()
    }

    fn allows_scroll(&self) -> bool {
        self.0.borrow().config.flag("scroll")
    }

    fn set_state(&self, state: TransitionState) {
        self.0.borrow_mut().state = state;
    }

    fn initialize_backdrop(&self, rt: &Runtime) -> Backdrop {
        let (element, backdrop) = {
            let state = self.0.borrow();
            (state.element, state.config.get("backdrop").cloned())
        };
        let is_visible = backdrop.as_ref().is_some_and(Value::is_truthy);
        let is_static = matches!(&backdrop, Some(Value::String(s)) if s == "static");
        let weak = self.downgrade();
        let click_callback: Rc<dyn Fn(&mut Runtime)> = Rc::new(move |rt| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let offcanvas = Offcanvas(inner);
            if is_static {
                emit(rt, offcanvas.element(), Self::KIND, "hidePrevented", &[]);
                return;
            }
            offcanvas.hide(rt);
        });
        Backdrop::new(BackdropConfig {
            class_name: CLASS_NAME_BACKDROP.to_string(),
            click_callback: is_visible.then_some(click_callback),
            is_animated: true,
            is_visible,
            root_element: rt.document.parent(element),
        })
    }

    /// Show, recording `related_target` on the events
    pub fn show_for(&self, rt: &mut Runtime, related_target: Option<NodeId>) {
        if !self.state().can_show() {
            return;
        }
        let element = self.element();
        let related = [("relatedTarget", Value::from(related_target))];
        if !emit_allowed(rt, element, Self::KIND, "show", &related) {
            return;
        }
        self.set_state(TransitionState::Showing);
        tracing::debug!("offcanvas {element} showing");

        self.backdrop().show(rt, |_| {});
        let scroll = self.allows_scroll();
        if !scroll {
            ScrollBarHelper::new().hide(&mut rt.document);
        }
        rt.document.set_attribute(element, "aria-modal", "true");
        rt.document.set_attribute(element, "role", "dialog");
        rt.document.add_class(element, &[CLASS_NAME_SHOWING]);

        let this = self.clone();
        let trap = !scroll || self.backdrop().is_visible();
        execute_after_transition(rt, element, true, move |rt| {
            if trap {
                this.focus_trap().activate(rt);
            }
            rt.document.add_class(element, &[CLASS_NAME_SHOW]);
            rt.document.remove_class(element, &[CLASS_NAME_SHOWING]);
            this.set_state(TransitionState::Shown);
            let related = [("relatedTarget", Value::from(related_target))];
            emit(rt, element, Self::KIND, "shown", &related);
        });
    }

    pub fn toggle_for(&self, rt: &mut Runtime, related_target: Option<NodeId>) {
        if self.is_shown() {
            self.hide(rt);
        } else {
            self.show_for(rt, related_target);
        }
    }

    fn add_event_listeners(&self, rt: &mut Runtime) {
        rt.on(
            self.element(),
            EVENT_KEYDOWN_DISMISS,
            bind(self, |offcanvas: &Offcanvas, rt, ev| {
                if ev.key() != Some(ESCAPE_KEY) {
                    return;
                }
                if offcanvas.0.borrow().config.flag("keyboard") {
                    offcanvas.hide(rt);
                    return;
                }
                emit(rt, offcanvas.element(), Self::KIND, "hidePrevented", &[]);
            }),
        );
    }
}

impl Showable for Offcanvas {
    fn show(&self, rt: &mut Runtime) {
        self.show_for(rt, None);
    }

    fn hide(&self, rt: &mut Runtime) {
        if !self.state().can_hide() {
            return;
        }
        let element = self.element();
        if !emit_allowed(rt, element, Self::KIND, "hide", &[]) {
            return;
        }
        self.set_state(TransitionState::Hiding);
        tracing::debug!("offcanvas {element} hiding");
        self.focus_trap().deactivate(rt);
        if rt.document.active_element() == Some(element) {
            rt.blur();
        }
        rt.document.add_class(element, &[CLASS_NAME_HIDING]);
        self.backdrop().hide(rt, |_| {});

        let this = self.clone();
        let scroll = self.allows_scroll();
        execute_after_transition(rt, element, true, move |rt| {
            rt.document.remove_class(element, &[CLASS_NAME_SHOW, CLASS_NAME_HIDING]);
            rt.document.remove_attribute(element, "aria-modal");
            rt.document.remove_attribute(element, "role");
            if !scroll {
                ScrollBarHelper::new().reset(&mut rt.document);
            }
            this.set_state(TransitionState::Hidden);
            emit(rt, element, Self::KIND, "hidden", &[]);
        });
    }

    fn state(&self) -> TransitionState {
        self.0.borrow().state
    }
}

impl Disposable for Offcanvas {
    fn dispose(&self, rt: &mut Runtime) {
        self.backdrop().dispose(rt);
        self.focus_trap().deactivate(rt);
        dispose_base(rt, self.element(), Self::KIND);
    }
}

impl Plugin for Offcanvas {
    type Command = OffcanvasCommand;

    fn execute(&self, rt: &mut Runtime, command: OffcanvasCommand) {
        match command {
            OffcanvasCommand::Show => self.show(rt),
            OffcanvasCommand::Hide => self.hide(rt),
            OffcanvasCommand::Toggle => self.toggle(rt),
            OffcanvasCommand::Dispose => self.dispose(rt),
        }
    }
}

fn get_or_create(rt: &mut Runtime, element: NodeId) -> Option<Offcanvas> {
    Offcanvas::get_or_create_instance(rt, element, Config::new())
        .inspect_err(|err| tracing::warn!("offcanvas {element}: {err}"))
        .ok()
}

pub fn install_data_api(rt: &mut Runtime) {
    rt.on_delegated(
        NodeId::ROOT,
        EVENT_CLICK_DATA_API,
        SELECTOR_DATA_TOGGLE,
        Handler::new(|rt, ev| {
            let trigger = ev.delegate_target();
            if is_link(rt, trigger) {
                ev.prevent_default();
            }
            if rt.document.is_disabled(trigger) {
                return;
            }
            let Some(target) = get_element_from_selector(rt, trigger) else {
                return;
            };
            rt.one(
                target,
                &Offcanvas::KIND.event_name("hidden"),
                Handler::new(move |rt, _| {
                    if rt.document.is_visible(trigger) {
                        rt.focus(trigger);
                    }
                }),
            );

            let already_open = rt.document.query_selector(NodeId::ROOT, OPEN_SELECTOR);
            if let Some(open) = already_open.filter(|&open| open != target) {
                if let Some(open) = Offcanvas::get_instance(rt, open) {
                    open.hide(rt);
                }
            }
            if let Some(offcanvas) = get_or_create(rt, target) {
                offcanvas.toggle_for(rt, Some(trigger));
            }
        }),
    );

    rt.on(
        NodeId::ROOT,
        EVENT_LOAD_DATA_API,
        Handler::new(|rt, _| {
            for element in rt.document.query_selector_all(NodeId::ROOT, OPEN_SELECTOR) {
                if let Some(offcanvas) = get_or_create(rt, element) {
                    offcanvas.show(rt);
                }
            }
        }),
    );

    // responsive panels that stop being fixed close themselves
    rt.on(
        NodeId::ROOT,
        EVENT_RESIZE,
        Handler::new(|rt, _| {
            for element in rt.document.query_selector_all(NodeId::ROOT, SELECTOR_RESPONSIVE_OPEN) {
                if rt.document.computed_style(element, "position") == "fixed" {
                    continue;
                }
                if let Some(offcanvas) = get_or_create(rt, element) {
                    offcanvas.hide(rt);
                }
            }
        }),
    );

    enable_dismiss_trigger::<Offcanvas>(rt, Offcanvas::hide);
}
