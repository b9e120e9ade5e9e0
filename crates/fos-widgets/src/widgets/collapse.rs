//! Collapse
//!
//! Expands and collapses a region by animating its height (or width with
//! `collapse-horizontal`). Inside an accordion `parent`, opening one panel
//! closes its open siblings.

use std::cell::RefCell;
use std::rc::Rc;

use fos_dom::NodeId;

use crate::bridge::Plugin;
use crate::component::{
    dispose_base, emit, emit_allowed, get_element, get_element_from_selector, get_multiple_elements_from_selector,
    get_selector_from_element, is_link, register, resolve_config, Component, Disposable, Showable, TransitionState,
};
use crate::config::{Config, TypeTable};
use crate::dispatch::Handler;
use crate::registry::ComponentKind;
use crate::transition::{execute_after_transition, reflow};
use crate::value::Value;
use crate::{Runtime, WidgetError};

const CLASS_NAME_SHOW: &str = "show";
const CLASS_NAME_COLLAPSE: &str = "collapse";
const CLASS_NAME_COLLAPSING: &str = "collapsing";
const CLASS_NAME_COLLAPSED: &str = "collapsed";
const CLASS_NAME_HORIZONTAL: &str = "collapse-horizontal";
const SELECTOR_DEEPER_CHILDREN: &str = ":scope .collapse .collapse";
const SELECTOR_ACTIVES: &str = ".collapse.show, .collapse.collapsing";
const SELECTOR_DATA_TOGGLE: &str = "[data-bs-toggle=\"collapse\"]";
const EVENT_CLICK_DATA_API: &str = "click.bs.collapse.data-api";

const DEFAULT_TYPE: TypeTable = &[("parent", "(null|element)"), ("toggle", "boolean")];

fn defaults() -> Config {
    Config::new().with("parent", Value::Null).with("toggle", true)
}

crate::plugin_commands! {
    pub enum CollapseCommand {
        Show => "show",
        Hide => "hide",
        Toggle => "toggle",
        Dispose => "dispose",
    }
}

/// Animated dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Height,
    Width,
}

impl Dimension {
    fn property(self) -> &'static str {
        match self {
            Self::Height => "height",
            Self::Width => "width",
        }
    }
}

#[derive(Debug)]
pub struct CollapseState {
    element: NodeId,
    config: Config,
    parent: Option<NodeId>,
    state: TransitionState,
    triggers: Vec<NodeId>,
}

/// Collapse handle
#[derive(Debug, Clone)]
pub struct Collapse(Rc<RefCell<CollapseState>>);

impl Component for Collapse {
    const KIND: ComponentKind = ComponentKind::Collapse;
    type State = CollapseState;

    fn from_inner(inner: Rc<RefCell<CollapseState>>) -> Self {
        Self(inner)
    }

    fn inner(&self) -> &Rc<RefCell<CollapseState>> {
        &self.0
    }

    fn construct(rt: &mut Runtime, element: NodeId, config: Config) -> Result<Self, WidgetError> {
        let config = resolve_config(rt, Self::KIND, element, defaults(), DEFAULT_TYPE, config, |rt, config| {
            let toggle = config.flag("toggle");
            config.set("toggle", toggle);
            let parent = get_element(rt, config.get("parent"));
            config.set("parent", parent);
        })?;

        let triggers = rt
            .document
            .query_selector_all(NodeId::ROOT, SELECTOR_DATA_TOGGLE)
            .into_iter()
            .filter(|&trigger| {
                get_selector_from_element(rt, trigger).is_some_and(|selector| {
                    rt.document
                        .query_selector_all(NodeId::ROOT, &selector)
                        .contains(&element)
                })
            })
            .collect();

        let state = if rt.document.has_class(element, CLASS_NAME_SHOW) {
            TransitionState::Shown
        } else {
            TransitionState::Hidden
        };
        let parent = config.element("parent");
        let toggle = config.flag("toggle");
        let collapse = Self(Rc::new(RefCell::new(CollapseState {
            element,
            config,
            parent,
            state,
            triggers,
        })));
        register(rt, element, &collapse);

        collapse.initialize_children(rt);
        if parent.is_none() {
            let triggers = collapse.0.borrow().triggers.clone();
            set_trigger_state(rt, &triggers, state.is_shown());
        }
        if toggle {
            collapse.toggle(rt);
        }
        Ok(collapse)
    }

    fn element(&self) -> NodeId {
        self.0.borrow().element
    }
}

impl Collapse {
    pub fn config(&self) -> Config {
        self.0.borrow().config.clone()
    }

    /// Trigger elements that point at this panel
    pub fn triggers(&self) -> Vec<NodeId> {
        self.0.borrow().triggers.clone()
    }

    pub fn is_transitioning(&self) -> bool {
        self.0.borrow().state.is_transitioning()
    }

    pub fn dimension(&self, rt: &Runtime) -> Dimension {
        if rt.document.has_class(self.element(), CLASS_NAME_HORIZONTAL) {
            Dimension::Width
        } else {
            Dimension::Height
        }
    }

    fn set_state(&self, state: TransitionState) {
        self.0.borrow_mut().state = state;
    }

    /// Sibling panels inside the accordion parent, nested accordions excluded
    fn first_level_children(&self, rt: &Runtime, selector: &str) -> Vec<NodeId> {
        let Some(parent) = self.0.borrow().parent else {
            return Vec::new();
        };
        let deeper = rt.document.query_selector_all(parent, SELECTOR_DEEPER_CHILDREN);
        rt.document
            .query_selector_all(parent, selector)
            .into_iter()
            .filter(|el| !deeper.contains(el))
            .collect()
    }

    fn initialize_children(&self, rt: &mut Runtime) {
        if self.0.borrow().parent.is_none() {
            return;
        }
        for trigger in self.first_level_children(rt, SELECTOR_DATA_TOGGLE) {
            if let Some(selected) = get_element_from_selector(rt, trigger) {
                let open = rt.document.has_class(selected, CLASS_NAME_SHOW);
                set_trigger_state(rt, &[trigger], open);
            }
        }
    }
}

fn set_trigger_state(rt: &mut Runtime, triggers: &[NodeId], open: bool) {
    for &trigger in triggers {
        rt.document.toggle_class(trigger, CLASS_NAME_COLLAPSED, Some(!open));
        rt.document
            .set_attribute(trigger, "aria-expanded", if open { "true" } else { "false" });
    }
}

impl Showable for Collapse {
    fn show(&self, rt: &mut Runtime) {
        if !self.state().can_show() {
            return;
        }
        let element = self.element();
        let active_children: Vec<Collapse> = self
            .first_level_children(rt, SELECTOR_ACTIVES)
            .into_iter()
            .filter(|&el| el != element)
            .filter_map(|el| {
                Collapse::get_or_create_instance(rt, el, Config::new().with("toggle", false))
                    .inspect_err(|err| tracing::warn!("accordion sibling {el}: {err}"))
                    .ok()
            })
            .collect();
        if active_children.first().is_some_and(Collapse::is_transitioning) {
            return;
        }
        if !emit_allowed(rt, element, Self::KIND, "show", &[]) {
            return;
        }
        for sibling in &active_children {
            sibling.hide(rt);
        }

        let dimension = self.dimension(rt).property();
        rt.document.remove_class(element, &[CLASS_NAME_COLLAPSE]);
        rt.document.add_class(element, &[CLASS_NAME_COLLAPSING]);
        rt.document.set_style(element, dimension, "0px");
        let triggers = self.triggers();
        set_trigger_state(rt, &triggers, true);
        self.set_state(TransitionState::Showing);
        tracing::debug!("collapse {element} showing");

        let this = self.clone();
        execute_after_transition(rt, element, true, move |rt| {
            this.set_state(TransitionState::Shown);
            rt.document.remove_class(element, &[CLASS_NAME_COLLAPSING]);
            rt.document.add_class(element, &[CLASS_NAME_COLLAPSE, CLASS_NAME_SHOW]);
            rt.document.remove_style(element, dimension);
            emit(rt, element, Self::KIND, "shown", &[]);
        });
        let metrics = rt.document.metrics(element);
        let scroll_size = match self.dimension(rt) {
            Dimension::Height => metrics.scroll_height,
            Dimension::Width => metrics.scroll_width,
        };
        rt.document.set_style(element, dimension, &format!("{scroll_size}px"));
    }

    fn hide(&self, rt: &mut Runtime) {
        if !self.state().can_hide() {
            return;
        }
        let element = self.element();
        if !emit_allowed(rt, element, Self::KIND, "hide", &[]) {
            return;
        }

        let dimension = self.dimension(rt);
        let metrics = rt.document.metrics(element);
        let size = match dimension {
            Dimension::Height => metrics.offset_height,
            Dimension::Width => metrics.offset_width,
        };
        let property = dimension.property();
        rt.document.set_style(element, property, &format!("{size}px"));
        reflow(&rt.document, element);
        rt.document.add_class(element, &[CLASS_NAME_COLLAPSING]);
        rt.document.remove_class(element, &[CLASS_NAME_COLLAPSE, CLASS_NAME_SHOW]);

        for trigger in self.triggers() {
            let target = get_element_from_selector(rt, trigger);
            if target.is_some_and(|t| !rt.document.has_class(t, CLASS_NAME_SHOW)) {
                set_trigger_state(rt, &[trigger], false);
            }
        }
        self.set_state(TransitionState::Hiding);
        tracing::debug!("collapse {element} hiding");

        rt.document.remove_style(element, property);
        let this = self.clone();
        execute_after_transition(rt, element, true, move |rt| {
            this.set_state(TransitionState::Hidden);
            rt.document.remove_class(element, &[CLASS_NAME_COLLAPSING]);
            rt.document.add_class(element, &[CLASS_NAME_COLLAPSE]);
            emit(rt, element, Self::KIND, "hidden", &[]);
        });
    }

    fn state(&self) -> TransitionState {
        self.0.borrow().state
    }
}

impl Disposable for Collapse {
    fn dispose(&self, rt: &mut Runtime) {
        dispose_base(rt, self.element(), Self::KIND);
    }
}

impl Plugin for Collapse {
    type Command = CollapseCommand;

    fn command_config(command: CollapseCommand) -> Config {
        match command {
            CollapseCommand::Show | CollapseCommand::Hide => Config::new().with("toggle", false),
            _ => Config::new(),
        }
    }

    fn execute(&self, rt: &mut Runtime, command: CollapseCommand) {
        match command {
            CollapseCommand::Show => self.show(rt),
            CollapseCommand::Hide => self.hide(rt),
            CollapseCommand::Toggle => self.toggle(rt),
            CollapseCommand::Dispose => self.dispose(rt),
        }
    }
}

/// Triggers toggle every panel their target selector matches
pub fn install_data_api(rt: &mut Runtime) {
    rt.on_delegated(
        NodeId::ROOT,
        EVENT_CLICK_DATA_API,
        SELECTOR_DATA_TOGGLE,
        Handler::new(|rt, ev| {
            if is_link(rt, ev.target()) || is_link(rt, ev.delegate_target()) {
                ev.prevent_default();
            }
            for element in get_multiple_elements_from_selector(rt, ev.delegate_target()) {
                match Collapse::get_or_create_instance(rt, element, Config::new().with("toggle", false)) {
                    Ok(collapse) => collapse.toggle(rt),
                    Err(err) => tracing::warn!("collapse toggle on {element} failed: {err}"),
                }
            }
        }),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use fos_dom::ElementMetrics;

    fn panel(rt: &mut Runtime, parent: NodeId, id: &str, open: bool) -> (NodeId, NodeId) {
        let trigger = rt.document.create_element("button");
        rt.document.set_attribute(trigger, "data-bs-toggle", "collapse");
        rt.document.set_attribute(trigger, "data-bs-target", &format!("#{id}"));
        let el = rt.document.create_element("div");
        rt.document.set_attribute(el, "id", id);
        rt.document.set_attribute(el, "class", if open { "collapse show" } else { "collapse" });
        rt.document.set_metrics(
            el,
            ElementMetrics {
                scroll_height: 120.0,
                offset_height: 120.0,
                ..Default::default()
            },
        );
        rt.document.append_child(parent, trigger);
        rt.document.append_child(parent, el);
        (trigger, el)
    }

    #[test]
    fn test_show_sets_scroll_height_then_settles() {
        let mut rt = Runtime::new();
        let body = rt.document.body();
        let (trigger, el) = panel(&mut rt, body, "one", false);
        rt.document.set_computed(el, "transition-duration", "0.35s");

        let collapse = Collapse::get_or_create_instance(&mut rt, el, Config::new().with("toggle", false)).unwrap();
        assert_eq!(rt.document.get_attribute(trigger, "aria-expanded").as_deref(), Some("false"));
        assert!(rt.document.has_class(trigger, "collapsed"));

        collapse.show(&mut rt);
        assert_eq!(collapse.state(), TransitionState::Showing);
        assert!(rt.document.has_class(el, "collapsing"));
        assert!(!rt.document.has_class(el, "collapse"));
        assert_eq!(rt.document.computed_style(el, "height"), "120px");
        assert_eq!(rt.document.get_attribute(trigger, "aria-expanded").as_deref(), Some("true"));

        rt.advance(355);
        assert_eq!(collapse.state(), TransitionState::Shown);
        assert!(rt.document.has_class(el, "collapse"));
        assert!(rt.document.has_class(el, "show"));
        assert_eq!(rt.document.computed_style(el, "height"), "");
    }

    #[test]
    fn test_toggle_option_opens_on_construction() {
        let mut rt = Runtime::new();
        let body = rt.document.body();
        let (_, el) = panel(&mut rt, body, "auto", false);
        let collapse = Collapse::get_or_create_instance(&mut rt, el, Config::new()).unwrap();
        assert_eq!(collapse.state(), TransitionState::Showing);
    }

    #[test]
    fn test_horizontal_dimension() {
        let mut rt = Runtime::new();
        let body = rt.document.body();
        let (_, el) = panel(&mut rt, body, "side", false);
        rt.document.add_class(el, &["collapse-horizontal"]);
        let collapse = Collapse::get_or_create_instance(&mut rt, el, Config::new().with("toggle", false)).unwrap();
        assert_eq!(collapse.dimension(&rt), Dimension::Width);
    }

    #[test]
    fn test_accordion_closes_open_sibling() {
        let mut rt = Runtime::new();
        install_data_api(&mut rt);
        let body = rt.document.body();
        let accordion = rt.document.create_element("div");
        rt.document.set_attribute(accordion, "id", "acc");
        rt.document.append_child(body, accordion);
        let (_, first) = panel(&mut rt, accordion, "first", true);
        let (second_trigger, second) = panel(&mut rt, accordion, "second", false);
        for el in [first, second] {
            rt.document.set_attribute(el, "data-bs-parent", "#acc");
        }

        rt.click(second_trigger);
        rt.advance(10);
        assert!(rt.document.has_class(second, "show"));
        assert!(!rt.document.has_class(first, "show"));
        let first_instance = Collapse::get_instance(&rt, first).unwrap();
        assert_eq!(first_instance.state(), TransitionState::Hidden);
    }

    #[test]
    fn test_config_normalized_before_check() {
        let mut rt = Runtime::new();
        let body = rt.document.body();
        let (_, el) = panel(&mut rt, body, "coerced", false);
        let collapse = Collapse::get_or_create_instance(&mut rt, el, Config::new().with("toggle", 0.0)).unwrap();
        assert_eq!(collapse.config().get("toggle"), Some(&Value::Bool(false)));
        assert_eq!(collapse.config().get("parent"), Some(&Value::Null));

        let (_, other) = panel(&mut rt, body, "other", false);
        rt.document.set_attribute(other, "data-bs-parent", "#missing");
        let collapse = Collapse::get_or_create_instance(&mut rt, other, Config::new()).unwrap();
        assert_eq!(collapse.config().element("parent"), None);
    }
}
