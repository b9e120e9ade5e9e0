//! Popover
//!
//! A tooltip with a header and a body, opened by click by default.

use std::cell::RefCell;
use std::rc::Rc;

use fos_dom::NodeId;

use super::tooltip::{install_load_initializer, resolve_title, tip_defaults, TipState, TipWidget};
use crate::bridge::Plugin;
use crate::component::{Component, Disposable, Showable, TransitionState};
use crate::config::{Config, TypeTable};
use crate::registry::ComponentKind;
use crate::value::Value;
use crate::{Runtime, WidgetError};

const SELECTOR_TITLE: &str = ".popover-header";
const SELECTOR_CONTENT: &str = ".popover-body";
const SELECTOR_DATA_TOGGLE: &str = "[data-bs-toggle=\"popover\"]";
const EVENT_LOAD_DATA_API: &str = "load.bs.popover.data-api";

const TEMPLATE: &str = "<div class=\"popover\" role=\"tooltip\">\
    <div class=\"popover-arrow\"></div>\
    <h3 class=\"popover-header\"></h3>\
    <div class=\"popover-body\"></div>\
    </div>";

const DEFAULT_TYPE: TypeTable = &[
    ("animation", "boolean"),
    ("boundary", "(string|element)"),
    ("container", "(string|element|boolean)"),
    ("content", "(null|string|element)"),
    ("customClass", "string"),
    ("delay", "(number|object)"),
    ("fallbackPlacements", "array"),
    ("html", "boolean"),
    ("offset", "(array|string|number)"),
    ("placement", "string"),
    ("popperConfig", "(null|object)"),
    ("selector", "(string|boolean)"),
    ("template", "string"),
    ("title", "(string|element)"),
    ("trigger", "string"),
];

fn defaults() -> Config {
    tip_defaults()
        .with("content", "")
        .with("offset", Value::List(vec![Value::from(0u32), Value::from(8u32)]))
        .with("placement", "right")
        .with("template", TEMPLATE)
        .with("trigger", "click")
}

crate::plugin_commands! {
    pub enum PopoverCommand {
        Show => "show",
        Hide => "hide",
        Toggle => "toggle",
        Enable => "enable",
        Disable => "disable",
        ToggleEnabled => "toggleEnabled",
        Update => "update",
        Dispose => "dispose",
    }
}

/// Popover handle
#[derive(Debug, Clone)]
pub struct Popover(Rc<RefCell<TipState>>);

impl Component for Popover {
    const KIND: ComponentKind = ComponentKind::Popover;
    type State = TipState;

    fn from_inner(inner: Rc<RefCell<TipState>>) -> Self {
        Self(inner)
    }

    fn inner(&self) -> &Rc<RefCell<TipState>> {
        &self.0
    }

    fn construct(rt: &mut Runtime, element: NodeId, config: Config) -> Result<Self, WidgetError> {
        Self::build(rt, element, config)
    }

    fn element(&self) -> NodeId {
        self.0.borrow().element()
    }
}

impl Popover {
    pub fn config(&self) -> Config {
        self.0.borrow().config().clone()
    }

    fn content(&self) -> Value {
        match self.0.borrow().config().get("content") {
            Some(Value::String(s)) if !s.is_empty() => Value::String(s.clone()),
            Some(Value::Element(node)) => Value::Element(*node),
            _ => Value::Null,
        }
    }

    pub fn tip_element(&self) -> Option<NodeId> {
        self.tip()
    }

    pub fn enable(&self) {
        self.set_enabled(true);
    }

    pub fn disable(&self) {
        self.set_enabled(false);
    }

    pub fn toggle_enabled(&self) {
        self.set_enabled(!self.is_enabled());
    }

    pub fn update(&self, rt: &mut Runtime) {
        self.update_tip(rt);
    }

    /// New header and body content
    pub fn set_content(&self, rt: &mut Runtime, title: impl Into<Value>, content: impl Into<Value>) {
        self.set_tip_content(
            rt,
            vec![
                (SELECTOR_TITLE.to_string(), title.into()),
                (SELECTOR_CONTENT.to_string(), content.into()),
            ],
        );
    }
}

impl TipWidget for Popover {
    const DEFAULT_TYPE: TypeTable = DEFAULT_TYPE;

    fn defaults() -> Config {
        defaults()
    }

    fn content_for_template(&self, rt: &Runtime) -> Vec<(String, Value)> {
        let title = resolve_title(rt, &self.0.borrow());
        vec![
            (SELECTOR_TITLE.to_string(), title),
            (SELECTOR_CONTENT.to_string(), self.content()),
        ]
    }

    fn is_with_content(&self, rt: &Runtime) -> bool {
        resolve_title(rt, &self.0.borrow()).is_truthy() || self.content().is_truthy()
    }
}

impl Showable for Popover {
    fn show(&self, rt: &mut Runtime) {
        self.show_tip(rt);
    }

    fn hide(&self, rt: &mut Runtime) {
        self.hide_tip(rt);
    }

    fn state(&self) -> TransitionState {
        self.tip_state()
    }

    fn toggle(&self, rt: &mut Runtime) {
        self.toggle_tip(rt);
    }
}

impl Disposable for Popover {
    fn dispose(&self, rt: &mut Runtime) {
        self.dispose_tip(rt);
    }
}

impl Plugin for Popover {
    type Command = PopoverCommand;

    fn execute(&self, rt: &mut Runtime, command: PopoverCommand) {
        match command {
            PopoverCommand::Show => self.show(rt),
            PopoverCommand::Hide => self.hide(rt),
            PopoverCommand::Toggle => Showable::toggle(self, rt),
            PopoverCommand::Enable => self.enable(),
            PopoverCommand::Disable => self.disable(),
            PopoverCommand::ToggleEnabled => self.toggle_enabled(),
            PopoverCommand::Update => self.update(rt),
            PopoverCommand::Dispose => self.dispose(rt),
        }
    }
}

/// `[data-bs-toggle="popover"]` elements get an instance on `load`
pub fn install_data_api(rt: &mut Runtime) {
    install_load_initializer::<Popover>(rt, EVENT_LOAD_DATA_API, SELECTOR_DATA_TOGGLE);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placement::StaticPlacement;

    fn runtime_with_button(attrs: &[(&str, &str)]) -> (Runtime, NodeId) {
        let mut rt = Runtime::new();
        rt.set_placement_engine(StaticPlacement::new());
        let body = rt.document.body();
        let button = rt.document.create_element("button");
        for (k, v) in attrs {
            rt.document.set_attribute(button, k, v);
        }
        rt.document.append_child(body, button);
        (rt, button)
    }

    #[test]
    fn test_click_opens_header_and_body() {
        let (mut rt, button) = runtime_with_button(&[
            ("data-bs-toggle", "popover"),
            ("data-bs-title", "Heads up"),
            ("data-bs-content", "Details here"),
        ]);
        install_data_api(&mut rt);
        rt.load();
        let popover = Popover::get_instance(&rt, button).unwrap();

        rt.click(button);
        rt.advance(0);
        let tip = popover.tip_element().unwrap();
        assert!(rt.document.has_class(tip, "bs-popover-auto"));
        assert_eq!(rt.document.get_attribute(tip, "data-popper-placement").as_deref(), Some("right"));
        let header = rt.document.query_selector(tip, ".popover-header").unwrap();
        let body = rt.document.query_selector(tip, ".popover-body").unwrap();
        assert_eq!(rt.document.text_content(header), "Heads up");
        assert_eq!(rt.document.text_content(body), "Details here");
        rt.advance(5);
        assert!(popover.is_shown());

        rt.click(button);
        rt.advance(10);
        assert!(!popover.is_shown());
        assert!(popover.tip_element().is_none());
    }

    #[test]
    fn test_empty_header_removed() {
        let (mut rt, button) = runtime_with_button(&[]);
        let config = Config::new().with("content", "Only a body").with("animation", false);
        let popover = Popover::get_or_create_instance(&mut rt, button, config).unwrap();
        popover.show(&mut rt);
        let tip = popover.tip_element().unwrap();
        assert!(rt.document.query_selector(tip, ".popover-header").is_none());
        assert!(rt.document.query_selector(tip, ".popover-body").is_some());
    }

    #[test]
    fn test_without_title_or_content_stays_hidden() {
        let (mut rt, button) = runtime_with_button(&[]);
        let popover = Popover::get_or_create_instance(&mut rt, button, Config::new()).unwrap();
        popover.show(&mut rt);
        assert_eq!(popover.state(), TransitionState::Hidden);
    }

    #[test]
    fn test_set_content_rebuilds_shown_tip() {
        let (mut rt, button) = runtime_with_button(&[("title", "Before")]);
        let popover =
            Popover::get_or_create_instance(&mut rt, button, Config::new().with("animation", false)).unwrap();
        popover.show(&mut rt);
        let first = popover.tip_element().unwrap();
        popover.set_content(&mut rt, "After", "Body");
        let second = popover.tip_element().unwrap();
        assert_ne!(first, second);
        assert!(!rt.document.is_connected(first));
        let header = rt.document.query_selector(second, ".popover-header").unwrap();
        assert_eq!(rt.document.text_content(header), "After");
        assert!(popover.is_shown());
    }
}
