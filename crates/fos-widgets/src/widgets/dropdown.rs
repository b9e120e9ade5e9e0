//! Dropdown
//!
//! Toggleable menu positioned by the placement engine. Open menus close on
//! outside clicks according to `autoClose`; arrow keys move focus through
//! the visible, enabled items.

use std::cell::RefCell;
use std::rc::Rc;

use fos_dom::NodeId;

use crate::bridge::Plugin;
use crate::component::{
    dispose_base, emit, emit_allowed, get_element, get_next_active_element, register, resolve_config, Component,
    Disposable, Showable, TransitionState,
};
use crate::config::{remove_data_attribute, set_data_attribute, Config, TypeTable};
use crate::dispatch::Handler;
use crate::event::Event;
use crate::placement::{
    apply_popper_config, boundary_from_value, offset_from_value, PlacementHandle, PlacementOptions,
};
use crate::registry::ComponentKind;
use crate::value::Value;
use crate::{Runtime, WidgetError};

const ESCAPE_KEY: &str = "Escape";
const TAB_KEY: &str = "Tab";
const ARROW_UP_KEY: &str = "ArrowUp";
const ARROW_DOWN_KEY: &str = "ArrowDown";
const RIGHT_MOUSE_BUTTON: i16 = 2;

const EVENT_CLICK_DATA_API: &str = "click.bs.dropdown.data-api";
const EVENT_KEYDOWN_DATA_API: &str = "keydown.bs.dropdown.data-api";
const EVENT_KEYUP_DATA_API: &str = "keyup.bs.dropdown.data-api";

const CLASS_NAME_SHOW: &str = "show";
const CLASS_NAME_DROPUP: &str = "dropup";
const CLASS_NAME_DROPEND: &str = "dropend";
const CLASS_NAME_DROPSTART: &str = "dropstart";
const CLASS_NAME_DROPUP_CENTER: &str = "dropup-center";
const CLASS_NAME_DROPDOWN_CENTER: &str = "dropdown-center";

const SELECTOR_DATA_TOGGLE: &str = "[data-bs-toggle=\"dropdown\"]:not(.disabled):not(:disabled)";
const SELECTOR_DATA_TOGGLE_SHOWN: &str = "[data-bs-toggle=\"dropdown\"]:not(.disabled):not(:disabled).show";
const SELECTOR_MENU: &str = ".dropdown-menu";
const SELECTOR_NAVBAR: &str = ".navbar";
const SELECTOR_VISIBLE_ITEMS: &str = ".dropdown-item:not(.disabled):not(:disabled)";

const DEFAULT_TYPE: TypeTable = &[
    ("autoClose", "(boolean|string)"),
    ("boundary", "(string|element)"),
    ("display", "string"),
    ("offset", "(array|string|number)"),
    ("popperConfig", "(null|object)"),
    ("reference", "(string|element|object)"),
];

fn defaults() -> Config {
    Config::new()
        .with("autoClose", true)
        .with("boundary", "clippingParents")
        .with("display", "dynamic")
        .with("offset", "0,2")
        .with("popperConfig", Value::Null)
        .with("reference", "toggle")
}

crate::plugin_commands! {
    pub enum DropdownCommand {
        Show => "show",
        Hide => "hide",
        Toggle => "toggle",
        Update => "update",
        Dispose => "dispose",
    }
}

/// Which clicks close an open menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoClose {
    /// Any click outside the toggle
    Always,
    /// Only clicks inside the menu
    Inside,
    /// Only clicks outside the menu
    Outside,
    Never,
}

impl AutoClose {
    fn from_config(config: &Config) -> Self {
        match config.get("autoClose") {
            Some(Value::Bool(false)) => Self::Never,
            Some(Value::String(s)) if s == "inside" => Self::Inside,
            Some(Value::String(s)) if s == "outside" => Self::Outside,
            _ => Self::Always,
        }
    }
}

#[derive(Debug)]
pub struct DropdownState {
    element: NodeId,
    config: Config,
    parent: Option<NodeId>,
    menu: Option<NodeId>,
    in_navbar: bool,
    shown: bool,
    popper: Option<PlacementHandle>,
}

/// Dropdown handle, bound to the toggle
#[derive(Debug, Clone)]
pub struct Dropdown(Rc<RefCell<DropdownState>>);

impl Component for Dropdown {
    const KIND: ComponentKind = ComponentKind::Dropdown;
    type State = DropdownState;

    fn from_inner(inner: Rc<RefCell<DropdownState>>) -> Self {
        Self(inner)
    }

    fn inner(&self) -> &Rc<RefCell<DropdownState>> {
        &self.0
    }

    fn construct(rt: &mut Runtime, element: NodeId, config: Config) -> Result<Self, WidgetError> {
        let config = resolve_config(rt, Self::KIND, element, defaults(), DEFAULT_TYPE, config, |_, _| {})?;
        let parent = rt.document.parent(element);
        let menu = find_menu(rt, element, parent);
        let in_navbar = rt.document.closest(element, SELECTOR_NAVBAR).is_some();
        let is_static = config.str("display") == Some("static");
        if !rt.has_placement_engine() && !in_navbar && !is_static {
            return Err(WidgetError::placement_engine(Self::KIND.name()));
        }
        if menu.is_none() {
            tracing::warn!("dropdown toggle {element} has no .dropdown-menu");
        }

        let dropdown = Self(Rc::new(RefCell::new(DropdownState {
            element,
            config,
            parent,
            menu,
            in_navbar,
            shown: false,
            popper: None,
        })));
        register(rt, element, &dropdown);
        Ok(dropdown)
    }

    fn element(&self) -> NodeId {
        self.0.borrow().element
    }
}

/// Sibling menu first, then any menu inside the parent
fn find_menu(rt: &Runtime, element: NodeId, parent: Option<NodeId>) -> Option<NodeId> {
    sibling_matching(rt, element, SELECTOR_MENU, true)
        .or_else(|| sibling_matching(rt, element, SELECTOR_MENU, false))
        .or_else(|| parent.and_then(|p| rt.document.query_selector(p, SELECTOR_MENU)))
}

/// Nearest sibling of `element` matching `selector`, walking one way
fn sibling_matching(rt: &Runtime, element: NodeId, selector: &str, next: bool) -> Option<NodeId> {
    let doc = &rt.document;
    let mut node = element;
    loop {
        node = if next {
            doc.next_element_sibling(node)?
        } else {
            doc.previous_element_sibling(node)?
        };
        if doc.matches(node, selector) {
            return Some(node);
        }
    }
}

impl Dropdown {
    pub fn config(&self) -> Config {
        self.0.borrow().config.clone()
    }

    pub fn menu(&self) -> Option<NodeId> {
        self.0.borrow().menu
    }

    /// Live placement attachment, if the menu is positioned by the engine
    pub fn placement_handle(&self) -> Option<PlacementHandle> {
        self.0.borrow().popper
    }

    pub fn in_navbar(&self) -> bool {
        self.0.borrow().in_navbar
    }

    /// Recompute navbar membership and refresh the menu position
    pub fn update(&self, rt: &mut Runtime) {
        let element = self.element();
        let in_navbar = rt.document.closest(element, SELECTOR_NAVBAR).is_some();
        self.0.borrow_mut().in_navbar = in_navbar;
        if let Some(handle) = self.placement_handle() {
            rt.update_placement(handle);
        }
    }

    fn placement(&self, rt: &Runtime) -> &'static str {
        let Some(parent) = self.0.borrow().parent else {
            return "bottom-start";
        };
        let doc = &rt.document;
        if doc.has_class(parent, CLASS_NAME_DROPEND) {
            return "right-start";
        }
        if doc.has_class(parent, CLASS_NAME_DROPSTART) {
            return "left-start";
        }
        if doc.has_class(parent, CLASS_NAME_DROPUP_CENTER) {
            return "top";
        }
        if doc.has_class(parent, CLASS_NAME_DROPDOWN_CENTER) {
            return "bottom";
        }
        let is_end = self
            .menu()
            .is_some_and(|menu| doc.computed_style(menu, "--bs-position").trim() == "end");
        match (doc.has_class(parent, CLASS_NAME_DROPUP), is_end) {
            (true, true) => "top-end",
            (true, false) => "top-start",
            (false, true) => "bottom-end",
            (false, false) => "bottom-start",
        }
    }

    fn reference_element(&self, rt: &Runtime) -> NodeId {
        let state = self.0.borrow();
        match state.config.get("reference") {
            Some(Value::String(s)) if s == "parent" => state.parent.unwrap_or(state.element),
            Some(Value::String(s)) if s == "toggle" => state.element,
            other => get_element(rt, other).unwrap_or(state.element),
        }
    }

    fn create_popper(&self, rt: &mut Runtime, menu: NodeId) {
        let is_static = {
            let state = self.0.borrow();
            state.in_navbar || state.config.str("display") == Some("static")
        };
        if is_static {
            set_data_attribute(&mut rt.document, menu, "popper", "static");
        }
        if !rt.has_placement_engine() {
            return;
        }
        let mut options = {
            let state = self.0.borrow();
            PlacementOptions {
                placement: self.placement(rt).to_string(),
                offset: offset_from_value(state.config.get("offset")),
                boundary: boundary_from_value(state.config.get("boundary")),
                apply_styles: !is_static,
                ..Default::default()
            }
        };
        apply_popper_config(&mut options, self.0.borrow().config.get("popperConfig"));
        let reference = self.reference_element(rt);
        let handle = rt.attach_placement(reference, menu, &options);
        self.0.borrow_mut().popper = handle;
    }

    fn destroy_popper(&self, rt: &mut Runtime) {
        if let Some(handle) = self.0.borrow_mut().popper.take() {
            rt.detach_placement(handle);
        }
    }

    fn complete_hide(&self, rt: &mut Runtime) {
        let element = self.element();
        let related = [("relatedTarget", Value::from(element))];
        if !emit_allowed(rt, element, Self::KIND, "hide", &related) {
            return;
        }
        self.destroy_popper(rt);
        self.0.borrow_mut().shown = false;
        if let Some(menu) = self.menu() {
            rt.document.remove_class(menu, &[CLASS_NAME_SHOW]);
            remove_data_attribute(&mut rt.document, menu, "popper");
        }
        rt.document.remove_class(element, &[CLASS_NAME_SHOW]);
        rt.document.set_attribute(element, "aria-expanded", "false");
        tracing::debug!("dropdown {element} hidden");
        emit(rt, element, Self::KIND, "hidden", &related);
    }

    /// Focus the neighbouring menu item. From outside the list, down picks
    /// the first item and up the last; inside it, movement stops at the ends.
    fn select_menu_item(&self, rt: &mut Runtime, key: &str, target: NodeId) {
        let Some(menu) = self.menu() else {
            return;
        };
        let items: Vec<NodeId> = rt
            .document
            .query_selector_all(menu, SELECTOR_VISIBLE_ITEMS)
            .into_iter()
            .filter(|&n| rt.document.is_visible(n))
            .collect();
        if items.is_empty() {
            return;
        }
        let outside = !items.contains(&target);
        if let Some(item) = get_next_active_element(&items, Some(target), key == ARROW_DOWN_KEY, outside) {
            rt.focus(item);
        }
    }
}

impl Showable for Dropdown {
    fn show(&self, rt: &mut Runtime) {
        let element = self.element();
        if rt.document.is_disabled(element) || self.is_shown() {
            return;
        }
        let Some(menu) = self.menu() else {
            return;
        };
        let related = [("relatedTarget", Value::from(element))];
        if !emit_allowed(rt, element, Self::KIND, "show", &related) {
            return;
        }
        self.create_popper(rt, menu);
        self.0.borrow_mut().shown = true;
        rt.focus(element);
        rt.document.set_attribute(element, "aria-expanded", "true");
        rt.document.add_class(menu, &[CLASS_NAME_SHOW]);
        rt.document.add_class(element, &[CLASS_NAME_SHOW]);
        tracing::debug!("dropdown {element} shown");
        emit(rt, element, Self::KIND, "shown", &related);
    }

    fn hide(&self, rt: &mut Runtime) {
        let element = self.element();
        if rt.document.is_disabled(element) || !self.is_shown() {
            return;
        }
        self.complete_hide(rt);
    }

    /// Menus open and close synchronously
    fn state(&self) -> TransitionState {
        if self.0.borrow().shown {
            TransitionState::Shown
        } else {
            TransitionState::Hidden
        }
    }
}

impl Disposable for Dropdown {
    fn dispose(&self, rt: &mut Runtime) {
        self.destroy_popper(rt);
        dispose_base(rt, self.element(), Self::KIND);
    }
}

impl Plugin for Dropdown {
    type Command = DropdownCommand;

    fn execute(&self, rt: &mut Runtime, command: DropdownCommand) {
        match command {
            DropdownCommand::Show => self.show(rt),
            DropdownCommand::Hide => self.hide(rt),
            DropdownCommand::Toggle => self.toggle(rt),
            DropdownCommand::Update => self.update(rt),
            DropdownCommand::Dispose => self.dispose(rt),
        }
    }
}

/// Close every open menu the event is not exempt for
pub fn clear_menus(rt: &mut Runtime, event: &Event) {
    let is_keyup = event.event_type() == "keyup";
    if event.button() == RIGHT_MOUSE_BUTTON || (is_keyup && event.key() != Some(TAB_KEY)) {
        return;
    }
    let path = event.composed_path();
    let target = event.target();
    for toggle in rt.document.query_selector_all(NodeId::ROOT, SELECTOR_DATA_TOGGLE_SHOWN) {
        let Some(context) = Dropdown::get_instance(rt, toggle) else {
            continue;
        };
        let auto_close = AutoClose::from_config(&context.0.borrow().config);
        if auto_close == AutoClose::Never {
            continue;
        }
        let menu = context.menu();
        let is_menu_target = menu.is_some_and(|m| path.contains(&m));
        if path.contains(&toggle)
            || (auto_close == AutoClose::Inside && !is_menu_target)
            || (auto_close == AutoClose::Outside && is_menu_target)
        {
            continue;
        }
        let from_menu = menu.is_some_and(|m| rt.document.contains(m, target));
        let form_target = matches!(
            rt.document.tag_name(target),
            "input" | "select" | "option" | "textarea" | "form"
        );
        if from_menu && (is_keyup || form_target) {
            continue;
        }
        context.complete_hide(rt);
    }
}

fn data_api_keydown(rt: &mut Runtime, event: &mut Event) {
    let target = event.target();
    let is_input = matches!(rt.document.tag_name(target), "input" | "textarea");
    let key = event.key().unwrap_or_default().to_string();
    let is_escape = key == ESCAPE_KEY;
    let is_up_or_down = key == ARROW_UP_KEY || key == ARROW_DOWN_KEY;
    if !is_up_or_down && !is_escape {
        return;
    }
    if is_input && !is_escape {
        return;
    }
    event.prevent_default();

    let delegate = event.delegate_target();
    let toggle = if rt.document.matches(delegate, SELECTOR_DATA_TOGGLE) {
        Some(delegate)
    } else {
        sibling_matching(rt, delegate, SELECTOR_DATA_TOGGLE, false)
            .or_else(|| sibling_matching(rt, delegate, SELECTOR_DATA_TOGGLE, true))
            .or_else(|| {
                rt.document
                    .parent(delegate)
                    .and_then(|p| rt.document.query_selector(p, SELECTOR_DATA_TOGGLE))
            })
    };
    let Some(toggle) = toggle else {
        return;
    };
    let instance = match Dropdown::get_or_create_instance(rt, toggle, Config::new()) {
        Ok(instance) => instance,
        Err(err) => {
            tracing::warn!("dropdown {toggle}: {err}");
            return;
        }
    };

    if is_up_or_down {
        event.stop_propagation();
        instance.show(rt);
        instance.select_menu_item(rt, &key, target);
        return;
    }
    if instance.is_shown() {
        event.stop_propagation();
        instance.hide(rt);
        rt.focus(toggle);
    }
}

pub fn install_data_api(rt: &mut Runtime) {
    let keydown = Handler::new(data_api_keydown);
    rt.on_delegated(NodeId::ROOT, EVENT_KEYDOWN_DATA_API, SELECTOR_DATA_TOGGLE, keydown.clone());
    rt.on_delegated(NodeId::ROOT, EVENT_KEYDOWN_DATA_API, SELECTOR_MENU, keydown);
    rt.on(NodeId::ROOT, EVENT_CLICK_DATA_API, Handler::new(|rt, ev| clear_menus(rt, ev)));
    rt.on(NodeId::ROOT, EVENT_KEYUP_DATA_API, Handler::new(|rt, ev| clear_menus(rt, ev)));
    rt.on_delegated(
        NodeId::ROOT,
        EVENT_CLICK_DATA_API,
        SELECTOR_DATA_TOGGLE,
        Handler::new(|rt, ev| {
            ev.prevent_default();
            let toggle = ev.delegate_target();
            match Dropdown::get_or_create_instance(rt, toggle, Config::new()) {
                Ok(dropdown) => dropdown.toggle(rt),
                Err(err) => tracing::warn!("dropdown {toggle}: {err}"),
            }
        }),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placement::StaticPlacement;

    struct Page {
        wrapper: NodeId,
        toggle: NodeId,
        menu: NodeId,
        items: Vec<NodeId>,
        outside: NodeId,
    }

    fn dropdown_page(rt: &mut Runtime, wrapper_class: &str) -> Page {
        let body = rt.document.body();
        let wrapper = rt.document.create_element("div");
        rt.document.set_attribute(wrapper, "class", wrapper_class);
        rt.document.append_child(body, wrapper);
        let toggle = rt.document.create_element("button");
        rt.document.set_attribute(toggle, "data-bs-toggle", "dropdown");
        rt.document.set_attribute(toggle, "aria-expanded", "false");
        rt.document.append_child(wrapper, toggle);
        let menu = rt.document.create_element("ul");
        rt.document.set_attribute(menu, "class", "dropdown-menu");
        rt.document.append_child(wrapper, menu);
        let items = (0..3)
            .map(|i| {
                let li = rt.document.create_element("li");
                rt.document.append_child(menu, li);
                let a = rt.document.create_element("a");
                rt.document.set_attribute(a, "href", "#");
                rt.document
                    .set_attribute(a, "class", if i == 1 { "dropdown-item disabled" } else { "dropdown-item" });
                rt.document.append_child(li, a);
                a
            })
            .collect();
        let outside = rt.document.create_element("p");
        rt.document.append_child(body, outside);
        Page {
            wrapper,
            toggle,
            menu,
            items,
            outside,
        }
    }

    fn runtime() -> Runtime {
        let mut rt = Runtime::new();
        rt.set_placement_engine(StaticPlacement::new());
        install_data_api(&mut rt);
        rt
    }

    #[test]
    fn test_click_toggles_menu() {
        let mut rt = runtime();
        let page = dropdown_page(&mut rt, "dropdown");
        rt.click(page.toggle);
        assert!(rt.document.has_class(page.menu, "show"));
        assert!(rt.document.has_class(page.toggle, "show"));
        assert_eq!(rt.document.get_attribute(page.toggle, "aria-expanded").as_deref(), Some("true"));
        assert_eq!(
            rt.document.get_attribute(page.menu, "data-popper-placement").as_deref(),
            Some("bottom-start")
        );
        assert_eq!(rt.document.active_element(), Some(page.toggle));

        rt.click(page.toggle);
        assert!(!rt.document.has_class(page.menu, "show"));
        assert_eq!(rt.document.get_attribute(page.toggle, "aria-expanded").as_deref(), Some("false"));
        assert!(!rt.document.has_attribute(page.menu, "data-popper-placement"));
    }

    #[test]
    fn test_outside_click_closes() {
        let mut rt = runtime();
        let page = dropdown_page(&mut rt, "dropdown");
        rt.click(page.toggle);
        rt.click(page.outside);
        assert!(!rt.document.has_class(page.menu, "show"));
    }

    #[test]
    fn test_auto_close_outside_keeps_menu_on_inside_click() {
        let mut rt = runtime();
        let page = dropdown_page(&mut rt, "dropdown");
        rt.document.set_attribute(page.toggle, "data-bs-auto-close", "outside");
        rt.click(page.toggle);
        rt.click(page.items[0]);
        assert!(rt.document.has_class(page.menu, "show"));
        rt.click(page.outside);
        assert!(!rt.document.has_class(page.menu, "show"));
    }

    #[test]
    fn test_auto_close_false_ignores_clicks() {
        let mut rt = runtime();
        let page = dropdown_page(&mut rt, "dropdown");
        rt.document.set_attribute(page.toggle, "data-bs-auto-close", "false");
        rt.click(page.toggle);
        rt.click(page.outside);
        rt.click(page.items[0]);
        assert!(rt.document.has_class(page.menu, "show"));
    }

    #[test]
    fn test_arrow_keys_skip_disabled_and_stop_at_ends() {
        let mut rt = runtime();
        let page = dropdown_page(&mut rt, "dropdown");
        rt.key_down(page.toggle, "ArrowDown", false);
        assert!(rt.document.has_class(page.menu, "show"));
        assert_eq!(rt.document.active_element(), Some(page.items[0]));

        rt.key_down(page.items[0], "ArrowDown", false);
        assert_eq!(rt.document.active_element(), Some(page.items[2]));
        rt.key_down(page.items[2], "ArrowDown", false);
        assert_eq!(rt.document.active_element(), Some(page.items[2]));

        rt.key_down(page.items[2], "Escape", false);
        assert!(!rt.document.has_class(page.menu, "show"));
        assert_eq!(rt.document.active_element(), Some(page.toggle));
    }

    #[test]
    fn test_arrow_up_from_toggle_picks_last() {
        let mut rt = runtime();
        let page = dropdown_page(&mut rt, "dropup");
        rt.key_down(page.toggle, "ArrowUp", false);
        assert_eq!(rt.document.active_element(), Some(page.items[2]));
        assert_eq!(rt.document.get_attribute(page.menu, "data-popper-placement").as_deref(), Some("top-start"));
    }

    #[test]
    fn test_requires_placement_engine() {
        let mut rt = Runtime::new();
        let page = dropdown_page(&mut rt, "dropdown");
        let err = Dropdown::get_or_create_instance(&mut rt, page.toggle, Config::new()).unwrap_err();
        assert_eq!(err.to_string(), "dropdown requires a placement engine");
        assert!(Dropdown::get_instance(&rt, page.toggle).is_none());
    }

    #[test]
    fn test_navbar_menu_is_static() {
        let mut rt = Runtime::new();
        install_data_api(&mut rt);
        let page = dropdown_page(&mut rt, "dropdown");
        let navbar = rt.document.create_element("nav");
        rt.document.set_attribute(navbar, "class", "navbar");
        let body = rt.document.body();
        rt.document.append_child(body, navbar);
        rt.document.append_child(navbar, page.wrapper);

        rt.click(page.toggle);
        let dropdown = Dropdown::get_instance(&rt, page.toggle).unwrap();
        assert!(dropdown.in_navbar());
        assert!(rt.document.has_class(page.menu, "show"));
        assert_eq!(rt.document.get_attribute(page.menu, "data-bs-popper").as_deref(), Some("static"));
        dropdown.hide(&mut rt);
        assert!(!rt.document.has_attribute(page.menu, "data-bs-popper"));
    }

    #[test]
    fn test_hide_veto() {
        let mut rt = runtime();
        let page = dropdown_page(&mut rt, "dropdown");
        rt.on(page.toggle, "hide.bs.dropdown", Handler::new(|_, ev| ev.prevent_default()));
        rt.click(page.toggle);
        rt.click(page.outside);
        assert!(rt.document.has_class(page.menu, "show"));
    }
}
