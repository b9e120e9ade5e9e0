//! Tab
//!
//! Tabs, pills and list-group items that switch between panes. Showing a
//! tab fires `hide` on the active tab and `show` on the new one; either
//! listener can veto the switch.

use std::cell::RefCell;
use std::rc::Rc;

use fos_dom::NodeId;

use crate::bridge::Plugin;
use crate::component::{
    bind, dispose_base, emit, get_element_from_selector, get_next_active_element, is_link, register, Component,
    Disposable,
};
use crate::config::Config;
use crate::dispatch::Handler;
use crate::event::Event;
use crate::registry::ComponentKind;
use crate::transition::execute_after_transition;
use crate::value::Value;
use crate::{Runtime, WidgetError};

const ARROW_LEFT_KEY: &str = "ArrowLeft";
const ARROW_RIGHT_KEY: &str = "ArrowRight";
const ARROW_UP_KEY: &str = "ArrowUp";
const ARROW_DOWN_KEY: &str = "ArrowDown";
const HOME_KEY: &str = "Home";
const END_KEY: &str = "End";

const CLASS_NAME_ACTIVE: &str = "active";
const CLASS_NAME_FADE: &str = "fade";
const CLASS_NAME_SHOW: &str = "show";
const CLASS_DROPDOWN: &str = "dropdown";

const SELECTOR_DROPDOWN_TOGGLE: &str = ".dropdown-toggle";
const SELECTOR_DROPDOWN_MENU: &str = ".dropdown-menu";
const SELECTOR_TAB_PANEL: &str = ".list-group, .nav, [role=\"tablist\"]";
const SELECTOR_OUTER: &str = ".nav-item, .list-group-item";
const SELECTOR_INNER_ELEM: &str = ".nav-link:not(.dropdown-toggle), .list-group-item:not(.dropdown-toggle), \
     [role=\"tab\"]:not(.dropdown-toggle), [data-bs-toggle=\"tab\"], [data-bs-toggle=\"pill\"], \
     [data-bs-toggle=\"list\"]";
const SELECTOR_DATA_TOGGLE: &str = "[data-bs-toggle=\"tab\"], [data-bs-toggle=\"pill\"], [data-bs-toggle=\"list\"]";
const SELECTOR_DATA_TOGGLE_ACTIVE: &str =
    ".active[data-bs-toggle=\"tab\"], .active[data-bs-toggle=\"pill\"], .active[data-bs-toggle=\"list\"]";

const EVENT_KEYDOWN: &str = "keydown.bs.tab";
const EVENT_CLICK_DATA_API: &str = "click.bs.tab.data-api";
const EVENT_LOAD_DATA_API: &str = "load.bs.tab.data-api";

crate::plugin_commands! {
    pub enum TabCommand {
        Show => "show",
        Dispose => "dispose",
    }
}

#[derive(Debug)]
pub struct TabState {
    element: NodeId,
    /// Enclosing tab list; a tab outside any list does nothing
    parent: Option<NodeId>,
}

/// Tab handle
#[derive(Debug, Clone)]
pub struct Tab(Rc<RefCell<TabState>>);

impl Component for Tab {
    const KIND: ComponentKind = ComponentKind::Tab;
    type State = TabState;

    fn from_inner(inner: Rc<RefCell<TabState>>) -> Self {
        Self(inner)
    }

    fn inner(&self) -> &Rc<RefCell<TabState>> {
        &self.0
    }

    fn construct(rt: &mut Runtime, element: NodeId, _config: Config) -> Result<Self, WidgetError> {
        let parent = rt.document.closest(element, SELECTOR_TAB_PANEL);
        let tab = Self(Rc::new(RefCell::new(TabState { element, parent })));
        register(rt, element, &tab);
        if let Some(parent) = parent {
            let children = tab.children(rt);
            set_initial_attributes(rt, parent, &children);
            rt.on(element, EVENT_KEYDOWN, bind(&tab, |tab: &Tab, rt, ev| tab.keydown(rt, ev)));
        } else {
            tracing::debug!("tab {element} is not inside a tab list");
        }
        Ok(tab)
    }

    fn element(&self) -> NodeId {
        self.0.borrow().element
    }
}

impl Tab {
    /// Activate this tab and its pane. No-op when already active or when
    /// either lifecycle event is canceled.
    pub fn show(&self, rt: &mut Runtime) {
        let element = self.element();
        if self.0.borrow().parent.is_none() || is_active(rt, element) {
            return;
        }
        let active = self.active_elem(rt);
        let hide_prevented = active.is_some_and(|active| {
            let related = [("relatedTarget", Value::from(element))];
            emit(rt, active, Self::KIND, "hide", &related).is_some_and(|ev| ev.default_prevented())
        });
        let related = [("relatedTarget", Value::from(active))];
        let show_prevented = emit(rt, element, Self::KIND, "show", &related).is_none_or(|ev| ev.default_prevented());
        if show_prevented || hide_prevented {
            return;
        }
        tracing::debug!("tab {element} activating");
        if let Some(active) = active {
            deactivate(rt, active, Some(element));
        }
        activate(rt, element, active);
    }

    pub fn is_active(&self, rt: &Runtime) -> bool {
        is_active(rt, self.element())
    }

    fn children(&self, rt: &Runtime) -> Vec<NodeId> {
        match self.0.borrow().parent {
            Some(parent) => rt.document.query_selector_all(parent, SELECTOR_INNER_ELEM),
            None => Vec::new(),
        }
    }

    fn active_elem(&self, rt: &Runtime) -> Option<NodeId> {
        self.children(rt).into_iter().find(|&child| is_active(rt, child))
    }

    fn keydown(&self, rt: &mut Runtime, event: &mut Event) {
        let Some(key) = event.key().map(str::to_string) else {
            return;
        };
        if ![ARROW_LEFT_KEY, ARROW_RIGHT_KEY, ARROW_UP_KEY, ARROW_DOWN_KEY, HOME_KEY, END_KEY].contains(&key.as_str()) {
            return;
        }
        event.stop_propagation();
        event.prevent_default();

        let children: Vec<NodeId> = self
            .children(rt)
            .into_iter()
            .filter(|&child| !rt.document.is_disabled(child))
            .collect();
        let next = match key.as_str() {
            HOME_KEY => children.first().copied(),
            END_KEY => children.last().copied(),
            _ => {
                let is_next = key == ARROW_RIGHT_KEY || key == ARROW_DOWN_KEY;
                get_next_active_element(&children, Some(event.target()), is_next, true)
            }
        };
        let Some(next) = next else {
            return;
        };
        rt.focus(next);
        match Tab::get_or_create_instance(rt, next, Config::new()) {
            Ok(tab) => tab.show(rt),
            Err(err) => tracing::warn!("tab {next}: {err}"),
        }
    }
}

fn is_active(rt: &Runtime, element: NodeId) -> bool {
    rt.document.has_class(element, CLASS_NAME_ACTIVE)
}

fn inner_element(rt: &Runtime, element: NodeId) -> NodeId {
    if rt.document.matches(element, SELECTOR_INNER_ELEM) {
        return element;
    }
    rt.document
        .query_selector(element, SELECTOR_INNER_ELEM)
        .unwrap_or(element)
}

fn outer_element(rt: &Runtime, element: NodeId) -> NodeId {
    rt.document.closest(element, SELECTOR_OUTER).unwrap_or(element)
}

fn set_attribute_if_not_exists(rt: &mut Runtime, element: NodeId, attribute: &str, value: &str) {
    if !rt.document.has_attribute(element, attribute) {
        rt.document.set_attribute(element, attribute, value);
    }
}

fn set_initial_attributes(rt: &mut Runtime, parent: NodeId, children: &[NodeId]) {
    set_attribute_if_not_exists(rt, parent, "role", "tablist");
    for &child in children {
        let child = inner_element(rt, child);
        let active = is_active(rt, child);
        let outer = outer_element(rt, child);
        rt.document
            .set_attribute(child, "aria-selected", if active { "true" } else { "false" });
        if outer != child {
            set_attribute_if_not_exists(rt, outer, "role", "presentation");
        }
        if !active {
            rt.document.set_attribute(child, "tabindex", "-1");
        }
        set_attribute_if_not_exists(rt, child, "role", "tab");

        if let Some(pane) = get_element_from_selector(rt, child) {
            set_attribute_if_not_exists(rt, pane, "role", "tabpanel");
            if let Some(id) = rt.document.get_attribute(child, "id").filter(|id| !id.is_empty()) {
                set_attribute_if_not_exists(rt, pane, "aria-labelledby", &id);
            }
        }
    }
}

fn is_tab_role(rt: &Runtime, element: NodeId) -> bool {
    rt.document.get_attribute(element, "role").as_deref() == Some("tab")
}

fn activate(rt: &mut Runtime, element: NodeId, related: Option<NodeId>) {
    rt.document.add_class(element, &[CLASS_NAME_ACTIVE]);
    if let Some(pane) = get_element_from_selector(rt, element) {
        activate(rt, pane, None);
    }
    let animated = rt.document.has_class(element, CLASS_NAME_FADE);
    execute_after_transition(rt, element, animated, move |rt| {
        if !is_tab_role(rt, element) {
            rt.document.add_class(element, &[CLASS_NAME_SHOW]);
            return;
        }
        rt.document.remove_attribute(element, "tabindex");
        rt.document.set_attribute(element, "aria-selected", "true");
        toggle_dropdown(rt, element, true);
        emit(rt, element, Tab::KIND, "shown", &[("relatedTarget", Value::from(related))]);
    });
}

fn deactivate(rt: &mut Runtime, element: NodeId, related: Option<NodeId>) {
    rt.document.remove_class(element, &[CLASS_NAME_ACTIVE]);
    if rt.document.active_element() == Some(element) {
        rt.blur();
    }
    if let Some(pane) = get_element_from_selector(rt, element) {
        deactivate(rt, pane, None);
    }
    let animated = rt.document.has_class(element, CLASS_NAME_FADE);
    execute_after_transition(rt, element, animated, move |rt| {
        if !is_tab_role(rt, element) {
            rt.document.remove_class(element, &[CLASS_NAME_SHOW]);
            return;
        }
        rt.document.set_attribute(element, "aria-selected", "false");
        rt.document.set_attribute(element, "tabindex", "-1");
        toggle_dropdown(rt, element, false);
        emit(rt, element, Tab::KIND, "hidden", &[("relatedTarget", Value::from(related))]);
    });
}

/// Tabs nested in a dropdown mirror their state onto its toggle and menu
fn toggle_dropdown(rt: &mut Runtime, element: NodeId, open: bool) {
    let outer = outer_element(rt, element);
    if !rt.document.has_class(outer, CLASS_DROPDOWN) {
        return;
    }
    if let Some(toggle) = rt.document.query_selector(outer, SELECTOR_DROPDOWN_TOGGLE) {
        rt.document.toggle_class(toggle, CLASS_NAME_ACTIVE, Some(open));
    }
    if let Some(menu) = rt.document.query_selector(outer, SELECTOR_DROPDOWN_MENU) {
        rt.document.toggle_class(menu, CLASS_NAME_SHOW, Some(open));
    }
    rt.document
        .set_attribute(outer, "aria-expanded", if open { "true" } else { "false" });
}

impl Disposable for Tab {
    fn dispose(&self, rt: &mut Runtime) {
        dispose_base(rt, self.element(), Self::KIND);
    }
}

impl Plugin for Tab {
    type Command = TabCommand;

    fn execute(&self, rt: &mut Runtime, command: TabCommand) {
        match command {
            TabCommand::Show => self.show(rt),
            TabCommand::Dispose => self.dispose(rt),
        }
    }
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
            match Tab::get_or_create_instance(rt, trigger, Config::new()) {
                Ok(tab) => tab.show(rt),
                Err(err) => tracing::warn!("tab {trigger}: {err}"),
            }
        }),
    );
    rt.on(
        NodeId::ROOT,
        EVENT_LOAD_DATA_API,
        Handler::new(|rt, _| {
            for element in rt.document.query_selector_all(NodeId::ROOT, SELECTOR_DATA_TOGGLE_ACTIVE) {
                if let Err(err) = Tab::get_or_create_instance(rt, element, Config::new()) {
                    tracing::warn!("tab {element}: {err}");
                }
            }
        }),
    );
}
