//! Component plumbing shared by every widget
//!
//! A widget is a cheap handle (`Rc<RefCell<State>>`) bound to one element.
//! The instance registry stores the shared state, so every handle obtained
//! through `get_instance` points at the same widget.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use fos_dom::NodeId;
use serde::Serialize;

use crate::config::{merge_config, type_check, Config, TypeTable};
use crate::dispatch::Handler;
use crate::event::Event;
use crate::registry::{ComponentKind, Instance};
use crate::value::Value;
use crate::{Runtime, WidgetError};

/// Visibility lifecycle of a showable widget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionState {
    #[default]
    Hidden,
    Showing,
    Shown,
    Hiding,
}

impl TransitionState {
    /// Shown or on its way there
    pub fn is_shown(self) -> bool {
        matches!(self, Self::Showing | Self::Shown)
    }

    pub fn is_transitioning(self) -> bool {
        matches!(self, Self::Showing | Self::Hiding)
    }

    /// `show` may start only from rest in the hidden state
    pub fn can_show(self) -> bool {
        self == Self::Hidden
    }

    /// `hide` may start only from rest in the shown state
    pub fn can_hide(self) -> bool {
        self == Self::Shown
    }
}

/// A widget bound 1:1 to an element
pub trait Component: Sized + Clone + 'static {
    const KIND: ComponentKind;

    /// Shared mutable state behind the handle
    type State: 'static;

    fn from_inner(inner: Rc<RefCell<Self::State>>) -> Self;

    fn inner(&self) -> &Rc<RefCell<Self::State>>;

    /// Build and register a new instance
    fn construct(rt: &mut Runtime, element: NodeId, config: Config) -> Result<Self, WidgetError>;

    /// Bound element
    fn element(&self) -> NodeId;

    /// Instance already bound to `element`
    fn get_instance(rt: &Runtime, element: NodeId) -> Option<Self> {
        let instance = rt.instances().get(element, Self::KIND)?;
        instance
            .downcast::<RefCell<Self::State>>()
            .ok()
            .map(Self::from_inner)
    }

    /// Bound instance, or a new one built with `config`
    fn get_or_create_instance(rt: &mut Runtime, element: NodeId, config: Config) -> Result<Self, WidgetError> {
        match Self::get_instance(rt, element) {
            Some(instance) => Ok(instance),
            None => Self::construct(rt, element, config),
        }
    }

    /// Same underlying widget
    fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(self.inner(), other.inner())
    }

    fn downgrade(&self) -> Weak<RefCell<Self::State>> {
        Rc::downgrade(self.inner())
    }
}

/// Widgets with a show/hide lifecycle
pub trait Showable: Component {
    fn show(&self, rt: &mut Runtime);

    fn hide(&self, rt: &mut Runtime);

    fn state(&self) -> TransitionState;

    fn is_shown(&self) -> bool {
        self.state().is_shown()
    }

    fn toggle(&self, rt: &mut Runtime) {
        if self.is_shown() {
            self.hide(rt);
        } else {
            self.show(rt);
        }
    }
}

/// Explicit teardown
pub trait Disposable: Component {
    /// Drop listeners and the registry entry
    fn dispose(&self, rt: &mut Runtime);
}

/// Register the handle's state for its element
pub(crate) fn register<C: Component>(rt: &mut Runtime, element: NodeId, this: &C) {
    if !element.is_valid() {
        return;
    }
    let instance: Instance = this.inner().clone();
    rt.instances_mut().set(element, C::KIND, instance);
}

/// Common teardown: registry entry plus every `.bs.<name>` listener on the
/// element
pub(crate) fn dispose_base(rt: &mut Runtime, element: NodeId, kind: ComponentKind) {
    rt.instances_mut().remove(element, kind);
    rt.off(element, &kind.event_key());
    tracing::debug!("{kind} disposed on {element}");
}

/// Merge and validate a widget's options
pub(crate) fn resolve_config(
    rt: &Runtime,
    kind: ComponentKind,
    element: NodeId,
    defaults: Config,
    types: TypeTable,
    overrides: Config,
    after_merge: impl FnOnce(&Runtime, &mut Config),
) -> Result<Config, WidgetError> {
    let mut config = merge_config(&rt.document, Some(element), defaults, overrides);
    after_merge(rt, &mut config);
    type_check(kind.name(), &config, types)?;
    Ok(config)
}

/// Listener that forwards to the widget while it is still alive
pub(crate) fn bind<C: Component>(this: &C, f: impl Fn(&C, &mut Runtime, &mut Event) + 'static) -> Handler {
    let weak = this.downgrade();
    Handler::new(move |rt, event| {
        if let Some(inner) = weak.upgrade() {
            f(&C::from_inner(inner), rt, event);
        }
    })
}

/// Timer callback that forwards to the widget while it is still alive
pub(crate) fn bind_once<C: Component>(
    this: &C,
    f: impl FnOnce(&C, &mut Runtime) + 'static,
) -> impl FnOnce(&mut Runtime) + 'static {
    let weak = this.downgrade();
    move |rt| {
        if let Some(inner) = weak.upgrade() {
            f(&C::from_inner(inner), rt);
        }
    }
}

/// Fire a lifecycle event `<name>.bs.<kind>` on `element`. `None` means the
/// element is gone.
pub(crate) fn emit(
    rt: &mut Runtime,
    element: NodeId,
    kind: ComponentKind,
    name: &str,
    data: &[(&str, Value)],
) -> Option<Event> {
    rt.trigger(element, &kind.event_name(name), data)
}

/// Whether a cancelable lifecycle event went through
pub(crate) fn emit_allowed(
    rt: &mut Runtime,
    element: NodeId,
    kind: ComponentKind,
    name: &str,
    data: &[(&str, Value)],
) -> bool {
    emit(rt, element, kind, name, data).is_some_and(|ev| !ev.default_prevented())
}

/// Target selector named by `data-bs-target`, or by an `href` fragment
fn selector_from_attributes(rt: &Runtime, element: NodeId) -> Option<String> {
    let mut selector = rt.document.get_attribute(element, "data-bs-target");
    if selector.as_deref().is_none_or(|s| s.is_empty() || s == "#") {
        let href = rt.document.get_attribute(element, "href")?;
        if !href.contains('#') && !href.starts_with('.') {
            return None;
        }
        let href = match href.split_once('#') {
            Some((prefix, fragment)) if !prefix.is_empty() => format!("#{fragment}"),
            _ => href,
        };
        selector = (href != "#").then(|| href.trim().to_string());
    }
    selector
        .filter(|s| !s.is_empty())
        .map(|s| s.split(',').map(str::trim).collect::<Vec<_>>().join(","))
}

/// Target selector of a trigger, only when it resolves to something
pub fn get_selector_from_element(rt: &Runtime, element: NodeId) -> Option<String> {
    let selector = selector_from_attributes(rt, element)?;
    rt.document
        .query_selector(NodeId::ROOT, &selector)
        .map(|_| selector)
}

/// First element a trigger points at
pub fn get_element_from_selector(rt: &Runtime, element: NodeId) -> Option<NodeId> {
    let selector = selector_from_attributes(rt, element)?;
    rt.document.query_selector(NodeId::ROOT, &selector)
}

/// Every element a trigger points at
pub fn get_multiple_elements_from_selector(rt: &Runtime, element: NodeId) -> Vec<NodeId> {
    selector_from_attributes(rt, element)
        .map(|selector| rt.document.query_selector_all(NodeId::ROOT, &selector))
        .unwrap_or_default()
}

/// Resolve an option that may hold an element or a selector string
pub(crate) fn get_element(rt: &Runtime, value: Option<&Value>) -> Option<NodeId> {
    match value? {
        Value::Element(node) => Some(*node).filter(|n| rt.document.is_element(*n)),
        Value::String(selector) if !selector.is_empty() => {
            rt.document.query_selector(NodeId::ROOT, selector)
        }
        _ => None,
    }
}

/// Neighbour of `active` in `list`. Unknown `active` yields the first item
/// (or the last when moving backwards with cycling). Without cycling the
/// index clamps at both ends.
pub fn get_next_active_element(list: &[NodeId], active: Option<NodeId>, next: bool, cycle: bool) -> Option<NodeId> {
    let len = list.len() as isize;
    if len == 0 {
        return None;
    }
    let Some(index) = active.and_then(|a| list.iter().position(|&n| n == a)) else {
        return if !next && cycle { list.last().copied() } else { list.first().copied() };
    };
    let mut index = index as isize + if next { 1 } else { -1 };
    if cycle {
        index = (index + len) % len;
    }
    list.get(index.clamp(0, len - 1) as usize).copied()
}

/// Anchors and image-map areas navigate by default
pub(crate) fn is_link(rt: &Runtime, element: NodeId) -> bool {
    matches!(rt.document.tag_name(element), "a" | "area")
}

/// Route clicks on `[data-bs-dismiss="<name>"]` to `action` on the widget
/// named by the trigger's target or its closest `.<name>` ancestor
pub(crate) fn enable_dismiss_trigger<C: Component>(rt: &mut Runtime, action: fn(&C, &mut Runtime)) {
    let name = C::KIND.name();
    let event = format!("click.dismiss{}", C::KIND.event_key());
    let selector = format!("[data-bs-dismiss=\"{name}\"]");
    rt.on_delegated(
        NodeId::ROOT,
        &event,
        &selector,
        Handler::new(move |rt, ev| {
            let trigger = ev.delegate_target();
            if is_link(rt, trigger) {
                ev.prevent_default();
            }
            if rt.document.is_disabled(trigger) {
                return;
            }
            let target = get_element_from_selector(rt, trigger)
                .or_else(|| rt.document.closest(trigger, &format!(".{name}")));
            let Some(target) = target else {
                tracing::warn!("dismiss trigger {trigger} has no {name} to close");
                return;
            };
            match C::get_or_create_instance(rt, target, Config::new()) {
                Ok(instance) => action(&instance, rt),
                Err(err) => tracing::warn!("dismiss on {target} failed: {err}"),
            }
        }),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_state_guards() {
        assert!(TransitionState::Hidden.can_show());
        assert!(!TransitionState::Showing.can_show());
        assert!(!TransitionState::Showing.can_hide());
        assert!(TransitionState::Shown.can_hide());
        assert!(TransitionState::Showing.is_shown());
        assert!(!TransitionState::Hiding.is_shown());
        assert!(TransitionState::Hiding.is_transitioning());
        assert_eq!(serde_json::to_string(&TransitionState::Shown).unwrap(), "\"shown\"");
    }

    fn link(rt: &mut Runtime, attrs: &[(&str, &str)]) -> NodeId {
        let a = rt.document.create_element("a");
        for (k, v) in attrs {
            rt.document.set_attribute(a, k, v);
        }
        let body = rt.document.body();
        rt.document.append_child(body, a);
        a
    }

    #[test]
    fn test_selector_from_target_and_href() {
        let mut rt = Runtime::new();
        let panel = rt.document.create_element("div");
        rt.document.set_attribute(panel, "id", "panel");
        let body = rt.document.body();
        rt.document.append_child(body, panel);

        let by_target = link(&mut rt, &[("data-bs-target", "#panel")]);
        let by_href = link(&mut rt, &[("href", "/page#panel")]);
        let bare_hash = link(&mut rt, &[("href", "#")]);
        let missing = link(&mut rt, &[("data-bs-target", "#nope")]);
        let plain = link(&mut rt, &[("href", "/page")]);

        assert_eq!(get_selector_from_element(&rt, by_target).as_deref(), Some("#panel"));
        assert_eq!(get_element_from_selector(&rt, by_href), Some(panel));
        assert_eq!(get_element_from_selector(&rt, bare_hash), None);
        assert_eq!(get_selector_from_element(&rt, missing), None);
        assert_eq!(get_element_from_selector(&rt, plain), None);
    }

    #[test]
    fn test_multiple_targets() {
        let mut rt = Runtime::new();
        let body = rt.document.body();
        for _ in 0..2 {
            let el = rt.document.create_element("div");
            rt.document.add_class(el, &["multi"]);
            rt.document.append_child(body, el);
        }
        let trigger = link(&mut rt, &[("data-bs-target", ".multi")]);
        assert_eq!(get_multiple_elements_from_selector(&rt, trigger).len(), 2);
    }

    #[test]
    fn test_next_active_element() {
        let mut rt = Runtime::new();
        let items: Vec<NodeId> = (0..4).map(|_| rt.document.create_element("div")).collect();
        let last = items[3];
        assert_eq!(get_next_active_element(&items, Some(last), true, true), Some(items[0]));
        assert_eq!(get_next_active_element(&items, Some(last), true, false), Some(last));
        assert_eq!(get_next_active_element(&items, Some(items[0]), false, true), Some(last));
        assert_eq!(get_next_active_element(&items, Some(items[0]), false, false), Some(items[0]));
        assert_eq!(get_next_active_element(&items, None, false, true), Some(last));
        assert_eq!(get_next_active_element(&items, None, true, false), Some(items[0]));
        assert_eq!(get_next_active_element(&[], None, true, true), None);
    }
}
