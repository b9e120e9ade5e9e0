//! Event subscription registry
//!
//! Subscriptions are grouped per element, then per registered event type.
//! Each one gets an id of the form `<namespace>::<n>` (or just `<n>` when it
//! was registered without a namespace); namespace removal matches on that id.
//!
//! `mouseenter`/`mouseleave` are stored under `mouseover`/`mouseout` and
//! carry a guard so they only fire when the pointer really crosses the
//! delegate target's boundary.

use std::collections::HashMap;
use std::rc::Rc;

use fos_dom::NodeId;

use crate::event::{is_native, Event};
use crate::Runtime;

/// Listener signature
pub type HandlerFn = dyn Fn(&mut Runtime, &mut Event);

/// Shared listener; identity is the allocation, so keep a clone to `off` it
#[derive(Clone)]
pub struct Handler(Rc<HandlerFn>);

impl Handler {
    pub fn new(f: impl Fn(&mut Runtime, &mut Event) + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn ptr_eq(&self, other: &Handler) -> bool {
        std::ptr::addr_eq(Rc::as_ptr(&self.0), Rc::as_ptr(&other.0))
    }

    pub(crate) fn call(&self, rt: &mut Runtime, event: &mut Event) {
        (self.0)(rt, event);
    }
}

impl std::fmt::Debug for Handler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Handler({:p})", Rc::as_ptr(&self.0))
    }
}

/// One registered listener
#[derive(Debug, Clone)]
pub(crate) struct Subscription {
    pub(crate) uid: String,
    pub(crate) namespace: String,
    pub(crate) callable: Handler,
    pub(crate) delegation_selector: Option<String>,
    pub(crate) one_off: bool,
    /// Registered as mouseenter/mouseleave
    pub(crate) boundary_guard: bool,
}

impl Subscription {
    fn is(&self, handler: &Handler, selector: Option<&str>) -> bool {
        self.callable.ptr_eq(handler) && self.delegation_selector.as_deref() == selector
    }
}

fn custom_alias(base: &str) -> Option<&'static str> {
    match base {
        "mouseenter" => Some("mouseover"),
        "mouseleave" => Some("mouseout"),
        _ => None,
    }
}

/// Event name without namespace
fn strip_namespace(event_type: &str) -> &str {
    event_type.split('.').next().unwrap_or_default()
}

/// Namespace part of `type.ns.more` (empty when there is none)
fn namespace_of(event_type: &str) -> &str {
    event_type.split_once('.').map_or("", |(_, ns)| ns)
}

/// Key a registration is stored and dispatched under: the native base
/// name for platform events, the full string for everything else
pub(crate) fn type_event(original: &str) -> String {
    let base = strip_namespace(original);
    let base = custom_alias(base).unwrap_or(base);
    if is_native(base) {
        base.to_string()
    } else {
        original.to_string()
    }
}

/// All subscriptions, per element then per type, in registration order
#[derive(Debug, Default)]
pub struct EventRegistry {
    elements: HashMap<NodeId, HashMap<String, Vec<Subscription>>>,
    uid_counter: u64,
}

impl EventRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. Returns false when nothing was added (invalid
    /// input or the same handler/selector pair already listening).
    pub(crate) fn add(
        &mut self,
        element: NodeId,
        original_type: &str,
        handler: Handler,
        selector: Option<&str>,
        one_off: bool,
    ) -> bool {
        if !element.is_valid() || original_type.is_empty() {
            return false;
        }
        let key = type_event(original_type);
        let boundary_guard = custom_alias(strip_namespace(original_type)).is_some();
        let handlers = self
            .elements
            .entry(element)
            .or_default()
            .entry(key)
            .or_default();

        if let Some(previous) = handlers.iter_mut().find(|s| s.is(&handler, selector)) {
            previous.one_off = previous.one_off && one_off;
            return false;
        }

        self.uid_counter += 1;
        let namespace = namespace_of(original_type).to_string();
        let uid = if namespace.is_empty() {
            self.uid_counter.to_string()
        } else {
            format!("{namespace}::{}", self.uid_counter)
        };
        handlers.push(Subscription {
            uid,
            namespace,
            callable: handler,
            delegation_selector: selector.map(str::to_string),
            one_off,
            boundary_guard,
        });
        true
    }

    /// Remove listeners.
    ///
    /// - With a handler: only that (handler, selector) pair.
    /// - `.ns`: every subscription on the element whose id contains `ns`.
    /// - `type.ns`: subscriptions of `type` registered under that namespace.
    /// - `type`: every subscription of `type`.
    pub(crate) fn off(
        &mut self,
        element: NodeId,
        original_type: &str,
        handler: Option<&Handler>,
        selector: Option<&str>,
    ) {
        if !element.is_valid() || original_type.is_empty() {
            return;
        }
        let key = type_event(original_type);
        let in_namespace = key != original_type;
        let is_namespace = original_type.starts_with('.');

        if let Some(handler) = handler {
            self.remove_handler(element, &key, handler, selector);
            return;
        }

        if is_namespace {
            let namespace = &original_type[1..];
            let types: Vec<String> = self
                .elements
                .get(&element)
                .map(|m| m.keys().cloned().collect())
                .unwrap_or_default();
            for event_type in types {
                self.remove_namespaced(element, &event_type, namespace);
            }
        }

        let Some(subscriptions) = self.elements.get_mut(&element).and_then(|m| m.get_mut(&key))
        else {
            return;
        };
        subscriptions.retain(|s| {
            let matches = !in_namespace || (!s.namespace.is_empty() && original_type.contains(&s.namespace));
            !matches
        });
        self.prune(element, &key);
    }

    fn remove_namespaced(&mut self, element: NodeId, event_type: &str, namespace: &str) {
        if let Some(subscriptions) = self
            .elements
            .get_mut(&element)
            .and_then(|m| m.get_mut(event_type))
        {
            subscriptions.retain(|s| !s.uid.contains(namespace));
        }
        self.prune(element, event_type);
    }

    pub(crate) fn remove_handler(
        &mut self,
        element: NodeId,
        key: &str,
        handler: &Handler,
        selector: Option<&str>,
    ) {
        if let Some(subscriptions) = self.elements.get_mut(&element).and_then(|m| m.get_mut(key)) {
            if let Some(pos) = subscriptions.iter().position(|s| s.is(handler, selector)) {
                subscriptions.remove(pos);
            }
        }
        self.prune(element, key);
    }

    fn prune(&mut self, element: NodeId, key: &str) {
        let Some(types) = self.elements.get_mut(&element) else {
            return;
        };
        if types.get(key).is_some_and(Vec::is_empty) {
            types.remove(key);
        }
        if types.is_empty() {
            self.elements.remove(&element);
        }
    }

    /// Snapshot of listeners for one dispatch step
    pub(crate) fn snapshot(&self, element: NodeId, key: &str) -> Vec<Subscription> {
        self.elements
            .get(&element)
            .and_then(|m| m.get(key))
            .cloned()
            .unwrap_or_default()
    }

    /// Still registered (not removed earlier in the same dispatch)
    pub(crate) fn is_live(&self, element: NodeId, key: &str, uid: &str) -> bool {
        self.elements
            .get(&element)
            .and_then(|m| m.get(key))
            .is_some_and(|subs| subs.iter().any(|s| s.uid == uid))
    }

    /// Subscription ids on an element for a type, in registration order
    pub fn uids(&self, element: NodeId, event_type: &str) -> Vec<String> {
        self.snapshot(element, &type_event(event_type))
            .into_iter()
            .map(|s| s.uid)
            .collect()
    }

    /// Total subscriptions on an element
    pub fn count(&self, element: NodeId) -> usize {
        self.elements
            .get(&element)
            .map_or(0, |m| m.values().map(Vec::len).sum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> Handler {
        Handler::new(|_, _| {})
    }

    #[test]
    fn test_type_event_normalization() {
        assert_eq!(type_event("click.bs.modal"), "click");
        assert_eq!(type_event("mouseenter.bs.tooltip"), "mouseover");
        assert_eq!(type_event("show.bs.modal"), "show.bs.modal");
        assert_eq!(type_event(".bs.modal"), ".bs.modal");
        assert_eq!(namespace_of("keydown.tab.bs.focustrap"), "tab.bs.focustrap");
        assert_eq!(namespace_of("click"), "");
    }

    #[test]
    fn test_uids_carry_namespace() {
        let mut registry = EventRegistry::new();
        let el = NodeId::ROOT;
        registry.add(el, "click.bs.alert", noop(), None, false);
        registry.add(el, "click", noop(), None, false);
        let uids = registry.uids(el, "click");
        assert!(uids[0].starts_with("bs.alert::"));
        assert!(!uids[1].contains("::"));
    }

    #[test]
    fn test_duplicate_registration_ignored() {
        let mut registry = EventRegistry::new();
        let handler = noop();
        assert!(registry.add(NodeId::ROOT, "click.a", handler.clone(), None, true));
        assert!(!registry.add(NodeId::ROOT, "click.a", handler.clone(), None, false));
        assert_eq!(registry.count(NodeId::ROOT), 1);
        assert!(!registry.snapshot(NodeId::ROOT, "click")[0].one_off);

        assert!(registry.add(NodeId::ROOT, "click.a", handler, Some(".item"), false));
        assert_eq!(registry.count(NodeId::ROOT), 2);
    }

    #[test]
    fn test_off_by_namespace_only() {
        let mut registry = EventRegistry::new();
        let el = NodeId::ROOT;
        registry.add(el, "click.myns", noop(), None, false);
        registry.add(el, "click.other", noop(), None, false);
        registry.add(el, "keydown.myns", noop(), None, false);

        registry.off(el, ".myns", None, None);
        let remaining = registry.uids(el, "click");
        assert_eq!(remaining.len(), 1);
        assert!(remaining[0].starts_with("other::"));
        assert!(registry.uids(el, "keydown").is_empty());
    }

    #[test]
    fn test_off_bare_type_removes_all_of_type() {
        let mut registry = EventRegistry::new();
        let el = NodeId::ROOT;
        registry.add(el, "click.a", noop(), None, false);
        registry.add(el, "click", noop(), None, false);
        registry.add(el, "keyup.a", noop(), None, false);

        registry.off(el, "click", None, None);
        assert!(registry.uids(el, "click").is_empty());
        assert_eq!(registry.uids(el, "keyup").len(), 1);
    }

    #[test]
    fn test_off_namespaced_type_limited_to_namespace() {
        let mut registry = EventRegistry::new();
        let el = NodeId::ROOT;
        registry.add(el, "click.bs.modal", noop(), None, false);
        registry.add(el, "click.bs.toast", noop(), None, false);
        registry.add(el, "click", noop(), None, false);

        registry.off(el, "click.bs.modal", None, None);
        let remaining = registry.uids(el, "click");
        assert_eq!(remaining.len(), 2);
        assert!(remaining.iter().all(|uid| !uid.starts_with("bs.modal")));
    }

    #[test]
    fn test_off_specific_handler_and_selector() {
        let mut registry = EventRegistry::new();
        let el = NodeId::ROOT;
        let handler = noop();
        registry.add(el, "click.x", handler.clone(), None, false);
        registry.add(el, "click.x", handler.clone(), Some(".btn"), false);

        registry.off(el, "click", Some(&handler), Some(".btn"));
        assert_eq!(registry.count(el), 1);
        assert!(registry.snapshot(el, "click")[0].delegation_selector.is_none());
    }

    #[test]
    fn test_custom_events_keyed_by_full_name() {
        let mut registry = EventRegistry::new();
        let el = NodeId::ROOT;
        registry.add(el, "show.bs.modal", noop(), None, false);
        registry.add(el, "shown.bs.modal", noop(), None, false);
        registry.off(el, "show.bs.modal", None, None);
        assert!(registry.uids(el, "show.bs.modal").is_empty());
        assert_eq!(registry.uids(el, "shown.bs.modal").len(), 1);
    }

    #[test]
    fn test_invalid_input_is_noop() {
        let mut registry = EventRegistry::new();
        assert!(!registry.add(NodeId::NONE, "click", noop(), None, false));
        assert!(!registry.add(NodeId::ROOT, "", noop(), None, false));
        registry.off(NodeId::NONE, "click", None, None);
        assert_eq!(registry.count(NodeId::ROOT), 0);
    }
}
