//! Event objects
//!
//! One struct serves both browser-style events (click, keydown, focusin)
//! and the widgets' namespaced lifecycle events (`show.bs.modal`). Extra
//! fields attached at trigger time are readable but never writable.

use std::collections::BTreeMap;

use fos_dom::NodeId;

use crate::value::Value;

/// Event names the platform itself would emit
pub const NATIVE_EVENTS: &[&str] = &[
    "click",
    "dblclick",
    "mouseup",
    "mousedown",
    "contextmenu",
    "mousewheel",
    "DOMMouseScroll",
    "mouseover",
    "mouseout",
    "mousemove",
    "selectstart",
    "selectend",
    "keydown",
    "keypress",
    "keyup",
    "orientationchange",
    "touchstart",
    "touchmove",
    "touchend",
    "touchcancel",
    "pointerdown",
    "pointermove",
    "pointerup",
    "pointerleave",
    "pointercancel",
    "gesturestart",
    "gesturechange",
    "gestureend",
    "focus",
    "blur",
    "change",
    "reset",
    "select",
    "submit",
    "focusin",
    "focusout",
    "load",
    "unload",
    "beforeunload",
    "resize",
    "move",
    "DOMContentLoaded",
    "readystatechange",
    "error",
    "abort",
    "scroll",
];

/// Completion signal of a CSS transition
pub const TRANSITION_END: &str = "transitionend";

/// Whether a bare event name is a platform event
pub fn is_native(event_type: &str) -> bool {
    NATIVE_EVENTS.contains(&event_type)
}

/// Native-style or synthetic custom event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Native,
    Custom,
}

/// Dispatched event
#[derive(Debug, Clone)]
pub struct Event {
    event_type: String,
    kind: EventKind,
    pub(crate) target: NodeId,
    pub(crate) current_target: NodeId,
    pub(crate) delegate_target: NodeId,
    related_target: Option<NodeId>,
    key: Option<String>,
    shift_key: bool,
    button: i16,
    bubbles: bool,
    cancelable: bool,
    default_prevented: bool,
    pub(crate) propagation_stopped: bool,
    pub(crate) immediate_propagation_stopped: bool,
    pub(crate) path: Vec<NodeId>,
    data: BTreeMap<String, Value>,
}

impl Event {
    /// Bubbling, cancelable event as produced by `trigger`
    pub fn new(event_type: &str) -> Self {
        let kind = if is_native(event_type) {
            EventKind::Native
        } else {
            EventKind::Custom
        };
        Self {
            event_type: event_type.to_string(),
            kind,
            target: NodeId::NONE,
            current_target: NodeId::NONE,
            delegate_target: NodeId::NONE,
            related_target: None,
            key: None,
            shift_key: false,
            button: 0,
            bubbles: true,
            cancelable: true,
            default_prevented: false,
            propagation_stopped: false,
            immediate_propagation_stopped: false,
            path: Vec::new(),
            data: BTreeMap::new(),
        }
    }

    /// Platform event with explicit flags
    pub fn native(event_type: &str, bubbles: bool, cancelable: bool) -> Self {
        Self {
            kind: EventKind::Native,
            bubbles,
            cancelable,
            ..Self::new(event_type)
        }
    }

    /// `keydown`/`keyup` carrying a key
    pub fn keyboard(event_type: &str, key: &str, shift_key: bool) -> Self {
        Self {
            key: Some(key.to_string()),
            shift_key,
            ..Self::native(event_type, true, true)
        }
    }

    pub fn with_related_target(mut self, related: Option<NodeId>) -> Self {
        self.related_target = related;
        self
    }

    pub fn with_button(mut self, button: i16) -> Self {
        self.button = button;
        self
    }

    /// Attach a read-only extra field. `relatedTarget` also fills the
    /// typed accessor.
    pub fn with_data(mut self, key: &str, value: Value) -> Self {
        if key == "relatedTarget" {
            self.related_target = value.as_element();
        }
        self.data.insert(key.to_string(), value);
        self
    }

    /// Full type string, namespace included for custom events
    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    pub fn target(&self) -> NodeId {
        self.target
    }

    /// Node whose listener is running
    pub fn current_target(&self) -> NodeId {
        self.current_target
    }

    /// Matched element for delegated listeners, else the listening node
    pub fn delegate_target(&self) -> NodeId {
        self.delegate_target
    }

    pub fn related_target(&self) -> Option<NodeId> {
        self.related_target
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn shift_key(&self) -> bool {
        self.shift_key
    }

    pub fn button(&self) -> i16 {
        self.button
    }

    pub fn bubbles(&self) -> bool {
        self.bubbles
    }

    pub fn cancelable(&self) -> bool {
        self.cancelable
    }

    /// Extra field by name
    pub fn data(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Nodes from target up to the document, fixed at dispatch time
    pub fn composed_path(&self) -> &[NodeId] {
        &self.path
    }

    pub fn prevent_default(&mut self) {
        if self.cancelable {
            self.default_prevented = true;
        }
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }

    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn stop_immediate_propagation(&mut self) {
        self.propagation_stopped = true;
        self.immediate_propagation_stopped = true;
    }
}
