//! Widget runtime
//!
//! Owns the document and every piece of process-wide state the widgets
//! share: listener registry, timers, instance registry, the optional
//! placement engine and plugin bridge. All widget operations take
//! `&mut Runtime`.

use std::rc::Rc;

use fos_dom::{Document, NodeId};

use crate::bridge::PluginBridge;
use crate::dispatch::{type_event, EventRegistry, Handler};
use crate::event::Event;
use crate::placement::{PlacementEngine, PlacementHandle, PlacementOptions};
use crate::registry::InstanceRegistry;
use crate::timer::{Scheduler, TimerCallback, TimerId};
use crate::value::Value;

/// Single-threaded widget host
pub struct Runtime {
    /// The page
    pub document: Document,
    events: EventRegistry,
    scheduler: Scheduler,
    instances: InstanceRegistry,
    placement: Option<Box<dyn PlacementEngine>>,
    pub(crate) bridge: Option<PluginBridge>,
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("scheduler", &self.scheduler)
            .field("instances", &self.instances)
            .field("placement", &self.placement.is_some())
            .field("bridge", &self.bridge)
            .finish_non_exhaustive()
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

impl Runtime {
    /// Runtime over an empty page
    pub fn new() -> Self {
        Self::with_document(Document::new())
    }

    pub fn with_document(document: Document) -> Self {
        Self {
            document,
            events: EventRegistry::new(),
            scheduler: Scheduler::new(),
            instances: InstanceRegistry::new(),
            placement: None,
            bridge: None,
        }
    }

    pub fn events(&self) -> &EventRegistry {
        &self.events
    }

    pub fn instances(&self) -> &InstanceRegistry {
        &self.instances
    }

    pub fn instances_mut(&mut self) -> &mut InstanceRegistry {
        &mut self.instances
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    // ------------------------------------------------------------------
    // Subscriptions
    // ------------------------------------------------------------------

    /// Listen for `type[.namespace]` on `element`
    pub fn on(&mut self, element: NodeId, event_type: &str, handler: Handler) {
        self.events.add(element, event_type, handler, None, false);
    }

    /// Listen on `element` for events whose target sits inside a descendant
    /// matching `selector`
    pub fn on_delegated(&mut self, element: NodeId, event_type: &str, selector: &str, handler: Handler) {
        self.events.add(element, event_type, handler, Some(selector), false);
    }

    /// Like `on`, removed after the first call
    pub fn one(&mut self, element: NodeId, event_type: &str, handler: Handler) {
        self.events.add(element, event_type, handler, None, true);
    }

    pub fn one_delegated(&mut self, element: NodeId, event_type: &str, selector: &str, handler: Handler) {
        self.events.add(element, event_type, handler, Some(selector), true);
    }

    /// Remove by type and/or namespace (`"click"`, `"click.ns"`, `".ns"`)
    pub fn off(&mut self, element: NodeId, event_type: &str) {
        self.events.off(element, event_type, None, None);
    }

    /// Remove one direct listener
    pub fn off_handler(&mut self, element: NodeId, event_type: &str, handler: &Handler) {
        self.events.off(element, event_type, Some(handler), None);
    }

    /// Remove one delegated listener
    pub fn off_delegated(&mut self, element: NodeId, event_type: &str, selector: &str, handler: &Handler) {
        self.events.off(element, event_type, Some(handler), Some(selector));
    }

    // ------------------------------------------------------------------
    // Dispatch
    // ------------------------------------------------------------------

    /// Fire a bubbling, cancelable event carrying `data`. `None` when the
    /// element is not in the document arena or the type is empty.
    pub fn trigger(&mut self, element: NodeId, event_type: &str, data: &[(&str, Value)]) -> Option<Event> {
        if event_type.is_empty() || self.document.get(element).is_none() {
            return None;
        }
        let event = data
            .iter()
            .fold(Event::new(event_type), |ev, (k, v)| ev.with_data(k, v.clone()));
        Some(self.dispatch_event(element, event))
    }

    /// Deliver `event` to `target` and, if it bubbles, its ancestors.
    ///
    /// At every node subscriptions run in registration order. A delegated
    /// subscription runs when some node between the target and the
    /// listening node (exclusive) matches its selector; the nearest match
    /// becomes the delegate target.
    pub fn dispatch_event(&mut self, target: NodeId, mut event: Event) -> Event {
        event.target = target;
        event.path = std::iter::once(target)
            .chain(self.document.ancestors(target))
            .collect();
        let key = type_event(event.event_type());
        let path = if event.bubbles() {
            event.path.clone()
        } else {
            vec![target]
        };
        tracing::trace!("dispatch {} at {target} ({} nodes)", event.event_type(), path.len());

        for node in path {
            self.invoke_listeners(node, &key, &mut event);
            if event.propagation_stopped {
                break;
            }
        }
        event.current_target = NodeId::NONE;
        event
    }

    fn invoke_listeners(&mut self, node: NodeId, key: &str, event: &mut Event) {
        for sub in self.events.snapshot(node, key) {
            if !self.events.is_live(node, key, &sub.uid) {
                continue;
            }
            let delegate = match &sub.delegation_selector {
                Some(selector) => {
                    let matches = self.document.query_selector_all(node, selector);
                    let found = std::iter::once(event.target)
                        .chain(self.document.ancestors(event.target))
                        .take_while(|&n| n != node)
                        .find(|n| matches.contains(n));
                    match found {
                        Some(found) => found,
                        None => continue,
                    }
                }
                None => node,
            };

            if sub.boundary_guard {
                if let Some(related) = event.related_target() {
                    if related == delegate || self.document.contains(delegate, related) {
                        continue;
                    }
                }
            }

            event.current_target = node;
            event.delegate_target = delegate;
            if sub.one_off {
                self.events
                    .remove_handler(node, key, &sub.callable, sub.delegation_selector.as_deref());
            }
            sub.callable.call(self, event);
            if event.immediate_propagation_stopped {
                return;
            }
        }
    }

    // ------------------------------------------------------------------
    // User input
    // ------------------------------------------------------------------

    /// Move focus to `element`, firing blur/focusout then focus/focusin
    pub fn focus(&mut self, element: NodeId) {
        if !self.document.is_element(element) {
            return;
        }
        let previous = self.document.active_element();
        if previous == Some(element) {
            return;
        }
        self.document.set_active_element(Some(element));
        if let Some(previous) = previous {
            self.dispatch_event(previous, Event::native("blur", false, false).with_related_target(Some(element)));
            self.dispatch_event(previous, Event::native("focusout", true, false).with_related_target(Some(element)));
        }
        self.dispatch_event(element, Event::native("focus", false, false).with_related_target(previous));
        self.dispatch_event(element, Event::native("focusin", true, false).with_related_target(previous));
    }

    /// Drop focus back to the document
    pub fn blur(&mut self) {
        let Some(previous) = self.document.active_element() else {
            return;
        };
        self.document.set_active_element(None);
        self.dispatch_event(previous, Event::native("blur", false, false));
        self.dispatch_event(previous, Event::native("focusout", true, false));
    }

    /// Primary-button click
    pub fn click(&mut self, element: NodeId) -> Event {
        self.dispatch_event(element, Event::native("click", true, true))
    }

    pub fn mouse_down(&mut self, element: NodeId) -> Event {
        self.dispatch_event(element, Event::native("mousedown", true, true))
    }

    /// Pointer moves onto `element` from `from`
    pub fn mouse_over(&mut self, element: NodeId, from: Option<NodeId>) -> Event {
        self.dispatch_event(element, Event::native("mouseover", true, true).with_related_target(from))
    }

    /// Pointer leaves `element` towards `to`
    pub fn mouse_out(&mut self, element: NodeId, to: Option<NodeId>) -> Event {
        self.dispatch_event(element, Event::native("mouseout", true, true).with_related_target(to))
    }

    pub fn key_down(&mut self, element: NodeId, key: &str, shift_key: bool) -> Event {
        self.dispatch_event(element, Event::keyboard("keydown", key, shift_key))
    }

    pub fn key_up(&mut self, element: NodeId, key: &str) -> Event {
        self.dispatch_event(element, Event::keyboard("keyup", key, false))
    }

    /// Window `load`
    pub fn load(&mut self) {
        self.dispatch_event(NodeId::ROOT, Event::native("load", false, false));
    }

    /// Resize the window and fire `resize`
    pub fn resize(&mut self, inner_width: f64) {
        self.document.set_inner_width(inner_width);
        self.dispatch_event(NodeId::ROOT, Event::native("resize", false, false));
    }

    // ------------------------------------------------------------------
    // Timers
    // ------------------------------------------------------------------

    pub fn set_timeout(&mut self, delay_ms: u64, callback: impl FnOnce(&mut Runtime) + 'static) -> TimerId {
        self.scheduler.set_timeout(delay_ms, Box::new(callback))
    }

    pub fn set_interval(&mut self, period_ms: u64, callback: impl Fn(&mut Runtime) + 'static) -> TimerId {
        self.scheduler.set_interval(period_ms, Rc::new(callback))
    }

    pub fn clear_timeout(&mut self, id: TimerId) {
        self.scheduler.clear(id);
    }

    /// Current virtual time in milliseconds
    pub fn now(&self) -> u64 {
        self.scheduler.now()
    }

    /// Move the clock forward, running every timer that comes due,
    /// including ones scheduled by earlier callbacks in the same span
    pub fn advance(&mut self, ms: u64) {
        let until = self.scheduler.now() + ms;
        while let Some(callback) = self.scheduler.pop_due(until) {
            match callback {
                TimerCallback::Once(f) => f(self),
                TimerCallback::Repeat(f) => f(self),
            }
        }
        self.scheduler.settle(until);
    }

    // ------------------------------------------------------------------
    // Placement
    // ------------------------------------------------------------------

    pub fn set_placement_engine(&mut self, engine: impl PlacementEngine + 'static) {
        self.placement = Some(Box::new(engine));
    }

    pub fn has_placement_engine(&self) -> bool {
        self.placement.is_some()
    }

    /// Engine together with the document it positions against
    fn placement_parts(&mut self) -> Option<(&mut dyn PlacementEngine, &mut Document)> {
        let engine = self.placement.as_deref_mut()?;
        Some((engine, &mut self.document))
    }

    pub(crate) fn attach_placement(
        &mut self,
        reference: NodeId,
        floating: NodeId,
        options: &PlacementOptions,
    ) -> Option<PlacementHandle> {
        let (engine, doc) = self.placement_parts()?;
        Some(engine.attach(doc, reference, floating, options))
    }

    pub(crate) fn update_placement(&mut self, handle: PlacementHandle) {
        if let Some((engine, doc)) = self.placement_parts() {
            engine.update(doc, handle);
        }
    }

    pub(crate) fn detach_placement(&mut self, handle: PlacementHandle) {
        if let Some((engine, doc)) = self.placement_parts() {
            engine.detach(doc, handle);
        }
    }
}
