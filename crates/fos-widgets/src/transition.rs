//! Transition completion
//!
//! Runs a callback once an element's CSS transition has finished. The
//! `transitionend` signal is honoured when it targets the element itself;
//! a fallback timer synthesizes it when the engine never does.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use fos_dom::{DomTree, NodeId};

use crate::dispatch::Handler;
use crate::event::{Event, TRANSITION_END};
use crate::Runtime;

/// Slack added to the computed duration before the fallback fires
pub const DURATION_PADDING_MS: u64 = 5;

/// Completion listener, kept out of every widget namespace
const COMPLETION_EVENT: &str = "transitionend.bs.transition";

/// Parse the first entry of a CSS time list (`"0.3s, 1s"`, `"150ms"`) into
/// milliseconds. Anything unparsable counts as zero.
pub fn parse_time_ms(value: &str) -> f64 {
    let first = value.split(',').next().unwrap_or_default().trim();
    let (number, scale) = if let Some(ms) = first.strip_suffix("ms") {
        (ms, 1.0)
    } else if let Some(s) = first.strip_suffix('s') {
        (s, 1000.0)
    } else {
        (first, 1000.0)
    };
    match number.trim().parse::<f64>() {
        Ok(n) if n.is_finite() && n > 0.0 => n * scale,
        _ => 0.0,
    }
}

/// Computed `transition-duration` plus `transition-delay`, in milliseconds.
/// Zero when the element has no duration and no delay.
pub fn transition_duration_ms(tree: &DomTree, element: NodeId) -> u64 {
    if !tree.is_element(element) {
        return 0;
    }
    let duration = parse_time_ms(&tree.computed_style(element, "transition-duration"));
    let delay = parse_time_ms(&tree.computed_style(element, "transition-delay"));
    if duration == 0.0 && delay == 0.0 {
        return 0;
    }
    (duration + delay).round() as u64
}

/// Force a style recalculation; nothing to do without a layout engine
pub fn reflow(_tree: &DomTree, _element: NodeId) {}

type Callback = Box<dyn FnOnce(&mut Runtime)>;

/// Run `callback` after the transition on `element` completes, or
/// immediately when `wait` is false.
pub fn execute_after_transition(
    rt: &mut Runtime,
    element: NodeId,
    wait: bool,
    callback: impl FnOnce(&mut Runtime) + 'static,
) {
    if !wait {
        callback(rt);
        return;
    }

    let emulated = transition_duration_ms(&rt.document, element) + DURATION_PADDING_MS;
    let called = Rc::new(Cell::new(false));
    let pending: Rc<RefCell<Option<Callback>>> = Rc::new(RefCell::new(Some(Box::new(callback))));
    let slot: Rc<RefCell<Option<Handler>>> = Rc::new(RefCell::new(None));

    let handler = {
        let called = called.clone();
        let slot = slot.clone();
        Handler::new(move |rt, event| {
            if event.target() != element {
                return;
            }
            called.set(true);
            if let Some(handler) = slot.borrow_mut().take() {
                rt.off_handler(element, COMPLETION_EVENT, &handler);
            }
            let callback = pending.borrow_mut().take();
            if let Some(callback) = callback {
                callback(rt);
            }
        })
    };
    *slot.borrow_mut() = Some(handler.clone());
    rt.on(element, COMPLETION_EVENT, handler);

    tracing::trace!("waiting {emulated}ms for transition on {element}");
    rt.set_timeout(emulated, move |rt| {
        if !called.get() {
            rt.dispatch_event(element, Event::native(TRANSITION_END, false, false));
        }
    });
}
