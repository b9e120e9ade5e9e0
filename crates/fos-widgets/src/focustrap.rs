//! Focus trap
//!
//! Keeps keyboard focus inside an element while active. Focus landing
//! anywhere else is pulled back to the first focusable descendant, or the
//! last one when the user was tabbing backwards.

use std::cell::RefCell;
use std::rc::Rc;

use fos_dom::NodeId;

use crate::dispatch::Handler;
use crate::event::Event;
use crate::Runtime;

const EVENT_KEY: &str = ".bs.focustrap";
const EVENT_FOCUSIN: &str = "focusin.bs.focustrap";
const EVENT_KEYDOWN_TAB: &str = "keydown.tab.bs.focustrap";
const TAB_KEY: &str = "Tab";

/// Direction of the last Tab press
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TabDirection {
    #[default]
    Forward,
    Backward,
}

#[derive(Debug)]
struct FocusTrapState {
    trap_element: NodeId,
    autofocus: bool,
    active: bool,
    last_direction: TabDirection,
}

/// Focus trap handle
#[derive(Debug, Clone)]
pub struct FocusTrap(Rc<RefCell<FocusTrapState>>);

impl FocusTrap {
    pub fn new(trap_element: NodeId, autofocus: bool) -> Self {
        Self(Rc::new(RefCell::new(FocusTrapState {
            trap_element,
            autofocus,
            active: false,
            last_direction: TabDirection::Forward,
        })))
    }

    pub fn is_active(&self) -> bool {
        self.0.borrow().active
    }

    pub fn last_direction(&self) -> TabDirection {
        self.0.borrow().last_direction
    }

    pub fn activate(&self, rt: &mut Runtime) {
        let (trap, autofocus) = {
            let state = self.0.borrow();
            if state.active {
                return;
            }
            (state.trap_element, state.autofocus)
        };
        if autofocus {
            rt.focus(trap);
        }

        // another trap may still be listening
        rt.off(NodeId::ROOT, EVENT_KEY);
        let weak = Rc::downgrade(&self.0);
        rt.on(
            NodeId::ROOT,
            EVENT_FOCUSIN,
            Handler::new(move |rt, ev| {
                if let Some(state) = weak.upgrade() {
                    FocusTrap(state).handle_focusin(rt, ev);
                }
            }),
        );
        let weak = Rc::downgrade(&self.0);
        rt.on(
            NodeId::ROOT,
            EVENT_KEYDOWN_TAB,
            Handler::new(move |_, ev| {
                if let Some(state) = weak.upgrade() {
                    FocusTrap(state).handle_keydown(ev);
                }
            }),
        );
        self.0.borrow_mut().active = true;
        tracing::debug!("focus trapped in {trap}");
    }

    pub fn deactivate(&self, rt: &mut Runtime) {
        {
            let mut state = self.0.borrow_mut();
            if !state.active {
                return;
            }
            state.active = false;
        }
        rt.off(NodeId::ROOT, EVENT_KEY);
    }

    fn handle_focusin(&self, rt: &mut Runtime, event: &Event) {
        let (trap, direction) = {
            let state = self.0.borrow();
            (state.trap_element, state.last_direction)
        };
        let target = event.target();
        if target == NodeId::ROOT || rt.document.contains(trap, target) {
            return;
        }
        let elements = rt.document.focusable_children(trap);
        let next = match (direction, elements.first(), elements.last()) {
            (_, None, _) => trap,
            (TabDirection::Backward, _, Some(&last)) => last,
            (_, Some(&first), _) => first,
        };
        rt.focus(next);
    }

    fn handle_keydown(&self, event: &Event) {
        if event.key() != Some(TAB_KEY) {
            return;
        }
        self.0.borrow_mut().last_direction = if event.shift_key() {
            TabDirection::Backward
        } else {
            TabDirection::Forward
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dialog(rt: &mut Runtime) -> (NodeId, NodeId, NodeId, NodeId) {
        let body = rt.document.body();
        let outside = rt.document.create_element("button");
        let trap = rt.document.create_element("div");
        rt.document.set_attribute(trap, "tabindex", "-1");
        let first = rt.document.create_element("input");
        let last = rt.document.create_element("button");
        rt.document.append_child(body, outside);
        rt.document.append_child(body, trap);
        rt.document.append_child(trap, first);
        rt.document.append_child(trap, last);
        (outside, trap, first, last)
    }

    #[test]
    fn test_autofocus_and_redirect() {
        let mut rt = Runtime::new();
        let (outside, trap, first, last) = dialog(&mut rt);
        let focus_trap = FocusTrap::new(trap, true);
        focus_trap.activate(&mut rt);
        assert_eq!(rt.document.active_element(), Some(trap));

        rt.focus(outside);
        assert_eq!(rt.document.active_element(), Some(first));

        rt.key_down(first, "Tab", true);
        assert_eq!(focus_trap.last_direction(), TabDirection::Backward);
        rt.focus(outside);
        assert_eq!(rt.document.active_element(), Some(last));
    }

    #[test]
    fn test_empty_trap_focuses_itself() {
        let mut rt = Runtime::new();
        let body = rt.document.body();
        let outside = rt.document.create_element("button");
        let trap = rt.document.create_element("div");
        rt.document.append_child(body, outside);
        rt.document.append_child(body, trap);

        let focus_trap = FocusTrap::new(trap, false);
        focus_trap.activate(&mut rt);
        assert_eq!(rt.document.active_element(), None);
        rt.focus(outside);
        assert_eq!(rt.document.active_element(), Some(trap));
    }

    #[test]
    fn test_deactivate_releases_focus() {
        let mut rt = Runtime::new();
        let (outside, trap, _, _) = dialog(&mut rt);
        let focus_trap = FocusTrap::new(trap, false);
        focus_trap.activate(&mut rt);
        focus_trap.activate(&mut rt);
        assert_eq!(rt.events().count(NodeId::ROOT), 2);

        focus_trap.deactivate(&mut rt);
        focus_trap.deactivate(&mut rt);
        assert!(!focus_trap.is_active());
        assert_eq!(rt.events().count(NodeId::ROOT), 0);
        rt.focus(outside);
        assert_eq!(rt.document.active_element(), Some(outside));
    }
}
