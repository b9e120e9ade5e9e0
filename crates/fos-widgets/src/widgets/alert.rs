//! Alert
//!
//! Dismissible message box. `close` fades the alert out and removes it from
//! the page.

use std::cell::RefCell;
use std::rc::Rc;

use fos_dom::NodeId;

use crate::bridge::Plugin;
use crate::component::{dispose_base, emit, emit_allowed, enable_dismiss_trigger, register, Component, Disposable};
use crate::config::Config;
use crate::registry::ComponentKind;
use crate::transition::execute_after_transition;
use crate::{Runtime, WidgetError};

const CLASS_NAME_FADE: &str = "fade";
const CLASS_NAME_SHOW: &str = "show";

crate::plugin_commands! {
    /// Alert methods reachable by name
    pub enum AlertCommand {
        Close => "close",
        Dispose => "dispose",
    }
}

#[derive(Debug)]
pub struct AlertState {
    element: NodeId,
}

/// Alert handle
#[derive(Debug, Clone)]
pub struct Alert(Rc<RefCell<AlertState>>);

impl Component for Alert {
    const KIND: ComponentKind = ComponentKind::Alert;
    type State = AlertState;

    fn from_inner(inner: Rc<RefCell<AlertState>>) -> Self {
        Self(inner)
    }

    fn inner(&self) -> &Rc<RefCell<AlertState>> {
        &self.0
    }

    fn construct(rt: &mut Runtime, element: NodeId, _config: Config) -> Result<Self, WidgetError> {
        let alert = Self(Rc::new(RefCell::new(AlertState { element })));
        register(rt, element, &alert);
        Ok(alert)
    }

    fn element(&self) -> NodeId {
        self.0.borrow().element
    }
}

impl Alert {
    /// Fire `close`, fade out, detach, then fire `closed` and dispose
    pub fn close(&self, rt: &mut Runtime) {
        let element = self.element();
        if !emit_allowed(rt, element, Self::KIND, "close", &[]) {
            return;
        }
        rt.document.remove_class(element, &[CLASS_NAME_SHOW]);
        let animated = rt.document.has_class(element, CLASS_NAME_FADE);
        let this = self.clone();
        execute_after_transition(rt, element, animated, move |rt| this.destroy_element(rt));
    }

    fn destroy_element(&self, rt: &mut Runtime) {
        let element = self.element();
        rt.document.remove(element);
        emit(rt, element, Self::KIND, "closed", &[]);
        self.dispose(rt);
    }
}

impl Disposable for Alert {
    fn dispose(&self, rt: &mut Runtime) {
        dispose_base(rt, self.element(), Self::KIND);
    }
}

impl Plugin for Alert {
    type Command = AlertCommand;

    fn execute(&self, rt: &mut Runtime, command: AlertCommand) {
        match command {
            AlertCommand::Close => self.close(rt),
            AlertCommand::Dispose => self.dispose(rt),
        }
    }
}

/// `[data-bs-dismiss="alert"]` closes the enclosing `.alert`
pub fn install_data_api(rt: &mut Runtime) {
    enable_dismiss_trigger::<Alert>(rt, Alert::close);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::Handler;
    use std::cell::Cell;

    fn alert_page(rt: &mut Runtime) -> (NodeId, NodeId) {
        let body = rt.document.body();
        let alert = rt.document.create_element("div");
        rt.document.set_attribute(alert, "class", "alert fade show");
        let button = rt.document.create_element("button");
        rt.document.set_attribute(button, "data-bs-dismiss", "alert");
        rt.document.append_child(body, alert);
        rt.document.append_child(alert, button);
        (alert, button)
    }

    #[test]
    fn test_dismiss_button_closes_alert() {
        let mut rt = Runtime::new();
        install_data_api(&mut rt);
        let (alert, button) = alert_page(&mut rt);
        let closed = Rc::new(Cell::new(false));
        let c = closed.clone();
        rt.on(alert, "closed.bs.alert", Handler::new(move |_, _| c.set(true)));

        rt.click(button);
        assert!(!rt.document.has_class(alert, "show"));
        assert!(rt.document.is_connected(alert));
        rt.advance(10);
        assert!(!rt.document.is_connected(alert));
        assert!(closed.get());
        assert!(Alert::get_instance(&rt, alert).is_none());
    }

    #[test]
    fn test_close_prevented() {
        let mut rt = Runtime::new();
        let (alert, _) = alert_page(&mut rt);
        rt.on(alert, "close.bs.alert", Handler::new(|_, ev| ev.prevent_default()));
        let instance = Alert::get_or_create_instance(&mut rt, alert, Config::new()).unwrap();
        instance.close(&mut rt);
        rt.advance(100);
        assert!(rt.document.has_class(alert, "show"));
        assert!(rt.document.is_connected(alert));
    }
}
