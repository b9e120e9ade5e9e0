//! Toggle button

use std::cell::RefCell;
use std::rc::Rc;

use fos_dom::NodeId;

use crate::bridge::Plugin;
use crate::component::{dispose_base, register, Component, Disposable};
use crate::config::Config;
use crate::dispatch::Handler;
use crate::registry::ComponentKind;
use crate::{Runtime, WidgetError};

const CLASS_NAME_ACTIVE: &str = "active";
const SELECTOR_DATA_TOGGLE: &str = "[data-bs-toggle=\"button\"]";
const EVENT_CLICK_DATA_API: &str = "click.bs.button.data-api";

crate::plugin_commands! {
    pub enum ButtonCommand {
        Toggle => "toggle",
        Dispose => "dispose",
    }
}

#[derive(Debug)]
pub struct ButtonState {
    element: NodeId,
}

/// Two-state push button
#[derive(Debug, Clone)]
pub struct Button(Rc<RefCell<ButtonState>>);

impl Component for Button {
    const KIND: ComponentKind = ComponentKind::Button;
    type State = ButtonState;

    fn from_inner(inner: Rc<RefCell<ButtonState>>) -> Self {
        Self(inner)
    }

    fn inner(&self) -> &Rc<RefCell<ButtonState>> {
        &self.0
    }

    fn construct(rt: &mut Runtime, element: NodeId, _config: Config) -> Result<Self, WidgetError> {
        let button = Self(Rc::new(RefCell::new(ButtonState { element })));
        register(rt, element, &button);
        Ok(button)
    }

    fn element(&self) -> NodeId {
        self.0.borrow().element
    }
}

impl Button {
    /// Flip `active` and mirror it into `aria-pressed`
    pub fn toggle(&self, rt: &mut Runtime) {
        let element = self.element();
        if !rt.document.is_element(element) {
            return;
        }
        let pressed = rt.document.toggle_class(element, CLASS_NAME_ACTIVE, None);
        rt.document
            .set_attribute(element, "aria-pressed", if pressed { "true" } else { "false" });
    }

    pub fn is_active(&self, rt: &Runtime) -> bool {
        rt.document.has_class(self.element(), CLASS_NAME_ACTIVE)
    }
}

impl Disposable for Button {
    fn dispose(&self, rt: &mut Runtime) {
        dispose_base(rt, self.element(), Self::KIND);
    }
}

impl Plugin for Button {
    type Command = ButtonCommand;

    fn execute(&self, rt: &mut Runtime, command: ButtonCommand) {
        match command {
            ButtonCommand::Toggle => self.toggle(rt),
            ButtonCommand::Dispose => self.dispose(rt),
        }
    }
}

pub fn install_data_api(rt: &mut Runtime) {
    rt.on_delegated(
        NodeId::ROOT,
        EVENT_CLICK_DATA_API,
        SELECTOR_DATA_TOGGLE,
        Handler::new(|rt, ev| {
            ev.prevent_default();
            let Some(button) = rt.document.closest(ev.target(), SELECTOR_DATA_TOGGLE) else {
                return;
            };
            match Button::get_or_create_instance(rt, button, Config::new()) {
                Ok(instance) => instance.toggle(rt),
                Err(err) => tracing::warn!("button toggle failed: {err}"),
            }
        }),
    );
}
