//! Toast
//!
//! Lightweight notification. Hides itself after `delay` ms when `autohide`
//! is set; hovering or focusing the toast holds the timer off.

use std::cell::RefCell;
use std::rc::Rc;

use fos_dom::NodeId;

use crate::bridge::Plugin;
use crate::component::{
    bind, bind_once, dispose_base, emit, emit_allowed, enable_dismiss_trigger, register, resolve_config, Component,
    Disposable, Showable, TransitionState,
};
use crate::config::{Config, TypeTable};
use crate::event::Event;
use crate::registry::ComponentKind;
use crate::timer::TimerId;
use crate::transition::{execute_after_transition, reflow};
use crate::{Runtime, WidgetError};

const CLASS_NAME_FADE: &str = "fade";
const CLASS_NAME_HIDE: &str = "hide";
const CLASS_NAME_SHOW: &str = "show";
const CLASS_NAME_SHOWING: &str = "showing";

const EVENT_MOUSEOVER: &str = "mouseover.bs.toast";
const EVENT_MOUSEOUT: &str = "mouseout.bs.toast";
const EVENT_FOCUSIN: &str = "focusin.bs.toast";
const EVENT_FOCUSOUT: &str = "focusout.bs.toast";

const DEFAULT_TYPE: TypeTable = &[("animation", "boolean"), ("autohide", "boolean"), ("delay", "number")];

fn defaults() -> Config {
    Config::new()
        .with("animation", true)
        .with("autohide", true)
        .with("delay", 5000u32)
}

crate::plugin_commands! {
    pub enum ToastCommand {
        Show => "show",
        Hide => "hide",
        IsShown => "isShown",
        Dispose => "dispose",
    }
}

#[derive(Debug)]
pub struct ToastState {
    element: NodeId,
    config: Config,
    state: TransitionState,
    timeout: Option<TimerId>,
    has_mouse_interaction: bool,
    has_keyboard_interaction: bool,
}

/// Toast handle
#[derive(Debug, Clone)]
pub struct Toast(Rc<RefCell<ToastState>>);

impl Component for Toast {
    const KIND: ComponentKind = ComponentKind::Toast;
    type State = ToastState;

    fn from_inner(inner: Rc<RefCell<ToastState>>) -> Self {
        Self(inner)
    }

    fn inner(&self) -> &Rc<RefCell<ToastState>> {
        &self.0
    }

    fn construct(rt: &mut Runtime, element: NodeId, config: Config) -> Result<Self, WidgetError> {
        let config = resolve_config(rt, Self::KIND, element, defaults(), DEFAULT_TYPE, config, |_, _| {})?;
        let state = if rt.document.has_class(element, CLASS_NAME_SHOW) {
            TransitionState::Shown
        } else {
            TransitionState::Hidden
        };
        let toast = Self(Rc::new(RefCell::new(ToastState {
            element,
            config,
            state,
            timeout: None,
            has_mouse_interaction: false,
            has_keyboard_interaction: false,
        })));
        register(rt, element, &toast);
        toast.set_listeners(rt);
        Ok(toast)
    }

    fn element(&self) -> NodeId {
        self.0.borrow().element
    }
}

impl Toast {
    pub fn config(&self) -> Config {
        self.0.borrow().config.clone()
    }

    /// Whether an autohide timer is running
    pub fn has_pending_hide(&self) -> bool {
        self.0.borrow().timeout.is_some()
    }

    fn is_animated(&self) -> bool {
        self.0.borrow().config.flag("animation")
    }

    fn set_state(&self, state: TransitionState) {
        self.0.borrow_mut().state = state;
    }

    fn maybe_schedule_hide(&self, rt: &mut Runtime) {
        let delay = {
            let state = self.0.borrow();
            if !state.config.flag("autohide") || state.has_mouse_interaction || state.has_keyboard_interaction {
                return;
            }
            state.config.number("delay").unwrap_or_default().max(0.0) as u64
        };
        self.clear_timeout(rt);
        let id = rt.set_timeout(
            delay,
            bind_once(self, |toast: &Toast, rt| {
                toast.0.borrow_mut().timeout = None;
                toast.hide(rt);
            }),
        );
        self.0.borrow_mut().timeout = Some(id);
    }

    fn clear_timeout(&self, rt: &mut Runtime) {
        if let Some(id) = self.0.borrow_mut().timeout.take() {
            rt.clear_timeout(id);
        }
    }

    fn on_interaction(&self, rt: &mut Runtime, event: &Event, is_interacting: bool) {
        {
            let mut state = self.0.borrow_mut();
            match event.event_type() {
                "mouseover" | "mouseout" => state.has_mouse_interaction = is_interacting,
                "focusin" | "focusout" => state.has_keyboard_interaction = is_interacting,
                _ => {}
            }
        }
        if is_interacting {
            self.clear_timeout(rt);
            return;
        }
        let element = self.element();
        if let Some(next) = event.related_target() {
            if rt.document.contains(element, next) {
                return;
            }
        }
        self.maybe_schedule_hide(rt);
    }

    fn set_listeners(&self, rt: &mut Runtime) {
        let element = self.element();
        for (event, interacting) in [
            (EVENT_MOUSEOVER, true),
            (EVENT_MOUSEOUT, false),
            (EVENT_FOCUSIN, true),
            (EVENT_FOCUSOUT, false),
        ] {
            rt.on(
                element,
                event,
                bind(self, move |toast: &Toast, rt, ev| toast.on_interaction(rt, ev, interacting)),
            );
        }
    }
}

impl Showable for Toast {
    fn show(&self, rt: &mut Runtime) {
        if !self.state().can_show() {
            return;
        }
        let element = self.element();
        if !emit_allowed(rt, element, Self::KIND, "show", &[]) {
            return;
        }
        self.set_state(TransitionState::Showing);
        self.clear_timeout(rt);
        let animated = self.is_animated();
        if animated {
            rt.document.add_class(element, &[CLASS_NAME_FADE]);
        }
        rt.document.remove_class(element, &[CLASS_NAME_HIDE]);
        reflow(&rt.document, element);
        rt.document.add_class(element, &[CLASS_NAME_SHOW, CLASS_NAME_SHOWING]);

        let this = self.clone();
        execute_after_transition(rt, element, animated, move |rt| {
            rt.document.remove_class(element, &[CLASS_NAME_SHOWING]);
            this.set_state(TransitionState::Shown);
            emit(rt, element, Self::KIND, "shown", &[]);
            this.maybe_schedule_hide(rt);
        });
    }

    fn hide(&self, rt: &mut Runtime) {
        if !self.state().can_hide() {
            return;
        }
        let element = self.element();
        if !emit_allowed(rt, element, Self::KIND, "hide", &[]) {
            return;
        }
        self.set_state(TransitionState::Hiding);
        self.clear_timeout(rt);
        rt.document.add_class(element, &[CLASS_NAME_SHOWING]);

        let this = self.clone();
        execute_after_transition(rt, element, self.is_animated(), move |rt| {
            rt.document.add_class(element, &[CLASS_NAME_HIDE]);
            rt.document.remove_class(element, &[CLASS_NAME_SHOWING, CLASS_NAME_SHOW]);
            this.set_state(TransitionState::Hidden);
            emit(rt, element, Self::KIND, "hidden", &[]);
        });
    }

    fn state(&self) -> TransitionState {
        self.0.borrow().state
    }
}

impl Disposable for Toast {
    fn dispose(&self, rt: &mut Runtime) {
        self.clear_timeout(rt);
        let element = self.element();
        if self.is_shown() {
            rt.document.remove_class(element, &[CLASS_NAME_SHOW]);
        }
        dispose_base(rt, element, Self::KIND);
    }
}

impl Plugin for Toast {
    type Command = ToastCommand;

    fn execute(&self, rt: &mut Runtime, command: ToastCommand) {
        match command {
            ToastCommand::Show => self.show(rt),
            ToastCommand::Hide => self.hide(rt),
            ToastCommand::IsShown => {
                tracing::debug!("toast {} shown: {}", self.element(), self.is_shown());
            }
            ToastCommand::Dispose => self.dispose(rt),
        }
    }
}

pub fn install_data_api(rt: &mut Runtime) {
    enable_dismiss_trigger::<Toast>(rt, Toast::hide);
}
