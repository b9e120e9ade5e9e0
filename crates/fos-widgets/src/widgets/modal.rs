//! Modal dialog
//!
//! Shows a dialog above a backdrop, locks page scrolling with scrollbar
//! compensation and traps focus until hidden. Escape and backdrop clicks
//! close it unless configured otherwise; a `static` backdrop answers with a
//! short bounce and a `hidePrevented` event instead.

use std::cell::RefCell;
use std::rc::Rc;

use fos_dom::NodeId;

use crate::backdrop::{Backdrop, BackdropConfig};
use crate::bridge::Plugin;
use crate::component::{
    bind, dispose_base, emit, emit_allowed, enable_dismiss_trigger, get_element_from_selector, is_link, register,
    resolve_config, Component, Disposable, Showable, TransitionState,
};
use crate::config::{Config, TypeTable};
use crate::dispatch::Handler;
use crate::focustrap::FocusTrap;
use crate::registry::ComponentKind;
use crate::scrollbar::ScrollBarHelper;
use crate::transition::{execute_after_transition, reflow};
use crate::value::Value;
use crate::{Runtime, WidgetError};

const ESCAPE_KEY: &str = "Escape";

const EVENT_KEYDOWN_DISMISS: &str = "keydown.dismiss.bs.modal";
const EVENT_MOUSEDOWN_DISMISS: &str = "mousedown.dismiss.bs.modal";
const EVENT_CLICK_DISMISS: &str = "click.dismiss.bs.modal";
const EVENT_RESIZE: &str = "resize.bs.modal";
const EVENT_CLICK_DATA_API: &str = "click.bs.modal.data-api";

const CLASS_NAME_OPEN: &str = "modal-open";
const CLASS_NAME_FADE: &str = "fade";
const CLASS_NAME_SHOW: &str = "show";
const CLASS_NAME_STATIC: &str = "modal-static";

const OPEN_SELECTOR: &str = ".modal.show";
const SELECTOR_DIALOG: &str = ".modal-dialog";
const SELECTOR_DATA_TOGGLE: &str = "[data-bs-toggle=\"modal\"]";

const DEFAULT_TYPE: TypeTable = &[
    ("backdrop", "(boolean|string)"),
    ("focus", "boolean"),
    ("keyboard", "boolean"),
];

fn defaults() -> Config {
    Config::new()
        .with("backdrop", true)
        .with("focus", true)
        .with("keyboard", true)
}

crate::plugin_commands! {
    pub enum ModalCommand {
        Show => "show",
        Hide => "hide",
        Toggle => "toggle",
        HandleUpdate => "handleUpdate",
        Dispose => "dispose",
    }
}

/// How the backdrop behaves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackdropMode {
    /// No backdrop; outside clicks are ignored
    None,
    /// Clicking outside the dialog closes the modal
    Dismissible,
    /// Clicking outside bounces the dialog instead
    Static,
}

impl BackdropMode {
    fn from_value(value: Option<&Value>) -> Self {
        match value {
            Some(Value::String(s)) if s == "static" => Self::Static,
            Some(v) if v.is_truthy() => Self::Dismissible,
            _ => Self::None,
        }
    }
}

#[derive(Debug)]
pub struct ModalState {
    element: NodeId,
    config: Config,
    dialog: Option<NodeId>,
    backdrop: Backdrop,
    focustrap: FocusTrap,
    scroll_bar: ScrollBarHelper,
    state: TransitionState,
    resize_handler: Option<Handler>,
}

/// Modal handle
#[derive(Debug, Clone)]
pub struct Modal(Rc<RefCell<ModalState>>);

impl Component for Modal {
    const KIND: ComponentKind = ComponentKind::Modal;
    type State = ModalState;

    fn from_inner(inner: Rc<RefCell<ModalState>>) -> Self {
        Self(inner)
    }

    fn inner(&self) -> &Rc<RefCell<ModalState>> {
        &self.0
    }

    fn construct(rt: &mut Runtime, element: NodeId, config: Config) -> Result<Self, WidgetError> {
        let config = resolve_config(rt, Self::KIND, element, defaults(), DEFAULT_TYPE, config, |_, _| {})?;
        let animated = rt.document.has_class(element, CLASS_NAME_FADE);
        let backdrop = Backdrop::new(BackdropConfig {
            is_visible: config.flag("backdrop"),
            is_animated: animated,
            ..Default::default()
        });
        let modal = Self(Rc::new(RefCell::new(ModalState {
            element,
            dialog: rt.document.query_selector(element, SELECTOR_DIALOG),
            config,
            backdrop,
            focustrap: FocusTrap::new(element, true),
            scroll_bar: ScrollBarHelper::new(),
            state: TransitionState::Hidden,
            resize_handler: None,
        })));
        register(rt, element, &modal);
        modal.add_event_listeners(rt);
        Ok(modal)
    }

    fn element(&self) -> NodeId {
        self.0.borrow().element
    }
}

impl Modal {
    pub fn config(&self) -> Config {
        self.0.borrow().config.clone()
    }

    pub fn backdrop_mode(&self) -> BackdropMode {
        BackdropMode::from_value(self.0.borrow().config.get("backdrop"))
    }

    /// The overlay helper; its element exists once shown
    pub fn backdrop(&self) -> Backdrop {
        self.0.borrow().backdrop.clone()
    }

    pub fn focus_trap(&self) -> FocusTrap {
        self.0.borrow().focustrap.clone()
    }

    /// Element transitions are timed on: the dialog when present
    fn dialog(&self) -> NodeId {
        let state = self.0.borrow();
        state.dialog.unwrap_or(state.element)
    }

    fn is_animated(&self, rt: &Runtime) -> bool {
        rt.document.has_class(self.element(), CLASS_NAME_FADE)
    }

    fn set_state(&self, state: TransitionState) {
        self.0.borrow_mut().state = state;
    }

    /// Show, recording `related_target` (usually the trigger) on the events
    pub fn show_for(&self, rt: &mut Runtime, related_target: Option<NodeId>) {
        if !self.state().can_show() {
            return;
        }
        let element = self.element();
        let related = [("relatedTarget", Value::from(related_target))];
        if !emit_allowed(rt, element, Self::KIND, "show", &related) {
            return;
        }
        self.set_state(TransitionState::Showing);
        tracing::debug!("modal {element} showing");

        let scroll_bar = self.0.borrow().scroll_bar;
        scroll_bar.hide(&mut rt.document);
        let body = rt.document.body();
        rt.document.add_class(body, &[CLASS_NAME_OPEN]);
        self.adjust_dialog(rt);

        let this = self.clone();
        self.backdrop()
            .show(rt, move |rt| this.show_element(rt, related_target));
    }

    pub fn toggle_for(&self, rt: &mut Runtime, related_target: Option<NodeId>) {
        if self.is_shown() {
            self.hide(rt);
        } else {
            self.show_for(rt, related_target);
        }
    }

    /// Re-apply dialog padding after the page layout changed
    pub fn handle_update(&self, rt: &mut Runtime) {
        self.adjust_dialog(rt);
    }

    fn show_element(&self, rt: &mut Runtime, related_target: Option<NodeId>) {
        let element = self.element();
        let body = rt.document.body();
        if !rt.document.contains(body, element) {
            rt.document.append_child(body, element);
        }
        rt.document.set_style(element, "display", "block");
        rt.document.remove_attribute(element, "aria-hidden");
        rt.document.set_attribute(element, "aria-modal", "true");
        rt.document.set_attribute(element, "role", "dialog");
        reflow(&rt.document, element);
        rt.document.add_class(element, &[CLASS_NAME_SHOW]);

        let this = self.clone();
        let animated = self.is_animated(rt);
        execute_after_transition(rt, self.dialog(), animated, move |rt| {
            if this.0.borrow().config.flag("focus") {
                this.focus_trap().activate(rt);
            }
            this.set_state(TransitionState::Shown);
            let related = [("relatedTarget", Value::from(related_target))];
            emit(rt, element, Self::KIND, "shown", &related);
        });
    }

    fn hide_modal(&self, rt: &mut Runtime) {
        let element = self.element();
        rt.document.set_style(element, "display", "none");
        rt.document.set_attribute(element, "aria-hidden", "true");
        rt.document.remove_attribute(element, "aria-modal");
        rt.document.remove_attribute(element, "role");
        self.set_state(TransitionState::Hidden);

        let this = self.clone();
        self.backdrop().hide(rt, move |rt| {
            let body = rt.document.body();
            rt.document.remove_class(body, &[CLASS_NAME_OPEN]);
            this.reset_adjustments(rt);
            let scroll_bar = this.0.borrow().scroll_bar;
            scroll_bar.reset(&mut rt.document);
            tracing::debug!("modal {element} hidden");
            emit(rt, element, Self::KIND, "hidden", &[]);
        });
    }

    fn add_event_listeners(&self, rt: &mut Runtime) {
        let element = self.element();
        rt.on(
            element,
            EVENT_KEYDOWN_DISMISS,
            bind(self, |modal: &Modal, rt, ev| {
                if ev.key() != Some(ESCAPE_KEY) {
                    return;
                }
                if modal.0.borrow().config.flag("keyboard") {
                    modal.hide(rt);
                    return;
                }
                modal.trigger_backdrop_transition(rt);
            }),
        );

        let resize = bind(self, |modal: &Modal, rt, _| {
            if modal.state() == TransitionState::Shown {
                modal.adjust_dialog(rt);
            }
        });
        rt.on(NodeId::ROOT, EVENT_RESIZE, resize.clone());
        self.0.borrow_mut().resize_handler = Some(resize);

        rt.on(
            element,
            EVENT_MOUSEDOWN_DISMISS,
            bind(self, |modal: &Modal, rt, mousedown| {
                let pressed_on = mousedown.target();
                let element = modal.element();
                rt.one(
                    element,
                    EVENT_CLICK_DISMISS,
                    bind(modal, move |modal: &Modal, rt, click| {
                        let element = modal.element();
                        if pressed_on != element || click.target() != element {
                            return;
                        }
                        match modal.backdrop_mode() {
                            BackdropMode::Static => modal.trigger_backdrop_transition(rt),
                            BackdropMode::Dismissible => modal.hide(rt),
                            BackdropMode::None => {}
                        }
                    }),
                );
            }),
        );
    }

    /// Bounce the dialog instead of closing
    fn trigger_backdrop_transition(&self, rt: &mut Runtime) {
        let element = self.element();
        if !emit_allowed(rt, element, Self::KIND, "hidePrevented", &[]) {
            return;
        }
        let overflowing = rt.document.metrics(element).scroll_height > rt.document.client_height();
        let initial_overflow_y = rt
            .document
            .style(element)
            .map(|s| s.get_property_value("overflow-y").to_string())
            .unwrap_or_default();
        if initial_overflow_y == "hidden" || rt.document.has_class(element, CLASS_NAME_STATIC) {
            return;
        }
        if !overflowing {
            rt.document.set_style(element, "overflow-y", "hidden");
        }
        rt.document.add_class(element, &[CLASS_NAME_STATIC]);

        let dialog = self.dialog();
        execute_after_transition(rt, dialog, true, move |rt| {
            rt.document.remove_class(element, &[CLASS_NAME_STATIC]);
            execute_after_transition(rt, dialog, true, move |rt| {
                rt.document.set_style(element, "overflow-y", &initial_overflow_y);
            });
        });
        rt.focus(element);
    }

    fn adjust_dialog(&self, rt: &mut Runtime) {
        let element = self.element();
        let modal_overflowing = rt.document.metrics(element).scroll_height > rt.document.client_height();
        let scrollbar_width = self.0.borrow().scroll_bar.width(&rt.document);
        let body_overflowing = scrollbar_width > 0.0;
        let padding = format!("{scrollbar_width}px");
        if body_overflowing && !modal_overflowing {
            rt.document.set_style(element, "padding-right", &padding);
        }
        if !body_overflowing && modal_overflowing {
            rt.document.set_style(element, "padding-left", &padding);
        }
    }

    fn reset_adjustments(&self, rt: &mut Runtime) {
        let element = self.element();
        rt.document.remove_style(element, "padding-left");
        rt.document.remove_style(element, "padding-right");
    }
}

impl Showable for Modal {
    fn show(&self, rt: &mut Runtime) {
        self.show_for(rt, None);
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
        tracing::debug!("modal {element} hiding");
        self.focus_trap().deactivate(rt);
        rt.document.remove_class(element, &[CLASS_NAME_SHOW]);
        let this = self.clone();
        let animated = self.is_animated(rt);
        execute_after_transition(rt, element, animated, move |rt| this.hide_modal(rt));
    }

    fn state(&self) -> TransitionState {
        self.0.borrow().state
    }
}

impl Disposable for Modal {
    fn dispose(&self, rt: &mut Runtime) {
        let (element, dialog, resize) = {
            let mut state = self.0.borrow_mut();
            (state.element, state.dialog, state.resize_handler.take())
        };
        if let Some(resize) = resize {
            rt.off_handler(NodeId::ROOT, EVENT_RESIZE, &resize);
        }
        if let Some(dialog) = dialog {
            rt.off(dialog, &Self::KIND.event_key());
        }
        self.backdrop().dispose(rt);
        self.focus_trap().deactivate(rt);
        dispose_base(rt, element, Self::KIND);
    }
}

impl Plugin for Modal {
    type Command = ModalCommand;

    fn execute(&self, rt: &mut Runtime, command: ModalCommand) {
        match command {
            ModalCommand::Show => self.show(rt),
            ModalCommand::Hide => self.hide(rt),
            ModalCommand::Toggle => self.toggle(rt),
            ModalCommand::HandleUpdate => self.handle_update(rt),
            ModalCommand::Dispose => self.dispose(rt),
        }
    }
}

/// Triggers open the modal they target; focus returns to the trigger once
/// the modal is hidden again
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
            let Some(target) = get_element_from_selector(rt, trigger) else {
                tracing::warn!("modal trigger {trigger} has no target");
                return;
            };

            rt.one(
                target,
                &Modal::KIND.event_name("show"),
                Handler::new(move |rt, show| {
                    if show.default_prevented() {
                        return;
                    }
                    rt.one(
                        target,
                        &Modal::KIND.event_name("hidden"),
                        Handler::new(move |rt, _| {
                            if rt.document.is_visible(trigger) {
                                rt.focus(trigger);
                            }
                        }),
                    );
                }),
            );

            if let Some(open) = rt.document.query_selector(NodeId::ROOT, OPEN_SELECTOR) {
                if let Some(open) = Modal::get_instance(rt, open) {
                    open.hide(rt);
                }
            }
            match Modal::get_or_create_instance(rt, target, Config::new()) {
                Ok(modal) => modal.toggle_for(rt, Some(trigger)),
                Err(err) => tracing::warn!("modal {target}: {err}"),
            }
        }),
    );
    enable_dismiss_trigger::<Modal>(rt, Modal::hide);
}
