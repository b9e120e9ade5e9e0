//! Tooltip
//!
//! Floating label attached to an element and positioned by the placement
//! engine. The tip element is built from `template` on first show and
//! removed again once hidden. Hover and focus triggers feed a small
//! enter/leave state machine with optional delays; `click` toggles.
//!
//! Popovers share all of this through [`TipWidget`] and only swap the
//! template and what is written into it.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use fos_dom::NodeId;

use crate::bridge::Plugin;
use crate::component::{
    bind, bind_once, dispose_base, emit, emit_allowed, get_element, register, resolve_config, Component, Disposable,
    Showable, TransitionState,
};
use crate::config::{Config, TypeTable};
use crate::dispatch::Handler;
use crate::event::Event;
use crate::placement::{
    apply_popper_config, boundary_from_value, offset_from_value, PlacementHandle, PlacementOptions,
};
use crate::registry::ComponentKind;
use crate::timer::TimerId;
use crate::transition::execute_after_transition;
use crate::value::Value;
use crate::{Runtime, WidgetError};

const CLASS_NAME_FADE: &str = "fade";
const CLASS_NAME_SHOW: &str = "show";

const SELECTOR_TOOLTIP_INNER: &str = ".tooltip-inner";
const SELECTOR_MODAL: &str = ".modal";
const SELECTOR_DATA_TOGGLE: &str = "[data-bs-toggle=\"tooltip\"]";

const EVENT_MODAL_HIDE: &str = "hide.bs.modal";
const EVENT_LOAD_DATA_API: &str = "load.bs.tooltip.data-api";

const TEMPLATE: &str = "<div class=\"tooltip\" role=\"tooltip\">\
    <div class=\"tooltip-arrow\"></div>\
    <div class=\"tooltip-inner\"></div>\
    </div>";

const DEFAULT_TYPE: TypeTable = &[
    ("animation", "boolean"),
    ("boundary", "(string|element)"),
    ("container", "(string|element|boolean)"),
    ("customClass", "string"),
    ("delay", "(number|object)"),
    ("fallbackPlacements", "array"),
    ("html", "boolean"),
    ("offset", "(array|string|number)"),
    ("placement", "string"),
    ("popperConfig", "(null|object)"),
    ("selector", "(string|boolean)"),
    ("template", "string"),
    ("title", "(string|element)"),
    ("trigger", "string"),
];

/// Options shared by tooltips and popovers
pub(crate) fn tip_defaults() -> Config {
    let fallbacks = ["top", "right", "bottom", "left"].map(Value::from).to_vec();
    Config::new()
        .with("animation", true)
        .with("boundary", "clippingParents")
        .with("container", false)
        .with("customClass", "")
        .with("delay", 0u32)
        .with("fallbackPlacements", Value::List(fallbacks))
        .with("html", false)
        .with("offset", Value::List(vec![Value::from(0u32), Value::from(6u32)]))
        .with("placement", "top")
        .with("popperConfig", Value::Null)
        .with("selector", false)
        .with("template", TEMPLATE)
        .with("title", "")
        .with("trigger", "hover focus")
}

crate::plugin_commands! {
    pub enum TooltipCommand {
        Show => "show",
        Hide => "hide",
        Toggle => "toggle",
        Enable => "enable",
        Disable => "disable",
        ToggleEnabled => "toggleEnabled",
        Update => "update",
        Dispose => "dispose",
    }
}

/// Interaction that can hold a tip open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Click,
    Hover,
    Focus,
}

#[derive(Debug, Default, Clone, Copy)]
struct ActiveTrigger {
    click: bool,
    hover: bool,
    focus: bool,
}

impl ActiveTrigger {
    fn set(&mut self, trigger: Trigger, active: bool) {
        match trigger {
            Trigger::Click => self.click = active,
            Trigger::Hover => self.hover = active,
            Trigger::Focus => self.focus = active,
        }
    }

    fn any(self) -> bool {
        self.click || self.hover || self.focus
    }
}

/// State behind a tooltip or popover handle
#[derive(Debug)]
pub struct TipState {
    element: NodeId,
    config: Config,
    enabled: bool,
    state: TransitionState,
    timeout: Option<TimerId>,
    /// `None` until the first enter/leave, and again after a hide
    is_hovered: Option<bool>,
    active_trigger: ActiveTrigger,
    tip: Option<NodeId>,
    popper: Option<PlacementHandle>,
    new_content: Option<Vec<(String, Value)>>,
    modal_hide: Option<(NodeId, Handler)>,
}

impl TipState {
    fn new(element: NodeId, config: Config) -> Self {
        Self {
            element,
            config,
            enabled: true,
            state: TransitionState::Hidden,
            timeout: None,
            is_hovered: None,
            active_trigger: ActiveTrigger::default(),
            tip: None,
            popper: None,
            new_content: None,
            modal_hide: None,
        }
    }

    pub(crate) fn config(&self) -> &Config {
        &self.config
    }

    pub(crate) fn element(&self) -> NodeId {
        self.element
    }
}

fn config_after_merge(rt: &Runtime, config: &mut Config) {
    let container = match config.get("container") {
        None | Some(Value::Bool(false)) => Some(rt.document.body()),
        other => get_element(rt, other),
    };
    config.set("container", container);
    if let Some(delay) = config.number("delay") {
        let both = BTreeMap::from([
            (String::from("show"), Value::Number(delay)),
            (String::from("hide"), Value::Number(delay)),
        ]);
        config.set("delay", Value::Object(both));
    }
    for key in ["title", "content"] {
        if let Some(n) = config.number(key) {
            config.set(key, n.to_string());
        }
    }
}

/// Move a native `title` into `data-bs-original-title` so the browser's own
/// tooltip stays out of the way
fn fix_title(rt: &mut Runtime, element: NodeId) {
    let Some(title) = rt.document.get_attribute(element, "title").filter(|t| !t.is_empty()) else {
        return;
    };
    if !rt.document.has_attribute(element, "aria-label") && rt.document.text_content(element).trim().is_empty() {
        rt.document.set_attribute(element, "aria-label", &title);
    }
    rt.document.set_attribute(element, "data-bs-original-title", &title);
    rt.document.remove_attribute(element, "title");
}

/// `title` option, falling back to the saved native title
pub(crate) fn resolve_title(rt: &Runtime, state: &TipState) -> Value {
    match state.config.get("title") {
        Some(Value::String(s)) if !s.is_empty() => Value::String(s.clone()),
        Some(Value::Element(node)) => Value::Element(*node),
        _ => rt
            .document
            .get_attribute(state.element, "data-bs-original-title")
            .filter(|t| !t.is_empty())
            .map_or(Value::Null, Value::String),
    }
}

/// Fill the template node matched by `selector`; empty content removes it
fn set_template_content(rt: &mut Runtime, tip: NodeId, selector: &str, content: &Value, html: bool) {
    let Some(target) = rt.document.query_selector(tip, selector) else {
        return;
    };
    match content {
        Value::Element(node) if html => {
            rt.document.clear_children(target);
            rt.document.append_child(target, *node);
        }
        Value::Element(node) => {
            let text = rt.document.text_content(*node);
            rt.document.set_text_content(target, &text);
        }
        Value::String(markup) if !markup.is_empty() && html => {
            rt.document.clear_children(target);
            for node in rt.document.parse_fragment(markup) {
                rt.document.append_child(target, node);
            }
        }
        Value::String(text) if !text.is_empty() => rt.document.set_text_content(target, text),
        _ => rt.document.remove(target),
    }
}

/// Tooltip behaviour over [`TipState`]; popovers override the content
pub(crate) trait TipWidget: Component<State = TipState> {
    const DEFAULT_TYPE: TypeTable;

    fn defaults() -> Config;

    /// Template selectors paired with what goes in them
    fn content_for_template(&self, rt: &Runtime) -> Vec<(String, Value)>;

    fn is_with_content(&self, rt: &Runtime) -> bool;

    fn build(rt: &mut Runtime, element: NodeId, config: Config) -> Result<Self, WidgetError> {
        if !rt.has_placement_engine() {
            return Err(WidgetError::placement_engine(Self::KIND.name()));
        }
        let config = resolve_config(
            rt,
            Self::KIND,
            element,
            Self::defaults(),
            Self::DEFAULT_TYPE,
            config,
            config_after_merge,
        )?;
        let delegated = config.get("selector").is_some_and(Value::is_truthy);
        let this = Self::from_inner(Rc::new(RefCell::new(TipState::new(element, config))));
        register(rt, element, &this);
        this.set_listeners(rt);
        if !delegated {
            fix_title(rt, element);
        }
        Ok(this)
    }

    fn tip_state(&self) -> TransitionState {
        self.inner().borrow().state
    }

    fn tip(&self) -> Option<NodeId> {
        self.inner().borrow().tip
    }

    fn set_enabled(&self, enabled: bool) {
        self.inner().borrow_mut().enabled = enabled;
    }

    fn is_enabled(&self) -> bool {
        self.inner().borrow().enabled
    }

    fn set_listeners(&self, rt: &mut Runtime) {
        let (element, triggers, selector) = {
            let state = self.inner().borrow();
            let selector = state
                .config
                .str("selector")
                .filter(|s| !s.is_empty())
                .map(String::from);
            (state.element, state.config.str("trigger").unwrap_or_default().to_string(), selector)
        };
        let selector = selector.as_deref();
        for trigger in triggers.split_whitespace() {
            let kind = match trigger {
                "click" => {
                    self.listen(rt, "click", selector, |tip, rt, _| tip.toggle_tip(rt));
                    continue;
                }
                "hover" => Trigger::Hover,
                "focus" => Trigger::Focus,
                "manual" => continue,
                other => {
                    tracing::warn!("{}: unknown trigger {other:?}", Self::KIND);
                    continue;
                }
            };
            let (event_in, event_out) = match kind {
                Trigger::Hover => ("mouseenter", "mouseleave"),
                _ => ("focusin", "focusout"),
            };
            self.listen(rt, event_in, selector, move |tip, rt, _| {
                tip.inner().borrow_mut().active_trigger.set(kind, true);
                tip.enter(rt);
            });
            self.listen(rt, event_out, selector, move |tip, rt, ev| {
                let inside = ev
                    .related_target()
                    .is_some_and(|related| rt.document.contains(tip.element(), related));
                tip.inner().borrow_mut().active_trigger.set(kind, inside);
                tip.leave(rt);
            });
        }

        if let Some(modal) = rt.document.closest(element, SELECTOR_MODAL) {
            let handler = bind(self, |tip: &Self, rt, _| tip.hide_tip(rt));
            rt.on(modal, EVENT_MODAL_HIDE, handler.clone());
            self.inner().borrow_mut().modal_hide = Some((modal, handler));
        }
    }

    /// Subscribe `f` for `event`, routed to the instance of the delegate
    /// target when a `selector` is configured
    fn listen(
        &self,
        rt: &mut Runtime,
        event: &str,
        selector: Option<&str>,
        f: impl Fn(&Self, &mut Runtime, &mut Event) + 'static,
    ) {
        let element = self.element();
        let event = Self::KIND.event_name(event);
        let handler = bind(self, move |this: &Self, rt, ev| {
            if let Some(context) = this.delegated_context(rt, ev) {
                f(&context, rt, ev);
            }
        });
        match selector {
            Some(selector) => rt.on_delegated(element, &event, selector, handler),
            None => rt.on(element, &event, handler),
        }
    }

    fn delegated_context(&self, rt: &mut Runtime, event: &Event) -> Option<Self> {
        let target = event.delegate_target();
        if target == self.element() {
            return Some(self.clone());
        }
        match Self::get_or_create_instance(rt, target, self.delegate_config()) {
            Ok(context) => Some(context),
            Err(err) => {
                tracing::warn!("{} on {target}: {err}", Self::KIND);
                None
            }
        }
    }

    /// Non-default options handed down to delegated instances
    fn delegate_config(&self) -> Config {
        let defaults = Self::defaults();
        let mut config = Config::new();
        for (key, value) in self.inner().borrow().config.iter() {
            if defaults.get(key) != Some(value) {
                config.set(key, value.clone());
            }
        }
        config.set("selector", false);
        config.set("trigger", "manual");
        config
    }

    fn delay(&self, which: &str) -> u64 {
        let state = self.inner().borrow();
        state
            .config
            .get("delay")
            .and_then(Value::as_object)
            .and_then(|delay| delay.get(which))
            .and_then(Value::as_f64)
            .unwrap_or(0.0)
            .max(0.0) as u64
    }

    fn clear_tip_timeout(&self, rt: &mut Runtime) {
        let pending = self.inner().borrow_mut().timeout.take();
        if let Some(id) = pending {
            rt.clear_timeout(id);
        }
    }

    fn set_tip_timeout(&self, rt: &mut Runtime, delay: u64, f: impl FnOnce(&Self, &mut Runtime) + 'static) {
        self.clear_tip_timeout(rt);
        let id = rt.set_timeout(delay, bind_once(self, f));
        self.inner().borrow_mut().timeout = Some(id);
    }

    fn enter(&self, rt: &mut Runtime) {
        {
            let mut state = self.inner().borrow_mut();
            let already = state.state.is_shown() || state.is_hovered == Some(true);
            state.is_hovered = Some(true);
            if already {
                return;
            }
        }
        let delay = self.delay("show");
        self.set_tip_timeout(rt, delay, |tip: &Self, rt| {
            if tip.inner().borrow().is_hovered == Some(true) {
                tip.show_tip(rt);
            }
        });
    }

    fn leave(&self, rt: &mut Runtime) {
        {
            let mut state = self.inner().borrow_mut();
            if state.active_trigger.any() {
                return;
            }
            state.is_hovered = Some(false);
        }
        let delay = self.delay("hide");
        self.set_tip_timeout(rt, delay, |tip: &Self, rt| {
            if tip.inner().borrow().is_hovered != Some(true) {
                tip.hide_tip(rt);
            }
        });
    }

    fn toggle_tip(&self, rt: &mut Runtime) {
        let shown = {
            let mut state = self.inner().borrow_mut();
            if !state.enabled {
                return;
            }
            state.active_trigger.click = !state.active_trigger.click;
            state.state.is_shown()
        };
        if shown {
            self.leave(rt);
        } else {
            self.enter(rt);
        }
    }

    fn is_animated(&self, rt: &Runtime) -> bool {
        let state = self.inner().borrow();
        state.config.flag("animation") || state.tip.is_some_and(|tip| rt.document.has_class(tip, CLASS_NAME_FADE))
    }

    fn get_tip_element(&self, rt: &mut Runtime) -> Option<NodeId> {
        if let Some(tip) = self.tip() {
            return Some(tip);
        }
        let pending = self.inner().borrow().new_content.clone();
        let content = pending.unwrap_or_else(|| self.content_for_template(rt));
        let tip = self.create_tip_element(rt, &content)?;
        self.inner().borrow_mut().tip = Some(tip);
        Some(tip)
    }

    fn create_tip_element(&self, rt: &mut Runtime, content: &[(String, Value)]) -> Option<NodeId> {
        let (template, html, custom_class, animation) = {
            let state = self.inner().borrow();
            let config = &state.config;
            (
                config.str("template").unwrap_or_default().to_string(),
                config.flag("html"),
                config.str("customClass").unwrap_or_default().to_string(),
                config.flag("animation"),
            )
        };
        let Some(tip) = rt.document.parse_element(&template) else {
            tracing::warn!("{}: template has no element", Self::KIND);
            return None;
        };
        for (selector, value) in content {
            set_template_content(rt, tip, selector, value, html);
        }
        let extra: Vec<&str> = custom_class.split_whitespace().collect();
        if !extra.is_empty() {
            rt.document.add_class(tip, &extra);
        }
        rt.document.remove_class(tip, &[CLASS_NAME_FADE, CLASS_NAME_SHOW]);
        let auto = format!("bs-{}-auto", Self::KIND);
        rt.document.add_class(tip, &[auto.as_str()]);
        rt.document
            .set_attribute(tip, "id", &format!("{}{}", Self::KIND, tip.index()));
        if animation {
            rt.document.add_class(tip, &[CLASS_NAME_FADE]);
        }
        Some(tip)
    }

    fn create_popper(&self, rt: &mut Runtime, tip: NodeId) -> Option<PlacementHandle> {
        let (element, options) = {
            let state = self.inner().borrow();
            let config = &state.config;
            let fallback_placements = match config.get("fallbackPlacements") {
                Some(Value::List(items)) => items.iter().filter_map(Value::as_str).map(String::from).collect(),
                _ => Vec::new(),
            };
            let mut options = PlacementOptions {
                placement: config.str("placement").unwrap_or("top").to_string(),
                fallback_placements,
                offset: offset_from_value(config.get("offset")),
                boundary: boundary_from_value(config.get("boundary")),
                ..Default::default()
            };
            apply_popper_config(&mut options, config.get("popperConfig"));
            (state.element, options)
        };
        rt.attach_placement(element, tip, &options)
    }

    fn dispose_popper(&self, rt: &mut Runtime) {
        let (popper, tip) = {
            let mut state = self.inner().borrow_mut();
            (state.popper.take(), state.tip.take())
        };
        if let Some(handle) = popper {
            rt.detach_placement(handle);
        }
        if let Some(tip) = tip {
            rt.document.remove(tip);
        }
    }

    fn show_tip(&self, rt: &mut Runtime) {
        let element = self.element();
        if rt.document.computed_style(element, "display") == "none" {
            tracing::warn!("{}: show on hidden element {element} ignored", Self::KIND);
            return;
        }
        if !(self.is_enabled() && self.is_with_content(rt)) || !self.tip_state().can_show() {
            return;
        }
        if !emit_allowed(rt, element, Self::KIND, "show", &[]) || !rt.document.is_connected(element) {
            return;
        }

        self.dispose_popper(rt);
        let Some(tip) = self.get_tip_element(rt) else {
            return;
        };
        if let Some(id) = rt.document.get_attribute(tip, "id") {
            rt.document.set_attribute(element, "aria-describedby", &id);
        }
        if !rt.document.is_connected(tip) {
            let container = self.inner().borrow().config.element("container");
            let container = container.unwrap_or_else(|| rt.document.body());
            rt.document.append_child(container, tip);
            emit(rt, element, Self::KIND, "inserted", &[]);
        }

        let popper = self.create_popper(rt, tip);
        {
            let mut state = self.inner().borrow_mut();
            state.popper = popper;
            state.state = TransitionState::Showing;
        }
        rt.document.add_class(tip, &[CLASS_NAME_SHOW]);
        tracing::debug!("{} {element} showing {tip}", Self::KIND);

        let animated = self.is_animated(rt);
        let complete = bind_once(self, |this: &Self, rt| {
            this.inner().borrow_mut().state = TransitionState::Shown;
            emit(rt, this.element(), Self::KIND, "shown", &[]);
            let hovered = this.inner().borrow().is_hovered;
            if hovered == Some(false) {
                this.leave(rt);
            }
            this.inner().borrow_mut().is_hovered = Some(false);
        });
        execute_after_transition(rt, tip, animated, complete);
    }

    fn hide_tip(&self, rt: &mut Runtime) {
        if !self.tip_state().can_hide() {
            return;
        }
        let Some(tip) = self.tip() else {
            return;
        };
        let element = self.element();
        if !emit_allowed(rt, element, Self::KIND, "hide", &[]) {
            return;
        }
        {
            let mut state = self.inner().borrow_mut();
            state.active_trigger = ActiveTrigger::default();
            state.is_hovered = None;
            state.state = TransitionState::Hiding;
        }
        rt.document.remove_class(tip, &[CLASS_NAME_SHOW]);

        let animated = self.is_animated(rt);
        let complete = bind_once(self, |this: &Self, rt| {
            let (held, hovered) = {
                let mut state = this.inner().borrow_mut();
                state.state = TransitionState::Hidden;
                (state.active_trigger.any(), state.is_hovered)
            };
            if held {
                return;
            }
            if hovered != Some(true) {
                this.dispose_popper(rt);
            }
            let element = this.element();
            rt.document.remove_attribute(element, "aria-describedby");
            tracing::debug!("{} {element} hidden", Self::KIND);
            emit(rt, element, Self::KIND, "hidden", &[]);
        });
        execute_after_transition(rt, tip, animated, complete);
    }

    fn update_tip(&self, rt: &mut Runtime) {
        let popper = self.inner().borrow().popper;
        if let Some(handle) = popper {
            rt.update_placement(handle);
        }
    }

    /// Replace the template content; a shown tip is rebuilt in place
    fn set_tip_content(&self, rt: &mut Runtime, content: Vec<(String, Value)>) {
        self.inner().borrow_mut().new_content = Some(content);
        match self.tip_state() {
            TransitionState::Shown => {
                self.dispose_popper(rt);
                self.inner().borrow_mut().state = TransitionState::Hidden;
                self.show_tip(rt);
            }
            TransitionState::Hidden => self.dispose_popper(rt),
            _ => {}
        }
    }

    fn dispose_tip(&self, rt: &mut Runtime) {
        self.clear_tip_timeout(rt);
        let element = self.element();
        let modal_hide = self.inner().borrow_mut().modal_hide.take();
        if let Some((modal, handler)) = modal_hide {
            rt.off_handler(modal, EVENT_MODAL_HIDE, &handler);
        }
        if let Some(title) = rt.document.get_attribute(element, "data-bs-original-title") {
            rt.document.set_attribute(element, "title", &title);
        }
        self.dispose_popper(rt);
        dispose_base(rt, element, Self::KIND);
    }
}

/// Tooltip handle
#[derive(Debug, Clone)]
pub struct Tooltip(Rc<RefCell<TipState>>);

impl Component for Tooltip {
    const KIND: ComponentKind = ComponentKind::Tooltip;
    type State = TipState;

    fn from_inner(inner: Rc<RefCell<TipState>>) -> Self {
        Self(inner)
    }

    fn inner(&self) -> &Rc<RefCell<TipState>> {
        &self.0
    }

    fn construct(rt: &mut Runtime, element: NodeId, config: Config) -> Result<Self, WidgetError> {
        Self::build(rt, element, config)
    }

    fn element(&self) -> NodeId {
        self.0.borrow().element
    }
}

impl TipWidget for Tooltip {
    const DEFAULT_TYPE: TypeTable = DEFAULT_TYPE;

    fn defaults() -> Config {
        tip_defaults()
    }

    fn content_for_template(&self, rt: &Runtime) -> Vec<(String, Value)> {
        vec![(SELECTOR_TOOLTIP_INNER.to_string(), resolve_title(rt, &self.0.borrow()))]
    }

    fn is_with_content(&self, rt: &Runtime) -> bool {
        resolve_title(rt, &self.0.borrow()).is_truthy()
    }
}

impl Tooltip {
    pub fn config(&self) -> Config {
        self.0.borrow().config.clone()
    }

    /// Tip element while one exists
    pub fn tip_element(&self) -> Option<NodeId> {
        self.tip()
    }

    pub fn enable(&self) {
        self.set_enabled(true);
    }

    pub fn disable(&self) {
        self.set_enabled(false);
    }

    pub fn toggle_enabled(&self) {
        self.set_enabled(!self.is_enabled());
    }

    pub fn enabled(&self) -> bool {
        self.is_enabled()
    }

    pub fn update(&self, rt: &mut Runtime) {
        self.update_tip(rt);
    }

    /// New text for `.tooltip-inner`
    pub fn set_content(&self, rt: &mut Runtime, content: impl Into<Value>) {
        self.set_tip_content(rt, vec![(SELECTOR_TOOLTIP_INNER.to_string(), content.into())]);
    }
}

impl Showable for Tooltip {
    fn show(&self, rt: &mut Runtime) {
        self.show_tip(rt);
    }

    fn hide(&self, rt: &mut Runtime) {
        self.hide_tip(rt);
    }

    fn state(&self) -> TransitionState {
        self.tip_state()
    }

    fn toggle(&self, rt: &mut Runtime) {
        self.toggle_tip(rt);
    }
}

impl Disposable for Tooltip {
    fn dispose(&self, rt: &mut Runtime) {
        self.dispose_tip(rt);
    }
}

impl Plugin for Tooltip {
    type Command = TooltipCommand;

    fn execute(&self, rt: &mut Runtime, command: TooltipCommand) {
        match command {
            TooltipCommand::Show => self.show(rt),
            TooltipCommand::Hide => self.hide(rt),
            TooltipCommand::Toggle => Showable::toggle(self, rt),
            TooltipCommand::Enable => self.enable(),
            TooltipCommand::Disable => self.disable(),
            TooltipCommand::ToggleEnabled => self.toggle_enabled(),
            TooltipCommand::Update => self.update(rt),
            TooltipCommand::Dispose => self.dispose(rt),
        }
    }
}

/// Build instances for `selector` matches once the page has loaded
pub(crate) fn install_load_initializer<T: TipWidget>(rt: &mut Runtime, event: &'static str, selector: &'static str) {
    rt.on(
        NodeId::ROOT,
        event,
        Handler::new(move |rt, _| {
            for element in rt.document.query_selector_all(NodeId::ROOT, selector) {
                if let Err(err) = T::get_or_create_instance(rt, element, Config::new()) {
                    tracing::warn!("{} on {element}: {err}", T::KIND);
                }
            }
        }),
    );
}

/// Tooltips are opt-in: `[data-bs-toggle="tooltip"]` elements get an
/// instance on `load`
pub fn install_data_api(rt: &mut Runtime) {
    install_load_initializer::<Tooltip>(rt, EVENT_LOAD_DATA_API, SELECTOR_DATA_TOGGLE);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placement::StaticPlacement;

    fn runtime() -> Runtime {
        let mut rt = Runtime::new();
        rt.set_placement_engine(StaticPlacement::new());
        rt
    }

    fn trigger(rt: &mut Runtime, title: &str) -> NodeId {
        let body = rt.document.body();
        let button = rt.document.create_element("button");
        rt.document.set_attribute(button, "title", title);
        rt.document.append_child(body, button);
        button
    }

    fn record(rt: &mut Runtime, element: NodeId, log: &Rc<RefCell<Vec<String>>>) {
        for name in ["show", "inserted", "shown", "hide", "hidden"] {
            let log = log.clone();
            rt.on(
                element,
                &format!("{name}.bs.tooltip"),
                Handler::new(move |_, _| log.borrow_mut().push(name.to_string())),
            );
        }
    }

    #[test]
    fn test_hover_shows_and_leave_hides() {
        let mut rt = runtime();
        let button = trigger(&mut rt, "Save the file");
        let tooltip = Tooltip::get_or_create_instance(&mut rt, button, Config::new()).unwrap();
        let log = Rc::new(RefCell::new(Vec::new()));
        record(&mut rt, button, &log);

        rt.mouse_over(button, None);
        rt.advance(0);
        let tip = tooltip.tip_element().unwrap();
        assert_eq!(rt.document.parent(tip), Some(rt.document.body()));
        assert!(rt.document.has_class(tip, "bs-tooltip-auto"));
        assert!(rt.document.has_class(tip, "show"));
        let id = format!("tooltip{}", tip.index());
        assert_eq!(rt.document.get_attribute(button, "aria-describedby"), Some(id));
        assert_eq!(rt.document.get_attribute(tip, "data-popper-placement").as_deref(), Some("top"));
        let inner = rt.document.query_selector(tip, ".tooltip-inner").unwrap();
        assert_eq!(rt.document.text_content(inner), "Save the file");

        rt.advance(5);
        assert_eq!(tooltip.state(), TransitionState::Shown);

        rt.mouse_out(button, None);
        rt.advance(0);
        assert_eq!(tooltip.state(), TransitionState::Hiding);
        rt.advance(5);
        assert_eq!(tooltip.state(), TransitionState::Hidden);
        assert!(tooltip.tip_element().is_none());
        assert!(!rt.document.is_connected(tip));
        assert!(!rt.document.has_attribute(button, "aria-describedby"));
        assert_eq!(*log.borrow(), ["show", "inserted", "shown", "hide", "hidden"]);
    }

    #[test]
    fn test_title_moved_and_restored() {
        let mut rt = runtime();
        let button = trigger(&mut rt, "Help");
        let tooltip = Tooltip::get_or_create_instance(&mut rt, button, Config::new()).unwrap();
        assert!(!rt.document.has_attribute(button, "title"));
        assert_eq!(rt.document.get_attribute(button, "data-bs-original-title").as_deref(), Some("Help"));
        assert_eq!(rt.document.get_attribute(button, "aria-label").as_deref(), Some("Help"));

        tooltip.dispose(&mut rt);
        assert_eq!(rt.document.get_attribute(button, "title").as_deref(), Some("Help"));
        assert_eq!(rt.events().count(button), 0);
    }

    #[test]
    fn test_show_delay_cancelled_by_leave() {
        let mut rt = runtime();
        let button = trigger(&mut rt, "Slow");
        rt.document.set_attribute(button, "data-bs-delay", "{\"show\": 100, \"hide\": 0}");
        let tooltip = Tooltip::get_or_create_instance(&mut rt, button, Config::new()).unwrap();

        rt.mouse_over(button, None);
        rt.advance(50);
        assert!(tooltip.tip_element().is_none());
        rt.mouse_out(button, None);
        rt.advance(200);
        assert!(tooltip.tip_element().is_none());
        assert_eq!(tooltip.state(), TransitionState::Hidden);
    }

    #[test]
    fn test_click_trigger_and_set_content() {
        let mut rt = runtime();
        let button = trigger(&mut rt, "Old");
        let config = Config::new().with("trigger", "click").with("animation", false);
        let tooltip = Tooltip::get_or_create_instance(&mut rt, button, config).unwrap();

        rt.click(button);
        rt.advance(0);
        assert_eq!(tooltip.state(), TransitionState::Shown);

        tooltip.set_content(&mut rt, "New");
        let tip = tooltip.tip_element().unwrap();
        let inner = rt.document.query_selector(tip, ".tooltip-inner").unwrap();
        assert_eq!(rt.document.text_content(inner), "New");
        assert!(!rt.document.has_class(tip, "fade"));

        rt.click(button);
        rt.advance(0);
        assert_eq!(tooltip.state(), TransitionState::Hidden);
    }

    #[test]
    fn test_html_content() {
        let mut rt = runtime();
        let button = trigger(&mut rt, "");
        let config = Config::new()
            .with("html", true)
            .with("title", "<em>Bold</em> move")
            .with("customClass", "wide dark");
        let tooltip = Tooltip::get_or_create_instance(&mut rt, button, config).unwrap();
        tooltip.show(&mut rt);
        let tip = tooltip.tip_element().unwrap();
        assert!(rt.document.has_class(tip, "wide") && rt.document.has_class(tip, "dark"));
        let inner = rt.document.query_selector(tip, ".tooltip-inner").unwrap();
        assert!(rt.document.query_selector(inner, "em").is_some());
        assert_eq!(rt.document.text_content(inner), "Bold move");
    }

    #[test]
    fn test_show_twice_emits_one_shown() {
        let mut rt = runtime();
        let button = trigger(&mut rt, "Once");
        let tooltip = Tooltip::get_or_create_instance(&mut rt, button, Config::new()).unwrap();
        let log = Rc::new(RefCell::new(Vec::new()));
        record(&mut rt, button, &log);
        tooltip.show(&mut rt);
        tooltip.show(&mut rt);
        rt.advance(10);
        assert_eq!(log.borrow().iter().filter(|e| *e == "shown").count(), 1);
    }

    #[test]
    fn test_disabled_and_empty_title_do_nothing() {
        let mut rt = runtime();
        let button = trigger(&mut rt, "Off");
        let tooltip = Tooltip::get_or_create_instance(&mut rt, button, Config::new()).unwrap();
        tooltip.disable();
        tooltip.show(&mut rt);
        assert!(tooltip.tip_element().is_none());
        tooltip.toggle_enabled();
        assert!(tooltip.enabled());

        let blank = trigger(&mut rt, "");
        let empty = Tooltip::get_or_create_instance(&mut rt, blank, Config::new()).unwrap();
        empty.show(&mut rt);
        assert!(empty.tip_element().is_none());
    }

    #[test]
    fn test_selector_delegation() {
        let mut rt = runtime();
        let body = rt.document.body();
        let toolbar = rt.document.create_element("div");
        rt.document.append_child(body, toolbar);
        let button = rt.document.create_element("button");
        rt.document.set_attribute(button, "data-bs-toggle", "tooltip");
        rt.document.set_attribute(button, "data-bs-title", "Delegated");
        rt.document.append_child(toolbar, button);
        Tooltip::get_or_create_instance(&mut rt, toolbar, Config::new().with("selector", "[data-bs-toggle=\"tooltip\"]"))
            .unwrap();

        rt.mouse_over(button, Some(toolbar));
        let child = Tooltip::get_instance(&rt, button).unwrap();
        assert_eq!(child.config().str("trigger"), Some("manual"));
        assert_eq!(child.config().get("selector"), Some(&Value::Bool(false)));
        rt.advance(0);
        assert!(child.tip_element().is_some());
    }

    #[test]
    fn test_requires_placement_engine() {
        let mut rt = Runtime::new();
        let button = trigger(&mut rt, "No engine");
        let err = Tooltip::get_or_create_instance(&mut rt, button, Config::new()).unwrap_err();
        assert!(matches!(err, WidgetError::MissingDependency { component: "tooltip", .. }));
    }

    #[test]
    fn test_hidden_with_enclosing_modal() {
        let mut rt = runtime();
        let body = rt.document.body();
        let modal = rt.document.create_element("div");
        rt.document.set_attribute(modal, "class", "modal");
        rt.document.append_child(body, modal);
        let button = rt.document.create_element("button");
        rt.document.set_attribute(button, "title", "Inside");
        rt.document.append_child(modal, button);
        let tooltip = Tooltip::get_or_create_instance(&mut rt, button, Config::new().with("animation", false)).unwrap();
        tooltip.show(&mut rt);
        assert!(tooltip.is_shown());
        rt.trigger(modal, "hide.bs.modal", &[]);
        assert!(!tooltip.is_shown());
    }
}
