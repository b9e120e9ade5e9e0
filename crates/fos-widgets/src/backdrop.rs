//! Backdrop overlay
//!
//! The dimmed layer behind modals and offcanvas panels. Created lazily,
//! appended on `show`, removed again once `hide` has finished its fade.

use std::cell::RefCell;
use std::rc::Rc;

use fos_dom::NodeId;

use crate::dispatch::Handler;
use crate::transition::{execute_after_transition, reflow};
use crate::Runtime;

const CLASS_NAME_FADE: &str = "fade";
const CLASS_NAME_SHOW: &str = "show";
const EVENT_MOUSEDOWN: &str = "mousedown.bs.backdrop";

/// Called when the backdrop is pressed
pub type ClickCallback = Rc<dyn Fn(&mut Runtime)>;

/// Backdrop options
#[derive(Clone)]
pub struct BackdropConfig {
    pub class_name: String,
    pub click_callback: Option<ClickCallback>,
    pub is_animated: bool,
    /// When false `show`/`hide` only run their callbacks
    pub is_visible: bool,
    /// Parent for the overlay, `<body>` when unset
    pub root_element: Option<NodeId>,
}

impl Default for BackdropConfig {
    fn default() -> Self {
        Self {
            class_name: String::from("modal-backdrop"),
            click_callback: None,
            is_animated: false,
            is_visible: true,
            root_element: None,
        }
    }
}

impl std::fmt::Debug for BackdropConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackdropConfig")
            .field("class_name", &self.class_name)
            .field("click_callback", &self.click_callback.is_some())
            .field("is_animated", &self.is_animated)
            .field("is_visible", &self.is_visible)
            .field("root_element", &self.root_element)
            .finish()
    }
}

#[derive(Debug)]
struct BackdropState {
    config: BackdropConfig,
    element: Option<NodeId>,
    appended: bool,
}

/// Overlay handle; clones share one overlay
#[derive(Debug, Clone)]
pub struct Backdrop(Rc<RefCell<BackdropState>>);

impl Backdrop {
    pub fn new(config: BackdropConfig) -> Self {
        Self(Rc::new(RefCell::new(BackdropState {
            config,
            element: None,
            appended: false,
        })))
    }

    /// Overlay element, once created
    pub fn element(&self) -> Option<NodeId> {
        self.0.borrow().element
    }

    pub fn is_appended(&self) -> bool {
        self.0.borrow().appended
    }

    pub fn is_visible(&self) -> bool {
        self.0.borrow().config.is_visible
    }

    /// Append the overlay and fade it in, then run `callback`
    pub fn show(&self, rt: &mut Runtime, callback: impl FnOnce(&mut Runtime) + 'static) {
        if !self.is_visible() {
            callback(rt);
            return;
        }
        self.append(rt);
        let element = self.get_element(rt);
        let animated = self.0.borrow().config.is_animated;
        if animated {
            reflow(&rt.document, element);
        }
        rt.document.add_class(element, &[CLASS_NAME_SHOW]);
        execute_after_transition(rt, element, animated, callback);
    }

    /// Fade the overlay out and remove it, then run `callback`
    pub fn hide(&self, rt: &mut Runtime, callback: impl FnOnce(&mut Runtime) + 'static) {
        if !self.is_visible() {
            callback(rt);
            return;
        }
        let element = self.get_element(rt);
        rt.document.remove_class(element, &[CLASS_NAME_SHOW]);
        let animated = self.0.borrow().config.is_animated;
        let this = self.clone();
        execute_after_transition(rt, element, animated, move |rt| {
            this.dispose(rt);
            callback(rt);
        });
    }

    /// Detach the overlay if it is in the page
    pub fn dispose(&self, rt: &mut Runtime) {
        let element = {
            let mut state = self.0.borrow_mut();
            if !state.appended {
                return;
            }
            state.appended = false;
            state.element
        };
        if let Some(element) = element {
            rt.off(element, EVENT_MOUSEDOWN);
            rt.document.remove(element);
        }
    }

    fn get_element(&self, rt: &mut Runtime) -> NodeId {
        if let Some(element) = self.0.borrow().element {
            return element;
        }
        let (class_name, animated) = {
            let state = self.0.borrow();
            (state.config.class_name.clone(), state.config.is_animated)
        };
        let element = rt.document.create_element("div");
        rt.document.set_attribute(element, "class", &class_name);
        if animated {
            rt.document.add_class(element, &[CLASS_NAME_FADE]);
        }
        self.0.borrow_mut().element = Some(element);
        element
    }

    fn append(&self, rt: &mut Runtime) {
        if self.is_appended() {
            return;
        }
        let element = self.get_element(rt);
        let (root, click) = {
            let state = self.0.borrow();
            (state.config.root_element, state.config.click_callback.clone())
        };
        let root = root.unwrap_or_else(|| rt.document.body());
        rt.document.append_child(root, element);
        rt.on(
            element,
            EVENT_MOUSEDOWN,
            Handler::new(move |rt, _| {
                if let Some(click) = &click {
                    click(rt);
                }
            }),
        );
        self.0.borrow_mut().appended = true;
    }
}
