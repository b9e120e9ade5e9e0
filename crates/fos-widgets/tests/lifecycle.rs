//! Show/hide lifecycle properties shared by every showable widget

use std::cell::RefCell;
use std::rc::Rc;

use fos_widgets::dom::NodeId;
use fos_widgets::widgets::{Collapse, Dropdown, Modal, Offcanvas, Popover, Toast, Tooltip};
use fos_widgets::{
    Component, ComponentKind, Config, Disposable, Handler, Runtime, Showable, StaticPlacement, TransitionState,
};

fn runtime() -> Runtime {
    let mut rt = Runtime::new();
    rt.set_placement_engine(StaticPlacement::new());
    rt
}

fn element(rt: &mut Runtime, tag: &str, class: &str) -> NodeId {
    let body = rt.document.body();
    let el = rt.document.create_element(tag);
    if !class.is_empty() {
        rt.document.set_attribute(el, "class", class);
    }
    rt.document.append_child(body, el);
    el
}

/// Count lifecycle events of `kind` fired on `el`
fn recorder(rt: &mut Runtime, el: NodeId, kind: ComponentKind) -> Rc<RefCell<Vec<&'static str>>> {
    let log = Rc::new(RefCell::new(Vec::new()));
    for name in ["show", "shown", "hide", "hidden"] {
        let log = log.clone();
        rt.on(el, &kind.event_name(name), Handler::new(move |_, _| log.borrow_mut().push(name)));
    }
    log
}

fn count(log: &Rc<RefCell<Vec<&'static str>>>, name: &str) -> usize {
    log.borrow().iter().filter(|e| **e == name).count()
}

fn prevent_show(rt: &mut Runtime, el: NodeId, kind: ComponentKind) {
    rt.on(el, &kind.event_name("show"), Handler::new(|_, ev| ev.prevent_default()));
}

/// Double show, then settle, then double hide
fn assert_single_shown<W: Showable>(rt: &mut Runtime, widget: &W, el: NodeId) {
    let log = recorder(rt, el, W::KIND);
    widget.show(rt);
    widget.show(rt);
    rt.advance(50);
    assert_eq!(widget.state(), TransitionState::Shown, "{}", W::KIND);
    assert_eq!(count(&log, "show"), 1, "{}", W::KIND);
    assert_eq!(count(&log, "shown"), 1, "{}", W::KIND);

    widget.hide(rt);
    widget.hide(rt);
    rt.advance(50);
    assert_eq!(widget.state(), TransitionState::Hidden, "{}", W::KIND);
    assert_eq!(count(&log, "hidden"), 1, "{}", W::KIND);
}

#[test]
fn test_double_show_emits_one_shown() {
    let mut rt = runtime();

    let el = element(&mut rt, "div", "modal fade");
    let modal = Modal::get_or_create_instance(&mut rt, el, Config::new()).unwrap();
    assert_single_shown(&mut rt, &modal, el);

    let el = element(&mut rt, "div", "collapse");
    let collapse = Collapse::get_or_create_instance(&mut rt, el, Config::new().with("toggle", false)).unwrap();
    assert_single_shown(&mut rt, &collapse, el);

    let el = element(&mut rt, "div", "offcanvas");
    let offcanvas = Offcanvas::get_or_create_instance(&mut rt, el, Config::new()).unwrap();
    assert_single_shown(&mut rt, &offcanvas, el);

    let el = element(&mut rt, "div", "toast fade");
    let toast = Toast::get_or_create_instance(&mut rt, el, Config::new().with("autohide", false)).unwrap();
    assert_single_shown(&mut rt, &toast, el);

    let el = element(&mut rt, "button", "");
    rt.document.set_attribute(el, "title", "Tip");
    let tooltip = Tooltip::get_or_create_instance(&mut rt, el, Config::new()).unwrap();
    assert_single_shown(&mut rt, &tooltip, el);

    let el = element(&mut rt, "button", "");
    let popover = Popover::get_or_create_instance(&mut rt, el, Config::new().with("content", "Body")).unwrap();
    assert_single_shown(&mut rt, &popover, el);

    let toggle = element(&mut rt, "button", "");
    element(&mut rt, "ul", "dropdown-menu");
    let dropdown = Dropdown::get_or_create_instance(&mut rt, toggle, Config::new()).unwrap();
    assert_single_shown(&mut rt, &dropdown, toggle);
}

#[test]
fn test_prevented_show_changes_nothing() {
    let mut rt = runtime();
    rt.document.set_inner_width(1000.0);
    rt.document.set_scrollbar_width(15.0);
    let body = rt.document.body();

    let el = element(&mut rt, "div", "modal fade");
    let modal = Modal::get_or_create_instance(&mut rt, el, Config::new()).unwrap();
    prevent_show(&mut rt, el, ComponentKind::Modal);
    let log = recorder(&mut rt, el, ComponentKind::Modal);
    modal.show(&mut rt);
    rt.advance(100);
    assert_eq!(modal.state(), TransitionState::Hidden);
    assert_eq!(count(&log, "shown"), 0);
    assert_eq!(rt.document.get_attribute(el, "class").as_deref(), Some("modal fade"));
    assert!(!rt.document.has_class(body, "modal-open"));
    assert_eq!(rt.document.computed_style(body, "padding-right"), "");
    assert!(rt.document.query_selector(body, ".modal-backdrop").is_none());

    let el = element(&mut rt, "div", "collapse");
    let collapse = Collapse::get_or_create_instance(&mut rt, el, Config::new().with("toggle", false)).unwrap();
    prevent_show(&mut rt, el, ComponentKind::Collapse);
    collapse.show(&mut rt);
    rt.advance(100);
    assert_eq!(rt.document.get_attribute(el, "class").as_deref(), Some("collapse"));
    assert!(!collapse.is_shown());

    let el = element(&mut rt, "div", "toast");
    let toast = Toast::get_or_create_instance(&mut rt, el, Config::new()).unwrap();
    prevent_show(&mut rt, el, ComponentKind::Toast);
    toast.show(&mut rt);
    rt.advance(100);
    assert_eq!(rt.document.get_attribute(el, "class").as_deref(), Some("toast"));

    let el = element(&mut rt, "button", "");
    rt.document.set_attribute(el, "title", "Tip");
    let tooltip = Tooltip::get_or_create_instance(&mut rt, el, Config::new()).unwrap();
    prevent_show(&mut rt, el, ComponentKind::Tooltip);
    tooltip.show(&mut rt);
    rt.advance(100);
    assert!(tooltip.tip_element().is_none());
    assert!(!rt.document.has_attribute(el, "aria-describedby"));
}

#[test]
fn test_prevented_show_leaves_overlays_untouched() {
    let mut rt = runtime();
    let body = rt.document.body();

    let el = element(&mut rt, "div", "offcanvas");
    let offcanvas = Offcanvas::get_or_create_instance(&mut rt, el, Config::new()).unwrap();
    prevent_show(&mut rt, el, ComponentKind::Offcanvas);
    let log = recorder(&mut rt, el, ComponentKind::Offcanvas);
    offcanvas.show(&mut rt);
    rt.advance(100);
    assert_eq!(offcanvas.state(), TransitionState::Hidden);
    assert_eq!(count(&log, "shown"), 0);
    assert_eq!(rt.document.get_attribute(el, "class").as_deref(), Some("offcanvas"));
    assert!(!rt.document.has_attribute(el, "aria-modal"));
    assert!(rt.document.query_selector(body, ".offcanvas-backdrop").is_none());

    let toggle = element(&mut rt, "button", "");
    let menu = element(&mut rt, "ul", "dropdown-menu");
    let dropdown = Dropdown::get_or_create_instance(&mut rt, toggle, Config::new()).unwrap();
    prevent_show(&mut rt, toggle, ComponentKind::Dropdown);
    let log = recorder(&mut rt, toggle, ComponentKind::Dropdown);
    dropdown.show(&mut rt);
    rt.advance(100);
    assert!(!dropdown.is_shown());
    assert_eq!(count(&log, "shown"), 0);
    assert_eq!(rt.document.get_attribute(toggle, "class"), None);
    assert_eq!(rt.document.get_attribute(menu, "class").as_deref(), Some("dropdown-menu"));
    assert!(!rt.document.has_attribute(toggle, "aria-expanded"));

    let el = element(&mut rt, "button", "");
    let popover = Popover::get_or_create_instance(&mut rt, el, Config::new().with("content", "Body")).unwrap();
    prevent_show(&mut rt, el, ComponentKind::Popover);
    let log = recorder(&mut rt, el, ComponentKind::Popover);
    popover.show(&mut rt);
    rt.advance(100);
    assert_eq!(popover.state(), TransitionState::Hidden);
    assert_eq!(count(&log, "shown"), 0);
    assert!(popover.tip_element().is_none());
    assert_eq!(rt.document.get_attribute(el, "class"), None);
    assert!(!rt.document.has_attribute(el, "aria-describedby"));
}

#[test]
fn test_instance_identity_and_dispose() {
    let mut rt = runtime();
    let el = element(&mut rt, "div", "toast");

    let first = Toast::get_or_create_instance(&mut rt, el, Config::new()).unwrap();
    let again = Toast::get_or_create_instance(&mut rt, el, Config::new().with("delay", 10u32)).unwrap();
    assert!(first.ptr_eq(&again));
    assert_eq!(again.config().number("delay"), Some(5000.0));

    first.dispose(&mut rt);
    assert!(Toast::get_instance(&rt, el).is_none());
    let fresh = Toast::get_or_create_instance(&mut rt, el, Config::new()).unwrap();
    assert!(!fresh.ptr_eq(&first));
    assert!(Toast::get_instance(&rt, el).is_some_and(|t| t.ptr_eq(&fresh)));
}

#[test]
fn test_kinds_share_element_independently() {
    let mut rt = runtime();
    let el = element(&mut rt, "div", "collapse");
    let collapse = Collapse::get_or_create_instance(&mut rt, el, Config::new().with("toggle", false)).unwrap();
    let toast = Toast::get_or_create_instance(&mut rt, el, Config::new()).unwrap();
    assert_eq!(rt.instances().kinds(el), [ComponentKind::Collapse, ComponentKind::Toast]);

    toast.dispose(&mut rt);
    assert_eq!(rt.instances().kinds(el), [ComponentKind::Collapse]);
    assert!(Collapse::get_instance(&rt, el).is_some_and(|c| c.ptr_eq(&collapse)));
    collapse.dispose(&mut rt);
    assert!(rt.instances().kinds(el).is_empty());
    assert!(rt.instances().is_empty());
}

#[test]
fn test_show_on_detached_target_is_noop() {
    let mut rt = runtime();
    let orphan = rt.document.create_element("button");
    rt.document.set_attribute(orphan, "title", "Nowhere");
    let tooltip = Tooltip::get_or_create_instance(&mut rt, orphan, Config::new()).unwrap();
    tooltip.show(&mut rt);
    rt.advance(50);
    assert_eq!(tooltip.state(), TransitionState::Hidden);
}
