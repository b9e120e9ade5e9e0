//! Carousel ordering over a four slide page

use std::cell::RefCell;
use std::rc::Rc;

use fos_widgets::dom::NodeId;
use fos_widgets::widgets::{carousel, Carousel};
use fos_widgets::{Component, Config, Handler, Runtime, Value};

fn gallery(rt: &mut Runtime, wrap: bool) -> (NodeId, Vec<NodeId>) {
    let markup = format!(
        r##"<div id="gallery" class="carousel" data-bs-wrap="{wrap}" data-bs-interval="false">
             <div class="carousel-inner">
               <div class="carousel-item active">A</div>
               <div class="carousel-item">B</div>
               <div class="carousel-item">C</div>
               <div class="carousel-item">D</div>
             </div>
             <button data-bs-target="#gallery" data-bs-slide="prev">Prev</button>
             <button data-bs-target="#gallery" data-bs-slide="next">Next</button>
           </div>"##
    );
    let body = rt.document.body();
    for node in rt.document.parse_fragment(&markup) {
        rt.document.append_child(body, node);
    }
    let element = rt.document.get_element_by_id("gallery").unwrap();
    let items = rt.document.query_selector_all(element, ".carousel-item");
    (element, items)
}

fn slid_log(rt: &mut Runtime, element: NodeId) -> Rc<RefCell<Vec<(f64, f64)>>> {
    let log = Rc::new(RefCell::new(Vec::new()));
    let l = log.clone();
    rt.on(
        element,
        "slid.bs.carousel",
        Handler::new(move |_, ev| {
            let from = ev.data("from").and_then(Value::as_f64).unwrap_or(-1.0);
            let to = ev.data("to").and_then(Value::as_f64).unwrap_or(-1.0);
            l.borrow_mut().push((from, to));
        }),
    );
    log
}

#[test]
fn test_next_from_last_wraps_to_first() {
    let mut rt = Runtime::new();
    let (element, items) = gallery(&mut rt, true);
    assert_eq!(items.len(), 4);
    let carousel = Carousel::get_or_create_instance(&mut rt, element, Config::new()).unwrap();
    let log = slid_log(&mut rt, element);

    carousel.to(&mut rt, 3);
    assert_eq!(carousel.active_index(&rt), Some(3));
    carousel.next(&mut rt);
    assert_eq!(carousel.active_index(&rt), Some(0));
    carousel.prev(&mut rt);
    assert_eq!(carousel.active_index(&rt), Some(3));
    assert_eq!(*log.borrow(), [(0.0, 3.0), (3.0, 0.0), (0.0, 3.0)]);
}

#[test]
fn test_next_from_last_clamps_without_wrap() {
    let mut rt = Runtime::new();
    let (element, items) = gallery(&mut rt, false);
    let carousel = Carousel::get_or_create_instance(&mut rt, element, Config::new()).unwrap();
    let log = slid_log(&mut rt, element);

    carousel.prev(&mut rt);
    assert_eq!(carousel.active_index(&rt), Some(0));
    carousel.to(&mut rt, 3);
    carousel.next(&mut rt);
    assert_eq!(carousel.active_item(&rt), Some(items[3]));
    assert_eq!(log.borrow().len(), 1);
    assert_eq!(carousel.interval(), None);
}

#[test]
fn test_controls_drive_slides() {
    let mut rt = Runtime::new();
    carousel::install_data_api(&mut rt);
    let (element, items) = gallery(&mut rt, true);
    let next = rt.document.query_selector(element, "[data-bs-slide=\"next\"]").unwrap();
    let prev = rt.document.query_selector(element, "[data-bs-slide=\"prev\"]").unwrap();

    rt.click(prev);
    let carousel = Carousel::get_instance(&rt, element).unwrap();
    assert_eq!(carousel.active_item(&rt), Some(items[3]));
    rt.click(next);
    rt.click(next);
    assert_eq!(carousel.active_item(&rt), Some(items[1]));
    assert!(rt.document.has_class(items[1], "active"));
    assert!(!rt.document.has_class(items[0], "active"));
}

#[test]
fn test_to_without_active_item_adopts_target() {
    let mut rt = Runtime::new();
    let body = rt.document.body();
    for node in rt.document.parse_fragment(
        r#"<div id="bare" class="carousel slide" data-bs-interval="false">
             <div class="carousel-inner">
               <div class="carousel-item">A</div>
               <div class="carousel-item">B</div>
             </div>
           </div>"#,
    ) {
        rt.document.append_child(body, node);
    }
    let element = rt.document.get_element_by_id("bare").unwrap();
    let items = rt.document.query_selector_all(element, ".carousel-item");
    let carousel = Carousel::get_or_create_instance(&mut rt, element, Config::new()).unwrap();
    let log = slid_log(&mut rt, element);
    assert_eq!(carousel.active_index(&rt), None);

    carousel.to(&mut rt, 1);
    rt.advance(100);
    assert_eq!(carousel.active_item(&rt), Some(items[1]));
    assert!(!rt.document.has_class(items[0], "active"));
    assert_eq!(*log.borrow(), [(-1.0, 1.0)]);

    carousel.to(&mut rt, 0);
    rt.advance(100);
    assert_eq!(carousel.active_index(&rt), Some(0));
    assert_eq!(log.borrow().len(), 2);
}
