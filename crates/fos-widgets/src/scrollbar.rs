//! Scrollbar compensation
//!
//! When an overlay locks page scrolling the native scrollbar disappears and
//! the layout would jump sideways. The helper pads the body and fixed
//! content by the scrollbar width and pulls sticky content back, saving
//! inline values into `data-bs-*` so `reset` can put them back verbatim.

use fos_dom::{Document, NodeId};

use crate::config::{remove_data_attribute, set_data_attribute};

const SELECTOR_FIXED_CONTENT: &str = ".fixed-top, .fixed-bottom, .is-fixed, .sticky-top";
const SELECTOR_STICKY_CONTENT: &str = ".sticky-top";
const PROPERTY_PADDING: &str = "padding-right";
const PROPERTY_MARGIN: &str = "margin-right";

enum Targets<'a> {
    Body,
    Matching(&'a str),
}

/// Scroll lock for the document body
#[derive(Debug, Clone, Copy, Default)]
pub struct ScrollBarHelper;

impl ScrollBarHelper {
    pub fn new() -> Self {
        Self
    }

    /// Viewport width minus root element width
    pub fn width(&self, doc: &Document) -> f64 {
        (doc.inner_width() - doc.client_width()).abs()
    }

    pub fn is_overflowing(&self, doc: &Document) -> bool {
        self.width(doc) > 0.0
    }

    /// Lock scrolling and compensate for the vanished scrollbar
    pub fn hide(&self, doc: &mut Document) {
        let width = self.width(doc);
        let body = doc.body();
        save_initial(doc, body, "overflow");
        doc.set_style(body, "overflow", "hidden");
        self.adjust(doc, Targets::Body, PROPERTY_PADDING, |v| v + width);
        self.adjust(doc, Targets::Matching(SELECTOR_FIXED_CONTENT), PROPERTY_PADDING, |v| v + width);
        self.adjust(doc, Targets::Matching(SELECTOR_STICKY_CONTENT), PROPERTY_MARGIN, |v| v - width);
        tracing::debug!("scrollbar hidden, compensating {width}px");
    }

    /// Restore everything `hide` touched
    pub fn reset(&self, doc: &mut Document) {
        self.restore(doc, Targets::Body, "overflow");
        self.restore(doc, Targets::Body, PROPERTY_PADDING);
        self.restore(doc, Targets::Matching(SELECTOR_FIXED_CONTENT), PROPERTY_PADDING);
        self.restore(doc, Targets::Matching(SELECTOR_STICKY_CONTENT), PROPERTY_MARGIN);
    }

    fn elements(&self, doc: &Document, targets: &Targets<'_>) -> Vec<NodeId> {
        match targets {
            Targets::Body => vec![doc.body()],
            Targets::Matching(selector) => doc.query_selector_all(doc.body(), selector),
        }
    }

    fn adjust(&self, doc: &mut Document, targets: Targets<'_>, property: &str, f: impl Fn(f64) -> f64) {
        let scrollbar = self.width(doc);
        let body = doc.body();
        for element in self.elements(doc, &targets) {
            // elements narrower than the viewport are not pinned to its edge
            if element != body && doc.inner_width() > doc.metrics(element).client_width + scrollbar {
                continue;
            }
            save_initial(doc, element, property);
            let computed = parse_px(&doc.computed_style(element, property));
            doc.set_style(element, property, &format!("{}px", f(computed)));
        }
    }

    fn restore(&self, doc: &mut Document, targets: Targets<'_>, property: &str) {
        for element in self.elements(doc, &targets) {
            let saved = doc.get_attribute(element, &format!("data-bs-{property}"));
            match saved {
                Some(value) => {
                    remove_data_attribute(doc, element, property);
                    doc.set_style(element, property, &value);
                }
                None => doc.remove_style(element, property),
            }
        }
    }
}

fn save_initial(doc: &mut Document, element: NodeId, property: &str) {
    let actual = doc
        .style(element)
        .map(|s| s.get_property_value(property).to_string())
        .unwrap_or_default();
    if !actual.is_empty() {
        set_data_attribute(doc, element, property, &actual);
    }
}

/// Leading number of a CSS length; zero when there is none
fn parse_px(value: &str) -> f64 {
    let end = value
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || c == '.' || (i == 0 && c == '-')))
        .map_or(value.len(), |(i, _)| i);
    value[..end].parse().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fos_dom::ElementMetrics;

    fn page(scrollbar: f64) -> Document {
        let mut doc = Document::new();
        doc.set_inner_width(1000.0);
        doc.set_scrollbar_width(scrollbar);
        doc
    }

    #[test]
    fn test_parse_px() {
        assert_eq!(parse_px("17px"), 17.0);
        assert_eq!(parse_px("-2.5px"), -2.5);
        assert_eq!(parse_px(""), 0.0);
        assert_eq!(parse_px("auto"), 0.0);
    }

    #[test]
    fn test_width_and_overflow() {
        let doc = page(15.0);
        let helper = ScrollBarHelper::new();
        assert_eq!(helper.width(&doc), 15.0);
        assert!(helper.is_overflowing(&doc));
        assert!(!helper.is_overflowing(&page(0.0)));
    }

    #[test]
    fn test_hide_reset_restores_inline_styles() {
        let mut doc = page(15.0);
        let body = doc.body();
        doc.set_style(body, "padding-right", "10px");
        doc.set_computed(body, "padding-right", "10px");

        let helper = ScrollBarHelper::new();
        helper.hide(&mut doc);
        assert_eq!(doc.computed_style(body, "padding-right"), "25px");
        assert_eq!(doc.computed_style(body, "overflow"), "hidden");
        assert_eq!(doc.get_attribute(body, "data-bs-padding-right").as_deref(), Some("10px"));

        helper.reset(&mut doc);
        assert_eq!(doc.style(body).unwrap().get_property_value("padding-right"), "10px");
        assert_eq!(doc.style(body).unwrap().get("overflow"), None);
        assert!(!doc.has_attribute(body, "data-bs-padding-right"));
    }

    #[test]
    fn test_fixed_and_sticky_content() {
        let mut doc = page(20.0);
        let body = doc.body();
        let navbar = doc.create_element("nav");
        doc.add_class(navbar, &["fixed-top"]);
        let sticky = doc.create_element("div");
        doc.add_class(sticky, &["sticky-top"]);
        let narrow = doc.create_element("div");
        doc.add_class(narrow, &["is-fixed"]);
        for el in [navbar, sticky, narrow] {
            doc.append_child(body, el);
        }
        let full = ElementMetrics { client_width: 980.0, ..Default::default() };
        doc.set_metrics(navbar, full);
        doc.set_metrics(sticky, full);
        doc.set_metrics(narrow, ElementMetrics { client_width: 300.0, ..Default::default() });

        let helper = ScrollBarHelper::new();
        helper.hide(&mut doc);
        assert_eq!(doc.computed_style(navbar, "padding-right"), "20px");
        assert_eq!(doc.computed_style(sticky, "margin-right"), "-20px");
        assert_eq!(doc.computed_style(narrow, "padding-right"), "");

        helper.reset(&mut doc);
        for el in [navbar, sticky, narrow] {
            assert!(doc.style(el).unwrap().is_empty());
        }
    }
}
