//! Placement engine seam
//!
//! Dropdowns, tooltips and popovers hand geometry to an external engine.
//! The runtime holds at most one; without it those widgets refuse to build.
//! `StaticPlacement` is a minimal engine that only records the resolved
//! placement on the floating element.

use std::collections::HashMap;

use fos_dom::{Document, NodeId};

use crate::value::Value;

/// Attachment returned by `attach`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlacementHandle(u32);

impl PlacementHandle {
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u32 {
        self.0
    }
}

/// Positioning strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    #[default]
    Absolute,
    Fixed,
}

/// Request passed to the engine
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementOptions {
    /// `top`, `bottom-start`, `auto`, ...
    pub placement: String,
    pub fallback_placements: Vec<String>,
    /// `(skidding, distance)` in pixels
    pub offset: (f64, f64),
    /// `clippingParents` or a selector/element description
    pub boundary: String,
    pub strategy: Strategy,
    /// Engine may not write styles (static dropdowns)
    pub apply_styles: bool,
}

impl Default for PlacementOptions {
    fn default() -> Self {
        Self {
            placement: String::from("bottom"),
            fallback_placements: Vec::new(),
            offset: (0.0, 0.0),
            boundary: String::from("clippingParents"),
            strategy: Strategy::Absolute,
            apply_styles: true,
        }
    }
}

/// Positions floating elements against a reference
pub trait PlacementEngine {
    fn attach(
        &mut self,
        doc: &mut Document,
        reference: NodeId,
        floating: NodeId,
        options: &PlacementOptions,
    ) -> PlacementHandle;

    /// Recompute after layout changes
    fn update(&mut self, doc: &mut Document, handle: PlacementHandle);

    fn detach(&mut self, doc: &mut Document, handle: PlacementHandle);
}

/// Parse an `offset` option: `"0,8"`, `[0, 8]` style lists or a number pair
pub fn parse_offset(value: &str) -> (f64, f64) {
    let mut parts = value
        .split(',')
        .map(|p| p.trim().parse::<f64>().unwrap_or(0.0));
    (parts.next().unwrap_or(0.0), parts.next().unwrap_or(0.0))
}

/// `offset` option as a string, a `[skidding, distance]` list or a number
pub(crate) fn offset_from_value(value: Option<&Value>) -> (f64, f64) {
    match value {
        Some(Value::String(s)) => parse_offset(s),
        Some(Value::Number(n)) => (*n, 0.0),
        Some(Value::List(items)) => {
            let mut numbers = items.iter().map(|v| v.as_f64().unwrap_or(0.0));
            (numbers.next().unwrap_or(0.0), numbers.next().unwrap_or(0.0))
        }
        _ => (0.0, 0.0),
    }
}

/// `boundary` option: a keyword, selector or element
pub(crate) fn boundary_from_value(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Element(node)) => node.to_string(),
        _ => String::from("clippingParents"),
    }
}

/// Overlay a `popperConfig` object onto computed options. Recognised keys:
/// `placement`, `strategy`, `fallbackPlacements`.
pub(crate) fn apply_popper_config(options: &mut PlacementOptions, popper_config: Option<&Value>) {
    let Some(map) = popper_config.and_then(Value::as_object) else {
        return;
    };
    if let Some(placement) = map.get("placement").and_then(Value::as_str) {
        options.placement = placement.to_string();
    }
    match map.get("strategy").and_then(Value::as_str) {
        Some("fixed") => options.strategy = Strategy::Fixed,
        Some("absolute") => options.strategy = Strategy::Absolute,
        _ => {}
    }
    if let Some(Value::List(items)) = map.get("fallbackPlacements") {
        options.fallback_placements = items.iter().filter_map(Value::as_str).map(String::from).collect();
    }
}

#[derive(Debug)]
struct Attachment {
    reference: NodeId,
    floating: NodeId,
    placement: String,
    updates: u32,
}

/// Engine that resolves `auto` to the first fallback (or `top`) and
/// writes `data-popper-placement`; no geometry
#[derive(Debug, Default)]
pub struct StaticPlacement {
    next: u32,
    attached: HashMap<PlacementHandle, Attachment>,
}

impl StaticPlacement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attached_count(&self) -> usize {
        self.attached.len()
    }

    /// Updates seen by a live attachment
    pub fn update_count(&self, handle: PlacementHandle) -> Option<u32> {
        self.attached.get(&handle).map(|a| a.updates)
    }

    /// Reference and floating element of a live attachment
    pub fn elements(&self, handle: PlacementHandle) -> Option<(NodeId, NodeId)> {
        self.attached.get(&handle).map(|a| (a.reference, a.floating))
    }
}

impl PlacementEngine for StaticPlacement {
    fn attach(
        &mut self,
        doc: &mut Document,
        reference: NodeId,
        floating: NodeId,
        options: &PlacementOptions,
    ) -> PlacementHandle {
        self.next += 1;
        let handle = PlacementHandle(self.next);
        let placement = if options.placement == "auto" {
            options
                .fallback_placements
                .first()
                .cloned()
                .unwrap_or_else(|| String::from("top"))
        } else {
            options.placement.clone()
        };
        if options.apply_styles {
            doc.set_attribute(floating, "data-popper-placement", &placement);
        }
        tracing::trace!("placing {floating} {placement} of {reference}");
        self.attached.insert(
            handle,
            Attachment {
                reference,
                floating,
                placement,
                updates: 0,
            },
        );
        handle
    }

    fn update(&mut self, doc: &mut Document, handle: PlacementHandle) {
        if let Some(attachment) = self.attached.get_mut(&handle) {
            attachment.updates += 1;
            if doc.has_attribute(attachment.floating, "data-popper-placement") {
                doc.set_attribute(attachment.floating, "data-popper-placement", &attachment.placement);
            }
        }
    }

    fn detach(&mut self, doc: &mut Document, handle: PlacementHandle) {
        if let Some(attachment) = self.attached.remove(&handle) {
            doc.remove_attribute(attachment.floating, "data-popper-placement");
        }
    }
}
