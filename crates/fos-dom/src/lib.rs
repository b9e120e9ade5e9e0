//! fOS DOM - Headless Document Object Model
//!
//! Arena-allocated element tree used by the widget layer: attributes,
//! classList, dataset, inline and computed style, selector matching and
//! focus bookkeeping. Nothing here renders; style values are plain strings
//! that callers seed the same way a stylesheet would.

mod classlist;
mod dataset;
mod document;
mod focus;
mod fragment;
mod node;
mod selector;
mod style;
mod tree;

pub use classlist::DOMTokenList;
pub use dataset::DOMStringMap;
pub use document::Document;
pub use focus::{TabIndex, FOCUSABLE_SELECTOR};
pub use node::{Attribute, ElementData, ElementMetrics, Node, NodeData};
pub use selector::{Selector, SelectorError};
pub use style::CssStyleDeclaration;
pub use tree::{Children, DomTree};

/// Node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Document root node ID
    pub const ROOT: NodeId = NodeId(0);

    /// Sentinel for "no node"
    pub const NONE: NodeId = NodeId(u32::MAX);

    /// Check whether this id points at a node
    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::NONE
    }

    /// Raw arena index
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_valid() {
            write!(f, "#{}", self.0)
        } else {
            f.write_str("#none")
        }
    }
}
