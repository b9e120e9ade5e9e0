//! DOM Node
//!
//! Nodes link to their relatives through `NodeId`s instead of pointers so the
//! whole tree lives in one `Vec` and ids stay `Copy`.

use std::collections::HashMap;

use crate::{CssStyleDeclaration, DOMTokenList, NodeId};

/// DOM Node - Core structure
#[derive(Debug)]
pub struct Node {
    /// Parent node (NONE if detached or root)
    pub parent: NodeId,
    /// First child
    pub first_child: NodeId,
    /// Last child (for O(1) append)
    pub last_child: NodeId,
    /// Previous sibling
    pub prev_sibling: NodeId,
    /// Next sibling
    pub next_sibling: NodeId,
    /// Node-specific data
    pub data: NodeData,
}

impl Node {
    fn with_data(data: NodeData) -> Self {
        Self {
            parent: NodeId::NONE,
            first_child: NodeId::NONE,
            last_child: NodeId::NONE,
            prev_sibling: NodeId::NONE,
            next_sibling: NodeId::NONE,
            data,
        }
    }

    /// Create a new element node
    pub fn element(tag_name: &str) -> Self {
        Self::with_data(NodeData::Element(ElementData::new(tag_name)))
    }

    /// Create a new text node
    pub fn text(content: String) -> Self {
        Self::with_data(NodeData::Text(content))
    }

    /// Create a document node
    pub fn document() -> Self {
        Self::with_data(NodeData::Document)
    }

    /// Check if this is an element
    #[inline]
    pub fn is_element(&self) -> bool {
        matches!(self.data, NodeData::Element(_))
    }

    /// Get element data if this is an element
    #[inline]
    pub fn as_element(&self) -> Option<&ElementData> {
        match &self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Get mutable element data
    #[inline]
    pub fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        match &mut self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Get text content if this is a text node
    #[inline]
    pub fn as_text(&self) -> Option<&str> {
        match &self.data {
            NodeData::Text(t) => Some(t),
            _ => None,
        }
    }
}

/// Node-specific data
#[derive(Debug)]
pub enum NodeData {
    /// Document root
    Document,
    /// Element
    Element(ElementData),
    /// Text content
    Text(String),
}

/// Layout numbers a real engine would compute. The headless tree only
/// stores what it is told.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ElementMetrics {
    pub client_width: f64,
    pub client_height: f64,
    pub offset_width: f64,
    pub offset_height: f64,
    pub scroll_width: f64,
    pub scroll_height: f64,
}

/// Element-specific data
#[derive(Debug)]
pub struct ElementData {
    /// Lowercase tag name
    pub tag_name: String,
    /// Attributes other than `class`
    pub attrs: Vec<Attribute>,
    /// Backing store for the `class` attribute
    pub class_list: DOMTokenList,
    /// Inline `style` declarations
    pub style: CssStyleDeclaration,
    /// Stylesheet layer consulted by computed-style lookups
    pub sheet: HashMap<String, String>,
    /// Seeded layout metrics
    pub metrics: ElementMetrics,
}

impl ElementData {
    pub fn new(tag_name: &str) -> Self {
        Self {
            tag_name: tag_name.to_ascii_lowercase(),
            attrs: Vec::new(),
            class_list: DOMTokenList::new(),
            style: CssStyleDeclaration::new(),
            sheet: HashMap::new(),
            metrics: ElementMetrics::default(),
        }
    }

    /// Get an attribute value
    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Set an attribute
    pub fn set_attr(&mut self, name: &str, value: &str) {
        if let Some(attr) = self.attrs.iter_mut().find(|a| a.name == name) {
            attr.value = value.to_string();
            return;
        }
        self.attrs.push(Attribute {
            name: name.to_string(),
            value: value.to_string(),
        });
    }

    /// Remove an attribute, returns whether it existed
    pub fn remove_attr(&mut self, name: &str) -> bool {
        let before = self.attrs.len();
        self.attrs.retain(|a| a.name != name);
        self.attrs.len() != before
    }

    /// `id` attribute
    pub fn id(&self) -> Option<&str> {
        self.get_attr("id")
    }
}

/// Attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}
