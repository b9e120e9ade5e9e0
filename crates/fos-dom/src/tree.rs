//! DOM Tree (arena-based allocation)
//!
//! Removing a node only detaches it; its slot stays in the arena so stale
//! `NodeId`s never alias a different node.

use crate::{
    CssStyleDeclaration, DOMStringMap, DOMTokenList, ElementData, ElementMetrics, Node, NodeId,
    Selector,
};

/// Arena-based DOM tree
#[derive(Debug)]
pub struct DomTree {
    nodes: Vec<Node>,
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DomTree {
    /// Create a tree holding only the document node
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::document()],
        }
    }

    /// Document node
    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by ID
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0 as usize)
    }

    /// Get a mutable node by ID
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0 as usize)
    }

    /// Number of nodes ever allocated
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Create a detached element
    pub fn create_element(&mut self, tag_name: &str) -> NodeId {
        self.push(Node::element(tag_name))
    }

    /// Create a detached text node
    pub fn create_text(&mut self, content: &str) -> NodeId {
        self.push(Node::text(content.to_string()))
    }

    /// Append `child` as last child of `parent`, detaching it first
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if self.get(parent).is_none() || self.get(child).is_none() || self.contains(child, parent) {
            tracing::warn!("append_child({parent}, {child}) rejected");
            return;
        }
        self.remove(child);

        let last = self.nodes[parent.0 as usize].last_child;
        {
            let node = &mut self.nodes[child.0 as usize];
            node.parent = parent;
            node.prev_sibling = last;
            node.next_sibling = NodeId::NONE;
        }
        if last.is_valid() {
            self.nodes[last.0 as usize].next_sibling = child;
        } else {
            self.nodes[parent.0 as usize].first_child = child;
        }
        self.nodes[parent.0 as usize].last_child = child;
    }

    /// Detach a node from its parent; no-op if already detached
    pub fn remove(&mut self, id: NodeId) {
        let Some(node) = self.get(id) else {
            return;
        };
        let (parent, prev, next) = (node.parent, node.prev_sibling, node.next_sibling);
        if !parent.is_valid() {
            return;
        }

        if prev.is_valid() {
            self.nodes[prev.0 as usize].next_sibling = next;
        } else {
            self.nodes[parent.0 as usize].first_child = next;
        }
        if next.is_valid() {
            self.nodes[next.0 as usize].prev_sibling = prev;
        } else {
            self.nodes[parent.0 as usize].last_child = prev;
        }

        let node = &mut self.nodes[id.0 as usize];
        node.parent = NodeId::NONE;
        node.prev_sibling = NodeId::NONE;
        node.next_sibling = NodeId::NONE;
    }

    /// Concatenated text of the node and its descendants
    pub fn text_content(&self, id: NodeId) -> String {
        if let Some(text) = self.get(id).and_then(Node::as_text) {
            return text.to_string();
        }
        self.descendants(id)
            .into_iter()
            .filter_map(|n| self.get(n).and_then(Node::as_text))
            .collect()
    }

    /// Replace all children with a single text node
    pub fn set_text_content(&mut self, id: NodeId, text: &str) {
        self.clear_children(id);
        if !text.is_empty() {
            let node = self.create_text(text);
            self.append_child(id, node);
        }
    }

    /// Detach every child of `id`
    pub fn clear_children(&mut self, id: NodeId) {
        let children: Vec<NodeId> = self.children(id).map(|(c, _)| c).collect();
        for child in children {
            self.remove(child);
        }
    }

    /// Parent node, if attached
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).map(|n| n.parent).filter(|p| p.is_valid())
    }

    /// Iterate direct children
    pub fn children(&self, id: NodeId) -> Children<'_> {
        Children {
            tree: self,
            next: self.get(id).map_or(NodeId::NONE, |n| n.first_child),
        }
    }

    /// Direct element children
    pub fn child_elements(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id)
            .filter(|(_, node)| node.is_element())
            .map(|(child, _)| child)
            .collect()
    }

    /// Ancestors from parent up to the document, excluding `id`
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&n| self.parent(n))
    }

    /// Preorder descendants, excluding `id`
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).map(|(c, _)| c).collect();
        stack.reverse();
        while let Some(node) = stack.pop() {
            out.push(node);
            let mut kids: Vec<NodeId> = self.children(node).map(|(c, _)| c).collect();
            kids.reverse();
            stack.extend(kids);
        }
        out
    }

    /// Inclusive containment (`a.contains(a)` is true)
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        if !ancestor.is_valid() || !node.is_valid() {
            return false;
        }
        node == ancestor || self.ancestors(node).any(|a| a == ancestor)
    }

    /// Whether the node is reachable from the document node
    pub fn is_connected(&self, id: NodeId) -> bool {
        self.contains(NodeId::ROOT, id)
    }

    /// Previous element sibling
    pub fn previous_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let mut cur = self.get(id)?.prev_sibling;
        while cur.is_valid() {
            if self.is_element(cur) {
                return Some(cur);
            }
            cur = self.nodes[cur.0 as usize].prev_sibling;
        }
        None
    }

    /// Next element sibling
    pub fn next_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let mut cur = self.get(id)?.next_sibling;
        while cur.is_valid() {
            if self.is_element(cur) {
                return Some(cur);
            }
            cur = self.nodes[cur.0 as usize].next_sibling;
        }
        None
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.get(id).is_some_and(Node::is_element)
    }

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id)?.as_element()
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        self.get_mut(id)?.as_element_mut()
    }

    /// Lowercase tag name, empty for non-elements
    pub fn tag_name(&self, id: NodeId) -> &str {
        self.element(id).map_or("", |e| e.tag_name.as_str())
    }

    // --- attributes ---

    /// Attribute value; `class` is served from the class list
    pub fn get_attribute(&self, id: NodeId, name: &str) -> Option<String> {
        let element = self.element(id)?;
        if name == "class" {
            return (!element.class_list.is_empty()).then(|| element.class_list.value());
        }
        if name == "style" {
            return (!element.style.is_empty()).then(|| element.style.css_text());
        }
        element.get_attr(name).map(str::to_string)
    }

    pub fn has_attribute(&self, id: NodeId, name: &str) -> bool {
        self.get_attribute(id, name).is_some()
    }

    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) {
        let Some(element) = self.element_mut(id) else {
            return;
        };
        match name {
            "class" => element.class_list.set_value(value),
            "style" => element.style = CssStyleDeclaration::parse(value),
            _ => element.set_attr(name, value),
        }
    }

    pub fn remove_attribute(&mut self, id: NodeId, name: &str) {
        let Some(element) = self.element_mut(id) else {
            return;
        };
        match name {
            "class" => element.class_list = DOMTokenList::new(),
            "style" => element.style = CssStyleDeclaration::new(),
            _ => {
                element.remove_attr(name);
            }
        }
    }

    /// `data-*` attributes as a camelCase map
    pub fn dataset(&self, id: NodeId) -> DOMStringMap {
        self.element(id).map_or_else(DOMStringMap::new, |e| {
            DOMStringMap::from_attributes(e.attrs.iter().map(|a| (a.name.as_str(), a.value.as_str())))
        })
    }

    // --- classList ---

    pub fn class_list(&self, id: NodeId) -> Option<&DOMTokenList> {
        self.element(id).map(|e| &e.class_list)
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.class_list(id).is_some_and(|c| c.contains(class))
    }

    pub fn add_class(&mut self, id: NodeId, classes: &[&str]) {
        if let Some(e) = self.element_mut(id) {
            e.class_list.add(classes);
        }
    }

    pub fn remove_class(&mut self, id: NodeId, classes: &[&str]) {
        if let Some(e) = self.element_mut(id) {
            e.class_list.remove(classes);
        }
    }

    pub fn toggle_class(&mut self, id: NodeId, class: &str, force: Option<bool>) -> bool {
        self.element_mut(id)
            .is_some_and(|e| e.class_list.toggle(class, force))
    }

    // --- style ---

    pub fn style(&self, id: NodeId) -> Option<&CssStyleDeclaration> {
        self.element(id).map(|e| &e.style)
    }

    /// Set an inline style property; empty value removes it
    pub fn set_style(&mut self, id: NodeId, property: &str, value: &str) {
        if let Some(e) = self.element_mut(id) {
            e.style.set_property(property, value);
        }
    }

    pub fn remove_style(&mut self, id: NodeId, property: &str) {
        if let Some(e) = self.element_mut(id) {
            e.style.remove_property(property);
        }
    }

    /// Seed the stylesheet layer for an element
    pub fn set_computed(&mut self, id: NodeId, property: &str, value: &str) {
        if let Some(e) = self.element_mut(id) {
            e.sheet.insert(property.to_string(), value.to_string());
        }
    }

    /// Inline value if present, else the stylesheet value, else empty
    pub fn computed_style(&self, id: NodeId, property: &str) -> String {
        let Some(e) = self.element(id) else {
            return String::new();
        };
        e.style
            .get(property)
            .or_else(|| e.sheet.get(property).map(String::as_str))
            .unwrap_or_default()
            .to_string()
    }

    // --- metrics ---

    pub fn metrics(&self, id: NodeId) -> ElementMetrics {
        self.element(id).map(|e| e.metrics).unwrap_or_default()
    }

    pub fn set_metrics(&mut self, id: NodeId, metrics: ElementMetrics) {
        if let Some(e) = self.element_mut(id) {
            e.metrics = metrics;
        }
    }

    // --- selectors ---

    /// Match against a selector string; unparsable selectors never match
    pub fn matches(&self, id: NodeId, selector: &str) -> bool {
        match Selector::parse(selector) {
            Ok(sel) => sel.matches(self, id, None),
            Err(err) => {
                tracing::warn!("invalid selector {selector:?}: {err}");
                false
            }
        }
    }

    /// Nearest inclusive ancestor matching `selector`
    pub fn closest(&self, id: NodeId, selector: &str) -> Option<NodeId> {
        let sel = Selector::parse(selector).ok()?;
        std::iter::once(id)
            .chain(self.ancestors(id))
            .find(|&n| sel.matches(self, n, None))
    }

    /// All matching descendants of `scope` in document order
    pub fn query_selector_all(&self, scope: NodeId, selector: &str) -> Vec<NodeId> {
        let sel = match Selector::parse(selector) {
            Ok(sel) => sel,
            Err(err) => {
                tracing::warn!("invalid selector {selector:?}: {err}");
                return Vec::new();
            }
        };
        let scope_ref = (scope != NodeId::ROOT).then_some(scope);
        self.descendants(scope)
            .into_iter()
            .filter(|&n| sel.matches(self, n, scope_ref))
            .collect()
    }

    /// First matching descendant of `scope`
    pub fn query_selector(&self, scope: NodeId, selector: &str) -> Option<NodeId> {
        self.query_selector_all(scope, selector).into_iter().next()
    }

    /// Direct element children matching `selector`
    pub fn children_matching(&self, id: NodeId, selector: &str) -> Vec<NodeId> {
        self.child_elements(id)
            .into_iter()
            .filter(|&c| self.matches(c, selector))
            .collect()
    }

    /// First element with the given `id` attribute
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.descendants(NodeId::ROOT)
            .into_iter()
            .find(|&n| self.element(n).and_then(ElementData::id) == Some(id))
    }
}

/// Iterator over a node's children
pub struct Children<'a> {
    tree: &'a DomTree,
    next: NodeId,
}

impl<'a> Iterator for Children<'a> {
    type Item = (NodeId, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next;
        let node = self.tree.get(id)?;
        self.next = node.next_sibling;
        Some((id, node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_and_siblings() {
        let mut tree = DomTree::new();
        let ul = tree.create_element("ul");
        let a = tree.create_element("li");
        let b = tree.create_element("li");
        let c = tree.create_element("li");
        tree.append_child(tree.root(), ul);
        for li in [a, b, c] {
            tree.append_child(ul, li);
        }

        assert_eq!(tree.child_elements(ul), vec![a, b, c]);
        assert_eq!(tree.next_element_sibling(a), Some(b));
        assert_eq!(tree.previous_element_sibling(c), Some(b));

        tree.remove(b);
        assert_eq!(tree.child_elements(ul), vec![a, c]);
        assert!(!tree.is_connected(b));
        assert!(tree.is_connected(c));
    }

    #[test]
    fn test_reappend_moves_node() {
        let mut tree = DomTree::new();
        let left = tree.create_element("div");
        let right = tree.create_element("div");
        let item = tree.create_element("span");
        tree.append_child(tree.root(), left);
        tree.append_child(tree.root(), right);
        tree.append_child(left, item);
        tree.append_child(right, item);

        assert!(tree.child_elements(left).is_empty());
        assert_eq!(tree.parent(item), Some(right));
    }

    #[test]
    fn test_cycle_rejected() {
        let mut tree = DomTree::new();
        let outer = tree.create_element("div");
        let inner = tree.create_element("div");
        tree.append_child(tree.root(), outer);
        tree.append_child(outer, inner);
        tree.append_child(inner, outer);
        assert_eq!(tree.parent(outer), Some(tree.root()));
    }

    #[test]
    fn test_class_attribute_roundtrip() {
        let mut tree = DomTree::new();
        let div = tree.create_element("div");
        tree.set_attribute(div, "class", "modal fade");
        tree.add_class(div, &["show"]);
        assert_eq!(tree.get_attribute(div, "class").as_deref(), Some("modal fade show"));
        tree.remove_class(div, &["modal", "fade", "show"]);
        assert_eq!(tree.get_attribute(div, "class"), None);
    }

    #[test]
    fn test_computed_prefers_inline() {
        let mut tree = DomTree::new();
        let div = tree.create_element("div");
        tree.set_computed(div, "padding-right", "4px");
        assert_eq!(tree.computed_style(div, "padding-right"), "4px");
        tree.set_style(div, "padding-right", "21px");
        assert_eq!(tree.computed_style(div, "padding-right"), "21px");
        assert_eq!(tree.computed_style(div, "margin-right"), "");
    }

    #[test]
    fn test_queries() {
        let mut tree = DomTree::new();
        let menu = tree.create_element("div");
        tree.set_attribute(menu, "class", "dropdown-menu");
        let item = tree.create_element("a");
        tree.set_attribute(item, "class", "dropdown-item");
        tree.set_attribute(item, "id", "first");
        tree.append_child(tree.root(), menu);
        tree.append_child(menu, item);

        assert_eq!(tree.query_selector_all(tree.root(), ".dropdown-menu .dropdown-item"), vec![item]);
        assert_eq!(tree.closest(item, ".dropdown-menu"), Some(menu));
        assert_eq!(tree.closest(item, ".navbar"), None);
        assert_eq!(tree.get_element_by_id("first"), Some(item));
    }
}
