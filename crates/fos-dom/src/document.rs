//! Document - High-level document API

use std::ops::{Deref, DerefMut};

use crate::{DomTree, NodeId};

/// Default window width used until a caller sets one
const DEFAULT_INNER_WIDTH: f64 = 1280.0;
const DEFAULT_CLIENT_HEIGHT: f64 = 720.0;

/// HTML Document with its window-level state
#[derive(Debug)]
pub struct Document {
    /// The DOM tree
    pub tree: DomTree,
    html_element: NodeId,
    head_element: NodeId,
    body_element: NodeId,
    /// `window.innerWidth`
    inner_width: f64,
    /// Currently focused element, `NONE` meaning the document itself
    active_element: NodeId,
}

impl Document {
    /// Create `#document > html > (head, body)`
    pub fn new() -> Self {
        let mut tree = DomTree::new();

        let html = tree.create_element("html");
        let head = tree.create_element("head");
        let body = tree.create_element("body");

        tree.append_child(tree.root(), html);
        tree.append_child(html, head);
        tree.append_child(html, body);

        let mut doc = Self {
            tree,
            html_element: html,
            head_element: head,
            body_element: body,
            inner_width: DEFAULT_INNER_WIDTH,
            active_element: NodeId::NONE,
        };
        doc.set_inner_width(DEFAULT_INNER_WIDTH);
        doc.set_client_height(DEFAULT_CLIENT_HEIGHT);
        doc
    }

    /// `<html>` element
    pub fn document_element(&self) -> NodeId {
        self.html_element
    }

    /// `<head>` element
    pub fn head(&self) -> NodeId {
        self.head_element
    }

    /// `<body>` element
    pub fn body(&self) -> NodeId {
        self.body_element
    }

    /// Window width
    pub fn inner_width(&self) -> f64 {
        self.inner_width
    }

    /// Resize the window; the root element follows without a scrollbar
    pub fn set_inner_width(&mut self, width: f64) {
        self.inner_width = width;
        self.set_scrollbar_width(0.0);
    }

    /// Make the root element `scrollbar` pixels narrower than the window
    pub fn set_scrollbar_width(&mut self, scrollbar: f64) {
        let html = self.html_element;
        let mut metrics = self.tree.metrics(html);
        metrics.client_width = (self.inner_width - scrollbar).max(0.0);
        self.tree.set_metrics(html, metrics);
    }

    /// `document.documentElement.clientWidth`
    pub fn client_width(&self) -> f64 {
        self.tree.metrics(self.html_element).client_width
    }

    /// `document.documentElement.clientHeight`
    pub fn client_height(&self) -> f64 {
        self.tree.metrics(self.html_element).client_height
    }

    /// Set the viewport height seen through the root element
    pub fn set_client_height(&mut self, height: f64) {
        let html = self.html_element;
        let mut metrics = self.tree.metrics(html);
        metrics.client_height = height;
        self.tree.set_metrics(html, metrics);
    }

    /// Focused element, if any element holds focus
    pub fn active_element(&self) -> Option<NodeId> {
        self.active_element.is_valid().then_some(self.active_element)
    }

    /// Record focus; callers dispatch the focus events
    pub fn set_active_element(&mut self, id: Option<NodeId>) {
        self.active_element = id.unwrap_or(NodeId::NONE);
    }

    /// Access the DOM tree
    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    /// Access the DOM tree mutably
    pub fn tree_mut(&mut self) -> &mut DomTree {
        &mut self.tree
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for Document {
    type Target = DomTree;

    fn deref(&self) -> &DomTree {
        &self.tree
    }
}

impl DerefMut for Document {
    fn deref_mut(&mut self) -> &mut DomTree {
        &mut self.tree
    }
}
