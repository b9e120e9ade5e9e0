//! Focusability
//!
//! Which elements can take keyboard focus, and visibility/disabled checks
//! shared with the widget layer.

use crate::{DomTree, NodeId};

/// Candidates for keyboard focus before the disabled/visible filter
pub const FOCUSABLE_SELECTOR: &str = concat!(
    "a:not([tabindex^='-']), button:not([tabindex^='-']), input:not([tabindex^='-']), ",
    "textarea:not([tabindex^='-']), select:not([tabindex^='-']), details:not([tabindex^='-']), ",
    "[tabindex]:not([tabindex^='-']), [contenteditable='true']:not([tabindex^='-'])"
);

/// Tab index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabIndex {
    /// `tabindex="-1"`, unparsable or absent
    NotFocusable,
    /// `tabindex="0"` or positive
    Sequential(i32),
}

impl TabIndex {
    pub fn parse(value: &str) -> Self {
        match value.trim().parse::<i32>() {
            Ok(n) if n >= 0 => Self::Sequential(n),
            _ => Self::NotFocusable,
        }
    }

    pub fn is_focusable(&self) -> bool {
        matches!(self, Self::Sequential(_))
    }
}

impl DomTree {
    /// `disabled` attribute or `.disabled` class
    pub fn is_disabled(&self, id: NodeId) -> bool {
        let Some(element) = self.element(id) else {
            return true;
        };
        element.class_list.contains("disabled")
            || element
                .get_attr("disabled")
                .is_some_and(|v| v != "false")
    }

    /// Connected, not `hidden`, and no inclusive ancestor is `display: none`
    /// or `visibility: hidden`
    pub fn is_visible(&self, id: NodeId) -> bool {
        if !self.is_element(id) || !self.is_connected(id) {
            return false;
        }
        std::iter::once(id)
            .chain(self.ancestors(id))
            .filter(|&n| self.is_element(n))
            .all(|n| {
                self.computed_style(n, "display") != "none"
                    && self.computed_style(n, "visibility") != "hidden"
                    && !self.has_attribute(n, "hidden")
            })
    }

    /// Focusable descendants in document order
    pub fn focusable_children(&self, id: NodeId) -> Vec<NodeId> {
        self.query_selector_all(id, FOCUSABLE_SELECTOR)
            .into_iter()
            .filter(|&n| !self.is_disabled(n) && self.is_visible(n))
            .collect()
    }
}
