//! Instance registry
//!
//! Maps `(element, component kind)` to the live widget instance. Entries are
//! released only by an explicit `remove`, which widgets call from `dispose`.

use std::any::Any;
use std::collections::HashMap;
use std::rc::Rc;

use fos_dom::NodeId;

/// Widget kinds that can be bound to an element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ComponentKind {
    Alert,
    Button,
    Carousel,
    Collapse,
    Dropdown,
    Modal,
    Offcanvas,
    Popover,
    Tab,
    Toast,
    Tooltip,
}

impl ComponentKind {
    pub const ALL: [ComponentKind; 11] = [
        Self::Alert,
        Self::Button,
        Self::Carousel,
        Self::Collapse,
        Self::Dropdown,
        Self::Modal,
        Self::Offcanvas,
        Self::Popover,
        Self::Tab,
        Self::Toast,
        Self::Tooltip,
    ];

    /// Lowercase widget name
    pub fn name(self) -> &'static str {
        match self {
            Self::Alert => "alert",
            Self::Button => "button",
            Self::Carousel => "carousel",
            Self::Collapse => "collapse",
            Self::Dropdown => "dropdown",
            Self::Modal => "modal",
            Self::Offcanvas => "offcanvas",
            Self::Popover => "popover",
            Self::Tab => "tab",
            Self::Toast => "toast",
            Self::Tooltip => "tooltip",
        }
    }

    /// `bs.<name>`
    pub fn data_key(self) -> String {
        format!("bs.{}", self.name())
    }

    /// `.bs.<name>`
    pub fn event_key(self) -> String {
        format!(".bs.{}", self.name())
    }

    /// `<event>.bs.<name>`
    pub fn event_name(self, event: &str) -> String {
        format!("{event}.bs.{}", self.name())
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }
}

impl std::fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Type-erased instance handle
pub type Instance = Rc<dyn Any>;

/// Process-wide element → instance map
#[derive(Default)]
pub struct InstanceRegistry {
    elements: HashMap<NodeId, HashMap<ComponentKind, Instance>>,
}

impl std::fmt::Debug for InstanceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for (element, kinds) in &self.elements {
            map.entry(element, &kinds.keys().collect::<Vec<_>>());
        }
        map.finish()
    }
}

impl InstanceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an instance. A different instance already bound under the
    /// same key wins; the new one is logged and dropped. Returns whether the
    /// registration took effect.
    pub fn set(&mut self, element: NodeId, kind: ComponentKind, instance: Instance) -> bool {
        let instances = self.elements.entry(element).or_default();
        if let Some(existing) = instances.get(&kind) {
            if Rc::ptr_eq(existing, &instance) {
                return true;
            }
            tracing::warn!(
                "refusing a second {kind} instance on {element}; bound: {:?}",
                instances.keys().next()
            );
            return false;
        }
        instances.insert(kind, instance);
        true
    }

    pub fn get(&self, element: NodeId, kind: ComponentKind) -> Option<Instance> {
        self.elements.get(&element)?.get(&kind).cloned()
    }

    /// Drop the entry; the element's bucket goes with its last key
    pub fn remove(&mut self, element: NodeId, kind: ComponentKind) -> Option<Instance> {
        let instances = self.elements.get_mut(&element)?;
        let removed = instances.remove(&kind);
        if instances.is_empty() {
            self.elements.remove(&element);
        }
        removed
    }

    /// Kinds bound to an element
    pub fn kinds(&self, element: NodeId) -> Vec<ComponentKind> {
        let mut kinds: Vec<_> = self
            .elements
            .get(&element)
            .map(|m| m.keys().copied().collect())
            .unwrap_or_default();
        kinds.sort();
        kinds
    }

    /// Elements with at least one instance
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}
