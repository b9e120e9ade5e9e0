//! Option merging and type checking
//!
//! Every widget resolves its options the same way: built-in defaults, then
//! the JSON object in `data-bs-config`, then individual `data-bs-*`
//! attributes, then caller overrides. The merged bag is checked against the
//! widget's declared type patterns before the widget is built.

use std::collections::BTreeMap;

use fos_dom::{DomTree, NodeId};

use crate::value::{normalize_data, Value};
use crate::WidgetError;

const DATA_PREFIX: &str = "data-bs-";

/// Option bag
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    entries: BTreeMap<String, Value>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.entries.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.remove(key)
    }

    /// Overlay `other` on top of `self`
    pub fn merge(&mut self, other: Config) {
        self.entries.extend(other.entries);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Truthiness of an option, false when missing
    pub fn flag(&self, key: &str) -> bool {
        self.get(key).is_some_and(Value::is_truthy)
    }

    pub fn bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }

    pub fn number(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(Value::as_f64)
    }

    pub fn str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn element(&self, key: &str) -> Option<NodeId> {
        self.get(key).and_then(Value::as_element)
    }
}

impl From<BTreeMap<String, Value>> for Config {
    fn from(entries: BTreeMap<String, Value>) -> Self {
        Self { entries }
    }
}

impl<const N: usize> From<[(&str, Value); N]> for Config {
    fn from(pairs: [(&str, Value); N]) -> Self {
        Self {
            entries: pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        }
    }
}

/// Declared option types: `(option, pattern)` where the pattern lists the
/// accepted type names, e.g. `"(boolean|string)"`
pub type TypeTable = &'static [(&'static str, &'static str)];

/// Whether `type_name` is one of the pattern's alternatives
pub fn pattern_accepts(pattern: &str, type_name: &str) -> bool {
    pattern
        .trim_start_matches('(')
        .trim_end_matches(')')
        .split('|')
        .any(|alt| alt.trim() == type_name)
}

/// Validate a merged config against its type table
pub fn type_check(component: &str, config: &Config, types: TypeTable) -> Result<(), WidgetError> {
    for (option, expected) in types {
        let found = config.get(option).map_or("undefined", Value::type_name);
        if !pattern_accepts(expected, found) {
            return Err(WidgetError::ConfigType {
                component: component.to_ascii_uppercase(),
                option: (*option).to_string(),
                found: found.to_string(),
                expected: (*expected).to_string(),
            });
        }
    }
    Ok(())
}

/// `data-bs-*` attributes as options, camelCased without the `bs` prefix.
/// `data-bs-config` is excluded; it is merged separately.
pub fn data_attributes(tree: &DomTree, element: NodeId) -> Config {
    let Some(data) = tree.element(element) else {
        return Config::new();
    };
    let mut config = Config::new();
    for attr in &data.attrs {
        let Some(rest) = attr.name.strip_prefix(DATA_PREFIX) else {
            continue;
        };
        if rest == "config" {
            continue;
        }
        config.set(&camel_case(rest), normalize_data(&attr.value));
    }
    config
}

/// Normalized value of `data-bs-<key>` (key in camelCase)
pub fn get_data_attribute(tree: &DomTree, element: NodeId, key: &str) -> Option<Value> {
    tree.element(element)?
        .get_attr(&data_attribute_name(key))
        .map(normalize_data)
}

pub fn set_data_attribute(tree: &mut DomTree, element: NodeId, key: &str, value: &str) {
    tree.set_attribute(element, &data_attribute_name(key), value);
}

pub fn remove_data_attribute(tree: &mut DomTree, element: NodeId, key: &str) {
    tree.remove_attribute(element, &data_attribute_name(key));
}

fn data_attribute_name(key: &str) -> String {
    let mut name = String::from(DATA_PREFIX);
    for c in key.chars() {
        if c.is_ascii_uppercase() {
            name.push('-');
            name.push(c.to_ascii_lowercase());
        } else {
            name.push(c);
        }
    }
    name
}

fn camel_case(kebab: &str) -> String {
    let mut out = String::with_capacity(kebab.len());
    let mut upper = false;
    for c in kebab.chars() {
        if c == '-' {
            upper = true;
        } else if upper {
            out.push(c.to_ascii_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Merge defaults, `data-bs-config`, `data-bs-*` and overrides, in that order
pub fn merge_config(
    tree: &DomTree,
    element: Option<NodeId>,
    defaults: Config,
    overrides: Config,
) -> Config {
    let mut config = defaults;
    if let Some(element) = element.filter(|&e| tree.is_element(e)) {
        match get_data_attribute(tree, element, "config") {
            Some(Value::Object(json)) => config.merge(json.into()),
            Some(other) => {
                tracing::warn!("ignoring non-object data-bs-config on {element}: {}", other.to_json());
            }
            None => {}
        }
        config.merge(data_attributes(tree, element));
    }
    config.merge(overrides);
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_accepts() {
        assert!(pattern_accepts("(boolean|string)", "string"));
        assert!(pattern_accepts("boolean", "boolean"));
        assert!(!pattern_accepts("(string|element)", "number"));
        assert!(!pattern_accepts("(null|object)", "obj"));
    }

    #[test]
    fn test_type_check_message() {
        let config = Config::new().with("keyboard", "yes");
        let err = type_check("modal", &config, &[("keyboard", "boolean")]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "MODAL: Option \"keyboard\" provided type \"string\" but expected type \"boolean\"."
        );
    }

    #[test]
    fn test_missing_option_is_undefined() {
        let err = type_check("toast", &Config::new(), &[("delay", "number")]).unwrap_err();
        assert!(matches!(err, WidgetError::ConfigType { ref found, .. } if found == "undefined"));
    }

    #[test]
    fn test_merge_priority() {
        let mut tree = DomTree::new();
        let el = tree.create_element("div");
        tree.append_child(tree.root(), el);
        tree.set_attribute(el, "data-bs-config", r#"{"delay": 100, "autohide": false, "animation": false}"#);
        tree.set_attribute(el, "data-bs-delay", "250");
        tree.set_attribute(el, "data-bs-autohide", "true");
        tree.set_attribute(el, "data-other", "x");

        let defaults = Config::new()
            .with("animation", true)
            .with("autohide", true)
            .with("delay", 5000.0);
        let overrides = Config::new().with("autohide", false);
        let merged = merge_config(&tree, Some(el), defaults, overrides);

        assert_eq!(merged.bool("animation"), Some(false));
        assert_eq!(merged.number("delay"), Some(250.0));
        assert_eq!(merged.bool("autohide"), Some(false));
        assert!(!merged.contains("other"));
    }

    #[test]
    fn test_data_attribute_names() {
        let mut tree = DomTree::new();
        let el = tree.create_element("div");
        set_data_attribute(&mut tree, el, "paddingRight", "17px");
        assert_eq!(tree.get_attribute(el, "data-bs-padding-right").as_deref(), Some("17px"));
        assert_eq!(
            get_data_attribute(&tree, el, "paddingRight"),
            Some(Value::String("17px".into()))
        );
        tree.set_attribute(el, "data-bs-auto-close", "outside");
        assert_eq!(data_attributes(&tree, el).str("autoClose"), Some("outside"));
        remove_data_attribute(&mut tree, el, "paddingRight");
        assert_eq!(get_data_attribute(&tree, el, "paddingRight"), None);
    }
}
