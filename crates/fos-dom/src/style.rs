//! Inline style declarations
//!
//! Ordered `property: value` list behind an element's `style` attribute.

/// CSSStyleDeclaration for one element's inline style
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CssStyleDeclaration {
    declarations: Vec<(String, String)>,
}

impl CssStyleDeclaration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `a: b; c: d`
    pub fn parse(text: &str) -> Self {
        let mut style = Self::new();
        for decl in text.split(';') {
            if let Some((prop, value)) = decl.split_once(':') {
                style.set_property(prop.trim(), value.trim());
            }
        }
        style
    }

    /// Value of a property, empty string when unset (matches the DOM API)
    pub fn get_property_value(&self, property: &str) -> &str {
        self.get(property).unwrap_or("")
    }

    pub fn get(&self, property: &str) -> Option<&str> {
        self.declarations
            .iter()
            .find(|(p, _)| p == property)
            .map(|(_, v)| v.as_str())
    }

    /// Set a property; an empty value removes it
    pub fn set_property(&mut self, property: &str, value: &str) {
        if value.is_empty() {
            self.remove_property(property);
            return;
        }
        if let Some(slot) = self.declarations.iter_mut().find(|(p, _)| p == property) {
            slot.1 = value.to_string();
        } else {
            self.declarations
                .push((property.to_string(), value.to_string()));
        }
    }

    /// Remove a property, returning its old value
    pub fn remove_property(&mut self, property: &str) -> Option<String> {
        let pos = self.declarations.iter().position(|(p, _)| p == property)?;
        Some(self.declarations.remove(pos).1)
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    /// Serialized `style` attribute text
    pub fn css_text(&self) -> String {
        self.declarations
            .iter()
            .map(|(p, v)| format!("{p}: {v};"))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_serialize() {
        let style = CssStyleDeclaration::parse("display: block; padding-right: 15px");
        assert_eq!(style.get_property_value("display"), "block");
        assert_eq!(style.get_property_value("padding-right"), "15px");
        assert_eq!(style.css_text(), "display: block; padding-right: 15px;");
    }

    #[test]
    fn test_empty_value_removes() {
        let mut style = CssStyleDeclaration::new();
        style.set_property("height", "120px");
        style.set_property("height", "");
        assert!(style.is_empty());
        assert_eq!(style.get_property_value("height"), "");
    }
}
