//! DOMTokenList (classList)
//!
//! Class membership is the whole presentation contract between widgets and
//! the stylesheet, so this list keeps insertion order and never duplicates.

/// Space-separated token set backing an element's `class` attribute
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DOMTokenList {
    tokens: Vec<String>,
}

impl DOMTokenList {
    /// Create empty token list
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from space-separated string, dropping duplicates
    pub fn from_string(s: &str) -> Self {
        let mut list = Self::new();
        for token in s.split_whitespace() {
            list.add(&[token]);
        }
        list
    }

    /// Number of tokens
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Token at index
    pub fn item(&self, index: usize) -> Option<&str> {
        self.tokens.get(index).map(String::as_str)
    }

    /// Check if token exists
    pub fn contains(&self, token: &str) -> bool {
        self.tokens.iter().any(|t| t == token)
    }

    /// Add token(s); empty tokens are ignored
    pub fn add(&mut self, tokens: &[&str]) {
        for token in tokens {
            if !token.is_empty() && !self.contains(token) {
                self.tokens.push((*token).to_string());
            }
        }
    }

    /// Remove token(s)
    pub fn remove(&mut self, tokens: &[&str]) {
        self.tokens.retain(|t| !tokens.contains(&t.as_str()));
    }

    /// Toggle token, returns new membership
    pub fn toggle(&mut self, token: &str, force: Option<bool>) -> bool {
        let present = force.unwrap_or(!self.contains(token));
        if present {
            self.add(&[token]);
        } else {
            self.remove(&[token]);
        }
        present
    }

    /// Replace token in place, returns false if `old_token` was absent
    pub fn replace(&mut self, old_token: &str, new_token: &str) -> bool {
        let Some(pos) = self.tokens.iter().position(|t| t == old_token) else {
            return false;
        };
        if self.contains(new_token) {
            self.tokens.remove(pos);
        } else {
            self.tokens[pos] = new_token.to_string();
        }
        true
    }

    /// Serialized attribute value
    pub fn value(&self) -> String {
        self.tokens.join(" ")
    }

    /// Reset from attribute value
    pub fn set_value(&mut self, value: &str) {
        *self = Self::from_string(value);
    }

    /// Iterate over tokens
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(String::as_str)
    }
}

impl std::fmt::Display for DOMTokenList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_string_dedupes() {
        let list = DOMTokenList::from_string("modal fade  modal show");
        assert_eq!(list.len(), 3);
        assert_eq!(list.value(), "modal fade show");
    }

    #[test]
    fn test_add_remove() {
        let mut list = DOMTokenList::new();
        list.add(&["collapse", "show", ""]);
        assert_eq!(list.len(), 2);

        list.remove(&["show"]);
        assert!(!list.contains("show"));
        assert!(list.contains("collapse"));
    }

    #[test]
    fn test_toggle_with_force() {
        let mut list = DOMTokenList::new();
        assert!(list.toggle("active", None));
        assert!(!list.toggle("active", None));
        assert!(list.toggle("active", Some(true)));
        assert!(list.toggle("active", Some(true)));
        assert_eq!(list.len(), 1);
        assert!(!list.toggle("active", Some(false)));
        assert!(list.is_empty());
    }

    #[test]
    fn test_replace() {
        let mut list = DOMTokenList::from_string("collapse show");
        assert!(list.replace("collapse", "collapsing"));
        assert_eq!(list.value(), "collapsing show");
        assert!(!list.replace("missing", "x"));
    }
}
