//! CSS selector parsing and matching
//!
//! Covers the subset widgets query with: compound selectors, descendant and
//! child combinators, comma lists, attribute operators, `:not()`,
//! `:disabled`, `:checked` and `:scope`.

use crate::{DomTree, NodeId};

/// Selector parse failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectorError {
    #[error("Empty selector")]
    Empty,

    #[error("Unexpected character {found:?} at offset {offset} in {selector:?}")]
    Unexpected {
        selector: String,
        offset: usize,
        found: char,
    },

    #[error("Unsupported pseudo-class :{0}")]
    UnsupportedPseudo(String),

    #[error("Unterminated {0} in selector")]
    Unterminated(&'static str),
}

/// Parsed selector list (`a, b > c`)
#[derive(Debug, Clone, PartialEq)]
pub struct Selector {
    alternatives: Vec<ComplexSelector>,
}

/// Compounds joined by combinators, stored left to right
#[derive(Debug, Clone, PartialEq)]
struct ComplexSelector {
    compounds: Vec<Vec<SelectorComponent>>,
    /// `combinators[i]` sits between `compounds[i]` and `compounds[i + 1]`
    combinators: Vec<Combinator>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

/// A component of a compound selector
#[derive(Debug, Clone, PartialEq)]
enum SelectorComponent {
    Universal,
    Type(String),
    Id(String),
    Class(String),
    Attribute(AttributeSelector),
    Not(Selector),
    Disabled,
    Checked,
    Scope,
}

/// Attribute selector
#[derive(Debug, Clone, PartialEq)]
struct AttributeSelector {
    name: String,
    matcher: Option<AttributeMatcher>,
}

#[derive(Debug, Clone, PartialEq)]
enum AttributeMatcher {
    /// [attr=value]
    Exact(String),
    /// [attr~=value]
    Contains(String),
    /// [attr^=value]
    Prefix(String),
    /// [attr$=value]
    Suffix(String),
    /// [attr*=value]
    Substring(String),
}

impl AttributeSelector {
    fn matches(&self, value: Option<&str>) -> bool {
        match (&self.matcher, value) {
            (_, None) => false,
            (None, Some(_)) => true,
            (Some(matcher), Some(val)) => match matcher {
                AttributeMatcher::Exact(expected) => val == expected,
                AttributeMatcher::Contains(expected) => {
                    val.split_whitespace().any(|w| w == expected)
                }
                AttributeMatcher::Prefix(expected) => val.starts_with(expected.as_str()),
                AttributeMatcher::Suffix(expected) => val.ends_with(expected.as_str()),
                AttributeMatcher::Substring(expected) => val.contains(expected.as_str()),
            },
        }
    }
}

impl Selector {
    /// Parse a selector list
    pub fn parse(text: &str) -> Result<Self, SelectorError> {
        let mut parser = Parser {
            source: text,
            chars: text.chars().collect(),
            pos: 0,
        };
        let selector = parser.selector_list()?;
        parser.skip_ws();
        if let Some(c) = parser.peek() {
            return Err(parser.unexpected(c));
        }
        Ok(selector)
    }

    /// Check `node` against the selector. `scope` is what `:scope` refers to.
    pub fn matches(&self, tree: &DomTree, node: NodeId, scope: Option<NodeId>) -> bool {
        if !tree.is_element(node) {
            return false;
        }
        self.alternatives
            .iter()
            .any(|complex| complex.matches_at(tree, node, complex.compounds.len() - 1, scope))
    }
}

impl ComplexSelector {
    fn matches_at(&self, tree: &DomTree, node: NodeId, idx: usize, scope: Option<NodeId>) -> bool {
        if !self.compounds[idx]
            .iter()
            .all(|c| c.matches(tree, node, scope))
        {
            return false;
        }
        if idx == 0 {
            return true;
        }
        match self.combinators[idx - 1] {
            Combinator::Child => tree
                .parent(node)
                .is_some_and(|p| tree.is_element(p) && self.matches_at(tree, p, idx - 1, scope)),
            Combinator::Descendant => tree
                .ancestors(node)
                .filter(|&a| tree.is_element(a))
                .any(|a| self.matches_at(tree, a, idx - 1, scope)),
        }
    }
}

impl SelectorComponent {
    fn matches(&self, tree: &DomTree, node: NodeId, scope: Option<NodeId>) -> bool {
        let Some(element) = tree.element(node) else {
            return false;
        };
        match self {
            Self::Universal => true,
            Self::Type(tag) => element.tag_name.eq_ignore_ascii_case(tag),
            Self::Id(id) => element.id() == Some(id.as_str()),
            Self::Class(class) => element.class_list.contains(class),
            Self::Attribute(attr) => {
                if attr.name == "class" {
                    attr.matches(Some(&element.class_list.value()))
                } else {
                    attr.matches(element.get_attr(&attr.name))
                }
            }
            Self::Not(inner) => !inner.matches(tree, node, scope),
            Self::Disabled => element.get_attr("disabled").is_some(),
            Self::Checked => element.get_attr("checked").is_some(),
            Self::Scope => match scope {
                Some(scope) => scope == node,
                None => tree.parent(node) == Some(NodeId::ROOT),
            },
        }
    }
}

struct Parser<'a> {
    source: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn skip_ws(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
        self.pos != start
    }

    fn unexpected(&self, found: char) -> SelectorError {
        SelectorError::Unexpected {
            selector: self.source.to_string(),
            offset: self.pos,
            found,
        }
    }

    fn selector_list(&mut self) -> Result<Selector, SelectorError> {
        let mut alternatives = vec![self.complex()?];
        loop {
            self.skip_ws();
            if self.peek() != Some(',') {
                break;
            }
            self.bump();
            alternatives.push(self.complex()?);
        }
        Ok(Selector { alternatives })
    }

    fn complex(&mut self) -> Result<ComplexSelector, SelectorError> {
        self.skip_ws();
        let mut compounds = vec![self.compound()?];
        let mut combinators = Vec::new();
        loop {
            let had_ws = self.skip_ws();
            let combinator = match self.peek() {
                Some('>') => {
                    self.bump();
                    self.skip_ws();
                    Combinator::Child
                }
                Some(c) if had_ws && c != ',' && c != ')' => Combinator::Descendant,
                _ => break,
            };
            combinators.push(combinator);
            compounds.push(self.compound()?);
        }
        Ok(ComplexSelector {
            compounds,
            combinators,
        })
    }

    fn compound(&mut self) -> Result<Vec<SelectorComponent>, SelectorError> {
        let mut components = Vec::new();
        match self.peek() {
            Some('*') => {
                self.bump();
                components.push(SelectorComponent::Universal);
            }
            Some(c) if is_ident_char(c) => {
                components.push(SelectorComponent::Type(self.ident()?.to_ascii_lowercase()));
            }
            _ => {}
        }
        loop {
            match self.peek() {
                Some('#') => {
                    self.bump();
                    components.push(SelectorComponent::Id(self.ident()?));
                }
                Some('.') => {
                    self.bump();
                    components.push(SelectorComponent::Class(self.ident()?));
                }
                Some('[') => {
                    self.bump();
                    components.push(SelectorComponent::Attribute(self.attribute()?));
                }
                Some(':') => {
                    self.bump();
                    components.push(self.pseudo()?);
                }
                _ => break,
            }
        }
        if components.is_empty() {
            return Err(match self.peek() {
                Some(c) => self.unexpected(c),
                None => SelectorError::Empty,
            });
        }
        Ok(components)
    }

    fn ident(&mut self) -> Result<String, SelectorError> {
        let start = self.pos;
        while self.peek().is_some_and(is_ident_char) {
            self.pos += 1;
        }
        if start == self.pos {
            return Err(match self.peek() {
                Some(c) => self.unexpected(c),
                None => SelectorError::Empty,
            });
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    fn attribute(&mut self) -> Result<AttributeSelector, SelectorError> {
        self.skip_ws();
        let name = self.ident()?;
        self.skip_ws();
        let op = match self.peek() {
            Some(']') => {
                self.bump();
                return Ok(AttributeSelector {
                    name,
                    matcher: None,
                });
            }
            Some('=') => None,
            Some(c @ ('~' | '^' | '$' | '*')) => {
                self.bump();
                Some(c)
            }
            Some(c) => return Err(self.unexpected(c)),
            None => return Err(SelectorError::Unterminated("attribute selector")),
        };
        if self.bump() != Some('=') {
            return Err(SelectorError::Unterminated("attribute selector"));
        }
        self.skip_ws();
        let value = self.attribute_value()?;
        self.skip_ws();
        if self.bump() != Some(']') {
            return Err(SelectorError::Unterminated("attribute selector"));
        }
        let matcher = match op {
            None => AttributeMatcher::Exact(value),
            Some('~') => AttributeMatcher::Contains(value),
            Some('^') => AttributeMatcher::Prefix(value),
            Some('$') => AttributeMatcher::Suffix(value),
            Some(_) => AttributeMatcher::Substring(value),
        };
        Ok(AttributeSelector {
            name,
            matcher: Some(matcher),
        })
    }

    fn attribute_value(&mut self) -> Result<String, SelectorError> {
        match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.bump();
                let mut value = String::new();
                loop {
                    match self.bump() {
                        Some(c) if c == quote => return Ok(value),
                        Some(c) => value.push(c),
                        None => return Err(SelectorError::Unterminated("string")),
                    }
                }
            }
            _ => self.ident(),
        }
    }

    fn pseudo(&mut self) -> Result<SelectorComponent, SelectorError> {
        let name = self.ident()?;
        match name.as_str() {
            "not" => {
                if self.bump() != Some('(') {
                    return Err(SelectorError::Unterminated(":not()"));
                }
                let inner = self.selector_list()?;
                self.skip_ws();
                if self.bump() != Some(')') {
                    return Err(SelectorError::Unterminated(":not()"));
                }
                Ok(SelectorComponent::Not(inner))
            }
            "disabled" => Ok(SelectorComponent::Disabled),
            "checked" => Ok(SelectorComponent::Checked),
            "scope" => Ok(SelectorComponent::Scope),
            _ => Err(SelectorError::UnsupportedPseudo(name)),
        }
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}
