//! HTML fragment parsing
//!
//! Runs html5ever's tokenizer over a markup snippet and builds detached
//! nodes in the arena. There is no tree-construction stage: tags nest as
//! written, void elements close themselves and stray end tags close the
//! nearest matching open element.

use std::cell::RefCell;

use html5ever::tendril::StrTendril;
use html5ever::tokenizer::{
    BufferQueue, CharacterTokens, EndTag, ParseError, StartTag, TagToken, Token, TokenSink, TokenSinkResult,
    Tokenizer, TokenizerOpts,
};

use crate::{DomTree, NodeId};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track", "wbr",
];

enum Piece {
    Open {
        name: String,
        attrs: Vec<(String, String)>,
        self_closing: bool,
    },
    Close(String),
    Text(String),
}

#[derive(Default)]
struct FragmentSink {
    pieces: RefCell<Vec<Piece>>,
}

impl TokenSink for FragmentSink {
    type Handle = ();

    fn process_token(&self, token: Token, _line_number: u64) -> TokenSinkResult<()> {
        let piece = match token {
            TagToken(tag) => match tag.kind {
                StartTag => Piece::Open {
                    name: tag.name.to_string(),
                    attrs: tag
                        .attrs
                        .iter()
                        .map(|a| (a.name.local.to_string(), a.value.to_string()))
                        .collect(),
                    self_closing: tag.self_closing,
                },
                EndTag => Piece::Close(tag.name.to_string()),
            },
            CharacterTokens(text) => Piece::Text(text.to_string()),
            ParseError(err) => {
                tracing::trace!("fragment parse error: {err}");
                return TokenSinkResult::Continue;
            }
            _ => return TokenSinkResult::Continue,
        };
        self.pieces.borrow_mut().push(piece);
        TokenSinkResult::Continue
    }
}

impl DomTree {
    /// Parse `html` into detached top-level nodes, in source order
    pub fn parse_fragment(&mut self, html: &str) -> Vec<NodeId> {
        let input = BufferQueue::default();
        input.push_back(StrTendril::from_slice(html));
        let tokenizer = Tokenizer::new(FragmentSink::default(), TokenizerOpts::default());
        let _ = tokenizer.feed(&input);
        tokenizer.end();
        let pieces = tokenizer.sink.pieces.take();

        let mut roots = Vec::new();
        let mut open: Vec<(String, NodeId)> = Vec::new();
        for piece in pieces {
            let node = match piece {
                Piece::Open { name, attrs, self_closing } => {
                    let id = self.create_element(&name);
                    for (attr, value) in &attrs {
                        self.set_attribute(id, attr, value);
                    }
                    let void = self_closing || VOID_ELEMENTS.contains(&name.as_str());
                    self.attach(&mut roots, &open, id);
                    if !void {
                        open.push((name, id));
                    }
                    continue;
                }
                Piece::Close(name) => {
                    if let Some(pos) = open.iter().rposition(|(n, _)| *n == name) {
                        open.truncate(pos);
                    }
                    continue;
                }
                Piece::Text(text) if text.trim().is_empty() => continue,
                Piece::Text(text) => self.create_text(&text),
            };
            self.attach(&mut roots, &open, node);
        }
        roots
    }

    fn attach(&mut self, roots: &mut Vec<NodeId>, open: &[(String, NodeId)], node: NodeId) {
        match open.last() {
            Some(&(_, parent)) => self.append_child(parent, node),
            None => roots.push(node),
        }
    }

    /// First element of a parsed fragment
    pub fn parse_element(&mut self, html: &str) -> Option<NodeId> {
        self.parse_fragment(html)
            .into_iter()
            .find(|&n| self.is_element(n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tooltip_template() {
        let mut tree = DomTree::new();
        let html = "<div class=\"tooltip\" role=\"tooltip\"><div class=\"tooltip-arrow\"></div><div class=\"tooltip-inner\"></div></div>";
        let tip = tree.parse_element(html).unwrap();
        assert_eq!(tree.tag_name(tip), "div");
        assert!(tree.has_class(tip, "tooltip"));
        assert_eq!(tree.get_attribute(tip, "role").as_deref(), Some("tooltip"));
        assert_eq!(tree.child_elements(tip).len(), 2);
        assert!(tree.query_selector(tip, ".tooltip-inner").is_some());
        assert!(tree.parent(tip).is_none());
    }

    #[test]
    fn test_void_and_text() {
        let mut tree = DomTree::new();
        let roots = tree.parse_fragment("<b>bold</b> <br>tail<img src=x>");
        assert_eq!(roots.len(), 4);
        assert_eq!(tree.text_content(roots[0]), "bold");
        assert_eq!(tree.tag_name(roots[1]), "br");
        assert_eq!(tree.text_content(roots[2]), "tail");
        assert_eq!(tree.get_attribute(roots[3], "src").as_deref(), Some("x"));
    }

    #[test]
    fn test_unclosed_tags_nest() {
        let mut tree = DomTree::new();
        let roots = tree.parse_fragment("<ul><li>one<li>two</ul>");
        assert_eq!(roots.len(), 1);
        assert_eq!(tree.query_selector_all(roots[0], "li").len(), 2);
    }
}
