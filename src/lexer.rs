//! Node extraction.
//!
//! The compiler does not build a DOM or a JavaScript AST. It re-scans the
//! normalized text with targeted finders, one per syntactic category, and
//! keeps the exact matched substring (the selector) so later passes can do
//! textual replacement.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::iter::FusedIterator;
use std::marker::PhantomData;
use tracing::warn;

use crate::config::CompilerConfig;

// ═══════════════════════════════════════════════════════════════════════════════
// LEX NODES
// ═══════════════════════════════════════════════════════════════════════════════

/// A located syntactic match. `K` is the category marker and decides how the
/// selector is split into tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct LexNode<K> {
    pub selector: String,
    pub tokens: Vec<String>,
    #[serde(skip)]
    kind: PhantomData<K>,
}

impl<K> LexNode<K> {
    pub fn new(selector: impl Into<String>, tokens: Vec<String>) -> Self {
        Self {
            selector: selector.into(),
            tokens,
            kind: PhantomData,
        }
    }
}

/// Category-specific splitting rule
pub trait NodeKind {
    /// Whether a match may run to the end of the text when the end token is missing
    const UNTIL_EOF: bool = false;

    fn tokenize(selector: &str, start_token: &str, end_token: &str) -> Vec<String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropNode;
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventNode;
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VarNode;
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportNode;
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineCommentNode;
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockCommentNode;

impl NodeKind for PropNode {
    fn tokenize(selector: &str, prefix: &str, _end: &str) -> Vec<String> {
        tokenize_attribute(selector, prefix)
    }
}

impl NodeKind for EventNode {
    fn tokenize(selector: &str, prefix: &str, _end: &str) -> Vec<String> {
        tokenize_attribute(selector, prefix)
    }
}

impl NodeKind for VarNode {
    fn tokenize(selector: &str, _start: &str, end: &str) -> Vec<String> {
        split_assignment(strip_terminator(selector, end))
    }
}

impl NodeKind for ImportNode {
    fn tokenize(selector: &str, _start: &str, end: &str) -> Vec<String> {
        let statement = strip_terminator(selector, end);
        match statement.find(|c: char| c == '"' || c == '\'') {
            Some(quote) => {
                let mut tokens: Vec<String> = statement[..quote]
                    .split_whitespace()
                    .map(str::to_string)
                    .collect();
                tokens.push(statement[quote..].trim().to_string());
                tokens
            }
            None => statement.split_whitespace().map(str::to_string).collect(),
        }
    }
}

impl NodeKind for LineCommentNode {
    const UNTIL_EOF: bool = true;

    fn tokenize(selector: &str, start: &str, _end: &str) -> Vec<String> {
        vec![selector[start.len()..].trim().to_string()]
    }
}

impl NodeKind for BlockCommentNode {
    fn tokenize(selector: &str, start: &str, end: &str) -> Vec<String> {
        let body = &selector[start.len()..];
        vec![body.strip_suffix(end).unwrap_or(body).trim().to_string()]
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TOKENIZATION
// ═══════════════════════════════════════════════════════════════════════════════

fn strip_terminator<'a>(selector: &'a str, end: &str) -> &'a str {
    if end.is_empty() {
        return selector.trim();
    }
    selector.strip_suffix(end).unwrap_or(selector).trim()
}

/// `@click="count = count + 1"` -> `["click", "count", "=", "count", "+", "1"]`
fn tokenize_attribute(selector: &str, prefix: &str) -> Vec<String> {
    let body = selector.strip_prefix(prefix).unwrap_or(selector);
    let Some((name, quoted)) = body.split_once('=') else {
        return vec![body.to_string()];
    };

    let value = quoted
        .strip_prefix(|c: char| c == '"' || c == '\'')
        .and_then(|v| v.strip_suffix(|c: char| c == '"' || c == '\''))
        .unwrap_or(quoted);

    let mut tokens = vec![name.trim().to_string()];
    tokens.extend(split_assignment(value));
    tokens
}

/// Whitespace split with the first plain assignment `=` kept as its own token.
/// Comparison and compound operators (`==`, `<=`, `=>`, `+=`) are not split.
pub fn split_assignment(text: &str) -> Vec<String> {
    let words = |s: &str| s.split_whitespace().map(str::to_string).collect::<Vec<_>>();

    match find_assignment(text) {
        Some(index) => {
            let mut tokens = words(&text[..index]);
            tokens.push("=".to_string());
            tokens.extend(words(&text[index + 1..]));
            tokens
        }
        None => words(text),
    }
}

fn find_assignment(text: &str) -> Option<usize> {
    let mut prev: Option<char> = None;
    let mut chars = text.char_indices().peekable();

    while let Some((index, c)) = chars.next() {
        if c == '=' {
            let next = chars.peek().map(|&(_, n)| n);
            let compound_before = prev.map_or(false, |p| "=!<>+-*/%&|^?".contains(p));
            let compound_after = matches!(next, Some('=') | Some('>'));
            if !compound_before && !compound_after {
                return Some(index);
            }
        }
        prev = Some(c);
    }

    None
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

// ═══════════════════════════════════════════════════════════════════════════════
// FINDERS
// ═══════════════════════════════════════════════════════════════════════════════

/// Lazy scan over every non-overlapping `start ... end` occurrence.
/// Word-like start tokens (`var`, `import`) only match on identifier boundaries.
pub struct NodeFinder<'a, K> {
    text: &'a str,
    start: &'a str,
    end: &'a str,
    cursor: usize,
    kind: PhantomData<K>,
}

pub fn find_nodes<'a, K: NodeKind>(text: &'a str, start: &'a str, end: &'a str) -> NodeFinder<'a, K> {
    NodeFinder {
        text,
        start,
        end,
        cursor: 0,
        kind: PhantomData,
    }
}

impl<'a, K> NodeFinder<'a, K> {
    fn on_word_boundary(&self, begin: usize, after: usize) -> bool {
        let starts_word = self.start.chars().next().map_or(false, is_ident_char);
        let ends_word = self.start.chars().last().map_or(false, is_ident_char);

        let before_ok = !starts_word
            || self.text[..begin]
                .chars()
                .next_back()
                .map_or(true, |c| !is_ident_char(c));
        let after_ok = !ends_word
            || self.text[after..]
                .chars()
                .next()
                .map_or(true, |c| !is_ident_char(c));

        before_ok && after_ok
    }
}

impl<'a, K: NodeKind> Iterator for NodeFinder<'a, K> {
    type Item = LexNode<K>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.start.is_empty() {
            return None;
        }

        loop {
            let rest = self.text.get(self.cursor..)?;
            let begin = self.cursor + rest.find(self.start)?;
            let after_start = begin + self.start.len();

            if !self.on_word_boundary(begin, after_start) {
                self.cursor = after_start;
                continue;
            }

            let end = match self.text[after_start..].find(self.end) {
                Some(offset) => after_start + offset + self.end.len(),
                None if K::UNTIL_EOF => self.text.len(),
                None => {
                    self.cursor = self.text.len();
                    return None;
                }
            };

            self.cursor = end;
            let selector = &self.text[begin..end];
            return Some(LexNode::new(
                selector,
                K::tokenize(selector, self.start, self.end),
            ));
        }
    }
}

impl<'a, K: NodeKind> FusedIterator for NodeFinder<'a, K> {}

/// Find prefixed inline bindings such as `:text="count"` or `@click="..."`.
/// The prefix must follow whitespace so `xlink:href` or `a@b` never match.
pub fn find_prop_nodes<K: NodeKind>(text: &str, prefix: &str) -> std::vec::IntoIter<LexNode<K>> {
    if prefix.is_empty() {
        return Vec::new().into_iter();
    }

    let pattern = format!(
        r#"(?:^|\s)({}[A-Za-z_][\w.-]*=(?:"[^"]*"|'[^']*'))"#,
        regex::escape(prefix)
    );
    let re = match Regex::new(&pattern) {
        Ok(re) => re,
        Err(e) => {
            warn!(prefix, "invalid binding prefix pattern: {}", e);
            return Vec::new().into_iter();
        }
    };

    re.captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| {
            let selector = m.as_str();
            LexNode::new(selector, K::tokenize(selector, prefix, ""))
        })
        .collect::<Vec<_>>()
        .into_iter()
}

/// Remove line comments, then block comments from script text.
///
/// The passes cannot run together: a block comment may hold a `//` and a line
/// comment may hold a `/*`, so one rule's selector would stop matching once the
/// other rule rewrote the text.
pub fn strip_comments(text: &str, config: &CompilerConfig) -> String {
    let mut line_comment_removed = text.to_string();
    for node in find_nodes::<LineCommentNode>(text, &config.line_comment_start, &config.new_line) {
        line_comment_removed = line_comment_removed.replace(&node.selector, "");
    }

    let mut no_comments = line_comment_removed.clone();
    for node in find_nodes::<BlockCommentNode>(
        &line_comment_removed,
        &config.block_comment_start,
        &config.block_comment_end,
    ) {
        no_comments = no_comments.replace(&node.selector, "");
    }

    no_comments
}
