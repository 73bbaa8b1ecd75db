//! # notegen-markup
//!
//! Tokenizer for the HTML fragments that flow through notegen: documents
//! produced by a content generator, section rewrites, table cells, and the
//! snapshots kept in undo history.
//!
//! The crate is deliberately small. It turns a string into a flat list of
//! [`MarkupToken`]s; building a tree out of them is the engine's job.
//!
//! ```
//! use notegen_markup::{tokenize, MarkupToken};
//!
//! let tokens = tokenize("<p class=\"lead\">Fish &amp; chips</p>");
//! assert!(matches!(&tokens[0], MarkupToken::StartTag(tag) if tag.name == "p"));
//! assert!(matches!(&tokens[1], MarkupToken::Text(text) if text == "Fish & chips"));
//! ```

use std::borrow::Cow;

use logos::Logos;

pub mod lexer;
mod tag;

pub use lexer::{Token, TokenKind, lex};
pub use tag::{Attribute, StartTag, parse_end_tag, parse_start_tag};

/// Elements that never have children or an end tag.
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// Elements whose content is not markup.
pub const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea", "title"];

pub fn is_void_element(name: &str) -> bool {
    VOID_ELEMENTS.contains(&name)
}

pub fn is_raw_text_element(name: &str) -> bool {
    RAW_TEXT_ELEMENTS.contains(&name)
}

/// A token with tag structure and entities resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupToken<'a> {
    StartTag(StartTag),
    EndTag(String),
    /// Character data with entities decoded
    Text(Cow<'a, str>),
    /// Body of a raw-text element such as `<style>`, kept verbatim
    RawText(&'a str),
    /// Comment body without the `<!--`/`-->` delimiters
    Comment(&'a str),
    /// `<!DOCTYPE ...>` and processing instructions, dropped by tree builders
    Declaration(&'a str),
}

/// Tokenize an HTML fragment.
///
/// Never fails: anything that does not parse as markup is returned as text.
pub fn tokenize(input: &str) -> Vec<MarkupToken<'_>> {
    let mut tokens = Vec::new();
    let mut lexer = TokenKind::lexer(input);

    while let Some(result) = lexer.next() {
        let slice = lexer.slice();
        match result.unwrap_or(TokenKind::Text) {
            TokenKind::StartTag => {
                let tag = parse_start_tag(slice);
                let raw_body = is_raw_text_element(&tag.name) && !tag.self_closing;
                let name = tag.name.clone();
                tokens.push(MarkupToken::StartTag(tag));

                if raw_body {
                    let rest = lexer.remainder();
                    let end = find_raw_text_end(rest, &name);
                    if end > 0 {
                        tokens.push(MarkupToken::RawText(&rest[..end]));
                    }
                    lexer.bump(end);
                }
            }
            TokenKind::EndTag => tokens.push(MarkupToken::EndTag(parse_end_tag(slice))),
            TokenKind::Comment => tokens.push(MarkupToken::Comment(comment_body(slice))),
            TokenKind::Declaration | TokenKind::ProcessingInstruction => {
                tokens.push(MarkupToken::Declaration(slice))
            }
            TokenKind::Lt | TokenKind::Text => push_text(&mut tokens, slice),
        }
    }

    tokens
}

/// Adjacent text tokens (e.g. `a < b`) are merged into one.
fn push_text<'a>(tokens: &mut Vec<MarkupToken<'a>>, raw: &'a str) {
    let decoded = html_escape::decode_html_entities(raw);
    if let Some(MarkupToken::Text(previous)) = tokens.last_mut() {
        previous.to_mut().push_str(&decoded);
        return;
    }
    tokens.push(MarkupToken::Text(decoded));
}

fn comment_body(slice: &str) -> &str {
    let body = slice.strip_prefix("<!--").unwrap_or(slice);
    body.strip_suffix("-->").unwrap_or(body)
}

/// Byte offset of the `</name` that closes a raw-text element, or the
/// remaining length when it is never closed.
fn find_raw_text_end(rest: &str, name: &str) -> usize {
    let needle = format!("</{name}");
    let haystack = rest.to_ascii_lowercase();
    haystack.find(&needle).unwrap_or(rest.len())
}
