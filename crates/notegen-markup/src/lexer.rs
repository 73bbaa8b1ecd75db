//! # Lexer - Splitting HTML Source Into Raw Tokens
//!
//! This is the first stage of reading generated markup: the [Logos] lexer
//! cuts the source into tags, text runs, comments and declarations.
//!
//! [Logos]: https://docs.rs/logos
//!
//! Every byte of the input lands in exactly one token, so concatenating the
//! token texts gives the input back:
//!
//! ```
//! use notegen_markup::lexer::lex;
//!
//! let input = "<h2 class=\"title\">Intro</h2>\n<p>Body &amp; more</p>";
//! let tokens = lex(input);
//!
//! let reconstructed: String = tokens.iter().map(|t| t.text).collect();
//! assert_eq!(input, reconstructed);
//! ```
//!
//! The lexer is context-free. It does not know that the body of a `<style>`
//! element is not markup; [`crate::tokenize`] handles raw-text elements on
//! top of it.

use logos::Logos;

/// Token kinds produced by the Logos lexer.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// `<!-- ... -->`, unterminated comments run to the end of input
    #[token("<!--", lex_comment)]
    Comment,

    /// `<!DOCTYPE html>` and friends
    #[regex(r"<![^>\-][^>]*>")]
    Declaration,

    /// `<?xml ... ?>`
    #[regex(r"<\?[^>]*>")]
    ProcessingInstruction,

    /// `</name>`
    #[regex(r"</[A-Za-z][^>]*>")]
    EndTag,

    /// `<name attr="value" ...>` including self-closing `<br/>`
    #[regex(r#"<[A-Za-z]([^>"']|"[^"]*"|'[^']*')*>"#)]
    StartTag,

    /// A `<` that does not open anything we recognise
    #[token("<")]
    Lt,

    /// Character data between tags
    #[regex(r"[^<]+")]
    Text,
}

fn lex_comment(lex: &mut logos::Lexer<TokenKind>) {
    let rest = lex.remainder();
    let len = rest.find("-->").map_or(rest.len(), |end| end + 3);
    lex.bump(len);
}

/// A lexed token with its kind and text slice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
}

/// Lex the input into a sequence of tokens.
///
/// Guarantees that all bytes from the input appear in the output tokens.
pub fn lex(input: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut lexer = TokenKind::lexer(input);

    while let Some(result) = lexer.next() {
        // Unrecognised bytes are character data as far as HTML is concerned
        let kind = result.unwrap_or(TokenKind::Text);
        tokens.push(Token {
            kind,
            text: lexer.slice(),
        });
    }

    tokens
}
