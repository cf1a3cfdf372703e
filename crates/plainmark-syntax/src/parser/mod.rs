//! # Parser - Tokens to Document Tree
//!
//! The second stage of the pipeline. Parsing happens in two phases:
//!
//! 1. **Blocks** ([`block`]): the token stream is split into lines, each line
//!    is classified on its own ([`line`]), and a state machine groups the
//!    lines into headings, paragraphs, code blocks, quotes and lists.
//!    Container contents are parsed recursively once the container closes.
//! 2. **Inlines** ([`inline`]): every paragraph, heading and list item text
//!    span is resolved into emphasis, code spans and links with a single
//!    stack-based pass.
//!
//! Parsing is total. Malformed markup becomes literal text, and each place
//! where that happened is reported as a [`Degradation`].

mod block;
mod inline;
mod line;

use crate::ast::Document;
use crate::error::{Degradation, Diagnostics};
use crate::token::Token;

/// Parse tokens into a [`Document`], discarding degradation reports.
pub fn parse(tokens: &[Token<'_>]) -> Document {
    parse_with_diagnostics(tokens).0
}

/// Parse tokens into a [`Document`] and report every degradation, ordered
/// by source offset.
pub fn parse_with_diagnostics(tokens: &[Token<'_>]) -> (Document, Vec<Degradation>) {
    let lines = line::split_lines(tokens);
    let mut diagnostics = Diagnostics::default();
    let children = block::parse_blocks(&lines, 0, &mut diagnostics);
    (Document::new(children), diagnostics.into_vec())
}
