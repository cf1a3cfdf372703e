//! # plainmark-syntax
//!
//! A small compiler from a lightweight plain-text markup dialect to HTML
//! fragments, for use by a static-site build.
//!
//! ## Architecture Overview
//!
//! The pipeline has three stages, and data only flows forward:
//!
//! ```text
//! Source Text → Lexer → Tokens → Parser → Document → Generator → HTML
//!               (Logos)          (blocks, inlines)    (HtmlWriter)
//! ```
//!
//! ### 1. Lexer ([`lexer`] module)
//!
//! Splits the source into lines, recognizes block cues at the start of each
//! line by hand, and scans the rest with [Logos]. Every byte ends up in some
//! token, so the token texts concatenate back to the source.
//!
//! ```text
//! "# Hi *you*\n" → [HeadingMarker("# "), Text("Hi "), EmphasisDelim("*"),
//!                   Text("you"), EmphasisDelim("*"), LineBreak("\n"), Eof]
//! ```
//!
//! ### 2. Parser ([`parser`] module)
//!
//! Groups lines into blocks with a state machine, then resolves emphasis,
//! code spans and links inside each text span with an explicit delimiter
//! stack. The result is an owned [`Document`] tree ([`ast`] module).
//!
//! ### 3. Generator ([`html`] module)
//!
//! Walks the tree and writes HTML, escaping text and attribute values once.
//!
//! [Logos]: https://docs.rs/logos
//!
//! ## Malformed Input
//!
//! Every input compiles. Unclosed emphasis, unpaired backticks, links with no
//! target and the like are rendered as the literal characters the author
//! typed. [`compile_with_diagnostics`] also reports where that happened:
//!
//! ```
//! use plainmark_syntax::{compile_with_diagnostics, Degradation, InlineConstruct};
//!
//! let (html, degradations) = compile_with_diagnostics("Some *half done");
//! assert_eq!(html, "<p>Some *half done</p>");
//! assert_eq!(
//!     degradations,
//!     vec![Degradation::MalformedInlineSyntax {
//!         construct: InlineConstruct::Emphasis,
//!         offset: 5,
//!     }]
//! );
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use plainmark_syntax::compile;
//!
//! let html = compile("# Hello\n\nSome *emphasis* and a [link](https://example.com).\n");
//! assert_eq!(
//!     html,
//!     "<h1>Hello</h1><p>Some <em>emphasis</em> and a <a href=\"https://example.com\">link</a>.</p>"
//! );
//! ```

pub mod ast;
pub mod error;
pub mod html;
pub mod lexer;
pub mod parser;
pub mod token;

pub use ast::{Block, Document, HeadingLevel, Inline, List, ListItem, ListKind};
pub use error::{BlockConstruct, Degradation, InlineConstruct};
pub use html::generate;
pub use lexer::tokenize;
pub use parser::{parse, parse_with_diagnostics};
pub use token::{Token, TokenKind};

/// Compile markup to an HTML fragment.
pub fn compile(source: &str) -> String {
    generate(&parse(&tokenize(source)))
}

/// Compile markup to an HTML fragment, also returning every place where
/// malformed markup was rendered literally.
pub fn compile_with_diagnostics(source: &str) -> (String, Vec<Degradation>) {
    let tokens = tokenize(source);
    let (document, degradations) = parse_with_diagnostics(&tokens);
    (generate(&document), degradations)
}
