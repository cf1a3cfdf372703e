//! Degradations: places where malformed markup was rendered as literal text.
//!
//! None of these are errors in the `Result` sense. Every input compiles; a
//! degradation only records *where* the compiler fell back so a caller can
//! warn about it.

use std::fmt;

use thiserror::Error;

/// Inline construct that was left unmatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InlineConstruct {
    Emphasis,
    CodeSpan,
    Link,
}

impl fmt::Display for InlineConstruct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Emphasis => "emphasis delimiter",
            Self::CodeSpan => "code span delimiter",
            Self::Link => "link bracket",
        })
    }
}

/// Block construct that was not closed properly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockConstruct {
    /// Input ended inside a fenced code block.
    UnterminatedFence,
    /// A quoted line was followed by an unquoted one with no blank line.
    UnclosedBlockQuote,
}

impl fmt::Display for BlockConstruct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::UnterminatedFence => "unterminated code fence",
            Self::UnclosedBlockQuote => "blockquote continued without `>`",
        })
    }
}

/// A non-fatal fallback taken while parsing, with the byte offset of the
/// offending markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum Degradation {
    #[error("malformed inline syntax at byte {offset}: unmatched {construct}")]
    MalformedInlineSyntax {
        construct: InlineConstruct,
        offset: usize,
    },

    #[error("malformed block syntax at byte {offset}: {construct}")]
    MalformedBlockSyntax {
        construct: BlockConstruct,
        offset: usize,
    },
}

impl Degradation {
    pub fn inline(construct: InlineConstruct, offset: usize) -> Self {
        Self::MalformedInlineSyntax { construct, offset }
    }

    pub fn block(construct: BlockConstruct, offset: usize) -> Self {
        Self::MalformedBlockSyntax { construct, offset }
    }

    pub fn offset(&self) -> usize {
        match self {
            Self::MalformedInlineSyntax { offset, .. }
            | Self::MalformedBlockSyntax { offset, .. } => *offset,
        }
    }
}

/// Collects degradations during a parse.
#[derive(Debug, Default)]
pub(crate) struct Diagnostics {
    reported: Vec<Degradation>,
}

impl Diagnostics {
    pub(crate) fn report(&mut self, degradation: Degradation) {
        log::debug!("{degradation}");
        self.reported.push(degradation);
    }

    pub(crate) fn into_vec(mut self) -> Vec<Degradation> {
        self.reported.sort_by_key(Degradation::offset);
        self.reported
    }
}
