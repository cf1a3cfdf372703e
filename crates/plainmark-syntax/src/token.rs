//! Token kinds produced by the [lexer](crate::lexer) and consumed by the
//! [parser](crate::parser).
//!
//! A token never decides what it *means* structurally beyond what is visible
//! at its own position: a `*` run is an [`EmphasisDelim`] or [`StrongDelim`]
//! depending on its length, but whether it opens or closes is left to the
//! parser, which has the lookahead the lexer lacks.
//!
//! [`EmphasisDelim`]: TokenKind::EmphasisDelim
//! [`StrongDelim`]: TokenKind::StrongDelim

/// The kind of a lexed token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // === Block cues (line start) ===
    /// `#`×N followed by whitespace or end of line. `level` is the raw count.
    HeadingMarker { level: u8 },
    /// `>` with one optional trailing space.
    BlockQuoteMarker,
    /// `-`, `*`, `+`, `N.` or `N)`, including leading whitespace and one
    /// trailing space. `indent` is the column of the marker character.
    ListMarker { ordered: bool, indent: usize },
    /// A fence line (three or more backticks or tildes plus info string).
    Fence,
    /// A thematic break line such as `---` or `* * *`.
    Rule,
    /// Leading whitespace that is not part of a marker. `column` is where the
    /// content after it starts, with tabs expanded.
    Indent { column: usize },

    // === Inline cues ===
    /// Plain text run.
    Text,
    /// Backslash followed by ASCII punctuation other than a backtick.
    Escape,
    /// `*` or `_` run of length 1.
    EmphasisDelim,
    /// `*` or `_` run of length 2 or more.
    StrongDelim,
    /// Backtick run inside a line.
    CodeSpanDelim,
    /// `[`
    LinkOpen,
    /// `]`
    LinkClose,
    /// `(target)` directly following a `]`.
    LinkUrl,

    // === Line structure ===
    /// End of a non-blank line. The lexeme holds any trailing spaces or
    /// backslash plus the terminator, which is empty at end of input.
    LineBreak { hard: bool },
    /// A whitespace-only line, terminator included.
    BlankLine,
    /// End of input. Always last, always empty.
    Eof,
}

impl TokenKind {
    /// Returns true if this token terminates a line.
    pub fn is_line_end(self) -> bool {
        matches!(self, Self::LineBreak { .. } | Self::BlankLine)
    }

    /// Returns true for `*`/`_` delimiter runs of either length.
    pub fn is_emphasis_run(self) -> bool {
        matches!(self, Self::EmphasisDelim | Self::StrongDelim)
    }

    /// Returns true for tokens that only carry block structure and never
    /// contribute inline content.
    pub fn is_block_marker(self) -> bool {
        matches!(
            self,
            Self::HeadingMarker { .. }
                | Self::BlockQuoteMarker
                | Self::ListMarker { .. }
                | Self::Indent { .. }
        )
    }
}

/// A lexed token: kind, raw lexeme, and byte offset of the lexeme in the
/// source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub offset: usize,
}

impl<'a> Token<'a> {
    pub fn new(kind: TokenKind, text: &'a str, offset: usize) -> Self {
        Self { kind, text, offset }
    }

    /// Byte offset just past the end of the lexeme.
    pub fn end(&self) -> usize {
        self.offset + self.text.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_ends() {
        assert!(TokenKind::LineBreak { hard: false }.is_line_end());
        assert!(TokenKind::BlankLine.is_line_end());
        assert!(!TokenKind::Eof.is_line_end());
        assert!(!TokenKind::Text.is_line_end());
    }

    #[test]
    fn emphasis_runs() {
        assert!(TokenKind::EmphasisDelim.is_emphasis_run());
        assert!(TokenKind::StrongDelim.is_emphasis_run());
        assert!(!TokenKind::CodeSpanDelim.is_emphasis_run());
    }

    #[test]
    fn token_end_offset() {
        let token = Token::new(TokenKind::Text, "hello", 10);
        assert_eq!(token.end(), 15);
    }
}
