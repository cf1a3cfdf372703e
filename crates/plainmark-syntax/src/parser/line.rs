use crate::lexer::TAB_WIDTH;
use crate::token::{Token, TokenKind};

/// Classification of a single line from its leading token alone.
///
/// This is phase 1 of block parsing: each line is classified independently,
/// and the [`BlockBuilder`](super::block::BlockBuilder) decides what it means
/// in context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LineClass {
    Blank,
    Heading { level: u8 },
    Fence,
    BlockQuote,
    ListItem { ordered: bool, indent: usize },
    Rule,
    Text,
}

/// The tokens of one source line, terminator included.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Line<'t, 'a> {
    tokens: &'t [Token<'a>],
}

/// Signature of a fence line: marker character, run length, info string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FenceSig<'a> {
    pub marker: char,
    pub len: usize,
    pub info: &'a str,
}

impl FenceSig<'_> {
    /// Whether this fence closes one opened with `marker` repeated `len` times.
    pub(crate) fn closes(&self, marker: char, len: usize) -> bool {
        self.marker == marker && self.len >= len && self.info.is_empty()
    }
}

/// Split a token stream after every line terminator. `Eof` never forms a
/// line of its own.
pub(crate) fn split_lines<'t, 'a>(tokens: &'t [Token<'a>]) -> Vec<Line<'t, 'a>> {
    tokens
        .split_inclusive(|t| t.kind.is_line_end())
        .map(|tokens| Line { tokens })
        .filter(|line| line.tokens.iter().any(|t| t.kind != TokenKind::Eof))
        .collect()
}

impl<'t, 'a> Line<'t, 'a> {
    pub(crate) fn tokens(&self) -> &'t [Token<'a>] {
        self.tokens
    }

    /// First token that is not leading indentation.
    fn lead(&self) -> Option<&'t Token<'a>> {
        self.tokens
            .iter()
            .find(|t| !matches!(t.kind, TokenKind::Indent { .. }))
    }

    pub(crate) fn classify(&self) -> LineClass {
        let Some(lead) = self.lead() else {
            return LineClass::Blank;
        };
        match lead.kind {
            // A line holding only a backslash break still has content.
            TokenKind::LineBreak { hard: true } if lead.text.starts_with('\\') => LineClass::Text,
            TokenKind::BlankLine | TokenKind::LineBreak { .. } | TokenKind::Eof => LineClass::Blank,
            TokenKind::HeadingMarker { level } => LineClass::Heading { level },
            TokenKind::Fence => LineClass::Fence,
            TokenKind::Rule => LineClass::Rule,
            TokenKind::BlockQuoteMarker => LineClass::BlockQuote,
            TokenKind::ListMarker { ordered, indent } => LineClass::ListItem { ordered, indent },
            _ => LineClass::Text,
        }
    }

    /// The line without its leading block marker.
    pub(crate) fn strip_marker(&self) -> Line<'t, 'a> {
        let skip = self
            .tokens
            .iter()
            .position(|t| !matches!(t.kind, TokenKind::Indent { .. }))
            .map_or(self.tokens.len(), |i| i + 1);
        Line {
            tokens: &self.tokens[skip..],
        }
    }

    /// Column where the line's content starts, with tabs expanded.
    pub(crate) fn indent(&self) -> usize {
        match self.tokens.first().map(|t| (t.kind, t.text)) {
            Some((TokenKind::ListMarker { indent, .. }, _)) => indent,
            Some((TokenKind::Indent { column }, _)) => column,
            Some((_, text)) => leading_columns(text),
            None => 0,
        }
    }

    /// Byte offset of the start of the line.
    pub(crate) fn offset(&self) -> usize {
        self.tokens.first().map_or(0, |t| t.offset)
    }

    /// Raw text of the line, terminator removed.
    pub(crate) fn verbatim(&self) -> String {
        let mut text: String = self.tokens.iter().map(|t| t.text).collect();
        if text.ends_with('\n') {
            text.pop();
            if text.ends_with('\r') {
                text.pop();
            }
        }
        text
    }

    /// Fence signature, when this line is a fence.
    pub(crate) fn fence(&self) -> Option<FenceSig<'a>> {
        let lead = self.lead().filter(|t| t.kind == TokenKind::Fence)?;
        let text = lead.text.trim_start_matches([' ', '\t']);
        let marker = text.chars().next()?;
        let len = text.chars().take_while(|&c| c == marker).count();
        Some(FenceSig {
            marker,
            len,
            info: text[len..].trim(),
        })
    }
}

fn leading_columns(text: &str) -> usize {
    let mut column = 0;
    for c in text.chars() {
        match c {
            ' ' => column += 1,
            '\t' => column += TAB_WIDTH - column % TAB_WIDTH,
            _ => break,
        }
    }
    column
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn classes(input: &str) -> Vec<LineClass> {
        let tokens = tokenize(input);
        split_lines(&tokens).iter().map(Line::classify).collect()
    }

    #[test]
    fn split_keeps_unterminated_last_line() {
        let tokens = tokenize("a\nb");
        let lines = split_lines(&tokens);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].verbatim(), "b");
    }

    #[test]
    fn split_empty_input() {
        let tokens = tokenize("");
        assert!(split_lines(&tokens).is_empty());
    }

    #[rstest]
    #[case("", LineClass::Blank)]
    #[case("   \n", LineClass::Blank)]
    #[case("### x", LineClass::Heading { level: 3 })]
    #[case("```rust", LineClass::Fence)]
    #[case("> x", LineClass::BlockQuote)]
    #[case("  2. x", LineClass::ListItem { ordered: true, indent: 2 })]
    #[case("***", LineClass::Rule)]
    #[case("   plain", LineClass::Text)]
    #[case("\\", LineClass::Text)]
    #[case("  \\\n", LineClass::Text)]
    fn classify_lines(#[case] input: &str, #[case] expected: LineClass) {
        let found = classes(input);
        assert_eq!(found.first().copied().unwrap_or(LineClass::Blank), expected);
    }

    #[test]
    fn strip_marker_exposes_nested_cue() {
        let tokens = tokenize("> > deep");
        let lines = split_lines(&tokens);
        assert_eq!(lines[0].strip_marker().classify(), LineClass::BlockQuote);
        assert_eq!(
            lines[0].strip_marker().strip_marker().classify(),
            LineClass::Text
        );
    }

    #[test]
    fn indent_uses_absolute_columns() {
        let tokens = tokenize("> - a\n>   b\n");
        let lines = split_lines(&tokens);
        assert_eq!(lines[0].strip_marker().indent(), 2);
        assert_eq!(lines[1].strip_marker().indent(), 4);
    }

    #[test]
    fn verbatim_strips_crlf() {
        let tokens = tokenize("  x *y*  \r\n");
        let lines = split_lines(&tokens);
        assert_eq!(lines[0].verbatim(), "  x *y*  ");
    }

    #[test]
    fn fence_closing_rules() {
        let tokens = tokenize("````\n```\n`````\n~~~~\n```` rust\n");
        let sigs: Vec<_> = split_lines(&tokens)
            .iter()
            .filter_map(Line::fence)
            .collect();
        assert!(!sigs[1].closes('`', 4));
        assert!(sigs[2].closes('`', 4));
        assert!(!sigs[3].closes('`', 4));
        assert!(!sigs[4].closes('`', 4));
    }

    #[test]
    fn fence_signature() {
        let tokens = tokenize("  ~~~~ python extra\n");
        let lines = split_lines(&tokens);
        assert_eq!(
            lines[0].fence(),
            Some(FenceSig {
                marker: '~',
                len: 4,
                info: "python extra"
            })
        );
    }
}
