//! # Lexer - Tokenizing Plain-Text Markup
//!
//! The first stage of the pipeline: a single left-to-right scan that turns
//! source text into a flat sequence of [`Token`]s. It never fails and never
//! backtracks into text it has already consumed.
//!
//! ## Two Scanning Modes
//!
//! - **Line start** (hand-written): block cues are recognized by looking at the
//!   beginning of each line after its leading whitespace. Tabs expand to the
//!   next multiple of [`TAB_WIDTH`] columns before any marker is detected.
//!   Blockquote and list markers may stack (`> - item`), so detection loops
//!   until no further container marker is found.
//! - **Within a line** ([Logos]): inline cues such as `*`/`_` runs, backtick
//!   runs and link brackets. Everything else is grouped into text runs.
//!
//! [Logos]: https://docs.rs/logos
//!
//! ## The Lossless Guarantee
//!
//! Every byte of the input appears in exactly one lexeme, so concatenating the
//! token texts rebuilds the source:
//!
//! ```
//! use plainmark_syntax::lexer::tokenize;
//!
//! let input = "# Hello, *world*!\n> quoted\n";
//! let tokens = tokenize(input);
//!
//! let reconstructed: String = tokens.iter().map(|t| t.text).collect();
//! assert_eq!(input, reconstructed);
//! ```
//!
//! The parser relies on this to keep code blocks verbatim without holding on
//! to the source text.

use logos::Logos;

use crate::token::{Token, TokenKind};

/// Column width a tab advances to in leading whitespace.
pub const TAB_WIDTH: usize = 4;

/// Inline lexemes recognized by Logos inside a single line.
///
/// Lines never contain a terminator when they reach this lexer, so none of
/// the patterns need to care about newlines.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
enum InlineLexeme {
    #[regex(r"\*+")]
    StarRun,

    #[regex(r"_+")]
    UnderscoreRun,

    #[regex(r"`+")]
    BacktickRun,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    /// Backslash followed by ASCII punctuation other than a backtick.
    /// Backticks are left to the code span pairing.
    #[regex(r"\\[!-/:-@\[-_{-~]")]
    Escape,

    /// A backslash that escapes nothing.
    #[token("\\")]
    Backslash,

    #[regex(r"[^*_`\[\]\\]+")]
    Text,
}

/// Tokenize the whole source. The last token is always [`TokenKind::Eof`].
pub fn tokenize(source: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut offset = 0;

    for line in source.split_inclusive('\n') {
        scan_line(line, offset, &mut tokens);
        offset += line.len();
    }

    tokens.push(Token::new(TokenKind::Eof, "", source.len()));
    tokens
}

/// Scan one line (terminator included) starting at byte `base` of the source.
fn scan_line<'a>(line: &'a str, base: usize, out: &mut Vec<Token<'a>>) {
    let body = strip_terminator(line);
    if body.trim().is_empty() {
        out.push(Token::new(TokenKind::BlankLine, line, base));
        return;
    }

    let mut pos = 0;
    let mut column = 0;

    loop {
        let rest = &body[pos..];
        let (ws, width) = leading_whitespace(rest, column);
        let after = &rest[ws..];
        let marker_column = column + width;

        if let Some(len) = blockquote_marker(after) {
            out.push(Token::new(
                TokenKind::BlockQuoteMarker,
                &rest[..ws + len],
                base + pos,
            ));
            pos += ws + len;
            column = marker_column + len;
        } else if is_rule(after) {
            out.push(Token::new(TokenKind::Rule, rest, base + pos));
            pos = body.len();
            break;
        } else if let Some((len, ordered)) = list_marker(after) {
            out.push(Token::new(
                TokenKind::ListMarker {
                    ordered,
                    indent: marker_column,
                },
                &rest[..ws + len],
                base + pos,
            ));
            pos += ws + len;
            column = marker_column + len;
        } else if let Some((len, level)) = heading_marker(after) {
            out.push(Token::new(
                TokenKind::HeadingMarker { level },
                &rest[..ws + len],
                base + pos,
            ));
            pos += ws + len;
            break;
        } else if is_fence(after) {
            out.push(Token::new(TokenKind::Fence, rest, base + pos));
            pos = body.len();
            break;
        } else {
            if ws > 0 {
                out.push(Token::new(
                    TokenKind::Indent {
                        column: marker_column,
                    },
                    &rest[..ws],
                    base + pos,
                ));
                pos += ws;
            }
            break;
        }

        // A container marker with nothing after it is a blank line inside
        // that container.
        if body[pos..].trim().is_empty() {
            out.push(Token::new(TokenKind::BlankLine, &line[pos..], base + pos));
            return;
        }
    }

    let content = &body[pos..];
    let (break_len, hard) = trailing_break(content);
    let inline_end = pos + content.len() - break_len;

    scan_inline(&body[pos..inline_end], base + pos, out);
    out.push(Token::new(
        TokenKind::LineBreak { hard },
        &line[inline_end..],
        base + inline_end,
    ));
}

/// Scan the inline part of a line with Logos.
fn scan_inline<'a>(text: &'a str, base: usize, out: &mut Vec<Token<'a>>) {
    let mut lexer = InlineLexeme::lexer(text);

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let lexeme = &text[span.clone()];
        let kind = match result {
            Ok(InlineLexeme::StarRun | InlineLexeme::UnderscoreRun) if lexeme.len() == 1 => {
                TokenKind::EmphasisDelim
            }
            Ok(InlineLexeme::StarRun | InlineLexeme::UnderscoreRun) => TokenKind::StrongDelim,
            Ok(InlineLexeme::BacktickRun) => TokenKind::CodeSpanDelim,
            Ok(InlineLexeme::LBracket) => TokenKind::LinkOpen,
            Ok(InlineLexeme::RBracket) => TokenKind::LinkClose,
            Ok(InlineLexeme::Escape) => TokenKind::Escape,
            // Logos error means an unrecognized character - treat as text
            Ok(InlineLexeme::Backslash | InlineLexeme::Text) | Err(()) => TokenKind::Text,
        };
        out.push(Token::new(kind, lexeme, base + span.start));

        if kind == TokenKind::LinkClose
            && let Some(len) = link_url_len(&text[span.end..])
        {
            out.push(Token::new(
                TokenKind::LinkUrl,
                &text[span.end..span.end + len],
                base + span.end,
            ));
            lexer.bump(len);
        }
    }
}

fn strip_terminator(line: &str) -> &str {
    match line.strip_suffix('\n') {
        Some(body) => body.strip_suffix('\r').unwrap_or(body),
        None => line,
    }
}

/// Byte length and expanded column width of the leading whitespace of `s`,
/// which starts at `column`.
fn leading_whitespace(s: &str, column: usize) -> (usize, usize) {
    let mut bytes = 0;
    let mut col = column;

    for b in s.bytes() {
        match b {
            b' ' => col += 1,
            b'\t' => col += TAB_WIDTH - col % TAB_WIDTH,
            _ => break,
        }
        bytes += 1;
    }

    (bytes, col - column)
}

fn blockquote_marker(s: &str) -> Option<usize> {
    let rest = s.strip_prefix('>')?;
    Some(if rest.starts_with(' ') { 2 } else { 1 })
}

/// Length of a list marker plus its following space, and whether it is ordered.
fn list_marker(s: &str) -> Option<(usize, bool)> {
    let bytes = s.as_bytes();
    let (len, ordered) = match bytes.first()? {
        b'-' | b'*' | b'+' => (1, false),
        b'0'..=b'9' => {
            let digits = bytes.iter().take_while(|b| b.is_ascii_digit()).count();
            if digits > 9 {
                return None;
            }
            match bytes.get(digits) {
                Some(b'.' | b')') => (digits + 1, true),
                _ => return None,
            }
        }
        _ => return None,
    };

    match bytes.get(len) {
        None => Some((len, ordered)),
        Some(b' ' | b'\t') => Some((len + 1, ordered)),
        _ => None,
    }
}

/// Length of a heading marker plus its following space, and the raw level.
fn heading_marker(s: &str) -> Option<(usize, u8)> {
    let hashes = s.bytes().take_while(|&b| b == b'#').count();
    if hashes == 0 {
        return None;
    }
    let level = u8::try_from(hashes).unwrap_or(u8::MAX);

    match s.as_bytes().get(hashes) {
        None => Some((hashes, level)),
        Some(b' ' | b'\t') => Some((hashes + 1, level)),
        _ => None,
    }
}

fn is_fence(s: &str) -> bool {
    let Some(marker) = s.chars().next().filter(|c| matches!(c, '`' | '~')) else {
        return false;
    };
    let run = s.chars().take_while(|&c| c == marker).count();

    // A backtick info string may not contain backticks, or "```a```" at the
    // start of a line would open a block.
    run >= 3 && !(marker == '`' && s[run..].contains('`'))
}

fn is_rule(s: &str) -> bool {
    let mut marks = s.chars().filter(|c| !matches!(c, ' ' | '\t'));
    let Some(first) = marks.next() else {
        return false;
    };
    if !matches!(first, '-' | '*' | '_') {
        return false;
    }

    let mut count = 1;
    for c in marks {
        if c != first {
            return false;
        }
        count += 1;
    }
    count >= 3
}

/// Length of the hard or soft break suffix at the end of a line's content.
fn trailing_break(content: &str) -> (usize, bool) {
    let spaces = content.len() - content.trim_end_matches(' ').len();
    if spaces > 0 {
        return (spaces, spaces >= 2);
    }

    let backslashes = content.len() - content.trim_end_matches('\\').len();
    if backslashes % 2 == 1 {
        (1, true)
    } else {
        (0, false)
    }
}

/// Length of a `(target)` group at the start of `rest`, if it closes on
/// this line.
fn link_url_len(rest: &str) -> Option<usize> {
    if !rest.starts_with('(') {
        return None;
    }
    rest.find(')').map(|end| end + 1)
}
