//! Inline resolution for a single text span.
//!
//! Runs over the span's tokens once, left to right, with an explicit stack of
//! open frames instead of recursion:
//!
//! 1. Code spans are paired up front (right to left, by run length), so a
//!    backtick run knows its partner before anything else looks at it.
//! 2. Emphasis runs and `[` push frames. A closing run searches down to the
//!    nearest bracket for an opener with the same marker; every frame above
//!    the match collapses back to literal text.
//! 3. Whatever is still open at the end of the span collapses to literal
//!    text, and each collapse is reported as a degradation.
//!
//! Every token is pushed at most once and every frame is popped at most once,
//! so the pass is linear in the number of tokens.

use std::collections::HashMap;

use crate::ast::Inline;
use crate::error::{Degradation, Diagnostics, InlineConstruct};
use crate::token::{Token, TokenKind};

use super::line::Line;

/// Open frames deeper than this are not started; their markup stays literal.
const MAX_NESTING: usize = 32;

/// Resolve the inline content of `lines` (a paragraph, heading or item).
pub(crate) fn parse_inlines(lines: &[Line<'_, '_>], diagnostics: &mut Diagnostics) -> Vec<Inline> {
    let tokens = flatten(lines);
    InlineParser::new(&tokens, diagnostics).run()
}

/// Content tokens of the span. Line breaks between lines are kept, the one
/// ending the last line is not, though a backslash in it stays as text.
fn flatten<'a>(lines: &[Line<'_, 'a>]) -> Vec<Token<'a>> {
    let last = lines.len().saturating_sub(1);
    lines
        .iter()
        .enumerate()
        .flat_map(|(i, line)| {
            line.tokens().iter().filter_map(move |&t| match t.kind {
                TokenKind::Eof | TokenKind::BlankLine => None,
                TokenKind::LineBreak { .. } if i == last => t
                    .text
                    .starts_with('\\')
                    .then(|| Token::new(TokenKind::Text, &t.text[..1], t.offset)),
                kind if kind.is_block_marker() => None,
                _ => Some(t),
            })
        })
        .collect()
}

/// Whether the token at `index` directly follows a lone backslash.
fn is_escaped(tokens: &[Token<'_>], index: usize) -> bool {
    index
        .checked_sub(1)
        .and_then(|prev| tokens.get(prev))
        .is_some_and(|t| t.kind == TokenKind::Text && t.text == "\\")
}

/// For each backtick run, the index of the next run of equal length. An
/// escaped run can close a span but never opens one.
fn pair_code_spans(tokens: &[Token<'_>]) -> Vec<Option<usize>> {
    let mut closers = vec![None; tokens.len()];
    let mut next_by_len: HashMap<usize, usize> = HashMap::new();

    for (i, token) in tokens.iter().enumerate().rev() {
        if token.kind == TokenKind::CodeSpanDelim {
            let next = next_by_len.insert(token.text.len(), i);
            if !is_escaped(tokens, i) {
                closers[i] = next;
            }
        }
    }
    closers
}

/// Raw code span content. Line breaks read as spaces, and one space is
/// stripped from each end when both ends have one.
fn code_content(tokens: &[Token<'_>]) -> String {
    let mut content = String::new();
    for token in tokens {
        match token.kind {
            TokenKind::LineBreak { .. } => content.push(' '),
            _ => content.push_str(token.text),
        }
    }

    if content.len() >= 2
        && content.starts_with(' ')
        && content.ends_with(' ')
        && !content.bytes().all(|b| b == b' ')
    {
        content.pop();
        content.remove(0);
    }
    content
}

fn link_target(lexeme: &str) -> String {
    lexeme
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))
        .unwrap_or(lexeme)
        .trim()
        .to_string()
}

/// Whether a run of `marker` can open and close, given its neighbours.
fn flanking(marker: u8, prev: Option<char>, next: Option<char>) -> (bool, bool) {
    let can_open = next.is_some_and(|c| !c.is_whitespace());
    let can_close = prev.is_some_and(|c| !c.is_whitespace());

    if marker == b'_' && can_open && can_close {
        // intraword underscores, as in snake_case
        (false, false)
    } else {
        (can_open, can_close)
    }
}

fn slot(marker: u8) -> usize {
    usize::from(marker == b'_')
}

#[derive(Debug)]
enum Opener {
    Delim {
        marker: u8,
        count: usize,
        offset: usize,
    },
    Bracket {
        /// Links formed before this bracket opened. Any link formed since
        /// makes the bracket inactive.
        links_at_open: usize,
        offset: usize,
    },
}

#[derive(Debug)]
struct Frame {
    opener: Opener,
    children: Vec<Inline>,
}

impl Frame {
    fn new(opener: Opener) -> Self {
        Self {
            opener,
            children: Vec::new(),
        }
    }
}

struct InlineParser<'s, 'a, 'd> {
    tokens: &'s [Token<'a>],
    closers: Vec<Option<usize>>,
    root: Vec<Inline>,
    frames: Vec<Frame>,
    /// Open delimiter frames per marker (`*`, `_`) above the nearest bracket.
    scopes: Vec<[usize; 2]>,
    brackets: usize,
    links: usize,
    diagnostics: &'d mut Diagnostics,
}

impl<'s, 'a, 'd> InlineParser<'s, 'a, 'd> {
    fn new(tokens: &'s [Token<'a>], diagnostics: &'d mut Diagnostics) -> Self {
        Self {
            tokens,
            closers: pair_code_spans(tokens),
            root: Vec::new(),
            frames: Vec::new(),
            scopes: vec![[0; 2]],
            brackets: 0,
            links: 0,
            diagnostics,
        }
    }

    fn run(mut self) -> Vec<Inline> {
        let mut i = 0;
        while let Some(&token) = self.tokens.get(i) {
            i += 1;
            match token.kind {
                TokenKind::CodeSpanDelim => match self.closers[i - 1] {
                    Some(end) => {
                        let content = code_content(&self.tokens[i..end]);
                        self.push(Inline::CodeSpan(content));
                        i = end + 1;
                    }
                    None if is_escaped(self.tokens, i - 1) => {
                        self.drop_trailing_backslash();
                        self.push_text(token.text);
                    }
                    None => {
                        self.report(InlineConstruct::CodeSpan, token.offset);
                        self.push_text(token.text);
                    }
                },
                TokenKind::EmphasisDelim | TokenKind::StrongDelim => self.delimiter_run(i - 1),
                TokenKind::LinkOpen => self.open_bracket(token),
                TokenKind::LinkClose => {
                    let url = self
                        .tokens
                        .get(i)
                        .filter(|t| t.kind == TokenKind::LinkUrl)
                        .copied();
                    if self.close_bracket(url) {
                        i += 1;
                    }
                }
                TokenKind::Escape => {
                    self.push_text(token.text.strip_prefix('\\').unwrap_or(token.text))
                }
                TokenKind::LineBreak { hard: true } => self.push(Inline::LineBreak),
                TokenKind::LineBreak { hard: false } => self.push_text("\n"),
                _ => self.push_text(token.text),
            }
        }

        while !self.frames.is_empty() {
            self.collapse_top();
        }
        self.root
    }

    fn delimiter_run(&mut self, index: usize) {
        let token = self.tokens[index];
        let Some(&marker) = token.text.as_bytes().first() else {
            return;
        };
        let run = token.text.len();
        if !matches!(marker, b'*' | b'_')
            || run > MAX_NESTING
            || token.text.bytes().any(|b| b != marker)
        {
            self.push_text(token.text);
            return;
        }

        let prev = index
            .checked_sub(1)
            .and_then(|i| self.tokens[i].text.chars().next_back());
        let next = self
            .tokens
            .get(index + 1)
            .and_then(|t| t.text.chars().next());
        let (can_open, can_close) = flanking(marker, prev, next);

        let mut remaining = run;
        if can_close {
            while remaining > 0 && self.open_in_scope(marker) > 0 {
                let used = self.close_emphasis(marker, remaining);
                if used == 0 {
                    break;
                }
                remaining -= used;
            }
        }
        if remaining == 0 {
            return;
        }

        // Matches consume from the left of a closing run.
        let consumed = run - remaining;
        if can_open && self.frames.len() < MAX_NESTING {
            self.scope_mut()[slot(marker)] += 1;
            self.frames.push(Frame::new(Opener::Delim {
                marker,
                count: remaining,
                offset: token.offset + consumed,
            }));
        } else {
            self.push_text(&token.text[consumed..]);
        }
    }

    /// Close the nearest opener for `marker`, returning how many characters
    /// of the closing run were used.
    fn close_emphasis(&mut self, marker: u8, available: usize) -> usize {
        loop {
            match self.frames.last() {
                Some(Frame {
                    opener: Opener::Delim { marker: m, .. },
                    ..
                }) if *m == marker => break,
                Some(Frame {
                    opener: Opener::Delim { .. },
                    ..
                }) => self.collapse_top(),
                _ => return 0,
            }
        }

        let Some(Frame {
            opener: Opener::Delim { count, offset, .. },
            children,
        }) = self.frames.pop()
        else {
            unreachable!("top frame is a delimiter for this marker");
        };

        let used = if count >= 2 && available >= 2 { 2 } else { 1 };
        let node = if used == 2 {
            Inline::Strong(children)
        } else {
            Inline::Emphasis(children)
        };

        if count > used {
            // The outer part of the opener stays open around what matched.
            self.frames.push(Frame {
                opener: Opener::Delim {
                    marker,
                    count: count - used,
                    offset,
                },
                children: vec![node],
            });
        } else {
            self.scope_mut()[slot(marker)] -= 1;
            self.push(node);
        }
        used
    }

    fn open_bracket(&mut self, token: Token<'_>) {
        if self.frames.len() >= MAX_NESTING {
            self.push_text(token.text);
            return;
        }
        self.frames.push(Frame::new(Opener::Bracket {
            links_at_open: self.links,
            offset: token.offset,
        }));
        self.scopes.push([0; 2]);
        self.brackets += 1;
    }

    /// Handle `]`, returning true if `url` was consumed by a new link.
    fn close_bracket(&mut self, url: Option<Token<'_>>) -> bool {
        if self.brackets == 0 {
            self.push_text("]");
            return false;
        }

        // Emphasis never crosses a bracket boundary.
        while let Some(Frame {
            opener: Opener::Delim { .. },
            ..
        }) = self.frames.last()
        {
            self.collapse_top();
        }

        let active = matches!(
            self.frames.last(),
            Some(Frame { opener: Opener::Bracket { links_at_open, .. }, .. })
                if *links_at_open == self.links
        );

        match url {
            Some(url) if active => {
                let Some(frame) = self.frames.pop() else {
                    return false;
                };
                self.scopes.pop();
                self.brackets -= 1;
                self.links += 1;
                self.push(Inline::Link {
                    url: link_target(url.text),
                    children: frame.children,
                });
                true
            }
            _ => {
                self.collapse_top();
                self.push_text("]");
                false
            }
        }
    }

    /// Pop the top frame and splice it into its parent as literal text.
    fn collapse_top(&mut self) {
        let Some(frame) = self.frames.pop() else {
            return;
        };

        match frame.opener {
            Opener::Delim {
                marker,
                count,
                offset,
            } => {
                let open = &mut self.scope_mut()[slot(marker)];
                *open = open.saturating_sub(1);
                self.report(InlineConstruct::Emphasis, offset);
                self.push_text(&char::from(marker).to_string().repeat(count));
            }
            Opener::Bracket { offset, .. } => {
                if self.scopes.len() > 1 {
                    self.scopes.pop();
                }
                self.brackets = self.brackets.saturating_sub(1);
                self.report(InlineConstruct::Link, offset);
                self.push_text("[");
            }
        }

        for child in frame.children {
            self.push(child);
        }
    }

    fn open_in_scope(&self, marker: u8) -> usize {
        self.scopes.last().map_or(0, |scope| scope[slot(marker)])
    }

    fn scope_mut(&mut self) -> &mut [usize; 2] {
        if self.scopes.is_empty() {
            self.scopes.push([0; 2]);
        }
        let last = self.scopes.len() - 1;
        &mut self.scopes[last]
    }

    fn children_mut(&mut self) -> &mut Vec<Inline> {
        match self.frames.last_mut() {
            Some(frame) => &mut frame.children,
            None => &mut self.root,
        }
    }

    fn push(&mut self, node: Inline) {
        match node {
            Inline::Text(text) => self.push_text(&text),
            node => self.children_mut().push(node),
        }
    }

    /// Append text, merging with a preceding text node.
    fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let children = self.children_mut();
        if let Some(Inline::Text(prev)) = children.last_mut() {
            prev.push_str(text);
        } else {
            children.push(Inline::text(text));
        }
    }

    /// Remove the backslash of an escape that was already pushed as text.
    fn drop_trailing_backslash(&mut self) {
        if let Some(Inline::Text(text)) = self.children_mut().last_mut()
            && text.ends_with('\\')
        {
            text.pop();
        }
    }

    fn report(&mut self, construct: InlineConstruct, offset: usize) {
        self.diagnostics
            .report(Degradation::inline(construct, offset));
    }
}
