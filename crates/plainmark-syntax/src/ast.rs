//! The document tree produced by the [parser](crate::parser).
//!
//! Both node families are closed enums so the [generator](crate::html) can
//! match them exhaustively. The tree is strictly owned: every node holds its
//! children in a `Vec`, and there are no parent links or shared nodes.

/// Root of a parsed document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub children: Vec<Block>,
}

impl Document {
    pub fn new(children: Vec<Block>) -> Self {
        Self { children }
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

/// Heading level, always within `1..=6`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HeadingLevel(u8);

impl HeadingLevel {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 6;

    /// Build a level from a raw marker count, clamping to the nearest bound.
    pub fn new(raw: usize) -> Self {
        Self(raw.clamp(Self::MIN as usize, Self::MAX as usize) as u8)
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

/// Whether a list is numbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListKind {
    Unordered,
    /// Ordered list starting at `start`.
    Ordered { start: u32 },
}

impl ListKind {
    pub fn is_ordered(self) -> bool {
        matches!(self, Self::Ordered { .. })
    }
}

/// Block-level nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading {
        level: HeadingLevel,
        children: Vec<Inline>,
    },
    Paragraph(Vec<Inline>),
    /// Fenced code, stored verbatim with one `\n` after every line.
    CodeBlock {
        language: Option<String>,
        content: String,
    },
    BlockQuote(Vec<Block>),
    List(List),
    ThematicBreak,
}

/// A list of items that all share one [`ListKind`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct List {
    pub kind: ListKind,
    pub items: Vec<ListItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListItem {
    pub children: Vec<Block>,
}

/// Inline nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Text(String),
    Emphasis(Vec<Inline>),
    Strong(Vec<Inline>),
    /// Raw code span content; never re-parsed.
    CodeSpan(String),
    Link {
        url: String,
        children: Vec<Inline>,
    },
    LineBreak,
}

impl Inline {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }
}
