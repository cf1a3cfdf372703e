use crate::ast::{Block, HeadingLevel, List, ListItem, ListKind};
use crate::error::{BlockConstruct, Degradation, Diagnostics};

use super::inline::parse_inlines;
use super::line::{Line, LineClass};

/// Containers nested deeper than this are read as plain text.
const MAX_NESTING: usize = 32;

/// Parse a sequence of lines into blocks. `depth` is the container nesting
/// level of the lines.
pub(crate) fn parse_blocks(
    lines: &[Line<'_, '_>],
    depth: usize,
    diagnostics: &mut Diagnostics,
) -> Vec<Block> {
    let mut builder = BlockBuilder::new(depth, diagnostics);
    for line in lines {
        builder.push(*line);
    }
    builder.finish()
}

#[derive(Debug)]
struct OpenFence {
    marker: char,
    len: usize,
    language: Option<String>,
    content: String,
    offset: usize,
}

impl OpenFence {
    fn closes(&self, line: &Line<'_, '_>) -> bool {
        line.fence().is_some_and(|sig| sig.closes(self.marker, self.len))
    }
}

#[derive(Debug)]
struct OpenList<'t, 'a> {
    kind: ListKind,
    indent: usize,
    /// Lines of each item, first line already stripped of its marker.
    items: Vec<Vec<Line<'t, 'a>>>,
    /// Marker and run length of a fence left open in the current item.
    open_fence: Option<(char, usize)>,
}

impl<'t, 'a> OpenList<'t, 'a> {
    fn new(kind: ListKind, indent: usize, first: Line<'t, 'a>) -> Self {
        let mut list = Self {
            kind,
            indent,
            items: Vec::new(),
            open_fence: None,
        };
        list.start_item(first);
        list
    }

    fn start_item(&mut self, line: Line<'t, 'a>) {
        self.open_fence = None;
        self.items.push(Vec::new());
        self.continue_item(line);
    }

    fn continue_item(&mut self, line: Line<'t, 'a>) {
        if let Some(sig) = line.fence() {
            self.open_fence = match self.open_fence {
                Some((marker, len)) if sig.closes(marker, len) => None,
                Some(open) => Some(open),
                None => Some((sig.marker, sig.len)),
            };
        }
        if let Some(item) = self.items.last_mut() {
            item.push(line);
        }
    }

    /// Whether an unmarked line may lazily continue the current item, which
    /// holds only while the item ends in paragraph text.
    fn accepts_lazy(&self) -> bool {
        self.open_fence.is_none()
            && self
                .items
                .last()
                .and_then(|item| item.last())
                .is_some_and(|line| {
                    matches!(line.classify(), LineClass::Text | LineClass::ListItem { .. })
                })
    }
}

#[derive(Debug)]
enum LeafState<'t, 'a> {
    None,
    Paragraph(Vec<Line<'t, 'a>>),
    CodeBlock(OpenFence),
    BlockQuote(Vec<Line<'t, 'a>>),
    List(OpenList<'t, 'a>),
}

/// Line-driven state machine producing the blocks of one container.
///
/// Containers (quotes and list items) collect their lines while open and are
/// parsed recursively when they close.
pub(crate) struct BlockBuilder<'t, 'a, 'd> {
    state: LeafState<'t, 'a>,
    out: Vec<Block>,
    depth: usize,
    diagnostics: &'d mut Diagnostics,
}

impl<'t, 'a, 'd> BlockBuilder<'t, 'a, 'd> {
    pub(crate) fn new(depth: usize, diagnostics: &'d mut Diagnostics) -> Self {
        Self {
            state: LeafState::None,
            out: Vec::new(),
            depth,
            diagnostics,
        }
    }

    pub(crate) fn push(&mut self, line: Line<'t, 'a>) {
        if let LeafState::CodeBlock(fence) = &mut self.state {
            if fence.closes(&line) {
                self.flush();
            } else {
                fence.content.push_str(&line.verbatim());
                fence.content.push('\n');
            }
            return;
        }

        // Inside a fence opened in a list item, every line is code.
        if let LeafState::List(list) = &mut self.state
            && list.open_fence.is_some()
        {
            list.continue_item(line);
            return;
        }

        let class = self.classify(&line);

        // Anything indented past the list marker belongs to the current item.
        if let LeafState::List(list) = &mut self.state
            && class != LineClass::Blank
            && line.indent() > list.indent
        {
            list.continue_item(line);
            return;
        }

        match class {
            LineClass::Blank => self.flush(),
            LineClass::Heading { level } => {
                self.flush();
                let children = parse_inlines(&[line.strip_marker()], self.diagnostics);
                self.out.push(Block::Heading {
                    level: HeadingLevel::new(usize::from(level)),
                    children,
                });
            }
            LineClass::Fence => {
                self.flush();
                self.open_fence(&line);
            }
            LineClass::Rule => {
                self.flush();
                self.out.push(Block::ThematicBreak);
            }
            LineClass::BlockQuote => self.push_quoted(line),
            LineClass::ListItem { ordered, indent } => self.push_list_item(line, ordered, indent),
            LineClass::Text => self.push_text(line),
        }
    }

    pub(crate) fn finish(mut self) -> Vec<Block> {
        if let LeafState::CodeBlock(fence) = &self.state {
            let offset = fence.offset;
            self.report(BlockConstruct::UnterminatedFence, offset);
        }
        self.flush();
        self.out
    }

    fn classify(&self, line: &Line<'t, 'a>) -> LineClass {
        match line.classify() {
            LineClass::BlockQuote | LineClass::ListItem { .. } if self.depth >= MAX_NESTING => {
                LineClass::Text
            }
            class => class,
        }
    }

    fn open_fence(&mut self, line: &Line<'t, 'a>) {
        let Some(sig) = line.fence() else {
            return;
        };
        self.state = LeafState::CodeBlock(OpenFence {
            marker: sig.marker,
            len: sig.len,
            language: sig.info.split_whitespace().next().map(str::to_string),
            content: String::new(),
            offset: line.offset(),
        });
    }

    fn push_quoted(&mut self, line: Line<'t, 'a>) {
        if let LeafState::BlockQuote(lines) = &mut self.state {
            lines.push(line.strip_marker());
            return;
        }
        self.flush();
        self.state = LeafState::BlockQuote(vec![line.strip_marker()]);
    }

    fn push_list_item(&mut self, line: Line<'t, 'a>, ordered: bool, indent: usize) {
        if let LeafState::List(list) = &mut self.state
            && list.indent == indent
            && list.kind.is_ordered() == ordered
        {
            list.start_item(line.strip_marker());
            return;
        }

        self.flush();
        let kind = if ordered {
            ListKind::Ordered {
                start: start_number(&line),
            }
        } else {
            ListKind::Unordered
        };
        self.state = LeafState::List(OpenList::new(kind, indent, line.strip_marker()));
    }

    fn push_text(&mut self, line: Line<'t, 'a>) {
        match &mut self.state {
            LeafState::Paragraph(lines) => lines.push(line),
            LeafState::List(list) if list.accepts_lazy() => list.continue_item(line),
            LeafState::BlockQuote(_) => {
                self.report(BlockConstruct::UnclosedBlockQuote, line.offset());
                self.flush();
                self.state = LeafState::Paragraph(vec![line]);
            }
            LeafState::None | LeafState::CodeBlock(_) | LeafState::List(_) => {
                self.flush();
                self.state = LeafState::Paragraph(vec![line]);
            }
        }
    }

    fn flush(&mut self) {
        let block = match std::mem::replace(&mut self.state, LeafState::None) {
            LeafState::None => return,
            LeafState::Paragraph(lines) => {
                Block::Paragraph(parse_inlines(&lines, self.diagnostics))
            }
            LeafState::CodeBlock(fence) => Block::CodeBlock {
                language: fence.language,
                content: fence.content,
            },
            LeafState::BlockQuote(lines) => {
                Block::BlockQuote(parse_blocks(&lines, self.depth + 1, self.diagnostics))
            }
            LeafState::List(list) => Block::List(List {
                kind: list.kind,
                items: list
                    .items
                    .iter()
                    .map(|lines| ListItem {
                        children: parse_blocks(lines, self.depth + 1, self.diagnostics),
                    })
                    .collect(),
            }),
        };
        self.out.push(block);
    }

    fn report(&mut self, construct: BlockConstruct, offset: usize) {
        self.diagnostics.report(Degradation::block(construct, offset));
    }
}

/// Start number of an ordered list marker such as `3.` or `  12)`.
fn start_number(line: &Line<'_, '_>) -> u32 {
    line.tokens()
        .first()
        .map(|t| t.text.trim_start())
        .and_then(|marker| {
            let digits = marker.bytes().take_while(u8::is_ascii_digit).count();
            marker[..digits].parse().ok()
        })
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Inline;
    use crate::lexer::tokenize;
    use crate::parser::line::split_lines;
    use pretty_assertions::assert_eq;

    fn blocks(input: &str) -> (Vec<Block>, Vec<Degradation>) {
        let tokens = tokenize(input);
        let lines = split_lines(&tokens);
        let mut diagnostics = Diagnostics::default();
        let blocks = parse_blocks(&lines, 0, &mut diagnostics);
        (blocks, diagnostics.into_vec())
    }

    fn para(text: &str) -> Block {
        Block::Paragraph(vec![Inline::text(text)])
    }

    fn item(children: Vec<Block>) -> ListItem {
        ListItem { children }
    }

    #[test]
    fn paragraphs_split_on_blank_lines() {
        let (blocks, _) = blocks("one\ntwo\n\nthree\n");
        assert_eq!(blocks, vec![para("one\ntwo"), para("three")]);
    }

    #[test]
    fn heading_interrupts_paragraph() {
        let (blocks, _) = blocks("text\n## Title\nmore");
        assert_eq!(
            blocks,
            vec![
                para("text"),
                Block::Heading {
                    level: HeadingLevel::new(2),
                    children: vec![Inline::text("Title")],
                },
                para("more"),
            ]
        );
    }

    #[test]
    fn heading_level_is_clamped() {
        let (blocks, _) = blocks("######## deep");
        assert_eq!(
            blocks,
            vec![Block::Heading {
                level: HeadingLevel::new(6),
                children: vec![Inline::text("deep")],
            }]
        );
    }

    #[test]
    fn fenced_code_is_verbatim() {
        let (blocks, degradations) =
            blocks("```rust\nlet x = *y*;\n\n  # not a heading\n```\nafter");
        assert_eq!(
            blocks,
            vec![
                Block::CodeBlock {
                    language: Some("rust".into()),
                    content: "let x = *y*;\n\n  # not a heading\n".into(),
                },
                para("after"),
            ]
        );
        assert!(degradations.is_empty());
    }

    #[test]
    fn fence_closes_only_on_matching_fence() {
        let (blocks, _) = blocks("````\n```\n~~~~\n`````\n");
        assert_eq!(
            blocks,
            vec![Block::CodeBlock {
                language: None,
                content: "```\n~~~~\n".into(),
            }]
        );
    }

    #[test]
    fn unterminated_fence_runs_to_end() {
        let (blocks, degradations) = blocks("text\n~~~\ncode");
        assert_eq!(
            blocks,
            vec![
                para("text"),
                Block::CodeBlock {
                    language: None,
                    content: "code\n".into(),
                },
            ]
        );
        assert_eq!(
            degradations,
            vec![Degradation::block(BlockConstruct::UnterminatedFence, 5)]
        );
    }

    #[test]
    fn blockquote_nests() {
        let (blocks, _) = blocks("> a\n> > b\n");
        assert_eq!(
            blocks,
            vec![Block::BlockQuote(vec![
                para("a"),
                Block::BlockQuote(vec![para("b")]),
            ])]
        );
    }

    #[test]
    fn blockquote_keeps_inner_paragraph_breaks() {
        let (blocks, _) = blocks("> a\n>\n> b\n");
        assert_eq!(blocks, vec![Block::BlockQuote(vec![para("a"), para("b")])]);
    }

    #[test]
    fn unmarked_line_closes_blockquote() {
        let (blocks, degradations) = blocks("> quoted\nlazy\n");
        assert_eq!(
            blocks,
            vec![Block::BlockQuote(vec![para("quoted")]), para("lazy")]
        );
        assert_eq!(
            degradations,
            vec![Degradation::block(BlockConstruct::UnclosedBlockQuote, 9)]
        );
    }

    #[test]
    fn blank_line_closes_blockquote_cleanly() {
        let (blocks, degradations) = blocks("> quoted\n\nafter\n");
        assert_eq!(
            blocks,
            vec![Block::BlockQuote(vec![para("quoted")]), para("after")]
        );
        assert!(degradations.is_empty());
    }

    #[test]
    fn list_items_and_continuations() {
        let (blocks, _) = blocks("- a\n  still a\n- b\n");
        assert_eq!(
            blocks,
            vec![Block::List(List {
                kind: ListKind::Unordered,
                items: vec![item(vec![para("a\nstill a")]), item(vec![para("b")])],
            })]
        );
    }

    #[test]
    fn unindented_line_continues_item_text() {
        let (blocks, _) = blocks("- a\nlazy\n");
        assert_eq!(
            blocks,
            vec![Block::List(List {
                kind: ListKind::Unordered,
                items: vec![item(vec![para("a\nlazy")])],
            })]
        );
    }

    #[test]
    fn fence_in_list_item_keeps_its_lines() {
        let (blocks, degradations) = blocks("- ```\ncode\n```\nafter");
        assert_eq!(
            blocks,
            vec![
                Block::List(List {
                    kind: ListKind::Unordered,
                    items: vec![item(vec![Block::CodeBlock {
                        language: None,
                        content: "code\n".into(),
                    }])],
                }),
                para("after"),
            ]
        );
        assert!(degradations.is_empty());
    }

    #[test]
    fn fence_in_list_item_spans_blank_lines() {
        let (blocks, degradations) = blocks("1. ```sh\n   a\n\n   - b\n   ```\n2. next\n");
        assert_eq!(
            blocks,
            vec![Block::List(List {
                kind: ListKind::Ordered { start: 1 },
                items: vec![
                    item(vec![Block::CodeBlock {
                        language: Some("sh".into()),
                        content: "   a\n\n   - b\n".into(),
                    }]),
                    item(vec![para("next")]),
                ],
            })]
        );
        assert!(degradations.is_empty());
    }

    #[test]
    fn unterminated_fence_in_list_item_reported_once() {
        let (blocks, degradations) = blocks("- ```\ncode\n\n- not an item\n");
        assert_eq!(
            blocks,
            vec![Block::List(List {
                kind: ListKind::Unordered,
                items: vec![item(vec![Block::CodeBlock {
                    language: None,
                    content: "code\n\n- not an item\n".into(),
                }])],
            })]
        );
        assert_eq!(
            degradations,
            vec![Degradation::block(BlockConstruct::UnterminatedFence, 2)]
        );
    }

    #[test]
    fn list_kind_change_starts_new_list() {
        let (blocks, _) = blocks("- a\n- b\n1. c\n");
        assert_eq!(
            blocks,
            vec![
                Block::List(List {
                    kind: ListKind::Unordered,
                    items: vec![item(vec![para("a")]), item(vec![para("b")])],
                }),
                Block::List(List {
                    kind: ListKind::Ordered { start: 1 },
                    items: vec![item(vec![para("c")])],
                }),
            ]
        );
    }

    #[test]
    fn nested_list_by_indent() {
        let (blocks, _) = blocks("1. a\n   - b\n   - c\n2. d\n");
        assert_eq!(
            blocks,
            vec![Block::List(List {
                kind: ListKind::Ordered { start: 1 },
                items: vec![
                    item(vec![
                        para("a"),
                        Block::List(List {
                            kind: ListKind::Unordered,
                            items: vec![item(vec![para("b")]), item(vec![para("c")])],
                        }),
                    ]),
                    item(vec![para("d")]),
                ],
            })]
        );
    }

    #[test]
    fn ordered_list_start_number() {
        let (blocks, _) = blocks("7) seven\n8) eight\n");
        let [Block::List(list)] = blocks.as_slice() else {
            panic!("expected a single list, got {blocks:?}");
        };
        assert_eq!(list.kind, ListKind::Ordered { start: 7 });
        assert_eq!(list.items.len(), 2);
    }

    #[test]
    fn rule_between_paragraphs() {
        let (blocks, _) = blocks("a\n---\nb\n");
        assert_eq!(blocks, vec![para("a"), Block::ThematicBreak, para("b")]);
    }

    #[test]
    fn deep_quotes_degrade_to_text() {
        let input = format!("{}x", "> ".repeat(100));
        let (blocks, _) = blocks(&input);

        let mut depth = 0;
        let mut current = blocks.as_slice();
        while let [Block::BlockQuote(children)] = current {
            depth += 1;
            current = children.as_slice();
        }
        assert_eq!(depth, MAX_NESTING);
        assert!(matches!(current, [Block::Paragraph(_)]));
    }
}
