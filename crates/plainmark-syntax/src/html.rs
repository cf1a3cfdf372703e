//! # Generator - Document Tree to HTML
//!
//! The last stage: a recursive walk that writes an HTML fragment. Blocks are
//! concatenated with no separators.
//!
//! Escaping (`&`, `<`, `>`, `"`) happens exactly once, in [`HtmlWriter::text`]
//! and [`HtmlWriter::attribute`]. Node contents are never escaped before they
//! reach the writer, and tag names never pass through it.

use crate::ast::{Block, Document, Inline, List, ListKind};

/// Render a document to an HTML fragment.
pub fn generate(document: &Document) -> String {
    let mut writer = HtmlWriter::default();
    for block in &document.children {
        writer.block(block);
    }
    writer.finish()
}

#[derive(Debug, Default)]
struct HtmlWriter {
    buffer: String,
}

impl HtmlWriter {
    fn finish(self) -> String {
        self.buffer
    }

    fn block(&mut self, block: &Block) {
        match block {
            Block::Heading { level, children } => {
                let tag = format!("h{}", level.get());
                self.element(&tag, |w| w.inlines(children));
            }
            Block::Paragraph(children) => self.element("p", |w| w.inlines(children)),
            Block::CodeBlock { language, content } => self.element("pre", |w| {
                w.open("code");
                if let Some(language) = language {
                    w.attribute("class", &format!("language-{language}"));
                }
                w.buffer.push('>');
                w.text(content);
                w.close("code");
            }),
            Block::BlockQuote(children) => self.element("blockquote", |w| {
                for child in children {
                    w.block(child);
                }
            }),
            Block::List(list) => self.list(list),
            Block::ThematicBreak => self.buffer.push_str("<hr>"),
        }
    }

    fn list(&mut self, list: &List) {
        let tag = match list.kind {
            ListKind::Unordered => "ul",
            ListKind::Ordered { .. } => "ol",
        };

        self.open(tag);
        if let ListKind::Ordered { start } = list.kind
            && start != 1
        {
            self.attribute("start", &start.to_string());
        }
        self.buffer.push('>');

        for item in &list.items {
            self.element("li", |w| {
                for child in &item.children {
                    // Lists are always tight.
                    match child {
                        Block::Paragraph(children) => w.inlines(children),
                        other => w.block(other),
                    }
                }
            });
        }
        self.close(tag);
    }

    fn inlines(&mut self, inlines: &[Inline]) {
        for inline in inlines {
            self.inline(inline);
        }
    }

    fn inline(&mut self, inline: &Inline) {
        match inline {
            Inline::Text(text) => self.text(text),
            Inline::Emphasis(children) => self.element("em", |w| w.inlines(children)),
            Inline::Strong(children) => self.element("strong", |w| w.inlines(children)),
            Inline::CodeSpan(code) => self.element("code", |w| w.text(code)),
            Inline::Link { url, children } => {
                self.open("a");
                self.attribute("href", url);
                self.buffer.push('>');
                self.inlines(children);
                self.close("a");
            }
            Inline::LineBreak => self.buffer.push_str("<br>"),
        }
    }

    /// Write `<tag>`, the body, then `</tag>`.
    fn element(&mut self, tag: &str, body: impl FnOnce(&mut Self)) {
        self.open(tag);
        self.buffer.push('>');
        body(self);
        self.close(tag);
    }

    /// Write `<tag` and leave it open for attributes.
    fn open(&mut self, tag: &str) {
        self.buffer.push('<');
        self.buffer.push_str(tag);
    }

    fn attribute(&mut self, name: &str, value: &str) {
        self.buffer.push(' ');
        self.buffer.push_str(name);
        self.buffer.push_str("=\"");
        html_escape::encode_double_quoted_attribute_to_string(value, &mut self.buffer);
        self.buffer.push('"');
    }

    fn close(&mut self, tag: &str) {
        self.buffer.push_str("</");
        self.buffer.push_str(tag);
        self.buffer.push('>');
    }

    fn text(&mut self, text: &str) {
        html_escape::encode_double_quoted_attribute_to_string(text, &mut self.buffer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{HeadingLevel, ListItem};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn doc(children: Vec<Block>) -> Document {
        Document::new(children)
    }

    fn text(s: &str) -> Inline {
        Inline::text(s)
    }

    #[test]
    fn empty_document() {
        assert_eq!(generate(&Document::default()), "");
    }

    #[test]
    fn text_is_escaped_once() {
        let document = doc(vec![Block::Paragraph(vec![text("<script>")])]);
        assert_eq!(generate(&document), "<p>&lt;script&gt;</p>");
    }

    #[test]
    fn already_escaped_text_is_escaped_again() {
        let document = doc(vec![Block::Paragraph(vec![text("&amp; \"q\"")])]);
        assert_eq!(generate(&document), "<p>&amp;amp; &quot;q&quot;</p>");
    }

    #[rstest]
    #[case(1)]
    #[case(4)]
    #[case(6)]
    fn heading_levels(#[case] level: usize) {
        let document = doc(vec![Block::Heading {
            level: HeadingLevel::new(level),
            children: vec![text("T")],
        }]);
        assert_eq!(generate(&document), format!("<h{level}>T</h{level}>"));
    }

    #[test]
    fn code_block_with_language() {
        let document = doc(vec![Block::CodeBlock {
            language: Some("c\"++".into()),
            content: "a < b && *c*\n".into(),
        }]);
        assert_eq!(
            generate(&document),
            "<pre><code class=\"language-c&quot;++\">a &lt; b &amp;&amp; *c*\n</code></pre>"
        );
    }

    #[test]
    fn code_block_without_language() {
        let document = doc(vec![Block::CodeBlock {
            language: None,
            content: String::new(),
        }]);
        assert_eq!(generate(&document), "<pre><code></code></pre>");
    }

    #[test]
    fn inline_elements() {
        let document = doc(vec![Block::Paragraph(vec![
            Inline::Emphasis(vec![text("em")]),
            Inline::Strong(vec![text("strong")]),
            Inline::CodeSpan("<b>".into()),
            Inline::LineBreak,
            Inline::Link {
                url: "/a?b=1&c=\"2\"".into(),
                children: vec![text("link")],
            },
        ])]);
        assert_eq!(
            generate(&document),
            "<p><em>em</em><strong>strong</strong><code>&lt;b&gt;</code><br>\
             <a href=\"/a?b=1&amp;c=&quot;2&quot;\">link</a></p>"
        );
    }

    #[test]
    fn lists_render_tight() {
        let document = doc(vec![Block::List(List {
            kind: ListKind::Ordered { start: 3 },
            items: vec![
                ListItem {
                    children: vec![
                        Block::Paragraph(vec![text("a")]),
                        Block::List(List {
                            kind: ListKind::Unordered,
                            items: vec![ListItem {
                                children: vec![Block::Paragraph(vec![text("b")])],
                            }],
                        }),
                    ],
                },
                ListItem::default(),
            ],
        })]);
        assert_eq!(
            generate(&document),
            "<ol start=\"3\"><li>a<ul><li>b</li></ul></li><li></li></ol>"
        );
    }

    #[test]
    fn blockquote_and_rule() {
        let document = doc(vec![
            Block::BlockQuote(vec![Block::Paragraph(vec![text("q")])]),
            Block::ThematicBreak,
        ]);
        assert_eq!(generate(&document), "<blockquote><p>q</p></blockquote><hr>");
    }
}
