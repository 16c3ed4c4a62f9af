//! Document tree to plain text or Markdown
//!
//! A single depth-first walk over the (sanitized) document. The walk keeps
//! its own stack of enter/leave frames, so document depth is bounded by heap
//! memory only. Each element maps to a [`Rule`]; unknown elements are
//! transparent containers.
//!
//! Output is produced line by line by [`Writer`]: block rules end the
//! current line and request a break before the next one, inline text is
//! whitespace-collapsed, and inline markup is applied when the element
//! closes, which lets empty or line-spanning wrappers degrade to bare text.

use super::document::{Document, Element, NodeData, NodeId};
use crate::types::OutputMode;
use std::cmp::max;

/// Render a document as text or Markdown
///
/// [`OutputMode::Html`] has no linearized form and is rendered as text.
pub fn linearize(doc: &Document, mode: OutputMode) -> String {
    let markdown = mode == OutputMode::Markdown;
    let mut linearizer = Linearizer {
        markdown,
        writer: Writer::new(markdown),
        lists: Vec::new(),
        rows: Vec::new(),
        pre_depth: 0,
    };
    linearizer.run(doc);
    linearizer.writer.finish()
}

/// Strength of a block boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Break {
    /// End the line
    Line,
    /// End the line and leave a blank line (Markdown only)
    Paragraph,
}

/// Rendering rule for an element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rule {
    Transparent,
    Block(Break),
    Heading(usize),
    List { ordered: bool },
    ListItem,
    LineBreak,
    ThematicBreak,
    Emphasis,
    Strong,
    Strikethrough,
    Code,
    Link,
    Image,
    Preformatted,
    Quote,
    Row,
    Cell,
}

fn rule_for(tag: &str) -> Rule {
    match tag {
        "p" | "table" | "figure" | "dl" => Rule::Block(Break::Paragraph),
        "div" | "section" | "article" | "main" | "header" | "hgroup" | "address" | "center"
        | "details" | "summary" | "fieldset" | "legend" | "caption" | "figcaption" | "dt"
        | "dd" | "body" => Rule::Block(Break::Line),
        "h1" => Rule::Heading(1),
        "h2" => Rule::Heading(2),
        "h3" => Rule::Heading(3),
        "h4" => Rule::Heading(4),
        "h5" => Rule::Heading(5),
        "h6" => Rule::Heading(6),
        "ul" | "menu" => Rule::List { ordered: false },
        "ol" => Rule::List { ordered: true },
        "li" => Rule::ListItem,
        "br" => Rule::LineBreak,
        "hr" => Rule::ThematicBreak,
        "em" | "i" => Rule::Emphasis,
        "strong" | "b" => Rule::Strong,
        "del" | "s" | "strike" => Rule::Strikethrough,
        "code" | "kbd" | "samp" | "tt" => Rule::Code,
        "a" => Rule::Link,
        "img" => Rule::Image,
        "pre" => Rule::Preformatted,
        "blockquote" => Rule::Quote,
        "tr" => Rule::Row,
        "td" | "th" => Rule::Cell,
        _ => Rule::Transparent,
    }
}

/// Work left to do when an element closes
#[derive(Debug)]
enum Exit {
    Block(Break),
    Heading {
        marker_len: usize,
    },
    List,
    ListItem,
    Wrap {
        span: Span,
        open: &'static str,
        close: &'static str,
    },
    Link {
        span: Span,
        href: String,
    },
    Preformatted,
    Quote,
    Row,
    Cell,
}

enum Frame {
    Enter(NodeId),
    Leave(Exit),
}

struct ListState {
    ordered: bool,
    items: usize,
}

struct Linearizer {
    markdown: bool,
    writer: Writer,
    lists: Vec<ListState>,
    /// Cells seen so far in each open table row
    rows: Vec<usize>,
    pre_depth: usize,
}

impl Linearizer {
    fn run(&mut self, doc: &Document) {
        let mut stack = vec![Frame::Enter(doc.root())];

        while let Some(frame) = stack.pop() {
            let id = match frame {
                Frame::Enter(id) => id,
                Frame::Leave(exit) => {
                    self.close(exit);
                    continue;
                }
            };

            match doc.data(id) {
                NodeData::Root => {}
                NodeData::Text(text) => {
                    if self.pre_depth > 0 {
                        self.writer.preformatted(text);
                    } else {
                        self.writer.text(text);
                    }
                }
                NodeData::Element(el) => {
                    if let Some(exit) = self.open(el) {
                        stack.push(Frame::Leave(exit));
                    }
                }
            }

            stack.extend(doc.children(id).iter().rev().map(|&child| Frame::Enter(child)));
        }
    }

    fn open(&mut self, el: &Element) -> Option<Exit> {
        let w = &mut self.writer;

        match rule_for(el.name()) {
            Rule::Transparent => None,
            Rule::Block(brk) => {
                w.block(brk);
                Some(Exit::Block(brk))
            }
            Rule::Heading(level) => {
                w.block(Break::Paragraph);
                let marker = format!("{} ", "#".repeat(level));
                let marker_len = if self.markdown && w.marker(&marker) {
                    marker.len()
                } else {
                    0
                };
                Some(Exit::Heading { marker_len })
            }
            Rule::List { ordered } => {
                w.block(if self.lists.is_empty() {
                    Break::Paragraph
                } else {
                    Break::Line
                });
                self.lists.push(ListState { ordered, items: 0 });
                Some(Exit::List)
            }
            Rule::ListItem => {
                w.block(Break::Line);
                w.item_depth += 1;
                if self.markdown {
                    // An item with no content of its own yields to the nested one
                    w.clear_marker();
                    let marker = match self.lists.last_mut() {
                        Some(list) if list.ordered => {
                            list.items += 1;
                            format!("{}. ", list.items)
                        }
                        Some(list) => {
                            list.items += 1;
                            "- ".to_string()
                        }
                        None => "- ".to_string(),
                    };
                    w.marker(&marker);
                }
                Some(Exit::ListItem)
            }
            Rule::LineBreak => {
                w.block(Break::Line);
                None
            }
            Rule::ThematicBreak => {
                w.block(Break::Paragraph);
                if self.markdown {
                    w.standalone("---");
                    w.block(Break::Paragraph);
                }
                None
            }
            Rule::Emphasis => self.wrap("*", "*"),
            Rule::Strong => self.wrap("**", "**"),
            Rule::Strikethrough => self.wrap("~~", "~~"),
            Rule::Code if self.pre_depth == 0 => self.wrap("`", "`"),
            Rule::Code => None,
            Rule::Link => {
                let href = el
                    .attr("href")
                    .map(link_destination)
                    .filter(|href| !href.is_empty() && !is_script_url(href))?;
                if !self.markdown {
                    return None;
                }
                Some(Exit::Link {
                    span: w.span(),
                    href,
                })
            }
            Rule::Image => {
                if self.markdown {
                    let src = el.attr("src").map(link_destination).unwrap_or_default();
                    if !src.is_empty() && !src.starts_with("data:") {
                        let alt = collapse_spaces(el.attr("alt").unwrap_or_default());
                        w.token(&format!("![{alt}]({src})"));
                    }
                }
                None
            }
            Rule::Preformatted => {
                w.block(Break::Paragraph);
                if self.markdown {
                    w.standalone("```");
                    w.block(Break::Line);
                }
                self.pre_depth += 1;
                Some(Exit::Preformatted)
            }
            Rule::Quote => {
                w.block(Break::Paragraph);
                if self.markdown {
                    w.quote_depth += 1;
                }
                Some(Exit::Quote)
            }
            Rule::Row => {
                w.block(Break::Line);
                self.rows.push(0);
                Some(Exit::Row)
            }
            Rule::Cell => {
                if let Some(cells) = self.rows.last_mut() {
                    if *cells > 0 {
                        w.cell_separator();
                    }
                    *cells += 1;
                }
                w.cell_depth += 1;
                Some(Exit::Cell)
            }
        }
    }

    fn close(&mut self, exit: Exit) {
        let w = &mut self.writer;

        match exit {
            Exit::Block(brk) => w.block(brk),
            Exit::Heading { marker_len } => {
                w.retract_marker(marker_len);
                w.block(Break::Paragraph);
            }
            Exit::ListItem => {
                w.clear_marker();
                w.item_depth -= 1;
                w.block(Break::Line);
            }
            Exit::List => {
                self.lists.pop();
                w.block(if self.lists.is_empty() {
                    Break::Paragraph
                } else {
                    Break::Line
                });
            }
            Exit::Wrap { span, open, close } => w.wrap(span, open, close),
            Exit::Link { span, href } => w.wrap(span, "[", &format!("]({href})")),
            Exit::Preformatted => {
                self.pre_depth -= 1;
                w.block(Break::Line);
                if self.markdown {
                    w.standalone("```");
                }
                w.block(Break::Paragraph);
            }
            Exit::Quote => {
                w.block(Break::Paragraph);
                if self.markdown {
                    w.quote_depth -= 1;
                }
            }
            Exit::Row => {
                self.rows.pop();
                w.block(Break::Line);
            }
            Exit::Cell => {
                w.cell_depth -= 1;
                w.pending_space = true;
            }
        }
    }

    fn wrap(&mut self, open: &'static str, close: &'static str) -> Option<Exit> {
        if !self.markdown {
            return None;
        }
        Some(Exit::Wrap {
            span: self.writer.span(),
            open,
            close,
        })
    }
}

fn is_script_url(href: &str) -> bool {
    href.get(..11)
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case("javascript:"))
}

/// A URL made safe to sit between `(` and `)`
///
/// Tabs and line breaks are dropped the way URL parsers drop them, spaces
/// and parentheses are percent-encoded.
fn link_destination(url: &str) -> String {
    let mut out = String::with_capacity(url.len());
    for c in url.trim().chars() {
        match c {
            '\t' | '\r' | '\n' => {}
            ' ' => out.push_str("%20"),
            '(' => out.push_str("%28"),
            ')' => out.push_str("%29"),
            _ => out.push(c),
        }
    }
    out
}

fn collapse_spaces(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Position in the current line where an inline wrapper started
#[derive(Debug, Clone, Copy)]
struct Span {
    line_no: usize,
    start: usize,
}

/// Line-oriented output buffer
struct Writer {
    markdown: bool,
    out: String,
    line: String,
    /// Incremented every time the current line is ended
    line_no: usize,
    /// List/heading marker waiting for the first content of its element
    pending_marker: Option<String>,
    /// Length of the marker written at the start of `line`
    marker_len: usize,
    pending_space: bool,
    pending_break: Option<Break>,
    quote_depth: usize,
    /// Quote depth of the last line written to `out`
    last_quote_depth: usize,
    /// Inside a list item, paragraph breaks shrink to line breaks
    item_depth: usize,
    /// Inside a table cell, breaks become spaces
    cell_depth: usize,
}

impl Writer {
    fn new(markdown: bool) -> Self {
        Self {
            markdown,
            out: String::new(),
            line: String::new(),
            line_no: 0,
            pending_marker: None,
            marker_len: 0,
            pending_space: false,
            pending_break: None,
            quote_depth: 0,
            last_quote_depth: 0,
            item_depth: 0,
            cell_depth: 0,
        }
    }

    /// Inline text, whitespace collapsed
    fn text(&mut self, text: &str) {
        for c in text.chars() {
            if c.is_whitespace() {
                self.pending_space = true;
            } else {
                self.push_char(c);
            }
        }
    }

    /// Text inside `pre`: source newlines end lines
    fn preformatted(&mut self, text: &str) {
        for (i, segment) in text.split('\n').enumerate() {
            if i > 0 {
                self.block(Break::Line);
            }
            self.text(segment);
        }
    }

    /// Markup emitted verbatim
    fn token(&mut self, token: &str) {
        self.flush_marker();
        self.apply_space();
        self.line.push_str(token);
    }

    /// Marker for the first line of content, discarded if none follows
    ///
    /// Survives line ends, so block children still get it. Markers set
    /// before any content is written accumulate (`- ### Title`).
    fn marker(&mut self, marker: &str) -> bool {
        if self.cell_depth > 0 || !self.line.is_empty() {
            return false;
        }
        self.pending_marker
            .get_or_insert_with(String::new)
            .push_str(marker);
        true
    }

    fn clear_marker(&mut self) {
        self.pending_marker = None;
    }

    /// Take back the last `len` bytes of a marker that never got content
    fn retract_marker(&mut self, len: usize) {
        if let Some(marker) = &mut self.pending_marker {
            marker.truncate(marker.len().saturating_sub(len));
            if marker.is_empty() {
                self.pending_marker = None;
            }
        }
    }

    fn flush_marker(&mut self) {
        if let Some(marker) = self.pending_marker.take() {
            self.line.insert_str(0, &marker);
            self.marker_len = marker.len();
            self.pending_space = false;
        }
    }

    /// Markup that occupies a line of its own (fences, rules)
    fn standalone(&mut self, token: &str) {
        if self.cell_depth == 0 {
            self.token(token);
        }
    }

    fn cell_separator(&mut self) {
        self.pending_space = true;
        if self.markdown {
            self.apply_space();
            self.line.push('|');
            self.pending_space = true;
        }
    }

    fn span(&self) -> Span {
        Span {
            line_no: self.line_no,
            start: self.line.len(),
        }
    }

    /// Apply inline markup to everything written since `span`
    ///
    /// If the line ended in between, the markup is dropped and the text kept.
    fn wrap(&mut self, span: Span, open: &str, close: &str) {
        // A marker flushed after the span began sits in front of it
        let start = span.start.max(self.marker_len);
        if span.line_no != self.line_no || start > self.line.len() {
            return;
        }

        let inner = self.line.split_off(start);
        let lead = inner.starts_with(' ');
        let inner = inner.trim();
        if inner.is_empty() {
            self.pending_space |= lead;
            return;
        }

        if lead {
            self.line.push(' ');
        }
        self.line.push_str(open);
        self.line.push_str(inner);
        self.line.push_str(close);
    }

    fn push_char(&mut self, c: char) {
        self.flush_marker();
        self.apply_space();
        // Keep text such as "&lt;div&gt;" from forming a tag in plain text
        if !self.markdown && self.line.ends_with('<') && starts_tag(c) {
            self.line.push(' ');
        }
        self.line.push(c);
    }

    fn apply_space(&mut self) {
        if self.pending_space && !self.line.is_empty() && !self.line.ends_with(' ') {
            self.line.push(' ');
        }
        self.pending_space = false;
    }

    /// End the current line and request a break of at least `brk`
    fn block(&mut self, brk: Break) {
        if self.cell_depth > 0 {
            self.pending_space = true;
            return;
        }
        self.end_line();
        let brk = if self.item_depth > 0 { Break::Line } else { brk };
        self.pending_break = Some(self.pending_break.map_or(brk, |pending| max(pending, brk)));
    }

    fn end_line(&mut self) {
        let content = self.line.trim();
        if !content.is_empty() {
            if !self.out.is_empty() {
                self.out.push('\n');
                if self.pending_break == Some(Break::Paragraph) && self.markdown {
                    // The blank line stays inside a quote both lines share
                    let shared = self.quote_depth.min(self.last_quote_depth);
                    self.out.push_str("> ".repeat(shared).trim_end());
                    self.out.push('\n');
                }
            }
            for _ in 0..self.quote_depth {
                self.out.push_str("> ");
            }
            self.out.push_str(content);
            self.pending_break = None;
            self.last_quote_depth = self.quote_depth;
        }

        self.line.clear();
        self.line_no += 1;
        self.marker_len = 0;
        self.pending_space = false;
    }

    fn finish(mut self) -> String {
        self.end_line();
        self.out
    }
}

fn starts_tag(c: char) -> bool {
    c.is_ascii_alphabetic() || matches!(c, '/' | '!' | '?')
}
