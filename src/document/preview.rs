//! Markdown to terminal preview rendering with comrak.

use comrak::nodes::{AstNode, ListDelimType, ListType, NodeValue, TableAlignment};
use comrak::{Arena, Options, parse_document};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use super::outline::Slugger;
use super::types::{
    CheckboxRef, HeadingRef, InlineSpan, InlineStyle, LineType, Preview, RenderedLine,
};
use crate::highlight::highlight_code;
use crate::state::Theme;

const CODE_RIGHT_PADDING: usize = 2;
const UNCHECKED: &str = "☐";
const CHECKED: &str = "☑";
const QUOTE_BAR: &str = "│ ";
const QUOTE_BAR_WIDTH: usize = 2;

/// Render `source` into preview lines wrapped at `width` columns.
///
/// # Example
///
/// ```
/// use zenith::document::render_preview;
/// use zenith::state::Theme;
///
/// let preview = render_preview("# Hello\n\n- [ ] task", 40, Theme::Dark);
/// assert_eq!(preview.headings()[0].id, "hello");
/// assert_eq!(preview.checkboxes()[0].source_line, 3);
/// ```
pub fn render_preview(source: &str, width: usize, theme: Theme) -> Preview {
    let arena = Arena::new();
    let mut options = Options::default();
    super::apply_gfm_extensions(&mut options);
    let root = parse_document(&arena, source, &options);

    let mut renderer = Renderer {
        lines: Vec::new(),
        headings: Vec::new(),
        checkboxes: Vec::new(),
        slugger: Slugger::default(),
        width: width.max(8),
        theme,
    };
    renderer.block(root, 0, None);
    while renderer
        .lines
        .last()
        .is_some_and(|line| matches!(line.line_type(), LineType::Empty))
    {
        renderer.lines.pop();
    }
    Preview::new(
        renderer.lines,
        renderer.headings,
        renderer.checkboxes,
        renderer.width,
    )
}

struct Renderer {
    lines: Vec<RenderedLine>,
    headings: Vec<HeadingRef>,
    checkboxes: Vec<CheckboxRef>,
    slugger: Slugger,
    width: usize,
    theme: Theme,
}

impl Renderer {
    fn push(&mut self, content: String, line_type: LineType) {
        self.lines.push(RenderedLine::new(content, line_type));
    }

    fn push_spans(&mut self, spans: Vec<InlineSpan>, line_type: LineType) {
        let content = spans_to_string(&spans);
        self.lines
            .push(RenderedLine::with_spans(content, line_type, spans));
    }

    fn blank(&mut self) {
        if self
            .lines
            .last()
            .is_some_and(|line| !matches!(line.line_type(), LineType::Empty))
        {
            self.push(String::new(), LineType::Empty);
        }
    }

    fn children<'a>(&mut self, node: &'a AstNode<'a>, depth: usize, marker: Option<&str>) {
        for child in node.children() {
            self.block(child, depth, marker);
        }
    }

    fn block<'a>(&mut self, node: &'a AstNode<'a>, depth: usize, marker: Option<&str>) {
        let value = node.data.borrow().value.clone();
        match value {
            NodeValue::Document => self.children(node, depth, marker),

            NodeValue::Heading(heading) => {
                let text = extract_text(node);
                let id = self.slugger.slug(&text);
                self.blank();
                self.headings.push(HeadingRef {
                    level: heading.level,
                    text: text.clone(),
                    line: self.lines.len(),
                    id,
                });
                let spans = collect_inline_spans(node);
                for line in wrap_spans(&spans, self.width, "", "") {
                    self.push_spans(line, LineType::Heading(heading.level));
                }
                let underline = match heading.level {
                    1 => Some('═'),
                    2 => Some('─'),
                    _ => None,
                };
                if let Some(ch) = underline {
                    let len = UnicodeWidthStr::width(text.as_str()).clamp(1, self.width);
                    self.push(ch.to_string().repeat(len), LineType::Heading(heading.level));
                }
                self.blank();
            }

            NodeValue::Paragraph => {
                let spans = collect_inline_spans(node);
                for line in wrap_spans(&spans, self.width, "", "") {
                    self.push_spans(line, LineType::Paragraph);
                }
                self.blank();
            }

            NodeValue::CodeBlock(code_block) => {
                let language = code_block
                    .info
                    .split_whitespace()
                    .next()
                    .map(ToString::to_string);
                self.code_block(language.as_deref(), &code_block.literal);
                self.blank();
            }

            NodeValue::List(list) => {
                let list_depth = depth + 1;
                let delimiter = match list.delimiter {
                    ListDelimType::Paren => ')',
                    ListDelimType::Period => '.',
                };
                let count = node.children().count();
                let number_width = (list.start + count.saturating_sub(1)).to_string().len();
                for (index, child) in node.children().enumerate() {
                    let marker = match list.list_type {
                        ListType::Bullet => "• ".to_string(),
                        ListType::Ordered => {
                            format!("{:>number_width$}{delimiter} ", list.start + index)
                        }
                    };
                    self.block(child, list_depth, Some(&marker));
                }
                if depth == 0 {
                    self.blank();
                }
            }

            NodeValue::Item(_) => self.item(node, depth, marker.unwrap_or("• "), None),

            NodeValue::TaskItem(symbol) => {
                let source_line = node.data.borrow().sourcepos.start.line;
                let task = Some((symbol.is_some(), source_line));
                self.item(node, depth, marker.unwrap_or("• "), task);
            }

            NodeValue::BlockQuote => {
                self.blockquote(node);
                self.blank();
            }

            NodeValue::ThematicBreak => {
                self.push("─".repeat(self.width), LineType::HorizontalRule);
                self.blank();
            }

            NodeValue::Table(_) => {
                for line in render_table(node, self.width) {
                    self.push(line, LineType::Table);
                }
                self.blank();
            }

            NodeValue::HtmlBlock(html) => {
                for raw in html.literal.lines() {
                    self.push(truncate_text(raw, self.width), LineType::Html);
                }
                self.blank();
            }

            NodeValue::FootnoteDefinition(def) => {
                let label = format!("[^{}]: ", def.name);
                let continuation = " ".repeat(label.len());
                let spans = collect_inline_spans(node);
                for line in wrap_spans(&spans, self.width, &label, &continuation) {
                    self.push_spans(line, LineType::Paragraph);
                }
                self.blank();
            }

            _ => self.children(node, depth, marker),
        }
    }

    /// List item, optionally carrying a task checkbox `(checked, source_line)`.
    fn item<'a>(
        &mut self,
        node: &'a AstNode<'a>,
        depth: usize,
        marker: &str,
        task: Option<(bool, usize)>,
    ) {
        let indent = "  ".repeat(depth.saturating_sub(1));
        let marker = match task {
            Some((checked, _)) => format!("{} ", if checked { CHECKED } else { UNCHECKED }),
            None => marker.to_string(),
        };
        let prefix_first = format!("{indent}{marker}");
        let prefix_next = format!("{indent}{}", " ".repeat(UnicodeWidthStr::width(marker.as_str())));

        let checkbox_index = task.map(|(checked, source_line)| {
            self.checkboxes.push(CheckboxRef {
                line: self.lines.len(),
                column: UnicodeWidthStr::width(indent.as_str()),
                source_line,
                checked,
            });
            self.checkboxes.len() - 1
        });
        let marker_only = vec![InlineSpan::new(prefix_first.clone(), InlineStyle::default())];

        let mut rendered_any = false;
        for child in node.children() {
            let is_paragraph = matches!(child.data.borrow().value, NodeValue::Paragraph);
            if is_paragraph {
                if rendered_any {
                    self.push(String::new(), LineType::ListItem(depth));
                }
                let prefix = if rendered_any { &prefix_next } else { &prefix_first };
                let spans = collect_inline_spans(child);
                for line in wrap_spans(&spans, self.width, prefix, &prefix_next) {
                    self.push_spans(line, LineType::ListItem(depth));
                }
            } else {
                if !rendered_any {
                    self.push_spans(marker_only.clone(), LineType::ListItem(depth));
                }
                self.block(child, depth, None);
            }
            rendered_any = true;
        }
        if !rendered_any {
            self.push_spans(marker_only, LineType::ListItem(depth));
        }
        if let Some(index) = checkbox_index {
            self.mark_checkbox_glyph(index);
        }
    }

    /// Restyle the glyph span on the first line of checkbox `index`.
    fn mark_checkbox_glyph(&mut self, index: usize) {
        let Some(checkbox) = self.checkboxes.get(index).copied() else {
            return;
        };
        let Some(line) = self.lines.get(checkbox.line) else {
            return;
        };
        let glyph = if checkbox.checked { CHECKED } else { UNCHECKED };
        let mut spans = line.spans().map(<[InlineSpan]>::to_vec).unwrap_or_default();
        if let Some(first) = spans.first_mut() {
            if let Some(pos) = first.text().find(glyph) {
                let text = first.text().to_string();
                let style = first.style();
                let (head, rest) = text.split_at(pos);
                let (glyph_text, tail) = rest.split_at(glyph.len());
                let mut replaced = Vec::new();
                if !head.is_empty() {
                    replaced.push(InlineSpan::new(head.to_string(), style));
                }
                replaced.push(InlineSpan::new(
                    glyph_text.to_string(),
                    InlineStyle {
                        checkbox: true,
                        ..style
                    },
                ));
                if !tail.is_empty() {
                    replaced.push(InlineSpan::new(tail.to_string(), style));
                }
                spans.splice(0..1, replaced);
            }
        }
        let line_type = *line.line_type();
        let content = spans_to_string(&spans);
        self.lines[checkbox.line] = RenderedLine::with_spans(content, line_type, spans);
    }

    /// Render the quote's children as ordinary blocks, narrowed by the
    /// quote bar, then prefix every line they produced. Nested quotes
    /// stack their bars the same way.
    fn blockquote<'a>(&mut self, node: &'a AstNode<'a>) {
        let first_line = self.lines.len();
        let first_checkbox = self.checkboxes.len();
        let outer_width = self.width;
        self.width = outer_width.saturating_sub(QUOTE_BAR_WIDTH).max(4);
        for child in node.children() {
            self.block(child, 0, None);
        }
        self.width = outer_width;

        while self.lines.len() > first_line
            && self
                .lines
                .last()
                .is_some_and(|line| matches!(line.line_type(), LineType::Empty))
        {
            self.lines.pop();
        }
        for line in &mut self.lines[first_line..] {
            *line = quote_line(line);
        }
        for checkbox in &mut self.checkboxes[first_checkbox..] {
            checkbox.column += QUOTE_BAR_WIDTH;
        }
    }

    fn code_block(&mut self, language: Option<&str>, literal: &str) {
        let content_width = literal
            .lines()
            .map(UnicodeWidthStr::width)
            .max()
            .unwrap_or(0)
            .min(self.width.saturating_sub(4 + CODE_RIGHT_PADDING).max(1));
        let inner_width = content_width + 2 + CODE_RIGHT_PADDING;
        let label: String = format!(" {} ", language.unwrap_or("code"))
            .chars()
            .take(inner_width)
            .collect();
        let top = format!(
            "┌{label}{}┐",
            "─".repeat(inner_width.saturating_sub(UnicodeWidthStr::width(label.as_str())))
        );
        self.push(top, LineType::CodeBlock);

        for spans in highlight_code(language, literal, self.theme) {
            let trimmed = truncate_spans(&spans, content_width);
            let used: usize = trimmed.iter().map(|s| UnicodeWidthStr::width(s.text())).sum();
            let padding = " ".repeat(content_width.saturating_sub(used) + CODE_RIGHT_PADDING);
            let mut line = vec![InlineSpan::new("│ ".to_string(), InlineStyle::default())];
            line.extend(trimmed);
            line.push(InlineSpan::new(format!("{padding}│"), InlineStyle::default()));
            self.push_spans(line, LineType::CodeBlock);
        }

        self.push(format!("└{}┘", "─".repeat(inner_width)), LineType::CodeBlock);
    }
}

/// Prefix one rendered line with a quote bar. Plain paragraphs and
/// blank separators take the quote style; lists, code and headings keep
/// their own.
fn quote_line(line: &RenderedLine) -> RenderedLine {
    let line_type = match line.line_type() {
        LineType::Paragraph | LineType::Empty => LineType::BlockQuote,
        other => *other,
    };
    if matches!(line.line_type(), LineType::Empty) {
        return RenderedLine::new(QUOTE_BAR.trim_end().to_string(), line_type);
    }
    let content = format!("{QUOTE_BAR}{}", line.content());
    match line.spans() {
        Some(spans) => {
            let mut prefixed = Vec::with_capacity(spans.len() + 1);
            prefixed.push(InlineSpan::new(QUOTE_BAR.to_string(), InlineStyle::default()));
            prefixed.extend_from_slice(spans);
            RenderedLine::with_spans(content, line_type, prefixed)
        }
        None => RenderedLine::new(content, line_type),
    }
}

fn render_table<'a>(table_node: &'a AstNode<'a>, wrap_width: usize) -> Vec<String> {
    let (alignments, mut rows, has_header) = collect_table_rows(table_node);
    let num_cols = rows.iter().map(Vec::len).max().unwrap_or(0);
    if num_cols == 0 {
        return Vec::new();
    }
    for row in &mut rows {
        row.resize(num_cols, String::new());
    }

    let mut col_widths = vec![1_usize; num_cols];
    for row in &rows {
        for (idx, cell) in row.iter().enumerate() {
            col_widths[idx] = col_widths[idx].max(UnicodeWidthStr::width(cell.as_str()));
        }
    }

    // row width is 1 + sum(col_width + 3)
    let max_table_width = wrap_width.max(4);
    while 1 + col_widths.iter().sum::<usize>() + 3 * num_cols > max_table_width {
        let Some((widest, &width)) = col_widths.iter().enumerate().max_by_key(|(_, w)| **w) else {
            break;
        };
        if width <= 1 {
            break;
        }
        col_widths[widest] -= 1;
    }

    let mut lines = vec![table_border(&col_widths, '┌', '┬', '┐')];
    for (idx, row) in rows.iter().enumerate() {
        lines.push(table_row(row, &col_widths, &alignments));
        if has_header && idx == 0 {
            lines.push(table_border(&col_widths, '├', '┼', '┤'));
        }
    }
    lines.push(table_border(&col_widths, '└', '┴', '┘'));
    lines
}

fn collect_table_rows<'a>(
    table_node: &'a AstNode<'a>,
) -> (Vec<TableAlignment>, Vec<Vec<String>>, bool) {
    let alignments = match &table_node.data.borrow().value {
        NodeValue::Table(table) => table.alignments.clone(),
        _ => Vec::new(),
    };

    let mut rows = Vec::new();
    let mut has_header = false;
    for row_node in table_node.children() {
        let NodeValue::TableRow(header) = row_node.data.borrow().value else {
            continue;
        };
        has_header |= header;
        let cells = row_node
            .children()
            .filter(|cell| matches!(cell.data.borrow().value, NodeValue::TableCell))
            .map(|cell| extract_text(cell).split_whitespace().collect::<Vec<_>>().join(" "))
            .collect();
        rows.push(cells);
    }
    (alignments, rows, has_header)
}

fn table_border(widths: &[usize], left: char, middle: char, right: char) -> String {
    let cells: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
    let separator = middle.to_string();
    format!("{left}{}{right}", cells.join(separator.as_str()))
}

fn table_row(cells: &[String], widths: &[usize], alignments: &[TableAlignment]) -> String {
    let mut out = String::from("│");
    for (idx, width) in widths.iter().enumerate() {
        let content = truncate_text(cells.get(idx).map_or("", String::as_str), *width);
        let padding = width.saturating_sub(UnicodeWidthStr::width(content.as_str()));
        let (left, right) = match alignments.get(idx).copied().unwrap_or(TableAlignment::None) {
            TableAlignment::Right => (padding, 0),
            TableAlignment::Center => (padding / 2, padding - padding / 2),
            TableAlignment::Left | TableAlignment::None => (0, padding),
        };
        out.push(' ');
        out.push_str(&" ".repeat(left));
        out.push_str(&content);
        out.push_str(&" ".repeat(right));
        out.push_str(" │");
    }
    out
}

fn truncate_text(text: &str, max_width: usize) -> String {
    let mut out = String::new();
    let mut width = 0usize;
    for ch in text.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if width + ch_width > max_width {
            break;
        }
        out.push(ch);
        width += ch_width;
    }
    out
}

fn truncate_spans(spans: &[InlineSpan], max_width: usize) -> Vec<InlineSpan> {
    let mut out = Vec::new();
    let mut remaining = max_width;
    for span in spans {
        if remaining == 0 {
            break;
        }
        let taken = truncate_text(span.text(), remaining);
        let used = UnicodeWidthStr::width(taken.as_str());
        if !taken.is_empty() {
            out.push(InlineSpan::new(taken, span.style()));
        }
        if used == 0 {
            break;
        }
        remaining -= used;
    }
    out
}

/// Plain text of a node, used for heading ids and table cells.
pub(crate) fn extract_text<'a>(node: &'a AstNode<'a>) -> String {
    let mut text = String::new();
    extract_text_recursive(node, &mut text);
    text
}

fn extract_text_recursive<'a>(node: &'a AstNode<'a>, text: &mut String) {
    match &node.data.borrow().value {
        NodeValue::Text(t) => text.push_str(t),
        NodeValue::Code(c) => text.push_str(&c.literal),
        NodeValue::HtmlInline(raw) => text.push_str(raw),
        NodeValue::FootnoteReference(reference) => {
            text.push_str(&format!("[^{}]", reference.name));
        }
        NodeValue::SoftBreak | NodeValue::LineBreak => text.push(' '),
        _ => {
            for child in node.children() {
                extract_text_recursive(child, text);
            }
        }
    }
}

fn collect_inline_spans<'a>(node: &'a AstNode<'a>) -> Vec<InlineSpan> {
    let mut spans = Vec::new();
    collect_inline_spans_recursive(node, InlineStyle::default(), &mut spans);
    spans
}

fn collect_inline_spans_recursive<'a>(
    node: &'a AstNode<'a>,
    style: InlineStyle,
    spans: &mut Vec<InlineSpan>,
) {
    let nested = |flag: fn(&mut InlineStyle), spans: &mut Vec<InlineSpan>| {
        let mut next = style;
        flag(&mut next);
        for child in node.children() {
            collect_inline_spans_recursive(child, next, spans);
        }
    };
    match &node.data.borrow().value {
        NodeValue::List(_) | NodeValue::Item(_) | NodeValue::TaskItem(_) => {}
        NodeValue::Text(t) => spans.push(InlineSpan::new(t.clone(), style)),
        NodeValue::HtmlInline(raw) => spans.push(InlineSpan::new(raw.clone(), style)),
        NodeValue::Code(code) => {
            let code_style = InlineStyle {
                code: true,
                emphasis: false,
                strong: false,
                strikethrough: false,
                ..style
            };
            spans.push(InlineSpan::new(code.literal.clone(), code_style));
        }
        NodeValue::Emph => nested(|s| s.emphasis = true, spans),
        NodeValue::Strong => nested(|s| s.strong = true, spans),
        NodeValue::Strikethrough => nested(|s| s.strikethrough = true, spans),
        NodeValue::Link(_) => nested(|s| s.link = true, spans),
        NodeValue::Image(image) => {
            let alt = extract_text(node);
            let label = if alt.is_empty() { image.url.clone() } else { alt };
            let link_style = InlineStyle { link: true, ..style };
            spans.push(InlineSpan::new(format!("[image: {label}]"), link_style));
        }
        NodeValue::FootnoteReference(reference) => {
            spans.push(InlineSpan::new(format!("[^{}]", reference.name), style));
        }
        NodeValue::SoftBreak | NodeValue::LineBreak => {
            spans.push(InlineSpan::new(" ".to_string(), style));
        }
        _ => {
            for child in node.children() {
                collect_inline_spans_recursive(child, style, spans);
            }
        }
    }
}

/// Greedy word wrap over styled spans. Leading whitespace is dropped on
/// wrapped lines; words wider than the line are placed alone.
fn wrap_spans(
    spans: &[InlineSpan],
    width: usize,
    prefix_first: &str,
    prefix_next: &str,
) -> Vec<Vec<InlineSpan>> {
    let tokens: Vec<InlineSpan> = spans.iter().flat_map(split_inline_tokens).collect();

    let mut lines = Vec::new();
    let mut current = Vec::new();
    let mut current_width = 0usize;
    let mut has_word = false;

    let start_line = |prefix: &str, current: &mut Vec<InlineSpan>, current_width: &mut usize| {
        current.clear();
        *current_width = UnicodeWidthStr::width(prefix);
        if !prefix.is_empty() {
            current.push(InlineSpan::new(prefix.to_string(), InlineStyle::default()));
        }
    };
    start_line(prefix_first, &mut current, &mut current_width);

    for token in tokens {
        let token_width = UnicodeWidthStr::width(token.text());
        let is_ws = token.text().chars().all(char::is_whitespace);

        if current_width + token_width > width && has_word {
            trim_trailing_whitespace(&mut current);
            lines.push(std::mem::take(&mut current));
            start_line(prefix_next, &mut current, &mut current_width);
            has_word = false;
        }
        if is_ws && !has_word {
            continue;
        }
        current_width += token_width;
        current.push(token);
        has_word = true;
    }

    if current.is_empty() && !prefix_first.is_empty() {
        current.push(InlineSpan::new(prefix_first.to_string(), InlineStyle::default()));
    }
    trim_trailing_whitespace(&mut current);
    lines.push(current);
    lines
}

fn trim_trailing_whitespace(line: &mut Vec<InlineSpan>) {
    while line.len() > 1
        && line
            .last()
            .is_some_and(|span| span.text().chars().all(char::is_whitespace))
    {
        line.pop();
    }
}

fn split_inline_tokens(span: &InlineSpan) -> Vec<InlineSpan> {
    let mut out = Vec::new();
    let mut buf = String::new();
    let mut in_ws: Option<bool> = None;
    for ch in span.text().chars() {
        let is_ws = ch.is_whitespace();
        if in_ws.is_some_and(|state| state != is_ws) {
            out.push(InlineSpan::new(std::mem::take(&mut buf), span.style()));
        }
        buf.push(ch);
        in_ws = Some(is_ws);
    }
    if !buf.is_empty() {
        out.push(InlineSpan::new(buf, span.style()));
    }
    out
}

fn spans_to_string(spans: &[InlineSpan]) -> String {
    spans.iter().map(InlineSpan::text).collect()
}
