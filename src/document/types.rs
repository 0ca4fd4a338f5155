//! Core preview types.

/// Rendered preview of a markdown document, ready for the preview pane.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Preview {
    /// Rendered lines for display
    lines: Vec<RenderedLine>,
    /// Headings in render order, with their anchor ids
    headings: Vec<HeadingRef>,
    /// Task checkboxes and the source lines they came from
    checkboxes: Vec<CheckboxRef>,
    /// Wrap width the preview was laid out for
    width: usize,
}

impl Preview {
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) const fn new(
        lines: Vec<RenderedLine>,
        headings: Vec<HeadingRef>,
        checkboxes: Vec<CheckboxRef>,
        width: usize,
    ) -> Self {
        Self {
            lines,
            headings,
            checkboxes,
            width,
        }
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub const fn width(&self) -> usize {
        self.width
    }

    pub fn lines(&self) -> &[RenderedLine] {
        &self.lines
    }

    pub fn headings(&self) -> &[HeadingRef] {
        &self.headings
    }

    pub fn checkboxes(&self) -> &[CheckboxRef] {
        &self.checkboxes
    }

    /// Lines from `offset` to `offset + count`.
    pub fn visible_lines(&self, offset: usize, count: usize) -> Vec<&RenderedLine> {
        self.lines.iter().skip(offset).take(count).collect()
    }

    pub fn line_at(&self, index: usize) -> Option<&RenderedLine> {
        self.lines.get(index)
    }

    /// Rendered line of the heading carrying anchor `id`.
    pub fn heading_line(&self, id: &str) -> Option<usize> {
        self.headings.iter().find(|h| h.id == id).map(|h| h.line)
    }

    /// Checkbox drawn at rendered `line`, hit-tested against `column`.
    ///
    /// A click anywhere on the glyph cell, or one cell either side, counts.
    pub fn checkbox_at(&self, line: usize, column: usize) -> Option<&CheckboxRef> {
        self.checkboxes.iter().find(|c| {
            c.line == line && column + 1 >= c.column && column <= c.column + 2
        })
    }
}

/// A single rendered line with styling information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedLine {
    content: String,
    line_type: LineType,
    spans: Vec<InlineSpan>,
}

impl RenderedLine {
    pub const fn new(content: String, line_type: LineType) -> Self {
        Self {
            content,
            line_type,
            spans: Vec::new(),
        }
    }

    pub const fn with_spans(content: String, line_type: LineType, spans: Vec<InlineSpan>) -> Self {
        Self {
            content,
            line_type,
            spans,
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub const fn line_type(&self) -> &LineType {
        &self.line_type
    }

    /// Inline spans, if the line carries any.
    pub fn spans(&self) -> Option<&[InlineSpan]> {
        if self.spans.is_empty() {
            None
        } else {
            Some(&self.spans)
        }
    }
}

/// Inline style flags for a text span.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InlineStyle {
    pub emphasis: bool,
    pub strong: bool,
    pub code: bool,
    pub strikethrough: bool,
    pub link: bool,
    /// Rendered task checkbox glyph
    pub checkbox: bool,
    pub fg: Option<InlineColor>,
}

/// RGB color for inline styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InlineColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// A styled inline span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineSpan {
    text: String,
    style: InlineStyle,
}

impl InlineSpan {
    pub const fn new(text: String, style: InlineStyle) -> Self {
        Self { text, style }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub const fn style(&self) -> InlineStyle {
        self.style
    }
}

/// Type of a rendered line, used for styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineType {
    Paragraph,
    /// Heading with level (1-6)
    Heading(u8),
    CodeBlock,
    BlockQuote,
    /// List item with nesting level
    ListItem(usize),
    Table,
    HorizontalRule,
    /// Raw HTML passed through as text
    Html,
    Empty,
}

/// A heading in the rendered preview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingRef {
    /// Heading level (1-6)
    pub level: u8,
    /// Plain heading text
    pub text: String,
    /// Rendered line index
    pub line: usize,
    /// Anchor id, unique within the preview
    pub id: String,
}

/// A task checkbox in the rendered preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckboxRef {
    /// Rendered line index
    pub line: usize,
    /// Display column of the glyph within the line
    pub column: usize,
    /// 1-based line in the markdown source
    pub source_line: usize,
    pub checked: bool,
}
