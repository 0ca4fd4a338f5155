//! PDF export: the preview re-rendered in the light theme at a fixed width
//! and laid out on US-letter pages.

use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference};

use super::ExportError;
use crate::document::{LineType, RenderedLine, render_preview};
use crate::state::Theme;

const PAGE_WIDTH: Mm = Mm(215.9);
const PAGE_HEIGHT: Mm = Mm(279.4);
const MARGIN_MM: f32 = 25.4;
const PT_TO_MM: f32 = 0.352_778;
const BODY_PT: f32 = 10.0;
const LINE_SPACING: f32 = 1.4;

/// Columns the preview is wrapped to; 6.5 in of 10 pt Helvetica.
const PDF_COLUMNS: usize = 90;

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    mono: IndirectFontRef,
}

pub fn render_pdf(markdown: &str, title: &str) -> Result<Vec<u8>, ExportError> {
    let preview = render_preview(markdown, PDF_COLUMNS, Theme::Light);
    let (doc, page, layer) = PdfDocument::new(title, PAGE_WIDTH, PAGE_HEIGHT, "content");
    let fonts = Fonts {
        regular: builtin(&doc, BuiltinFont::Helvetica)?,
        bold: builtin(&doc, BuiltinFont::HelveticaBold)?,
        mono: builtin(&doc, BuiltinFont::Courier)?,
    };

    let mut layer_ref = doc.get_page(page).get_layer(layer);
    let mut y = PAGE_HEIGHT.0 - MARGIN_MM;
    let mut pages = 1usize;
    for line in preview.lines() {
        let (size, font) = line_font(line, &fonts);
        let advance = size * LINE_SPACING * PT_TO_MM;
        if y - advance < MARGIN_MM {
            let (next_page, next_layer) = doc.add_page(PAGE_WIDTH, PAGE_HEIGHT, "content");
            layer_ref = doc.get_page(next_page).get_layer(next_layer);
            y = PAGE_HEIGHT.0 - MARGIN_MM;
            pages += 1;
        }
        y -= advance;
        let text = to_pdf_text(line.content());
        if !text.trim().is_empty() {
            layer_ref.use_text(text, size, Mm(MARGIN_MM), Mm(y), font);
        }
    }

    tracing::debug!(pages, lines = preview.line_count(), "laid out PDF");
    doc.save_to_bytes()
        .map_err(|err| ExportError::Pdf(err.to_string()))
}

fn builtin(doc: &PdfDocumentReference, font: BuiltinFont) -> Result<IndirectFontRef, ExportError> {
    doc.add_builtin_font(font)
        .map_err(|err| ExportError::Pdf(err.to_string()))
}

fn line_font<'a>(line: &RenderedLine, fonts: &'a Fonts) -> (f32, &'a IndirectFontRef) {
    match line.line_type() {
        LineType::Heading(level) => {
            let size = match level {
                1 => 18.0,
                2 => 15.0,
                3 => 13.0,
                4 => 12.0,
                5 => 11.0,
                _ => BODY_PT,
            };
            (size, &fonts.bold)
        }
        LineType::CodeBlock | LineType::Table => (BODY_PT - 1.0, &fonts.mono),
        _ => (BODY_PT, &fonts.regular),
    }
}

/// Builtin fonts only cover Latin-1; map the preview's glyphs to ASCII.
fn to_pdf_text(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    for ch in content.chars() {
        match ch {
            '☐' => out.push_str("[ ]"),
            '☑' => out.push_str("[x]"),
            '•' | '◦' | '▪' | '═' | '─' | '━' => out.push('-'),
            '│' | '┃' => out.push('|'),
            '┌' | '┐' | '└' | '┘' | '├' | '┤' | '┬' | '┴' | '┼' => out.push('+'),
            c if u32::from(c) < 0x100 => out.push(c),
            _ => out.push('?'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glyphs_are_mapped() {
        assert_eq!(to_pdf_text("☐ task • ☑"), "[ ] task - [x]");
        assert_eq!(to_pdf_text("│ quote"), "| quote");
        assert_eq!(to_pdf_text("café"), "café");
        assert_eq!(to_pdf_text("日"), "?");
    }

    #[test]
    fn test_render_produces_pdf_bytes() {
        let bytes = render_pdf("# Title\n\nSome text.\n\n- [ ] task", "document.pdf").unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_long_document_paginates() {
        let markdown = "line\n\n".repeat(200);
        let short = render_pdf("line", "d").unwrap();
        let long = render_pdf(&markdown, "d").unwrap();
        assert!(long.len() > short.len());
    }
}
