//! Colors for the light and dark themes.
//!
//! The whole screen is painted from a [`Palette`], so switching theme
//! changes the chrome, the editor and the preview together.

use ratatui::style::{Color, Modifier, Style};

use crate::document::{InlineColor, InlineStyle, LineType};
use crate::state::Theme;

/// Resolved colors for one theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub bg: Color,
    pub fg: Color,
    pub dim: Color,
    pub accent: Color,
    pub chrome_bg: Color,
    pub chrome_fg: Color,
    pub active_line_bg: Color,
    pub divider: Color,
    pub selection_bg: Color,
    pub headings: [Color; 6],
    pub code: Color,
    pub inline_code: Color,
    pub quote: Color,
    pub link: Color,
    pub list_marker: Color,
    pub checkbox: Color,
    pub rule: Color,
}

impl Palette {
    pub const fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self::dark(),
            Theme::Light => Self::light(),
        }
    }

    pub const fn dark() -> Self {
        Self {
            bg: Color::Indexed(234),
            fg: Color::Indexed(252),
            dim: Color::Indexed(243),
            accent: Color::Indexed(141),
            chrome_bg: Color::Indexed(236),
            chrome_fg: Color::Indexed(252),
            active_line_bg: Color::Indexed(236),
            divider: Color::Indexed(239),
            selection_bg: Color::Indexed(60),
            headings: [
                Color::Cyan,
                Color::Green,
                Color::Yellow,
                Color::Blue,
                Color::Magenta,
                Color::Cyan,
            ],
            code: Color::Indexed(245),
            inline_code: Color::Red,
            quote: Color::Indexed(110),
            link: Color::LightBlue,
            list_marker: Color::Yellow,
            checkbox: Color::Indexed(141),
            rule: Color::Indexed(240),
        }
    }

    pub const fn light() -> Self {
        Self {
            bg: Color::Indexed(255),
            fg: Color::Indexed(235),
            dim: Color::Indexed(245),
            accent: Color::Indexed(61),
            chrome_bg: Color::Indexed(253),
            chrome_fg: Color::Indexed(235),
            active_line_bg: Color::Indexed(254),
            divider: Color::Indexed(250),
            selection_bg: Color::Indexed(189),
            headings: [
                Color::Indexed(31),
                Color::Indexed(28),
                Color::Indexed(136),
                Color::Indexed(25),
                Color::Indexed(90),
                Color::Indexed(31),
            ],
            code: Color::Indexed(240),
            inline_code: Color::Indexed(124),
            quote: Color::Indexed(25),
            link: Color::Blue,
            list_marker: Color::Indexed(136),
            checkbox: Color::Indexed(61),
            rule: Color::Indexed(248),
        }
    }

    /// Plain text on the pane background.
    pub fn base(&self) -> Style {
        Style::default().bg(self.bg).fg(self.fg)
    }

    pub fn chrome(&self) -> Style {
        Style::default().bg(self.chrome_bg).fg(self.chrome_fg)
    }
}

/// Style for a whole preview line of the given type.
pub fn style_for_line_type(line_type: &LineType, palette: &Palette) -> Style {
    let base = palette.base();
    match line_type {
        LineType::Heading(level) => {
            let idx = usize::from(level.saturating_sub(1)).min(5);
            let style = base.fg(palette.headings[idx]).add_modifier(Modifier::BOLD);
            if *level == 1 {
                style.add_modifier(Modifier::UNDERLINED)
            } else {
                style
            }
        }
        LineType::CodeBlock => base.fg(palette.code),
        LineType::BlockQuote => base.fg(palette.quote).add_modifier(Modifier::ITALIC),
        LineType::HorizontalRule => base.fg(palette.rule),
        LineType::Html => base.fg(palette.dim),
        LineType::ListItem(_) | LineType::Table | LineType::Paragraph | LineType::Empty => base,
    }
}

/// Merge an inline span's flags over its line style.
pub fn style_for_inline(base: Style, inline: InlineStyle, palette: &Palette) -> Style {
    let mut style = base;

    if let Some(fg) = inline.fg {
        style = style
            .fg(fg_color_for_terminal(fg))
            .remove_modifier(Modifier::DIM);
    }
    if inline.emphasis {
        style = style.add_modifier(Modifier::ITALIC);
    }
    if inline.strong {
        style = style.add_modifier(Modifier::BOLD);
    }
    if inline.strikethrough {
        style = style.add_modifier(Modifier::CROSSED_OUT);
    }
    if inline.link {
        style = style.add_modifier(Modifier::UNDERLINED);
        if inline.fg.is_none() {
            style = style.fg(palette.link);
        }
    }
    if inline.code && inline.fg.is_none() {
        style = style.fg(palette.inline_code);
    }
    if inline.checkbox {
        style = style.fg(palette.checkbox).add_modifier(Modifier::BOLD);
    }

    style
}

fn fg_color_for_terminal(fg: InlineColor) -> Color {
    if supports_truecolor() {
        Color::Rgb(fg.r, fg.g, fg.b)
    } else {
        Color::Indexed(rgb_to_xterm_256(fg.r, fg.g, fg.b))
    }
}

fn supports_truecolor() -> bool {
    if let Ok(force) = std::env::var("ZENITH_TRUECOLOR") {
        let value = force.to_ascii_lowercase();
        return matches!(value.as_str(), "1" | "true" | "yes" | "on");
    }
    supports_truecolor_from_env(
        std::env::var("COLORTERM").ok().as_deref(),
        std::env::var("TERM").ok().as_deref(),
    )
}

fn supports_truecolor_from_env(colorterm: Option<&str>, term: Option<&str>) -> bool {
    let has = |value: Option<&str>, needles: &[&str]| {
        value.is_some_and(|v| {
            let lower = v.to_ascii_lowercase();
            needles.iter().any(|needle| lower.contains(needle))
        })
    };
    has(colorterm, &["truecolor", "24bit"]) || has(term, &["direct", "truecolor"])
}

fn rgb_to_xterm_256(r: u8, g: u8, b: u8) -> u8 {
    // each channel lands in 0..=5
    #[allow(clippy::cast_possible_truncation)]
    let to_cube = |v: u8| ((u16::from(v) * 5) / 255) as u8;
    16 + (36 * to_cube(r)) + (6 * to_cube(g)) + to_cube(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_styles_are_bold() {
        let palette = Palette::dark();
        for level in 1..=6 {
            let style = style_for_line_type(&LineType::Heading(level), &palette);
            assert!(style.add_modifier.contains(Modifier::BOLD));
        }
    }

    #[test]
    fn test_only_h1_is_underlined() {
        let palette = Palette::light();
        let h1 = style_for_line_type(&LineType::Heading(1), &palette);
        let h2 = style_for_line_type(&LineType::Heading(2), &palette);
        assert!(h1.add_modifier.contains(Modifier::UNDERLINED));
        assert!(!h2.add_modifier.contains(Modifier::UNDERLINED));
    }

    #[test]
    fn test_themes_differ_in_background() {
        assert_ne!(
            Palette::for_theme(Theme::Light).bg,
            Palette::for_theme(Theme::Dark).bg
        );
    }

    #[test]
    fn test_inline_color_removes_dim_modifier() {
        let base = Style::default().add_modifier(Modifier::DIM);
        let inline = InlineStyle {
            fg: Some(InlineColor { r: 255, g: 0, b: 0 }),
            ..InlineStyle::default()
        };
        let styled = style_for_inline(base, inline, &Palette::dark());
        assert!(!styled.add_modifier.contains(Modifier::DIM));
    }

    #[test]
    fn test_checkbox_glyph_uses_accent() {
        let palette = Palette::dark();
        let inline = InlineStyle {
            checkbox: true,
            ..InlineStyle::default()
        };
        let styled = style_for_inline(palette.base(), inline, &palette);
        assert_eq!(styled.fg, Some(palette.checkbox));
    }

    #[test]
    fn test_truecolor_detection() {
        assert!(!supports_truecolor_from_env(None, Some("xterm-256color")));
        assert!(supports_truecolor_from_env(Some("truecolor"), None));
        assert!(supports_truecolor_from_env(None, Some("xterm-direct")));
    }

    #[test]
    fn test_fallback_indexed_color() {
        assert_eq!(rgb_to_xterm_256(255, 0, 0), 196);
    }
}
