//! Syntax highlighting for fenced code in the preview.
//!
//! Uses syntect with Sublime Text syntax definitions. The color theme
//! follows the editor theme rather than the terminal background.

use std::sync::OnceLock;

use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme as SyntectTheme, ThemeSet};
use syntect::parsing::SyntaxSet;

use crate::document::{InlineColor, InlineSpan, InlineStyle};
use crate::state::Theme;

/// Highlight `code` line by line.
///
/// Unknown or missing languages fall back to plain code spans with no
/// foreground color.
pub fn highlight_code(language: Option<&str>, code: &str, theme: Theme) -> Vec<Vec<InlineSpan>> {
    let syntax_set = syntax_set();
    let syntax = language
        .and_then(|lang| syntax_set.find_syntax_by_token(lang))
        .or_else(|| language.and_then(|lang| syntax_set.find_syntax_by_name(lang)));

    let plain = InlineStyle {
        code: true,
        ..InlineStyle::default()
    };
    let Some(syntax) = syntax else {
        return code
            .lines()
            .map(|line| vec![InlineSpan::new(line.to_string(), plain)])
            .collect();
    };

    let mut highlighter = HighlightLines::new(syntax, syntect_theme(theme));
    code.lines()
        .map(|line| {
            let ranges = match highlighter.highlight_line(line, syntax_set) {
                Ok(ranges) => ranges,
                Err(err) => {
                    tracing::debug!(%err, "highlight failed, using plain text");
                    return vec![InlineSpan::new(line.to_string(), plain)];
                }
            };
            ranges
                .into_iter()
                .map(|(style, text)| {
                    let fg = InlineColor {
                        r: style.foreground.r,
                        g: style.foreground.g,
                        b: style.foreground.b,
                    };
                    InlineSpan::new(
                        text.to_string(),
                        InlineStyle {
                            fg: Some(adjust_fg_for_theme(fg, theme)),
                            ..plain
                        },
                    )
                })
                .collect()
        })
        .collect()
}

fn syntax_set() -> &'static SyntaxSet {
    static SYNTAX_SET: OnceLock<SyntaxSet> = OnceLock::new();
    SYNTAX_SET.get_or_init(SyntaxSet::load_defaults_newlines)
}

fn theme_set() -> &'static ThemeSet {
    static THEME_SET: OnceLock<ThemeSet> = OnceLock::new();
    THEME_SET.get_or_init(ThemeSet::load_defaults)
}

fn syntect_theme(theme: Theme) -> &'static SyntectTheme {
    static DARK: OnceLock<SyntectTheme> = OnceLock::new();
    static LIGHT: OnceLock<SyntectTheme> = OnceLock::new();
    let (cell, preferred) = match theme {
        Theme::Dark => (
            &DARK,
            ["Monokai Extended", "base16-ocean.dark", "Solarized (dark)"].as_slice(),
        ),
        Theme::Light => (
            &LIGHT,
            ["InspiredGitHub", "Solarized (light)", "base16-ocean.light"].as_slice(),
        ),
    };
    cell.get_or_init(|| {
        let themes = &theme_set().themes;
        preferred
            .iter()
            .find_map(|name| themes.get(*name))
            .or_else(|| themes.values().next())
            .cloned()
            .unwrap_or_default()
    })
}

/// Darken bright foregrounds so they stay readable on a light page.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::suboptimal_flops
)]
fn adjust_fg_for_theme(color: InlineColor, theme: Theme) -> InlineColor {
    match theme {
        Theme::Dark => color,
        Theme::Light => {
            let luma = 0.2126 * f32::from(color.r)
                + 0.7152 * f32::from(color.g)
                + 0.0722 * f32::from(color.b);
            if luma < 155.0 {
                return color;
            }
            let scale = |c: u8| (f32::from(c) * 0.42).round() as u8;
            InlineColor {
                r: scale(color.r),
                g: scale(color.g),
                b: scale(color.b),
            }
        }
    }
}
