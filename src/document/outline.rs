//! Heading outline and anchor ids.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

static ATX_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^(#{1,6})\s+(.+)$").expect("Invalid heading regex"));

/// One entry in the outline pane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineEntry {
    /// Heading level (1-6)
    pub level: u8,
    /// Heading text as written in the source
    pub text: String,
    /// Anchor id shared with the rendered preview
    pub id: String,
    /// 1-based source line
    pub source_line: usize,
}

/// Scan raw markdown for ATX headings.
///
/// This is a line scan, not a parse: `#` lines inside fenced code count
/// too.
pub fn extract_outline(source: &str) -> Vec<OutlineEntry> {
    let mut slugger = Slugger::default();
    ATX_HEADING
        .captures_iter(source)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let level = u8::try_from(caps.get(1)?.as_str().len()).ok()?;
            let text = caps.get(2)?.as_str().trim_end_matches('\r').to_string();
            let source_line = source[..whole.start()].matches('\n').count() + 1;
            Some(OutlineEntry {
                level,
                id: slugger.slug(&text),
                text,
                source_line,
            })
        })
        .collect()
}

/// GitHub-style anchor generator with duplicate tracking.
///
/// Lowercases, drops everything but letters, digits, `-`, `_` and spaces,
/// then turns spaces into hyphens. Repeats get `-1`, `-2`, ...
#[derive(Debug, Clone, Default)]
pub struct Slugger {
    occurrences: HashMap<String, usize>,
}

impl Slugger {
    pub fn slug(&mut self, value: &str) -> String {
        let base = slugify(value);
        let mut candidate = base.clone();
        while self.occurrences.contains_key(&candidate) {
            let count = self.occurrences.entry(base.clone()).or_insert(0);
            *count += 1;
            candidate = format!("{base}-{count}");
        }
        self.occurrences.insert(candidate.clone(), 0);
        candidate
    }
}

/// Stateless slug of a single heading.
pub fn slugify(value: &str) -> String {
    value
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | ' '))
        .map(|c| if c == ' ' { '-' } else { c })
        .collect()
}
