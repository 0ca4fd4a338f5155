use comrak::{Options, markdown_to_html};

use crate::document::apply_gfm_extensions;

/// Inline stylesheet for standalone HTML exports.
pub const HTML_STYLESHEET: &str = "\
body{font-family:system-ui,-apple-system,sans-serif;max-width:800px;margin:0 auto;padding:2rem;line-height:1.6;color:#333;}
img{max-width:100%;}
pre{background:#f4f4f4;padding:1rem;overflow-x:auto;}
blockquote{border-left:4px solid #ddd;margin:0;padding-left:1rem;color:#666;}
table{border-collapse:collapse;width:100%;}
th,td{border:1px solid #ddd;padding:0.5rem;}";

/// Render `markdown` as a standalone HTML page titled `title`.
pub fn render_html(markdown: &str, title: &str) -> String {
    let mut options = Options::default();
    apply_gfm_extensions(&mut options);
    let body = markdown_to_html(markdown, &options);
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n<style>\n{HTML_STYLESHEET}\n</style>\n</head>\n<body>\n{body}</body>\n</html>\n",
        escape_text(title)
    )
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
