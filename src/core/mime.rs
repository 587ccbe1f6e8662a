use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

static BR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>").unwrap());
static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());
static NON_TEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<(head|style|script)\b[^>]*>.*?</(head|style|script)\s*>").unwrap()
});

const WRAP_WIDTH: usize = 80;

/// Flatten HTML for the quoted block of a reply.
///
/// Line breaks become newlines, tags are dropped and the common entities are
/// decoded. `&amp;` goes last so `&amp;lt;` stays literal.
pub fn html_to_text(html: &str) -> String {
    let text = BR.replace_all(html, "\n");
    TAG
        .replace_all(&text, "")
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&amp;", "&")
}

/// Plain text typed by the user, as the HTML body the backend sends.
pub fn plain_to_html(text: &str) -> String {
    text.replace('\n', "<br>")
}

/// Render a body for display, trimming the blank lines HTML layout leaves behind.
pub fn render_body(html: &str) -> String {
    let visible = NON_TEXT.replace_all(html, "");
    let text = html2text::from_read(visible.as_bytes(), WRAP_WIDTH)
        .unwrap_or_default()
        .replace('\u{a0}', " ");
    let trimmed = text.trim();
    if trimmed.is_empty() {
        "[No displayable content]".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Open a local file with the system's default application.
pub fn open_path(path: &Path) -> std::io::Result<()> {
    log::debug!("Opening {} externally", path.display());
    open::that(path)
}
