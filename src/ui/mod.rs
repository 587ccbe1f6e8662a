//! Plain-text renderings of the application model for the terminal.

pub mod compose_dialog;
pub mod message_list;
pub mod message_view;
pub mod preview;
pub mod sidebar;

/// Cut `text` to at most `width` characters, marking the cut with "...".
pub(crate) fn clip(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let keep = width.saturating_sub(3);
    let mut out: String = text.chars().take(keep).collect();
    out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clip_counts_characters() {
        assert_eq!(clip("short", 10), "short");
        assert_eq!(clip("exactly10!", 10), "exactly10!");
        assert_eq!(clip("a longer subject line", 10), "a longe...");
        assert_eq!(clip("äöüäöüäöüäöü", 6), "äöü...");
    }
}
