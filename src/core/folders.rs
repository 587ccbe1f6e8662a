pub const INBOX: &str = "INBOX";
pub const SENT: &str = "Sent";
pub const ARCHIVE: &str = "Archive";

/// "INBOX" → "Inbox", "work" → "Work".
pub fn display_name(raw: &str) -> String {
    let mut chars = raw.chars();
    match chars.next() {
        Some(first) => {
            let mut out: String = first.to_uppercase().collect();
            out.push_str(&chars.as_str().to_lowercase());
            out
        }
        None => String::new(),
    }
}

/// Map a folder name as typed or displayed to the name the backend expects.
pub fn request_name(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return INBOX.to_string();
    }
    match trimmed.to_ascii_uppercase().as_str() {
        "INBOX" => INBOX.to_string(),
        "SENT" => SENT.to_string(),
        "DRAFT" => "Draft".to_string(),
        "ARCHIVE" => ARCHIVE.to_string(),
        "OUTBOX" => "Outbox".to_string(),
        "SPAM" => "Spam".to_string(),
        _ => trimmed.to_string(),
    }
}

pub fn icon_for(name: &str) -> &'static str {
    match name.to_lowercase().as_str() {
        "inbox" => "mail-outline",
        "sent" => "send-outline",
        "drafts" => "document-text-outline",
        "outbox" => "arrow-up-outline",
        "spam" => "alert-circle-outline",
        "archive" => "archive-outline",
        "trash" => "trash-outline",
        _ => "folder-outline",
    }
}

pub fn is_sent(name: &str) -> bool {
    name.eq_ignore_ascii_case(SENT)
}

pub fn is_inbox(name: &str) -> bool {
    name.eq_ignore_ascii_case(INBOX)
}

pub fn is_archive(name: &str) -> bool {
    name.eq_ignore_ascii_case(ARCHIVE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_are_capitalized() {
        assert_eq!(display_name("INBOX"), "Inbox");
        assert_eq!(display_name("sent"), "Sent");
        assert_eq!(display_name("ärger"), "Ärger");
        assert_eq!(display_name(""), "");
    }

    #[test]
    fn request_names_follow_backend_casing() {
        assert_eq!(request_name("inbox"), "INBOX");
        assert_eq!(request_name("SENT"), "Sent");
        assert_eq!(request_name("Draft"), "Draft");
        assert_eq!(request_name("archive"), "Archive");
        assert_eq!(request_name("OUTBOX"), "Outbox");
        assert_eq!(request_name("spam"), "Spam");
        assert_eq!(request_name("Projects/2024"), "Projects/2024");
        assert_eq!(request_name("  "), "INBOX");
    }

    #[test]
    fn icons_fall_back_to_folder() {
        assert_eq!(icon_for("INBOX"), "mail-outline");
        assert_eq!(icon_for("Trash"), "trash-outline");
        assert_eq!(icon_for("Receipts"), "folder-outline");
    }

    #[test]
    fn special_folder_checks_ignore_case() {
        assert!(is_sent("SENT"));
        assert!(is_sent("Sent"));
        assert!(!is_sent("Sent Items"));
        assert!(is_inbox("inbox"));
        assert!(is_archive("ARCHIVE"));
    }
}
