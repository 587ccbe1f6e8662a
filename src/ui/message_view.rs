use std::fmt::Write;

use crate::core::mime;
use crate::core::models::MessageContent;
use crate::core::preview::{self, FileKind, ViewerStrategy};

/// Render the reading pane: headers, the body as text, then attachments.
pub fn view(message: Option<&MessageContent>) -> String {
    let Some(msg) = message else {
        return "Select a message to read\n".to_string();
    };

    let mut out = String::new();
    let _ = writeln!(out, "From:    {}", msg.from);
    let _ = writeln!(out, "To:      {}", msg.to);
    if !msg.cc.is_empty() {
        let _ = writeln!(out, "Cc:      {}", msg.cc);
    }
    if !msg.bcc.is_empty() {
        let _ = writeln!(out, "Bcc:     {}", msg.bcc);
    }
    let _ = writeln!(out, "Date:    {}", msg.received_date);
    let _ = writeln!(out, "Subject: {}", msg.subject);
    out.push('\n');
    out.push_str(&mime::render_body(&msg.body));
    out.push('\n');

    if !msg.attachments.is_empty() {
        let _ = writeln!(out, "\nAttachments ({})", msg.attachments.len());
        for att in &msg.attachments {
            let name = &att.file_name;
            let kind = FileKind::classify(name);
            let _ = writeln!(out, "  [{}] {name} ({})", preview::icon(name), kind.label());
            if ViewerStrategy::for_kind(kind) == ViewerStrategy::Download {
                let _ = writeln!(out, "      {}", preview::description(name));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::FileItem;

    fn message(files: &[&str]) -> MessageContent {
        MessageContent {
            number: 4,
            folder: "INBOX".into(),
            to: "alice@example.com".into(),
            from: "bob@example.com".into(),
            cc: "carol@example.com".into(),
            bcc: String::new(),
            subject: "Quarterly".into(),
            body: "<div>Hi&nbsp;Alice,<br/>numbers attached.</div>".into(),
            received_date: "2024-05-01".into(),
            attachments: files
                .iter()
                .map(|f| FileItem {
                    file_name: f.to_string(),
                    ..FileItem::default()
                })
                .collect(),
        }
    }

    #[test]
    fn nothing_open() {
        assert_eq!(view(None), "Select a message to read\n");
    }

    #[test]
    fn headers_and_text_body() {
        let out = view(Some(&message(&[])));
        assert!(out.starts_with("From:    bob@example.com\nTo:      alice@example.com\nCc:      carol@example.com\n"));
        assert!(!out.contains("Bcc:"));
        assert!(out.ends_with("Subject: Quarterly\n\nHi Alice,\nnumbers attached.\n"));
    }

    #[test]
    fn attachments_list_icon_and_hint() {
        let out = view(Some(&message(&["q3.xlsx", "data.zip"])));
        assert!(out.contains("\nAttachments (2)\n"));
        assert!(out.contains("  [grid-outline] q3.xlsx (document)\n"));
        assert!(out.contains(
            "  [archive-outline] data.zip (file)\n      Compressed archive file. Extract to view contents.\n"
        ));
    }
}
