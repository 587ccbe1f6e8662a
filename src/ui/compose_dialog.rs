use std::fmt::Write;

use crate::app::Draft;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposeMode {
    New,
    Reply,
    Forward,
}

/// Render a draft for review before sending.
pub fn view(draft: &Draft, error: Option<&str>, is_sending: bool, upload_percent: u8) -> String {
    let title = match draft.mode {
        ComposeMode::New => "New Message",
        ComposeMode::Reply => "Reply",
        ComposeMode::Forward => "Forward",
    };

    let mut out = format!("{title}\n");
    let _ = writeln!(out, "From:    {}", draft.from);
    let _ = writeln!(out, "To:      {}", draft.to);
    for (label, value) in [("Cc:     ", &draft.cc), ("Bcc:    ", &draft.bcc)] {
        if !value.is_empty() {
            let _ = writeln!(out, "{label} {value}");
        }
    }
    let _ = writeln!(out, "Subject: {}", draft.subject);
    out.push('\n');
    out.push_str(&draft.body);
    if let Some(original) = &draft.original {
        out.push_str("\n\n");
        out.push_str(original);
    }
    out.push('\n');

    if !draft.attachments.is_empty() {
        out.push_str("\nAttachments\n");
        for (i, att) in draft.attachments.iter().enumerate() {
            let _ = writeln!(
                out,
                "  {}. {} ({}, {} bytes)",
                i + 1,
                att.file_name,
                att.content_type,
                att.size
            );
        }
    }
    if upload_percent > 0 && upload_percent < 100 {
        let _ = writeln!(out, "Uploading... {upload_percent}%");
    }
    if is_sending {
        out.push_str("Sending...\n");
    }
    if let Some(err) = error {
        let _ = writeln!(out, "Error: {err}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::AttachmentRef;

    #[test]
    fn reply_shows_quote_and_attachments() {
        let mut draft = Draft::new("alice@example.com");
        draft.mode = ComposeMode::Reply;
        draft.to = "bob@example.com".into();
        draft.cc = "carol@example.com".into();
        draft.subject = "Re: Budget".into();
        draft.body = "Looks good".into();
        draft.original = Some(" -----Replied Message-----\nFrom: bob".into());
        draft.attachments.push(AttachmentRef {
            file_name: "plan.pdf".into(),
            content_type: "application/pdf".into(),
            size: 1200,
        });

        let out = view(&draft, Some("Recipient is required"), false, 40);
        assert_eq!(
            out,
            "Reply\n\
             From:    alice@example.com\n\
             To:      bob@example.com\n\
             Cc:      carol@example.com\n\
             Subject: Re: Budget\n\
             \n\
             Looks good\n\
             \n \
             -----Replied Message-----\n\
             From: bob\n\
             \n\
             Attachments\n  \
             1. plan.pdf (application/pdf, 1200 bytes)\n\
             Uploading... 40%\n\
             Error: Recipient is required\n"
        );
    }
}
