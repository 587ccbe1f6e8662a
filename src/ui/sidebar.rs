use std::fmt::Write;

use crate::core::folders;
use crate::core::models::Folder;

/// Render the folder tree, marking the current folder.
pub fn view(tree: &[Folder], current: &str, unread: Option<&str>) -> String {
    let mut out = String::from("Folders\n");

    if tree.is_empty() {
        out.push_str("  No folders\n");
    }
    for (depth, folder) in Folder::flatten(tree) {
        let marker = if folder.full_name.eq_ignore_ascii_case(current) {
            '>'
        } else {
            ' '
        };
        let indent = "  ".repeat(depth);
        let mut label = folders::display_name(&folder.name);
        if folder.unseen_count > 0 {
            let _ = write!(label, " ({}/{})", folder.unseen_count, folder.message_count);
        } else if folder.message_count > 0 {
            let _ = write!(label, " ({})", folder.message_count);
        }
        if !folder.subscribed {
            label.push_str(" [unsubscribed]");
        }
        let _ = writeln!(
            out,
            "{marker} {indent}{label:<32} {}",
            folders::icon_for(&folder.name)
        );
    }

    if let Some(unread) = unread {
        let _ = writeln!(out, "\nUnread: {unread}");
    }
    out
}
