use std::collections::HashSet;
use std::fmt::Write;

use indexmap::IndexMap;

use super::clip;
use crate::core::folders;
use crate::core::models::MessageSummary;
use crate::core::paging::{self, Pager};

/// Render the loaded rows of `folder`, newest first.
pub fn view(
    messages: &IndexMap<u32, MessageSummary>,
    folder: &str,
    user: &str,
    selected: &HashSet<u32>,
    pager: &Pager,
    search_query: Option<&str>,
) -> String {
    let mut out = String::new();
    let name = folders::display_name(folder);
    match search_query {
        Some(q) => {
            let _ = writeln!(out, "{name}: search \"{q}\" ({} found)", messages.len());
        }
        None => {
            let _ = writeln!(
                out,
                "{name}: {} of {} messages, page {} of {}",
                messages.len(),
                pager.total,
                pager.page_index + 1,
                pager.page_count().max(1)
            );
        }
    }

    if messages.is_empty() {
        out.push_str("No messages\n");
        return out;
    }

    for msg in messages.values() {
        let who = paging::counterpart(folder, user, msg);
        let mark = if selected.contains(&msg.number) { '*' } else { ' ' };
        let unread = if msg.is_unread() { '●' } else { ' ' };
        let clip_mark = if msg.has_attachment { " @" } else { "" };
        let _ = writeln!(
            out,
            "{mark}{unread} {:>6}  {} {:<28} {:<40} {:<20} {}{clip_mark}",
            msg.number,
            paging::avatar_letter(who),
            clip(who, 28),
            clip(&msg.subject, 40),
            clip(&msg.received_date, 20),
            paging::format_size(&msg.size),
        );
    }

    if search_query.is_none() && pager.has_more(messages.len()) {
        out.push_str("-- more messages: use --page or --all --\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(number: u32, from: &str, status: &str, attachment: bool) -> MessageSummary {
        MessageSummary {
            number,
            from: from.into(),
            to: "alice@example.com".into(),
            subject: format!("Subject {number}"),
            received_date: "2024-05-01 10:00".into(),
            has_attachment: attachment,
            size: "12.7 kB".into(),
            status: status.into(),
        }
    }

    #[test]
    fn rows_show_counterpart_markers_and_size() {
        let mut map = IndexMap::new();
        map.insert(9, row(9, "bob@example.com", "Unseen", true));
        map.insert(8, row(8, "", "", false));
        let selected: HashSet<u32> = [8].into_iter().collect();
        let out = view(&map, "INBOX", "alice", &selected, &Pager::new(30, 20), None);
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines[0], "Inbox: 2 of 30 messages, page 1 of 2");
        assert!(lines[1].starts_with(" ●      9  B bob@example.com"));
        assert!(lines[1].ends_with("12 kB @"));
        assert!(lines[2].starts_with("*       8  U Unknown"));
        assert_eq!(lines[3], "-- more messages: use --page or --all --");
    }

    #[test]
    fn sent_rows_show_recipient() {
        let mut map = IndexMap::new();
        map.insert(1, row(1, "alice@example.com", "", false));
        let out = view(&map, "Sent", "alice", &HashSet::new(), &Pager::new(1, 20), None);
        assert!(out.lines().nth(1).unwrap().contains("A alice@example.com"));
        assert!(!out.contains("-- more"));
    }

    #[test]
    fn search_header_and_empty_list() {
        let out = view(
            &IndexMap::new(),
            "Sent",
            "alice",
            &HashSet::new(),
            &Pager::new(0, 20),
            Some("tax"),
        );
        assert_eq!(out, "Sent: search \"tax\" (0 found)\nNo messages\n");
    }
}
