use super::folders;
use super::models::{MessageRange, MessageSummary};

/// Page arithmetic over backend message numbers. Number `total` is the newest
/// message, so the first page covers the top of the range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    pub total: u32,
    pub page_size: u32,
    pub page_index: u32,
}

impl Pager {
    pub fn new(total: u32, page_size: u32) -> Self {
        Pager {
            total,
            page_size: page_size.max(1),
            page_index: 0,
        }
    }

    /// Newest `page_size` messages. None for an empty folder.
    pub fn first_page(&mut self) -> Option<MessageRange> {
        self.page_index = 0;
        if self.total == 0 {
            return None;
        }
        let start = if self.total < self.page_size {
            1
        } else {
            self.total - self.page_size + 1
        };
        Some(MessageRange {
            start_msg_number: start,
            last_msg_number: self.total,
        })
    }

    /// Jump to page `index` (0-based). None past the oldest message.
    pub fn page(&mut self, index: u32) -> Option<MessageRange> {
        let offset = u64::from(index) * u64::from(self.page_size);
        if offset >= u64::from(self.total) {
            return None;
        }
        self.page_index = index;
        let last = self.total - offset as u32;
        let start = last.saturating_sub(self.page_size - 1).max(1);
        Some(MessageRange {
            start_msg_number: start,
            last_msg_number: last,
        })
    }

    /// Advance for infinite scroll, given how many rows are already loaded.
    pub fn next_page(&mut self, loaded: usize) -> Option<MessageRange> {
        if !self.has_more(loaded) {
            return None;
        }
        let next = self.page_index + 1;
        let offset = u64::from(next) * u64::from(self.page_size);
        if offset >= u64::from(self.total) {
            return None;
        }
        self.page_index = next;
        let last = self.total - offset as u32;
        let start = if last < self.page_size {
            1
        } else {
            last - self.page_size + 1
        };
        Some(MessageRange {
            start_msg_number: start,
            last_msg_number: last,
        })
    }

    pub fn has_more(&self, loaded: usize) -> bool {
        (loaded as u64) < u64::from(self.total)
    }

    pub fn page_count(&self) -> u32 {
        self.total.div_ceil(self.page_size)
    }
}

/// The address shown for a row: who the mail is from in the inbox, who it
/// went to elsewhere. Archive mixes both, so it looks at the sender.
pub fn counterpart<'a>(folder: &str, user: &str, msg: &'a MessageSummary) -> &'a str {
    let pick = if folders::is_inbox(folder) {
        &msg.from
    } else if folders::is_archive(folder) {
        if !msg.from.is_empty() && msg.from.to_lowercase().contains(&user.to_lowercase()) {
            &msg.to
        } else {
            &msg.from
        }
    } else {
        &msg.to
    };
    if pick.is_empty() {
        "Unknown"
    } else {
        pick
    }
}

pub fn avatar_letter(counterpart: &str) -> char {
    counterpart
        .chars()
        .next()
        .and_then(|c| c.to_uppercase().next())
        .unwrap_or('I')
}

/// Backend sizes are kilobytes, sometimes with a fraction or unit attached:
/// "12.7 kB" → "12 kB". Anything without a number is shown as-is.
pub fn format_size(raw: &str) -> String {
    let digits: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    match digits.parse::<f64>() {
        Ok(kb) => format!("{} kB", kb.floor() as u64),
        Err(_) => raw.trim().to_string(),
    }
}
