use crate::core::folders;
use crate::core::models::MessageRange;
use crate::core::paging::Pager;

use super::{AppModel, Message, Task};

impl AppModel {
    pub(super) fn handle_sync(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::LoadFolders => {
                self.status_message = "Loading folders...".into();
                let api = self.api.clone();
                return Task::future(async move {
                    Message::FoldersLoaded(api.folders().await.map_err(|e| e.to_string()))
                });
            }
            Message::FoldersLoaded(Ok(folders)) => {
                self.status_message = format!("{} folders", folders.len());
                self.folders = folders;
            }
            Message::FoldersLoaded(Err(e)) => {
                self.fail("Failed to load folders", e);
            }

            Message::SelectFolder(name) => {
                self.current_folder = folders::request_name(&name);
                self.messages.clear();
                self.selected.clear();
                self.open_message = None;
                self.search_active = false;
                self.search_query.clear();
                self.load_all = false;
                return self.dispatch(Message::Refresh);
            }

            // Count first: message numbers run 1..=total, newest last.
            Message::Refresh => {
                self.search_active = false;
                self.is_loading = true;
                self.status_message = format!("Loading {}...", folders::display_name(&self.current_folder));
                let api = self.api.clone();
                let folder = self.current_folder.clone();
                return Task::future(async move {
                    Message::CountLoaded(
                        api.message_count(&folder).await.map_err(|e| e.to_string()),
                    )
                });
            }
            Message::CountLoaded(Ok(total)) => {
                self.pager = Pager::new(total, self.config.page_size);
                self.messages.clear();
                self.selected.clear();
                match self.pager.first_page() {
                    Some(range) => return self.fetch_range(range),
                    None => {
                        self.is_loading = false;
                        self.load_all = false;
                        self.status_message =
                            format!("{} is empty", folders::display_name(&self.current_folder));
                    }
                }
            }
            Message::CountLoaded(Err(e)) => {
                self.is_loading = false;
                self.load_all = false;
                self.fail("Failed to count messages", e);
            }

            Message::MessagesLoaded(Ok(rows)) => {
                self.is_loading = false;
                if self.search_active {
                    log::debug!("Dropping list page that arrived during a search");
                    return Task::none();
                }
                let got = rows.len();
                for row in rows {
                    self.messages.insert(row.number, row);
                }
                self.messages.sort_by(|a, _, b, _| b.cmp(a));
                self.status_message = format!(
                    "{} of {} messages",
                    self.messages.len(),
                    self.pager.total
                );
                if self.load_all && got > 0 && self.pager.has_more(self.messages.len()) {
                    return self.dispatch(Message::LoadMoreMessages);
                }
                self.load_all = false;
            }
            Message::MessagesLoaded(Err(e)) => {
                self.is_loading = false;
                self.load_all = false;
                self.fail("Failed to load messages", e);
            }

            Message::LoadMoreMessages => {
                if self.is_loading || self.search_active {
                    return Task::none();
                }
                match self.pager.next_page(self.messages.len()) {
                    Some(range) => return self.fetch_range(range),
                    None => {
                        self.load_all = false;
                        log::debug!("All {} messages loaded", self.pager.total);
                    }
                }
            }

            Message::LoadAllMessages => {
                self.load_all = true;
                if self.pager.total == 0 && self.messages.is_empty() {
                    return self.dispatch(Message::Refresh);
                }
                return self.dispatch(Message::LoadMoreMessages);
            }

            Message::GoToPage(index) => {
                if self.search_active {
                    return Task::none();
                }
                match self.pager.page(index) {
                    Some(range) => {
                        self.messages.clear();
                        self.selected.clear();
                        return self.fetch_range(range);
                    }
                    None => {
                        let pages = self.pager.page_count();
                        self.fail(
                            "No such page",
                            format!("{} has {pages} page(s)", folders::display_name(&self.current_folder)),
                        );
                    }
                }
            }

            _ => {}
        }
        Task::none()
    }

    fn fetch_range(&mut self, range: MessageRange) -> Task<Message> {
        self.is_loading = true;
        log::debug!(
            "Fetching {} messages {}..={}",
            self.current_folder,
            range.start_msg_number,
            range.last_msg_number
        );
        let api = self.api.clone();
        let folder = self.current_folder.clone();
        Task::future(async move {
            Message::MessagesLoaded(
                api.list_messages(&folder, range)
                    .await
                    .map_err(|e| e.to_string()),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{self, row};
    use super::*;
    use crate::core::testing::{serve, Canned};

    #[tokio::test]
    async fn refresh_counts_then_loads_newest_page() {
        let dir = tempfile::tempdir().unwrap();
        let (url, reqs) = serve(vec![
            ("getMessageCount", Canned::text("45")),
            (
                "listMessages",
                Canned::json(
                    r#"{"messageList":[{"messageNumber":"44"},{"messageNumber":"45"},{"messageNumber":"30"}]}"#,
                ),
            ),
        ])
        .await;
        let mut app = test_support::model(url, dir.path());
        app.run(Message::SelectFolder("sent".into())).await;

        assert_eq!(app.current_folder, "Sent");
        assert_eq!(app.pager.total, 45);
        let numbers: Vec<u32> = app.messages.keys().copied().collect();
        assert_eq!(numbers, vec![45, 44, 30]);
        assert!(app.last_error().is_none());

        let reqs = reqs.await.unwrap();
        let list: serde_json::Value = serde_json::from_str(reqs[1].body()).unwrap();
        assert_eq!(list["startMsgNumber"], 26);
        assert_eq!(list["lastMsgNumber"], 45);
        assert_eq!(list["folder"], "Sent");
    }

    #[tokio::test]
    async fn empty_folder_skips_list_request() {
        let dir = tempfile::tempdir().unwrap();
        let (url, reqs) = serve(vec![("getMessageCount", Canned::text("0"))]).await;
        let mut app = test_support::model(url, dir.path());
        app.run(Message::Refresh).await;
        assert!(app.messages.is_empty());
        assert_eq!(app.status_message(), "Inbox is empty");
        assert_eq!(reqs.await.unwrap().len(), 1);
    }

    #[test]
    fn pages_merge_without_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_support::offline(dir.path());
        app.pager = Pager::new(3, 20);
        app.update(Message::MessagesLoaded(Ok(vec![row(2), row(3)])));
        app.update(Message::MessagesLoaded(Ok(vec![row(1), row(2)])));
        let numbers: Vec<u32> = app.messages.keys().copied().collect();
        assert_eq!(numbers, vec![3, 2, 1]);
        assert_eq!(app.status_message(), "3 of 3 messages");
    }

    #[test]
    fn load_more_is_noop_when_everything_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_support::offline(dir.path());
        app.pager = Pager::new(2, 20);
        app.update(Message::MessagesLoaded(Ok(vec![row(1), row(2)])));
        assert!(app.update(Message::LoadMoreMessages).is_none());
    }

    #[test]
    fn load_more_waits_for_inflight_page() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_support::offline(dir.path());
        app.pager = Pager::new(100, 20);
        app.messages.insert(100, row(100));
        assert!(!app.update(Message::LoadMoreMessages).is_none());
        assert!(app.is_loading);
        assert!(app.update(Message::LoadMoreMessages).is_none());
    }

    #[tokio::test]
    async fn load_all_walks_every_page() {
        let dir = tempfile::tempdir().unwrap();
        let (url, reqs) = serve(vec![
            ("getMessageCount", Canned::text("3")),
            (
                "listMessages",
                Canned::json(r#"{"messageList":[{"messageNumber":3},{"messageNumber":2}]}"#),
            ),
            ("listMessages", Canned::json(r#"{"messageList":[{"messageNumber":1}]}"#)),
        ])
        .await;
        let mut app = test_support::model(url, dir.path());
        app.config.page_size = 2;
        app.run(Message::LoadAllMessages).await;
        assert_eq!(app.messages.len(), 3);
        assert!(!app.load_all);

        let reqs = reqs.await.unwrap();
        let second: serde_json::Value = serde_json::from_str(reqs[2].body()).unwrap();
        assert_eq!(second["startMsgNumber"], 1);
        assert_eq!(second["lastMsgNumber"], 1);
    }

    #[test]
    fn out_of_range_page_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_support::offline(dir.path());
        app.pager = Pager::new(30, 20);
        assert!(app.update(Message::GoToPage(5)).is_none());
        assert_eq!(app.last_error(), Some("No such page: Inbox has 2 page(s)"));
    }

    #[test]
    fn count_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_support::offline(dir.path());
        app.update(Message::CountLoaded(Err("boom".into())));
        assert_eq!(app.last_error(), Some("Failed to count messages: boom"));
        assert!(!app.is_loading);
    }
}
