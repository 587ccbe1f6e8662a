use super::{AppModel, Message, Task};

impl AppModel {
    pub(super) fn handle_search(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::SearchExecute(query) => {
                let query = query.trim().to_string();
                if query.is_empty() {
                    return Task::none();
                }
                self.search_active = true;
                self.search_query = query.clone();
                self.status_message = "Searching...".into();
                let api = self.api.clone();
                let folder = self.current_folder.clone();
                return Task::future(async move {
                    Message::SearchResultsLoaded(
                        api.search_messages(&folder, &query)
                            .await
                            .map_err(|e| e.to_string()),
                    )
                });
            }
            Message::SearchResultsLoaded(Ok(results)) => {
                if !self.search_active {
                    return Task::none();
                }
                let count = results.len();
                self.messages.clear();
                self.selected.clear();
                for row in results {
                    self.messages.insert(row.number, row);
                }
                self.messages.sort_by(|a, _, b, _| b.cmp(a));
                self.load_all = false;
                if count > 0 {
                    self.status_message =
                        format!("Search: {} results for \"{}\"", count, self.search_query);
                } else {
                    self.status_message = format!("Search: no results for \"{}\"", self.search_query);
                }
            }
            Message::SearchResultsLoaded(Err(e)) => {
                self.search_active = false;
                self.fail("Search failed", e);
            }
            Message::SearchClear => {
                if self.search_active {
                    self.search_active = false;
                    self.search_query.clear();
                    // Restore the folder view
                    return self.dispatch(Message::Refresh);
                }
            }

            _ => {}
        }
        Task::none()
    }
}
