use super::{AppModel, Message, Task};

impl AppModel {
    pub(super) fn handle_navigation(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::ToggleSelect(number) => {
                if !self.selected.remove(&number) {
                    self.selected.insert(number);
                }
            }

            // Numbers need not be loaded: the backend addresses messages by
            // number, so acting on rows outside the current page is fine.
            Message::SetSelection(numbers) => {
                self.selected.clear();
                for n in numbers {
                    if !self.messages.contains_key(&n) {
                        log::debug!("Selecting message {n} which is not loaded");
                    }
                    self.selected.insert(n);
                }
            }

            Message::SelectAll => {
                self.selected = self.messages.keys().copied().collect();
            }

            Message::ClearSelection => {
                self.selected.clear();
            }

            _ => {}
        }
        if !self.selected.is_empty() {
            self.status_message = format!("{} selected", self.selected.len());
        }
        Task::none()
    }

    /// Selected numbers in list order (newest first).
    pub(crate) fn selected_numbers(&self) -> Vec<u32> {
        let mut numbers: Vec<u32> = self.selected.iter().copied().collect();
        numbers.sort_unstable_by(|a, b| b.cmp(a));
        numbers
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{self, row};
    use super::*;

    #[test]
    fn toggle_flips_membership() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_support::offline(dir.path());
        app.update(Message::ToggleSelect(4));
        app.update(Message::ToggleSelect(9));
        assert_eq!(app.selected_numbers(), vec![9, 4]);
        assert_eq!(app.status_message(), "2 selected");
        app.update(Message::ToggleSelect(4));
        assert_eq!(app.selected_numbers(), vec![9]);
    }

    #[test]
    fn select_all_covers_loaded_rows_only() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_support::offline(dir.path());
        for n in [5, 6, 7] {
            app.messages.insert(n, row(n));
        }
        app.update(Message::SetSelection(vec![100]));
        app.update(Message::SelectAll);
        assert_eq!(app.selected_numbers(), vec![7, 6, 5]);
        app.update(Message::ClearSelection);
        assert!(app.selected_numbers().is_empty());
    }

    #[tokio::test]
    async fn each_run_starts_without_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_support::offline(dir.path());
        app.run(Message::Login {
            user: String::new(),
            password: String::new(),
        })
        .await;
        assert!(app.last_error().is_some());

        app.run(Message::ClearSelection).await;
        assert_eq!(app.last_error(), None);
    }
}
