use std::sync::Arc;

use super::{AppModel, Message, Task};
use crate::core::session;

impl AppModel {
    pub(super) fn handle_setup(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Login { user, password } => {
                if user.trim().is_empty() || password.is_empty() {
                    self.fail("Login failed", "user name and password are required");
                    return Task::none();
                }
                self.status_message = "Logging in...".into();
                let api = self.api.without_session();
                return Task::future(async move {
                    Message::LoginComplete(
                        api.login(&user, &password).await.map_err(|e| e.to_string()),
                    )
                });
            }

            Message::LoginComplete(Ok(session)) => {
                let mut config = self.config.clone();
                config.username = session.user_name.clone();
                if let Err(e) = session::save(&config, &self.config_file, &session) {
                    self.fail("Login failed", format!("session not saved: {e}"));
                    return Task::none();
                }
                self.config = config;
                self.status_message = format!("Logged in as {}", session.user_name);
                self.api = Arc::new(self.api.with_session(session));
            }
            Message::LoginComplete(Err(e)) => {
                self.fail("Login failed", e);
            }

            Message::Logout => {
                self.status_message = "Logging out...".into();
                let api = self.api.clone();
                return Task::future(async move {
                    Message::LogoutComplete(api.logout().await.map_err(|e| e.to_string()))
                });
            }

            // The local session goes away whatever the backend said.
            Message::LogoutComplete(result) => {
                if let Err(e) = &result {
                    log::warn!("Logout call failed: {e}");
                }
                if let Err(e) = session::clear(&self.config, &self.config_file) {
                    log::warn!("Failed to clear stored session: {e}");
                }
                self.api = Arc::new(self.api.without_session());
                self.folders.clear();
                self.messages.clear();
                self.selected.clear();
                self.open_message = None;
                self.draft = None;
                self.status_message = "Logged out".into();
            }

            _ => {}
        }
        Task::none()
    }
}
