use crate::core::folders;
use crate::core::models::AccountInfo;

use super::{AppModel, Message, Task};

impl AppModel {
    pub(super) fn handle_actions(&mut self, message: Message) -> Task<Message> {
        match message {
            // -- folder management ------------------------------------------
            Message::CreateFolder(name) => {
                let name = name.trim().to_string();
                if name.is_empty() {
                    self.fail("Cannot create folder", "name is empty");
                    return Task::none();
                }
                let api = self.api.clone();
                return Task::future(async move {
                    let result = api.create_folder(&name).await;
                    Message::FolderOpComplete {
                        done: format!("Created folder {name}"),
                        result: result.map(|()| String::new()).map_err(|e| e.to_string()),
                    }
                });
            }
            Message::DeleteFolder(name) => {
                let name = folders::request_name(&name);
                if folders::is_inbox(&name) {
                    self.fail("Cannot delete folder", "the inbox cannot be deleted");
                    return Task::none();
                }
                let api = self.api.clone();
                return Task::future(async move {
                    let result = api.delete_folders(vec![name.clone()]).await;
                    Message::FolderOpComplete {
                        done: format!("Deleted folder {name}"),
                        result: result.map(|()| String::new()).map_err(|e| e.to_string()),
                    }
                });
            }
            Message::MoveFolder { name, target } => {
                let api = self.api.clone();
                return Task::future(async move {
                    let result = api.move_folders(vec![name.clone()], vec![target.clone()]).await;
                    Message::FolderOpComplete {
                        done: format!("Moved folder {name} to {target}"),
                        result: result.map(|()| String::new()).map_err(|e| e.to_string()),
                    }
                });
            }
            Message::SubscribeFolder(name) => {
                let api = self.api.clone();
                return Task::future(async move {
                    let result = api.subscribe_folder(&name).await;
                    Message::FolderOpComplete {
                        done: format!("Subscribed to {name}"),
                        result: result.map_err(|e| e.to_string()),
                    }
                });
            }
            Message::SubscribeAll => {
                let api = self.api.clone();
                return Task::future(async move {
                    let result = api.subscribe_all().await;
                    Message::FolderOpComplete {
                        done: "Subscribed to all folders".into(),
                        result: result.map_err(|e| e.to_string()),
                    }
                });
            }
            Message::FolderOpComplete { done, result } => match result {
                Ok(reply) => {
                    let reply = reply.trim();
                    if !reply.is_empty() {
                        log::debug!("Folder operation reply: {reply}");
                    }
                    self.status_message = done;
                    return self.dispatch(Message::LoadFolders);
                }
                Err(e) => self.fail("Folder operation failed", e),
            },

            // -- mailbox info -----------------------------------------------
            Message::LoadUnread => {
                let api = self.api.clone();
                return Task::future(async move {
                    Message::UnreadLoaded(api.unread().await.map_err(|e| e.to_string()))
                });
            }
            Message::UnreadLoaded(Ok(unread)) => {
                self.status_message = format!("Unread: {unread}");
                self.unread = Some(unread);
            }
            Message::UnreadLoaded(Err(e)) => self.fail("Failed to load unread count", e),

            Message::LoadAccountInfo => {
                let api = self.api.clone();
                return Task::future(async move {
                    let result = futures::try_join!(
                        api.separator(),
                        api.user_language(),
                        api.trash_name(),
                        api.inbox_message_count(),
                        api.trash_messages()
                    )
                    .map(
                        |(separator, language, trash_name, inbox_count, trash_messages)| {
                            AccountInfo {
                                separator,
                                language,
                                trash_name,
                                inbox_count,
                                trash_messages,
                            }
                        },
                    );
                    Message::AccountInfoLoaded(result.map_err(|e| e.to_string()))
                });
            }
            Message::AccountInfoLoaded(Ok(info)) => {
                log::debug!("Account info: {info:?}");
                self.account = Some(info);
            }
            Message::AccountInfoLoaded(Err(e)) => self.fail("Failed to load account info", e),

            // The trash folder's name is server-specific, so ask first.
            Message::EmptyTrash => {
                self.status_message = "Emptying trash...".into();
                let api = self.api.clone();
                return Task::future(async move {
                    let result = async {
                        let trash = api.trash_name().await?;
                        let reply = api.empty_trash().await?;
                        log::debug!("getTrashEmpty replied {reply:?}");
                        Ok::<_, crate::core::error::Error>(trash)
                    }
                    .await;
                    Message::TrashEmptied(result.map_err(|e| e.to_string()))
                });
            }
            Message::TrashEmptied(Ok(trash)) => {
                let shown = if trash.is_empty() { "Trash" } else { trash.as_str() };
                self.status_message = format!("Emptied {}", folders::display_name(shown));
                if !trash.is_empty() && self.current_folder.eq_ignore_ascii_case(&trash) {
                    return self.dispatch(Message::Refresh);
                }
            }
            Message::TrashEmptied(Err(e)) => self.fail("Failed to empty trash", e),

            // -- message actions --------------------------------------------
            Message::DeleteSelected => {
                let numbers = self.take_selected();
                if numbers.is_empty() {
                    self.status_message = "No messages selected".into();
                    return Task::none();
                }
                let api = self.api.clone();
                let folder = self.current_folder.clone();
                return Task::future(async move {
                    let result = api.delete_messages(&folder, &numbers).await;
                    Message::MoveOpComplete {
                        done: format!("Deleted {} message(s)", numbers.len()),
                        result: result.map_err(|e| e.to_string()),
                    }
                });
            }
            Message::ArchiveSelected => {
                return self.dispatch(Message::MoveSelected(folders::ARCHIVE.to_string()));
            }
            Message::MoveSelected(destination) => {
                let destination = folders::request_name(&destination);
                if destination == self.current_folder {
                    let shown = folders::display_name(&destination);
                    self.fail("Cannot move messages", format!("they are already in {shown}"));
                    return Task::none();
                }
                let numbers = self.take_selected();
                if numbers.is_empty() {
                    self.status_message = "No messages selected".into();
                    return Task::none();
                }
                let api = self.api.clone();
                let folder = self.current_folder.clone();
                return Task::future(async move {
                    let result = api.move_messages(&folder, &numbers, &destination).await;
                    Message::MoveOpComplete {
                        done: format!(
                            "Moved {} message(s) to {}",
                            numbers.len(),
                            folders::display_name(&destination)
                        ),
                        result: result.map_err(|e| e.to_string()),
                    }
                });
            }

            // Either way the server's view replaces the optimistic one.
            Message::MoveOpComplete { done, result } => {
                match result {
                    Ok(()) => {
                        log::info!("{done}");
                        self.status_message = done;
                    }
                    Err(e) => self.fail("Message action failed", e),
                }
                return self.dispatch(Message::Refresh);
            }

            _ => {}
        }
        Task::none()
    }

    /// Remove the selected rows from the list and hand back their numbers,
    /// newest first. Closes the reading pane if it shows one of them.
    fn take_selected(&mut self) -> Vec<u32> {
        let numbers = self.selected_numbers();
        self.selected.clear();
        for n in &numbers {
            self.messages.shift_remove(n);
        }
        if self
            .open_message
            .as_ref()
            .is_some_and(|m| m.folder == self.current_folder && numbers.contains(&m.number))
        {
            self.open_message = None;
        }
        numbers
    }
}
