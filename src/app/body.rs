use crate::core::attachments;

use super::{AppModel, Message, Task};

impl AppModel {
    pub(super) fn handle_body(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::ViewMessage(number) => {
                self.status_message = "Loading message...".into();
                let api = self.api.clone();
                let folder = self.current_folder.clone();
                return Task::future(async move {
                    Message::MessageLoaded(
                        api.message(&folder, number).await.map_err(|e| e.to_string()),
                    )
                });
            }

            Message::MessageLoaded(Ok(content)) => {
                log::debug!(
                    "Opened {}/{} with {} attachment(s)",
                    content.folder,
                    content.number,
                    content.attachments.len()
                );
                self.open_message = Some(content);
                self.status_message = "Ready".into();
            }
            Message::MessageLoaded(Err(e)) => {
                self.open_message = None;
                self.fail("Failed to load message", e);
            }

            Message::SaveAttachment(filename) => {
                let (folder, number) = match self.attachment_source(&filename) {
                    Ok(source) => source,
                    Err(e) => {
                        self.fail("Cannot save attachment", e);
                        return Task::none();
                    }
                };
                let api = self.api.clone();
                let dir = self.config.download_dir();
                self.status_message = format!("Downloading {filename}...");
                return Task::future(async move {
                    let result = async {
                        let data = api.attachment(&folder, number, &filename).await?;
                        attachments::save_to_dir(&dir, &filename, &data).await
                    }
                    .await;
                    Message::SaveAttachmentComplete(result.map_err(|e| e.to_string()))
                });
            }

            Message::SaveAttachmentComplete(Ok(path)) => {
                self.status_message = format!("Saved to {}", path.display());
                self.last_saved = Some(path);
            }
            Message::SaveAttachmentComplete(Err(e)) => {
                self.fail("Save failed", e);
            }

            _ => {}
        }
        Task::none()
    }

    /// Folder and number of the open message, if it lists `filename`.
    pub(super) fn attachment_source(&self, filename: &str) -> Result<(String, u32), String> {
        let msg = self.open_message.as_ref().ok_or("no message is open")?;
        if !msg.attachments.iter().any(|a| a.file_name == filename) {
            return Err(format!(
                "message {} has no attachment {filename:?}",
                msg.number
            ));
        }
        Ok((msg.folder.clone(), msg.number))
    }
}
