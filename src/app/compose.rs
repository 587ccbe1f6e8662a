use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use super::{AppModel, Message, Task};
use crate::core::attachments;
use crate::core::folders;
use crate::core::mime;
use crate::core::models::{AttachmentRef, MailMessageSendRequest, MessageContent};
use crate::ui::compose_dialog::ComposeMode;

/// A message being written. `body` is what the user typed; `original` is the
/// quoted block of the message being replied to or forwarded.
#[derive(Debug, Clone, PartialEq)]
pub struct Draft {
    pub mode: ComposeMode,
    pub to: String,
    pub from: String,
    pub cc: String,
    pub bcc: String,
    pub subject: String,
    pub body: String,
    pub original: Option<String>,
    pub attachments: Vec<AttachmentRef>,
}

impl Draft {
    pub fn new(from: &str) -> Self {
        Draft {
            mode: ComposeMode::New,
            to: String::new(),
            from: from.to_string(),
            cc: String::new(),
            bcc: String::new(),
            subject: String::new(),
            body: String::new(),
            original: None,
            attachments: Vec::new(),
        }
    }

    /// Replying from Sent goes back to the same recipients.
    pub fn reply(msg: &MessageContent) -> Self {
        let (to, from) = if folders::is_sent(&msg.folder) {
            (msg.to.clone(), msg.from.clone())
        } else {
            (msg.from.clone(), msg.to.clone())
        };
        Draft {
            mode: ComposeMode::Reply,
            to,
            from,
            cc: msg.cc.clone(),
            bcc: msg.bcc.clone(),
            subject: prefixed("Re: ", &msg.subject),
            body: String::new(),
            original: Some(original_block("Replied", msg)),
            attachments: Vec::new(),
        }
    }

    pub fn forward(msg: &MessageContent) -> Self {
        let from = if folders::is_sent(&msg.folder) {
            msg.from.clone()
        } else {
            msg.to.clone()
        };
        Draft {
            mode: ComposeMode::Forward,
            from,
            subject: prefixed("Fwd: ", &msg.subject),
            original: Some(original_block("forwarded", msg)),
            ..Draft::new("")
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.to.trim().is_empty() {
            return Err("Recipient is required".into());
        }
        if self.body.trim().is_empty() && self.original.is_none() {
            return Err("Message body is required".into());
        }
        Ok(())
    }

    /// The HTML body sent to the backend: the new text, then the quoted block.
    pub fn html_body(&self) -> String {
        let mut html = mime::plain_to_html(&self.body);
        if let Some(original) = &self.original {
            if !self.body.is_empty() {
                html.push_str("<br><br>");
            }
            html.push_str(&mime::plain_to_html(original));
        }
        html
    }

    pub fn send_request(&self) -> MailMessageSendRequest {
        MailMessageSendRequest {
            message_number: String::new(),
            to: self.to.trim().to_string(),
            from: self.from.clone(),
            cc: self.cc.trim().to_string(),
            bcc: self.bcc.trim().to_string(),
            subject: self.subject.clone(),
            body: self.html_body(),
            received_date: String::new(),
            html: true,
            attachment: self.attachments.iter().map(AttachmentRef::to_file_item).collect(),
        }
    }
}

fn prefixed(prefix: &str, subject: &str) -> String {
    let already = subject
        .get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix));
    if already {
        subject.to_string()
    } else {
        format!("{prefix}{subject}")
    }
}

fn original_block(header: &str, msg: &MessageContent) -> String {
    format!(
        " -----{header} Message-----\nFrom: {}\nTo: {}\nsubject: {}\n{}",
        msg.from,
        msg.to,
        msg.subject,
        mime::html_to_text(&msg.body)
    )
}

impl AppModel {
    pub(super) fn handle_compose(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::ComposeNew => {
                self.start_draft(Draft::new(self.user_name()));
            }

            Message::ComposeReply(number) | Message::ComposeForward(number) => {
                let mode = match message {
                    Message::ComposeReply(_) => ComposeMode::Reply,
                    _ => ComposeMode::Forward,
                };
                if let Some(open) = self
                    .open_message
                    .as_ref()
                    .filter(|m| m.number == number && m.folder == self.current_folder)
                {
                    let draft = match mode {
                        ComposeMode::Reply => Draft::reply(open),
                        _ => Draft::forward(open),
                    };
                    self.start_draft(draft);
                    return Task::none();
                }

                self.status_message = "Loading original message...".into();
                let api = self.api.clone();
                let folder = self.current_folder.clone();
                return Task::future(async move {
                    let result = match mode {
                        ComposeMode::Reply => api.reply_message(&folder, number).await,
                        _ => api.forward_message(&folder, number, "", false).await,
                    };
                    Message::ComposeSourceLoaded {
                        mode,
                        result: result.map_err(|e| e.to_string()),
                    }
                });
            }
            Message::ComposeSourceLoaded { mode, result } => match result {
                Ok(msg) => {
                    let draft = match mode {
                        ComposeMode::New => Draft::new(self.user_name()),
                        ComposeMode::Reply => Draft::reply(&msg),
                        ComposeMode::Forward => Draft::forward(&msg),
                    };
                    self.start_draft(draft);
                }
                Err(e) => self.fail("Could not load the original message", e),
            },

            Message::ComposeToChanged(v) => self.edit_draft(|d| d.to = v),
            Message::ComposeCcChanged(v) => self.edit_draft(|d| d.cc = v),
            Message::ComposeBccChanged(v) => self.edit_draft(|d| d.bcc = v),
            Message::ComposeSubjectChanged(v) => self.edit_draft(|d| d.subject = v),
            Message::ComposeBodyChanged(v) => self.edit_draft(|d| d.body = v),

            Message::ComposeAttach(path) => {
                if self.draft.is_none() {
                    self.status_message = "No message is being composed".into();
                    return Task::none();
                }
                return self.upload(path);
            }
            Message::UploadComplete(Ok(attachment)) => {
                self.status_message = format!("Attached {}", attachment.file_name);
                if let Some(draft) = &mut self.draft {
                    draft.attachments.push(attachment);
                }
            }
            Message::UploadComplete(Err(e)) => {
                self.compose_error = Some(e.clone());
                self.fail("Upload failed", e);
            }

            Message::ComposeRemoveAttachment(i) => {
                if let Some(draft) = &mut self.draft {
                    if i < draft.attachments.len() {
                        draft.attachments.remove(i);
                    }
                }
            }

            Message::ComposeSend => {
                if self.is_sending {
                    return Task::none();
                }
                let Some(draft) = &self.draft else {
                    self.status_message = "No message is being composed".into();
                    return Task::none();
                };
                if let Err(e) = draft.validate() {
                    self.compose_error = Some(e.clone());
                    self.fail("Cannot send", e);
                    return Task::none();
                }

                let request = draft.send_request();
                self.is_sending = true;
                self.compose_error = None;
                self.status_message = "Sending...".into();
                let api = self.api.clone();
                return Task::future(async move {
                    let result = api.send_mail(&request).await;
                    Message::SendComplete(result.map(drop).map_err(|e| e.to_string()))
                });
            }

            Message::ComposeCancel => {
                self.draft = None;
                self.compose_error = None;
                self.is_sending = false;
            }

            Message::SendComplete(Ok(())) => {
                self.draft = None;
                self.is_sending = false;
                self.compose_error = None;
                self.status_message = "Message sent".into();
                return self.dispatch(Message::SelectFolder(folders::SENT.to_string()));
            }
            Message::SendComplete(Err(e)) => {
                self.is_sending = false;
                self.compose_error = Some(format!("Send failed: {e}"));
                self.fail("Send failed", e);
            }

            _ => {}
        }
        Task::none()
    }

    fn start_draft(&mut self, draft: Draft) {
        log::debug!("Composing {:?} to {:?}", draft.mode, draft.to);
        self.draft = Some(draft);
        self.compose_error = None;
        self.is_sending = false;
        self.status_message = "Composing".into();
    }

    fn edit_draft(&mut self, f: impl FnOnce(&mut Draft)) {
        match &mut self.draft {
            Some(draft) => f(draft),
            None => log::debug!("Ignoring edit with no open draft"),
        }
    }

    fn upload(&mut self, path: PathBuf) -> Task<Message> {
        self.upload_progress.store(0, Ordering::Relaxed);
        self.status_message = format!("Uploading {}...", path.display());
        let api = self.api.clone();
        let gauge = self.upload_progress.clone();
        let progress: Arc<dyn Fn(u8) + Send + Sync> = Arc::new(move |p| {
            gauge.store(p, Ordering::Relaxed);
        });
        Task::future(async move {
            let result = async {
                let data = attachments::read_for_upload(&path).await?;
                let reference = AttachmentRef {
                    file_name: data.filename.clone(),
                    content_type: data.mime_type.clone(),
                    size: data.data.len() as u64,
                };
                api.upload(data, progress)
                    .await
                    .map_err(|e| e.to_string())?;
                Ok::<_, String>(reference)
            }
            .await;
            Message::UploadComplete(result)
        })
    }

    pub fn upload_percent(&self) -> u8 {
        self.upload_progress.load(Ordering::Relaxed)
    }
}
