use serde::{Deserialize, Deserializer, Serialize};

// ---------------------------------------------------------------------------
// Wire types: field names follow the backend's camelCase JSON
// ---------------------------------------------------------------------------

/// Backend strings are frequently `null`; treat that as empty.
fn null_as_empty<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(d)?.unwrap_or_default())
}

/// Message numbers arrive as either JSON numbers or strings.
fn string_or_number<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Num(i64),
        Null(()),
    }
    Ok(match Raw::deserialize(d)? {
        Raw::Str(s) => s,
        Raw::Num(n) => n.to_string(),
        Raw::Null(()) => String::new(),
    })
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoginResponse {
    #[serde(deserialize_with = "null_as_empty")]
    pub message: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub code: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub error: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub jwt_key: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FolderResponse {
    pub children: Vec<FolderResponse>,
    #[serde(deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub full_name: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub delimiter: String,
    pub message_count: i64,
    pub unseen_message_count: i64,
    pub subscribed: bool,
    pub has_children: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateFolderRequest {
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteFolderRequest {
    pub selected_folder: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveFolderRequest {
    pub selected_folder: Vec<String>,
    pub target_folder: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRange {
    pub start_msg_number: u32,
    pub last_msg_number: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageListRequest {
    #[serde(flatten)]
    pub range: MessageRange,
    pub folder: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchMessageRequest {
    pub searchkey: String,
    pub folder: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteMessageRequest {
    pub folder: String,
    pub message: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MoveMessageRequest {
    pub folder: String,
    pub message: Vec<String>,
    pub destination: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MessageListResponse {
    pub message_list: Vec<MailMessage>,
}

/// One row of a folder listing as the backend sends it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MailMessage {
    #[serde(deserialize_with = "string_or_number")]
    pub message_number: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub status: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub attachment: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub from: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub to: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub cc: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub bcc: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub subject: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub received_date: String,
    #[serde(deserialize_with = "string_or_number")]
    pub size: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageContentRequest {
    pub folder: String,
    pub message_number: u32,
    pub rendering_type: u8,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForwardMessageContentRequest {
    #[serde(flatten)]
    pub message: MessageContentRequest,
    pub forward_address: String,
    pub is_attachment: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MessageContentResponse {
    pub mail_message: Option<MailMessageModel>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MailMessageModel {
    #[serde(deserialize_with = "string_or_number")]
    pub message_number: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub to: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub from: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub cc: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub bcc: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub subject: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub body: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub received_date: String,
    #[serde(default, deserialize_with = "null_as_empty_vec")]
    pub attachment: Vec<FileItem>,
}

fn null_as_empty_vec<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<FileItem>, D::Error> {
    Ok(Option::<Vec<FileItem>>::deserialize(d)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FileItem {
    #[serde(deserialize_with = "null_as_empty")]
    pub content_type: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub file_name: String,
    pub file: FileRef,
    #[serde(deserialize_with = "null_as_empty")]
    pub charset: String,
    pub saved: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRef {
    #[serde(deserialize_with = "null_as_empty")]
    pub path: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MailMessageSendRequest {
    pub message_number: String,
    pub to: String,
    pub from: String,
    pub cc: String,
    pub bcc: String,
    pub subject: String,
    pub body: String,
    pub received_date: String,
    pub html: bool,
    pub attachment: Vec<FileItem>,
}

// ---------------------------------------------------------------------------
// Domain types
// ---------------------------------------------------------------------------

/// A mail folder. Folders nest; the backend returns a forest.
#[derive(Debug, Clone, PartialEq)]
pub struct Folder {
    pub name: String,
    pub full_name: String,
    pub delimiter: String,
    pub message_count: u32,
    pub unseen_count: u32,
    pub subscribed: bool,
    pub children: Vec<Folder>,
}

impl From<FolderResponse> for Folder {
    fn from(f: FolderResponse) -> Self {
        Folder {
            full_name: if f.full_name.is_empty() {
                f.name.clone()
            } else {
                f.full_name
            },
            name: f.name,
            delimiter: f.delimiter,
            message_count: f.message_count.max(0) as u32,
            unseen_count: f.unseen_message_count.max(0) as u32,
            subscribed: f.subscribed,
            children: f.children.into_iter().map(Folder::from).collect(),
        }
    }
}

impl Folder {
    /// Pre-order walk yielding each folder with its nesting depth.
    pub fn flatten(folders: &[Folder]) -> Vec<(usize, &Folder)> {
        fn walk<'a>(out: &mut Vec<(usize, &'a Folder)>, depth: usize, folders: &'a [Folder]) {
            for f in folders {
                out.push((depth, f));
                walk(out, depth + 1, &f.children);
            }
        }
        let mut out = Vec::new();
        walk(&mut out, 0, folders);
        out
    }
}

/// Summary of a message for the list view (no body).
#[derive(Debug, Clone, PartialEq)]
pub struct MessageSummary {
    pub number: u32,
    pub from: String,
    pub to: String,
    pub subject: String,
    pub received_date: String,
    pub has_attachment: bool,
    pub size: String,
    pub status: String,
}

impl MessageSummary {
    /// Rows with an unparseable message number are dropped.
    pub fn from_wire(m: MailMessage) -> Option<Self> {
        let number = m.message_number.trim().parse().ok()?;
        Some(MessageSummary {
            number,
            has_attachment: !m.attachment.is_empty(),
            from: m.from,
            to: m.to,
            subject: m.subject,
            received_date: m.received_date,
            size: m.size,
            status: m.status,
        })
    }

    pub fn is_unread(&self) -> bool {
        let s = self.status.to_ascii_lowercase();
        s.contains("unseen") || s.contains("unread") || s == "new"
    }
}

/// Full message for the reading pane.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageContent {
    pub number: u32,
    pub folder: String,
    pub to: String,
    pub from: String,
    pub cc: String,
    pub bcc: String,
    pub subject: String,
    pub body: String,
    pub received_date: String,
    pub attachments: Vec<FileItem>,
}

impl MessageContent {
    pub fn from_wire(folder: &str, fallback_number: u32, m: MailMessageModel) -> Self {
        MessageContent {
            number: m.message_number.trim().parse().unwrap_or(fallback_number),
            folder: folder.to_string(),
            to: m.to,
            from: m.from,
            cc: m.cc,
            bcc: m.bcc,
            subject: m.subject,
            body: m.body,
            received_date: m.received_date,
            attachments: m.attachment,
        }
    }
}

/// An attachment already uploaded to the backend, referenced by name when sending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentRef {
    pub file_name: String,
    pub content_type: String,
    pub size: u64,
}

impl AttachmentRef {
    pub fn to_file_item(&self) -> FileItem {
        FileItem {
            content_type: self.content_type.clone(),
            file_name: self.file_name.clone(),
            file: FileRef::default(),
            charset: String::new(),
            saved: false,
        }
    }
}

/// Per-account details the backend reports alongside the mailbox.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountInfo {
    pub separator: String,
    pub language: String,
    pub trash_name: String,
    pub inbox_count: u32,
    /// What `getTrashMessages` reports for the trash, shown verbatim.
    pub trash_messages: String,
}

/// Decoded attachment data for preview and saving.
#[derive(Debug, Clone)]
pub struct AttachmentData {
    pub filename: String,
    pub mime_type: String,
    pub data: Vec<u8>,
}
