mod actions;
mod body;
mod compose;
mod navigation;
mod preview;
mod search;
mod setup;
mod sync;
mod task;

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::atomic::AtomicU8;
use std::sync::Arc;

use futures::stream::FuturesUnordered;
use futures::StreamExt;
use indexmap::IndexMap;

use crate::config::Config;
use crate::core::api::ApiClient;
use crate::core::attachments::PreviewFile;
use crate::core::folders;
use crate::core::models::{AccountInfo, AttachmentRef, Folder, MessageContent, MessageSummary};
use crate::core::paging::Pager;
use crate::core::session::Session;
use crate::ui;
use crate::ui::compose_dialog::ComposeMode;

pub use compose::Draft;
pub use preview::PreviewState;
pub use task::Task;

/// Which part of the model to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pane {
    Folders,
    List,
    Message,
    Draft,
    Preview,
    Account,
}

pub struct AppModel {
    pub(super) config: Config,
    pub(super) api: Arc<ApiClient>,
    pub(super) cache_root: PathBuf,
    /// Where the session and login details are persisted.
    pub(super) config_file: PathBuf,

    pub(super) folders: Vec<Folder>,
    pub(super) current_folder: String,
    pub(super) account: Option<AccountInfo>,
    pub(super) unread: Option<String>,

    /// Loaded rows keyed by message number, newest first.
    pub(super) messages: IndexMap<u32, MessageSummary>,
    pub(super) pager: Pager,
    pub(super) selected: HashSet<u32>,
    pub(super) is_loading: bool,
    pub(super) load_all: bool,

    // Search state
    pub(super) search_active: bool,
    pub(super) search_query: String,

    pub(super) open_message: Option<MessageContent>,
    pub(super) preview: Option<PreviewState>,
    pub(super) last_saved: Option<PathBuf>,

    // Compose state
    pub(super) draft: Option<Draft>,
    pub(super) compose_error: Option<String>,
    pub(super) is_sending: bool,
    pub(super) upload_progress: Arc<AtomicU8>,

    pub(super) status_message: String,
    pub(super) last_error: Option<String>,
}

#[derive(Debug, Clone)]
pub enum Message {
    // Session
    Login { user: String, password: String },
    LoginComplete(Result<Session, String>),
    Logout,
    LogoutComplete(Result<(), String>),

    // Folders
    LoadFolders,
    FoldersLoaded(Result<Vec<Folder>, String>),
    SelectFolder(String),
    CreateFolder(String),
    DeleteFolder(String),
    MoveFolder { name: String, target: String },
    SubscribeFolder(String),
    SubscribeAll,
    FolderOpComplete {
        done: String,
        result: Result<String, String>,
    },
    LoadUnread,
    UnreadLoaded(Result<String, String>),
    LoadAccountInfo,
    AccountInfoLoaded(Result<AccountInfo, String>),
    EmptyTrash,
    TrashEmptied(Result<String, String>),

    // Message list
    Refresh,
    CountLoaded(Result<u32, String>),
    MessagesLoaded(Result<Vec<MessageSummary>, String>),
    LoadMoreMessages,
    LoadAllMessages,
    GoToPage(u32),

    // Selection
    ToggleSelect(u32),
    SetSelection(Vec<u32>),
    SelectAll,
    ClearSelection,

    // Delete / move actions
    DeleteSelected,
    ArchiveSelected,
    MoveSelected(String),
    MoveOpComplete {
        done: String,
        result: Result<(), String>,
    },

    // Search
    SearchExecute(String),
    SearchResultsLoaded(Result<Vec<MessageSummary>, String>),
    SearchClear,

    // Reading pane and attachments
    ViewMessage(u32),
    MessageLoaded(Result<MessageContent, String>),
    SaveAttachment(String),
    SaveAttachmentComplete(Result<PathBuf, String>),

    // Preview
    PreviewAttachment(String),
    PreviewLoaded(Result<PreviewState, String>),
    PreviewZoomIn,
    PreviewZoomOut,
    PreviewWheel(f32),
    PreviewPan { dx: f32, dy: f32 },
    PreviewResetZoom,
    PreviewOpenExternal,
    PreviewOpenComplete(Result<(), String>),
    PreviewClose,
    PreviewClosed(Result<(), String>),

    // Compose
    ComposeNew,
    ComposeReply(u32),
    ComposeForward(u32),
    ComposeSourceLoaded {
        mode: ComposeMode,
        result: Result<MessageContent, String>,
    },
    ComposeToChanged(String),
    ComposeCcChanged(String),
    ComposeBccChanged(String),
    ComposeSubjectChanged(String),
    ComposeBodyChanged(String),
    ComposeAttach(PathBuf),
    UploadComplete(Result<AttachmentRef, String>),
    ComposeRemoveAttachment(usize),
    ComposeSend,
    ComposeCancel,
    SendComplete(Result<(), String>),
}

impl AppModel {
    pub fn new(config: Config, session: Option<Session>) -> crate::core::error::Result<Self> {
        let api = ApiClient::new(config.api_url.clone())?;
        let api = match session {
            Some(s) => api.with_session(s),
            None => api,
        };
        Ok(AppModel {
            config,
            api: Arc::new(api),
            cache_root: PreviewFile::cache_root(),
            config_file: crate::config::config_path(),
            folders: Vec::new(),
            current_folder: folders::INBOX.to_string(),
            account: None,
            unread: None,
            messages: IndexMap::new(),
            pager: Pager::new(0, 1),
            selected: HashSet::new(),
            is_loading: false,
            load_all: false,
            search_active: false,
            search_query: String::new(),
            open_message: None,
            preview: None,
            last_saved: None,
            draft: None,
            compose_error: None,
            is_sending: false,
            upload_progress: Arc::new(AtomicU8::new(0)),
            status_message: "Ready".into(),
            last_error: None,
        })
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            // Session
            Message::Login { .. }
            | Message::LoginComplete(_)
            | Message::Logout
            | Message::LogoutComplete(_) => self.handle_setup(message),

            // Folders and list loading
            Message::LoadFolders
            | Message::FoldersLoaded(_)
            | Message::SelectFolder(_)
            | Message::Refresh
            | Message::CountLoaded(_)
            | Message::MessagesLoaded(_)
            | Message::LoadMoreMessages
            | Message::LoadAllMessages
            | Message::GoToPage(_) => self.handle_sync(message),

            // Folder management and mailbox actions
            Message::CreateFolder(_)
            | Message::DeleteFolder(_)
            | Message::MoveFolder { .. }
            | Message::SubscribeFolder(_)
            | Message::SubscribeAll
            | Message::FolderOpComplete { .. }
            | Message::LoadUnread
            | Message::UnreadLoaded(_)
            | Message::LoadAccountInfo
            | Message::AccountInfoLoaded(_)
            | Message::EmptyTrash
            | Message::TrashEmptied(_)
            | Message::DeleteSelected
            | Message::ArchiveSelected
            | Message::MoveSelected(_)
            | Message::MoveOpComplete { .. } => self.handle_actions(message),

            // Selection
            Message::ToggleSelect(_)
            | Message::SetSelection(_)
            | Message::SelectAll
            | Message::ClearSelection => self.handle_navigation(message),

            // Search
            Message::SearchExecute(_)
            | Message::SearchResultsLoaded(_)
            | Message::SearchClear => self.handle_search(message),

            // Body / attachment saving
            Message::ViewMessage(_)
            | Message::MessageLoaded(_)
            | Message::SaveAttachment(_)
            | Message::SaveAttachmentComplete(_) => self.handle_body(message),

            // Preview
            Message::PreviewAttachment(_)
            | Message::PreviewLoaded(_)
            | Message::PreviewZoomIn
            | Message::PreviewZoomOut
            | Message::PreviewWheel(_)
            | Message::PreviewPan { .. }
            | Message::PreviewResetZoom
            | Message::PreviewOpenExternal
            | Message::PreviewOpenComplete(_)
            | Message::PreviewClose
            | Message::PreviewClosed(_) => self.handle_preview(message),

            // Compose
            Message::ComposeNew
            | Message::ComposeReply(_)
            | Message::ComposeForward(_)
            | Message::ComposeSourceLoaded { .. }
            | Message::ComposeToChanged(_)
            | Message::ComposeCcChanged(_)
            | Message::ComposeBccChanged(_)
            | Message::ComposeSubjectChanged(_)
            | Message::ComposeBodyChanged(_)
            | Message::ComposeAttach(_)
            | Message::UploadComplete(_)
            | Message::ComposeRemoveAttachment(_)
            | Message::ComposeSend
            | Message::ComposeCancel
            | Message::SendComplete(_) => self.handle_compose(message),
        }
    }

    /// Feed `message` through `update`, then keep feeding completions back in
    /// until no work is left. Futures from one update run concurrently.
    pub async fn run(&mut self, message: Message) {
        self.last_error = None;
        let mut pending = FuturesUnordered::new();
        self.update(message).spawn_into(&mut pending);
        while let Some(next) = pending.next().await {
            self.update(next).spawn_into(&mut pending);
        }
    }

    /// Dispatch a message through the update loop (for recursive calls from handlers).
    pub(super) fn dispatch(&mut self, message: Message) -> Task<Message> {
        self.update(message)
    }

    /// Record a failed operation in the status line.
    pub(super) fn fail(&mut self, what: &str, error: impl std::fmt::Display) {
        let msg = format!("{what}: {error}");
        log::error!("{msg}");
        self.status_message = msg.clone();
        self.last_error = Some(msg);
    }

    pub(super) fn user_name(&self) -> &str {
        self.api
            .session()
            .map(|s| s.user_name.as_str())
            .unwrap_or(self.config.username.as_str())
    }

    pub fn view(&self, pane: Pane) -> String {
        match pane {
            Pane::Folders => ui::sidebar::view(&self.folders, &self.current_folder, self.unread.as_deref()),
            Pane::List => ui::message_list::view(
                &self.messages,
                &self.current_folder,
                self.user_name(),
                &self.selected,
                &self.pager,
                self.search_active.then_some(self.search_query.as_str()),
            ),
            Pane::Message => ui::message_view::view(self.open_message.as_ref()),
            Pane::Draft => match &self.draft {
                Some(draft) => ui::compose_dialog::view(
                    draft,
                    self.compose_error.as_deref(),
                    self.is_sending,
                    self.upload_percent(),
                ),
                None => "No message is being composed\n".to_string(),
            },
            Pane::Preview => match &self.preview {
                Some(state) => ui::preview::view(state),
                None => "Nothing to preview\n".to_string(),
            },
            Pane::Account => match &self.account {
                Some(info) => format!(
                    "User:      {}\nServer:    {}\nLanguage:  {}\nSeparator: {}\nInbox:     {} messages\nTrash:     {} ({})\n",
                    self.user_name(),
                    self.api.base_url(),
                    info.language,
                    info.separator,
                    info.inbox_count,
                    info.trash_name,
                    info.trash_messages
                ),
                None => "Account details not loaded\n".to_string(),
            },
        }
    }

    /// Point the model at `name` without loading its list.
    pub fn open_folder(&mut self, name: &str) {
        self.current_folder = folders::request_name(name);
    }

    pub fn preview(&self) -> Option<&PreviewState> {
        self.preview.as_ref()
    }

    pub fn last_saved(&self) -> Option<&std::path::Path> {
        self.last_saved.as_deref()
    }

    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::core::models::FileItem;
    use crate::core::session::Session;
    use url::Url;

    /// A logged-in model pointed at `url`, writing files under `dir`.
    pub(crate) fn model(url: Url, dir: &std::path::Path) -> AppModel {
        let config = Config {
            api_url: url,
            username: "alice".into(),
            page_size: 20,
            download_dir: Some(dir.join("downloads")),
        };
        let mut app = AppModel::new(
            config,
            Some(Session {
                user_name: "alice".into(),
                jwt_key: "tok".into(),
            }),
        )
        .unwrap();
        app.cache_root = dir.join("cache");
        app.config_file = dir.join("config").join("config.json");
        app
    }

    pub(crate) fn offline(dir: &std::path::Path) -> AppModel {
        model(Url::parse("http://127.0.0.1:9/api/").unwrap(), dir)
    }

    pub(crate) fn row(number: u32) -> MessageSummary {
        MessageSummary {
            number,
            from: format!("sender{number}@example.com"),
            to: "alice@example.com".into(),
            subject: format!("Subject {number}"),
            received_date: "2024-05-01".into(),
            has_attachment: false,
            size: "3.2 kB".into(),
            status: String::new(),
        }
    }

    /// An open message in `folder` carrying attachments named `files`.
    pub(crate) fn open_with(folder: &str, number: u32, files: &[&str]) -> MessageContent {
        MessageContent {
            number,
            folder: folder.into(),
            to: "alice@example.com".into(),
            from: "bob@example.com".into(),
            cc: String::new(),
            bcc: String::new(),
            subject: "Report".into(),
            body: "<p>see attached</p>".into(),
            received_date: "2024-05-01".into(),
            attachments: files
                .iter()
                .map(|f| FileItem {
                    file_name: f.to_string(),
                    ..FileItem::default()
                })
                .collect(),
        }
    }
}
