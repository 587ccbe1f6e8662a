use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Command-line client for a REST webmail backend.
#[derive(Debug, Parser)]
#[command(name = "webmail", version, about)]
pub struct Cli {
    /// Log requests and state changes (RUST_LOG overrides).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in and store the session token.
    Login {
        #[arg(short, long, env = "WEBMAIL_USER")]
        user: Option<String>,
        /// Backend base URL, e.g. https://mail.example.com/api/
        #[arg(long, env = "WEBMAIL_API_URL")]
        api_url: Option<String>,
        /// Read from stdin when not given.
        #[arg(long, env = "WEBMAIL_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// End the session and forget the stored token.
    Logout,
    /// Show the folder tree and the unread count.
    Folders,
    /// Manage folders.
    #[command(subcommand)]
    Folder(FolderCommand),
    /// List messages in a folder, newest first.
    List {
        #[arg(short, long, default_value = "INBOX")]
        folder: String,
        /// 1-based page number.
        #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
        page: Option<u32>,
        /// Load every page.
        #[arg(short, long, conflicts_with = "page")]
        all: bool,
    },
    /// Search a folder.
    Search {
        key: String,
        #[arg(short, long, default_value = "INBOX")]
        folder: String,
    },
    /// Show one message.
    Read {
        number: u32,
        #[arg(short, long, default_value = "INBOX")]
        folder: String,
    },
    /// Compose and send a new message.
    Send {
        #[command(flatten)]
        draft: DraftArgs,
        #[arg(long)]
        to: String,
        #[arg(short, long)]
        subject: String,
    },
    /// Reply to a message.
    Reply {
        number: u32,
        #[arg(short, long, default_value = "INBOX")]
        folder: String,
        #[command(flatten)]
        draft: DraftArgs,
    },
    /// Forward a message.
    Forward {
        number: u32,
        #[arg(long)]
        to: String,
        #[arg(short, long, default_value = "INBOX")]
        folder: String,
        #[command(flatten)]
        draft: DraftArgs,
    },
    /// Delete messages.
    Delete {
        #[arg(required = true)]
        numbers: Vec<u32>,
        #[arg(short, long, default_value = "INBOX")]
        folder: String,
    },
    /// Move messages to the archive folder.
    Archive {
        #[arg(required = true)]
        numbers: Vec<u32>,
        #[arg(short, long, default_value = "INBOX")]
        folder: String,
    },
    /// Move messages to another folder.
    Move {
        #[arg(required = true)]
        numbers: Vec<u32>,
        #[arg(long)]
        to: String,
        #[arg(short, long, default_value = "INBOX")]
        folder: String,
    },
    /// Preview, open or save an attachment.
    Attachment {
        number: u32,
        filename: String,
        #[arg(short, long, default_value = "INBOX")]
        folder: String,
        /// Save into the download directory instead of previewing.
        #[arg(long, conflicts_with = "open")]
        save: bool,
        /// Hand the file to the system viewer.
        #[arg(long)]
        open: bool,
        /// Zoom steps for images; negative zooms out.
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        zoom: i32,
    },
    /// Show the unread count.
    Unread,
    /// Permanently delete everything in the trash.
    EmptyTrash,
    /// Show account details.
    Info,
}

#[derive(Debug, Subcommand)]
pub enum FolderCommand {
    Create { name: String },
    Delete { name: String },
    Move { name: String, target: String },
    Subscribe { name: String },
    SubscribeAll,
}

/// Fields shared by every compose command.
#[derive(Debug, clap::Args)]
pub struct DraftArgs {
    #[arg(long)]
    pub cc: Option<String>,
    #[arg(long)]
    pub bcc: Option<String>,
    /// Message text; read from stdin when not given.
    #[arg(short, long)]
    pub body: Option<String>,
    /// Files to attach (paths or file:// URLs).
    #[arg(long = "attach", value_name = "PATH")]
    pub attachments: Vec<String>,
    /// Print the draft instead of sending it.
    #[arg(long)]
    pub dry_run: bool,
}

impl DraftArgs {
    pub fn attachment_paths(&self) -> Vec<PathBuf> {
        self.attachments
            .iter()
            .map(|a| crate::core::attachments::resolve_path_arg(a))
            .collect()
    }
}
