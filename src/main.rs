mod app;
mod cli;
mod config;
mod core;
mod ui;

use std::io::{IsTerminal, Read, Write};
use std::process::ExitCode;

use clap::Parser;

use crate::app::{AppModel, Message, Pane};
use crate::cli::{Cli, Command, DraftArgs, FolderCommand};
use crate::config::{config_path, normalize_api_url, Config, DEFAULT_PAGE_SIZE};
use crate::core::folders;
use crate::core::preview::ViewerStrategy;
use crate::core::session;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("webmail: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command) -> Result<(), String> {
    match command {
        Command::Login {
            user,
            api_url,
            password,
        } => return login(user, api_url, password).await,

        Command::Logout => {
            let mut app = open_session()?;
            step(&mut app, Message::Logout).await?;
            println!("{}", app.status_message());
        }

        Command::Folders => {
            let mut app = open_session()?;
            step(&mut app, Message::LoadFolders).await?;
            step(&mut app, Message::LoadUnread).await?;
            print!("{}", app.view(Pane::Folders));
        }

        Command::Folder(op) => {
            let mut app = open_session()?;
            let (message, done) = match op {
                FolderCommand::Create { name } => {
                    let done = format!("Created folder {name}");
                    (Message::CreateFolder(name), done)
                }
                FolderCommand::Delete { name } => {
                    let done = format!("Deleted folder {name}");
                    (Message::DeleteFolder(name), done)
                }
                FolderCommand::Move { name, target } => {
                    let done = format!("Moved folder {name} to {target}");
                    (Message::MoveFolder { name, target }, done)
                }
                FolderCommand::Subscribe { name } => {
                    let done = format!("Subscribed to {name}");
                    (Message::SubscribeFolder(name), done)
                }
                FolderCommand::SubscribeAll => {
                    (Message::SubscribeAll, "Subscribed to all folders".to_string())
                }
            };
            step(&mut app, message).await?;
            println!("{done}");
            print!("{}", app.view(Pane::Folders));
        }

        Command::List { folder, page, all } => {
            let mut app = open_session()?;
            step(&mut app, Message::SelectFolder(folder)).await?;
            if all {
                step(&mut app, Message::LoadAllMessages).await?;
            } else if let Some(page) = page.filter(|p| *p > 1) {
                step(&mut app, Message::GoToPage(page - 1)).await?;
            }
            print!("{}", app.view(Pane::List));
        }

        Command::Search { key, folder } => {
            let mut app = open_session()?;
            app.open_folder(&folder);
            step(&mut app, Message::SearchExecute(key)).await?;
            print!("{}", app.view(Pane::List));
        }

        Command::Read { number, folder } => {
            let mut app = open_session()?;
            app.open_folder(&folder);
            step(&mut app, Message::ViewMessage(number)).await?;
            print!("{}", app.view(Pane::Message));
        }

        Command::Send { draft, to, subject } => {
            let mut app = open_session()?;
            step(&mut app, Message::ComposeNew).await?;
            step(&mut app, Message::ComposeToChanged(to)).await?;
            step(&mut app, Message::ComposeSubjectChanged(subject)).await?;
            compose_and_send(&mut app, draft).await?;
        }

        Command::Reply {
            number,
            folder,
            draft,
        } => {
            let mut app = open_session()?;
            app.open_folder(&folder);
            step(&mut app, Message::ComposeReply(number)).await?;
            compose_and_send(&mut app, draft).await?;
        }

        Command::Forward {
            number,
            to,
            folder,
            draft,
        } => {
            let mut app = open_session()?;
            app.open_folder(&folder);
            step(&mut app, Message::ComposeForward(number)).await?;
            step(&mut app, Message::ComposeToChanged(to)).await?;
            compose_and_send(&mut app, draft).await?;
        }

        Command::Delete { numbers, folder } => {
            let mut app = open_session()?;
            let count = numbers.len();
            app.open_folder(&folder);
            step(&mut app, Message::SetSelection(numbers)).await?;
            step(&mut app, Message::DeleteSelected).await?;
            println!(
                "Deleted {count} message(s) from {}",
                folders::display_name(&folder)
            );
        }

        Command::Archive { numbers, folder } => {
            let mut app = open_session()?;
            let count = numbers.len();
            app.open_folder(&folder);
            step(&mut app, Message::SetSelection(numbers)).await?;
            step(&mut app, Message::ArchiveSelected).await?;
            println!("Archived {count} message(s)");
        }

        Command::Move {
            numbers,
            to,
            folder,
        } => {
            let mut app = open_session()?;
            let count = numbers.len();
            app.open_folder(&folder);
            step(&mut app, Message::SetSelection(numbers)).await?;
            step(&mut app, Message::MoveSelected(to.clone())).await?;
            println!(
                "Moved {count} message(s) to {}",
                folders::display_name(&to)
            );
        }

        Command::Attachment {
            number,
            filename,
            folder,
            save,
            open,
            zoom,
        } => {
            let mut app = open_session()?;
            app.open_folder(&folder);
            step(&mut app, Message::ViewMessage(number)).await?;
            attachment(&mut app, filename, save, open, zoom).await?;
        }

        Command::Unread => {
            let mut app = open_session()?;
            step(&mut app, Message::LoadUnread).await?;
            println!("{}", app.status_message());
        }

        Command::EmptyTrash => {
            let mut app = open_session()?;
            step(&mut app, Message::EmptyTrash).await?;
            println!("{}", app.status_message());
        }

        Command::Info => {
            let mut app = open_session()?;
            step(&mut app, Message::LoadAccountInfo).await?;
            print!("{}", app.view(Pane::Account));
        }
    }
    Ok(())
}

/// Run one message to completion, failing if it recorded an error.
async fn step(app: &mut AppModel, message: Message) -> Result<(), String> {
    app.run(message).await;
    match app.last_error() {
        Some(e) => Err(e.to_string()),
        None => Ok(()),
    }
}

fn open_session() -> Result<AppModel, String> {
    let config = Config::resolve().map_err(|e| e.to_string())?;
    let session = session::resolve(&config, &config_path()).map_err(|e| e.to_string())?;
    AppModel::new(config, Some(session)).map_err(|e| e.to_string())
}

async fn login(
    user: Option<String>,
    api_url: Option<String>,
    password: Option<String>,
) -> Result<(), String> {
    let mut config = match (Config::resolve(), api_url) {
        (Ok(config), None) => config,
        (Ok(mut config), Some(url)) => {
            config.api_url = normalize_api_url(&url).map_err(|e| e.to_string())?;
            config
        }
        (Err(_), Some(url)) => Config {
            api_url: normalize_api_url(&url).map_err(|e| e.to_string())?,
            username: String::new(),
            page_size: DEFAULT_PAGE_SIZE,
            download_dir: None,
        },
        (Err(needs), None) => return Err(needs.to_string()),
    };

    let user = user
        .map(|u| session::normalize_user(&u))
        .filter(|u| !u.is_empty())
        .or_else(|| Some(config.username.clone()).filter(|u| !u.is_empty()))
        .ok_or("a user name is required (--user)")?;
    config.username = user.clone();

    let password = match password {
        Some(p) => p,
        None => prompt_password().map_err(|e| format!("reading password: {e}"))?,
    };

    let mut app = AppModel::new(config, None).map_err(|e| e.to_string())?;
    step(&mut app, Message::Login { user, password }).await?;
    println!("{}", app.status_message());
    Ok(())
}

fn prompt_password() -> std::io::Result<String> {
    let stdin = std::io::stdin();
    if stdin.is_terminal() {
        eprint!("Password: ");
        std::io::stderr().flush()?;
    }
    let mut line = String::new();
    stdin.read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Fill the open draft from the shared flags, then send it (or print it).
async fn compose_and_send(app: &mut AppModel, draft: DraftArgs) -> Result<(), String> {
    if let Some(cc) = draft.cc.clone() {
        step(app, Message::ComposeCcChanged(cc)).await?;
    }
    if let Some(bcc) = draft.bcc.clone() {
        step(app, Message::ComposeBccChanged(bcc)).await?;
    }

    let body = match draft.body.clone() {
        Some(body) => body,
        None => read_body().map_err(|e| format!("reading message body: {e}"))?,
    };
    step(app, Message::ComposeBodyChanged(body)).await?;

    for path in draft.attachment_paths() {
        step(app, Message::ComposeAttach(path)).await?;
    }

    if draft.dry_run {
        print!("{}", app.view(Pane::Draft));
        return Ok(());
    }
    step(app, Message::ComposeSend).await?;
    println!("Message sent");
    Ok(())
}

fn read_body() -> std::io::Result<String> {
    let mut stdin = std::io::stdin();
    if stdin.is_terminal() {
        eprintln!("Type the message, then Ctrl-D.");
    }
    let mut body = String::new();
    stdin.read_to_string(&mut body)?;
    Ok(body)
}

async fn attachment(
    app: &mut AppModel,
    filename: String,
    save: bool,
    open: bool,
    zoom: i32,
) -> Result<(), String> {
    if save {
        step(app, Message::SaveAttachment(filename)).await?;
        print_saved(app);
        return Ok(());
    }

    step(app, Message::PreviewAttachment(filename)).await?;
    let Some(strategy) = app.preview().map(|p| p.strategy) else {
        // Not previewable: it went straight to the download directory.
        print_saved(app);
        return Ok(());
    };

    if strategy == ViewerStrategy::InlineImage {
        let step_message = if zoom > 0 {
            Message::PreviewZoomIn
        } else {
            Message::PreviewZoomOut
        };
        for _ in 0..zoom.unsigned_abs() {
            step(app, step_message.clone()).await?;
        }
    }
    if open && strategy.is_inline() {
        step(app, Message::PreviewOpenExternal).await?;
    }
    if app.last_saved().is_some() {
        print_saved(app);
        return Ok(());
    }

    print!("{}", app.view(Pane::Preview));
    if strategy != ViewerStrategy::External && !open {
        step(app, Message::PreviewClose).await?;
    }
    Ok(())
}

fn print_saved(app: &AppModel) {
    match app.last_saved() {
        Some(path) => println!("Saved to {}", path.display()),
        None => println!("{}", app.status_message()),
    }
}
