use crate::core::attachments::{self, PreviewFile};
use crate::core::mime;
use crate::core::preview::{self, FileKind, ImageViewport, ViewerStrategy};

use super::{AppModel, Message, Task};

/// A fetched attachment waiting in the preview cache.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewState {
    pub filename: String,
    pub kind: FileKind,
    pub strategy: ViewerStrategy,
    pub mime_type: String,
    pub file: PreviewFile,
    /// Decoded (and possibly truncated) contents for the text viewer.
    pub text: Option<String>,
    pub size: usize,
    pub viewport: ImageViewport,
}

impl AppModel {
    pub(super) fn handle_preview(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::PreviewAttachment(filename) => {
                let (folder, number) = match self.attachment_source(&filename) {
                    Ok(source) => source,
                    Err(e) => {
                        self.fail("Cannot preview attachment", e);
                        return Task::none();
                    }
                };
                let kind = FileKind::classify(&filename);
                let strategy = ViewerStrategy::for_kind(kind);
                if strategy == ViewerStrategy::Download {
                    log::info!("{filename}: no viewer for this type, downloading");
                    return self.dispatch(Message::SaveAttachment(filename));
                }

                self.status_message = format!("Loading {filename}...");
                let api = self.api.clone();
                let root = self.cache_root.clone();
                return Task::future(async move {
                    let swept = attachments::sweep_stale(&root, attachments::PREVIEW_MAX_AGE).await;
                    if let Err(e) = swept {
                        log::warn!("Preview cache sweep failed: {e}");
                    }
                    let result = async {
                        let data = api.attachment(&folder, number, &filename).await?;
                        let file = PreviewFile::create(&root, &filename, &data).await?;
                        let text = (strategy == ViewerStrategy::InlineText)
                            .then(|| preview::text_content(&data));
                        Ok::<_, crate::core::error::Error>(PreviewState {
                            mime_type: preview::mime_type(&filename).to_string(),
                            filename,
                            kind,
                            strategy,
                            file,
                            text,
                            size: data.len(),
                            viewport: ImageViewport::default(),
                        })
                    }
                    .await;
                    Message::PreviewLoaded(result.map_err(|e| e.to_string()))
                });
            }

            Message::PreviewLoaded(Ok(state)) => {
                let stale = self.preview.replace(state);
                let mut tasks = Vec::new();
                if let Some(old) = stale {
                    tasks.push(remove_task(old.file));
                }
                let Some(state) = &self.preview else {
                    return Task::batch(tasks);
                };
                self.status_message = format!(
                    "Previewing {} ({}, {} bytes)",
                    state.filename,
                    state.kind.label(),
                    state.size
                );
                if state.strategy == ViewerStrategy::External {
                    tasks.push(self.dispatch(Message::PreviewOpenExternal));
                }
                return Task::batch(tasks);
            }
            Message::PreviewLoaded(Err(e)) => {
                self.fail("Preview failed", e);
            }

            Message::PreviewZoomIn => self.with_image(ImageViewport::zoom_in),
            Message::PreviewZoomOut => self.with_image(ImageViewport::zoom_out),
            Message::PreviewWheel(delta_y) => self.with_image(|v| v.wheel(delta_y)),
            Message::PreviewPan { dx, dy } => self.with_image(|v| v.pan(dx, dy)),
            Message::PreviewResetZoom => self.with_image(ImageViewport::reset),

            Message::PreviewOpenExternal => {
                let Some(state) = &self.preview else {
                    self.status_message = "Nothing to open".into();
                    return Task::none();
                };
                let path = state.file.path.clone();
                return Task::future(async move {
                    let result = tokio::task::spawn_blocking(move || mime::open_path(&path))
                        .await
                        .map_err(|e| e.to_string())
                        .and_then(|r| r.map_err(|e| e.to_string()));
                    Message::PreviewOpenComplete(result)
                });
            }
            Message::PreviewOpenComplete(Ok(())) => {
                if let Some(state) = &self.preview {
                    self.status_message =
                        format!("Opened {} in the default application", state.filename);
                }
            }
            // No application for the file: keep a copy in the downloads folder instead.
            Message::PreviewOpenComplete(Err(e)) => {
                log::warn!("External viewer failed: {e}");
                let Some(state) = &self.preview else {
                    return Task::none();
                };
                let source = state.file.path.clone();
                let filename = state.filename.clone();
                let dir = self.config.download_dir();
                self.status_message = format!("Could not open {filename}, saving instead");
                return Task::future(async move {
                    let result = async {
                        let data = tokio::fs::read(&source).await?;
                        attachments::save_to_dir(&dir, &filename, &data).await
                    }
                    .await;
                    Message::SaveAttachmentComplete(result.map_err(|e| e.to_string()))
                });
            }

            Message::PreviewClose => {
                if let Some(state) = self.preview.take() {
                    return remove_task(state.file);
                }
            }
            Message::PreviewClosed(Ok(())) => {
                self.status_message = "Preview closed".into();
            }
            Message::PreviewClosed(Err(e)) => {
                log::warn!("Failed to remove preview cache: {e}");
            }

            _ => {}
        }
        Task::none()
    }

    fn with_image(&mut self, f: impl FnOnce(&mut ImageViewport)) {
        match &mut self.preview {
            Some(state) if state.strategy == ViewerStrategy::InlineImage => {
                f(&mut state.viewport);
                self.status_message = format!("Zoom {}%", state.viewport.percent());
            }
            Some(_) => self.status_message = "Zoom only applies to images".into(),
            None => {}
        }
    }
}

fn remove_task(file: PreviewFile) -> Task<Message> {
    Task::future(async move {
        Message::PreviewClosed(file.remove().await.map_err(|e| e.to_string()))
    })
}
