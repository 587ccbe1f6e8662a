use std::fmt::Write;

use crate::app::PreviewState;
use crate::core::preview::{self, ViewerStrategy};

/// Render the preview overlay for a fetched attachment.
pub fn view(state: &PreviewState) -> String {
    let mut out = format!(
        "[{}] {} ({}, {}, {} bytes)\n",
        preview::icon(&state.filename),
        state.filename,
        state.kind.label(),
        state.mime_type,
        state.size
    );

    match state.strategy {
        ViewerStrategy::InlineText => {
            out.push('\n');
            out.push_str(state.text.as_deref().unwrap_or_default());
            out.push('\n');
        }
        ViewerStrategy::InlineImage => {
            let v = &state.viewport;
            let _ = writeln!(
                out,
                "Zoom {}%  pan ({:.0}, {:.0})",
                v.percent(),
                v.pan_x,
                v.pan_y
            );
            let _ = writeln!(out, "Image at {}", state.file.path.display());
        }
        ViewerStrategy::External => {
            let _ = writeln!(out, "Opened externally from {}", state.file.path.display());
        }
        ViewerStrategy::Download => {
            let _ = writeln!(out, "{}", preview::description(&state.filename));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::core::attachments::PreviewFile;
    use crate::core::preview::{FileKind, ImageViewport};

    fn state(name: &str, strategy: ViewerStrategy, text: Option<&str>) -> PreviewState {
        PreviewState {
            filename: name.into(),
            kind: FileKind::classify(name),
            strategy,
            mime_type: preview::mime_type(name).into(),
            file: PreviewFile {
                dir: PathBuf::from("/tmp/p"),
                path: PathBuf::from("/tmp/p").join(name),
            },
            text: text.map(str::to_string),
            size: 11,
            viewport: ImageViewport::default(),
        }
    }

    #[test]
    fn text_is_shown_inline() {
        let out = view(&state("notes.txt", ViewerStrategy::InlineText, Some("hello world")));
        assert_eq!(
            out,
            "[document-text-outline] notes.txt (text, text/plain, 11 bytes)\n\nhello world\n"
        );
    }

    #[test]
    fn image_reports_viewport() {
        let mut s = state("pic.png", ViewerStrategy::InlineImage, None);
        s.viewport.zoom_in();
        s.viewport.pan(12.0, -6.0);
        let out = view(&s);
        assert!(out.starts_with("[image-outline] pic.png (image, image/png, 11 bytes)\n"));
        assert!(out.contains("Zoom 120%  pan (10, -5)\n"));
        assert!(out.ends_with("Image at /tmp/p/pic.png\n"));
    }
}
