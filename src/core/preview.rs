//! File-type dispatch for attachment previews.
//!
//! Everything keys off the lower-cased extension: a file gets one [`FileKind`],
//! and each kind maps to exactly one [`ViewerStrategy`].

pub const TEXT_PREVIEW_LIMIT: usize = 10_000;
const TRUNCATED_SUFFIX: &str = "\n\n... (content truncated)";

pub const MIN_ZOOM: f32 = 0.1;
pub const MAX_ZOOM: f32 = 5.0;
const WHEEL_STEP: f32 = 0.1;
const BUTTON_STEP: f32 = 0.2;

const DEFAULT_DESCRIPTION: &str =
    "This file type cannot be previewed directly. Download to open with appropriate application.";

/// Lower-cased text after the last dot, or None when the name has no dot.
pub fn extension(name: &str) -> Option<String> {
    let idx = name.rfind('.')?;
    Some(name[idx + 1..].to_lowercase())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Image,
    Pdf,
    Video,
    Audio,
    Document,
    Text,
    Other,
}

impl FileKind {
    pub fn classify(name: &str) -> Self {
        let Some(ext) = extension(name) else {
            return FileKind::Other;
        };
        match ext.as_str() {
            "jpg" | "jpeg" | "png" | "gif" | "bmp" | "webp" | "svg" | "ico" | "tiff" | "tif"
            | "heic" | "heif" | "avif" | "jxl" | "raw" | "cr2" | "nef" | "arw" => FileKind::Image,
            "pdf" => FileKind::Pdf,
            "mp4" | "avi" | "mov" | "wmv" | "flv" | "webm" | "mkv" | "m4v" | "3gp" | "ogv" => {
                FileKind::Video
            }
            "mp3" | "wav" | "flac" | "aac" | "ogg" | "wma" | "m4a" | "opus" | "amr" => {
                FileKind::Audio
            }
            "doc" | "docx" | "odt" | "xls" | "xlsx" | "ods" | "ppt" | "pptx" | "odp" => {
                FileKind::Document
            }
            e if is_text_extension(e) => FileKind::Text,
            _ => FileKind::Other,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FileKind::Image => "image",
            FileKind::Pdf => "PDF",
            FileKind::Video => "video",
            FileKind::Audio => "audio",
            FileKind::Document => "document",
            FileKind::Text => "text",
            FileKind::Other => "file",
        }
    }
}

fn is_text_extension(ext: &str) -> bool {
    matches!(
        ext,
        // prose
        "txt" | "md" | "markdown" | "rst" | "tex" | "rtf"
        // web & data
        | "js" | "ts" | "jsx" | "tsx" | "html" | "htm" | "css" | "scss" | "sass" | "less"
        | "xml" | "json" | "yaml" | "yml" | "toml" | "ini" | "cfg" | "conf" | "config"
        // source
        | "py" | "pyw" | "java" | "c" | "cpp" | "cc" | "cxx" | "h" | "hpp" | "cs" | "php"
        | "rb" | "go" | "rs" | "swift" | "kt" | "scala" | "pl" | "sh" | "bash" | "zsh"
        | "ps1" | "bat" | "cmd" | "sql" | "r" | "m" | "matlab" | "dart" | "lua" | "vbs"
        // logs & tables
        | "csv" | "tsv" | "log" | "out" | "err" | "debug" | "trace"
        // dot-files and project metadata
        | "readme" | "license" | "changelog" | "version" | "gitignore" | "gitattributes"
        | "sitemap" | "robots" | "htaccess" | "htpasswd" | "manifest" | "webmanifest"
        | "env" | "dockerfile" | "dockerignore" | "gitmodules" | "editorconfig"
    )
}

/// MIME type guessed from the file name.
pub fn mime_type(name: &str) -> &'static str {
    match extension(name).as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("bmp") => "image/bmp",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        Some("pdf") => "application/pdf",
        Some("mp4") => "video/mp4",
        Some("avi") => "video/x-msvideo",
        Some("mov") => "video/quicktime",
        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/wav",
        Some("flac") => "audio/flac",
        Some("txt") => "text/plain",
        Some("html" | "htm") => "text/html",
        Some("css") => "text/css",
        Some("js") => "application/javascript",
        Some("json") => "application/json",
        Some("xml") => "application/xml",
        _ => "application/octet-stream",
    }
}

/// Icon name for list rows and the preview header.
pub fn icon(name: &str) -> &'static str {
    let Some(ext) = extension(name) else {
        return "document-outline";
    };
    match ext.as_str() {
        "pdf" => "document-text-outline",
        "doc" | "docx" | "odt" | "rtf" => "document-outline",
        "xls" | "xlsx" | "ods" | "csv" => "grid-outline",
        "ppt" | "pptx" | "odp" => "easel-outline",
        "zip" | "rar" | "7z" | "tar" | "gz" | "bz2" | "xz" => "archive-outline",
        "mp3" | "wav" | "flac" | "aac" | "ogg" | "wma" | "m4a" => "musical-notes-outline",
        "mp4" | "avi" | "mov" | "wmv" | "flv" | "webm" | "mkv" | "m4v" => "videocam-outline",
        "jpg" | "jpeg" | "png" | "gif" | "bmp" | "webp" | "svg" | "ico" | "tiff" | "tif" => {
            "image-outline"
        }
        "js" | "ts" | "jsx" | "tsx" | "html" | "htm" | "css" | "scss" | "sass" | "less" | "xml"
        | "json" | "yaml" | "yml" => "code-slash-outline",
        "py" | "java" | "c" | "cpp" | "cc" | "cxx" | "cs" | "php" | "rb" | "go" | "rs"
        | "swift" | "kt" | "scala" => "code-outline",
        "sh" | "bash" | "zsh" | "ps1" | "bat" | "cmd" => "terminal-outline",
        "sql" => "server-outline",
        "tsv" | "log" | "out" | "err" => "analytics-outline",
        "ini" | "cfg" | "conf" | "config" | "env" | "gitignore" | "dockerfile" => {
            "settings-outline"
        }
        "txt" | "md" | "markdown" | "readme" | "license" => "document-text-outline",
        _ => "document-outline",
    }
}

/// Hint shown when the file can't be rendered in the terminal.
pub fn description(name: &str) -> &'static str {
    let Some(ext) = extension(name) else {
        return DEFAULT_DESCRIPTION;
    };
    match ext.as_str() {
        "doc" | "docx" | "odt" => {
            "Microsoft Word document. Open with Word or compatible application."
        }
        "xls" | "xlsx" | "ods" => "Spreadsheet file. Open with Excel or compatible application.",
        "ppt" | "pptx" | "odp" => {
            "Presentation file. Open with PowerPoint or compatible application."
        }
        "zip" | "rar" | "7z" | "tar" | "gz" => "Compressed archive file. Extract to view contents.",
        "mp3" | "wav" | "flac" | "aac" | "ogg" => "Audio file. Play with media player application.",
        "mp4" | "avi" | "mov" | "wmv" | "flv" | "webm" | "mkv" => {
            "Video file. Play with media player application."
        }
        "exe" | "msi" | "dmg" | "pkg" | "deb" | "rpm" => {
            "Executable file. Run with appropriate permissions."
        }
        "db" | "sqlite" | "mdb" | "accdb" => {
            "Database file. Open with database management application."
        }
        "dwg" | "dxf" | "skp" | "blend" | "max" | "ma" | "mb" => {
            "CAD/Design file. Open with specialized design software."
        }
        "ttf" | "otf" | "woff" | "woff2" | "eot" => "Font file. Install to use in applications.",
        "obj" | "fbx" | "dae" | "3ds" | "stl" => "3D model file. Open with 3D modeling software.",
        "shp" | "kml" | "kmz" | "gpx" => {
            "Geographic data file. Open with GIS or mapping application."
        }
        "vmdk" | "vdi" | "vhd" | "ova" | "ovf" => {
            "Virtual machine file. Open with virtualization software."
        }
        "iso" | "img" => "Disk image file. Mount or burn to media.",
        _ => DEFAULT_DESCRIPTION,
    }
}

/// How a fetched attachment is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerStrategy {
    InlineImage,
    InlineText,
    /// Hand off to the system's default application, saving on failure.
    External,
    Download,
}

impl ViewerStrategy {
    pub fn for_kind(kind: FileKind) -> Self {
        match kind {
            FileKind::Image => ViewerStrategy::InlineImage,
            FileKind::Text => ViewerStrategy::InlineText,
            FileKind::Pdf | FileKind::Document | FileKind::Audio | FileKind::Video => {
                ViewerStrategy::External
            }
            FileKind::Other => ViewerStrategy::Download,
        }
    }

    pub fn is_inline(self) -> bool {
        matches!(self, ViewerStrategy::InlineImage | ViewerStrategy::InlineText)
    }
}

/// Decode bytes as text for the inline viewer, cutting very long files.
pub fn text_content(data: &[u8]) -> String {
    truncate_text(&String::from_utf8_lossy(data))
}

pub fn truncate_text(text: &str) -> String {
    match text.char_indices().nth(TEXT_PREVIEW_LIMIT) {
        Some((cut, _)) => format!("{}{TRUNCATED_SUFFIX}", &text[..cut]),
        None => text.to_string(),
    }
}

/// Zoom and pan state of the inline image viewer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageViewport {
    pub zoom: f32,
    pub pan_x: f32,
    pub pan_y: f32,
}

impl Default for ImageViewport {
    fn default() -> Self {
        ImageViewport {
            zoom: 1.0,
            pan_x: 0.0,
            pan_y: 0.0,
        }
    }
}

impl ImageViewport {
    /// Scroll wheel: positive delta (scrolling down) zooms out.
    pub fn wheel(&mut self, delta_y: f32) {
        let step = if delta_y > 0.0 { -WHEEL_STEP } else { WHEEL_STEP };
        self.set_zoom(self.zoom + step);
    }

    pub fn zoom_in(&mut self) {
        self.set_zoom(self.zoom + BUTTON_STEP);
    }

    pub fn zoom_out(&mut self) {
        self.set_zoom(self.zoom - BUTTON_STEP);
    }

    pub fn pan(&mut self, dx: f32, dy: f32) {
        self.pan_x += dx / self.zoom;
        self.pan_y += dy / self.zoom;
    }

    pub fn reset(&mut self) {
        *self = ImageViewport::default();
    }

    pub fn percent(&self) -> u32 {
        (self.zoom * 100.0).round() as u32
    }

    fn set_zoom(&mut self, z: f32) {
        self.zoom = z.clamp(MIN_ZOOM, MAX_ZOOM);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_is_last_segment_lowercased() {
        assert_eq!(extension("Report.Final.PDF").as_deref(), Some("pdf"));
        assert_eq!(extension(".gitignore").as_deref(), Some("gitignore"));
        assert_eq!(extension("Makefile"), None);
        assert_eq!(extension("trailing."), Some(String::new()));
    }

    #[test]
    fn every_kind_has_one_strategy() {
        let cases = [
            ("photo.JPG", FileKind::Image, ViewerStrategy::InlineImage),
            ("scan.heic", FileKind::Image, ViewerStrategy::InlineImage),
            ("invoice.pdf", FileKind::Pdf, ViewerStrategy::External),
            ("clip.mkv", FileKind::Video, ViewerStrategy::External),
            ("voice.opus", FileKind::Audio, ViewerStrategy::External),
            ("budget.xlsx", FileKind::Document, ViewerStrategy::External),
            ("main.rs", FileKind::Text, ViewerStrategy::InlineText),
            ("server.log", FileKind::Text, ViewerStrategy::InlineText),
            (".env", FileKind::Text, ViewerStrategy::InlineText),
            ("archive.zip", FileKind::Other, ViewerStrategy::Download),
            ("README", FileKind::Other, ViewerStrategy::Download),
        ];
        for (name, kind, strategy) in cases {
            assert_eq!(FileKind::classify(name), kind, "{name}");
            assert_eq!(ViewerStrategy::for_kind(FileKind::classify(name)), strategy, "{name}");
        }
    }

    #[test]
    fn mime_defaults_to_octet_stream() {
        assert_eq!(mime_type("a.jpeg"), "image/jpeg");
        assert_eq!(mime_type("page.HTM"), "text/html");
        assert_eq!(mime_type("data.bin"), "application/octet-stream");
        assert_eq!(mime_type("noext"), "application/octet-stream");
    }

    #[test]
    fn icons_and_descriptions() {
        assert_eq!(icon("notes"), "document-outline");
        assert_eq!(icon("table.csv"), "grid-outline");
        assert_eq!(icon("run.sh"), "terminal-outline");
        assert_eq!(icon("q.sql"), "server-outline");
        assert_eq!(icon("weird.xyz"), "document-outline");

        assert!(description("font.woff2").starts_with("Font file"));
        assert!(description("disk.iso").starts_with("Disk image"));
        assert!(description("setup.dmg").starts_with("Executable"));
        assert_eq!(description("blob"), DEFAULT_DESCRIPTION);
    }

    #[test]
    fn long_text_is_truncated_on_char_boundary() {
        let short = "héllo";
        assert_eq!(truncate_text(short), short);

        let long = "é".repeat(TEXT_PREVIEW_LIMIT + 5);
        let cut = truncate_text(&long);
        assert!(cut.ends_with("... (content truncated)"));
        assert_eq!(
            cut.chars().count(),
            TEXT_PREVIEW_LIMIT + TRUNCATED_SUFFIX.chars().count()
        );

        let exact = "x".repeat(TEXT_PREVIEW_LIMIT);
        assert_eq!(truncate_text(&exact), exact);
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        assert_eq!(text_content(b"ok \xff"), "ok \u{fffd}");
    }

    #[test]
    fn viewport_zoom_is_clamped() {
        let mut v = ImageViewport::default();
        for _ in 0..50 {
            v.zoom_in();
        }
        assert_eq!(v.zoom, MAX_ZOOM);
        for _ in 0..100 {
            v.wheel(1.0);
        }
        assert_eq!(v.zoom, MIN_ZOOM);
        v.reset();
        v.wheel(-3.0);
        assert!((v.zoom - 1.1).abs() < 1e-6);
    }

    #[test]
    fn pan_scales_with_zoom() {
        let mut v = ImageViewport::default();
        v.zoom_in();
        v.zoom_in();
        v.zoom_in();
        v.zoom_in();
        v.zoom_in();
        assert!((v.zoom - 2.0).abs() < 1e-5);
        v.pan(10.0, -4.0);
        assert!((v.pan_x - 5.0).abs() < 1e-4);
        assert!((v.pan_y + 2.0).abs() < 1e-4);
        v.reset();
        assert_eq!(v, ImageViewport::default());
        assert_eq!(v.percent(), 100);
    }
}
