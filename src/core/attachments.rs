use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use uuid::Uuid;

use super::error::Result;
use super::models::AttachmentData;
use super::preview;

/// Longest file name most filesystems accept, in bytes.
const MAX_FILENAME: usize = 255;
/// Kept free for the " (n)" that `unique_path` may append.
const SUFFIX_ROOM: usize = 8;
const PREVIEW_PREFIX: &str = "preview-";
/// Preview directories older than this are left over from earlier runs.
pub const PREVIEW_MAX_AGE: Duration = Duration::from_secs(24 * 60 * 60);

/// Make an attachment name safe to use as a single path component.
pub fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .split(['/', '\\', '\0'])
        .flat_map(str::chars)
        .filter(|c| !c.is_control())
        .collect();
    let cleaned = cleaned.trim_start_matches('.').trim();
    if cleaned.is_empty() {
        return "attachment".to_string();
    }
    fit_name(cleaned, MAX_FILENAME - SUFFIX_ROOM)
}

/// Shorten `name` to `budget` bytes, cutting the stem so the extension survives.
fn fit_name(name: &str, budget: usize) -> String {
    if name.len() <= budget {
        return name.to_string();
    }
    let (stem, ext) = match name.rfind('.') {
        Some(idx) if idx > 0 && name.len() - idx <= budget / 2 => (&name[..idx], &name[idx..]),
        _ => (name, ""),
    };
    format!("{}{ext}", prefix_within(stem, budget - ext.len()))
}

/// The longest prefix of `s` that fits in `max` bytes without splitting a character.
fn prefix_within(s: &str, max: usize) -> &str {
    let end = s
        .char_indices()
        .map(|(i, c)| i + c.len_utf8())
        .take_while(|end| *end <= max)
        .last()
        .unwrap_or(0);
    &s[..end]
}

/// Write into `dir`, adding " (n)" before the extension instead of overwriting.
pub async fn save_to_dir(dir: &Path, filename: &str, data: &[u8]) -> Result<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;
    let path = unique_path(dir, &sanitize_filename(filename));
    tokio::fs::write(&path, data).await?;
    log::info!("Saved {} bytes to {}", data.len(), path.display());
    Ok(path)
}

fn unique_path(dir: &Path, name: &str) -> PathBuf {
    let first = dir.join(name);
    if !first.exists() {
        return first;
    }
    let (stem, ext) = match name.rfind('.') {
        Some(idx) if idx > 0 => (&name[..idx], &name[idx..]),
        _ => (name, ""),
    };
    (1..)
        .map(|n| dir.join(format!("{stem} ({n}){ext}")))
        .find(|p| !p.exists())
        .unwrap_or(first)
}

/// A fetched attachment written to its own scratch directory for viewing.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewFile {
    pub dir: PathBuf,
    pub path: PathBuf,
}

impl PreviewFile {
    pub fn cache_root() -> PathBuf {
        dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("webmail")
    }

    pub async fn create(root: &Path, filename: &str, data: &[u8]) -> Result<Self> {
        let dir = root.join(format!("{PREVIEW_PREFIX}{}", Uuid::new_v4()));
        tokio::fs::create_dir_all(&dir).await?;
        let path = dir.join(sanitize_filename(filename));
        tokio::fs::write(&path, data).await?;
        log::debug!("Preview cached at {}", path.display());
        Ok(PreviewFile { dir, path })
    }

    pub async fn remove(&self) -> Result<()> {
        match tokio::fs::remove_dir_all(&self.dir).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Delete preview directories under `root` last modified more than `max_age` ago.
/// Returns how many were removed.
pub async fn sweep_stale(root: &Path, max_age: Duration) -> Result<usize> {
    let mut entries = match tokio::fs::read_dir(root).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e.into()),
    };
    let now = SystemTime::now();
    let mut removed = 0;
    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_name().to_string_lossy().starts_with(PREVIEW_PREFIX) {
            continue;
        }
        let meta = entry.metadata().await?;
        let age = meta
            .modified()
            .ok()
            .and_then(|m| now.duration_since(m).ok())
            .unwrap_or_default();
        if meta.is_dir() && age > max_age {
            match tokio::fs::remove_dir_all(entry.path()).await {
                Ok(()) => removed += 1,
                Err(e) => log::warn!("Failed to remove {}: {e}", entry.path().display()),
            }
        }
    }
    if removed > 0 {
        log::debug!("Removed {removed} stale preview dir(s) from {}", root.display());
    }
    Ok(removed)
}

/// Accept a plain path or a `file://` URI for an attachment argument.
pub fn resolve_path_arg(arg: &str) -> PathBuf {
    let arg = arg.trim();
    if arg.starts_with("file://") {
        if let Some(path) = url::Url::parse(arg).ok().and_then(|u| u.to_file_path().ok()) {
            return path;
        }
    }
    PathBuf::from(arg)
}

/// Read a local file for upload, guessing the content type from its name.
pub async fn read_for_upload(path: &Path) -> std::result::Result<AttachmentData, String> {
    let data = tokio::fs::read(path)
        .await
        .map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "attachment".to_string());
    let mime_type = preview::mime_type(&filename).to_string();
    Ok(AttachmentData {
        filename,
        mime_type,
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filenames_lose_separators_and_leading_dots() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "etcpasswd");
        assert_eq!(sanitize_filename("a\\b\0c.txt"), "abc.txt");
        assert_eq!(sanitize_filename("bad\nname.pdf"), "badname.pdf");
        assert_eq!(sanitize_filename("...hidden"), "hidden");
        assert_eq!(sanitize_filename(" / "), "attachment");
    }

    #[test]
    fn long_names_leave_room_for_a_counter() {
        let plain = sanitize_filename(&"x".repeat(400));
        assert_eq!(plain.len(), MAX_FILENAME - SUFFIX_ROOM);

        let with_ext = sanitize_filename(&format!("{}.pdf", "r".repeat(400)));
        assert_eq!(with_ext.len(), MAX_FILENAME - SUFFIX_ROOM);
        assert!(with_ext.ends_with("r.pdf"));

        // Three bytes per character: the cut lands between characters.
        let wide = sanitize_filename(&"\u{20ac}".repeat(200));
        assert!(wide.len() <= MAX_FILENAME - SUFFIX_ROOM);
        assert_eq!(wide.len() % 3, 0);
        assert!(format!("{wide} (12)").len() <= MAX_FILENAME);
    }

    #[test]
    fn file_uris_resolve_to_paths() {
        assert_eq!(
            resolve_path_arg("file:///tmp/report%20q3.pdf"),
            PathBuf::from("/tmp/report q3.pdf")
        );
        assert_eq!(resolve_path_arg("notes.txt"), PathBuf::from("notes.txt"));
    }

    #[tokio::test]
    async fn save_does_not_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let a = save_to_dir(dir.path(), "report.pdf", b"one").await.unwrap();
        let b = save_to_dir(dir.path(), "report.pdf", b"two").await.unwrap();
        assert_eq!(a, dir.path().join("report.pdf"));
        assert_eq!(b, dir.path().join("report (1).pdf"));
        assert_eq!(std::fs::read(&a).unwrap(), b"one");
        assert_eq!(std::fs::read(&b).unwrap(), b"two");
    }

    #[tokio::test]
    async fn preview_dir_is_removed() {
        let root = tempfile::tempdir().unwrap();
        let file = PreviewFile::create(root.path(), "../pic.png", b"png")
            .await
            .unwrap();
        assert!(file.path.starts_with(root.path()));
        assert_eq!(file.path.file_name().unwrap(), "pic.png");
        assert!(file.path.exists());

        file.remove().await.unwrap();
        assert!(!file.dir.exists());
        file.remove().await.unwrap();
    }

    #[tokio::test]
    async fn sweep_removes_only_old_preview_dirs() {
        let root = tempfile::tempdir().unwrap();
        let old = PreviewFile::create(root.path(), "old.txt", b"a").await.unwrap();
        let fresh = PreviewFile::create(root.path(), "new.txt", b"b").await.unwrap();
        let other = root.path().join("keep");
        std::fs::create_dir(&other).unwrap();
        let two_days = SystemTime::now() - Duration::from_secs(2 * 24 * 60 * 60);
        for dir in [&old.dir, &other] {
            std::fs::File::open(dir).unwrap().set_modified(two_days).unwrap();
        }

        assert_eq!(sweep_stale(root.path(), PREVIEW_MAX_AGE).await.unwrap(), 1);
        assert!(!old.dir.exists());
        assert!(fresh.path.exists());
        assert!(other.exists());

        let missing = root.path().join("nope");
        assert_eq!(sweep_stale(&missing, PREVIEW_MAX_AGE).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn upload_reads_name_and_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        std::fs::write(&path, b"{}").unwrap();
        let att = read_for_upload(&path).await.unwrap();
        assert_eq!(att.filename, "data.json");
        assert_eq!(att.mime_type, "application/json");
        assert_eq!(att.data, b"{}");

        let err = read_for_upload(&dir.path().join("missing.txt")).await.unwrap_err();
        assert!(err.starts_with("Failed to read"));
    }
}
