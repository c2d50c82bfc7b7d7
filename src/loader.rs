//! # Loader Module
//!
//! Resolves the requested path and produces the markdown to display. Loading
//! never fails: a missing or unreadable file turns into a placeholder document.

use crate::args::USAGE;
use anyhow::Context;
use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

const APP_NAME: &str = "Markdown Viewer";
const USAGE_FILE: &str = "usage.md";

/// Where the displayed markdown came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    File,
    Usage,
    NotFound,
    Error,
}

/// Markdown ready for display, plus what the window needs to describe it.
#[derive(Debug, Clone)]
pub struct LoadedDocument {
    pub title: String,
    pub markdown: String,
    /// The file the markdown was read from. `None` for placeholders and the
    /// built-in usage text.
    pub source: Option<PathBuf>,
    pub kind: DocumentKind,
}

impl LoadedDocument {
    fn placeholder(kind: DocumentKind, suffix: &str, markdown: String) -> Self {
        Self {
            title: format!("{APP_NAME} - {suffix}"),
            markdown,
            source: None,
            kind,
        }
    }
}

/// Finds the file to open, retrying with `.md` appended.
pub fn resolve_path(requested: &Path) -> Option<PathBuf> {
    if requested.is_file() {
        return Some(requested.to_path_buf());
    }

    let has_md_suffix = requested
        .to_str()
        .is_some_and(|path| path.to_ascii_lowercase().ends_with(".md"));
    if has_md_suffix {
        return None;
    }

    let mut with_suffix = OsString::from(requested.as_os_str());
    with_suffix.push(".md");
    let with_suffix = PathBuf::from(with_suffix);
    with_suffix.is_file().then_some(with_suffix)
}

/// Loads the requested file, or the usage document when nothing was requested.
pub fn load(requested: Option<&Path>) -> LoadedDocument {
    match requested {
        Some(path) => load_file(path),
        None => load_usage(bundled_usage_path().as_deref()),
    }
}

/// Loads a markdown file, falling back to placeholder documents.
pub fn load_file(requested: &Path) -> LoadedDocument {
    let Some(path) = resolve_path(requested) else {
        log::warn!("file not found: {}", requested.display());
        return LoadedDocument::placeholder(
            DocumentKind::NotFound,
            "File Not Found",
            format!(
                "# File not found\n\nThe file `{}` could not be found.",
                requested.display()
            ),
        );
    };
    file_document(path)
}

/// Reads a resolved path into a document, or the error placeholder.
fn file_document(path: PathBuf) -> LoadedDocument {
    match read(&path) {
        Ok(markdown) => {
            log::info!("loaded {} ({} bytes)", path.display(), markdown.len());
            let name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            LoadedDocument {
                title: format!("{APP_NAME} - {name}"),
                markdown,
                source: Some(path),
                kind: DocumentKind::File,
            }
        }
        Err(e) => {
            log::warn!("{e:#}");
            LoadedDocument::placeholder(
                DocumentKind::Error,
                "Error",
                error_markdown("Error loading file", &e),
            )
        }
    }
}

/// Loads `usage` if it exists, else the built-in usage text.
pub fn load_usage(usage: Option<&Path>) -> LoadedDocument {
    let markdown = match usage.filter(|path| path.exists()) {
        Some(path) => match read(path) {
            Ok(markdown) => markdown,
            Err(e) => {
                log::warn!("{e:#}");
                return LoadedDocument::placeholder(
                    DocumentKind::Error,
                    "Error",
                    error_markdown("Error loading usage file", &e),
                );
            }
        },
        None => USAGE.to_string(),
    };
    LoadedDocument::placeholder(DocumentKind::Usage, "Usage", markdown)
}

/// Reads a markdown file, normalising Windows line endings. A leading
/// byte-order mark is dropped and invalid UTF-8 is replaced, not rejected.
pub fn read(path: &Path) -> anyhow::Result<String> {
    let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let text = String::from_utf8_lossy(&bytes);
    let text = text.strip_prefix('\u{feff}').unwrap_or(&*text);
    Ok(text.replace("\r\n", "\n"))
}

/// `usage.md` next to the running executable.
fn bundled_usage_path() -> Option<PathBuf> {
    let exe = env::current_exe().ok()?;
    Some(exe.parent()?.join(USAGE_FILE))
}

fn error_markdown(heading: &str, error: &anyhow::Error) -> String {
    format!("# {heading}\n\n```\n{error:#}\n```")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{self, Block};
    use crate::html::{CmarkConverter, MarkdownConverter};
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_resolve_existing_path() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "readme.txt", "hi");
        assert_eq!(resolve_path(&path), Some(path));
    }

    #[test]
    fn test_resolve_appends_md_suffix() {
        let dir = TempDir::new().unwrap();
        let notes = write(&dir, "notes.md", "# Notes");
        assert_eq!(resolve_path(&dir.path().join("notes")), Some(notes));
    }

    #[test]
    fn test_resolve_does_not_double_suffix() {
        let dir = TempDir::new().unwrap();
        write(&dir, "draft.MD.md", "# Draft");
        assert_eq!(resolve_path(&dir.path().join("draft.MD")), None);
    }

    #[test]
    fn test_resolve_missing_file() {
        let dir = TempDir::new().unwrap();
        assert_eq!(resolve_path(&dir.path().join("nothing")), None);
    }

    #[test]
    fn test_load_file_reads_content_and_title() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "guide.md", "# Guide\r\n\r\nBody\r\n");
        let doc = load_file(&dir.path().join("guide"));
        assert_eq!(doc.kind, DocumentKind::File);
        assert_eq!(doc.title, "Markdown Viewer - guide.md");
        assert_eq!(doc.markdown, "# Guide\n\nBody\n");
        assert_eq!(doc.source, Some(path));
    }

    #[test]
    fn test_load_missing_file_gives_placeholder() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.md");
        let doc = load_file(&missing);
        assert_eq!(doc.kind, DocumentKind::NotFound);
        assert_eq!(doc.title, "Markdown Viewer - File Not Found");
        assert!(doc.markdown.starts_with("# File not found"));
        assert!(doc.markdown.contains(&missing.display().to_string()));
        assert_eq!(doc.source, None);
    }

    #[test]
    fn test_load_file_strips_bom() {
        let dir = TempDir::new().unwrap();
        write(&dir, "bom.md", "\u{feff}# Title\r\n\r\nBody\r\n");
        let doc = load_file(&dir.path().join("bom.md"));
        assert_eq!(doc.kind, DocumentKind::File);
        assert_eq!(doc.markdown, "# Title\n\nBody\n");

        let html = CmarkConverter::default().to_html(&doc.markdown);
        assert_eq!(
            document::build(&html)[0],
            Block::Heading {
                level: 1,
                text: "Title".to_string()
            }
        );
    }

    #[test]
    fn test_load_file_decodes_invalid_utf8_lossily() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("latin1.md");
        fs::write(&path, b"# Caf\xe9 notes\n\nBody text\n").unwrap();
        let doc = load_file(&path);
        assert_eq!(doc.kind, DocumentKind::File);
        assert_eq!(doc.markdown, "# Caf\u{fffd} notes\n\nBody text\n");
    }

    #[test]
    fn test_read_directory_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("folder.md");
        fs::create_dir(&path).unwrap();
        let err = read(&path).unwrap_err();
        assert!(format!("{err:#}").contains("failed to read"));
    }

    #[test]
    fn test_unreadable_file_gives_error_placeholder() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("folder.md");
        fs::create_dir(&path).unwrap();
        let doc = file_document(path);
        assert_eq!(doc.kind, DocumentKind::Error);
        assert_eq!(doc.title, "Markdown Viewer - Error");
        assert!(doc.markdown.starts_with("# Error loading file\n\n```\n"));
        assert!(doc.markdown.contains("failed to read"));
        assert_eq!(doc.source, None);
    }

    #[test]
    fn test_usage_prefers_bundled_file() {
        let dir = TempDir::new().unwrap();
        let usage = write(&dir, "usage.md", "# Custom usage");
        let doc = load_usage(Some(&usage));
        assert_eq!(doc.kind, DocumentKind::Usage);
        assert_eq!(doc.title, "Markdown Viewer - Usage");
        assert_eq!(doc.markdown, "# Custom usage");
    }

    #[test]
    fn test_unreadable_usage_file_gives_error_placeholder() {
        let dir = TempDir::new().unwrap();
        let usage = dir.path().join("usage.md");
        fs::create_dir(&usage).unwrap();
        let doc = load_usage(Some(&usage));
        assert_eq!(doc.kind, DocumentKind::Error);
        assert_eq!(doc.title, "Markdown Viewer - Error");
        assert!(doc
            .markdown
            .starts_with("# Error loading usage file\n\n```\n"));
    }

    #[test]
    fn test_usage_falls_back_to_builtin_text() {
        let dir = TempDir::new().unwrap();
        let doc = load_usage(Some(&dir.path().join("usage.md")));
        assert_eq!(doc.markdown, USAGE);
        assert_eq!(load_usage(None).markdown, USAGE);
    }
}
