//! # Viewer Module
//!
//! The toolkit-independent half of the window: the loaded document, its
//! render tree, the browser/fullscreen toggles, transient messages and the
//! temporary pages handed to the browser.

use crate::args::Args;
use crate::document::{self, Block};
use crate::html::{self, MarkdownConverter};
use crate::launcher::Launcher;
use crate::loader::{self, LoadedDocument};
use anyhow::Context;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tempfile::TempPath;

/// How long the fullscreen hint stays up.
pub const HINT_DURATION: Duration = Duration::from_secs(3);
/// How long a status message stays up.
pub const STATUS_DURATION: Duration = Duration::from_secs(4);

/// Clipboard formats offered by the copy shortcuts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyFormat {
    PlainText,
    /// Currently the same text as [`CopyFormat::PlainText`].
    RichText,
    Html,
    Markdown,
}

/// What pressing Escape did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscapeOutcome {
    LeftFullscreen,
    Quit,
}

struct StatusMessage {
    text: String,
    until: Instant,
}

pub struct Viewer {
    converter: Box<dyn MarkdownConverter>,
    launcher: Box<dyn Launcher>,
    document: LoadedDocument,
    /// Path as the user gave it, so a reload can find a file created later.
    requested: Option<PathBuf>,
    blocks: Vec<Block>,
    browser_mode: bool,
    fullscreen: bool,
    hint_until: Option<Instant>,
    status: Option<StatusMessage>,
    /// Pages written for the browser; deleted when the viewer is dropped.
    temp_pages: Vec<TempPath>,
}

impl Viewer {
    /// Creates a viewer for the given arguments and loads the requested file.
    pub fn new(
        args: &Args,
        converter: Box<dyn MarkdownConverter>,
        launcher: Box<dyn Launcher>,
        now: Instant,
    ) -> Self {
        let requested = args.file.as_ref().map(PathBuf::from);
        let document = loader::load(requested.as_deref());
        let mut viewer = Self::with_document(document, args, converter, launcher, now);
        viewer.requested = requested;
        viewer
    }

    /// Creates a viewer around an already loaded document.
    pub fn with_document(
        document: LoadedDocument,
        args: &Args,
        converter: Box<dyn MarkdownConverter>,
        launcher: Box<dyn Launcher>,
        now: Instant,
    ) -> Self {
        let mut viewer = Self {
            converter,
            launcher,
            requested: document.source.clone(),
            document,
            blocks: Vec::new(),
            browser_mode: args.browser,
            fullscreen: args.fullscreen,
            hint_until: args.fullscreen.then(|| now + HINT_DURATION),
            status: None,
            temp_pages: Vec::new(),
        };
        viewer.show_document(now);
        viewer
    }

    pub fn document(&self) -> &LoadedDocument {
        &self.document
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn is_browser_mode(&self) -> bool {
        self.browser_mode
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    #[cfg(test)]
    pub fn temp_page_count(&self) -> usize {
        self.temp_pages.len()
    }

    /// Replaces the current document with `path`.
    pub fn open(&mut self, path: &Path, now: Instant) {
        self.document = loader::load_file(path);
        self.requested = Some(path.to_path_buf());
        self.show_document(now);
    }

    /// Reads the requested file again. The usage document is re-rendered.
    pub fn reload(&mut self, now: Instant) {
        if let Some(path) = self.requested.clone() {
            self.open(&path, now);
        } else {
            self.show_document(now);
        }
        self.set_status("Reloaded", now);
    }

    /// Rebuilds the render tree and, in browser mode, reopens the page.
    fn show_document(&mut self, now: Instant) {
        let html = self.converter.to_html(&self.document.markdown);
        self.blocks = document::build(&html);
        if self.browser_mode {
            self.open_page(&html, now);
        }
    }

    pub fn toggle_browser_mode(&mut self, now: Instant) {
        self.browser_mode = !self.browser_mode;
        log::info!("browser mode: {}", self.browser_mode);
        if self.browser_mode {
            self.open_in_browser(now);
        } else {
            self.show_document(now);
            self.set_status("Showing document in app", now);
        }
    }

    /// Writes the current document as a standalone page and opens it.
    pub fn open_in_browser(&mut self, now: Instant) {
        let html = self.converter.to_html(&self.document.markdown);
        self.open_page(&html, now);
    }

    fn open_page(&mut self, body: &str, now: Instant) {
        let page = html::browser_page(&self.document.title, body);
        match self.launch_page(&page) {
            Ok(()) => self.set_status("Opened in browser", now),
            Err(e) => self.report(e, now),
        }
    }

    /// Exports a diagram's source to its own page and opens it.
    pub fn open_diagram(&mut self, source: &str, now: Instant) {
        match self.launch_page(&html::diagram_page(source)) {
            Ok(()) => self.set_status("Diagram opened in browser", now),
            Err(e) => self.report(e, now),
        }
    }

    fn launch_page(&mut self, page: &str) -> anyhow::Result<()> {
        let path = self.write_temp_page(page)?;
        self.launcher.open(&path)
    }

    fn write_temp_page(&mut self, page: &str) -> anyhow::Result<PathBuf> {
        let mut file = tempfile::Builder::new()
            .prefix("mdv-")
            .suffix(".html")
            .tempfile()
            .context("failed to create temporary page")?;
        file.write_all(page.as_bytes())
            .context("failed to write temporary page")?;
        let temp_path = file.into_temp_path();
        let path = temp_path.to_path_buf();
        log::debug!("wrote {}", path.display());
        self.temp_pages.push(temp_path);
        Ok(path)
    }

    /// Flips fullscreen. Entering it shows the exit hint.
    pub fn toggle_fullscreen(&mut self, now: Instant) -> bool {
        self.fullscreen = !self.fullscreen;
        self.hint_until = self.fullscreen.then(|| now + HINT_DURATION);
        self.fullscreen
    }

    /// Leaves fullscreen if active, otherwise asks to quit.
    pub fn escape(&mut self) -> EscapeOutcome {
        if self.fullscreen {
            self.fullscreen = false;
            self.hint_until = None;
            EscapeOutcome::LeftFullscreen
        } else {
            EscapeOutcome::Quit
        }
    }

    pub fn hint_visible(&self, now: Instant) -> bool {
        self.hint_until.is_some_and(|until| now < until)
    }

    pub fn dismiss_hint(&mut self) {
        self.hint_until = None;
    }

    pub fn set_status(&mut self, text: impl Into<String>, now: Instant) {
        self.status = Some(StatusMessage {
            text: text.into(),
            until: now + STATUS_DURATION,
        });
    }

    pub fn status(&self, now: Instant) -> Option<&str> {
        self.status
            .as_ref()
            .filter(|status| now < status.until)
            .map(|status| status.text.as_str())
    }

    /// Earliest pending timer, for scheduling the next repaint.
    pub fn next_deadline(&self, now: Instant) -> Option<Duration> {
        [self.hint_until, self.status.as_ref().map(|status| status.until)]
            .into_iter()
            .flatten()
            .filter(|until| *until > now)
            .map(|until| until - now)
            .min()
    }

    /// The document in `format`, or `None` if it could not be produced.
    pub fn copy_text(&self, format: CopyFormat) -> Option<String> {
        let text = match format {
            CopyFormat::PlainText | CopyFormat::RichText => document::plain_text(&self.blocks),
            CopyFormat::Html => self.converter.to_html(&self.source_markdown()?),
            CopyFormat::Markdown => self.source_markdown()?,
        };
        Some(text)
    }

    /// The markdown as it is on disk now, or in memory for placeholders.
    fn source_markdown(&self) -> Option<String> {
        match &self.document.source {
            Some(path) => loader::read(path)
                .map_err(|e| log::warn!("copy failed: {e:#}"))
                .ok(),
            None => Some(self.document.markdown.clone()),
        }
    }

    fn report(&mut self, error: anyhow::Error, now: Instant) {
        log::warn!("{error:#}");
        self.set_status(format!("{error:#}"), now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::html::CmarkConverter;
    use crate::loader::DocumentKind;
    use std::cell::RefCell;
    use std::fs;
    use std::rc::Rc;
    use tempfile::TempDir;

    /// Records every path it is asked to open, reading the page immediately.
    #[derive(Clone, Default)]
    struct RecordingLauncher {
        opened: Rc<RefCell<Vec<(PathBuf, String)>>>,
        fail: bool,
    }

    impl Launcher for RecordingLauncher {
        fn open(&self, target: &Path) -> anyhow::Result<()> {
            if self.fail {
                anyhow::bail!("no browser available");
            }
            let page = fs::read_to_string(target)?;
            self.opened.borrow_mut().push((target.to_path_buf(), page));
            Ok(())
        }
    }

    fn document(markdown: &str) -> LoadedDocument {
        LoadedDocument {
            title: "Markdown Viewer - test.md".into(),
            markdown: markdown.into(),
            source: None,
            kind: DocumentKind::File,
        }
    }

    fn viewer(args: &Args, markdown: &str, launcher: &RecordingLauncher) -> Viewer {
        Viewer::with_document(
            document(markdown),
            args,
            Box::new(CmarkConverter::default()),
            Box::new(launcher.clone()),
            Instant::now(),
        )
    }

    #[test]
    fn test_app_mode_builds_blocks_without_launching() {
        let launcher = RecordingLauncher::default();
        let viewer = viewer(&Args::default(), "# Hello\n\nWorld", &launcher);
        assert_eq!(viewer.blocks().len(), 2);
        assert!(launcher.opened.borrow().is_empty());
        assert_eq!(viewer.temp_page_count(), 0);
    }

    #[test]
    fn test_browser_flag_opens_page_on_start() {
        let launcher = RecordingLauncher::default();
        let args = Args {
            browser: true,
            ..Args::default()
        };
        let viewer = viewer(&args, "# Hello", &launcher);
        let opened = launcher.opened.borrow();
        assert_eq!(opened.len(), 1);
        let (path, page) = &opened[0];
        assert_eq!(path.extension().and_then(|ext| ext.to_str()), Some("html"));
        assert!(page.contains("<h1>Hello</h1>"));
        assert!(page.contains("<title>Markdown Viewer - test.md</title>"));
        assert_eq!(viewer.temp_page_count(), 1);
    }

    #[test]
    fn test_toggle_browser_mode_round_trip() {
        let launcher = RecordingLauncher::default();
        let mut viewer = viewer(&Args::default(), "text", &launcher);
        let now = Instant::now();

        viewer.toggle_browser_mode(now);
        assert!(viewer.is_browser_mode());
        assert_eq!(launcher.opened.borrow().len(), 1);
        assert_eq!(viewer.status(now), Some("Opened in browser"));

        viewer.toggle_browser_mode(now);
        assert!(!viewer.is_browser_mode());
        assert_eq!(launcher.opened.borrow().len(), 1);
    }

    #[test]
    fn test_launch_failure_becomes_status() {
        let launcher = RecordingLauncher {
            fail: true,
            ..RecordingLauncher::default()
        };
        let mut viewer = viewer(&Args::default(), "text", &launcher);
        let now = Instant::now();
        viewer.open_diagram("graph TD", now);
        assert_eq!(viewer.status(now), Some("no browser available"));
        assert!(viewer.status(now + STATUS_DURATION).is_none());
    }

    #[test]
    fn test_diagram_page_is_written_and_opened() {
        let launcher = RecordingLauncher::default();
        let mut viewer = viewer(&Args::default(), "", &launcher);
        viewer.open_diagram("graph TD\n  A --> B", Instant::now());
        let opened = launcher.opened.borrow();
        assert!(opened[0].1.contains("A --&gt; B"));
    }

    #[test]
    fn test_temp_pages_removed_on_drop() {
        let launcher = RecordingLauncher::default();
        let mut viewer = viewer(&Args::default(), "# Page", &launcher);
        viewer.open_in_browser(Instant::now());
        let path = launcher.opened.borrow()[0].0.clone();
        assert!(path.exists());
        drop(viewer);
        assert!(!path.exists());
    }

    #[test]
    fn test_fullscreen_hint_expires() {
        let launcher = RecordingLauncher::default();
        let mut viewer = viewer(&Args::default(), "", &launcher);
        let now = Instant::now();

        assert!(viewer.toggle_fullscreen(now));
        assert!(viewer.hint_visible(now));
        assert_eq!(viewer.next_deadline(now), Some(HINT_DURATION));
        assert!(!viewer.hint_visible(now + HINT_DURATION));

        viewer.dismiss_hint();
        assert!(!viewer.hint_visible(now));
    }

    #[test]
    fn test_escape_leaves_fullscreen_before_quitting() {
        let launcher = RecordingLauncher::default();
        let args = Args {
            fullscreen: true,
            ..Args::default()
        };
        let mut viewer = viewer(&args, "", &launcher);
        assert!(viewer.hint_visible(Instant::now()));
        assert_eq!(viewer.escape(), EscapeOutcome::LeftFullscreen);
        assert!(!viewer.is_fullscreen());
        assert_eq!(viewer.escape(), EscapeOutcome::Quit);
    }

    #[test]
    fn test_copy_formats_for_placeholder() {
        let launcher = RecordingLauncher::default();
        let markdown = "# Title\n\n*soft* words";
        let viewer = viewer(&Args::default(), markdown, &launcher);

        let plain = viewer.copy_text(CopyFormat::PlainText);
        assert_eq!(plain.as_deref(), Some("Title\nsoft words\n"));
        assert_eq!(viewer.copy_text(CopyFormat::RichText), plain);
        assert_eq!(
            viewer.copy_text(CopyFormat::Markdown).as_deref(),
            Some(markdown)
        );
        let html = viewer.copy_text(CopyFormat::Html).unwrap();
        assert!(html.contains("<em>soft</em>"));
    }

    #[test]
    fn test_copy_rereads_source_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("live.md");
        fs::write(&path, "first").unwrap();

        let launcher = RecordingLauncher::default();
        let mut viewer = viewer(&Args::default(), "", &launcher);
        viewer.open(&path, Instant::now());
        fs::write(&path, "**second**").unwrap();

        assert_eq!(
            viewer.copy_text(CopyFormat::Markdown).as_deref(),
            Some("**second**")
        );
        assert!(viewer
            .copy_text(CopyFormat::Html)
            .unwrap()
            .contains("<strong>second</strong>"));

        fs::remove_file(&path).unwrap();
        assert_eq!(viewer.copy_text(CopyFormat::Markdown), None);
    }

    #[test]
    fn test_reload_finds_file_created_later() {
        let dir = TempDir::new().unwrap();
        let launcher = RecordingLauncher::default();
        let mut viewer = viewer(&Args::default(), "", &launcher);
        let now = Instant::now();

        viewer.open(&dir.path().join("later"), now);
        assert_eq!(viewer.document().kind, DocumentKind::NotFound);

        fs::write(dir.path().join("later.md"), "# Here").unwrap();
        viewer.reload(now);
        assert_eq!(viewer.document().kind, DocumentKind::File);
        assert_eq!(viewer.status(now), Some("Reloaded"));
    }

    #[test]
    fn test_reload_picks_up_changes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("doc.md");
        fs::write(&path, "# Before").unwrap();

        let launcher = RecordingLauncher::default();
        let mut viewer = viewer(&Args::default(), "", &launcher);
        let now = Instant::now();
        viewer.open(&path, now);
        fs::write(&path, "# After").unwrap();
        viewer.reload(now);

        assert_eq!(
            viewer.blocks(),
            &[Block::Heading {
                level: 1,
                text: "After".into()
            }]
        );
        assert_eq!(viewer.document().title, "Markdown Viewer - doc.md");
    }
}
