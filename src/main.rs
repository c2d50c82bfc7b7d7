//! # mdv
//!
//! A desktop markdown viewer built with egui.
//!
//! mdv converts a markdown file to HTML and shows it either as native widgets
//! or as a standalone page in the default browser:
//! - Headings, paragraphs, lists, tables, quotes and highlighted code
//! - Mermaid diagrams exported to the browser on demand
//! - Fullscreen reading mode
//! - Copy as plain text, HTML or markdown

mod app;
mod args;
mod document;
mod html;
mod launcher;
mod loader;
mod markdown;
mod shortcuts;
mod viewer;

use app::MarkdownViewerApp;
use args::Args;
use html::CmarkConverter;
use launcher::SystemLauncher;
use std::time::Instant;
use viewer::Viewer;

/// Main entry point for mdv.
///
/// Parses the command line, then opens a native window showing the requested
/// file (or the usage document when none was given).
fn main() -> Result<(), eframe::Error> {
    env_logger::init();

    let args = Args::from_env();
    log::debug!("{args:?}");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([900.0, 700.0])
            .with_title("Markdown Viewer")
            .with_fullscreen(args.fullscreen)
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        "mdv",
        options,
        Box::new(move |cc| {
            let viewer = Viewer::new(
                &args,
                Box::new(CmarkConverter::default()),
                Box::new(SystemLauncher::default()),
                Instant::now(),
            );
            Ok(Box::new(MarkdownViewerApp::new(cc, viewer)))
        }),
    )
}
