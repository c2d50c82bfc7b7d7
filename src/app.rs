//! # Application Module
//!
//! The eframe shell around [`Viewer`]: keyboard handling, the window title,
//! fullscreen commands, the status bar and the central document panel.

use crate::loader::DocumentKind;
use crate::markdown::{DocumentAction, MarkdownRenderer};
use crate::shortcuts::{self, Action};
use crate::viewer::{EscapeOutcome, Viewer};
use egui::*;
use std::path::PathBuf;
use std::time::Instant;

const MIN_FONT_SIZE: f32 = 8.0;
const MAX_FONT_SIZE: f32 = 32.0;

/// Extensions accepted from drag and drop.
const DROPPED_EXTENSIONS: [&str; 3] = ["md", "markdown", "txt"];

pub struct MarkdownViewerApp {
    viewer: Viewer,
    /// Draws the viewer's render tree
    markdown_renderer: MarkdownRenderer,
    /// Title last sent to the window
    applied_title: String,
    /// Whether the file open dialog should be shown
    show_open_dialog: bool,
}

impl MarkdownViewerApp {
    /// Creates the app with a light reading theme.
    pub fn new(cc: &eframe::CreationContext<'_>, viewer: Viewer) -> Self {
        let mut visuals = Visuals::light();
        visuals.panel_fill = Color32::WHITE;
        visuals.window_fill = Color32::WHITE;
        visuals.override_text_color = Some(Color32::from_rgb(36, 41, 46));
        cc.egui_ctx.set_visuals(visuals);

        Self {
            viewer,
            markdown_renderer: MarkdownRenderer::new(),
            applied_title: String::new(),
            show_open_dialog: false,
        }
    }

    fn handle_shortcuts(&mut self, ctx: &Context) {
        let actions = ctx.input(|i| shortcuts::actions(&i.events, i.modifiers));
        for action in actions {
            self.apply(ctx, action);
        }
    }

    fn apply(&mut self, ctx: &Context, action: Action) {
        let now = Instant::now();
        match action {
            Action::Escape => match self.viewer.escape() {
                EscapeOutcome::LeftFullscreen => {
                    ctx.send_viewport_cmd(ViewportCommand::Fullscreen(false));
                }
                EscapeOutcome::Quit => ctx.send_viewport_cmd(ViewportCommand::Close),
            },
            Action::ToggleBrowserMode => self.viewer.toggle_browser_mode(now),
            Action::ToggleFullscreen => {
                let fullscreen = self.viewer.toggle_fullscreen(now);
                ctx.send_viewport_cmd(ViewportCommand::Fullscreen(fullscreen));
            }
            Action::Copy(format) => match self.viewer.copy_text(format) {
                Some(text) => {
                    ctx.output_mut(|o| o.copied_text = text);
                    log::debug!("copied document as {format:?}");
                }
                None => self.viewer.set_status("Nothing copied", now),
            },
            Action::Open => self.show_open_dialog = true,
            Action::Reload => self.viewer.reload(now),
            Action::ZoomIn => self.zoom(2.0),
            Action::ZoomOut => self.zoom(-2.0),
        }
    }

    fn zoom(&mut self, delta: f32) {
        let size =
            (self.markdown_renderer.font_size() + delta).clamp(MIN_FONT_SIZE, MAX_FONT_SIZE);
        self.markdown_renderer.set_font_size(size);
    }

    fn handle_file_dialog(&mut self) {
        if self.show_open_dialog {
            if let Some(path) = rfd::FileDialog::new()
                .add_filter("Markdown", &["md", "markdown"])
                .pick_file()
            {
                self.viewer.open(&path, Instant::now());
            }
            self.show_open_dialog = false;
        }
    }

    fn handle_dropped_files(&mut self, ctx: &Context) {
        let dropped: Option<PathBuf> = ctx.input(|i| {
            i.raw
                .dropped_files
                .iter()
                .filter_map(|file| file.path.clone())
                .find(|path| {
                    path.extension()
                        .and_then(|ext| ext.to_str())
                        .is_some_and(|ext| {
                            DROPPED_EXTENSIONS
                                .iter()
                                .any(|known| ext.eq_ignore_ascii_case(known))
                        })
                })
        });
        if let Some(path) = dropped {
            log::info!("dropped {}", path.display());
            self.viewer.open(&path, Instant::now());
        }
    }

    fn sync_title(&mut self, ctx: &Context) {
        let title = &self.viewer.document().title;
        if *title != self.applied_title {
            self.applied_title = title.clone();
            ctx.send_viewport_cmd(ViewportCommand::Title(title.clone()));
        }
    }

    fn show_status_bar(&mut self, ctx: &Context, now: Instant) {
        TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let mode = if self.viewer.is_browser_mode() {
                    "Browser mode"
                } else {
                    "App mode"
                };
                ui.label(RichText::new(mode).small().weak());
                if self.viewer.document().kind != DocumentKind::File {
                    ui.separator();
                    ui.label(RichText::new("Ctrl+O to open a file").small().weak());
                }
                if let Some(status) = self.viewer.status(now) {
                    ui.separator();
                    ui.label(RichText::new(status).small());
                }
                ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                    ui.label(
                        RichText::new("F11 fullscreen · Ctrl+B browser · Esc quit")
                            .small()
                            .weak(),
                    );
                });
            });
        });
    }

    fn show_fullscreen_hint(&mut self, ctx: &Context) {
        let response = Area::new(Id::new("fullscreen_hint"))
            .anchor(Align2::CENTER_TOP, [0.0, 24.0])
            .order(Order::Foreground)
            .show(ctx, |ui| {
                Frame::popup(ui.style()).show(ui, |ui| {
                    ui.label("Press F11 or Esc to exit fullscreen");
                });
            })
            .response;
        if response.interact(Sense::click()).clicked() {
            self.viewer.dismiss_hint();
        }
    }

    fn show_browser_notice(&mut self, ui: &mut Ui) {
        let now = Instant::now();
        ui.vertical_centered(|ui| {
            ui.add_space(80.0);
            ui.heading("🌐 Opened in your browser");
            ui.add_space(12.0);
            ui.label("This document is showing in your default browser.");
            ui.add_space(20.0);
            if ui.button("Open again").clicked() {
                self.viewer.open_in_browser(now);
            }
            if ui.button("Back to app view (Ctrl+B)").clicked() {
                self.viewer.toggle_browser_mode(now);
            }
        });
    }

    fn show_document(&mut self, ui: &mut Ui) {
        let side = if self.viewer.is_fullscreen() { 0.12 } else { 0.04 };
        let mut action = None;

        ScrollArea::vertical()
            .auto_shrink([false; 2])
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    let total_width = ui.available_width();
                    let side_padding = total_width * side;
                    ui.add_space(side_padding);
                    let content_width = (total_width - 2.0 * side_padding).max(200.0);

                    ui.vertical(|ui| {
                        ui.set_max_width(content_width);
                        action = self.markdown_renderer.render(
                            ui,
                            self.viewer.blocks(),
                            content_width,
                        );
                        ui.add_space(24.0);
                    });
                });
            });

        if let Some(DocumentAction::OpenDiagram(source)) = action {
            self.viewer.open_diagram(&source, Instant::now());
        }
    }
}

impl eframe::App for MarkdownViewerApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        self.handle_shortcuts(ctx);
        self.handle_dropped_files(ctx);
        self.handle_file_dialog();
        self.sync_title(ctx);

        let now = Instant::now();
        if !self.viewer.is_fullscreen() {
            self.show_status_bar(ctx, now);
        }
        if self.viewer.hint_visible(now) {
            self.show_fullscreen_hint(ctx);
        }

        CentralPanel::default().show(ctx, |ui| {
            if self.viewer.is_browser_mode() {
                self.show_browser_notice(ui);
            } else {
                self.show_document(ui);
            }
        });

        if let Some(wait) = self.viewer.next_deadline(now) {
            ctx.request_repaint_after(wait);
        }
    }
}
