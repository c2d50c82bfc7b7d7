//! # Markdown Rendering Module
//!
//! Draws the render tree built by [`crate::document`] with egui widgets.
//! Fenced code with a known language goes through syntect; everything else is
//! laid out with plain `LayoutJob`s and frames.

use crate::document::{Block, Cell, ListItem, Span, SpanKind};
use egui::text::LayoutJob;
use egui::*;
use syntect::easy::HighlightLines;
use syntect::highlighting::ThemeSet;
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

const HEADING_COLOR: Color32 = Color32::from_rgb(44, 62, 80);
const LINK_COLOR: Color32 = Color32::from_rgb(3, 102, 214);
const MUTED_COLOR: Color32 = Color32::from_rgb(106, 115, 125);
const BORDER_COLOR: Color32 = Color32::from_rgb(223, 226, 229);
const CODE_BG: Color32 = Color32::from_rgb(248, 248, 248);
const CODE_BORDER: Color32 = Color32::from_rgb(225, 232, 237);
const QUOTE_BG: Color32 = Color32::from_rgb(250, 250, 250);
const HEADER_CELL_BG: Color32 = Color32::from_rgb(246, 248, 250);
const DIAGRAM_BG: Color32 = Color32::from_rgb(240, 248, 255);
const DIAGRAM_ACCENT: Color32 = Color32::from_rgb(79, 172, 254);

const SYNTAX_THEME: &str = "InspiredGitHub";

/// Something the user asked for while interacting with the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentAction {
    /// The "View in Browser" button of a diagram block.
    OpenDiagram(String),
}

/// Draws render trees, holding the syntax highlighting state between frames.
pub struct MarkdownRenderer {
    /// Syntax definitions for code highlighting
    syntax_set: SyntaxSet,
    /// Color themes for syntax highlighting
    theme_set: ThemeSet,
    /// Body text size; headings and code scale from it
    base_font_size: f32,
}

impl MarkdownRenderer {
    pub fn new() -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
            base_font_size: 16.0,
        }
    }

    pub fn font_size(&self) -> f32 {
        self.base_font_size
    }

    pub fn set_font_size(&mut self, size: f32) {
        self.base_font_size = size;
    }

    /// Draws every block top to bottom. Returns the first action triggered.
    pub fn render(
        &self,
        ui: &mut Ui,
        blocks: &[Block],
        content_width: f32,
    ) -> Option<DocumentAction> {
        let mut action = None;
        for (index, block) in blocks.iter().enumerate() {
            let triggered = self.render_block(ui, index, block, content_width);
            action = action.or(triggered);
        }
        action
    }

    fn render_block(
        &self,
        ui: &mut Ui,
        index: usize,
        block: &Block,
        content_width: f32,
    ) -> Option<DocumentAction> {
        match block {
            Block::Heading { level, text } => self.render_heading(ui, *level, text, content_width),
            Block::Paragraph { spans } => self.render_paragraph(ui, spans),
            Block::Code { language, code } => {
                self.render_code_block(ui, code, language.as_deref(), content_width)
            }
            Block::Diagram { source } => return self.render_diagram(ui, source, content_width),
            Block::Quote { text } => self.render_blockquote(ui, text, content_width),
            Block::List { items, .. } => self.render_list(ui, items, content_width),
            Block::Table { columns, rows } => {
                self.render_table(ui, index, *columns, rows, content_width)
            }
            Block::Rule => {
                ui.add(Separator::default().spacing(40.0));
            }
            Block::Text { text } => {
                ui.add_space(6.0);
                ui.add(Label::new(RichText::new(text).size(self.base_font_size)).wrap());
                ui.add_space(6.0);
            }
        }
        None
    }

    fn render_heading(&self, ui: &mut Ui, level: u8, text: &str, content_width: f32) {
        let (size, above, below) = match level {
            1 => (self.base_font_size * 1.75, 24.0, 12.0),
            2 => (self.base_font_size * 1.5, 20.0, 10.0),
            _ => (self.base_font_size * 1.25, 16.0, 8.0),
        };

        let mut job = LayoutJob::single_section(
            text.to_string(),
            TextFormat {
                font_id: FontId::new(size, FontFamily::Proportional),
                color: HEADING_COLOR,
                ..Default::default()
            },
        );
        job.wrap.max_width = content_width;

        ui.add_space(above);
        ui.add(Label::new(job).wrap());
        ui.add_space(below);
    }

    fn render_paragraph(&self, ui: &mut Ui, spans: &[Span]) {
        ui.add_space(6.0);
        ui.horizontal_wrapped(|ui| {
            ui.spacing_mut().item_spacing.x = 0.0;
            for span in spans {
                self.render_span(ui, span);
            }
        });
        ui.add_space(12.0);
    }

    fn render_span(&self, ui: &mut Ui, span: &Span) {
        let text = RichText::new(&span.text).size(self.base_font_size);
        match &span.kind {
            SpanKind::Text => {
                ui.label(text);
            }
            SpanKind::Strong => {
                ui.label(text.strong());
            }
            SpanKind::Emphasis => {
                ui.label(text.italics());
            }
            SpanKind::Code => {
                ui.label(
                    RichText::new(&span.text)
                        .font(FontId::monospace(self.base_font_size * 0.875))
                        .background_color(CODE_BG),
                );
            }
            SpanKind::Link { href } => {
                let response = ui
                    .add(Label::new(text.color(LINK_COLOR).underline()).sense(Sense::click()))
                    .on_hover_text(href.as_str());
                if response.hovered() {
                    ui.ctx().set_cursor_icon(CursorIcon::PointingHand);
                }
                if response.clicked() {
                    if let Err(e) = webbrowser::open(href) {
                        log::warn!("failed to open link {href}: {e}");
                    }
                }
            }
        }
    }

    fn render_code_block(
        &self,
        ui: &mut Ui,
        code: &str,
        language: Option<&str>,
        content_width: f32,
    ) {
        let mut job = match language {
            Some(language) => self.highlighted_job(code, language),
            None => LayoutJob::single_section(
                code.to_string(),
                TextFormat {
                    font_id: FontId::monospace(self.base_font_size * 0.875),
                    color: ui.visuals().text_color(),
                    ..Default::default()
                },
            ),
        };
        job.wrap.max_width = content_width - 34.0;

        ui.add_space(12.0);
        Frame::none()
            .fill(CODE_BG)
            .stroke(Stroke::new(1.0, CODE_BORDER))
            .rounding(6.0)
            .inner_margin(16.0)
            .show(ui, |ui| {
                ui.set_width(content_width - 34.0);
                ui.add(Label::new(job).wrap().selectable(true));
            });
        ui.add_space(12.0);
    }

    fn highlighted_job(&self, code: &str, language: &str) -> LayoutJob {
        let font_id = FontId::monospace(self.base_font_size * 0.875);
        let syntax = self
            .syntax_set
            .find_syntax_by_token(language)
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let mut job = LayoutJob::default();
        let Some(theme) = self.theme_set.themes.get(SYNTAX_THEME) else {
            job.append(
                code,
                0.0,
                TextFormat {
                    font_id,
                    ..Default::default()
                },
            );
            return job;
        };

        let mut highlighter = HighlightLines::new(syntax, theme);
        for line in LinesWithEndings::from(code) {
            let ranges = highlighter
                .highlight_line(line, &self.syntax_set)
                .unwrap_or_else(|_| vec![(syntect::highlighting::Style::default(), line)]);

            for (style, text) in ranges {
                let color =
                    Color32::from_rgb(style.foreground.r, style.foreground.g, style.foreground.b);
                job.append(
                    text,
                    0.0,
                    TextFormat {
                        font_id: font_id.clone(),
                        color,
                        ..Default::default()
                    },
                );
            }
        }
        job
    }

    fn render_diagram(
        &self,
        ui: &mut Ui,
        source: &str,
        content_width: f32,
    ) -> Option<DocumentAction> {
        let mut action = None;

        ui.add_space(12.0);
        Frame::none()
            .fill(DIAGRAM_BG)
            .stroke(Stroke::new(2.0, DIAGRAM_ACCENT))
            .rounding(8.0)
            .inner_margin(20.0)
            .show(ui, |ui| {
                ui.set_width(content_width - 44.0);
                ui.label(
                    RichText::new("📊 Mermaid Diagram")
                        .size(16.0)
                        .strong()
                        .color(DIAGRAM_ACCENT),
                );
                ui.add_space(10.0);
                ui.horizontal(|ui| {
                    ui.label(
                        RichText::new("Diagram detected.")
                            .size(12.0)
                            .italics()
                            .color(MUTED_COLOR),
                    );
                    ui.add_space(10.0);
                    let button = Button::new(
                        RichText::new("🌐 View in Browser")
                            .size(11.0)
                            .color(Color32::WHITE),
                    )
                    .fill(DIAGRAM_ACCENT)
                    .rounding(4.0);
                    if ui.add(button).clicked() {
                        action = Some(DocumentAction::OpenDiagram(source.to_string()));
                    }
                });
                ui.add_space(10.0);
                ui.add(
                    Label::new(
                        RichText::new(source)
                            .font(FontId::monospace(12.0))
                            .color(Color32::from_rgb(51, 51, 51)),
                    )
                    .wrap()
                    .selectable(true),
                );
            });
        ui.add_space(12.0);

        action
    }

    fn render_blockquote(&self, ui: &mut Ui, text: &str, content_width: f32) {
        ui.add_space(12.0);
        let response = Frame::none()
            .fill(QUOTE_BG)
            .inner_margin(Margin {
                left: 16.0,
                right: 12.0,
                top: 12.0,
                bottom: 12.0,
            })
            .show(ui, |ui| {
                ui.set_width(content_width - 28.0);
                ui.add(
                    Label::new(
                        RichText::new(text)
                            .size(self.base_font_size)
                            .italics()
                            .color(MUTED_COLOR),
                    )
                    .wrap(),
                );
            })
            .response;

        // Left border only.
        let rect = response.rect;
        ui.painter().rect_filled(
            Rect::from_min_max(rect.left_top(), pos2(rect.left() + 4.0, rect.bottom())),
            0.0,
            BORDER_COLOR,
        );
        ui.add_space(12.0);
    }

    fn render_list(&self, ui: &mut Ui, items: &[ListItem], content_width: f32) {
        ui.add_space(12.0);
        for item in items {
            ui.horizontal(|ui| {
                ui.add_space(24.0);
                let mut job = LayoutJob::single_section(
                    format!("{}{}", item.marker, item.text),
                    TextFormat {
                        font_id: FontId::proportional(self.base_font_size),
                        color: ui.visuals().text_color(),
                        ..Default::default()
                    },
                );
                job.wrap.max_width = content_width - 24.0;
                ui.add(Label::new(job).wrap());
            });
            ui.add_space(3.0);
        }
        ui.add_space(9.0);
    }

    fn render_table(
        &self,
        ui: &mut Ui,
        index: usize,
        columns: usize,
        rows: &[Vec<Cell>],
        content_width: f32,
    ) {
        if columns == 0 {
            return;
        }

        let column_width = (content_width / columns as f32 - 26.0).max(40.0);
        ui.add_space(12.0);
        Grid::new(("table", index))
            .num_columns(columns)
            .spacing([0.0, 0.0])
            .show(ui, |ui| {
                for row in rows {
                    for cell in row {
                        self.render_cell(ui, cell, column_width);
                    }
                    ui.end_row();
                }
            });
        ui.add_space(12.0);
    }

    fn render_cell(&self, ui: &mut Ui, cell: &Cell, width: f32) {
        let mut text = RichText::new(&cell.text).size(self.base_font_size * 0.875);
        if cell.header {
            text = text.strong();
        }

        Frame::none()
            .fill(if cell.header {
                HEADER_CELL_BG
            } else {
                Color32::TRANSPARENT
            })
            .stroke(Stroke::new(1.0, BORDER_COLOR))
            .inner_margin(Margin::symmetric(12.0, 8.0))
            .show(ui, |ui| {
                ui.set_width(width);
                ui.add(Label::new(text).wrap());
            });
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}
