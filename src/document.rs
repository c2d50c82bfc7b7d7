//! # Document Module
//!
//! Turns converted HTML into the render tree drawn by [`crate::markdown`].
//! Each top-level HTML node maps onto at most one [`Block`]; the mapping is a
//! single pass over the fragment and keeps no state between blocks.

use scraper::node::Node;
use scraper::{ElementRef, Html};

/// Prefixes that mark a code block as a Mermaid diagram.
pub(crate) const DIAGRAM_PREFIXES: [&str; 3] = ["graph", "flowchart", "sequenceDiagram"];

/// One block-level element of a rendered document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading { level: u8, text: String },
    Paragraph { spans: Vec<Span> },
    Code { language: Option<String>, code: String },
    Diagram { source: String },
    Quote { text: String },
    List { ordered: bool, items: Vec<ListItem> },
    Table { columns: usize, rows: Vec<Vec<Cell>> },
    Rule,
    Text { text: String },
}

/// A styled run inside a paragraph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub kind: SpanKind,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpanKind {
    Text,
    Code,
    Strong,
    Emphasis,
    Link { href: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem {
    /// `"• "` for bullets, `"3. "` for the third ordered item.
    pub marker: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub text: String,
    /// True for `th` cells.
    pub header: bool,
}

impl Span {
    fn new(kind: SpanKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

impl Block {
    /// Text-bearing pieces of this block in reading order.
    ///
    /// Diagram blocks include the callout's title and caption so a copy
    /// matches what is on screen.
    pub fn text_pieces(&self) -> Vec<String> {
        match self {
            Block::Heading { text, .. } | Block::Quote { text } | Block::Text { text } => {
                vec![text.clone()]
            }
            Block::Paragraph { spans } => {
                vec![spans.iter().map(|span| span.text.as_str()).collect()]
            }
            Block::Code { code, .. } => vec![code.clone()],
            Block::Diagram { source } => vec![
                "📊 Mermaid Diagram".to_string(),
                "Diagram detected.".to_string(),
                source.clone(),
            ],
            Block::List { items, .. } => items
                .iter()
                .map(|item| format!("{}{}", item.marker, item.text))
                .collect(),
            Block::Table { rows, .. } => rows
                .iter()
                .flatten()
                .map(|cell| cell.text.clone())
                .collect(),
            Block::Rule => Vec::new(),
        }
    }
}

/// Builds the render tree for an HTML fragment.
pub fn build(html: &str) -> Vec<Block> {
    let fragment = Html::parse_fragment(html);
    let blocks: Vec<Block> = fragment
        .root_element()
        .children()
        .filter_map(|node| match node.value() {
            Node::Text(text) if !text.trim().is_empty() => Some(Block::Text {
                text: text.trim().to_string(),
            }),
            _ => ElementRef::wrap(node).and_then(block_for),
        })
        .collect();
    log::debug!("built {} blocks", blocks.len());
    blocks
}

/// Flattened text of a whole render tree, one text-bearing piece per line.
pub fn plain_text(blocks: &[Block]) -> String {
    let mut text = String::new();
    for piece in blocks.iter().flat_map(Block::text_pieces) {
        text.push_str(&piece);
        text.push('\n');
    }
    text
}

/// Maps a single element onto its block, or `None` when it renders nothing.
pub fn block_for(element: ElementRef) -> Option<Block> {
    let name = element.value().name().to_ascii_lowercase();
    match name.as_str() {
        "h1" | "h2" | "h3" => Some(Block::Heading {
            level: name[1..].parse().unwrap_or(1),
            text: flattened(element).trim().to_string(),
        }),
        "p" => Some(paragraph(element)),
        "pre" => Some(preformatted(element)),
        "blockquote" => Some(Block::Quote {
            text: flattened(element).trim().to_string(),
        }),
        "ul" => Some(list(element, false)),
        "ol" => Some(list(element, true)),
        "table" => Some(table(element)),
        "hr" => Some(Block::Rule),
        _ => {
            let text = flattened(element);
            let text = text.trim();
            (!text.is_empty()).then(|| Block::Text {
                text: text.to_string(),
            })
        }
    }
}

fn paragraph(element: ElementRef) -> Block {
    let spans: Vec<Span> = element
        .children()
        .filter_map(|node| match node.value() {
            Node::Text(text) if !text.is_empty() => Some(Span::new(SpanKind::Text, &**text)),
            Node::Element(child) => {
                let kind = match child.name().to_ascii_lowercase().as_str() {
                    "code" => SpanKind::Code,
                    "strong" => SpanKind::Strong,
                    "em" => SpanKind::Emphasis,
                    "a" => SpanKind::Link {
                        href: child.attr("href").unwrap_or_default().to_string(),
                    },
                    _ => return None,
                };
                ElementRef::wrap(node).map(|child| Span::new(kind, flattened(child)))
            }
            _ => None,
        })
        .collect();

    if spans.iter().any(|span| !span.text.trim().is_empty()) {
        Block::Paragraph { spans }
    } else {
        Block::Paragraph {
            spans: vec![Span::new(SpanKind::Text, flattened(element).trim())],
        }
    }
}

fn preformatted(element: ElementRef) -> Block {
    let code = descendants_named(element, &["code"]).next();
    let text = code.map_or_else(|| flattened(element), flattened);
    let class = code
        .and_then(|code| code.value().attr("class"))
        .unwrap_or_default();
    let text = text.strip_suffix('\n').unwrap_or(&text).to_string();

    if is_diagram(class, &text) {
        return Block::Diagram { source: text };
    }

    let language = class
        .split_whitespace()
        .find_map(|class| class.strip_prefix("language-"))
        .filter(|language| !language.is_empty())
        .map(str::to_string);
    Block::Code {
        language,
        code: text,
    }
}

/// Whether a code block holds Mermaid source, by class or by leading keyword.
pub fn is_diagram(class: &str, code: &str) -> bool {
    let code = code.trim_start();
    class.contains("language-mermaid")
        || DIAGRAM_PREFIXES
            .iter()
            .any(|prefix| code.starts_with(prefix))
}

fn list(element: ElementRef, ordered: bool) -> Block {
    let items = descendants_named(element, &["li"])
        .enumerate()
        .map(|(index, li)| ListItem {
            marker: if ordered {
                format!("{}. ", index + 1)
            } else {
                "• ".to_string()
            },
            text: flattened(li).trim().to_string(),
        })
        .collect();
    Block::List { ordered, items }
}

fn table(element: ElementRef) -> Block {
    let rows: Vec<ElementRef> = descendants_named(element, &["tr"]).collect();
    let columns = rows
        .first()
        .map_or(0, |row| descendants_named(*row, &["th", "td"]).count());

    let rows = rows
        .into_iter()
        .map(|row| {
            descendants_named(row, &["th", "td"])
                .take(columns)
                .map(|cell| Cell {
                    text: flattened(cell).trim().to_string(),
                    header: cell.value().name().eq_ignore_ascii_case("th"),
                })
                .collect()
        })
        .collect();

    Block::Table { columns, rows }
}

/// Concatenation of every descendant text node.
fn flattened(element: ElementRef) -> String {
    element.text().collect()
}

/// Element descendants (excluding `element` itself) whose tag is one of `names`.
fn descendants_named<'a>(
    element: ElementRef<'a>,
    names: &'a [&'a str],
) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    element
        .descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .filter(move |child| {
            names
                .iter()
                .any(|name| child.value().name().eq_ignore_ascii_case(name))
        })
}
