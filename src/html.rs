//! # HTML Module
//!
//! Markdown to HTML conversion (pulldown-cmark) and the standalone pages
//! written to disk for browser mode and diagram pop-outs.

use crate::document::DIAGRAM_PREFIXES;
use pulldown_cmark::{html, Options, Parser};

/// Mermaid build loaded by every generated page.
const MERMAID_SCRIPT: &str = "https://cdn.jsdelivr.net/npm/mermaid@10.6.1/dist/mermaid.min.js";
const HIGHLIGHT_SCRIPT: &str =
    "https://cdnjs.cloudflare.com/ajax/libs/highlight.js/11.9.0/highlight.min.js";
const HIGHLIGHT_STYLE: &str =
    "https://cdnjs.cloudflare.com/ajax/libs/highlight.js/11.9.0/styles/github.min.css";

/// Converts markdown text to an HTML fragment.
pub trait MarkdownConverter {
    fn to_html(&self, markdown: &str) -> String;
}

/// pulldown-cmark backed converter with the GitHub-style extensions enabled.
pub struct CmarkConverter {
    options: Options,
}

impl Default for CmarkConverter {
    fn default() -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_FOOTNOTES);
        options.insert(Options::ENABLE_TASKLISTS);
        options.insert(Options::ENABLE_HEADING_ATTRIBUTES);
        Self { options }
    }
}

impl MarkdownConverter for CmarkConverter {
    fn to_html(&self, markdown: &str) -> String {
        let parser = Parser::new_ext(markdown, self.options);
        let mut output = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut output, parser);
        output
    }
}

/// Escapes text for use inside HTML element content or attribute values.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Wraps a converted document body into a complete page for browser mode.
///
/// Fenced `mermaid` blocks, and unlabelled blocks opening with a diagram
/// keyword, are swapped for Mermaid containers before the diagrams are drawn.
/// Every other code block goes through highlight.js.
pub fn browser_page(title: &str, body: &str) -> String {
    format!(
        r##"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <link rel="stylesheet" href="{HIGHLIGHT_STYLE}">
    <script src="{HIGHLIGHT_SCRIPT}"></script>
    <script src="{MERMAID_SCRIPT}"></script>
    <style>
        body {{
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            max-width: 860px;
            margin: 0 auto;
            padding: 32px 24px;
            line-height: 1.6;
            color: #24292e;
            background: #fff;
        }}
        h1, h2, h3 {{ color: #2c3e50; }}
        pre {{
            background: #f8f8f8;
            border: 1px solid #e1e8ed;
            border-radius: 6px;
            padding: 16px;
            overflow-x: auto;
        }}
        code {{ font-family: Consolas, Monaco, monospace; }}
        blockquote {{
            border-left: 4px solid #dfe2e5;
            background: #fafafa;
            margin: 12px 0;
            padding: 12px 16px;
            color: #6a737d;
            font-style: italic;
        }}
        table {{ border-collapse: collapse; }}
        th, td {{ border: 1px solid #dfe2e5; padding: 8px 12px; }}
        th {{ background: #f6f8fa; }}
        hr {{ border: 0; height: 1px; background: #dfe2e5; margin: 20px 0; }}
        .mermaid {{ text-align: center; }}
    </style>
</head>
<body>
{body}
    <script>
        var diagramPrefixes = {prefixes};
        document.querySelectorAll('pre > code').forEach(function (code) {{
            var text = code.textContent.trimStart();
            var isDiagram = code.classList.contains('language-mermaid')
                || diagramPrefixes.some(function (prefix) {{ return text.startsWith(prefix); }});
            if (!isDiagram) {{
                return;
            }}
            var diagram = document.createElement('div');
            diagram.className = 'mermaid';
            diagram.textContent = code.textContent;
            code.parentNode.replaceWith(diagram);
        }});
        mermaid.initialize({{ startOnLoad: true, theme: 'default' }});
        hljs.highlightAll();
    </script>
</body>
</html>
"##,
        title = escape_html(title),
        prefixes = diagram_prefixes_js(),
    )
}

/// The diagram keywords as a JavaScript array literal.
fn diagram_prefixes_js() -> String {
    let quoted: Vec<String> = DIAGRAM_PREFIXES
        .iter()
        .map(|prefix| format!("'{prefix}'"))
        .collect();
    format!("[{}]", quoted.join(", "))
}

/// Builds a page that renders a single Mermaid diagram.
pub fn diagram_page(source: &str) -> String {
    format!(
        r##"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Mermaid Diagram</title>
    <script src="{MERMAID_SCRIPT}"></script>
    <style>
        body {{
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            margin: 20px;
            background: #fff;
        }}
        .mermaid {{ text-align: center; }}
        h1 {{ color: #333; text-align: center; }}
    </style>
</head>
<body>
    <h1>📊 Mermaid Diagram</h1>
    <div class="mermaid">
{source}
    </div>
    <script>
        mermaid.initialize({{ startOnLoad: true, theme: 'default' }});
    </script>
</body>
</html>
"##,
        source = escape_html(source),
    )
}
