//! HTML Report
//!
//! Renders a summary store as one standalone page: a card per function in
//! journal order, with its decompiled source behind a `<details>` toggle.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::constants::files;
use crate::storage::SummaryStore;
use crate::types::{FunctionSources, Result};

const CODE_NOT_AVAILABLE: &str = "Code not available";

const STYLE: &str = r#"
    body { font-family: sans-serif; background: #272822; color: #f8f8f2; margin: 2em; }
    h1 { text-align: center; color: #f92672; }
    .function { border: 1px solid #49483e; border-radius: 6px; padding: 1em; margin: 1em 0; }
    .function-name { font-family: monospace; font-size: 1.2em; color: #a6e22e; }
    .function-desc { margin: 0.5em 0; }
    summary { cursor: pointer; color: #66d9ef; }
    pre { background: #1e1f1c; padding: 1em; overflow-x: auto; }
    footer { text-align: center; color: #75715e; margin-top: 2em; }
"#;

/// Escape text for HTML element content and attribute values
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

/// Generator for the function summaries page
pub struct HtmlReport<'a> {
    store: &'a SummaryStore,
    sources: &'a FunctionSources,
    title: String,
}

impl<'a> HtmlReport<'a> {
    pub fn new(store: &'a SummaryStore, sources: &'a FunctionSources) -> Self {
        Self {
            store,
            sources,
            title: "Function Summaries".to_string(),
        }
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    pub fn render(&self) -> String {
        let title = escape_html(&self.title);
        let mut output = String::new();

        output.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
        output.push_str("<meta charset=\"UTF-8\">\n");
        output.push_str(
            "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n",
        );
        output.push_str(&format!("<title>{}</title>\n", title));
        output.push_str(&format!("<style>{}</style>\n", STYLE));
        output.push_str("</head>\n<body>\n");
        output.push_str(&format!("<h1>{}</h1>\n", title));

        for (name, summary) in self.store.iter() {
            self.render_function(&mut output, name, summary);
        }

        output.push_str(&format!(
            "<footer>{} functions &middot; generated {}</footer>\n",
            self.store.len(),
            chrono::Utc::now().format("%Y-%m-%d %H:%M UTC")
        ));
        output.push_str("</body>\n</html>\n");
        output
    }

    fn render_function(&self, output: &mut String, name: &str, summary: &str) {
        let code = self
            .sources
            .get(name)
            .map(|source| escape_html(source))
            .unwrap_or_else(|| CODE_NOT_AVAILABLE.to_string());
        let name = escape_html(name);

        output.push_str(&format!("<div class=\"function\" id=\"{}\">\n", name));
        output.push_str(&format!("  <div class=\"function-name\">{}</div>\n", name));
        output.push_str(&format!(
            "  <div class=\"function-desc\">{}</div>\n",
            escape_html(summary)
        ));
        output.push_str("  <details>\n    <summary>Decompiled code</summary>\n");
        output.push_str(&format!("    <pre><code>{}</code></pre>\n", code));
        output.push_str("  </details>\n</div>\n");
    }
}

/// Render the summaries page
pub fn render_html(store: &SummaryStore, sources: &FunctionSources) -> String {
    HtmlReport::new(store, sources).render()
}

/// Write `function_summaries.html` into `output_dir`
pub fn write_html(
    store: &SummaryStore,
    sources: &FunctionSources,
    output_dir: &Path,
) -> Result<PathBuf> {
    fs::create_dir_all(output_dir)?;
    let path = output_dir.join(files::HTML_REPORT);
    fs::write(&path, render_html(store, sources))?;
    info!("Generated {} at {}", files::HTML_REPORT, path.display());
    Ok(path)
}
