//! Notebook composition: one rendered block per cell, in document order

use crate::engine::EngineSlot;
use crate::escape::escape_html;
use crate::markdown::render_markdown_cell;
use crate::output::render_output;
use nbv_parser::{Cell, KnownOutput, NotebookDocument, Output};

/// Render a whole document as an ordered sequence of cell blocks.
/// Markdown cells go through the sanitizing renderer, code cells show
/// their source followed by their outputs, raw cells stay verbatim. A
/// document without cells renders a single placeholder.
pub fn render_notebook(document: &NotebookDocument, engine: &EngineSlot) -> String {
    if document.cells.is_empty() {
        return "<div class=\"nb-empty\">No notebook content found.</div>".to_string();
    }

    let mut html = String::from("<div class=\"nb-document\">");
    for cell in &document.cells {
        html.push_str(&render_cell(cell, document, engine));
    }
    html.push_str("</div>");
    html
}

/// Like [`render_notebook`], with a header carrying the notebook name,
/// kernel display name and format version.
pub fn render_notebook_titled(
    document: &NotebookDocument,
    title: &str,
    engine: &EngineSlot,
) -> String {
    let header = format!(
        "<header class=\"nb-header\"><h1>{}</h1><div class=\"nb-header-meta\"><span>Kernel: {}</span><span>Format: v{}.{}</span></div></header>",
        escape_html(title),
        escape_html(document.kernel_display_name().unwrap_or("Unknown")),
        document.nbformat,
        document.nbformat_minor
    );
    format!("{header}{}", render_notebook(document, engine))
}

fn render_cell(cell: &Cell, document: &NotebookDocument, engine: &EngineSlot) -> String {
    match cell {
        Cell::Markdown { source, .. } => format!(
            "<div class=\"nb-cell nb-cell-markdown\">{}</div>",
            render_markdown_cell(&source.join(), engine)
        ),
        Cell::Raw { source, .. } => format!(
            "<pre class=\"nb-cell nb-cell-raw\">{}</pre>",
            escape_html(&source.join())
        ),
        Cell::Code {
            source,
            outputs,
            execution_count,
            ..
        } => render_code_cell(source.join(), outputs, *execution_count, document),
    }
}

fn render_code_cell(
    source: String,
    outputs: &[Output],
    execution_count: Option<i64>,
    document: &NotebookDocument,
) -> String {
    let language = document
        .metadata
        .language_info
        .as_ref()
        .and_then(|info| info.name.as_deref())
        .unwrap_or("python");
    let prompt = execution_count
        .map(|count| count.to_string())
        .unwrap_or_else(|| " ".to_string());

    let mut html = format!(
        "<div class=\"nb-cell nb-cell-code\"><div class=\"nb-input\"><span class=\"nb-prompt\">In [{prompt}]:</span><pre><code class=\"language-{language}\">{}</code></pre></div>",
        escape_html(&source)
    );

    for output in outputs {
        let rendered = render_output(output);
        if rendered.is_empty() {
            continue;
        }
        html.push_str(&format!(
            "<div class=\"nb-output-row\"><span class=\"nb-prompt nb-prompt-out\">{}</span>{rendered}</div>",
            output_prompt(output)
        ));
    }

    html.push_str("</div>");
    html
}

/// `Out [n]:` label for outputs that carry an execution count.
fn output_prompt(output: &Output) -> String {
    match output.as_known() {
        Some(KnownOutput::ExecuteResult {
            execution_count: Some(count),
            ..
        }) => format!("Out [{count}]:"),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_support::ready_slot;
    use nbv_parser::parse_notebook;
    use serde_json::json;

    fn document(cells: serde_json::Value) -> NotebookDocument {
        let bytes = serde_json::to_vec(&json!({
            "cells": cells,
            "metadata": {
                "kernelspec": {"display_name": "Python 3"},
                "language_info": {"name": "python"}
            },
            "nbformat": 4,
            "nbformat_minor": 5
        }))
        .unwrap();
        parse_notebook(&bytes).unwrap()
    }

    #[test]
    fn empty_document_renders_placeholder() {
        let html = render_notebook(&document(json!([])), &ready_slot());
        assert!(html.contains("No notebook content found."));
    }

    #[test]
    fn cells_render_in_document_order() {
        let doc = document(json!([
            {"cell_type": "markdown", "metadata": {}, "source": "# First"},
            {"cell_type": "code", "metadata": {}, "source": "x = 1", "execution_count": 2,
             "outputs": [{"output_type": "execute_result", "execution_count": 2,
                          "data": {"text/plain": "1"}, "metadata": {}}]},
            {"cell_type": "raw", "metadata": {}, "source": "<raw> & text"}
        ]));
        let html = render_notebook(&doc, &ready_slot());

        let first = html.find("First").unwrap();
        let second = html.find("x = 1").unwrap();
        let third = html.find("&lt;raw&gt; &amp; text").unwrap();
        assert!(first < second && second < third);
    }

    #[test]
    fn code_cell_shows_prompts_and_language() {
        let doc = document(json!([
            {"cell_type": "code", "metadata": {}, "source": "y", "execution_count": 3,
             "outputs": [{"output_type": "execute_result", "execution_count": 3,
                          "data": {"text/plain": "3"}, "metadata": {}}]}
        ]));
        let html = render_notebook(&doc, &ready_slot());
        assert!(html.contains("In [3]:"));
        assert!(html.contains("Out [3]:"));
        assert!(html.contains("class=\"language-python\""));
    }

    #[test]
    fn code_cell_without_count_gets_blank_prompt() {
        let doc = document(json!([
            {"cell_type": "code", "metadata": {}, "source": "z", "execution_count": null,
             "outputs": []}
        ]));
        let html = render_notebook(&doc, &ready_slot());
        assert!(html.contains("In [ ]:"));
    }

    #[test]
    fn titled_render_includes_header_metadata() {
        let html = render_notebook_titled(&document(json!([])), "analysis.ipynb", &ready_slot());
        assert!(html.contains("analysis.ipynb"));
        assert!(html.contains("Kernel: Python 3"));
        assert!(html.contains("Format: v4.5"));
    }
}
