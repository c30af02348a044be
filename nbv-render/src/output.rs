//! Rendering of recorded code-cell outputs
//!
//! Dispatch is by output kind; rich payloads go through the typed MIME
//! selection on [`MimeBundle`], so the priority logic lives in one place.
//! Unknown kinds and bundles with no usable representation render as an
//! empty string, never as an error.

use crate::escape::escape_html;
use nbv_parser::{KnownOutput, MimeBundle, Output, RichContent, StreamName};

/// Render one output to an HTML fragment. Empty string when there is
/// nothing to show.
pub fn render_output(output: &Output) -> String {
    let known = match output.as_known() {
        Some(known) => known,
        None => return String::new(),
    };

    match known {
        KnownOutput::Stream { name, text, .. } => {
            let class = match name {
                StreamName::Stderr => "nb-stream nb-stream-stderr",
                StreamName::Stdout => "nb-stream nb-stream-stdout",
            };
            format!("<pre class=\"{class}\">{}</pre>", escape_html(&text.join()))
        }
        KnownOutput::ExecuteResult { data, .. } | KnownOutput::DisplayData { data, .. } => {
            render_rich(data)
        }
        KnownOutput::Error {
            ename,
            evalue,
            traceback,
            ..
        } => render_error(ename, evalue, traceback),
    }
}

fn render_rich(data: &MimeBundle) -> String {
    match data.richest() {
        RichContent::ImagePng(payload) => image_element("image/png", &payload),
        RichContent::ImageJpeg(payload) => image_element("image/jpeg", &payload),
        // Trusted raw markup: the payload comes from the locally loaded
        // document, not from a third party at render time.
        RichContent::Html(markup) => format!("<div class=\"nb-output-html\">{markup}</div>"),
        RichContent::Plain(text) => {
            format!("<pre class=\"nb-output-text\">{}</pre>", escape_html(&text))
        }
        RichContent::Other(_) => String::new(),
    }
}

fn image_element(mime: &str, base64_payload: &str) -> String {
    format!(
        "<div class=\"nb-output-image\"><img src=\"data:{mime};base64,{base64_payload}\" alt=\"Cell output\" /></div>"
    )
}

fn render_error(ename: &str, evalue: &str, traceback: &[String]) -> String {
    let mut html = format!(
        "<div class=\"nb-output-error\"><div class=\"nb-error-header\">{}: {}</div>",
        escape_html(ename),
        escape_html(evalue)
    );
    if !traceback.is_empty() {
        html.push_str(&format!(
            "<pre class=\"nb-error-traceback\">{}</pre>",
            escape_html(&traceback.join("\n"))
        ));
    }
    html.push_str("</div>");
    html
}
