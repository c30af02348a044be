//! Sanitizing markdown renderer for notebook narrative cells
//!
//! Unlike the hand-rolled preview translator, this pathway delegates
//! structural markup to comrak and forces the result through the strict
//! allow-list sanitizer. Math is shielded around the engine the same way:
//! display math, LaTeX environments and inline math are rendered first
//! and hidden behind placeholder tokens comrak cannot mangle, then
//! restored afterwards. Because comrak may wrap a bare token in a
//! paragraph or inline-code element, unshielding handles those wrapped
//! contexts before the bare one.
//!
//! With no math engine installed the cell still renders (markdown only,
//! default sanitization); callers re-render on the engine's ready
//! transition to upgrade the output.

use crate::engine::{Availability, EngineSlot};
use crate::escape::escape_html;
use crate::sanitize::{sanitize, Policy};
use crate::unicode::translate_unicode_math;
use comrak::ComrakOptions;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static DISPLAY_MATH_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\$\$(.*?)\$\$").unwrap());
static INLINE_MATH_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$([^\$\n]+?)\$").unwrap());

const MATH_ENVIRONMENTS: &[&str] = &["aligned", "equation", "align", "gather", "eqnarray"];

/// One whole-match regex per recognized environment; begin/end markers
/// must name the same environment.
static ENVIRONMENT_REGEXES: Lazy<Vec<Regex>> = Lazy::new(|| {
    MATH_ENVIRONMENTS
        .iter()
        .map(|name| {
            Regex::new(&format!(r"(?s)\\begin\{{{name}\}}.*?\\end\{{{name}\}}")).unwrap()
        })
        .collect()
});

/// Render a markdown cell to sanitized HTML.
pub fn render_markdown_cell(source: &str, engine: &EngineSlot) -> String {
    if engine.availability() != Availability::Available {
        tracing::debug!("math engine unavailable, rendering markdown without math");
        let html = markdown_to_html(source);
        return sanitize(&html, &Policy::default_safe());
    }

    let mut blocks: Vec<String> = Vec::new();

    let text = DISPLAY_MATH_REGEX
        .replace_all(source, |caps: &Captures| {
            shield_expression(caps[1].trim(), &caps[0], true, engine, &mut blocks)
        })
        .into_owned();

    let mut text = text;
    for environment in ENVIRONMENT_REGEXES.iter() {
        text = environment
            .replace_all(&text, |caps: &Captures| {
                // The whole match, markers included, is the expression.
                shield_expression(&caps[0], &caps[0], true, engine, &mut blocks)
            })
            .into_owned();
    }

    let text = INLINE_MATH_REGEX
        .replace_all(&text, |caps: &Captures| {
            shield_expression(caps[1].trim(), &caps[0], false, engine, &mut blocks)
        })
        .into_owned();

    let html = markdown_to_html(&text);
    let html = unshield(html, &blocks);
    sanitize(&html, &Policy::with_mathml())
}

/// Render one expression and stash the result (or the escaped original on
/// failure) in the block table, returning the placeholder token.
fn shield_expression(
    expression: &str,
    original: &str,
    display_mode: bool,
    engine: &EngineSlot,
    blocks: &mut Vec<String>,
) -> String {
    let token = format!("SHIELDEDMATH{}ENDSHIELD", blocks.len());
    let translated = translate_unicode_math(expression);
    let rendered = match engine.render(&translated, display_mode) {
        Some(Ok(markup)) => markup,
        _ => escape_html(original),
    };
    blocks.push(rendered);
    token
}

/// Restore placeholders. Wrapped contexts first: a token comrak put in
/// its own paragraph becomes a display-math container, a token comrak
/// wrapped in inline code loses the wrapper; bare tokens are replaced
/// last.
fn unshield(mut html: String, blocks: &[String]) -> String {
    for (index, rendered) in blocks.iter().enumerate() {
        let token = format!("SHIELDEDMATH{index}ENDSHIELD");
        html = html.replace(
            &format!("<p>{token}</p>"),
            &format!("<div class=\"katex-display\">{rendered}</div>"),
        );
        html = html.replace(&format!("<code>{token}</code>"), rendered);
        html = html.replace(&token, rendered);
    }
    html
}

fn markdown_to_html(source: &str) -> String {
    comrak::markdown_to_html(source, &comrak_options())
}

fn comrak_options() -> ComrakOptions<'static> {
    let mut options = ComrakOptions::default();
    options.extension.table = true;
    options.extension.strikethrough = true;
    options.extension.autolink = true;
    options.extension.tasklist = true;
    options.extension.superscript = true;
    // Raw HTML passes through the engine untouched; the sanitizer is the
    // single gate deciding what survives.
    options.render.unsafe_ = true;
    options
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_support::ready_slot;

    #[test]
    fn display_math_paragraph_becomes_display_container() {
        let html = render_markdown_cell("before\n\n$$x^2$$\n\nafter", &ready_slot());
        assert!(html.contains("<div class=\"katex-display\">"));
        assert!(html.contains("math-display"));
        assert!(!html.contains("SHIELDEDMATH"));
    }

    #[test]
    fn inline_math_renders_within_a_sentence() {
        let html = render_markdown_cell("the value $x$ grows", &ready_slot());
        assert!(html.contains("math-inline"));
        assert!(html.contains("the value"));
    }

    #[test]
    fn latex_environment_renders_as_display_math() {
        let source = "\\begin{aligned}x &= y\\\\ y &= z\\end{aligned}";
        let html = render_markdown_cell(source, &ready_slot());
        assert!(html.contains("math-display"));
        assert!(!html.contains("SHIELDEDMATH"));
    }

    #[test]
    fn token_wrapped_in_inline_code_is_unshielded() {
        let html = render_markdown_cell("run `$x$` now", &ready_slot());
        assert!(html.contains("math-inline"));
        assert!(!html.contains("SHIELDEDMATH"));
    }

    #[test]
    fn failed_math_falls_back_to_escaped_source() {
        let html = render_markdown_cell("$$\\badmath$$", &ready_slot());
        assert!(html.contains("$$\\badmath$$"));
        assert!(!html.contains("math-display"));
    }

    #[test]
    fn degraded_render_without_engine_keeps_markdown() {
        let slot = EngineSlot::empty();
        let html = render_markdown_cell("# Title\n\nvalue $x$", &slot);
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("$x$"));
        assert!(!html.contains("math-inline"));
    }

    #[test]
    fn markdown_pathway_is_sanitized() {
        let html = render_markdown_cell(
            "safe\n\n<script>alert(1)</script>\n\n<p onclick=\"x()\">para</p>",
            &ready_slot(),
        );
        assert!(!html.contains("<script"));
        assert!(!html.contains("onclick"));
        assert!(html.contains("para"));
    }

    #[test]
    fn markdown_structures_come_from_the_engine() {
        let html = render_markdown_cell("- one\n- two\n\n**bold**", &ready_slot());
        assert!(html.contains("<ul>"));
        assert!(html.contains("<li>one</li>"));
        assert!(html.contains("<strong>bold</strong>"));
    }
}
