//! Math/code shielding translator for rich text previews
//!
//! Converts raw cell text to trusted HTML through an ordered pipeline of
//! passes. Fenced code and math spans use delimiters that collide with
//! the prose syntax (backticks inside math, dollar signs inside code), so
//! they are extracted first and replaced with numbered placeholder
//! tokens; the structural passes then run over the remaining text, and
//! the final pass restores the shielded fragments at their exact token
//! positions.
//!
//! Pipeline: shield code → shield math → structural markup → blockquotes
//! → list wrapping → paragraph wrapping → unshield (math, then code).
//!
//! The stages operate on a text-plus-side-tables value so each one stays
//! independently testable; the tables are keyed by sequential index.

use crate::engine::{Availability, EngineSlot};
use crate::escape::escape_html;
use crate::unicode::translate_unicode_math;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static FENCE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)```(.*?)```").unwrap());
static DISPLAY_MATH_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\$\$(.*?)\$\$").unwrap());
static INLINE_MATH_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$([^\$\n]+?)\$").unwrap());

static H1_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^# (.*)$").unwrap());
static H2_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^## (.*)$").unwrap());
static H3_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^### (.*)$").unwrap());
static HR_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^---$").unwrap());
static BOLD_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*(.*?)\*\*").unwrap());
static ITALIC_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*(.*?)\*").unwrap());
static IMAGE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"!\[(.*?)\]\((.*?)\)").unwrap());
static LINK_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[(.*?)\]\((.*?)\)").unwrap());
static ORDERED_ITEM_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^(\d+)\. (.*)$").unwrap());
static UNORDERED_ITEM_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^- (.*)$").unwrap());
static INLINE_CODE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"`([^`]+)`").unwrap());

static SLUG_STRIP_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s-]").unwrap());
static SLUG_COLLAPSE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s_-]+").unwrap());
static SLUG_TRIM_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-+|-+$").unwrap());

/// Text state threaded through the pipeline: the working text plus the
/// two ordered side tables of shielded fragments.
struct Shielded {
    text: String,
    code: Vec<String>,
    math: Vec<String>,
}

/// Render raw cell text to trusted HTML for the rich preview pathway.
///
/// The result is final markup: code and text content were escaped where
/// they were captured, and math engine output is trusted as-is, so
/// callers must not escape it again.
pub fn render_preview(content: &str, engine: &EngineSlot) -> String {
    if content.is_empty() {
        return String::new();
    }

    let state = Shielded {
        text: content.to_string(),
        code: Vec::new(),
        math: Vec::new(),
    };
    let state = shield_code(state, engine);
    let state = shield_math(state, engine);

    let text = structural_pass(&state.text);
    let text = blockquote_pass(&text);
    let text = wrap_lists(&text);
    let text = wrap_paragraphs(&text);
    let text = unshield(text, &state.math, &state.code);

    format!("<div class=\"preview-inner\">{text}</div>")
}

/// Derive a slug identifier from heading text: lowercase, trimmed,
/// non-word characters stripped, whitespace/underscore/hyphen runs
/// collapsed to single hyphens.
pub fn slugify(text: &str) -> String {
    let lowered = text.to_lowercase();
    let stripped = SLUG_STRIP_REGEX.replace_all(lowered.trim(), "");
    let collapsed = SLUG_COLLAPSE_REGEX.replace_all(&stripped, "-");
    SLUG_TRIM_REGEX.replace_all(&collapsed, "").into_owned()
}

/// Stage 1: extract fenced code blocks into the code table.
fn shield_code(state: Shielded, engine: &EngineSlot) -> Shielded {
    let Shielded {
        text,
        mut code,
        math,
    } = state;
    let text = FENCE_REGEX
        .replace_all(&text, |caps: &Captures| {
            let token = format!("__CODE_BLOCK_{}__", code.len());
            code.push(render_fenced_block(&caps[1], engine));
            token
        })
        .into_owned();
    Shielded { text, code, math }
}

fn render_fenced_block(body: &str, engine: &EngineSlot) -> String {
    let lines: Vec<&str> = body.split('\n').collect();
    let first_line = lines[0].trim();

    if first_line == "math" && engine.availability() == Availability::Available {
        let expression = translate_unicode_math(lines[1..].join("\n").trim());
        return match engine.render(&expression, true) {
            Some(Ok(markup)) => format!("<div class=\"katex-display\">{markup}</div>"),
            _ => format!("<pre><code>{}</code></pre>", escape_html(&expression)),
        };
    }

    // First line is an optional language tag: a single word, shown as a
    // badge, not part of the code.
    let lang = if lines.len() > 1 && !first_line.is_empty() && !first_line.contains(' ') {
        first_line
    } else {
        ""
    };
    let content = if lang.is_empty() {
        body.to_string()
    } else {
        lines[1..].join("\n")
    };
    let mut processed = escape_html(content.trim());

    // Inline math inside code samples: substituted over the already
    // escaped text so only the dollar spans become markup.
    if engine.availability() == Availability::Available {
        processed = INLINE_MATH_REGEX
            .replace_all(&processed, |caps: &Captures| {
                let expression = translate_unicode_math(&caps[1]);
                match engine.render(&expression, false) {
                    Some(Ok(markup)) => markup,
                    _ => caps[0].to_string(),
                }
            })
            .into_owned();
    }

    let badge = if lang.is_empty() {
        String::new()
    } else {
        format!("<span class=\"nb-lang-badge\">{lang}</span>")
    };
    format!("<pre>{badge}<code>{processed}</code></pre>")
}

/// Stage 2: extract display then inline math into the math table. With
/// no engine installed the text passes through untouched and degrades to
/// literal dollar syntax.
fn shield_math(state: Shielded, engine: &EngineSlot) -> Shielded {
    if engine.availability() != Availability::Available {
        return state;
    }
    let Shielded {
        text,
        code,
        mut math,
    } = state;

    let text = DISPLAY_MATH_REGEX
        .replace_all(&text, |caps: &Captures| {
            let token = format!("__MATH_BLOCK_{}__", math.len());
            let expression = translate_unicode_math(caps[1].trim());
            let rendered = match engine.render(&expression, true) {
                Some(Ok(markup)) => format!("<div class=\"katex-display\">{markup}</div>"),
                _ => escape_html(&caps[0]),
            };
            math.push(rendered);
            token
        })
        .into_owned();

    let text = INLINE_MATH_REGEX
        .replace_all(&text, |caps: &Captures| {
            let token = format!("__MATH_BLOCK_{}__", math.len());
            let expression = translate_unicode_math(caps[1].trim());
            let rendered = match engine.render(&expression, false) {
                Some(Ok(markup)) => markup,
                _ => escape_html(&caps[0]),
            };
            math.push(rendered);
            token
        })
        .into_owned();

    Shielded { text, code, math }
}

/// Stage 3: headings, rules, emphasis, images, links, list items and
/// inline code over the shielded text.
fn structural_pass(text: &str) -> String {
    let text = H1_REGEX.replace_all(text, |caps: &Captures| {
        format!("<h1 id=\"{}\">{}</h1>", slugify(&caps[1]), &caps[1])
    });
    let text = H2_REGEX.replace_all(&text, |caps: &Captures| {
        format!("<h2 id=\"{}\">{}</h2>", slugify(&caps[1]), &caps[1])
    });
    let text = H3_REGEX.replace_all(&text, |caps: &Captures| {
        format!("<h3 id=\"{}\">{}</h3>", slugify(&caps[1]), &caps[1])
    });
    let text = HR_REGEX.replace_all(&text, "<hr />");
    let text = BOLD_REGEX.replace_all(&text, "<strong>${1}</strong>");
    let text = ITALIC_REGEX.replace_all(&text, "<em>${1}</em>");
    let text = IMAGE_REGEX.replace_all(&text, "<img alt=\"${1}\" src=\"${2}\" />");
    let text = LINK_REGEX.replace_all(&text, |caps: &Captures| {
        let label = &caps[1];
        let url = &caps[2];
        if url.starts_with('#') {
            // In-page anchor: navigation is intercepted by the page
            // script and turned into a scroll.
            format!("<a href=\"{url}\" data-anchor=\"true\">{label}</a>")
        } else {
            format!("<a href=\"{url}\" target=\"_blank\">{label}</a>")
        }
    });
    let text = ORDERED_ITEM_REGEX.replace_all(&text, "<li value=\"${1}\">${2}</li>");
    let text = UNORDERED_ITEM_REGEX.replace_all(&text, "<li>${1}</li>");
    let text = INLINE_CODE_REGEX.replace_all(&text, "<code>${1}</code>");
    text.into_owned()
}

/// Stage 4: group consecutive `> ` lines into one blockquote with line
/// breaks. A blank or non-quote line closes the group; the closing blank
/// line is consumed.
fn blockquote_pass(text: &str) -> String {
    let mut final_lines: Vec<String> = Vec::new();
    let mut quoted: Vec<String> = Vec::new();

    for line in text.split('\n') {
        if let Some(rest) = line.strip_prefix("> ") {
            quoted.push(rest.to_string());
        } else if !quoted.is_empty() {
            final_lines.push(format!("<blockquote>{}</blockquote>", quoted.join("<br />")));
            quoted.clear();
            if !line.trim().is_empty() {
                final_lines.push(line.to_string());
            }
        } else {
            final_lines.push(line.to_string());
        }
    }
    if !quoted.is_empty() {
        final_lines.push(format!("<blockquote>{}</blockquote>", quoted.join("<br />")));
    }
    final_lines.join("\n")
}

/// Stage 5: wrap maximal runs of list items in an ordered or unordered
/// container, chosen by whether the run started from a numbered line.
fn wrap_lists(text: &str) -> String {
    let mut out: Vec<String> = Vec::new();
    let mut run: Vec<&str> = Vec::new();

    for line in text.split('\n') {
        if line.starts_with("<li") {
            run.push(line);
        } else {
            flush_list_run(&mut run, &mut out);
            out.push(line.to_string());
        }
    }
    flush_list_run(&mut run, &mut out);
    out.join("\n")
}

fn flush_list_run(run: &mut Vec<&str>, out: &mut Vec<String>) {
    if run.is_empty() {
        return;
    }
    let tag = if run[0].starts_with("<li value=") {
        "ol"
    } else {
        "ul"
    };
    out.push(format!("<{tag}>{}</{tag}>", run.concat()));
    run.clear();
}

/// Stage 6: wrap lines that are not already block-level markup in
/// paragraph elements. The "already block-level" check is a heuristic on
/// the tag's first letter and is known to misfire on unrelated lines
/// starting with `<`; it is kept as-is.
fn wrap_paragraphs(text: &str) -> String {
    text.split('\n')
        .map(|line| {
            let block_level = line.starts_with('<')
                && line
                    .chars()
                    .nth(1)
                    .is_some_and(|second| "hbpuolids".contains(second));
            if block_level {
                line.to_string()
            } else {
                format!("<p>{line}</p>")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Stage 7: restore math placeholders first, then code placeholders, each
/// at its exact token position.
fn unshield(mut text: String, math: &[String], code: &[String]) -> String {
    for (index, rendered) in math.iter().enumerate() {
        text = text.replacen(&format!("__MATH_BLOCK_{index}__"), rendered, 1);
    }
    for (index, rendered) in code.iter().enumerate() {
        text = text.replacen(&format!("__CODE_BLOCK_{index}__"), rendered, 1);
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_support::ready_slot;
    use once_cell::sync::Lazy;
    use rstest::rstest;

    static PLACEHOLDER_REGEX: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"__[A-Z]+_BLOCK_\d+__").unwrap());

    #[test]
    fn math_fence_renders_as_display_math() {
        let html = render_preview("```math\nx^2\n```", &ready_slot());
        assert!(html.contains("<div class=\"katex-display\">"));
        assert!(html.contains("x^2"));
    }

    #[test]
    fn malformed_math_fence_falls_back_to_escaped_pre() {
        let html = render_preview("```math\n\\badmath\n```", &ready_slot());
        assert!(html.contains("<pre><code>\\badmath</code></pre>"));
        assert!(!html.contains("katex-display"));
    }

    #[test]
    fn code_fence_gets_language_badge_and_escaping() {
        let html = render_preview("```python\nprint(1 < 2)\n```", &ready_slot());
        assert!(html.contains("<span class=\"nb-lang-badge\">python</span>"));
        assert!(html.contains("print(1 &lt; 2)"));
    }

    #[test]
    fn inline_math_inside_code_fence_is_substituted() {
        let html = render_preview("```python\n# cost is $x^2$ here\n```", &ready_slot());
        assert!(html.contains("<span class=\"math-inline\">x^2</span>"));
    }

    #[test]
    fn code_fence_without_language_keeps_full_body() {
        let html = render_preview("```\nfirst line\nsecond\n```", &ready_slot());
        assert!(!html.contains("nb-lang-badge"));
        assert!(html.contains("first line\nsecond"));
    }

    #[test]
    fn display_and_inline_math_render_in_their_modes() {
        let html = render_preview("$$a+b$$\n\nwith $c$ inline", &ready_slot());
        assert!(html.contains("<div class=\"katex-display\"><span class=\"math-display\">a+b</span></div>"));
        assert!(html.contains("<span class=\"math-inline\">c</span>"));
    }

    #[test]
    fn failing_display_math_falls_back_to_escaped_source() {
        let html = render_preview("$$\\badmath$$", &ready_slot());
        assert!(html.contains("$$\\badmath$$"));
        assert!(!html.contains("katex-display"));
    }

    #[test]
    fn no_placeholder_survives_well_formed_input() {
        let input = "# Title\n\n```python\ncode $a$\n```\n\n$$x$$ and $y$ here\n\n```\nmore\n```";
        let html = render_preview(input, &ready_slot());
        assert!(
            !PLACEHOLDER_REGEX.is_match(&html),
            "placeholder leaked into output: {html}"
        );
    }

    #[test]
    fn engine_unavailable_degrades_math_to_literal_text() {
        let slot = EngineSlot::empty();
        let html = render_preview("value of $x$", &slot);
        assert!(html.contains("value of $x$"));

        // A math fence without an engine renders as a labeled code block.
        let html = render_preview("```math\nx^2\n```", &slot);
        assert!(html.contains("<span class=\"nb-lang-badge\">math</span>"));
        assert!(!html.contains("katex-display"));
    }

    #[rstest]
    #[case("Hello, World!", "hello-world")]
    #[case("  Spaces  and_underscores ", "spaces-and-underscores")]
    #[case("--edgy--", "edgy")]
    #[case("Already-Hyphenated Words", "already-hyphenated-words")]
    fn slug_derivation(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(slugify(input), expected);
    }

    #[test]
    fn headings_carry_slug_ids() {
        let html = render_preview("# Hello, World!", &ready_slot());
        assert!(html.contains("<h1 id=\"hello-world\">Hello, World!</h1>"));
    }

    #[test]
    fn anchor_links_are_marked_and_external_links_open_new_context() {
        let html = render_preview("[jump](#section-1) and [out](https://example.com)", &ready_slot());
        assert!(html.contains("<a href=\"#section-1\" data-anchor=\"true\">jump</a>"));
        assert!(html.contains("<a href=\"https://example.com\" target=\"_blank\">out</a>"));
    }

    #[test]
    fn blockquote_lines_group_into_one_element() {
        let html = render_preview("> first\n> second\n\nafter", &ready_slot());
        assert!(html.contains("<blockquote>first<br />second</blockquote>"));
        assert!(html.contains("<p>after</p>"));
    }

    #[test]
    fn ordered_and_unordered_runs_get_matching_containers() {
        let html = render_preview("1. one\n2. two", &ready_slot());
        assert!(html.contains("<ol><li value=\"1\">one</li><li value=\"2\">two</li></ol>"));

        let html = render_preview("- a\n- b", &ready_slot());
        assert!(html.contains("<ul><li>a</li><li>b</li></ul>"));
    }

    #[test]
    fn inline_emphasis_images_and_code() {
        let html = render_preview(
            "**bold** and *soft* with `code` and ![alt text](pic.png)",
            &ready_slot(),
        );
        assert!(html.contains("<strong>bold</strong>"));
        assert!(html.contains("<em>soft</em>"));
        assert!(html.contains("<code>code</code>"));
        assert!(html.contains("<img alt=\"alt text\" src=\"pic.png\" />"));
    }

    #[test]
    fn plain_lines_are_wrapped_in_paragraphs() {
        let html = render_preview("just prose", &ready_slot());
        assert!(html.contains("<p>just prose</p>"));
    }

    #[test]
    fn empty_input_renders_empty() {
        assert_eq!(render_preview("", &ready_slot()), "");
    }
}
