//! Standalone HTML page wrapping for rendered notebooks
//!
//! Embeds the viewer stylesheet and the anchor-interception script so the
//! output file works on its own. The math engine's stylesheet is linked
//! from a CDN; without network access math still renders, just unstyled.

use crate::escape::escape_html;

const PAGE_CSS: &str = include_str!("../css/page.css");
const ANCHOR_JS: &str = include_str!("../js/anchors.js");

const KATEX_CSS_URL: &str = "https://cdn.jsdelivr.net/npm/katex@0.16.11/dist/katex.min.css";

/// Wrap a rendered body in a complete HTML document.
pub fn wrap_page(title: &str, body_html: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <meta name="generator" content="nbv">
  <title>{}</title>
  <link rel="stylesheet" href="{}">
  <style>
{}
  </style>
</head>
<body>
<div class="nb-page">
{}
</div>
<script>
{}
</script>
</body>
</html>"#,
        escape_html(title),
        KATEX_CSS_URL,
        PAGE_CSS,
        body_html,
        ANCHOR_JS
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_contains_title_body_and_assets() {
        let page = wrap_page("My <Notebook>", "<p>content</p>");
        assert!(page.contains("<title>My &lt;Notebook&gt;</title>"));
        assert!(page.contains("<p>content</p>"));
        assert!(page.contains("<style>"));
        assert!(page.contains("katex.min.css"));
    }

    #[test]
    fn page_script_intercepts_anchor_links() {
        let page = wrap_page("t", "");
        assert!(page.contains("a[data-anchor=\"true\"]"));
        assert!(page.contains("preventDefault"));
        assert!(page.contains("scrollIntoView"));
    }
}
