//! Unicode math symbol to TeX notation translation
//!
//! Notebook authors paste Unicode math (`√`, Greek letters, arrows) into
//! text that later goes through the TeX-based math engine. This pass
//! rewrites those symbols into their TeX spellings beforehand. Radicals
//! get grouped first so `√(a+b)` and `√x2` become proper `\sqrt{...}`
//! groups; everything else is a literal table substitution over the whole
//! string. Unmapped characters pass through untouched.

use once_cell::sync::Lazy;
use regex::Regex;

static RADICAL_GROUP_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"√\((.*?)\)").unwrap());
static RADICAL_RUN_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"√([a-zA-Z0-9_ᾱα-ωΑ-Ω]+)").unwrap());

/// Symbol table. No replacement contains another source symbol, so the
/// substitution order across entries does not matter.
const SYMBOL_TABLE: &[(char, &str)] = &[
    ('√', r"\sqrt"),
    ('ᾱ', r"\bar{\alpha}"),
    ('α', r"\alpha"),
    ('β', r"\beta"),
    ('ε', r"\epsilon"),
    ('λ', r"\lambda"),
    ('μ', r"\mu"),
    ('σ', r"\sigma"),
    ('π', r"\pi"),
    ('θ', r"\theta"),
    ('δ', r"\delta"),
    ('Δ', r"\Delta"),
    ('Σ', r"\Sigma"),
    ('Ω', r"\Omega"),
    ('∞', r"\infty"),
    ('≈', r"\approx"),
    ('≠', r"\neq"),
    ('±', r"\pm"),
    ('×', r"\times"),
    ('÷', r"\div"),
    ('≤', r"\le"),
    ('≥', r"\ge"),
    ('→', r"\rightarrow"),
    ('⇒', r"\Rightarrow"),
    ('∫', r"\int"),
    ('∂', r"\partial"),
    ('∇', r"\nabla"),
    ('⋅', r"\cdot"),
    ('∗', r"\ast"),
    ('…', r"\dots"),
];

/// Rewrite Unicode math symbols as TeX notation.
pub fn translate_unicode_math(text: &str) -> String {
    let processed = RADICAL_GROUP_REGEX.replace_all(text, r"\sqrt{${1}}");
    let mut processed = RADICAL_RUN_REGEX
        .replace_all(&processed, r"\sqrt{${1}}")
        .into_owned();

    for (symbol, replacement) in SYMBOL_TABLE {
        if processed.contains(*symbol) {
            processed = processed.replace(*symbol, replacement);
        }
    }
    processed
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case("√(a+b)", r"\sqrt{a+b}")]
    #[case("√x", r"\sqrt{x}")]
    #[case("√x2y", r"\sqrt{x2y}")]
    #[case("√αβ", r"\sqrt{\alpha\beta}")]
    #[case("α + β ≤ Δ", r"\alpha + \beta \le \Delta")]
    #[case("ᾱ", r"\bar{\alpha}")]
    #[case("x → ∞", r"x \rightarrow \infty")]
    #[case("a ± b ≈ c", r"a \pm b \approx c")]
    fn translates_expected_notation(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(translate_unicode_math(input), expected);
    }

    #[test]
    fn grouped_radical_takes_precedence_over_bare_run() {
        // The parenthesized group must win; a bare-run rewrite would stop
        // at the opening parenthesis.
        assert_eq!(translate_unicode_math("√(x2)"), r"\sqrt{x2}");
    }

    #[test]
    fn unmapped_characters_pass_through() {
        assert_eq!(translate_unicode_math("héllo ♥"), "héllo ♥");
    }

    proptest! {
        #[test]
        fn identity_on_symbol_free_text(input in "[a-zA-Z0-9 ,.;:!?^_{}()+=-]*") {
            prop_assert_eq!(translate_unicode_math(&input), input.clone());
        }

        #[test]
        fn double_application_equals_single_on_symbol_free_text(
            input in "[a-zA-Z0-9 ,.;:!?^_{}()+=-]*"
        ) {
            let once = translate_unicode_math(&input);
            prop_assert_eq!(translate_unicode_math(&once), once.clone());
        }
    }
}
