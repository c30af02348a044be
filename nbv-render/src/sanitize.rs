//! Strict allow-list HTML sanitizer
//!
//! Pipeline: HTML string → DOM tree → pruned tree → HTML string. Elements
//! outside the policy are removed with their children lifted into the
//! parent; `script`/`style` subtrees are dropped outright; attributes
//! outside the policy and script-scheme URLs are stripped. The math
//! policy extends the default one with the element and attribute sets the
//! math engine's output needs to survive sanitization.

use html5ever::serialize::{SerializeOpts, TraversalScope};
use html5ever::tendril::TendrilSink;
use html5ever::{parse_document, serialize, Attribute, ParseOpts};
use markup5ever_rcdom::{Handle, NodeData, RcDom, SerializableHandle};
use std::cell::RefCell;
use std::collections::HashSet;

const DEFAULT_ELEMENTS: &[&str] = &[
    "a", "abbr", "b", "blockquote", "br", "code", "dd", "del", "details", "div", "dl", "dt",
    "em", "h1", "h2", "h3", "h4", "h5", "h6", "hr", "i", "img", "input", "ins", "kbd", "li",
    "ol", "p", "pre", "q", "s", "samp", "small", "span", "strike", "strong", "sub", "summary",
    "sup", "table", "tbody", "td", "tfoot", "th", "thead", "tr", "u", "ul",
];

const DEFAULT_ATTRIBUTES: &[&str] = &[
    "align", "alt", "checked", "class", "colspan", "disabled", "href", "id", "rowspan", "src",
    "start", "style", "target", "title", "type",
];

/// Math container and layout elements, plus the svg pieces used for
/// stretchy delimiters.
const MATH_ELEMENTS: &[&str] = &[
    "annotation", "math", "maction", "maligngroup", "malignmark", "menclose", "merror",
    "mfenced", "mfrac", "mglyph", "mi", "mlabeledtr", "mlongdiv", "mmultiscripts", "mn", "mo",
    "mover", "mpadded", "mphantom", "mroot", "mrow", "ms", "mscarries", "mscarry", "msgroup",
    "msline", "mspace", "msqrt", "msrow", "mstack", "mstyle", "msub", "msup", "msubsup",
    "mtable", "mtd", "mtext", "mtr", "munder", "munderover", "semantics", "svg", "path",
];

const MATH_ATTRIBUTES: &[&str] = &[
    "accent", "accentunder", "align", "alignunder", "bevelled", "close", "columnsalign",
    "columnlines", "columnspan", "denomalign", "depth", "dir", "display", "displaystyle",
    "encoding", "fence", "frame", "height", "href", "id", "largeop", "length", "linethickness",
    "lspace", "lquote", "mathbackground", "mathcolor", "mathsize", "mathvariant", "maxsize",
    "minsize", "movablelimits", "notation", "numalign", "open", "rowalign", "rowlines",
    "rowspacing", "rowspan", "rspace", "rquote", "scriptlevel", "scriptminsize",
    "scriptsizemultiplier", "selection", "separator", "separators", "stretchy",
    "subscriptshift", "supscriptshift", "symmetric", "voffset", "width", "xmlns", "aria-hidden",
    "d", "viewbox", "preserveaspectratio",
];

/// Which elements and attributes survive sanitization.
pub struct Policy {
    elements: HashSet<&'static str>,
    attributes: HashSet<&'static str>,
}

impl Policy {
    /// Ordinary safe markup only.
    pub fn default_safe() -> Self {
        Policy {
            elements: DEFAULT_ELEMENTS.iter().copied().collect(),
            attributes: DEFAULT_ATTRIBUTES.iter().copied().collect(),
        }
    }

    /// Safe markup plus the math-specific elements and attributes.
    pub fn with_mathml() -> Self {
        let mut policy = Self::default_safe();
        policy.elements.extend(MATH_ELEMENTS.iter().copied());
        policy.attributes.extend(MATH_ATTRIBUTES.iter().copied());
        policy
    }

    fn allows_element(&self, tag: &str) -> bool {
        self.elements.contains(tag)
    }

    fn allows_attribute(&self, name: &str) -> bool {
        self.attributes.contains(name)
    }
}

/// Sanitize an HTML fragment against `policy`.
pub fn sanitize(html: &str, policy: &Policy) -> String {
    let dom = parse_document(RcDom::default(), ParseOpts::default()).one(html);
    let body = match find_body(&dom.document) {
        Some(body) => body,
        None => return String::new(),
    };
    prune_children(&body, policy);
    serialize_children(&body)
}

fn find_body(document: &Handle) -> Option<Handle> {
    let html = child_element(document, "html")?;
    child_element(&html, "body")
}

fn child_element(node: &Handle, tag: &str) -> Option<Handle> {
    node.children
        .borrow()
        .iter()
        .find(|child| {
            matches!(&child.data, NodeData::Element { name, .. } if name.local.as_ref() == tag)
        })
        .cloned()
}

/// Rebuild a node's child list, keeping text, pruning elements
/// recursively, and lifting the children of disallowed elements.
fn prune_children(node: &Handle, policy: &Policy) {
    let original: Vec<Handle> = node.children.borrow().clone();
    let mut kept: Vec<Handle> = Vec::new();

    for child in original {
        match &child.data {
            NodeData::Text { .. } => kept.push(child.clone()),
            NodeData::Element { name, attrs, .. } => {
                let tag = name.local.as_ref().to_ascii_lowercase();
                if tag == "script" || tag == "style" {
                    continue;
                }
                prune_children(&child, policy);
                if policy.allows_element(&tag) {
                    retain_attributes(attrs, policy);
                    kept.push(child.clone());
                } else {
                    kept.extend(child.children.borrow().iter().cloned());
                }
            }
            // Comments, doctypes and processing instructions are dropped.
            _ => {}
        }
    }

    *node.children.borrow_mut() = kept;
}

fn retain_attributes(attrs: &RefCell<Vec<Attribute>>, policy: &Policy) {
    attrs.borrow_mut().retain(|attr| {
        let name = attr.name.local.as_ref().to_ascii_lowercase();
        if !policy.allows_attribute(name.as_str()) {
            return false;
        }
        if (name == "href" || name == "src") && has_script_scheme(&attr.value) {
            return false;
        }
        true
    });
}

fn has_script_scheme(value: &str) -> bool {
    value.trim().to_ascii_lowercase().starts_with("javascript:")
}

fn serialize_children(node: &Handle) -> String {
    let mut output = Vec::new();
    let opts = SerializeOpts {
        traversal_scope: TraversalScope::IncludeNode,
        ..Default::default()
    };

    for child in node.children.borrow().iter() {
        let serializable = SerializableHandle::from(child.clone());
        if serialize(&mut output, &serializable, opts.clone()).is_err() {
            return String::new();
        }
    }

    String::from_utf8(output).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_subtrees_are_dropped() {
        let clean = sanitize("<p>hi</p><script>alert(1)</script>", &Policy::default_safe());
        assert!(clean.contains("<p>hi</p>"));
        assert!(!clean.contains("script"));
        assert!(!clean.contains("alert"));
    }

    #[test]
    fn unknown_attributes_are_stripped() {
        let clean = sanitize(
            "<p onclick=\"steal()\" class=\"note\">hi</p>",
            &Policy::default_safe(),
        );
        assert!(!clean.contains("onclick"));
        assert!(clean.contains("class=\"note\""));
    }

    #[test]
    fn disallowed_elements_keep_their_children() {
        let clean = sanitize("<article><p>kept</p></article>", &Policy::default_safe());
        assert!(!clean.contains("article"));
        assert!(clean.contains("<p>kept</p>"));
    }

    #[test]
    fn script_scheme_urls_are_removed() {
        let clean = sanitize(
            "<a href=\"javascript:alert(1)\">x</a><a href=\"https://ok\">y</a>",
            &Policy::default_safe(),
        );
        assert!(!clean.contains("javascript:"));
        assert!(clean.contains("href=\"https://ok\""));
    }

    #[test]
    fn math_elements_survive_only_the_math_policy() {
        let input = "<math display=\"block\"><mi>x</mi></math>";

        let with_math = sanitize(input, &Policy::with_mathml());
        assert!(with_math.contains("<mi>"));
        assert!(with_math.contains("display=\"block\""));

        let default = sanitize(input, &Policy::default_safe());
        assert!(!default.contains("<math"));
        assert!(default.contains('x'));
    }

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(sanitize("just text", &Policy::default_safe()), "just text");
    }
}
