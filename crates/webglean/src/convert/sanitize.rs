//! Removal of non-content subtrees
//!
//! Only signals visible on the element itself are honored: tag names, ARIA
//! roles, the `hidden` / `aria-hidden` attributes and inline `style`
//! declarations. Classes hidden by external stylesheets are not resolved.

use super::document::{Document, Element, NodeData};

/// Elements that never carry readable content
const NON_CONTENT_TAGS: &[&str] = &[
    "script", "style", "noscript", "template", "head", "iframe", "object", "embed", "svg",
    "canvas", "math",
];

/// Page chrome and interactive controls
const CHROME_TAGS: &[&str] = &[
    "nav", "aside", "footer", "form", "button", "input", "select", "textarea", "dialog",
];

/// ARIA landmark roles that mark page chrome
const CHROME_ROLES: &[&str] = &[
    "navigation",
    "banner",
    "contentinfo",
    "complementary",
    "search",
    "menu",
];

/// Return a copy of `doc` without scripts, styles, page chrome and hidden elements
pub fn sanitize(doc: &Document) -> Document {
    doc.filtered(|data| match data {
        NodeData::Element(el) => is_removed(el),
        _ => false,
    })
}

/// True if the element and its subtree must not reach the output
fn is_removed(el: &Element) -> bool {
    let name = el.name();
    if NON_CONTENT_TAGS.contains(&name) || CHROME_TAGS.contains(&name) {
        return true;
    }

    if let Some(role) = el.attr("role") {
        let role = role.trim().to_ascii_lowercase();
        if CHROME_ROLES.contains(&role.as_str()) {
            return true;
        }
    }

    is_hidden(el)
}

/// Inline hiding signals
fn is_hidden(el: &Element) -> bool {
    if el.has_attr("hidden") {
        return true;
    }

    if el
        .attr("aria-hidden")
        .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
    {
        return true;
    }

    el.attr("style").is_some_and(style_hides)
}

/// Check an inline style attribute for `display: none` or `visibility: hidden`
///
/// Later declarations win, as in CSS.
fn style_hides(style: &str) -> bool {
    let mut display_none = false;
    let mut visibility_hidden = false;

    for declaration in style.split(';') {
        let Some((property, value)) = declaration.split_once(':') else {
            continue;
        };
        let property = property.trim().to_ascii_lowercase();
        let value = value.to_ascii_lowercase();
        let value = value.trim().trim_end_matches("!important").trim();

        match property.as_str() {
            "display" => display_none = value == "none",
            "visibility" => visibility_hidden = value == "hidden" || value == "collapse",
            _ => {}
        }
    }

    display_none || visibility_hidden
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body_text(html: &str) -> String {
        let doc = sanitize(&Document::parse(html));
        match doc.find("body") {
            Some(body) => doc.text_content(body),
            None => String::new(),
        }
    }

    #[test]
    fn test_removes_script_and_style() {
        let text = body_text("<p>a</p><script>evil()</script><style>p{}</style><p>b</p>");
        assert_eq!(text, "ab");
    }

    #[test]
    fn test_removes_head() {
        let doc = sanitize(&Document::parse(
            "<html><head><title>T</title><style>x</style></head><body>B</body></html>",
        ));
        assert!(doc.find("head").is_none());
        assert!(doc.find("title").is_none());
        assert_eq!(doc.text_content(doc.root()), "B");
    }

    #[test]
    fn test_removes_chrome() {
        let text = body_text(
            "<nav>menu</nav><main>content</main><aside>ads</aside><footer>legal</footer>",
        );
        assert_eq!(text, "content");
    }

    #[test]
    fn test_removes_chrome_roles() {
        let text = body_text(
            r#"<div role="navigation">menu</div><div role="Banner">logo</div><div role="main">x</div>"#,
        );
        assert_eq!(text, "x");
    }

    #[test]
    fn test_removes_hidden_attribute() {
        assert_eq!(body_text("<p hidden>secret</p><p>shown</p>"), "shown");
        assert_eq!(
            body_text(r#"<p aria-hidden="true">secret</p><p aria-hidden="false">shown</p>"#),
            "shown"
        );
    }

    #[test]
    fn test_removes_inline_display_none() {
        assert_eq!(
            body_text(r#"<div style="color: red; DISPLAY : None !important">x</div>y"#),
            "y"
        );
        assert_eq!(body_text(r#"<div style="visibility:hidden">x</div>y"#), "y");
    }

    #[test]
    fn test_keeps_visible_styles() {
        assert_eq!(body_text(r#"<div style="display:block">x</div>"#), "x");
        assert_eq!(
            body_text(r#"<div style="display:none; display:block">x</div>"#),
            "x"
        );
    }

    #[test]
    fn test_style_hides() {
        assert!(style_hides("display:none"));
        assert!(style_hides("  display :  none ;"));
        assert!(style_hides("visibility: collapse"));
        assert!(!style_hides("display: inline-block"));
        assert!(!style_hides("font-family: none"));
        assert!(!style_hides("garbage"));
    }

    #[test]
    fn test_sanitize_leaves_input_untouched() {
        let doc = Document::parse("<p>a</p><script>b</script>");
        let before = doc.len();
        let clean = sanitize(&doc);
        assert_eq!(doc.len(), before);
        assert!(doc.find("script").is_some());
        assert!(clean.find("script").is_none());
    }

    #[test]
    fn test_non_html_input() {
        assert_eq!(body_text("just some words"), "just some words");
        assert_eq!(body_text(""), "");
    }
}
