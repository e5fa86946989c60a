use crate::error::OdFetchError;
use scraper::{ElementRef, Html};
use std::fmt;

/// One step of a path through the document tree: a tag name and, optionally, the element id.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HtmlSelector {
    pub tag: &'static str,
    pub id: Option<&'static str>,
}

impl HtmlSelector {
    pub const fn tag(tag: &'static str) -> Self {
        Self { tag, id: None }
    }

    pub const fn tag_with_id(tag: &'static str, id: &'static str) -> Self {
        Self { tag, id: Some(id) }
    }

    fn matches(&self, element: &ElementRef<'_>) -> bool {
        let value = element.value();
        value.name() == self.tag && self.id.is_none_or(|id| value.id() == Some(id))
    }
}

impl fmt::Display for HtmlSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.id {
            Some(id) => write!(f, "<{} id=\"{}\">", self.tag, id),
            None => write!(f, "<{}>", self.tag),
        }
    }
}

/// Walks `path` from the document root, matching each selector against the immediate
/// element children of the previous match. The first matching child wins.
pub fn find_element<'a>(
    document: &'a Html,
    path: &[HtmlSelector],
) -> Result<ElementRef<'a>, OdFetchError> {
    let mut current = document.tree.root();
    let mut found = None;

    for selector in path {
        let next = current
            .children()
            .filter_map(ElementRef::wrap)
            .find(|child| selector.matches(child))
            .ok_or_else(|| {
                OdFetchError::structure(format!("unable to find element {selector}"))
            })?;
        current = *next;
        found = Some(next);
    }

    found.ok_or_else(|| OdFetchError::structure("empty element path"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PATH: [HtmlSelector; 4] = [
        HtmlSelector::tag("html"),
        HtmlSelector::tag("body"),
        HtmlSelector::tag_with_id("div", "runtime"),
        HtmlSelector::tag_with_id("script", "data"),
    ];

    #[test]
    fn test_finds_nested_element() {
        let document = Html::parse_document(
            r#"<html><body>
                <div id="other"><script id="data">wrong</script></div>
                <div id="runtime"><script>skip</script><script id="data">right</script></div>
            </body></html>"#,
        );
        let element = find_element(&document, &PATH).unwrap();
        assert_eq!(element.text().collect::<String>(), "right");
    }

    #[test]
    fn test_only_immediate_children_are_considered() {
        let document = Html::parse_document(
            r#"<html><body><section><div id="runtime"><script id="data">x</script></div></section></body></html>"#,
        );
        let err = find_element(&document, &PATH).unwrap_err();
        assert!(matches!(err, OdFetchError::Structure { .. }));
        assert!(err.to_string().contains("<div id=\"runtime\">"));
    }

    #[test]
    fn test_missing_tag_is_named() {
        let document =
            Html::parse_document(r#"<html><body><div id="runtime"></div></body></html>"#);
        let err = find_element(&document, &PATH).unwrap_err();
        assert!(err.to_string().contains("<script id=\"data\">"));
    }

    #[test]
    fn test_empty_path_is_an_error() {
        let document = Html::parse_document("<html></html>");
        assert!(find_element(&document, &[]).is_err());
    }
}
