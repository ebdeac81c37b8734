//! Document/element helpers over `scraper`
//!
//! This module owns all raw tree traversal:
//! - Descendant searches driven by a [`TagSpec`] predicate
//! - Visible-text extraction (whitespace-normalized)
//! - Heading collection for dynamic path discovery
//! - Nearest ancestor `<div>` lookup
//!
//! Documents are read-only after parse; nothing here mutates the tree.

use crate::path::TagSpec;
use scraper::{ElementRef, Html};

/// Heading tag names considered by dynamic discovery, in level order
const HEADING_TAGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];

/// Returns the first strict descendant of `root` matching `spec`
pub fn find_first<'a>(root: ElementRef<'a>, spec: &TagSpec) -> Option<ElementRef<'a>> {
    matching_descendants(root, spec).next()
}

/// Returns every strict descendant of `root` matching `spec`, in document order
pub fn find_all<'a>(root: ElementRef<'a>, spec: &TagSpec) -> Vec<ElementRef<'a>> {
    matching_descendants(root, spec).collect()
}

fn matching_descendants<'a, 'b>(
    root: ElementRef<'a>,
    spec: &'b TagSpec,
) -> impl Iterator<Item = ElementRef<'a>> + 'b
where
    'a: 'b,
{
    // skip(1) excludes the root itself: a step must match below the
    // element the previous step landed on.
    root.descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .filter(move |el| spec.matches(el))
}

/// Finds the first descendant matching `spec`, using its `contents` hint
/// only to disambiguate when more than one element matches.
///
/// The hint is a case-insensitive substring test against each candidate's
/// visible text. With zero or one attribute match the hint is ignored.
pub fn find_with_contents_tiebreak<'a>(
    root: ElementRef<'a>,
    spec: &TagSpec,
) -> Option<ElementRef<'a>> {
    let mut matches = find_all(root, spec);
    tracing::debug!(
        tag = %spec.tag,
        count = matches.len(),
        "attribute search for heading candidates"
    );

    if matches.len() > 1 {
        if let Some(hint) = spec.contents.as_deref() {
            let needle = hint.trim().to_lowercase();
            matches.retain(|el| visible_text(*el, " ").to_lowercase().contains(&needle));
            tracing::debug!(
                hint = %hint,
                count = matches.len(),
                "narrowed candidates by contents hint"
            );
        }
    }

    matches.into_iter().next()
}

/// Extracts the visible text of an element subtree
///
/// Each descendant text node is whitespace-normalized (runs of whitespace
/// collapse to single spaces, edges trimmed); non-empty nodes are joined
/// with `separator`.
pub fn visible_text(element: ElementRef<'_>, separator: &str) -> String {
    element
        .text()
        .map(|chunk| chunk.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|chunk| !chunk.is_empty())
        .collect::<Vec<_>>()
        .join(separator)
}

/// Collects every h1–h6 in the document, in document order, rendered as
/// `<tag attrs>text</tag>` strings for the discovery prompt.
pub fn extract_headings(document: &Html) -> Vec<String> {
    document
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|el| HEADING_TAGS.contains(&el.value().name()))
        .map(render_heading)
        .collect()
}

/// Renders one heading element with its opening tag, attributes, visible
/// text, and closing tag.
fn render_heading(element: ElementRef<'_>) -> String {
    let name = element.value().name();
    let attrs: Vec<String> = element
        .value()
        .attrs()
        .map(|(key, value)| format!("{}=\"{}\"", key, value))
        .collect();

    let open_tag = if attrs.is_empty() {
        format!("<{}>", name)
    } else {
        format!("<{} {}>", name, attrs.join(" "))
    };

    format!("{}{}</{}>", open_tag, visible_text(element, ""), name)
}

/// Returns the nearest ancestor `<div>` of an element, excluding itself
pub fn parent_div<'a>(element: ElementRef<'a>) -> Option<ElementRef<'a>> {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|ancestor| ancestor.value().name() == "div")
}
