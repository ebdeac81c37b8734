//! Tag-chain data model and element matching rules

use scraper::ElementRef;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One step in a tag chain: a required tag name plus attribute criteria
///
/// The serde shape mirrors what the discovery model is prompted to emit,
/// e.g. `{"tag": "div", "id": "dealer-comments", "class": "a b"}` —
/// every key other than `tag` and `contents` is treated as an HTML
/// attribute to match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagSpec {
    /// Tag name to match (mandatory, never empty)
    pub tag: String,

    /// Expected attribute values; see [`TagSpec::matches`] for semantics
    #[serde(flatten)]
    pub attrs: BTreeMap<String, String>,

    /// Optional visible-text substring hint, used only for
    /// disambiguation between multiple attribute matches
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contents: Option<String>,
}

/// One candidate path from an ancestor down to the description element,
/// outermost to innermost
pub type TagChain = Vec<TagSpec>;

/// Ordered alternatives, tried in order; the first chain to match
/// anything wins
pub type TagChainSet = Vec<TagChain>;

impl TagSpec {
    /// Creates a spec matching a bare tag name
    pub fn new(tag: &str) -> Self {
        TagSpec {
            tag: tag.to_string(),
            attrs: BTreeMap::new(),
            contents: None,
        }
    }

    /// Adds an attribute criterion
    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.insert(name.to_string(), value.to_string());
        self
    }

    /// Sets the visible-text disambiguation hint
    pub fn contents(mut self, text: &str) -> Self {
        self.contents = Some(text.to_string());
        self
    }

    /// Tests whether an element satisfies this spec
    ///
    /// # Matching rules
    ///
    /// * Tag names compare case-insensitively.
    /// * `class` matches if ANY of the expected value's space/comma-split
    ///   tokens appears among the element's class tokens. Dealer markup
    ///   stacks modifier classes (`dealer-comments dealer-comments--square`),
    ///   so exact string equality on `class` would silently match nothing.
    /// * Every other attribute requires exact string equality.
    /// * The `contents` hint is NOT checked here; it only serves as a
    ///   tiebreaker during dynamic discovery.
    pub fn matches(&self, element: &ElementRef<'_>) -> bool {
        if !element.value().name().eq_ignore_ascii_case(&self.tag) {
            return false;
        }

        self.attrs.iter().all(|(name, expected)| {
            if name == "class" {
                let element_classes: Vec<&str> = element.value().classes().collect();
                split_class_tokens(expected)
                    .any(|token| element_classes.contains(&token))
            } else {
                element.value().attr(name) == Some(expected.as_str())
            }
        })
    }

    /// Renders this spec for diagnostics, e.g. `div(class=description)`
    pub fn describe(&self) -> String {
        let mut parts: Vec<String> = self
            .attrs
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect();
        if let Some(hint) = &self.contents {
            parts.push(format!("contents={}", hint));
        }
        format!("{}({})", self.tag, parts.join(", "))
    }
}

/// Splits an expected `class` value into its candidate tokens
fn split_class_tokens(value: &str) -> impl Iterator<Item = &str> {
    value
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
}

/// Renders a whole chain for diagnostics, outermost to innermost,
/// e.g. `div(id=vehicle-description) > div(class=description)`
pub fn describe_chain(chain: &[TagSpec]) -> String {
    chain
        .iter()
        .map(TagSpec::describe)
        .collect::<Vec<_>>()
        .join(" > ")
}
