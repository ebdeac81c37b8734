//! Tag-path resolver
//!
//! Walks an ordered chain set against a parsed document and returns the
//! deepest element a chain reaches. Dealership markup varies in nesting
//! depth across templates, so a chain that matches its first two steps
//! but not its third still yields useful (if slightly less precise)
//! text: on a missed step the descent stops and the last successfully
//! matched element stands in for the full chain. Do not tighten this
//! into strict full-chain matching.

use crate::dom;
use crate::path::spec::{describe_chain, TagChain};
use crate::{Result, ScrapeError};
use scraper::{ElementRef, Html};

/// A successful resolution: the element a chain landed on, plus the
/// human-readable rendering of that chain for diagnostics
#[derive(Debug)]
pub struct Resolved<'a> {
    /// Deepest element the winning chain matched
    pub element: ElementRef<'a>,

    /// Rendering of the winning chain, e.g. `div(id=x) > div(class=y)`
    pub chain: String,
}

/// Resolves a chain set against a document
///
/// Chains are tried in order. For each chain the resolver descends step
/// by step, searching the current element's descendants for the first
/// match of the next step; a missed step ends the descent for that chain
/// without failing it. The first chain that matched at least one step
/// wins and remaining chains are never tried.
///
/// # Errors
///
/// `NoMatchingPath` if no chain's first step matches anything, carrying
/// a rendering of every attempted chain.
pub fn resolve<'a>(document: &'a Html, chains: &[TagChain], url: &str) -> Result<Resolved<'a>> {
    let mut attempted = Vec::new();

    for chain in chains {
        let description = describe_chain(chain);
        attempted.push(description.clone());

        let mut current = document.root_element();
        let mut last_found: Option<ElementRef<'a>> = None;

        for (step, spec) in chain.iter().enumerate() {
            match dom::find_first(current, spec) {
                Some(element) => {
                    last_found = Some(element);
                    current = element;
                }
                None => {
                    tracing::debug!(
                        chain = %description,
                        step,
                        "chain step missed; falling back to deepest match so far"
                    );
                    break;
                }
            }
        }

        if let Some(element) = last_found {
            tracing::debug!(chain = %description, "chain matched");
            return Ok(Resolved {
                element,
                chain: description,
            });
        }
    }

    Err(ScrapeError::NoMatchingPath {
        url: url.to_string(),
        attempted,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::spec::TagSpec;

    const URL: &str = "https://dealer.example.com/vdp/1";

    #[test]
    fn test_full_chain_match_returns_innermost_text() {
        let document = Html::parse_document(
            r#"<div id="vehicle-description">
                 <div class="description">This is the actual description text.</div>
               </div>"#,
        );
        let chains = vec![vec![
            TagSpec::new("div").attr("id", "vehicle-description"),
            TagSpec::new("div").attr("class", "description"),
        ]];

        let resolved = resolve(&document, &chains, URL).unwrap();
        assert_eq!(
            dom::visible_text(resolved.element, " "),
            "This is the actual description text."
        );
        assert_eq!(
            resolved.chain,
            "div(id=vehicle-description) > div(class=description)"
        );
    }

    #[test]
    fn test_partial_chain_falls_back_to_deepest_match() {
        // The third step never matches; the chain still wins with the
        // element its second step reached.
        let document = Html::parse_document(
            r#"<div id="outer"><section class="notes">Outer text
                 <p>inner text</p>
               </section></div>"#,
        );
        let chains = vec![vec![
            TagSpec::new("div").attr("id", "outer"),
            TagSpec::new("section").attr("class", "notes"),
            TagSpec::new("div").attr("class", "missing"),
        ]];

        let resolved = resolve(&document, &chains, URL).unwrap();
        assert_eq!(resolved.element.value().name(), "section");
        assert!(dom::visible_text(resolved.element, " ").contains("inner text"));
    }

    #[test]
    fn test_first_matching_chain_wins() {
        let document = Html::parse_document(
            r#"<div class="a">from first</div><div class="b">from second</div>"#,
        );
        let chains = vec![
            vec![TagSpec::new("div").attr("class", "a")],
            vec![TagSpec::new("div").attr("class", "b")],
        ];

        let resolved = resolve(&document, &chains, URL).unwrap();
        assert_eq!(dom::visible_text(resolved.element, " "), "from first");
    }

    #[test]
    fn test_later_chain_used_when_earlier_matches_nothing() {
        let document = Html::parse_document(r#"<div class="b">fallback text</div>"#);
        let chains = vec![
            vec![TagSpec::new("div").attr("class", "nope")],
            vec![TagSpec::new("div").attr("class", "b")],
        ];

        let resolved = resolve(&document, &chains, URL).unwrap();
        assert_eq!(dom::visible_text(resolved.element, " "), "fallback text");
    }

    #[test]
    fn test_no_match_lists_every_attempted_chain() {
        let document = Html::parse_document("<p>nothing relevant</p>");
        let chains = vec![
            vec![TagSpec::new("div").attr("id", "a")],
            vec![
                TagSpec::new("section").attr("class", "b"),
                TagSpec::new("div"),
            ],
        ];

        let err = resolve(&document, &chains, URL).unwrap_err();
        match err {
            ScrapeError::NoMatchingPath { url, attempted } => {
                assert_eq!(url, URL);
                assert_eq!(
                    attempted,
                    vec!["div(id=a)".to_string(), "section(class=b) > div()".to_string()]
                );
            }
            other => panic!("expected NoMatchingPath, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_chain_set_yields_no_matching_path() {
        let document = Html::parse_document("<div>text</div>");
        let err = resolve(&document, &[], URL).unwrap_err();
        assert!(matches!(err, ScrapeError::NoMatchingPath { .. }));
    }
}
