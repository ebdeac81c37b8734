//! Dynamic path discovery
//!
//! When no static registry rule covers a dealer template, the tag chain
//! is derived from the page itself with two sequential model queries:
//!
//! 1. Every h1–h6 on the page is shown to the model, which picks the
//!    heading most likely to mark the dealer's free-text description
//!    section (or a `no_match` sentinel).
//! 2. The picked heading is re-located in the document, its nearest
//!    ancestor `<div>` is serialized, and the model derives a tag chain
//!    set describing how to reach the description text inside it (or an
//!    empty list).
//!
//! "Nothing found" is a sentinel outcome at every step, never an error:
//! a page without a description section must stay distinguishable from a
//! broken fetch. Static rules are cheap and exact but need curation per
//! dealer template; this path trades model latency/cost for generality.

use crate::dom;
use crate::llm::{LlmClient, LlmReply};
use crate::path::{TagChainSet, TagSpec};
use crate::Result;
use scraper::Html;
use serde_json::Value;

/// Sentinel `tag` value the model returns when no heading qualifies
const NO_MATCH_SENTINEL: &str = "no_match";

/// Stage-A instructions: pick the description heading
const HEADING_PICK_PROMPT: &str = "You are a helpful assistant for identifying HTML \
components. Look through the provided list of HTML heading components from the listing \
page for a single vehicle on a car dealership website. Determine which is the most \
likely to mark a dealer-level description of the vehicle. Respond ONLY with valid JSON \
in this exact format:\n\
{\"tag\": \"h2\", \"class\": \"dealer-description__heading\", \"contents\": \"Dealer Notes\"}\n\
If no description heading can be found, return the JSON with `tag` set to `no_match`.";

/// Stage-B instructions: derive the chain set inside the container
const CHAIN_DERIVE_PROMPT: &str = "You are a helpful assistant for identifying HTML \
components. You will be given an HTML div and its contents. Your task is to locate the \
components that contain the main vehicle description from a dealership website. Return \
a JSON list of lists, where each inner list represents a path of the nested HTML \
elements IN ORDER that identify the location of the description. Each element in the \
path should be a JSON object with the tag and relevant attributes (for example, 'tag', \
'id', 'class'). Always return a valid JSON list of lists of objects like this example:\n\
[[{\"tag\": \"div\", \"class\": \"dealer-comments dealer-comments--square\"}, \
{\"tag\": \"div\", \"id\": \"dealer-comments\", \"class\": \"dealer-comments__text\"}]]\n\
If no description can be found, return an empty JSON list: []";

/// Result of a discovery run: an outcome plus the summed token cost of
/// every model call made along the way
#[derive(Debug)]
pub struct Discovery {
    pub outcome: DiscoveryOutcome,
    pub tokens_used: u32,
}

/// What discovery determined about the page
#[derive(Debug)]
pub enum DiscoveryOutcome {
    /// A chain set was derived; it may be empty, which callers must
    /// treat as "no path determined" rather than a failure
    Paths(TagChainSet),

    /// The model found no heading denoting a description section
    NoSection,

    /// The model picked a heading that could not be re-located in the
    /// page (or it had no ancestor `<div>` to derive chains from)
    HeadingNotFound,
}

/// Derives a tag chain set for a page with no registered template
///
/// Stage B strictly depends on stage A's result; the two model calls are
/// never overlapped.
pub async fn discover_paths(html: &str, llm: &LlmClient) -> Result<Discovery> {
    // scraper documents are not Send, so each stage parses inside a
    // synchronous scope and only owned strings cross the awaits.
    let headings = {
        let document = Html::parse_document(html);
        dom::extract_headings(&document)
    };
    tracing::info!(count = headings.len(), "collected headings from page");

    let (reply, stage_a_tokens) = llm
        .query(HEADING_PICK_PROMPT, &headings.join("\n"), 0.0, true)
        .await?;

    let Some(heading_spec) = heading_pick_from_reply(&reply) else {
        tracing::info!("model found no description heading on this page");
        return Ok(Discovery {
            outcome: DiscoveryOutcome::NoSection,
            tokens_used: stage_a_tokens,
        });
    };
    tracing::info!(heading = %heading_spec.describe(), "model picked a description heading");

    let container_html = {
        let document = Html::parse_document(html);
        dom::find_with_contents_tiebreak(document.root_element(), &heading_spec)
            .and_then(dom::parent_div)
            .map(|container| container.html())
    };
    let Some(container_html) = container_html else {
        tracing::warn!(
            heading = %heading_spec.describe(),
            "picked heading could not be re-located in the page"
        );
        return Ok(Discovery {
            outcome: DiscoveryOutcome::HeadingNotFound,
            tokens_used: stage_a_tokens,
        });
    };

    let (reply, stage_b_tokens) = llm
        .query(CHAIN_DERIVE_PROMPT, &container_html, 0.0, true)
        .await?;

    let chains = chain_set_from_reply(reply);
    tracing::info!(chains = chains.len(), "derived tag chains from container");

    Ok(Discovery {
        outcome: DiscoveryOutcome::Paths(chains),
        tokens_used: stage_a_tokens + stage_b_tokens,
    })
}

/// Interprets the stage-A reply as a heading spec
///
/// Returns `None` for the `no_match` sentinel, for unstructured replies,
/// and for shapes missing a usable `tag`. Non-string attribute values
/// are dropped rather than rejected.
fn heading_pick_from_reply(reply: &LlmReply) -> Option<TagSpec> {
    let object = reply.as_structured()?.as_object()?;
    let tag = object.get("tag")?.as_str()?.trim();

    if tag.is_empty() || tag.eq_ignore_ascii_case(NO_MATCH_SENTINEL) {
        return None;
    }

    let mut spec = TagSpec::new(tag);
    for (key, value) in object {
        if key == "tag" || key == "contents" {
            continue;
        }
        if let Some(text) = value.as_str() {
            if !text.trim().is_empty() {
                spec = spec.attr(key, text);
            }
        }
    }
    if let Some(contents) = object.get("contents").and_then(Value::as_str) {
        if !contents.trim().is_empty() {
            spec = spec.contents(contents);
        }
    }

    Some(spec)
}

/// Interprets the stage-B reply as a chain set
///
/// Anything that does not deserialize as nested chain lists degrades to
/// an empty set (with a warning), which callers treat as "no path
/// determined".
fn chain_set_from_reply(reply: LlmReply) -> TagChainSet {
    match reply {
        LlmReply::Structured(value) => match serde_json::from_value::<TagChainSet>(value) {
            Ok(chains) => chains,
            Err(error) => {
                tracing::warn!(%error, "model chain list did not deserialize; no path determined");
                Vec::new()
            }
        },
        LlmReply::Text(text) => {
            tracing::warn!(
                reply = %text.chars().take(120).collect::<String>(),
                "model returned unstructured chain reply; no path determined"
            );
            Vec::new()
        }
    }
}
