//! Scrape orchestration
//!
//! This module wires the pieces into the one operation the crate exposes:
//! fetch a VDP, find the description-bearing region (static registry
//! first, dynamic discovery as fallback), extract and clean its text, and
//! have the model isolate the pure vehicle description. Each invocation
//! is self-contained: one fetch, no caching, no retries, no state shared
//! across concurrent calls.

use crate::discovery::{self, Discovery, DiscoveryOutcome};
use crate::llm::{LlmClient, LlmReply};
use crate::{cleaner, dom, fetch, path};
use crate::{Result, ScrapeError};
use scraper::Html;
use serde_json::Value;

/// Returned when discovery concludes the page has no description section
pub const NO_SECTION_MESSAGE: &str = "No dealer description section found on the page";

/// Returned when the isolation model finds nothing descriptive
pub const FALLBACK_DESCRIPTION: &str = "No description found.";

/// Instructions for the description-isolation query
fn isolation_prompt() -> String {
    format!(
        "You are a vehicle description isolation assistant. You will receive text copied \
         from a dealership listing containing dealer info, features, etc. You will extract \
         only the vehicle's descriptive text verbatim - no summaries or added text. The \
         description may appear in one or multiple paragraphs, including in \
         natural-language sections like reviews. You may include multiple descriptive \
         paragraphs. Respond ONLY with valid JSON in this exact format:\n\
         {{\"description\": \"VEHICLE MODEL DESCRIPTION\"}}\n\
         IMPORTANT: If the description contains quotation marks (\") or single quotes ('), \
         escape double quotes with a backslash (\\\") so the JSON remains valid. \
         If no description can be found, return the JSON with `description` set to `{}`",
        FALLBACK_DESCRIPTION
    )
}

/// Retrieves the isolated vehicle description for a VDP URL
///
/// Returns the description text together with the total token cost of
/// every model call made (discovery stages, if any, plus isolation).
///
/// # Errors
///
/// Fetch failures (`PageNotFound`, `RequestFailed`, `Transport`),
/// `NoMatchingPath` when a registered chain set matches nothing on the
/// page, and `Llm`/`Config` errors from the collaborator. A page where
/// discovery finds no description section is NOT an error; it yields
/// [`NO_SECTION_MESSAGE`] plus the tokens spent deciding that.
pub async fn get_description(vdp_url: &str, llm: &LlmClient) -> Result<(String, u32)> {
    let mut tokens_used = 0u32;

    let client = fetch::build_http_client()?;
    let html = fetch::fetch_page(&client, vdp_url).await?;

    let chains = match path::lookup(vdp_url) {
        Ok(chains) => chains,
        Err(ScrapeError::NoMatchingPath { .. }) => {
            tracing::info!(url = vdp_url, "no registered template; running dynamic discovery");
            let discovery = discovery::discover_paths(&html, llm).await?;
            tokens_used += discovery.tokens_used;

            match discovery.outcome {
                DiscoveryOutcome::Paths(chains) if !chains.is_empty() => chains,
                _ => return Ok((NO_SECTION_MESSAGE.to_string(), tokens_used)),
            }
        }
        Err(other) => return Err(other),
    };

    let notes_text = {
        let document = Html::parse_document(&html);
        let resolved = path::resolve(&document, &chains, vdp_url)?;
        tracing::debug!(chain = %resolved.chain, "description region resolved");
        cleaner::strip_marketing_paragraph(&dom::visible_text(resolved.element, " "))
    };
    tracing::debug!(chars = notes_text.len(), "extracted dealer notes text");

    let (description, isolation_tokens) = isolate_description(&notes_text, llm).await?;
    tokens_used += isolation_tokens;

    tracing::info!(url = vdp_url, tokens_used, "description retrieval complete");
    Ok((description, tokens_used))
}

/// Asks the model to isolate the vehicle description from full dealer
/// notes text
///
/// A malformed (unstructured) reply never fails the operation: the raw
/// text is taken verbatim as the description instead.
pub async fn isolate_description(notes_text: &str, llm: &LlmClient) -> Result<(String, u32)> {
    let (reply, tokens) = llm.query(&isolation_prompt(), notes_text, 0.0, true).await?;
    Ok((description_from_reply(reply), tokens))
}

/// Runs dynamic path discovery for a URL, independent of the registry
///
/// This is the standalone entry point behind the `discover-paths` CLI
/// subcommand, used when curating new registry entries.
pub async fn discover_paths_for_url(vdp_url: &str, llm: &LlmClient) -> Result<Discovery> {
    let client = fetch::build_http_client()?;
    let html = fetch::fetch_page(&client, vdp_url).await?;
    discovery::discover_paths(&html, llm).await
}

/// Normalizes an isolation reply into description text
fn description_from_reply(reply: LlmReply) -> String {
    match reply {
        LlmReply::Structured(value) => value
            .get("description")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|description| !description.is_empty())
            .map(ToString::to_string)
            .unwrap_or_else(|| FALLBACK_DESCRIPTION.to_string()),
        LlmReply::Text(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                FALLBACK_DESCRIPTION.to_string()
            } else {
                trimmed.to_string()
            }
        }
    }
}
