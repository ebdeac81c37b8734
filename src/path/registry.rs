//! Domain-to-path registry
//!
//! Known dealer templates are mapped to tag chain sets through an
//! ordered table of (pattern, chain set) pairs. The table is data, not
//! dispatch logic: adding a new dealer template means appending an entry
//! here, never touching the resolver. Unknown templates fall through to
//! dynamic discovery at the pipeline level.

use crate::path::spec::{TagChainSet, TagSpec};
use crate::{Result, ScrapeError};
use std::sync::OnceLock;
use url::Url;

/// One registry row: a host+path substring pattern and the chain set to
/// use when a VDP URL contains it
#[derive(Debug, Clone)]
pub struct RegistryEntry {
    /// Substring matched against the lowercased `host + path` of the URL
    pub pattern: &'static str,

    /// Chains to hand the resolver, tried in order
    pub chains: TagChainSet,
}

static REGISTRY: OnceLock<Vec<RegistryEntry>> = OnceLock::new();

/// Builds the builtin dealer-template table.
///
/// Order matters: the first matching entry wins, so more specific
/// patterns must be registered before broader ones.
fn builtin_entries() -> Vec<RegistryEntry> {
    vec![
        RegistryEntry {
            pattern: "greghublerford.com",
            chains: vec![vec![
                TagSpec::new("div").attr("id", "vehicle-description"),
                TagSpec::new("div").attr("class", "description"),
            ]],
        },
        RegistryEntry {
            pattern: "sftoyota.com",
            chains: vec![vec![
                TagSpec::new("div").attr("class", "dealer-comments dealer-comments--square"),
                TagSpec::new("div")
                    .attr("id", "dealer-comments")
                    .attr("class", "dealer-comments__text"),
            ]],
        },
        RegistryEntry {
            pattern: "bergeronchryslerjeep.com",
            chains: vec![vec![
                TagSpec::new("div").attr("id", "dealernotes1-app-root"),
                TagSpec::new("div").attr("class", "content"),
            ]],
        },
    ]
}

fn entries() -> &'static [RegistryEntry] {
    REGISTRY.get_or_init(builtin_entries)
}

/// Returns every registered pattern, in registration order
pub fn registered_patterns() -> Vec<&'static str> {
    entries().iter().map(|entry| entry.pattern).collect()
}

/// Looks up the tag chain set registered for a VDP URL
///
/// The URL is normalized to lowercased `host + path`; the first entry
/// whose pattern is a substring of that value wins. A miss fails with
/// `NoMatchingPath` naming the URL and every checked pattern, which the
/// pipeline treats as the trigger for dynamic discovery.
pub fn lookup(url: &str) -> Result<TagChainSet> {
    let normalized = normalize(url)?;

    match lookup_in(entries(), &normalized) {
        Some(chains) => {
            tracing::debug!(url, "matched a registered dealer template");
            Ok(chains.clone())
        }
        None => Err(ScrapeError::NoMatchingPath {
            url: url.to_string(),
            attempted: registered_patterns()
                .iter()
                .map(|pattern| format!("pattern `{}`", pattern))
                .collect(),
        }),
    }
}

/// First-match-wins scan over an ordered entry table
fn lookup_in<'a>(entries: &'a [RegistryEntry], normalized_url: &str) -> Option<&'a TagChainSet> {
    entries
        .iter()
        .find(|entry| normalized_url.contains(&entry.pattern.to_lowercase()))
        .map(|entry| &entry.chains)
}

/// Reduces a URL to its lowercased `host + path`
fn normalize(url: &str) -> Result<String> {
    let parsed = Url::parse(url).map_err(|e| ScrapeError::InvalidUrl {
        url: url.to_string(),
        message: e.to_string(),
    })?;

    Ok(format!("{}{}", parsed.host_str().unwrap_or(""), parsed.path()).to_lowercase())
}
