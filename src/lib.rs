//! VDP-Scout: vehicle description extraction from dealership detail pages
//!
//! This crate fetches a dealership Vehicle Detail Page (VDP), locates the
//! description-bearing region via a per-domain tag-path registry (with an
//! LLM-assisted discovery fallback for unknown templates), and asks a
//! language model to isolate the pure vehicle description from the
//! surrounding dealer/marketing text.

pub mod cleaner;
pub mod config;
pub mod discovery;
pub mod dom;
pub mod fetch;
pub mod llm;
pub mod path;
pub mod pipeline;

use thiserror::Error;

/// Main error type for VDP-Scout operations
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("page not found (404): {url}")]
    PageNotFound { url: String },

    #[error("request for {url} failed with HTTP status {status}")]
    RequestFailed { url: String, status: u16 },

    #[error("could not retrieve {url}: {message}")]
    Transport { url: String, message: String },

    #[error(
        "could not locate a description section for {url}; attempted (outermost to innermost):\n  - {}",
        .attempted.join("\n  - ")
    )]
    NoMatchingPath { url: String, attempted: Vec<String> },

    #[error("invalid VDP URL `{url}`: {message}")]
    InvalidUrl { url: String, message: String },

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("model error: {0}")]
    Llm(#[from] LlmError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing environment variable: {0}")]
    MissingVar(String),

    #[error("environment variable {0} still holds the <REPLACE_ME> placeholder")]
    Placeholder(String),

    #[error("invalid LLM base URL `{url}`: {message}")]
    InvalidBaseUrl { url: String, message: String },
}

/// Errors from the text-generation collaborator
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("model endpoint unavailable ({detail})")]
    Unavailable { detail: String },

    #[error("model returned an empty response")]
    EmptyResponse,

    #[error("model output was not valid structured data: {snippet}")]
    MalformedOutput { snippet: String },
}

/// Result type alias for VDP-Scout operations
pub type Result<T> = std::result::Result<T, ScrapeError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for model-collaborator operations
pub type LlmResult<T> = std::result::Result<T, LlmError>;

// Re-export commonly used types
pub use config::Config;
pub use discovery::{Discovery, DiscoveryOutcome};
pub use llm::{LlmClient, LlmReply};
pub use path::{TagChain, TagChainSet, TagSpec};
pub use pipeline::get_description;
