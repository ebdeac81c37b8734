//! Tag-path module for VDP-Scout
//!
//! A *tag chain* is an ordered path of nested-element search criteria from
//! an ancestor down to the description-bearing element; a *chain set* is
//! an ordered list of alternative chains tried until one matches. This
//! module owns the chain data model, the static domain-to-chain registry,
//! and the resolver that walks a chain set against a parsed document.

mod registry;
mod resolver;
mod spec;

// Re-export types
pub use spec::{describe_chain, TagChain, TagChainSet, TagSpec};

// Re-export operations
pub use registry::{lookup, registered_patterns};
pub use resolver::{resolve, Resolved};
