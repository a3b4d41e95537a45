//! Job digest pipeline: fetch listings, format them as HTML, mail them
//!
//! The parser and renderer are pure; all I/O lives in [`pipeline`].

mod parser;
mod pipeline;
mod render;

pub use pipeline::DigestPipeline;

/// One configured (prompt, recipient) pair driving one digest run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicRequest {
    pub name: String,
    pub prompt: String,
    /// Missing until configured; reported when the digest is dispatched
    pub recipient: Option<String>,
}

/// One job posting extracted from generated text. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingRecord {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub apply_link: Option<String>,
}

/// Complete HTML body for one topic run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Digest {
    pub html: String,
    pub listing_count: usize,
}

/// Result of the fetch and format stages
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DigestContent {
    Ready(Digest),
    /// The completion backend failed; nothing should be sent
    Unavailable { reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Sent,
    Skipped,
}
