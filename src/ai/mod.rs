//! Text-completion backend used to generate job listings
//!
//! Talks to an OpenAI-compatible chat-completions endpoint.

mod client;
pub mod prompts;

pub use client::OpenAiClient;

use anyhow::Result;

/// Anything that turns a prompt into free text.
pub trait TextCompleter {
    fn complete(&self, prompt: &str) -> impl Future<Output = Result<String>> + Send;
}
