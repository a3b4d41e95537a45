use thiserror::Error;

/// Failures of a single digest run.
///
/// None of these stop the scheduler; they are logged and the next topic runs.
#[derive(Debug, Error)]
pub enum DigestError {
    /// A required credential or address was not configured.
    #[error("missing configuration: {0} is not set")]
    ConfigurationMissing(&'static str),

    /// The text-completion backend failed or returned nothing usable.
    #[error("completion request failed: {0:#}")]
    UpstreamFetch(anyhow::Error),

    /// The mail relay rejected or never received the message.
    #[error("mail dispatch failed: {0:#}")]
    MailDispatch(anyhow::Error),
}
