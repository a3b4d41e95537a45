//! Application-wide constants for tuning and configuration
//!
//! Centralizes magic numbers and fixed strings so they are discoverable.

/// Interval in seconds between scheduler polls.
/// Triggers have minute granularity, so one poll per minute is enough.
pub const POLL_INTERVAL_SECS: u64 = 60;

/// Default wall-clock time for the daily run (24h `HH:MM`).
pub const DEFAULT_RUN_TIME: &str = "06:00";

/// Default IANA time zone the run time is interpreted in.
pub const DEFAULT_TIMEZONE: &str = "America/New_York";

/// Default chat-completions base URL.
pub const DEFAULT_AI_BASE_URL: &str = "https://api.openai.com/v1";

/// Default completion model.
pub const DEFAULT_AI_MODEL: &str = "gpt-3.5-turbo";

/// Maximum tokens per completion.
/// Must be large enough to hold five full listings.
pub const DEFAULT_AI_MAX_TOKENS: u32 = 1000;

/// Timeout in seconds for a single completion request.
pub const AI_TIMEOUT_SECS: u64 = 60;

/// Default SMTP relay (STARTTLS).
pub const DEFAULT_SMTP_SERVER: &str = "smtp.gmail.com";

/// Default SMTP submission port.
pub const DEFAULT_SMTP_PORT: u16 = 587;

/// Timeout in seconds for one SMTP session.
pub const SMTP_TIMEOUT_SECS: u64 = 30;

/// Subject line of every digest email.
pub const DIGEST_SUBJECT: &str = "AI-Powered Job Listings: Data Science & Energy";

/// Heading at the top of every digest body.
pub const DIGEST_HEADING: &str = "🔥 AI-Powered Job Listings: Data Science & Energy";

/// Rendered in place of any listing field the model left out.
pub const PLACEHOLDER: &str = "N/A";

/// Human-readable text logged when the completion backend fails.
pub const FETCH_FAILURE_MESSAGE: &str = "No job listings found due to an API error.";

/// Base URL for the fallback apply link.
pub const SEARCH_URL_BASE: &str = "https://www.google.com/search";

/// Line width used when rendering the plain-text alternative part.
pub const PLAIN_TEXT_WIDTH: usize = 80;
