use crate::constants::PLAIN_TEXT_WIDTH;

/// A digest ready to be handed to the mail relay
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingDigest {
    pub to: String,
    pub subject: String,
    pub html: String,
}

impl OutgoingDigest {
    pub fn new(to: &str, subject: &str, html: &str) -> Self {
        Self {
            to: to.to_string(),
            subject: subject.to_string(),
            html: html.to_string(),
        }
    }

    /// Plain-text rendering of the HTML body for the alternative part
    pub fn plain_text(&self) -> String {
        html2text::config::plain()
            .string_from_read(self.html.as_bytes(), PLAIN_TEXT_WIDTH)
            .unwrap_or_else(|_| self.html.clone())
    }
}
