pub mod smtp;
pub mod types;

pub use smtp::SmtpClient;
pub use types::OutgoingDigest;

use anyhow::Result;

/// Anything that can deliver a composed digest.
pub trait MailSender {
    fn send(&self, digest: &OutgoingDigest) -> impl Future<Output = Result<()>> + Send;
}
