use super::render::format_listings;
use super::{DigestContent, DispatchOutcome, TopicRequest};
use crate::ai::TextCompleter;
use crate::constants::FETCH_FAILURE_MESSAGE;
use crate::error::DigestError;
use crate::mail::{MailSender, OutgoingDigest};

/// Fetch, format and mail digests for a fixed list of topics.
///
/// Topics run strictly one after another; a failing topic never stops the next.
pub struct DigestPipeline<C, M> {
    completer: C,
    mailer: M,
    subject: String,
    topics: Vec<TopicRequest>,
}

impl<C, M> DigestPipeline<C, M>
where
    C: TextCompleter,
    M: MailSender,
{
    pub fn new(completer: C, mailer: M, subject: String, topics: Vec<TopicRequest>) -> Self {
        Self {
            completer,
            mailer,
            subject,
            topics,
        }
    }

    pub fn topics(&self) -> &[TopicRequest] {
        &self.topics
    }

    /// Ask the completion backend for listings
    pub async fn fetch_listings(&self, prompt: &str) -> Result<String, DigestError> {
        self.completer
            .complete(prompt)
            .await
            .map_err(|e| classify(e, DigestError::UpstreamFetch))
    }

    /// Fetch and format. A backend failure degrades to [`DigestContent::Unavailable`].
    pub async fn build_digest(&self, prompt: &str) -> DigestContent {
        match self.fetch_listings(prompt).await {
            Ok(raw) => {
                let digest = format_listings(&raw);
                tracing::debug!("Formatted {} listings", digest.listing_count);
                DigestContent::Ready(digest)
            }
            Err(e) => {
                tracing::warn!("{} ({})", FETCH_FAILURE_MESSAGE, e);
                DigestContent::Unavailable {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Mail a digest, or skip when there is nothing worth sending
    pub async fn dispatch(
        &self,
        content: &DigestContent,
        recipient: Option<&str>,
    ) -> Result<DispatchOutcome, DigestError> {
        let digest = match content {
            DigestContent::Ready(digest) => digest,
            DigestContent::Unavailable { reason } => {
                tracing::info!("No new job listings found, skipping email: {}", reason);
                return Ok(DispatchOutcome::Skipped);
            }
        };

        let recipient = recipient.ok_or(DigestError::ConfigurationMissing("topic recipient"))?;
        let outgoing = OutgoingDigest::new(recipient, &self.subject, &digest.html);

        self.mailer
            .send(&outgoing)
            .await
            .map_err(|e| classify(e, DigestError::MailDispatch))?;

        Ok(DispatchOutcome::Sent)
    }

    pub async fn run_topic(&self, topic: &TopicRequest) -> Result<DispatchOutcome, DigestError> {
        let content = self.build_digest(&topic.prompt).await;
        self.dispatch(&content, topic.recipient.as_deref()).await
    }

    /// Run every topic in order, logging each outcome
    pub async fn run_all(&self) {
        for topic in &self.topics {
            tracing::info!("Running digest '{}'", topic.name);
            match self.run_topic(topic).await {
                Ok(DispatchOutcome::Sent) => {
                    tracing::info!("Digest '{}' sent", topic.name);
                }
                Ok(DispatchOutcome::Skipped) => {
                    tracing::info!("Digest '{}' skipped", topic.name);
                }
                Err(e) => {
                    tracing::error!("Digest '{}' failed: {}", topic.name, e);
                }
            }
        }
    }
}

/// Keep configuration errors typed; wrap everything else as `wrap`.
fn classify(err: anyhow::Error, wrap: fn(anyhow::Error) -> DigestError) -> DigestError {
    match err.downcast::<DigestError>() {
        Ok(typed) => typed,
        Err(other) => wrap(other),
    }
}
