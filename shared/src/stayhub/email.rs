// ============================================================================
// Transactional Email
// ============================================================================
//
// Email is best-effort: sends run in the background and a failure is only
// logged. The booking that triggered it is never affected.
//
// ============================================================================

use std::sync::Arc;

use anyhow::Result;

/// A single outgoing email
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[async_trait::async_trait]
pub trait EmailDispatcher: Send + Sync {
    async fn send(&self, email: EmailMessage) -> Result<()>;
}

/// Dispatcher that writes emails to the log instead of an SMTP relay
#[derive(Debug, Default, Clone)]
pub struct LogEmailDispatcher;

#[async_trait::async_trait]
impl EmailDispatcher for LogEmailDispatcher {
    async fn send(&self, email: EmailMessage) -> Result<()> {
        tracing::info!(
            subject = %email.subject,
            body_len = email.body.len(),
            "Email dispatched (log transport)"
        );
        Ok(())
    }
}

/// Send without waiting; failures are logged and dropped
pub fn send_in_background(dispatcher: Arc<dyn EmailDispatcher>, email: EmailMessage) {
    tokio::spawn(async move {
        let subject = email.subject.clone();
        if let Err(e) = dispatcher.send(email).await {
            tracing::warn!(error = %e, subject = %subject, "Failed to send email");
        }
    });
}
