//! Outbound mail port.

use async_trait::async_trait;

/// A plain-text message ready for a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub subject: String,
    pub body: String,
    /// Sender address. `None` means the transport's default sender.
    pub from: Option<String>,
    pub to: Vec<String>,
}

/// Mail transport - SMTP, console, or an in-memory outbox.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Deliver a message. Blocks the caller until the transport answers.
    async fn send(&self, mail: OutgoingMail) -> Result<(), MailError>;
}

/// Mail delivery errors.
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Failed to build message: {0}")]
    Build(String),

    #[error("Transport error: {0}")]
    Transport(String),
}
