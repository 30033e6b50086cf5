use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use blog_core::ports::{MailError, Mailer, OutgoingMail};

/// In-memory outbox. Sent messages are kept in order for inspection.
#[derive(Default)]
pub struct MemoryOutbox {
    sent: RwLock<Vec<OutgoingMail>>,
    failing: AtomicBool,
}

impl MemoryOutbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// An outbox whose transport always fails.
    pub fn failing() -> Self {
        let outbox = Self::default();
        outbox.failing.store(true, Ordering::SeqCst);
        outbox
    }

    pub async fn messages(&self) -> Vec<OutgoingMail> {
        self.sent.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.sent.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sent.read().await.is_empty()
    }
}

#[async_trait]
impl Mailer for MemoryOutbox {
    async fn send(&self, mail: OutgoingMail) -> Result<(), MailError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(MailError::Transport("connection refused".to_string()));
        }

        self.sent.write().await.push(mail);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mail() -> OutgoingMail {
        OutgoingMail {
            subject: "Hello".to_string(),
            body: "World".to_string(),
            from: None,
            to: vec!["bob@example.com".to_string()],
        }
    }

    #[tokio::test]
    async fn test_outbox_records_messages() {
        let outbox = MemoryOutbox::new();
        outbox.send(mail()).await.unwrap();

        assert_eq!(outbox.len().await, 1);
        assert_eq!(outbox.messages().await[0].subject, "Hello");
    }

    #[tokio::test]
    async fn test_failing_outbox() {
        let outbox = MemoryOutbox::failing();

        assert!(outbox.send(mail()).await.is_err());
        assert!(outbox.is_empty().await);
    }
}
