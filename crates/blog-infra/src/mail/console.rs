use async_trait::async_trait;

use blog_core::ports::{MailError, Mailer, OutgoingMail};

/// Mailer that logs each message instead of delivering it.
pub struct ConsoleMailer {
    default_from: String,
}

impl ConsoleMailer {
    pub fn new(default_from: impl Into<String>) -> Self {
        Self {
            default_from: default_from.into(),
        }
    }
}

#[async_trait]
impl Mailer for ConsoleMailer {
    async fn send(&self, mail: OutgoingMail) -> Result<(), MailError> {
        if mail.to.is_empty() {
            return Err(MailError::InvalidAddress("no recipients".to_string()));
        }

        let from = mail.from.as_deref().unwrap_or(&self.default_from);
        tracing::info!(
            from = %from,
            to = %mail.to.join(", "),
            subject = %mail.subject,
            body = %mail.body,
            "Mail (console transport)"
        );
        Ok(())
    }
}
