//! Mail transports.
//!
//! - [`SmtpMailer`] delivers through an SMTP relay (feature `smtp`).
//! - [`ConsoleMailer`] writes messages to the log; the fallback when no relay
//!   is configured.
//! - [`MemoryOutbox`] keeps messages in memory for tests.

mod console;
mod memory;

#[cfg(feature = "smtp")]
mod smtp;

pub use console::ConsoleMailer;
pub use memory::MemoryOutbox;

#[cfg(feature = "smtp")]
pub use smtp::{SmtpConfig, SmtpMailer, SmtpSecurity};
