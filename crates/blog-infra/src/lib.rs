//! # Blog Infrastructure
//!
//! Concrete implementations of the ports defined in `blog-core`:
//! storage, mail transports and admin authentication.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external services: in-memory store and console/outbox mail
//! - `postgres` - PostgreSQL storage via SeaORM
//! - `auth` - JWT + Argon2 authentication
//! - `smtp` - SMTP delivery via lettre

pub mod database;
pub mod mail;

#[cfg(feature = "auth")]
pub mod auth;

// Re-exports - In-Memory
pub use database::InMemoryStore;
pub use mail::{ConsoleMailer, MemoryOutbox};

#[cfg(feature = "postgres")]
pub use database::{
    DatabaseConfig, PostgresCommentRepository, PostgresPostRepository, PostgresTagRepository,
    PostgresUserRepository,
};

#[cfg(feature = "auth")]
pub use auth::{Argon2PasswordService, JwtConfig, JwtTokenService};

#[cfg(feature = "smtp")]
pub use mail::{SmtpConfig, SmtpMailer, SmtpSecurity};
