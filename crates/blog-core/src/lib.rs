//! # Blog Core
//!
//! The domain layer of the blog.
//! This crate contains pure business logic with zero infrastructure dependencies:
//! entities, the published-post view, pagination, ranking rules, forms and
//! the ports infrastructure implements.

pub mod domain;
pub mod error;
pub mod forms;
pub mod pagination;
pub mod ports;
pub mod published;
pub mod query;
pub mod search;
pub mod services;
pub mod similarity;

pub use error::{DomainError, RepoError};
pub use published::PublishedPosts;
