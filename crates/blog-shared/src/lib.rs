//! # Blog Shared
//!
//! Wire types of the admin JSON API, shared by the server and any client.

pub mod dto;
pub mod response;

pub use response::{ApiResponse, ErrorResponse};
