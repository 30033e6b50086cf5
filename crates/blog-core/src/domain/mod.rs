//! Domain entities - the core business objects.

mod comment;
mod post;
mod tag;
mod user;

pub use comment::Comment;
pub use post::{Post, PostStatus, TITLE_MAX_LENGTH, detail_path, is_valid_slug};
pub use tag::Tag;
pub use user::User;
