//! Domain entities - the core business objects.

mod field;
mod post;
pub mod slug;
mod user;

pub use field::{OrderBy, PostField};
pub use post::{Post, PostStatus, SLUG_MAX_LENGTH, TITLE_MAX_LENGTH};
pub use user::User;
