//! Domain entities - the core business objects.

mod comment;
mod post;
mod tag;
mod user;

pub use comment::{Comment, CommentOn};
pub use post::{Post, PostStatus, slugify};
pub use tag::Tag;
pub use user::User;
