//! # Blog Shared
//!
//! Request and response types shared by the server and its clients:
//! the validated forms readers submit and the error body returned on failure.

pub mod forms;
pub mod response;

pub use forms::{CommentForm, EmailPostForm, FormErrors, SearchForm, clean};
pub use response::ErrorResponse;
