use askama::Template;
use schemars::JsonSchema;
use serde::Serialize;

use crate::model::{Comment, Post};

pub use crate::route::model::IdInput;

/// A single post and the comments a moderator has approved.
#[derive(Template)]
#[template(path = "blog.html")]
pub struct Article {
	pub post: Post,
	pub comments: Vec<Comment>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct Saved {
	/// The id of the post that was written.
	pub id: i32,
}

/// Drops anything that has not been approved, so an unapproved comment can
/// never be rendered even if the store hands one back.
pub fn visible(comments: Vec<Comment>) -> Vec<Comment> {
	comments
		.into_iter()
		.filter(|comment| comment.approved)
		.collect()
}
