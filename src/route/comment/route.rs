use axum::extract::State;
use macros::route;

use crate::{
	error::Error,
	extract::Form,
	openapi::tag,
	response::Found,
	store::Store,
};

use super::model;

/// Create comment
/// Stores a comment for moderation and redirects back to the post. The
/// comment is not shown until it has been approved.
#[route(tag = tag::COMMENT, response(status = 302, description = "Back to the post."))]
pub async fn create_comment(
	State(store): State<Store>,
	Form(input): Form<model::CommentInput>,
) -> Result<Found, Error> {
	store
		.create_comment(input.post_id, &input.author, &input.body)
		.await?;

	tracing::info!(post_id = input.post_id, "comment awaiting moderation");

	Ok(Found(format!("/article/{}", input.post_id)))
}
