use schemars::JsonSchema;
use serde::Deserialize;
use validator::Validate;

/// The comment form posted from an article page.
#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct CommentInput {
	#[validate(range(min = 1))]
	pub post_id: i32,
	#[validate(length(max = 254))]
	pub author: String,
	#[serde(rename = "comment")]
	#[validate(length(min = 1, max = 4096))]
	pub body: String,
}
