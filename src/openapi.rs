use aide::{
	openapi::{SecurityScheme, Tag},
	transform::TransformOpenApi,
};

use crate::{
	error::{self, ErrorResponse},
	extract::Json,
};

/// Name of the HTTP basic auth scheme guarding the admin routes.
pub const SECURITY_SCHEME_BASIC: &str = "Basic";

pub mod tag {
	pub const PAGE: &str = "Page";
	pub const BLOG: &str = "Blog";
	pub const ARTICLE: &str = "Article";
	pub const COMMENT: &str = "Comment";
}

pub fn docs(api: TransformOpenApi) -> TransformOpenApi {
	api.title("Folio")
		.summary("A single-author blog with moderated comments")
		.description(include_str!("../README.md"))
		.tag(Tag {
			name: tag::PAGE.into(),
			description: Some("Static pages".into()),
			..Default::default()
		})
		.tag(Tag {
			name: tag::BLOG.into(),
			description: Some("The paginated list of posts".into()),
			..Default::default()
		})
		.tag(Tag {
			name: tag::ARTICLE.into(),
			description: Some("Reading and publishing posts".into()),
			..Default::default()
		})
		.tag(Tag {
			name: tag::COMMENT.into(),
			description: Some("Visitor comments, hidden until approved".into()),
			..Default::default()
		})
		.security_scheme(
			SECURITY_SCHEME_BASIC,
			SecurityScheme::Http {
				scheme: "basic".into(),
				bearer_format: None,
				description: Some("The admin username and password".into()),
				extensions: Default::default(),
			},
		)
		.default_response_with::<Json<ErrorResponse>, _>(|res| {
			res.example(ErrorResponse {
				success: false,
				errors: error::Message::new("error message")
					.field("optional field")
					.into_vec(),
			})
		})
}
