use axum::extract::State;
use macros::route;

use crate::{
	error::Error,
	extract::{Admin, Json, Path, Upload},
	ingest,
	model::Post,
	openapi::tag,
	response::Page,
	store::{self, Store},
};

use super::model;

/// Get single post
/// Renders a post by its id, followed by its approved comments. An unknown id
/// is a 404; if the store cannot be read the page is rendered empty.
#[route(tag = tag::ARTICLE)]
pub async fn get_post(
	State(store): State<Store>,
	Path(path): Path<model::IdInput>,
) -> Result<Page<model::Article>, Error> {
	let post = match store.get_post(path.id).await {
		Ok(post) => post,
		Err(error @ store::Error::UnknownPost(..)) => return Err(error.into()),
		Err(error) => {
			tracing::warn!(%error, operation = "get_post", "store read failed, rendering an empty post");

			Post {
				id: path.id,
				..Post::default()
			}
		}
	};
	let comments = store::or_default(
		store.list_approved_comments(path.id).await,
		"list_approved_comments",
	);

	Ok(Page(model::Article {
		post,
		comments: model::visible(comments),
	}))
}

/// Create post
/// Creates a post from a `multipart/form-data` upload. The `title` part is
/// the title and the `file` part is stored verbatim as the HTML body.
#[route(
	tag = tag::ARTICLE,
	response(status = 200, shape = "Json<model::Saved>", description = "The post was created.")
)]
pub async fn create_post(
	_: Admin,
	State(store): State<Store>,
	Upload(form): Upload,
) -> Result<Json<model::Saved>, Error> {
	let id = ingest::create(store.as_ref(), form).await?;

	Ok(Json(model::Saved { id }))
}

/// Update post body
/// Replaces the body of a post with the uploaded `file` part. The title and
/// publish date are left as they were.
#[route(
	tag = tag::ARTICLE,
	response(status = 200, shape = "Json<model::Saved>", description = "The post was updated.")
)]
pub async fn update_post(
	_: Admin,
	State(store): State<Store>,
	Path(path): Path<model::IdInput>,
	Upload(form): Upload,
) -> Result<Json<model::Saved>, Error> {
	ingest::update(store.as_ref(), path.id, form).await?;

	Ok(Json(model::Saved { id: path.id }))
}
