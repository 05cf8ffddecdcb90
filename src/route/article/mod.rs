use aide::axum::{
	routing::{get_with, post_with},
	ApiRouter,
};

use crate::AppState;

pub mod model;
pub mod route;

pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new().api_route("/article/:id", get_with(get_post, get_post_docs))
}

/// Routes that change posts. Every one of them requires the admin credentials.
pub fn admin_routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new()
		.api_route("/article/", post_with(create_post, create_post_docs))
		.api_route(
			"/article/update/:id",
			post_with(update_post, update_post_docs),
		)
}
