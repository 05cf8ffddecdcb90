use aide::axum::{routing::get_with, ApiRouter};

use crate::AppState;

pub mod model;
pub mod route;

pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new()
		.api_route("/blog/", get_with(get_first_page, get_first_page_docs))
		.api_route("/blog/:page", get_with(get_page, get_page_docs))
}
