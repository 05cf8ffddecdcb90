use aide::OperationOutput;
use axum::{
	body::Body,
	http::{header, Response, StatusCode},
	response::{Html, IntoResponse},
};

use crate::error::Error;

/// Renders an askama template as an HTML page.
///
/// A template that fails to render becomes a 500 error response.
///
/// ```rust
/// async fn route() -> Page<Index> {
///   Page(Index)
/// }
/// ```
pub struct Page<T>(pub T);

impl<T> IntoResponse for Page<T>
where
	T: askama::Template,
{
	fn into_response(self) -> Response<Body> {
		match self.0.render() {
			Ok(html) => Html(html).into_response(),
			Err(error) => Error::Render(error).into_response(),
		}
	}
}

impl<T> OperationOutput for Page<T> {
	type Inner = String;
}

/// A `302 Found` redirect to another page of the site.
#[derive(Debug)]
pub struct Found(pub String);

impl IntoResponse for Found {
	fn into_response(self) -> Response<Body> {
		(StatusCode::FOUND, [(header::LOCATION, self.0)]).into_response()
	}
}

impl OperationOutput for Found {
	type Inner = ();
}
