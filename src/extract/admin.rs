use aide::OperationInput;
use axum::{
	extract::{FromRef, FromRequestParts},
	http::{header, request},
};

use crate::{
	error::Error,
	guard::{AccessGuard, Credentials},
	openapi::SECURITY_SCHEME_BASIC,
};

/// Proof that the request carried the admin credentials.
///
/// If the `Authorization` header is missing, malformed, or does not match,
/// the request is rejected with a 403 before any other extractor runs, so it
/// must be the first argument of the handler.
///
/// ```rust
/// async fn route(_: Admin) {
///   // only reachable with valid credentials
/// }
/// ```
#[derive(Debug)]
pub struct Admin;

#[axum::async_trait]
impl<S> FromRequestParts<S> for Admin
where
	AccessGuard: FromRef<S>,
	S: Sync + Send,
{
	type Rejection = Error;

	async fn from_request_parts(
		parts: &mut request::Parts,
		state: &S,
	) -> Result<Self, Self::Rejection> {
		let guard = AccessGuard::from_ref(state);
		let credentials = parts
			.headers
			.get(header::AUTHORIZATION)
			.map(Credentials::from_header)
			.transpose()?;

		if let Err(error) = guard.check(credentials.as_ref()) {
			tracing::warn!(%error, "rejected admin request");
			return Err(error.into());
		}

		Ok(Self)
	}
}

impl OperationInput for Admin {
	/// Adds the basic auth requirement to the `OpenAPI` operation.
	fn operation_input(_ctx: &mut aide::gen::GenContext, operation: &mut aide::openapi::Operation) {
		operation.security.push(
			[(SECURITY_SCHEME_BASIC.to_string(), Vec::new())]
				.into_iter()
				.collect(),
		);
	}
}
