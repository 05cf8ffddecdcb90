use std::borrow::Cow;

use axum::{
	body::Body,
	extract::rejection,
	http::{Response, StatusCode},
	response::IntoResponse,
	Json,
};
use schemars::JsonSchema;
use serde::Serialize;
use tower_governor::GovernorError;

use crate::{guard, ingest, store};

/// Shown instead of the real message for any 5xx response.
pub const INTERNAL_MESSAGE: &str = "internal server error";

/// A single error message presented to the client.
#[derive(Debug, Serialize, JsonSchema)]
pub struct Message {
	pub content: Cow<'static, str>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub field: Option<Cow<'static, str>>,
}

impl Message {
	pub fn new(content: impl Into<Cow<'static, str>>) -> Self {
		Self {
			content: content.into(),
			field: None,
		}
	}

	#[must_use]
	pub fn field(mut self, field: impl Into<Cow<'static, str>>) -> Self {
		self.field = Some(field.into());
		self
	}

	pub fn into_vec(self) -> Vec<Self> {
		vec![self]
	}
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct ErrorResponse {
	pub success: bool,
	pub errors: Vec<Message>,
}

/// Describes how an error is presented to the client.
///
/// Server errors never expose their message, since the [`Display`] output
/// may contain internal details.
///
/// [`Display`]: std::fmt::Display
pub trait ErrorShape: std::error::Error {
	fn status(&self) -> StatusCode;

	fn errors(&self) -> Vec<Message> {
		if self.status().is_server_error() {
			Message::new(INTERNAL_MESSAGE).into_vec()
		} else {
			Message::new(self.to_string()).into_vec()
		}
	}
}

/// Error type for the application.
///
/// The Display trait is not sent to the client for server errors, so it can
/// show sensitive information.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("validation error: {0}")]
	Validation(#[from] validator::ValidationErrors),
	#[error("invalid path: {0}")]
	Path(#[from] rejection::PathRejection),
	#[error("invalid form: {0}")]
	Form(#[from] rejection::FormRejection),
	#[error(transparent)]
	Auth(#[from] guard::Error),
	#[error(transparent)]
	Upload(#[from] ingest::Error),
	#[error(transparent)]
	Store(#[from] store::Error),
	#[error("template error: {0}")]
	Render(#[from] askama::Error),
	#[error("rate limit: {0}")]
	RateLimit(#[from] GovernorError),
}

impl ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::Validation(..) | Self::Path(..) | Self::Form(..) => StatusCode::BAD_REQUEST,
			Self::Auth(error) => error.status(),
			Self::Upload(error) => error.status(),
			Self::Store(error) => error.status(),
			Self::Render(..) => StatusCode::INTERNAL_SERVER_ERROR,
			Self::RateLimit(error) => match error {
				GovernorError::TooManyRequests { .. } => StatusCode::TOO_MANY_REQUESTS,
				GovernorError::UnableToExtractKey => StatusCode::INTERNAL_SERVER_ERROR,
				GovernorError::Other { code, .. } => *code,
			},
		}
	}

	fn errors(&self) -> Vec<Message> {
		match self {
			Self::Validation(errors) => errors
				.field_errors()
				.into_iter()
				.flat_map(|(field, errors)| {
					let field = field.to_string();

					errors.iter().map(move |error| {
						Message::new(format!("{field}: {error}")).field(field.clone())
					})
				})
				.collect(),
			Self::Auth(error) => error.errors(),
			Self::Upload(error) => error.errors(),
			Self::Store(error) => error.errors(),
			_ if self.status().is_server_error() => Message::new(INTERNAL_MESSAGE).into_vec(),
			_ => Message::new(self.to_string()).into_vec(),
		}
	}
}

impl IntoResponse for Error {
	fn into_response(self) -> Response<Body> {
		let status = self.status();

		if status.is_server_error() {
			tracing::error!(error = %self, "request failed");
		}

		(
			status,
			Json(ErrorResponse {
				success: false,
				errors: self.errors(),
			}),
		)
			.into_response()
	}
}

impl aide::OperationOutput for Error {
	type Inner = ErrorResponse;
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_server_errors_hide_details() {
		let error = Error::Store(store::Error::Timeout);

		assert_eq!(error.status(), StatusCode::INTERNAL_SERVER_ERROR);

		let errors = error.errors();

		assert_eq!(errors.len(), 1);
		assert_eq!(errors[0].content, INTERNAL_MESSAGE);
	}

	#[test]
	fn test_client_errors_show_message() {
		let error = Error::Auth(guard::Error::InvalidCredentials);

		assert_eq!(error.status(), StatusCode::FORBIDDEN);
		assert_eq!(error.errors()[0].content, "invalid credentials");
	}

	#[test]
	fn test_rate_limit_is_too_many_requests() {
		let error = Error::RateLimit(GovernorError::TooManyRequests {
			wait_time: 1,
			headers: None,
		});

		assert_eq!(error.status(), StatusCode::TOO_MANY_REQUESTS);
	}
}
