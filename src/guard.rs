//! The shared-credential check in front of every post mutation.

use std::sync::Arc;

use axum::http::{HeaderValue, StatusCode};
use base64::{engine::general_purpose::STANDARD, Engine};
use subtle::ConstantTimeEq;

use crate::error::ErrorShape;

const BASIC_PREFIX: &str = "Basic ";

/// An error that can occur while checking admin credentials.
///
/// Note that the messages are presented to the client, so they should not contain
/// sensitive information.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("missing credentials")]
	MissingCredentials,
	#[error("malformed credentials")]
	MalformedCredentials,
	#[error("invalid credentials")]
	InvalidCredentials,
	#[error("admin username and password must both be set")]
	Unconfigured,
}

impl ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::MissingCredentials | Self::MalformedCredentials | Self::InvalidCredentials => {
				StatusCode::FORBIDDEN
			}
			Self::Unconfigured => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}
}

/// A username and password presented with a request.
#[derive(Debug, PartialEq, Eq)]
pub struct Credentials {
	pub username: String,
	pub password: String,
}

impl Credentials {
	/// Parses an `Authorization: Basic ...` header value.
	pub fn from_header(value: &HeaderValue) -> Result<Self, Error> {
		let value = value.to_str().map_err(|_| Error::MalformedCredentials)?;
		let encoded = value
			.strip_prefix(BASIC_PREFIX)
			.ok_or(Error::MalformedCredentials)?;

		let decoded = STANDARD
			.decode(encoded.trim())
			.map_err(|_| Error::MalformedCredentials)?;
		let decoded = String::from_utf8(decoded).map_err(|_| Error::MalformedCredentials)?;

		let (username, password) = decoded
			.split_once(':')
			.ok_or(Error::MalformedCredentials)?;

		Ok(Self {
			username: username.to_owned(),
			password: password.to_owned(),
		})
	}
}

/// Holds the configured admin secrets and matches presented credentials
/// against them.
#[derive(Clone)]
pub struct AccessGuard {
	username: Arc<str>,
	password: Arc<str>,
}

impl std::fmt::Debug for AccessGuard {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("AccessGuard").finish_non_exhaustive()
	}
}

impl AccessGuard {
	/// Fails if either secret is empty, since an empty secret would leave
	/// the admin routes open.
	pub fn new(username: &str, password: &str) -> Result<Self, Error> {
		if username.is_empty() || password.is_empty() {
			return Err(Error::Unconfigured);
		}

		Ok(Self {
			username: username.into(),
			password: password.into(),
		})
	}

	/// Exact match of both fields, compared in constant time.
	pub fn check(&self, credentials: Option<&Credentials>) -> Result<(), Error> {
		let credentials = credentials.ok_or(Error::MissingCredentials)?;

		let username = credentials.username.as_bytes().ct_eq(self.username.as_bytes());
		let password = credentials.password.as_bytes().ct_eq(self.password.as_bytes());

		if bool::from(username & password) {
			Ok(())
		} else {
			Err(Error::InvalidCredentials)
		}
	}
}

#[cfg(test)]
mod test {
	use super::*;

	fn header(raw: &str) -> HeaderValue {
		HeaderValue::from_str(&format!("Basic {}", STANDARD.encode(raw))).unwrap()
	}

	fn guard() -> AccessGuard {
		AccessGuard::new("admin", "hunter2").unwrap()
	}

	#[test]
	fn test_parse_basic_header() {
		let credentials = Credentials::from_header(&header("admin:hunter2")).unwrap();

		assert_eq!(credentials.username, "admin");
		assert_eq!(credentials.password, "hunter2");
	}

	#[test]
	fn test_password_may_contain_colons() {
		let credentials = Credentials::from_header(&header("admin:a:b")).unwrap();

		assert_eq!(credentials.password, "a:b");
	}

	#[test]
	fn test_reject_malformed_headers() {
		for value in ["Bearer abc", "Basic !!!", "Basic"] {
			let value = HeaderValue::from_static(value);

			assert!(matches!(
				Credentials::from_header(&value),
				Err(Error::MalformedCredentials)
			));
		}

		assert!(matches!(
			Credentials::from_header(&header("no-colon")),
			Err(Error::MalformedCredentials)
		));
	}

	#[test]
	fn test_check_exact_match() {
		let guard = guard();
		let ok = Credentials {
			username: "admin".into(),
			password: "hunter2".into(),
		};

		assert!(guard.check(Some(&ok)).is_ok());
	}

	#[test]
	fn test_check_rejects_mismatch() {
		let guard = guard();

		for (username, password) in [
			("admin", "hunter"),
			("admin", "hunter22"),
			("Admin", "hunter2"),
			("", ""),
		] {
			let credentials = Credentials {
				username: username.into(),
				password: password.into(),
			};

			assert!(matches!(
				guard.check(Some(&credentials)),
				Err(Error::InvalidCredentials)
			));
		}

		assert!(matches!(guard.check(None), Err(Error::MissingCredentials)));
	}

	#[test]
	fn test_empty_secrets_are_refused() {
		assert!(matches!(
			AccessGuard::new("", "hunter2"),
			Err(Error::Unconfigured)
		));
		assert!(matches!(
			AccessGuard::new("admin", ""),
			Err(Error::Unconfigured)
		));
	}
}
