//! Persistence for posts and comments.
//!
//! Handlers only see the [`ContentStore`] trait. Every method touches a single
//! row (or a single read query), so no operation needs a transaction.

mod postgres;

#[cfg(test)]
pub mod memory;

pub use postgres::PgStore;

use std::sync::Arc;

use axum::http::StatusCode;

use crate::{
	error::{self, ErrorShape},
	model::{Comment, Post},
};

/// Shared handle to the content store.
pub type Store = Arc<dyn ContentStore>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("post title must not be empty")]
	EmptyTitle,
	#[error("unknown post {0}")]
	UnknownPost(i32),
	#[error("store call timed out")]
	Timeout,
	#[error("database error: {0}")]
	Database(#[from] sqlx::Error),
}

impl ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::EmptyTitle => StatusCode::BAD_REQUEST,
			Self::UnknownPost(..) => StatusCode::NOT_FOUND,
			Self::Timeout | Self::Database(..) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	fn errors(&self) -> Vec<error::Message> {
		match self {
			Self::EmptyTitle => error::Message::new(self.to_string())
				.field("title")
				.into_vec(),
			Self::UnknownPost(..) => error::Message::new(self.to_string()).into_vec(),
			Self::Timeout | Self::Database(..) => {
				error::Message::new(error::INTERNAL_MESSAGE).into_vec()
			}
		}
	}
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[axum::async_trait]
pub trait ContentStore: Send + Sync {
	/// Inserts a post stamped with the current time, returning its id.
	async fn create_post(&self, title: &str, body: &[u8]) -> Result<i32>;

	/// Replaces the body of a post. The title and timestamp are untouched.
	async fn update_post(&self, id: i32, body: &[u8]) -> Result<()>;

	async fn get_post(&self, id: i32) -> Result<Post>;

	/// Posts ordered newest first. An offset past the end yields an empty list.
	async fn list_posts(&self, offset: i64, limit: i64) -> Result<Vec<Post>>;

	async fn count_posts(&self) -> Result<i64>;

	/// Inserts an unapproved comment.
	async fn create_comment(&self, post_id: i32, author: &str, body: &str) -> Result<()>;

	/// Approved comments on a post, newest first. Unapproved comments are
	/// never returned.
	async fn list_approved_comments(&self, post_id: i32) -> Result<Vec<Comment>>;
}

/// Unwraps the result of a read, logging and falling back to the default
/// value when the store failed.
pub fn or_default<T: Default>(result: Result<T>, operation: &'static str) -> T {
	result.unwrap_or_else(|error| {
		tracing::warn!(%error, operation, "store read failed, returning empty result");
		T::default()
	})
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_or_default_passes_through_values() {
		assert_eq!(or_default(Ok(7_i64), "count_posts"), 7);
	}

	#[test]
	fn test_or_default_degrades_on_failure() {
		let posts: Vec<Post> = or_default(Err(Error::Timeout), "list_posts");

		assert!(posts.is_empty());
		assert_eq!(or_default::<i64>(Err(Error::Timeout), "count_posts"), 0);
	}

	#[test]
	fn test_persistence_errors_are_server_errors() {
		assert_eq!(Error::Timeout.status(), StatusCode::INTERNAL_SERVER_ERROR);
		assert_eq!(
			Error::Database(sqlx::Error::RowNotFound).status(),
			StatusCode::INTERNAL_SERVER_ERROR
		);
		assert_eq!(Error::UnknownPost(3).status(), StatusCode::NOT_FOUND);
	}
}
