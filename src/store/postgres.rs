use std::{future::Future, time::Duration};

use sqlx::postgres::{PgPool, PgPoolOptions};

use super::{ContentStore, Error, Result};
use crate::{
	config,
	model::{Comment, Post},
};

/// [`ContentStore`] backed by a bounded Postgres connection pool.
///
/// Each call holds a connection for exactly one query and is cut off after
/// the configured timeout.
#[derive(Debug, Clone)]
pub struct PgStore {
	pool: PgPool,
	timeout: Duration,
}

impl PgStore {
	pub async fn connect(config: &config::Database) -> Result<Self, sqlx::Error> {
		let pool = PgPoolOptions::new()
			.max_connections(config.max_open)
			.min_connections(config.min_idle)
			.acquire_timeout(config.timeout())
			.idle_timeout(config.idle_timeout())
			.connect_with(config.connect_options()?)
			.await?;

		tracing::info!(
			max_open = config.max_open,
			min_idle = config.min_idle,
			"connected to database"
		);

		Ok(Self::new(pool, config.timeout()))
	}

	pub fn new(pool: PgPool, timeout: Duration) -> Self {
		Self { pool, timeout }
	}

	pub fn pool(&self) -> &PgPool {
		&self.pool
	}

	async fn bounded<T, F>(&self, query: F) -> Result<T>
	where
		F: Future<Output = Result<T, sqlx::Error>> + Send,
	{
		tokio::time::timeout(self.timeout, query)
			.await
			.map_err(|_| Error::Timeout)?
			.map_err(Error::from)
	}
}

#[axum::async_trait]
impl ContentStore for PgStore {
	#[tracing::instrument(name = "store.create_post", skip(self, body), fields(body_len = body.len()))]
	async fn create_post(&self, title: &str, body: &[u8]) -> Result<i32> {
		if title.is_empty() {
			return Err(Error::EmptyTitle);
		}

		self.bounded(
			sqlx::query_scalar::<_, i32>(
				r#"
					INSERT INTO post (title, body)
					VALUES ($1, $2)
					RETURNING id
				"#,
			)
			.bind(title)
			.bind(body)
			.fetch_one(&self.pool),
		)
		.await
	}

	#[tracing::instrument(name = "store.update_post", skip(self, body), fields(body_len = body.len()))]
	async fn update_post(&self, id: i32, body: &[u8]) -> Result<()> {
		let status = self
			.bounded(
				sqlx::query(
					r#"
						UPDATE post
						SET body = $2
						WHERE id = $1
					"#,
				)
				.bind(id)
				.bind(body)
				.execute(&self.pool),
			)
			.await?;

		if status.rows_affected() == 0 {
			return Err(Error::UnknownPost(id));
		}

		Ok(())
	}

	async fn get_post(&self, id: i32) -> Result<Post> {
		self.bounded(
			sqlx::query_as::<_, Post>(
				r#"
					SELECT id, title, body, published_at FROM post
					WHERE id = $1
				"#,
			)
			.bind(id)
			.fetch_optional(&self.pool),
		)
		.await?
		.ok_or(Error::UnknownPost(id))
	}

	async fn list_posts(&self, offset: i64, limit: i64) -> Result<Vec<Post>> {
		self.bounded(
			sqlx::query_as::<_, Post>(
				r#"
					SELECT id, title, body, published_at FROM post
					ORDER BY published_at DESC, id DESC
					LIMIT $1 OFFSET $2
				"#,
			)
			.bind(limit)
			.bind(offset)
			.fetch_all(&self.pool),
		)
		.await
	}

	async fn count_posts(&self) -> Result<i64> {
		self.bounded(sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM post").fetch_one(&self.pool))
			.await
	}

	#[tracing::instrument(name = "store.create_comment", skip(self, author, body))]
	async fn create_comment(&self, post_id: i32, author: &str, body: &str) -> Result<()> {
		self.bounded(
			sqlx::query(
				r#"
					INSERT INTO comment (post_id, author, body)
					VALUES ($1, $2, $3)
				"#,
			)
			.bind(post_id)
			.bind(author)
			.bind(body)
			.execute(&self.pool),
		)
		.await?;

		Ok(())
	}

	async fn list_approved_comments(&self, post_id: i32) -> Result<Vec<Comment>> {
		self.bounded(
			sqlx::query_as::<_, Comment>(
				r#"
					SELECT id, post_id, author, body, commented_at, approved FROM comment
					WHERE post_id = $1 AND approved
					ORDER BY commented_at DESC, id DESC
				"#,
			)
			.bind(post_id)
			.fetch_all(&self.pool),
		)
		.await
	}
}

#[cfg(test)]
mod test {
	use super::*;

	fn store(pool: PgPool) -> PgStore {
		PgStore::new(pool, Duration::from_secs(5))
	}

	#[sqlx::test]
	#[ignore = "requires a Postgres DATABASE_URL"]
	async fn test_post_round_trip(pool: PgPool) {
		let store = store(pool);

		let id = store.create_post("Hello", b"<p>Hi</p>").await.unwrap();
		let post = store.get_post(id).await.unwrap();

		assert_eq!(post.title, "Hello");
		assert_eq!(post.body, b"<p>Hi</p>");

		store.update_post(id, b"<p>Bye</p>").await.unwrap();

		let updated = store.get_post(id).await.unwrap();

		assert_eq!(updated.body, b"<p>Bye</p>");
		assert_eq!(updated.title, post.title);
		assert_eq!(updated.published_at, post.published_at);
	}

	#[sqlx::test]
	#[ignore = "requires a Postgres DATABASE_URL"]
	async fn test_missing_post_is_unknown(pool: PgPool) {
		let store = store(pool);

		assert!(matches!(store.get_post(42).await, Err(Error::UnknownPost(42))));
		assert!(matches!(
			store.update_post(42, b"x").await,
			Err(Error::UnknownPost(42))
		));
	}

	#[sqlx::test]
	#[ignore = "requires a Postgres DATABASE_URL"]
	async fn test_list_posts_pages_newest_first(pool: PgPool) {
		let store = store(pool);

		for n in 1..=7 {
			store.create_post(&format!("post {n}"), b"body").await.unwrap();
		}

		assert_eq!(store.count_posts().await.unwrap(), 7);

		let first = store.list_posts(0, 5).await.unwrap();
		let second = store.list_posts(5, 5).await.unwrap();
		let beyond = store.list_posts(10, 5).await.unwrap();

		assert_eq!(first.len(), 5);
		assert_eq!(first[0].title, "post 7");
		assert_eq!(second.len(), 2);
		assert_eq!(second[1].title, "post 1");
		assert!(beyond.is_empty());
	}

	#[sqlx::test]
	#[ignore = "requires a Postgres DATABASE_URL"]
	async fn test_unapproved_comments_are_hidden(pool: PgPool) {
		let store = store(pool.clone());
		let id = store.create_post("Hello", b"body").await.unwrap();

		store.create_comment(id, "a@b.com", "nice").await.unwrap();
		store.create_comment(id, "c@d.com", "great").await.unwrap();

		assert!(store.list_approved_comments(id).await.unwrap().is_empty());

		sqlx::query("UPDATE comment SET approved = TRUE WHERE author = 'c@d.com'")
			.execute(&pool)
			.await
			.unwrap();

		let comments = store.list_approved_comments(id).await.unwrap();

		assert_eq!(comments.len(), 1);
		assert_eq!(comments[0].body, "great");
		assert!(comments[0].approved);
	}

	#[sqlx::test]
	#[ignore = "requires a Postgres DATABASE_URL"]
	async fn test_empty_title_is_rejected(pool: PgPool) {
		let store = store(pool);

		assert!(matches!(
			store.create_post("", b"body").await,
			Err(Error::EmptyTitle)
		));
		assert_eq!(store.count_posts().await.unwrap(), 0);
	}
}
