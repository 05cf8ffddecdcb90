use std::sync::{
	atomic::{AtomicUsize, Ordering},
	Mutex, MutexGuard,
};

use chrono::{Duration, Utc};

use super::{ContentStore, Error, Result};
use crate::model::{Comment, Post};

#[derive(Default)]
struct Inner {
	posts: Vec<Post>,
	comments: Vec<Comment>,
	/// Fails every call when set, to simulate an unreachable database.
	broken: bool,
}

/// In-memory [`ContentStore`] used by tests.
///
/// Every inserted record is stamped one second after the previous one so
/// that ordering by timestamp is deterministic.
#[derive(Default)]
pub struct MemoryStore {
	inner: Mutex<Inner>,
	writes: AtomicUsize,
}

impl MemoryStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// A store that fails every call with [`Error::Timeout`].
	pub fn broken() -> Self {
		let store = Self::default();
		store.lock().broken = true;
		store
	}

	/// Number of write calls that reached the store.
	pub fn writes(&self) -> usize {
		self.writes.load(Ordering::SeqCst)
	}

	/// Flips the approval flag, as a moderator would directly in the database.
	pub fn approve(&self, comment_id: i32) {
		let mut inner = self.lock();

		if let Some(comment) = inner.comments.iter_mut().find(|c| c.id == comment_id) {
			comment.approved = true;
		}
	}

	/// Every comment, approved or not.
	pub fn all_comments(&self) -> Vec<Comment> {
		self.lock().comments.clone()
	}

	fn lock(&self) -> MutexGuard<'_, Inner> {
		self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
	}

	fn check(inner: &Inner) -> Result<()> {
		if inner.broken {
			return Err(Error::Timeout);
		}

		Ok(())
	}
}

fn stamp(sequence: usize) -> chrono::DateTime<Utc> {
	let base = chrono::DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap_or_default();

	base + Duration::seconds(i64::try_from(sequence).unwrap_or(i64::MAX))
}

#[axum::async_trait]
impl ContentStore for MemoryStore {
	async fn create_post(&self, title: &str, body: &[u8]) -> Result<i32> {
		self.writes.fetch_add(1, Ordering::SeqCst);

		let mut inner = self.lock();
		Self::check(&inner)?;

		if title.is_empty() {
			return Err(Error::EmptyTitle);
		}

		let sequence = inner.posts.len() + inner.comments.len();
		let id = i32::try_from(inner.posts.len() + 1).unwrap_or(i32::MAX);

		inner.posts.push(Post {
			id,
			title: title.to_owned(),
			body: body.to_vec(),
			published_at: stamp(sequence),
		});

		Ok(id)
	}

	async fn update_post(&self, id: i32, body: &[u8]) -> Result<()> {
		self.writes.fetch_add(1, Ordering::SeqCst);

		let mut inner = self.lock();
		Self::check(&inner)?;

		let post = inner
			.posts
			.iter_mut()
			.find(|post| post.id == id)
			.ok_or(Error::UnknownPost(id))?;

		post.body = body.to_vec();

		Ok(())
	}

	async fn get_post(&self, id: i32) -> Result<Post> {
		let inner = self.lock();
		Self::check(&inner)?;

		inner
			.posts
			.iter()
			.find(|post| post.id == id)
			.cloned()
			.ok_or(Error::UnknownPost(id))
	}

	async fn list_posts(&self, offset: i64, limit: i64) -> Result<Vec<Post>> {
		let inner = self.lock();
		Self::check(&inner)?;

		let mut posts = inner.posts.clone();
		posts.sort_by(|a, b| (b.published_at, b.id).cmp(&(a.published_at, a.id)));

		Ok(posts
			.into_iter()
			.skip(usize::try_from(offset).unwrap_or(usize::MAX))
			.take(usize::try_from(limit).unwrap_or(0))
			.collect())
	}

	async fn count_posts(&self) -> Result<i64> {
		let inner = self.lock();
		Self::check(&inner)?;

		Ok(i64::try_from(inner.posts.len()).unwrap_or(i64::MAX))
	}

	async fn create_comment(&self, post_id: i32, author: &str, body: &str) -> Result<()> {
		self.writes.fetch_add(1, Ordering::SeqCst);

		let mut inner = self.lock();
		Self::check(&inner)?;

		let sequence = inner.posts.len() + inner.comments.len();
		let id = i32::try_from(inner.comments.len() + 1).unwrap_or(i32::MAX);

		inner.comments.push(Comment {
			id,
			post_id,
			author: author.to_owned(),
			body: body.to_owned(),
			commented_at: stamp(sequence),
			approved: false,
		});

		Ok(())
	}

	async fn list_approved_comments(&self, post_id: i32) -> Result<Vec<Comment>> {
		let inner = self.lock();
		Self::check(&inner)?;

		let mut comments = inner
			.comments
			.iter()
			.filter(|comment| comment.post_id == post_id && comment.approved)
			.cloned()
			.collect::<Vec<_>>();

		comments.sort_by(|a, b| (b.commented_at, b.id).cmp(&(a.commented_at, a.id)));

		Ok(comments)
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[tokio::test]
	async fn test_posts_are_listed_newest_first() {
		let store = MemoryStore::new();

		for n in 1..=3 {
			store.create_post(&format!("post {n}"), b"body").await.unwrap();
		}

		let titles = store
			.list_posts(0, 5)
			.await
			.unwrap()
			.into_iter()
			.map(|post| post.title)
			.collect::<Vec<_>>();

		assert_eq!(titles, ["post 3", "post 2", "post 1"]);
	}

	#[tokio::test]
	async fn test_offset_past_end_is_empty() {
		let store = MemoryStore::new();
		store.create_post("only", b"body").await.unwrap();

		assert!(store.list_posts(5, 5).await.unwrap().is_empty());
	}

	#[tokio::test]
	async fn test_approval_gates_comments() {
		let store = MemoryStore::new();
		let id = store.create_post("post", b"body").await.unwrap();

		store.create_comment(id, "a", "first").await.unwrap();
		store.create_comment(id, "b", "second").await.unwrap();

		assert!(store.list_approved_comments(id).await.unwrap().is_empty());

		store.approve(1);
		store.approve(2);

		let bodies = store
			.list_approved_comments(id)
			.await
			.unwrap()
			.into_iter()
			.map(|comment| comment.body)
			.collect::<Vec<_>>();

		assert_eq!(bodies, ["second", "first"]);
	}
}
