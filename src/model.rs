use std::borrow::Cow;

/// Number of body bytes shown on the list page before the excerpt is cut.
pub const SAMPLE_LENGTH: usize = 150;

/// A single article.
///
/// The body is stored as raw bytes and rendered without escaping, since it
/// is uploaded markup written by the site owner.
#[derive(Debug, Clone, Default, PartialEq, Eq, sqlx::FromRow)]
pub struct Post {
	pub id: i32,
	pub title: String,
	pub body: Vec<u8>,
	/// Set by the store when the post is created, never updated.
	pub published_at: chrono::DateTime<chrono::Utc>,
}

impl Post {
	/// The full body as markup.
	pub fn html_body(&self) -> Cow<'_, str> {
		String::from_utf8_lossy(&self.body)
	}

	/// The first [`SAMPLE_LENGTH`] bytes of the body followed by an ellipsis,
	/// or the whole body if it is short enough.
	pub fn html_sample(&self) -> Cow<'_, str> {
		if self.body.len() <= SAMPLE_LENGTH {
			return self.html_body();
		}

		let body = self.html_body();
		let mut end = SAMPLE_LENGTH.min(body.len());

		while !body.is_char_boundary(end) {
			end -= 1;
		}

		Cow::Owned(format!("{}<em> ... </em>", &body[..end]))
	}
}

/// A visitor comment on a post.
///
/// Comments are created unapproved. The flag is flipped outside of this
/// service, by whoever moderates the database.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Comment {
	pub id: i32,
	pub post_id: i32,
	pub author: String,
	pub body: String,
	pub commented_at: chrono::DateTime<chrono::Utc>,
	pub approved: bool,
}
