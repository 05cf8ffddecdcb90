use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Number of posts on a single page of the blog list.
pub const PAGE_SIZE: i64 = 5;

/// These can be removed when [`serde`] supports
/// literal defaults: <https://github.com/serde-rs/serde/issues/368>
#[inline]
fn one() -> i64 {
	1
}

/// A 1-indexed page of the blog list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Validate, JsonSchema)]
pub struct Paginate {
	/// The page number to return (1-indexed).
	#[validate(range(min = 1))]
	#[serde(default = "one")]
	pub page: i64,
}

impl Default for Paginate {
	fn default() -> Self {
		Self { page: one() }
	}
}

/// Where a page sits in the list, used to render the older/newer links.
///
/// `next_page` and `previous_page` are always filled in; the flags decide
/// whether they are shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
pub struct Navigation {
	pub current_page: i64,
	pub next_page: i64,
	pub previous_page: i64,
	pub has_more: bool,
	pub has_previous: bool,
}

impl Paginate {
	pub fn offset(&self) -> i64 {
		self.page.saturating_sub(1).saturating_mul(PAGE_SIZE)
	}

	pub fn limit(&self) -> i64 {
		PAGE_SIZE
	}

	/// Navigation state for this page given the total number of posts.
	/// A page past the end is valid and simply has nothing more to show.
	pub fn navigation(&self, total: i64) -> Navigation {
		Navigation {
			current_page: self.page,
			next_page: self.page.saturating_add(1),
			previous_page: self.page.saturating_sub(1),
			has_more: self.offset().saturating_add(PAGE_SIZE) < total,
			has_previous: self.page > 1,
		}
	}
}

#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct IdInput {
	#[validate(range(min = 1))]
	pub id: i32,
}
