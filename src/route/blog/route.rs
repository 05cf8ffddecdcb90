use axum::extract::State;
use macros::route;

use crate::{
	extract::Path,
	openapi::tag,
	response::Page,
	store::{self, ContentStore, Store},
};

use super::model;

/// Get first page
/// Renders the newest posts with a short sample of each body.
#[route(tag = tag::BLOG)]
pub async fn get_first_page(State(store): State<Store>) -> Page<model::BlogList> {
	list(store.as_ref(), model::Paginate::default()).await
}

/// Get page of posts
/// Renders a 1-indexed page of posts, newest first. A page past the end is
/// rendered with no posts.
#[route(tag = tag::BLOG)]
pub async fn get_page(
	State(store): State<Store>,
	Path(paginate): Path<model::Paginate>,
) -> Page<model::BlogList> {
	list(store.as_ref(), paginate).await
}

/// Builds a page of the list. A failed read shows an empty list rather than
/// an error page.
pub async fn list(store: &dyn ContentStore, paginate: model::Paginate) -> Page<model::BlogList> {
	let total = store::or_default(store.count_posts().await, "count_posts");
	let posts = store::or_default(
		store.list_posts(paginate.offset(), paginate.limit()).await,
		"list_posts",
	);

	Page(model::BlogList {
		posts,
		navigation: paginate.navigation(total),
	})
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::store::memory::MemoryStore;

	#[tokio::test]
	async fn test_list_second_page_of_seven() {
		let store = MemoryStore::new();

		for n in 1..=7 {
			store
				.create_post(&format!("post {n}"), b"body")
				.await
				.unwrap();
		}

		let Page(page) = list(&store, model::Paginate { page: 2 }).await;
		let titles = page
			.posts
			.iter()
			.map(|post| post.title.as_str())
			.collect::<Vec<_>>();

		assert_eq!(titles, ["post 2", "post 1"]);
		assert!(!page.navigation.has_more);
		assert!(page.navigation.has_previous);
	}

	#[tokio::test]
	async fn test_list_degrades_when_store_fails() {
		let store = MemoryStore::broken();

		let Page(page) = list(&store, model::Paginate::default()).await;

		assert!(page.posts.is_empty());
		assert!(!page.navigation.has_more);
	}
}
