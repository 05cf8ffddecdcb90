use askama::Template;

use crate::model::Post;

pub use crate::route::model::{Navigation, Paginate};

/// One page of the blog list, newest post first.
#[derive(Template)]
#[template(path = "blog_list.html")]
pub struct BlogList {
	pub posts: Vec<Post>,
	pub navigation: Navigation,
}
