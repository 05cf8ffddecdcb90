use aide::axum::{routing::get_with, ApiRouter};
use askama::Template;
use macros::route;

use crate::{openapi::tag, response::Page, AppState};

#[derive(Template)]
#[template(path = "index.html")]
pub struct Index;

#[derive(Template)]
#[template(path = "contact.html")]
pub struct Contact;

pub fn routes() -> ApiRouter<AppState> {
	ApiRouter::new()
		.api_route("/", get_with(home, home_docs))
		.api_route("/contact/", get_with(contact, contact_docs))
}

/// Home page
/// Renders the landing page.
#[route(tag = tag::PAGE)]
pub async fn home() -> Page<Index> {
	Page(Index)
}

/// Contact page
#[route(tag = tag::PAGE)]
pub async fn contact() -> Page<Contact> {
	Page(Contact)
}
