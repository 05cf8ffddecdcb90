#![warn(clippy::pedantic)]

mod config;
mod error;
mod extract;
mod guard;
mod ingest;
mod model;
mod openapi;
mod ratelimit;
mod response;
mod route;
mod store;
mod trace;

use std::{net::SocketAddr, process::ExitCode, sync::Arc};

use aide::openapi::OpenApi;
use axum::{
	extract::{DefaultBodyLimit, Request},
	Extension, Router,
};
use tower::ServiceBuilder;
use tower_http::{
	compression::CompressionLayer,
	request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
	services::ServeDir,
	trace::TraceLayer,
};

pub use error::Error;

use crate::{
	config::Config,
	extract::UploadLimit,
	guard::AccessGuard,
	store::{PgStore, Store},
};

/// Room left in the request body limit for the multipart framing and the
/// title around the uploaded file.
const BODY_SLACK: usize = 64 * 1024;

pub type AppState = State;

/// The shared application state.
///
/// Everything in here is built once at startup from the [`Config`]. Handlers
/// pull out the part they need with [`axum::extract::State`].
#[derive(Clone, axum::extract::FromRef)]
pub struct State {
	pub store: Store,
	pub guard: AccessGuard,
	pub upload_limit: UploadLimit,
}

#[derive(Debug, thiserror::Error)]
enum StartupError {
	#[error(transparent)]
	Tracing(#[from] trace::Error),
	#[error("failed to connect to database: {0}")]
	Database(#[from] sqlx::Error),
	#[error("failed to run migrations: {0}")]
	Migrate(#[from] sqlx::migrate::MigrateError),
	#[error("admin credentials: {0}")]
	Guard(#[from] guard::Error),
	#[error("failed to bind listener: {0}")]
	Io(#[from] std::io::Error),
}

/// Builds the full router: pages, API docs, static assets and the
/// middleware stack.
pub fn app(state: AppState, config: &Config) -> Router {
	let mut api = OpenApi::default();

	route::routes(config.rate_limit)
		.nest_api_service("/docs", route::docs::routes())
		.finish_api_with(&mut api, openapi::docs)
		.nest_service("/static", ServeDir::new(&config.static_dir))
		.layer(Extension(Arc::new(api)))
		.layer(DefaultBodyLimit::max(
			config.upload_limit.saturating_add(BODY_SLACK),
		))
		.layer(
			ServiceBuilder::new()
				.layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
				.layer(
					TraceLayer::new_for_http().make_span_with(|request: &Request| {
						let request_id = request
							.headers()
							.get("x-request-id")
							.and_then(|value| value.to_str().ok())
							.unwrap_or_default();

						tracing::info_span!(
							"request",
							method = %request.method(),
							uri = %request.uri(),
							request_id,
						)
					})
					.on_response(trace::RecordLatency),
				)
				.layer(PropagateRequestIdLayer::x_request_id())
				.layer(CompressionLayer::new()),
		)
		.with_state(state)
}

async fn run(config: Config) -> Result<(), StartupError> {
	let store = PgStore::connect(&config.database).await?;

	sqlx::migrate!().run(store.pool()).await?;

	let state = State {
		store: Arc::new(store),
		guard: AccessGuard::new(&config.admin.username, &config.admin.password)?,
		upload_limit: UploadLimit(config.upload_limit),
	};

	let app = app(state, &config);
	let listener = tokio::net::TcpListener::bind((config.host, config.port)).await?;

	tracing::info!(address = %listener.local_addr()?, "listening");

	axum::serve(
		listener,
		app.into_make_service_with_connect_info::<SocketAddr>(),
	)
	.await?;

	Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
	let config = match Config::load() {
		Ok(config) => config,
		Err(error) => {
			eprintln!("invalid configuration: {error}");
			return ExitCode::FAILURE;
		}
	};

	let _guard = match trace::init_tracing_subscriber(&config.telemetry) {
		Ok(guard) => guard,
		Err(error) => {
			eprintln!("{error}");
			return ExitCode::FAILURE;
		}
	};

	match run(config).await {
		Ok(()) => ExitCode::SUCCESS,
		Err(error) => {
			tracing::error!(%error, "startup failed");
			ExitCode::FAILURE
		}
	}
}
