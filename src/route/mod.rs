use aide::axum::ApiRouter;
use tower_governor::GovernorLayer;

use crate::{ratelimit, AppState};

pub mod article;
pub mod blog;
pub mod comment;
pub mod docs;
pub mod model;
pub mod page;

/// Every page and form route. Reads and writes get separate rate limits
/// when `rate_limit` is set.
pub fn routes(rate_limit: bool) -> ApiRouter<AppState> {
	let reads = ApiRouter::new()
		.merge(page::routes())
		.merge(blog::routes())
		.merge(article::routes());
	let writes = ApiRouter::new()
		.merge(article::admin_routes())
		.merge(comment::routes());

	if !rate_limit {
		return reads.merge(writes);
	}

	let (Some(default), Some(secure)) = (ratelimit::default(), ratelimit::secure()) else {
		tracing::warn!("invalid rate limit preset, serving without rate limits");
		return reads.merge(writes);
	};

	ratelimit::cleanup_old_limits(&[&default, &secure]);

	reads
		.layer(GovernorLayer { config: default })
		.merge(writes.layer(GovernorLayer { config: secure }))
}
