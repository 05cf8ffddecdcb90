use std::{str::FromStr, time::Duration};

use axum::http::Response;
use opentelemetry::{global, metrics::MetricsError, trace::TraceError, KeyValue};
use opentelemetry_sdk::{
	metrics::{
		reader::{DefaultAggregationSelector, DefaultTemporalitySelector},
		Aggregation, Instrument, MeterProviderBuilder, PeriodicReader, SdkMeterProvider, Stream,
	},
	runtime,
	trace::{BatchConfig, Sampler, Tracer},
	Resource,
};
use opentelemetry_semantic_conventions::{
	resource::{DEPLOYMENT_ENVIRONMENT, SERVICE_NAME, SERVICE_VERSION},
	SCHEMA_URL,
};
use tower_http::trace::OnResponse;
use tracing::{
	level_filters::{LevelFilter, ParseLevelFilterError},
	Span,
};
use tracing_opentelemetry::MetricsLayer;
use tracing_subscriber::{
	layer::SubscriberExt,
	util::{SubscriberInitExt, TryInitError},
};

use crate::config;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("invalid log level: {0}")]
	Level(#[from] ParseLevelFilterError),
	#[error("failed to build metrics exporter: {0}")]
	Metrics(#[from] MetricsError),
	#[error("failed to install tracer: {0}")]
	Trace(#[from] TraceError),
	#[error("failed to install subscriber: {0}")]
	Init(#[from] TryInitError),
}

/// Constructs a [`Resource`] which describes the service.
fn resource() -> Resource {
	Resource::from_schema_url(
		[
			KeyValue::new(SERVICE_NAME, env!("CARGO_PKG_NAME")),
			KeyValue::new(SERVICE_VERSION, env!("CARGO_PKG_VERSION")),
			KeyValue::new(
				DEPLOYMENT_ENVIRONMENT,
				if cfg!(debug_assertions) {
					"development"
				} else {
					"production"
				},
			),
		],
		SCHEMA_URL,
	)
}

/// Upper bounds, in milliseconds, of the request latency histogram buckets.
const LATENCY_BUCKETS_MS: [f64; 10] = [
	5.0, 10.0, 25.0, 50.0, 100.0, 250.0, 500.0, 1000.0, 2500.0, 5000.0,
];

/// Logs every finished request and records its latency into the
/// `latency_ms` histogram picked up by the metrics layer.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordLatency;

impl<B> OnResponse<B> for RecordLatency {
	fn on_response(self, response: &Response<B>, latency: Duration, _span: &Span) {
		tracing::info!(
			histogram.latency_ms = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
			status = response.status().as_u16(),
			"finished request"
		);
	}
}

/// Constructs an [`SdkMeterProvider`] with request latency buckets.
fn init_meter_provider() -> Result<SdkMeterProvider, Error> {
	let exporter = opentelemetry_otlp::new_exporter()
		.tonic()
		.build_metrics_exporter(
			Box::new(DefaultAggregationSelector::new()),
			Box::new(DefaultTemporalitySelector::new()),
		)?;

	let reader = PeriodicReader::builder(exporter, runtime::Tokio)
		.with_interval(Duration::from_secs(5))
		.build();

	// For debugging in development
	#[cfg(debug_assertions)]
	let stdout_reader = PeriodicReader::builder(
		opentelemetry_stdout::MetricsExporter::default(),
		runtime::Tokio,
	)
	.build();

	let view_latency = |instrument: &Instrument| -> Option<Stream> {
		(instrument.name == "latency_ms").then(|| {
			Stream::new()
				.name("latency_ms")
				.aggregation(Aggregation::ExplicitBucketHistogram {
					boundaries: LATENCY_BUCKETS_MS.to_vec(),
					record_min_max: true,
				})
		})
	};

	let meter_provider = MeterProviderBuilder::default();
	#[cfg(debug_assertions)]
	let meter_provider = meter_provider.with_reader(stdout_reader);

	let meter_provider = meter_provider
		.with_resource(resource())
		.with_reader(reader)
		.with_view(view_latency)
		.build();

	global::set_meter_provider(meter_provider.clone());

	Ok(meter_provider)
}

/// Constructs a [`Tracer`] with a custom sampling strategy and exporter.
fn init_tracer() -> Result<Tracer, Error> {
	opentelemetry_otlp::new_pipeline()
		.tracing()
		.with_trace_config(
			opentelemetry_sdk::trace::Config::default()
				.with_sampler(Sampler::TraceIdRatioBased(1.0))
				.with_resource(resource()),
		)
		.with_batch_config(BatchConfig::default())
		.with_exporter(opentelemetry_otlp::new_exporter().tonic())
		.install_batch(runtime::Tokio)
		.map_err(Error::from)
}

/// Initializes the tracing subscriber. With OTLP export enabled, the
/// returned guard flushes the global tracer and meter provider when dropped.
pub fn init_tracing_subscriber(config: &config::Telemetry) -> Result<Option<OtelGuard>, Error> {
	let level = LevelFilter::from_str(&config.log_level)?;
	let (meter_provider, tracer) = if config.otlp {
		(Some(init_meter_provider()?), Some(init_tracer()?))
	} else {
		(None, None)
	};

	tracing_subscriber::registry()
		.with(level)
		.with(tracing_subscriber::fmt::layer().with_ansi(true))
		.with(meter_provider.clone().map(MetricsLayer::new))
		.with(tracer.map(|tracer| tracing_opentelemetry::layer().with_tracer(tracer)))
		.try_init()?;

	Ok(meter_provider.map(|meter_provider| OtelGuard { meter_provider }))
}

pub struct OtelGuard {
	meter_provider: SdkMeterProvider,
}

impl Drop for OtelGuard {
	fn drop(&mut self) {
		if let Err(err) = self.meter_provider.shutdown() {
			eprintln!("{err:?}");
		}

		opentelemetry::global::shutdown_tracer_provider();
	}
}
