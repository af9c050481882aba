//! Logging, optional OpenTelemetry export, and per-request database query counting.

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use opentelemetry::trace::TracerProvider;
use opentelemetry_appender_tracing::layer::OpenTelemetryTracingBridge;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::logs::SdkLoggerProvider;
use opentelemetry_sdk::trace::SdkTracerProvider;
use std::env;
use std::net::{TcpStream, ToSocketAddrs};
use std::sync::{
    atomic::{AtomicU32, Ordering},
    Arc,
};
use std::time::Duration;
use tracing::{span::Id, Subscriber};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{layer::Context, registry::LookupSpan, Layer};

pub const DB_QUERY_COUNT_HEADER: &str = "X-DB-Query-Count";

/// Providers that need flushing before the process exits.
#[derive(Default)]
pub struct Telemetry {
    tracer_provider: Option<SdkTracerProvider>,
    logger_provider: Option<SdkLoggerProvider>,
}

impl Telemetry {
    pub fn shutdown(self) {
        if let Some(provider) = self.tracer_provider {
            if let Err(e) = provider.shutdown() {
                tracing::warn!("Failed to shut down trace provider: {}", e);
            }
        }
        if let Some(provider) = self.logger_provider {
            if let Err(e) = provider.shutdown() {
                tracing::warn!("Failed to shut down log provider: {}", e);
            }
        }
    }
}

fn collector_reachable(endpoint: &str) -> bool {
    let host_port = endpoint
        .trim_start_matches("http://")
        .trim_start_matches("https://");

    // Quick TCP check to see if the collector is up (resolve hostname first)
    host_port
        .to_socket_addrs()
        .ok()
        .and_then(|mut addrs| addrs.next())
        .map(|addr| TcpStream::connect_timeout(&addr, Duration::from_millis(100)).is_ok())
        .unwrap_or(false)
}

fn otlp_providers(
    endpoint: &str,
    service_name: &str,
) -> Result<(SdkTracerProvider, SdkLoggerProvider), opentelemetry_otlp::ExporterBuildError> {
    let resource = opentelemetry_sdk::Resource::builder()
        .with_service_name(service_name.to_string())
        .build();

    let trace_exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()?;
    let trace_provider = SdkTracerProvider::builder()
        .with_batch_exporter(trace_exporter)
        .with_resource(resource.clone())
        .build();

    let log_exporter = opentelemetry_otlp::LogExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()?;
    let log_provider = SdkLoggerProvider::builder()
        .with_batch_exporter(log_exporter)
        .with_resource(resource)
        .build();

    Ok((trace_provider, log_provider))
}

/// Initialize telemetry with optional OpenTelemetry export.
/// If OTEL_EXPORTER_OTLP_ENDPOINT is set and reachable, traces and logs are sent to
/// the collector. Otherwise, only console logging is used.
pub fn init_telemetry() -> Telemetry {
    let fmt_layer = tracing_subscriber::fmt::layer();
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let service_name =
        env::var("OTEL_SERVICE_NAME").unwrap_or_else(|_| "larder-server".to_string());

    let endpoint = env::var("OTEL_EXPORTER_OTLP_ENDPOINT").ok();
    let reachable = endpoint.as_deref().is_some_and(collector_reachable);

    let mut setup_error = None;
    let providers = match endpoint.as_deref() {
        Some(endpoint) if reachable => match otlp_providers(endpoint, &service_name) {
            Ok(providers) => Some(providers),
            Err(e) => {
                setup_error = Some(e);
                None
            }
        },
        _ => None,
    };

    let otel_trace_layer = providers.as_ref().map(|(trace_provider, _)| {
        let tracer = trace_provider.tracer("larder-server");
        opentelemetry::global::set_tracer_provider(trace_provider.clone());
        tracing_opentelemetry::layer().with_tracer(tracer)
    });
    let otel_log_layer = providers
        .as_ref()
        .map(|(_, log_provider)| OpenTelemetryTracingBridge::new(log_provider));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .with(DbQueryCountingLayer)
        .with(otel_trace_layer)
        .with(otel_log_layer)
        .init();

    match (endpoint, providers) {
        (Some(endpoint), Some((trace_provider, log_provider))) => {
            tracing::info!(
                "OpenTelemetry enabled, exporting traces and logs to {} as {}",
                endpoint,
                service_name
            );
            Telemetry {
                tracer_provider: Some(trace_provider),
                logger_provider: Some(log_provider),
            }
        }
        (Some(endpoint), None) => {
            match setup_error {
                Some(e) => tracing::warn!(
                    "Failed to set up OTLP export to {}: {}, using console logging only",
                    endpoint,
                    e
                ),
                None => tracing::info!(
                    "OpenTelemetry endpoint {} not reachable, using console logging only",
                    endpoint
                ),
            }
            Telemetry::default()
        }
        (None, _) => {
            tracing::debug!("OTEL_EXPORTER_OTLP_ENDPOINT not set, using console logging only");
            Telemetry::default()
        }
    }
}

tokio::task_local! {
    /// Database queries issued by the current request. Follows the task across
    /// await points and thread migrations.
    static DB_QUERY_COUNTER: Arc<AtomicU32>;
}

/// Database query count for the current request, if counting is active.
pub fn get_query_count() -> Option<u32> {
    DB_QUERY_COUNTER
        .try_with(|counter| counter.load(Ordering::Relaxed))
        .ok()
}

/// A tracing Layer that counts `db.query` spans per HTTP request.
///
/// The store opens one `db.query` span per call and runs diesel synchronously inside
/// the handler's task, so the task-local counter set up by
/// [`query_counting_middleware`] sees every one of them.
pub struct DbQueryCountingLayer;

impl<S> Layer<S> for DbQueryCountingLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(&self, _attrs: &tracing::span::Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };

        if span.name() == "db.query" {
            let _ = DB_QUERY_COUNTER.try_with(|counter| {
                counter.fetch_add(1, Ordering::Relaxed);
            });
        }
    }
}

/// Initializes the per-request database query counter.
///
/// Must wrap the TraceLayer so the counter exists for the whole request.
pub async fn query_counting_middleware(request: Request<Body>, next: Next) -> Response {
    let counter = Arc::new(AtomicU32::new(0));
    DB_QUERY_COUNTER.scope(counter, next.run(request)).await
}

/// Adds the `X-DB-Query-Count` header to responses.
pub async fn db_query_count_header_middleware(request: Request<Body>, next: Next) -> Response {
    let mut response = next.run(request).await;

    if let Some(count) = get_query_count() {
        if let Ok(value) = axum::http::header::HeaderValue::from_str(&count.to_string()) {
            response.headers_mut().insert(DB_QUERY_COUNT_HEADER, value);
        }
    }

    response
}
