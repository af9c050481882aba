mod api;
mod config;
mod db;
mod error;
mod models;
mod schema;
mod store;
mod telemetry;
mod validation;

use axum::extract::MatchedPath;
use axum::http::{header, Method, Request};
use axum::middleware;
use axum::Router;
use config::ServerConfig;
use larder_core::RecipeService;
use std::env;
use std::sync::Arc;
use std::time::Duration;
use store::DieselRecipeStore;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::Span;
use utoipa_swagger_ui::SwaggerUi;

pub type AppState = Arc<RecipeService>;

/// Full application: API routes, Swagger UI, and the tracing/counting/CORS stack.
fn app(state: AppState, config: &ServerConfig) -> Router {
    let swagger_ui = SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api::openapi());

    let mut app = Router::new()
        .merge(api::router())
        .merge(swagger_ui)
        .with_state(state);

    if config.track_db_query_count {
        app = app.layer(middleware::from_fn(
            telemetry::db_query_count_header_middleware,
        ));
    }

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(config.cors_allowed_origins.clone()))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::LOCATION])
        .max_age(Duration::from_secs(3600));

    app.layer(
        TraceLayer::new_for_http()
            .make_span_with(|request: &Request<_>| {
                let matched_path = request
                    .extensions()
                    .get::<MatchedPath>()
                    .map(MatchedPath::as_str)
                    .unwrap_or(request.uri().path());

                if matched_path.starts_with("/swagger-ui") {
                    tracing::trace_span!("http_request")
                } else {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %matched_path,
                    )
                }
            })
            .on_request(|_request: &Request<_>, _span: &Span| {})
            .on_response(
                |response: &axum::http::Response<_>, latency: Duration, span: &Span| {
                    if span.metadata().map(|m| m.level()) == Some(&tracing::Level::TRACE) {
                        return;
                    }
                    let status = response.status().as_u16();
                    let db_queries = telemetry::get_query_count().unwrap_or(0);
                    if status >= 500 {
                        tracing::error!(
                            status = %status,
                            latency_ms = %latency.as_millis(),
                            db_queries,
                            "request failed with server error"
                        );
                    } else {
                        tracing::info!(
                            status = %status,
                            latency_ms = %latency.as_millis(),
                            db_queries,
                            "request completed"
                        );
                    }
                },
            )
            .on_failure(
                |error: tower_http::classify::ServerErrorsFailureClass,
                 latency: Duration,
                 _span: &Span| {
                    tracing::error!(
                        error = %error,
                        latency_ms = %latency.as_millis(),
                        "request failed"
                    );
                },
            ),
    )
    // Outside the TraceLayer so the counter covers the whole request
    .layer(middleware::from_fn(telemetry::query_counting_middleware))
    .layer(cors)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("Shutdown signal received, draining connections");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if env::args().any(|arg| arg == "--openapi") {
        println!("{}", api::openapi().to_pretty_json()?);
        return Ok(());
    }

    let telemetry = telemetry::init_telemetry();

    let config = ServerConfig::from_env()?;
    let pool = db::create_pool(&config.database_url, config.pool_size)?;
    let service = RecipeService::new(Arc::new(DieselRecipeStore::new(pool)));
    let state: AppState = Arc::new(service);

    let listener = tokio::net::TcpListener::bind(config.bind_address).await?;
    let address = listener.local_addr()?;

    tracing::info!("Server listening on {}", address);
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", address);
    tracing::info!("OpenAPI spec available at http://{}/api-docs/openapi.json", address);

    axum::serve(listener, app(state, &config))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    telemetry.shutdown();
    Ok(())
}
