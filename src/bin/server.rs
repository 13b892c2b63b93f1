use aidboard_server::api::{self, AppContext};
use aidboard_server::audit::StoreAuditRecorder;
use aidboard_server::auth::sessions::{MemorySessionStore, RedisSessionStore, SessionStore};
use aidboard_server::auth::AuthContext;
use aidboard_server::config::Config;
use aidboard_server::functions::HttpUserProvisioner;
use aidboard_server::identity::gotrue::GoTrueClient;
use aidboard_server::store::postgrest::PostgrestStore;
use aidboard_server::store::RowStore;
use axum::{routing::get, Router};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    aidboard_server::telemetry::init_telemetry("aidboard-server");

    let (prometheus_layer, metric_handle) = axum_prometheus::PrometheusMetricLayer::pair();

    let config = Config::from_env().expect("Invalid configuration");

    let store: Arc<dyn RowStore> = Arc::new(
        PostgrestStore::new(&config.supabase_url, &config.anon_key)
            .expect("Failed to build data client"),
    );
    let gateway = Arc::new(
        GoTrueClient::new(&config.supabase_url, &config.anon_key)
            .expect("Failed to build identity client"),
    );

    let sessions: Arc<dyn SessionStore> = match &config.redis_url {
        Some(url) => {
            let client = redis::Client::open(url.as_str()).expect("Invalid Redis URL");
            Arc::new(RedisSessionStore::new(client))
        }
        None => {
            tracing::warn!("REDIS_URL not set, sessions are kept in memory");
            Arc::new(MemorySessionStore::new())
        }
    };

    let provisioner = Arc::new(
        HttpUserProvisioner::new(&config.create_user_url, &config.anon_key)
            .expect("Failed to build create-user client"),
    );

    let ctx = AppContext {
        auth: AuthContext::new(gateway, store.clone(), sessions, config.session_ttl),
        audit: Arc::new(StoreAuditRecorder::new(store.clone())),
        store: store.clone(),
        provisioner,
    };

    aidboard_server::metrics::init_metrics(store.as_ref(), &config.anon_key).await;

    let app = app(ctx, &config, prometheus_layer, metric_handle);

    tracing::info!("listening on {}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .expect("Failed to bind");
    axum::serve(listener, app).await.expect("Server error");
}

fn app(
    ctx: AppContext,
    config: &Config,
    prometheus_layer: axum_prometheus::PrometheusMetricLayer<'static>,
    metric_handle: metrics_exporter_prometheus::PrometheusHandle,
) -> Router {
    let origin = config
        .cors_origin
        .parse::<axum::http::HeaderValue>()
        .expect("Invalid CORS_ALLOWED_ORIGIN");

    api::router(ctx)
        .layer(prometheus_layer)
        .layer(
            tower_http::trace::TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<axum::body::Body>| {
                    let matched_path = request
                        .extensions()
                        .get::<axum::extract::MatchedPath>()
                        .map(|matched| matched.as_str());

                    let span_name = match matched_path {
                        Some(path) => format!("{} {}", request.method(), path),
                        None => format!("{} {}", request.method(), request.uri().path()),
                    };

                    let user_ip = request
                        .headers()
                        .get("x-forwarded-for")
                        .and_then(|v| v.to_str().ok())
                        .or_else(|| {
                            request
                                .headers()
                                .get("x-real-ip")
                                .and_then(|v| v.to_str().ok())
                        })
                        .unwrap_or("unknown");

                    // Handlers fill in the empty fields.
                    tracing::info_span!(
                        "request",
                        "otel.name" = span_name,
                        user_ip = user_ip,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        table = tracing::field::Empty,
                        action = tracing::field::Empty,
                        user_id = tracing::field::Empty,
                        role = tracing::field::Empty,
                        user_email = tracing::field::Empty,
                        record_id = tracing::field::Empty,
                        business_event = tracing::field::Empty,
                        error = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency = tracing::field::Empty,
                    )
                })
                .on_request(|_request: &axum::http::Request<axum::body::Body>, _span: &tracing::Span| {})
                .on_response(
                    |response: &axum::http::Response<_>, latency: std::time::Duration, span: &tracing::Span| {
                        span.record("status", tracing::field::display(response.status()));
                        span.record("latency", tracing::field::debug(latency));
                        tracing::info!("request completed");
                    },
                ),
        )
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(origin)
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::PATCH,
                    axum::http::Method::DELETE,
                ])
                .allow_headers([axum::http::header::CONTENT_TYPE])
                .allow_credentials(true),
        )
        .route("/metrics", get(|| async move { metric_handle.render() }))
}
