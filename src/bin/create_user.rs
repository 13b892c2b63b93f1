use aidboard_server::config::FunctionConfig;
use aidboard_server::functions::{self, FunctionState};
use aidboard_server::identity::GoTrueClient;
use aidboard_server::store::PostgrestStore;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    aidboard_server::telemetry::init_telemetry("aidboard-create-user");

    let config = FunctionConfig::from_env().expect("Invalid configuration");

    let state = FunctionState {
        gateway: Arc::new(
            GoTrueClient::new(&config.supabase_url, &config.anon_key)
                .expect("Failed to build identity client"),
        ),
        admin: Arc::new(
            GoTrueClient::admin(&config.supabase_url, &config.service_role_key)
                .expect("Failed to build identity admin client"),
        ),
        store: Arc::new(
            PostgrestStore::new(&config.supabase_url, &config.service_role_key)
                .expect("Failed to build data client"),
        ),
        service_token: config.service_role_key.clone(),
        anon_key: config.anon_key.clone(),
    };

    let origin = config.allowed_origin.as_deref().map(|origin| {
        origin
            .parse::<axum::http::HeaderValue>()
            .expect("Invalid FUNCTION_ALLOWED_ORIGIN")
    });

    let app = functions::router(state, origin).layer(tower_http::trace::TraceLayer::new_for_http());

    tracing::info!("create-user function listening on {}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .expect("Failed to bind");
    axum::serve(listener, app).await.expect("Server error");
}
