use dotenvy::dotenv;
use schoolbot::router::init_router;
use schoolbot::state::init_app_state;
use schoolbot_config::ObservabilityConfig;
use schoolbot_observability::init_tracing;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    dotenv().ok();

    init_tracing(&ObservabilityConfig::from_env());

    let state = match init_app_state().await {
        Ok(state) => state,
        Err(e) => {
            error!(error = %e, "Failed to load the data directory");
            std::process::exit(1);
        }
    };
    let bind_addr = state.bot_config.bind_addr.clone();
    let app = init_router(state);

    let listener = match tokio::net::TcpListener::bind(&bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(bind_addr = %bind_addr, error = %e, "Failed to bind");
            std::process::exit(1);
        }
    };
    info!(bind_addr = %bind_addr, "Server running");

    if let Err(e) = axum::serve(listener, app).await {
        error!(error = %e, "Server stopped");
        std::process::exit(1);
    }
}
