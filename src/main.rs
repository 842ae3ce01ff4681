use std::net::SocketAddr;

use coursebook::logging::init_tracing;
use coursebook::metrics::{init_metrics, metrics_app};
use coursebook::router::init_router;
use coursebook::state::init_app_state;
use coursebook_config::ServerConfig;
use coursebook_db::run_migrations;
use dotenvy::dotenv;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    dotenv().ok();
    init_tracing();

    let state = match init_app_state().await {
        Ok(state) => state,
        Err(e) => {
            error!(error = ?e, "Failed to initialize application state");
            eprintln!("❌ Failed to start: {:#}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run_migrations(&state.db).await {
        error!(error = ?e, "Failed to run migrations");
        eprintln!("❌ Failed to run migrations: {:#}", e);
        std::process::exit(1);
    }

    let server_config = ServerConfig::from_env();

    if let Some(handle) = init_metrics() {
        let metrics_addr = server_config.metrics_addr();
        tokio::spawn(async move {
            match tokio::net::TcpListener::bind(metrics_addr).await {
                Ok(listener) => {
                    info!(addr = %metrics_addr, "Metrics server listening");
                    if let Err(e) = axum::serve(listener, metrics_app(handle)).await {
                        error!(error = %e, "Metrics server stopped");
                    }
                }
                Err(e) => error!(error = %e, addr = %metrics_addr, "Failed to bind metrics server"),
            }
        });
    }

    let app = init_router(state);

    let addr = server_config.addr();
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            eprintln!("❌ Failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    info!(addr = %addr, "Server listening");
    println!("🚀 Server running on http://{}", addr);
    println!("📚 Swagger UI available at http://{}/swagger-ui", addr);
    println!("📖 Scalar UI available at http://{}/scalar", addr);

    if let Err(e) = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    {
        error!(error = %e, "Server error");
        std::process::exit(1);
    }
}
