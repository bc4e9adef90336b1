//! Fleetwatch Gateway: HTTP front for the fleet engine.
//!
//! The dashboard polls `GET /api/machines` on its own cadence; every poll is
//! one simulation tick. Configuration comes from the environment (see
//! `GatewayConfig::from_env`).

use fleetwatch_core::{
    FleetEngine,
    api::{self, AppState, GatewayConfig},
};
use tokio::net::TcpListener;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let config = GatewayConfig::from_env();
    info!(
        seed = ?config.seed,
        extended = config.extended_layout,
        "Initializing Fleetwatch gateway."
    );

    let engine = match FleetEngine::new(config.engine_config()) {
        Ok(engine) => engine,
        Err(e) => {
            error!(error = %e, "Engine initialization failed.");
            std::process::exit(1);
        }
    };

    let app = api::router(AppState::new(engine));

    let addr = config.addr();
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(addr = %addr, error = %e, "Failed to bind.");
            std::process::exit(1);
        }
    };

    info!(addr = %addr, "Gateway listening.");
    info!("Endpoints:");
    info!("  GET  /api/machines            - Advance one tick, fleet JSON");
    info!("  GET  /api/report?machine=ID   - Text report of current state");
    info!("  POST /api/reset               - Reinitialize the fleet");
    info!("  POST /api/machines/ID/fault   - Inject a one-tick fault");
    info!("  GET  /metrics                 - Prometheus metrics");
    info!("  GET  /health                  - Health check");

    let server = axum::serve(listener, app).with_graceful_shutdown(async {
        if tokio::signal::ctrl_c().await.is_err() {
            error!("Failed to install CTRL+C handler.");
            std::future::pending::<()>().await;
        }
        info!("Shutting down...");
    });

    if let Err(e) = server.await {
        error!(error = %e, "Server error.");
        std::process::exit(1);
    }

    info!("Goodbye.");
}
