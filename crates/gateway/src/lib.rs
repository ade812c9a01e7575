//! API Gateway Library
//!
//! HTTP boundary for the booking core: availability lookups, bookings and
//! cancellations. The booking service runs in-process.

pub mod config;
pub mod extractors;
pub mod handlers;
pub mod openapi;
pub mod routes;
pub mod state;

use std::net::SocketAddr;

use tracing::info;

use booking_service_lib::config::BookingServiceConfig;

use crate::config::GatewayConfig;
use crate::routes::create_router;
use crate::state::AppState;

/// Wire the booking core and serve HTTP until the process is stopped.
pub async fn run(
    config: GatewayConfig,
    booking_config: BookingServiceConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let core = booking_service_lib::build(&booking_config).await?;
    let state = AppState::from(core);

    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Gateway listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
