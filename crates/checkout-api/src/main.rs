//! # checkout-backend
//!
//! Merchant backend for the hosted checkout.
//!
//! ## Usage
//!
//! ```bash
//! export ACCOUNT_CODE=...
//! export PUBLIC_API_KEY=sandbox_...
//! export PRIVATE_SECRET_KEY=...
//!
//! checkout-backend
//! ```

use checkout_api::{routes, AppState};
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let state = AppState::new()?;
    let addr = state.config.socket_addr()?;

    info!("Provider API: {}", state.provider.base_url());

    let app = routes::create_router(state);

    info!("Checkout backend listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
