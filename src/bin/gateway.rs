#![warn(clippy::pedantic, clippy::all, clippy::nursery)]

use roster::{
    config::GatewayConfiguration,
    error::{BindSnafu, RosterResult, ServeHttpSnafu},
    gateway::{GatewayState, router},
    init_tracing, shutdown_signal,
};
use snafu::ResultExt;
use tokio::net::TcpListener;

#[macro_use]
extern crate tracing;

#[snafu::report]
#[tokio::main]
async fn main() -> RosterResult<()> {
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("no .env file loaded: {e}");
    }
    init_tracing()?;

    let config = GatewayConfiguration::new()?;
    let state = GatewayState::connect_lazy(config.rpc_url())?;
    info!(rpc_url = config.rpc_url(), "RPC channel configured");

    let addr = config.listen_addr();
    let listener = TcpListener::bind(addr).await.context(BindSnafu { addr })?;

    info!(?addr, "Listening");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context(ServeHttpSnafu)
}
