#![warn(clippy::pedantic, clippy::all, clippy::nursery)]

use roster::{
    config::RuntimeConfiguration,
    error::{BindSnafu, RosterResult},
    init_tracing, rpc, shutdown_signal,
    state::RosterState,
};
use snafu::ResultExt;
use sqlx::postgres::PgPoolOptions;
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

    let options = PgPoolOptions::new().max_connections(15);
    let config = RuntimeConfiguration::new()?;
    let state = RosterState::new(options, &config.db_config()).await?;

    let addr = config.rpc_addr();
    let listener = TcpListener::bind(addr).await.context(BindSnafu { addr })?;

    info!(?addr, "Listening");
    let served = rpc::serve(state.clone(), listener, shutdown_signal()).await;

    state.sensible_shutdown().await;
    served
}
