#![warn(clippy::pedantic, clippy::all, clippy::nursery)]
#![allow(clippy::single_match_else, clippy::missing_errors_doc)]

//! Student and teacher records over gRPC, backed by Postgres.
//!
//! The RPC server (`roster-server`) owns the database; the HTTP gateway
//! (`roster-gateway`) translates form posts into RPC calls and relays the
//! results as JSON.

#[macro_use]
extern crate tracing;

pub mod config;
pub mod convert;
pub mod data;
pub mod error;
pub mod gateway;
pub mod pb;
pub mod rpc;
pub mod service;
pub mod state;

use tokio::signal;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

pub fn init_tracing() -> error::RosterResult<()> {
    use snafu::ResultExt;

    tracing::subscriber::set_global_default(
        FmtSubscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .finish(),
    )
    .context(error::SetSubscriberSnafu)?;

    info!("`tracing` online");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(?e, "unable to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(?e, "unable to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    warn!("signal received, starting graceful shutdown");
}
