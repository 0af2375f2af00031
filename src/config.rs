use crate::error::{BadEnvVarSnafu, ParseAddrSnafu, ParsePortSnafu, RosterResult};
use dotenvy::var;
use secrecy::{ExposeSecret, SecretString};
use snafu::ResultExt;
use std::{net::SocketAddr, sync::Arc};

const DEFAULT_RPC_ADDR: &str = "0.0.0.0:4555";
const DEFAULT_RPC_URL: &str = "http://127.0.0.1:4555";
const DEFAULT_GATEWAY_ADDR: &str = "0.0.0.0:8053";

fn addr_from_env(name: &str, default: &str) -> RosterResult<SocketAddr> {
    let original = var(name).unwrap_or_else(|_| default.to_string());
    original.parse().context(ParseAddrSnafu { original })
}

/// Everything `roster-server` needs to start.
#[derive(Clone, Debug)]
pub struct RuntimeConfiguration {
    db_config: Arc<DbConfig>,
    rpc_addr: SocketAddr,
}

impl RuntimeConfiguration {
    pub fn new() -> RosterResult<Self> {
        Ok(Self {
            db_config: Arc::new(DbConfig::new()?),
            rpc_addr: addr_from_env("ROSTER_RPC_ADDR", DEFAULT_RPC_ADDR)?,
        })
    }

    pub fn db_config(&self) -> Arc<DbConfig> {
        self.db_config.clone()
    }

    pub const fn rpc_addr(&self) -> SocketAddr {
        self.rpc_addr
    }
}

/// Everything `roster-gateway` needs to start. The gateway never touches the database.
#[derive(Clone, Debug)]
pub struct GatewayConfiguration {
    rpc_url: String,
    listen_addr: SocketAddr,
}

impl GatewayConfiguration {
    pub fn new() -> RosterResult<Self> {
        Ok(Self {
            rpc_url: var("ROSTER_RPC_URL").unwrap_or_else(|_| DEFAULT_RPC_URL.to_string()),
            listen_addr: addr_from_env("ROSTER_GATEWAY_ADDR", DEFAULT_GATEWAY_ADDR)?,
        })
    }

    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    pub const fn listen_addr(&self) -> SocketAddr {
        self.listen_addr
    }
}

#[derive(Debug)]
pub struct DbConfig {
    user: String,
    password: SecretString,
    path: String,
    port: u16,
    database: String,
}

impl DbConfig {
    pub fn new() -> RosterResult<Self> {
        let get_env_var = |name| var(name).context(BadEnvVarSnafu { name });

        Ok(Self {
            user: get_env_var("DB_USER")?,
            password: SecretString::from(get_env_var("DB_PASSWORD")?),
            path: get_env_var("DB_PATH")?,
            port: get_env_var("DB_PORT")?.parse().context(ParsePortSnafu)?,
            database: get_env_var("DB_NAME")?,
        })
    }

    pub fn get_db_path(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}?sslmode=disable",
            self.user,
            self.password.expose_secret(),
            self.path,
            self.port,
            self.database
        )
    }
}
