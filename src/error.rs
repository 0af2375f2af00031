use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use snafu::Snafu;
use std::{net::AddrParseError, num::ParseIntError};

pub type RosterResult<T> = Result<T, RosterError>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum RosterError {
    #[snafu(display("Error opening database after {} attempts", attempts))]
    OpenDatabase { source: sqlx::Error, attempts: u32 },
    #[snafu(display("Error getting db connection"))]
    GetDatabaseConnection { source: sqlx::Error },
    #[snafu(display("Error making SQL query"))]
    MakeQuery { source: sqlx::Error },
    #[snafu(display("Error committing SQL transaction"))]
    CommitTransaction { source: sqlx::Error },
    #[snafu(display("Error rolling back SQL transaction"))]
    RollbackTransaction { source: sqlx::Error },
    #[snafu(display("Error migrating DB schema"))]
    Migrate { source: sqlx::migrate::MigrateError },
    #[snafu(display("No {} with id {}", kind, id))]
    MissingRecord { kind: &'static str, id: i32 },
    #[snafu(display("Missing `{}` timestamp", field))]
    MissingTimestamp { field: &'static str },
    #[snafu(display("`{}` of {} seconds is out of range", field, seconds))]
    TimestampOutOfRange {
        source: time::error::ComponentRange,
        field: &'static str,
        seconds: i64,
    },
    #[snafu(display("Student has no course"))]
    MissingCourse,
    #[snafu(display("Unable to retrieve env var `{}`", name))]
    BadEnvVar {
        source: dotenvy::Error,
        name: &'static str,
    },
    #[snafu(display("Unable to parse IP port"))]
    ParsePort { source: ParseIntError },
    #[snafu(display("Unable to parse socket address {:?}", original))]
    ParseAddr {
        source: AddrParseError,
        original: String,
    },
    #[snafu(display("Unable to parse id {:?}", original))]
    ParseId {
        source: ParseIntError,
        original: String,
    },
    #[snafu(display("Unable to parse date {:?}", original))]
    ParseTime {
        source: time::error::Parse,
        original: String,
    },
    #[snafu(display("Unable to bind {}", addr))]
    Bind {
        source: std::io::Error,
        addr: std::net::SocketAddr,
    },
    #[snafu(display("Error serving HTTP"))]
    ServeHttp { source: std::io::Error },
    #[snafu(display("Error with RPC transport"))]
    Transport { source: tonic::transport::Error },
    #[snafu(display("Invalid RPC endpoint {:?}", original))]
    InvalidEndpoint {
        source: tonic::transport::Error,
        original: String,
    },
    #[snafu(display("Error building reflection service"))]
    Reflection {
        source: tonic_reflection::server::Error,
    },
    #[snafu(display("RPC call failed: {}", source.message()))]
    Rpc { source: tonic::Status },
    #[snafu(display("Unable to set tracing subscriber"))]
    SetSubscriber {
        source: tracing::subscriber::SetGlobalDefaultError,
    },
}

impl From<RosterError> for tonic::Status {
    fn from(value: RosterError) -> Self {
        match &value {
            RosterError::MissingRecord { .. } => Self::not_found(value.to_string()),
            RosterError::MissingTimestamp { .. }
            | RosterError::TimestampOutOfRange { .. }
            | RosterError::MissingCourse => Self::invalid_argument(value.to_string()),
            RosterError::Rpc { source } => source.clone(),
            _ => {
                error!(?value, "Error!");
                Self::internal(value.to_string())
            }
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for RosterError {
    #[allow(clippy::match_same_arms)]
    fn into_response(self) -> Response {
        const ISE: StatusCode = StatusCode::INTERNAL_SERVER_ERROR; //internal server error
        const NF: StatusCode = StatusCode::NOT_FOUND; //not found
        const BI: StatusCode = StatusCode::BAD_REQUEST; //bad input

        let status_code = match &self {
            Self::ParseId { .. } | Self::ParseTime { .. } => BI,
            Self::MissingTimestamp { .. } | Self::TimestampOutOfRange { .. } => BI,
            Self::MissingCourse => BI,
            Self::MissingRecord { .. } => NF,
            Self::Rpc { source } => match source.code() {
                tonic::Code::NotFound => NF,
                _ => ISE,
            },
            _ => ISE,
        };

        error!(?self, "Error!");
        let error = match &self {
            Self::Rpc { source } => source.message().to_string(),
            _ => self.to_string(),
        };
        (status_code, Json(ErrorBody { error })).into_response()
    }
}
