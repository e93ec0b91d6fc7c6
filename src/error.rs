use thiserror::Error;

/// Failures surfaced by the edge handlers.
#[derive(Debug, Error)]
pub enum Error {
    /// The event carried no `Records` entry.
    #[error("event has no records")]
    MissingRecord,

    /// The first record carried no `cf.response`.
    #[error("event record has no cf.response")]
    MissingResponse,

    /// The payload did not match the edge event shape.
    #[error("malformed edge event: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Deploy-time site parameters were rejected.
    #[error("invalid site config: {0}")]
    InvalidSite(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
