use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    /// A required field was missing or empty; the mutation was not applied.
    #[error("required field missing: {0}")]
    Validation(&'static str),

    /// The record targeted by the operation does not exist.
    #[error("no record with id {0}")]
    UnknownId(i64),

    /// The persistence medium failed. The in-memory collection is still
    /// valid for the session; the caller should warn the user.
    #[error("storage unavailable: {0}")]
    Storage(#[source] std::io::Error),

    /// A restore payload could not be parsed; existing data is untouched.
    #[error("malformed import: {0}")]
    MalformedImport(#[from] serde_json::Error),
}
