use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    ProvisionerFailure(String),

    #[error("Public IP not found in Pulumi output")]
    AddressNotFound,

    #[error("VM not found: {0}")]
    UnknownVm(String),

    #[error("auto_delete_minutes out of range: {0}")]
    InvalidAutoDelete(i64),

    #[error("Deletion scheduler is not running")]
    SchedulerStopped,

    #[error("Registry error: {0}")]
    Registry(String),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
