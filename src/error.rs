use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid file content: {0}")]
    InvalidData(String),

    #[error("invalid {entity} record: {reason}")]
    InvalidRecord { entity: &'static str, reason: String },

    #[error("no {entity} ids left to assign")]
    IdsExhausted { entity: &'static str },

    #[error("service {service} has no operation {operation}")]
    UnknownOperation {
        service: &'static str,
        operation: String,
    },

    #[error("invalid argument for {operation}: {reason}")]
    InvalidArgument { operation: String, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;
