use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Malformed message: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("Unknown event `{0}`")]
    UnknownEvent(String),
}

pub type Result<T> = core::result::Result<T, ProtocolError>;
