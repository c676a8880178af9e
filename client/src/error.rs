use blastgrid_protocol::ProtocolError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Invalid config: {0}")]
    Config(#[from] toml::de::Error),
    #[error("Invalid config: {0}")]
    InvalidConfig(&'static str),
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    #[error("Transport closed")]
    TransportClosed,
    #[error("Script line {line}: {source}")]
    Script {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = core::result::Result<T, ClientError>;
