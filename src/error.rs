//! Module that contains the error type shared by the whole crate.

use std::{io, path::PathBuf};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, MisraError>;

#[derive(Debug, Error)]
pub enum MisraError {
    #[error("failed to bind listener on port {port}: {source}")]
    Bind { port: u16, source: io::Error },

    #[error("failed to accept the peer connection: {0}")]
    Accept(#[source] io::Error),

    #[error("failed to connect to {address} after {attempts} attempts: {source}")]
    Connect {
        address: String,
        attempts: u32,
        source: io::Error,
    },

    #[error("received malformed token {line:?}")]
    Parse { line: String },

    #[error("failed to read from the peer: {0}")]
    Read(#[source] io::Error),

    #[error("the peer closed the link")]
    LinkClosed,

    #[error("the inbound token queue closed")]
    InboundClosed,

    #[error("the receiver task stopped unexpectedly")]
    ReceiverPanicked,

    #[error("loss probability {0} is outside [0, 1]")]
    InvalidProbability(f64),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to read config file {path}: {source}")]
    ConfigFile { path: PathBuf, source: io::Error },

    #[error("failed to parse config: {0}")]
    ConfigJson(#[from] serde_json::Error),
}

impl MisraError {
    /// Function that tells if the error came from the link rather than from local setup.
    pub fn is_link_failure(&self) -> bool {
        matches!(
            self,
            Self::Parse { .. } | Self::Read(_) | Self::LinkClosed | Self::InboundClosed
        )
    }
}
