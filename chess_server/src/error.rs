//! Agent error type and its JSON-RPC mapping.

use thiserror::Error;

use crate::models::rpc::{JsonRpcError, INTERNAL_ERROR, INVALID_PARAMS};

pub type Result<T> = std::result::Result<T, AgentError>;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("No message provided")]
    NoMessage,

    #[error("Invalid move: {0}")]
    InvalidMove(String),

    #[error("Engine error: {0}")]
    Engine(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AgentError {
    /// Caller-caused errors are reported as invalid params.
    pub fn is_client_error(&self) -> bool {
        matches!(self, AgentError::NoMessage | AgentError::InvalidMove(_))
    }

    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            AgentError::NoMessage => "no_message",
            AgentError::InvalidMove(_) => "invalid_move",
            AgentError::Engine(_) => "engine",
            AgentError::Io(_) => "io",
        }
    }

    pub fn to_rpc(&self) -> JsonRpcError {
        if self.is_client_error() {
            JsonRpcError::new(INVALID_PARAMS, "Invalid params").with_details(self.to_string())
        } else {
            JsonRpcError::new(INTERNAL_ERROR, "Internal error").with_details(self.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_move_maps_to_invalid_params() {
        let err = AgentError::InvalidMove("Qh9".into()).to_rpc();
        assert_eq!(err.code, INVALID_PARAMS);
        assert_eq!(err.data.unwrap()["details"], "Invalid move: Qh9");
    }

    #[test]
    fn io_maps_to_internal() {
        let err = AgentError::from(std::io::Error::other("disk full")).to_rpc();
        assert_eq!(err.code, INTERNAL_ERROR);
    }
}
