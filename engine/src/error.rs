//! Engine-specific error types

use shared::{Action, SharedError};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid selection: {message}")]
    Validation { message: String },

    #[error("No handles registered for {name}")]
    NotFound { name: String },

    #[error("Disruption already in flight for {service}/{action}")]
    Conflict { service: String, action: Action },

    #[error("Timed out after {timeout:?} waiting for {service}/{action}")]
    Timeout {
        service: String,
        action: Action,
        timeout: Duration,
    },

    #[error("Remote command failed on {host}: {message}")]
    Transport { host: String, message: String },

    #[error("Invalid state: {message}")]
    InvalidState { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Shared component error")]
    Shared(#[from] SharedError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    pub fn validation(message: impl Into<String>) -> Self {
        EngineError::Validation {
            message: message.into(),
        }
    }

    pub fn not_found(name: impl Into<String>) -> Self {
        EngineError::NotFound { name: name.into() }
    }

    pub fn transport(host: impl Into<String>, message: impl Into<String>) -> Self {
        EngineError::Transport {
            host: host.into(),
            message: message.into(),
        }
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        EngineError::InvalidState {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        EngineError::Config {
            message: message.into(),
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
