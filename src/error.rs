// src/error.rs

//! Unified error handling for the trending watcher.

use std::fmt;

use thiserror::Error;

/// Result type alias for watcher operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Network failure while talking to a remote endpoint
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Listing page answered with something other than 200 OK
    #[error("HTTP status {status} from {url}")]
    HttpStatus { url: String, status: u16 },

    /// Listing body could not be read as an HTML document
    #[error("Parse error: {0}")]
    Parse(String),

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// Existence query against the durable store failed
    #[error("Store query error: {0}")]
    StoreQuery(String),

    /// Write to the durable store failed
    #[error("Store write error: {0}")]
    StoreWrite(String),

    /// One or more webhook posts failed
    #[error("Failed to notify {failed} of {total} repositories")]
    NotifyAggregate { failed: usize, total: usize },

    /// Credential material could not be acquired
    #[error("Credential error: {0}")]
    Credentials(String),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    /// Create an HTTP status error.
    pub fn http_status(url: impl fmt::Display, status: u16) -> Self {
        Self::HttpStatus {
            url: url.to_string(),
            status,
        }
    }

    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    /// Create a store query error.
    pub fn store_query(message: impl fmt::Display) -> Self {
        Self::StoreQuery(message.to_string())
    }

    /// Create a store write error.
    pub fn store_write(message: impl fmt::Display) -> Self {
        Self::StoreWrite(message.to_string())
    }

    /// Create a credential error.
    pub fn credentials(message: impl Into<String>) -> Self {
        Self::Credentials(message.into())
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}
