use serde::{Deserialize, Serialize};
use std::fmt;

use crate::correction::ClientError;

/// Application-wide error types with categories for turn handling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum AppError {
    /// Input rejected locally by the sensibility filter
    FilteredInput,

    /// Remote call failed or returned a non-success status
    Transport(String),

    /// Response parsed but required fields are missing
    MalformedResponse(String),

    /// A request is already outstanding
    Busy,

    /// History/settings storage errors
    Storage(String),

    /// Invalid configuration (endpoint, language, directories)
    Config(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::FilteredInput => write!(f, "Filtered Input: text is not a coherent sentence"),
            AppError::Transport(msg) => write!(f, "Transport Error: {}", msg),
            AppError::MalformedResponse(msg) => write!(f, "Malformed Response: {}", msg),
            AppError::Busy => write!(f, "Busy: a request is already in flight"),
            AppError::Storage(msg) => write!(f, "Storage Error: {}", msg),
            AppError::Config(msg) => write!(f, "Config Error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl AppError {
    /// Returns a short title for the error
    pub fn title(&self) -> &str {
        match self {
            AppError::FilteredInput => "Unrecognized Input",
            AppError::Transport(_) => "Network Problem",
            AppError::MalformedResponse(_) => "Unexpected Response",
            AppError::Busy => "Busy",
            AppError::Storage(_) => "Storage Error",
            AppError::Config(_) => "Configuration Error",
        }
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        match self {
            AppError::Transport(msg)
            | AppError::MalformedResponse(msg)
            | AppError::Storage(msg)
            | AppError::Config(msg) => msg,
            AppError::FilteredInput => "input did not pass the sensibility filter",
            AppError::Busy => "a request is already in flight",
        }
    }

    /// Returns whether the user can simply try the same action again
    #[allow(dead_code)]
    pub fn is_recoverable(&self) -> bool {
        match self {
            AppError::FilteredInput => false,      // Same text will be rejected again
            AppError::Transport(_) => true,        // Network might recover
            AppError::MalformedResponse(_) => true, // Service output varies per call
            AppError::Busy => true,                // Wait for the outstanding turn
            AppError::Storage(_) => true,          // Might be transient disk issue
            AppError::Config(_) => false,          // Needs a settings change
        }
    }

    /// Text shown to the user (in place of a pending bot message, or on startup), if any
    pub fn user_message(&self) -> Option<&'static str> {
        match self {
            AppError::Transport(_) | AppError::MalformedResponse(_) => {
                Some("Sorry, I encountered an error. Please try again.")
            }
            AppError::Config(_) => Some("Check the endpoint and language settings."),
            AppError::FilteredInput | AppError::Busy | AppError::Storage(_) => None,
        }
    }
}

impl From<ClientError> for AppError {
    fn from(error: ClientError) -> Self {
        match error {
            ClientError::Transport(msg) => AppError::Transport(msg),
            ClientError::Status(code) => AppError::Transport(format!("Server error: {}", code)),
            ClientError::MalformedResponse(msg) => AppError::MalformedResponse(msg),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        AppError::Storage(error.to_string())
    }
}
