use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum ClientError {
    /// Network failure before a status line was received.
    Transport(String),
    /// The service answered with a non-success HTTP status.
    Status(u16),
    /// The body was not JSON, or had no `corrected` field.
    MalformedResponse(String),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Transport(message) => write!(f, "Request failed: {}", message),
            ClientError::Status(code) => write!(f, "Server error: {}", code),
            ClientError::MalformedResponse(message) => {
                write!(f, "Invalid response format from API: {}", message)
            }
        }
    }
}

impl std::error::Error for ClientError {}
