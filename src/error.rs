use thiserror::Error;

/// Errors raised by the chat widget client
#[derive(Error, Debug)]
pub enum LeadChatError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Backend returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LeadChatError {
    /// Transport-level failures (connection, status, body decoding) as opposed
    /// to local misuse of the widget.
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            LeadChatError::Http(_) | LeadChatError::Status { .. } | LeadChatError::Json(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, LeadChatError>;
