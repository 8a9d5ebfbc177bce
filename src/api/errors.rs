use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP Request error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Server error: status code {status_code}, message: {message}")]
    ServerError {
        status_code: u16,
        message: String,
    },

    /// 服务端在响应体里明确拒绝（success = false）
    #[error("Rejected by server: {0}")]
    Rejected(String),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Event stream error: {0}")]
    EventStreamError(String),

    #[error("Param error: {0}")]
    ParamError(String),

    #[error("Monitor was cancelled")]
    Cancelled,

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ClientError {
    pub fn server_error(status_code: u16, message: impl Into<String>) -> Self {
        Self::ServerError {
            status_code,
            message: message.into(),
        }
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::InternalError(message.into())
    }
}

/// Error alias
pub type Result<T, E = ClientError> = std::result::Result<T, E>;
