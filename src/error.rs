//! Board Errors

use thiserror::Error;
use wasm_bindgen::JsValue;

/// Everything that can stop a refresh or a task update from landing
#[derive(Debug, Error)]
pub enum BoardError {
    /// Network failure, the request never got an answer
    #[error("transport error: {0}")]
    Transport(String),

    /// Server answered with a non-success status
    #[error("server responded with status {0}")]
    Status(u16),

    /// Response body could not be decoded
    #[error("malformed response: {0}")]
    Body(String),

    #[error("dom error: {0}")]
    Dom(String),

    #[error("unknown task state `{0}`")]
    UnknownState(String),

    #[error("config error: {0}")]
    Config(String),
}

pub type BoardResult<T> = Result<T, BoardError>;

impl From<gloo_net::Error> for BoardError {
    fn from(err: gloo_net::Error) -> Self {
        match err {
            gloo_net::Error::SerdeError(e) => BoardError::Body(e.to_string()),
            other => BoardError::Transport(other.to_string()),
        }
    }
}

impl From<JsValue> for BoardError {
    fn from(value: JsValue) -> Self {
        BoardError::Dom(format!("{:?}", value))
    }
}

impl From<serde_json::Error> for BoardError {
    fn from(err: serde_json::Error) -> Self {
        BoardError::Config(err.to_string())
    }
}
