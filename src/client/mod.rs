//! Enhancement client.
//!
//! The client is stateless: one call sends the text, the action label and the
//! instruction prompt to the endpoint and returns a decoded [`Reply`] or an
//! [`EnhanceError`]. The controller treats every error the same way.

pub mod http;

use crate::protocol::{DecodeError, Reply};
use async_trait::async_trait;
use thiserror::Error;

pub use http::HttpEnhancer;

/// Failure of a single enhancement call.
#[derive(Debug, Error)]
pub enum EnhanceError {
    /// Connection refused, DNS failure, timeout or a broken body stream.
    #[error("transport error: {0}")]
    Transport(String),
    /// The endpoint answered with a non-success status code.
    #[error("endpoint returned status {status}: {body}")]
    Status { status: u16, body: String },
    /// A success response whose body could not be decoded.
    #[error("malformed response: {0}")]
    Decode(#[from] DecodeError),
}

impl From<reqwest::Error> for EnhanceError {
    fn from(err: reqwest::Error) -> Self {
        EnhanceError::Transport(err.to_string())
    }
}

/// Something that can enhance text.
#[async_trait]
pub trait Enhancer: Send + Sync {
    /// Send `text` with the given action label and instruction prompt.
    async fn enhance(&self, text: &str, label: &str, prompt: &str) -> Result<Reply, EnhanceError>;
}
