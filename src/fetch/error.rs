/*!
 * Error types for remote content fetching
 */

use thiserror::Error;

/// Errors that can occur while fetching a single URL
#[derive(Error, Debug)]
pub enum FetchError {
    /// The URL is malformed or not HTTP(S)
    #[error("invalid URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The API answered with a non-success status
    #[error("API request failed with status {status}: {body}")]
    Upstream { status: u16, body: String },

    /// The API answered but the context field was blank
    #[error("no context field in response")]
    EmptyContent,

    /// Transport failure, including timeouts
    #[error("request error: {0}")]
    Request(String),

    /// The response body could not be decoded
    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            FetchError::Decode(error.to_string())
        } else {
            FetchError::Request(error.to_string())
        }
    }
}

/// Specialized Result type for fetch operations
pub type FetchResult<T> = Result<T, FetchError>;
