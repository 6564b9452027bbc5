use thiserror::Error;

#[derive(Debug, Error)]
pub enum StackOverflowError {
    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error("invalid endpoint url: {0}")]
    Url(#[from] url::ParseError),

    #[error("request to '{endpoint}' failed: {source}")]
    Http {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("API error {error_id} ({error_name}) on '{endpoint}': {error_message}")]
    Api {
        endpoint: String,
        error_id: u64,
        error_name: String,
        error_message: String,
    },

    #[error("'{endpoint}' returned HTTP {status}")]
    Status {
        endpoint: String,
        status: reqwest::StatusCode,
    },
}
