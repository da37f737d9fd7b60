use shared::error::ErrorCode;
use thiserror::Error;

/// Malformed flat-file export. Never shown to the user; the booking read
/// falls back to the query endpoint instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("export has no header row")]
    MissingHeader,
    #[error("export header has no recognized columns: {header}")]
    NoRecognizedColumns { header: String },
    #[error("query response is not a list of records")]
    NotARecordList,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{endpoint} responded with HTTP {status}")]
    Status { endpoint: String, status: u16 },
    #[error("undecodable response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("invalid endpoint url '{url}': {source}")]
    InvalidEndpoint {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl StoreError {
    pub fn code(&self) -> ErrorCode {
        match self {
            StoreError::Transport { .. } | StoreError::Status { .. } | StoreError::Decode { .. } => {
                ErrorCode::Transport
            }
            StoreError::Parse(_) => ErrorCode::Parse,
            StoreError::InvalidEndpoint { .. } | StoreError::Client(_) => ErrorCode::Configuration,
        }
    }

    /// Reports whether resubmitting the request might succeed.
    pub fn is_retryable(&self) -> bool {
        self.code().is_retryable()
    }
}

pub type Result<T, E = StoreError> = std::result::Result<T, E>;
