use thiserror::Error;
use tunniplaan_shared::TransportError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Request to Tahvel failed")]
    Transport(#[from] TransportError),

    #[error("Tahvel answered HTTP {status} for {url}")]
    Status {
        status: u16,
        url: String,
        body: String,
    },

    #[error("Could not decode Tahvel response from {url}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("No viewAuth token found in timetable link")]
    MissingViewToken,
}

impl ApiError {
    /// The bearer or view token was rejected.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Status { status: 401 | 403, .. })
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
