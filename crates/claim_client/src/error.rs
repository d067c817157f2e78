use thiserror::Error;

/// Message shown when the service reports a failure without saying why.
pub const SERVICE_FALLBACK_MESSAGE: &str = "Failed to process claim";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("at least one document required")]
    DocumentsRequired,
    #[error("claim date required")]
    ClaimDateRequired,
}

/// Why a submit action did not start a request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitRejection {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error("a claim submission is already in progress")]
    InFlight,
    #[error("claim session is closed")]
    Closed,
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to build http client: {0}")]
    ClientBuild(#[source] reqwest::Error),
    #[error("invalid content type for document '{filename}': {source}")]
    InvalidPart {
        filename: String,
        source: reqwest::Error,
    },
    #[error("{0}")]
    Request(#[from] reqwest::Error),
    #[error("malformed response body (HTTP {status}): {source}")]
    MalformedBody {
        status: u16,
        source: serde_json::Error,
    },
    #[error("response reported success without a decision payload")]
    MissingDecision,
    #[error("adjudication service is unavailable")]
    Unavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimErrorCategory {
    Transport,
    Service,
}

/// Outcome error carried by a failed submission.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClaimError {
    #[error("Error connecting to server: {0}")]
    Transport(String),
    #[error("{0}")]
    Service(String),
}

impl ClaimError {
    pub fn from_service_message(message: Option<String>) -> Self {
        match message {
            Some(message) if !message.trim().is_empty() => Self::Service(message),
            _ => Self::Service(SERVICE_FALLBACK_MESSAGE.to_string()),
        }
    }

    pub fn category(&self) -> ClaimErrorCategory {
        match self {
            Self::Transport(_) => ClaimErrorCategory::Transport,
            Self::Service(_) => ClaimErrorCategory::Service,
        }
    }
}

impl From<TransportError> for ClaimError {
    fn from(value: TransportError) -> Self {
        Self::Transport(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_message_is_used_verbatim() {
        let err = ClaimError::from_service_message(Some("duplicate claim".to_string()));
        assert_eq!(err.to_string(), "duplicate claim");
        assert_eq!(err.category(), ClaimErrorCategory::Service);
    }

    #[test]
    fn missing_or_blank_service_message_falls_back() {
        assert_eq!(
            ClaimError::from_service_message(None).to_string(),
            SERVICE_FALLBACK_MESSAGE
        );
        assert_eq!(
            ClaimError::from_service_message(Some("  ".to_string())).to_string(),
            SERVICE_FALLBACK_MESSAGE
        );
    }

    #[test]
    fn transport_errors_wrap_the_underlying_description() {
        let err = ClaimError::from(TransportError::MissingDecision);
        assert_eq!(
            err.to_string(),
            "Error connecting to server: response reported success without a decision payload"
        );
        assert_eq!(err.category(), ClaimErrorCategory::Transport);
    }
}
