use thiserror::Error;

/// Failures talking to the remote spreadsheet service
#[derive(Debug, Error)]
pub enum SheetsError {
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("invalid service-account credentials: {0}")]
    Credentials(String),

    #[error("spreadsheet '{0}' not found or not shared with the service account")]
    SpreadsheetNotFound(String),

    #[error("unexpected response: {0}")]
    InvalidResponse(String),
}

impl SheetsError {
    /// Rate limits, server errors and connection problems are worth retrying;
    /// everything else will fail the same way again.
    pub fn is_retryable(&self) -> bool {
        match self {
            SheetsError::Http { status, .. } => *status == 429 || (500..600).contains(status),
            SheetsError::Transport(err) => !err.is_builder() && !err.is_decode(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn http(status: u16) -> SheetsError {
        SheetsError::Http { status, body: String::new() }
    }

    #[test]
    fn test_retryable_statuses() {
        assert!(http(429).is_retryable());
        assert!(http(500).is_retryable());
        assert!(http(503).is_retryable());
        assert!(!http(400).is_retryable());
        assert!(!http(403).is_retryable());
        assert!(!http(404).is_retryable());
    }

    #[test]
    fn test_non_http_errors_not_retryable() {
        assert!(!SheetsError::Auth("bad key".into()).is_retryable());
        assert!(!SheetsError::SpreadsheetNotFound("x".into()).is_retryable());
        assert!(!SheetsError::Credentials("x".into()).is_retryable());
    }
}
