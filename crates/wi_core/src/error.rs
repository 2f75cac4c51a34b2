use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("article source unavailable for {company}: {reason}")]
    SourceUnavailable { company: String, reason: String },

    #[error("article source quota exceeded for {company}")]
    SourceQuotaExceeded { company: String },

    #[error("{gateway} gateway timed out")]
    GatewayTimeout { gateway: String },

    #[error("{gateway} gateway returned a bad response: {reason}")]
    GatewayBadResponse { gateway: String, reason: String },

    #[error("{gateway} gateway unavailable: {reason}")]
    GatewayUnavailable { gateway: String, reason: String },

    #[error("run deadline exceeded")]
    RunDeadlineExceeded,

    #[error("article collection failed for every company")]
    AllCompaniesFailed,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("External error: {0}")]
    External(#[from] anyhow::Error),
}

impl Error {
    /// Classify a transport error raised while talking to a gateway.
    pub fn from_gateway(gateway: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Error::GatewayTimeout {
                gateway: gateway.to_string(),
            }
        } else if err.is_decode() || err.is_body() {
            Error::GatewayBadResponse {
                gateway: gateway.to_string(),
                reason: err.to_string(),
            }
        } else {
            Error::GatewayUnavailable {
                gateway: gateway.to_string(),
                reason: err.to_string(),
            }
        }
    }

    /// Map a non-success HTTP status from a gateway: 5xx and 429 are
    /// transient, anything else is a bad response.
    pub fn from_gateway_status(gateway: &str, status: reqwest::StatusCode) -> Self {
        let reason = format!("HTTP {}", status);
        if status.is_server_error() || status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            Error::GatewayUnavailable {
                gateway: gateway.to_string(),
                reason,
            }
        } else {
            Error::GatewayBadResponse {
                gateway: gateway.to_string(),
                reason,
            }
        }
    }

    /// Whether another attempt against the same gateway could succeed.
    ///
    /// Timeouts, connection failures and 5xx answers are transient. A body
    /// that does not parse or a 4xx will fail the same way again.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::GatewayTimeout { .. } | Error::GatewayUnavailable { .. } => true,
            Error::Http(e) => {
                e.is_timeout()
                    || e.is_connect()
                    || e.status().map(|s| s.is_server_error()).unwrap_or(false)
            }
            Error::Io(_) => true,
            _ => false,
        }
    }

    /// Stable tag used in run diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::SourceUnavailable { .. } => "source_unavailable",
            Error::SourceQuotaExceeded { .. } => "source_quota_exceeded",
            Error::GatewayTimeout { .. } => "gateway_timeout",
            Error::GatewayBadResponse { .. } => "gateway_bad_response",
            Error::GatewayUnavailable { .. } => "gateway_unavailable",
            Error::RunDeadlineExceeded => "run_deadline_exceeded",
            Error::AllCompaniesFailed => "all_companies_failed",
            Error::Config(_) => "config",
            Error::Io(_) => "io",
            Error::Serialization(_) => "serialization",
            Error::Http(_) => "http",
            Error::External(_) => "external",
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeouts_are_retryable() {
        let err = Error::GatewayTimeout {
            gateway: "classifier".to_string(),
        };
        assert!(err.is_retryable());
        assert_eq!(err.kind(), "gateway_timeout");
        assert_eq!(err.to_string(), "classifier gateway timed out");
    }

    #[test]
    fn test_gateway_status_mapping() {
        use reqwest::StatusCode;

        let server = Error::from_gateway_status("summarizer", StatusCode::SERVICE_UNAVAILABLE);
        let throttled = Error::from_gateway_status("summarizer", StatusCode::TOO_MANY_REQUESTS);
        let client = Error::from_gateway_status("summarizer", StatusCode::UNPROCESSABLE_ENTITY);
        assert!(matches!(server, Error::GatewayUnavailable { .. }));
        assert!(server.is_retryable());
        assert!(throttled.is_retryable());
        assert!(matches!(client, Error::GatewayBadResponse { .. }));
        assert!(!client.is_retryable());
        assert!(client.to_string().contains("422"));
    }

    #[test]
    fn test_bad_responses_are_not_retried() {
        let parse = Error::GatewayBadResponse {
            gateway: "summarizer".to_string(),
            reason: "missing field `summary`".to_string(),
        };
        assert!(!parse.is_retryable());
        assert_eq!(parse.kind(), "gateway_bad_response");
    }

    #[test]
    fn test_source_errors_are_not_retried() {
        let err = Error::SourceQuotaExceeded {
            company: "넷마블".to_string(),
        };
        assert!(!err.is_retryable());
        assert_eq!(err.kind(), "source_quota_exceeded");
    }
}
