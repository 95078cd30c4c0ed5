use std::fmt;

use serde::Serialize;

/// Structured error type for the crate. Hosts can match on `code` instead of
/// parsing messages.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "code", content = "detail")]
pub enum AppError {
    /// Host missing or blank. Raised before any network attempt.
    Configuration { message: String },
    /// Connection-level failure: refused, DNS, TLS, broken stream.
    Transport { message: String },
    /// The device answered with a status outside the accepted range.
    RemoteRejection {
        status: u16,
        reason: String,
        body: String,
    },
    UnknownAction { id: String },
    ValidationError { message: String },
    IoError { message: String },
    SettingsSaveError { message: String },
}

impl AppError {
    pub fn host_not_configured() -> Self {
        AppError::Configuration {
            message: "Host is not configured".to_string(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        AppError::ValidationError {
            message: message.into(),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Configuration { message } => write!(f, "{message}"),
            AppError::Transport { message } => write!(f, "Transport error: {message}"),
            AppError::RemoteRejection {
                status,
                reason,
                body,
            } => {
                write!(f, "HTTP {status} {reason}")?;
                if !body.is_empty() {
                    write!(f, " - {body}")?;
                }
                Ok(())
            }
            AppError::UnknownAction { id } => write!(f, "Unknown action: {id}"),
            AppError::ValidationError { message } => write!(f, "{message}"),
            AppError::IoError { message } => write!(f, "I/O error: {message}"),
            AppError::SettingsSaveError { message } => {
                write!(f, "Failed to save settings: {message}")
            }
        }
    }
}

impl std::error::Error for AppError {}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::IoError {
            message: e.to_string(),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::ValidationError {
            message: e.to_string(),
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        AppError::Transport {
            message: e.to_string(),
        }
    }
}

/// Allow converting AppError to String for CLI output and the HTTP API.
impl From<AppError> for String {
    fn from(e: AppError) -> String {
        e.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_appends_body_only_when_present() {
        let with_body = AppError::RemoteRejection {
            status: 503,
            reason: "Service Unavailable".into(),
            body: "busy".into(),
        };
        assert_eq!(with_body.to_string(), "HTTP 503 Service Unavailable - busy");

        let without_body = AppError::RemoteRejection {
            status: 500,
            reason: "Internal Server Error".into(),
            body: String::new(),
        };
        assert_eq!(without_body.to_string(), "HTTP 500 Internal Server Error");
    }

    #[test]
    fn host_not_configured_is_a_configuration_error() {
        let err = AppError::host_not_configured();
        assert!(matches!(err, AppError::Configuration { .. }));
        assert_eq!(err.to_string(), "Host is not configured");
    }
}
