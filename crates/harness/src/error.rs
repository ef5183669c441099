//! Error types for the harness

use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("Route '{route}' returned unexpected status: expected {expected}, got {actual}")]
    UnexpectedStatus {
        route: String,
        expected: u16,
        actual: u16,
    },

    #[error("Timed out after {:.1}s waiting for `{expression}`", .timeout.as_secs_f64())]
    WaitTimeout {
        expression: String,
        timeout: Duration,
    },

    #[error("Unknown suite event: {0}")]
    UnknownEvent(String),

    #[error("Malformed '{name}' event: {reason}")]
    MalformedEvent { name: String, reason: String },

    #[error("Event list is not an array of {{name, data}} records: {0}")]
    MalformedEventList(String),

    #[error("Virtual display failed to start: {0}")]
    DisplayStartup(String),

    #[error("WebDriver server failed to start: {0}")]
    DriverStartup(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("WebDriver error: {0}")]
    WebDriver(#[from] thirtyfour::error::WebDriverError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type HarnessResult<T> = Result<T, HarnessError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unexpected_status_names_both_codes() {
        let err = HarnessError::UnexpectedStatus {
            route: "suite".to_string(),
            expected: 200,
            actual: 404,
        };
        let msg = err.to_string();
        assert!(msg.contains("expected 200"));
        assert!(msg.contains("got 404"));
    }

    #[test]
    fn test_wait_timeout_message() {
        let err = HarnessError::WaitTimeout {
            expression: "window.seleniumReporter.isFinished()".to_string(),
            timeout: Duration::from_secs(60),
        };
        assert_eq!(
            err.to_string(),
            "Timed out after 60.0s waiting for `window.seleniumReporter.isFinished()`"
        );
    }
}
