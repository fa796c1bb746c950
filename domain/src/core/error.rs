//! Domain error types

use thiserror::Error;

/// Errors raised while parsing core value objects
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Unknown data domain: {0} (expected tabular, text, image or timeseries)")]
    UnknownDomain(String),

    #[error("Unknown task mode: {0} (expected classification or regression)")]
    UnknownMode(String),

    #[error("Unknown output format: {0} (expected full, summary or json)")]
    UnknownOutputFormat(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_mode_display() {
        let error = DomainError::UnknownMode("forecast".to_string());
        assert_eq!(
            error.to_string(),
            "Unknown task mode: forecast (expected classification or regression)"
        );
    }
}
