//! Error types shared by the domain layer.

use thiserror::Error;

/// Errors that occur during value object construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("Field '{field}' must be between {min} and {max}, got {actual}")]
    OutOfRange {
        field: String,
        min: i64,
        max: i64,
        actual: i64,
    },

    #[error("Field '{field}' has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Creates an empty field validation error.
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField { field: field.into() }
    }

    /// Creates an out of range validation error.
    pub fn out_of_range(field: impl Into<String>, min: i64, max: i64, actual: i64) -> Self {
        ValidationError::OutOfRange {
            field: field.into(),
            min,
            max,
            actual,
        }
    }

    /// Creates an invalid format validation error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Required addressing or credentials are missing.
///
/// Raised before any outbound call is attempted; a component that reports
/// this error has not partially executed anything.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{} must be set", missing.join(" and "))]
pub struct ConfigurationError {
    missing: Vec<&'static str>,
}

impl ConfigurationError {
    /// Creates an error naming the missing settings.
    pub fn missing(settings: impl IntoIterator<Item = &'static str>) -> Self {
        Self {
            missing: settings.into_iter().collect(),
        }
    }

    /// Names of the settings that were absent.
    pub fn missing_settings(&self) -> &[&'static str] {
        &self.missing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_empty_field_displays_correctly() {
        let err = ValidationError::empty_field("query");
        assert_eq!(format!("{}", err), "Field 'query' cannot be empty");
    }

    #[test]
    fn validation_error_out_of_range_displays_correctly() {
        let err = ValidationError::out_of_range("maxResults", 1, 100, 0);
        assert_eq!(
            format!("{}", err),
            "Field 'maxResults' must be between 1 and 100, got 0"
        );
    }

    #[test]
    fn validation_error_invalid_format_displays_correctly() {
        let err = ValidationError::invalid_format("locator", "missing bucket");
        assert_eq!(
            format!("{}", err),
            "Field 'locator' has invalid format: missing bucket"
        );
    }

    #[test]
    fn configuration_error_names_every_missing_setting() {
        let err = ConfigurationError::missing(["GOOGLE_CLOUD_PROJECT_ID", "VERTEX_SEARCH_ENGINE_ID"]);
        assert_eq!(
            err.to_string(),
            "GOOGLE_CLOUD_PROJECT_ID and VERTEX_SEARCH_ENGINE_ID must be set"
        );
        assert_eq!(err.missing_settings().len(), 2);
    }

    #[test]
    fn configuration_error_single_setting() {
        let err = ConfigurationError::missing(["VERTEX_SEARCH_ENGINE_ID"]);
        assert_eq!(err.to_string(), "VERTEX_SEARCH_ENGINE_ID must be set");
    }
}
