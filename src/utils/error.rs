use thiserror::Error;

/// 單一欄位驗證失敗的原因
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FieldErrorKind {
    #[error("value is required")]
    Missing,

    #[error("expected {expected}, found {found}")]
    TypeMismatch { expected: &'static str, found: String },

    #[error("value {value} must be between {min} and {max}")]
    OutOfRange {
        value: String,
        min: String,
        max: String,
    },

    #[error("'{value}' is not one of: {}", .allowed.join(", "))]
    NotInDomain { value: String, allowed: Vec<String> },

    #[error("{reason}")]
    Invalid { reason: String },
}

/// A validation failure tied to one dotted field path, e.g. `steps[0].stoping.depth`.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{field}: {kind}")]
pub struct FieldError {
    pub field: String,
    pub kind: FieldErrorKind,
}

impl FieldError {
    pub fn new(field: impl Into<String>, kind: FieldErrorKind) -> Self {
        Self {
            field: field.into(),
            kind,
        }
    }

    pub fn missing(field: impl Into<String>) -> Self {
        Self::new(field, FieldErrorKind::Missing)
    }

    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(
            field,
            FieldErrorKind::Invalid {
                reason: reason.into(),
            },
        )
    }
}

#[derive(Error, Debug)]
pub enum GenError {
    #[error("Invalid input: {}", summarize(.errors))]
    InvalidFields { errors: Vec<FieldError> },

    #[error("Configuration incomplete: {count} field(s) need attention", count = .errors.len())]
    IncompleteConfiguration { errors: Vec<FieldError> },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Session file error: {message}")]
    SessionFileError { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Step {index} does not exist (session has {len} steps)")]
    StepIndexError { index: usize, len: usize },
}

impl From<FieldError> for GenError {
    fn from(error: FieldError) -> Self {
        GenError::InvalidFields {
            errors: vec![error],
        }
    }
}

fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Configuration,
    Io,
    Internal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl GenError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            GenError::InvalidFields { .. }
            | GenError::IncompleteConfiguration { .. }
            | GenError::StepIndexError { .. } => ErrorCategory::Validation,
            GenError::SessionFileError { .. } | GenError::ConfigError { .. } => {
                ErrorCategory::Configuration
            }
            GenError::IoError(_) => ErrorCategory::Io,
            GenError::SerializationError(_) => ErrorCategory::Internal,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 寫檔失敗可重試
            GenError::IoError(_) => ErrorSeverity::Medium,
            GenError::InvalidFields { .. }
            | GenError::IncompleteConfiguration { .. }
            | GenError::SessionFileError { .. }
            | GenError::ConfigError { .. }
            | GenError::StepIndexError { .. } => ErrorSeverity::High,
            GenError::SerializationError(_) => ErrorSeverity::Critical,
        }
    }

    /// Field errors carried by this error, empty for non-validation failures.
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            GenError::InvalidFields { errors } | GenError::IncompleteConfiguration { errors } => {
                errors
            }
            _ => &[],
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            GenError::InvalidFields { .. } => "Correct the listed fields and try again",
            GenError::IncompleteConfiguration { .. } => {
                "Fill in the missing fields of every enabled step before generating"
            }
            GenError::IoError(_) => "Check that the output directory exists and is writable, then retry",
            GenError::SerializationError(_) => "Report this as a bug together with the session file",
            GenError::SessionFileError { .. } => "Make sure the session file exists and is valid TOML",
            GenError::ConfigError { .. } => "Check the command line flags and APP_ENV",
            GenError::StepIndexError { .. } => "List the session steps and pick an existing index",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            GenError::InvalidFields { errors } => {
                format!("{} field(s) are invalid:\n{}", errors.len(), bullet_list(errors))
            }
            GenError::IncompleteConfiguration { errors } => format!(
                "The configuration is not complete yet:\n{}",
                bullet_list(errors)
            ),
            GenError::IoError(e) => format!("Could not write the output file: {}", e),
            other => other.to_string(),
        }
    }
}

fn bullet_list(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {}", e))
        .collect::<Vec<_>>()
        .join("\n")
}

pub type Result<T> = std::result::Result<T, GenError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_error_display_names_field() {
        let error = FieldError::new(
            "settings.flac_version",
            FieldErrorKind::NotInDomain {
                value: "9.9".to_string(),
                allowed: vec!["5.0".to_string(), "7.0".to_string()],
            },
        );
        assert_eq!(
            error.to_string(),
            "settings.flac_version: '9.9' is not one of: 5.0, 7.0"
        );
    }

    #[test]
    fn test_incomplete_configuration_lists_every_field() {
        let error = GenError::IncompleteConfiguration {
            errors: vec![
                FieldError::missing("project.name"),
                FieldError::missing("steps[0].stoping.file"),
            ],
        };
        assert_eq!(error.category(), ErrorCategory::Validation);
        assert_eq!(error.severity(), ErrorSeverity::High);
        assert_eq!(error.field_errors().len(), 2);

        let message = error.user_friendly_message();
        assert!(message.contains("project.name"));
        assert!(message.contains("steps[0].stoping.file"));
    }

    #[test]
    fn test_io_error_is_retryable() {
        let error = GenError::from(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        assert_eq!(error.category(), ErrorCategory::Io);
        assert_eq!(error.severity(), ErrorSeverity::Medium);
        assert!(error.field_errors().is_empty());
    }
}
