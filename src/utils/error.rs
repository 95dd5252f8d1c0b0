use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("Failed to retrieve '{source_id}': {message}")]
    RetrievalError { source_id: String, message: String },

    #[error("Schema error: {message}")]
    SchemaError { message: String },

    #[error("Cannot coerce value '{value}' in column '{column}' (row {row}) to a number")]
    ValueCoercionError {
        column: String,
        row: usize,
        value: String,
    },

    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    Retrieval,
    Schema,
    Coercion,
    Io,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn retrieval(source_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RetrievalError {
            source_id: source_id.into(),
            message: message.into(),
        }
    }

    pub fn schema(message: impl Into<String>) -> Self {
        Self::SchemaError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::RetrievalError { .. } => ErrorCategory::Retrieval,
            EtlError::SchemaError { .. } | EtlError::CsvError(_) => ErrorCategory::Schema,
            EtlError::ValueCoercionError { .. } => ErrorCategory::Coercion,
            EtlError::ZipError(_) | EtlError::IoError(_) | EtlError::SerializationError(_) => {
                ErrorCategory::Io
            }
            EtlError::ConfigError { .. } | EtlError::InvalidConfigValueError { .. } => {
                ErrorCategory::Configuration
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // 資料來源可能只是暫時無法連線
            ErrorCategory::Retrieval => ErrorSeverity::Medium,
            ErrorCategory::Schema | ErrorCategory::Coercion => ErrorSeverity::High,
            ErrorCategory::Io | ErrorCategory::Configuration => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Retrieval => {
                "Check the source URL or path and your network connection, then run again"
            }
            ErrorCategory::Schema => {
                "The dataset layout changed; check the column options in the configuration"
            }
            ErrorCategory::Coercion => {
                "Add the offending placeholder to null_placeholders or fix the source data"
            }
            ErrorCategory::Io => "Check that the output directory exists and is writable",
            ErrorCategory::Configuration => "Fix the configuration value and run again",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            EtlError::RetrievalError { source_id, .. } => {
                format!("Could not load dataset from {}", source_id)
            }
            EtlError::SchemaError { message } => format!("Unexpected dataset layout: {}", message),
            EtlError::CsvError(_) => "A dataset is not valid delimited text".to_string(),
            EtlError::ValueCoercionError { column, value, .. } => {
                format!("Column '{}' contains a non-numeric value '{}'", column, value)
            }
            EtlError::ZipError(_) | EtlError::IoError(_) | EtlError::SerializationError(_) => {
                "Failed to write the output bundle".to_string()
            }
            EtlError::ConfigError { message } => format!("Invalid configuration: {}", message),
            EtlError::InvalidConfigValueError { field, reason, .. } => {
                format!("Invalid configuration for '{}': {}", field, reason)
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_taxonomy_categories() {
        assert_eq!(
            EtlError::retrieval("http://x", "timeout").category(),
            ErrorCategory::Retrieval
        );
        assert_eq!(EtlError::schema("no column").category(), ErrorCategory::Schema);
        let coercion = EtlError::ValueCoercionError {
            column: "rank".to_string(),
            row: 3,
            value: "n/a".to_string(),
        };
        assert_eq!(coercion.category(), ErrorCategory::Coercion);
        assert_eq!(coercion.severity(), ErrorSeverity::High);
    }

    #[test]
    fn test_user_friendly_message_names_column() {
        let err = EtlError::ValueCoercionError {
            column: "adjclose".to_string(),
            row: 0,
            value: "abc".to_string(),
        };
        assert!(err.user_friendly_message().contains("adjclose"));
        assert!(err.to_string().contains("row 0"));
    }
}
