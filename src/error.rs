use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocStatsError {
    #[error("IO operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Path validation failed: {path}")]
    InvalidPath { path: String },

    #[error("Permission denied: {path}")]
    Permission { path: String },

    #[error("Dashboard launch failed: {message}")]
    Dashboard { message: String },
}

pub trait UserFriendlyError {
    fn user_message(&self) -> String;
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for DocStatsError {
    fn user_message(&self) -> String {
        match self {
            DocStatsError::Config { message } => {
                format!("Configuration error: {}", message)
            }
            DocStatsError::InvalidPath { path } => {
                format!("Invalid file path: {}", path)
            }
            DocStatsError::Permission { path } => {
                format!("Permission denied accessing: {}", path)
            }
            DocStatsError::Dashboard { message } => {
                format!("Dashboard launch failed: {}", message)
            }
            _ => self.to_string(),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            DocStatsError::Config { .. } => Some(
                "Check your configuration file syntax and ensure all required fields are present.".to_string()
            ),
            DocStatsError::InvalidPath { .. } => Some(
                "Verify the path exists and points to a directory the pipeline can use.".to_string()
            ),
            DocStatsError::Permission { .. } => Some(
                "Ensure you have the necessary read/write permissions for the target directory.".to_string()
            ),
            DocStatsError::Dashboard { .. } => Some(
                "Set [dashboard] command in the configuration file to the program that should read the data directory.".to_string()
            ),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for DocStatsError {
    fn from(error: toml::de::Error) -> Self {
        DocStatsError::Config {
            message: error.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DocStatsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_friendly_messages() {
        let error = DocStatsError::InvalidPath {
            path: "/no/such/place".to_string(),
        };
        assert!(error.user_message().contains("Invalid file path"));
        assert!(error.suggestion().is_some());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let error = DocStatsError::from(io_error);
        assert!(matches!(error, DocStatsError::Io(_)));
        assert!(error.suggestion().is_none());
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_error = toml::from_str::<toml::Value>("not [valid").unwrap_err();
        let error = DocStatsError::from(toml_error);
        assert!(matches!(error, DocStatsError::Config { .. }));
        assert!(error.user_message().contains("Configuration error"));
    }
}
