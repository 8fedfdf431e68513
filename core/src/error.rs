//! # Error Handling
//!
//! Provides the unified `AppError` enum used across the workspace.
//!
//! Only structural parse failures and invalid settings are errors. Everything
//! else the generator runs into (unknown directives, unresolved types, const
//! blocks without an enum) is logged and skipped.

use derive_more::{Display, From};

/// The Global Error Enum.
///
/// We use `derive_more` for boilerplate.
/// Note: String errors default to `General`.
#[derive(Debug, Display, From)]
pub enum AppError {
    /// Wrapper for standard IO errors.
    #[display("IO Error: {_0}")]
    Io(std::io::Error),

    /// A source file could not be parsed.
    #[from(ignore)]
    #[display("Parse Error in {path}: {message}")]
    Parse {
        /// Offending file.
        path: String,
        /// What went wrong.
        message: String,
    },

    /// Invalid or unrecognised settings.
    #[from(ignore)]
    #[display("Config Error: {_0}")]
    Config(String),

    /// Settings document is not valid YAML for `Settings`.
    #[display("Config Error: {_0}")]
    Yaml(serde_yaml::Error),

    /// Generic errors.
    #[display("General Error: {_0}")]
    General(String),
}

/// Manual implementation of the standard Error trait.
impl std::error::Error for AppError {}

impl AppError {
    /// Builds a parse error for `path`.
    pub fn parse(path: impl std::fmt::Display, message: impl Into<String>) -> Self {
        AppError::Parse {
            path: path.to_string(),
            message: message.into(),
        }
    }
}

/// Helper type alias for Result using AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error, ErrorKind};

    #[test]
    fn test_io_conversion() {
        let io_err = Error::new(ErrorKind::Other, "test");
        let app_err: AppError = io_err.into();
        assert!(matches!(app_err, AppError::Io(_)));
    }

    #[test]
    fn test_string_conversion() {
        let msg = String::from("something wrong");
        let app_err: AppError = msg.into();
        match app_err {
            AppError::General(s) => assert_eq!(s, "something wrong"),
            _ => panic!("String should convert to AppError::General"),
        }
    }

    #[test]
    fn test_parse_error_names_file() {
        let err = AppError::parse("models/user.go", "unexpected `}`");
        assert_eq!(
            err.to_string(),
            "Parse Error in models/user.go: unexpected `}`"
        );
    }

    #[test]
    fn test_config_manual_creation() {
        let err = AppError::Config("unknown strategy".into());
        assert_eq!(format!("{}", err), "Config Error: unknown strategy");
    }
}
