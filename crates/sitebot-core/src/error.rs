use thiserror::Error;

/// Top-level error type for the SiteBot system.
///
/// Subsystem crates define their own error types for recoverable,
/// domain-level failures; this type covers process-level concerns such as
/// configuration, I/O and server startup so that the `?` operator works in
/// the composition root.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SitebotError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for SitebotError {
    fn from(err: toml::de::Error) -> Self {
        SitebotError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for SitebotError {
    fn from(err: toml::ser::Error) -> Self {
        SitebotError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for SitebotError {
    fn from(err: serde_json::Error) -> Self {
        SitebotError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for SiteBot operations.
pub type Result<T> = std::result::Result<T, SitebotError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SitebotError::Config("missing field".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing field");
    }

    #[test]
    fn test_error_display_all_variants() {
        let cases: Vec<(SitebotError, &str)> = vec![
            (
                SitebotError::Config("bad key".to_string()),
                "Configuration error: bad key",
            ),
            (
                SitebotError::Validation("name is required".to_string()),
                "Validation error: name is required",
            ),
            (
                SitebotError::Provider("quota exhausted".to_string()),
                "Provider error: quota exhausted",
            ),
            (
                SitebotError::Api("bind failed".to_string()),
                "API error: bind failed",
            ),
            (
                SitebotError::Serialization("invalid json".to_string()),
                "Serialization error: invalid json",
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.to_string(), expected);
        }
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: SitebotError = io_err.into();
        assert!(matches!(err, SitebotError::Io(_)));
        assert!(err.to_string().starts_with("I/O error:"));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_error_from_toml_de() {
        let err: std::result::Result<toml::Value, _> = toml::from_str("invalid = [[[");
        let sitebot_err: SitebotError = err.unwrap_err().into();
        assert!(matches!(sitebot_err, SitebotError::Config(_)));
    }

    #[test]
    fn test_error_from_serde_json() {
        let err: std::result::Result<serde_json::Value, _> = serde_json::from_str("{ nope }");
        let sitebot_err: SitebotError = err.unwrap_err().into();
        assert!(matches!(sitebot_err, SitebotError::Serialization(_)));
    }

    #[test]
    fn test_result_type_with_question_mark() {
        fn inner() -> Result<String> {
            let io_result: std::result::Result<i32, std::io::Error> = Ok(42);
            let value = io_result?;
            Ok(value.to_string())
        }

        assert_eq!(inner().unwrap(), "42");
    }
}
