//! Error types shared across the map backend.

/// Result type for map operations
pub type MapResult<T> = Result<T, MapError>;

/// Error type for map operations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MapError {
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Fetch error: {0}")]
    FetchError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<String> for MapError {
    fn from(s: String) -> Self {
        MapError::InternalError(s)
    }
}

impl From<&str> for MapError {
    fn from(s: &str) -> Self {
        MapError::InternalError(s.to_string())
    }
}

impl From<anyhow::Error> for MapError {
    fn from(e: anyhow::Error) -> Self {
        MapError::ParseError(format!("{:#}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_category() {
        let err = MapError::ConfigurationError("cell size must be positive".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration error: cell size must be positive"
        );
    }

    #[test]
    fn test_string_conversion_is_internal() {
        let err: MapError = "boom".into();
        assert!(matches!(err, MapError::InternalError(_)));
    }

    #[test]
    fn test_anyhow_conversion_keeps_context() {
        let inner = anyhow::anyhow!("bad field").context("point 3");
        let err: MapError = inner.into();
        match err {
            MapError::ParseError(msg) => {
                assert!(msg.contains("point 3"));
                assert!(msg.contains("bad field"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
