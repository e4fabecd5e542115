use thiserror::Error;

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the sensor simulation core.
///
/// Configuration problems are caught when geometry, environment or engine are
/// constructed, so a running simulation never sees invalid parameters.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid user or API parameter.
    #[error("invalid parameter: {0}")]
    InvalidParam(String),

    /// Numerical issue (e.g., a speed distribution that cannot be normalised).
    #[error("numerical error: {0}")]
    MathError(String),

    /// Malformed simulation setup document.
    #[error("invalid setup: {0}")]
    Config(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_is_informative() {
        let e = Error::InvalidParam("temperature must be > 0".to_string());
        let msg = format!("{e}");
        assert!(msg.contains("invalid parameter"));
        assert!(msg.contains("temperature"));
    }

    #[test]
    fn config_error_wraps_json() {
        let json_err = serde_json::from_str::<f64>("not a number").unwrap_err();
        let e: Error = json_err.into();
        assert!(e.to_string().starts_with("invalid setup"));
    }

    #[test]
    fn result_type_alias_compiles() -> Result<()> {
        Ok(())
    }
}
