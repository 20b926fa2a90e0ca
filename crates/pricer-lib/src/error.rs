//! Error taxonomy for the prediction pipeline

use thiserror::Error;

/// Errors produced by the pricing pipeline.
///
/// The validation variants are recoverable: the service turns them into a
/// renderable message for the requester. `Dataset` and `Training` abort
/// startup, since there is no degraded mode for serving estimates without
/// a fitted model.
#[derive(Debug, Error)]
pub enum PricerError {
    /// A required numeric form field was not submitted.
    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    /// A numeric form field failed to parse as a real number.
    #[error("field '{field}' must be a number (got '{value}')")]
    InvalidNumber { field: &'static str, value: String },

    /// The training table could not be loaded or is malformed.
    #[error("dataset error: {0}")]
    Dataset(String),

    /// The regression model could not be fitted.
    #[error("training error: {0}")]
    Training(String),
}

pub type Result<T> = std::result::Result<T, PricerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_messages_name_the_field() {
        let err = PricerError::InvalidNumber {
            field: "depth",
            value: "abc".to_string(),
        };
        assert_eq!(err.to_string(), "field 'depth' must be a number (got 'abc')");

        let err = PricerError::MissingField("carat");
        assert_eq!(err.to_string(), "missing required field 'carat'");
    }
}
