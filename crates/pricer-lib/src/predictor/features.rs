//! Feature assembly for inference requests
//!
//! Turns the raw form strings into the numeric row the model was trained
//! on. The column order produced here must match the training columns
//! exactly; `FeatureVector::to_row` is the single place that order lives.

use crate::encoding::CategoryEncoder;
use crate::error::{PricerError, Result};
use crate::models::FeatureVector;

/// Raw attribute strings for one diamond, as submitted.
#[derive(Debug, Clone, Copy)]
pub struct RawDiamond<'a> {
    pub carat: &'a str,
    pub cut: &'a str,
    pub color: &'a str,
    pub clarity: &'a str,
    pub depth: &'a str,
    pub table: &'a str,
    pub x: &'a str,
    pub y: &'a str,
    pub z: &'a str,
}

/// Assembles feature vectors from raw request values using the encoders
/// fitted at training time.
#[derive(Debug, Clone)]
pub struct FeatureVectorBuilder {
    cut: CategoryEncoder,
    color: CategoryEncoder,
    clarity: CategoryEncoder,
}

impl FeatureVectorBuilder {
    pub fn new(cut: CategoryEncoder, color: CategoryEncoder, clarity: CategoryEncoder) -> Self {
        Self { cut, color, clarity }
    }

    /// Builds the nine-column vector for one request.
    ///
    /// Color and clarity grades are upper-cased before lookup; cut is
    /// looked up exactly as submitted and falls back like any other
    /// unknown grade when the casing differs. Numeric fields must parse
    /// as reals but are otherwise taken at face value; range checks are
    /// the model's concern, not the parser's.
    pub fn build(&self, raw: &RawDiamond<'_>) -> Result<FeatureVector> {
        Ok(FeatureVector {
            carat: parse_numeric("carat", raw.carat)?,
            cut_code: self.cut.encode(raw.cut) as f64,
            color_code: self.color.encode(&raw.color.to_uppercase()) as f64,
            clarity_code: self.clarity.encode(&raw.clarity.to_uppercase()) as f64,
            depth: parse_numeric("depth", raw.depth)?,
            table: parse_numeric("table", raw.table)?,
            x: parse_numeric("x", raw.x)?,
            y: parse_numeric("y", raw.y)?,
            z: parse_numeric("z", raw.z)?,
        })
    }

    pub fn cut_encoder(&self) -> &CategoryEncoder {
        &self.cut
    }

    pub fn color_encoder(&self) -> &CategoryEncoder {
        &self.color
    }

    pub fn clarity_encoder(&self) -> &CategoryEncoder {
        &self.clarity
    }
}

fn parse_numeric(field: &'static str, value: &str) -> Result<f64> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| PricerError::InvalidNumber {
            field,
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> FeatureVectorBuilder {
        FeatureVectorBuilder::new(
            CategoryEncoder::fit(["Fair", "Good", "Very Good", "Premium", "Ideal"]),
            CategoryEncoder::fit(["D", "E", "F", "G", "H", "I", "J"]),
            CategoryEncoder::fit(["I1", "SI2", "SI1", "VS2", "VS1", "VVS2", "VVS1"]),
        )
    }

    fn raw<'a>() -> RawDiamond<'a> {
        RawDiamond {
            carat: "1.0",
            cut: "Ideal",
            color: "G",
            clarity: "VS1",
            depth: "61.5",
            table: "55",
            x: "6.4",
            y: "6.4",
            z: "4.0",
        }
    }

    #[test]
    fn test_build_produces_the_training_column_order() {
        let vector = builder().build(&raw()).expect("build");
        assert_eq!(
            vector.to_row(),
            [1.0, 4.0, 3.0, 4.0, 61.5, 55.0, 6.4, 6.4, 4.0]
        );
    }

    #[test]
    fn test_color_and_clarity_are_case_normalized() {
        let mut input = raw();
        input.color = "g";
        input.clarity = "vs1";
        let vector = builder().build(&input).expect("build");

        assert_eq!(vector.color_code, 3.0);
        assert_eq!(vector.clarity_code, 4.0);
    }

    #[test]
    fn test_cut_lookup_is_case_sensitive() {
        let mut input = raw();
        input.cut = "ideal";
        let vector = builder().build(&input).expect("build");

        // falls back to the first cut grade instead of matching "Ideal"
        assert_eq!(vector.cut_code, 0.0);
    }

    #[test]
    fn test_unparseable_numeric_field_is_rejected() {
        let mut input = raw();
        input.depth = "deep";
        let err = builder().build(&input).unwrap_err();

        match err {
            PricerError::InvalidNumber { field, value } => {
                assert_eq!(field, "depth");
                assert_eq!(value, "deep");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_no_range_validation_on_numeric_fields() {
        let mut input = raw();
        input.carat = "-3.5";
        input.z = "0";
        let vector = builder().build(&input).expect("build");

        assert_eq!(vector.carat, -3.5);
        assert_eq!(vector.z, 0.0);
    }

    #[test]
    fn test_whitespace_around_numbers_is_tolerated() {
        let mut input = raw();
        input.carat = " 1.0 ";
        let vector = builder().build(&input).expect("build");
        assert_eq!(vector.carat, 1.0);
    }
}
