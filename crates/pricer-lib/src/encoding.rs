//! Categorical grade encoding
//!
//! Maps the textual quality grades (cut, color, clarity) onto the dense
//! integer codes the regression model consumes.

/// Integer codec for one categorical attribute.
///
/// The vocabulary is fixed at fit time from the observed values, in
/// first-seen order; a value's code is its position in that order. Codes
/// are arbitrary dense integers, only meaningful against the vocabulary
/// that produced them.
///
/// Unrecognized input is coerced to the first vocabulary member rather
/// than rejected: a misspelled grade degrades to the lowest grade instead
/// of failing the request. Callers that want stricter input handling must
/// validate before encoding.
#[derive(Debug, Clone)]
pub struct CategoryEncoder {
    vocabulary: Vec<String>,
}

impl CategoryEncoder {
    /// Derives the vocabulary from observed values, deduplicated in
    /// first-seen order.
    pub fn fit<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut vocabulary: Vec<String> = Vec::new();
        for value in values {
            let value = value.as_ref();
            if !vocabulary.iter().any(|v| v == value) {
                vocabulary.push(value.to_string());
            }
        }
        Self { vocabulary }
    }

    /// Code for `value`; falls back to the code of the first vocabulary
    /// member when `value` is not in the vocabulary.
    pub fn encode(&self, value: &str) -> usize {
        self.vocabulary
            .iter()
            .position(|v| v == value)
            .unwrap_or(0)
    }

    /// The grade a code stands for, if the code is in range.
    pub fn decode(&self, code: usize) -> Option<&str> {
        self.vocabulary.get(code).map(String::as_str)
    }

    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }
}
