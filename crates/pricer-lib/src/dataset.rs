//! Training table loading
//!
//! Reads the historical diamond sales CSV the model is fitted on. The
//! classic diamonds file carries an unnamed leading index column, which
//! serde ignores because deserialization goes by header name.

use crate::error::{PricerError, Result};
use crate::models::DiamondRecord;
use std::path::Path;
use tracing::info;

/// The full collection of historical sales, immutable once loaded.
#[derive(Debug, Clone)]
pub struct TrainingTable {
    records: Vec<DiamondRecord>,
}

impl TrainingTable {
    /// Loads the table from a CSV file with a header row.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut reader = csv::Reader::from_path(path).map_err(|e| {
            PricerError::Dataset(format!("failed to open {}: {e}", path.display()))
        })?;

        let mut records = Vec::new();
        for (row, result) in reader.deserialize().enumerate() {
            // header is line 1, first data row is line 2
            let record: DiamondRecord = result
                .map_err(|e| PricerError::Dataset(format!("line {}: {e}", row + 2)))?;
            records.push(record);
        }

        let table = Self::from_records(records)?;
        info!(
            path = %path.display(),
            rows = table.len(),
            "Loaded training table"
        );
        Ok(table)
    }

    /// Wraps already-parsed records; rejects an empty table up front so
    /// training never sees one.
    pub fn from_records(records: Vec<DiamondRecord>) -> Result<Self> {
        if records.is_empty() {
            return Err(PricerError::Dataset(
                "training table contains no rows".to_string(),
            ));
        }
        Ok(Self { records })
    }

    pub fn records(&self) -> &[DiamondRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The label column.
    pub fn prices(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.price).collect()
    }
}
