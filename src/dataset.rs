use crate::error::{DashboardError, Result};
use crate::record::Row;
use serde_json::Value;

/// The full, unfiltered set of rows from the last successful retrieval
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Dataset {
    rows: Vec<Row>,
}

impl Dataset {
    /// Build a dataset from positional rows. The first row is the sheet header and is
    /// always dropped, even when nothing follows it.
    pub fn load(raw_rows: Vec<Vec<Value>>) -> Self {
        let rows = raw_rows
            .iter()
            .skip(1)
            .map(|cells| Row::from_values(cells))
            .collect();
        Dataset { rows }
    }

    /// Parse a JSON array of rows (each an array of cells) and load it
    pub fn from_json(body: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(body)?;
        let Value::Array(items) = value else {
            return Err(DashboardError::Retrieval(
                "expected a JSON array of rows".to_string(),
            ));
        };

        let mut raw_rows = Vec::with_capacity(items.len());
        for item in items {
            match item {
                Value::Array(cells) => raw_rows.push(cells),
                other => {
                    return Err(DashboardError::Retrieval(format!(
                        "expected every row to be an array, found {other}"
                    )));
                }
            }
        }

        Ok(Dataset::load(raw_rows))
    }

    pub fn from_rows(rows: Vec<Row>) -> Self {
        Dataset { rows }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
