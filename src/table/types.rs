use fxhash::{FxHashMap, FxHashSet};

use crate::error::{CmnetError, Result};

/// Dense numeric table addressed by row and column labels.
///
/// Rows are entities (OTUs, models, functions), columns are samples. Every
/// transformation returns a new table.
#[derive(Debug, Clone, PartialEq)]
pub struct AbundanceTable {
    index_name: Option<String>,
    rows: Vec<String>,
    columns: Vec<String>,
    data: Vec<Vec<f64>>,
}

impl AbundanceTable {
    /// Create a table, checking the shape and label uniqueness
    pub fn new(rows: Vec<String>, columns: Vec<String>, data: Vec<Vec<f64>>) -> Result<Self> {
        if data.len() != rows.len() {
            return Err(CmnetError::InvalidTable(format!(
                "{} row labels for {} data rows",
                rows.len(),
                data.len()
            )));
        }
        for (label, values) in rows.iter().zip(&data) {
            if values.len() != columns.len() {
                return Err(CmnetError::InvalidTable(format!(
                    "row '{}' has {} values, expected {}",
                    label,
                    values.len(),
                    columns.len()
                )));
            }
        }
        check_unique(&rows, "row")?;
        check_unique(&columns, "column")?;

        Ok(AbundanceTable {
            index_name: None,
            rows,
            columns,
            data,
        })
    }

    pub fn with_index_name(mut self, name: impl Into<String>) -> Self {
        self.index_name = Some(name.into());
        self
    }

    pub fn index_name(&self) -> Option<&str> {
        self.index_name.as_deref()
    }

    pub fn rows(&self) -> &[String] {
        &self.rows
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.columns.is_empty()
    }

    /// Values of the row labelled `label`
    pub fn row(&self, label: &str) -> Option<&[f64]> {
        self.rows
            .iter()
            .position(|r| r == label)
            .map(|i| self.data[i].as_slice())
    }

    pub fn get(&self, row: &str, column: &str) -> Option<f64> {
        let j = self.columns.iter().position(|c| c == column)?;
        self.row(row).map(|values| values[j])
    }

    /// Iterate rows as (label, values)
    pub fn iter_rows(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.rows
            .iter()
            .map(String::as_str)
            .zip(self.data.iter().map(Vec::as_slice))
    }

    pub(crate) fn data(&self) -> &[Vec<f64>] {
        &self.data
    }

    /// Sum of every non-NaN value
    pub fn total(&self) -> f64 {
        self.data
            .iter()
            .flatten()
            .filter(|v| !v.is_nan())
            .sum()
    }

    /// Keep only the given rows, in the given order.
    ///
    /// Fails when a label is not a row of this table.
    pub fn select_rows(&self, labels: &[String]) -> Result<Self> {
        let positions = label_positions(&self.rows);
        let data = labels
            .iter()
            .map(|label| {
                positions
                    .get(label.as_str())
                    .map(|&i| self.data[i].clone())
                    .ok_or_else(|| {
                        CmnetError::InvalidTable(format!("no row labelled '{}'", label))
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut table = Self::new(labels.to_vec(), self.columns.clone(), data)?;
        table.index_name = self.index_name.clone();
        Ok(table)
    }

    /// Keep only the given columns, in the given order.
    ///
    /// Fails when a label is not a column of this table.
    pub fn select_columns(&self, labels: &[String]) -> Result<Self> {
        let positions = label_positions(&self.columns);
        let picks = labels
            .iter()
            .map(|label| {
                positions.get(label.as_str()).copied().ok_or_else(|| {
                    CmnetError::InvalidTable(format!("no column labelled '{}'", label))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let data = self
            .data
            .iter()
            .map(|values| picks.iter().map(|&j| values[j]).collect())
            .collect();

        let mut table = Self::new(self.rows.clone(), labels.to_vec(), data)?;
        table.index_name = self.index_name.clone();
        Ok(table)
    }

    /// Swap rows and columns
    pub fn transpose(&self) -> Self {
        let data = (0..self.columns.len())
            .map(|j| self.data.iter().map(|values| values[j]).collect())
            .collect();

        AbundanceTable {
            index_name: None,
            rows: self.columns.clone(),
            columns: self.rows.clone(),
            data,
        }
    }

    pub(crate) fn from_parts_unchecked(
        index_name: Option<String>,
        rows: Vec<String>,
        columns: Vec<String>,
        data: Vec<Vec<f64>>,
    ) -> Self {
        debug_assert_eq!(rows.len(), data.len());
        AbundanceTable {
            index_name,
            rows,
            columns,
            data,
        }
    }
}

/// Label -> position lookup
pub(crate) fn label_positions(labels: &[String]) -> FxHashMap<&str, usize> {
    labels
        .iter()
        .enumerate()
        .map(|(i, label)| (label.as_str(), i))
        .collect()
}

fn check_unique(labels: &[String], axis: &str) -> Result<()> {
    let mut seen = FxHashSet::default();
    for label in labels {
        if !seen.insert(label.as_str()) {
            return Err(CmnetError::InvalidTable(format!(
                "duplicate {} label '{}'",
                axis, label
            )));
        }
    }
    Ok(())
}
