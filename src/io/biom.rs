use serde::Deserialize;

use crate::error::{CmnetError, Result};
use crate::table::AbundanceTable;

/// Magic bytes of an HDF5 file (BIOM 2.x)
pub(crate) const HDF5_MAGIC: &[u8] = b"\x89HDF\r\n\x1a\n";

#[derive(Debug, Deserialize)]
struct BiomEntry {
    id: String,
}

/// BIOM 1.0 (JSON) table. Observations are rows, samples are columns.
#[derive(Debug, Deserialize)]
struct BiomTable {
    shape: [usize; 2],
    matrix_type: String,
    rows: Vec<BiomEntry>,
    columns: Vec<BiomEntry>,
    data: Vec<Vec<f64>>,
}

/// Parse a BIOM 1.0 JSON document into an observation/sample table
pub fn parse_biom_json(content: &str) -> Result<AbundanceTable> {
    let biom: BiomTable = serde_json::from_str(content)?;
    let [n_rows, n_columns] = biom.shape;

    if biom.rows.len() != n_rows || biom.columns.len() != n_columns {
        return Err(CmnetError::InvalidTable(format!(
            "BIOM shape {}x{} does not match {} rows and {} columns",
            n_rows,
            n_columns,
            biom.rows.len(),
            biom.columns.len()
        )));
    }

    let data = match biom.matrix_type.as_str() {
        "dense" => biom.data,
        "sparse" => {
            let mut dense = vec![vec![0.0; n_columns]; n_rows];
            for entry in &biom.data {
                let &[r, c, value] = entry.as_slice() else {
                    return Err(CmnetError::InvalidTable(format!(
                        "sparse BIOM entry has {} fields, expected 3",
                        entry.len()
                    )));
                };
                if !is_index(r) || !is_index(c) {
                    return Err(CmnetError::InvalidTable(format!(
                        "sparse BIOM entry has invalid coordinates ({}, {})",
                        r, c
                    )));
                }
                let (r, c) = (r as usize, c as usize);
                if r >= n_rows || c >= n_columns {
                    return Err(CmnetError::InvalidTable(format!(
                        "sparse BIOM entry ({}, {}) outside shape {}x{}",
                        r, c, n_rows, n_columns
                    )));
                }
                dense[r][c] = value;
            }
            dense
        }
        other => {
            return Err(CmnetError::UnsupportedFormat(format!(
                "BIOM matrix_type '{}'",
                other
            )))
        }
    };

    AbundanceTable::new(
        biom.rows.into_iter().map(|entry| entry.id).collect(),
        biom.columns.into_iter().map(|entry| entry.id).collect(),
        data,
    )
}

fn is_index(value: f64) -> bool {
    value.is_finite() && value >= 0.0 && value.fract() == 0.0
}
