use fxhash::FxHashMap;
use log::{debug, info};
use rayon::prelude::*;

use crate::table::AbundanceTable;

/// Estimated 16S copy number per model.
///
/// Values are clamped to at least 1 and missing or NaN estimates read as 1.
#[derive(Debug, Clone, Default)]
pub struct CopyNumberReference {
    copies: FxHashMap<String, f64>,
}

impl CopyNumberReference {
    pub const DEFAULT_COPY_NUMBER: f64 = 1.0;

    pub fn new<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, f64)>,
    {
        let copies = entries
            .into_iter()
            .map(|(model, copies)| (model, clamp(copies)))
            .collect();
        CopyNumberReference { copies }
    }

    /// Copy number for `model`, defaulting to 1
    pub fn get(&self, model: &str) -> f64 {
        self.copies
            .get(model)
            .copied()
            .unwrap_or(Self::DEFAULT_COPY_NUMBER)
    }

    pub fn contains(&self, model: &str) -> bool {
        self.copies.contains_key(model)
    }

    pub fn len(&self) -> usize {
        self.copies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.copies.is_empty()
    }
}

fn clamp(copies: f64) -> f64 {
    if copies.is_nan() {
        CopyNumberReference::DEFAULT_COPY_NUMBER
    } else {
        copies.max(CopyNumberReference::DEFAULT_COPY_NUMBER)
    }
}

/// Divide each model's abundance by its 16S copy number
pub fn normalize(model_table: &AbundanceTable, reference: &CopyNumberReference) -> AbundanceTable {
    let known = model_table
        .rows()
        .iter()
        .filter(|model| reference.contains(model))
        .count();
    info!(
        "Normalizing {} models by 16S copy number ({} found in reference)",
        model_table.n_rows(),
        known
    );
    debug!(
        "{} models fall back to copy number {}",
        model_table.n_rows() - known,
        CopyNumberReference::DEFAULT_COPY_NUMBER
    );

    let data: Vec<Vec<f64>> = model_table
        .rows()
        .par_iter()
        .zip(model_table.data().par_iter())
        .map(|(model, values)| {
            let copies = reference.get(model);
            values.iter().map(|value| value / copies).collect()
        })
        .collect();

    AbundanceTable::from_parts_unchecked(
        model_table.index_name().map(str::to_string),
        model_table.rows().to_vec(),
        model_table.columns().to_vec(),
        data,
    )
}
