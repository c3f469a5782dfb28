use anyhow::Context;
use log::{info, warn};

use crate::config::ReferenceTables;
use crate::error::Result;
use crate::io;
use crate::model::{self, CopyNumberReference, Extrapolator};
use crate::table::AbundanceTable;
use crate::taxonomy::{ModelLevel, TaxonomyTable};

/// Loaded reference data for one model level
#[derive(Debug, Clone, Default)]
pub struct References {
    pub copy_number: CopyNumberReference,
    pub model_function: Option<AbundanceTable>,
    pub function_group: Option<AbundanceTable>,
}

impl References {
    /// Load every table named in `tables`
    pub fn load(tables: &ReferenceTables) -> anyhow::Result<Self> {
        let copy_number = match &tables.copy_number {
            Some(path) => io::read_16s_table(path)
                .with_context(|| format!("Failed to load 16S copy numbers: {}", path.display()))?,
            None => {
                warn!("No 16S copy number table given, every model uses copy number 1");
                CopyNumberReference::default()
            }
        };
        let model_function = tables
            .model_function
            .as_ref()
            .map(io::read_m2f)
            .transpose()?;
        let function_group = tables
            .function_group
            .as_ref()
            .map(io::read_tsv_table)
            .transpose()?;

        Ok(References {
            copy_number,
            model_function,
            function_group,
        })
    }
}

/// Tables produced by one run
#[derive(Debug, Clone)]
pub struct PipelineOutputs {
    pub model: AbundanceTable,
    pub normalized: AbundanceTable,
    pub function: Option<AbundanceTable>,
    pub group: Option<AbundanceTable>,
}

/// OTU table -> model table -> copy-number normalized model table ->
/// function table -> group table. The last two stages run only when their
/// matrices are present.
pub fn run(
    abundance: &AbundanceTable,
    taxonomy: &TaxonomyTable,
    level: ModelLevel,
    references: &References,
) -> Result<PipelineOutputs> {
    info!(
        "Placing {} entities into {} models",
        abundance.n_rows(),
        level
    );
    let grouping = taxonomy.level_mapping(level.level());
    let model = model::place(abundance, &grouping)?;
    if model.is_empty() {
        warn!("No entity could be placed into a {} model", level);
    }
    let normalized = model::normalize(&model, &references.copy_number);

    let function = match &references.model_function {
        Some(m2f) => Some(Extrapolator::model_to_function(m2f).apply(&normalized)?),
        None => {
            info!("No model-to-function matrix given, stopping at model abundance");
            None
        }
    };

    let group = match (&function, &references.function_group) {
        (Some(function), Some(f2g)) => Some(Extrapolator::function_to_group(f2g).apply(function)?),
        (None, Some(_)) => {
            warn!("Function grouping needs a model-to-function matrix, skipping");
            None
        }
        _ => None,
    };

    Ok(PipelineOutputs {
        model,
        normalized,
        function,
        group,
    })
}
