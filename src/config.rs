use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::taxonomy::ModelLevel;

/// Reference tables used to turn one model level into functions
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ReferenceTables {
    /// 16S copy number per model
    pub copy_number: Option<PathBuf>,
    /// Model-indexed, function-columned contribution matrix
    pub model_function: Option<PathBuf>,
    /// Function-indexed, group-columned membership matrix
    pub function_group: Option<PathBuf>,
}

impl ReferenceTables {
    /// Fill unset entries from `fallback`
    pub fn or(self, fallback: ReferenceTables) -> Self {
        ReferenceTables {
            copy_number: self.copy_number.or(fallback.copy_number),
            model_function: self.model_function.or(fallback.model_function),
            function_group: self.function_group.or(fallback.function_group),
        }
    }

    fn resolve(mut self, base: &Path) -> Self {
        for path in [
            &mut self.copy_number,
            &mut self.model_function,
            &mut self.function_group,
        ]
        .into_iter()
        .flatten()
        {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
        self
    }
}

/// Per-level reference tables, read from a JSON file such as
///
/// ```json
/// {
///   "genus": {"copy_number": "genus_16s.tsv", "model_function": "genus_m2f.tsv"},
///   "species": {"copy_number": "species_16s.tsv"}
/// }
/// ```
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ReferenceConfig {
    #[serde(default)]
    pub genus: ReferenceTables,
    #[serde(default)]
    pub species: ReferenceTables,
}

impl ReferenceConfig {
    /// Load the config. Relative table paths are taken from the config's
    /// own directory.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read reference config: {}", path.display()))?;
        let config: ReferenceConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse reference config: {}", path.display()))?;

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        Ok(ReferenceConfig {
            genus: config.genus.resolve(base),
            species: config.species.resolve(base),
        })
    }

    pub fn tables(&self, level: ModelLevel) -> &ReferenceTables {
        match level {
            ModelLevel::Genus => &self.genus,
            ModelLevel::Species => &self.species,
        }
    }
}
