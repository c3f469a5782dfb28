use fxhash::FxHashMap;
use log::debug;

use super::parser;
use super::types::{Dialect, TaxonomicLevel, TaxonomyRecord};
use crate::error::{CmnetError, Result};

/// Taxonomy assignment of one entity (OTU / sequence)
#[derive(Debug, Clone, PartialEq)]
pub struct TaxonomyEntry {
    pub id: String,
    pub record: TaxonomyRecord,
    pub confidence: Option<f64>,
}

/// Ordered entity id -> lineage assignments
#[derive(Debug, Clone, Default)]
pub struct TaxonomyTable {
    entries: Vec<TaxonomyEntry>,
    index: FxHashMap<String, usize>,
}

impl TaxonomyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry. Entity ids must be unique.
    pub fn push(&mut self, entry: TaxonomyEntry) -> Result<()> {
        if self.index.contains_key(&entry.id) {
            return Err(CmnetError::InvalidTable(format!(
                "duplicate taxonomy entry for '{}'",
                entry.id
            )));
        }
        self.index.insert(entry.id.clone(), self.entries.len());
        self.entries.push(entry);
        Ok(())
    }

    /// Parse one lineage string and add it under `id`.
    ///
    /// `dialect = None` detects the notation from the string itself.
    pub fn push_lineage(
        &mut self,
        id: &str,
        lineage: &str,
        confidence: Option<f64>,
        dialect: Option<Dialect>,
    ) -> Result<()> {
        let dialect = dialect.unwrap_or_else(|| Dialect::detect(lineage));
        let record = parser::parse(lineage, dialect)?;
        self.push(TaxonomyEntry {
            id: id.to_string(),
            record,
            confidence,
        })
    }

    pub fn get(&self, id: &str) -> Option<&TaxonomyEntry> {
        self.index.get(id).map(|&i| &self.entries[i])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TaxonomyEntry> {
        self.entries.iter()
    }

    /// Entity id -> name at `level`, the grouping key for model placement
    pub fn level_mapping(&self, level: TaxonomicLevel) -> FxHashMap<String, String> {
        let mapping: FxHashMap<String, String> = self
            .entries
            .iter()
            .map(|entry| (entry.id.clone(), entry.record.get(level).to_string()))
            .collect();

        debug!(
            "Built {} mapping for {} entities ({} unresolved)",
            level,
            mapping.len(),
            mapping.values().filter(|name| name.is_empty()).count()
        );
        mapping
    }
}
