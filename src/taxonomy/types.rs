use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{CmnetError, Result};

/// The seven ranks of a lineage, in order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum TaxonomicLevel {
    Kingdom,
    Phylum,
    Class,
    Order,
    Family,
    Genus,
    Species,
}

impl TaxonomicLevel {
    pub const ALL: [TaxonomicLevel; 7] = [
        TaxonomicLevel::Kingdom,
        TaxonomicLevel::Phylum,
        TaxonomicLevel::Class,
        TaxonomicLevel::Order,
        TaxonomicLevel::Family,
        TaxonomicLevel::Genus,
        TaxonomicLevel::Species,
    ];

    /// Position of the level within a lineage (kingdom = 0)
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            TaxonomicLevel::Kingdom => "kingdom",
            TaxonomicLevel::Phylum => "phylum",
            TaxonomicLevel::Class => "class",
            TaxonomicLevel::Order => "order",
            TaxonomicLevel::Family => "family",
            TaxonomicLevel::Genus => "genus",
            TaxonomicLevel::Species => "species",
        }
    }
}

impl std::fmt::Display for TaxonomicLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for TaxonomicLevel {
    type Err = CmnetError;

    fn from_str(s: &str) -> Result<Self> {
        TaxonomicLevel::ALL
            .into_iter()
            .find(|level| level.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CmnetError::UnsupportedLevel(s.to_string()))
    }
}

/// Taxonomic level that OTUs can be collapsed into
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ModelLevel {
    Genus,
    Species,
}

impl ModelLevel {
    pub fn level(self) -> TaxonomicLevel {
        match self {
            ModelLevel::Genus => TaxonomicLevel::Genus,
            ModelLevel::Species => TaxonomicLevel::Species,
        }
    }
}

impl std::fmt::Display for ModelLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.level())
    }
}

impl TryFrom<TaxonomicLevel> for ModelLevel {
    type Error = CmnetError;

    fn try_from(level: TaxonomicLevel) -> Result<Self> {
        match level {
            TaxonomicLevel::Genus => Ok(ModelLevel::Genus),
            TaxonomicLevel::Species => Ok(ModelLevel::Species),
            other => Err(CmnetError::UnsupportedLevel(other.to_string())),
        }
    }
}

impl FromStr for ModelLevel {
    type Err = CmnetError;

    fn from_str(s: &str) -> Result<Self> {
        ModelLevel::try_from(s.parse::<TaxonomicLevel>()?)
    }
}

/// Notation used to encode a lineage as a single string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// `k__Bacteria; p__Firmicutes; ...`
    GreenGenes,
    /// `D_0__Bacteria;D_1__Firmicutes;...` (SILVA)
    Rdp,
}

impl Dialect {
    /// Guess the dialect of a single lineage string
    pub fn detect(s: &str) -> Self {
        if s.trim_start().starts_with("D_0__") {
            Dialect::Rdp
        } else {
            Dialect::GreenGenes
        }
    }
}

/// A lineage resolved into the seven fixed levels.
///
/// An empty string means the lineage is unresolved at that level.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaxonomyRecord {
    levels: [String; 7],
}

impl TaxonomyRecord {
    /// Record with every level unresolved
    pub fn unresolved() -> Self {
        Self::default()
    }

    pub(crate) fn from_levels(levels: [String; 7]) -> Self {
        TaxonomyRecord { levels }
    }

    pub fn get(&self, level: TaxonomicLevel) -> &str {
        &self.levels[level.index()]
    }

    pub fn is_unresolved(&self) -> bool {
        self.levels.iter().all(String::is_empty)
    }

    pub fn iter(&self) -> impl Iterator<Item = (TaxonomicLevel, &str)> {
        TaxonomicLevel::ALL
            .into_iter()
            .map(move |level| (level, self.get(level)))
    }
}
