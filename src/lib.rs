//! Predict functional abundance from 16S marker-gene surveys.
//!
//! OTU tables are collapsed into taxonomic models (genus or species) using
//! parsed lineage strings, normalized by 16S copy number, and extrapolated
//! into function and function-group abundance through weight matrices.

pub mod config;
pub mod error;
pub mod io;
pub mod model;
pub mod pipeline;
pub mod table;
pub mod taxonomy;

pub use error::{CmnetError, Result};
pub use model::{normalize, place, CopyNumberReference, Extrapolator};
pub use table::{align, AbundanceTable};
pub use taxonomy::{Dialect, ModelLevel, TaxonomicLevel, TaxonomyRecord, TaxonomyTable};
