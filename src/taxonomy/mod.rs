pub(crate) mod parser;
pub(crate) mod table;
pub(crate) mod types;

pub use parser::{parse, parse_greengenes, parse_rdp};
pub use table::{TaxonomyEntry, TaxonomyTable};
pub use types::{Dialect, ModelLevel, TaxonomicLevel, TaxonomyRecord};
