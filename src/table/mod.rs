pub(crate) mod alignment;
pub(crate) mod types;

pub use alignment::align;
pub use types::AbundanceTable;
