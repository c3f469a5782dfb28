pub(crate) mod copy_number;
pub(crate) mod function;
pub(crate) mod placement;

pub use copy_number::{normalize, CopyNumberReference};
pub use function::{function_to_group, model_to_function, Extrapolator};
pub use placement::place;
