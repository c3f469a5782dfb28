use fxhash::FxHashSet;
use log::debug;

use super::types::AbundanceTable;
use crate::error::{CmnetError, Result};

/// Restrict `main` (rows) and `converter` (columns) to their shared entities.
///
/// Used before converting an A/sample table into a B/sample table with a B/A
/// converter: afterwards `main.rows() == converter.columns()`. Entities
/// outside the intersection are dropped. Fails with `DegenerateAlignment`
/// when nothing overlaps.
pub fn align(
    main: &AbundanceTable,
    converter: &AbundanceTable,
) -> Result<(AbundanceTable, AbundanceTable)> {
    let converter_columns: FxHashSet<&str> =
        converter.columns().iter().map(String::as_str).collect();

    let entities: Vec<String> = main
        .rows()
        .iter()
        .filter(|row| converter_columns.contains(row.as_str()))
        .cloned()
        .collect();

    if entities.is_empty() {
        return Err(CmnetError::DegenerateAlignment {
            main: main.n_rows(),
            converter: converter.n_columns(),
        });
    }

    debug!(
        "Aligned {} of {} rows against {} converter columns",
        entities.len(),
        main.n_rows(),
        converter.n_columns()
    );

    let main = main.select_rows(&entities)?;
    let converter = converter.select_columns(&entities)?;
    Ok((main, converter))
}
