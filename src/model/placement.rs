use std::collections::BTreeMap;

use fxhash::FxHashMap;
use log::{debug, info, warn};

use crate::error::Result;
use crate::table::AbundanceTable;

/// Collapse an entity/sample table into a model/sample table.
///
/// Each row is assigned the model named by `grouping` and rows sharing a
/// model are summed per sample. Rows with no entry in `grouping` are left
/// out of every sum. An empty model name is a valid group, collecting the
/// entities left unresolved at the model level. Output rows are sorted by
/// model name and the index is named `model`.
pub fn place(
    abundance: &AbundanceTable,
    grouping: &FxHashMap<String, String>,
) -> Result<AbundanceTable> {
    let n_columns = abundance.n_columns();
    let mut groups: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    let mut unmapped = 0;

    for (entity, values) in abundance.iter_rows() {
        let Some(model) = grouping.get(entity) else {
            unmapped += 1;
            continue;
        };

        let sums = groups
            .entry(model.as_str())
            .or_insert_with(|| vec![0.0; n_columns]);
        for (sum, value) in sums.iter_mut().zip(values) {
            if !value.is_nan() {
                *sum += value;
            }
        }
    }

    if unmapped > 0 {
        warn!(
            "{} of {} entities have no model assignment and were excluded",
            unmapped,
            abundance.n_rows()
        );
    }
    if let Some(sums) = groups.get("") {
        debug!(
            "Unresolved entities account for {:.2} counts",
            sums.iter().sum::<f64>()
        );
    }

    let (models, data): (Vec<String>, Vec<Vec<f64>>) = groups
        .into_iter()
        .map(|(model, sums)| (model.to_string(), sums))
        .unzip();

    info!(
        "Placed {} entities into {} models",
        abundance.n_rows() - unmapped,
        models.len()
    );

    Ok(AbundanceTable::new(models, abundance.columns().to_vec(), data)?.with_index_name("model"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::types::tests::{labels, sample_table};
    use pretty_assertions::assert_eq;

    fn grouping(pairs: &[(&str, &str)]) -> FxHashMap<String, String> {
        pairs
            .iter()
            .map(|(entity, model)| (entity.to_string(), model.to_string()))
            .collect()
    }

    #[test]
    fn test_shared_model_rows_are_summed() {
        let model = place(
            &sample_table(),
            &grouping(&[("otu1", "X"), ("otu2", "X"), ("otu3", "Y")]),
        )
        .unwrap();

        assert_eq!(model.rows(), &labels(&["X", "Y"])[..]);
        assert_eq!(model.row("X"), Some(&[15.0, 2.0][..]));
        assert_eq!(model.row("Y"), Some(&[1.0, 8.0][..]));
        assert_eq!(model.columns(), sample_table().columns());
        assert_eq!(model.index_name(), Some("model"));
    }

    #[test]
    fn test_unmapped_entities_are_excluded() {
        let input = sample_table();
        let model = place(&input, &grouping(&[("otu1", "X"), ("otu3", "Y")])).unwrap();

        let row_total = |label: &str| input.row(label).unwrap().iter().sum::<f64>();
        let expected = row_total("otu1") + row_total("otu3");
        assert_eq!(model.total(), expected);
        assert_eq!(model.n_rows(), 2);
    }

    #[test]
    fn test_unresolved_entities_form_their_own_group() {
        let model = place(
            &sample_table(),
            &grouping(&[("otu1", ""), ("otu2", "X"), ("otu3", "")]),
        )
        .unwrap();

        assert_eq!(model.rows(), &labels(&["", "X"])[..]);
        assert_eq!(model.row(""), Some(&[11.0, 8.0][..]));
    }

    #[test]
    fn test_empty_grouping_gives_empty_table() {
        let model = place(&sample_table(), &FxHashMap::default()).unwrap();
        assert!(model.is_empty());
        assert_eq!(model.n_columns(), 2);
    }
}
