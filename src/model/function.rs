use log::info;
use rayon::prelude::*;

use crate::error::Result;
use crate::table::{align, AbundanceTable};

/// Converts an A/sample table into a B/sample table through a B/A weight
/// matrix: `out[b][s] = sum over a of weight[b][a] * table[a][s]`.
///
/// Missing (NaN) weights contribute nothing.
#[derive(Debug, Clone)]
pub struct Extrapolator {
    weights: AbundanceTable,
    output_index: String,
}

impl Extrapolator {
    /// `weights` has output categories as rows and input entities as columns
    pub fn new(weights: AbundanceTable, output_index: impl Into<String>) -> Self {
        Extrapolator {
            weights,
            output_index: output_index.into(),
        }
    }

    /// From a model-indexed, function-columned contribution matrix
    pub fn model_to_function(m2f: &AbundanceTable) -> Self {
        Self::new(m2f.transpose(), "function")
    }

    /// From a function-indexed, group-columned membership matrix
    pub fn function_to_group(f2g: &AbundanceTable) -> Self {
        Self::new(f2g.transpose(), "group")
    }

    pub fn apply(&self, table: &AbundanceTable) -> Result<AbundanceTable> {
        let (table, weights) = align(table, &self.weights)?;
        let inputs = table.data();
        let n_samples = table.n_columns();

        let data: Vec<Vec<f64>> = weights
            .data()
            .par_iter()
            .map(|row_weights| {
                let mut out = vec![0.0; n_samples];
                for (weight, values) in row_weights.iter().zip(inputs) {
                    if weight.is_nan() || *weight == 0.0 {
                        continue;
                    }
                    for (sum, value) in out.iter_mut().zip(values) {
                        if !value.is_nan() {
                            *sum += weight * value;
                        }
                    }
                }
                out
            })
            .collect();

        info!(
            "Extrapolated {} {} rows from {} aligned entities",
            weights.n_rows(),
            self.output_index,
            table.n_rows()
        );

        Ok(AbundanceTable::new(
            weights.rows().to_vec(),
            table.columns().to_vec(),
            data,
        )?
        .with_index_name(self.output_index.clone()))
    }
}

/// Extrapolate model abundance into function (reaction) abundance
pub fn model_to_function(model_table: &AbundanceTable, m2f: &AbundanceTable) -> Result<AbundanceTable> {
    Extrapolator::model_to_function(m2f).apply(model_table)
}

/// Group function abundance into higher-level categories (EC, KO)
pub fn function_to_group(function_table: &AbundanceTable, f2g: &AbundanceTable) -> Result<AbundanceTable> {
    Extrapolator::function_to_group(f2g).apply(function_table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CmnetError;
    use crate::table::types::tests::labels;
    use pretty_assertions::assert_eq;

    fn model_table() -> AbundanceTable {
        AbundanceTable::new(
            labels(&["Foo", "Bar", "Orphan"]),
            labels(&["S1", "S2"]),
            vec![vec![2.0, 1.0], vec![4.0, 0.0], vec![100.0, 100.0]],
        )
        .unwrap()
        .with_index_name("model")
    }

    fn m2f() -> AbundanceTable {
        AbundanceTable::new(
            labels(&["Foo", "Bar", "Absent"]),
            labels(&["R1", "R2"]),
            vec![
                vec![1.0, f64::NAN],
                vec![0.5, 2.0],
                vec![9.0, 9.0],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_model_to_function_weighted_sum() {
        let functions = model_to_function(&model_table(), &m2f()).unwrap();

        assert_eq!(functions.index_name(), Some("function"));
        assert_eq!(functions.columns(), &labels(&["S1", "S2"])[..]);
        // R1 = 2*1 + 4*0.5, R2 = 4*2 with Foo's NaN ignored
        assert_eq!(functions.row("R1"), Some(&[4.0, 1.0][..]));
        assert_eq!(functions.row("R2"), Some(&[8.0, 0.0][..]));
    }

    #[test]
    fn test_function_to_group() {
        let functions = AbundanceTable::new(
            labels(&["R1", "R2"]),
            labels(&["S1"]),
            vec![vec![3.0], vec![5.0]],
        )
        .unwrap();
        let f2g = AbundanceTable::new(
            labels(&["R1", "R2"]),
            labels(&["EC:1.1.1.1", "EC:2.7.1.1"]),
            vec![vec![1.0, 0.0], vec![1.0, 1.0]],
        )
        .unwrap();

        let groups = function_to_group(&functions, &f2g).unwrap();
        assert_eq!(groups.index_name(), Some("group"));
        assert_eq!(groups.row("EC:1.1.1.1"), Some(&[8.0][..]));
        assert_eq!(groups.row("EC:2.7.1.1"), Some(&[5.0][..]));
    }

    #[test]
    fn test_disjoint_models_fail() {
        let m2f = AbundanceTable::new(labels(&["Other"]), labels(&["R1"]), vec![vec![1.0]]).unwrap();
        assert!(matches!(
            model_to_function(&model_table(), &m2f),
            Err(CmnetError::DegenerateAlignment { .. })
        ));
    }
}
