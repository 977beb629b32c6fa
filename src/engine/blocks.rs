//! Aggregation over consecutive non-overlapping blocks

use super::{aggregate_variable, raise, OutputColumns, Plan, TransformOutput, TransformWarning};
use crate::aggregation::{AggregationDescriptor, AggregationSelection};
use crate::data::Table;
use crate::error::{MovingTransformError, Result};
use crate::naming;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Original row kept to represent each block
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReferenceRow {
    #[default]
    Discard,
    First,
    Middle,
    Last,
}

impl ReferenceRow {
    /// Offset of the representative row within a block
    pub fn offset(&self, block_width: usize) -> Option<usize> {
        match self {
            ReferenceRow::Discard => None,
            ReferenceRow::First => Some(0),
            ReferenceRow::Middle => Some(block_width / 2),
            ReferenceRow::Last => Some(block_width - 1),
        }
    }
}

/// Aggregates over consecutive blocks of `block_width` rows; a trailing
/// incomplete block is dropped
#[derive(Debug, Clone)]
pub struct SequentialBlockEngine {
    block_width: usize,
    reference_row: ReferenceRow,
}

impl SequentialBlockEngine {
    pub fn new(block_width: usize, reference_row: ReferenceRow) -> Result<Self> {
        if block_width == 0 {
            return Err(MovingTransformError::InvalidParameter {
                name: "block_width".to_string(),
                value: block_width.to_string(),
                reason: "must be positive".to_string(),
            });
        }
        Ok(Self {
            block_width,
            reference_row,
        })
    }

    pub fn block_width(&self) -> usize {
        self.block_width
    }

    pub fn reference_row(&self) -> ReferenceRow {
        self.reference_row
    }

    pub fn compute(&self, table: &Table, selection: &AggregationSelection) -> Result<TransformOutput> {
        let n = table.n_rows();
        let width = self.block_width;
        debug!(
            rows = n,
            block_width = width,
            reference = ?self.reference_row,
            "Computing block aggregates"
        );

        if width > n {
            let mut warnings = Vec::new();
            raise(&mut warnings, TransformWarning::BlockTooLarge);
            return Ok(TransformOutput::new(None, warnings));
        }

        let mut warnings = Vec::new();
        let plan = Plan::resolve(table, selection, true)?;
        plan.report(&mut warnings);
        if plan.n_aggregates() == 0 {
            raise(&mut warnings, TransformWarning::NoAggregationsSelected);
            return Ok(TransformOutput::new(None, warnings));
        }

        let n_blocks = n / width;
        let offset = self.reference_row.offset(width);
        let rows: Vec<usize> = offset
            .map(|off| (0..n_blocks).map(|b| b * width + off).collect())
            .unwrap_or_default();

        let candidates = plan.candidate_names();
        let names = if offset.is_some() {
            naming::allocate(&candidates, &table.domain().names())
        } else {
            naming::allocate_unique(&candidates)
        };
        let mut names = names.into_iter();

        let mut output = OutputColumns::default();
        for (i, attr) in table.domain().attributes().iter().enumerate() {
            if offset.is_some() {
                let column = table.x().column(i);
                output.push(attr.clone(), rows.iter().map(|&r| column[r]).collect());
            }
            if let Some(var_plan) = plan.get(attr.name()) {
                for kind in &var_plan.kinds {
                    let name = names.next().unwrap_or_default();
                    output.push(
                        aggregate_variable(attr, kind, name),
                        self.aggregate(&var_plan.column, n_blocks, kind),
                    );
                }
            }
        }
        for class_var in table.domain().class_vars() {
            if let Some(var_plan) = plan.get(class_var.name()) {
                for kind in &var_plan.kinds {
                    let name = names.next().unwrap_or_default();
                    output.push(
                        aggregate_variable(class_var, kind, name),
                        self.aggregate(&var_plan.column, n_blocks, kind),
                    );
                }
            }
        }

        let out = match offset {
            Some(_) => {
                let time_variable = table.time_variable().map(|v| v.name().to_string());
                output.into_table(n_blocks, Some((table, rows.as_slice())), time_variable)?
            }
            None => output.into_table(n_blocks, None, None)?,
        };
        debug!(blocks = n_blocks, columns = out.domain().attributes().len(), "Block aggregation done");
        Ok(TransformOutput::new(Some(out), warnings))
    }

    fn aggregate(&self, column: &[f64], n_blocks: usize, kind: &AggregationDescriptor) -> Vec<f64> {
        column
            .chunks_exact(self.block_width)
            .take(n_blocks)
            .map(|block| kind.block_transform(block).unwrap_or(f64::NAN))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Variable;

    fn rows(n: usize) -> Table {
        Table::builder()
            .attribute(Variable::continuous("x"), (0..n).map(|i| i as f64).collect())
            .build()
            .unwrap()
    }

    fn select(kinds: &[&str]) -> AggregationSelection {
        AggregationSelection::new().with("x", kinds).unwrap()
    }

    #[test]
    fn test_reference_offsets() {
        assert_eq!(ReferenceRow::First.offset(5), Some(0));
        assert_eq!(ReferenceRow::Middle.offset(5), Some(2));
        assert_eq!(ReferenceRow::Middle.offset(4), Some(2));
        assert_eq!(ReferenceRow::Last.offset(5), Some(4));
        assert_eq!(ReferenceRow::Discard.offset(5), None);
    }

    #[test]
    fn test_trailing_partial_block_dropped() {
        let engine = SequentialBlockEngine::new(2, ReferenceRow::Last).unwrap();
        let table = engine.compute(&rows(5), &select(&["sum"])).unwrap().table.unwrap();
        assert_eq!(table.n_rows(), 2);
        assert_eq!(table.column("x").unwrap().to_vec(), vec![1.0, 3.0]);
        assert_eq!(table.column("x (Sum)").unwrap().to_vec(), vec![1.0, 5.0]);
    }

    #[test]
    fn test_block_too_large() {
        let engine = SequentialBlockEngine::new(6, ReferenceRow::First).unwrap();
        let output = engine.compute(&rows(5), &select(&["sum"])).unwrap();
        assert!(output.table.is_none());
        assert_eq!(output.warnings, vec![TransformWarning::BlockTooLarge]);
    }

    #[test]
    fn test_inapplicable_kinds_reported() {
        let engine = SequentialBlockEngine::new(2, ReferenceRow::Discard).unwrap();
        let output = engine.compute(&rows(4), &select(&["cumprod", "mean", "cumsum"])).unwrap();
        assert_eq!(
            output.warnings,
            vec![TransformWarning::InapplicableAggregations(vec![
                "Cumulative sum".to_string(),
                "Cumulative product".to_string(),
            ])]
        );
        let table = output.table.unwrap();
        assert_eq!(table.domain().attributes().len(), 1);
        assert_eq!(table.column("x (Mean value)").unwrap().to_vec(), vec![0.5, 2.5]);
    }

    #[test]
    fn test_only_inapplicable_kinds() {
        let engine = SequentialBlockEngine::new(2, ReferenceRow::First).unwrap();
        let output = engine.compute(&rows(4), &select(&["cumsum"])).unwrap();
        assert!(output.table.is_none());
        assert!(output.has_warning(&TransformWarning::NoAggregationsSelected));
        assert!(output.has_warning(&TransformWarning::InapplicableAggregations(vec![
            "Cumulative sum".to_string()
        ])));
    }
}
