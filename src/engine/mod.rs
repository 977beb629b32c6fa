//! Aggregation engines
//!
//! Three ways of reducing a time series:
//! - [`SlidingWindowEngine`] - aggregates over a window ending at each row
//! - [`SequentialBlockEngine`] - aggregates over non-overlapping blocks
//! - [`PeriodAggregationEngine`] - aggregates over calendar periods
//!
//! Each engine reads an immutable [`Table`] and returns a
//! [`TransformOutput`]: a new table, or none, plus the warnings explaining
//! what was skipped.

mod blocks;
mod periods;
mod sliding;

pub use blocks::{ReferenceRow, SequentialBlockEngine};
pub use periods::PeriodAggregationEngine;
pub use sliding::{RowRetention, SlidingWindowEngine};

use crate::aggregation::{AggregationCatalog, AggregationDescriptor, AggregationSelection};
use crate::data::{Domain, MetaValue, Table, Variable};
use crate::error::{MovingTransformError, Result};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

/// Name of the row count column of period aggregation
pub const INSTANCE_COUNT: &str = "Instance count";

/// Non-fatal condition raised while computing aggregates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransformWarning {
    /// Nothing to compute; the output is empty
    NoAggregationsSelected,
    /// Display names of kinds that only apply to sliding windows
    InapplicableAggregations(Vec<String>),
    WindowTooLarge,
    BlockTooLarge,
    /// `"<variable> (<kind>)"` pairs skipped for discrete variables
    UnsupportedForDiscrete(Vec<String>),
    /// The input table has no rows
    EmptyInput,
}

impl fmt::Display for TransformWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransformWarning::NoAggregationsSelected => {
                write!(f, "No (applicable) aggregations are selected")
            }
            TransformWarning::InapplicableAggregations(kinds) => write!(
                f,
                "Some aggregations are applicable only to sliding window ({})",
                kinds.join(", ")
            ),
            TransformWarning::WindowTooLarge => write!(f, "Window width is too large"),
            TransformWarning::BlockTooLarge => write!(f, "Block width is too large"),
            TransformWarning::UnsupportedForDiscrete(pairs) => write!(
                f,
                "Some aggregations do not support discrete variables ({})",
                pairs.join(", ")
            ),
            TransformWarning::EmptyInput => write!(f, "Input data has no instances"),
        }
    }
}

/// Result of one engine invocation.
///
/// A missing table is always accompanied by at least one warning.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformOutput {
    pub table: Option<Table>,
    pub warnings: Vec<TransformWarning>,
}

impl TransformOutput {
    pub(crate) fn new(table: Option<Table>, warnings: Vec<TransformWarning>) -> Self {
        debug_assert!(table.is_some() || !warnings.is_empty());
        Self { table, warnings }
    }

    pub fn has_warning(&self, warning: &TransformWarning) -> bool {
        self.warnings.contains(warning)
    }
}

/// Record a warning and log it
pub(crate) fn raise(warnings: &mut Vec<TransformWarning>, warning: TransformWarning) {
    warn!(warning = %warning, "Aggregation warning");
    warnings.push(warning);
}

/// Kinds to compute for one variable
pub(crate) struct VariablePlan<'a> {
    pub variable: &'a Variable,
    pub column: Vec<f64>,
    pub kinds: Vec<&'static AggregationDescriptor>,
}

impl VariablePlan<'_> {
    pub fn candidate_names(&self) -> impl Iterator<Item = String> + '_ {
        self.kinds
            .iter()
            .map(move |kind| format!("{} ({})", self.variable.name(), kind.display_name))
    }
}

/// Selection resolved against a table
pub(crate) struct Plan<'a> {
    /// In domain order: attributes, then targets
    pub variables: Vec<VariablePlan<'a>>,
    /// Kinds without a block form, in catalog order
    pub inapplicable: Vec<&'static AggregationDescriptor>,
    pub unsupported: Vec<String>,
}

impl<'a> Plan<'a> {
    /// Resolve `selection` against `table`.
    ///
    /// The designated time variable and metas are never aggregated. With
    /// `require_block_form`, kinds lacking a block reduction are moved to
    /// `inapplicable`.
    pub fn resolve(
        table: &'a Table,
        selection: &AggregationSelection,
        require_block_form: bool,
    ) -> Result<Self> {
        let domain = table.domain();
        for name in selection.variables() {
            if !domain.contains(name) {
                return Err(MovingTransformError::UnknownVariable(name.to_string()));
            }
        }

        let time_name = table.time_variable().map(|v| v.name().to_string());
        let mut variables = Vec::new();
        let mut inapplicable: Vec<&'static AggregationDescriptor> = Vec::new();
        let mut unsupported = Vec::new();

        for var in domain.variables() {
            let requested = selection.kinds_for(var.name())?;
            if requested.is_empty() {
                continue;
            }
            if time_name.as_deref() == Some(var.name()) {
                debug!(variable = %var.name(), "Ignoring aggregations of the time variable");
                continue;
            }
            let mut kinds = Vec::with_capacity(requested.len());
            for kind in requested {
                if var.is_discrete() && !kind.supports_discrete {
                    unsupported.push(format!("{} ({})", var.name(), kind.display_name));
                } else if require_block_form && !kind.has_block_form() {
                    if !inapplicable.contains(&kind) {
                        inapplicable.push(kind);
                    }
                } else {
                    kinds.push(kind);
                }
            }
            if !kinds.is_empty() {
                let column = table
                    .column(var.name())
                    .map(|c| c.to_vec())
                    .ok_or_else(|| MovingTransformError::UnknownVariable(var.name().to_string()))?;
                variables.push(VariablePlan {
                    variable: var,
                    column,
                    kinds,
                });
            }
        }

        for name in selection.variables() {
            if domain.metas().iter().any(|m| m.name() == name) {
                debug!(variable = %name, "Ignoring aggregations of a meta variable");
            }
        }

        inapplicable.sort_by_key(|kind| {
            AggregationCatalog::all()
                .position(|d| d.short_name == kind.short_name)
                .unwrap_or(usize::MAX)
        });

        Ok(Self {
            variables,
            inapplicable,
            unsupported,
        })
    }

    pub fn get(&self, name: &str) -> Option<&VariablePlan<'a>> {
        self.variables.iter().find(|p| p.variable.name() == name)
    }

    pub fn candidate_names(&self) -> Vec<String> {
        self.variables
            .iter()
            .flat_map(|p| p.candidate_names())
            .collect()
    }

    pub fn n_aggregates(&self) -> usize {
        self.variables.iter().map(|p| p.kinds.len()).sum()
    }

    /// Raise the warnings about skipped kinds
    pub fn report(&self, warnings: &mut Vec<TransformWarning>) {
        if !self.unsupported.is_empty() {
            raise(
                warnings,
                TransformWarning::UnsupportedForDiscrete(self.unsupported.clone()),
            );
        }
        if !self.inapplicable.is_empty() {
            raise(
                warnings,
                TransformWarning::InapplicableAggregations(
                    self.inapplicable
                        .iter()
                        .map(|d| d.display_name.to_string())
                        .collect(),
                ),
            );
        }
    }
}

/// Output variable of an aggregate of `source`
pub(crate) fn aggregate_variable(
    source: &Variable,
    kind: &AggregationDescriptor,
    name: String,
) -> Variable {
    if kind.is_count_aggregate {
        Variable::continuous(name).with_decimals(0)
    } else {
        source.renamed(name)
    }
}

/// Output attributes with their values
#[derive(Default)]
pub(crate) struct OutputColumns {
    variables: Vec<Variable>,
    columns: Vec<Vec<f64>>,
}

impl OutputColumns {
    pub fn push(&mut self, variable: Variable, values: Vec<f64>) {
        self.variables.push(variable);
        self.columns.push(values);
    }

    /// Table of these attributes; targets, metas, weights and ids come from
    /// `rows` of `source` when given
    pub fn into_table(
        self,
        n_rows: usize,
        source: Option<(&Table, &[usize])>,
        time_variable: Option<String>,
    ) -> Result<Table> {
        let n_cols = self.columns.len();
        for (var, column) in self.variables.iter().zip(&self.columns) {
            if column.len() != n_rows {
                return Err(MovingTransformError::ShapeError {
                    expected: format!("{} rows in '{}'", n_rows, var.name()),
                    actual: format!("{} rows", column.len()),
                });
            }
        }
        let columns = self.columns;
        let x = Array2::from_shape_fn((n_rows, n_cols), |(i, j)| columns[j][i]);

        match source {
            Some((table, rows)) => {
                let domain = Domain::new(
                    self.variables,
                    table.domain().class_vars().to_vec(),
                    table.domain().metas().to_vec(),
                )?;
                Table::from_parts(
                    domain,
                    x,
                    table.y().select(Axis(0), rows),
                    table.metas().select(Axis(0), rows),
                    table.weights().map(|w| w.select(Axis(0), rows)),
                    table.ids().select(Axis(0), rows),
                    time_variable,
                )
            }
            None => {
                let domain = Domain::new(self.variables, Vec::new(), Vec::new())?;
                Table::from_parts(
                    domain,
                    x,
                    Array2::zeros((n_rows, 0)),
                    Array2::from_elem((n_rows, 0), MetaValue::Missing),
                    None,
                    Array1::from_iter(0..n_rows as u64),
                    time_variable,
                )
            }
        }
    }
}
