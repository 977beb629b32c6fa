//! Sliding window aggregation

use super::{aggregate_variable, raise, OutputColumns, Plan, TransformOutput, TransformWarning};
use crate::aggregation::{AggregationDescriptor, AggregationSelection};
use crate::data::Table;
use crate::error::{MovingTransformError, Result};
use crate::naming;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Which original rows survive a sliding window aggregation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RowRetention {
    /// Output only the aggregates, one row per complete window
    Discard,
    /// Keep original rows that end a complete window
    #[default]
    KeepAligned,
    /// Keep every original row; leading aggregates are missing
    KeepAll,
}

/// Aggregates over a window of `window_width` rows ending at each row
#[derive(Debug, Clone)]
pub struct SlidingWindowEngine {
    window_width: usize,
    row_retention: RowRetention,
}

impl SlidingWindowEngine {
    pub fn new(window_width: usize, row_retention: RowRetention) -> Result<Self> {
        if window_width < 2 {
            return Err(MovingTransformError::InvalidParameter {
                name: "window_width".to_string(),
                value: window_width.to_string(),
                reason: "must be at least 2".to_string(),
            });
        }
        Ok(Self {
            window_width,
            row_retention,
        })
    }

    pub fn window_width(&self) -> usize {
        self.window_width
    }

    pub fn row_retention(&self) -> RowRetention {
        self.row_retention
    }

    /// Compute the selected aggregates.
    ///
    /// Running kinds use their cumulative form only when every row is kept;
    /// otherwise they reduce each window like the other kinds.
    pub fn compute(&self, table: &Table, selection: &AggregationSelection) -> Result<TransformOutput> {
        let n = table.n_rows();
        let width = self.window_width;
        let mut warnings = Vec::new();
        debug!(
            rows = n,
            window_width = width,
            retention = ?self.row_retention,
            "Computing sliding window aggregates"
        );

        if width > n {
            raise(&mut warnings, TransformWarning::WindowTooLarge);
        }

        let plan = Plan::resolve(table, selection, false)?;
        plan.report(&mut warnings);
        if plan.n_aggregates() == 0 {
            raise(&mut warnings, TransformWarning::NoAggregationsSelected);
            return Ok(TransformOutput::new(None, warnings));
        }

        let keep = self.row_retention != RowRetention::Discard;
        let candidates = plan.candidate_names();
        let names = if keep {
            naming::allocate(&candidates, &table.domain().names())
        } else {
            naming::allocate_unique(&candidates)
        };
        let mut names = names.into_iter();

        let complete = (n + 1).saturating_sub(width);
        let rows: Vec<usize> = match self.row_retention {
            RowRetention::Discard => Vec::new(),
            RowRetention::KeepAligned => (n - complete..n).collect(),
            RowRetention::KeepAll => (0..n).collect(),
        };
        let n_out = match self.row_retention {
            RowRetention::KeepAll => n,
            _ => complete,
        };

        let mut output = OutputColumns::default();
        for (i, attr) in table.domain().attributes().iter().enumerate() {
            if keep {
                let column = table.x().column(i);
                output.push(attr.clone(), rows.iter().map(|&r| column[r]).collect());
            }
            if let Some(var_plan) = plan.get(attr.name()) {
                for kind in &var_plan.kinds {
                    let name = names.next().unwrap_or_default();
                    output.push(
                        aggregate_variable(attr, kind, name),
                        self.aggregate(&var_plan.column, kind),
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
                        self.aggregate(&var_plan.column, kind),
                    );
                }
            }
        }

        let out = if keep {
            let time_variable = table.time_variable().map(|v| v.name().to_string());
            output.into_table(n_out, Some((table, rows.as_slice())), time_variable)?
        } else {
            output.into_table(n_out, None, None)?
        };
        debug!(
            rows = out.n_rows(),
            columns = out.domain().attributes().len(),
            "Sliding window aggregation done"
        );
        Ok(TransformOutput::new(Some(out), warnings))
    }

    fn aggregate(&self, column: &[f64], kind: &AggregationDescriptor) -> Vec<f64> {
        if self.row_retention == RowRetention::KeepAll {
            if let Some(running) = kind.cumulative_transform(column) {
                return running;
            }
        }
        let windowed = kind.windowed_transform(column, self.window_width, 1);
        if self.row_retention != RowRetention::KeepAll {
            return windowed;
        }
        let leading = (self.window_width - 1).min(column.len());
        let mut padded = vec![f64::NAN; leading];
        padded.extend(windowed);
        padded
    }
}
