//! Method selection and configuration
//!
//! [`MovingTransform`] holds a [`TransformConfig`] and routes each call to
//! the engine of the configured method. The configuration round-trips
//! through JSON so a caller can persist its settings.

use crate::aggregation::AggregationSelection;
use crate::data::Table;
use crate::engine::{
    raise, PeriodAggregationEngine, ReferenceRow, RowRetention, SequentialBlockEngine,
    SlidingWindowEngine, TransformOutput, TransformWarning,
};
use crate::error::{MovingTransformError, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Aggregation method
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Method {
    #[default]
    SlidingWindow,
    SequentialBlocks,
    TimePeriods,
}

/// Sliding window parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlidingWindowConfig {
    pub window_width: usize,
    pub row_retention: RowRetention,
}

impl Default for SlidingWindowConfig {
    fn default() -> Self {
        Self {
            window_width: 5,
            row_retention: RowRetention::KeepAligned,
        }
    }
}

/// Sequential block parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockConfig {
    pub block_width: usize,
    pub reference_row: ReferenceRow,
}

impl Default for BlockConfig {
    fn default() -> Self {
        Self {
            block_width: 5,
            reference_row: ReferenceRow::Discard,
        }
    }
}

/// Calendar period parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodConfig {
    /// Name of a period in [`PeriodCatalog`](crate::period::PeriodCatalog)
    pub period: String,
    /// Write month and day names instead of numbers where available
    pub use_category_labels: bool,
}

impl Default for PeriodConfig {
    fn default() -> Self {
        Self {
            period: "Years".to_string(),
            use_category_labels: true,
        }
    }
}

/// Settings of all three methods; only the section of `method` is used
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    pub method: Method,
    pub sliding: SlidingWindowConfig,
    pub blocks: BlockConfig,
    pub periods: PeriodConfig,
}

impl TransformConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sliding window with the given width and row retention
    pub fn with_sliding_window(mut self, window_width: usize, row_retention: RowRetention) -> Self {
        self.method = Method::SlidingWindow;
        self.sliding = SlidingWindowConfig {
            window_width,
            row_retention,
        };
        self
    }

    /// Sequential blocks with the given width and reference row
    pub fn with_blocks(mut self, block_width: usize, reference_row: ReferenceRow) -> Self {
        self.method = Method::SequentialBlocks;
        self.blocks = BlockConfig {
            block_width,
            reference_row,
        };
        self
    }

    /// Calendar periods
    pub fn with_periods(mut self, period: impl Into<String>, use_category_labels: bool) -> Self {
        self.method = Method::TimePeriods;
        self.periods = PeriodConfig {
            period: period.into(),
            use_category_labels,
        };
        self
    }

    /// Check the parameters of every section
    pub fn validate(&self) -> Result<()> {
        self.sliding_engine()?;
        self.block_engine()?;
        self.period_engine()?;
        Ok(())
    }

    /// Parse and validate a configuration; missing fields take defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config
            .validate()
            .map_err(|err| MovingTransformError::ConfigError(err.to_string()))?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn sliding_engine(&self) -> Result<SlidingWindowEngine> {
        SlidingWindowEngine::new(self.sliding.window_width, self.sliding.row_retention)
    }

    fn block_engine(&self) -> Result<SequentialBlockEngine> {
        SequentialBlockEngine::new(self.blocks.block_width, self.blocks.reference_row)
    }

    fn period_engine(&self) -> Result<PeriodAggregationEngine> {
        PeriodAggregationEngine::new(&self.periods.period, self.periods.use_category_labels)
    }
}

/// Computes moving aggregates of a table with the configured method
#[derive(Debug, Clone, Default)]
pub struct MovingTransform {
    config: TransformConfig,
}

impl MovingTransform {
    pub fn new(config: TransformConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TransformConfig {
        &self.config
    }

    /// Aggregate `table` as configured.
    ///
    /// A table without rows yields no output and an
    /// [`EmptyInput`](TransformWarning::EmptyInput) warning. Errors are
    /// reserved for invalid parameters and selections that do not match the
    /// table.
    pub fn apply(&self, table: &Table, selection: &AggregationSelection) -> Result<TransformOutput> {
        info!(
            method = ?self.config.method,
            rows = table.n_rows(),
            variables = selection.variables().count(),
            "Applying moving transform"
        );
        let output = match self.config.method {
            Method::SlidingWindow => {
                let engine = self.config.sliding_engine()?;
                self.guard_empty(table).unwrap_or_else(|| engine.compute(table, selection))
            }
            Method::SequentialBlocks => {
                let engine = self.config.block_engine()?;
                self.guard_empty(table).unwrap_or_else(|| engine.compute(table, selection))
            }
            Method::TimePeriods => {
                let engine = self.config.period_engine()?;
                if table.time_variable().is_none() {
                    return Err(MovingTransformError::MissingTimeVariable);
                }
                self.guard_empty(table).unwrap_or_else(|| engine.compute(table, selection))
            }
        }?;
        debug!(
            produced = output.table.is_some(),
            warnings = output.warnings.len(),
            "Moving transform finished"
        );
        Ok(output)
    }

    fn guard_empty(&self, table: &Table) -> Option<Result<TransformOutput>> {
        if !table.is_empty() {
            return None;
        }
        let mut warnings = Vec::new();
        raise(&mut warnings, TransformWarning::EmptyInput);
        Some(Ok(TransformOutput::new(None, warnings)))
    }
}
