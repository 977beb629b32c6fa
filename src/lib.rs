//! Moving Transform - aggregates of multivariate time series
//!
//! This crate computes derived columns of a time series table by reducing
//! its values over:
//! - a sliding window ending at each row
//! - consecutive non-overlapping blocks of rows
//! - groups of rows sharing a calendar period of their timestamp
//!
//! # Modules
//!
//! ## Data
//! - [`data`] - Variables, domains and tables, with polars conversion
//!
//! ## Catalogs
//! - [`aggregation`] - Aggregation kinds and per-variable selections
//! - [`period`] - Calendar periods and UTC calendar arithmetic
//!
//! ## Computation
//! - [`engine`] - Sliding window, block and period engines
//! - [`naming`] - Collision-free output column names
//! - [`transform`] - Method dispatch and serializable configuration
//!
//! # Example
//!
//! ```
//! use moving_transform::prelude::*;
//!
//! let table = Table::builder()
//!     .attribute(Variable::continuous("x"), vec![1.0, 2.0, 3.0, 4.0, 5.0])
//!     .build()?;
//! let selection = AggregationSelection::new().with("x", &["mean"])?;
//!
//! let config = TransformConfig::new().with_sliding_window(3, RowRetention::Discard);
//! let output = MovingTransform::new(config).apply(&table, &selection)?;
//! let means = output.table.unwrap();
//! assert_eq!(means.column("x (Mean value)").unwrap().to_vec(), vec![2.0, 3.0, 4.0]);
//! # Ok::<(), moving_transform::MovingTransformError>(())
//! ```

// Core error handling
pub mod error;

// Data model
pub mod data;

// Catalogs
pub mod aggregation;
pub mod period;

// Computation
pub mod engine;
pub mod naming;
pub mod transform;

pub use aggregation::{AggregationCatalog, AggregationDescriptor, AggregationSelection};
pub use data::{Domain, MetaValue, Table, TableBuilder, Variable, VariableKind};
pub use engine::{
    PeriodAggregationEngine, ReferenceRow, RowRetention, SequentialBlockEngine,
    SlidingWindowEngine, TransformOutput, TransformWarning, INSTANCE_COUNT,
};
pub use error::{MovingTransformError, Result};
pub use period::{PeriodCatalog, PeriodDescriptor};
pub use transform::{
    BlockConfig, Method, MovingTransform, PeriodConfig, SlidingWindowConfig, TransformConfig,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::aggregation::{AggregationCatalog, AggregationSelection};
    pub use crate::data::{Table, Variable};
    pub use crate::engine::{ReferenceRow, RowRetention, TransformOutput, TransformWarning};
    pub use crate::error::{MovingTransformError, Result};
    pub use crate::period::PeriodCatalog;
    pub use crate::transform::{Method, MovingTransform, TransformConfig};
}
