//! Aggregation kinds
//!
//! A fixed catalog of reductions the engines can apply:
//! - Location: mean, median, mode, harmonic and geometric mean
//! - Spread: min, max, span, standard deviation, variance
//! - Totals: sum, product and their running (cumulative) forms
//! - Smoothing: linear and exponential moving averages
//! - Counts: non-zero and defined values
//!
//! Registration order is significant: it fixes the order of output columns
//! and of inapplicable kinds listed in warnings.

pub mod reductions;

use crate::error::{MovingTransformError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Reduction of one window or segment to a scalar
pub type Reduction = fn(&[f64]) -> f64;

/// Running reduction over a whole column
pub type CumulativeReduction = fn(&[f64]) -> Vec<f64>;

/// Description of one aggregation kind
#[derive(Clone, Copy)]
pub struct AggregationDescriptor {
    /// Unique key used in selections
    pub short_name: &'static str,
    /// Human readable name used in output column names and warnings
    pub display_name: &'static str,
    /// Reduction applied to each sliding window
    pub window: Reduction,
    /// Reduction of a whole block or period; `None` for kinds only
    /// meaningful in sliding windows
    pub block: Option<Reduction>,
    /// Running form, used when a sliding window keeps every row
    pub cumulative: Option<CumulativeReduction>,
    pub supports_discrete: bool,
    pub is_count_aggregate: bool,
}

impl AggregationDescriptor {
    /// Reduce every window of `width` rows, advancing by `step`
    pub fn windowed_transform(&self, column: &[f64], width: usize, step: usize) -> Vec<f64> {
        reductions::windowed(column, width, step, self.window)
    }

    /// Reduce one complete segment, if the kind has a block form
    pub fn block_transform(&self, segment: &[f64]) -> Option<f64> {
        debug_assert!(!segment.is_empty(), "block reduction of an empty segment");
        self.block.map(|reduce| reduce(segment))
    }

    /// Running reduction over the whole column, if the kind has one
    pub fn cumulative_transform(&self, column: &[f64]) -> Option<Vec<f64>> {
        self.cumulative.map(|reduce| reduce(column))
    }

    /// Whether the kind can be used for blocks and periods
    pub fn has_block_form(&self) -> bool {
        self.block.is_some()
    }
}

impl fmt::Debug for AggregationDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AggregationDescriptor")
            .field("short_name", &self.short_name)
            .field("display_name", &self.display_name)
            .field("has_block_form", &self.block.is_some())
            .field("has_cumulative_form", &self.cumulative.is_some())
            .field("supports_discrete", &self.supports_discrete)
            .field("is_count_aggregate", &self.is_count_aggregate)
            .finish()
    }
}

impl PartialEq for AggregationDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.short_name == other.short_name
    }
}

const fn plain(
    short_name: &'static str,
    display_name: &'static str,
    reduce: Reduction,
) -> AggregationDescriptor {
    AggregationDescriptor {
        short_name,
        display_name,
        window: reduce,
        block: Some(reduce),
        cumulative: None,
        supports_discrete: false,
        is_count_aggregate: false,
    }
}

const fn count(
    short_name: &'static str,
    display_name: &'static str,
    reduce: Reduction,
) -> AggregationDescriptor {
    AggregationDescriptor {
        supports_discrete: true,
        is_count_aggregate: true,
        ..plain(short_name, display_name, reduce)
    }
}

const fn windowed_only(
    short_name: &'static str,
    display_name: &'static str,
    window: Reduction,
) -> AggregationDescriptor {
    AggregationDescriptor {
        block: None,
        ..plain(short_name, display_name, window)
    }
}

const fn running(
    short_name: &'static str,
    display_name: &'static str,
    window: Reduction,
    cumulative: CumulativeReduction,
) -> AggregationDescriptor {
    AggregationDescriptor {
        block: None,
        cumulative: Some(cumulative),
        ..plain(short_name, display_name, window)
    }
}

static AGGREGATIONS: [AggregationDescriptor; 18] = [
    plain("mean", "Mean value", reductions::mean),
    plain("sum", "Sum", reductions::sum),
    plain("product", "Product", reductions::product),
    plain("min", "Minimum", reductions::min),
    plain("max", "Maximum", reductions::max),
    plain("span", "Span", reductions::span),
    plain("median", "Median", reductions::median),
    AggregationDescriptor {
        supports_discrete: true,
        ..plain("mode", "Mode", reductions::mode)
    },
    plain("std", "Standard deviation", reductions::std),
    plain("var", "Variance", reductions::var),
    windowed_only("lin. MA", "Linear MA", reductions::linear_ma),
    windowed_only("exp. MA", "Exponential MA", reductions::exponential_ma),
    plain("harmonic", "Harmonic mean", reductions::harmonic_mean),
    plain("geometric", "Geometric mean", reductions::geometric_mean),
    count("non-zero", "Non-zero count", reductions::count_nonzero),
    count("defined", "Defined count", reductions::count_defined),
    running("cumsum", "Cumulative sum", reductions::sum, reductions::cumulative_sum),
    running(
        "cumprod",
        "Cumulative product",
        reductions::product,
        reductions::cumulative_product,
    ),
];

/// Read-only registry of aggregation kinds
pub struct AggregationCatalog;

impl AggregationCatalog {
    /// All kinds, in registration order
    pub fn all() -> impl Iterator<Item = &'static AggregationDescriptor> {
        AGGREGATIONS.iter()
    }

    /// Look up a kind by its short name
    pub fn get(short_name: &str) -> Result<&'static AggregationDescriptor> {
        AGGREGATIONS
            .iter()
            .find(|d| d.short_name == short_name)
            .ok_or_else(|| MovingTransformError::UnknownAggregationKind(short_name.to_string()))
    }

    pub fn contains(short_name: &str) -> bool {
        AGGREGATIONS.iter().any(|d| d.short_name == short_name)
    }
}

/// Aggregation kinds requested per variable
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationSelection {
    kinds: BTreeMap<String, BTreeSet<String>>,
}

impl AggregationSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request `kind` for `variable`
    pub fn select(&mut self, variable: impl Into<String>, kind: &str) -> Result<&mut Self> {
        AggregationCatalog::get(kind)?;
        self.kinds
            .entry(variable.into())
            .or_default()
            .insert(kind.to_string());
        Ok(self)
    }

    /// Builder form of [`select`](Self::select) for several kinds at once
    pub fn with(mut self, variable: &str, kinds: &[&str]) -> Result<Self> {
        for kind in kinds {
            self.select(variable, kind)?;
        }
        Ok(self)
    }

    /// Withdraw `kind` for `variable`
    pub fn deselect(&mut self, variable: &str, kind: &str) -> &mut Self {
        if let Some(kinds) = self.kinds.get_mut(variable) {
            kinds.remove(kind);
            if kinds.is_empty() {
                self.kinds.remove(variable);
            }
        }
        self
    }

    /// Requested kinds for `variable`, in catalog order.
    ///
    /// Fails if the selection names a kind the catalog does not know, which
    /// can happen for selections that were deserialized.
    pub fn kinds_for(&self, variable: &str) -> Result<Vec<&'static AggregationDescriptor>> {
        let Some(requested) = self.kinds.get(variable) else {
            return Ok(Vec::new());
        };
        for kind in requested {
            AggregationCatalog::get(kind)?;
        }
        Ok(AggregationCatalog::all()
            .filter(|d| requested.contains(d.short_name))
            .collect())
    }

    /// Names of variables with at least one requested kind
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.kinds
            .iter()
            .filter(|(_, kinds)| !kinds.is_empty())
            .map(|(name, _)| name.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.values().all(BTreeSet::is_empty)
    }
}
