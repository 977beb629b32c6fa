//! Immutable table of rows

use super::{Domain, MetaValue, Variable};
use crate::error::{MovingTransformError, Result};
use ndarray::{Array1, Array2, ArrayView1, Axis};

/// Rows of a multivariate time series.
///
/// Attribute and target values are numeric: discrete values are category
/// indices and `NaN` marks a missing value.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    domain: Domain,
    x: Array2<f64>,
    y: Array2<f64>,
    metas: Array2<MetaValue>,
    weights: Option<Array1<f64>>,
    ids: Array1<u64>,
    time_variable: Option<String>,
}

impl Table {
    /// Create a table from role matrices; row ids default to `0..n_rows`
    pub fn new(
        domain: Domain,
        x: Array2<f64>,
        y: Array2<f64>,
        metas: Array2<MetaValue>,
    ) -> Result<Self> {
        let n_rows = x.nrows();
        check_shape("attributes", domain.attributes().len(), x.ncols(), n_rows, x.nrows())?;
        check_shape("targets", domain.class_vars().len(), y.ncols(), n_rows, y.nrows())?;
        check_shape("metas", domain.metas().len(), metas.ncols(), n_rows, metas.nrows())?;

        Ok(Self {
            domain,
            x,
            y,
            metas,
            weights: None,
            ids: Array1::from_iter(0..n_rows as u64),
            time_variable: None,
        })
    }

    pub fn builder() -> TableBuilder {
        TableBuilder::new()
    }

    /// Attach per-row weights
    pub fn with_weights(mut self, weights: Array1<f64>) -> Result<Self> {
        if weights.len() != self.n_rows() {
            return Err(MovingTransformError::ShapeError {
                expected: format!("{} weights", self.n_rows()),
                actual: format!("{} weights", weights.len()),
            });
        }
        self.weights = Some(weights);
        Ok(self)
    }

    /// Replace row identifiers
    pub fn with_ids(mut self, ids: Array1<u64>) -> Result<Self> {
        if ids.len() != self.n_rows() {
            return Err(MovingTransformError::ShapeError {
                expected: format!("{} ids", self.n_rows()),
                actual: format!("{} ids", ids.len()),
            });
        }
        self.ids = ids;
        Ok(self)
    }

    /// Designate a continuous attribute or target as the time variable
    pub fn with_time_variable(mut self, name: &str) -> Result<Self> {
        let var = self
            .domain
            .variables()
            .find(|v| v.name() == name)
            .ok_or_else(|| MovingTransformError::UnknownVariable(name.to_string()))?;
        if !var.is_continuous() {
            return Err(MovingTransformError::DataError(format!(
                "time variable '{}' must be continuous",
                name
            )));
        }
        self.time_variable = Some(name.to_string());
        Ok(self)
    }

    pub fn n_rows(&self) -> usize {
        self.x.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.n_rows() == 0
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    pub fn x(&self) -> &Array2<f64> {
        &self.x
    }

    pub fn y(&self) -> &Array2<f64> {
        &self.y
    }

    pub fn metas(&self) -> &Array2<MetaValue> {
        &self.metas
    }

    pub fn weights(&self) -> Option<&Array1<f64>> {
        self.weights.as_ref()
    }

    pub fn ids(&self) -> &Array1<u64> {
        &self.ids
    }

    /// The designated time variable, if any
    pub fn time_variable(&self) -> Option<&Variable> {
        self.time_variable
            .as_deref()
            .and_then(|name| self.domain.get(name))
    }

    /// Values of an attribute or target column
    pub fn column(&self, name: &str) -> Option<ArrayView1<'_, f64>> {
        if let Some(i) = self.domain.attributes().iter().position(|v| v.name() == name) {
            return Some(self.x.column(i));
        }
        self.domain
            .class_vars()
            .iter()
            .position(|v| v.name() == name)
            .map(|i| self.y.column(i))
    }

    /// Values of a meta column
    pub fn meta_column(&self, name: &str) -> Option<ArrayView1<'_, MetaValue>> {
        self.domain
            .metas()
            .iter()
            .position(|v| v.name() == name)
            .map(|i| self.metas.column(i))
    }

    /// New table with the given rows, in the given order
    pub fn select_rows(&self, rows: &[usize]) -> Table {
        Table {
            domain: self.domain.clone(),
            x: self.x.select(Axis(0), rows),
            y: self.y.select(Axis(0), rows),
            metas: self.metas.select(Axis(0), rows),
            weights: self.weights.as_ref().map(|w| w.select(Axis(0), rows)),
            ids: self.ids.select(Axis(0), rows),
            time_variable: self.time_variable.clone(),
        }
    }

    /// Assemble a table from parts the engines already sliced consistently
    pub(crate) fn from_parts(
        domain: Domain,
        x: Array2<f64>,
        y: Array2<f64>,
        metas: Array2<MetaValue>,
        weights: Option<Array1<f64>>,
        ids: Array1<u64>,
        time_variable: Option<String>,
    ) -> Result<Self> {
        let mut table = Table::new(domain, x, y, metas)?;
        if let Some(weights) = weights {
            table = table.with_weights(weights)?;
        }
        table = table.with_ids(ids)?;
        table.time_variable =
            time_variable.filter(|name| table.domain.variables().any(|v| v.name() == name));
        Ok(table)
    }
}

fn check_shape(role: &str, n_vars: usize, n_cols: usize, n_rows: usize, rows: usize) -> Result<()> {
    if n_vars != n_cols || rows != n_rows {
        return Err(MovingTransformError::ShapeError {
            expected: format!("{} rows x {} {} columns", n_rows, n_vars, role),
            actual: format!("{} rows x {} columns", rows, n_cols),
        });
    }
    Ok(())
}

/// Build a [`Table`] column by column
#[derive(Debug, Default)]
pub struct TableBuilder {
    attributes: Vec<(Variable, Vec<f64>)>,
    class_vars: Vec<(Variable, Vec<f64>)>,
    metas: Vec<(Variable, Vec<MetaValue>)>,
    weights: Option<Vec<f64>>,
    ids: Option<Vec<u64>>,
    time_variable: Option<String>,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attribute(mut self, var: Variable, values: Vec<f64>) -> Self {
        self.attributes.push((var, values));
        self
    }

    pub fn class_var(mut self, var: Variable, values: Vec<f64>) -> Self {
        self.class_vars.push((var, values));
        self
    }

    pub fn meta(mut self, var: Variable, values: Vec<MetaValue>) -> Self {
        self.metas.push((var, values));
        self
    }

    pub fn weights(mut self, weights: Vec<f64>) -> Self {
        self.weights = Some(weights);
        self
    }

    pub fn ids(mut self, ids: Vec<u64>) -> Self {
        self.ids = Some(ids);
        self
    }

    /// Name of the attribute holding epoch seconds
    pub fn time_variable(mut self, name: impl Into<String>) -> Self {
        self.time_variable = Some(name.into());
        self
    }

    pub fn build(self) -> Result<Table> {
        let n_rows = self
            .attributes
            .first()
            .map(|(_, v)| v.len())
            .or_else(|| self.class_vars.first().map(|(_, v)| v.len()))
            .or_else(|| self.metas.first().map(|(_, v)| v.len()))
            .unwrap_or(0);

        let (attr_vars, x) = stack_columns(self.attributes, n_rows)?;
        let (class_vars, y) = stack_columns(self.class_vars, n_rows)?;
        let (meta_vars, metas) = stack_columns(self.metas, n_rows)?;

        let domain = Domain::new(attr_vars, class_vars, meta_vars)?;
        let mut table = Table::new(domain, x, y, metas)?;
        if let Some(weights) = self.weights {
            table = table.with_weights(Array1::from_vec(weights))?;
        }
        if let Some(ids) = self.ids {
            table = table.with_ids(Array1::from_vec(ids))?;
        }
        if let Some(name) = self.time_variable {
            table = table.with_time_variable(&name)?;
        }
        Ok(table)
    }
}

fn stack_columns<T: Clone>(
    columns: Vec<(Variable, Vec<T>)>,
    n_rows: usize,
) -> Result<(Vec<Variable>, Array2<T>)> {
    let mut vars = Vec::with_capacity(columns.len());
    let mut data = Vec::with_capacity(columns.len());
    for (var, values) in columns {
        if values.len() != n_rows {
            return Err(MovingTransformError::ShapeError {
                expected: format!("{} values in '{}'", n_rows, var.name()),
                actual: format!("{} values", values.len()),
            });
        }
        vars.push(var);
        data.push(values);
    }
    let n_cols = data.len();
    let mut flat = Vec::with_capacity(n_rows * n_cols);
    for row in 0..n_rows {
        for column in &data {
            flat.push(column[row].clone());
        }
    }
    let matrix = Array2::from_shape_vec((n_rows, n_cols), flat)?;
    Ok((vars, matrix))
}
