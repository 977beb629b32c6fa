//! Conversion between [`Table`] and polars data frames

use super::{MetaValue, Table, TableBuilder, Variable, VariableKind};
use crate::error::{MovingTransformError, Result};
use polars::prelude::*;
use std::collections::BTreeSet;
use tracing::{debug, warn};

impl Table {
    /// Build a table from a data frame.
    ///
    /// Numeric and boolean columns become continuous variables, string
    /// columns become discrete variables with sorted labels and datetime
    /// columns become time variables in epoch seconds. Columns listed in
    /// `targets` are placed among the targets; other dtypes are skipped.
    pub fn from_dataframe(
        df: &DataFrame,
        time_column: Option<&str>,
        targets: &[&str],
    ) -> Result<Table> {
        let mut builder = TableBuilder::new();
        for column in df.get_columns() {
            let name = column.name().as_str();
            let series = column.as_materialized_series();
            let converted = match series.dtype() {
                DataType::Float64
                | DataType::Float32
                | DataType::Int64
                | DataType::Int32
                | DataType::Int16
                | DataType::Int8
                | DataType::UInt64
                | DataType::UInt32
                | DataType::UInt16
                | DataType::UInt8
                | DataType::Boolean => {
                    let var = if time_column == Some(name) {
                        Variable::time(name)
                    } else {
                        Variable::continuous(name)
                    };
                    Some((var, numeric_values(series)?))
                }
                DataType::Datetime(unit, _) => {
                    Some((Variable::time(name), datetime_values(series, *unit)?))
                }
                DataType::String => Some(discrete_values(name, series)?),
                other => {
                    warn!(column = %name, dtype = ?other, "Skipping column with unsupported dtype");
                    None
                }
            };
            if let Some((var, values)) = converted {
                builder = if targets.contains(&name) {
                    builder.class_var(var, values)
                } else {
                    builder.attribute(var, values)
                };
            }
        }
        if let Some(name) = time_column {
            builder = builder.time_variable(name);
        }
        let table = builder.build()?;
        debug!(
            rows = table.n_rows(),
            attributes = table.domain().attributes().len(),
            targets = table.domain().class_vars().len(),
            "Converted data frame to table"
        );
        Ok(table)
    }

    /// Convert to a data frame; discrete values are written as their labels
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let mut columns: Vec<Column> = Vec::new();
        let domain = self.domain();
        for (var, values) in domain
            .attributes()
            .iter()
            .zip(self.x().columns())
            .chain(domain.class_vars().iter().zip(self.y().columns()))
        {
            let series = match var.kind() {
                VariableKind::Discrete { values: labels } => {
                    let text: Vec<Option<&str>> = values
                        .iter()
                        .map(|&v| label_for(labels, v))
                        .collect();
                    Series::new(var.name().into(), text)
                }
                _ => {
                    let numbers: Vec<Option<f64>> = values
                        .iter()
                        .map(|&v| if v.is_nan() { None } else { Some(v) })
                        .collect();
                    Series::new(var.name().into(), numbers)
                }
            };
            columns.push(series.into());
        }
        for (var, values) in domain.metas().iter().zip(self.metas().columns()) {
            let series = if values.iter().any(|v| matches!(v, MetaValue::Text(_))) {
                let text: Vec<Option<String>> = values
                    .iter()
                    .map(|v| match v {
                        MetaValue::Text(s) => Some(s.clone()),
                        MetaValue::Number(n) => Some(n.to_string()),
                        MetaValue::Missing => None,
                    })
                    .collect();
                Series::new(var.name().into(), text)
            } else {
                let numbers: Vec<Option<f64>> = values
                    .iter()
                    .map(|v| match v {
                        MetaValue::Number(n) => Some(*n),
                        _ => None,
                    })
                    .collect();
                Series::new(var.name().into(), numbers)
            };
            columns.push(series.into());
        }
        Ok(DataFrame::new(columns)?)
    }
}

fn label_for(labels: &[String], value: f64) -> Option<&str> {
    if value.is_nan() || value < 0.0 {
        return None;
    }
    labels.get(value as usize).map(String::as_str)
}

fn numeric_values(series: &Series) -> Result<Vec<f64>> {
    let cast = series.cast(&DataType::Float64)?;
    let values = cast
        .f64()?
        .into_iter()
        .map(|v| v.unwrap_or(f64::NAN))
        .collect();
    Ok(values)
}

fn datetime_values(series: &Series, unit: TimeUnit) -> Result<Vec<f64>> {
    let per_second = match unit {
        TimeUnit::Nanoseconds => 1e9,
        TimeUnit::Microseconds => 1e6,
        TimeUnit::Milliseconds => 1e3,
    };
    let cast = series.cast(&DataType::Int64)?;
    let values = cast
        .i64()?
        .into_iter()
        .map(|v| v.map_or(f64::NAN, |t| t as f64 / per_second))
        .collect();
    Ok(values)
}

fn discrete_values(name: &str, series: &Series) -> Result<(Variable, Vec<f64>)> {
    let strings = series
        .str()
        .map_err(|e| MovingTransformError::DataError(e.to_string()))?;
    let labels: Vec<String> = strings
        .into_iter()
        .flatten()
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let values = strings
        .into_iter()
        .map(|v| {
            v.and_then(|s| labels.iter().position(|l| l == s))
                .map_or(f64::NAN, |i| i as f64)
        })
        .collect();
    Ok((Variable::discrete(name, labels), values))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_dataframe_roles() {
        let df = df!(
            "t" => &[0.0, 86400.0, 172800.0],
            "x" => &[1.0, 2.0, 3.0],
            "color" => &["red", "blue", "red"],
            "y" => &[0.5, 0.6, 0.7]
        )
        .unwrap();

        let table = Table::from_dataframe(&df, Some("t"), &["y"]).unwrap();
        assert_eq!(table.n_rows(), 3);
        assert_eq!(table.domain().attributes().len(), 3);
        assert_eq!(table.domain().class_vars()[0].name(), "y");
        assert!(table.time_variable().unwrap().is_time());

        let color = table.domain().get("color").unwrap();
        assert_eq!(color.values().unwrap(), &["blue".to_string(), "red".to_string()]);
        assert_eq!(table.column("color").unwrap().to_vec(), vec![1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_to_dataframe_writes_labels() {
        let table = Table::builder()
            .attribute(Variable::discrete("d", ["a", "b"]), vec![1.0, f64::NAN])
            .attribute(Variable::continuous("x"), vec![1.5, f64::NAN])
            .build()
            .unwrap();

        let df = table.to_dataframe().unwrap();
        assert_eq!(df.height(), 2);
        let d = df.column("d").unwrap().as_materialized_series().clone();
        assert_eq!(d.str().unwrap().get(0), Some("b"));
        assert_eq!(d.str().unwrap().get(1), None);
        assert_eq!(df.column("x").unwrap().null_count(), 1);
    }
}
