//! Tabular data model
//!
//! Provides the column descriptors and the immutable table the engines
//! read from and produce:
//! - Variables (continuous, discrete, time and text)
//! - Domains partitioned into attributes, targets and metas
//! - Tables with optional weights, row ids and a designated time variable
//! - Conversion to and from polars data frames

mod table;
pub mod frame;

pub use table::{Table, TableBuilder};

use crate::error::{MovingTransformError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Kind of values a variable holds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum VariableKind {
    /// Real-valued column
    Continuous,
    /// Categorical column; values are indices into `values`
    Discrete { values: Vec<String> },
    /// Epoch seconds (UTC)
    Time,
    /// Free text, only valid as a meta column
    Text,
}

/// Column descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    name: String,
    kind: VariableKind,
    number_of_decimals: Option<usize>,
}

impl Variable {
    pub fn continuous(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: VariableKind::Continuous,
            number_of_decimals: None,
        }
    }

    pub fn discrete<S: Into<String>>(
        name: impl Into<String>,
        values: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: VariableKind::Discrete {
                values: values.into_iter().map(Into::into).collect(),
            },
            number_of_decimals: None,
        }
    }

    pub fn time(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: VariableKind::Time,
            number_of_decimals: None,
        }
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: VariableKind::Text,
            number_of_decimals: None,
        }
    }

    /// Set the number of decimals used when displaying values
    pub fn with_decimals(mut self, decimals: usize) -> Self {
        self.number_of_decimals = Some(decimals);
        self
    }

    /// Copy of this variable under another name
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self.clone()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &VariableKind {
        &self.kind
    }

    pub fn number_of_decimals(&self) -> Option<usize> {
        self.number_of_decimals
    }

    pub fn is_discrete(&self) -> bool {
        matches!(self.kind, VariableKind::Discrete { .. })
    }

    /// Continuous and time variables hold real values
    pub fn is_continuous(&self) -> bool {
        matches!(self.kind, VariableKind::Continuous | VariableKind::Time)
    }

    pub fn is_time(&self) -> bool {
        matches!(self.kind, VariableKind::Time)
    }

    pub fn is_text(&self) -> bool {
        matches!(self.kind, VariableKind::Text)
    }

    /// Category labels of a discrete variable
    pub fn values(&self) -> Option<&[String]> {
        match &self.kind {
            VariableKind::Discrete { values } => Some(values),
            _ => None,
        }
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Variables of a table, split by role
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Domain {
    attributes: Vec<Variable>,
    class_vars: Vec<Variable>,
    metas: Vec<Variable>,
}

impl Domain {
    /// Create a domain; names must be unique across all roles
    pub fn new(
        attributes: Vec<Variable>,
        class_vars: Vec<Variable>,
        metas: Vec<Variable>,
    ) -> Result<Self> {
        let mut seen = HashSet::new();
        for var in attributes.iter().chain(&class_vars).chain(&metas) {
            if !seen.insert(var.name()) {
                return Err(MovingTransformError::DuplicateVariable(var.name().to_string()));
            }
        }
        for var in attributes.iter().chain(&class_vars) {
            if var.is_text() {
                return Err(MovingTransformError::DataError(format!(
                    "text variable '{}' can only be a meta",
                    var.name()
                )));
            }
        }
        Ok(Self {
            attributes,
            class_vars,
            metas,
        })
    }

    pub fn attributes(&self) -> &[Variable] {
        &self.attributes
    }

    pub fn class_vars(&self) -> &[Variable] {
        &self.class_vars
    }

    pub fn metas(&self) -> &[Variable] {
        &self.metas
    }

    /// Attributes followed by targets
    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        self.attributes.iter().chain(&self.class_vars)
    }

    /// Every variable in the domain, metas included
    pub fn all(&self) -> impl Iterator<Item = &Variable> {
        self.variables().chain(&self.metas)
    }

    /// Names of every variable in the domain
    pub fn names(&self) -> Vec<String> {
        self.all().map(|v| v.name().to_string()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&Variable> {
        self.all().find(|v| v.name() == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }
}

/// Value of a meta column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MetaValue {
    Number(f64),
    Text(String),
    Missing,
}

impl Default for MetaValue {
    fn default() -> Self {
        MetaValue::Missing
    }
}

impl From<f64> for MetaValue {
    fn from(v: f64) -> Self {
        if v.is_nan() {
            MetaValue::Missing
        } else {
            MetaValue::Number(v)
        }
    }
}

impl From<&str> for MetaValue {
    fn from(v: &str) -> Self {
        MetaValue::Text(v.to_string())
    }
}

impl From<String> for MetaValue {
    fn from(v: String) -> Self {
        MetaValue::Text(v)
    }
}
