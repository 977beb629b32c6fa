//! Aggregation over calendar periods

use super::{
    aggregate_variable, raise, OutputColumns, Plan, TransformOutput, TransformWarning, INSTANCE_COUNT,
};
use crate::aggregation::AggregationSelection;
use crate::data::{Table, Variable};
use crate::error::{MovingTransformError, Result};
use crate::naming;
use crate::period::{PeriodCatalog, PeriodDescriptor};
use tracing::debug;

/// Groups rows by a calendar key of their timestamp and aggregates each
/// group.
///
/// The output has one row per distinct key, in ascending key order, with
/// the key column and the number of rows in the group followed by the
/// aggregates. Selecting no aggregates still yields the count view.
#[derive(Debug, Clone)]
pub struct PeriodAggregationEngine {
    period: &'static PeriodDescriptor,
    use_category_labels: bool,
}

impl PeriodAggregationEngine {
    pub fn new(period: &str, use_category_labels: bool) -> Result<Self> {
        Ok(Self {
            period: PeriodCatalog::get(period)?,
            use_category_labels,
        })
    }

    pub fn period(&self) -> &'static PeriodDescriptor {
        self.period
    }

    pub fn use_category_labels(&self) -> bool {
        self.use_category_labels
    }

    pub fn compute(&self, table: &Table, selection: &AggregationSelection) -> Result<TransformOutput> {
        let time_var = table
            .time_variable()
            .ok_or(MovingTransformError::MissingTimeVariable)?;
        let times = table
            .column(time_var.name())
            .ok_or_else(|| MovingTransformError::UnknownVariable(time_var.name().to_string()))?;
        debug!(
            rows = table.n_rows(),
            period = self.period.name,
            labels = self.use_category_labels,
            "Computing period aggregates"
        );

        let row_keys: Vec<Option<f64>> = times
            .iter()
            .map(|&t| self.period.key(t, self.use_category_labels))
            .collect();
        let mut keys: Vec<f64> = row_keys.iter().flatten().copied().collect();
        keys.sort_by(|a, b| a.total_cmp(b));
        keys.dedup();
        if keys.is_empty() {
            let mut warnings = Vec::new();
            raise(&mut warnings, TransformWarning::EmptyInput);
            return Ok(TransformOutput::new(None, warnings));
        }

        let mut groups: Vec<Vec<usize>> = vec![Vec::new(); keys.len()];
        for (row, key) in row_keys.iter().enumerate() {
            let Some(key) = key else { continue };
            if let Ok(group) = keys.binary_search_by(|k| k.total_cmp(key)) {
                groups[group].push(row);
            }
        }
        let skipped = row_keys.iter().filter(|k| k.is_none()).count();
        if skipped > 0 {
            debug!(skipped, "Rows without a valid timestamp left out of all periods");
        }

        let mut warnings = Vec::new();
        let plan = Plan::resolve(table, selection, true)?;
        plan.report(&mut warnings);

        let mut candidates = vec![self.period.name.to_string(), INSTANCE_COUNT.to_string()];
        candidates.extend(plan.candidate_names());
        let mut names = naming::allocate_unique(&candidates).into_iter();
        let key_name = names.next().unwrap_or_default();
        let count_name = names.next().unwrap_or_default();

        let mut output = OutputColumns::default();
        output.push(self.key_variable(time_var, key_name.clone()), keys.clone());
        output.push(
            Variable::continuous(count_name).with_decimals(0),
            groups.iter().map(|g| g.len() as f64).collect(),
        );
        for var_plan in &plan.variables {
            for kind in &var_plan.kinds {
                let name = names.next().unwrap_or_default();
                let values = groups
                    .iter()
                    .map(|group| {
                        let segment: Vec<f64> = group.iter().map(|&r| var_plan.column[r]).collect();
                        kind.block_transform(&segment).unwrap_or(f64::NAN)
                    })
                    .collect();
                output.push(aggregate_variable(var_plan.variable, kind, name), values);
            }
        }

        let time_variable = (!self.period.is_periodic).then_some(key_name);
        let out = output.into_table(keys.len(), None, time_variable)?;
        debug!(
            groups = out.n_rows(),
            columns = out.domain().attributes().len(),
            "Period aggregation done"
        );
        Ok(TransformOutput::new(Some(out), warnings))
    }

    /// Column holding the group keys
    fn key_variable(&self, time_var: &Variable, name: String) -> Variable {
        if !self.period.is_periodic {
            return time_var.renamed(name);
        }
        match self.period.category_labels {
            Some(labels) if self.use_category_labels => Variable::discrete(name, labels.iter().copied()),
            _ => Variable::continuous(name).with_decimals(0),
        }
    }
}
