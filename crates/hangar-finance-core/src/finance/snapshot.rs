use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::finance::model::{FinanceKpis, FinanceModelResult, YearRow};
use crate::finance::state::FinanceModelInput;
use crate::types::Money;

/// Frozen audit view of one business-plan run.
///
/// Keeps the inputs verbatim together with the totals and KPIs they
/// produced, so the figures shown at signature time can be reproduced later
/// even after the project's state has been edited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinanceSnapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub taken_at: DateTime<Utc>,
    pub model_version: String,
    pub input: FinanceModelInput,
    pub production_annual_kwh: f64,
    pub total_cost: Money,
    pub down_payment: Money,
    pub capital_emprunte: Money,
    pub kpis: FinanceKpis,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_year: Option<YearRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_year: Option<YearRow>,
    pub cumulative_net_result: Money,
}

impl FinanceSnapshot {
    /// Freeze `result`, which must have been computed from `input`.
    /// The timestamp is supplied by the caller so capture stays pure.
    pub fn capture(
        input: &FinanceModelInput,
        result: &FinanceModelResult,
        taken_at: DateTime<Utc>,
        label: Option<String>,
    ) -> Self {
        FinanceSnapshot {
            label,
            taken_at,
            model_version: env!("CARGO_PKG_VERSION").to_string(),
            input: input.clone(),
            production_annual_kwh: result.production_annual_kwh,
            total_cost: result.total_cost,
            down_payment: result.down_payment,
            capital_emprunte: result.capital_emprunte,
            kpis: result.kpis.clone(),
            first_year: result.series.first().cloned(),
            final_year: result.series.last().cloned(),
            cumulative_net_result: result.kpis.total_net_result,
        }
    }

    /// Recompute the model from the frozen inputs and check that it still
    /// yields the frozen KPIs, bit for bit (NaN KPIs of an empty horizon
    /// compare equal to themselves).
    pub fn matches_recomputation(&self) -> bool {
        let fresh = crate::finance::model::compute_finance_model(
            self.input.kwc,
            self.input.productible_kwh_per_kwc,
            &self.input.state,
        );
        same_kpis(&fresh.kpis, &self.kpis) && same_bits(fresh.total_cost, self.total_cost)
    }
}

fn same_bits(a: f64, b: f64) -> bool {
    a.to_bits() == b.to_bits()
}

fn same_opt_bits(a: Option<f64>, b: Option<f64>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => same_bits(a, b),
        (None, None) => true,
        _ => false,
    }
}

fn same_kpis(a: &FinanceKpis, b: &FinanceKpis) -> bool {
    same_opt_bits(a.irr_pct, b.irr_pct)
        && same_bits(a.avg_dscr, b.avg_dscr)
        && same_bits(a.min_dscr, b.min_dscr)
        && same_opt_bits(a.payback_years, b.payback_years)
        && same_opt_bits(a.payback_years_without_acc, b.payback_years_without_acc)
        && same_bits(a.total_net_result, b.total_net_result)
}
