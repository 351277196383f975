use serde::{Deserialize, Serialize};

use crate::finance::state::{clamp_down_payment, FinanceState};
use crate::time_value::{compute_irr, compute_payback, DEFAULT_IRR_MAX_ITER, DEFAULT_IRR_TOLERANCE};
use crate::types::{round_half_up, Kwc, Money, Years};

/// Insurance base rate (€/kWc/yr), before inflation
pub const INSURANCE_EUR_PER_KWC: Money = 11.5;

/// Miscellaneous operating costs base rate (€/kWc/yr), before inflation
pub const MISC_EUR_PER_KWC: Money = 12.0;

/// IFER is only due on installations strictly above this power
pub const IFER_THRESHOLD_KWC: Kwc = 100.0;

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// Operating expenses of one year, each already inflated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearCharges {
    pub maintenance: Money,
    pub insurance: Money,
    pub misc: Money,
    /// Per-kWc IFER tax (zero at or below 100 kWc)
    pub ifer: Money,
    pub total_charges: Money,
}

/// One simulated year of the business plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearRow {
    /// Year label, 1-based
    pub year: u32,
    /// Self-consumption revenue
    pub ca_acc: Money,
    /// Export revenue
    pub ca_tb: Money,
    pub total_ca: Money,
    /// Export revenue had the whole production been exported
    pub ca_tb_only: Money,
    pub charges: YearCharges,
    /// Operating margin = total_ca - total_charges
    pub ebe: Money,
    /// Constant straight-line principal repayment
    pub amortissement: Money,
    /// Borrowed capital outstanding at the start of the year
    pub dach: Money,
    pub interets: Money,
    /// Result before interest = ebe - amortissement
    pub rbt: Money,
    /// Pre-tax result = rbt - interets
    pub rai: Money,
    /// Corporate income tax, never negative
    pub is: Money,
    pub resultat_net: Money,
    /// Loss carry-forward balance after this year
    pub deficit_balance: Money,
    /// ebe / (amortissement + interets), 0 when no debt service is due
    pub dscr: f64,
}

/// Running totals, one entry per year in processing order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CumulativeSeries {
    /// Cumulative total revenue (self-consumption included)
    pub ca_with_acc: Vec<Money>,
    /// Cumulative revenue of the all-export baseline
    pub ca_tb_only: Vec<Money>,
    pub ebe: Vec<Money>,
    /// Loss carry-forward balance; falls as it is consumed
    pub deficit: Vec<Money>,
    pub is: Vec<Money>,
    /// Total project cost, the payback threshold
    pub cost_line: Money,
}

/// Headline indicators, rounded for presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinanceKpis {
    /// Project IRR (%) over [-total_cost, ebe_1..ebe_N], 2 dp
    pub irr_pct: Option<f64>,
    /// Mean of the yearly DSCR, 2 dp
    pub avg_dscr: f64,
    /// Lowest DSCR among years with debt service, 2 dp
    pub min_dscr: f64,
    /// Payback on total revenue, 1 dp
    pub payback_years: Option<Years>,
    /// Payback had the whole production been exported, 1 dp
    pub payback_years_without_acc: Option<Years>,
    pub total_net_result: Money,
}

/// Complete business plan for one set of inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinanceModelResult {
    pub production_annual_kwh: f64,
    pub total_cost: Money,
    /// Down payment after clamping to the total cost
    pub down_payment: Money,
    /// Borrowed capital = total_cost - down_payment
    pub capital_emprunte: Money,
    pub kpis: FinanceKpis,
    pub series: Vec<YearRow>,
    pub cumulative: CumulativeSeries,
}

// ---------------------------------------------------------------------------
// Core computation
// ---------------------------------------------------------------------------

/// Compounding factor of an annual rate (%) after `years` years.
fn inflate(rate_pct: f64, years: u32) -> f64 {
    (1.0 + rate_pct / 100.0).powf(years as f64)
}

/// Accumulators scoped to a single model run.
struct RunningTotals {
    ca_with_acc: Money,
    ca_tb_only: Money,
    ebe: Money,
    deficit: Money,
    is: Money,
    cumulative: CumulativeSeries,
}

impl RunningTotals {
    fn new(years: usize, cost_line: Money) -> Self {
        RunningTotals {
            ca_with_acc: 0.0,
            ca_tb_only: 0.0,
            ebe: 0.0,
            deficit: 0.0,
            is: 0.0,
            cumulative: CumulativeSeries {
                ca_with_acc: Vec::with_capacity(years),
                ca_tb_only: Vec::with_capacity(years),
                ebe: Vec::with_capacity(years),
                deficit: Vec::with_capacity(years),
                is: Vec::with_capacity(years),
                cost_line,
            },
        }
    }

    /// Income tax for a pre-tax result, consuming or growing the
    /// carry-forward. Returns the tax due.
    fn levy_tax(&mut self, rai: Money, is_rate: f64) -> Money {
        if rai < 0.0 {
            self.deficit += -rai;
            0.0
        } else {
            let taxable = (rai - self.deficit).max(0.0);
            self.deficit -= self.deficit.min(rai);
            taxable * is_rate
        }
    }

    fn record(&mut self, row: &YearRow) {
        self.ca_with_acc += row.total_ca;
        self.ca_tb_only += row.ca_tb_only;
        self.ebe += row.ebe;
        self.is += row.is;

        self.cumulative.ca_with_acc.push(self.ca_with_acc);
        self.cumulative.ca_tb_only.push(self.ca_tb_only);
        self.cumulative.ebe.push(self.ebe);
        self.cumulative.deficit.push(self.deficit);
        self.cumulative.is.push(self.is);
    }
}

/// Build the N-year business plan of a solar canopy.
///
/// Pure and deterministic: identical inputs give bit-identical output. The
/// function never fails and validates nothing; see
/// [`analyze_finance_model`](crate::finance::analysis::analyze_finance_model)
/// for the checked entry point.
///
/// With `fiscal.duration_years == 0` the series are empty, both paybacks and
/// the IRR are `None`, and `avg_dscr` is NaN (mean of no years).
pub fn compute_finance_model(
    kwc: Kwc,
    productible_kwh_per_kwc: f64,
    state: &FinanceState,
) -> FinanceModelResult {
    let years = state.fiscal.duration_years;
    let production = kwc * productible_kwh_per_kwc;

    let total_cost = state.total_cost();
    let down_payment = clamp_down_payment(state.down_payment, total_cost);
    let capital_emprunte = total_cost - down_payment;

    let part_acc = state.part_acc_pct / 100.0;
    let interest_rate = state.interest_rate_pct / 100.0;
    let is_rate = state.fiscal.is_rate_pct / 100.0;
    let inflation = &state.inflation;

    let production_acc = production * part_acc;
    let production_tb = production - production_acc;

    let amortissement = capital_emprunte / years as f64;
    let ifer_base = if kwc > IFER_THRESHOLD_KWC {
        kwc * state.fiscal.ifer_eur_per_kwc
    } else {
        0.0
    };

    let mut totals = RunningTotals::new(years as usize, total_cost);
    let mut series: Vec<YearRow> = Vec::with_capacity(years as usize);

    for i in 0..years {
        // Revenue
        let tarif_tb = state.tarif_tb * inflate(inflation.tarif_tb, i);
        let tarif_acc = state.tarif_acc * inflate(inflation.tarif_acc, i);
        let ca_acc = production_acc * tarif_acc;
        let ca_tb = production_tb * tarif_tb;
        let total_ca = ca_acc + ca_tb;
        let ca_tb_only = production * tarif_tb;

        // Operating expenses
        let maintenance =
            kwc * state.maintenance_eur_per_kwc * inflate(inflation.maintenance, i);
        let insurance = kwc * INSURANCE_EUR_PER_KWC * inflate(inflation.insurance, i);
        let misc = kwc * MISC_EUR_PER_KWC * inflate(inflation.misc, i);
        let ifer = ifer_base * inflate(inflation.ifer, i);
        let total_charges = maintenance + insurance + misc + ifer;

        let ebe = total_ca - total_charges;

        // Financing
        let dach = capital_emprunte - amortissement * i as f64;
        let interets = dach * interest_rate;

        let rbt = ebe - amortissement;
        let rai = rbt - interets;
        let is = totals.levy_tax(rai, is_rate);
        let resultat_net = rai - is;

        let debt_service = amortissement + interets;
        let dscr = if debt_service == 0.0 {
            0.0
        } else {
            ebe / debt_service
        };

        let row = YearRow {
            year: i + 1,
            ca_acc,
            ca_tb,
            total_ca,
            ca_tb_only,
            charges: YearCharges {
                maintenance,
                insurance,
                misc,
                ifer,
                total_charges,
            },
            ebe,
            amortissement,
            dach,
            interets,
            rbt,
            rai,
            is,
            resultat_net,
            deficit_balance: totals.deficit,
            dscr,
        };
        totals.record(&row);
        series.push(row);
    }

    let kpis = assemble_kpis(total_cost, &series, &totals.cumulative);

    FinanceModelResult {
        production_annual_kwh: production,
        total_cost,
        down_payment,
        capital_emprunte,
        kpis,
        series,
        cumulative: totals.cumulative,
    }
}

/// Solve and round the headline indicators. Rounding happens here only.
fn assemble_kpis(
    total_cost: Money,
    series: &[YearRow],
    cumulative: &CumulativeSeries,
) -> FinanceKpis {
    let mut cash_flows: Vec<Money> = Vec::with_capacity(series.len() + 1);
    cash_flows.push(-total_cost);
    cash_flows.extend(series.iter().map(|r| r.ebe));

    let irr_pct = compute_irr(&cash_flows, DEFAULT_IRR_MAX_ITER, DEFAULT_IRR_TOLERANCE);

    let dscr_sum: f64 = series.iter().map(|r| r.dscr).sum();
    let avg_dscr = dscr_sum / series.len() as f64;

    let min_dscr = series
        .iter()
        .filter(|r| r.amortissement + r.interets != 0.0)
        .map(|r| r.dscr)
        .fold(None, |acc: Option<f64>, d| Some(acc.map_or(d, |m| m.min(d))))
        .unwrap_or(0.0);

    let payback_years = compute_payback(total_cost, &cumulative.ca_with_acc);
    let payback_years_without_acc = compute_payback(total_cost, &cumulative.ca_tb_only);

    FinanceKpis {
        irr_pct: irr_pct.map(|v| round_half_up(v, 2)),
        avg_dscr: round_half_up(avg_dscr, 2),
        min_dscr: round_half_up(min_dscr, 2),
        payback_years: payback_years.map(|v| round_half_up(v, 1)),
        payback_years_without_acc: payback_years_without_acc.map(|v| round_half_up(v, 1)),
        total_net_result: series.iter().map(|r| r.resultat_net).sum(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
