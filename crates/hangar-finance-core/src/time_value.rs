use crate::types::{Money, Years};

/// Iteration cap for the IRR solver
pub const DEFAULT_IRR_MAX_ITER: u32 = 200;

/// Step size below which the IRR solver considers itself converged
pub const DEFAULT_IRR_TOLERANCE: f64 = 1e-8;

const IRR_INITIAL_GUESS: f64 = 0.10;
const FLAT_DERIVATIVE: f64 = 1e-14;
const FLAT_DERIVATIVE_NUDGE: f64 = 0.01;

/// Net Present Value of a series of cash flows at a decimal rate (0.05 = 5%).
/// Index 0 is undiscounted.
pub fn npv(rate: f64, cash_flows: &[Money]) -> Money {
    let one_plus_r = 1.0 + rate;
    cash_flows
        .iter()
        .enumerate()
        .map(|(t, cf)| cf / one_plus_r.powf(t as f64))
        .sum()
}

/// NPV and its analytic first derivative with respect to the rate.
fn npv_and_derivative(rate: f64, cash_flows: &[Money]) -> (f64, f64) {
    let one_plus_r = 1.0 + rate;
    let mut npv_val = 0.0;
    let mut dnpv = 0.0;

    for (t, cf) in cash_flows.iter().enumerate() {
        let t_f = t as f64;
        npv_val += cf / one_plus_r.powf(t_f);
        if t > 0 {
            dnpv -= t_f * cf / one_plus_r.powf(t_f + 1.0);
        }
    }

    (npv_val, dnpv)
}

/// Internal Rate of Return using Newton-Raphson, as a percentage
/// (9.98 means 9.98% per period).
///
/// `cash_flows[0]` must be the initial outlay (strictly negative). Returns
/// `None` when there are fewer than two flows, when the first flow is not an
/// outflow, or when `max_iter` Newton steps do not bring the step size under
/// `tol`.
///
/// Starts from a 10% guess. A derivative flatter than `1e-14` nudges the rate
/// by +0.01 instead of dividing. Working rates at or below -99% restart from
/// -50%, rates above 1000% restart from 500%. With several sign changes the
/// root reached depends on this exact sequence of steps.
pub fn compute_irr(cash_flows: &[Money], max_iter: u32, tol: f64) -> Option<f64> {
    if cash_flows.len() < 2 {
        return None;
    }
    if cash_flows[0] >= 0.0 {
        return None;
    }

    let mut rate = IRR_INITIAL_GUESS;

    for _ in 0..max_iter {
        let (npv_val, dnpv) = npv_and_derivative(rate, cash_flows);

        if dnpv.abs() < FLAT_DERIVATIVE {
            rate += FLAT_DERIVATIVE_NUDGE;
            continue;
        }

        let next = rate - npv_val / dnpv;
        if (next - rate).abs() < tol {
            return Some(next * 100.0);
        }

        // Guard against divergence
        rate = if next <= -0.99 {
            -0.5
        } else if next > 10.0 {
            5.0
        } else {
            next
        };
    }

    None
}

/// [`compute_irr`] with the default iteration cap and tolerance.
pub fn irr(cash_flows: &[Money]) -> Option<f64> {
    compute_irr(cash_flows, DEFAULT_IRR_MAX_ITER, DEFAULT_IRR_TOLERANCE)
}

/// Years (possibly fractional) until `cumulative_revenue` first reaches
/// `total_cost`. `cumulative_revenue[i]` is the running total from year 1
/// through year `i + 1`.
///
/// Recovery inside year 1 yields `total_cost / cumulative_revenue[0]`. Later
/// years interpolate linearly inside the recovery year, except when the
/// series did not grow that year, in which case the bare index `i` is
/// returned. `None` when the cost is never recovered over the horizon.
pub fn compute_payback(total_cost: Money, cumulative_revenue: &[Money]) -> Option<Years> {
    let i = cumulative_revenue.iter().position(|c| *c >= total_cost)?;

    if i == 0 {
        return Some(total_cost / cumulative_revenue[0]);
    }

    let prev = cumulative_revenue[i - 1];
    let curr = cumulative_revenue[i];
    let delta = curr - prev;
    if delta <= 0.0 {
        return Some(i as f64);
    }

    Some(i as f64 + (total_cost - prev) / delta)
}
