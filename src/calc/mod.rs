//! Compound interest with recurring deposits.
//!
//! Every year's balance is computed directly from the principal using the
//! number of elapsed capitalization periods, not chained from the previous
//! year.

pub mod validate;

use serde::Serialize;
use thiserror::Error;

pub use validate::{validate, RawInputs, ValidationError};

/// Most years a balance series may cover
pub const MAX_YEARS: u32 = 10_000;

/// A valid form whose series cannot be built
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CalcError {
    #[error("A duration of {years} years is too long, the chart covers at most {max} years.")]
    TooManyYears { years: u32, max: u32 },
    #[error("Not enough memory for {years} yearly balances.")]
    OutOfMemory { years: u32 },
}

/// Validated calculator inputs
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FormInputs {
    pub initial_balance: f64,
    pub deposit: f64,             // Added every capitalization period
    pub rate: f64,                // Annual rate as a fraction (5% = 0.05)
    pub periods_per_year: u32,    // Capitalization frequency
    pub years: u32,
}

impl FormInputs {
    /// Periodic rate (r_n)
    pub fn periodic_rate(&self) -> f64 {
        self.rate / self.periods_per_year as f64
    }
}

/// End-of-year balances, index 0 is the initial balance
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct BalanceSeries(Vec<f64>);

impl BalanceSeries {
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn final_balance(&self) -> f64 {
        self.0.last().copied().unwrap_or_default()
    }

    /// Largest finite balance, used to size the y axis
    pub fn max_finite(&self) -> f64 {
        self.0
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(0.0, f64::max)
    }

    /// False when the formula overflowed somewhere in the series
    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|v| v.is_finite())
    }
}

/// Compute the yearly balance series.
///
/// A zero periodic rate uses the limit of the deposit term (`deposit * periods`)
/// instead of dividing by zero. Overflow is left as is and shows up as
/// non-finite balances. Durations above [`MAX_YEARS`] are refused.
pub fn balance_series(inputs: &FormInputs) -> Result<BalanceSeries, CalcError> {
    if inputs.years > MAX_YEARS {
        return Err(CalcError::TooManyYears {
            years: inputs.years,
            max: MAX_YEARS,
        });
    }

    let r_n = inputs.periodic_rate();
    let n = inputs.periods_per_year as f64;

    let mut balances = Vec::new();
    balances
        .try_reserve_exact(inputs.years as usize + 1)
        .map_err(|_| CalcError::OutOfMemory { years: inputs.years })?;
    balances.push(inputs.initial_balance);

    for year in 1..=inputs.years {
        let periods = n * year as f64;
        let growth = (1.0 + r_n).powf(periods);
        let deposits = if r_n == 0.0 {
            inputs.deposit * periods
        } else {
            inputs.deposit * ((growth - 1.0) / r_n)
        };
        balances.push(inputs.initial_balance * growth + deposits);
    }

    let series = BalanceSeries(balances);
    if !series.is_finite() {
        tracing::warn!(
            years = inputs.years,
            rate = inputs.rate,
            "Balance series overflowed to a non-finite value"
        );
    }
    Ok(series)
}
