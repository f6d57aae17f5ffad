// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Interest accrual for a single loan and the dashboard totals built from it.
//!
//! A loan owes its principal plus a one-off origination markup from day zero.
//! Every full 30-day cycle after that adds the monthly rate on top of that
//! base debt, linearly for simple loans and geometrically for compound ones.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{InterestType, Loan, LoanStatus, RateSource, Rates};

pub const CYCLE_DAYS: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AccrualResult {
    pub total_amount: Decimal,
    pub interest_accrued: Decimal,
    pub months_elapsed: i64,
    pub effective_initial_rate: Decimal,
    pub effective_monthly_rate: Decimal,
}

/// Rates actually applied to `loan`, given the owner's current global rates.
pub fn effective_rates(loan: &Loan, global: Rates) -> Rates {
    match loan.rate_source {
        RateSource::Global => global,
        RateSource::Custom(rates) => rates,
    }
}

/// Whole days from `start` to `as_of`, never negative.
pub fn elapsed_days(start: NaiveDate, as_of: NaiveDate) -> i64 {
    (as_of - start).num_days().max(0)
}

/// Accrual as of today's UTC date.
pub fn compute_accrual(loan: &Loan, global: Rates) -> AccrualResult {
    compute_accrual_as_of(loan, global, Utc::now().date_naive())
}

pub fn compute_accrual_as_of(loan: &Loan, global: Rates, as_of: NaiveDate) -> AccrualResult {
    let rates = effective_rates(loan, global);
    let hundred = Decimal::ONE_HUNDRED;

    let principal = loan.principal;
    let base_debt = principal + principal * (rates.initial / hundred);
    let cycles = elapsed_days(loan.start_date, as_of) / CYCLE_DAYS;

    let total_amount = if cycles == 0 {
        base_debt
    } else {
        let monthly = rates.monthly / hundred;
        match loan.interest_type {
            InterestType::Simple => Decimal::from(cycles)
                .checked_mul(monthly)
                .and_then(|growth| base_debt.checked_mul(Decimal::ONE + growth))
                .unwrap_or(Decimal::MAX),
            InterestType::Compound => compound(base_debt, Decimal::ONE + monthly, cycles),
        }
    };

    AccrualResult {
        total_amount,
        interest_accrued: total_amount - principal,
        months_elapsed: cycles,
        effective_initial_rate: rates.initial,
        effective_monthly_rate: rates.monthly,
    }
}

// base * factor^cycles, saturating at Decimal::MAX
fn compound(base: Decimal, factor: Decimal, cycles: i64) -> Decimal {
    let mut total = base;
    for _ in 0..cycles {
        match total.checked_mul(factor) {
            Some(next) => total = next,
            None => return Decimal::MAX,
        }
        if factor == Decimal::ONE {
            break;
        }
    }
    total
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PortfolioTotals {
    pub active_loans: usize,
    pub total_principal: Decimal,
    pub total_interest: Decimal,
    pub total_value: Decimal,
}

/// Fold the accrual of every active loan into dashboard totals.
pub fn summarize<'a, I>(loans: I, global: Rates, as_of: NaiveDate) -> PortfolioTotals
where
    I: IntoIterator<Item = &'a Loan>,
{
    loans
        .into_iter()
        .filter(|loan| loan.status == LoanStatus::Active)
        .fold(PortfolioTotals::default(), |mut acc, loan| {
            let calc = compute_accrual_as_of(loan, global, as_of);
            acc.active_loans += 1;
            acc.total_principal += loan.principal;
            acc.total_interest = acc.total_interest.saturating_add(calc.interest_accrued);
            acc.total_value = acc.total_value.saturating_add(calc.total_amount);
            acc
        })
}
