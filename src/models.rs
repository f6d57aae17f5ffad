// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Result, anyhow};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: i64,
    pub name: String,
    pub notes: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InterestType {
    Simple,
    Compound,
}

impl InterestType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InterestType::Simple => "SIMPLE",
            InterestType::Compound => "COMPOUND",
        }
    }
}

impl fmt::Display for InterestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InterestType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SIMPLE" => Ok(InterestType::Simple),
            "COMPOUND" => Ok(InterestType::Compound),
            other => Err(anyhow!("Unknown interest type '{}' (use simple|compound)", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LoanStatus {
    Active,
    Paid,
    Defaulted,
}

impl LoanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::Active => "ACTIVE",
            LoanStatus::Paid => "PAID",
            LoanStatus::Defaulted => "DEFAULTED",
        }
    }
}

impl fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LoanStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ACTIVE" => Ok(LoanStatus::Active),
            "PAID" => Ok(LoanStatus::Paid),
            "DEFAULTED" => Ok(LoanStatus::Defaulted),
            other => Err(anyhow!(
                "Unknown loan status '{}' (use active|paid|defaulted)",
                other
            )),
        }
    }
}

/// A pair of percentages: the one-off origination markup and the rate
/// charged per 30-day cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rates {
    pub initial: Decimal,
    pub monthly: Decimal,
}

impl Rates {
    pub fn new(initial: Decimal, monthly: Decimal) -> Self {
        Self { initial, monthly }
    }
}

/// Where a loan takes its rates from at calculation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum RateSource {
    /// Follow the owner's global settings, whatever they are when the loan is read.
    Global,
    Custom(Rates),
}

impl RateSource {
    pub fn is_fixed(&self) -> bool {
        matches!(self, RateSource::Global)
    }

    pub fn label(&self) -> &'static str {
        match self {
            RateSource::Global => "global",
            RateSource::Custom(_) => "custom",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Loan {
    pub id: i64,
    pub customer_id: i64,
    pub principal: Decimal,
    pub rate_source: RateSource,
    pub start_date: NaiveDate,
    pub interest_type: InterestType,
    pub status: LoanStatus,
    pub notes: String,
}

/// Per-user rate settings. `global_compound_monthly` is kept for display only;
/// each loan carries its own interest type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateConfig {
    pub global_initial_interest_rate: Decimal,
    pub global_interest_rate: Decimal,
    pub global_compound_monthly: bool,
}

impl RateConfig {
    pub fn rates(&self) -> Rates {
        Rates::new(self.global_initial_interest_rate, self.global_interest_rate)
    }
}

impl Default for RateConfig {
    fn default() -> Self {
        Self {
            global_initial_interest_rate: Decimal::from(50),
            global_interest_rate: Decimal::from(30),
            global_compound_monthly: true,
        }
    }
}
