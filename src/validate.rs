// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Input checks applied before anything reaches storage or the accrual math.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use thiserror::Error;

pub const MAX_PRINCIPAL: i64 = 10_000_000_000;
pub const MAX_RATE: i64 = 1000;
pub const MAX_CUSTOMER_NAME: usize = 120;
pub const MAX_NOTES: usize = 4000;
pub const MAX_EMAIL: usize = 255;

static DATE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid amount '{0}'")]
    NotANumber(String),
    #[error("Principal must be greater than zero")]
    PrincipalNotPositive,
    #[error("Principal must not exceed 10000000000")]
    PrincipalTooLarge,
    #[error("{field} must be between 0 and 1000")]
    RateOutOfRange { field: &'static str },
    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    BadDate(String),
    #[error("Customer name must be between 1 and 120 characters")]
    CustomerName,
    #[error("Notes must be at most 4000 characters")]
    NotesTooLong,
    #[error("Name must be between 2 and 80 characters")]
    UserName,
    #[error("Invalid email '{0}'")]
    Email(String),
}

pub fn principal(raw: &str) -> Result<Decimal, ValidationError> {
    let raw = raw.trim();
    let value = raw
        .parse::<Decimal>()
        .map_err(|_| ValidationError::NotANumber(raw.to_string()))?;
    if value <= Decimal::ZERO {
        return Err(ValidationError::PrincipalNotPositive);
    }
    if value > Decimal::from(MAX_PRINCIPAL) {
        return Err(ValidationError::PrincipalTooLarge);
    }
    Ok(value)
}

/// A percentage in `[0, 1000]`. `field` names the rate in the error message.
pub fn rate(field: &'static str, raw: &str) -> Result<Decimal, ValidationError> {
    let raw = raw.trim();
    let value = raw
        .parse::<Decimal>()
        .map_err(|_| ValidationError::NotANumber(raw.to_string()))?;
    if value < Decimal::ZERO || value > Decimal::from(MAX_RATE) {
        return Err(ValidationError::RateOutOfRange { field });
    }
    Ok(value)
}

pub fn start_date(raw: &str) -> Result<NaiveDate, ValidationError> {
    let raw = raw.trim();
    if !DATE_RE.is_match(raw) {
        return Err(ValidationError::BadDate(raw.to_string()));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| ValidationError::BadDate(raw.to_string()))
}

pub fn customer_name(raw: &str) -> Result<String, ValidationError> {
    let name = raw.trim();
    let len = name.chars().count();
    if len == 0 || len > MAX_CUSTOMER_NAME {
        return Err(ValidationError::CustomerName);
    }
    Ok(name.to_string())
}

pub fn notes(raw: &str) -> Result<String, ValidationError> {
    if raw.chars().count() > MAX_NOTES {
        return Err(ValidationError::NotesTooLong);
    }
    Ok(raw.to_string())
}

pub fn user_name(raw: &str) -> Result<String, ValidationError> {
    let name = raw.trim();
    let len = name.chars().count();
    if !(2..=80).contains(&len) {
        return Err(ValidationError::UserName);
    }
    Ok(name.to_string())
}

/// Trimmed and lowercased.
pub fn email(raw: &str) -> Result<String, ValidationError> {
    let email = raw.trim().to_lowercase();
    if email.len() > MAX_EMAIL || !EMAIL_RE.is_match(&email) {
        return Err(ValidationError::Email(raw.trim().to_string()));
    }
    Ok(email)
}
