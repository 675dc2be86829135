use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Argon2,
};
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::errors::{AppError, ValidationError};

pub fn hash_password(password: &str) -> Result<String, AppError> {
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &SaltString::generate(&mut OsRng))
        .map_err(|e| {
            log::error!("Failed to hash password: {}", e);
            AppError::Password(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

/// `1234567.891` -> `1,234,567.89`. The currency symbol is added by the caller.
pub fn format_money(value: Decimal) -> String {
    let mut rounded = value.round_dp(2);
    rounded.rescale(2);
    let fixed = rounded.abs().to_string();
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, frac_part)
}

/// Two fixed decimals, for plain numbers that are not money.
pub fn two_decimals(value: Decimal) -> String {
    let mut rounded = value.round_dp(2);
    rounded.rescale(2);
    rounded.to_string()
}

/// Share of negotiated units in percent; an empty group is 0%.
pub fn occupancy_rate(total: i64, negotiated: i64) -> f64 {
    if total > 0 {
        negotiated as f64 / total as f64 * 100.0
    } else {
        0.0
    }
}

pub fn parse_integer(field: &'static str, raw: &str) -> Result<i64, ValidationError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| ValidationError::NotANumber { field })
}

fn parse_non_negative(field: &'static str, raw: &str) -> Result<i64, ValidationError> {
    let value = parse_integer(field, raw)?;
    if value < 0 {
        return Err(ValidationError::Negative { field });
    }
    Ok(value)
}

pub fn parse_days(raw: &str) -> Result<i64, ValidationError> {
    parse_non_negative("Number of days", raw)
}

pub fn parse_year(raw: &str) -> Result<i32, ValidationError> {
    let year = parse_non_negative("Year", raw)?;
    i32::try_from(year).map_err(|_| ValidationError::NotANumber { field: "Year" })
}

pub fn parse_id(raw: &str) -> Result<i64, ValidationError> {
    parse_integer("ID", raw)
}

pub fn parse_salary(raw: &str) -> Result<Decimal, ValidationError> {
    let field = "Salary";
    let salary = Decimal::from_str(raw.trim()).map_err(|_| ValidationError::NotANumber { field })?;
    if salary.is_sign_negative() && !salary.is_zero() {
        return Err(ValidationError::Negative { field });
    }
    Ok(salary)
}

pub fn parse_date(field: &'static str, raw: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| ValidationError::InvalidDate { field })
}

pub fn require(field: &'static str, raw: &str) -> Result<String, ValidationError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    Ok(value.to_string())
}
