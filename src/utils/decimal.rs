//! Decimal parsing and formatting helpers

use std::str::FromStr;

use rust_decimal::Decimal;

/// Why a token could not be read as a decimal
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DecimalParseError {
    #[error("not a number")]
    NotANumber,

    /// A well-formed number that `Decimal` cannot represent, e.g. `1e30`
    #[error("number outside the supported decimal range")]
    OutOfRange,
}

/// Parse a numeric token in plain (`12.5`) or scientific (`3.9e-05`) notation.
///
/// Magnitudes below the smallest representable decimal (`1e-40`) round to
/// zero; magnitudes above the largest (`1e30`) are [`DecimalParseError::OutOfRange`].
pub fn parse_decimal(token: &str) -> Result<Decimal, DecimalParseError> {
    let token = token.trim();
    if token.is_empty() {
        return Err(DecimalParseError::NotANumber);
    }

    Decimal::from_str(token)
        .or_else(|_| Decimal::from_scientific(token))
        .or_else(|_| match token.parse::<f64>() {
            Ok(value) if value.is_finite() && value.abs() < 1.0 => Ok(Decimal::ZERO),
            Ok(value) if value.is_finite() => Err(DecimalParseError::OutOfRange),
            _ => Err(DecimalParseError::NotANumber),
        })
}

/// Format a decimal without trailing zeros, e.g. `15.00` becomes `15`
pub fn format_decimal(value: Decimal) -> String {
    value.normalize().to_string()
}
