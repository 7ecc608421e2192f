//! Parsing and formatting of token amounts.

use thiserror::Error;

use crate::types::Balance;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("Enter an amount")]
    Empty,

    #[error("'{0}' is not a number")]
    Invalid(String),

    #[error("At most {0} decimal places")]
    TooManyDecimals(u8),

    #[error("Amount is too large")]
    Overflow,

    #[error("Amount must be greater than zero")]
    Zero,

    #[error("Minimum deposit is {0}")]
    BelowMinimum(String),

    #[error("Maximum deposit is {0}")]
    AboveMaximum(String),
}

/// Parse a decimal amount such as `"1.25"` into base units.
pub fn parse_amount(text: &str, decimals: u8) -> Result<Balance, AmountError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(AmountError::Empty);
    }

    let (whole, frac) = match text.split_once('.') {
        Some((whole, frac)) => (whole, frac),
        None => (text, ""),
    };
    if whole.is_empty() && frac.is_empty() {
        return Err(AmountError::Invalid(text.to_string()));
    }
    let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if !all_digits(whole) || !all_digits(frac) {
        return Err(AmountError::Invalid(text.to_string()));
    }

    let frac = frac.trim_end_matches('0');
    if frac.len() > decimals as usize {
        return Err(AmountError::TooManyDecimals(decimals));
    }

    let scale = 10u128
        .checked_pow(decimals as u32)
        .ok_or(AmountError::Overflow)?;
    let whole_units = if whole.is_empty() {
        0
    } else {
        whole
            .parse::<u128>()
            .map_err(|_| AmountError::Overflow)?
            .checked_mul(scale)
            .ok_or(AmountError::Overflow)?
    };
    let frac_units = if frac.is_empty() {
        0
    } else {
        let padding = 10u128.pow((decimals as usize - frac.len()) as u32);
        frac.parse::<u128>().map_err(|_| AmountError::Overflow)? * padding
    };

    let value = whole_units
        .checked_add(frac_units)
        .ok_or(AmountError::Overflow)?;
    if value == 0 {
        return Err(AmountError::Zero);
    }
    Ok(value)
}

/// Format base units as a decimal string, keeping at most `max_frac`
/// fractional digits and dropping trailing zeros.
pub fn format_amount(value: Balance, decimals: u8, max_frac: usize) -> String {
    let scale = 10u128.pow(decimals as u32);
    let whole = value / scale;
    let frac = value % scale;

    let mut frac_str = format!("{:0width$}", frac, width = decimals as usize);
    frac_str.truncate(max_frac.min(decimals as usize));
    let frac_str = frac_str.trim_end_matches('0');

    if frac_str.is_empty() {
        whole.to_string()
    } else {
        format!("{}.{}", whole, frac_str)
    }
}

/// Check an amount against optional deposit bounds.
pub fn check_bounds(
    value: Balance,
    decimals: u8,
    min: Option<Balance>,
    max: Option<Balance>,
) -> Result<(), AmountError> {
    if let Some(min) = min
        && value < min
    {
        return Err(AmountError::BelowMinimum(format_amount(min, decimals, 8)));
    }
    if let Some(max) = max
        && value > max
    {
        return Err(AmountError::AboveMaximum(format_amount(max, decimals, 8)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_whole() {
        assert_eq!(parse_amount("2", 6), Ok(2_000_000));
    }

    #[test]
    fn test_parse_fraction() {
        assert_eq!(parse_amount("1.25", 18), Ok(1_250_000_000_000_000_000));
        assert_eq!(parse_amount(".5", 6), Ok(500_000));
        assert_eq!(parse_amount("3.", 2), Ok(300));
    }

    #[test]
    fn test_parse_trailing_zeros_do_not_count_as_decimals() {
        assert_eq!(parse_amount("1.100000", 2), Ok(110));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_amount("", 18), Err(AmountError::Empty));
        assert_eq!(parse_amount(".", 18), Err(AmountError::Invalid(".".to_string())));
        assert_eq!(
            parse_amount("1,5", 18),
            Err(AmountError::Invalid("1,5".to_string()))
        );
        assert_eq!(
            parse_amount("-1", 18),
            Err(AmountError::Invalid("-1".to_string()))
        );
    }

    #[test]
    fn test_parse_rejects_zero_and_precision() {
        assert_eq!(parse_amount("0.000", 18), Err(AmountError::Zero));
        assert_eq!(parse_amount("0.0000001", 6), Err(AmountError::TooManyDecimals(6)));
    }

    #[test]
    fn test_parse_overflow() {
        let huge = "9".repeat(40);
        assert_eq!(parse_amount(&huge, 18), Err(AmountError::Overflow));
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(1_250_000, 6, 6), "1.25");
        assert_eq!(format_amount(1_000_000, 6, 6), "1");
        assert_eq!(format_amount(123_456_789, 6, 2), "123.45");
        assert_eq!(format_amount(5, 18, 4), "0");
    }

    #[test]
    fn test_check_bounds() {
        assert_eq!(check_bounds(50, 0, Some(10), Some(100)), Ok(()));
        assert_eq!(
            check_bounds(5, 0, Some(10), None),
            Err(AmountError::BelowMinimum("10".to_string()))
        );
        assert_eq!(
            check_bounds(500, 0, None, Some(100)),
            Err(AmountError::AboveMaximum("100".to_string()))
        );
    }
}
