//! Display formatting for the presentation layer. Renderers call these
//! instead of formatting numbers themselves.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::token::UNKNOWN_SYMBOL;
use crate::tracker::normalizer::native_display_amount;

const NATIVE_DISPLAY_DECIMALS: u32 = 4;
const TOKEN_MIN_FRACTION_DIGITS: u32 = 2;
const TOKEN_MAX_FRACTION_DIGITS: u32 = 6;

/// Lamports as SOL with exactly 4 decimals, e.g. `2.5000`
pub fn format_native_balance(lamports: u64) -> String {
    format_fixed(native_display_amount(lamports), NATIVE_DISPLAY_DECIMALS)
}

/// en-US grouped amount with 2 to 6 fraction digits, e.g. `1,234.50`
pub fn format_token_amount(amount: Decimal) -> String {
    let mut rounded = amount
        .round_dp_with_strategy(TOKEN_MAX_FRACTION_DIGITS, RoundingStrategy::MidpointAwayFromZero)
        .normalize();
    if rounded.scale() < TOKEN_MIN_FRACTION_DIGITS {
        rounded.rescale(TOKEN_MIN_FRACTION_DIGITS);
    }
    group_thousands(&rounded.to_string())
}

/// Unpriced same-unit total with 2 decimals
pub fn format_total_value(total: Decimal) -> String {
    format_fixed(total, 2)
}

/// USD amount, e.g. `$1,234.56`
pub fn format_usd(value: Decimal) -> String {
    let formatted = group_thousands(&format_fixed(value.abs(), 2));
    if value.is_sign_negative() && !value.is_zero() {
        format!("-${}", formatted)
    } else {
        format!("${}", formatted)
    }
}

pub fn symbol_label(symbol: Option<&str>) -> &str {
    symbol.unwrap_or(UNKNOWN_SYMBOL)
}

fn format_fixed(value: Decimal, decimals: u32) -> String {
    let mut rounded = value.round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(decimals);
    rounded.to_string()
}

fn group_thousands(number: &str) -> String {
    let (sign, digits) = match number.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", number),
    };
    let (integer, fraction) = match digits.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (digits, None),
    };

    let mut grouped = String::with_capacity(number.len() + integer.len() / 3);
    grouped.push_str(sign);
    for (i, c) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if let Some(fraction) = fraction {
        grouped.push('.');
        grouped.push_str(fraction);
    }
    grouped
}
