//! Address and number formatting helpers

pub mod format;
pub mod helper;

pub use format::{format_native_balance, format_token_amount, format_total_value, format_usd, symbol_label};
pub use helper::{format_pubkey, parse_pubkey, short_address};
