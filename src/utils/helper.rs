use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;

/// Parse a pubkey from string, with better error messages
pub fn parse_pubkey(s: &str) -> anyhow::Result<Pubkey> {
    Pubkey::from_str(s.trim()).map_err(|e| anyhow::anyhow!("Invalid pubkey {}: {}", s, e))
}

/// Shorten an address for display: first 8 and last 8 characters
pub fn short_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 16 {
        return address.to_string();
    }
    let head: String = chars[..8].iter().collect();
    let tail: String = chars[chars.len() - 8..].iter().collect();
    format!("{}...{}", head, tail)
}

/// Format a pubkey for display (truncated)
pub fn format_pubkey(pubkey: &Pubkey) -> String {
    short_address(&pubkey.to_string())
}
