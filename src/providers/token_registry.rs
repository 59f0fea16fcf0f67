//! Well-known mainnet mints and their tickers.

use rust_decimal::Decimal;
use solana_sdk::pubkey::Pubkey;

pub const USDC_MINT: Pubkey = Pubkey::from_str_const("EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v");
pub const USDT_MINT: Pubkey = Pubkey::from_str_const("Es9vMFrzaCERmJfrF4H2FYD4KCoNkY11McCe8BenwNYB");
pub const BONK_MINT: Pubkey = Pubkey::from_str_const("DezXAZ8z7PnrnRJjz3wXBoRgixCa6xjnB7YaB1pPB263");
pub const WSOL_MINT: Pubkey = Pubkey::from_str_const("So11111111111111111111111111111111111111112");
pub const JUP_MINT: Pubkey = Pubkey::from_str_const("JUPyiwrYJFskUPiHa7hkeR8VUtAeFoSYbKedZNsDvCN");

pub struct KnownToken {
    pub mint: Pubkey,
    pub symbol: &'static str,
    /// Placeholder USD price, `None` when there is no sensible constant
    pub reference_price: Option<Decimal>,
}

pub static KNOWN_TOKENS: &[KnownToken] = &[
    KnownToken {
        mint: USDC_MINT,
        symbol: "USDC",
        reference_price: Some(Decimal::ONE),
    },
    KnownToken {
        mint: USDT_MINT,
        symbol: "USDT",
        reference_price: Some(Decimal::ONE),
    },
    KnownToken {
        mint: BONK_MINT,
        symbol: "BONK",
        reference_price: Some(Decimal::from_parts(2, 0, 0, false, 4)),
    },
    KnownToken {
        mint: WSOL_MINT,
        symbol: "wSOL",
        reference_price: Some(Decimal::ONE_HUNDRED),
    },
    KnownToken {
        mint: JUP_MINT,
        symbol: "JUP",
        reference_price: None,
    },
];

pub fn lookup(mint: &Pubkey) -> Option<&'static KnownToken> {
    KNOWN_TOKENS.iter().find(|token| token.mint == *mint)
}

pub fn symbol_for(mint: &Pubkey) -> Option<String> {
    lookup(mint).map(|token| token.symbol.to_string())
}
