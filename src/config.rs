//! Environment based configuration.

use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use solana_sdk::pubkey::Pubkey;
use tracing::level_filters::LevelFilter;

use crate::models::account::Network;
use crate::providers::retry::RetryPolicy;

/// Where portfolio data comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    Rpc,
    /// Fixed offline portfolio
    Demo,
}

impl FromStr for DataSource {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rpc" => Ok(DataSource::Rpc),
            "demo" => Ok(DataSource::Demo),
            other => Err(anyhow::anyhow!("expected rpc or demo, got {}", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Network selected at startup
    pub network: Network,
    /// Explicit endpoints; networks not listed use their public URL
    pub rpc_urls: HashMap<Network, String>,
    /// Wallet connected at startup, if any
    pub wallet_address: Option<Pubkey>,
    pub retry: RetryPolicy,
    pub refresh_interval: Option<Duration>,
    pub source: DataSource,
    pub price_feed: bool,
    pub log_level: LevelFilter,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            network: Network::Devnet,
            rpc_urls: HashMap::new(),
            wallet_address: None,
            retry: RetryPolicy::default(),
            refresh_interval: None,
            source: DataSource::Rpc,
            price_feed: true,
            log_level: LevelFilter::INFO,
        }
    }
}

fn rpc_url_var(network: Network) -> String {
    format!(
        "SOLANA_RPC_URL_{}",
        network.moniker().to_ascii_uppercase().replace('-', "_")
    )
}

fn parse_var<T, F>(lookup: &F, key: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) if !value.trim().is_empty() => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| anyhow::anyhow!("Invalid {}={:?}: {}", key, value, e)),
        _ => Ok(None),
    }
}

fn parse_millis<F>(lookup: &F, key: &str) -> anyhow::Result<Option<Duration>>
where
    F: Fn(&str) -> Option<String>,
{
    Ok(parse_var::<u64, _>(lookup, key)?.map(Duration::from_millis))
}

fn parse_switch<F>(lookup: &F, key: &str) -> anyhow::Result<Option<bool>>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key).map(|v| v.trim().to_ascii_lowercase()) {
        None => Ok(None),
        Some(v) => match v.as_str() {
            "" => Ok(None),
            "1" | "on" | "true" | "yes" => Ok(Some(true)),
            "0" | "off" | "false" | "no" => Ok(Some(false)),
            _ => Err(anyhow::anyhow!("Invalid {}={:?}: expected on or off", key, v)),
        },
    }
}

impl DashboardConfig {
    /// Load from the process environment
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let network = parse_var(&lookup, "SOLANA_NETWORK")?.unwrap_or(defaults.network);

        let mut rpc_urls = HashMap::new();
        for candidate in Network::ALL {
            if let Some(url) = lookup(&rpc_url_var(candidate)).filter(|u| !u.trim().is_empty()) {
                rpc_urls.insert(candidate, url.trim().to_string());
            }
        }
        if let Some(url) = lookup("SOLANA_RPC_URL").filter(|u| !u.trim().is_empty()) {
            rpc_urls.insert(network, url.trim().to_string());
        }

        let retry = RetryPolicy {
            timeout: parse_millis(&lookup, "FETCH_TIMEOUT_MS")?.unwrap_or(defaults.retry.timeout),
            max_retries: parse_var(&lookup, "FETCH_MAX_RETRIES")?.unwrap_or(defaults.retry.max_retries),
            base_delay: parse_millis(&lookup, "FETCH_BACKOFF_BASE_MS")?.unwrap_or(defaults.retry.base_delay),
            max_delay: parse_millis(&lookup, "FETCH_BACKOFF_MAX_MS")?.unwrap_or(defaults.retry.max_delay),
        };
        if retry.timeout.is_zero() {
            anyhow::bail!("FETCH_TIMEOUT_MS must be greater than zero");
        }

        let refresh_interval = parse_millis(&lookup, "REFRESH_INTERVAL_MS")?.filter(|d| !d.is_zero());

        Ok(Self {
            network,
            rpc_urls,
            wallet_address: parse_var(&lookup, "WALLET_ADDRESS")?,
            retry,
            refresh_interval,
            source: parse_var(&lookup, "PORTFOLIO_SOURCE")?.unwrap_or(defaults.source),
            price_feed: parse_switch(&lookup, "PRICE_FEED")?.unwrap_or(defaults.price_feed),
            log_level: parse_var(&lookup, "LOG_LEVEL")?.unwrap_or(defaults.log_level),
        })
    }

    /// Endpoint for `network`, explicit or public
    pub fn rpc_url(&self, network: Network) -> &str {
        self.rpc_urls
            .get(&network)
            .map(String::as_str)
            .unwrap_or_else(|| network.default_rpc_url())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_environment() {
        let config = DashboardConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.network, Network::Devnet);
        assert_eq!(config.rpc_url(Network::Devnet), "https://api.devnet.solana.com");
        assert_eq!(config.wallet_address, None);
        assert_eq!(config.retry, RetryPolicy::default());
        assert_eq!(config.refresh_interval, None);
        assert_eq!(config.source, DataSource::Rpc);
        assert!(config.price_feed);
        assert_eq!(config.log_level, LevelFilter::INFO);
    }

    #[test]
    fn reads_overrides() {
        let wallet = Pubkey::new_unique().to_string();
        let config = DashboardConfig::from_lookup(lookup(&[
            ("SOLANA_NETWORK", "mainnet"),
            ("SOLANA_RPC_URL", "https://rpc.example.com"),
            ("SOLANA_RPC_URL_DEVNET", "http://devnet.local"),
            ("WALLET_ADDRESS", wallet.as_str()),
            ("FETCH_TIMEOUT_MS", "2500"),
            ("FETCH_MAX_RETRIES", "5"),
            ("REFRESH_INTERVAL_MS", "30000"),
            ("PORTFOLIO_SOURCE", "demo"),
            ("PRICE_FEED", "off"),
            ("LOG_LEVEL", "debug"),
        ]))
        .unwrap();

        assert_eq!(config.network, Network::MainnetBeta);
        assert_eq!(config.rpc_url(Network::MainnetBeta), "https://rpc.example.com");
        assert_eq!(config.rpc_url(Network::Devnet), "http://devnet.local");
        assert_eq!(config.wallet_address.map(|w| w.to_string()), Some(wallet));
        assert_eq!(config.retry.timeout, Duration::from_millis(2500));
        assert_eq!(config.retry.max_retries, 5);
        assert_eq!(config.refresh_interval, Some(Duration::from_secs(30)));
        assert_eq!(config.source, DataSource::Demo);
        assert!(!config.price_feed);
        assert_eq!(config.log_level, LevelFilter::DEBUG);
    }

    #[test]
    fn invalid_values_name_the_variable() {
        let err = DashboardConfig::from_lookup(lookup(&[("FETCH_MAX_RETRIES", "lots")])).unwrap_err();
        assert!(err.to_string().contains("FETCH_MAX_RETRIES"));

        let err = DashboardConfig::from_lookup(lookup(&[("WALLET_ADDRESS", "nope")])).unwrap_err();
        assert!(err.to_string().contains("WALLET_ADDRESS"));

        assert!(DashboardConfig::from_lookup(lookup(&[("FETCH_TIMEOUT_MS", "0")])).is_err());
    }
}
