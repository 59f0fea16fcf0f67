use std::fmt;
use std::str::FromStr;

use solana_sdk::pubkey::Pubkey;

/// Solana cluster a wallet is connected to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Network {
    MainnetBeta,
    Devnet,
    Testnet,
    Localnet,
}

impl Network {
    pub const ALL: [Network; 4] = [
        Network::MainnetBeta,
        Network::Devnet,
        Network::Testnet,
        Network::Localnet,
    ];

    /// Human readable label shown next to the native balance
    pub fn label(&self) -> &'static str {
        match self {
            Network::MainnetBeta => "Mainnet Beta",
            Network::Devnet => "Devnet",
            Network::Testnet => "Testnet",
            Network::Localnet => "Localnet",
        }
    }

    /// Cluster moniker, also the suffix used for per-network env overrides
    pub fn moniker(&self) -> &'static str {
        match self {
            Network::MainnetBeta => "mainnet-beta",
            Network::Devnet => "devnet",
            Network::Testnet => "testnet",
            Network::Localnet => "localnet",
        }
    }

    /// Public RPC endpoint used when no override is configured
    pub fn default_rpc_url(&self) -> &'static str {
        match self {
            Network::MainnetBeta => "https://api.mainnet-beta.solana.com",
            Network::Devnet => "https://api.devnet.solana.com",
            Network::Testnet => "https://api.testnet.solana.com",
            Network::Localnet => "http://127.0.0.1:8899",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.moniker())
    }
}

impl FromStr for Network {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mainnet-beta" | "mainnet" => Ok(Network::MainnetBeta),
            "devnet" => Ok(Network::Devnet),
            "testnet" => Ok(Network::Testnet),
            "localnet" | "localhost" => Ok(Network::Localnet),
            other => Err(anyhow::anyhow!("Unknown network: {}", other)),
        }
    }
}

/// The (wallet, network) pair that scopes one portfolio view.
///
/// Two refs are the same identity only when both halves match, so switching
/// the network for the same wallet starts a new fetch cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AccountRef {
    pub address: Pubkey,
    pub network: Network,
}

impl AccountRef {
    pub fn new(address: Pubkey, network: Network) -> Self {
        Self { address, network }
    }
}

impl fmt::Display for AccountRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.address, self.network)
    }
}
