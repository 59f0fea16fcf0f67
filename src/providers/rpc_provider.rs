use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use solana_account_decoder_client_types::token::UiTokenAccount;
use solana_account_decoder_client_types::UiAccountData;
use solana_client::client_error::ClientError;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_request::TokenAccountsFilter;
use solana_commitment_config::{CommitmentConfig, CommitmentLevel};
use solana_sdk::pubkey::Pubkey;
use tracing::{debug, info, warn};

use crate::error::FetchError;
use crate::models::account::{AccountRef, Network};
use crate::models::token::TokenHolding;
use crate::providers::token_registry;
use crate::traits::data_provider::PortfolioDataProvider;

pub const TOKEN_PROGRAM_ID: Pubkey = Pubkey::from_str_const("TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA");
pub const TOKEN_2022_PROGRAM_ID: Pubkey = Pubkey::from_str_const("TokenzQdBNbLqP5VEhdkAS6EPFLC1PHnBqCXEpPxuEb");

/// JSON-RPC backed data provider, one client per network
pub struct RpcDataProvider {
    endpoints: HashMap<Network, String>,
    clients: DashMap<Network, Arc<RpcClient>>,
    commitment: CommitmentConfig,
}

impl RpcDataProvider {
    /// Create a provider; networks missing from `endpoints` use their public URL
    pub fn new(endpoints: HashMap<Network, String>) -> Self {
        Self {
            endpoints,
            clients: DashMap::new(),
            commitment: CommitmentConfig {
                commitment: CommitmentLevel::Confirmed,
            },
        }
    }

    /// Endpoint used for `network`
    pub fn rpc_url(&self, network: Network) -> &str {
        self.endpoints
            .get(&network)
            .map(String::as_str)
            .unwrap_or_else(|| network.default_rpc_url())
    }

    fn client(&self, network: Network) -> Arc<RpcClient> {
        self.clients
            .entry(network)
            .or_insert_with(|| {
                let url = self.rpc_url(network).to_string();
                info!("Opening RPC client for {}: {}", network, url);
                Arc::new(RpcClient::new_with_commitment(url, self.commitment))
            })
            .clone()
    }
}

fn transport_error(account: &AccountRef, err: ClientError) -> FetchError {
    warn!("RPC request for {} failed: {}", account, err);
    FetchError::Transport(err.to_string())
}

/// Decode one jsonParsed token account. Empty accounts yield `None`.
pub(crate) fn parse_token_account(data: &UiAccountData) -> Result<Option<TokenHolding>, FetchError> {
    let UiAccountData::Json(parsed_account) = data else {
        return Err(FetchError::Data("token account was not returned as jsonParsed".into()));
    };

    let info = parsed_account
        .parsed
        .get("info")
        .ok_or_else(|| FetchError::Data("token account has no info section".into()))?;

    let token_data = serde_json::from_value::<UiTokenAccount>(info.clone())
        .map_err(|e| FetchError::Data(format!("invalid token account: {}", e)))?;

    let token_amount = token_data.token_amount;
    let raw_amount = token_amount
        .amount
        .parse::<u64>()
        .map_err(|e| FetchError::Data(format!("invalid token amount {:?}: {}", token_amount.amount, e)))?;

    if raw_amount == 0 {
        return Ok(None);
    }

    let mint: Pubkey = token_data
        .mint
        .parse()
        .map_err(|e| FetchError::Data(format!("invalid mint {}: {}", token_data.mint, e)))?;

    Ok(Some(TokenHolding::new(
        mint,
        raw_amount,
        token_amount.decimals,
        token_registry::symbol_for(&mint),
    )))
}

#[async_trait]
impl PortfolioDataProvider for RpcDataProvider {
    async fn fetch_native_balance(&self, account: &AccountRef) -> Result<u64, FetchError> {
        let client = self.client(account.network);
        client
            .get_balance(&account.address)
            .await
            .map_err(|e| transport_error(account, e))
    }

    async fn fetch_token_holdings(&self, account: &AccountRef) -> Result<Vec<TokenHolding>, FetchError> {
        let client = self.client(account.network);
        let mut holdings = Vec::new();

        // SPL Token accounts first, then Token-2022, each in RPC order
        for program_id in [TOKEN_PROGRAM_ID, TOKEN_2022_PROGRAM_ID] {
            let accounts = client
                .get_token_accounts_by_owner(&account.address, TokenAccountsFilter::ProgramId(program_id))
                .await
                .map_err(|e| transport_error(account, e))?;

            debug!("{} token accounts under program {}", accounts.len(), program_id);

            for keyed_account in accounts {
                match parse_token_account(&keyed_account.account.data) {
                    Ok(Some(holding)) => holdings.push(holding),
                    Ok(None) => {}
                    Err(e) => {
                        warn!("Token account {} is malformed: {}", keyed_account.pubkey, e);
                        return Err(e);
                    }
                }
            }
        }

        info!("Found {} tokens with non-zero balance for {}", holdings.len(), account);
        Ok(holdings)
    }
}
