//! Mock chain server for local testing of the bundle system.
//!
//! This provides a JSON-RPC server that simulates on-chain state
//! management for the bundle module without requiring a real blockchain.
//! The chain starts with the fee-to setter account `ad`.

use anyhow::Result;
use jsonrpsee::core::async_trait;
use jsonrpsee::proc_macros::rpc;
use jsonrpsee::server::Server;
use jsonrpsee::types::ErrorObjectOwned;
use parking_lot::RwLock;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

use bundle_module::{BundleCall, BundleConfig, BundleQuery, BundleQueryResponse, BundleSummary};
use bundle_types::{AssetKind, BundleEvent};
use mock_chain::Chain;

mod types;
use types::*;

/// RPC API definition for the mock chain.
#[rpc(server)]
pub trait MockChainApi {
    // ============ Admin Methods ============

    /// Advance the chain by one block.
    #[method(name = "admin_advanceBlock")]
    async fn admin_advance_block(&self) -> Result<BlockInfo, ErrorObjectOwned>;

    /// Set the current timestamp (for testing time-dependent logic).
    #[method(name = "admin_setTimestamp")]
    async fn admin_set_timestamp(&self, timestamp: u64) -> Result<bool, ErrorObjectOwned>;

    /// Credit native currency to an account.
    #[method(name = "admin_fund")]
    async fn admin_fund(&self, address: String, amount: u128) -> Result<bool, ErrorObjectOwned>;

    /// Deploy an asset contract ("single" or "multi").
    #[method(name = "admin_createAssetContract")]
    async fn admin_create_asset_contract(
        &self,
        address: String,
        kind: String,
    ) -> Result<bool, ErrorObjectOwned>;

    /// Mint a token into an account. `amount` is ignored for single-unit
    /// contracts.
    #[method(name = "admin_mintAsset")]
    async fn admin_mint_asset(
        &self,
        contract: String,
        token_id: u128,
        to: String,
        amount: u128,
    ) -> Result<bool, ErrorObjectOwned>;

    /// Approve or revoke an operator for an owner's assets.
    #[method(name = "admin_setAssetOperator")]
    async fn admin_set_asset_operator(
        &self,
        contract: String,
        owner: String,
        operator: String,
        approved: bool,
    ) -> Result<bool, ErrorObjectOwned>;

    // ============ Registry Methods ============

    /// Create a new bundle and return its address.
    #[method(name = "registry_createBundle")]
    async fn registry_create_bundle(
        &self,
        params: CreateBundleParams,
    ) -> Result<String, ErrorObjectOwned>;

    /// Set the protocol fee recipient. Only the fee-to setter may call.
    #[method(name = "registry_setFeeTo")]
    async fn registry_set_fee_to(
        &self,
        sender: String,
        fee_to: Option<String>,
    ) -> Result<bool, ErrorObjectOwned>;

    /// List all bundles with their ledger snapshots.
    #[method(name = "registry_listBundles")]
    async fn registry_list_bundles(&self) -> Result<Vec<BundleSummaryRpc>, ErrorObjectOwned>;

    // ============ Bundle Methods ============

    /// Escrow assets into a bundle. Returns the new item count.
    #[method(name = "bundle_deposit")]
    async fn bundle_deposit(&self, params: DepositParams) -> Result<u64, ErrorObjectOwned>;

    /// Mint the claim token and open the auctions.
    #[method(name = "bundle_issue")]
    async fn bundle_issue(&self, sender: String, bundle: String) -> Result<bool, ErrorObjectOwned>;

    /// Abandon an inactive bundle, returning all escrow to `to`.
    #[method(name = "bundle_refund")]
    async fn bundle_refund(
        &self,
        sender: String,
        bundle: String,
        to: String,
    ) -> Result<bool, ErrorObjectOwned>;

    /// Place a bid of `amount` native currency on an item.
    #[method(name = "bundle_bid")]
    async fn bundle_bid(
        &self,
        sender: String,
        bundle: String,
        index: u64,
        amount: u128,
    ) -> Result<bool, ErrorObjectOwned>;

    /// Withdraw a standing top bid or collect an outbid refund.
    /// Returns the amount paid out.
    #[method(name = "bundle_unbid")]
    async fn bundle_unbid(
        &self,
        sender: String,
        bundle: String,
        index: u64,
    ) -> Result<u128, ErrorObjectOwned>;

    /// Claim a won item once the unlock threshold is met.
    #[method(name = "bundle_claim")]
    async fn bundle_claim(
        &self,
        sender: String,
        bundle: String,
        index: u64,
    ) -> Result<bool, ErrorObjectOwned>;

    /// Lock claim tokens toward the unlock threshold.
    /// Returns the aggregate vote count.
    #[method(name = "bundle_approveUnlock")]
    async fn bundle_approve_unlock(
        &self,
        sender: String,
        bundle: String,
        amount: u128,
    ) -> Result<u128, ErrorObjectOwned>;

    /// Take back locked claim tokens. Returns the aggregate vote count.
    #[method(name = "bundle_unapproveUnlock")]
    async fn bundle_unapprove_unlock(
        &self,
        sender: String,
        bundle: String,
        amount: u128,
    ) -> Result<u128, ErrorObjectOwned>;

    /// Burn claim tokens for a share of the proceeds. Returns the payout.
    #[method(name = "bundle_redeem")]
    async fn bundle_redeem(
        &self,
        sender: String,
        bundle: String,
        amount: u128,
    ) -> Result<u128, ErrorObjectOwned>;

    /// Transfer claim tokens between holders.
    #[method(name = "bundle_transferToken")]
    async fn bundle_transfer_token(
        &self,
        sender: String,
        bundle: String,
        to: String,
        amount: u128,
    ) -> Result<bool, ErrorObjectOwned>;

    // ============ Query Methods ============

    /// Get current block info.
    #[method(name = "chain_getBlockInfo")]
    async fn chain_get_block_info(&self) -> Result<BlockInfo, ErrorObjectOwned>;

    /// Get a bundle's immutable parameters.
    #[method(name = "query_getParams")]
    async fn query_get_params(&self, bundle: String) -> Result<BundleParamsRpc, ErrorObjectOwned>;

    /// Get a bundle's ledger snapshot.
    #[method(name = "query_getSummary")]
    async fn query_get_summary(&self, bundle: String)
        -> Result<BundleSummaryRpc, ErrorObjectOwned>;

    /// Get a bundle's escrowed items.
    #[method(name = "query_getItems")]
    async fn query_get_items(&self, bundle: String)
        -> Result<Vec<EscrowedItemRpc>, ErrorObjectOwned>;

    /// Get the standing top bid for an item.
    #[method(name = "query_getTopBid")]
    async fn query_get_top_bid(
        &self,
        bundle: String,
        index: u64,
    ) -> Result<Option<TopBidRpc>, ErrorObjectOwned>;

    /// Get the outbid refund owed to a bidder for an item.
    #[method(name = "query_getRefund")]
    async fn query_get_refund(
        &self,
        bundle: String,
        index: u64,
        bidder: String,
    ) -> Result<u128, ErrorObjectOwned>;

    /// Get a holder's locked claim-token balance.
    #[method(name = "query_getLockedBalance")]
    async fn query_get_locked_balance(
        &self,
        bundle: String,
        holder: String,
    ) -> Result<u128, ErrorObjectOwned>;

    /// Get a holder's liquid claim-token balance.
    #[method(name = "query_getTokenBalance")]
    async fn query_get_token_balance(
        &self,
        bundle: String,
        owner: String,
    ) -> Result<u128, ErrorObjectOwned>;

    /// Get an account's native-currency balance.
    #[method(name = "query_getBankBalance")]
    async fn query_get_bank_balance(&self, address: String) -> Result<u128, ErrorObjectOwned>;

    /// Get the full event journal.
    #[method(name = "query_getEvents")]
    async fn query_get_events(&self) -> Result<Vec<EventRecordRpc>, ErrorObjectOwned>;
}

/// Implementation of the mock chain RPC server.
struct MockChainServer {
    chain: Arc<RwLock<Chain>>,
}

impl MockChainServer {
    fn new() -> Self {
        Self {
            chain: Arc::new(RwLock::new(Chain::new(parse_address("ad")))),
        }
    }

    fn rpc_error(msg: &str) -> ErrorObjectOwned {
        ErrorObjectOwned::owned(-32000, msg.to_string(), None::<()>)
    }
}

#[async_trait]
impl MockChainApiServer for MockChainServer {
    async fn admin_advance_block(&self) -> Result<BlockInfo, ErrorObjectOwned> {
        let mut chain = self.chain.write();
        chain.advance_block();
        Ok(BlockInfo {
            height: chain.block_height,
            timestamp: chain.timestamp,
        })
    }

    async fn admin_set_timestamp(&self, timestamp: u64) -> Result<bool, ErrorObjectOwned> {
        let mut chain = self.chain.write();
        chain.set_timestamp(timestamp);
        info!("Timestamp set to {}", timestamp);
        Ok(true)
    }

    async fn admin_fund(&self, address: String, amount: u128) -> Result<bool, ErrorObjectOwned> {
        let mut chain = self.chain.write();
        chain.bank.credit(&parse_address(&address), amount);
        info!("Funded {} with {}", address, amount);
        Ok(true)
    }

    async fn admin_create_asset_contract(
        &self,
        address: String,
        kind: String,
    ) -> Result<bool, ErrorObjectOwned> {
        let kind = match kind.as_str() {
            "single" => AssetKind::Single,
            "multi" => AssetKind::Multi,
            _ => return Err(Self::rpc_error("Invalid asset kind")),
        };

        let mut chain = self.chain.write();
        chain.assets.create_contract(parse_address(&address), kind);
        info!("Asset contract {} created", address);
        Ok(true)
    }

    async fn admin_mint_asset(
        &self,
        contract: String,
        token_id: u128,
        to: String,
        amount: u128,
    ) -> Result<bool, ErrorObjectOwned> {
        let mut chain = self.chain.write();
        chain
            .assets
            .mint(&parse_address(&contract), token_id, parse_address(&to), amount)
            .map_err(|e| Self::rpc_error(&format!("Failed to mint asset: {}", e)))?;
        Ok(true)
    }

    async fn admin_set_asset_operator(
        &self,
        contract: String,
        owner: String,
        operator: String,
        approved: bool,
    ) -> Result<bool, ErrorObjectOwned> {
        let mut chain = self.chain.write();
        chain
            .assets
            .set_operator(
                &parse_address(&contract),
                parse_address(&owner),
                parse_address(&operator),
                approved,
            )
            .map_err(|e| Self::rpc_error(&format!("Failed to set operator: {}", e)))?;
        Ok(true)
    }

    async fn registry_create_bundle(
        &self,
        params: CreateBundleParams,
    ) -> Result<String, ErrorObjectOwned> {
        let config = BundleConfig {
            total_supply: params.total_supply,
            decimals: params.decimals,
            name: params.name,
            symbol: params.symbol,
            threshold: params.threshold,
            description: params.description,
            fee_divisor: params.fee_divisor.unwrap_or(BundleConfig::default().fee_divisor),
            top_bid_lock_secs: params
                .top_bid_lock_secs
                .unwrap_or(BundleConfig::default().top_bid_lock_secs),
        };

        let mut chain = self.chain.write();
        let address = chain
            .create_bundle(parse_address(&params.sender), config)
            .map_err(|e| Self::rpc_error(&format!("Failed to create bundle: {}", e)))?;

        info!("Created bundle {}", hex::encode(address));
        Ok(hex::encode(address))
    }

    async fn registry_set_fee_to(
        &self,
        sender: String,
        fee_to: Option<String>,
    ) -> Result<bool, ErrorObjectOwned> {
        let mut chain = self.chain.write();
        chain
            .registry
            .set_fee_to(&parse_address(&sender), fee_to.map(|s| parse_address(&s)))
            .map_err(|e| Self::rpc_error(&format!("Failed to set fee recipient: {}", e)))?;
        info!("Fee recipient updated");
        Ok(true)
    }

    async fn registry_list_bundles(&self) -> Result<Vec<BundleSummaryRpc>, ErrorObjectOwned> {
        let chain = self.chain.read();
        let mut summaries = Vec::new();
        for address in chain.registry.bundles() {
            if let Ok(instance) = chain.bundle(address) {
                summaries.push(BundleSummaryRpc::from(&BundleSummary::from_state(
                    &instance.state,
                )));
            }
        }
        Ok(summaries)
    }

    async fn bundle_deposit(&self, params: DepositParams) -> Result<u64, ErrorObjectOwned> {
        let bundle = parse_address(&params.bundle);
        let call = BundleCall::Deposit {
            asset_contract: parse_address(&params.asset_contract),
            token_ids: params.token_ids,
            amounts: params.amounts,
        };

        let mut chain = self.chain.write();
        chain
            .execute(bundle, parse_address(&params.sender), 0, call)
            .map_err(|e| Self::rpc_error(&format!("Failed to deposit: {}", e)))?;

        let count = chain
            .bundle(&bundle)
            .map(|instance| instance.state.item_count())
            .unwrap_or(0);
        info!("Deposit into {}: {} items escrowed", params.bundle, count);
        Ok(count)
    }

    async fn bundle_issue(&self, sender: String, bundle: String) -> Result<bool, ErrorObjectOwned> {
        let mut chain = self.chain.write();
        chain
            .execute(
                parse_address(&bundle),
                parse_address(&sender),
                0,
                BundleCall::Issue,
            )
            .map_err(|e| Self::rpc_error(&format!("Failed to issue: {}", e)))?;
        info!("Bundle {} issued", bundle);
        Ok(true)
    }

    async fn bundle_refund(
        &self,
        sender: String,
        bundle: String,
        to: String,
    ) -> Result<bool, ErrorObjectOwned> {
        let mut chain = self.chain.write();
        chain
            .execute(
                parse_address(&bundle),
                parse_address(&sender),
                0,
                BundleCall::Refund {
                    to: parse_address(&to),
                },
            )
            .map_err(|e| Self::rpc_error(&format!("Failed to refund: {}", e)))?;
        info!("Bundle {} refunded to {}", bundle, to);
        Ok(true)
    }

    async fn bundle_bid(
        &self,
        sender: String,
        bundle: String,
        index: u64,
        amount: u128,
    ) -> Result<bool, ErrorObjectOwned> {
        let mut chain = self.chain.write();
        chain
            .execute(
                parse_address(&bundle),
                parse_address(&sender),
                amount,
                BundleCall::Bid { index },
            )
            .map_err(|e| Self::rpc_error(&format!("Failed to bid: {}", e)))?;
        info!("Bid of {} on item {} of {}", amount, index, bundle);
        Ok(true)
    }

    async fn bundle_unbid(
        &self,
        sender: String,
        bundle: String,
        index: u64,
    ) -> Result<u128, ErrorObjectOwned> {
        let mut chain = self.chain.write();
        let events = chain
            .execute(
                parse_address(&bundle),
                parse_address(&sender),
                0,
                BundleCall::Unbid { index },
            )
            .map_err(|e| Self::rpc_error(&format!("Failed to unbid: {}", e)))?;

        let amount = events
            .iter()
            .find_map(|event| match event {
                BundleEvent::BidWithdrawn { amount, .. } => Some(*amount),
                _ => None,
            })
            .unwrap_or(0);
        info!("Unbid on item {} of {} returned {}", index, bundle, amount);
        Ok(amount)
    }

    async fn bundle_claim(
        &self,
        sender: String,
        bundle: String,
        index: u64,
    ) -> Result<bool, ErrorObjectOwned> {
        let mut chain = self.chain.write();
        chain
            .execute(
                parse_address(&bundle),
                parse_address(&sender),
                0,
                BundleCall::Claim { index },
            )
            .map_err(|e| Self::rpc_error(&format!("Failed to claim: {}", e)))?;
        info!("Item {} of {} claimed by {}", index, bundle, sender);
        Ok(true)
    }

    async fn bundle_approve_unlock(
        &self,
        sender: String,
        bundle: String,
        amount: u128,
    ) -> Result<u128, ErrorObjectOwned> {
        let mut chain = self.chain.write();
        let events = chain
            .execute(
                parse_address(&bundle),
                parse_address(&sender),
                0,
                BundleCall::ApproveUnlock { amount },
            )
            .map_err(|e| Self::rpc_error(&format!("Failed to approve unlock: {}", e)))?;

        let total_votes = unlock_votes_from(&events);
        info!("{} locked {} toward unlock of {}", sender, amount, bundle);
        Ok(total_votes)
    }

    async fn bundle_unapprove_unlock(
        &self,
        sender: String,
        bundle: String,
        amount: u128,
    ) -> Result<u128, ErrorObjectOwned> {
        let mut chain = self.chain.write();
        let events = chain
            .execute(
                parse_address(&bundle),
                parse_address(&sender),
                0,
                BundleCall::UnapproveUnlock { amount },
            )
            .map_err(|e| Self::rpc_error(&format!("Failed to unapprove unlock: {}", e)))?;

        let total_votes = unlock_votes_from(&events);
        info!("{} unlocked {} from {}", sender, amount, bundle);
        Ok(total_votes)
    }

    async fn bundle_redeem(
        &self,
        sender: String,
        bundle: String,
        amount: u128,
    ) -> Result<u128, ErrorObjectOwned> {
        let mut chain = self.chain.write();
        let events = chain
            .execute(
                parse_address(&bundle),
                parse_address(&sender),
                0,
                BundleCall::Redeem { amount },
            )
            .map_err(|e| Self::rpc_error(&format!("Failed to redeem: {}", e)))?;

        let payout = events
            .iter()
            .find_map(|event| match event {
                BundleEvent::Redeemed { payout, .. } => Some(*payout),
                _ => None,
            })
            .unwrap_or(0);
        info!("{} redeemed against {} for {}", sender, bundle, payout);
        Ok(payout)
    }

    async fn bundle_transfer_token(
        &self,
        sender: String,
        bundle: String,
        to: String,
        amount: u128,
    ) -> Result<bool, ErrorObjectOwned> {
        let mut chain = self.chain.write();
        chain
            .token_transfer(
                &parse_address(&bundle),
                parse_address(&sender),
                parse_address(&to),
                amount,
            )
            .map_err(|e| Self::rpc_error(&format!("Failed to transfer: {}", e)))?;
        info!("Transferred {} claim tokens of {} to {}", amount, bundle, to);
        Ok(true)
    }

    async fn chain_get_block_info(&self) -> Result<BlockInfo, ErrorObjectOwned> {
        let chain = self.chain.read();
        Ok(BlockInfo {
            height: chain.block_height,
            timestamp: chain.timestamp,
        })
    }

    async fn query_get_params(&self, bundle: String) -> Result<BundleParamsRpc, ErrorObjectOwned> {
        let chain = self.chain.read();
        match chain
            .query(&parse_address(&bundle), BundleQuery::GetParams)
            .map_err(|e| Self::rpc_error(&format!("Query failed: {}", e)))?
        {
            BundleQueryResponse::Params(params) => Ok(BundleParamsRpc::from(&params)),
            _ => Err(Self::rpc_error("Unexpected query response")),
        }
    }

    async fn query_get_summary(
        &self,
        bundle: String,
    ) -> Result<BundleSummaryRpc, ErrorObjectOwned> {
        let chain = self.chain.read();
        match chain
            .query(&parse_address(&bundle), BundleQuery::GetSummary)
            .map_err(|e| Self::rpc_error(&format!("Query failed: {}", e)))?
        {
            BundleQueryResponse::Summary(summary) => Ok(BundleSummaryRpc::from(&summary)),
            _ => Err(Self::rpc_error("Unexpected query response")),
        }
    }

    async fn query_get_items(
        &self,
        bundle: String,
    ) -> Result<Vec<EscrowedItemRpc>, ErrorObjectOwned> {
        let chain = self.chain.read();
        match chain
            .query(&parse_address(&bundle), BundleQuery::GetItems)
            .map_err(|e| Self::rpc_error(&format!("Query failed: {}", e)))?
        {
            BundleQueryResponse::Items(items) => {
                Ok(items.iter().map(EscrowedItemRpc::from).collect())
            }
            _ => Err(Self::rpc_error("Unexpected query response")),
        }
    }

    async fn query_get_top_bid(
        &self,
        bundle: String,
        index: u64,
    ) -> Result<Option<TopBidRpc>, ErrorObjectOwned> {
        let chain = self.chain.read();
        match chain
            .query(&parse_address(&bundle), BundleQuery::GetTopBid { index })
            .map_err(|e| Self::rpc_error(&format!("Query failed: {}", e)))?
        {
            BundleQueryResponse::TopBid(bid) => Ok(bid.as_ref().map(TopBidRpc::from)),
            _ => Err(Self::rpc_error("Unexpected query response")),
        }
    }

    async fn query_get_refund(
        &self,
        bundle: String,
        index: u64,
        bidder: String,
    ) -> Result<u128, ErrorObjectOwned> {
        let chain = self.chain.read();
        match chain
            .query(
                &parse_address(&bundle),
                BundleQuery::GetRefund {
                    index,
                    bidder: parse_address(&bidder),
                },
            )
            .map_err(|e| Self::rpc_error(&format!("Query failed: {}", e)))?
        {
            BundleQueryResponse::Refund(amount) => Ok(amount),
            _ => Err(Self::rpc_error("Unexpected query response")),
        }
    }

    async fn query_get_locked_balance(
        &self,
        bundle: String,
        holder: String,
    ) -> Result<u128, ErrorObjectOwned> {
        let chain = self.chain.read();
        match chain
            .query(
                &parse_address(&bundle),
                BundleQuery::GetLockedBalance {
                    holder: parse_address(&holder),
                },
            )
            .map_err(|e| Self::rpc_error(&format!("Query failed: {}", e)))?
        {
            BundleQueryResponse::LockedBalance(amount) => Ok(amount),
            _ => Err(Self::rpc_error("Unexpected query response")),
        }
    }

    async fn query_get_token_balance(
        &self,
        bundle: String,
        owner: String,
    ) -> Result<u128, ErrorObjectOwned> {
        let chain = self.chain.read();
        chain
            .token_balance(&parse_address(&bundle), &parse_address(&owner))
            .map_err(|e| Self::rpc_error(&format!("Query failed: {}", e)))
    }

    async fn query_get_bank_balance(&self, address: String) -> Result<u128, ErrorObjectOwned> {
        let chain = self.chain.read();
        Ok(chain.bank.balance(&parse_address(&address)))
    }

    async fn query_get_events(&self) -> Result<Vec<EventRecordRpc>, ErrorObjectOwned> {
        let chain = self.chain.read();
        Ok(chain.events().iter().map(EventRecordRpc::from).collect())
    }
}

/// Pull the aggregate vote count out of a call's events.
fn unlock_votes_from(events: &[BundleEvent]) -> u128 {
    events
        .iter()
        .find_map(|event| match event {
            BundleEvent::UnlockVotesChanged { total_votes, .. } => Some(*total_votes),
            _ => None,
        })
        .unwrap_or(0)
}

fn parse_address(s: &str) -> [u8; 32] {
    let mut addr = [0u8; 32];
    if let Ok(bytes) = hex::decode(s.trim_start_matches("0x")) {
        let len = bytes.len().min(32);
        addr[..len].copy_from_slice(&bytes[..len]);
    }
    addr
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("mock_chain=info".parse().unwrap())
                .add_directive("jsonrpsee=warn".parse().unwrap()),
        )
        .init();

    let addr: SocketAddr = "127.0.0.1:9944".parse()?;

    info!("Starting mock chain server on {}", addr);

    let server = Server::builder().build(addr).await?;
    let handle = server.start(MockChainServer::new().into_rpc());

    info!("Mock chain server running. Press Ctrl+C to stop.");

    // Wait for shutdown signal
    tokio::signal::ctrl_c().await?;

    info!("Shutting down...");
    handle.stop()?;
    handle.stopped().await;

    Ok(())
}
