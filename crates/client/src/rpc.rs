//! Typed JSON-RPC wrapper over the mock chain server.
//!
//! Method names and parameter shapes mirror the server's RPC trait;
//! addresses travel as hex strings.

use jsonrpsee::core::client::{ClientT, Error as ClientError};
use jsonrpsee::http_client::{HttpClient, HttpClientBuilder};
use serde::{Deserialize, Serialize};

/// Chain clock reading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockInfo {
    pub height: u64,
    pub timestamp: u64,
}

/// Request body for `registry_createBundle`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBundleRequest {
    pub sender: String,
    pub total_supply: u128,
    pub decimals: u8,
    pub name: String,
    pub symbol: String,
    pub threshold: u128,
    pub description: String,
    /// Defaults to the protocol fee divisor when omitted
    pub fee_divisor: Option<u128>,
    /// Defaults to the protocol lock window when omitted
    pub top_bid_lock_secs: Option<u64>,
}

/// Request body for `bundle_deposit`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepositRequest {
    pub sender: String,
    pub bundle: String,
    pub asset_contract: String,
    pub token_ids: Vec<u128>,
    /// Empty for single-unit contracts
    pub amounts: Vec<u128>,
}

/// Immutable bundle parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleParamsRpc {
    pub issuer: String,
    pub total_supply: u128,
    pub decimals: u8,
    pub name: String,
    pub symbol: String,
    pub threshold: u128,
    pub description: String,
    pub fee_divisor: u128,
    pub top_bid_lock_secs: u64,
}

/// Bundle ledger snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleSummaryRpc {
    pub address: String,
    pub phase: String,
    pub item_count: u64,
    pub items_claimed: u64,
    pub total_bid_amount: u128,
    pub unlock_votes: u128,
    pub threshold: u128,
    pub threshold_met: bool,
}

/// One escrowed item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscrowedItemRpc {
    pub asset_contract: String,
    pub token_id: u128,
    pub amount: u128,
    pub claimed: bool,
}

/// The standing top bid on an item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopBidRpc {
    pub bidder: String,
    pub amount: u128,
    pub placed_at: u64,
}

/// One journaled bundle event.
///
/// The event payload is kept as raw JSON; the server tags each variant
/// with a `kind` field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecordRpc {
    pub height: u64,
    pub bundle: String,
    pub event: serde_json::Value,
}

/// Typed client over the mock chain's JSON-RPC surface.
pub struct BundleRpcClient {
    inner: HttpClient,
}

impl BundleRpcClient {
    /// Connect to a mock chain server.
    pub fn connect(url: &str) -> Result<Self, ClientError> {
        Ok(Self {
            inner: HttpClientBuilder::default().build(url)?,
        })
    }

    // === Admin ===

    pub async fn advance_block(&self) -> Result<BlockInfo, ClientError> {
        self.inner
            .request("admin_advanceBlock", Vec::<()>::new())
            .await
    }

    pub async fn set_timestamp(&self, timestamp: u64) -> Result<bool, ClientError> {
        self.inner.request("admin_setTimestamp", vec![timestamp]).await
    }

    pub async fn fund(&self, address: &str, amount: u128) -> Result<bool, ClientError> {
        self.inner.request("admin_fund", (address, amount)).await
    }

    pub async fn create_asset_contract(
        &self,
        address: &str,
        kind: &str,
    ) -> Result<bool, ClientError> {
        self.inner
            .request("admin_createAssetContract", (address, kind))
            .await
    }

    pub async fn mint_asset(
        &self,
        contract: &str,
        token_id: u128,
        to: &str,
        amount: u128,
    ) -> Result<bool, ClientError> {
        self.inner
            .request("admin_mintAsset", (contract, token_id, to, amount))
            .await
    }

    pub async fn set_asset_operator(
        &self,
        contract: &str,
        owner: &str,
        operator: &str,
        approved: bool,
    ) -> Result<bool, ClientError> {
        self.inner
            .request("admin_setAssetOperator", (contract, owner, operator, approved))
            .await
    }

    // === Registry ===

    pub async fn create_bundle(&self, req: CreateBundleRequest) -> Result<String, ClientError> {
        self.inner.request("registry_createBundle", vec![req]).await
    }

    pub async fn set_fee_to(
        &self,
        sender: &str,
        fee_to: Option<&str>,
    ) -> Result<bool, ClientError> {
        self.inner.request("registry_setFeeTo", (sender, fee_to)).await
    }

    pub async fn list_bundles(&self) -> Result<Vec<BundleSummaryRpc>, ClientError> {
        self.inner
            .request("registry_listBundles", Vec::<()>::new())
            .await
    }

    // === Bundle calls ===

    pub async fn deposit(&self, req: DepositRequest) -> Result<u64, ClientError> {
        self.inner.request("bundle_deposit", vec![req]).await
    }

    pub async fn issue(&self, sender: &str, bundle: &str) -> Result<bool, ClientError> {
        self.inner.request("bundle_issue", (sender, bundle)).await
    }

    pub async fn refund(&self, sender: &str, bundle: &str, to: &str) -> Result<bool, ClientError> {
        self.inner.request("bundle_refund", (sender, bundle, to)).await
    }

    pub async fn bid(
        &self,
        sender: &str,
        bundle: &str,
        index: u64,
        amount: u128,
    ) -> Result<bool, ClientError> {
        self.inner
            .request("bundle_bid", (sender, bundle, index, amount))
            .await
    }

    /// Withdraw a top bid or collect an outbid refund; returns the payout.
    pub async fn unbid(&self, sender: &str, bundle: &str, index: u64) -> Result<u128, ClientError> {
        self.inner.request("bundle_unbid", (sender, bundle, index)).await
    }

    pub async fn claim(&self, sender: &str, bundle: &str, index: u64) -> Result<bool, ClientError> {
        self.inner.request("bundle_claim", (sender, bundle, index)).await
    }

    /// Lock claim tokens; returns the new aggregate vote count.
    pub async fn approve_unlock(
        &self,
        sender: &str,
        bundle: &str,
        amount: u128,
    ) -> Result<u128, ClientError> {
        self.inner
            .request("bundle_approveUnlock", (sender, bundle, amount))
            .await
    }

    /// Take back locked claim tokens; returns the new aggregate vote count.
    pub async fn unapprove_unlock(
        &self,
        sender: &str,
        bundle: &str,
        amount: u128,
    ) -> Result<u128, ClientError> {
        self.inner
            .request("bundle_unapproveUnlock", (sender, bundle, amount))
            .await
    }

    /// Burn claim tokens for a share of the proceeds; returns the payout.
    pub async fn redeem(
        &self,
        sender: &str,
        bundle: &str,
        amount: u128,
    ) -> Result<u128, ClientError> {
        self.inner
            .request("bundle_redeem", (sender, bundle, amount))
            .await
    }

    pub async fn transfer_token(
        &self,
        sender: &str,
        bundle: &str,
        to: &str,
        amount: u128,
    ) -> Result<bool, ClientError> {
        self.inner
            .request("bundle_transferToken", (sender, bundle, to, amount))
            .await
    }

    // === Queries ===

    pub async fn block_info(&self) -> Result<BlockInfo, ClientError> {
        self.inner
            .request("chain_getBlockInfo", Vec::<()>::new())
            .await
    }

    pub async fn params(&self, bundle: &str) -> Result<BundleParamsRpc, ClientError> {
        self.inner.request("query_getParams", vec![bundle]).await
    }

    pub async fn summary(&self, bundle: &str) -> Result<BundleSummaryRpc, ClientError> {
        self.inner.request("query_getSummary", vec![bundle]).await
    }

    pub async fn items(&self, bundle: &str) -> Result<Vec<EscrowedItemRpc>, ClientError> {
        self.inner.request("query_getItems", vec![bundle]).await
    }

    pub async fn top_bid(&self, bundle: &str, index: u64) -> Result<Option<TopBidRpc>, ClientError> {
        self.inner.request("query_getTopBid", (bundle, index)).await
    }

    pub async fn refund_owed(
        &self,
        bundle: &str,
        index: u64,
        bidder: &str,
    ) -> Result<u128, ClientError> {
        self.inner
            .request("query_getRefund", (bundle, index, bidder))
            .await
    }

    pub async fn locked_balance(&self, bundle: &str, holder: &str) -> Result<u128, ClientError> {
        self.inner
            .request("query_getLockedBalance", (bundle, holder))
            .await
    }

    pub async fn token_balance(&self, bundle: &str, owner: &str) -> Result<u128, ClientError> {
        self.inner
            .request("query_getTokenBalance", (bundle, owner))
            .await
    }

    pub async fn bank_balance(&self, address: &str) -> Result<u128, ClientError> {
        self.inner.request("query_getBankBalance", vec![address]).await
    }

    pub async fn events(&self) -> Result<Vec<EventRecordRpc>, ClientError> {
        self.inner.request("query_getEvents", Vec::<()>::new()).await
    }
}
