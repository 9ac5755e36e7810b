//! RPC-compatible types for the mock chain.
//!
//! These types are JSON-serializable versions of the core bundle types,
//! with addresses hex-encoded.

use bundle_types::{BundleEvent, BundleParams, EscrowedItem, Phase, TopBid};
use mock_chain::EventRecord;
use serde::{Deserialize, Serialize};

use bundle_module::BundleSummary;

/// Block info response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockInfo {
    pub height: u64,
    pub timestamp: u64,
}

/// Parameters for creating a bundle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBundleParams {
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

/// Parameters for depositing assets into a bundle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepositParams {
    pub sender: String,
    pub bundle: String,
    pub asset_contract: String,
    pub token_ids: Vec<u128>,
    /// Empty for single-unit contracts
    pub amounts: Vec<u128>,
}

/// Bundle parameters for RPC responses.
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

impl From<&BundleParams> for BundleParamsRpc {
    fn from(p: &BundleParams) -> Self {
        Self {
            issuer: hex::encode(p.issuer),
            total_supply: p.total_supply,
            decimals: p.decimals,
            name: p.name.clone(),
            symbol: p.symbol.clone(),
            threshold: p.threshold,
            description: p.description.clone(),
            fee_divisor: p.fee_divisor,
            top_bid_lock_secs: p.top_bid_lock_secs,
        }
    }
}

/// Bundle ledger snapshot for RPC responses.
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

impl From<&BundleSummary> for BundleSummaryRpc {
    fn from(s: &BundleSummary) -> Self {
        Self {
            address: hex::encode(s.address),
            phase: match s.phase {
                Phase::Collecting => "collecting",
                Phase::Active => "active",
            }
            .to_string(),
            item_count: s.item_count,
            items_claimed: s.items_claimed,
            total_bid_amount: s.total_bid_amount,
            unlock_votes: s.unlock_votes,
            threshold: s.threshold,
            threshold_met: s.threshold_met,
        }
    }
}

/// Escrowed item for RPC responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscrowedItemRpc {
    pub asset_contract: String,
    pub token_id: u128,
    pub amount: u128,
    pub claimed: bool,
}

impl From<&EscrowedItem> for EscrowedItemRpc {
    fn from(item: &EscrowedItem) -> Self {
        Self {
            asset_contract: hex::encode(item.asset_contract),
            token_id: item.token_id,
            amount: item.amount,
            claimed: item.claimed,
        }
    }
}

/// Standing top bid for RPC responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopBidRpc {
    pub bidder: String,
    pub amount: u128,
    pub placed_at: u64,
}

impl From<&TopBid> for TopBidRpc {
    fn from(bid: &TopBid) -> Self {
        Self {
            bidder: hex::encode(bid.bidder),
            amount: bid.amount,
            placed_at: bid.placed_at,
        }
    }
}

/// Bundle event for RPC responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BundleEventRpc {
    ItemDeposited {
        index: u64,
        asset_contract: String,
        token_id: u128,
        amount: u128,
    },
    Issued {
        supply: u128,
        fee_recipient: Option<String>,
        fee: u128,
    },
    BundleRefunded {
        to: String,
        items: u64,
    },
    BidPlaced {
        index: u64,
        bidder: String,
        amount: u128,
    },
    BidWithdrawn {
        index: u64,
        bidder: String,
        amount: u128,
    },
    UnlockVotesChanged {
        holder: String,
        locked: u128,
        total_votes: u128,
    },
    ItemClaimed {
        index: u64,
        winner: String,
    },
    Redeemed {
        holder: String,
        share: u128,
        payout: u128,
    },
}

impl From<&BundleEvent> for BundleEventRpc {
    fn from(event: &BundleEvent) -> Self {
        match event {
            BundleEvent::ItemDeposited {
                index,
                asset_contract,
                token_id,
                amount,
            } => Self::ItemDeposited {
                index: *index,
                asset_contract: hex::encode(asset_contract),
                token_id: *token_id,
                amount: *amount,
            },
            BundleEvent::Issued {
                supply,
                fee_recipient,
                fee,
            } => Self::Issued {
                supply: *supply,
                fee_recipient: fee_recipient.map(hex::encode),
                fee: *fee,
            },
            BundleEvent::BundleRefunded { to, items } => Self::BundleRefunded {
                to: hex::encode(to),
                items: *items,
            },
            BundleEvent::BidPlaced {
                index,
                bidder,
                amount,
            } => Self::BidPlaced {
                index: *index,
                bidder: hex::encode(bidder),
                amount: *amount,
            },
            BundleEvent::BidWithdrawn {
                index,
                bidder,
                amount,
            } => Self::BidWithdrawn {
                index: *index,
                bidder: hex::encode(bidder),
                amount: *amount,
            },
            BundleEvent::UnlockVotesChanged {
                holder,
                locked,
                total_votes,
            } => Self::UnlockVotesChanged {
                holder: hex::encode(holder),
                locked: *locked,
                total_votes: *total_votes,
            },
            BundleEvent::ItemClaimed { index, winner } => Self::ItemClaimed {
                index: *index,
                winner: hex::encode(winner),
            },
            BundleEvent::Redeemed {
                holder,
                share,
                payout,
            } => Self::Redeemed {
                holder: hex::encode(holder),
                share: *share,
                payout: *payout,
            },
        }
    }
}

/// Journaled event for RPC responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecordRpc {
    pub height: u64,
    pub bundle: String,
    pub event: BundleEventRpc,
}

impl From<&EventRecord> for EventRecordRpc {
    fn from(record: &EventRecord) -> Self {
        Self {
            height: record.height,
            bundle: hex::encode(record.bundle),
            event: BundleEventRpc::from(&record.event),
        }
    }
}
