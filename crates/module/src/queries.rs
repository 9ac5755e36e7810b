//! Query handlers for the bundle module.
//!
//! These functions provide read-only access to bundle state.

use crate::state::BundleState;
use bundle_types::{Address, BundleParams, EscrowedItem, Phase, TopBid};
use serde::{Deserialize, Serialize};

/// Query request types.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum BundleQuery {
    /// Get the immutable bundle parameters.
    GetParams,

    /// Get a snapshot of the mutable ledgers.
    GetSummary,

    /// Get all escrowed items.
    GetItems,

    /// Get a single escrowed item.
    GetItem { index: u64 },

    /// Get the standing top bid for an item.
    GetTopBid { index: u64 },

    /// Get the outbid refund owed to a bidder for an item.
    GetRefund { index: u64, bidder: Address },

    /// Get a holder's locked claim-token balance.
    GetLockedBalance { holder: Address },
}

/// Query response types.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum BundleQueryResponse {
    /// Bundle parameters.
    Params(BundleParams),

    /// Ledger snapshot.
    Summary(BundleSummary),

    /// Escrowed items.
    Items(Vec<EscrowedItem>),

    /// Single escrowed item.
    Item(Option<EscrowedItem>),

    /// Standing top bid.
    TopBid(Option<TopBid>),

    /// Outbid refund balance.
    Refund(u128),

    /// Locked claim-token balance.
    LockedBalance(u128),
}

/// Handle a query.
pub fn handle_query(state: &BundleState, query: BundleQuery) -> BundleQueryResponse {
    match query {
        BundleQuery::GetParams => BundleQueryResponse::Params(state.params.clone()),

        BundleQuery::GetSummary => BundleQueryResponse::Summary(BundleSummary::from_state(state)),

        BundleQuery::GetItems => BundleQueryResponse::Items(state.items.clone()),

        BundleQuery::GetItem { index } => {
            BundleQueryResponse::Item(state.item(index).cloned())
        }

        BundleQuery::GetTopBid { index } => {
            BundleQueryResponse::TopBid(state.top_bid(index).cloned())
        }

        BundleQuery::GetRefund { index, bidder } => {
            BundleQueryResponse::Refund(state.refund_owed(index, &bidder))
        }

        BundleQuery::GetLockedBalance { holder } => {
            BundleQueryResponse::LockedBalance(state.locked_balance(&holder))
        }
    }
}

/// Snapshot of a bundle's mutable ledgers for listing.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BundleSummary {
    pub address: Address,
    pub phase: Phase,
    pub item_count: u64,
    pub items_claimed: u64,
    pub total_bid_amount: u128,
    pub unlock_votes: u128,
    pub threshold: u128,
    pub threshold_met: bool,
}

impl BundleSummary {
    /// Build a summary from the live state.
    pub fn from_state(state: &BundleState) -> Self {
        let items_claimed = state.items.iter().filter(|item| item.claimed).count() as u64;
        Self {
            address: state.address,
            phase: state.phase,
            item_count: state.item_count(),
            items_claimed,
            total_bid_amount: state.total_bid_amount,
            unlock_votes: state.unlock_votes,
            threshold: state.params.threshold,
            threshold_met: state.threshold_met(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bundle_types::BundleParams;

    fn test_state() -> BundleState {
        let params = BundleParams {
            issuer: [1u8; 32],
            total_supply: 1000,
            decimals: 18,
            name: "Bundle".into(),
            symbol: "BNDL".into(),
            threshold: 950,
            description: String::new(),
            fee_divisor: 200,
            top_bid_lock_secs: 259_200,
        };
        BundleState::new([0xBB; 32], params)
    }

    #[test]
    fn test_summary_reflects_ledger() {
        let mut state = test_state();
        state.phase = Phase::Active;
        state.items.push(EscrowedItem {
            asset_contract: [0x71; 32],
            token_id: 0,
            amount: 1,
            claimed: true,
        });
        state.total_bid_amount = 140;
        state.unlock_votes = 950;

        let response = handle_query(&state, BundleQuery::GetSummary);
        let BundleQueryResponse::Summary(summary) = response else {
            panic!("expected summary response");
        };

        assert_eq!(summary.item_count, 1);
        assert_eq!(summary.items_claimed, 1);
        assert_eq!(summary.total_bid_amount, 140);
        assert!(summary.threshold_met);
    }

    #[test]
    fn test_top_bid_query_none() {
        let state = test_state();
        let response = handle_query(&state, BundleQuery::GetTopBid { index: 0 });
        assert!(matches!(response, BundleQueryResponse::TopBid(None)));
    }

    #[test]
    fn test_refund_query_defaults_to_zero() {
        let state = test_state();
        let response = handle_query(
            &state,
            BundleQuery::GetRefund {
                index: 3,
                bidder: [0xA1; 32],
            },
        );
        assert!(matches!(response, BundleQueryResponse::Refund(0)));
    }
}
