//! In-memory ledger state for a single bundle instance.

use bundle_types::{Address, BundleParams, EscrowedItem, Phase, TopBid};
use std::collections::HashMap;

/// Complete ledger state of one bundle.
///
/// Claim-token balances and asset custody live with the host chain's
/// collaborator ledgers; this struct holds only what the bundle itself
/// is authoritative for.
#[derive(Clone, Debug)]
pub struct BundleState {
    /// The bundle's own account: escrow custody, locked claim tokens,
    /// and the proceeds pool all sit under it
    pub address: Address,

    /// Immutable creation parameters
    pub params: BundleParams,

    /// Lifecycle phase, `Collecting` until issuance
    pub phase: Phase,

    /// Escrowed items in deposit order; position is the item index
    pub items: Vec<EscrowedItem>,

    /// Standing top bid per item index
    pub bids: HashMap<u64, TopBid>,

    /// Native currency owed to outbid bidders: (index, bidder) -> amount
    pub bid_refunds: HashMap<(u64, Address), u128>,

    /// Claim tokens locked per holder in support of unlocking
    pub unlock_approved: HashMap<Address, u128>,

    /// Aggregate locked claim tokens across all holders
    pub unlock_votes: u128,

    /// Sum of the standing top bids: the redeemable proceeds pool
    pub total_bid_amount: u128,
}

impl BundleState {
    /// Create the state for a freshly registered bundle.
    pub fn new(address: Address, params: BundleParams) -> Self {
        Self {
            address,
            params,
            phase: Phase::Collecting,
            items: Vec::new(),
            bids: HashMap::new(),
            bid_refunds: HashMap::new(),
            unlock_approved: HashMap::new(),
            unlock_votes: 0,
            total_bid_amount: 0,
        }
    }

    /// True once the unlock vote threshold has been met.
    pub fn threshold_met(&self) -> bool {
        self.unlock_votes >= self.params.threshold
    }

    /// Number of items in the escrow ledger.
    pub fn item_count(&self) -> u64 {
        self.items.len() as u64
    }

    /// Escrowed item at `index`.
    pub fn item(&self, index: u64) -> Option<&EscrowedItem> {
        self.items.get(index as usize)
    }

    /// Standing top bid on `index`.
    pub fn top_bid(&self, index: u64) -> Option<&TopBid> {
        self.bids.get(&index)
    }

    /// Native currency owed to `bidder` from being outbid on `index`.
    pub fn refund_owed(&self, index: u64, bidder: &Address) -> u128 {
        self.bid_refunds.get(&(index, *bidder)).copied().unwrap_or(0)
    }

    /// Claim tokens `holder` currently has locked.
    pub fn locked_balance(&self, holder: &Address) -> u128 {
        self.unlock_approved.get(holder).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_params() -> BundleParams {
        BundleParams {
            issuer: [1u8; 32],
            total_supply: 1000,
            decimals: 18,
            name: "Bundle".into(),
            symbol: "BNDL".into(),
            threshold: 950,
            description: String::new(),
            fee_divisor: 200,
            top_bid_lock_secs: 259_200,
        }
    }

    #[test]
    fn test_new_state_is_collecting_and_empty() {
        let state = BundleState::new([9u8; 32], test_params());
        assert_eq!(state.phase, Phase::Collecting);
        assert_eq!(state.item_count(), 0);
        assert_eq!(state.total_bid_amount, 0);
        assert!(!state.threshold_met());
    }

    #[test]
    fn test_threshold_boundary() {
        let mut state = BundleState::new([9u8; 32], test_params());
        state.unlock_votes = 949;
        assert!(!state.threshold_met());
        state.unlock_votes = 950;
        assert!(state.threshold_met());
        state.unlock_votes = 1020;
        assert!(state.threshold_met());
    }

    #[test]
    fn test_ledger_defaults_are_zero() {
        let state = BundleState::new([9u8; 32], test_params());
        let addr = [2u8; 32];
        assert_eq!(state.refund_owed(3, &addr), 0);
        assert_eq!(state.locked_balance(&addr), 0);
        assert!(state.top_bid(0).is_none());
        assert!(state.item(0).is_none());
    }
}
