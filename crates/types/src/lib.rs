//! Core type definitions for the NFT bundle auction system.
//!
//! This crate provides the shared data structures used across the bundle
//! system, including escrow items, bids, creation parameters, observable
//! events, and the outbound transfers a call produces.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

// =========================
// ACCOUNTS
// =========================

/// Account address (32 bytes)
pub type Address = [u8; 32];

// =========================
// BUNDLE LIFECYCLE
// =========================

/// Lifecycle phase of a bundle
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub enum Phase {
    /// Deposit window: items can still be added or refunded wholesale
    #[default]
    Collecting,
    /// Claim tokens issued: bidding, voting, claiming, and redemption
    Active,
}

/// Immutable configuration fixed when a bundle is created
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct BundleParams {
    /// Account that deposits items and receives the minted supply
    pub issuer: Address,
    /// Claim-token supply minted at issuance, and the fixed redemption denominator
    pub total_supply: u128,
    pub decimals: u8,
    pub name: String,
    pub symbol: String,
    /// Locked claim tokens required before the escrow unlocks
    pub threshold: u128,
    pub description: String,
    /// Issuance mints `total_supply / fee_divisor` to the protocol fee recipient
    pub fee_divisor: u128,
    /// Seconds a standing top bid stays unwithdrawable after it is placed
    pub top_bid_lock_secs: u64,
}

// =========================
// ESCROW & AUCTION
// =========================

/// Transfer convention of an external asset contract
#[derive(Clone, Copy, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub enum AssetKind {
    /// Each token id is a distinct item with a single owner
    Single,
    /// Token ids carry per-owner quantities
    Multi,
}

/// A non-fungible item held in a bundle's escrow ledger
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct EscrowedItem {
    pub asset_contract: Address,
    pub token_id: u128,
    /// 1 for single-asset items, the deposited quantity otherwise
    pub amount: u128,
    pub claimed: bool,
}

/// The standing top bid on an item index
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct TopBid {
    pub bidder: Address,
    pub amount: u128,
    /// Timestamp the bid was accepted; starts the withdrawal lock window
    pub placed_at: u64,
}

// =========================
// EVENTS
// =========================

/// Observable events published by bundle operations
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub enum BundleEvent {
    /// An item entered escrow at `index`
    ItemDeposited {
        index: u64,
        asset_contract: Address,
        token_id: u128,
        amount: u128,
    },
    /// The claim-token supply was minted and the bundle went active
    Issued {
        supply: u128,
        fee_recipient: Option<Address>,
        fee: u128,
    },
    /// The bundle was abandoned and its escrow returned
    BundleRefunded { to: Address, items: u64 },
    /// A bid became the standing top bid on `index`
    BidPlaced { index: u64, bidder: Address, amount: u128 },
    /// A top bid was withdrawn or an outbid refund collected
    BidWithdrawn { index: u64, bidder: Address, amount: u128 },
    /// A holder's locked balance changed; `total_votes` is the new aggregate
    UnlockVotesChanged {
        holder: Address,
        locked: u128,
        total_votes: u128,
    },
    /// An auction winner took delivery of item `index`
    ItemClaimed { index: u64, winner: Address },
    /// Claim tokens were burned for a share of the proceeds pool
    Redeemed { holder: Address, share: u128, payout: u128 },
}

// =========================
// OUTBOUND EFFECTS
// =========================

/// An outbound transfer produced by a call.
///
/// Handlers finish every ledger mutation before returning; the host
/// chain performs these afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    /// Pay native currency out of the bundle's account
    PayNative { to: Address, amount: u128 },
    /// Hand an escrowed item over to a winner or back to the issuer
    ReleaseItem {
        asset_contract: Address,
        token_id: u128,
        amount: u128,
        to: Address,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_defaults_to_collecting() {
        assert_eq!(Phase::default(), Phase::Collecting);
    }

    #[test]
    fn test_escrow_item_wire_roundtrip() {
        let item = EscrowedItem {
            asset_contract: [7u8; 32],
            token_id: 42,
            amount: 3,
            claimed: false,
        };
        let encoded = borsh::to_vec(&item).unwrap();
        let decoded: EscrowedItem = borsh::from_slice(&encoded).unwrap();
        assert_eq!(item, decoded);
    }

    #[test]
    fn test_event_carries_new_locked_total() {
        let event = BundleEvent::UnlockVotesChanged {
            holder: [1u8; 32],
            locked: 90,
            total_votes: 220,
        };
        match event {
            BundleEvent::UnlockVotesChanged { locked, total_votes, .. } => {
                assert_eq!(locked, 90);
                assert_eq!(total_votes, 220);
            }
            _ => panic!("wrong variant"),
        }
    }
}
