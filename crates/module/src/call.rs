//! Call message types for the bundle module.

use borsh::{BorshDeserialize, BorshSerialize};
use bundle_types::Address;

/// Call messages for the bundle module.
///
/// Native currency attached to a call travels in the call context, not
/// in the message body; only `Bid` accepts it.
#[derive(Clone, Debug, BorshSerialize, BorshDeserialize)]
pub enum BundleCall {
    // === Escrow & Issuance ===
    /// Append items to the escrow ledger (issuer only).
    ///
    /// Empty `amounts` selects the single-asset path with a quantity of
    /// one per token id; otherwise each token id is paired with its
    /// deposited quantity.
    Deposit {
        asset_contract: Address,
        token_ids: Vec<u128>,
        amounts: Vec<u128>,
    },

    /// Mint the fixed claim-token supply and activate the bundle.
    Issue,

    /// Abandon an inactive bundle, returning every escrowed item to `to`.
    Refund { to: Address },

    // === Auction ===
    /// Bid on an item with the call's attached value.
    Bid { index: u64 },

    /// Withdraw the caller's standing top bid, or collect an outbid refund.
    Unbid { index: u64 },

    /// Take delivery of a won item once the unlock threshold is met.
    Claim { index: u64 },

    // === Unlock Voting & Redemption ===
    /// Lock claim tokens in support of releasing the escrow.
    ApproveUnlock { amount: u128 },

    /// Withdraw previously locked claim tokens.
    UnapproveUnlock { amount: u128 },

    /// Burn claim tokens for a pro-rata share of the proceeds pool.
    Redeem { amount: u128 },
}
