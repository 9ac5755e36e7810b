//! Bundle module error types.

use thiserror::Error;

use crate::external::{AssetError, TokenError};

/// Errors that can occur in the bundle module.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BundleError {
    #[error("Caller is not the issuer")]
    NotIssuer,

    #[error("Bundle is already active")]
    AlreadyActive,

    #[error("Bundle is not active")]
    NotActive,

    #[error("Token id count does not match amount count: {ids} vs {amounts}")]
    ItemArityMismatch { ids: usize, amounts: usize },

    #[error("No item at index {0}")]
    UnknownItem(u64),

    #[error("Bid too low on item {index}: {got} does not beat {standing}")]
    BidTooLow {
        index: u64,
        got: u128,
        standing: u128,
    },

    #[error("Caller already holds the top bid on item {0}")]
    AlreadyTopBidder(u64),

    #[error("Collect the outstanding bid refund on item {0} first")]
    RefundOutstanding(u64),

    #[error("Top bid on item {0} is still locked")]
    TopBidLocked(u64),

    #[error("No bid or refund found on item {0}")]
    NoBidFound(u64),

    #[error("Unlock threshold has been met, the winner cannot unbid")]
    WinnerCannotUnbid,

    #[error("Unlock threshold not met")]
    ThresholdNotMet,

    #[error("Unlock threshold already reached")]
    ThresholdReached,

    #[error("Only the winning bidder can claim item {0}")]
    NotWinner(u64),

    #[error("Item {0} already claimed")]
    AlreadyClaimed(u64),

    #[error("Not enough claim tokens locked: need {needed}, have {locked}")]
    InsufficientLocked { needed: u128, locked: u128 },

    #[error("Arithmetic overflow in proceeds accounting")]
    Overflow,

    #[error("Claim token: {0}")]
    Token(#[from] TokenError),

    #[error("Asset contract: {0}")]
    Asset(#[from] AssetError),
}
