//! Interfaces to the collaborator contracts a bundle depends on.
//!
//! The bundle ledger never holds claim-token balances or asset custody
//! itself. Those live with collaborators supplied by the host chain and
//! reached through these traits. Inbound movements (deposits, token
//! locks) happen synchronously through them; outbound movements travel
//! back to the host as [`bundle_types::Effect`]s instead.

use bundle_types::Address;
use thiserror::Error;

/// Errors surfaced by the claim-token collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("Transfer amount exceeds balance: need {needed}, have {available}")]
    InsufficientBalance { needed: u128, available: u128 },
}

/// Fungible claim-token ledger backing one bundle.
///
/// Supply starts at zero and is minted exactly once, at issuance, so
/// the ledger total never exceeds the bundle's original supply.
pub trait ClaimToken {
    /// Live supply (shrinks as redemption burns tokens).
    fn total_supply(&self) -> u128;

    /// Balance of `owner`.
    fn balance_of(&self, owner: &Address) -> u128;

    /// Create `amount` new tokens for `to`.
    fn mint(&mut self, to: &Address, amount: u128);

    /// Destroy `amount` tokens held by `from`.
    fn burn(&mut self, from: &Address, amount: u128) -> Result<(), TokenError>;

    /// Move `amount` tokens between holders.
    fn transfer(&mut self, from: &Address, to: &Address, amount: u128) -> Result<(), TokenError>;
}

/// Errors surfaced by asset-contract collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssetError {
    #[error("Unknown asset contract")]
    UnknownContract,

    #[error("Call shape does not match the contract's asset kind")]
    KindMismatch,

    #[error("Sender does not own token {token_id}")]
    NotOwner { token_id: u128 },

    #[error("Not enough units of token {token_id}: need {needed}, have {available}")]
    InsufficientUnits {
        token_id: u128,
        needed: u128,
        available: u128,
    },

    #[error("Escrow is not approved to move the sender's holdings")]
    NotApproved,

    #[error("Token id count does not match amount count: {ids} vs {amounts}")]
    ArityMismatch { ids: usize, amounts: usize },
}

/// Deposit-side transfer surface of the external asset contracts.
///
/// Each pull moves a whole batch from the depositor into bundle custody
/// atomically: every transfer succeeds or nothing moves.
pub trait AssetIntake {
    /// Pull distinct single-asset tokens from `from`.
    fn pull_single(
        &mut self,
        contract: &Address,
        from: &Address,
        token_ids: &[u128],
    ) -> Result<(), AssetError>;

    /// Pull quantities of multi-asset tokens from `from`.
    fn pull_multi(
        &mut self,
        contract: &Address,
        from: &Address,
        token_ids: &[u128],
        amounts: &[u128],
    ) -> Result<(), AssetError>;
}

/// Read access to the registry that created this bundle.
pub trait RegistryView {
    /// Protocol fee recipient, consulted only at issuance time.
    fn fee_recipient(&self) -> Option<Address>;
}
