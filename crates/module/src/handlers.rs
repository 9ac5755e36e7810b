//! Call handlers for the bundle module.
//!
//! These functions implement the business logic for each call type.
//! Every handler validates first, talks to collaborators next, mutates
//! the ledger after that, and returns outbound transfers as effects for
//! the host to execute last. A handler that returns an error has
//! changed nothing observable.

use crate::error::BundleError;
use crate::external::{AssetIntake, ClaimToken, RegistryView};
use crate::state::BundleState;
use bundle_types::{Address, BundleEvent, Effect, EscrowedItem, Phase, TopBid};

/// Context provided by the runtime for each call.
pub struct CallContext {
    /// Sender of the transaction
    pub sender: Address,
    /// Current block height
    pub block_height: u64,
    /// Current timestamp
    pub timestamp: u64,
    /// Native currency attached to the call (bids only)
    pub value: u128,
}

/// Result type for handlers.
pub type HandlerResult<T> = Result<T, BundleError>;

/// Outbound transfers and events produced by a successful call.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct CallOutcome {
    pub effects: Vec<Effect>,
    pub events: Vec<BundleEvent>,
}

/// Handle Deposit call.
///
/// Empty `amounts` selects the single-asset path (quantity one per
/// token); otherwise each token id pairs with its quantity. The pull
/// into bundle custody is one atomic batch, so a failed transfer
/// appends nothing.
pub fn handle_deposit(
    state: &mut BundleState,
    ctx: &CallContext,
    assets: &mut impl AssetIntake,
    asset_contract: Address,
    token_ids: Vec<u128>,
    amounts: Vec<u128>,
) -> HandlerResult<CallOutcome> {
    if ctx.sender != state.params.issuer {
        return Err(BundleError::NotIssuer);
    }

    let multi = !amounts.is_empty();
    if multi && amounts.len() != token_ids.len() {
        return Err(BundleError::ItemArityMismatch {
            ids: token_ids.len(),
            amounts: amounts.len(),
        });
    }

    // Pull the whole batch into bundle custody.
    if multi {
        assets.pull_multi(&asset_contract, &ctx.sender, &token_ids, &amounts)?;
    } else {
        assets.pull_single(&asset_contract, &ctx.sender, &token_ids)?;
    }

    // Append to the escrow ledger; position is the item index.
    let mut events = Vec::with_capacity(token_ids.len());
    for (i, token_id) in token_ids.into_iter().enumerate() {
        let amount = if multi { amounts[i] } else { 1 };
        let index = state.item_count();
        state.items.push(EscrowedItem {
            asset_contract,
            token_id,
            amount,
            claimed: false,
        });
        events.push(BundleEvent::ItemDeposited {
            index,
            asset_contract,
            token_id,
            amount,
        });
    }

    Ok(CallOutcome {
        effects: Vec::new(),
        events,
    })
}

/// Handle Issue call.
///
/// Mints the fixed claim-token supply and flips the bundle active. The
/// protocol fee recipient is read from the registry at this moment,
/// never cached: if one is set, `supply / fee_divisor` goes to it and
/// the remainder to the issuer.
pub fn handle_issue(
    state: &mut BundleState,
    ctx: &CallContext,
    token: &mut impl ClaimToken,
    registry: &impl RegistryView,
) -> HandlerResult<CallOutcome> {
    if ctx.sender != state.params.issuer {
        return Err(BundleError::NotIssuer);
    }
    if state.phase == Phase::Active {
        return Err(BundleError::AlreadyActive);
    }

    let supply = state.params.total_supply;
    let fee_recipient = registry.fee_recipient();
    let fee = match fee_recipient {
        Some(recipient) => {
            let fee = supply / state.params.fee_divisor;
            token.mint(&recipient, fee);
            fee
        }
        None => 0,
    };
    token.mint(&ctx.sender, supply - fee);
    state.phase = Phase::Active;

    Ok(CallOutcome {
        effects: Vec::new(),
        events: vec![BundleEvent::Issued {
            supply,
            fee_recipient,
            fee,
        }],
    })
}

/// Handle Refund call.
///
/// Abandons an inactive bundle: every escrowed item is released to `to`
/// and the item list cleared, so the index counter restarts at zero.
pub fn handle_refund(
    state: &mut BundleState,
    ctx: &CallContext,
    to: Address,
) -> HandlerResult<CallOutcome> {
    if ctx.sender != state.params.issuer {
        return Err(BundleError::NotIssuer);
    }
    if state.phase == Phase::Active {
        return Err(BundleError::AlreadyActive);
    }

    let returned: Vec<EscrowedItem> = state.items.drain(..).collect();
    let count = returned.len() as u64;
    let effects = returned
        .into_iter()
        .map(|item| Effect::ReleaseItem {
            asset_contract: item.asset_contract,
            token_id: item.token_id,
            amount: item.amount,
            to,
        })
        .collect();

    Ok(CallOutcome {
        effects,
        events: vec![BundleEvent::BundleRefunded { to, items: count }],
    })
}

/// Handle Bid call.
///
/// The bid amount is the call's attached value. An accepted bid moves
/// the previous top (if any) into the refund ledger and out of the
/// proceeds pool, then records the new top and restarts the lock
/// window.
pub fn handle_bid(
    state: &mut BundleState,
    ctx: &CallContext,
    index: u64,
) -> HandlerResult<CallOutcome> {
    if state.phase != Phase::Active {
        return Err(BundleError::NotActive);
    }
    if index >= state.item_count() {
        return Err(BundleError::UnknownItem(index));
    }

    let standing = state.top_bid(index).map(|top| top.amount).unwrap_or(0);
    if ctx.value <= standing {
        return Err(BundleError::BidTooLow {
            index,
            got: ctx.value,
            standing,
        });
    }
    if let Some(top) = state.top_bid(index) {
        if top.bidder == ctx.sender {
            return Err(BundleError::AlreadyTopBidder(index));
        }
    }
    if state.refund_owed(index, &ctx.sender) > 0 {
        return Err(BundleError::RefundOutstanding(index));
    }

    // The outbid top leaves the pool and becomes a pull-based refund.
    if let Some(prev) = state.bids.remove(&index) {
        *state
            .bid_refunds
            .entry((index, prev.bidder))
            .or_insert(0) += prev.amount;
        state.total_bid_amount -= prev.amount;
    }

    state.bids.insert(
        index,
        TopBid {
            bidder: ctx.sender,
            amount: ctx.value,
            placed_at: ctx.timestamp,
        },
    );
    state.total_bid_amount += ctx.value;

    Ok(CallOutcome {
        effects: Vec::new(),
        events: vec![BundleEvent::BidPlaced {
            index,
            bidder: ctx.sender,
            amount: ctx.value,
        }],
    })
}

/// Handle Unbid call.
///
/// A standing top bidder withdraws the bid itself: impossible once the
/// unlock threshold has been met, and only after the lock window has
/// elapsed. Anyone else collects whatever the refund ledger owes them
/// for the index.
pub fn handle_unbid(
    state: &mut BundleState,
    ctx: &CallContext,
    index: u64,
) -> HandlerResult<CallOutcome> {
    let top = state.bids.get(&index).cloned();
    match top {
        Some(top) if top.bidder == ctx.sender => {
            if state.threshold_met() {
                return Err(BundleError::WinnerCannotUnbid);
            }
            if ctx.timestamp < top.placed_at + state.params.top_bid_lock_secs {
                return Err(BundleError::TopBidLocked(index));
            }

            state.bids.remove(&index);
            state.total_bid_amount -= top.amount;

            Ok(CallOutcome {
                effects: vec![Effect::PayNative {
                    to: ctx.sender,
                    amount: top.amount,
                }],
                events: vec![BundleEvent::BidWithdrawn {
                    index,
                    bidder: ctx.sender,
                    amount: top.amount,
                }],
            })
        }
        _ => {
            let owed = state.bid_refunds.remove(&(index, ctx.sender)).unwrap_or(0);
            if owed == 0 {
                return Err(BundleError::NoBidFound(index));
            }

            Ok(CallOutcome {
                effects: vec![Effect::PayNative {
                    to: ctx.sender,
                    amount: owed,
                }],
                events: vec![BundleEvent::BidWithdrawn {
                    index,
                    bidder: ctx.sender,
                    amount: owed,
                }],
            })
        }
    }
}

/// Handle Claim call.
///
/// Hands an item to its winning bidder once the unlock threshold is
/// met. The bid entry and the proceeds pool are untouched, so the
/// winning amount stays redeemable by claim-token holders.
pub fn handle_claim(
    state: &mut BundleState,
    ctx: &CallContext,
    index: u64,
) -> HandlerResult<CallOutcome> {
    if !state.threshold_met() {
        return Err(BundleError::ThresholdNotMet);
    }

    let winner = state
        .top_bid(index)
        .map(|top| top.bidder == ctx.sender)
        .unwrap_or(false);
    if !winner {
        return Err(BundleError::NotWinner(index));
    }

    let item = state
        .items
        .get_mut(index as usize)
        .ok_or(BundleError::UnknownItem(index))?;
    if item.claimed {
        return Err(BundleError::AlreadyClaimed(index));
    }
    item.claimed = true;

    Ok(CallOutcome {
        effects: vec![Effect::ReleaseItem {
            asset_contract: item.asset_contract,
            token_id: item.token_id,
            amount: item.amount,
            to: ctx.sender,
        }],
        events: vec![BundleEvent::ItemClaimed {
            index,
            winner: ctx.sender,
        }],
    })
}

/// Handle ApproveUnlock call.
///
/// Locks claim tokens under the bundle's account and counts them toward
/// the unlock threshold. The final approval may push the aggregate past
/// the threshold; from then on the gate is a one-way latch.
pub fn handle_approve_unlock(
    state: &mut BundleState,
    ctx: &CallContext,
    token: &mut impl ClaimToken,
    amount: u128,
) -> HandlerResult<CallOutcome> {
    if state.threshold_met() {
        return Err(BundleError::ThresholdReached);
    }

    token.transfer(&ctx.sender, &state.address, amount)?;

    let locked = {
        let entry = state.unlock_approved.entry(ctx.sender).or_insert(0);
        *entry += amount;
        *entry
    };
    state.unlock_votes += amount;

    Ok(CallOutcome {
        effects: Vec::new(),
        events: vec![BundleEvent::UnlockVotesChanged {
            holder: ctx.sender,
            locked,
            total_votes: state.unlock_votes,
        }],
    })
}

/// Handle UnapproveUnlock call.
pub fn handle_unapprove_unlock(
    state: &mut BundleState,
    ctx: &CallContext,
    token: &mut impl ClaimToken,
    amount: u128,
) -> HandlerResult<CallOutcome> {
    if state.threshold_met() {
        return Err(BundleError::ThresholdReached);
    }

    let locked = state.locked_balance(&ctx.sender);
    if locked < amount {
        return Err(BundleError::InsufficientLocked {
            needed: amount,
            locked,
        });
    }

    let remaining = locked - amount;
    if remaining == 0 {
        state.unlock_approved.remove(&ctx.sender);
    } else {
        state.unlock_approved.insert(ctx.sender, remaining);
    }
    state.unlock_votes -= amount;

    token.transfer(&state.address, &ctx.sender, amount)?;

    Ok(CallOutcome {
        effects: Vec::new(),
        events: vec![BundleEvent::UnlockVotesChanged {
            holder: ctx.sender,
            locked: remaining,
            total_votes: state.unlock_votes,
        }],
    })
}

/// Handle Redeem call.
///
/// Burns the caller's claim tokens (the passed amount plus anything
/// they still have locked) for a pro-rata cut of the proceeds pool:
/// `floor(pool * share / original_supply)`. The denominator is the
/// immutable original supply, so redemptions at the same pool state
/// price identically. The aggregate vote counter stays put, keeping the
/// threshold latch met.
pub fn handle_redeem(
    state: &mut BundleState,
    ctx: &CallContext,
    token: &mut impl ClaimToken,
    amount: u128,
) -> HandlerResult<CallOutcome> {
    if !state.threshold_met() {
        return Err(BundleError::ThresholdNotMet);
    }

    token.transfer(&ctx.sender, &state.address, amount)?;

    let locked = state.unlock_approved.remove(&ctx.sender).unwrap_or(0);
    let share = locked + amount;
    token.burn(&state.address, share)?;

    let payout = state
        .total_bid_amount
        .checked_mul(share)
        .ok_or(BundleError::Overflow)?
        / state.params.total_supply;

    let mut effects = Vec::new();
    if payout > 0 {
        effects.push(Effect::PayNative {
            to: ctx.sender,
            amount: payout,
        });
    }

    Ok(CallOutcome {
        effects,
        events: vec![BundleEvent::Redeemed {
            holder: ctx.sender,
            share,
            payout,
        }],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::{AssetError, TokenError};
    use bundle_types::BundleParams;
    use std::collections::HashMap;

    const ISSUER: Address = [1u8; 32];
    const ALICE: Address = [0xA1; 32];
    const BOB: Address = [0xB0; 32];
    const CAROL: Address = [0xC1; 32];
    const BUNDLE: Address = [0xBB; 32];
    const NFT: Address = [0x71; 32];
    const FEE_TO: Address = [0xFE; 32];

    const LOCK: u64 = 259_200;

    fn test_params() -> BundleParams {
        BundleParams {
            issuer: ISSUER,
            total_supply: 1000,
            decimals: 18,
            name: "Bundle".into(),
            symbol: "BNDL".into(),
            threshold: 950,
            description: String::new(),
            fee_divisor: 200,
            top_bid_lock_secs: LOCK,
        }
    }

    fn collecting_state() -> BundleState {
        BundleState::new(BUNDLE, test_params())
    }

    fn active_state() -> BundleState {
        let mut state = collecting_state();
        state.phase = Phase::Active;
        state
    }

    fn seed_items(state: &mut BundleState, count: u64) {
        for token_id in 0..count {
            state.items.push(EscrowedItem {
                asset_contract: NFT,
                token_id: token_id as u128,
                amount: 1,
                claimed: false,
            });
        }
    }

    fn ctx(sender: Address) -> CallContext {
        ctx_at(sender, 0, 1000)
    }

    fn ctx_with_value(sender: Address, value: u128) -> CallContext {
        ctx_at(sender, value, 1000)
    }

    fn ctx_at(sender: Address, value: u128, timestamp: u64) -> CallContext {
        CallContext {
            sender,
            block_height: 100,
            timestamp,
            value,
        }
    }

    #[derive(Default)]
    struct TestToken {
        balances: HashMap<Address, u128>,
        supply: u128,
    }

    impl TestToken {
        fn with_balances(balances: &[(Address, u128)]) -> Self {
            let mut token = Self::default();
            for (owner, amount) in balances {
                token.mint(owner, *amount);
            }
            token
        }
    }

    impl ClaimToken for TestToken {
        fn total_supply(&self) -> u128 {
            self.supply
        }

        fn balance_of(&self, owner: &Address) -> u128 {
            self.balances.get(owner).copied().unwrap_or(0)
        }

        fn mint(&mut self, to: &Address, amount: u128) {
            *self.balances.entry(*to).or_insert(0) += amount;
            self.supply += amount;
        }

        fn burn(&mut self, from: &Address, amount: u128) -> Result<(), TokenError> {
            let balance = self.balance_of(from);
            if balance < amount {
                return Err(TokenError::InsufficientBalance {
                    needed: amount,
                    available: balance,
                });
            }
            self.balances.insert(*from, balance - amount);
            self.supply -= amount;
            Ok(())
        }

        fn transfer(&mut self, from: &Address, to: &Address, amount: u128) -> Result<(), TokenError> {
            let balance = self.balance_of(from);
            if balance < amount {
                return Err(TokenError::InsufficientBalance {
                    needed: amount,
                    available: balance,
                });
            }
            self.balances.insert(*from, balance - amount);
            *self.balances.entry(*to).or_insert(0) += amount;
            Ok(())
        }
    }

    /// Records pulls instead of moving anything; can be told to fail.
    #[derive(Default)]
    struct TestAssets {
        fail_with: Option<AssetError>,
        pulls: Vec<(Address, Vec<u128>, Vec<u128>)>,
    }

    impl AssetIntake for TestAssets {
        fn pull_single(
            &mut self,
            contract: &Address,
            _from: &Address,
            token_ids: &[u128],
        ) -> Result<(), AssetError> {
            if let Some(err) = self.fail_with.clone() {
                return Err(err);
            }
            self.pulls.push((*contract, token_ids.to_vec(), Vec::new()));
            Ok(())
        }

        fn pull_multi(
            &mut self,
            contract: &Address,
            _from: &Address,
            token_ids: &[u128],
            amounts: &[u128],
        ) -> Result<(), AssetError> {
            if let Some(err) = self.fail_with.clone() {
                return Err(err);
            }
            self.pulls
                .push((*contract, token_ids.to_vec(), amounts.to_vec()));
            Ok(())
        }
    }

    struct TestRegistry {
        fee_to: Option<Address>,
    }

    impl RegistryView for TestRegistry {
        fn fee_recipient(&self) -> Option<Address> {
            self.fee_to
        }
    }

    // === Escrow & Issuance ===

    #[test]
    fn test_deposit_single_assets() {
        let mut state = collecting_state();
        let mut assets = TestAssets::default();

        let outcome = handle_deposit(
            &mut state,
            &ctx(ISSUER),
            &mut assets,
            NFT,
            vec![0, 1, 2],
            vec![],
        )
        .unwrap();

        assert_eq!(state.item_count(), 3);
        assert_eq!(state.items[1].token_id, 1);
        assert_eq!(state.items[1].amount, 1);
        assert!(!state.items[1].claimed);
        assert_eq!(assets.pulls, vec![(NFT, vec![0, 1, 2], vec![])]);
        assert_eq!(outcome.events.len(), 3);
        assert_eq!(
            outcome.events[2],
            BundleEvent::ItemDeposited {
                index: 2,
                asset_contract: NFT,
                token_id: 2,
                amount: 1,
            }
        );
    }

    #[test]
    fn test_deposit_multi_assets_records_quantities() {
        let mut state = collecting_state();
        let mut assets = TestAssets::default();

        let outcome = handle_deposit(
            &mut state,
            &ctx(ISSUER),
            &mut assets,
            NFT,
            vec![7, 8],
            vec![2, 1],
        )
        .unwrap();

        assert_eq!(state.item_count(), 2);
        assert_eq!(state.items[0].amount, 2);
        assert_eq!(state.items[1].amount, 1);
        assert_eq!(assets.pulls, vec![(NFT, vec![7, 8], vec![2, 1])]);
        assert_eq!(outcome.events.len(), 2);
    }

    #[test]
    fn test_deposit_requires_issuer() {
        let mut state = collecting_state();
        let mut assets = TestAssets::default();

        let result = handle_deposit(&mut state, &ctx(ALICE), &mut assets, NFT, vec![0], vec![]);

        assert!(matches!(result, Err(BundleError::NotIssuer)));
        assert_eq!(state.item_count(), 0);
        assert!(assets.pulls.is_empty());
    }

    #[test]
    fn test_deposit_arity_mismatch() {
        let mut state = collecting_state();
        let mut assets = TestAssets::default();

        let result = handle_deposit(
            &mut state,
            &ctx(ISSUER),
            &mut assets,
            NFT,
            vec![1, 2],
            vec![5],
        );

        assert!(matches!(
            result,
            Err(BundleError::ItemArityMismatch { ids: 2, amounts: 1 })
        ));
        assert!(assets.pulls.is_empty());
    }

    #[test]
    fn test_failed_pull_appends_nothing() {
        let mut state = collecting_state();
        let mut assets = TestAssets {
            fail_with: Some(AssetError::NotOwner { token_id: 1 }),
            ..Default::default()
        };

        let result = handle_deposit(&mut state, &ctx(ISSUER), &mut assets, NFT, vec![0, 1], vec![]);

        assert!(matches!(result, Err(BundleError::Asset(_))));
        assert_eq!(state.item_count(), 0);
    }

    #[test]
    fn test_deposit_allowed_after_issuance() {
        let mut state = active_state();
        seed_items(&mut state, 2);
        let mut assets = TestAssets::default();

        let outcome =
            handle_deposit(&mut state, &ctx(ISSUER), &mut assets, NFT, vec![9], vec![]).unwrap();

        assert_eq!(state.item_count(), 3);
        assert!(matches!(
            outcome.events[0],
            BundleEvent::ItemDeposited { index: 2, .. }
        ));
    }

    #[test]
    fn test_issue_mints_supply_to_issuer() {
        let mut state = collecting_state();
        let mut token = TestToken::default();
        let registry = TestRegistry { fee_to: None };

        let outcome = handle_issue(&mut state, &ctx(ISSUER), &mut token, &registry).unwrap();

        assert_eq!(state.phase, Phase::Active);
        assert_eq!(token.balance_of(&ISSUER), 1000);
        assert_eq!(token.total_supply(), 1000);
        assert_eq!(
            outcome.events,
            vec![BundleEvent::Issued {
                supply: 1000,
                fee_recipient: None,
                fee: 0,
            }]
        );
    }

    #[test]
    fn test_issue_splits_protocol_fee() {
        let mut state = collecting_state();
        let mut token = TestToken::default();
        let registry = TestRegistry {
            fee_to: Some(FEE_TO),
        };

        let outcome = handle_issue(&mut state, &ctx(ISSUER), &mut token, &registry).unwrap();

        assert_eq!(token.balance_of(&FEE_TO), 5);
        assert_eq!(token.balance_of(&ISSUER), 995);
        assert_eq!(token.total_supply(), 1000);
        assert_eq!(
            outcome.events,
            vec![BundleEvent::Issued {
                supply: 1000,
                fee_recipient: Some(FEE_TO),
                fee: 5,
            }]
        );
    }

    #[test]
    fn test_issue_requires_issuer() {
        let mut state = collecting_state();
        let mut token = TestToken::default();
        let registry = TestRegistry { fee_to: None };

        let result = handle_issue(&mut state, &ctx(ALICE), &mut token, &registry);

        assert!(matches!(result, Err(BundleError::NotIssuer)));
        assert_eq!(state.phase, Phase::Collecting);
    }

    #[test]
    fn test_issue_twice_fails() {
        let mut state = collecting_state();
        let mut token = TestToken::default();
        let registry = TestRegistry { fee_to: None };

        handle_issue(&mut state, &ctx(ISSUER), &mut token, &registry).unwrap();
        let result = handle_issue(&mut state, &ctx(ISSUER), &mut token, &registry);

        assert!(matches!(result, Err(BundleError::AlreadyActive)));
        assert_eq!(token.total_supply(), 1000);
    }

    #[test]
    fn test_refund_returns_escrow_and_resets_indices() {
        let mut state = collecting_state();
        seed_items(&mut state, 3);

        let outcome = handle_refund(&mut state, &ctx(ISSUER), ALICE).unwrap();

        assert_eq!(state.item_count(), 0);
        assert_eq!(outcome.effects.len(), 3);
        assert_eq!(
            outcome.effects[0],
            Effect::ReleaseItem {
                asset_contract: NFT,
                token_id: 0,
                amount: 1,
                to: ALICE,
            }
        );
        assert_eq!(
            outcome.events,
            vec![BundleEvent::BundleRefunded { to: ALICE, items: 3 }]
        );

        // Index space restarts at zero for a fresh deposit run.
        let mut assets = TestAssets::default();
        let outcome =
            handle_deposit(&mut state, &ctx(ISSUER), &mut assets, NFT, vec![9], vec![]).unwrap();
        assert!(matches!(
            outcome.events[0],
            BundleEvent::ItemDeposited { index: 0, .. }
        ));
    }

    #[test]
    fn test_refund_requires_issuer() {
        let mut state = collecting_state();
        seed_items(&mut state, 1);

        let result = handle_refund(&mut state, &ctx(CAROL), CAROL);

        assert!(matches!(result, Err(BundleError::NotIssuer)));
        assert_eq!(state.item_count(), 1);
    }

    #[test]
    fn test_refund_after_issue_fails() {
        let mut state = active_state();
        seed_items(&mut state, 1);

        let result = handle_refund(&mut state, &ctx(ISSUER), ISSUER);

        assert!(matches!(result, Err(BundleError::AlreadyActive)));
        assert_eq!(state.item_count(), 1);
    }

    // === Auction ===

    #[test]
    fn test_first_bid_sets_top() {
        let mut state = active_state();
        seed_items(&mut state, 1);

        let outcome = handle_bid(&mut state, &ctx_with_value(BOB, 50), 0).unwrap();

        let top = state.top_bid(0).unwrap();
        assert_eq!(top.bidder, BOB);
        assert_eq!(top.amount, 50);
        assert_eq!(top.placed_at, 1000);
        assert_eq!(state.total_bid_amount, 50);
        assert_eq!(
            outcome.events,
            vec![BundleEvent::BidPlaced {
                index: 0,
                bidder: BOB,
                amount: 50,
            }]
        );
    }

    #[test]
    fn test_bid_requires_active_bundle() {
        let mut state = collecting_state();
        seed_items(&mut state, 1);

        let result = handle_bid(&mut state, &ctx_with_value(BOB, 50), 0);

        assert!(matches!(result, Err(BundleError::NotActive)));
    }

    #[test]
    fn test_bid_on_unknown_item() {
        let mut state = active_state();
        seed_items(&mut state, 1);

        let result = handle_bid(&mut state, &ctx_with_value(BOB, 50), 5);

        assert!(matches!(result, Err(BundleError::UnknownItem(5))));
    }

    #[test]
    fn test_bid_must_strictly_beat_standing() {
        let mut state = active_state();
        seed_items(&mut state, 1);

        // A zero first bid does not beat the empty standing bid.
        let result = handle_bid(&mut state, &ctx_with_value(BOB, 0), 0);
        assert!(matches!(
            result,
            Err(BundleError::BidTooLow { got: 0, standing: 0, .. })
        ));

        handle_bid(&mut state, &ctx_with_value(BOB, 50), 0).unwrap();
        let result = handle_bid(&mut state, &ctx_with_value(ALICE, 50), 0);
        assert!(matches!(
            result,
            Err(BundleError::BidTooLow { got: 50, standing: 50, .. })
        ));
    }

    #[test]
    fn test_outbid_moves_refund_and_keeps_net_pool() {
        let mut state = active_state();
        seed_items(&mut state, 1);

        handle_bid(&mut state, &ctx_with_value(BOB, 50), 0).unwrap();
        handle_bid(&mut state, &ctx_with_value(CAROL, 100), 0).unwrap();

        assert_eq!(state.refund_owed(0, &BOB), 50);
        assert_eq!(state.top_bid(0).unwrap().bidder, CAROL);
        // The pool tracks standing tops, not gross volume.
        assert_eq!(state.total_bid_amount, 100);
    }

    #[test]
    fn test_rebid_over_own_top_rejected() {
        let mut state = active_state();
        seed_items(&mut state, 1);

        handle_bid(&mut state, &ctx_with_value(BOB, 50), 0).unwrap();
        let result = handle_bid(&mut state, &ctx_with_value(BOB, 60), 0);

        assert!(matches!(result, Err(BundleError::AlreadyTopBidder(0))));
    }

    #[test]
    fn test_bid_with_outstanding_refund_rejected() {
        let mut state = active_state();
        seed_items(&mut state, 1);

        handle_bid(&mut state, &ctx_with_value(BOB, 50), 0).unwrap();
        handle_bid(&mut state, &ctx_with_value(CAROL, 100), 0).unwrap();
        let result = handle_bid(&mut state, &ctx_with_value(BOB, 150), 0);

        assert!(matches!(result, Err(BundleError::RefundOutstanding(0))));
    }

    #[test]
    fn test_new_bid_restarts_lock_window() {
        let mut state = active_state();
        seed_items(&mut state, 1);

        handle_bid(&mut state, &ctx_at(BOB, 50, 1000), 0).unwrap();
        handle_bid(&mut state, &ctx_at(CAROL, 100, 2000), 0).unwrap();

        assert_eq!(state.top_bid(0).unwrap().placed_at, 2000);
    }

    #[test]
    fn test_collect_outbid_refund() {
        let mut state = active_state();
        seed_items(&mut state, 1);
        handle_bid(&mut state, &ctx_with_value(BOB, 50), 0).unwrap();
        handle_bid(&mut state, &ctx_with_value(CAROL, 100), 0).unwrap();

        let outcome = handle_unbid(&mut state, &ctx(BOB), 0).unwrap();

        assert_eq!(
            outcome.effects,
            vec![Effect::PayNative { to: BOB, amount: 50 }]
        );
        assert_eq!(state.refund_owed(0, &BOB), 0);
        // Collecting a refund does not touch the pool.
        assert_eq!(state.total_bid_amount, 100);

        let result = handle_unbid(&mut state, &ctx(BOB), 0);
        assert!(matches!(result, Err(BundleError::NoBidFound(0))));
    }

    #[test]
    fn test_top_unbid_locked_until_window_elapses() {
        let mut state = active_state();
        seed_items(&mut state, 1);
        handle_bid(&mut state, &ctx_at(BOB, 50, 1000), 0).unwrap();

        let result = handle_unbid(&mut state, &ctx_at(BOB, 0, 1000 + LOCK - 1), 0);
        assert!(matches!(result, Err(BundleError::TopBidLocked(0))));
        assert_eq!(state.total_bid_amount, 50);

        let outcome = handle_unbid(&mut state, &ctx_at(BOB, 0, 1000 + LOCK), 0).unwrap();
        assert_eq!(
            outcome.effects,
            vec![Effect::PayNative { to: BOB, amount: 50 }]
        );
        assert!(state.top_bid(0).is_none());
        assert_eq!(state.total_bid_amount, 0);
    }

    #[test]
    fn test_top_unbid_frozen_after_threshold() {
        let mut state = active_state();
        seed_items(&mut state, 1);
        handle_bid(&mut state, &ctx_at(BOB, 50, 1000), 0).unwrap();
        state.unlock_votes = state.params.threshold;

        // Reported ahead of the lock check even while the window is open.
        let result = handle_unbid(&mut state, &ctx_at(BOB, 0, 1001), 0);

        assert!(matches!(result, Err(BundleError::WinnerCannotUnbid)));
        assert!(state.top_bid(0).is_some());
    }

    #[test]
    fn test_unbid_without_bid_or_refund() {
        let mut state = active_state();
        seed_items(&mut state, 1);

        let result = handle_unbid(&mut state, &ctx(ALICE), 0);

        assert!(matches!(result, Err(BundleError::NoBidFound(0))));
    }

    #[test]
    fn test_claim_requires_threshold() {
        let mut state = active_state();
        seed_items(&mut state, 1);
        handle_bid(&mut state, &ctx_with_value(BOB, 50), 0).unwrap();

        let result = handle_claim(&mut state, &ctx(BOB), 0);

        assert!(matches!(result, Err(BundleError::ThresholdNotMet)));
    }

    #[test]
    fn test_claim_only_winner() {
        let mut state = active_state();
        seed_items(&mut state, 1);
        handle_bid(&mut state, &ctx_with_value(BOB, 50), 0).unwrap();
        state.unlock_votes = state.params.threshold;

        let result = handle_claim(&mut state, &ctx(ALICE), 0);

        assert!(matches!(result, Err(BundleError::NotWinner(0))));
    }

    #[test]
    fn test_claim_releases_item_once() {
        let mut state = active_state();
        seed_items(&mut state, 1);
        handle_bid(&mut state, &ctx_with_value(BOB, 50), 0).unwrap();
        state.unlock_votes = state.params.threshold;

        let outcome = handle_claim(&mut state, &ctx(BOB), 0).unwrap();

        assert!(state.items[0].claimed);
        assert_eq!(
            outcome.effects,
            vec![Effect::ReleaseItem {
                asset_contract: NFT,
                token_id: 0,
                amount: 1,
                to: BOB,
            }]
        );
        // The winning bid stays in the pool for redemption.
        assert_eq!(state.top_bid(0).unwrap().amount, 50);
        assert_eq!(state.total_bid_amount, 50);

        let result = handle_claim(&mut state, &ctx(BOB), 0);
        assert!(matches!(result, Err(BundleError::AlreadyClaimed(0))));
    }

    // === Unlock Voting ===

    #[test]
    fn test_approve_unlock_locks_tokens() {
        let mut state = active_state();
        let mut token = TestToken::with_balances(&[(ALICE, 100)]);

        let outcome = handle_approve_unlock(&mut state, &ctx(ALICE), &mut token, 80).unwrap();

        assert_eq!(token.balance_of(&ALICE), 20);
        assert_eq!(token.balance_of(&BUNDLE), 80);
        assert_eq!(state.locked_balance(&ALICE), 80);
        assert_eq!(state.unlock_votes, 80);
        assert_eq!(
            outcome.events,
            vec![BundleEvent::UnlockVotesChanged {
                holder: ALICE,
                locked: 80,
                total_votes: 80,
            }]
        );
    }

    #[test]
    fn test_approve_unlock_insufficient_balance() {
        let mut state = active_state();
        let mut token = TestToken::with_balances(&[(ALICE, 100)]);

        let result = handle_approve_unlock(&mut state, &ctx(ALICE), &mut token, 120);

        assert!(matches!(
            result,
            Err(BundleError::Token(TokenError::InsufficientBalance {
                needed: 120,
                available: 100,
            }))
        ));
        assert_eq!(state.unlock_votes, 0);
        assert_eq!(state.locked_balance(&ALICE), 0);
    }

    #[test]
    fn test_final_approval_can_cross_threshold() {
        let mut state = active_state();
        state.params.threshold = 100;
        let mut token = TestToken::with_balances(&[(ALICE, 60), (BOB, 50)]);

        handle_approve_unlock(&mut state, &ctx(ALICE), &mut token, 60).unwrap();
        assert!(!state.threshold_met());

        handle_approve_unlock(&mut state, &ctx(BOB), &mut token, 50).unwrap();
        assert!(state.threshold_met());
        assert_eq!(state.unlock_votes, 110);

        let result = handle_approve_unlock(&mut state, &ctx(ALICE), &mut token, 1);
        assert!(matches!(result, Err(BundleError::ThresholdReached)));
        assert_eq!(token.balance_of(&ALICE), 0);
    }

    #[test]
    fn test_unapprove_returns_tokens() {
        let mut state = active_state();
        let mut token = TestToken::with_balances(&[(ALICE, 100)]);
        handle_approve_unlock(&mut state, &ctx(ALICE), &mut token, 80).unwrap();

        let outcome = handle_unapprove_unlock(&mut state, &ctx(ALICE), &mut token, 30).unwrap();

        assert_eq!(token.balance_of(&ALICE), 50);
        assert_eq!(token.balance_of(&BUNDLE), 50);
        assert_eq!(state.locked_balance(&ALICE), 50);
        assert_eq!(state.unlock_votes, 50);
        assert_eq!(
            outcome.events,
            vec![BundleEvent::UnlockVotesChanged {
                holder: ALICE,
                locked: 50,
                total_votes: 50,
            }]
        );
    }

    #[test]
    fn test_unapprove_more_than_locked() {
        let mut state = active_state();
        let mut token = TestToken::with_balances(&[(ALICE, 100)]);
        handle_approve_unlock(&mut state, &ctx(ALICE), &mut token, 30).unwrap();

        let result = handle_unapprove_unlock(&mut state, &ctx(ALICE), &mut token, 50);

        assert!(matches!(
            result,
            Err(BundleError::InsufficientLocked {
                needed: 50,
                locked: 30,
            })
        ));
    }

    #[test]
    fn test_unapprove_after_latch() {
        let mut state = active_state();
        state.unlock_votes = state.params.threshold;
        let mut token = TestToken::default();

        let result = handle_unapprove_unlock(&mut state, &ctx(ALICE), &mut token, 1);

        assert!(matches!(result, Err(BundleError::ThresholdReached)));
    }

    // === Redemption ===

    #[test]
    fn test_redeem_requires_threshold() {
        let mut state = active_state();
        let mut token = TestToken::with_balances(&[(ALICE, 100)]);

        let result = handle_redeem(&mut state, &ctx(ALICE), &mut token, 10);

        assert!(matches!(result, Err(BundleError::ThresholdNotMet)));
    }

    #[test]
    fn test_redeem_pays_pro_rata_floor() {
        let mut state = active_state();
        state.total_bid_amount = 140;
        state.unlock_votes = 950;
        state.unlock_approved.insert(ALICE, 80);
        let mut token = TestToken::with_balances(&[(ALICE, 20), (BUNDLE, 950)]);

        // Locked share alone: floor(140 * 80 / 1000) = 11.
        let outcome = handle_redeem(&mut state, &ctx(ALICE), &mut token, 0).unwrap();
        assert_eq!(
            outcome.effects,
            vec![Effect::PayNative { to: ALICE, amount: 11 }]
        );
        assert_eq!(state.locked_balance(&ALICE), 0);
        assert_eq!(token.balance_of(&BUNDLE), 870);

        // Liquid tokens after the locked entry is gone: floor(140 * 20 / 1000) = 2,
        // still against the original supply.
        let outcome = handle_redeem(&mut state, &ctx(ALICE), &mut token, 20).unwrap();
        assert_eq!(
            outcome.effects,
            vec![Effect::PayNative { to: ALICE, amount: 2 }]
        );
        assert_eq!(token.balance_of(&ALICE), 0);
        assert_eq!(
            outcome.events,
            vec![BundleEvent::Redeemed {
                holder: ALICE,
                share: 20,
                payout: 2,
            }]
        );
    }

    #[test]
    fn test_redeem_with_nothing() {
        let mut state = active_state();
        state.total_bid_amount = 140;
        state.unlock_votes = 950;
        let mut token = TestToken::default();

        let outcome = handle_redeem(&mut state, &ctx(ALICE), &mut token, 0).unwrap();

        assert!(outcome.effects.is_empty());
        assert_eq!(
            outcome.events,
            vec![BundleEvent::Redeemed {
                holder: ALICE,
                share: 0,
                payout: 0,
            }]
        );
    }

    #[test]
    fn test_redeem_insufficient_liquid_balance() {
        let mut state = active_state();
        state.unlock_votes = 950;
        state.unlock_approved.insert(ALICE, 80);
        let mut token = TestToken::with_balances(&[(ALICE, 20), (BUNDLE, 950)]);

        let result = handle_redeem(&mut state, &ctx(ALICE), &mut token, 30);

        assert!(matches!(
            result,
            Err(BundleError::Token(TokenError::InsufficientBalance { .. }))
        ));
        // Nothing moved, the locked entry is intact.
        assert_eq!(state.locked_balance(&ALICE), 80);
        assert_eq!(token.balance_of(&ALICE), 20);
    }

    #[test]
    fn test_redeem_keeps_vote_latch() {
        let mut state = active_state();
        state.total_bid_amount = 140;
        state.unlock_votes = 950;
        state.unlock_approved.insert(ALICE, 80);
        let mut token = TestToken::with_balances(&[(BUNDLE, 950)]);

        handle_redeem(&mut state, &ctx(ALICE), &mut token, 0).unwrap();

        assert_eq!(state.unlock_votes, 950);
        assert!(state.threshold_met());
    }
}
