//! End-to-end integration tests for the bundle auction system.
//!
//! These tests drive the in-memory chain through complete bundle
//! lifecycles:
//! 1. Escrow deposits and issuance
//! 2. Per-item English auctions with outbid refunds
//! 3. Unlock voting up to the threshold latch
//! 4. Winner claims and pro-rata proceeds redemption

use bundle_module::external::{AssetError, ClaimToken};
use bundle_module::genesis::DEFAULT_TOP_BID_LOCK_SECS;
use bundle_module::{BundleCall, BundleConfig, BundleError};
use bundle_types::{Address, AssetKind, BundleEvent};
use mock_chain::{Chain, ChainError};

const ADMIN: Address = [0xAD; 32];
const ALICE: Address = [0xA1; 32];
const BOB: Address = [0xB0; 32];
const CAROL: Address = [0xC1; 32];
const FEE_TO: Address = [0xFE; 32];
const NFT: Address = [0x71; 32];
const MULTI: Address = [0x72; 32];

/// The full reference walkthrough: a 1000-supply bundle with a 950
/// threshold, three auctioned items, and a 140 proceeds pool paid out
/// as 11 / 2 / 112 / 14.
#[test]
fn test_full_bundle_lifecycle() {
    let mut chain = Chain::new(ADMIN);

    // ========================================
    // Phase 1: Escrow and issuance
    // ========================================

    let bundle = chain.create_bundle(ALICE, reference_config()).unwrap();
    chain.assets.create_contract(NFT, AssetKind::Single);
    for token_id in 0..3 {
        chain.assets.mint(&NFT, token_id, ALICE, 1).unwrap();
    }
    chain.assets.set_operator(&NFT, ALICE, bundle, true).unwrap();

    execute(
        &mut chain,
        bundle,
        ALICE,
        0,
        BundleCall::Deposit {
            asset_contract: NFT,
            token_ids: vec![0, 1, 2],
            amounts: vec![],
        },
    );
    execute(&mut chain, bundle, ALICE, 0, BundleCall::Issue);
    assert_eq!(chain.token_balance(&bundle, &ALICE).unwrap(), 1000);
    println!("Bundle issued: 1000 claim tokens minted to the issuer");

    // Distribute the claim token: Alice keeps 100, Bob 800, Carol 100.
    chain.token_transfer(&bundle, ALICE, BOB, 800).unwrap();
    chain.token_transfer(&bundle, ALICE, CAROL, 100).unwrap();

    // ========================================
    // Phase 2: Auctions
    // ========================================

    chain.bank.credit(&ALICE, 100);
    chain.bank.credit(&BOB, 100);
    chain.bank.credit(&CAROL, 100);

    execute(&mut chain, bundle, BOB, 50, BundleCall::Bid { index: 0 });
    execute(&mut chain, bundle, BOB, 10, BundleCall::Bid { index: 1 });
    execute(&mut chain, bundle, CAROL, 30, BundleCall::Bid { index: 1 });
    execute(&mut chain, bundle, BOB, 20, BundleCall::Bid { index: 2 });
    execute(&mut chain, bundle, ALICE, 60, BundleCall::Bid { index: 2 });

    let state = &chain.bundle(&bundle).unwrap().state;
    assert_eq!(state.total_bid_amount, 140);
    assert_eq!(state.refund_owed(1, &BOB), 10);
    assert_eq!(state.refund_owed(2, &BOB), 20);
    println!("Auctions standing at 50 / 30 / 60, pool = 140");

    // ========================================
    // Phase 3: Unlock voting
    // ========================================

    execute(&mut chain, bundle, BOB, 0, BundleCall::ApproveUnlock { amount: 50 });
    execute(&mut chain, bundle, CAROL, 0, BundleCall::ApproveUnlock { amount: 90 });
    execute(&mut chain, bundle, ALICE, 0, BundleCall::ApproveUnlock { amount: 80 });
    assert_eq!(chain.bundle(&bundle).unwrap().state.unlock_votes, 220);

    // 220 of 950: claims stay gated.
    let result = chain.execute(bundle, BOB, 0, BundleCall::Claim { index: 0 });
    assert!(matches!(
        result,
        Err(ChainError::Bundle(BundleError::ThresholdNotMet))
    ));

    execute(&mut chain, bundle, BOB, 0, BundleCall::ApproveUnlock { amount: 730 });
    let state = &chain.bundle(&bundle).unwrap().state;
    assert_eq!(state.unlock_votes, 950);
    assert!(state.threshold_met());
    println!("Unlock threshold 950 reached");

    // The latch closes voting in both directions and freezes the winners.
    let result = chain.execute(bundle, CAROL, 0, BundleCall::ApproveUnlock { amount: 1 });
    assert!(matches!(
        result,
        Err(ChainError::Bundle(BundleError::ThresholdReached))
    ));
    let result = chain.execute(bundle, ALICE, 0, BundleCall::UnapproveUnlock { amount: 1 });
    assert!(matches!(
        result,
        Err(ChainError::Bundle(BundleError::ThresholdReached))
    ));
    let result = chain.execute(bundle, ALICE, 0, BundleCall::Unbid { index: 2 });
    assert!(matches!(
        result,
        Err(ChainError::Bundle(BundleError::WinnerCannotUnbid))
    ));

    // ========================================
    // Phase 4: Winner claims
    // ========================================

    let result = chain.execute(bundle, CAROL, 0, BundleCall::Claim { index: 0 });
    assert!(matches!(
        result,
        Err(ChainError::Bundle(BundleError::NotWinner(0)))
    ));

    execute(&mut chain, bundle, BOB, 0, BundleCall::Claim { index: 0 });
    execute(&mut chain, bundle, CAROL, 0, BundleCall::Claim { index: 1 });
    execute(&mut chain, bundle, ALICE, 0, BundleCall::Claim { index: 2 });
    assert_eq!(chain.assets.owner_of(&NFT, 0), Some(BOB));
    assert_eq!(chain.assets.owner_of(&NFT, 1), Some(CAROL));
    assert_eq!(chain.assets.owner_of(&NFT, 2), Some(ALICE));

    let result = chain.execute(bundle, BOB, 0, BundleCall::Claim { index: 0 });
    assert!(matches!(
        result,
        Err(ChainError::Bundle(BundleError::AlreadyClaimed(0)))
    ));
    println!("All three items delivered to their winners");

    // ========================================
    // Phase 5: Redemption
    // ========================================

    // Alice's locked 80 alone: floor(140 * 80 / 1000) = 11.
    let before = chain.bank.balance(&ALICE);
    execute(&mut chain, bundle, ALICE, 0, BundleCall::Redeem { amount: 0 });
    assert_eq!(chain.bank.balance(&ALICE), before + 11);

    // Alice's remaining 20 liquid, still against the original supply:
    // floor(140 * 20 / 1000) = 2.
    execute(&mut chain, bundle, ALICE, 0, BundleCall::Redeem { amount: 20 });
    assert_eq!(chain.bank.balance(&ALICE), before + 13);

    // Bob: 780 locked + 20 liquid = 800, floor(140 * 800 / 1000) = 112.
    let before = chain.bank.balance(&BOB);
    execute(&mut chain, bundle, BOB, 0, BundleCall::Redeem { amount: 20 });
    assert_eq!(chain.bank.balance(&BOB), before + 112);

    // Carol: 90 locked + 10 liquid = 100, floor(140 * 100 / 1000) = 14.
    let before = chain.bank.balance(&CAROL);
    execute(&mut chain, bundle, CAROL, 0, BundleCall::Redeem { amount: 10 });
    assert_eq!(chain.bank.balance(&CAROL), before + 14);

    // Every claim token has been burned; redeeming again pays nothing.
    assert_eq!(chain.bundle(&bundle).unwrap().token.total_supply(), 0);
    let before = chain.bank.balance(&ALICE);
    execute(&mut chain, bundle, ALICE, 0, BundleCall::Redeem { amount: 0 });
    assert_eq!(chain.bank.balance(&ALICE), before);

    // The bundle account holds 1 unit of floor dust plus Bob's two
    // uncollected outbid refunds.
    assert_eq!(chain.bank.balance(&bundle), 1 + 30);

    // Refund collection stays open after everything else is settled.
    execute(&mut chain, bundle, BOB, 0, BundleCall::Unbid { index: 1 });
    execute(&mut chain, bundle, BOB, 0, BundleCall::Unbid { index: 2 });
    assert_eq!(chain.bank.balance(&bundle), 1);

    let redemptions = chain
        .events()
        .iter()
        .filter(|r| matches!(r.event, BundleEvent::Redeemed { .. }))
        .count();
    assert_eq!(redemptions, 5);
    println!("Proceeds fully distributed, 1 unit of floor dust remains");
}

/// Depositing singles then multis yields contiguous indices with the
/// right quantities, and a pre-issuance refund resets the index space.
#[test]
fn test_escrow_counts_and_refund() {
    let mut chain = Chain::new(ADMIN);
    let bundle = chain.create_bundle(ALICE, reference_config()).unwrap();

    chain.assets.create_contract(NFT, AssetKind::Single);
    chain.assets.create_contract(MULTI, AssetKind::Multi);
    chain.assets.mint(&NFT, 0, ALICE, 1).unwrap();
    chain.assets.mint(&NFT, 1, ALICE, 1).unwrap();
    chain.assets.mint(&MULTI, 7, ALICE, 5).unwrap();
    chain.assets.mint(&MULTI, 8, ALICE, 3).unwrap();
    chain.assets.set_operator(&NFT, ALICE, bundle, true).unwrap();
    chain.assets.set_operator(&MULTI, ALICE, bundle, true).unwrap();

    execute(
        &mut chain,
        bundle,
        ALICE,
        0,
        BundleCall::Deposit {
            asset_contract: NFT,
            token_ids: vec![0, 1],
            amounts: vec![],
        },
    );
    execute(
        &mut chain,
        bundle,
        ALICE,
        0,
        BundleCall::Deposit {
            asset_contract: MULTI,
            token_ids: vec![7, 8],
            amounts: vec![5, 3],
        },
    );

    let state = &chain.bundle(&bundle).unwrap().state;
    assert_eq!(state.item_count(), 4);
    assert_eq!(state.items[0].amount, 1);
    assert_eq!(state.items[1].amount, 1);
    assert_eq!(state.items[2].amount, 5);
    assert_eq!(state.items[3].amount, 3);
    assert_eq!(chain.assets.owner_of(&NFT, 0), Some(bundle));
    assert_eq!(chain.assets.balance_of(&MULTI, 7, &bundle), 5);

    // Abandon the bundle: everything returns, the counter restarts.
    execute(&mut chain, bundle, ALICE, 0, BundleCall::Refund { to: ALICE });
    assert_eq!(chain.bundle(&bundle).unwrap().state.item_count(), 0);
    assert_eq!(chain.assets.owner_of(&NFT, 0), Some(ALICE));
    assert_eq!(chain.assets.owner_of(&NFT, 1), Some(ALICE));
    assert_eq!(chain.assets.balance_of(&MULTI, 7, &ALICE), 5);
    assert_eq!(chain.assets.balance_of(&MULTI, 8, &ALICE), 3);

    let events = execute(
        &mut chain,
        bundle,
        ALICE,
        0,
        BundleCall::Deposit {
            asset_contract: NFT,
            token_ids: vec![1],
            amounts: vec![],
        },
    );
    assert!(matches!(
        events[0],
        BundleEvent::ItemDeposited { index: 0, .. }
    ));

    // Issuance is one-way: no second mint, no refund afterwards.
    execute(&mut chain, bundle, ALICE, 0, BundleCall::Issue);
    let result = chain.execute(bundle, ALICE, 0, BundleCall::Issue);
    assert!(matches!(
        result,
        Err(ChainError::Bundle(BundleError::AlreadyActive))
    ));
    let result = chain.execute(bundle, ALICE, 0, BundleCall::Refund { to: ALICE });
    assert!(matches!(
        result,
        Err(ChainError::Bundle(BundleError::AlreadyActive))
    ));
    assert_eq!(chain.token_balance(&bundle, &ALICE).unwrap(), 1000);
}

/// An outbid moves the loser into the pull-based refund ledger; the
/// loser must collect before bidding on the same index again.
#[test]
fn test_outbid_refund_ledger() {
    let (mut chain, bundle) = active_bundle_with_item();
    chain.bank.credit(&BOB, 100);
    chain.bank.credit(&CAROL, 100);

    execute(&mut chain, bundle, BOB, 10, BundleCall::Bid { index: 0 });
    execute(&mut chain, bundle, CAROL, 20, BundleCall::Bid { index: 0 });
    assert_eq!(chain.bank.balance(&bundle), 30);

    // Bob is blocked until the 10 owed to him is collected.
    let result = chain.execute(bundle, BOB, 40, BundleCall::Bid { index: 0 });
    assert!(matches!(
        result,
        Err(ChainError::Bundle(BundleError::RefundOutstanding(0)))
    ));

    execute(&mut chain, bundle, BOB, 0, BundleCall::Unbid { index: 0 });
    assert_eq!(chain.bank.balance(&BOB), 90);

    execute(&mut chain, bundle, BOB, 40, BundleCall::Bid { index: 0 });
    let state = &chain.bundle(&bundle).unwrap().state;
    assert_eq!(state.top_bid(0).unwrap().bidder, BOB);
    assert_eq!(state.refund_owed(0, &CAROL), 20);
    assert_eq!(state.total_bid_amount, 40);
}

/// A standing top bid can only be withdrawn once its lock window has
/// elapsed, measured from the latest bid on that index.
#[test]
fn test_top_bid_lock_window() {
    let (mut chain, bundle) = active_bundle_with_item();
    chain.bank.credit(&BOB, 100);
    chain.set_timestamp(1_000_000);

    execute(&mut chain, bundle, BOB, 50, BundleCall::Bid { index: 0 });

    chain.set_timestamp(1_000_000 + DEFAULT_TOP_BID_LOCK_SECS - 1);
    let result = chain.execute(bundle, BOB, 0, BundleCall::Unbid { index: 0 });
    assert!(matches!(
        result,
        Err(ChainError::Bundle(BundleError::TopBidLocked(0)))
    ));

    chain.set_timestamp(1_000_000 + DEFAULT_TOP_BID_LOCK_SECS);
    execute(&mut chain, bundle, BOB, 0, BundleCall::Unbid { index: 0 });
    assert_eq!(chain.bank.balance(&BOB), 100);

    let state = &chain.bundle(&bundle).unwrap().state;
    assert!(state.top_bid(0).is_none());
    assert_eq!(state.total_bid_amount, 0);

    // The index is free for fresh bidding from the floor.
    execute(&mut chain, bundle, BOB, 1, BundleCall::Bid { index: 0 });
}

/// The pool always equals the sum of standing top bids: an outbid swaps
/// amounts, a withdrawal subtracts.
#[test]
fn test_pool_tracks_standing_bids() {
    let (mut chain, bundle) = active_bundle_with_items(2);
    chain.bank.credit(&BOB, 200);
    chain.bank.credit(&CAROL, 200);
    chain.set_timestamp(1_000_000);

    execute(&mut chain, bundle, BOB, 25, BundleCall::Bid { index: 0 });
    execute(&mut chain, bundle, CAROL, 100, BundleCall::Bid { index: 1 });
    assert_eq!(chain.bundle(&bundle).unwrap().state.total_bid_amount, 125);

    chain.set_timestamp(1_000_000 + DEFAULT_TOP_BID_LOCK_SECS);
    execute(&mut chain, bundle, CAROL, 0, BundleCall::Unbid { index: 1 });
    assert_eq!(chain.bundle(&bundle).unwrap().state.total_bid_amount, 25);

    execute(&mut chain, bundle, CAROL, 30, BundleCall::Bid { index: 0 });
    assert_eq!(chain.bundle(&bundle).unwrap().state.total_bid_amount, 30);
}

/// Locking and unlocking claim tokens conserves each holder's total and
/// keeps the aggregate equal to the sum of locked entries.
#[test]
fn test_vote_conservation() {
    let (mut chain, bundle) = active_bundle_with_item();
    chain.token_transfer(&bundle, ALICE, BOB, 300).unwrap();

    execute(&mut chain, bundle, BOB, 0, BundleCall::ApproveUnlock { amount: 200 });
    assert_eq!(chain.token_balance(&bundle, &BOB).unwrap(), 100);
    assert_eq!(chain.token_balance(&bundle, &bundle).unwrap(), 200);

    let events = execute(
        &mut chain,
        bundle,
        BOB,
        0,
        BundleCall::UnapproveUnlock { amount: 200 },
    );
    assert_eq!(
        events,
        vec![BundleEvent::UnlockVotesChanged {
            holder: BOB,
            locked: 0,
            total_votes: 0,
        }]
    );
    assert_eq!(chain.token_balance(&bundle, &BOB).unwrap(), 300);
    assert_eq!(chain.token_balance(&bundle, &bundle).unwrap(), 0);

    // More locked than held fails through the token ledger.
    let result = chain.execute(bundle, BOB, 0, BundleCall::ApproveUnlock { amount: 301 });
    assert!(matches!(
        result,
        Err(ChainError::Bundle(BundleError::Token(_)))
    ));
    // More unlocked than locked fails in the vote ledger.
    let result = chain.execute(bundle, BOB, 0, BundleCall::UnapproveUnlock { amount: 1 });
    assert!(matches!(
        result,
        Err(ChainError::Bundle(BundleError::InsufficientLocked {
            needed: 1,
            locked: 0,
        }))
    ));
}

/// The protocol fee recipient is read from the registry at issuance
/// time, so changing it affects only later issuances.
#[test]
fn test_protocol_fee_read_at_issuance() {
    let mut chain = Chain::new(ADMIN);
    chain.registry.set_fee_to(&ADMIN, Some(FEE_TO)).unwrap();

    let first = chain.create_bundle(ALICE, reference_config()).unwrap();
    execute(&mut chain, first, ALICE, 0, BundleCall::Issue);
    assert_eq!(chain.token_balance(&first, &FEE_TO).unwrap(), 5);
    assert_eq!(chain.token_balance(&first, &ALICE).unwrap(), 995);

    chain.registry.set_fee_to(&ADMIN, None).unwrap();
    let second = chain.create_bundle(ALICE, reference_config()).unwrap();
    execute(&mut chain, second, ALICE, 0, BundleCall::Issue);
    assert_eq!(chain.token_balance(&second, &FEE_TO).unwrap(), 0);
    assert_eq!(chain.token_balance(&second, &ALICE).unwrap(), 1000);
}

/// Dispatch-level guards: attached value only on bids, and only up to
/// the sender's bank balance.
#[test]
fn test_dispatch_guards() {
    let (mut chain, bundle) = active_bundle_with_item();
    chain.bank.credit(&BOB, 10);

    let result = chain.execute(bundle, BOB, 5, BundleCall::ApproveUnlock { amount: 1 });
    assert!(matches!(result, Err(ChainError::ValueNotAccepted)));

    let result = chain.execute(bundle, BOB, 50, BundleCall::Bid { index: 0 });
    assert!(matches!(
        result,
        Err(ChainError::InsufficientFunds {
            needed: 50,
            available: 10,
        })
    ));
    assert_eq!(chain.bank.balance(&BOB), 10);

    let result = chain.execute([0x99; 32], BOB, 0, BundleCall::Claim { index: 0 });
    assert!(matches!(result, Err(ChainError::UnknownBundle(_))));

    // Asset-layer failures surface without touching the escrow ledger.
    chain.assets.set_operator(&NFT, ALICE, bundle, false).unwrap();
    let result = chain.execute(
        bundle,
        ALICE,
        0,
        BundleCall::Deposit {
            asset_contract: NFT,
            token_ids: vec![99],
            amounts: vec![],
        },
    );
    assert!(matches!(
        result,
        Err(ChainError::Bundle(BundleError::Asset(AssetError::NotApproved)))
    ));
    assert_eq!(chain.bundle(&bundle).unwrap().state.item_count(), 1);
}

// ========================================
// Helpers
// ========================================

/// Reference walkthrough parameters: supply 1000, threshold 950.
fn reference_config() -> BundleConfig {
    BundleConfig {
        total_supply: 1000,
        threshold: 950,
        name: "Punk Basket".into(),
        symbol: "PUNKB".into(),
        ..Default::default()
    }
}

/// A fresh chain with one active single-item bundle issued by Alice.
fn active_bundle_with_item() -> (Chain, Address) {
    active_bundle_with_items(1)
}

fn active_bundle_with_items(count: u64) -> (Chain, Address) {
    let mut chain = Chain::new(ADMIN);
    let bundle = chain.create_bundle(ALICE, reference_config()).unwrap();

    chain.assets.create_contract(NFT, AssetKind::Single);
    for token_id in 0..count {
        chain.assets.mint(&NFT, token_id as u128, ALICE, 1).unwrap();
    }
    chain.assets.set_operator(&NFT, ALICE, bundle, true).unwrap();

    execute(
        &mut chain,
        bundle,
        ALICE,
        0,
        BundleCall::Deposit {
            asset_contract: NFT,
            token_ids: (0..count as u128).collect(),
            amounts: vec![],
        },
    );
    execute(&mut chain, bundle, ALICE, 0, BundleCall::Issue);

    (chain, bundle)
}

/// Execute a call that is expected to succeed.
fn execute(
    chain: &mut Chain,
    bundle: Address,
    sender: Address,
    value: u128,
    call: BundleCall,
) -> Vec<BundleEvent> {
    chain.execute(bundle, sender, value, call).expect("call failed")
}
