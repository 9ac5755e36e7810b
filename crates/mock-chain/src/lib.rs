//! In-memory host chain for local testing of the bundle system.
//!
//! The chain owns the ledgers the bundle module collaborates with: a
//! native-currency bank, an asset hub of NFT contracts, the protocol
//! registry, and one claim-token ledger per bundle. `Chain::execute`
//! dispatches calls into the module and then carries out the outbound
//! transfers a successful call produced.

use std::collections::{HashMap, HashSet};

use bundle_module::external::{AssetError, AssetIntake, ClaimToken, RegistryView, TokenError};
use bundle_module::{
    handlers, queries, BundleCall, BundleConfig, BundleError, BundleQuery, BundleQueryResponse,
    BundleState, CallContext, ConfigValidationError,
};
use bundle_types::{Address, AssetKind, BundleEvent, Effect};
use tracing::{debug, info};

/// Errors surfaced by the host chain.
#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    #[error("Unknown bundle: {0}")]
    UnknownBundle(String),

    #[error("Insufficient funds: needed {needed}, available {available}")]
    InsufficientFunds { needed: u128, available: u128 },

    #[error("Attached value is only accepted on bids")]
    ValueNotAccepted,

    #[error("Sender is not the fee-to setter")]
    NotFeeSetter,

    #[error(transparent)]
    Bundle(#[from] BundleError),

    #[error(transparent)]
    Asset(#[from] AssetError),

    #[error(transparent)]
    Config(#[from] ConfigValidationError),
}

// =========================================================================
// NATIVE CURRENCY
// =========================================================================

/// Native-currency ledger.
#[derive(Default)]
pub struct Bank {
    balances: HashMap<Address, u128>,
}

impl Bank {
    pub fn balance(&self, owner: &Address) -> u128 {
        self.balances.get(owner).copied().unwrap_or(0)
    }

    pub fn credit(&mut self, to: &Address, amount: u128) {
        *self.balances.entry(*to).or_insert(0) += amount;
    }

    pub fn transfer(&mut self, from: &Address, to: &Address, amount: u128) -> Result<(), ChainError> {
        let available = self.balance(from);
        if available < amount {
            return Err(ChainError::InsufficientFunds {
                needed: amount,
                available,
            });
        }
        self.balances.insert(*from, available - amount);
        *self.balances.entry(*to).or_insert(0) += amount;
        Ok(())
    }
}

// =========================================================================
// CLAIM TOKEN
// =========================================================================

/// Fungible claim-token ledger for one bundle.
#[derive(Default)]
pub struct TokenLedger {
    balances: HashMap<Address, u128>,
    total_supply: u128,
}

impl ClaimToken for TokenLedger {
    fn total_supply(&self) -> u128 {
        self.total_supply
    }

    fn balance_of(&self, owner: &Address) -> u128 {
        self.balances.get(owner).copied().unwrap_or(0)
    }

    fn mint(&mut self, to: &Address, amount: u128) {
        *self.balances.entry(*to).or_insert(0) += amount;
        self.total_supply += amount;
    }

    fn burn(&mut self, from: &Address, amount: u128) -> Result<(), TokenError> {
        let available = self.balance_of(from);
        if available < amount {
            return Err(TokenError::InsufficientBalance {
                needed: amount,
                available,
            });
        }
        self.balances.insert(*from, available - amount);
        self.total_supply -= amount;
        Ok(())
    }

    fn transfer(&mut self, from: &Address, to: &Address, amount: u128) -> Result<(), TokenError> {
        let available = self.balance_of(from);
        if available < amount {
            return Err(TokenError::InsufficientBalance {
                needed: amount,
                available,
            });
        }
        self.balances.insert(*from, available - amount);
        *self.balances.entry(*to).or_insert(0) += amount;
        Ok(())
    }
}

// =========================================================================
// ASSET HUB
// =========================================================================

/// One deployed NFT contract.
pub struct AssetContract {
    pub kind: AssetKind,
    /// Single-unit ownership by token id
    owners: HashMap<u128, Address>,
    /// Multi-unit balances by (token id, owner)
    balances: HashMap<(u128, Address), u128>,
    /// (owner, operator) approvals
    operators: HashSet<(Address, Address)>,
}

impl AssetContract {
    fn new(kind: AssetKind) -> Self {
        Self {
            kind,
            owners: HashMap::new(),
            balances: HashMap::new(),
            operators: HashSet::new(),
        }
    }
}

/// All NFT contracts known to the chain.
#[derive(Default)]
pub struct AssetHub {
    contracts: HashMap<Address, AssetContract>,
}

impl AssetHub {
    pub fn create_contract(&mut self, address: Address, kind: AssetKind) {
        self.contracts.insert(address, AssetContract::new(kind));
    }

    /// Mint a token into an account. `amount` is ignored for single-unit
    /// contracts.
    pub fn mint(
        &mut self,
        contract: &Address,
        token_id: u128,
        to: Address,
        amount: u128,
    ) -> Result<(), AssetError> {
        let contract = self.contract_mut(contract)?;
        match contract.kind {
            AssetKind::Single => {
                contract.owners.insert(token_id, to);
            }
            AssetKind::Multi => {
                *contract.balances.entry((token_id, to)).or_insert(0) += amount;
            }
        }
        Ok(())
    }

    pub fn set_operator(
        &mut self,
        contract: &Address,
        owner: Address,
        operator: Address,
        approved: bool,
    ) -> Result<(), AssetError> {
        let contract = self.contract_mut(contract)?;
        if approved {
            contract.operators.insert((owner, operator));
        } else {
            contract.operators.remove(&(owner, operator));
        }
        Ok(())
    }

    pub fn owner_of(&self, contract: &Address, token_id: u128) -> Option<Address> {
        self.contracts
            .get(contract)
            .and_then(|c| c.owners.get(&token_id).copied())
    }

    pub fn balance_of(&self, contract: &Address, token_id: u128, owner: &Address) -> u128 {
        self.contracts
            .get(contract)
            .and_then(|c| c.balances.get(&(token_id, *owner)).copied())
            .unwrap_or(0)
    }

    /// Move a batch of single-unit tokens from `from` into `to`'s custody.
    /// Validates the whole batch before moving anything.
    fn pull_single(
        &mut self,
        contract: &Address,
        from: &Address,
        to: &Address,
        token_ids: &[u128],
    ) -> Result<(), AssetError> {
        let contract = self.contract_mut(contract)?;
        if contract.kind != AssetKind::Single {
            return Err(AssetError::KindMismatch);
        }
        if !contract.operators.contains(&(*from, *to)) {
            return Err(AssetError::NotApproved);
        }

        // A duplicate id would no longer be owned by the time it moved.
        let mut seen = HashSet::new();
        for &token_id in token_ids {
            if contract.owners.get(&token_id) != Some(from) || !seen.insert(token_id) {
                return Err(AssetError::NotOwner { token_id });
            }
        }

        for &token_id in token_ids {
            contract.owners.insert(token_id, *to);
        }
        Ok(())
    }

    /// Move a batch of multi-unit tokens, summing duplicate ids so the
    /// batch cannot overdraw a balance.
    fn pull_multi(
        &mut self,
        contract: &Address,
        from: &Address,
        to: &Address,
        token_ids: &[u128],
        amounts: &[u128],
    ) -> Result<(), AssetError> {
        if token_ids.len() != amounts.len() {
            return Err(AssetError::ArityMismatch {
                ids: token_ids.len(),
                amounts: amounts.len(),
            });
        }
        let contract = self.contract_mut(contract)?;
        if contract.kind != AssetKind::Multi {
            return Err(AssetError::KindMismatch);
        }
        if !contract.operators.contains(&(*from, *to)) {
            return Err(AssetError::NotApproved);
        }

        let mut needed: HashMap<u128, u128> = HashMap::new();
        for (&token_id, &amount) in token_ids.iter().zip(amounts) {
            *needed.entry(token_id).or_insert(0) += amount;
        }
        for (&token_id, &needed_amount) in &needed {
            let available = contract.balances.get(&(token_id, *from)).copied().unwrap_or(0);
            if available < needed_amount {
                return Err(AssetError::InsufficientUnits {
                    token_id,
                    needed: needed_amount,
                    available,
                });
            }
        }

        for (&token_id, &amount) in token_ids.iter().zip(amounts) {
            *contract.balances.entry((token_id, *from)).or_insert(0) -= amount;
            *contract.balances.entry((token_id, *to)).or_insert(0) += amount;
        }
        Ok(())
    }

    /// Hand a token out of `from`'s custody, routed by contract kind.
    fn release(
        &mut self,
        contract: &Address,
        token_id: u128,
        amount: u128,
        from: &Address,
        to: &Address,
    ) -> Result<(), AssetError> {
        let contract = self.contract_mut(contract)?;
        match contract.kind {
            AssetKind::Single => {
                if contract.owners.get(&token_id) != Some(from) {
                    return Err(AssetError::NotOwner { token_id });
                }
                contract.owners.insert(token_id, *to);
            }
            AssetKind::Multi => {
                let available = contract.balances.get(&(token_id, *from)).copied().unwrap_or(0);
                if available < amount {
                    return Err(AssetError::InsufficientUnits {
                        token_id,
                        needed: amount,
                        available,
                    });
                }
                contract.balances.insert((token_id, *from), available - amount);
                *contract.balances.entry((token_id, *to)).or_insert(0) += amount;
            }
        }
        Ok(())
    }

    fn contract_mut(&mut self, address: &Address) -> Result<&mut AssetContract, AssetError> {
        self.contracts
            .get_mut(address)
            .ok_or(AssetError::UnknownContract)
    }
}

/// Routes module escrow pulls into the asset hub, custody under the
/// bundle's own address.
struct BundleAssets<'a> {
    hub: &'a mut AssetHub,
    custody: Address,
}

impl AssetIntake for BundleAssets<'_> {
    fn pull_single(
        &mut self,
        contract: &Address,
        from: &Address,
        token_ids: &[u128],
    ) -> Result<(), AssetError> {
        self.hub.pull_single(contract, from, &self.custody, token_ids)
    }

    fn pull_multi(
        &mut self,
        contract: &Address,
        from: &Address,
        token_ids: &[u128],
        amounts: &[u128],
    ) -> Result<(), AssetError> {
        self.hub
            .pull_multi(contract, from, &self.custody, token_ids, amounts)
    }
}

// =========================================================================
// REGISTRY
// =========================================================================

/// Protocol registry: fee configuration and the bundle directory.
pub struct Registry {
    fee_to: Option<Address>,
    fee_to_setter: Address,
    bundles: Vec<Address>,
}

impl Registry {
    fn new(fee_to_setter: Address) -> Self {
        Self {
            fee_to: None,
            fee_to_setter,
            bundles: Vec::new(),
        }
    }

    pub fn set_fee_to(
        &mut self,
        sender: &Address,
        fee_to: Option<Address>,
    ) -> Result<(), ChainError> {
        if *sender != self.fee_to_setter {
            return Err(ChainError::NotFeeSetter);
        }
        self.fee_to = fee_to;
        Ok(())
    }

    pub fn set_fee_to_setter(
        &mut self,
        sender: &Address,
        new_setter: Address,
    ) -> Result<(), ChainError> {
        if *sender != self.fee_to_setter {
            return Err(ChainError::NotFeeSetter);
        }
        self.fee_to_setter = new_setter;
        Ok(())
    }

    pub fn bundles(&self) -> &[Address] {
        &self.bundles
    }

    /// Creation position of a bundle, if the registry knows it.
    pub fn index_of(&self, bundle: &Address) -> Option<usize> {
        self.bundles.iter().position(|b| b == bundle)
    }

    pub fn len(&self) -> usize {
        self.bundles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bundles.is_empty()
    }

    fn register(&mut self, bundle: Address) {
        self.bundles.push(bundle);
    }
}

impl RegistryView for Registry {
    fn fee_recipient(&self) -> Option<Address> {
        self.fee_to
    }
}

// =========================================================================
// CHAIN
// =========================================================================

/// Journal entry for an emitted bundle event.
#[derive(Clone, Debug)]
pub struct EventRecord {
    pub height: u64,
    pub bundle: Address,
    pub event: BundleEvent,
}

/// One bundle instance: its ledger state plus its claim token.
pub struct BundleInstance {
    pub state: BundleState,
    pub token: TokenLedger,
}

/// The in-memory chain.
pub struct Chain {
    pub bank: Bank,
    pub assets: AssetHub,
    pub registry: Registry,
    bundles: HashMap<Address, BundleInstance>,
    pub block_height: u64,
    pub timestamp: u64,
    events: Vec<EventRecord>,
}

impl Chain {
    pub fn new(fee_to_setter: Address) -> Self {
        Self {
            bank: Bank::default(),
            assets: AssetHub::default(),
            registry: Registry::new(fee_to_setter),
            bundles: HashMap::new(),
            block_height: 0,
            timestamp: 0,
            events: Vec::new(),
        }
    }

    pub fn advance_block(&mut self) {
        self.block_height += 1;
        self.timestamp += 12; // ~12 second blocks
    }

    pub fn set_timestamp(&mut self, ts: u64) {
        self.timestamp = ts;
    }

    /// Validate a creation config and instantiate a bundle for `creator`.
    pub fn create_bundle(
        &mut self,
        creator: Address,
        config: BundleConfig,
    ) -> Result<Address, ChainError> {
        config.validate()?;

        let address = bundle_address(self.registry.bundles().len() as u64);
        let state = BundleState::new(address, config.into_params(creator));
        self.bundles.insert(
            address,
            BundleInstance {
                state,
                token: TokenLedger::default(),
            },
        );
        self.registry.register(address);

        info!(bundle = %hex::encode(address), "bundle created");
        Ok(address)
    }

    pub fn bundle(&self, address: &Address) -> Result<&BundleInstance, ChainError> {
        self.bundles
            .get(address)
            .ok_or_else(|| ChainError::UnknownBundle(hex::encode(address)))
    }

    /// Execute a call against a bundle.
    ///
    /// Attached value is rejected on everything but bids and checked
    /// against the sender's bank balance before dispatch. Outbound
    /// transfers run after the module has committed its ledger changes.
    pub fn execute(
        &mut self,
        bundle: Address,
        sender: Address,
        value: u128,
        call: BundleCall,
    ) -> Result<Vec<BundleEvent>, ChainError> {
        if value > 0 && !matches!(call, BundleCall::Bid { .. }) {
            return Err(ChainError::ValueNotAccepted);
        }
        let available = self.bank.balance(&sender);
        if value > available {
            return Err(ChainError::InsufficientFunds {
                needed: value,
                available,
            });
        }

        let ctx = CallContext {
            sender,
            block_height: self.block_height,
            timestamp: self.timestamp,
            value,
        };
        let instance = self
            .bundles
            .get_mut(&bundle)
            .ok_or_else(|| ChainError::UnknownBundle(hex::encode(bundle)))?;

        let outcome = match call {
            BundleCall::Deposit {
                asset_contract,
                token_ids,
                amounts,
            } => {
                let mut intake = BundleAssets {
                    hub: &mut self.assets,
                    custody: bundle,
                };
                handlers::handle_deposit(
                    &mut instance.state,
                    &ctx,
                    &mut intake,
                    asset_contract,
                    token_ids,
                    amounts,
                )?
            }
            BundleCall::Issue => {
                handlers::handle_issue(&mut instance.state, &ctx, &mut instance.token, &self.registry)?
            }
            BundleCall::Refund { to } => handlers::handle_refund(&mut instance.state, &ctx, to)?,
            BundleCall::Bid { index } => handlers::handle_bid(&mut instance.state, &ctx, index)?,
            BundleCall::Unbid { index } => handlers::handle_unbid(&mut instance.state, &ctx, index)?,
            BundleCall::Claim { index } => handlers::handle_claim(&mut instance.state, &ctx, index)?,
            BundleCall::ApproveUnlock { amount } => {
                handlers::handle_approve_unlock(&mut instance.state, &ctx, &mut instance.token, amount)?
            }
            BundleCall::UnapproveUnlock { amount } => {
                handlers::handle_unapprove_unlock(&mut instance.state, &ctx, &mut instance.token, amount)?
            }
            BundleCall::Redeem { amount } => {
                handlers::handle_redeem(&mut instance.state, &ctx, &mut instance.token, amount)?
            }
        };

        // The module accepted the call: the attached value enters the
        // bundle's account.
        if value > 0 {
            self.bank.transfer(&sender, &bundle, value)?;
        }

        for effect in &outcome.effects {
            match effect {
                Effect::PayNative { to, amount } => {
                    self.bank.transfer(&bundle, to, *amount)?;
                }
                Effect::ReleaseItem {
                    asset_contract,
                    token_id,
                    amount,
                    to,
                } => {
                    self.assets
                        .release(asset_contract, *token_id, *amount, &bundle, to)?;
                }
            }
        }

        let height = self.block_height;
        for event in &outcome.events {
            debug!(height, ?event, "bundle event");
            self.events.push(EventRecord {
                height,
                bundle,
                event: event.clone(),
            });
        }

        Ok(outcome.events)
    }

    /// Run a read-only query against a bundle.
    pub fn query(
        &self,
        bundle: &Address,
        query: BundleQuery,
    ) -> Result<BundleQueryResponse, ChainError> {
        let instance = self.bundle(bundle)?;
        Ok(queries::handle_query(&instance.state, query))
    }

    pub fn token_balance(&self, bundle: &Address, owner: &Address) -> Result<u128, ChainError> {
        Ok(self.bundle(bundle)?.token.balance_of(owner))
    }

    /// Holder-to-holder claim-token transfer.
    pub fn token_transfer(
        &mut self,
        bundle: &Address,
        from: Address,
        to: Address,
        amount: u128,
    ) -> Result<(), ChainError> {
        let instance = self
            .bundles
            .get_mut(bundle)
            .ok_or_else(|| ChainError::UnknownBundle(hex::encode(bundle)))?;
        instance
            .token
            .transfer(&from, &to, amount)
            .map_err(BundleError::from)?;
        Ok(())
    }

    pub fn events(&self) -> &[EventRecord] {
        &self.events
    }
}

/// Deterministic bundle address: a marker byte plus the creation index.
fn bundle_address(index: u64) -> Address {
    let mut address = [0u8; 32];
    address[0] = 0xBD;
    address[24..].copy_from_slice(&index.to_be_bytes());
    address
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADMIN: Address = [0xAD; 32];
    const ISSUER: Address = [1u8; 32];
    const BOB: Address = [0xB0; 32];
    const NFT: Address = [0x71; 32];

    fn test_config() -> BundleConfig {
        BundleConfig {
            total_supply: 1000,
            threshold: 950,
            ..Default::default()
        }
    }

    fn chain_with_bundle() -> (Chain, Address) {
        let mut chain = Chain::new(ADMIN);
        let bundle = chain.create_bundle(ISSUER, test_config()).unwrap();
        (chain, bundle)
    }

    /// Escrow one single-unit token and issue, leaving an active bundle.
    fn activate_with_item(chain: &mut Chain, bundle: Address) {
        chain.assets.create_contract(NFT, AssetKind::Single);
        chain.assets.mint(&NFT, 0, ISSUER, 1).unwrap();
        chain.assets.set_operator(&NFT, ISSUER, bundle, true).unwrap();
        chain
            .execute(
                bundle,
                ISSUER,
                0,
                BundleCall::Deposit {
                    asset_contract: NFT,
                    token_ids: vec![0],
                    amounts: vec![],
                },
            )
            .unwrap();
        chain.execute(bundle, ISSUER, 0, BundleCall::Issue).unwrap();
    }

    #[test]
    fn test_create_bundle_registers_distinct_addresses() {
        let mut chain = Chain::new(ADMIN);
        let first = chain.create_bundle(ISSUER, test_config()).unwrap();
        let second = chain.create_bundle(BOB, test_config()).unwrap();

        assert_ne!(first, second);
        assert_eq!(chain.registry.bundles(), &[first, second]);
        assert_eq!(chain.bundle(&first).unwrap().state.params.issuer, ISSUER);
    }

    #[test]
    fn test_create_bundle_validates_config() {
        let mut chain = Chain::new(ADMIN);
        let config = BundleConfig {
            total_supply: 100,
            threshold: 101,
            ..Default::default()
        };
        let result = chain.create_bundle(ISSUER, config);
        assert!(matches!(result, Err(ChainError::Config(_))));
        assert!(chain.registry.bundles().is_empty());
    }

    #[test]
    fn test_value_rejected_on_non_bid_calls() {
        let (mut chain, bundle) = chain_with_bundle();
        chain.bank.credit(&ISSUER, 100);

        let result = chain.execute(bundle, ISSUER, 10, BundleCall::Issue);

        assert!(matches!(result, Err(ChainError::ValueNotAccepted)));
        assert_eq!(chain.bank.balance(&ISSUER), 100);
    }

    #[test]
    fn test_bid_value_checked_before_dispatch() {
        let (mut chain, bundle) = chain_with_bundle();
        activate_with_item(&mut chain, bundle);
        chain.bank.credit(&BOB, 10);

        let result = chain.execute(bundle, BOB, 50, BundleCall::Bid { index: 0 });

        assert!(matches!(
            result,
            Err(ChainError::InsufficientFunds {
                needed: 50,
                available: 10,
            })
        ));
        assert!(chain.bundle(&bundle).unwrap().state.top_bid(0).is_none());
    }

    #[test]
    fn test_bid_moves_value_into_bundle_account() {
        let (mut chain, bundle) = chain_with_bundle();
        activate_with_item(&mut chain, bundle);
        chain.bank.credit(&BOB, 100);

        chain
            .execute(bundle, BOB, 50, BundleCall::Bid { index: 0 })
            .unwrap();

        assert_eq!(chain.bank.balance(&BOB), 50);
        assert_eq!(chain.bank.balance(&bundle), 50);
        assert_eq!(chain.bundle(&bundle).unwrap().state.total_bid_amount, 50);
    }

    #[test]
    fn test_rejected_bid_moves_nothing() {
        let (mut chain, bundle) = chain_with_bundle();
        activate_with_item(&mut chain, bundle);
        chain.bank.credit(&BOB, 100);
        chain
            .execute(bundle, BOB, 50, BundleCall::Bid { index: 0 })
            .unwrap();

        // Not above standing, so the module rejects it.
        let result = chain.execute(bundle, BOB, 50, BundleCall::Bid { index: 0 });

        assert!(matches!(result, Err(ChainError::Bundle(_))));
        assert_eq!(chain.bank.balance(&BOB), 50);
        assert_eq!(chain.bank.balance(&bundle), 50);
    }

    #[test]
    fn test_single_pull_requires_operator_approval() {
        let (mut chain, bundle) = chain_with_bundle();
        chain.assets.create_contract(NFT, AssetKind::Single);
        chain.assets.mint(&NFT, 0, ISSUER, 1).unwrap();

        let deposit = BundleCall::Deposit {
            asset_contract: NFT,
            token_ids: vec![0],
            amounts: vec![],
        };
        let result = chain.execute(bundle, ISSUER, 0, deposit.clone());
        assert!(matches!(
            result,
            Err(ChainError::Bundle(BundleError::Asset(AssetError::NotApproved)))
        ));
        assert_eq!(chain.assets.owner_of(&NFT, 0), Some(ISSUER));

        chain.assets.set_operator(&NFT, ISSUER, bundle, true).unwrap();
        chain.execute(bundle, ISSUER, 0, deposit).unwrap();
        assert_eq!(chain.assets.owner_of(&NFT, 0), Some(bundle));
    }

    #[test]
    fn test_multi_pull_sums_duplicate_ids() {
        let (mut chain, bundle) = chain_with_bundle();
        chain.assets.create_contract(NFT, AssetKind::Multi);
        chain.assets.mint(&NFT, 5, ISSUER, 3).unwrap();
        chain.assets.set_operator(&NFT, ISSUER, bundle, true).unwrap();

        let result = chain.execute(
            bundle,
            ISSUER,
            0,
            BundleCall::Deposit {
                asset_contract: NFT,
                token_ids: vec![5, 5],
                amounts: vec![2, 2],
            },
        );

        assert!(matches!(
            result,
            Err(ChainError::Bundle(BundleError::Asset(
                AssetError::InsufficientUnits {
                    token_id: 5,
                    needed: 4,
                    available: 3,
                }
            )))
        ));
        assert_eq!(chain.assets.balance_of(&NFT, 5, &ISSUER), 3);
    }

    #[test]
    fn test_fee_setter_gate() {
        let mut chain = Chain::new(ADMIN);

        let result = chain.registry.set_fee_to(&BOB, Some(BOB));
        assert!(matches!(result, Err(ChainError::NotFeeSetter)));
        assert_eq!(chain.registry.fee_recipient(), None);

        chain.registry.set_fee_to(&ADMIN, Some(BOB)).unwrap();
        assert_eq!(chain.registry.fee_recipient(), Some(BOB));

        // Handing over the setter role revokes the old one.
        chain.registry.set_fee_to_setter(&ADMIN, BOB).unwrap();
        let result = chain.registry.set_fee_to(&ADMIN, None);
        assert!(matches!(result, Err(ChainError::NotFeeSetter)));
        chain.registry.set_fee_to(&BOB, None).unwrap();
        assert_eq!(chain.registry.fee_recipient(), None);
    }

    #[test]
    fn test_registry_index() {
        let (chain, bundle) = chain_with_bundle();
        assert_eq!(chain.registry.len(), 1);
        assert_eq!(chain.registry.index_of(&bundle), Some(0));
        assert_eq!(chain.registry.index_of(&[0u8; 32]), None);
    }

    #[test]
    fn test_event_journal_records_height() {
        let (mut chain, bundle) = chain_with_bundle();
        chain.advance_block();
        chain.advance_block();
        activate_with_item(&mut chain, bundle);

        let records = chain.events();
        assert!(!records.is_empty());
        assert!(records.iter().all(|r| r.height == 2 && r.bundle == bundle));
        assert!(matches!(records[0].event, BundleEvent::ItemDeposited { .. }));
    }
}
