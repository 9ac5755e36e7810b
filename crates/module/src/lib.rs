//! NFT bundle escrow and auction module.
//!
//! This module implements the ledger logic for fractionalized NFT bundles:
//!
//! - Escrow collection of single- and multi-unit assets by an issuer
//! - One-time issuance of a fixed-supply fungible claim token
//! - Per-item English auctions with a pull-based outbid refund ledger
//! - A one-way unlock threshold latch driven by locked claim tokens
//! - Pro-rata redemption of claim tokens against auction proceeds
//!
//! # Architecture
//!
//! - `call`: Message types for state-changing operations
//! - `handlers`: Business logic for processing calls
//! - `queries`: Read-only state access
//! - `state`: Per-bundle ledger structures
//! - `genesis`: Creation parameters and validation
//! - `external`: Traits the host chain implements for the module
//! - `error`: Error types
//!
//! # Example
//!
//! ```ignore
//! use bundle_module::{handlers, state::BundleState};
//!
//! let mut state = BundleState::new(address, params);
//! let ctx = handlers::CallContext { ... };
//!
//! // Escrow three items
//! handlers::handle_deposit(&mut state, &ctx, &mut assets, nft, vec![0, 1, 2], vec![])?;
//!
//! // Mint the claim token and open the auctions
//! handlers::handle_issue(&mut state, &ctx, &mut token, &registry)?;
//! ```

pub mod call;
pub mod error;
pub mod external;
pub mod genesis;
pub mod handlers;
pub mod queries;
pub mod state;

pub use call::BundleCall;
pub use error::BundleError;
pub use external::{AssetError, AssetIntake, ClaimToken, RegistryView, TokenError};
pub use genesis::{BundleConfig, ConfigValidationError};
pub use handlers::{CallContext, CallOutcome, HandlerResult};
pub use queries::{BundleQuery, BundleQueryResponse, BundleSummary};
pub use state::BundleState;
