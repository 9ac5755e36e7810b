//! Bundle creation configuration.
//!
//! This module defines the parameters a creator submits to the registry
//! and the validation applied before a bundle is instantiated.

use bundle_types::{Address, BundleParams};
use serde::{Deserialize, Serialize};

/// Lowest claim-token precision accepted.
pub const MIN_DECIMALS: u8 = 4;

/// Default protocol fee divisor (supply / 200 = 0.5%).
pub const DEFAULT_FEE_DIVISOR: u128 = 200;

/// Default top-bid withdrawal lock.
pub const DEFAULT_TOP_BID_LOCK_SECS: u64 = 259_200; // 3 days

/// Creation parameters for a new bundle.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BundleConfig {
    /// Fixed claim-token supply minted at issuance
    pub total_supply: u128,

    /// Claim-token display precision
    pub decimals: u8,

    /// Claim-token name
    pub name: String,

    /// Claim-token ticker symbol
    pub symbol: String,

    /// Locked votes required before claims and redemptions open
    pub threshold: u128,

    /// Free-form description of the collection
    pub description: String,

    /// Protocol fee divisor applied at issuance
    pub fee_divisor: u128,

    /// Seconds a top bid stays locked after placement
    pub top_bid_lock_secs: u64,
}

impl Default for BundleConfig {
    fn default() -> Self {
        Self {
            total_supply: 1_000_000,
            decimals: 18,
            name: "Bundle".into(),
            symbol: "BNDL".into(),
            threshold: 0,
            description: String::new(),
            fee_divisor: DEFAULT_FEE_DIVISOR,
            top_bid_lock_secs: DEFAULT_TOP_BID_LOCK_SECS,
        }
    }
}

impl BundleConfig {
    /// Validate the creation parameters.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.total_supply == 0 {
            return Err(ConfigValidationError::ZeroSupply);
        }
        if self.decimals < MIN_DECIMALS {
            return Err(ConfigValidationError::PrecisionTooLow {
                got: self.decimals,
                min: MIN_DECIMALS,
            });
        }
        // A threshold above the supply could never be met.
        if self.threshold > self.total_supply {
            return Err(ConfigValidationError::ThresholdExceedsSupply {
                threshold: self.threshold,
                supply: self.total_supply,
            });
        }
        if self.fee_divisor == 0 {
            return Err(ConfigValidationError::ZeroFeeDivisor);
        }

        Ok(())
    }

    /// Freeze the config into the immutable parameters of a bundle.
    pub fn into_params(self, issuer: Address) -> BundleParams {
        BundleParams {
            issuer,
            total_supply: self.total_supply,
            decimals: self.decimals,
            name: self.name,
            symbol: self.symbol,
            threshold: self.threshold,
            description: self.description,
            fee_divisor: self.fee_divisor,
            top_bid_lock_secs: self.top_bid_lock_secs,
        }
    }
}

/// Errors that can occur during creation-parameter validation.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Claim-token supply cannot be zero")]
    ZeroSupply,

    #[error("Claim-token precision too low: got {got}, minimum {min}")]
    PrecisionTooLow { got: u8, min: u8 },

    #[error("Unlock threshold {threshold} exceeds total supply {supply}")]
    ThresholdExceedsSupply { threshold: u128, supply: u128 },

    #[error("Fee divisor cannot be zero")]
    ZeroFeeDivisor,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = BundleConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_supply_rejected() {
        let config = BundleConfig {
            total_supply: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::ZeroSupply)
        ));
    }

    #[test]
    fn test_precision_floor() {
        let config = BundleConfig {
            decimals: 3,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::PrecisionTooLow { got: 3, min: 4 })
        ));

        let config = BundleConfig {
            decimals: 4,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_threshold_cannot_exceed_supply() {
        let config = BundleConfig {
            total_supply: 1000,
            threshold: 1001,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::ThresholdExceedsSupply { .. })
        ));

        // A threshold equal to the supply is the strictest legal gate.
        let config = BundleConfig {
            total_supply: 1000,
            threshold: 1000,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_fee_divisor_rejected() {
        let config = BundleConfig {
            fee_divisor: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::ZeroFeeDivisor)
        ));
    }

    #[test]
    fn test_into_params_binds_issuer() {
        let issuer = [7u8; 32];
        let params = BundleConfig::default().into_params(issuer);
        assert_eq!(params.issuer, issuer);
        assert_eq!(params.fee_divisor, DEFAULT_FEE_DIVISOR);
        assert_eq!(params.top_bid_lock_secs, DEFAULT_TOP_BID_LOCK_SECS);
    }
}
