//! Client SDK for the NFT bundle auction system.
//!
//! This crate provides a high-level API for:
//! - Driving bundle calls, queries, and admin methods over JSON-RPC
//! - Estimating redemption payouts before submitting
//! - Parsing and formatting chain addresses

pub mod rpc;
pub mod value;

pub use rpc::BundleRpcClient;
pub use value::redemption_estimate;

use thiserror::Error;

/// Errors that can occur on the client side.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Invalid address {0:?}: expected up to 32 hex-encoded bytes")]
    InvalidAddress(String),
}

/// Parse a hex address, zero-padding short forms.
///
/// The chain accepts shorthand like `a1` for test accounts; the bytes
/// land at the front of the 32-byte address the way the chain parses
/// them.
pub fn parse_address(s: &str) -> Result<[u8; 32], ClientError> {
    let bytes = hex::decode(s.trim_start_matches("0x"))
        .map_err(|_| ClientError::InvalidAddress(s.to_string()))?;
    if bytes.len() > 32 {
        return Err(ClientError::InvalidAddress(s.to_string()));
    }
    let mut addr = [0u8; 32];
    addr[..bytes.len()].copy_from_slice(&bytes);
    Ok(addr)
}

/// Format an address the way the chain emits it.
pub fn format_address(addr: &[u8; 32]) -> String {
    hex::encode(addr)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_short_address_pads_right() {
        let addr = parse_address("a1").unwrap();
        assert_eq!(addr[0], 0xA1);
        assert!(addr[1..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_parse_strips_hex_prefix() {
        assert_eq!(parse_address("0xa1").unwrap(), parse_address("a1").unwrap());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            parse_address("zz"),
            Err(ClientError::InvalidAddress(_))
        ));
        let too_long = "00".repeat(33);
        assert!(matches!(
            parse_address(&too_long),
            Err(ClientError::InvalidAddress(_))
        ));
    }

    #[test]
    fn test_format_roundtrip() {
        let addr = parse_address("a1").unwrap();
        assert_eq!(parse_address(&format_address(&addr)).unwrap(), addr);
    }
}
