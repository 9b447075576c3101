//! Marketplace interface consumed by the DAO.
//!
//! Only the calling side lives here: the wire format of the two entry points
//! and helpers to reach them through a [`CallEnv`]. Any contract that decodes
//! [`MarketplaceCall`] can serve as the DAO's marketplace.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::contracts::env::CallEnv;
use crate::contracts::{ContractError, ContractResult};
use crate::types::{Address, Amount};

/// Marketplace entry points
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarketplaceCall {
    /// Price of an asset; returns a bincode `Amount`
    Price {
        /// Collection contract
        asset_contract: Address,
        /// Asset within the collection
        asset_id: u64,
    },
    /// Buy an asset; payable with exactly the price
    Buy {
        /// Collection contract
        asset_contract: Address,
        /// Asset within the collection
        asset_id: u64,
    },
}

impl MarketplaceCall {
    /// Wire encoding
    ///
    /// # Errors
    /// Returns error if encoding fails
    pub fn encode(&self) -> ContractResult<Vec<u8>> {
        bincode::serialize(self).map_err(|e| ContractError::MalformedInput(e.to_string()))
    }

    /// Parse a marketplace call
    ///
    /// # Errors
    /// Returns `MalformedInput` if the bytes are not a marketplace call
    pub fn decode(input: &[u8]) -> ContractResult<Self> {
        bincode::deserialize(input)
            .map_err(|e| ContractError::MalformedInput(format!("marketplace call: {e}")))
    }
}

/// Ask `marketplace` for the price of an asset
///
/// # Errors
/// Returns the marketplace's error, or `MalformedInput` if its answer is not
/// an amount
pub fn query_price(
    env: &mut CallEnv<'_, '_>,
    marketplace: Address,
    asset_contract: Address,
    asset_id: u64,
) -> ContractResult<Amount> {
    let input = MarketplaceCall::Price {
        asset_contract,
        asset_id,
    }
    .encode()?;
    let output = env.call(marketplace, Amount::ZERO, &input)?;
    let price: Amount = bincode::deserialize(&output)
        .map_err(|e| ContractError::MalformedInput(format!("marketplace price: {e}")))?;
    debug!(%marketplace, %asset_contract, asset_id, %price, "Marketplace quote");
    Ok(price)
}

/// Buy an asset from `marketplace`, paying `price` from the calling contract
///
/// # Errors
/// Returns the marketplace's error or `InsufficientBalance`
pub fn purchase(
    env: &mut CallEnv<'_, '_>,
    marketplace: Address,
    asset_contract: Address,
    asset_id: u64,
    price: Amount,
) -> ContractResult<()> {
    let input = MarketplaceCall::Buy {
        asset_contract,
        asset_id,
    }
    .encode()?;
    env.call(marketplace, price, &input)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_rejects_foreign_input() {
        assert!(matches!(
            MarketplaceCall::decode(&[0xff, 0xff, 0xff, 0xff]),
            Err(ContractError::MalformedInput(_))
        ));
    }

    #[test]
    fn test_encoding_distinguishes_entry_points() {
        let asset_contract = Address::from_bytes([5; 20]);
        let price = MarketplaceCall::Price { asset_contract, asset_id: 7 };
        let buy = MarketplaceCall::Buy { asset_contract, asset_id: 7 };
        assert_ne!(price.encode().unwrap(), buy.encode().unwrap());
        assert_eq!(MarketplaceCall::decode(&buy.encode().unwrap()).unwrap(), buy);
    }
}
