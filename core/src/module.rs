//! Fully qualified identifiers for the on-chain `test_faucet` module.
//!
//! View and entry function names, argument order, and result tuple shapes
//! are fixed per identifier; `ModuleId` only supplies the module address
//! prefix so a redeployed module is a drop-in replacement.

pub const MODULE_NAME: &str = "test_faucet";

// View functions.
pub const COIN_DETAILS: &str = "coin_details";
pub const COIN_BALANCE: &str = "coin_balance";
pub const COIN_IS_MIGRATED: &str = "coin_is_migrated";
pub const FA_DETAILS: &str = "fa_details";
pub const FA_BALANCE: &str = "fa_balance";

// Entry functions.
pub const MINT_COINS: &str = "mint_coins_to_account";
pub const BURN_COINS: &str = "burn_coins_from_account";
pub const TRANSFER_COINS: &str = "transfer_coins";
pub const MIGRATE_COIN: &str = "migrate_coin_to_fungible_store";
pub const MINT_FA: &str = "mint_fa_to_account";
pub const BURN_FA: &str = "burn_fa_from_account";
pub const TRANSFER_FA: &str = "transfer_fa";

/// On-chain address of the deployed `test_faucet` module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleId {
    address: String,
}

impl ModuleId {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Qualify a bare function name: `0xabc::test_faucet::coin_balance`.
    #[must_use]
    pub fn function(&self, name: &str) -> String {
        format!("{}::{MODULE_NAME}::{name}", self.address)
    }
}

impl std::fmt::Display for ModuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}::{MODULE_NAME}", self.address)
    }
}
