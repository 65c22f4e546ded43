pub mod actions;
pub mod balance;
pub mod commands;
pub mod display;
pub mod error;
pub mod metadata;
pub mod module;
pub mod provider;
pub mod session;
pub mod units;

pub use actions::{ActionKind, ActionReceipt};
pub use balance::AccountAssetState;
pub use commands::Command;
pub use error::AssetError;
pub use metadata::{AssetDescriptor, AssetKind, MetadataCache};
pub use module::ModuleId;
pub use provider::{FinalizationStatus, QueryClient, QueryError, SubmitClient, TxnHandle};
pub use session::{AssetSession, Panel, PendingInput, Phase};

/// Reject module addresses that cannot be part of a function identifier.
/// Full address validation is the wallet's concern; this only catches
/// obviously malformed configuration early.
pub fn validate_module_address(address: &str) -> anyhow::Result<()> {
    if address.is_empty() {
        anyhow::bail!("Module address cannot be empty.");
    }
    if !address.starts_with("0x") || address.len() < 3 {
        anyhow::bail!("Invalid module address '{address}'. Expected a 0x-prefixed hex address.");
    }
    if !address[2..].chars().all(|c| c.is_ascii_hexdigit()) {
        anyhow::bail!("Invalid module address '{address}'. Expected a 0x-prefixed hex address.");
    }
    Ok(())
}
