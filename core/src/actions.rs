//! Mutating actions against the faucet module: mint, burn, transfer, migrate.
//!
//! Local preconditions are checked before anything touches the network —
//! amount positivity and the migrate-once rule are the cheapest failure
//! paths. A successful execution blocks until the submission capability
//! reports the transaction finalized; it never mutates cached state itself.

use serde_json::{json, Value};
use tracing::{info, warn};

use crate::error::{AssetError, Result};
use crate::metadata::{AssetDescriptor, AssetKind};
use crate::module::{
    ModuleId, BURN_COINS, BURN_FA, MIGRATE_COIN, MINT_COINS, MINT_FA, TRANSFER_COINS, TRANSFER_FA,
};
use crate::provider::{FinalizationStatus, SubmitClient, TxnHandle};
use crate::units;

/// The four mutating operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Mint,
    Burn,
    Transfer,
    Migrate,
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mint => write!(f, "mint"),
            Self::Burn => write!(f, "burn"),
            Self::Transfer => write!(f, "transfer"),
            Self::Migrate => write!(f, "migrate"),
        }
    }
}

/// Finalization receipt for a committed action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionReceipt {
    pub hash: String,
}

fn entry_function(kind: AssetKind, action: ActionKind) -> Result<&'static str> {
    Ok(match (kind, action) {
        (AssetKind::Coin, ActionKind::Mint) => MINT_COINS,
        (AssetKind::Coin, ActionKind::Burn) => BURN_COINS,
        (AssetKind::Coin, ActionKind::Transfer) => TRANSFER_COINS,
        (AssetKind::Coin, ActionKind::Migrate) => MIGRATE_COIN,
        (AssetKind::FungibleAsset, ActionKind::Mint) => MINT_FA,
        (AssetKind::FungibleAsset, ActionKind::Burn) => BURN_FA,
        (AssetKind::FungibleAsset, ActionKind::Transfer) => TRANSFER_FA,
        (AssetKind::FungibleAsset, ActionKind::Migrate) => {
            return Err(AssetError::InvalidState(
                "Migrate applies to the coin representation only.".into(),
            ))
        }
    })
}

/// Validate locally, submit through the external wallet capability, and
/// wait for finalization. `migrated` is the last known Coin migration flag;
/// `recipient`/`amount` are the raw pending inputs (amount is parsed here
/// against the descriptor's decimals).
pub async fn execute(
    submit: &dyn SubmitClient,
    module: &ModuleId,
    descriptor: &AssetDescriptor,
    action: ActionKind,
    recipient: Option<&str>,
    amount: Option<&str>,
    migrated: bool,
) -> Result<ActionReceipt> {
    let function = module.function(entry_function(descriptor.kind, action)?);

    let arguments: Vec<Value> = if action == ActionKind::Migrate {
        if migrated {
            return Err(AssetError::AlreadyMigrated);
        }
        vec![]
    } else {
        let recipient = recipient
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .ok_or_else(|| {
                AssetError::InvalidRecipient(format!("{action} requires a recipient address."))
            })?;
        let raw_amount = amount.ok_or_else(|| {
            AssetError::InvalidAmount(format!("{action} requires an amount."))
        })?;
        let subunits = units::parse_amount(raw_amount, descriptor.decimals)?;
        // u64 amounts travel as decimal strings in entry-function payloads
        vec![json!(recipient), json!(subunits.to_string())]
    };

    let handle: TxnHandle = submit
        .submit(&function, arguments)
        .await
        .map_err(|e| AssetError::ActionFailed {
            kind: action,
            reason: e.to_string(),
        })?;

    match submit.await_finalization(&handle).await {
        Ok(FinalizationStatus::Committed) => {
            info!(%action, kind = %descriptor.kind, hash = %handle.hash, "action committed");
            Ok(ActionReceipt { hash: handle.hash })
        }
        Ok(FinalizationStatus::Failed(reason)) => {
            warn!(%action, kind = %descriptor.kind, hash = %handle.hash, %reason, "action reverted");
            Err(AssetError::ActionFailed {
                kind: action,
                reason,
            })
        }
        Err(e) => Err(AssetError::ActionFailed {
            kind: action,
            reason: e.to_string(),
        }),
    }
}
