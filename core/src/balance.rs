//! Balance snapshots for the connected account.
//!
//! A snapshot is read fresh from the chain every time; nothing here is
//! cached or written back. A missing resource is a valid state (never-funded
//! account) and reads as zero; only transport failures surface as errors.

use serde_json::{json, Value};
use tracing::warn;

use crate::error::{AssetError, Result};
use crate::metadata::{AssetKind, MetadataCache};
use crate::module::{ModuleId, COIN_BALANCE, COIN_IS_MIGRATED, FA_BALANCE};
use crate::provider::{QueryClient, QueryError};
use crate::units;

/// Immutable per-account, per-representation snapshot. `balance_display` is
/// always derived from `balance_subunits` and the descriptor's decimals,
/// never set independently. `migrated` is meaningful for Coin only and is
/// always false for FA.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountAssetState {
    pub kind: AssetKind,
    pub account: String,
    pub balance_subunits: u64,
    pub balance_display: f64,
    pub migrated: bool,
}

impl AccountAssetState {
    fn new(kind: AssetKind, account: &str, subunits: u64, decimals: u8, migrated: bool) -> Self {
        Self {
            kind,
            account: account.to_string(),
            balance_subunits: subunits,
            balance_display: units::to_display(subunits, decimals),
            migrated,
        }
    }
}

/// Extract the `u64` balance the chain encodes as a decimal string
/// (plain numbers are tolerated for lenient capability implementations).
fn parse_subunits(values: &[Value]) -> Result<u64> {
    let value = values
        .first()
        .ok_or_else(|| AssetError::QueryFailed("balance result tuple is empty".into()))?;
    if let Some(s) = value.as_str() {
        return s
            .parse()
            .map_err(|_| AssetError::QueryFailed(format!("malformed balance '{s}'")));
    }
    value
        .as_u64()
        .ok_or_else(|| AssetError::QueryFailed(format!("malformed balance {value}")))
}

/// Balance query with the benign-zero rule: `ResourceNotFound` means the
/// account was never funded under this representation.
async fn fetch_subunits(query: &dyn QueryClient, function: &str, account: &str) -> Result<u64> {
    match query.view(function, vec![json!(account)]).await {
        Ok(values) => parse_subunits(&values),
        Err(QueryError::ResourceNotFound(_)) => Ok(0),
        Err(QueryError::Rpc(e)) => Err(AssetError::QueryFailed(e)),
    }
}

async fn fetch_migrated(query: &dyn QueryClient, function: &str, account: &str) -> Result<bool> {
    match query.view(function, vec![json!(account)]).await {
        Ok(values) => values
            .first()
            .and_then(Value::as_bool)
            .ok_or_else(|| AssetError::QueryFailed("malformed coin_is_migrated result".into())),
        Err(QueryError::ResourceNotFound(_)) => Ok(false),
        Err(QueryError::Rpc(e)) => Err(AssetError::QueryFailed(e)),
    }
}

/// Read a fresh snapshot for `account` under `kind`.
///
/// The descriptor's decimals and the fetched balance must come from the same
/// cache generation; if a session reset invalidates the cache mid-read, the
/// read is discarded and retried once.
pub async fn read_snapshot(
    query: &dyn QueryClient,
    module: &ModuleId,
    cache: &MetadataCache,
    account: &str,
    kind: AssetKind,
) -> Result<AccountAssetState> {
    for attempt in 0..2 {
        let generation = cache.generation();
        let descriptor = cache.get(query, module, kind).await?;

        let subunits = match kind {
            AssetKind::Coin => {
                fetch_subunits(query, &module.function(COIN_BALANCE), account).await?
            }
            AssetKind::FungibleAsset => {
                fetch_subunits(query, &module.function(FA_BALANCE), account).await?
            }
        };
        let migrated = match kind {
            AssetKind::Coin => {
                fetch_migrated(query, &module.function(COIN_IS_MIGRATED), account).await?
            }
            AssetKind::FungibleAsset => false,
        };

        if cache.generation() == generation {
            return Ok(AccountAssetState::new(
                kind,
                account,
                subunits,
                descriptor.decimals,
                migrated,
            ));
        }
        warn!(%kind, attempt, "descriptor cache invalidated mid-read, retrying");
    }
    Err(AssetError::QueryFailed(
        "balance read kept racing a session reset".into(),
    ))
}
