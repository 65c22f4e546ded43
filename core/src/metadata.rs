//! Per-session descriptor cache for the two asset representations.
//!
//! Descriptors are fetched once per session and memoized. The per-kind
//! mutex is held across the fetch so concurrent first calls coalesce into
//! one outbound view query. Failures are never cached.

use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::{anyhow, Context};
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{AssetError, Result};
use crate::module::{ModuleId, COIN_DETAILS, FA_DETAILS};
use crate::provider::QueryClient;

/// The two representations of the asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Coin,
    FungibleAsset,
}

impl AssetKind {
    pub const ALL: [AssetKind; 2] = [AssetKind::Coin, AssetKind::FungibleAsset];
}

impl std::fmt::Display for AssetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Coin => write!(f, "coin"),
            Self::FungibleAsset => write!(f, "fa"),
        }
    }
}

impl std::str::FromStr for AssetKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "coin" => Ok(Self::Coin),
            "fa" | "fungible-asset" | "fungible_asset" => Ok(Self::FungibleAsset),
            other => Err(format!("Unknown asset kind: '{other}'. Use 'coin' or 'fa'.")),
        }
    }
}

/// Immutable metadata for one representation, fetched once per session.
/// `icon_uri`/`project_uri` are populated for the FA representation only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetDescriptor {
    pub kind: AssetKind,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub icon_uri: Option<String>,
    pub project_uri: Option<String>,
}

/// `fa_details` returns its fields as a single struct inside the result tuple.
#[derive(Debug, Deserialize)]
struct FaDetailsRaw {
    name: String,
    symbol: String,
    decimals: u8,
    icon_uri: String,
    project_uri: String,
}

/// `coin_details() -> (name, symbol, decimals)`
fn parse_coin_details(values: &[Value]) -> anyhow::Result<AssetDescriptor> {
    let name = values
        .first()
        .and_then(Value::as_str)
        .ok_or_else(|| anyhow!("coin_details missing name"))?;
    let symbol = values
        .get(1)
        .and_then(Value::as_str)
        .ok_or_else(|| anyhow!("coin_details missing symbol"))?;
    let decimals = values
        .get(2)
        .and_then(Value::as_u64)
        .ok_or_else(|| anyhow!("coin_details missing decimals"))?;
    Ok(AssetDescriptor {
        kind: AssetKind::Coin,
        name: name.to_string(),
        symbol: symbol.to_string(),
        decimals: u8::try_from(decimals).context("coin decimals out of range")?,
        icon_uri: None,
        project_uri: None,
    })
}

/// `fa_details() -> ({ name, symbol, decimals, icon_uri, project_uri },)`
fn parse_fa_details(values: &[Value]) -> anyhow::Result<AssetDescriptor> {
    let raw: FaDetailsRaw = serde_json::from_value(
        values
            .first()
            .cloned()
            .ok_or_else(|| anyhow!("fa_details returned an empty tuple"))?,
    )
    .context("malformed fa_details result")?;
    Ok(AssetDescriptor {
        kind: AssetKind::FungibleAsset,
        name: raw.name,
        symbol: raw.symbol,
        decimals: raw.decimals,
        icon_uri: Some(raw.icon_uri),
        project_uri: Some(raw.project_uri),
    })
}

/// Cached descriptors, one slot per representation.
///
/// Entries are tagged with the generation they were fetched under;
/// `invalidate` only bumps the generation, which makes older entries read
/// as absent without taking either slot lock.
pub struct MetadataCache {
    generation: AtomicU64,
    coin: Mutex<Option<(u64, AssetDescriptor)>>,
    fa: Mutex<Option<(u64, AssetDescriptor)>>,
}

impl MetadataCache {
    pub fn new() -> Self {
        Self {
            generation: AtomicU64::new(0),
            coin: Mutex::new(None),
            fa: Mutex::new(None),
        }
    }

    fn slot(&self, kind: AssetKind) -> &Mutex<Option<(u64, AssetDescriptor)>> {
        match kind {
            AssetKind::Coin => &self.coin,
            AssetKind::FungibleAsset => &self.fa,
        }
    }

    /// Current cache generation. Readers compare this before and after a
    /// balance fetch to detect a mid-flight invalidation.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Drop all cached descriptors. Full session reset only.
    pub fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    /// Fetch-once-then-memoize. The slot mutex stays held for the duration
    /// of the fetch, so two concurrent first calls produce one view query.
    pub async fn get(
        &self,
        query: &dyn QueryClient,
        module: &ModuleId,
        kind: AssetKind,
    ) -> Result<AssetDescriptor> {
        let generation = self.generation();
        let mut slot = self.slot(kind).lock().await;
        if let Some((stored_generation, descriptor)) = slot.as_ref() {
            if *stored_generation == generation {
                debug!(%kind, "metadata cache hit");
                return Ok(descriptor.clone());
            }
        }

        let function = match kind {
            AssetKind::Coin => module.function(COIN_DETAILS),
            AssetKind::FungibleAsset => module.function(FA_DETAILS),
        };
        debug!(%kind, %function, "fetching asset metadata");
        let values = query.view(&function, vec![]).await.map_err(|e| {
            AssetError::MetadataUnavailable {
                kind,
                reason: e.to_string(),
            }
        })?;

        let descriptor = match kind {
            AssetKind::Coin => parse_coin_details(&values),
            AssetKind::FungibleAsset => parse_fa_details(&values),
        }
        .map_err(|e| AssetError::MetadataUnavailable {
            kind,
            reason: e.to_string(),
        })?;

        // Tag with the generation observed before the fetch; a reset that
        // raced this fetch leaves the entry stale and it is refetched.
        *slot = Some((generation, descriptor.clone()));
        Ok(descriptor)
    }
}

impl Default for MetadataCache {
    fn default() -> Self {
        Self::new()
    }
}
