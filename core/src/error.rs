//! Domain error type for asset-console operations.

use thiserror::Error;

use crate::actions::ActionKind;
use crate::metadata::AssetKind;

/// Typed error enum for asset operations, allowing callers to match on
/// specific failure modes instead of inspecting opaque `anyhow::Error` messages.
#[derive(Debug, Error)]
pub enum AssetError {
    /// The descriptor view call for a representation failed. Never cached;
    /// the next call retries.
    #[error("metadata unavailable for {kind}: {reason}")]
    MetadataUnavailable { kind: AssetKind, reason: String },

    /// Network or RPC failure on a read path. Prior state is left intact.
    #[error("query failed: {0}")]
    QueryFailed(String),

    /// Invalid or non-positive amount. Rejected before any network call.
    #[error("{0}")]
    InvalidAmount(String),

    /// Missing or invalid recipient for an action that requires one.
    #[error("{0}")]
    InvalidRecipient(String),

    /// Migrate requested for an account whose Coin holdings are already
    /// in the fungible store.
    #[error("account is already migrated to the fungible store")]
    AlreadyMigrated,

    /// Submission or finalization failure for a mutating action.
    #[error("{kind} failed: {reason}")]
    ActionFailed { kind: ActionKind, reason: String },

    /// The session is not in a state that allows the requested operation.
    #[error("{0}")]
    InvalidState(String),

    /// Unexpected error from internal subsystems.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Alias for `std::result::Result<T, AssetError>`.
pub type Result<T> = std::result::Result<T, AssetError>;
