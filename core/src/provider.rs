//! Capability seams for the chain: a read-only query interface and a
//! submission interface backed by an external signing wallet.
//!
//! The core never constructs or signs transactions itself — it hands fully
//! qualified entry-function payloads to whatever implements [`SubmitClient`]
//! and waits for that capability to report finalization.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Failure modes of the query capability. `ResourceNotFound` is the benign
/// "account has no resource of this representation" case and is mapped to a
/// zero balance by the reader; everything else is a genuine RPC failure.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("resource not found: {0}")]
    ResourceNotFound(String),

    #[error("{0}")]
    Rpc(String),
}

/// Read-only view-function access.
#[async_trait]
pub trait QueryClient: Send + Sync {
    /// Call a view function and return its result tuple.
    async fn view(
        &self,
        function: &str,
        arguments: Vec<Value>,
    ) -> std::result::Result<Vec<Value>, QueryError>;
}

/// Handle to a submitted but not necessarily finalized transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxnHandle {
    pub hash: String,
}

/// Durably known outcome of a submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinalizationStatus {
    Committed,
    Failed(String),
}

/// Submission through an external signing wallet, plus finalization wait.
#[async_trait]
pub trait SubmitClient: Send + Sync {
    /// Sign and broadcast an entry-function call; returns as soon as the
    /// transaction is accepted into the mempool.
    async fn submit(&self, function: &str, arguments: Vec<Value>) -> anyhow::Result<TxnHandle>;

    /// Suspend until the transaction's outcome is durably known.
    async fn await_finalization(&self, handle: &TxnHandle) -> anyhow::Result<FinalizationStatus>;
}
