//! Session state machine for the connected account.
//!
//! `AssetSession` owns one panel per representation plus the shared pending
//! input, and sequences every chain interaction: metadata before balance,
//! action finalization before refresh, and per-kind refresh ordering via
//! monotonic sequence numbers. Locks are never held across chain awaits —
//! correctness under concurrent events comes from the session epoch (account
//! identity at completion time) and the sequence numbers, so a slow refresh
//! of one representation never blocks the other.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::actions::{self, ActionKind, ActionReceipt};
use crate::balance::{self, AccountAssetState};
use crate::error::{AssetError, Result};
use crate::metadata::{AssetDescriptor, AssetKind, MetadataCache};
use crate::module::ModuleId;
use crate::provider::{QueryClient, SubmitClient};

/// Lifecycle of a single representation's panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Unloaded,
    Loading,
    Ready,
    Refreshing,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unloaded => write!(f, "unloaded"),
            Self::Loading => write!(f, "loading"),
            Self::Ready => write!(f, "ready"),
            Self::Refreshing => write!(f, "refreshing"),
        }
    }
}

/// Snapshot of one representation's view state.
#[derive(Debug, Clone)]
pub struct Panel {
    pub phase: Phase,
    pub descriptor: Option<AssetDescriptor>,
    pub state: Option<AccountAssetState>,
    /// Transient error from the most recent failed operation; cleared by
    /// the next successful one.
    pub last_error: Option<String>,
}

impl Panel {
    fn unloaded() -> Self {
        Self {
            phase: Phase::Unloaded,
            descriptor: None,
            state: None,
            last_error: None,
        }
    }
}

/// Ephemeral form state shared by both panels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingInput {
    pub recipient: String,
    pub amount: String,
}

impl PendingInput {
    fn for_account(account: Option<&str>) -> Self {
        Self {
            recipient: account.unwrap_or_default().to_string(),
            amount: "1".to_string(),
        }
    }
}

struct SessionState {
    account: Option<String>,
    panels: [Panel; 2],
    input: PendingInput,
    /// Highest refresh sequence applied per kind; completions at or below
    /// this are out of order and discarded.
    applied_refresh: [u64; 2],
}

fn index(kind: AssetKind) -> usize {
    match kind {
        AssetKind::Coin => 0,
        AssetKind::FungibleAsset => 1,
    }
}

/// Per-session controller for both asset representations.
pub struct AssetSession {
    query: Arc<dyn QueryClient>,
    submit: Arc<dyn SubmitClient>,
    module: ModuleId,
    metadata: MetadataCache,
    state: Mutex<SessionState>,
    /// Bumped on every account change; in-flight completions carry the epoch
    /// they started under and are discarded on mismatch.
    epoch: AtomicU64,
    refresh_seq: [AtomicU64; 2],
}

impl AssetSession {
    pub fn new(query: Arc<dyn QueryClient>, submit: Arc<dyn SubmitClient>, module: ModuleId) -> Self {
        Self {
            query,
            submit,
            module,
            metadata: MetadataCache::new(),
            state: Mutex::new(SessionState {
                account: None,
                panels: [Panel::unloaded(), Panel::unloaded()],
                input: PendingInput::for_account(None),
                applied_refresh: [0, 0],
            }),
            epoch: AtomicU64::new(0),
            refresh_seq: [AtomicU64::new(0), AtomicU64::new(0)],
        }
    }

    pub fn module(&self) -> &ModuleId {
        &self.module
    }

    pub async fn account(&self) -> Option<String> {
        self.state.lock().await.account.clone()
    }

    pub async fn panel(&self, kind: AssetKind) -> Panel {
        self.state.lock().await.panels[index(kind)].clone()
    }

    pub async fn input(&self) -> PendingInput {
        self.state.lock().await.input.clone()
    }

    pub async fn set_recipient(&self, recipient: impl Into<String>) {
        self.state.lock().await.input.recipient = recipient.into();
    }

    /// Store a new pending amount. Grammar and positivity are checked here
    /// with the same rules the action path parses with, so malformed input
    /// surfaces immediately; precision against the asset's decimals is
    /// enforced at action time.
    pub async fn set_amount(&self, amount: &str) -> Result<()> {
        crate::units::validate_amount(amount)?;
        self.state.lock().await.input.amount = amount.trim().to_string();
        Ok(())
    }

    /// Connect a different account (or disconnect with `None`). Resets both
    /// panels and the pending input, and bumps the session epoch so any
    /// in-flight operation for the previous account is discarded when it
    /// completes. Metadata is account-independent and survives.
    pub async fn set_account(&self, account: Option<String>) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock().await;
        state.input = PendingInput::for_account(account.as_deref());
        state.account = account;
        state.panels = [Panel::unloaded(), Panel::unloaded()];
        state.applied_refresh = [0, 0];
    }

    /// Full session reset: disconnect and drop cached metadata.
    pub async fn reset(&self) {
        self.set_account(None).await;
        self.metadata.invalidate();
    }

    fn current_epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }

    async fn connected_account(&self) -> Result<String> {
        self.state.lock().await.account.clone().ok_or_else(|| {
            AssetError::InvalidState("No account connected. Use 'account <address>' first.".into())
        })
    }

    /// Initial load for one representation: Unloaded -> Loading -> Ready,
    /// or back to Unloaded with the error attached so the next account
    /// change retries cleanly. Loads draw from the same per-kind sequence
    /// as refreshes, so a stalled load can never overwrite state a newer
    /// refresh already applied.
    pub async fn load(&self, kind: AssetKind) -> Result<()> {
        let i = index(kind);
        let epoch = self.current_epoch();
        let seq = self.refresh_seq[i].fetch_add(1, Ordering::SeqCst) + 1;
        let account = self.connected_account().await?;
        {
            let mut state = self.state.lock().await;
            let panel = &mut state.panels[i];
            panel.phase = Phase::Loading;
            panel.last_error = None;
        }

        let result = self.fetch_panel(&account, kind).await;

        let mut state = self.state.lock().await;
        if self.current_epoch() != epoch {
            debug!(%kind, "discarding load completion for a previous account");
            return Ok(());
        }
        if seq <= state.applied_refresh[i] {
            debug!(%kind, seq, applied = state.applied_refresh[i], "discarding out-of-order load");
            let panel = &mut state.panels[i];
            if panel.phase == Phase::Loading {
                panel.phase = Phase::Ready;
            }
            return Ok(());
        }
        match result {
            Ok((descriptor, snapshot)) => {
                state.applied_refresh[i] = seq;
                let panel = &mut state.panels[i];
                panel.descriptor = Some(descriptor);
                panel.state = Some(snapshot);
                panel.phase = Phase::Ready;
                panel.last_error = None;
                Ok(())
            }
            Err(e) => {
                let panel = &mut state.panels[i];
                panel.phase = Phase::Unloaded;
                panel.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    async fn fetch_panel(
        &self,
        account: &str,
        kind: AssetKind,
    ) -> Result<(AssetDescriptor, AccountAssetState)> {
        let descriptor = self
            .metadata
            .get(self.query.as_ref(), &self.module, kind)
            .await?;
        let snapshot = balance::read_snapshot(
            self.query.as_ref(),
            &self.module,
            &self.metadata,
            account,
            kind,
        )
        .await?;
        Ok((descriptor, snapshot))
    }

    /// Execute a mutating action for `kind` using the pending input.
    ///
    /// Preconditions (panel Ready, amount positive, migrate-once) fail
    /// before any network call. On success the affected representation is
    /// refreshed exactly once, strictly after finalization — for a
    /// successful migrate, both representations are refreshed since the
    /// value moved between them. On failure nothing is refreshed and the
    /// panel keeps its prior state with the error attached.
    pub async fn execute(&self, kind: AssetKind, action: ActionKind) -> Result<ActionReceipt> {
        let epoch = self.current_epoch();
        let (descriptor, migrated, input) = {
            let state = self.state.lock().await;
            if state.account.is_none() {
                return Err(AssetError::InvalidState(
                    "No account connected. Use 'account <address>' first.".into(),
                ));
            }
            let panel = &state.panels[index(kind)];
            if panel.phase != Phase::Ready {
                return Err(AssetError::InvalidState(format!(
                    "The {kind} panel is {} — load it before acting.",
                    panel.phase
                )));
            }
            let descriptor = panel.descriptor.clone().ok_or_else(|| {
                AssetError::InvalidState(format!("No descriptor loaded for {kind}."))
            })?;
            let migrated = panel.state.as_ref().map(|s| s.migrated).unwrap_or(false);
            (descriptor, migrated, state.input.clone())
        };

        let result = actions::execute(
            self.submit.as_ref(),
            &self.module,
            &descriptor,
            action,
            Some(input.recipient.as_str()),
            Some(input.amount.as_str()),
            migrated,
        )
        .await;

        match result {
            Ok(receipt) => {
                if self.current_epoch() == epoch {
                    self.refresh_after_action(kind, action, epoch).await;
                } else {
                    debug!(%kind, %action, "skipping refresh: account changed during action");
                }
                Ok(receipt)
            }
            Err(e) => {
                let mut state = self.state.lock().await;
                if self.current_epoch() == epoch {
                    state.panels[index(kind)].last_error = Some(e.to_string());
                }
                Err(e)
            }
        }
    }

    /// Re-read the affected representation(s) after a finalized action.
    async fn refresh_after_action(&self, kind: AssetKind, action: ActionKind, epoch: u64) {
        let kinds: &[AssetKind] = if action == ActionKind::Migrate {
            &AssetKind::ALL
        } else {
            std::slice::from_ref(&kind)
        };
        for &k in kinds {
            if let Err(e) = self.run_refresh(k, epoch).await {
                warn!(kind = %k, error = %e, "post-action refresh failed; keeping last known state");
            }
        }
    }

    /// User-triggered refresh of one representation.
    pub async fn refresh(&self, kind: AssetKind) -> Result<()> {
        self.run_refresh(kind, self.current_epoch()).await
    }

    async fn run_refresh(&self, kind: AssetKind, epoch: u64) -> Result<()> {
        let i = index(kind);
        let seq = self.refresh_seq[i].fetch_add(1, Ordering::SeqCst) + 1;
        let account = self.connected_account().await?;
        {
            let mut state = self.state.lock().await;
            if self.current_epoch() != epoch {
                return Ok(());
            }
            let panel = &mut state.panels[i];
            if panel.phase == Phase::Ready {
                panel.phase = Phase::Refreshing;
            }
        }

        let result = self.fetch_panel(&account, kind).await;

        let mut state = self.state.lock().await;
        if self.current_epoch() != epoch {
            debug!(%kind, seq, "discarding refresh completion for a previous account");
            return Ok(());
        }
        if seq <= state.applied_refresh[i] {
            // An earlier-started refresh finished after a newer one applied.
            debug!(%kind, seq, applied = state.applied_refresh[i], "discarding out-of-order refresh");
            let panel = &mut state.panels[i];
            if panel.phase == Phase::Refreshing {
                panel.phase = Phase::Ready;
            }
            return Ok(());
        }
        match result {
            Ok((descriptor, snapshot)) => {
                state.applied_refresh[i] = seq;
                let panel = &mut state.panels[i];
                panel.descriptor = Some(descriptor);
                panel.state = Some(snapshot);
                panel.phase = Phase::Ready;
                panel.last_error = None;
                Ok(())
            }
            Err(e) => {
                // Transient failure: keep the last known good balance.
                let panel = &mut state.panels[i];
                panel.phase = if panel.state.is_some() {
                    Phase::Ready
                } else {
                    Phase::Unloaded
                };
                panel.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }
}
