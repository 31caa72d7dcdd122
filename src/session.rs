//! Simulation driver: the periodic tick against the selected running
//! job, and the deferred agent actions (fix, export, publish, evidence
//! re-verification).
//!
//! The tick is a cancellable tokio task owned by the session. It is
//! restarted on every selection change and aborted on pause, stop, or
//! drop. The store-side guard in [`Workspace::advance_selected`] makes
//! a stale task harmless even before its abort lands.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::Utc;
use rand::Rng;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval, sleep};
use tracing::{debug, info, warn};

use crate::error::ActionError;
use crate::export::{Blocker, ExportFormat, ExportReceipt};
use crate::notify::Notifier;
use crate::store::{Evidence, FieldName, FieldStatus, Workspace};

/// Tick cadence and per-tick increments.
#[derive(Debug, Clone, Copy)]
pub struct TickSettings {
    pub period: Duration,
    /// USD added per tick.
    pub cost_step: f64,
    /// Upper bound of the uniform random token increment.
    pub max_token_step: u64,
}

impl Default for TickSettings {
    fn default() -> Self {
        Self {
            period: Duration::from_secs(1),
            cost_step: 0.001,
            max_token_step: 50,
        }
    }
}

/// The deferred-completion contract: submit, suspend, exactly one
/// terminal result. The simulated backend below stands in for a real
/// agent runner; both sides share this interface.
pub trait AgentBackend: Send + Sync {
    fn resolve_blocker(
        &self,
        blocker: &Blocker,
    ) -> impl Future<Output = Result<(), ActionError>> + Send;

    fn export(
        &self,
        job_id: &str,
        format: ExportFormat,
    ) -> impl Future<Output = Result<ExportReceipt, ActionError>> + Send;

    fn publish(&self, job_id: &str) -> impl Future<Output = Result<(), ActionError>> + Send;

    fn verify_evidence(
        &self,
        evidence: &Evidence,
    ) -> impl Future<Output = Result<(), ActionError>> + Send;
}

/// Fixed-delay stand-in for agent latency. Always succeeds.
#[derive(Debug, Clone, Copy)]
pub struct SimulatedBackend {
    pub fix_delay: Duration,
    pub export_delay: Duration,
}

impl Default for SimulatedBackend {
    fn default() -> Self {
        Self {
            fix_delay: Duration::from_secs(2),
            export_delay: Duration::from_secs(1),
        }
    }
}

impl AgentBackend for SimulatedBackend {
    async fn resolve_blocker(&self, blocker: &Blocker) -> Result<(), ActionError> {
        debug!(blocker = %blocker.id, "simulating fix agent");
        sleep(self.fix_delay).await;
        Ok(())
    }

    async fn export(&self, job_id: &str, format: ExportFormat) -> Result<ExportReceipt, ActionError> {
        debug!(job_id, %format, "simulating export");
        sleep(self.export_delay).await;
        Ok(ExportReceipt {
            job_id: job_id.to_string(),
            format,
            exported_at: Utc::now(),
        })
    }

    async fn publish(&self, job_id: &str) -> Result<(), ActionError> {
        debug!(job_id, "simulating publish");
        sleep(self.export_delay).await;
        Ok(())
    }

    async fn verify_evidence(&self, evidence: &Evidence) -> Result<(), ActionError> {
        debug!(evidence = %evidence.id, "simulating hash re-check");
        sleep(self.fix_delay / 2).await;
        Ok(())
    }
}

fn lock(store: &Mutex<Workspace>) -> MutexGuard<'_, Workspace> {
    match store.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            warn!("workspace lock was poisoned, recovering");
            poisoned.into_inner()
        }
    }
}

/// Async facade over the workspace: forwards intents, owns the tick
/// task and the deferred-action backend.
pub struct Session<B = SimulatedBackend> {
    store: Arc<Mutex<Workspace>>,
    backend: B,
    notifier: Notifier,
    settings: TickSettings,
    ticker: Mutex<Option<JoinHandle<()>>>,
}

impl<B: AgentBackend> Session<B> {
    pub fn new(workspace: Workspace, backend: B, notifier: Notifier, settings: TickSettings) -> Self {
        Self {
            store: Arc::new(Mutex::new(workspace)),
            backend,
            notifier,
            settings,
            ticker: Mutex::new(None),
        }
    }

    /// Runs a closure against the workspace under the lock.
    pub fn with_store<R>(&self, f: impl FnOnce(&mut Workspace) -> R) -> R {
        f(&mut lock(&self.store))
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    // ── selection and the tick ──────────────────────────────────────

    /// Selects a job and restarts the tick driver for it. The previous
    /// driver is always cancelled first; a new one starts only when the
    /// selected job is running.
    pub fn select_job(&self, job_id: &str) -> bool {
        let selected = lock(&self.store).select_job(job_id);
        self.restart_ticker();
        selected
    }

    /// Creates a job (which selects it) and starts its tick driver.
    pub fn create_job(&self, input: &str) -> String {
        let id = lock(&self.store).create_job(input);
        info!(job_id = %id, "enrichment job created");
        self.restart_ticker();
        self.notifier.success(format!("Job {id} created"));
        id
    }

    /// Pauses the tick driver without touching the job.
    pub fn pause(&self) {
        self.cancel_ticker();
        lock(&self.store).pause_processing(true);
        self.notifier.info("Job paused");
    }

    /// Resumes the tick driver for the selected job, if it is running.
    pub fn resume(&self) {
        lock(&self.store).pause_processing(false);
        self.restart_ticker();
        self.notifier.info("Job resumed");
    }

    /// Stops the tick driver. The job keeps its status; only the
    /// simulation halts.
    pub fn stop(&self) {
        self.cancel_ticker();
        lock(&self.store).pause_processing(true);
        self.notifier.warn("Job stopped");
    }

    /// Whether a tick task is currently alive.
    pub fn is_ticking(&self) -> bool {
        lock_ticker(&self.ticker)
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    fn restart_ticker(&self) {
        self.cancel_ticker();

        let target = {
            let store = lock(&self.store);
            store.selected_job().filter(|j| j.is_running()).map(|j| j.id.clone())
        };
        let Some(job_id) = target else {
            return;
        };

        debug!(%job_id, "tick driver started");
        let store = Arc::clone(&self.store);
        let settings = self.settings;
        let handle = tokio::spawn(async move {
            let mut ticks = interval(settings.period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first interval tick completes immediately; the
            // simulated second starts after one full period.
            ticks.tick().await;
            loop {
                ticks.tick().await;
                let tokens = rand::thread_rng().gen_range(0..=settings.max_token_step);
                if !lock(&store).advance_selected(&job_id, settings.cost_step, tokens) {
                    debug!(%job_id, "tick driver self-terminated");
                    break;
                }
            }
        });
        *lock_ticker(&self.ticker) = Some(handle);
    }

    fn cancel_ticker(&self) {
        if let Some(handle) = lock_ticker(&self.ticker).take() {
            handle.abort();
        }
    }

    // ── synchronous intents with notifications ──────────────────────

    pub fn toggle_field_lock(&self, field: FieldName) -> bool {
        let toggled = lock(&self.store).toggle_field_lock(field);
        if toggled {
            let now_locked = lock(&self.store)
                .sku()
                .and_then(|s| s.record(field))
                .is_some_and(|r| r.status == FieldStatus::Locked);
            let state = if now_locked { "locked" } else { "unlocked" };
            self.notifier.success(format!("Field {field} {state}"));
        }
        toggled
    }

    pub fn trigger_conflict(&self, field: FieldName) -> bool {
        lock(&self.store).trigger_conflict(field)
    }

    pub fn resolve_conflict(&self, resolution: &crate::store::ConflictResolution) -> bool {
        let resolved = lock(&self.store).resolve_conflict(resolution);
        if resolved {
            self.notifier
                .success(format!("Conflict on {} resolved", resolution.field));
        }
        resolved
    }

    // ── deferred actions ────────────────────────────────────────────

    /// Asks the agent backend to clear one blocker. The blocker is
    /// removed from the workspace only after the backend completes;
    /// a failed action mutates nothing.
    pub async fn request_fix(&self, blocker_id: &str) -> Result<(), ActionError> {
        let blocker = lock(&self.store)
            .blockers()
            .iter()
            .find(|b| b.id == blocker_id)
            .cloned()
            .ok_or_else(|| ActionError::BlockerNotFound(blocker_id.to_string()))?;

        self.notifier.info("Agent is searching for missing data...");
        self.backend.resolve_blocker(&blocker).await?;

        let mut store = lock(&self.store);
        store.remove_blocker(blocker_id);
        store.record_api_call();
        drop(store);

        self.notifier.success("Blocker resolved by agent");
        Ok(())
    }

    /// Exports the selected job in the given format. Fails while
    /// validation blockers remain open.
    pub async fn export(&self, format: ExportFormat) -> Result<ExportReceipt, ActionError> {
        let job_id = self.exportable_job()?;

        let receipt = self.backend.export(&job_id, format).await?;
        lock(&self.store).record_api_call();
        self.notifier
            .success(format!("Exported {job_id} as {}", format.label()));
        Ok(receipt)
    }

    /// Publishes the selected job to all channels. Same gates as
    /// export.
    pub async fn publish(&self) -> Result<(), ActionError> {
        let job_id = self.exportable_job()?;

        self.backend.publish(&job_id).await?;
        lock(&self.store).record_api_call();
        self.notifier.success("Published to all channels successfully!");
        Ok(())
    }

    /// Re-checks one evidence record against its live source. Does not
    /// mutate the record.
    pub async fn verify_evidence(&self, field: FieldName, evidence_id: &str) -> Result<(), ActionError> {
        let evidence = lock(&self.store)
            .evidence(field)
            .into_iter()
            .find(|e| e.id == evidence_id)
            .ok_or_else(|| ActionError::Failed(format!("unknown evidence: {evidence_id}")))?;

        self.notifier.info("Verifying hash against live source...");
        self.backend.verify_evidence(&evidence).await?;
        lock(&self.store).record_api_call();
        self.notifier.success("Hash verified - content unchanged");
        Ok(())
    }

    fn exportable_job(&self) -> Result<String, ActionError> {
        let store = lock(&self.store);
        let job_id = store
            .selected_job()
            .map(|j| j.id.clone())
            .ok_or(ActionError::NoSelection)?;
        let remaining = store.blockers().len();
        if remaining > 0 {
            return Err(ActionError::Blocked { remaining });
        }
        Ok(job_id)
    }
}

fn lock_ticker(ticker: &Mutex<Option<JoinHandle<()>>>) -> MutexGuard<'_, Option<JoinHandle<()>>> {
    match ticker.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

impl<B> Drop for Session<B> {
    fn drop(&mut self) {
        if let Some(handle) = lock_ticker(&self.ticker).take() {
            handle.abort();
        }
    }
}
