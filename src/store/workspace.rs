use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::export::Blocker;
use crate::seed;

use super::audit::{AuditAction, AuditEntry};
use super::conflict::{Conflict, ConflictResolution};
use super::evidence::Evidence;
use super::job::{FilterCounts, Job, JobStatus};
use super::message::AgentMessage;
use super::sku::{FieldName, FieldStatus, SkuData};

/// Spend ceilings the budget view is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BudgetLimits {
    pub token_limit: u64,
    pub cost_limit: f64,
    pub api_call_limit: u32,
}

impl Default for BudgetLimits {
    fn default() -> Self {
        Self {
            token_limit: 100_000,
            cost_limit: 10.0,
            api_call_limit: 500,
        }
    }
}

/// Aggregate spend across all jobs. Derived on demand, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BudgetData {
    pub token_usage: u64,
    pub token_limit: u64,
    pub estimated_cost: f64,
    pub cost_limit: f64,
    pub api_calls: u32,
    pub api_call_limit: u32,
}

/// Everything a workspace starts from. Tests build small snapshots;
/// the demo console uses [`Snapshot::seeded`].
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub jobs: Vec<Job>,
    pub blockers: Vec<Blocker>,
    pub api_calls: u32,
    pub user: String,
    pub limits: BudgetLimits,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            jobs: Vec::new(),
            blockers: Vec::new(),
            api_calls: 0,
            user: "current-user".to_string(),
            limits: BudgetLimits::default(),
        }
    }
}

impl Snapshot {
    /// The demo fixture: five jobs, two open blockers, spent API calls.
    pub fn seeded() -> Self {
        Self {
            jobs: seed::demo_jobs(),
            blockers: seed::demo_blockers(),
            api_calls: seed::SEED_API_CALLS,
            ..Self::default()
        }
    }
}

/// Single source of truth for the console: jobs, selection, SKU data,
/// agent trace, audit log, blockers, and the one conflict slot.
///
/// All operations are synchronous and run to completion; the async
/// driver in [`crate::session`] is the only caller that suspends, and
/// it goes through these entry points like everyone else.
pub struct Workspace {
    jobs: Vec<Job>,
    selected: Option<String>,
    sku: Option<SkuData>,
    messages: Vec<AgentMessage>,
    processing: bool,
    audit: Vec<AuditEntry>,
    conflict: Option<Conflict>,
    blockers: Vec<Blocker>,
    /// Locked fields per job id. Locks survive SKU regeneration on
    /// re-selection.
    locked: HashMap<String, BTreeSet<FieldName>>,
    api_calls: u32,
    limits: BudgetLimits,
    user: String,
}

impl Workspace {
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            jobs: snapshot.jobs,
            selected: None,
            sku: None,
            messages: Vec::new(),
            processing: false,
            audit: Vec::new(),
            conflict: None,
            blockers: snapshot.blockers,
            locked: HashMap::new(),
            api_calls: snapshot.api_calls,
            limits: snapshot.limits,
            user: snapshot.user,
        }
    }

    // ── read model ──────────────────────────────────────────────────

    /// All jobs, most recently created first.
    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    /// Jobs matching the given status, preserving list order.
    pub fn jobs_with_status(&self, status: Option<JobStatus>) -> Vec<&Job> {
        self.jobs
            .iter()
            .filter(|j| status.is_none_or(|s| j.status == s))
            .collect()
    }

    pub fn selected_job(&self) -> Option<&Job> {
        let id = self.selected.as_deref()?;
        self.jobs.iter().find(|j| j.id == id)
    }

    pub fn sku(&self) -> Option<&SkuData> {
        self.sku.as_ref()
    }

    pub fn messages(&self) -> &[AgentMessage] {
        &self.messages
    }

    pub fn is_processing(&self) -> bool {
        self.processing
    }

    pub fn audit_log(&self) -> &[AuditEntry] {
        &self.audit
    }

    pub fn active_conflict(&self) -> Option<&Conflict> {
        self.conflict.as_ref()
    }

    pub fn blockers(&self) -> &[Blocker] {
        &self.blockers
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn filter_counts(&self) -> FilterCounts {
        FilterCounts::tally(&self.jobs)
    }

    pub fn budget(&self) -> BudgetData {
        BudgetData {
            token_usage: self.jobs.iter().map(|j| j.token_usage).sum(),
            token_limit: self.limits.token_limit,
            estimated_cost: self.jobs.iter().map(|j| j.cost).sum(),
            cost_limit: self.limits.cost_limit,
            api_calls: self.api_calls,
            api_call_limit: self.limits.api_call_limit,
        }
    }

    /// Fixture evidence for a field. Keyed by field name only; a full
    /// evidence store would key on job and field.
    pub fn evidence(&self, field: FieldName) -> Vec<Evidence> {
        seed::evidence_for(field)
    }

    // ── intents ─────────────────────────────────────────────────────

    /// Creates a running job with zeroed counters at the head of the
    /// list and selects it. Empty input is accepted.
    pub fn create_job(&mut self, input: &str) -> String {
        let job = Job::new(input);
        let id = job.id.clone();
        debug!(job_id = %id, "job created");
        self.jobs.insert(0, job);
        self.select_job(&id);
        id
    }

    /// Selects a job, regenerating its SKU data (locks reapplied) and
    /// trace. Running jobs present the full trace and a live flag;
    /// finished jobs only the first three lines. Unknown ids are a
    /// no-op returning `false`.
    pub fn select_job(&mut self, job_id: &str) -> bool {
        let Some(job) = self.jobs.iter().find(|j| j.id == job_id).cloned() else {
            debug!(job_id, "select ignored: unknown job");
            return false;
        };

        let mut sku = seed::sku_for_job(&job);
        if let Some(locked) = self.locked.get(&job.id) {
            for field in locked {
                if let Some(rec) = sku.record_mut(*field) {
                    rec.status = FieldStatus::Locked;
                }
            }
        }

        let trace = seed::trace_for(&job);
        if job.is_running() {
            self.messages = trace;
            self.processing = true;
        } else {
            self.messages = trace.into_iter().take(3).collect();
            self.processing = false;
        }

        self.selected = Some(job.id.clone());
        self.sku = Some(sku);
        self.conflict = None;
        debug!(job_id, status = %job.status, "job selected");
        true
    }

    /// Flips a field between `Locked` and `Verified` and appends one
    /// audit entry. Unlocking always lands on `Verified`, whatever the
    /// status was before the lock. Image fields and absent selections
    /// are a safe no-op.
    pub fn toggle_field_lock(&mut self, field: FieldName) -> bool {
        let Some(job_id) = self.selected.clone() else {
            return false;
        };
        let Some(rec) = self.sku.as_mut().and_then(|s| s.record_mut(field)) else {
            return false;
        };

        let (action, next) = if rec.status == FieldStatus::Locked {
            (AuditAction::FieldUnlock, FieldStatus::Verified)
        } else {
            (AuditAction::FieldLock, FieldStatus::Locked)
        };
        rec.status = next;
        let value = rec.value.clone();

        let locks = self.locked.entry(job_id.clone()).or_default();
        if next == FieldStatus::Locked {
            locks.insert(field);
        } else {
            locks.remove(&field);
        }

        debug!(%field, %action, "field lock toggled");
        self.audit.push(AuditEntry::new(
            action,
            field,
            value.clone(),
            value,
            self.user.clone(),
            job_id,
        ));
        true
    }

    /// Opens the conflict slot for a field whose evidence disagrees.
    /// No-op when a conflict is already active, nothing is selected,
    /// the field is locked, or the evidence agrees.
    pub fn trigger_conflict(&mut self, field: FieldName) -> bool {
        if self.conflict.is_some() || self.selected.is_none() {
            return false;
        }
        if self
            .sku
            .as_ref()
            .and_then(|s| s.record(field))
            .is_some_and(|r| r.status == FieldStatus::Locked)
        {
            return false;
        }

        let evidence = seed::evidence_for(field);
        let Some(conflict) = Conflict::from_evidence(field, &evidence) else {
            debug!(%field, "conflict not triggered: evidence agrees");
            return false;
        };

        if let Some(rec) = self.sku.as_mut().and_then(|s| s.record_mut(field)) {
            rec.status = FieldStatus::Conflict;
        }
        debug!(%field, claims = conflict.claims.len(), "conflict opened");
        self.conflict = Some(conflict);
        true
    }

    /// Applies a resolution to the active conflict: the chosen value
    /// becomes the field's value, the field turns `Verified`, one audit
    /// entry is appended, and the slot clears. Resolving with no active
    /// conflict, or for a different field, is an idempotent no-op.
    pub fn resolve_conflict(&mut self, resolution: &ConflictResolution) -> bool {
        let Some(active) = self.conflict.as_ref() else {
            return false;
        };
        if active.field != resolution.field {
            return false;
        }
        let Some(job_id) = self.selected.clone() else {
            return false;
        };
        let Some(rec) = self
            .sku
            .as_mut()
            .and_then(|s| s.record_mut(resolution.field))
        else {
            return false;
        };

        let before = std::mem::replace(&mut rec.value, resolution.value.clone());
        rec.status = FieldStatus::Verified;

        debug!(field = %resolution.field, source = %resolution.source, "conflict resolved");
        self.audit.push(AuditEntry::new(
            AuditAction::ConflictResolve,
            resolution.field,
            before,
            resolution.value.clone(),
            self.user.clone(),
            job_id,
        ));
        self.conflict = None;
        true
    }

    /// Appends to the audit log. Never fails, never rewrites history.
    pub fn add_audit_entry(&mut self, entry: AuditEntry) {
        self.audit.push(entry);
    }

    /// Removes one validation blocker. Unknown ids are a no-op.
    pub fn remove_blocker(&mut self, blocker_id: &str) -> bool {
        let before = self.blockers.len();
        self.blockers.retain(|b| b.id != blocker_id);
        let removed = self.blockers.len() < before;
        if removed {
            debug!(blocker_id, "blocker removed");
        }
        removed
    }

    /// One simulated tick against the selected running job. Refuses
    /// unless `job_id` is both the current selection and `Running`,
    /// which makes a stale driver task harmless.
    pub fn advance_selected(&mut self, job_id: &str, cost_step: f64, tokens: u64) -> bool {
        if self.selected.as_deref() != Some(job_id) {
            return false;
        }
        let Some(job) = self.jobs.iter_mut().find(|j| j.id == job_id) else {
            return false;
        };
        if !job.is_running() {
            return false;
        }

        job.duration_secs += 1;
        job.cost += cost_step;
        job.token_usage += tokens;
        job.updated_at = chrono::Utc::now();
        true
    }

    /// Counts one API call against the budget.
    pub fn record_api_call(&mut self) {
        self.api_calls += 1;
    }

    /// Pauses or resumes the live-trace flag without touching job
    /// status. Only meaningful while a running job is selected.
    pub fn pause_processing(&mut self, paused: bool) {
        let running = self.selected_job().is_some_and(Job::is_running);
        self.processing = running && !paused;
    }

    /// Sets a job's status through the store. Transition legality is
    /// not enforced here; export and publish gate on blockers instead.
    pub fn set_status(&mut self, job_id: &str, status: JobStatus) -> bool {
        let Some(job) = self.jobs.iter_mut().find(|j| j.id == job_id) else {
            return false;
        };
        debug!(job_id, from = %job.status, to = %status, "status changed");
        job.status = status;
        job.updated_at = chrono::Utc::now();
        if self.selected.as_deref() == Some(job_id) && status != JobStatus::Running {
            self.processing = false;
        }
        true
    }
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new(Snapshot::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MessageKind;

    fn seeded() -> Workspace {
        Workspace::new(Snapshot::seeded())
    }

    #[test]
    fn filter_counts_match_the_job_list() {
        let ws = seeded();
        let counts = ws.filter_counts();
        assert_eq!(counts.all, ws.jobs().len());
        let summed: usize = JobStatus::ALL.iter().map(|s| counts.count(*s)).sum();
        assert_eq!(summed, counts.all);
        assert_eq!(counts.running, 1);
        assert_eq!(counts.blocked, 1);
    }

    #[test]
    fn create_job_prepends_and_selects() {
        let mut ws = seeded();
        let id = ws.create_job("Brother TN-2420");

        let head = &ws.jobs()[0];
        assert_eq!(head.id, id);
        assert_eq!(head.status, JobStatus::Running);
        assert!(head.mpn.is_empty());
        assert!(head.brand.is_empty());
        assert_eq!(head.cost, 0.0);
        assert_eq!(head.duration_secs, 0);
        assert_eq!(head.token_usage, 0);

        assert_eq!(ws.selected_job().unwrap().id, id);
        assert_eq!(ws.filter_counts().all, 6);
    }

    #[test]
    fn create_job_accepts_empty_input() {
        let mut ws = Workspace::default();
        let id = ws.create_job("");
        assert_eq!(ws.jobs()[0].id, id);
        assert!(ws.jobs()[0].input.is_empty());
    }

    #[test]
    fn selecting_running_job_shows_full_trace() {
        let mut ws = seeded();
        assert!(ws.select_job("job-001"));
        assert_eq!(ws.sku().unwrap().job_id, "job-001");
        assert_eq!(ws.messages().len(), 5);
        assert!(ws.is_processing());
    }

    #[test]
    fn selecting_finished_job_truncates_trace() {
        let mut ws = seeded();
        assert!(ws.select_job("job-003"));
        assert_eq!(ws.sku().unwrap().job_id, "job-003");
        assert_eq!(ws.messages().len(), 3);
        assert!(!ws.is_processing());
        // The truncated trace is a prefix, not a sample.
        assert_eq!(ws.messages()[0].kind, MessageKind::Plan);
    }

    #[test]
    fn selecting_unknown_job_is_a_noop() {
        let mut ws = seeded();
        ws.select_job("job-001");
        assert!(!ws.select_job("job-999"));
        assert_eq!(ws.selected_job().unwrap().id, "job-001");
        assert_eq!(ws.messages().len(), 5);
    }

    #[test]
    fn lock_then_unlock_restores_verified() {
        let mut ws = seeded();
        ws.select_job("job-003");

        // Yield starts out pending.
        assert_eq!(
            ws.sku().unwrap().record(FieldName::Yield).unwrap().status,
            FieldStatus::Pending
        );

        assert!(ws.toggle_field_lock(FieldName::Yield));
        assert_eq!(
            ws.sku().unwrap().record(FieldName::Yield).unwrap().status,
            FieldStatus::Locked
        );

        assert!(ws.toggle_field_lock(FieldName::Yield));
        // Prior pending status is gone; unlock always lands on verified.
        assert_eq!(
            ws.sku().unwrap().record(FieldName::Yield).unwrap().status,
            FieldStatus::Verified
        );

        let log = ws.audit_log();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].action, AuditAction::FieldLock);
        assert_eq!(log[1].action, AuditAction::FieldUnlock);
        assert_eq!(log[0].before, log[0].after);
        assert_eq!(log[0].user, "current-user");
        assert_eq!(log[0].job_id, "job-003");
    }

    #[test]
    fn lock_survives_reselection() {
        let mut ws = seeded();
        ws.select_job("job-003");
        ws.toggle_field_lock(FieldName::Brand);

        ws.select_job("job-001");
        ws.select_job("job-003");
        assert_eq!(
            ws.sku().unwrap().record(FieldName::Brand).unwrap().status,
            FieldStatus::Locked
        );
        // Other fields were regenerated fresh.
        assert_eq!(
            ws.sku().unwrap().record(FieldName::Yield).unwrap().status,
            FieldStatus::Pending
        );
    }

    #[test]
    fn locking_the_image_field_is_a_noop() {
        let mut ws = seeded();
        ws.select_job("job-001");
        assert!(!ws.toggle_field_lock(FieldName::HeroImage));
        assert!(ws.audit_log().is_empty());
    }

    #[test]
    fn lock_without_selection_is_a_noop() {
        let mut ws = seeded();
        assert!(!ws.toggle_field_lock(FieldName::Brand));
        assert!(ws.audit_log().is_empty());
    }

    #[test]
    fn conflict_trigger_and_resolve_roundtrip() {
        let mut ws = seeded();
        ws.select_job("job-003");

        assert!(ws.trigger_conflict(FieldName::Dimensions));
        let conflict = ws.active_conflict().unwrap().clone();
        assert_eq!(conflict.field, FieldName::Dimensions);
        assert!(conflict.claims.len() >= 2);

        let resolution = conflict.resolution_for(0).unwrap();
        let expected = resolution.value.clone();
        assert!(ws.resolve_conflict(&resolution));

        let rec = ws.sku().unwrap().record(FieldName::Dimensions).unwrap();
        assert_eq!(rec.value, expected);
        assert_eq!(rec.status, FieldStatus::Verified);
        assert!(ws.active_conflict().is_none());

        let log = ws.audit_log();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].action, AuditAction::ConflictResolve);
        assert_eq!(log[0].after, expected);
    }

    #[test]
    fn resolve_without_active_conflict_is_a_noop() {
        let mut ws = seeded();
        ws.select_job("job-003");
        let before = ws.sku().unwrap().clone();

        let resolution = ConflictResolution {
            field: FieldName::Dimensions,
            value: "1 x 1 x 1 cm".into(),
            source: "https://nowhere.example.com".into(),
        };
        assert!(!ws.resolve_conflict(&resolution));
        assert_eq!(ws.sku().unwrap(), &before);
        assert!(ws.audit_log().is_empty());
    }

    #[test]
    fn resolve_for_a_different_field_is_a_noop() {
        let mut ws = seeded();
        ws.select_job("job-003");
        ws.trigger_conflict(FieldName::Dimensions);

        let resolution = ConflictResolution {
            field: FieldName::Weight,
            value: "0.5 kg".into(),
            source: "https://shop.example.com".into(),
        };
        assert!(!ws.resolve_conflict(&resolution));
        assert!(ws.active_conflict().is_some());
    }

    #[test]
    fn conflict_on_agreeing_evidence_is_a_noop() {
        let mut ws = seeded();
        ws.select_job("job-003");
        assert!(!ws.trigger_conflict(FieldName::Brand));
        assert!(ws.active_conflict().is_none());
    }

    #[test]
    fn conflict_on_locked_field_is_a_noop() {
        let mut ws = seeded();
        ws.select_job("job-003");
        ws.toggle_field_lock(FieldName::Dimensions);
        assert!(!ws.trigger_conflict(FieldName::Dimensions));
    }

    #[test]
    fn second_conflict_waits_for_the_first() {
        let mut ws = seeded();
        ws.select_job("job-003");
        assert!(ws.trigger_conflict(FieldName::Dimensions));
        assert!(!ws.trigger_conflict(FieldName::Mpn));
        assert_eq!(ws.active_conflict().unwrap().field, FieldName::Dimensions);
    }

    #[test]
    fn advance_only_touches_the_selected_running_job() {
        let mut ws = seeded();
        ws.select_job("job-001");

        assert!(ws.advance_selected("job-001", 0.001, 42));
        let job = ws.selected_job().unwrap();
        assert_eq!(job.duration_secs, 121);
        assert_eq!(job.token_usage, 4542);

        // Not the selection.
        assert!(!ws.advance_selected("job-002", 0.001, 42));
        // Selection moved on; the stale id no longer advances.
        ws.select_job("job-003");
        assert!(!ws.advance_selected("job-001", 0.001, 42));
        let old = ws.jobs().iter().find(|j| j.id == "job-001").unwrap();
        assert_eq!(old.duration_secs, 121);
        // The new selection is not running, so it does not advance either.
        assert!(!ws.advance_selected("job-003", 0.001, 42));
    }

    #[test]
    fn status_change_stops_processing_flag() {
        let mut ws = seeded();
        ws.select_job("job-001");
        assert!(ws.is_processing());
        ws.set_status("job-001", JobStatus::NeedsReview);
        assert!(!ws.is_processing());
        assert!(!ws.advance_selected("job-001", 0.001, 10));
    }

    #[test]
    fn pause_and_resume_processing() {
        let mut ws = seeded();
        ws.select_job("job-001");
        ws.pause_processing(true);
        assert!(!ws.is_processing());
        ws.pause_processing(false);
        assert!(ws.is_processing());

        // Resuming a finished job does not make it live.
        ws.select_job("job-002");
        ws.pause_processing(false);
        assert!(!ws.is_processing());
    }

    #[test]
    fn budget_sums_all_jobs() {
        let ws = seeded();
        let budget = ws.budget();
        assert_eq!(budget.token_usage, 4500 + 8200 + 6800 + 2100 + 9500);
        assert!((budget.estimated_cost - 1.59).abs() < 1e-9);
        assert_eq!(budget.api_calls, 47);
        assert_eq!(budget.token_limit, 100_000);
    }

    #[test]
    fn remove_blocker_drains_the_set() {
        let mut ws = seeded();
        assert_eq!(ws.blockers().len(), 2);
        assert!(ws.remove_blocker("blk-001"));
        assert_eq!(ws.blockers().len(), 1);
        assert!(!ws.remove_blocker("blk-001"));
        assert!(!ws.remove_blocker("blk-999"));
        assert_eq!(ws.blockers().len(), 1);
    }

    #[test]
    fn add_audit_entry_appends_external_entries() {
        let mut ws = seeded();
        ws.select_job("job-001");
        ws.toggle_field_lock(FieldName::Mpn);

        ws.add_audit_entry(AuditEntry::new(
            AuditAction::FieldLock,
            FieldName::Weight,
            "0.45 kg",
            "0.45 kg",
            "reviewer-7",
            "job-001",
        ));

        let log = ws.audit_log();
        assert_eq!(log.len(), 2);
        assert_eq!(log[1].user, "reviewer-7");
        assert_eq!(log[1].field, FieldName::Weight);
    }

    #[test]
    fn audit_entries_keep_call_order() {
        let mut ws = seeded();
        ws.select_job("job-001");
        ws.toggle_field_lock(FieldName::Mpn);
        ws.toggle_field_lock(FieldName::Brand);
        ws.toggle_field_lock(FieldName::Mpn);

        let fields: Vec<FieldName> = ws.audit_log().iter().map(|e| e.field).collect();
        assert_eq!(fields, vec![FieldName::Mpn, FieldName::Brand, FieldName::Mpn]);
    }

    #[test]
    fn filtered_jobs_preserve_order() {
        let mut ws = seeded();
        ws.create_job("another running job");
        let running = ws.jobs_with_status(Some(JobStatus::Running));
        assert_eq!(running.len(), 2);
        // Newest first, same as the unfiltered list.
        assert_eq!(running[0].id, ws.jobs()[0].id);
        assert_eq!(running[1].id, "job-001");
    }
}
