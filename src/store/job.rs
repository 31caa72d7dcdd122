use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status of an enrichment job.
///
/// Any status may follow any other; legality of a transition is not
/// enforced at this level. Export and publish gate on the blocker set
/// instead of the status name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Running,
    Completed,
    Failed,
    NeedsReview,
    Blocked,
    ReadyToPublish,
}

impl JobStatus {
    /// Every status, in dashboard filter order.
    pub const ALL: [JobStatus; 6] = [
        JobStatus::Running,
        JobStatus::Completed,
        JobStatus::Failed,
        JobStatus::NeedsReview,
        JobStatus::Blocked,
        JobStatus::ReadyToPublish,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
            JobStatus::NeedsReview => "needs_review",
            JobStatus::Blocked => "blocked",
            JobStatus::ReadyToPublish => "ready_to_publish",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One SKU enrichment task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    /// Raw product description the job was created from.
    pub input: String,
    /// Extracted manufacturer part number, empty until extraction lands.
    pub mpn: String,
    /// Extracted brand, empty until extraction lands.
    pub brand: String,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Accumulated spend in USD.
    pub cost: f64,
    /// Accumulated wall-clock duration in seconds.
    pub duration_secs: u64,
    pub token_usage: u64,
}

impl Job {
    /// New job in `Running` status with zeroed counters.
    pub fn new(input: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: format!("job-{}", Uuid::new_v4()),
            input: input.into(),
            mpn: String::new(),
            brand: String::new(),
            status: JobStatus::Running,
            created_at: now,
            updated_at: now,
            cost: 0.0,
            duration_secs: 0,
            token_usage: 0,
        }
    }

    pub fn is_running(&self) -> bool {
        self.status == JobStatus::Running
    }
}

/// Per-status job counts for the dashboard filter bar.
///
/// `all` always equals the total job count, and the per-status counts
/// sum to `all`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FilterCounts {
    pub all: usize,
    pub running: usize,
    pub completed: usize,
    pub failed: usize,
    pub needs_review: usize,
    pub blocked: usize,
    pub ready_to_publish: usize,
}

impl FilterCounts {
    pub fn tally(jobs: &[Job]) -> Self {
        let mut counts = Self {
            all: jobs.len(),
            ..Self::default()
        };
        for job in jobs {
            *counts.slot_mut(job.status) += 1;
        }
        counts
    }

    pub fn count(&self, status: JobStatus) -> usize {
        match status {
            JobStatus::Running => self.running,
            JobStatus::Completed => self.completed,
            JobStatus::Failed => self.failed,
            JobStatus::NeedsReview => self.needs_review,
            JobStatus::Blocked => self.blocked,
            JobStatus::ReadyToPublish => self.ready_to_publish,
        }
    }

    fn slot_mut(&mut self, status: JobStatus) -> &mut usize {
        match status {
            JobStatus::Running => &mut self.running,
            JobStatus::Completed => &mut self.completed,
            JobStatus::Failed => &mut self.failed,
            JobStatus::NeedsReview => &mut self.needs_review,
            JobStatus::Blocked => &mut self.blocked,
            JobStatus::ReadyToPublish => &mut self.ready_to_publish,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_job_defaults() {
        let job = Job::new("Brother TN-2420 High Yield Black Toner");
        assert_eq!(job.status, JobStatus::Running);
        assert!(job.mpn.is_empty());
        assert!(job.brand.is_empty());
        assert_eq!(job.cost, 0.0);
        assert_eq!(job.duration_secs, 0);
        assert_eq!(job.token_usage, 0);
        assert!(job.id.starts_with("job-"));
    }

    #[test]
    fn new_jobs_get_unique_ids() {
        let a = Job::new("first");
        let b = Job::new("second");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_string(&JobStatus::NeedsReview).unwrap();
        assert_eq!(json, r#""needs_review""#);
        let back: JobStatus = serde_json::from_str(r#""ready_to_publish""#).unwrap();
        assert_eq!(back, JobStatus::ReadyToPublish);
    }

    #[test]
    fn unknown_status_rejected() {
        let result = serde_json::from_str::<JobStatus>(r#""paused""#);
        assert!(result.is_err());
    }

    #[test]
    fn job_serialization_roundtrip() {
        let job = Job::new("HP CE285A Toner");
        let json = serde_json::to_string(&job).unwrap();
        let back: Job = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, job.id);
        assert_eq!(back.status, JobStatus::Running);
        assert_eq!(back.input, "HP CE285A Toner");
    }

    #[test]
    fn filter_counts_partition_the_list() {
        let mut jobs: Vec<Job> = (0..4).map(|i| Job::new(format!("job {i}"))).collect();
        jobs[1].status = JobStatus::Completed;
        jobs[2].status = JobStatus::Blocked;
        jobs[3].status = JobStatus::Completed;

        let counts = FilterCounts::tally(&jobs);
        assert_eq!(counts.all, 4);
        assert_eq!(counts.running, 1);
        assert_eq!(counts.completed, 2);
        assert_eq!(counts.blocked, 1);

        let summed: usize = JobStatus::ALL.iter().map(|s| counts.count(*s)).sum();
        assert_eq!(summed, counts.all);
    }

    #[test]
    fn filter_counts_empty_list() {
        let counts = FilterCounts::tally(&[]);
        assert_eq!(counts.all, 0);
        assert_eq!(counts.running, 0);
    }
}
