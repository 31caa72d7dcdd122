mod audit;
mod conflict;
mod evidence;
mod job;
mod message;
mod sku;
mod workspace;

pub use audit::{AuditAction, AuditEntry};
pub use conflict::{Claim, Conflict, ConflictResolution};
pub use evidence::{Evidence, SourceType};
pub use job::{FilterCounts, Job, JobStatus};
pub use message::{AgentMessage, MessageKind};
pub use sku::{Confidence, FieldName, FieldRecord, FieldStatus, ImageField, QcStatus, SkuData};
pub use workspace::{BudgetData, BudgetLimits, Snapshot, Workspace};
