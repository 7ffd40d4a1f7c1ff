//! Change auditing
//!
//! - [`snapshot`]: entity to ordered field map
//! - [`diff`]: field-level changes between two snapshots
//! - [`queries`]: the append-only `audit_log` store
//! - [`interceptor`]: audited mutations
//! - [`history`]: formatted history and last-change lookups

pub mod diff;
pub mod history;
pub mod interceptor;
pub mod models;
pub mod queries;
pub mod snapshot;

pub use diff::{diff, FieldChange};
pub use history::{
    Actor, ActorResolver, HistoryEntry, HistoryPage, HistoryService, LastChange,
    SqliteActorResolver, StaticActorResolver,
};
pub use interceptor::{
    AuditOutcome, AuditWriteMode, Intercepted, Interceptor, InterceptorConfig, MutationKind,
    AUDIT_GAP_TARGET,
};
pub use models::{AuditAction, AuditContext, AuditQuery, AuditRecord, NewAuditRecord};
pub use queries::AuditStore;
pub use snapshot::{snapshot, Auditable, FieldMap};
