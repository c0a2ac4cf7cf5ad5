//! Audit trail: process-wide action log.
//!
//! Recording is best-effort by policy: a failed audit write is logged and
//! never blocks or rolls back the business operation that triggered it.
//! Writes are still awaited (not fire-and-forget) so tests observe entries
//! deterministically.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockroom_core::AuditEntryId;

use crate::store::AuditStore;

/// One audit log entry: who did what, when.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditLogEntry {
    pub id: AuditEntryId,
    pub timestamp: DateTime<Utc>,
    pub user: String,
    pub action: String,
}

/// Record an action, swallowing (but logging) store failures.
pub(crate) async fn record_best_effort<S>(store: &S, user: &str, action: &str)
where
    S: AuditStore + ?Sized,
{
    if let Err(err) = store.append_audit(user, action).await {
        tracing::warn!(error = %err, user, action, "audit append failed; operation continues");
    }
}
