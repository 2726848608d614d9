use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::card::{CardId, CardStatus};

/// One accepted move, captured for the audit trail.
///
/// Records are append-only: created exactly once per accepted move, never
/// mutated or deleted. Same-slot moves write no record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeRecord {
    pub id: i64,
    pub card_id: CardId,
    pub old_status: CardStatus,
    pub new_status: CardStatus,
    pub old_priority: i64,
    pub new_priority: i64,
    pub actor: String,
    pub recorded_at: DateTime<Utc>,
}
