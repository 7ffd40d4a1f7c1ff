//! Audit data models

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use super::snapshot::FieldMap;
use crate::error::{AuditError, AuditResult};

// ============================================================================
// Audit Constants
// ============================================================================

/// Default number of audit records returned per query
pub const DEFAULT_AUDIT_QUERY_LIMIT: i64 = 100;

/// Maximum number of audit records that can be returned in a single query.
pub const MAX_AUDIT_QUERY_LIMIT: i64 = 1000;

/// Longest accepted `entity_type`, in characters
pub const MAX_ENTITY_TYPE_LEN: usize = 50;

/// `origin` is truncated to this many characters
pub const MAX_ORIGIN_LEN: usize = 200;

/// Encoding tag written to `audit_log.state_version`
pub const CURRENT_STATE_VERSION: i64 = 1;

/// Fixed-width UTC format used for `occurred_at`; lexical order is chronological
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

pub fn parse_timestamp(text: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT).map(|naive| naive.and_utc())
}

/// `serde` helpers writing `DateTime<Utc>` in [`TIMESTAMP_FORMAT`]
pub mod timestamp {
    use chrono::{DateTime, Utc};
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(at: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_timestamp(at))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let text = String::deserialize(deserializer)?;
        super::parse_timestamp(&text)
            .or_else(|_| DateTime::parse_from_rfc3339(&text).map(|at| at.with_timezone(&Utc)))
            .map_err(D::Error::custom)
    }
}

/// Kind of change recorded in the trail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "CREATE",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AuditAction {
    type Err = AuditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "CREATE" => Ok(Self::Create),
            "UPDATE" => Ok(Self::Update),
            "DELETE" => Ok(Self::Delete),
            _ => Err(AuditError::validation(format!("unknown audit action '{s}'"))),
        }
    }
}

/// Who is making a change, threaded explicitly through every audited call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditContext {
    pub actor_id: i64,
    /// Network origin or client identity, kept for forensics
    pub origin: Option<String>,
}

impl AuditContext {
    pub fn new(actor_id: i64) -> Self {
        Self {
            actor_id,
            origin: None,
        }
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }
}

/// A persisted audit record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub id: i64,
    pub entity_type: String,
    pub entity_id: i64,
    pub action: AuditAction,
    pub old_state: Option<FieldMap>,
    pub new_state: Option<FieldMap>,
    pub actor_id: i64,
    #[serde(with = "timestamp")]
    pub occurred_at: DateTime<Utc>,
    pub origin: Option<String>,
    pub state_version: i64,
}

/// An audit record that has not been appended yet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAuditRecord {
    pub entity_type: String,
    pub entity_id: i64,
    pub action: AuditAction,
    pub old_state: Option<FieldMap>,
    pub new_state: Option<FieldMap>,
    pub actor_id: i64,
    pub origin: Option<String>,
    pub state_version: i64,
}

impl NewAuditRecord {
    pub fn builder() -> AuditRecordBuilder {
        AuditRecordBuilder::default()
    }

    pub(crate) fn into_record(self, id: i64, occurred_at: DateTime<Utc>) -> AuditRecord {
        AuditRecord {
            id,
            entity_type: self.entity_type,
            entity_id: self.entity_id,
            action: self.action,
            old_state: self.old_state,
            new_state: self.new_state,
            actor_id: self.actor_id,
            occurred_at,
            origin: self.origin,
            state_version: self.state_version,
        }
    }
}

/// Builder for [`NewAuditRecord`]
#[derive(Debug, Default)]
pub struct AuditRecordBuilder {
    entity_type: Option<String>,
    entity_id: Option<i64>,
    action: Option<AuditAction>,
    old_state: Option<FieldMap>,
    new_state: Option<FieldMap>,
    actor_id: Option<i64>,
    origin: Option<String>,
}

impl AuditRecordBuilder {
    pub fn entity_type(mut self, entity_type: impl Into<String>) -> Self {
        self.entity_type = Some(entity_type.into());
        self
    }

    pub fn entity_id(mut self, entity_id: i64) -> Self {
        self.entity_id = Some(entity_id);
        self
    }

    pub fn action(mut self, action: AuditAction) -> Self {
        self.action = Some(action);
        self
    }

    pub fn old_state(mut self, old_state: Option<FieldMap>) -> Self {
        self.old_state = old_state;
        self
    }

    pub fn new_state(mut self, new_state: Option<FieldMap>) -> Self {
        self.new_state = new_state;
        self
    }

    pub fn actor_id(mut self, actor_id: i64) -> Self {
        self.actor_id = Some(actor_id);
        self
    }

    pub fn origin(mut self, origin: Option<String>) -> Self {
        self.origin = origin;
        self
    }

    /// Build the record, checking that the states present match the action
    ///
    /// CREATE carries only `new_state`, DELETE only `old_state`, UPDATE both.
    pub fn try_build(self) -> AuditResult<NewAuditRecord> {
        let entity_type = self
            .entity_type
            .ok_or_else(|| AuditError::validation("entity_type is required"))?;
        if entity_type.is_empty() || entity_type.chars().count() > MAX_ENTITY_TYPE_LEN {
            return Err(AuditError::validation(format!(
                "entity_type must be 1-{MAX_ENTITY_TYPE_LEN} characters"
            )));
        }

        let entity_id = self
            .entity_id
            .ok_or_else(|| AuditError::validation("entity_id is required"))?;
        let action = self
            .action
            .ok_or_else(|| AuditError::validation("action is required"))?;
        let actor_id = self
            .actor_id
            .ok_or_else(|| AuditError::validation("actor_id is required"))?;

        let has_old = self.old_state.is_some();
        let has_new = self.new_state.is_some();
        let consistent = match action {
            AuditAction::Create => !has_old && has_new,
            AuditAction::Update => has_old && has_new,
            AuditAction::Delete => has_old && !has_new,
        };
        if !consistent {
            return Err(AuditError::validation(format!(
                "{action} record has old_state={has_old}, new_state={has_new}"
            )));
        }

        let origin = self
            .origin
            .map(|origin| origin.chars().take(MAX_ORIGIN_LEN).collect());

        Ok(NewAuditRecord {
            entity_type,
            entity_id,
            action,
            old_state: self.old_state,
            new_state: self.new_state,
            actor_id,
            origin,
            state_version: CURRENT_STATE_VERSION,
        })
    }
}

/// Filters for querying the audit trail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditQuery {
    pub entity_type: String,
    #[serde(default)]
    pub entity_id: Option<i64>,
    #[serde(default)]
    pub actor_id: Option<i64>,
    #[serde(default)]
    pub action: Option<AuditAction>,
    /// Inclusive lower bound on `occurred_at`
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `occurred_at`
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    DEFAULT_AUDIT_QUERY_LIMIT
}

impl AuditQuery {
    pub fn new(entity_type: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            entity_id: None,
            actor_id: None,
            action: None,
            start_time: None,
            end_time: None,
            limit: DEFAULT_AUDIT_QUERY_LIMIT,
            offset: 0,
        }
    }

    pub fn entity_id(mut self, entity_id: i64) -> Self {
        self.entity_id = Some(entity_id);
        self
    }

    pub fn actor_id(mut self, actor_id: i64) -> Self {
        self.actor_id = Some(actor_id);
        self
    }

    pub fn action(mut self, action: AuditAction) -> Self {
        self.action = Some(action);
        self
    }

    pub fn between(mut self, start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        self.start_time = start;
        self.end_time = end;
        self
    }

    pub fn page(mut self, limit: i64, offset: i64) -> Self {
        self.limit = limit;
        self.offset = offset;
        self
    }

    pub fn effective_limit(&self) -> i64 {
        self.limit.clamp(1, MAX_AUDIT_QUERY_LIMIT)
    }
}

/// Raw `audit_log` row; states and timestamp are decoded in [`TryFrom`]
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct AuditRow {
    pub id: i64,
    pub entity_type: String,
    pub entity_id: i64,
    pub action: String,
    pub old_state: Option<String>,
    pub new_state: Option<String>,
    pub actor_id: i64,
    pub occurred_at: String,
    pub origin: Option<String>,
    pub state_version: i64,
}

impl TryFrom<AuditRow> for AuditRecord {
    type Error = AuditError;

    fn try_from(row: AuditRow) -> Result<Self, Self::Error> {
        let id = row.id;
        let corrupt = |reason: String| AuditError::CorruptRecord { id, reason };

        let action = row
            .action
            .parse()
            .map_err(|_| corrupt(format!("unknown action '{}'", row.action)))?;
        let occurred_at = parse_timestamp(&row.occurred_at)
            .map_err(|e| corrupt(format!("bad occurred_at '{}': {e}", row.occurred_at)))?;
        let old_state = decode_state(row.old_state.as_deref()).map_err(|e| corrupt(format!("old_state: {e}")))?;
        let new_state = decode_state(row.new_state.as_deref()).map_err(|e| corrupt(format!("new_state: {e}")))?;

        Ok(AuditRecord {
            id,
            entity_type: row.entity_type,
            entity_id: row.entity_id,
            action,
            old_state,
            new_state,
            actor_id: row.actor_id,
            occurred_at,
            origin: row.origin,
            state_version: row.state_version,
        })
    }
}

fn decode_state(text: Option<&str>) -> Result<Option<FieldMap>, serde_json::Error> {
    text.map(serde_json::from_str).transpose()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn state(value: serde_json::Value) -> Option<FieldMap> {
        value.as_object().cloned()
    }

    fn builder(action: AuditAction) -> AuditRecordBuilder {
        NewAuditRecord::builder()
            .entity_type("equipment")
            .entity_id(1)
            .actor_id(7)
            .action(action)
    }

    #[test]
    fn test_audit_action_as_str() {
        assert_eq!(AuditAction::Create.as_str(), "CREATE");
        assert_eq!(AuditAction::Delete.to_string(), "DELETE");
        assert_eq!("update".parse::<AuditAction>().unwrap(), AuditAction::Update);
        assert!("archive".parse::<AuditAction>().is_err());
    }

    #[test]
    fn test_action_serialization() {
        assert_eq!(serde_json::to_string(&AuditAction::Update).unwrap(), "\"UPDATE\"");
    }

    #[test]
    fn test_builder_enforces_state_presence() {
        let snapshot = state(json!({"numero_serie": "ABC123"}));

        assert!(builder(AuditAction::Create).new_state(snapshot.clone()).try_build().is_ok());
        assert!(builder(AuditAction::Create)
            .old_state(snapshot.clone())
            .new_state(snapshot.clone())
            .try_build()
            .is_err());
        assert!(builder(AuditAction::Update).new_state(snapshot.clone()).try_build().is_err());
        assert!(builder(AuditAction::Delete).old_state(snapshot.clone()).try_build().is_ok());
        assert!(matches!(
            builder(AuditAction::Delete).new_state(snapshot).try_build(),
            Err(AuditError::Validation(_))
        ));
    }

    #[test]
    fn test_builder_validates_entity_type() {
        let result = builder(AuditAction::Create)
            .entity_type("")
            .new_state(state(json!({})))
            .try_build();
        assert!(result.is_err());

        let result = builder(AuditAction::Create)
            .entity_type("x".repeat(MAX_ENTITY_TYPE_LEN + 1))
            .new_state(state(json!({})))
            .try_build();
        assert!(result.is_err());
    }

    #[test]
    fn test_builder_truncates_origin_on_char_boundary() {
        let origin = "é".repeat(MAX_ORIGIN_LEN + 10);
        let record = builder(AuditAction::Create)
            .new_state(state(json!({})))
            .origin(Some(origin))
            .try_build()
            .unwrap();

        assert_eq!(record.origin.unwrap().chars().count(), MAX_ORIGIN_LEN);
        assert_eq!(record.state_version, CURRENT_STATE_VERSION);
    }

    #[test]
    fn test_timestamp_is_fixed_width_and_round_trips() {
        let at = Utc.with_ymd_and_hms(2025, 1, 18, 9, 5, 3).unwrap();
        let text = format_timestamp(&at);
        assert_eq!(text, "2025-01-18T09:05:03.000000Z");
        assert_eq!(parse_timestamp(&text).unwrap(), at);
    }

    #[test]
    fn test_query_limit_is_clamped() {
        assert_eq!(AuditQuery::new("screen").effective_limit(), DEFAULT_AUDIT_QUERY_LIMIT);
        assert_eq!(AuditQuery::new("screen").page(5000, 0).effective_limit(), MAX_AUDIT_QUERY_LIMIT);
        assert_eq!(AuditQuery::new("screen").page(0, 0).effective_limit(), 1);
    }

    #[test]
    fn test_corrupt_row_is_reported() {
        let row = AuditRow {
            id: 9,
            entity_type: "equipment".into(),
            entity_id: 1,
            action: "CREATE".into(),
            old_state: None,
            new_state: Some("{not json".into()),
            actor_id: 1,
            occurred_at: "2025-01-18T09:05:03.000000Z".into(),
            origin: None,
            state_version: 1,
        };

        assert!(matches!(
            AuditRecord::try_from(row),
            Err(AuditError::CorruptRecord { id: 9, .. })
        ));
    }
}
