use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Semantic label attached to one captured change set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "audit_action", rename_all = "PascalCase"))]
pub enum AuditAction {
    Unknown,
    PlateUpdated,
    PlateReserved,
    PlateUnreserved,
    PlateSold,
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuditAction::Unknown => write!(f, "Unknown"),
            AuditAction::PlateUpdated => write!(f, "PlateUpdated"),
            AuditAction::PlateReserved => write!(f, "PlateReserved"),
            AuditAction::PlateUnreserved => write!(f, "PlateUnreserved"),
            AuditAction::PlateSold => write!(f, "PlateSold"),
        }
    }
}

impl FromStr for AuditAction {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Unknown" => Ok(AuditAction::Unknown),
            "PlateUpdated" => Ok(AuditAction::PlateUpdated),
            "PlateReserved" => Ok(AuditAction::PlateReserved),
            "PlateUnreserved" => Ok(AuditAction::PlateUnreserved),
            "PlateSold" => Ok(AuditAction::PlateSold),
            _ => Err(()),
        }
    }
}

/// One field-level delta, captured as strings at diff time so later mutations
/// cannot retroactively alter the recorded values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditFieldChange {
    pub field_name: String,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
}

impl AuditFieldChange {
    pub fn new(
        field_name: impl Into<String>,
        old_value: Option<String>,
        new_value: Option<String>,
    ) -> Self {
        Self {
            field_name: field_name.into(),
            old_value,
            new_value,
        }
    }
}

/// Transient audit payload between capture and the consumer.
///
/// Only built for non-empty change sets; never persisted directly. The durable
/// record gets fresh ids at persist time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditWorkItem {
    pub plate_id: Uuid,
    pub user_id: Uuid,
    pub timestamp_utc: DateTime<Utc>,
    pub status: AuditAction,
    pub changes: Vec<AuditFieldChange>,
}
