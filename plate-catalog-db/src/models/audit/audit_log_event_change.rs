use heapless::String as HeaplessString;
use plate_catalog_api::domain::audit::AuditFieldChange;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::models::Identifiable;

/// One field-level delta owned by an [`super::AuditLogEventModel`].
///
/// Field names are capped at 128 characters, values at 1024; both caps match
/// the table definition and are enforced here before any insert is attempted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLogEventChangeModel {
    pub id: Uuid,
    pub audit_log_event_id: Uuid,
    pub field_name: HeaplessString<128>,
    pub old_value: Option<HeaplessString<1024>>,
    pub new_value: Option<HeaplessString<1024>>,
}

impl AuditLogEventChangeModel {
    /// Map a wire-level field change to a durable row with a fresh id.
    pub fn from_field_change(
        audit_log_event_id: Uuid,
        change: &AuditFieldChange,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let field_name = HeaplessString::from_str(&change.field_name)
            .map_err(|_| format!("field name '{}' exceeds 128 chars", change.field_name))?;
        let old_value = Self::bounded_value(change.old_value.as_deref())?;
        let new_value = Self::bounded_value(change.new_value.as_deref())?;

        Ok(Self {
            id: Uuid::new_v4(),
            audit_log_event_id,
            field_name,
            old_value,
            new_value,
        })
    }

    fn bounded_value(
        value: Option<&str>,
    ) -> Result<Option<HeaplessString<1024>>, Box<dyn std::error::Error + Send + Sync>> {
        value
            .map(|v| HeaplessString::from_str(v).map_err(|_| "value exceeds 1024 chars".into()))
            .transpose()
    }
}

impl Identifiable for AuditLogEventChangeModel {
    fn get_id(&self) -> Uuid {
        self.id
    }
}
