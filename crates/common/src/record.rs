use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::error::{Error, Result};

/// The whole persisted registry document: VM id -> record
pub type VmRegistry = BTreeMap<String, VmRecord>;

/// Metadata tracked for one provisioned VM
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VmRecord {
    /// When the VM was provisioned
    pub created_at: DateTime<Utc>,

    /// Public IPv4 address reported by the provisioner
    pub public_ip: String,

    /// When the VM is scheduled to be torn down, if ever
    #[serde(rename = "auto_delete", default)]
    pub scheduled_deletion_at: Option<DateTime<Utc>>,
}

impl VmRecord {
    /// Create a record with no scheduled deletion
    pub fn new(public_ip: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            created_at,
            public_ip: public_ip.into(),
            scheduled_deletion_at: None,
        }
    }

    /// Set the deletion time `minutes` after creation.
    /// Zero or negative values leave the record without a deletion time.
    pub fn with_auto_delete(mut self, minutes: i64) -> Result<Self> {
        self.scheduled_deletion_at = auto_delete_at(self.created_at, minutes)?;
        Ok(self)
    }
}

/// Deletion time `minutes` after `from`, or `None` when `minutes` is not positive.
///
/// Fails with `InvalidAutoDelete` when the time is not representable.
pub fn auto_delete_at(from: DateTime<Utc>, minutes: i64) -> Result<Option<DateTime<Utc>>> {
    if minutes <= 0 {
        return Ok(None);
    }

    Duration::try_minutes(minutes)
        .and_then(|delay| from.checked_add_signed(delay))
        .map(Some)
        .ok_or(Error::InvalidAutoDelete(minutes))
}

/// Generate a fresh VM identifier, e.g. `vm-1a2b3c4d`
pub fn generate_vm_id() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("vm-{}", &hex[..8])
}
