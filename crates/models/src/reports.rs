use chrono::{DateTime, Utc};

use crate::events::{InstanceId, ScheduledEvent};
use crate::instances::InstanceRecord;

/// The distribution list or mailbox responsible for an instance's owning team.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(transparent)]
pub struct Recipient(String);

impl Recipient {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for Recipient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Deduplication identity of "this exact event instance has been notified".
/// Once a marker object exists under this key it is never overwritten.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct MarkerKey(String);

impl MarkerKey {
    pub fn new(instance_id: &InstanceId, description: &str) -> Self {
        Self(format!("{instance_id}_{description}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MarkerKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Transient aggregate of one scheduled event and the relevant ownership
/// metadata of its instance. Built fresh per event and discarded after
/// dispatch; its only durable trace is the marker payload.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Report {
    #[serde(rename = "Region")]
    pub region: String,
    #[serde(rename = "AWSAccount")]
    pub aws_account: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "InstanceID")]
    pub instance_id: InstanceId,
    #[serde(rename = "Deadline")]
    pub deadline: Option<DateTime<Utc>>,
    #[serde(rename = "Name", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "CustomerPrefix", default, skip_serializing_if = "Option::is_none")]
    pub customer_prefix: Option<String>,
    #[serde(rename = "CostCenter", default, skip_serializing_if = "Option::is_none")]
    pub cost_center: Option<String>,
    #[serde(rename = "Service", default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    #[serde(rename = "Product", default, skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
    #[serde(rename = "Owner", default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(rename = "Recipient")]
    pub recipient: Recipient,
}

impl Report {
    /// Combines a scheduled event, its instance snapshot, and the routed
    /// recipient. Tag extraction is an explicit lookup per field.
    pub fn assemble(
        event: &ScheduledEvent,
        record: &InstanceRecord,
        recipient: Recipient,
    ) -> Report {
        Report {
            region: record.availability_zone.clone(),
            aws_account: record.owner_account_id.clone(),
            description: event.description.clone(),
            instance_id: event.instance_id.clone(),
            deadline: event.not_before,
            name: record.tags.name().map(str::to_string),
            customer_prefix: record.tags.customer_prefix().map(str::to_string),
            cost_center: record.tags.cost_center().map(str::to_string),
            service: record.tags.service().map(str::to_string),
            product: record.tags.product().map(str::to_string),
            owner: record.tags.owner().map(str::to_string),
            recipient,
        }
    }

    pub fn marker_key(&self) -> MarkerKey {
        MarkerKey::new(&self.instance_id, &self.description)
    }
}
