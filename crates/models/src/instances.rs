use std::collections::BTreeMap;

use crate::events::InstanceId;

/// Instance tags as a unique-key map. Insertion order is irrelevant;
/// lookups for the well-known ownership tags go through typed accessors.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct TagSet(BTreeMap<String, String>);

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn name(&self) -> Option<&str> {
        self.get("Name")
    }

    pub fn customer_prefix(&self) -> Option<&str> {
        self.get("customerPrefix")
    }

    pub fn cost_center(&self) -> Option<&str> {
        self.get("CostCenter")
    }

    pub fn service(&self) -> Option<&str> {
        self.get("Service")
    }

    pub fn product(&self) -> Option<&str> {
        self.get("Product")
    }

    pub fn owner(&self) -> Option<&str> {
        self.get("Owner")
    }
}

impl FromIterator<(String, String)> for TagSet {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Read-only snapshot of an instance's placement and ownership metadata,
/// fetched once per event.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct InstanceRecord {
    pub instance_id: InstanceId,
    pub availability_zone: String,
    pub owner_account_id: String,
    pub tags: TagSet,
}
