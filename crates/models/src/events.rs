use chrono::{DateTime, Utc};

use crate::reports::MarkerKey;

/// EC2 event codes which the notifier cares about. Anything else the
/// provider may report (none today) is ignored at the adapter boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventCode {
    InstanceStop,
    InstanceReboot,
    SystemReboot,
    SystemMaintenance,
    InstanceRetirement,
}

impl EventCode {
    pub const ALL: [EventCode; 5] = [
        EventCode::InstanceStop,
        EventCode::InstanceReboot,
        EventCode::SystemReboot,
        EventCode::SystemMaintenance,
        EventCode::InstanceRetirement,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventCode::InstanceStop => "instance-stop",
            EventCode::InstanceReboot => "instance-reboot",
            EventCode::SystemReboot => "system-reboot",
            EventCode::SystemMaintenance => "system-maintenance",
            EventCode::InstanceRetirement => "instance-retirement",
        }
    }

    /// Maps a provider wire name to an EventCode, or None for codes
    /// outside the notifier's filter set.
    pub fn parse(code: &str) -> Option<EventCode> {
        Self::ALL.iter().copied().find(|c| c.as_str() == code)
    }
}

impl std::fmt::Display for EventCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An EC2 instance identifier, e.g. `i-0123456789abcdef0`.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(transparent)]
pub struct InstanceId(String);

impl InstanceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for InstanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A provider-issued maintenance or retirement notice bound to an instance.
/// Immutable once read from the provider.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ScheduledEvent {
    pub code: EventCode,
    pub description: String,
    pub not_before: Option<DateTime<Utc>>,
    pub instance_id: InstanceId,
}

impl ScheduledEvent {
    /// Terminal events were already acted on by AWS and must never
    /// reach routing or dispatch.
    pub fn is_terminal(&self) -> bool {
        self.description.contains("Completed") || self.description.contains("Canceled")
    }

    pub fn marker_key(&self) -> MarkerKey {
        MarkerKey::new(&self.instance_id, &self.description)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn event_code_round_trips_wire_names() {
        for code in EventCode::ALL {
            assert_eq!(EventCode::parse(code.as_str()), Some(code));
        }
        assert_eq!(EventCode::parse("instance-launch"), None);
    }

    #[test]
    fn terminal_descriptions_are_detected() {
        let mut event = ScheduledEvent {
            code: EventCode::SystemReboot,
            description: "The instance is scheduled for reboot".to_string(),
            not_before: None,
            instance_id: InstanceId::new("i-001"),
        };
        assert!(!event.is_terminal());

        event.description = "[Completed] The instance was rebooted".to_string();
        assert!(event.is_terminal());

        event.description = "[Canceled] maintenance no longer required".to_string();
        assert!(event.is_terminal());
    }

    #[test]
    fn marker_key_joins_instance_and_description() {
        let event = ScheduledEvent {
            code: EventCode::InstanceRetirement,
            description: "The instance is running on degraded hardware".to_string(),
            not_before: None,
            instance_id: InstanceId::new("i-0abc"),
        };
        assert_eq!(
            event.marker_key().as_str(),
            "i-0abc_The instance is running on degraded hardware"
        );
    }
}
