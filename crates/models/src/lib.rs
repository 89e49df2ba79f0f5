mod events;
mod instances;
mod reports;

pub use events::{EventCode, InstanceId, ScheduledEvent};
pub use instances::{InstanceRecord, TagSet};
pub use reports::{MarkerKey, Recipient, Report};
