//! Deterministic rendering of the outbound notification surfaces: the HTML
//! event email and the Teams MessageCard. All formatting lives here so both
//! can be snapshot-tested; delivery is the agent's concern.

use anyhow::Context;
use chrono::{DateTime, Utc};
use models::{Recipient, Report};

mod card;
pub use card::{scheduled_event_card, CardFact, CardSection, MessageCard};

pub const EMAIL_SUBJECT: &str = "AWS Scheduled Event Notification";

const EMAIL_BODY_TEMPLATE: &str = r#"<br>Hi Team,
<br><br>We have received an AWS scheduled event alert for the below customer. Kindly complete the required action based on the event description prior the indicated deadline to avoid unexpected outage.<br><br>
<table border="1">
<tr><th>AWS Account</th><th>Region</th><th>Name</th><th>Instance ID</th><th>Description</th><th>Deadline</th></tr>
<tr><td>{{aws_account}}</td><td>{{region}}</td><td>{{name}}</td><td>{{instance_id}}</td><td>{{description}}</td><td>{{deadline}}</td></tr>
</table>
<br><br>For degraded hardware event, kindly perform an AWS instance stop/start via AWS console or use CSP Admin function SGW - Instance Stop/Start.
<br><br><b> -- Please do not reply to this email -- </b>"#;

/// A rendered, ready-to-send email.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationEmail {
    pub recipient: Recipient,
    pub subject: String,
    pub html: String,
}

#[derive(serde::Serialize)]
struct EmailData<'r> {
    aws_account: &'r str,
    region: &'r str,
    name: &'r str,
    instance_id: &'r str,
    description: &'r str,
    deadline: String,
}

pub struct Renderer {
    registry: handlebars::Handlebars<'static>,
    utc_offset_label: String,
}

impl Renderer {
    /// The offset label is appended to the email's deadline cell so readers
    /// in the operating timezone don't have to convert, e.g. `UTC+8`.
    pub fn try_new(utc_offset_label: impl Into<String>) -> anyhow::Result<Renderer> {
        let mut registry = handlebars::Handlebars::new();
        registry
            .register_template_string("scheduled-event-email", EMAIL_BODY_TEMPLATE)
            .context("registering scheduled-event-email template")?;

        Ok(Renderer {
            registry,
            utc_offset_label: utc_offset_label.into(),
        })
    }

    pub fn render_email(&self, report: &Report) -> anyhow::Result<NotificationEmail> {
        let deadline = match report.deadline.as_ref() {
            Some(_) => format!(
                "{} {}",
                format_deadline(report.deadline.as_ref()),
                self.utc_offset_label
            ),
            None => format_deadline(None),
        };
        let data = EmailData {
            aws_account: &report.aws_account,
            region: &report.region,
            name: report.name.as_deref().unwrap_or_default(),
            instance_id: report.instance_id.as_str(),
            description: &report.description,
            deadline,
        };
        let html = self
            .registry
            .render("scheduled-event-email", &data)
            .context("rendering scheduled-event-email template")?;

        Ok(NotificationEmail {
            recipient: report.recipient.clone(),
            subject: EMAIL_SUBJECT.to_string(),
            html,
        })
    }
}

/// Formats a deadline the way the provider's SDK historically displayed it,
/// `2019-07-10 12:00:00+00:00`. Events occasionally arrive with no
/// NotBefore at all.
pub fn format_deadline(deadline: Option<&DateTime<Utc>>) -> String {
    match deadline {
        Some(deadline) => deadline.format("%Y-%m-%d %H:%M:%S%:z").to_string(),
        None => "unknown".to_string(),
    }
}
