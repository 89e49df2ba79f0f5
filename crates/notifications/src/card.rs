use models::Report;

use crate::format_deadline;

/// A Teams incoming-webhook MessageCard payload.
/// Schema: https://learn.microsoft.com/en-us/outlook/actionable-messages/message-card-reference
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct MessageCard {
    #[serde(rename = "@type")]
    pub card_type: String,
    #[serde(rename = "@context")]
    pub context: String,
    #[serde(rename = "themeColor")]
    pub theme_color: String,
    pub title: String,
    pub text: String,
    pub sections: Vec<CardSection>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct CardSection {
    #[serde(rename = "activityTitle")]
    pub activity_title: String,
    pub facts: Vec<CardFact>,
    pub markdown: bool,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct CardFact {
    pub name: String,
    pub value: String,
}

impl CardFact {
    fn new(name: &str, value: impl Into<String>) -> CardFact {
        CardFact {
            name: name.to_string(),
            value: value.into(),
        }
    }
}

/// Builds the two-section card: instance facts, then event facts.
/// `account_label` names the account variant in the card body, e.g. `STCS`.
pub fn scheduled_event_card(report: &Report, account_label: &str) -> MessageCard {
    let instance_facts = vec![
        CardFact::new("AWS Account", report.aws_account.clone()),
        CardFact::new("Region", report.region.clone()),
        CardFact::new("Instance ID", report.instance_id.as_str()),
        CardFact::new("Name", report.name.clone().unwrap_or_default()),
        CardFact::new("Alias", report.customer_prefix.clone().unwrap_or_default()),
        CardFact::new("Owner", report.recipient.as_str()),
    ];
    let event_facts = vec![
        CardFact::new("Description", report.description.clone()),
        CardFact::new("Deadline", format_deadline(report.deadline.as_ref())),
    ];

    MessageCard {
        card_type: "MessageCard".to_string(),
        context: "http://schema.org/extensions".to_string(),
        theme_color: "ff0000".to_string(),
        title: "AWS Scheduled Report".to_string(),
        text: format!("EC2 Scheduled report - {account_label}"),
        sections: vec![
            CardSection {
                activity_title: "Instance Description".to_string(),
                facts: instance_facts,
                markdown: false,
            },
            CardSection {
                activity_title: "Event Details".to_string(),
                facts: event_facts,
                markdown: false,
            },
        ],
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use models::{InstanceId, Recipient};

    #[test]
    fn card_payload_matches_the_webhook_schema() {
        let report = Report {
            region: "us-east-1a".to_string(),
            aws_account: "123456789012".to_string(),
            description: "The instance is scheduled for reboot".to_string(),
            instance_id: InstanceId::new("i-001"),
            deadline: Some("2019-07-10T12:00:00Z".parse().unwrap()),
            name: Some("prd-m3-app01".to_string()),
            customer_prefix: Some("acme".to_string()),
            cost_center: None,
            service: None,
            product: Some("m3base".to_string()),
            owner: None,
            recipient: Recipient::new("DL-TEAM-CLOUD-OPS-CMS-M3-SYSADM-MNL@infor.com"),
        };

        let card = scheduled_event_card(&report, "STCS");
        insta::assert_json_snapshot!(card, @r###"
        {
          "@type": "MessageCard",
          "@context": "http://schema.org/extensions",
          "themeColor": "ff0000",
          "title": "AWS Scheduled Report",
          "text": "EC2 Scheduled report - STCS",
          "sections": [
            {
              "activityTitle": "Instance Description",
              "facts": [
                {
                  "name": "AWS Account",
                  "value": "123456789012"
                },
                {
                  "name": "Region",
                  "value": "us-east-1a"
                },
                {
                  "name": "Instance ID",
                  "value": "i-001"
                },
                {
                  "name": "Name",
                  "value": "prd-m3-app01"
                },
                {
                  "name": "Alias",
                  "value": "acme"
                },
                {
                  "name": "Owner",
                  "value": "DL-TEAM-CLOUD-OPS-CMS-M3-SYSADM-MNL@infor.com"
                }
              ],
              "markdown": false
            },
            {
              "activityTitle": "Event Details",
              "facts": [
                {
                  "name": "Description",
                  "value": "The instance is scheduled for reboot"
                },
                {
                  "name": "Deadline",
                  "value": "2019-07-10 12:00:00+00:00"
                }
              ],
              "markdown": false
            }
          ]
        }
        "###);
    }

    #[test]
    fn absent_tags_become_empty_fact_values() {
        let report = Report {
            region: "eu-west-1b".to_string(),
            aws_account: "210987654321".to_string(),
            description: "The instance is running on degraded hardware".to_string(),
            instance_id: InstanceId::new("i-0abc"),
            deadline: None,
            name: None,
            customer_prefix: None,
            cost_center: None,
            service: None,
            product: None,
            owner: None,
            recipient: Recipient::new("sysadmins@example.com"),
        };

        let card = scheduled_event_card(&report, "STCOGC");
        let name_fact = &card.sections[0].facts[3];
        assert_eq!(name_fact.name, "Name");
        assert_eq!(name_fact.value, "");
        assert_eq!(card.sections[1].facts[1].value, "unknown");
    }
}
