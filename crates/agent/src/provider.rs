use anyhow::Context;
use aws_smithy_types_convert::date_time::DateTimeExt;
use models::{EventCode, InstanceId, InstanceRecord, ScheduledEvent, TagSet};

/// EventSource enumerates regions and surfaces pending scheduled events.
/// Provider failures (throttling included) are surfaced as-is; the pipeline
/// treats them as retryable at the run level.
pub trait EventSource: Send + Sync {
    fn list_regions<'s>(
        &'s self,
    ) -> impl std::future::Future<Output = anyhow::Result<Vec<String>>> + Send + 's;

    fn list_scheduled_events<'s>(
        &'s self,
        region: &'s str,
    ) -> impl std::future::Future<Output = anyhow::Result<Vec<ScheduledEvent>>> + Send + 's;

    fn instance_detail<'s>(
        &'s self,
        region: &'s str,
        instance_id: &'s InstanceId,
    ) -> impl std::future::Future<Output = anyhow::Result<InstanceRecord>> + Send + 's;
}

/// EC2-backed event source. A fresh regional client is built per region
/// from the shared SDK config, matching how the regions are traversed.
#[derive(Debug)]
pub struct Ec2EventSource {
    config: aws_config::SdkConfig,
}

impl Ec2EventSource {
    pub fn new(config: aws_config::SdkConfig) -> Ec2EventSource {
        Ec2EventSource { config }
    }

    fn regional_client(&self, region: &str) -> aws_sdk_ec2::Client {
        let conf = aws_sdk_ec2::config::Builder::from(&self.config)
            .region(aws_sdk_ec2::config::Region::new(region.to_string()))
            .build();
        aws_sdk_ec2::Client::from_conf(conf)
    }
}

impl EventSource for Ec2EventSource {
    async fn list_regions<'s>(&'s self) -> anyhow::Result<Vec<String>> {
        let out = aws_sdk_ec2::Client::new(&self.config)
            .describe_regions()
            .send()
            .await
            .context("describing EC2 regions")?;

        Ok(out
            .regions()
            .iter()
            .filter_map(|region| region.region_name().map(str::to_string))
            .collect())
    }

    async fn list_scheduled_events<'s>(
        &'s self,
        region: &'s str,
    ) -> anyhow::Result<Vec<ScheduledEvent>> {
        let filter = aws_sdk_ec2::types::Filter::builder()
            .name("event.code")
            .set_values(Some(
                EventCode::ALL.iter().map(|c| c.as_str().to_string()).collect(),
            ))
            .build();

        let out = self
            .regional_client(region)
            .describe_instance_status()
            .filters(filter)
            .send()
            .await
            .with_context(|| format!("describing instance status in {region}"))?;

        let mut events = Vec::new();
        for status in out.instance_statuses() {
            let Some(instance_id) = status.instance_id() else {
                continue;
            };
            for event in status.events() {
                // The server-side filter already constrains codes; parse
                // defensively anyway and drop anything unrecognized.
                let Some(code) = event.code().and_then(|c| EventCode::parse(c.as_str())) else {
                    continue;
                };
                events.push(ScheduledEvent {
                    code,
                    description: event.description().unwrap_or_default().to_string(),
                    not_before: event.not_before().and_then(|d| d.to_chrono_utc().ok()),
                    instance_id: InstanceId::new(instance_id),
                });
            }
        }
        Ok(events)
    }

    async fn instance_detail<'s>(
        &'s self,
        region: &'s str,
        instance_id: &'s InstanceId,
    ) -> anyhow::Result<InstanceRecord> {
        let out = self
            .regional_client(region)
            .describe_instances()
            .instance_ids(instance_id.as_str())
            .send()
            .await
            .with_context(|| format!("describing instance {instance_id} in {region}"))?;

        let instance = out
            .reservations()
            .first()
            .and_then(|reservation| reservation.instances().first())
            .with_context(|| format!("instance {instance_id} not found in {region}"))?;

        let availability_zone = instance
            .placement()
            .and_then(|placement| placement.availability_zone())
            .unwrap_or_default()
            .to_string();
        let owner_account_id = instance
            .network_interfaces()
            .first()
            .and_then(|interface| interface.owner_id())
            .unwrap_or_default()
            .to_string();
        let tags: TagSet = instance
            .tags()
            .iter()
            .filter_map(|tag| Some((tag.key()?.to_string(), tag.value()?.to_string())))
            .collect();

        Ok(InstanceRecord {
            instance_id: instance_id.clone(),
            availability_zone,
            owner_account_id,
            tags,
        })
    }
}
