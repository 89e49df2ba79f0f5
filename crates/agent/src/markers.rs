use anyhow::Context;
use models::{MarkerKey, Report};

/// MarkerStore records which events have already produced a notification.
/// A missing marker is the normal negative result of `exists`, not an error;
/// errors from either method fail only the event being processed.
pub trait MarkerStore: Send + Sync {
    fn exists<'s>(
        &'s self,
        key: &'s MarkerKey,
    ) -> impl std::future::Future<Output = anyhow::Result<bool>> + Send + 's;

    fn write<'s>(
        &'s self,
        key: &'s MarkerKey,
        report: &'s Report,
    ) -> impl std::future::Future<Output = anyhow::Result<()>> + Send + 's;
}

/// S3-backed marker store. Markers live under `{prefix}/{instanceId}_{description}`
/// and are never overwritten or deleted by this system.
#[derive(Debug)]
pub struct S3MarkerStore {
    client: aws_sdk_s3::Client,
    bucket: String,
    prefix: String,
}

impl S3MarkerStore {
    pub fn new(config: &aws_config::SdkConfig, bucket: String, prefix: String) -> S3MarkerStore {
        S3MarkerStore {
            client: aws_sdk_s3::Client::new(config),
            bucket,
            prefix,
        }
    }

    fn object_key(&self, key: &MarkerKey) -> String {
        format!("{}/{}", self.prefix.trim_end_matches('/'), key)
    }
}

impl MarkerStore for S3MarkerStore {
    async fn exists<'s>(&'s self, key: &'s MarkerKey) -> anyhow::Result<bool> {
        let result = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(self.object_key(key))
            .send()
            .await;

        match result {
            Ok(_) => Ok(true),
            Err(error) if error.as_service_error().is_some_and(|e| e.is_no_such_key()) => {
                Ok(false)
            }
            Err(error) => Err(anyhow::Error::from(error))
                .with_context(|| format!("probing marker {key}")),
        }
    }

    async fn write<'s>(&'s self, key: &'s MarkerKey, report: &'s Report) -> anyhow::Result<()> {
        let payload = serde_json::to_vec(report).context("serializing marker payload")?;
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(self.object_key(key))
            .body(aws_sdk_s3::primitives::ByteStream::from(payload))
            .send()
            .await
            .with_context(|| format!("writing marker {key}"))?;

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use models::InstanceId;

    #[test]
    fn object_keys_nest_under_the_prefix() {
        let config = aws_config::SdkConfig::builder()
            .behavior_version(aws_config::BehaviorVersion::latest())
            .build();
        let store = S3MarkerStore::new(
            &config,
            "infor-sthybrid-infrashared-us-east-1".to_string(),
            "ssm/aws-scheduled-events/".to_string(),
        );
        let key = MarkerKey::new(
            &InstanceId::new("i-001"),
            "The instance is scheduled for reboot",
        );
        assert_eq!(
            store.object_key(&key),
            "ssm/aws-scheduled-events/i-001_The instance is scheduled for reboot"
        );
    }
}
