use anyhow::Context;
use models::{InstanceId, MarkerKey, Report, ScheduledEvent};
use routing::RoutingTable;

use crate::dispatch::{ChatPoster, Dispatcher, EmailSender};
use crate::markers::MarkerStore;
use crate::provider::EventSource;

/// One poll-dispatch traversal: regions, events per region, then
/// filter → route → dedupe → mark → dispatch per event. The traversal is
/// strictly sequential; only the check-then-mark step has a side effect,
/// and it is intentionally not atomic against concurrent runs.
pub struct Pipeline<S, M, E, C> {
    source: S,
    markers: M,
    dispatcher: Dispatcher<E, C>,
    table: RoutingTable,
    region_denylist: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub regions: usize,
    pub events: usize,
    pub terminal: usize,
    pub notified: usize,
    pub duplicates: usize,
    pub skipped: usize,
}

enum EventOutcome {
    Notified,
    AlreadyNotified,
}

#[derive(Debug, thiserror::Error)]
enum EventError {
    #[error("fetching detail for instance {instance_id}: {source:#}")]
    Provider {
        instance_id: InstanceId,
        #[source]
        source: anyhow::Error,
    },
    #[error("probing marker {key}: {source:#}")]
    MarkerProbe {
        key: MarkerKey,
        #[source]
        source: anyhow::Error,
    },
    #[error("writing marker {key}: {source:#}")]
    MarkerWrite {
        key: MarkerKey,
        #[source]
        source: anyhow::Error,
    },
}

impl EventError {
    /// Provider failures abort the whole attempt so the outer retry loop
    /// can back off; marker failures only skip the event at hand.
    fn is_retryable(&self) -> bool {
        matches!(self, EventError::Provider { .. })
    }
}

impl<S, M, E, C> Pipeline<S, M, E, C>
where
    S: EventSource,
    M: MarkerStore,
    E: EmailSender,
    C: ChatPoster,
{
    pub fn new(
        source: S,
        markers: M,
        dispatcher: Dispatcher<E, C>,
        table: RoutingTable,
        region_denylist: Vec<String>,
    ) -> Pipeline<S, M, E, C> {
        Pipeline {
            source,
            markers,
            dispatcher,
            table,
            region_denylist,
        }
    }

    #[tracing::instrument(skip_all)]
    pub async fn run_once(&self) -> anyhow::Result<RunSummary> {
        let mut summary = RunSummary::default();
        let regions = self
            .source
            .list_regions()
            .await
            .context("listing provider regions")?;

        for region in regions {
            if self
                .region_denylist
                .iter()
                .any(|denied| region.contains(denied.as_str()))
            {
                tracing::debug!(%region, "skipping denylisted region");
                continue;
            }
            summary.regions += 1;

            let events = self
                .source
                .list_scheduled_events(&region)
                .await
                .with_context(|| format!("listing scheduled events in {region}"))?;

            for event in events {
                summary.events += 1;
                if event.is_terminal() {
                    tracing::debug!(
                        instance = %event.instance_id,
                        description = %event.description,
                        "ignoring terminal event"
                    );
                    summary.terminal += 1;
                    continue;
                }

                match self.process_event(&region, &event).await {
                    Ok(EventOutcome::Notified) => summary.notified += 1,
                    Ok(EventOutcome::AlreadyNotified) => summary.duplicates += 1,
                    Err(error) if error.is_retryable() => return Err(error.into()),
                    Err(error) => {
                        tracing::warn!(
                            error = %error,
                            instance = %event.instance_id,
                            "skipping event"
                        );
                        summary.skipped += 1;
                    }
                }
            }
        }

        tracing::info!(?summary, "poll-dispatch traversal complete");
        Ok(summary)
    }

    async fn process_event(
        &self,
        region: &str,
        event: &ScheduledEvent,
    ) -> Result<EventOutcome, EventError> {
        let record = self
            .source
            .instance_detail(region, &event.instance_id)
            .await
            .map_err(|source| EventError::Provider {
                instance_id: event.instance_id.clone(),
                source,
            })?;

        let recipient = self.table.route(&record.tags).clone();
        let report = Report::assemble(event, &record, recipient);
        let key = report.marker_key();

        let already_sent = self
            .markers
            .exists(&key)
            .await
            .map_err(|source| EventError::MarkerProbe {
                key: key.clone(),
                source,
            })?;
        if already_sent {
            tracing::info!(marker = %key, recipient = %report.recipient, "event was already notified");
            return Ok(EventOutcome::AlreadyNotified);
        }

        self.markers
            .write(&key, &report)
            .await
            .map_err(|source| EventError::MarkerWrite {
                key: key.clone(),
                source,
            })?;
        tracing::info!(marker = %key, recipient = %report.recipient, "marker written, dispatching");

        self.dispatcher.dispatch(&report).await;
        Ok(EventOutcome::Notified)
    }
}
