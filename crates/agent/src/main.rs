use agent::dispatch::{Chat, Dispatcher, Emailer};
use agent::markers::S3MarkerStore;
use agent::pipeline::Pipeline;
use agent::provider::Ec2EventSource;
use agent::retry::{self, RetryPolicy};
use anyhow::Context;
use clap::Parser;

/// Agent is a run-once batch job which polls AWS for scheduled EC2
/// maintenance and retirement events and notifies each instance's owning
/// team by email and Teams webhook, deduplicating through S3 markers.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// S3 bucket holding notification markers.
    #[clap(
        long,
        env = "MARKER_BUCKET",
        default_value = "infor-sthybrid-infrashared-us-east-1"
    )]
    bucket: String,
    /// Key prefix under which markers are written.
    #[clap(long, env = "MARKER_PREFIX", default_value = "ssm/aws-scheduled-events")]
    marker_prefix: String,
    /// Teams incoming-webhook URL. Chat cards are skipped when unset.
    #[clap(long, env = "TEAMS_WEBHOOK_URL")]
    webhook_url: Option<url::Url>,
    /// From-address for event emails.
    #[clap(
        long,
        env = "EMAIL_SENDER",
        default_value = "noreply-cloudnotification@infor.com"
    )]
    sender: String,
    /// Which built-in routing table to use.
    #[clap(long, env = "ROUTING_VARIANT", value_enum, default_value = "product")]
    variant: Variant,
    /// Path to a JSON routing table, overriding --variant.
    #[clap(long, env = "ROUTING_TABLE")]
    routing_table: Option<std::path::PathBuf>,
    /// Regions to exclude from polling.
    #[clap(
        long,
        env = "REGION_DENYLIST",
        value_delimiter = ',',
        default_value = "ap-east-1"
    )]
    region_denylist: Vec<String>,
    /// Attempts before the run gives up.
    #[clap(long, env = "MAX_ATTEMPTS", default_value_t = 5)]
    max_attempts: u32,
    /// Base of the exponential backoff between attempts, in seconds.
    #[clap(long, env = "BACKOFF_BASE", default_value_t = 3)]
    backoff_base: u32,
    /// Timezone label appended to email deadlines.
    #[clap(long, env = "UTC_OFFSET_LABEL", default_value = "UTC+8")]
    utc_offset_label: String,
    /// Account name shown in the chat card, e.g. STCS or STCOGC.
    #[clap(long, env = "ACCOUNT_LABEL", default_value = "STCS")]
    account_label: String,
    /// Route, mark, and post chat cards, but skip SES entirely.
    #[clap(long)]
    skip_email: bool,
}

#[derive(clap::ValueEnum, Debug, Clone, Copy)]
enum Variant {
    /// CostCenter-tag routing (STCOGC).
    CostCenter,
    /// Product/Service/Owner-tag routing (STCS).
    Product,
}

fn main() -> std::process::ExitCode {
    // Use reasonable defaults for printing structured logs to stderr.
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting tracing default failed");

    let args = Args::parse();
    tracing::info!(
        bucket = %args.bucket,
        variant = ?args.variant,
        account = %args.account_label,
        "started!"
    );

    match run(args) {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!(error = format!("{error:#}"), "run failed");
            std::process::ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("building tokio runtime")?;
    runtime.block_on(async_main(args))
}

async fn async_main(args: Args) -> anyhow::Result<()> {
    let table = match &args.routing_table {
        Some(path) => {
            let raw = std::fs::read(path)
                .with_context(|| format!("reading routing table {}", path.display()))?;
            serde_json::from_slice(&raw).context("parsing routing table")?
        }
        None => match args.variant {
            Variant::CostCenter => routing::variants::cost_center_table(),
            Variant::Product => routing::variants::product_table(),
        },
    };

    let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;

    let source = Ec2EventSource::new(config.clone());
    let markers = S3MarkerStore::new(&config, args.bucket, args.marker_prefix);
    let emailer = if args.skip_email {
        Emailer::Disabled
    } else {
        Emailer::ses(&config, args.sender)
    };
    let chat = match args.webhook_url {
        Some(url) => Chat::webhook(url),
        None => Chat::Disabled,
    };
    let renderer = notifications::Renderer::try_new(args.utc_offset_label)?;
    let dispatcher = Dispatcher::new(renderer, emailer, chat, args.account_label);

    let pipeline = Pipeline::new(source, markers, dispatcher, table, args.region_denylist);
    let policy = RetryPolicy {
        max_attempts: args.max_attempts,
        backoff_base: args.backoff_base,
    };

    let summary = retry::run_with_retries(policy, || pipeline.run_once()).await?;
    tracing::info!(?summary, "scheduled-event sweep finished");
    Ok(())
}
