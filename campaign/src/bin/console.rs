//! Console driver for the campaign engine.
//!
//! Reads a line script from stdin (see [`giveaway_campaign::script`]) and
//! dispatches every line as its own task against an in-memory membership
//! directory and a console gateway. Rendered screens go to stdout, logs to
//! stderr.
//!
//! ```text
//! printf 'join 1\nstart 1\npress 1 advance_welcome\n' | cargo run --bin giveaway-console
//! ```

use anyhow::Context;
use giveaway_campaign::script::{ScriptCommand, ScriptRunner};
use giveaway_campaign::{metrics, CampaignConfig};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinSet;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,giveaway_campaign=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = CampaignConfig::from_env().context("loading configuration")?;
    info!(
        target_chat = %config.target_chat,
        target_channel = %config.target_channel,
        membership_ttl_secs = config.membership_ttl.as_secs(),
        "Configuration loaded"
    );

    if let Some(addr) = config.metrics_addr {
        metrics::install_exporter(addr).context("installing metrics exporter")?;
    } else {
        metrics::register_metrics();
    }

    let runner = ScriptRunner::new(config);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut tasks = JoinSet::new();

    while let Some(line) = lines.next_line().await.context("reading stdin")? {
        let command = match ScriptCommand::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(error) => {
                warn!(line = %line, error = %error, "Skipping script line");
                continue;
            }
        };

        runner.run(command, &mut tasks);
    }

    while let Some(joined) = tasks.join_next().await {
        if let Err(error) = joined {
            warn!(error = %error, "Dispatch task failed");
        }
    }

    info!("Script finished");
    Ok(())
}
