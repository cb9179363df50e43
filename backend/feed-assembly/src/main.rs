use anyhow::Context;
use feed_assembly::models::FeedSnapshot;
use feed_assembly::services::signals::{
    channels_from_publishers, visits_by_host, ChannelSubscriptions,
};
use feed_assembly::{FeedBuilder, FeedConfig, SignalsBuilder, SignalsConfig};
use serde::Deserialize;
use std::io::Read;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Snapshot plus optional raw history, used to derive signals when the
/// snapshot carries none.
#[derive(Debug, Deserialize)]
struct FeedRequest {
    #[serde(flatten)]
    snapshot: FeedSnapshot,
    #[serde(default)]
    history: Vec<String>,
    #[serde(default)]
    subscribed_channels: Vec<String>,
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays valid JSON
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let config = FeedConfig::from_env().context("Failed to load feed config")?;
    let signals_config = SignalsConfig::from_env().context("Failed to load signals config")?;

    let raw = match std::env::args().nth(1) {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read snapshot {}", path))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read snapshot from stdin")?;
            buf
        }
    };

    let request: FeedRequest = serde_json::from_str(&raw).context("Invalid snapshot JSON")?;
    let mut snapshot = request.snapshot;

    if snapshot.channels.is_empty() {
        snapshot.channels = channels_from_publishers(&snapshot.publishers, &signals_config.locale);
    }

    if snapshot.signals.is_empty() {
        let mut subscriptions = ChannelSubscriptions::new();
        for channel in &request.subscribed_channels {
            subscriptions.subscribe(&signals_config.locale, channel);
        }
        let history = visits_by_host(request.history.iter().map(|s| s.as_str()));
        snapshot.signals = SignalsBuilder::new(signals_config).build(
            &snapshot.publishers,
            &snapshot.articles,
            &history,
            &subscriptions,
        );
        info!(signals = snapshot.signals.len(), "Derived signals from history");
    }

    info!(
        articles = snapshot.articles.len(),
        channels = snapshot.channels.len(),
        suggested = snapshot.suggested.len(),
        "Building feed"
    );

    let mut builder = FeedBuilder::new(config)?;
    let run = builder.build(snapshot);

    println!("{}", serde_json::to_string_pretty(&run)?);

    Ok(())
}
