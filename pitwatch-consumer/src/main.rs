//! pitwatch - consume one channel's temperature queue and alert on trends

use anyhow::{ensure, Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use pitwatch_consumer::{ChannelConfig, DecodePolicy, MqttSource, TrendConsumer};
use pitwatch_core::{ChannelId, TrendDirection, TrendMonitor, MAX_WINDOW};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Preset {
    /// Smoker temperature: 15 degree drop over 5 readings
    Smoker,
    /// Food A temperature: under 1 degree of change over 20 readings
    FoodA,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum DirectionArg {
    Decrease,
    Plateau,
}

impl From<DirectionArg> for TrendDirection {
    fn from(arg: DirectionArg) -> Self {
        match arg {
            DirectionArg::Decrease => TrendDirection::Decrease,
            DirectionArg::Plateau => TrendDirection::Plateau,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "pitwatch")]
#[command(about = "Consume a channel's temperature queue and alert on trend changes")]
#[command(version)]
struct Args {
    /// Broker hostname or IP
    #[arg(long, default_value = "localhost")]
    host: String,

    /// Broker port
    #[arg(long, default_value_t = 1883)]
    port: u16,

    /// Channel preset supplying queue name, window and policy defaults
    #[arg(long, value_enum, default_value_t = Preset::Smoker)]
    channel: Preset,

    /// Override the queue name
    #[arg(long)]
    queue: Option<String>,

    /// Override the window capacity in readings
    #[arg(long)]
    window: Option<usize>,

    /// Override the alert threshold in degrees
    #[arg(long)]
    threshold: Option<f32>,

    /// Override the trend direction to alert on
    #[arg(long, value_enum)]
    direction: Option<DirectionArg>,

    /// What to do with undecodable messages
    #[arg(long, value_enum, default_value_t = DecodePolicy::Skip)]
    on_decode_error: DecodePolicy,

    /// Discard any stale backlog from a prior run before consuming
    #[arg(long)]
    fresh_start: bool,
}

impl Args {
    fn into_config(self) -> ChannelConfig {
        let mut config = match self.channel {
            Preset::Smoker => ChannelConfig::smoker(self.host, self.port),
            Preset::FoodA => ChannelConfig::food_a(self.host, self.port),
        };

        if let Some(queue) = self.queue {
            config.queue = queue;
        }
        if let Some(window) = self.window {
            config.window_capacity = window;
        }
        if let Some(threshold) = self.threshold {
            config.threshold = threshold;
        }
        if let Some(direction) = self.direction {
            config.direction = direction.into();
        }
        config.decode_policy = self.on_decode_error;
        config.purge_backlog = self.fresh_start;

        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Args::parse().into_config();

    ensure!(
        (2..=MAX_WINDOW).contains(&config.window_capacity),
        "window capacity must be between 2 and {MAX_WINDOW} readings, got {}",
        config.window_capacity
    );
    let channel = ChannelId::new(&config.queue)
        .with_context(|| format!("queue name {:?} is too long for a channel id", config.queue))?;

    let monitor = TrendMonitor::new(channel, config.policy());

    info!(
        host = %config.host,
        port = config.port,
        queue = %config.queue,
        window = config.window_capacity,
        threshold = config.threshold,
        direction = %config.direction,
        "connecting to broker"
    );

    let mut source = match MqttSource::connect(&config).await {
        Ok(source) => source,
        Err(e) => {
            error!(host = %config.host, port = config.port, error = %e, "broker unreachable");
            return Err(anyhow::Error::new(e).context(format!(
                "connection to broker at {}:{} failed; verify the server is running",
                config.host, config.port
            )));
        }
    };
    source.subscribe().await.context("channel setup failed")?;

    info!("ready to read temperatures; press ctrl-c to exit");

    let mut consumer = TrendConsumer::new(source, monitor, config.decode_policy);

    let result = tokio::select! {
        result = consumer.run() => {
            result.map_err(anyhow::Error::from)
        }
        _ = tokio::signal::ctrl_c() => {
            info!("interrupt received, stopping consumer");
            Ok(())
        }
    };

    // the connection is released exactly once, whichever way the loop exits
    consumer.shutdown().await;
    info!("connection closed, goodbye");

    result
}
