//! Coordination loop: live channel, feed polling, and periodic stats.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use engine_logging::targets::{MONITOR, STATS};
use engine_logging::{engine_info, engine_warn};
use freeleech_core::{AnnounceEvent, CategoryFilter, FreeleechOracle, SizeBounds, Stats};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::irc::{Connector, IrcSettings, LiveChannelClient, TcpConnector};
use crate::{
    ensure_output_dir, Acceptor, AtomicFileWriter, FeedPoller, FeedSource, FetchSettings, Fetcher,
    FtpRelay, HttpFeedSource, PersistError, Pipeline, RelaySettings, RelaySink, ReqwestFetcher,
    SizeFilter, DEFAULT_RELAY_SETTLE,
};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);
pub const DEFAULT_STATS_INTERVAL: Duration = Duration::from_secs(300);

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("output directory unusable: {0}")]
    Output(#[from] PersistError),
}

/// Fully resolved settings for one monitor run.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub feed_url: Url,
    pub categories: Vec<String>,
    pub output_dir: PathBuf,
    pub size_bounds: SizeBounds,
    pub irc: IrcSettings,
    /// `None` disables the relay.
    pub relay: Option<RelaySettings>,
    pub fetch: FetchSettings,
    pub poll_interval: Duration,
    pub stats_interval: Duration,
    pub relay_settle: Duration,
}

impl MonitorConfig {
    pub fn new(feed_url: Url, irc: IrcSettings) -> Self {
        Self {
            feed_url,
            categories: Vec::new(),
            output_dir: PathBuf::from("./torrents"),
            size_bounds: SizeBounds::default(),
            irc,
            relay: None,
            fetch: FetchSettings::default(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            stats_interval: DEFAULT_STATS_INTERVAL,
            relay_settle: DEFAULT_RELAY_SETTLE,
        }
    }
}

/// External collaborators the monitor talks through.
pub struct MonitorIo {
    pub connector: Arc<dyn Connector>,
    pub fetcher: Arc<dyn Fetcher>,
    pub feed: Arc<dyn FeedSource>,
    pub relay: Option<Arc<dyn RelaySink>>,
}

impl MonitorIo {
    /// Network-backed collaborators built from `config`.
    pub fn from_config(config: &MonitorConfig) -> Self {
        let fetcher: Arc<dyn Fetcher> = Arc::new(ReqwestFetcher::new(config.fetch.clone()));
        let connector: Arc<dyn Connector> = Arc::new(TcpConnector::new(
            config.irc.server.clone(),
            config.irc.port,
            config.irc.use_tls,
            config.irc.connect_timeout,
        ));
        let feed: Arc<dyn FeedSource> = Arc::new(HttpFeedSource::new(
            config.feed_url.as_str(),
            fetcher.clone(),
        ));
        let relay = config
            .relay
            .clone()
            .map(|settings| Arc::new(FtpRelay::new(settings)) as Arc<dyn RelaySink>);
        Self {
            connector,
            fetcher,
            feed,
            relay,
        }
    }
}

pub struct Monitor {
    config: MonitorConfig,
    io: MonitorIo,
    stats: Arc<Stats>,
}

impl Monitor {
    pub fn new(config: MonitorConfig) -> Self {
        let io = MonitorIo::from_config(&config);
        Self::with_io(config, io)
    }

    pub fn with_io(config: MonitorConfig, io: MonitorIo) -> Self {
        Self {
            config,
            io,
            stats: Arc::new(Stats::new(Utc::now())),
        }
    }

    pub fn stats(&self) -> Arc<Stats> {
        self.stats.clone()
    }

    /// Run until `shutdown` is cancelled, then stop the channel client, leave,
    /// and emit a final stats report.
    pub async fn run(self, shutdown: CancellationToken) -> Result<(), MonitorError> {
        let Monitor { config, io, stats } = self;
        ensure_output_dir(&config.output_dir)?;
        log_banner(&config);

        let categories = CategoryFilter::new(&config.categories);
        let pipeline = Pipeline::new(
            io.fetcher.clone(),
            AtomicFileWriter::new(config.output_dir.clone()),
            io.relay.clone(),
            stats.clone(),
        )
        .with_relay_settle(config.relay_settle);
        let size_filter = SizeFilter::new(io.fetcher.clone(), config.size_bounds);
        let acceptor = Arc::new(Acceptor::new(
            config.feed_url.clone(),
            categories,
            size_filter,
            pipeline,
            stats.clone(),
        ));

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let mut client = LiveChannelClient::new(config.irc.clone(), io.connector.clone(), events_tx);
        if let Err(err) = client.connect().await {
            engine_warn!(
                target: MONITOR,
                "Warning: IRC connection failed ({}). Only RSS monitoring will work until it reconnects.",
                err
            );
        }
        // Started even after a failed connect so the bounded reconnection still runs.
        client.start_monitor();

        let dispatch_cancel = CancellationToken::new();
        let dispatcher = tokio::spawn(dispatch_announcements(
            events_rx,
            acceptor.clone(),
            dispatch_cancel.clone(),
        ));

        let oracle: Arc<dyn FreeleechOracle> = client.confirmations();
        let poller = FeedPoller::new(io.feed.clone(), oracle, acceptor.clone(), stats.clone());

        engine_info!(target: MONITOR, "✓ Monitor is running. Press Ctrl+C to stop.");

        let mut poll_tick = tokio::time::interval(config.poll_interval);
        poll_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut stats_tick =
            tokio::time::interval_at(Instant::now() + config.stats_interval, config.stats_interval);
        stats_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = poll_tick.tick() => {
                    tokio::select! {
                        _ = shutdown.cancelled() => break,
                        _ = poller.poll_once() => {}
                    }
                }
                _ = stats_tick.tick() => report_stats(&stats, &acceptor, &config),
            }
        }

        engine_info!(target: MONITOR, "Shutting down...");
        client.stop_monitor().await;
        client.disconnect().await;
        dispatch_cancel.cancel();
        if let Err(err) = dispatcher.await {
            engine_warn!(target: MONITOR, "Announcement dispatcher ended abnormally: {}", err);
        }
        report_stats(&stats, &acceptor, &config);
        engine_info!(target: MONITOR, "Stopped.");
        Ok(())
    }
}

async fn dispatch_announcements(
    mut events: mpsc::UnboundedReceiver<AnnounceEvent>,
    acceptor: Arc<Acceptor>,
    cancel: CancellationToken,
) {
    loop {
        let event = tokio::select! {
            _ = cancel.cancelled() => return,
            event = events.recv() => event,
        };
        let Some(event) = event else {
            return;
        };
        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = acceptor.accept_announce(&event) => {}
        }
    }
}

fn log_banner(config: &MonitorConfig) {
    engine_info!(target: MONITOR, "Starting continuous monitor...");
    engine_info!(target: MONITOR, "Download directory: {}", config.output_dir.display());
    if !config.categories.is_empty() {
        engine_info!(target: MONITOR, "Filtering categories: {}", config.categories.join(", "));
    }
    if let Some(min_gb) = config.size_bounds.min_gb {
        engine_info!(target: MONITOR, "Minimum size: {} GB", min_gb);
    }
    if let Some(max_gb) = config.size_bounds.max_gb {
        engine_info!(target: MONITOR, "Maximum size: {} GB", max_gb);
    }
    engine_info!(
        target: MONITOR,
        "RSS check interval: {} seconds",
        config.poll_interval.as_secs()
    );
    match config.relay.as_ref() {
        Some(relay) => engine_info!(target: MONITOR, "FTP upload enabled: {}", relay.describe()),
        None => engine_info!(target: MONITOR, "FTP upload disabled"),
    }
}

fn report_stats(stats: &Stats, acceptor: &Acceptor, config: &MonitorConfig) {
    let snapshot = stats.snapshot();
    let rule = "=".repeat(70);
    engine_info!(target: STATS, "{}", rule);
    engine_info!(target: STATS, "STATISTICS (Runtime: {})", snapshot.runtime_label(Utc::now()));
    engine_info!(target: STATS, "{}", rule);
    engine_info!(target: STATS, "RSS Checks:           {}", snapshot.poll_count);
    engine_info!(target: STATS, "Torrents Found:       {}", snapshot.items_found);
    engine_info!(target: STATS, "Torrents Downloaded:  {}", snapshot.items_downloaded);
    engine_info!(target: STATS, "Skipped (size):       {}", snapshot.items_skipped);
    engine_info!(target: STATS, "Errors:               {}", snapshot.error_count);
    engine_info!(target: STATS, "Processed IDs:        {}", acceptor.processed().len());
    engine_info!(target: STATS, "Download Directory:   {}", config.output_dir.display());
    if !config.categories.is_empty() {
        engine_info!(target: STATS, "Categories Filter:    {}", config.categories.join(", "));
    }
    engine_info!(target: STATS, "{}", rule);
}
