//! Download of an accepted payload, atomic save, and optional relay.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use engine_logging::targets::{DOWNLOAD, FTP};
use engine_logging::{engine_error, engine_info, engine_warn};
use freeleech_core::{torrent_filename, Stats};
use thiserror::Error;

use crate::{AtomicFileWriter, FetchError, Fetcher, PersistError, RelaySink};

/// Pause between saving a file and handing it to the relay.
pub const DEFAULT_RELAY_SETTLE: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("download failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("could not save payload: {0}")]
    Persist(#[from] PersistError),
}

pub struct Pipeline {
    fetcher: Arc<dyn Fetcher>,
    writer: AtomicFileWriter,
    relay: Option<Arc<dyn RelaySink>>,
    relay_settle: Duration,
    stats: Arc<Stats>,
}

impl Pipeline {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        writer: AtomicFileWriter,
        relay: Option<Arc<dyn RelaySink>>,
        stats: Arc<Stats>,
    ) -> Self {
        Self {
            fetcher,
            writer,
            relay,
            relay_settle: DEFAULT_RELAY_SETTLE,
            stats,
        }
    }

    pub fn with_relay_settle(mut self, settle: Duration) -> Self {
        self.relay_settle = settle;
        self
    }

    pub fn output_dir(&self) -> &std::path::Path {
        self.writer.dir()
    }

    /// Download `url`, save it under a name derived from `title`, then relay it.
    ///
    /// Failures are logged and counted here. A relay failure is counted but the
    /// saved file still counts as downloaded.
    pub async fn download_and_relay(&self, url: &str, title: &str) -> Result<PathBuf, PipelineError> {
        let path = match self.save(url, title).await {
            Ok(path) => path,
            Err(err) => {
                let short: String = title.chars().take(40).collect();
                engine_error!(target: DOWNLOAD, "Error downloading {}: {}", short, err);
                self.stats.record_error();
                return Err(err);
            }
        };

        if let Some(relay) = self.relay.as_ref() {
            engine_info!(
                target: FTP,
                "Waiting {} seconds before upload...",
                self.relay_settle.as_secs()
            );
            tokio::time::sleep(self.relay_settle).await;
            if let Err(err) = relay.relay(&path).await {
                engine_warn!(target: FTP, "Error uploading {}: {}", path.display(), err);
                self.stats.record_error();
            }
        }
        Ok(path)
    }

    async fn save(&self, url: &str, title: &str) -> Result<PathBuf, PipelineError> {
        let filename = torrent_filename(title);
        let output = self.fetcher.fetch(url).await?;
        let path = self.writer.write(&filename, &output.bytes)?;
        engine_info!(
            target: DOWNLOAD,
            "[{}] ✓ {}",
            Local::now().format("%H:%M:%S"),
            filename
        );
        self.stats.record_downloaded();
        Ok(path)
    }
}
