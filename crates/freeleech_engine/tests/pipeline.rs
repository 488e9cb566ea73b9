use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use chrono::Utc;
use freeleech_core::Stats;
use freeleech_engine::{
    AtomicFileWriter, FailureKind, FetchError, FetchMetadata, FetchOutput, Fetcher, Pipeline,
    PipelineError, RelayError, RelaySink,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

#[derive(Default)]
struct MapFetcher {
    bodies: HashMap<String, Vec<u8>>,
}

impl MapFetcher {
    fn with(mut self, url: &str, body: &[u8]) -> Self {
        self.bodies.insert(url.to_string(), body.to_vec());
        self
    }
}

#[async_trait::async_trait]
impl Fetcher for MapFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchOutput, FetchError> {
        let bytes = self
            .bodies
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::new(FailureKind::HttpStatus(404), "404 Not Found"))?;
        Ok(FetchOutput {
            metadata: FetchMetadata {
                original_url: url.to_string(),
                final_url: url.to_string(),
                redirect_count: 0,
                content_type: None,
                byte_len: bytes.len() as u64,
            },
            bytes,
        })
    }
}

struct RecordingRelay {
    fail: bool,
    seen: Mutex<Vec<PathBuf>>,
}

impl RecordingRelay {
    fn new(fail: bool) -> Arc<Self> {
        Arc::new(Self {
            fail,
            seen: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait::async_trait]
impl RelaySink for RecordingRelay {
    async fn relay(&self, path: &Path) -> Result<(), RelayError> {
        self.seen.lock().unwrap().push(path.to_path_buf());
        if self.fail {
            return Err(RelayError::Task("remote refused".into()));
        }
        Ok(())
    }
}

fn pipeline(
    dir: &Path,
    fetcher: MapFetcher,
    relay: Option<Arc<dyn RelaySink>>,
    stats: Arc<Stats>,
) -> Pipeline {
    Pipeline::new(
        Arc::new(fetcher),
        AtomicFileWriter::new(dir.to_path_buf()),
        relay,
        stats,
    )
    .with_relay_settle(Duration::ZERO)
}

#[tokio::test]
async fn saves_payload_under_sanitized_name() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let stats = Arc::new(Stats::new(Utc::now()));
    let fetcher = MapFetcher::default().with("https://t/1", b"payload");
    let pipeline = pipeline(temp.path(), fetcher, None, stats.clone());

    let path = pipeline
        .download_and_relay("https://t/1", "Movie: Part 1/2 <HD>")
        .await
        .unwrap();
    assert_eq!(path, temp.path().join("Movie_ Part 1_2 _HD_.torrent"));
    assert_eq!(fs::read(&path).unwrap(), b"payload");

    let snapshot = stats.snapshot();
    assert_eq!(snapshot.items_downloaded, 1);
    assert_eq!(snapshot.error_count, 0);
}

#[tokio::test]
async fn download_failure_is_counted_and_nothing_is_written() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let stats = Arc::new(Stats::new(Utc::now()));
    let relay = RecordingRelay::new(false);
    let pipeline = pipeline(
        temp.path(),
        MapFetcher::default(),
        Some(relay.clone()),
        stats.clone(),
    );

    let err = pipeline
        .download_and_relay("https://t/missing", "Missing")
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::Fetch(_)));
    assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 0);
    assert!(relay.seen.lock().unwrap().is_empty());

    let snapshot = stats.snapshot();
    assert_eq!(snapshot.items_downloaded, 0);
    assert_eq!(snapshot.error_count, 1);
}

#[tokio::test]
async fn saved_file_is_handed_to_the_relay() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let stats = Arc::new(Stats::new(Utc::now()));
    let relay = RecordingRelay::new(false);
    let fetcher = MapFetcher::default().with("https://t/2", b"bytes");
    let pipeline = pipeline(temp.path(), fetcher, Some(relay.clone()), stats.clone());

    let path = pipeline
        .download_and_relay("https://t/2", "Album.torrent")
        .await
        .unwrap();
    assert_eq!(path, temp.path().join("Album.torrent"));
    assert_eq!(*relay.seen.lock().unwrap(), vec![path]);
    assert_eq!(stats.snapshot().error_count, 0);
}

#[tokio::test]
async fn relay_failure_keeps_local_copy() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let stats = Arc::new(Stats::new(Utc::now()));
    let relay = RecordingRelay::new(true);
    let fetcher = MapFetcher::default().with("https://t/3", b"bytes");
    let pipeline = pipeline(temp.path(), fetcher, Some(relay.clone()), stats.clone());

    let path = pipeline
        .download_and_relay("https://t/3", "Show S01")
        .await
        .unwrap();
    assert!(path.is_file());

    let snapshot = stats.snapshot();
    assert_eq!(snapshot.items_downloaded, 1);
    assert_eq!(snapshot.error_count, 1);
}
