//! Freeleech engine: network and filesystem side of the monitor.
mod acceptor;
mod feed;
mod fetch;
pub mod irc;
mod metainfo;
mod monitor;
mod persist;
mod pipeline;
mod poller;
mod relay;
mod size_filter;
mod types;

pub use acceptor::{Acceptor, Outcome};
pub use feed::{parse_entries, FeedError, FeedSource, HttpFeedSource};
pub use fetch::{FetchSettings, Fetcher, ReqwestFetcher};
pub use irc::{IrcError, IrcSettings, LiveChannelClient};
pub use metainfo::{decode_size, MetainfoError};
pub use monitor::{
    Monitor, MonitorConfig, MonitorError, MonitorIo, DEFAULT_POLL_INTERVAL,
    DEFAULT_STATS_INTERVAL,
};
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use pipeline::{Pipeline, PipelineError, DEFAULT_RELAY_SETTLE};
pub use poller::{FeedPoller, PollReport};
pub use relay::{
    enter_target_dir, FtpRelay, Placement, RelayError, RelaySettings, RelaySink, RemoteDirectory,
    DEFAULT_IO_TIMEOUT, DEFAULT_UPLOAD_DEADLINE,
};
pub use size_filter::SizeFilter;
pub use types::{FailureKind, FetchError, FetchMetadata, FetchOutput};
