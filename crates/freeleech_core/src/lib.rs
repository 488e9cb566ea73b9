//! Freeleech core: announcement parsing, connection state machine, dedup and filters.
//!
//! Nothing in here touches the network or the filesystem.
mod announce;
mod dedup;
mod feed;
mod filename;
mod filter;
mod line;
mod link;
mod size;
mod stats;

pub use announce::{
    extract_category, extract_identifier, extract_title, has_freeleech_marker, parse_announce,
    parse_announce_at, AnnounceEvent,
};
pub use dedup::{ConfirmationSet, FreeleechOracle, ProcessedSet};
pub use feed::{
    announce_download_url, default_title, feed_key, trailing_segment, FeedCandidate, FeedEntry,
    UNKNOWN_CATEGORY,
};
pub use filename::{sanitize_stem, torrent_filename, MAX_STEM_CHARS, TORRENT_EXTENSION};
pub use filter::{CategoryFilter, SizeBounds, SizeVerdict};
pub use line::{classify, commands, LineBuffer, ServerLine};
pub use link::{update_link, ConnectionState, Link, LinkEffect, LinkMsg, ReconnectPolicy};
pub use size::{bytes_to_gb, SizeDescriptor};
pub use stats::{Stats, StatsSnapshot};
