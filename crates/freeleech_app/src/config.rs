//! Config file loading and the merge with command-line flags.
//!
//! An explicitly given flag wins over the file, and the file wins over the
//! built-in default.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use engine_logging::engine_info;
use engine_logging::targets::CONFIG;
use freeleech_core::{feed_key, SizeBounds};
use freeleech_engine::{IrcSettings, MonitorConfig, RelaySettings};
use serde::Deserialize;
use url::Url;

use crate::cli::Cli;

pub const DEFAULT_OUTPUT: &str = "./torrents";
pub const DEFAULT_FTP_PORT: u16 = 21;
pub const DEFAULT_FTP_FOLDER: &str = "/";

/// Every key is optional; unknown keys are ignored.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub url: Option<String>,
    pub categories: Option<Vec<String>>,
    pub output: Option<PathBuf>,
    pub irc_nick: Option<String>,
    pub irc_pass: Option<String>,
    pub irc_server: Option<String>,
    pub irc_port: Option<u16>,
    pub irc_channel: Option<String>,
    pub irc_tls: Option<bool>,
    pub ftp_host: Option<String>,
    pub ftp_port: Option<u16>,
    pub ftp_user: Option<String>,
    pub ftp_pass: Option<String>,
    pub ftp_folder: Option<String>,
    pub no_ftp: Option<bool>,
    pub min_size: Option<f64>,
    pub max_size: Option<f64>,
    pub poll_interval_secs: Option<u64>,
    pub stats_interval_secs: Option<u64>,
}

pub fn load_file_config(path: &Path) -> Result<FileConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Error loading config file {}", path.display()))?;
    let config = serde_json::from_str(&text)
        .with_context(|| format!("Error parsing config file {}", path.display()))?;
    engine_info!(target: CONFIG, "Loaded configuration from {}", path.display());
    Ok(config)
}

/// Nickname used when none is configured.
pub fn default_nickname(unix_secs: i64) -> String {
    format!("tlrss_{unix_secs}")
}

/// Merge flags over file values over defaults, and validate the result.
pub fn resolve(cli: &Cli, file: FileConfig, unix_secs: i64) -> Result<MonitorConfig> {
    let Some(raw_url) = cli.url.clone().or(file.url) else {
        bail!("No feed URL given; pass --url or set \"url\" in the config file");
    };
    let feed_url =
        Url::parse(&raw_url).with_context(|| format!("Invalid feed URL {raw_url:?}"))?;
    if feed_url.cannot_be_a_base() || feed_url.host_str().is_none() {
        bail!("Feed URL {raw_url:?} is not an absolute URL");
    }
    if feed_key(&feed_url).is_none() {
        bail!("Feed URL {raw_url:?} does not end in a feed key");
    }

    let min_gb = cli.min_size.or(file.min_size);
    let max_gb = cli.max_size.or(file.max_size);
    if let (Some(min), Some(max)) = (min_gb, max_gb) {
        if min > max {
            bail!("--min-size ({min} GB) is larger than --max-size ({max} GB)");
        }
    }

    let nickname = cli
        .irc_nick
        .clone()
        .or(file.irc_nick)
        .unwrap_or_else(|| default_nickname(unix_secs));
    let mut irc = IrcSettings::new(nickname);
    irc.password = cli.irc_pass.clone().or(file.irc_pass);
    if let Some(server) = cli.irc_server.clone().or(file.irc_server) {
        irc.server = server;
    }
    if let Some(port) = cli.irc_port.or(file.irc_port) {
        irc.port = port;
    }
    if let Some(channel) = cli.irc_channel.clone().or(file.irc_channel) {
        irc.channel = channel;
    }
    irc.use_tls = !cli.irc_no_tls && file.irc_tls.unwrap_or(true);

    let no_ftp = cli.no_ftp || file.no_ftp.unwrap_or(false);
    let ftp_host = cli.ftp_host.clone().or(file.ftp_host);
    let ftp_user = cli.ftp_user.clone().or(file.ftp_user);
    let ftp_pass = cli.ftp_pass.clone().or(file.ftp_pass);
    let relay = match (no_ftp, ftp_host, ftp_user, ftp_pass) {
        (false, Some(host), Some(user), Some(pass)) => Some(RelaySettings {
            host,
            port: cli.ftp_port.or(file.ftp_port).unwrap_or(DEFAULT_FTP_PORT),
            user,
            pass,
            folder: cli
                .ftp_folder
                .clone()
                .or(file.ftp_folder)
                .unwrap_or_else(|| DEFAULT_FTP_FOLDER.to_string()),
        }),
        _ => None,
    };

    let mut config = MonitorConfig::new(feed_url, irc);
    config.categories = cli.categories.clone().or(file.categories).unwrap_or_default();
    config.output_dir = cli
        .output
        .clone()
        .or(file.output)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));
    config.size_bounds = SizeBounds { min_gb, max_gb };
    config.relay = relay;
    if let Some(secs) = cli.poll_interval.or(file.poll_interval_secs) {
        config.poll_interval = positive_secs(secs, "poll interval")?;
    }
    if let Some(secs) = cli.stats_interval.or(file.stats_interval_secs) {
        config.stats_interval = positive_secs(secs, "stats interval")?;
    }
    Ok(config)
}

fn positive_secs(secs: u64, what: &str) -> Result<Duration> {
    if secs == 0 {
        bail!("The {what} must be at least one second");
    }
    Ok(Duration::from_secs(secs))
}
