//! Command-line surface of the monitor.

use std::path::PathBuf;

use clap::{ArgAction, Parser};

#[derive(Debug, Default, Parser)]
#[command(name = "freeleech-monitor")]
#[command(about = "Continuously monitor TorrentLeech for freeleech torrents")]
#[command(
    long_about = "Continuously monitor TorrentLeech for freeleech torrents.

The monitor listens on the IRC announce channel for freeleech announcements
in real time, polls the RSS feed every 30 seconds, downloads matching torrents
once each, and optionally uploads them to an FTP folder.

EXAMPLES:
    freeleech-monitor --config config.json
    freeleech-monitor --url https://www.torrentleech.org/rss/KEY -c PC-ISO
    freeleech-monitor --url ... -c Movies Anime -o /srv/torrents --min-size 1"
)]
#[command(version)]
pub struct Cli {
    /// Path to a JSON config file; explicit flags take precedence over it
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// RSS feed URL (its last path segment is the personal feed key)
    #[arg(long)]
    pub url: Option<String>,

    /// Only accept categories containing one of these terms
    #[arg(short = 'c', long, num_args = 1..)]
    pub categories: Option<Vec<String>>,

    /// Download directory [default: ./torrents]
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// IRC nickname [default: tlrss_<unix time>]
    #[arg(long)]
    pub irc_nick: Option<String>,

    /// IRC password, if the network requires one
    #[arg(long)]
    pub irc_pass: Option<String>,

    /// IRC server [default: irc.torrentleech.org]
    #[arg(long)]
    pub irc_server: Option<String>,

    /// IRC port [default: 7021]
    #[arg(long)]
    pub irc_port: Option<u16>,

    /// Announce channel [default: #tlannounces]
    #[arg(long)]
    pub irc_channel: Option<String>,

    /// Connect to IRC without TLS
    #[arg(long)]
    pub irc_no_tls: bool,

    /// FTP server host
    #[arg(long)]
    pub ftp_host: Option<String>,

    /// FTP server port [default: 21]
    #[arg(long)]
    pub ftp_port: Option<u16>,

    /// FTP username
    #[arg(long)]
    pub ftp_user: Option<String>,

    /// FTP password
    #[arg(long)]
    pub ftp_pass: Option<String>,

    /// FTP upload folder [default: /]
    #[arg(long)]
    pub ftp_folder: Option<String>,

    /// Disable FTP upload
    #[arg(long)]
    pub no_ftp: bool,

    /// Minimum torrent size in GB
    #[arg(long)]
    pub min_size: Option<f64>,

    /// Maximum torrent size in GB
    #[arg(long)]
    pub max_size: Option<f64>,

    /// Seconds between feed checks [default: 30]
    #[arg(long, value_name = "SECS")]
    pub poll_interval: Option<u64>,

    /// Seconds between statistics reports [default: 300]
    #[arg(long, value_name = "SECS")]
    pub stats_interval: Option<u64>,

    /// Also write the log to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// More output; repeat for trace level
    #[arg(short = 'v', long, action = ArgAction::Count)]
    pub verbose: u8,
}
