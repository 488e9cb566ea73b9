use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use freeleech_app::cli::Cli;
use freeleech_app::config::{load_file_config, resolve, FileConfig};
use freeleech_engine::RelaySettings;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

const FEED: &str = "https://www.torrentleech.org/rss/KEY123";

fn cli(args: &[&str]) -> Cli {
    let mut argv = vec!["freeleech-monitor"];
    argv.extend_from_slice(args);
    Cli::try_parse_from(argv).unwrap()
}

#[test]
fn defaults_fill_everything_but_the_url() {
    let config = resolve(&cli(&["--url", FEED]), FileConfig::default(), 1_700_000_000).unwrap();

    assert_eq!(config.feed_url.as_str(), FEED);
    assert!(config.categories.is_empty());
    assert_eq!(config.output_dir, PathBuf::from("./torrents"));
    assert_eq!(config.irc.nickname, "tlrss_1700000000");
    assert_eq!(config.irc.server, "irc.torrentleech.org");
    assert_eq!(config.irc.port, 7021);
    assert!(config.irc.use_tls);
    assert_eq!(config.irc.channel, "#tlannounces");
    assert_eq!(config.irc.password, None);
    assert_eq!(config.relay, None);
    assert_eq!(config.poll_interval, Duration::from_secs(30));
    assert_eq!(config.stats_interval, Duration::from_secs(300));
    assert_eq!(config.size_bounds.min_gb, None);
    assert_eq!(config.size_bounds.max_gb, None);
}

#[test]
fn explicit_flags_win_over_file_values() {
    let file: FileConfig = serde_json::from_str(
        r#"{
            "url": "https://www.torrentleech.org/rss/FILEKEY",
            "categories": ["Movies"],
            "output": "/srv/file",
            "irc_nick": "from_file",
            "min_size": 2.0,
            "poll_interval_secs": 60,
            "something_else": true
        }"#,
    )
    .unwrap();
    let args = cli(&["-c", "PC-ISO", "Anime", "--irc-nick", "from_cli", "--min-size", "0.5"]);
    let config = resolve(&args, file, 0).unwrap();

    assert_eq!(config.feed_url.as_str(), "https://www.torrentleech.org/rss/FILEKEY");
    assert_eq!(config.categories, vec!["PC-ISO", "Anime"]);
    assert_eq!(config.output_dir, PathBuf::from("/srv/file"));
    assert_eq!(config.irc.nickname, "from_cli");
    assert_eq!(config.size_bounds.min_gb, Some(0.5));
    assert_eq!(config.poll_interval, Duration::from_secs(60));
}

#[test]
fn relay_needs_host_user_and_password() {
    let partial = cli(&["--url", FEED, "--ftp-host", "seedbox", "--ftp-user", "seed"]);
    assert_eq!(resolve(&partial, FileConfig::default(), 0).unwrap().relay, None);

    let full = cli(&[
        "--url", FEED, "--ftp-host", "seedbox", "--ftp-user", "seed", "--ftp-pass", "pw",
    ]);
    assert_eq!(
        resolve(&full, FileConfig::default(), 0).unwrap().relay,
        Some(RelaySettings {
            host: "seedbox".into(),
            port: 21,
            user: "seed".into(),
            pass: "pw".into(),
            folder: "/".into(),
        })
    );
}

#[test]
fn no_ftp_on_either_side_disables_the_relay() {
    let file = FileConfig {
        ftp_host: Some("seedbox".into()),
        ftp_user: Some("seed".into()),
        ftp_pass: Some("pw".into()),
        no_ftp: Some(true),
        ..FileConfig::default()
    };
    let config = resolve(&cli(&["--url", FEED]), file.clone(), 0).unwrap();
    assert_eq!(config.relay, None);

    let file = FileConfig {
        no_ftp: None,
        ..file
    };
    let config = resolve(&cli(&["--url", FEED, "--no-ftp"]), file, 0).unwrap();
    assert_eq!(config.relay, None);
}

#[test]
fn tls_can_be_disabled_from_either_side() {
    let config = resolve(&cli(&["--url", FEED, "--irc-no-tls"]), FileConfig::default(), 0).unwrap();
    assert!(!config.irc.use_tls);

    let file = FileConfig {
        irc_tls: Some(false),
        ..FileConfig::default()
    };
    assert!(!resolve(&cli(&["--url", FEED]), file, 0).unwrap().irc.use_tls);
}

#[test]
fn missing_or_relative_url_is_rejected() {
    assert!(resolve(&cli(&[]), FileConfig::default(), 0).is_err());
    assert!(resolve(&cli(&["--url", "rss/KEY123"]), FileConfig::default(), 0).is_err());
    assert!(resolve(&cli(&["--url", "mailto:someone@example.com"]), FileConfig::default(), 0).is_err());
}

#[test]
fn url_without_a_feed_key_is_rejected() {
    for url in ["https://www.torrentleech.org/", "https://www.torrentleech.org"] {
        let err = resolve(&cli(&["--url", url]), FileConfig::default(), 0).unwrap_err();
        assert!(err.to_string().contains("feed key"), "{url}: {err}");
    }
    assert!(resolve(&cli(&["--url", "https://www.torrentleech.org/rss/KEY123/"]), FileConfig::default(), 0).is_ok());
}

#[test]
fn inverted_size_window_is_rejected() {
    let args = cli(&["--url", FEED, "--min-size", "5", "--max-size", "1"]);
    let err = resolve(&args, FileConfig::default(), 0).unwrap_err();
    assert!(err.to_string().contains("min-size"));
}

#[test]
fn zero_intervals_are_rejected() {
    let args = cli(&["--url", FEED, "--poll-interval", "0"]);
    assert!(resolve(&args, FileConfig::default(), 0).is_err());
}

#[test]
fn config_file_is_loaded_from_disk() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.json");
    fs::write(&path, r#"{"url": "https://www.torrentleech.org/rss/KEY123", "ftp_port": 2121}"#).unwrap();

    let file = load_file_config(&path).unwrap();
    assert_eq!(file.url.as_deref(), Some(FEED));
    assert_eq!(file.ftp_port, Some(2121));
}

#[test]
fn unreadable_or_malformed_config_file_is_an_error() {
    let temp = TempDir::new().unwrap();
    assert!(load_file_config(&temp.path().join("missing.json")).is_err());

    let broken = temp.path().join("broken.json");
    fs::write(&broken, "{ not json").unwrap();
    assert!(load_file_config(&broken).is_err());
}
