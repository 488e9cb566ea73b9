//! Live announce channel client.
mod client;
mod session;
mod transport;

use std::io;
use std::time::Duration;

use freeleech_core::ReconnectPolicy;
use thiserror::Error;

pub use client::LiveChannelClient;
pub use transport::{BoxedTransport, Connector, TcpConnector, Transport};

#[derive(Debug, Error)]
pub enum IrcError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("tls setup failed: {0}")]
    Tls(String),
    #[error("invalid server name {0}")]
    InvalidServerName(String),
    #[error("connect timed out after {0:?}")]
    ConnectTimeout(Duration),
    #[error("connection closed by peer")]
    Closed,
    #[error("not connected")]
    NotConnected,
    #[error("background monitor is running")]
    MonitorRunning,
    #[error("connection attempt rejected; reconnection budget spent")]
    Exhausted,
}

#[derive(Debug, Clone)]
pub struct IrcSettings {
    pub server: String,
    pub port: u16,
    pub use_tls: bool,
    pub nickname: String,
    pub password: Option<String>,
    pub channel: String,
    pub connect_timeout: Duration,
    /// Pause after sending the password, before registering.
    pub pass_delay: Duration,
    /// Time given to the server to finish registration; pings are answered meanwhile.
    pub registration_settle: Duration,
    /// Traffic drained after the join command.
    pub join_settle: Duration,
    /// Upper bound for a single read in the steady-state loop.
    pub read_timeout: Duration,
    pub reconnect: ReconnectPolicy,
    /// How long `stop_monitor` waits for the loop to finish.
    pub stop_timeout: Duration,
}

impl IrcSettings {
    pub fn new(nickname: impl Into<String>) -> Self {
        Self {
            server: "irc.torrentleech.org".to_string(),
            port: 7021,
            use_tls: true,
            nickname: nickname.into(),
            password: None,
            channel: "#tlannounces".to_string(),
            connect_timeout: Duration::from_secs(30),
            pass_delay: Duration::from_millis(500),
            registration_settle: Duration::from_secs(10),
            join_settle: Duration::from_secs(2),
            read_timeout: Duration::from_secs(1),
            reconnect: ReconnectPolicy::default(),
            stop_timeout: Duration::from_secs(5),
        }
    }
}
