//! Connection lifecycle of the announce channel client as a pure state machine.
//!
//! The client feeds [`LinkMsg`]s describing what happened on the wire and executes
//! the returned [`LinkEffect`]s. Messages that make no sense in the current state
//! are ignored.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Registering,
    Joining,
    Connected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            delay: Duration::from_secs(3),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkMsg {
    /// Caller wants a connection (initial connect).
    ConnectRequested,
    /// Transport (TCP/TLS) is established.
    TransportOpened,
    /// Identity registration has been sent and the settle period elapsed.
    Registered,
    /// Channel join was sent and acknowledged by the settle period.
    Joined,
    /// Any I/O failure, in any state.
    TransportFailed,
    /// The reconnect delay has elapsed.
    ReconnectDue,
    /// Graceful shutdown; no reconnection afterwards.
    Shutdown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEffect {
    OpenTransport { attempt: u32, max_attempts: u32 },
    SendRegistration,
    SendJoin,
    SendQuit,
    CloseTransport,
    ScheduleReconnect { delay: Duration },
    /// Reconnection budget is spent; live detection is over for this process.
    GiveUp { attempts: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Link {
    state: ConnectionState,
    policy: ReconnectPolicy,
    failed_attempts: u32,
    exhausted: bool,
    shut_down: bool,
}

impl Link {
    pub fn new(policy: ReconnectPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn failed_attempts(&self) -> u32 {
        self.failed_attempts
    }

    /// True once the reconnect budget is spent or the link was shut down.
    pub fn is_finished(&self) -> bool {
        self.exhausted || self.shut_down
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    fn open(&mut self) -> Vec<LinkEffect> {
        self.state = ConnectionState::Connecting;
        vec![LinkEffect::OpenTransport {
            attempt: self.failed_attempts + 1,
            max_attempts: self.policy.max_attempts,
        }]
    }
}

/// Pure update function: applies a message to the link and returns effects.
pub fn update_link(mut link: Link, msg: LinkMsg) -> (Link, Vec<LinkEffect>) {
    use ConnectionState::*;

    if link.is_finished() {
        return (link, Vec::new());
    }

    let effects = match (link.state, msg) {
        (Disconnected, LinkMsg::ConnectRequested) | (Disconnected, LinkMsg::ReconnectDue) => {
            link.open()
        }
        (Connecting, LinkMsg::TransportOpened) => {
            link.state = Registering;
            vec![LinkEffect::SendRegistration]
        }
        (Registering, LinkMsg::Registered) => {
            link.state = Joining;
            vec![LinkEffect::SendJoin]
        }
        (Joining, LinkMsg::Joined) => {
            link.state = Connected;
            link.failed_attempts = 0;
            Vec::new()
        }
        (Disconnected, LinkMsg::TransportFailed) => Vec::new(),
        (previous, LinkMsg::TransportFailed) => {
            link.state = Disconnected;
            let mut effects = vec![LinkEffect::CloseTransport];
            if previous == Connected {
                effects.push(LinkEffect::ScheduleReconnect {
                    delay: Duration::ZERO,
                });
                return (link, effects);
            }
            link.failed_attempts += 1;
            if link.failed_attempts >= link.policy.max_attempts {
                link.exhausted = true;
                effects.push(LinkEffect::GiveUp {
                    attempts: link.failed_attempts,
                });
            } else {
                effects.push(LinkEffect::ScheduleReconnect {
                    delay: link.policy.delay,
                });
            }
            effects
        }
        (previous, LinkMsg::Shutdown) => {
            link.state = Disconnected;
            link.shut_down = true;
            match previous {
                Disconnected => Vec::new(),
                Connecting => vec![LinkEffect::CloseTransport],
                _ => vec![LinkEffect::SendQuit, LinkEffect::CloseTransport],
            }
        }
        _ => Vec::new(),
    };

    (link, effects)
}
