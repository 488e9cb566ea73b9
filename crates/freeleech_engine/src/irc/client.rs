use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use engine_logging::targets::IRC;
use engine_logging::{engine_debug, engine_info, engine_trace, engine_warn};
use freeleech_core::{
    classify, commands, parse_announce, update_link, AnnounceEvent, ConfirmationSet,
    ConnectionState, FreeleechOracle, Link, LinkEffect, LinkMsg, ServerLine,
};
use tokio::io::AsyncWriteExt;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::session::{write_line, Outbound, Session};
use super::{Connector, IrcError, IrcSettings};

const QUIT_REASON: &str = "Goodbye";

/// Client for the live announce channel.
///
/// Confirmed freeleech announcements are recorded in the confirmation set and
/// published on the event channel handed to [`LiveChannelClient::new`].
pub struct LiveChannelClient {
    stop_timeout: Duration,
    confirmations: Arc<ConfirmationSet>,
    outbound: Arc<Outbound>,
    state_tx: Arc<watch::Sender<ConnectionState>>,
    state_rx: watch::Receiver<ConnectionState>,
    /// Owned here while the background monitor is not running.
    worker: Option<Worker>,
    monitor: Option<MonitorTask>,
}

struct MonitorTask {
    cancel: CancellationToken,
    handle: JoinHandle<Worker>,
}

impl LiveChannelClient {
    pub fn new(
        settings: IrcSettings,
        connector: Arc<dyn Connector>,
        events: mpsc::UnboundedSender<AnnounceEvent>,
    ) -> Self {
        let confirmations = Arc::new(ConfirmationSet::new());
        let (state_tx, state_rx) = watch::channel(ConnectionState::Disconnected);
        let state_tx = Arc::new(state_tx);
        let outbound = Arc::new(Outbound::default());
        let stop_timeout = settings.stop_timeout;
        let worker = Worker {
            link: Link::new(settings.reconnect),
            dispatch: Dispatch {
                channel: settings.channel.clone(),
                confirmations: confirmations.clone(),
                events,
            },
            settings,
            connector,
            session: None,
            outbound: outbound.clone(),
            pending_reconnect: None,
            state_tx: state_tx.clone(),
        };
        Self {
            stop_timeout,
            confirmations,
            outbound,
            state_tx,
            state_rx,
            worker: Some(worker),
            monitor: None,
        }
    }

    /// Shared view of the confirmation set, for the feed poller.
    pub fn confirmations(&self) -> Arc<ConfirmationSet> {
        self.confirmations.clone()
    }

    pub fn state(&self) -> ConnectionState {
        *self.state_rx.borrow()
    }

    pub fn state_watch(&self) -> watch::Receiver<ConnectionState> {
        self.state_rx.clone()
    }

    pub fn is_monitor_running(&self) -> bool {
        self.monitor
            .as_ref()
            .is_some_and(|monitor| !monitor.handle.is_finished())
    }

    /// Connect, register and join. Only valid while the monitor is not running.
    pub async fn connect(&mut self) -> Result<(), IrcError> {
        let worker = self.worker.as_mut().ok_or(IrcError::MonitorRunning)?;
        if worker.link.is_finished() {
            return Err(IrcError::Exhausted);
        }
        engine_info!(target: IRC, "Connecting to {}...", worker.connector.endpoint());
        worker.drive(LinkMsg::ConnectRequested).await?;
        engine_info!(target: IRC, "✓ Connected and joined {}", worker.settings.channel);
        Ok(())
    }

    /// Start the background read/reconnect loop. No-op if it was already started.
    pub fn start_monitor(&mut self) {
        if self.monitor.is_some() {
            return;
        }
        let Some(worker) = self.worker.take() else {
            return;
        };
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(worker.run(cancel.clone()));
        self.monitor = Some(MonitorTask { cancel, handle });
        engine_info!(target: IRC, "Background monitor started");
    }

    /// Signal the loop to exit and wait up to the stop timeout for it.
    pub async fn stop_monitor(&mut self) {
        let Some(MonitorTask { cancel, mut handle }) = self.monitor.take() else {
            return;
        };
        cancel.cancel();
        match tokio::time::timeout(self.stop_timeout, &mut handle).await {
            Ok(Ok(worker)) => self.worker = Some(worker),
            Ok(Err(err)) => {
                engine_warn!(target: IRC, "Monitor task ended abnormally: {}", err);
            }
            Err(_) => {
                engine_warn!(
                    target: IRC,
                    "Monitor did not stop within {:?}; aborting it",
                    self.stop_timeout
                );
                handle.abort();
                // Wait for the drop so the write half is released.
                let _ = handle.await;
            }
        }
    }

    /// Send the leave notice and close the transport. Stops the monitor first if needed.
    pub async fn disconnect(&mut self) {
        if self.monitor.is_some() {
            self.stop_monitor().await;
        }
        match self.worker.as_mut() {
            Some(worker) => worker.shutdown().await,
            None => self.leave_without_worker().await,
        }
    }

    /// Leave through the shared write half after the monitor task was lost.
    async fn leave_without_worker(&self) {
        let leave = async {
            let Some(mut writer) = self.outbound.lock().await.take() else {
                return;
            };
            if let Err(err) = write_line(&mut writer, &commands::quit(QUIT_REASON)).await {
                engine_debug!(target: IRC, "Leave notice not sent: {}", err);
            }
            let _ = writer.shutdown().await;
        };
        if tokio::time::timeout(self.stop_timeout, leave).await.is_err() {
            engine_warn!(target: IRC, "Closing the connection took longer than {:?}", self.stop_timeout);
        }
        self.state_tx.send_replace(ConnectionState::Disconnected);
    }
}

impl FreeleechOracle for LiveChannelClient {
    fn is_confirmed_freeleech(&self, identifier: &str) -> bool {
        self.confirmations.is_confirmed_freeleech(identifier)
    }
}

/// Turns channel lines into confirmations and events.
struct Dispatch {
    channel: String,
    confirmations: Arc<ConfirmationSet>,
    events: mpsc::UnboundedSender<AnnounceEvent>,
}

impl Dispatch {
    async fn handle(&self, session: &mut Session, line: &str) -> Result<(), IrcError> {
        match classify(line, &self.channel) {
            ServerLine::Ping { reply } => {
                engine_trace!(target: IRC, "Answering keepalive: {}", reply);
                session.send(&reply).await
            }
            ServerLine::ChannelMessage { text } => {
                self.on_channel_message(text);
                Ok(())
            }
            ServerLine::Other => {
                engine_trace!(target: IRC, "<< {}", line);
                Ok(())
            }
        }
    }

    fn on_channel_message(&self, text: &str) {
        let Some(event) = parse_announce(text) else {
            return;
        };
        if !event.is_freeleech {
            engine_debug!(target: IRC, "Announcement {} is not freeleech", event.identifier);
            return;
        }
        self.confirmations.confirm(&event.identifier);
        let title: String = event
            .title
            .as_deref()
            .unwrap_or("Unknown")
            .chars()
            .take(60)
            .collect();
        engine_info!(
            target: IRC,
            "[{}] ✓ Freeleech: [{}] {}... (ID: {})",
            event.observed_at.format("%H:%M:%S"),
            event.category.as_deref().unwrap_or("Unknown"),
            title,
            event.identifier
        );
        if self.events.send(event).is_err() {
            engine_debug!(target: IRC, "No announcement consumer; event dropped");
        }
    }
}

/// Owns the connection; lives in the client or inside the monitor task.
struct Worker {
    settings: IrcSettings,
    connector: Arc<dyn Connector>,
    link: Link,
    session: Option<Session>,
    outbound: Arc<Outbound>,
    pending_reconnect: Option<Duration>,
    dispatch: Dispatch,
    state_tx: Arc<watch::Sender<ConnectionState>>,
}

impl Worker {
    fn apply(&mut self, msg: LinkMsg) -> Vec<LinkEffect> {
        let link = std::mem::take(&mut self.link);
        let (link, effects) = update_link(link, msg);
        self.link = link;
        self.state_tx.send_replace(self.link.state());
        effects
    }

    /// Apply `msg` and run the resulting effects; on I/O failure the link is
    /// moved to `Disconnected` before the error is returned.
    async fn drive(&mut self, msg: LinkMsg) -> Result<(), IrcError> {
        let effects = self.apply(msg);
        if let Err(err) = self.execute(effects).await {
            self.fail().await;
            return Err(err);
        }
        if self.link.is_exhausted() {
            return Err(IrcError::Exhausted);
        }
        Ok(())
    }

    async fn fail(&mut self) {
        let effects = self.apply(LinkMsg::TransportFailed);
        // Failure effects only close and schedule; they cannot fail themselves.
        let _ = self.execute(effects).await;
    }

    async fn execute(&mut self, effects: Vec<LinkEffect>) -> Result<(), IrcError> {
        let mut queue: VecDeque<LinkEffect> = effects.into();
        while let Some(effect) = queue.pop_front() {
            let next = match effect {
                LinkEffect::OpenTransport {
                    attempt,
                    max_attempts,
                } => {
                    engine_debug!(
                        target: IRC,
                        "Opening transport to {} (attempt {}/{})",
                        self.connector.endpoint(),
                        attempt,
                        max_attempts
                    );
                    let transport = self.connector.connect().await?;
                    self.session = Some(Session::new(transport, self.outbound.clone()).await);
                    Some(LinkMsg::TransportOpened)
                }
                LinkEffect::SendRegistration => {
                    self.register().await?;
                    Some(LinkMsg::Registered)
                }
                LinkEffect::SendJoin => {
                    self.join().await?;
                    Some(LinkMsg::Joined)
                }
                LinkEffect::SendQuit => {
                    if let Some(session) = self.session.as_mut() {
                        let _ = session.send(&commands::quit(QUIT_REASON)).await;
                    }
                    None
                }
                LinkEffect::CloseTransport => {
                    if let Some(session) = self.session.take() {
                        session.close().await;
                    }
                    None
                }
                LinkEffect::ScheduleReconnect { delay } => {
                    self.pending_reconnect = Some(delay);
                    None
                }
                LinkEffect::GiveUp { attempts } => {
                    engine_warn!(
                        target: IRC,
                        "Max reconnection attempts reached ({}). Live detection disabled; continuing with feed polling only",
                        attempts
                    );
                    None
                }
            };
            if let Some(msg) = next {
                queue.extend(self.apply(msg));
            }
        }
        Ok(())
    }

    async fn register(&mut self) -> Result<(), IrcError> {
        let settings = &self.settings;
        let session = self.session.as_mut().ok_or(IrcError::NotConnected)?;
        if let Some(password) = settings.password.as_deref() {
            engine_info!(target: IRC, "Authenticating with password...");
            session.send(&commands::pass(password)).await?;
            tokio::time::sleep(settings.pass_delay).await;
        }
        session.send(&commands::nick(&settings.nickname)).await?;
        session.send(&commands::user(&settings.nickname)).await?;
        engine_info!(target: IRC, "Waiting for registration...");
        drain_for(
            session,
            &self.dispatch,
            settings.registration_settle,
            settings.read_timeout,
        )
        .await
    }

    async fn join(&mut self) -> Result<(), IrcError> {
        let settings = &self.settings;
        let session = self.session.as_mut().ok_or(IrcError::NotConnected)?;
        engine_info!(target: IRC, "Joining {}...", settings.channel);
        session.send(&commands::join(&settings.channel)).await?;
        drain_for(session, &self.dispatch, settings.join_settle, settings.read_timeout).await
    }

    async fn read_step(&mut self) -> Result<(), IrcError> {
        let session = self.session.as_mut().ok_or(IrcError::NotConnected)?;
        let lines = session.read_lines(self.settings.read_timeout).await?;
        for line in lines {
            self.dispatch.handle(session, &line).await?;
        }
        Ok(())
    }

    async fn run(mut self, cancel: CancellationToken) -> Self {
        loop {
            if self.link.is_finished() {
                break;
            }
            match self.link.state() {
                ConnectionState::Connected => {
                    let step = tokio::select! {
                        _ = cancel.cancelled() => break,
                        step = self.read_step() => step,
                    };
                    if let Err(err) = step {
                        engine_warn!(
                            target: IRC,
                            "Connection lost ({}). Will attempt to reconnect...",
                            err
                        );
                        self.fail().await;
                    }
                }
                ConnectionState::Disconnected => {
                    let delay = self.pending_reconnect.take().unwrap_or_default();
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        _ = tokio::time::sleep(delay) => {}
                    }
                    engine_info!(
                        target: IRC,
                        "Attempting to reconnect ({}/{})...",
                        self.link.failed_attempts() + 1,
                        self.settings.reconnect.max_attempts
                    );
                    let attempt = tokio::select! {
                        _ = cancel.cancelled() => break,
                        attempt = self.drive(LinkMsg::ReconnectDue) => attempt,
                    };
                    match attempt {
                        Ok(()) => engine_info!(target: IRC, "✓ Reconnected to {}", self.settings.channel),
                        Err(err) => engine_warn!(target: IRC, "Reconnect attempt failed: {}", err),
                    }
                }
                // Only reachable when a handshake was interrupted.
                _ => self.fail().await,
            }
        }
        self
    }

    async fn shutdown(&mut self) {
        let effects = self.apply(LinkMsg::Shutdown);
        let _ = self.execute(effects).await;
        // A session left over from an interrupted handshake.
        if let Some(session) = self.session.take() {
            session.close().await;
        }
    }
}

/// Read and dispatch traffic for `period`, answering keepalive pings.
async fn drain_for(
    session: &mut Session,
    dispatch: &Dispatch,
    period: Duration,
    read_timeout: Duration,
) -> Result<(), IrcError> {
    let deadline = Instant::now() + period;
    loop {
        let now = Instant::now();
        if now >= deadline {
            return Ok(());
        }
        let wait = read_timeout.min(deadline - now);
        for line in session.read_lines(wait).await? {
            dispatch.handle(session, &line).await?;
        }
    }
}
