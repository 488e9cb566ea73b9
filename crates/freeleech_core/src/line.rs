//! Line framing and classification for the announce channel protocol.

/// Accumulates raw bytes from the transport and yields complete lines.
///
/// Lines end with `\n`, an optional preceding `\r` is stripped. Bytes after the
/// last terminator are kept until the next chunk arrives. Invalid UTF-8 is
/// replaced rather than rejected.
#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and drain every line it completes. Empty lines are skipped.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);
        let mut lines = Vec::new();
        while let Some(pos) = self.pending.iter().position(|b| *b == b'\n') {
            let mut raw: Vec<u8> = self.pending.drain(..=pos).collect();
            raw.pop();
            if raw.last() == Some(&b'\r') {
                raw.pop();
            }
            if raw.is_empty() {
                continue;
            }
            lines.push(String::from_utf8_lossy(&raw).into_owned());
        }
        lines
    }

    /// Bytes received after the last complete line.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Drop any partial line, e.g. after the transport was replaced.
    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

/// What a single server line means to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerLine<'a> {
    /// Keepalive ping; carries the reply that must be sent back.
    Ping { reply: String },
    /// A message addressed to the monitored channel.
    ChannelMessage { text: &'a str },
    Other,
}

/// Classify `line` relative to the monitored `channel`.
pub fn classify<'a>(line: &'a str, channel: &str) -> ServerLine<'a> {
    if let Some(rest) = line.strip_prefix("PING") {
        return ServerLine::Ping {
            reply: format!("PONG{rest}"),
        };
    }
    if is_channel_message(line, channel) {
        return ServerLine::ChannelMessage { text: line };
    }
    ServerLine::Other
}

fn is_channel_message(line: &str, channel: &str) -> bool {
    // [:prefix] PRIVMSG <target> :<text>
    let mut words = line.split(' ').filter(|w| !w.is_empty());
    let mut command = words.next();
    if command.is_some_and(|w| w.starts_with(':')) {
        command = words.next();
    }
    command == Some("PRIVMSG")
        && words
            .next()
            .is_some_and(|target| target.eq_ignore_ascii_case(channel))
}

/// Outgoing commands, without the trailing CRLF.
pub mod commands {
    pub fn pass(secret: &str) -> String {
        format!("PASS {secret}")
    }

    pub fn nick(nick: &str) -> String {
        format!("NICK {nick}")
    }

    pub fn user(nick: &str) -> String {
        format!("USER {nick} 0 * :{nick}")
    }

    pub fn join(channel: &str) -> String {
        format!("JOIN {channel}")
    }

    pub fn quit(reason: &str) -> String {
        format!("QUIT :{reason}")
    }
}
