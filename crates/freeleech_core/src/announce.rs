//! Announcement parsing for the live channel.
//!
//! Lines look like
//! `:bot PRIVMSG #chan :New Torrent Announcement: <PC :: ISO> Name:'Title' uploaded by 'User' freeleech - https://host/torrent/123`
//! and may carry mIRC colour codes around the interesting parts. Matching is done
//! with small hand-written scanners so every rule can be tested on literal strings.

use chrono::{DateTime, Utc};

/// One parsed announcement line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnounceEvent {
    pub identifier: String,
    pub is_freeleech: bool,
    pub category: Option<String>,
    pub title: Option<String>,
    pub raw_text: String,
    pub observed_at: DateTime<Utc>,
}

/// Parse a raw channel line, stamping it with the current time.
pub fn parse_announce(line: &str) -> Option<AnnounceEvent> {
    parse_announce_at(line, Utc::now())
}

/// Parse a raw channel line. Returns `None` when the line carries no identifier.
pub fn parse_announce_at(line: &str, observed_at: DateTime<Utc>) -> Option<AnnounceEvent> {
    let identifier = extract_identifier(line)?;
    Some(AnnounceEvent {
        identifier: identifier.to_string(),
        is_freeleech: has_freeleech_marker(line),
        category: extract_category(line).map(str::to_string),
        title: extract_title(line).map(str::to_string),
        raw_text: line.to_string(),
        observed_at,
    })
}

/// First run of digits directly after `torrent:` or `torrent/`.
pub fn extract_identifier(text: &str) -> Option<&str> {
    const TOKEN: &str = "torrent";
    let mut from = 0;
    while let Some(pos) = text[from..].find(TOKEN) {
        let after = from + pos + TOKEN.len();
        let rest = &text[after..];
        if let Some(tail) = rest.strip_prefix(':').or_else(|| rest.strip_prefix('/')) {
            let digits = leading_digits(tail);
            if !digits.is_empty() {
                return Some(digits);
            }
        }
        from = after;
    }
    None
}

/// Trimmed text of the first non-empty `<...>` pair.
pub fn extract_category(text: &str) -> Option<&str> {
    let mut from = 0;
    while let Some(open) = text[from..].find('<') {
        let start = from + open + 1;
        let close = text[start..].find('>')?;
        if close > 0 {
            return Some(text[start..start + close].trim());
        }
        from = start;
    }
    None
}

/// Trimmed text of the first non-empty `Name:'...'`.
pub fn extract_title(text: &str) -> Option<&str> {
    const OPEN: &str = "Name:'";
    let mut from = 0;
    while let Some(pos) = text[from..].find(OPEN) {
        let start = from + pos + OPEN.len();
        let close = text[start..].find('\'')?;
        if close > 0 {
            return Some(text[start..start + close].trim());
        }
        from = start;
    }
    None
}

/// True only for the anchored form `uploaded by '<name>' freeleech<whitespace>`,
/// compared case-insensitively.
///
/// A bare search for "freeleech" is not enough: the word has to follow the
/// uploader's closing quote directly.
pub fn has_freeleech_marker(text: &str) -> bool {
    const PREFIX: &str = "uploaded by '";
    const MARKER: &str = "' freeleech";
    // ASCII lowering keeps byte offsets aligned with the original.
    let lowered = text.to_ascii_lowercase();
    let mut from = 0;
    while let Some(pos) = lowered[from..].find(PREFIX) {
        let name_start = from + pos + PREFIX.len();
        let Some(name_len) = lowered[name_start..].find('\'') else {
            return false;
        };
        if name_len > 0 {
            let rest = &lowered[name_start + name_len..];
            if let Some(tail) = rest.strip_prefix(MARKER) {
                if tail.chars().next().is_some_and(char::is_whitespace) {
                    return true;
                }
            }
        }
        from = name_start;
    }
    false
}

fn leading_digits(text: &str) -> &str {
    let end = text
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map_or(text.len(), |(idx, _)| idx);
    &text[..end]
}
