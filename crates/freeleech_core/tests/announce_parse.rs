use chrono::{TimeZone, Utc};
use freeleech_core::{
    extract_category, extract_identifier, extract_title, has_freeleech_marker, parse_announce,
    parse_announce_at,
};
use pretty_assertions::assert_eq;

const SAMPLE: &str = ":_AnnounceBot_!Announce@torrentleech.org PRIVMSG #tlannounces :\u{3}00,04New Torrent Announcement:\u{3}00,12 <PC-ISO>  Name:'Ubuntu 24.04' uploaded by 'Anon' freeleech - \u{3}01,15 https://www.torrentleech.org/torrent/987654";

#[test]
fn parses_full_freeleech_announcement() {
    let at = Utc.with_ymd_and_hms(2024, 4, 25, 12, 0, 0).unwrap();
    let event = parse_announce_at(SAMPLE, at).expect("announcement");

    assert_eq!(event.identifier, "987654");
    assert!(event.is_freeleech);
    assert_eq!(event.category.as_deref(), Some("PC-ISO"));
    assert_eq!(event.title.as_deref(), Some("Ubuntu 24.04"));
    assert_eq!(event.raw_text, SAMPLE);
    assert_eq!(event.observed_at, at);
}

#[test]
fn line_without_identifier_is_not_an_announcement() {
    assert!(parse_announce(":server 001 nick :Welcome to the network").is_none());
    assert!(parse_announce("PRIVMSG #tlannounces :torrent/ no digits here").is_none());
}

#[test]
fn identifier_accepts_colon_separator_and_skips_bare_tokens() {
    assert_eq!(extract_identifier("see torrent:42 now"), Some("42"));
    assert_eq!(
        extract_identifier("torrents are great, torrent/x, then torrent/777abc"),
        Some("777")
    );
    assert_eq!(extract_identifier("Torrent/12"), None);
}

#[test]
fn category_is_trimmed_and_empty_pairs_are_skipped() {
    assert_eq!(extract_category("a <> b < TV :: Episodes HD > c"), Some("TV :: Episodes HD"));
    assert_eq!(extract_category("no brackets"), None);
    assert_eq!(extract_category("open < only"), None);
}

#[test]
fn title_requires_quoted_name() {
    assert_eq!(extract_title("Name:'  Spaced Title ' rest"), Some("Spaced Title"));
    assert_eq!(extract_title("Name:'' then Name:'Second'"), Some("Second"));
    assert_eq!(extract_title("Name: Unquoted"), None);
}

#[test]
fn non_freeleech_announcement_still_parses() {
    let line = "PRIVMSG #tlannounces :<Movies> Name:'Film' uploaded by 'Someone' - https://x/torrent/55";
    let event = parse_announce(line).expect("announcement");
    assert_eq!(event.identifier, "55");
    assert!(!event.is_freeleech);
}

#[test]
fn freeleech_marker_must_follow_uploader_quote() {
    assert!(has_freeleech_marker("uploaded by 'Anon' freeleech - https://x"));
    assert!(has_freeleech_marker("UPLOADED BY 'Anon' FreeLeech\thttps://x"));

    // Substring of another word, or not anchored to the uploader.
    assert!(!has_freeleech_marker("uploaded by 'Anon' freeleechfrequency - x"));
    assert!(!has_freeleech_marker("Name:'freeleech pack' uploaded by 'Anon' - x"));
    assert!(!has_freeleech_marker("uploaded by 'Anon' - freeleech x"));
    // Needs trailing whitespace.
    assert!(!has_freeleech_marker("uploaded by 'Anon' freeleech"));
    // Empty uploader name.
    assert!(!has_freeleech_marker("uploaded by '' freeleech - x"));
}

#[test]
fn freeleech_marker_checks_every_uploader_clause() {
    let line = "uploaded by 'A' - uploaded by 'B' freeleech - https://x/torrent/1";
    assert!(has_freeleech_marker(line));
}
