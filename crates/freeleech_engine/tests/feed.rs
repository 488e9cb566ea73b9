use std::sync::Arc;

use freeleech_core::{FeedCandidate, FeedEntry};
use freeleech_engine::{parse_entries, FeedError, FeedSource, HttpFeedSource, ReqwestFetcher};
use pretty_assertions::assert_eq;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>TorrentLeech</title>
    <link>https://www.torrentleech.org</link>
    <description>Latest torrents</description>
    <item>
      <title>Ubuntu 24.04</title>
      <link>https://www.torrentleech.org/rss/download/987654/KEY123/Ubuntu.torrent</link>
      <guid isPermaLink="false">https://www.torrentleech.org/torrent/987654</guid>
      <category>PC-ISO</category>
    </item>
    <item>
      <title>Bare Item</title>
      <guid isPermaLink="false">https://www.torrentleech.org/torrent/42</guid>
    </item>
  </channel>
</rss>"#;

#[test]
fn parses_rss_items_into_entries() {
    let entries = parse_entries(RSS.as_bytes()).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(
        entries[0],
        FeedEntry {
            id: Some("https://www.torrentleech.org/torrent/987654".to_string()),
            tags: vec!["PC-ISO".to_string()],
            title: Some("Ubuntu 24.04".to_string()),
            link: Some(
                "https://www.torrentleech.org/rss/download/987654/KEY123/Ubuntu.torrent"
                    .to_string()
            ),
        }
    );

    let bare = FeedCandidate::from_entry(&entries[1]).unwrap();
    assert_eq!(bare.identifier, "42");
    assert_eq!(bare.category, "Unknown");
    assert_eq!(bare.link, "");
}

#[test]
fn garbage_document_is_a_parse_error() {
    let err = parse_entries(b"this is not a feed").unwrap_err();
    assert!(matches!(err, FeedError::Parse(_)));
}

#[tokio::test]
async fn http_source_fetches_and_parses() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rss/KEY123"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(RSS, "application/rss+xml"))
        .mount(&server)
        .await;

    let source = HttpFeedSource::new(
        format!("{}/rss/KEY123", server.uri()),
        Arc::new(ReqwestFetcher::default()),
    );
    let entries = source.fetch_entries().await.unwrap();
    let ids: Vec<_> = entries
        .iter()
        .filter_map(FeedCandidate::from_entry)
        .map(|c| c.identifier)
        .collect();
    assert_eq!(ids, vec!["987654", "42"]);
}

#[tokio::test]
async fn http_failure_is_a_fetch_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let source = HttpFeedSource::new(server.uri(), Arc::new(ReqwestFetcher::default()));
    let err = source.fetch_entries().await.unwrap_err();
    assert!(matches!(err, FeedError::Fetch(_)));
}
