//! Integration tests for the X search session against a mock HTTP server.

use std::sync::Arc;

use chrono::{TimeDelta, TimeZone, Utc};
use reqwest::Url;
use reqwest::cookie::Jar;
use serde_json::{Value, json};
use wiremock::matchers::{header, method, path, query_param_contains};
use wiremock::{Mock, MockServer, ResponseTemplate};

use tweetgrab_core::{FetchError, PageCursor, SearchMode, SessionProvider, XSession};

const SEARCH_PATH: &str = "/i/api/graphql/nK1dw4oV3k4w5TdtcAdSww/SearchTimeline";

fn session_for(server: &MockServer) -> XSession {
    let base = Url::parse(&server.uri()).unwrap();
    XSession::with_base_url(Arc::new(Jar::default()), Some("csrf-value-123"), base)
}

fn tweet_entry(name: &str, text: &str) -> Value {
    json!({
        "entryId": format!("tweet-{name}"),
        "content": {
            "entryType": "TimelineTimelineItem",
            "itemContent": {
                "itemType": "TimelineTweet",
                "tweet_results": {
                    "result": {
                        "__typename": "Tweet",
                        "core": {
                            "user_results": {
                                "result": { "legacy": { "name": name } }
                            }
                        },
                        "legacy": {
                            "full_text": text,
                            "created_at": "Tue Dec 10 18:11:02 +0000 2024",
                            "retweet_count": 5,
                            "favorite_count": 42
                        }
                    }
                }
            }
        }
    })
}

fn cursor_entry(value: &str) -> Value {
    json!({
        "entryId": format!("cursor-bottom-{value}"),
        "content": {
            "entryType": "TimelineTimelineCursor",
            "cursorType": "Bottom",
            "value": value
        }
    })
}

fn timeline_body(entries: Vec<Value>) -> Value {
    json!({
        "data": {
            "search_by_raw_query": {
                "search_timeline": {
                    "timeline": {
                        "instructions": [
                            { "type": "TimelineAddEntries", "entries": entries }
                        ]
                    }
                }
            }
        }
    })
}

#[tokio::test]
async fn test_initial_page_decodes_tweets_and_cursor() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(timeline_body(vec![
            tweet_entry("Alice", "hello world"),
            tweet_entry("Bob", "second tweet"),
            cursor_entry("scroll:abc"),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let session = session_for(&server);
    let page = session.initial_page("rustlang", SearchMode::Top).await.unwrap();

    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items[0].author, "Alice");
    assert_eq!(page.items[0].text, "hello world");
    assert_eq!(
        page.items[0].created_at,
        Utc.with_ymd_and_hms(2024, 12, 10, 18, 11, 2).unwrap()
    );
    assert_eq!(page.next, Some(PageCursor::new("scroll:abc")));
}

#[tokio::test]
async fn test_initial_page_sends_query_and_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(header("x-csrf-token", "csrf-value-123"))
        .and(query_param_contains("variables", "rocket launch"))
        .and(query_param_contains("variables", "\"product\":\"Latest\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(timeline_body(vec![])))
        .expect(1)
        .mount(&server)
        .await;

    let session = session_for(&server);
    let page = session
        .initial_page("rocket launch", SearchMode::Latest)
        .await
        .unwrap();
    assert!(page.items.is_empty());
}

#[tokio::test]
async fn test_next_page_resends_query_with_cursor() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(timeline_body(vec![
            tweet_entry("Alice", "first page"),
            cursor_entry("scroll:page2"),
        ])))
        .expect(1)
        .up_to_n_times(1)
        .mount(&server)
        .await;

    let session = session_for(&server);
    let first = session.initial_page("rustlang", SearchMode::Top).await.unwrap();
    let cursor = first.next.unwrap();

    // The continuation request carries both the cursor and the original query.
    server.reset().await;
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param_contains("variables", "\"cursor\":\"scroll:page2\""))
        .and(query_param_contains("variables", "rustlang"))
        .respond_with(ResponseTemplate::new(200).set_body_json(timeline_body(vec![
            tweet_entry("Bob", "second page"),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let second = session.next_page(&cursor).await.unwrap();
    assert_eq!(second.items.len(), 1);
    assert_eq!(second.items[0].author, "Bob");
    assert_eq!(second.next, None);
}

#[tokio::test]
async fn test_next_page_without_initial_search_fails() {
    let server = MockServer::start().await;
    let session = session_for(&server);

    let result = session.next_page(&PageCursor::new("scroll:orphan")).await;
    assert!(matches!(result, Err(FetchError::NoActiveSearch)));
}

#[tokio::test]
async fn test_429_maps_to_rate_limited_with_reset_header() {
    let server = MockServer::start().await;
    let reset_epoch = (Utc::now() + TimeDelta::seconds(900)).timestamp();
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("x-rate-limit-reset", reset_epoch.to_string().as_str()),
        )
        .mount(&server)
        .await;

    let session = session_for(&server);
    let result = session.initial_page("rustlang", SearchMode::Top).await;

    match result {
        Err(FetchError::RateLimited { retry_at }) => {
            assert_eq!(retry_at.timestamp(), reset_epoch);
        }
        other => panic!("expected rate limited, got {other:?}"),
    }
}

#[tokio::test]
async fn test_429_without_reset_header_still_rate_limited() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let session = session_for(&server);
    let result = session.initial_page("rustlang", SearchMode::Top).await;

    match result {
        Err(FetchError::RateLimited { retry_at }) => {
            // Fallback window from now when the header is absent.
            let wait = retry_at - Utc::now();
            assert!(wait > TimeDelta::seconds(50) && wait <= TimeDelta::seconds(60));
        }
        other => panic!("expected rate limited, got {other:?}"),
    }
}

#[tokio::test]
async fn test_server_error_maps_to_http_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let session = session_for(&server);
    let result = session.initial_page("rustlang", SearchMode::Top).await;

    match result {
        Err(FetchError::HttpStatus { status, .. }) => assert_eq!(status, 503),
        other => panic!("expected http status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_non_json_body_maps_to_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let session = session_for(&server);
    let result = session.initial_page("rustlang", SearchMode::Top).await;
    assert!(matches!(result, Err(FetchError::Decode { .. })));
}

#[tokio::test]
async fn test_missing_timeline_maps_to_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": {} })))
        .mount(&server)
        .await;

    let session = session_for(&server);
    let result = session.initial_page("rustlang", SearchMode::Top).await;
    assert!(matches!(result, Err(FetchError::Decode { .. })));
}
