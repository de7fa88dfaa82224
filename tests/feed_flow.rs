//! End-to-end tests of the infinite-scroll feed against a mocked catalog.
//!
//! The controller is driven exactly the way the TUI drives it: every
//! `PageRequest` it hands out is run through `fetch_page` and the response
//! fed back through `complete`.

use cinedash::api::{ApiClient, SortField, SortOrder};
use cinedash::feed::{
    fetch_page, load_genres, Exhaustion, FeedController, PageOutcome, ScrollPosition,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::time::Duration;
use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> ApiClient {
    ApiClient::new(Url::parse(&server.uri()).unwrap(), Duration::from_secs(5)).unwrap()
}

fn page_body(ids: std::ops::Range<i64>) -> serde_json::Value {
    let movies: Vec<_> = ids
        .map(|id| {
            json!({
                "id": id,
                "name": format!("Movie {id}"),
                "director": "Director",
                "popularity": 50.0,
                "imdb_score": 7.5,
                "genre": ["Drama"],
            })
        })
        .collect();
    json!({ "movies": movies, "total_pages": 2 })
}

async fn mount_page(server: &MockServer, page: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/api/get_movies"))
        .and(query_param("page", page))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

fn ids(feed: &FeedController) -> Vec<i64> {
    feed.movies().iter().map(|m| m.id).collect()
}

/// Position that is always past any threshold.
fn at_bottom() -> ScrollPosition {
    ScrollPosition {
        offset: 0,
        viewport: 10,
        content: 0,
    }
}

#[tokio::test]
async fn test_scrolls_through_catalog_until_empty_page() {
    let server = MockServer::start().await;
    mount_page(&server, "1", page_body(0..10)).await;
    mount_page(&server, "2", page_body(10..20)).await;
    mount_page(&server, "3", json!({ "movies": [] })).await;
    let client = client_for(&server);

    let mut feed = FeedController::default();
    let mut outcomes = Vec::new();
    while let Some(request) = feed.on_scroll_near_bottom(at_bottom(), 100) {
        outcomes.push(feed.complete(fetch_page(&client, request).await));
    }

    assert_eq!(
        outcomes,
        vec![
            PageOutcome::Appended { page: 1, count: 10 },
            PageOutcome::Appended { page: 2, count: 10 },
            PageOutcome::Exhausted { page: 3 },
        ]
    );
    assert_eq!(ids(&feed), (0..20).collect::<Vec<_>>());
    assert_eq!(feed.state().current_page, 4);
    assert!(feed.state().exhausted);
    assert!(!feed.is_loading());
}

#[tokio::test]
async fn test_filter_change_discards_in_flight_page() {
    let server = MockServer::start().await;
    mount_page(&server, "1", page_body(0..10)).await;
    Mock::given(method("GET"))
        .and(path("/api/get_movies"))
        .and(query_param("page", "1"))
        .and(query_param("genre", "Comedy"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(100..103)))
        .with_priority(1)
        .mount(&server)
        .await;
    let client = client_for(&server);

    let mut feed = FeedController::default();
    let unfiltered = feed.load_next_page().unwrap();
    let comedy = feed.set_genre(Some("Comedy".into()));

    let (stale, fresh) = tokio::join!(
        fetch_page(&client, unfiltered),
        fetch_page(&client, comedy)
    );

    // The fresh response lands first, then the old one straggles in.
    assert_eq!(
        feed.complete(fresh),
        PageOutcome::Appended { page: 1, count: 3 }
    );
    assert!(matches!(feed.complete(stale), PageOutcome::Stale { .. }));
    assert_eq!(ids(&feed), vec![100, 101, 102]);
    assert_eq!(feed.state().current_page, 2);
}

#[tokio::test]
async fn test_server_error_keeps_page_for_retry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/get_movies"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"message": "db down"})))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    mount_page(&server, "1", page_body(0..5)).await;
    let client = client_for(&server);

    let mut feed = FeedController::default();
    let request = feed.load_next_page().unwrap();
    let outcome = feed.complete(fetch_page(&client, request).await);
    assert!(matches!(outcome, PageOutcome::Failed { page: 1, .. }));
    assert_eq!(feed.state().current_page, 1);
    assert!(feed.movies().is_empty());

    let retry = feed.load_next_page().unwrap();
    assert_eq!(retry.query.page, 1);
    assert_eq!(
        feed.complete(fetch_page(&client, retry).await),
        PageOutcome::Appended { page: 1, count: 5 }
    );
}

#[tokio::test]
async fn test_keep_polling_picks_up_new_movies() {
    let server = MockServer::start().await;
    mount_page(&server, "1", page_body(0..3)).await;
    Mock::given(method("GET"))
        .and(path("/api/get_movies"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "movies": [] })))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    mount_page(&server, "3", page_body(3..4)).await;
    let client = client_for(&server);

    let mut feed = FeedController::new(SortField::Name, SortOrder::Asc, Exhaustion::KeepPolling);
    for _ in 0..3 {
        let request = feed.load_next_page().unwrap();
        feed.complete(fetch_page(&client, request).await);
    }

    assert_eq!(ids(&feed), vec![0, 1, 2, 3]);
    assert!(!feed.state().exhausted);
}

#[tokio::test]
async fn test_query_carries_filters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/get_movies"))
        .and(query_param("page", "1"))
        .and(query_param("genre", ""))
        .and(query_param("sort", "popularity"))
        .and(query_param("order", "asc"))
        .and(query_param("search", "blade runner"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(0..1)))
        .expect(1)
        .mount(&server)
        .await;
    let client = client_for(&server);

    let mut feed = FeedController::default();
    feed.set_sort(SortField::Popularity);
    feed.set_order(SortOrder::Asc);
    let request = feed.submit_search("Blade Runner");

    let outcome = feed.complete(fetch_page(&client, request).await);
    assert_eq!(outcome, PageOutcome::Appended { page: 1, count: 1 });
}

#[tokio::test]
async fn test_genre_selector_from_server() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/get_genres"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "genres": ["Action", "Comedy"] })),
        )
        .mount(&server)
        .await;

    let options = load_genres(&client_for(&server)).await;
    let labels: Vec<_> = options.labels().collect();
    assert_eq!(labels, vec!["All Genres", "Action", "Comedy"]);
}

#[tokio::test]
async fn test_genre_selector_degrades_when_server_fails() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/get_genres"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let options = load_genres(&client_for(&server)).await;
    assert_eq!(options.labels().collect::<Vec<_>>(), vec!["All Genres"]);
}
