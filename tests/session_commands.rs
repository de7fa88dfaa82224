//! Integration tests for the account and admin subcommands.
//!
//! Each test gets its own session file under the system temp directory and a
//! fresh mock server.

use cinedash::api::ApiClient;
use cinedash::commands::{self, MovieCommand, MovieFields, NewMovie};
use cinedash::session::SessionStore;
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> ApiClient {
    ApiClient::new(Url::parse(&server.uri()).unwrap(), Duration::from_secs(5)).unwrap()
}

fn temp_store(name: &str) -> (PathBuf, SessionStore) {
    let dir = std::env::temp_dir().join(format!("cinedash_it_{name}"));
    std::fs::create_dir_all(&dir).unwrap();
    let store = SessionStore::new(dir.join("session.toml"));
    store.clear().unwrap();
    (dir, store)
}

fn output(buf: Vec<u8>) -> String {
    String::from_utf8(buf).unwrap()
}

#[tokio::test]
async fn test_login_then_authenticated_request_carries_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "message": "Successfully logged in.",
            "auth_token": "tok-123",
            "redirect": "/admin_dashboard",
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/movie_logs"))
        .and(header("cookie", "auth_token=tok-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "logs": [{
                "id": 1,
                "movie_id": 12,
                "movie_name": "Stalker",
                "action": "ADDED",
                "timestamp": "2024-03-01 12:00:00",
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (dir, store) = temp_store("login");
    let client = client_for(&server);
    let mut out = Vec::new();
    commands::login(
        &client,
        &store,
        "ann@example.com",
        &SecretString::from("pw"),
        &mut out,
    )
    .await
    .unwrap();
    assert_eq!(output(out), "Logged in as ann@example.com\n");

    let session = store.load().unwrap().unwrap();
    assert_eq!(session.token.expose_secret(), "tok-123");
    assert_eq!(session.email.as_deref(), Some("ann@example.com"));

    // A later invocation builds its client from the stored session
    let client = client_for(&server).with_token(session.token);
    let mut out = Vec::new();
    commands::logs(&client, &mut out).await.unwrap();
    let text = output(out);
    assert!(text.starts_with("TIME"));
    assert!(text.contains("ADDED"));
    assert!(text.contains("Stalker"));

    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn test_failed_login_stores_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"status": "fail", "message": "Incorrect password."})),
        )
        .mount(&server)
        .await;

    let (dir, store) = temp_store("failed_login");
    let mut out = Vec::new();
    let err = commands::login(
        &client_for(&server),
        &store,
        "ann@example.com",
        &SecretString::from("wrong"),
        &mut out,
    )
    .await
    .unwrap_err();

    assert!(format!("{err:#}").contains("Login failed"));
    assert!(store.load().unwrap().is_none());
    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn test_logout_clears_session_even_if_server_fails() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/logout"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let (dir, store) = temp_store("logout");
    store
        .save(&cinedash::session::Session {
            email: None,
            token: SecretString::from("tok"),
        })
        .unwrap();

    let client = client_for(&server).with_token(SecretString::from("tok"));
    let mut out = Vec::new();
    commands::logout(&client, &store, &mut out).await.unwrap();

    assert!(store.load().unwrap().is_none());
    assert!(output(out).starts_with("Local session removed"));
    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn test_admin_commands_require_login() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/movies"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let add = MovieCommand::Add(NewMovie {
        name: "Solaris".into(),
        director: "Andrei Tarkovsky".into(),
        popularity: 70.0,
        imdb_score: 8.0,
        genres: vec!["Drama".into()],
    });
    let mut out = Vec::new();
    let err = commands::movie(&client_for(&server), add, &mut out)
        .await
        .unwrap_err();
    assert!(format!("{err:#}").contains("cinedash login"));
}

#[tokio::test]
async fn test_add_movie_sends_genre_list() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/movies"))
        .and(body_string_contains(r#""genre":["Drama","Sci-fi"]"#))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({"message": "Movie added successfully"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).with_token(SecretString::from("tok"));
    let add = MovieCommand::Add(NewMovie {
        name: "Solaris".into(),
        director: "Andrei Tarkovsky".into(),
        popularity: 70.0,
        imdb_score: 8.0,
        genres: vec!["drama".into(), " SCI-FI ".into(), " ".into()],
    });
    let mut out = Vec::new();
    commands::movie(&client, add, &mut out).await.unwrap();
    assert_eq!(output(out), "Movie added successfully\n");
}

#[tokio::test]
async fn test_show_requires_login() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/movies/5"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut out = Vec::new();
    let err = commands::movie(&client_for(&server), MovieCommand::Show { id: 5 }, &mut out)
        .await
        .unwrap_err();
    assert!(format!("{err:#}").contains("cinedash login"));
}

#[tokio::test]
async fn test_update_resends_current_genres() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/movies/5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 5,
            "name": "Heat",
            "director": "Michael Mann",
            "popularity": 82.0,
            "imdb_score": 8.3,
            "genre": ["Crime", "Drama"],
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/movies/5"))
        .and(body_string_contains(r#""imdb_score":8.0"#))
        .and(body_string_contains(r#""name":"Heat""#))
        .and(body_string_contains(r#""genre":["Crime","Drama"]"#))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"message": "Movie updated successfully"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).with_token(SecretString::from("tok"));
    let update = MovieCommand::Update {
        id: 5,
        fields: MovieFields {
            name: None,
            director: None,
            popularity: None,
            imdb_score: Some(8.0),
            genres: vec![],
        },
    };
    let mut out = Vec::new();
    commands::movie(&client, update, &mut out).await.unwrap();
    assert_eq!(output(out), "Movie updated successfully\n");
}

#[tokio::test]
async fn test_update_without_fields_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/movies/5"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server).with_token(SecretString::from("tok"));
    let update = MovieCommand::Update {
        id: 5,
        fields: MovieFields {
            name: None,
            director: None,
            popularity: None,
            imdb_score: None,
            genres: vec![],
        },
    };
    let mut out = Vec::new();
    let err = commands::movie(&client, update, &mut out)
        .await
        .unwrap_err();
    assert!(err.to_string().starts_with("Nothing to update"));
}

#[tokio::test]
async fn test_genres_lists_non_blank_names() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/get_genres"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"genres": ["Action", " ", "Western"]})),
        )
        .mount(&server)
        .await;

    let mut out = Vec::new();
    commands::genres(&client_for(&server), &mut out).await.unwrap();
    assert_eq!(output(out), "Action\nWestern\n");
}
