use super::controller::{PageRequest, PageResponse};
use super::genres::GenreOptions;
use crate::api::ApiClient;

/// Run a page request against the catalog.
///
/// Never fails: the outcome travels inside [`PageResponse::result`] together
/// with the generation the request was issued under.
pub async fn fetch_page(client: &ApiClient, request: PageRequest) -> PageResponse {
    let PageRequest { generation, query } = request;
    let page = query.page;
    let result = client.get_movies(&query).await.map(|p| p.movies);
    PageResponse {
        generation,
        page,
        result,
    }
}

/// Load the genre selector options.
///
/// A failure is logged and degrades to a selector holding only "All Genres".
pub async fn load_genres(client: &ApiClient) -> GenreOptions {
    match client.get_genres().await {
        Ok(genres) => {
            tracing::debug!(count = genres.len(), "Loaded genres");
            GenreOptions::from_genres(genres)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load genres");
            GenreOptions::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use crate::feed::{FeedController, PageOutcome};
    use std::time::Duration;
    use url::Url;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> ApiClient {
        ApiClient::new(Url::parse(&server.uri()).unwrap(), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_page_keeps_generation() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/get_movies"))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"movies":[]}"#))
            .mount(&server)
            .await;

        let mut feed = FeedController::default();
        let request = feed.reset_and_load();
        let generation = request.generation;

        let response = fetch_page(&client_for(&server), request).await;
        assert_eq!(response.generation, generation);
        assert_eq!(response.page, 1);
        assert!(response.result.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_server_error_reaches_controller_as_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1) // No retry
            .mount(&server)
            .await;

        let mut feed = FeedController::default();
        let request = feed.load_next_page().unwrap();
        let response = fetch_page(&client_for(&server), request).await;
        assert!(matches!(
            response.result,
            Err(ApiError::HttpStatus { status: 500, .. })
        ));

        let outcome = feed.complete(response);
        assert!(matches!(outcome, PageOutcome::Failed { page: 1, .. }));
        assert_eq!(feed.state().current_page, 1);
    }

    #[tokio::test]
    async fn test_genre_failure_degrades_to_all_genres() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/get_genres"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let options = load_genres(&client_for(&server)).await;
        assert_eq!(options, GenreOptions::default());
    }
}
