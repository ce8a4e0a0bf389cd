#![allow(clippy::unwrap_used)]
// Integration tests for the media-service clients using wiremock.

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use homedash_api::overseerr::OverseerrClient;
use homedash_api::radarr::RadarrClient;
use homedash_api::sonarr::SonarrClient;
use homedash_api::Error;

// ── Overseerr ───────────────────────────────────────────────────────

#[tokio::test]
async fn overseerr_lists_requests() {
    let server = MockServer::start().await;

    let body = json!({
        "pageInfo": { "pages": 1, "results": 2 },
        "results": [
            {
                "id": 10,
                "status": 2,
                "createdAt": "2024-05-01T10:00:00.000Z",
                "media": { "id": 1, "mediaType": "movie", "status": 5, "tmdbId": 603 },
                "requestedBy": { "displayName": "alice" }
            },
            {
                "id": 11,
                "status": 1,
                "media": { "id": 2, "mediaType": "tv", "status": 2, "tvdbId": 81189 }
            }
        ]
    });

    Mock::given(method("GET"))
        .and(path("/api/v1/request"))
        .and(query_param("filter", "all"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = OverseerrClient::with_client(reqwest::Client::new(), &server.uri()).unwrap();
    let requests = client.list_requests(20).await.unwrap();

    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].status, 2);
    assert_eq!(requests[0].media.status, 5);
    assert_eq!(
        requests[0].requested_by.as_ref().unwrap().display_name.as_deref(),
        Some("alice")
    );
    assert_eq!(requests[1].media.media_type.as_deref(), Some("tv"));
}

#[tokio::test]
async fn overseerr_unauthorized_maps_to_auth_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/request"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let client = OverseerrClient::with_client(reqwest::Client::new(), &server.uri()).unwrap();
    let result = client.list_requests(20).await;

    assert!(
        matches!(result, Err(Error::Auth { .. })),
        "expected Auth error, got: {result:?}"
    );
}

// ── Radarr ──────────────────────────────────────────────────────────

#[tokio::test]
async fn radarr_lists_movies() {
    let server = MockServer::start().await;

    let body = json!([
        {
            "id": 1,
            "title": "The Matrix",
            "year": 1999,
            "added": "2024-05-01T10:00:00Z",
            "hasFile": true,
            "monitored": true,
            "images": [
                { "coverType": "poster", "remoteUrl": "https://img.example/matrix.jpg" }
            ]
        },
        { "id": 2, "title": "Unreleased", "monitored": true, "hasFile": false }
    ]);

    Mock::given(method("GET"))
        .and(path("/api/v3/movie"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = RadarrClient::with_client(reqwest::Client::new(), &server.uri()).unwrap();
    let movies = client.list_movies().await.unwrap();

    assert_eq!(movies.len(), 2);
    assert!(movies[0].has_file);
    assert_eq!(
        movies[0].images[0].resolve(client.base_url()).as_deref(),
        Some("https://img.example/matrix.jpg")
    );
    assert!(!movies[1].has_file);
}

#[tokio::test]
async fn radarr_http_error_surfaces_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v3/movie"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = RadarrClient::with_client(reqwest::Client::new(), &server.uri()).unwrap();
    let result = client.list_movies().await;

    match result {
        Err(Error::Http { status, .. }) => assert_eq!(status, 503),
        other => panic!("expected Http error, got: {other:?}"),
    }
}

// ── Sonarr ──────────────────────────────────────────────────────────

#[tokio::test]
async fn sonarr_fetches_all_three_endpoints() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v3/series"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 5, "title": "Dark", "year": 2017, "monitored": true, "images": [] }
        ])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v3/history"))
        .and(query_param("sortDirection", "descending"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "records": [
                {
                    "id": 100, "seriesId": 5, "episodeId": 50,
                    "eventType": "downloadFolderImported",
                    "date": "2024-05-02T08:00:00Z",
                    "episode": { "id": 50, "seriesId": 5, "seasonNumber": 2, "episodeNumber": 5, "title": "Endings" }
                }
            ]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v3/wanted/missing"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "records": [
                { "id": 51, "seriesId": 5, "seasonNumber": 3, "episodeNumber": 1, "airDateUtc": "2024-06-01T20:00:00Z" }
            ]
        })))
        .mount(&server)
        .await;

    let client = SonarrClient::with_client(reqwest::Client::new(), &server.uri()).unwrap();

    let series = client.list_series().await.unwrap();
    assert_eq!(series[0].title, "Dark");

    let history = client.history(50).await.unwrap();
    assert_eq!(history[0].episode.as_ref().unwrap().season_number, 2);

    let wanted = client.wanted_missing(50).await.unwrap();
    assert_eq!(wanted[0].episode_number, 1);
}

#[tokio::test]
async fn sonarr_malformed_json_is_a_parse_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v3/series"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = SonarrClient::with_client(reqwest::Client::new(), &server.uri()).unwrap();
    let result = client.list_series().await;

    assert!(
        matches!(result, Err(Error::Parse { .. })),
        "expected Parse error, got: {result:?}"
    );
}
