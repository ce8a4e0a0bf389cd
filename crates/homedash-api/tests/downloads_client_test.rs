#![allow(clippy::unwrap_used)]
// Integration tests for the four download clients using wiremock.

use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use homedash_api::downloads::{
    DelugeClient, QbittorrentClient, SabnzbdClient, TransmissionClient,
};
use homedash_api::Error;

fn cookie_client() -> reqwest::Client {
    reqwest::Client::builder().cookie_store(true).build().unwrap()
}

// ── qBittorrent ─────────────────────────────────────────────────────

#[tokio::test]
async fn qbittorrent_login_then_list() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v2/auth/login"))
        .and(body_string_contains("username=admin"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Set-Cookie", "SID=abc123; path=/")
                .set_body_string("Ok."),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v2/torrents/info"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "hash": "deadbeef",
                "name": "ubuntu.iso",
                "progress": 0.42,
                "size": 1_000_000_000_i64,
                "downloaded": 420_000_000_i64,
                "dlspeed": 1_048_576,
                "upspeed": 0,
                "eta": 553,
                "state": "downloading",
                "ratio": 0.1
            }
        ])))
        .mount(&server)
        .await;

    let client = QbittorrentClient::with_client(cookie_client(), &server.uri()).unwrap();
    client
        .login("admin", &SecretString::from("secret"))
        .await
        .unwrap();

    let torrents = client.list_torrents().await.unwrap();
    assert_eq!(torrents.len(), 1);
    assert_eq!(torrents[0].state, "downloading");
    assert!((torrents[0].progress - 0.42).abs() < f64::EPSILON);
}

#[tokio::test]
async fn qbittorrent_rejected_login_is_auth_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v2/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Fails."))
        .mount(&server)
        .await;

    let client = QbittorrentClient::with_client(cookie_client(), &server.uri()).unwrap();
    let result = client.login("admin", &SecretString::from("wrong")).await;

    assert!(
        matches!(result, Err(Error::Auth { .. })),
        "expected Auth error, got: {result:?}"
    );
}

// ── Deluge ──────────────────────────────────────────────────────────

#[tokio::test]
async fn deluge_login_and_update_ui() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/json"))
        .and(body_string_contains("auth.login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": true, "error": null, "id": 1
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/json"))
        .and(body_string_contains("web.update_ui"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": {
                "torrents": {
                    "cafebabe": {
                        "name": "debian.iso",
                        "progress": 73.5,
                        "total_size": 2_000_000_000_i64,
                        "total_done": 1_470_000_000_i64,
                        "download_payload_rate": 524_288,
                        "upload_payload_rate": 0,
                        "eta": 1010.0,
                        "state": "Downloading",
                        "ratio": 0.0
                    }
                }
            },
            "error": null,
            "id": 2
        })))
        .mount(&server)
        .await;

    let client = DelugeClient::with_client(cookie_client(), &server.uri()).unwrap();
    client.login(&SecretString::from("deluge")).await.unwrap();

    let ui = client.update_ui().await.unwrap();
    let torrents = ui.torrents.unwrap();
    assert_eq!(torrents["cafebabe"].state, "Downloading");
}

#[tokio::test]
async fn deluge_wrong_password_is_auth_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": false, "error": null, "id": 1
        })))
        .mount(&server)
        .await;

    let client = DelugeClient::with_client(cookie_client(), &server.uri()).unwrap();
    let result = client.login(&SecretString::from("wrong")).await;

    assert!(
        matches!(result, Err(Error::Auth { .. })),
        "expected Auth error, got: {result:?}"
    );
}

#[tokio::test]
async fn deluge_rpc_error_mentioning_auth_maps_to_auth() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": null,
            "error": { "message": "Not authenticated", "code": 1 },
            "id": 1
        })))
        .mount(&server)
        .await;

    let client = DelugeClient::with_client(cookie_client(), &server.uri()).unwrap();
    let result = client.update_ui().await;

    assert!(
        matches!(result, Err(Error::Auth { .. })),
        "expected Auth error, got: {result:?}"
    );
}

// ── SABnzbd ─────────────────────────────────────────────────────────

#[tokio::test]
async fn sabnzbd_queue_parses_stringly_numbers() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api"))
        .and(query_param("mode", "queue"))
        .and(query_param("apikey", "sab-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "queue": {
                "status": "Downloading",
                "kbpersec": "2048.00",
                "slots": [
                    {
                        "nzo_id": "SABnzbd_nzo_1",
                        "filename": "linux-distro",
                        "percentage": "42",
                        "mb": "1000.00",
                        "mbleft": "580.00",
                        "status": "Downloading",
                        "timeleft": "0:04:50"
                    }
                ]
            }
        })))
        .mount(&server)
        .await;

    let client = SabnzbdClient::with_client(
        reqwest::Client::new(),
        &server.uri(),
        SecretString::from("sab-key"),
    )
    .unwrap();
    let queue = client.queue().await.unwrap();

    assert_eq!(queue.kbpersec.as_deref(), Some("2048.00"));
    assert_eq!(queue.slots[0].percentage.as_deref(), Some("42"));
}

#[tokio::test]
async fn sabnzbd_bad_api_key_is_auth_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(r#"{"status":false,"error":"API Key Incorrect"}"#),
        )
        .mount(&server)
        .await;

    let client = SabnzbdClient::with_client(
        reqwest::Client::new(),
        &server.uri(),
        SecretString::from("bad"),
    )
    .unwrap();
    let result = client.queue().await;

    assert!(
        matches!(result, Err(Error::Auth { .. })),
        "expected Auth error, got: {result:?}"
    );
}

// ── Transmission ────────────────────────────────────────────────────

#[tokio::test]
async fn transmission_negotiates_session_id_on_409() {
    let server = MockServer::start().await;

    let torrents = json!({
        "result": "success",
        "arguments": {
            "torrents": [
                {
                    "id": 7,
                    "name": "arch.iso",
                    "percentDone": 1.0,
                    "totalSize": 800_000_000_i64,
                    "downloadedEver": 800_000_000_i64,
                    "rateDownload": 0,
                    "rateUpload": 65536,
                    "eta": -1,
                    "status": 6,
                    "uploadRatio": 1.8,
                    "errorString": ""
                }
            ]
        }
    });

    // First call has no session header and gets a 409 carrying the id.
    Mock::given(method("POST"))
        .and(path("/transmission/rpc"))
        .respond_with(
            ResponseTemplate::new(409).insert_header("X-Transmission-Session-Id", "sess-42"),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/transmission/rpc"))
        .and(wiremock::matchers::header("X-Transmission-Session-Id", "sess-42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&torrents))
        .mount(&server)
        .await;

    let client = TransmissionClient::with_client(reqwest::Client::new(), &server.uri()).unwrap();
    let list = client.torrent_get().await.unwrap();

    assert_eq!(list.len(), 1);
    assert_eq!(list[0].status, homedash_api::downloads::transmission::STATUS_SEED);
}

#[tokio::test]
async fn transmission_persistent_409_is_auth_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/transmission/rpc"))
        .respond_with(ResponseTemplate::new(409))
        .mount(&server)
        .await;

    let client = TransmissionClient::with_client(reqwest::Client::new(), &server.uri()).unwrap();
    let result = client.torrent_get().await;

    assert!(
        matches!(result, Err(Error::Auth { .. })),
        "expected Auth error, got: {result:?}"
    );
}
