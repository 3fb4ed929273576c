use nasdrop_engine::{DelugeClient, DelugeSettings, GatewayError, MagnetGateway};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MAGNET: &str = "magnet:?xt=urn:btih:0123456789abcdef0123456789abcdef01234567";

fn settings_for(server: &MockServer, download_path: &str) -> DelugeSettings {
    DelugeSettings {
        url: format!("{}/json", server.uri()),
        password: "deluge".to_string(),
        download_path: download_path.to_string(),
        ..DelugeSettings::default()
    }
}

async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/json"))
        .and(body_partial_json(json!({ "method": "auth.login", "params": ["deluge"] })))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Set-Cookie", "_session_id=abc123; Expires=Tue, 01 Jan 2030 00:00:00 GMT; Path=/json")
                .set_body_json(json!({ "result": true, "error": null, "id": 1 })),
        )
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn magnet_is_added_with_session_cookie() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("POST"))
        .and(path("/json"))
        .and(header("cookie", "_session_id=abc123"))
        .and(body_partial_json(json!({
            "method": "core.add_torrent_magnet",
            "params": [MAGNET, { "download_location": "/volume1/torrents" }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": "0123456789abcdef0123456789abcdef01234567",
            "error": null,
            "id": 1
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = DelugeClient::new(settings_for(&server, "/volume1/torrents")).expect("client");
    let torrent_id = client.add_magnet(MAGNET).await.expect("magnet added");

    assert_eq!(torrent_id, "0123456789abcdef0123456789abcdef01234567");
}

#[tokio::test]
async fn refused_login_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "result": false, "error": null, "id": 1 })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = DelugeClient::new(settings_for(&server, "")).expect("client");
    let err = client.add_magnet(MAGNET).await.unwrap_err();

    assert_eq!(
        err,
        GatewayError::Rejected {
            api: "auth.login".to_string(),
            message: "login refused".to_string()
        }
    );
}

#[tokio::test]
async fn rpc_error_message_is_surfaced() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("POST"))
        .and(path("/json"))
        .and(body_partial_json(json!({ "method": "core.add_torrent_magnet" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": null,
            "error": { "message": "Torrent already in session", "code": 4 },
            "id": 1
        })))
        .mount(&server)
        .await;

    let client = DelugeClient::new(settings_for(&server, "")).expect("client");
    let err = client.add_magnet(MAGNET).await.unwrap_err();

    assert_eq!(
        err,
        GatewayError::Rejected {
            api: "core.add_torrent_magnet".to_string(),
            message: "Torrent already in session".to_string()
        }
    );
}
