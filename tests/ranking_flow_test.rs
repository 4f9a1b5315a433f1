use anyhow::Result;
use httpmock::prelude::*;
use serde_json::json;
use std::time::Duration;
use swiftmatch_client::core::{RankingController, Route, ViewState};
use swiftmatch_client::{ApiClient, AuthContext, ClientError, CollectionId, HttpRankingSource};
use tokio_test::{assert_err, assert_ok};

fn build_controller(server: &MockServer, auth: &AuthContext) -> Result<RankingController<HttpRankingSource>> {
    let api = ApiClient::new(&server.base_url(), Duration::from_secs(5), "swiftmatch-test")?;
    let source = HttpRankingSource::new(api, auth.clone());
    Ok(RankingController::new(source, CollectionId(1)))
}

fn tracks_body() -> serde_json::Value {
    // Out of order on purpose: the first load sorts by track number.
    json!([
        {"id": 12, "title": "Picture to Burn", "track_number": 3, "album": 1},
        {"id": 10, "title": "Tim McGraw", "track_number": 1, "album": 1},
        {"id": 13, "title": "A Place in This World", "track_number": 4, "album": 1},
        {"id": 11, "title": "Teardrops on My Guitar", "track_number": 2, "album": 1}
    ])
}

#[tokio::test]
async fn test_load_drag_and_save() -> Result<()> {
    let server = MockServer::start();
    let load_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/api/tracks/album/1/")
            .header("Authorization", "Bearer tok-1");
        then.status(200).json_body(tracks_body());
    });
    let save_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/api/rankings/tracks/1/")
            .header("Authorization", "Bearer tok-1")
            .header("Content-Type", "application/json")
            .json_body(json!({
                "album_id": 1,
                "rankings": [
                    {"track_id": 11, "position": 1},
                    {"track_id": 12, "position": 2},
                    {"track_id": 10, "position": 3},
                    {"track_id": 13, "position": 4}
                ]
            }));
        then.status(201).json_body(json!({"detail": "saved"}));
    });

    let auth = AuthContext::issue("tok-1");
    let mut controller = build_controller(&server, &auth)?;

    assert_ok!(controller.load().await);
    let titles: Vec<&str> = controller.items().iter().map(|i| i.title.as_str()).collect();
    assert_eq!(
        titles,
        vec!["Tim McGraw", "Teardrops on My Guitar", "Picture to Burn", "A Place in This World"]
    );

    controller.begin_drag(0);
    controller.update_drag_target(1);
    assert_eq!(controller.drag().indicator(), Some(1));
    controller.update_drag_target(2);
    controller.commit_drag();

    let route = controller.save().await?;
    assert_eq!(route, Route::Catalog);
    assert_eq!(controller.state(), &ViewState::Saved);
    assert!(controller.items().is_empty());

    load_mock.assert();
    save_mock.assert();
    Ok(())
}

#[tokio::test]
async fn test_load_server_error_disables_save() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/tracks/album/1/");
        then.status(500).body("Internal Server Error");
    });
    let save_mock = server.mock(|when, then| {
        when.method(POST).path("/api/rankings/tracks/1/");
        then.status(201);
    });

    let auth = AuthContext::issue("tok");
    let mut controller = build_controller(&server, &auth)?;

    let err = assert_err!(controller.load().await);
    assert!(matches!(err, ClientError::FetchError { status: Some(500), .. }));
    assert!(matches!(controller.state(), ViewState::LoadFailed { .. }));
    assert!(controller.items().is_empty());
    assert!(!controller.can_save());

    let err = assert_err!(controller.save().await);
    assert!(matches!(err, ClientError::SaveDisabled { .. }));
    save_mock.assert_hits(0);
    Ok(())
}

#[tokio::test]
async fn test_load_not_found_and_malformed_body() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/tracks/album/1/");
        then.status(404).json_body(json!({"detail": "Not found."}));
    });
    let auth = AuthContext::issue("tok");
    let mut controller = build_controller(&server, &auth)?;
    let err = assert_err!(controller.load().await);
    assert!(err.to_string().contains("album not found"));

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/tracks/album/1/");
        then.status(200).json_body(json!({"tracks": "not a list"}));
    });
    let mut controller = build_controller(&server, &auth)?;
    let err = assert_err!(controller.load().await);
    assert!(matches!(err, ClientError::MalformedResponse { .. }));
    assert!(matches!(controller.state(), ViewState::LoadFailed { .. }));
    Ok(())
}

#[tokio::test]
async fn test_save_unauthorized_keeps_order_and_redirects() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/tracks/album/1/");
        then.status(200).json_body(tracks_body());
    });
    server.mock(|when, then| {
        when.method(POST).path("/api/rankings/tracks/1/");
        then.status(401).json_body(json!({"detail": "Given token not valid for any token type"}));
    });

    let auth = AuthContext::issue("expired");
    let mut controller = build_controller(&server, &auth)?;
    controller.load().await?;
    controller.begin_drag(3);
    controller.update_drag_target(0);
    controller.commit_drag();
    let before: Vec<i64> = controller.list().ids();

    let err = assert_err!(controller.save().await);
    assert!(matches!(err, ClientError::AuthExpired));
    assert_eq!(controller.list().ids(), before);
    assert_eq!(controller.state(), &ViewState::ReauthRequired);
    assert_eq!(controller.redirect(), Some(Route::Login));
    assert!(!auth.is_valid());
    Ok(())
}

#[tokio::test]
async fn test_save_rejected_then_retried() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/tracks/album/1/");
        then.status(200).json_body(tracks_body());
    });
    let mut rejected = server.mock(|when, then| {
        when.method(POST).path("/api/rankings/tracks/1/");
        then.status(400)
            .json_body(json!({"errors": {"rankings": ["duplicate position"]}}));
    });

    let auth = AuthContext::issue("tok");
    let mut controller = build_controller(&server, &auth)?;
    controller.load().await?;

    let err = assert_err!(controller.save().await);
    assert!(matches!(err, ClientError::PersistenceError { status: Some(400), .. }));
    assert!(err.is_recoverable());
    assert_eq!(controller.state(), &ViewState::Ready);
    assert_eq!(controller.items().len(), 4);
    let inline = controller.inline_error().unwrap_or_default();
    assert!(inline.contains("duplicate position"), "inline error was {}", inline);

    rejected.delete();
    let accepted = server.mock(|when, then| {
        when.method(POST).path("/api/rankings/tracks/1/");
        then.status(200).json_body(json!({}));
    });

    assert_eq!(controller.save().await?, Route::Catalog);
    assert!(controller.inline_error().is_none());
    accepted.assert();
    Ok(())
}

#[tokio::test]
async fn test_invalidated_session_is_not_sent() -> Result<()> {
    let server = MockServer::start();
    let load_mock = server.mock(|when, then| {
        when.method(GET).path("/api/tracks/album/1/");
        then.status(200).json_body(tracks_body());
    });

    let auth = AuthContext::issue("tok");
    auth.invalidate();
    let mut controller = build_controller(&server, &auth)?;

    let err = assert_err!(controller.load().await);
    assert!(matches!(err, ClientError::NotAuthenticated));
    assert_eq!(controller.state(), &ViewState::ReauthRequired);
    load_mock.assert_hits(0);
    Ok(())
}
