use base64::engine::general_purpose;
use base64::Engine;
use reqwest::header::WWW_AUTHENTICATE;
use snippet_manager::configuration::AuthScheme;

use crate::helpers::sample_snippet;
use crate::helpers::spawn_app_with_scheme;

#[tokio::test]
async fn missing_header_gets_a_challenge() {
    let app = spawn_app_with_scheme(AuthScheme::Basic).await;

    let resp = app.post_snippet(&sample_snippet(), None).await;
    assert_eq!(resp.status().as_u16(), 401);

    // the challenge header is mandatory here, it is what makes clients prompt
    // for credentials
    let challenge = resp
        .headers()
        .get(WWW_AUTHENTICATE)
        .expect("WWW-Authenticate present")
        .to_str()
        .unwrap();
    assert_eq!(challenge, r#"Basic realm="snippet-manager""#);

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Authentication required");
    assert_eq!(app.snippet_count().await, 0);
}

#[tokio::test]
async fn malformed_headers_collapse_into_one_response() {
    let app = spawn_app_with_scheme(AuthScheme::Basic).await;

    for (header, msg) in [
        ("Basic".to_string(), "scheme without payload"),
        ("Basic %%%not-base64%%%".to_string(), "payload is not base64"),
        (
            format!("Basic {}", general_purpose::STANDARD.encode("no-separator")),
            "decoded payload lacks a ':'",
        ),
        (
            format!("Bearer {}", general_purpose::STANDARD.encode("a:b")),
            "scheme is not Basic",
        ),
    ] {
        let resp = app
            .post_snippet_with_authorization(&sample_snippet(), &header)
            .await;
        assert_eq!(resp.status().as_u16(), 401, "{msg}");
        assert!(
            resp.headers().get(WWW_AUTHENTICATE).is_some(),
            "challenge expected: {msg}"
        );
        let body: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(body["error"], "Invalid authorization header", "{msg}");
    }

    assert_eq!(app.snippet_count().await, 0);
}

#[tokio::test]
async fn wrong_password_is_invalid_credentials_without_challenge() {
    let app = spawn_app_with_scheme(AuthScheme::Basic).await;

    let resp = app
        .post_snippet_basic(&sample_snippet(), &app.test_user.username, "wrongpass")
        .await;
    assert_eq!(resp.status().as_u16(), 401);
    // the header format itself was valid, so no challenge on this branch
    assert!(resp.headers().get(WWW_AUTHENTICATE).is_none());

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Invalid credentials");
    assert_eq!(app.snippet_count().await, 0);
}

#[tokio::test]
async fn unknown_username_is_indistinguishable_from_wrong_password() {
    let app = spawn_app_with_scheme(AuthScheme::Basic).await;

    let wrong_password = app
        .post_snippet_basic(&sample_snippet(), &app.test_user.username, "wrongpass")
        .await;
    let unknown_user = app
        .post_snippet_basic(&sample_snippet(), "no-such-user", "wrongpass")
        .await;

    assert_eq!(wrong_password.status(), unknown_user.status());
    let body_a = wrong_password.text().await.unwrap();
    let body_b = unknown_user.text().await.unwrap();
    assert_eq!(body_a, body_b);
}

#[tokio::test]
async fn valid_credentials_create() {
    let app = spawn_app_with_scheme(AuthScheme::Basic).await;

    let resp = app
        .post_snippet_basic(
            &sample_snippet(),
            &app.test_user.username,
            &app.test_user.password,
        )
        .await;
    assert_eq!(resp.status().as_u16(), 201);
    assert_eq!(app.snippet_count().await, 1);
}

#[tokio::test]
async fn passwords_may_contain_colons() {
    let app = spawn_app_with_scheme(AuthScheme::Basic).await;

    // base64("user:pass:word") -- everything after the first ':' is password
    let resp = app
        .post_snippet_basic(&sample_snippet(), &app.test_user.username, "pass:word")
        .await;
    // wrong password, but parsed as credentials (not as a malformed header)
    assert_eq!(resp.status().as_u16(), 401);
    assert!(resp.headers().get(WWW_AUTHENTICATE).is_none());
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Invalid credentials");
}

#[tokio::test]
async fn deactivated_user_is_rejected() {
    let app = spawn_app_with_scheme(AuthScheme::Basic).await;

    app.test_user.deactivate(&app.pool).await;

    let resp = app
        .post_snippet_basic(
            &sample_snippet(),
            &app.test_user.username,
            &app.test_user.password,
        )
        .await;
    assert_eq!(resp.status().as_u16(), 401);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Invalid credentials");
    assert_eq!(app.snippet_count().await, 0);
}

#[tokio::test]
async fn delete_with_wrong_password_leaves_the_snippet() {
    let app = spawn_app_with_scheme(AuthScheme::Basic).await;

    let created: serde_json::Value = app
        .post_snippet_basic(
            &sample_snippet(),
            &app.test_user.username,
            &app.test_user.password,
        )
        .await
        .json()
        .await
        .unwrap();
    let id = created["id"].as_i64().unwrap();

    let resp = app
        .delete_snippet_basic(id, &app.test_user.username, "wrongpass")
        .await;
    assert_eq!(resp.status().as_u16(), 401);
    assert!(resp.headers().get(WWW_AUTHENTICATE).is_none());
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Invalid credentials");

    // the snippet survived
    assert_eq!(app.get(&format!("/api/snippets/{id}")).await.status(), 200);
    assert_eq!(app.snippet_count().await, 1);
}

#[tokio::test]
async fn reads_never_require_credentials() {
    let app = spawn_app_with_scheme(AuthScheme::Basic).await;

    assert!(app.get("/api/snippets").await.status().is_success());
    assert!(app.get("/api/languages").await.status().is_success());
    assert!(app.get("/api/tags").await.status().is_success());
}
