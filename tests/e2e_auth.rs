//! E2E tests for login, logout and route protection

mod common;

use common::{TestServer, session_cookie, session_token, set_cookies};
use safenotes::auth::SessionStore;

#[tokio::test]
async fn test_index_renders_login_page_for_anonymous() {
    let server = TestServer::new().await;

    let response = server
        .client
        .get(server.url("/"))
        .send()
        .await
        .expect("request succeeds");

    assert_eq!(response.status(), 200);
    let body = response.text().await.expect("response body");
    assert!(body.contains(r#"action="/login""#));
}

#[tokio::test]
async fn test_index_redirects_logged_in_user() {
    let server = TestServer::new().await;
    let token = server.login("alice", "pw").await;

    let response = server
        .client
        .get(server.url("/"))
        .header("cookie", session_cookie(&token))
        .send()
        .await
        .expect("request succeeds");

    assert_eq!(response.status(), 307);
    assert_eq!(response.headers()["location"], "/notes/");
}

#[tokio::test]
async fn test_protected_route_rejects_anonymous() {
    let server = TestServer::new().await;

    let response = server
        .client
        .get(server.url("/notes/"))
        .send()
        .await
        .expect("request succeeds");

    assert_eq!(response.status(), 401);
    assert_eq!(response.headers()["x-content-type-options"], "nosniff");
    let body = response.text().await.expect("response body");
    assert!(body.contains(r#"Please <a href="/">login</a> before visiting this page."#));
}

#[tokio::test]
async fn test_forged_cookie_is_rejected() {
    let server = TestServer::new().await;

    let response = server
        .client
        .get(server.url("/notes/"))
        .header("cookie", session_cookie("forged-token"))
        .send()
        .await
        .expect("request succeeds");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn test_login_sets_session_cookie_and_redirects() {
    let server = TestServer::new().await;

    let response = server
        .client
        .post(server.url("/login"))
        .form(&[("username", "alice"), ("password", "pw")])
        .send()
        .await
        .expect("request succeeds");

    assert_eq!(response.status(), 303);
    assert_eq!(response.headers()["location"], "/notes/");

    let cookies = set_cookies(&response);
    let cookie = cookies
        .iter()
        .find(|c| c.starts_with("SESSION="))
        .expect("session cookie");
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Lax"));
    assert!(cookie.contains("Path=/"));

    let token = session_token(&response).unwrap();
    assert_eq!(
        server.state.db.lookup_user(&token).await.unwrap().as_deref(),
        Some("alice")
    );
}

#[tokio::test]
async fn test_login_with_wrong_password_is_rejected_uniformly() {
    let server = TestServer::new().await;
    server.login("alice", "pw").await;

    let wrong = server
        .client
        .post(server.url("/login"))
        .form(&[("username", "alice"), ("password", "nope")])
        .send()
        .await
        .expect("request succeeds");
    assert_eq!(wrong.status(), 400);
    assert!(session_token(&wrong).is_none());
    let wrong_body = wrong.text().await.unwrap();

    let empty = server
        .client
        .post(server.url("/login"))
        .form(&[("username", "bob"), ("password", "")])
        .send()
        .await
        .expect("request succeeds");
    assert_eq!(empty.status(), 400);
    assert_eq!(empty.text().await.unwrap(), wrong_body);
}

#[tokio::test]
async fn test_second_login_invalidates_first_token() {
    let server = TestServer::new().await;

    let first = server.login("alice", "pw").await;
    let second = server.login("alice", "pw").await;
    assert_ne!(first, second);

    let stale = server
        .client
        .get(server.url("/notes/"))
        .header("cookie", session_cookie(&first))
        .send()
        .await
        .expect("request succeeds");
    assert_eq!(stale.status(), 401);

    let fresh = server
        .client
        .get(server.url("/notes/"))
        .header("cookie", session_cookie(&second))
        .send()
        .await
        .expect("request succeeds");
    assert_eq!(fresh.status(), 200);
}

#[tokio::test]
async fn test_logout_clears_session() {
    let server = TestServer::new().await;
    let token = server.login("alice", "pw").await;

    let response = server
        .client
        .post(server.url("/logout"))
        .header("cookie", session_cookie(&token))
        .send()
        .await
        .expect("request succeeds");

    assert_eq!(response.status(), 303);
    assert_eq!(response.headers()["location"], "/");
    assert!(
        set_cookies(&response)
            .iter()
            .any(|c| c.starts_with("SESSION=;") && c.contains("Max-Age=0"))
    );

    let after = server
        .client
        .get(server.url("/notes/"))
        .header("cookie", session_cookie(&token))
        .send()
        .await
        .expect("request succeeds");
    assert_eq!(after.status(), 401);
}

#[tokio::test]
async fn test_logout_requires_login() {
    let server = TestServer::new().await;

    let response = server
        .client
        .post(server.url("/logout"))
        .send()
        .await
        .expect("request succeeds");

    assert_eq!(response.status(), 401);
    assert!(set_cookies(&response).is_empty());
}

#[tokio::test]
async fn test_cross_site_login_is_refused() {
    let server = TestServer::new().await;

    let response = server
        .client
        .post(server.url("/login"))
        .header("sec-fetch-site", "cross-site")
        .header("sec-fetch-mode", "navigate")
        .header("origin", "https://evil.example")
        .form(&[("username", "alice"), ("password", "pw")])
        .send()
        .await
        .expect("request succeeds");

    assert_eq!(response.status(), 403);
    assert!(session_token(&response).is_none());
    assert!(server.state.db.get_user("alice").await.unwrap().is_none());
}

#[tokio::test]
async fn test_same_origin_login_is_accepted() {
    let server = TestServer::new().await;

    let response = server
        .client
        .post(server.url("/login"))
        .header("sec-fetch-site", "same-origin")
        .header("sec-fetch-mode", "navigate")
        .form(&[("username", "alice"), ("password", "pw")])
        .send()
        .await
        .expect("request succeeds");

    assert_eq!(response.status(), 303);
    assert!(session_token(&response).is_some());
}
