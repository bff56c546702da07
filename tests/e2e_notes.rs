//! E2E tests for note listing and editing

mod common;

use common::{TestServer, session_cookie};

async fn post_note(server: &TestServer, token: &str, form: &[(&str, &str)]) -> reqwest::Response {
    server
        .client
        .post(server.url("/notes"))
        .header("cookie", session_cookie(token))
        .form(form)
        .send()
        .await
        .expect("request succeeds")
}

#[tokio::test]
async fn test_add_then_list_notes() {
    let server = TestServer::new().await;
    let token = server.login("alice", "pw").await;

    let response = post_note(&server, &token, &[("title", "groceries"), ("text", "milk")]).await;
    assert_eq!(response.status(), 200);
    assert!(response.text().await.unwrap().contains("milk"));

    let listing = server
        .client
        .get(server.url("/notes/"))
        .header("cookie", session_cookie(&token))
        .send()
        .await
        .expect("request succeeds");
    assert_eq!(listing.status(), 200);
    let body = listing.text().await.unwrap();
    assert!(body.contains("groceries"));
    assert!(body.contains("Notes of alice"));
}

#[tokio::test]
async fn test_same_title_replaces_text() {
    let server = TestServer::new().await;
    let token = server.login("alice", "pw").await;

    post_note(&server, &token, &[("title", "todo"), ("text", "first draft")]).await;
    let response = post_note(&server, &token, &[("title", "todo"), ("text", "second draft")]).await;

    let body = response.text().await.unwrap();
    assert!(body.contains("second draft"));
    assert!(!body.contains("first draft"));
}

#[tokio::test]
async fn test_note_content_is_escaped() {
    let server = TestServer::new().await;
    let token = server.login("alice", "pw").await;

    let response = post_note(
        &server,
        &token,
        &[("title", "xss"), ("text", "<script>alert(1)</script>")],
    )
    .await;

    let body = response.text().await.unwrap();
    assert!(!body.contains("<script>alert(1)</script>"));
    assert!(body.contains("&lt;script&gt;"));
}

#[tokio::test]
async fn test_empty_fields_are_rejected() {
    let server = TestServer::new().await;
    let token = server.login("alice", "pw").await;

    let response = post_note(&server, &token, &[("title", "todo"), ("text", "")]).await;

    assert_eq!(response.status(), 400);
    assert!(
        response
            .text()
            .await
            .unwrap()
            .contains("Both title and text must be specified.")
    );
}

#[tokio::test]
async fn test_malformed_form_is_rejected() {
    let server = TestServer::new().await;
    let token = server.login("alice", "pw").await;

    let response = server
        .client
        .post(server.url("/notes"))
        .header("cookie", session_cookie(&token))
        .header("content-type", "application/json")
        .body(r#"{"title":"a","text":"b"}"#)
        .send()
        .await
        .expect("request succeeds");

    assert_eq!(response.status(), 400);
    assert!(
        response
            .text()
            .await
            .unwrap()
            .contains(r#"Please submit a valid form with "title" and "text" parameters."#)
    );
}

#[tokio::test]
async fn test_notes_are_private() {
    let server = TestServer::new().await;
    let alice = server.login("alice", "pw").await;
    let bob = server.login("bob", "pw").await;

    post_note(&server, &alice, &[("title", "diary"), ("text", "alice secret")]).await;

    let listing = server
        .client
        .get(server.url("/notes/"))
        .header("cookie", session_cookie(&bob))
        .send()
        .await
        .expect("request succeeds");
    assert!(!listing.text().await.unwrap().contains("alice secret"));
}

#[tokio::test]
async fn test_posting_notes_requires_login() {
    let server = TestServer::new().await;

    let response = server
        .client
        .post(server.url("/notes"))
        .form(&[("title", "t"), ("text", "x")])
        .send()
        .await
        .expect("request succeeds");

    assert_eq!(response.status(), 401);
}
