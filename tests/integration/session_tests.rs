//! Session cookies, persistence and flash messages.

use snippetbox::Status;

use super::test_utils::{set_cookie_headers, TestClient, PASSWORD};

#[tokio::test]
async fn untouched_session_sets_no_cookie() {
    let mut client = TestClient::new();
    let res = client.get("/").await;

    assert_eq!(res.status_code(), Status::Ok);
    assert!(set_cookie_headers(&res).is_empty());
    assert!(client.store.is_empty().await);
}

#[tokio::test]
async fn modified_session_sets_a_hardened_cookie() {
    let mut client = TestClient::new();
    let res = client.signup("Alice", "alice@example.com").await;

    let cookies = set_cookie_headers(&res);
    assert_eq!(cookies.len(), 1);
    let cookie = cookies[0];
    assert!(cookie.starts_with("session="));
    for attr in ["Path=/", "HttpOnly", "SameSite=Lax", "Max-Age="] {
        assert!(cookie.contains(attr), "{cookie} lacks {attr}");
    }
    assert!(!cookie.contains("Secure"));
    assert_eq!(res.header("vary"), Some("Cookie"));

    let token = client.cookie().unwrap().to_owned();
    assert!(client.store.snapshot().await.contains_key(&token));
}

#[tokio::test]
async fn flash_is_shown_exactly_once() {
    let mut client = TestClient::new();
    let res = client.signup("Alice", "alice@example.com").await;
    assert_eq!(res.header("location"), Some("/user/login"));

    let res = client.get("/user/login").await;
    assert!(res.body_text().contains("Your signup was successful. Please log in."));

    let res = client.get("/user/login").await;
    assert!(!res.body_text().contains("Your signup was successful"));
}

#[tokio::test]
async fn stale_token_is_deleted_on_login() {
    let mut client = TestClient::new();
    client.signup("Alice", "alice@example.com").await;
    let before = client.cookie().unwrap().to_owned();

    client.login("alice@example.com", PASSWORD).await;
    let after = client.cookie().unwrap().to_owned();

    let records = client.store.snapshot().await;
    assert!(!records.contains_key(&before));
    assert_eq!(
        records[&after].data.get("authenticatedUserID").map(String::as_str),
        Some("1")
    );
}

#[tokio::test]
async fn unknown_token_starts_a_fresh_session() {
    let mut client = TestClient::new();
    client.set_cookie("forged-or-expired");

    let res = client.get("/snippet/create").await;
    assert_eq!(res.status_code(), Status::SeeOther);

    let res = client.signup("Mallory", "mallory@example.com").await;
    assert_eq!(res.status_code(), Status::SeeOther);
    assert_ne!(client.cookie(), Some("forged-or-expired"));
}
