//! Chain composition as seen from outside: panics, headers, routing misses.

use std::sync::Arc;

use snippetbox::middleware::{log_request, recover_panic, secure_headers, Chain};
use snippetbox::session::{MemoryStore, Session, SessionManager};
use snippetbox::{Method, Request, Response, Router, Status};

use super::test_utils::{set_cookie_headers, TestClient};

const SECURITY_HEADERS: [&str; 5] = [
    "content-security-policy",
    "referrer-policy",
    "x-content-type-options",
    "x-frame-options",
    "x-xss-protection",
];

#[tokio::test]
async fn not_found_still_carries_security_headers() {
    let mut client = TestClient::new();
    let res = client.get("/no/such/page").await;

    assert_eq!(res.status_code(), Status::NotFound);
    for name in SECURITY_HEADERS {
        assert!(res.header(name).is_some(), "missing {name}");
    }
    assert_eq!(res.header("x-frame-options"), Some("deny"));
}

#[tokio::test]
async fn wrong_method_lists_allowed_ones() {
    let mut client = TestClient::new();
    let res = client.get("/user/logout").await;

    assert_eq!(res.status_code(), Status::MethodNotAllowed);
    assert_eq!(res.header("allow"), Some("POST"));
    assert!(res.header("content-security-policy").is_some());
}

#[tokio::test]
async fn ping_bypasses_sessions() {
    let mut client = TestClient::new();
    let res = client.get("/ping").await;

    assert_eq!(res.status_code(), Status::Ok);
    assert_eq!(res.body_text(), "OK");
    assert!(set_cookie_headers(&res).is_empty());
    assert!(client.store.is_empty().await);
}

#[tokio::test]
async fn panic_becomes_one_500_and_session_is_still_saved() {
    let store = Arc::new(MemoryStore::new());
    let sessions = SessionManager::new(store.clone()).secure(false);

    let router = Router::new().get(
        "/boom",
        Chain::new().append(sessions).then(|req: Request| async move {
            Session::from_request(&req).unwrap().put("before", "panic");
            if req.path() == "/boom" {
                panic!("handler exploded");
            }
            Response::text("unreachable")
        }),
    );
    let app = Chain::new()
        .append(recover_panic)
        .append(log_request)
        .append(secure_headers)
        .then(router);

    let res = app.call(Request::builder().uri("/boom").build()).await;

    assert_eq!(res.status_code(), Status::InternalServerError);
    assert_eq!(res.header("connection"), Some("close"));
    assert_eq!(res.body_text(), "Internal Server Error");
    assert!(!res.body_text().contains("exploded"));
    for name in SECURITY_HEADERS {
        assert!(res.header(name).is_some(), "panic response lacks {name}");
    }

    let records = store.snapshot().await;
    assert_eq!(records.len(), 1);
    let record = records.values().next().unwrap();
    assert_eq!(record.data.get("before").map(String::as_str), Some("panic"));
}

#[tokio::test]
async fn app_keeps_serving_after_a_panic() {
    let app = Chain::new().append(recover_panic).then(|req: Request| async move {
        if req.query() == Some("fail") {
            panic!("only this request");
        }
        Response::text("fine")
    });

    let bad = app.call(Request::builder().uri("/?fail").build()).await;
    let good = app.call(Request::builder().uri("/").build()).await;

    assert_eq!(bad.status_code(), Status::InternalServerError);
    assert_eq!(good.status_code(), Status::Ok);
    assert_eq!(good.body_text(), "fine");
}

#[tokio::test]
async fn head_is_served_by_the_get_route() {
    let mut client = TestClient::new();
    let res = client
        .send(Request::builder().method(Method::Head).uri("/about"))
        .await;
    assert_eq!(res.status_code(), Status::Ok);
    assert!(res.header("x-frame-options").is_some());

    let res = client
        .send(Request::builder().method(Method::Head).uri("/user/logout"))
        .await;
    assert_eq!(res.status_code(), Status::MethodNotAllowed);
    assert_eq!(res.header("allow"), Some("POST"));
}
