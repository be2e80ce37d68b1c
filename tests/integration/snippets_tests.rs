//! Snippet pages and static assets.

use snippetbox::{Method, Request, Status};

use super::test_utils::TestClient;

#[tokio::test]
async fn create_then_view_snippet() {
    let mut client = TestClient::new();
    client.logged_in_as("alice@example.com").await;

    let res = client
        .post(
            "/snippet/create",
            &[
                ("title", "O snail"),
                ("content", "Climb Mount Fuji,\nBut <slowly>, slowly!"),
                ("expires", "7"),
            ],
        )
        .await;
    assert_eq!(res.status_code(), Status::SeeOther);
    assert_eq!(res.header("location"), Some("/snippet/view/1"));

    let res = client.get("/snippet/view/1").await;
    assert_eq!(res.status_code(), Status::Ok);
    let body = res.body_text();
    assert!(body.contains("Snippet successfully created!"));
    assert!(body.contains("But &lt;slowly&gt;, slowly!"));

    let res = client.get("/").await;
    assert!(res.body_text().contains(r#"<a href="/snippet/view/1">O snail</a>"#));
}

#[tokio::test]
async fn malformed_or_missing_ids_are_not_found() {
    let mut client = TestClient::new();
    client.app.snippets.insert("kept", "body", 1).unwrap();

    for path in ["/snippet/view/abc", "/snippet/view/0", "/snippet/view/-1", "/snippet/view/99"] {
        let res = client.get(path).await;
        assert_eq!(res.status_code(), Status::NotFound, "{path}");
        assert_eq!(res.body_text(), "Not Found");
    }
    assert_eq!(client.get("/snippet/view/1").await.status_code(), Status::Ok);
}

#[tokio::test]
async fn invalid_snippet_form_is_rerendered() {
    let mut client = TestClient::new();
    client.logged_in_as("alice@example.com").await;

    let res = client
        .post("/snippet/create", &[("title", ""), ("content", "body"), ("expires", "30")])
        .await;
    assert_eq!(res.status_code(), Status::UnprocessableContent);
    let body = res.body_text();
    assert!(body.contains("This field cannot be blank"));
    assert!(body.contains("This field must equal 1, 7 or 365"));
    assert!(client.app.snippets.latest().unwrap().is_empty());
}

#[tokio::test]
async fn undecodable_form_is_a_bad_request() {
    let mut client = TestClient::new();
    client.logged_in_as("alice@example.com").await;

    let res = client
        .post("/snippet/create", &[("title", "t"), ("content", "c"), ("expires", "soon")])
        .await;
    assert_eq!(res.status_code(), Status::BadRequest);

    let res = client
        .send(
            Request::builder()
                .method(Method::Post)
                .uri("/snippet/create")
                .header("content-type", "application/json")
                .body(r#"{"title":"t"}"#),
        )
        .await;
    assert_eq!(res.status_code(), Status::BadRequest);
}

#[tokio::test]
async fn static_files_are_served_from_the_static_dir() {
    let dir = std::env::temp_dir().join(format!("snippetbox-static-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(dir.join("css")).unwrap();
    std::fs::write(dir.join("css/main.css"), "body { color: black; }").unwrap();

    let mut client = TestClient::with_static_dir(dir.clone());

    let res = client.get("/static/css/main.css").await;
    assert_eq!(res.status_code(), Status::Ok);
    assert_eq!(res.header("content-type"), Some("text/css; charset=utf-8"));
    assert_eq!(res.body(), b"body { color: black; }");
    assert!(res.header("x-content-type-options").is_some());

    for path in ["/static/css", "/static/css/missing.css", "/static/../Cargo.toml"] {
        assert_eq!(client.get(path).await.status_code(), Status::NotFound, "{path}");
    }

    std::fs::remove_dir_all(&dir).unwrap();
}
