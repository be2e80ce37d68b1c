//! The authentication gate and the login lifecycle.

use snippetbox::Status;

use super::test_utils::{TestClient, PASSWORD};

const PROTECTED: [&str; 3] = ["/snippet/create", "/account/view", "/account/password/update"];

#[tokio::test]
async fn anonymous_requests_are_redirected_to_login() {
    let mut client = TestClient::new();
    for path in PROTECTED {
        let res = client.get(path).await;
        assert_eq!(res.status_code(), Status::SeeOther, "{path}");
        assert_eq!(res.header("location"), Some("/user/login"), "{path}");
        assert!(res.body().is_empty());
    }

    let res = client
        .post("/snippet/create", &[("title", "t"), ("content", "c"), ("expires", "7")])
        .await;
    assert_eq!(res.status_code(), Status::SeeOther);
    assert!(client.app.snippets.latest().unwrap().is_empty());
}

#[tokio::test]
async fn login_renews_token_and_opens_protected_routes() {
    let mut client = TestClient::new();
    client.signup("Alice", "alice@example.com").await;
    let anonymous_token = client.cookie().map(str::to_owned).unwrap();

    let res = client.login("alice@example.com", PASSWORD).await;
    assert_eq!(res.status_code(), Status::SeeOther);
    assert_eq!(res.header("location"), Some("/snippet/create"));

    let token = client.cookie().map(str::to_owned).unwrap();
    assert_ne!(token, anonymous_token);

    let res = client.get("/snippet/create").await;
    assert_eq!(res.status_code(), Status::Ok);
    assert_eq!(res.header("cache-control"), Some("no-store"));
    assert!(res.body_text().contains(r#"value="365" checked"#));
}

#[tokio::test]
async fn wrong_password_is_a_generic_422() {
    let mut client = TestClient::new();
    client.signup("Alice", "alice@example.com").await;

    for (email, password) in [
        ("alice@example.com", "not-the-password"),
        ("nobody@example.com", PASSWORD),
    ] {
        let res = client.login(email, password).await;
        assert_eq!(res.status_code(), Status::UnprocessableContent);
        assert!(res.body_text().contains("Email or password is incorrect"));
    }

    let res = client.get("/account/view").await;
    assert_eq!(res.status_code(), Status::SeeOther);
}

#[tokio::test]
async fn duplicate_signup_is_rejected() {
    let mut client = TestClient::new();
    client.signup("Alice", "alice@example.com").await;

    let res = client.signup("Impostor", "alice@example.com").await;
    assert_eq!(res.status_code(), Status::UnprocessableContent);
    let body = res.body_text();
    assert!(body.contains("Email address is already in use"));
    assert!(body.contains(r#"value="Impostor""#));
}

#[tokio::test]
async fn logout_renews_token_and_closes_protected_routes() {
    let mut client = TestClient::new();
    client.logged_in_as("bob@example.com").await;
    let logged_in_token = client.cookie().map(str::to_owned).unwrap();

    let res = client.post("/user/logout", &[]).await;
    assert_eq!(res.status_code(), Status::SeeOther);
    assert_eq!(res.header("location"), Some("/"));
    assert_ne!(client.cookie(), Some(logged_in_token.as_str()));

    let res = client.get("/").await;
    assert!(res.body_text().contains("You&#39;ve been logged out successfully!"));

    let res = client.get("/snippet/create").await;
    assert_eq!(res.status_code(), Status::SeeOther);

    // The pre-logout token is gone from the store.
    client.set_cookie(&logged_in_token);
    let res = client.get("/account/view").await;
    assert_eq!(res.status_code(), Status::SeeOther);
}

#[tokio::test]
async fn deleted_user_is_treated_as_anonymous() {
    let mut client = TestClient::new();
    let id = client.logged_in_as("carol@example.com").await;
    assert_eq!(client.get("/account/view").await.status_code(), Status::Ok);

    client.app.users.delete(id).unwrap();

    let res = client.get("/account/view").await;
    assert_eq!(res.status_code(), Status::SeeOther);
    assert_eq!(res.header("location"), Some("/user/login"));

    let res = client.get("/").await;
    assert_eq!(res.status_code(), Status::Ok);
    assert!(res.body_text().contains(r#"href="/user/login""#));
}

#[tokio::test]
async fn account_page_shows_the_user() {
    let mut client = TestClient::new();
    client.logged_in_as("dave@example.com").await;

    let res = client.get("/account/view").await;
    assert_eq!(res.status_code(), Status::Ok);
    assert!(res.body_text().contains("dave@example.com"));
    assert_eq!(res.header("cache-control"), Some("no-store"));
}

#[tokio::test]
async fn password_update_checks_the_current_password() {
    let mut client = TestClient::new();
    client.logged_in_as("erin@example.com").await;

    let res = client
        .post(
            "/account/password/update",
            &[
                ("currentPassword", "wrong-password"),
                ("newPassword", "brand-new-secret"),
                ("newPasswordConfirmation", "brand-new-secret"),
            ],
        )
        .await;
    assert_eq!(res.status_code(), Status::UnprocessableContent);
    assert!(res.body_text().contains("Current password is incorrect"));

    let res = client
        .post(
            "/account/password/update",
            &[
                ("currentPassword", PASSWORD),
                ("newPassword", "brand-new-secret"),
                ("newPasswordConfirmation", "brand-new-secret"),
            ],
        )
        .await;
    assert_eq!(res.status_code(), Status::SeeOther);
    assert_eq!(res.header("location"), Some("/account/view"));

    let res = client.get("/account/view").await;
    assert!(res.body_text().contains("Your password has been updated!"));
    assert!(client.app.users.authenticate("erin@example.com", "brand-new-secret").await.is_ok());
}
