mod common;

use std::sync::atomic::Ordering;

use axum::http::StatusCode;

use snippetbox::session::store::SessionStore;

use common::{ALICE_ID, TestApp};

#[tokio::test]
async fn ping_is_idempotent() {
    let app = TestApp::new();

    for _ in 0..2 {
        let response = app.get("/ping").await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body, "OK");
        assert!(response.headers.get("set-cookie").is_none());
    }

    assert!(app.store.is_empty().await);
    assert_eq!(app.snippets.gets.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn home_lists_latest_snippets() {
    let app = TestApp::new();

    let response = app.get("/").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("An old silent pond"));
    assert!(response.body.contains("2022-01-01 10:00:00"));
}

#[tokio::test]
async fn snippet_view() {
    let app = TestApp::new();

    let response = app.get("/snippet/view/1").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("An old silent pond..."));

    for path in [
        "/snippet/view/2",
        "/snippet/view/-1",
        "/snippet/view/0",
        "/snippet/view/1.23",
        "/snippet/view/foo",
        "/snippet/view/",
    ] {
        let response = app.get(path).await;
        assert_eq!(response.status, StatusCode::NOT_FOUND, "{}", path);
        assert_eq!(response.body, "Not Found", "{}", path);
    }
}

#[tokio::test]
async fn unknown_route_is_a_plain_404() {
    let app = TestApp::new();

    for path in ["/missing", "/static/css/missing.css", "/static/"] {
        let response = app.get(path).await;

        assert_eq!(response.status, StatusCode::NOT_FOUND, "{}", path);
        assert_eq!(response.body, "Not Found", "{}", path);
    }
}

#[tokio::test]
async fn static_files_come_from_the_binary() {
    let app = TestApp::new();

    let response = app.get("/static/css/main.css").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.headers["content-type"], "text/css");
    assert!(!response.body.is_empty());
    assert!(response.headers.get("set-cookie").is_none());
}

#[tokio::test]
async fn signup_validation() {
    let app = TestApp::new();
    let token = app.csrf_token_from("/user/signup").await;

    let cases = [
        ("", "bob@example.com", "validPa$$word", "This field cannot be blank"),
        ("Bob", "", "validPa$$word", "This field cannot be blank"),
        ("Bob", "bob@example.", "validPa$$word", "This field must be a valid email address"),
        ("Bob", "bob@example.com", "", "This field cannot be blank"),
        ("Bob", "bob@example.com", "pa$$", "This field must be at least 8 characters long"),
        ("Bob", "dupe@example.com", "validPa$$word", "Email address is already in use"),
    ];

    for (name, email, password, message) in cases {
        let form = format!(
            "csrf_token={}&name={}&email={}&password={}",
            token,
            name,
            email.replace('@', "%40"),
            password.replace('$', "%24"),
        );

        let response = app.post_form("/user/signup", &form).await;

        assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY, "{}", form);
        assert!(response.body.contains(r#"<form action="/user/signup" method="POST" novalidate>"#));
        assert!(response.body.contains(message), "{}: {}", form, message);
    }

    // Only the duplicate reached the store.
    assert_eq!(app.users.inserts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn valid_signup_redirects_to_login_with_a_flash() {
    let app = TestApp::new();
    let token = app.csrf_token_from("/user/signup").await;

    let response = app
        .post_form(
            "/user/signup",
            &format!(
                "csrf_token={}&name=Bob&email=bob%40example.com&password=validPa%24%24word",
                token
            ),
        )
        .await;

    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/user/login"));

    let login = app.get("/user/login").await;
    assert!(login.body.contains("Your signup was successful. Please log in."));

    let again = app.get("/user/login").await;
    assert!(!again.body.contains("Your signup was successful"));
}

#[tokio::test]
async fn login_rotates_the_session_token() {
    let app = TestApp::new();
    let token = app.csrf_token_from("/user/login").await;
    let before = app.session_token().unwrap();

    let response = app
        .post_form(
            "/user/login",
            &format!("csrf_token={}&email=alice%40example.com&password=pa%24%24word", token),
        )
        .await;

    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/snippet/create"));

    let after = app.session_token().unwrap();
    assert_ne!(before, after);
    assert!(app.store.load(&before).await.unwrap().is_none());

    let record = app.store.load(&after).await.unwrap().unwrap();
    assert_eq!(record.data.authenticated_user_id, Some(ALICE_ID));
}

#[tokio::test]
async fn bad_credentials_rerender_the_form() {
    let app = TestApp::new();
    let token = app.csrf_token_from("/user/login").await;

    let response = app
        .post_form(
            "/user/login",
            &format!("csrf_token={}&email=alice%40example.com&password=wrong-password", token),
        )
        .await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.body.contains("Email or password is incorrect"));
    assert!(response.body.contains(r#"value="alice@example.com""#));

    let token = app.session_token().unwrap();
    let record = app.store.load(&token).await.unwrap().unwrap();
    assert_eq!(record.data.authenticated_user_id, None);
}

#[tokio::test]
async fn logout_clears_the_user_and_queues_a_flash() {
    let app = TestApp::new();
    app.login_as_alice().await;
    let logged_in = app.session_token().unwrap();

    let token = app.csrf_token_from("/snippet/create").await;
    let response = app
        .post_form("/user/logout", &format!("csrf_token={}", token))
        .await;

    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/"));

    let logged_out = app.session_token().unwrap();
    assert_ne!(logged_in, logged_out);

    let record = app.store.load(&logged_out).await.unwrap().unwrap();
    assert_eq!(record.data.authenticated_user_id, None);
    assert_eq!(
        record.data.flash.as_deref(),
        Some("You've been logged out successfully!")
    );

    let home = app.get("/").await;
    assert!(home.body.contains("logged out successfully!"));
    assert!(home.body.contains(r#"<a href="/user/login">Login</a>"#));
}

#[tokio::test]
async fn create_snippet() {
    let app = TestApp::new();
    app.login_as_alice().await;
    let token = app.csrf_token_from("/snippet/create").await;

    let response = app
        .post_form(
            "/snippet/create",
            &format!("csrf_token={}&title=&content=&expires=365", token),
        )
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.body.contains("This field cannot be blank"));

    let response = app
        .post_form(
            "/snippet/create",
            &format!("csrf_token={}&title=O+snail&content=Climb+Mount+Fuji&expires=abc", token),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app
        .post_form(
            "/snippet/create",
            &format!("csrf_token={}&title=O+snail&content=Climb+Mount+Fuji", token),
        )
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.body.contains("This field must equal 1, 7 or 365"));

    assert_eq!(app.snippets.inserts.load(Ordering::SeqCst), 0);

    let response = app
        .post_form(
            "/snippet/create",
            &format!("csrf_token={}&title=O+snail&content=Climb+Mount+Fuji&expires=7", token),
        )
        .await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/snippet/view/2"));
    assert_eq!(app.snippets.inserts.load(Ordering::SeqCst), 1);

    let home = app.get("/").await;
    assert!(home.body.contains("Snippet successfully created!"));
}

#[tokio::test]
async fn account_page_shows_the_user() {
    let app = TestApp::new();
    app.login_as_alice().await;

    let response = app.get("/account/view").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Alice Jones"));
    assert!(response.body.contains("alice@example.com"));
}
