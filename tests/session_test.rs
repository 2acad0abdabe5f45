mod common;

use axum::Router;
use axum::extract::{Form, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use common::{Counters, config_for, start_server};
use feed_scout::{FetchError, ResultFetcher, SiteProfile, SiteSession};
use std::collections::HashMap;
use std::sync::atomic::Ordering;

async fn login(
    State(counters): State<Counters>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    counters.logins.fetch_add(1, Ordering::SeqCst);

    let valid = form.get("username").map(String::as_str) == Some("detective")
        && form.get("password").map(String::as_str) == Some("secret")
        && form.get("remember_me").map(String::as_str) == Some("on");

    if valid {
        (
            [(header::SET_COOKIE, "tl_session=valid; Path=/")],
            "<html><title>Welcome</title></html>",
        )
            .into_response()
    } else {
        "<html><title>Login :: TorrentLeech.org</title>Invalid Username/password</html>"
            .into_response()
    }
}

async fn members_only(headers: HeaderMap) -> Response {
    let has_session = headers
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|cookies| cookies.contains("tl_session=valid"));

    if has_session {
        "members area".into_response()
    } else {
        StatusCode::FORBIDDEN.into_response()
    }
}

fn login_site() -> (String, Counters) {
    let counters = Counters::default();
    let app = Router::new()
        .route("/user/account/login", post(login))
        .route("/members", get(members_only))
        .with_state(counters.clone());

    (start_server(app), counters)
}

#[test]
fn test_login_stores_session_cookie() {
    let (base_url, counters) = login_site();
    let profile = SiteProfile::torrentleech(&config_for(&base_url));
    let mut session = SiteSession::new(&profile);

    assert!(session.requires_login());
    assert!(!session.is_authenticated());
    assert!(session.ensure_authenticated());
    assert!(session.is_authenticated());

    // An existing session is reused without another login
    assert!(session.ensure_authenticated());
    assert_eq!(counters.logins(), 1);

    let body = ResultFetcher::new(false)
        .fetch(&mut session, &format!("{}members", base_url))
        .unwrap();
    assert_eq!(body.as_deref(), Some("members area"));
}

#[test]
fn test_invalid_credentials_are_detected() {
    let (base_url, counters) = login_site();
    let mut config = config_for(&base_url);
    config.torrentleech.password = "wrong".to_string();
    let profile = SiteProfile::torrentleech(&config);
    let mut session = SiteSession::new(&profile);

    assert!(!session.ensure_authenticated());
    assert!(!session.is_authenticated());

    // A failed login is not remembered, the next call tries again
    assert!(!session.ensure_authenticated());
    assert_eq!(counters.logins(), 2);
}

#[test]
fn test_forbidden_login_fails_authentication() {
    let app = Router::new().route(
        "/user/account/login",
        post(|| async { (StatusCode::FORBIDDEN, "go away") }),
    );
    let base_url = start_server(app);
    let profile = SiteProfile::torrentleech(&config_for(&base_url));
    let mut session = SiteSession::new(&profile);

    assert!(!session.ensure_authenticated());
    assert!(!session.is_authenticated());

    let outcome = ResultFetcher::new(false).fetch(&mut session, &format!("{}members", base_url));
    assert!(matches!(outcome, Err(FetchError::NotAuthenticated { .. })));
}

#[test]
fn test_unreachable_login_fails_authentication() {
    // Nothing listens on the discard port
    let profile = SiteProfile::torrentleech(&config_for("http://127.0.0.1:9/"));
    let mut session = SiteSession::new(&profile);

    assert!(!session.ensure_authenticated());
    assert!(!session.is_authenticated());
}

#[test]
fn test_open_site_needs_no_login() {
    let profile = SiteProfile::torrentz(&config_for("http://127.0.0.1:9/"));
    let mut session = SiteSession::new(&profile);

    assert!(!session.requires_login());
    assert!(session.ensure_authenticated());
    assert!(session.is_authenticated());

    session.invalidate();
    assert!(!session.is_authenticated());
}

#[test]
fn test_fetch_classifies_statuses() {
    let app = Router::new()
        .route("/ok", get(|| async { "payload" }))
        .route("/missing", get(|| async { StatusCode::NOT_FOUND }))
        .route("/broken", get(|| async { StatusCode::INTERNAL_SERVER_ERROR }))
        .route("/forbidden", get(|| async { StatusCode::FORBIDDEN }));
    let base_url = start_server(app);
    let profile = SiteProfile::torrentz(&config_for(&base_url));
    let mut session = SiteSession::new(&profile);

    let lenient = ResultFetcher::new(true);
    let strict = ResultFetcher::new(false);

    assert_eq!(
        lenient
            .fetch(&mut session, &format!("{}ok", base_url))
            .unwrap()
            .as_deref(),
        Some("payload")
    );
    assert_eq!(
        lenient
            .fetch(&mut session, &format!("{}missing", base_url))
            .unwrap(),
        None
    );
    assert!(matches!(
        strict.fetch(&mut session, &format!("{}missing", base_url)),
        Err(FetchError::UnexpectedStatus { status: 404, .. })
    ));
    assert!(matches!(
        lenient.fetch(&mut session, &format!("{}broken", base_url)),
        Err(FetchError::UnexpectedStatus { status: 500, .. })
    ));

    // Open sites do not retry, but the session is still dropped
    assert!(matches!(
        lenient.fetch(&mut session, &format!("{}forbidden", base_url)),
        Err(FetchError::Unauthorized { status: 403, .. })
    ));
    assert!(!session.is_authenticated());
}
