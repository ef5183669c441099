//! Smoke checks against an in-process application
//!
//! Run with: cargo test --package specbridge-harness --test smoke

use axum::http::StatusCode;
use axum::response::Redirect;
use axum::routing::get;
use axum::Router;

use specbridge_harness::smoke::default_routes;
use specbridge_harness::{HarnessError, Route, SmokeChecker};

/// Serve `app` on an ephemeral port and return its base URL.
async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn app() -> Router {
    Router::new()
        .route("/cui/test/", get(|| async { "<html>suite</html>" }))
        .route("/cui/local/", get(|| async { "<html>local</html>" }))
        .route(
            "/cui/broken/",
            get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
        )
        .route(
            "/cui/private/",
            get(|| async { Redirect::temporary("/login/") }),
        )
        .route("/login/", get(|| async { "<html>login</html>" }))
}

#[tokio::test]
async fn test_default_routes_render() {
    let base_url = serve(app()).await;
    let checker = SmokeChecker::new(&base_url).unwrap();

    for route in default_routes() {
        let status = checker.check(&route).await.unwrap();
        assert_eq!(status.as_u16(), 200);
    }
    checker.check_all(&default_routes()).await.unwrap();
}

#[tokio::test]
async fn test_missing_route_reports_expected_and_actual() {
    let base_url = serve(app()).await;
    let checker = SmokeChecker::new(&base_url).unwrap();

    let err = checker
        .check(&Route::new("gone", "/cui/gone/"))
        .await
        .unwrap_err();

    match err {
        HarnessError::UnexpectedStatus {
            ref route,
            expected,
            actual,
        } => {
            assert_eq!(route, "gone");
            assert_eq!(expected, 200);
            assert_eq!(actual, 404);
        }
        other => panic!("expected UnexpectedStatus, got {:?}", other),
    }
    assert!(err.to_string().contains("expected 200, got 404"));
}

#[tokio::test]
async fn test_check_all_stops_at_first_failure() {
    let base_url = serve(app()).await;
    let checker = SmokeChecker::new(&base_url).unwrap();

    let routes = vec![
        Route::new("suite", "/cui/test/"),
        Route::new("broken", "/cui/broken/"),
        Route::new("gone", "/cui/gone/"),
    ];
    let err = checker.check_all(&routes).await.unwrap_err();
    assert!(matches!(
        err,
        HarnessError::UnexpectedStatus { ref route, actual: 500, .. } if route == "broken"
    ));
}

#[tokio::test]
async fn test_redirect_is_not_followed() {
    let base_url = serve(app()).await;
    let checker = SmokeChecker::new(&base_url).unwrap();

    checker.check(&Route::new("login", "/login/")).await.unwrap();

    let err = checker
        .check(&Route::new("private", "/cui/private/"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        HarnessError::UnexpectedStatus { ref route, actual: 307, .. } if route == "private"
    ));
}

#[tokio::test]
async fn test_unreachable_application() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let checker = SmokeChecker::new(&base_url).unwrap();
    let err = checker.check(&default_routes()[0]).await.unwrap_err();
    assert!(matches!(err, HarnessError::Http(_)));
}
