//! Live run against a deployed application
//!
//! Skipped unless `SPECBRIDGE_LIVE_URL` points at a running application.
//! `SHOW_SELENIUM` and `REMOTE_SELENIUM` select the browser as usual.
//!
//! Run with: SPECBRIDGE_LIVE_URL=http://127.0.0.1:8000 cargo test --package specbridge-harness --test browser_suite

use std::path::Path;

use specbridge_harness::config::DEFAULT_CONFIG_FILE;
use specbridge_harness::{BrowserSession, HarnessConfig, SmokeChecker, SuiteRunner};

const LIVE_URL_ENV: &str = "SPECBRIDGE_LIVE_URL";

fn live_config() -> Option<HarnessConfig> {
    let base_url = std::env::var(LIVE_URL_ENV).ok()?;
    let mut config = HarnessConfig::load(Path::new(DEFAULT_CONFIG_FILE)).unwrap();
    config.app.base_url = base_url;
    Some(config)
}

#[tokio::test]
async fn test_live_routes_render() {
    let Some(config) = live_config() else {
        eprintln!("Skipping live smoke check: {} not set", LIVE_URL_ENV);
        return;
    };

    let checker = SmokeChecker::new(&config.app.base_url).unwrap();
    checker.check_all(&config.app.smoke_routes).await.unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_live_browser_suite() {
    let Some(config) = live_config() else {
        eprintln!("Skipping live browser suite: {} not set", LIVE_URL_ENV);
        return;
    };

    let runner = SuiteRunner::from_config(&config, std::io::stderr());
    let passed = BrowserSession::scope(&config.browser, move |session| {
        let mut runner = runner;
        Box::pin(async move { runner.run(session).await })
    })
    .await
    .unwrap();

    assert!(passed, "JS tests failed. See full report on stderr");
}
