//! Browser session lifecycle
//!
//! A session owns up to three resources: the virtual display, the local
//! WebDriver server process and the WebDriver session itself. Setup acquires
//! them in that order; a failure part way drops whatever was already started.
//! [`BrowserSession::scope`] runs a body against the session and closes it on
//! every exit path.

use futures::future::LocalBoxFuture;
use serde_json::{json, Map, Value};
use thirtyfour::{DesiredCapabilities, WebDriver};
use tracing::{info, warn};

use crate::config::BrowserConfig;
use crate::display::VirtualDisplay;
use crate::driver::DriverProcess;
use crate::error::HarnessResult;

pub struct BrowserSession {
    driver: WebDriver,
    driver_process: Option<DriverProcess>,
    display: Option<VirtualDisplay>,
}

impl BrowserSession {
    /// Acquire the display (unless a visible browser was asked for), then a
    /// local or remote WebDriver session.
    pub async fn start(config: &BrowserConfig) -> HarnessResult<Self> {
        let display = if config.show {
            None
        } else {
            Some(
                VirtualDisplay::start(
                    &config.display_binary,
                    config.display_width,
                    config.display_height,
                    config.startup_timeout(),
                )
                .await?,
            )
        };

        let (driver, driver_process) = match config.remote_url.as_deref() {
            Some(remote) => {
                info!("Connecting to remote WebDriver at {}", remote);
                let driver = WebDriver::new(remote, remote_capabilities()).await?;
                (driver, None)
            }
            None => {
                let display_env = display.as_ref().map(|d| d.env_value());
                let process = DriverProcess::spawn(
                    &config.driver_binary,
                    display_env.as_deref(),
                    config.startup_timeout(),
                )
                .await?;
                let driver = WebDriver::new(process.url(), DesiredCapabilities::firefox()).await?;
                (driver, Some(process))
            }
        };

        Ok(Self {
            driver,
            driver_process,
            display,
        })
    }

    /// Start a session, run `body` against it and close it afterwards.
    ///
    /// The body's error wins over a teardown error.
    pub async fn scope<T, F>(config: &BrowserConfig, body: F) -> HarnessResult<T>
    where
        F: for<'s> FnOnce(&'s BrowserSession) -> LocalBoxFuture<'s, HarnessResult<T>>,
    {
        let session = Self::start(config).await?;
        let outcome = body(&session).await;
        let closed = session.close().await;

        match (outcome, closed) {
            (Err(e), Err(teardown)) => {
                warn!("Teardown failed after an earlier error: {}", teardown);
                Err(e)
            }
            (Err(e), Ok(())) => Err(e),
            (Ok(value), closed) => closed.map(|()| value),
        }
    }

    pub fn driver(&self) -> &WebDriver {
        &self.driver
    }

    pub async fn goto(&self, url: &str) -> HarnessResult<()> {
        info!("Navigating to {}", url);
        self.driver.goto(url).await?;
        Ok(())
    }

    /// Quit the WebDriver session, then stop the driver and display.
    ///
    /// The processes are stopped even if quitting the session fails.
    pub async fn close(self) -> HarnessResult<()> {
        let BrowserSession {
            driver,
            mut driver_process,
            mut display,
        } = self;

        let quit = driver.quit().await;
        if let Some(process) = driver_process.as_mut() {
            process.shutdown().await;
        }
        if let Some(display) = display.as_mut() {
            display.shutdown().await;
        }

        quit?;
        Ok(())
    }
}

/// Capabilities sent to a remote endpoint: any browser on any platform, as
/// long as it runs JavaScript.
pub fn remote_capabilities() -> Map<String, Value> {
    let caps = json!({
        "browserName": "unknown",
        "javascriptEnabled": true,
        "platform": "ANY",
        "version": "",
    });
    match caps {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HarnessError;
    use std::path::PathBuf;

    #[test]
    fn test_remote_capabilities() {
        let caps = remote_capabilities();
        assert_eq!(caps["browserName"], "unknown");
        assert_eq!(caps["javascriptEnabled"], true);
        assert_eq!(caps["platform"], "ANY");
        assert_eq!(caps["version"], "");
    }

    #[tokio::test]
    async fn test_scope_surfaces_setup_error_without_running_body() {
        let config = BrowserConfig {
            show: true,
            driver_binary: PathBuf::from("/nonexistent/specbridge-driver"),
            startup_timeout_secs: 1,
            ..Default::default()
        };

        let mut ran = false;
        let result = BrowserSession::scope(&config, |_session| {
            ran = true;
            Box::pin(async { Ok(()) })
        })
        .await;

        assert!(matches!(result, Err(HarnessError::DriverStartup(_))));
        assert!(!ran);
    }
}
