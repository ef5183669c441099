//! Local WebDriver server - spawning and readiness checking

use std::net::TcpListener;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::display::{terminate, terminate_async};
use crate::error::{HarnessError, HarnessResult};

/// Handle to a running WebDriver server process
pub struct DriverProcess {
    child: Child,
    url: String,
}

impl DriverProcess {
    /// Spawn the driver on a free local port and wait until it reports ready.
    ///
    /// `display` is passed to the driver (and so to the browser) as `DISPLAY`.
    pub async fn spawn(
        binary: &Path,
        display: Option<&str>,
        startup_timeout: Duration,
    ) -> HarnessResult<Self> {
        let port = find_free_port()?;
        let url = format!("http://127.0.0.1:{}", port);

        info!("Spawning {} on port {}", binary.display(), port);

        let mut cmd = Command::new(binary);
        cmd.arg("--port").arg(port.to_string());
        if let Some(display) = display {
            cmd.env("DISPLAY", display);
        }
        cmd.stdout(Stdio::null()).stderr(Stdio::null());

        let child = cmd.spawn().map_err(|e| {
            HarnessError::DriverStartup(format!("failed to spawn {}: {}", binary.display(), e))
        })?;

        let mut handle = DriverProcess { child, url };
        handle.wait_for_ready(startup_timeout).await?;

        info!("WebDriver server is ready at {}", handle.url);
        Ok(handle)
    }

    /// Poll `/status` until the driver accepts sessions
    async fn wait_for_ready(&mut self, timeout: Duration) -> HarnessResult<()> {
        let status_url = format!("{}/status", self.url);
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(2))
            .build()?;

        let start = Instant::now();
        let mut attempts = 0;

        while start.elapsed() < timeout {
            attempts += 1;

            if let Some(status) = self.child.try_wait()? {
                return Err(HarnessError::DriverStartup(format!(
                    "driver exited early with {}",
                    status
                )));
            }

            match client.get(&status_url).send().await {
                Ok(resp) if resp.status().is_success() => {
                    let body: serde_json::Value = resp.json().await.unwrap_or_default();
                    if driver_ready(&body) {
                        return Ok(());
                    }
                    debug!("Driver not ready yet: {}", body);
                }
                Ok(resp) => {
                    warn!("Driver status returned {}", resp.status());
                }
                Err(e) => {
                    // Connection refused is expected while the driver starts
                    if !e.is_connect() {
                        warn!("Driver status error: {}", e);
                    }
                }
            }

            sleep(Duration::from_millis(100)).await;
        }

        Err(HarnessError::DriverStartup(format!(
            "not ready after {} attempts",
            attempts
        )))
    }

    /// WebDriver endpoint URL of this driver
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Stop the driver
    pub fn stop(&mut self) {
        if let Ok(Some(_)) = self.child.try_wait() {
            return;
        }
        info!("Stopping WebDriver server (pid: {})", self.child.id());
        terminate(&mut self.child);
    }

    /// Async counterpart of [`stop`](Self::stop).
    pub async fn shutdown(&mut self) {
        if let Ok(Some(_)) = self.child.try_wait() {
            return;
        }
        info!("Stopping WebDriver server (pid: {})", self.child.id());
        terminate_async(&mut self.child).await;
    }
}

impl Drop for DriverProcess {
    fn drop(&mut self) {
        self.stop();
    }
}

/// `value.ready` from a W3C status response; a body without it counts as ready.
fn driver_ready(body: &serde_json::Value) -> bool {
    body.pointer("/value/ready")
        .and_then(|v| v.as_bool())
        .unwrap_or(true)
}

/// Find a free port to use
fn find_free_port() -> HarnessResult<u16> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    Ok(listener.local_addr()?.port())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_find_free_port() {
        let port = find_free_port().unwrap();
        assert!(port > 0);
    }

    #[test]
    fn test_driver_ready() {
        assert!(driver_ready(&json!({"value": {"ready": true, "message": ""}})));
        assert!(!driver_ready(&json!({"value": {"ready": false, "message": "Session already started"}})));
        assert!(driver_ready(&json!({})));
    }

    #[tokio::test]
    async fn test_missing_binary_is_startup_error() {
        let err = DriverProcess::spawn(
            Path::new("/nonexistent/specbridge-driver"),
            None,
            Duration::from_millis(100),
        )
        .await
        .err()
        .unwrap();
        assert!(matches!(err, HarnessError::DriverStartup(_)));
    }
}
