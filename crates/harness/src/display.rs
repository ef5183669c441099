//! Off-screen X display for running the browser without a window

use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::error::{HarnessError, HarnessResult};

const LOCK_DIR: &str = "/tmp";
const SOCKET_DIR: &str = "/tmp/.X11-unix";
const FIRST_DISPLAY: u32 = 99;
const MAX_DISPLAYS: u32 = 100;
const TERM_GRACE: Duration = Duration::from_millis(500);

/// Handle to a running virtual display server
pub struct VirtualDisplay {
    child: Child,
    number: u32,
}

impl VirtualDisplay {
    /// Start the display server on the first free display number and wait
    /// until its socket appears.
    pub async fn start(
        binary: &Path,
        width: u32,
        height: u32,
        startup_timeout: Duration,
    ) -> HarnessResult<Self> {
        let number = free_display_number(Path::new(LOCK_DIR), FIRST_DISPLAY).ok_or_else(|| {
            HarnessError::DisplayStartup("no free display number".to_string())
        })?;

        info!("Starting virtual display :{} ({}x{})", number, width, height);

        let child = Command::new(binary)
            .arg(format!(":{}", number))
            .args(["-screen", "0"])
            .arg(format!("{}x{}x24", width, height))
            .args(["-nolisten", "tcp"])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                HarnessError::DisplayStartup(format!("failed to spawn {}: {}", binary.display(), e))
            })?;

        let mut display = VirtualDisplay { child, number };
        display.wait_for_socket(startup_timeout).await?;
        Ok(display)
    }

    async fn wait_for_socket(&mut self, timeout: Duration) -> HarnessResult<()> {
        let socket = socket_path(self.number);
        let start = Instant::now();

        while start.elapsed() < timeout {
            if socket.exists() {
                debug!("Display socket {} is up", socket.display());
                return Ok(());
            }
            if let Some(status) = self.child.try_wait()? {
                return Err(HarnessError::DisplayStartup(format!(
                    "display server exited early with {}",
                    status
                )));
            }
            sleep(Duration::from_millis(50)).await;
        }

        Err(HarnessError::DisplayStartup(format!(
            "socket {} did not appear within {}s",
            socket.display(),
            timeout.as_secs()
        )))
    }

    /// Value for the `DISPLAY` environment variable of child processes.
    pub fn env_value(&self) -> String {
        format!(":{}", self.number)
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    /// Stop the display server
    pub fn stop(&mut self) {
        if let Ok(Some(_)) = self.child.try_wait() {
            return;
        }
        info!("Stopping virtual display :{} (pid: {})", self.number, self.child.id());
        terminate(&mut self.child);
    }

    /// Same as [`stop`](Self::stop), but waits out the grace period without
    /// blocking the runtime.
    pub async fn shutdown(&mut self) {
        if let Ok(Some(_)) = self.child.try_wait() {
            return;
        }
        info!("Stopping virtual display :{} (pid: {})", self.number, self.child.id());
        terminate_async(&mut self.child).await;
    }
}

impl Drop for VirtualDisplay {
    fn drop(&mut self) {
        self.stop();
    }
}

/// SIGTERM first, then kill whatever is left. Blocks; used from `Drop`.
pub(crate) fn terminate(child: &mut Child) {
    if send_sigterm(child) {
        let deadline = Instant::now() + TERM_GRACE;
        while Instant::now() < deadline {
            if let Ok(Some(_)) = child.try_wait() {
                return;
            }
            std::thread::sleep(Duration::from_millis(20));
        }
    }
    kill_and_reap(child);
}

/// [`terminate`] for async callers: the grace period yields to the runtime.
pub(crate) async fn terminate_async(child: &mut Child) {
    if send_sigterm(child) {
        let deadline = Instant::now() + TERM_GRACE;
        while Instant::now() < deadline {
            if let Ok(Some(_)) = child.try_wait() {
                return;
            }
            sleep(Duration::from_millis(20)).await;
        }
    }
    kill_and_reap(child);
}

#[cfg(unix)]
fn send_sigterm(child: &Child) -> bool {
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;

    kill(Pid::from_raw(child.id() as i32), Signal::SIGTERM).is_ok()
}

#[cfg(not(unix))]
fn send_sigterm(_child: &Child) -> bool {
    false
}

fn kill_and_reap(child: &mut Child) {
    if let Err(e) = child.kill() {
        warn!("Failed to kill pid {}: {}", child.id(), e);
    }
    let _ = child.wait();
}

fn socket_path(number: u32) -> PathBuf {
    Path::new(SOCKET_DIR).join(format!("X{}", number))
}

/// First display number at or after `start` without an X lock file.
fn free_display_number(lock_dir: &Path, start: u32) -> Option<u32> {
    (start..start + MAX_DISPLAYS).find(|n| !lock_dir.join(format!(".X{}-lock", n)).exists())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_free_display_number_skips_locked() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".X99-lock"), "").unwrap();
        std::fs::write(dir.path().join(".X100-lock"), "").unwrap();
        assert_eq!(free_display_number(dir.path(), 99), Some(101));
    }

    #[test]
    fn test_free_display_number_first_free() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(free_display_number(dir.path(), 99), Some(99));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_async_terminate_yields_during_grace_period() {
        // Ignores SIGTERM, so the whole grace period elapses before the kill.
        let mut child = Command::new("sh")
            .args(["-c", "trap '' TERM; exec sleep 30"])
            .spawn()
            .unwrap();
        // Give the shell time to install the trap.
        sleep(Duration::from_millis(100)).await;

        let mut ticks = 0usize;
        {
            let stop = terminate_async(&mut child);
            tokio::pin!(stop);
            loop {
                tokio::select! {
                    _ = &mut stop => break,
                    _ = sleep(Duration::from_millis(10)) => ticks += 1,
                }
            }
        }

        assert!(ticks >= 10, "runtime was blocked, only {} ticks", ticks);
        assert!(child.try_wait().unwrap().is_some());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_async_terminate_stops_cooperative_child() {
        let mut child = Command::new("sleep").arg("30").spawn().unwrap();
        let start = Instant::now();
        terminate_async(&mut child).await;
        assert!(child.try_wait().unwrap().is_some());
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_missing_binary_is_startup_error() {
        let err = VirtualDisplay::start(
            Path::new("/nonexistent/specbridge-xvfb"),
            1024,
            768,
            Duration::from_millis(100),
        )
        .await
        .err()
        .unwrap();
        assert!(matches!(err, HarnessError::DisplayStartup(_)));
    }
}
