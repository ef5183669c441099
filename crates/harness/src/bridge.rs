//! Script evaluation against the page under test

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde_json::Value;
use thirtyfour::WebDriver;
use tokio::time::sleep;
use tracing::debug;

use crate::error::{HarnessError, HarnessResult};

/// Anything that can run a script in the page and hand back its JSON result.
#[async_trait]
pub trait ScriptBridge: Send + Sync {
    /// Execute `script` as a function body; its `return` value comes back as JSON.
    async fn execute(&self, script: &str) -> HarnessResult<Value>;
}

#[async_trait]
impl ScriptBridge for WebDriver {
    async fn execute(&self, script: &str) -> HarnessResult<Value> {
        // Deref to the session handle so this does not recurse into the trait.
        let value = (**self)
            .execute(script, Vec::new())
            .await?
            .convert::<Value>()?;
        Ok(value)
    }
}

/// Polling parameters for [`wait_until_expr`].
#[derive(Debug, Clone, Copy)]
pub struct WaitOptions {
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            poll_interval: Duration::from_millis(500),
        }
    }
}

/// Evaluate `expr` until it is truthy or the deadline passes.
///
/// Script errors are returned as soon as they happen; only a falsy result is
/// retried.
pub async fn wait_until_expr<B>(bridge: &B, expr: &str, opts: WaitOptions) -> HarnessResult<()>
where
    B: ScriptBridge + ?Sized,
{
    let script = format!("return ({});", expr);
    let start = Instant::now();
    let mut attempts = 0usize;

    loop {
        attempts += 1;
        let value = bridge.execute(&script).await?;
        if is_truthy(&value) {
            debug!("`{}` became truthy after {} attempt(s)", expr, attempts);
            return Ok(());
        }

        if start.elapsed() >= opts.timeout {
            return Err(HarnessError::WaitTimeout {
                expression: expr.to_string(),
                timeout: opts.timeout,
            });
        }

        sleep(opts.poll_interval).await;
    }
}

/// JavaScript truthiness of a JSON-serialized script result.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Returns `false` until it has been asked `flip_after` times.
    struct Countdown {
        calls: AtomicUsize,
        flip_after: usize,
    }

    #[async_trait]
    impl ScriptBridge for Countdown {
        async fn execute(&self, script: &str) -> HarnessResult<Value> {
            assert_eq!(script, "return (window.done);");
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(Value::Bool(n >= self.flip_after))
        }
    }

    fn fast() -> WaitOptions {
        WaitOptions {
            timeout: Duration::from_millis(200),
            poll_interval: Duration::from_millis(5),
        }
    }

    #[tokio::test]
    async fn test_wait_returns_once_truthy() {
        let bridge = Countdown {
            calls: AtomicUsize::new(0),
            flip_after: 3,
        };
        wait_until_expr(&bridge, "window.done", fast()).await.unwrap();
        assert_eq!(bridge.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_wait_times_out() {
        let bridge = Countdown {
            calls: AtomicUsize::new(0),
            flip_after: usize::MAX,
        };
        let err = wait_until_expr(&bridge, "window.done", fast())
            .await
            .unwrap_err();
        assert!(matches!(err, HarnessError::WaitTimeout { ref expression, .. } if expression == "window.done"));
        assert!(bridge.calls.load(Ordering::SeqCst) > 1);
    }

    #[test]
    fn test_truthiness() {
        assert!(!is_truthy(&Value::Null));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("")));
        assert!(is_truthy(&json!(1)));
        assert!(is_truthy(&json!("x")));
        assert!(is_truthy(&json!({})));
        assert!(is_truthy(&json!([])));
    }
}
