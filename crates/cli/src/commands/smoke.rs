//! `specbridge smoke` - GET every configured route and require a 200

use anyhow::Result;
use specbridge_harness::{HarnessConfig, HarnessError, SmokeChecker};

use crate::output;

/// Returns `Ok(false)` when a route answered with the wrong status; transport
/// failures are errors.
pub async fn execute(config: &HarnessConfig) -> Result<bool> {
    let checker = SmokeChecker::new(&config.app.base_url)?;
    let mut all_ok = true;

    for route in &config.app.smoke_routes {
        let url = checker.url_for(route);
        match checker.check(route).await {
            Ok(status) => output::print_success(&format!("{} {} ({})", route.name, url, status)),
            Err(e @ HarnessError::UnexpectedStatus { .. }) => {
                output::print_failure(&format!("{} {}: {}", route.name, url, e));
                all_ok = false;
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(all_ok)
}
