//! Smoke checks - plain GETs against named application routes

use std::time::Duration;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{HarnessError, HarnessResult};

/// A named route of the application under test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub name: String,
    /// Path relative to the application base URL, e.g. `/cui/test/`.
    pub path: String,
}

impl Route {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

/// Routes checked when the configuration does not list any.
pub fn default_routes() -> Vec<Route> {
    vec![Route::new("suite", "/cui/test/"), Route::new("local", "/cui/local/")]
}

/// Issues one GET per route and requires a 200. Redirects are not followed.
pub struct SmokeChecker {
    client: reqwest::Client,
    base_url: String,
}

impl SmokeChecker {
    pub fn new(base_url: &str) -> HarnessResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn url_for(&self, route: &Route) -> String {
        format!("{}{}", self.base_url, route.path)
    }

    /// GET the route once. Anything but 200 is an error.
    pub async fn check(&self, route: &Route) -> HarnessResult<StatusCode> {
        let url = self.url_for(route);
        let status = self.client.get(&url).send().await?.status();

        if status != StatusCode::OK {
            warn!("Route '{}' ({}) returned {}", route.name, url, status);
            return Err(HarnessError::UnexpectedStatus {
                route: route.name.clone(),
                expected: StatusCode::OK.as_u16(),
                actual: status.as_u16(),
            });
        }

        info!("Route '{}' ({}) returned {}", route.name, url, status);
        Ok(status)
    }

    /// Check every route in order, stopping at the first failure.
    pub async fn check_all(&self, routes: &[Route]) -> HarnessResult<()> {
        for route in routes {
            self.check(route).await?;
        }
        Ok(())
    }
}
