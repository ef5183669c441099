//! `specbridge suite` - run the in-browser suite and report on stderr

use anyhow::{Context, Result};
use clap::Args;
use specbridge_harness::{BrowserSession, HarnessConfig, SuiteRunner};

use crate::output;

#[derive(Args, Debug, Default)]
pub struct SuiteArgs {
    /// Show a real browser window instead of using a virtual display
    #[arg(long)]
    pub show: bool,

    /// Remote WebDriver endpoint (overrides REMOTE_SELENIUM)
    #[arg(long)]
    pub remote: Option<String>,

    /// Seconds to wait for the suite to finish
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Page global that records the suite's events
    #[arg(long)]
    pub reporter_global: Option<String>,
}

impl SuiteArgs {
    pub fn apply(&self, config: &mut HarnessConfig) {
        if self.show {
            config.browser.show = true;
        }
        if let Some(remote) = &self.remote {
            config.browser.remote_url = Some(remote.clone());
        }
        if let Some(timeout) = self.timeout {
            config.suite.timeout_secs = timeout;
        }
        if let Some(global) = &self.reporter_global {
            config.suite.reporter_global = global.clone();
        }
    }
}

pub async fn execute(config: &HarnessConfig) -> Result<bool> {
    let runner = SuiteRunner::from_config(config, std::io::stderr());
    output::print_info(&format!("Suite page: {}", runner.suite_url()));

    let passed = BrowserSession::scope(&config.browser, move |session| {
        let mut runner = runner;
        Box::pin(async move { runner.run(session).await })
    })
    .await
    .context("browser suite did not complete")?;

    if passed {
        output::print_success("JS tests passed");
    } else {
        output::print_failure("JS tests failed. See full report on stderr");
    }
    Ok(passed)
}
