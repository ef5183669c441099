//! Runs the in-browser suite against a session and reports on a text sink

use std::io::Write;

use tracing::info;

use crate::bridge::{wait_until_expr, ScriptBridge};
use crate::config::HarnessConfig;
use crate::error::HarnessResult;
use crate::reporter::{Reporter, ReporterOptions};
use crate::session::BrowserSession;

pub const BANNER: &str = "\n\nRunning browser unit tests...\n";

/// Drives one suite run: navigate, wait for the page-side reporter, report.
pub struct SuiteRunner<W> {
    suite_url: String,
    options: ReporterOptions,
    out: W,
}

impl<W: Write> SuiteRunner<W> {
    pub fn new(suite_url: impl Into<String>, options: ReporterOptions, out: W) -> Self {
        Self {
            suite_url: suite_url.into(),
            options,
            out,
        }
    }

    pub fn from_config(config: &HarnessConfig, out: W) -> Self {
        Self::new(config.app.suite_url(), config.suite.reporter_options(), out)
    }

    pub fn suite_url(&self) -> &str {
        &self.suite_url
    }

    /// Open the suite page in `session` and report its results.
    pub async fn run(&mut self, session: &BrowserSession) -> HarnessResult<bool> {
        self.out.write_all(BANNER.as_bytes())?;
        self.out.flush()?;

        session.goto(&self.suite_url).await?;
        self.report(session.driver()).await
    }

    /// Wait for the page-side reporter to exist, then replay its events.
    pub async fn report<B>(&mut self, bridge: &B) -> HarnessResult<bool>
    where
        B: ScriptBridge + ?Sized,
    {
        wait_until_expr(bridge, &self.options.ready_expr(), self.options.wait).await?;

        let mut reporter = Reporter::with_options(bridge, &mut self.out, self.options.clone());
        let passed = reporter.run().await?;

        info!(
            "Suite finished: {}/{} passed",
            reporter.num_passed(),
            reporter.num_tests()
        );
        Ok(passed)
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
