//! Console report for an in-browser Jasmine run
//!
//! The reporter waits for the page to flag completion, pulls the full event
//! list in one call and folds it into indented, colorized progress lines. The
//! summary and per-failure detail follow, and the verdict comes back as a
//! plain `bool` for the caller to assert on.

use std::io::Write;

use tracing::{debug, warn};

use crate::bridge::{wait_until_expr, ScriptBridge, WaitOptions};
use crate::error::{HarnessError, HarnessResult};
use crate::event::{Event, Expectation, RawEvent, SpecResult};
use crate::style::{paint, Style};

const INDENT: &str = "    ";

/// Frames printed per failed expectation before the rest are summarised.
pub const MAX_STACK_FRAMES: usize = 10;

/// Name of the page global exposing the suite's recorded events.
pub const DEFAULT_REPORTER_GLOBAL: &str = "seleniumReporter";

/// Page-side names and wait tuning for a [`Reporter`].
#[derive(Debug, Clone)]
pub struct ReporterOptions {
    /// Global object on `window` that records the suite's events.
    pub global: String,
    pub wait: WaitOptions,
}

impl Default for ReporterOptions {
    fn default() -> Self {
        Self {
            global: DEFAULT_REPORTER_GLOBAL.to_string(),
            wait: WaitOptions::default(),
        }
    }
}

impl ReporterOptions {
    pub fn ready_expr(&self) -> String {
        format!("window.{}", self.global)
    }

    pub fn finished_expr(&self) -> String {
        format!("window.{}.isFinished()", self.global)
    }

    pub fn events_script(&self) -> String {
        format!("return window.{}.getAllEvents();", self.global)
    }
}

/// Replays suite events onto a text sink.
pub struct Reporter<'a, B: ?Sized, W> {
    bridge: &'a B,
    out: W,
    options: ReporterOptions,
    indent: usize,
    open_spec: bool,
    num_tests: usize,
    num_passed: usize,
    failures: Vec<SpecResult>,
}

impl<'a, B, W> Reporter<'a, B, W>
where
    B: ScriptBridge + ?Sized,
    W: Write,
{
    pub fn new(bridge: &'a B, out: W) -> Self {
        Self::with_options(bridge, out, ReporterOptions::default())
    }

    pub fn with_options(bridge: &'a B, out: W, options: ReporterOptions) -> Self {
        Self {
            bridge,
            out,
            options,
            indent: 0,
            open_spec: false,
            num_tests: 0,
            num_passed: 0,
            failures: Vec::new(),
        }
    }

    /// Wait for the suite, replay its events and print the report.
    ///
    /// Returns `Ok(true)` only when at least one spec ran and all of them
    /// passed. A wait timeout or an unrecognised event is an `Err`.
    pub async fn run(&mut self) -> HarnessResult<bool> {
        wait_until_expr(self.bridge, &self.options.finished_expr(), self.options.wait).await?;

        let value = self.bridge.execute(&self.options.events_script()).await?;
        let events = Event::parse_list(value)?;
        debug!("Retrieved {} suite event(s)", events.len());

        self.replay(events)?;
        self.finish()
    }

    /// Fold the events into counts and progress lines, in order.
    ///
    /// A `spec_done` without a matching `spec_started` is rejected, so
    /// `num_passed` never exceeds `num_tests`.
    pub fn replay(&mut self, events: Vec<RawEvent>) -> HarnessResult<()> {
        for raw in events {
            let event = Event::decode(raw)?;
            self.handle(event)?;
        }
        Ok(())
    }

    fn handle(&mut self, event: Event) -> HarnessResult<()> {
        match event {
            Event::JasmineStarted | Event::JasmineDone => {}
            Event::SuiteStarted(suite) => {
                self.write(&format!("{}\n", paint(&suite.description, &[Style::Bold])), true)?;
                self.indent += 1;
            }
            Event::SpecStarted(spec) => {
                self.num_tests += 1;
                self.open_spec = true;
                self.write(&format!("{} ... ", spec.description), true)?;
            }
            Event::SpecDone(result) => {
                if !std::mem::replace(&mut self.open_spec, false) {
                    return Err(HarnessError::MalformedEvent {
                        name: "spec_done".to_string(),
                        reason: "no spec started".to_string(),
                    });
                }
                let color = if result.status.is_passed() {
                    self.num_passed += 1;
                    Style::Green
                } else {
                    Style::Red
                };
                self.write(&format!("{}\n", paint(result.status.as_str(), &[color])), false)?;
                if !result.status.is_passed() {
                    self.failures.push(result);
                }
            }
            Event::SuiteDone => {
                self.indent = self.indent.saturating_sub(1);
            }
        }
        Ok(())
    }

    /// Print the summary and failure detail after a replay.
    pub fn finish(&mut self) -> HarnessResult<bool> {
        if self.num_tests == 0 {
            warn!("Suite reported no specs");
            self.write(
                &paint(
                    "\nNo tests found, probably a syntax error in the test bundle\n\n",
                    &[Style::Red, Style::Bold],
                ),
                true,
            )?;
            return Ok(false);
        }

        let passed = self.num_tests == self.num_passed;
        let color = if passed { Style::Green } else { Style::Red };
        let summary = format!(
            "\n{}Passed {}/{} tests.\n\n",
            INDENT, self.num_passed, self.num_tests
        );
        self.write(&paint(&summary, &[color, Style::Bold]), true)?;

        let failures = std::mem::take(&mut self.failures);
        for failure in &failures {
            self.print_failure(failure)?;
        }
        self.failures = failures;

        Ok(passed)
    }

    fn print_failure(&mut self, failure: &SpecResult) -> HarnessResult<()> {
        self.write(
            &format!("{}\n", paint(&failure.full_name, &[Style::Blue, Style::Bold])),
            true,
        )?;

        for expectation in &failure.failed_expectations {
            self.indent = 1;
            let result = self.print_expectation(expectation);
            self.indent = 0;
            result?;
        }
        Ok(())
    }

    fn print_expectation(&mut self, expectation: &Expectation) -> HarnessResult<()> {
        if expectation.has_diff() {
            self.write("\n", false)?;
            self.write(
                &format!(
                    "{}{}: {}\n",
                    INDENT,
                    paint("expected", &[Style::Yellow]),
                    ascii_json(&expectation.expected)?
                ),
                true,
            )?;
            self.write(
                &format!(
                    "{}{}:   {}\n",
                    INDENT,
                    paint("actual", &[Style::Yellow]),
                    ascii_json(&expectation.actual)?
                ),
                true,
            )?;
        }

        self.write("\n", false)?;
        self.write(&format!("{}\n", paint(expectation.message(), &[Style::Bold])), true)?;

        let mut omitted = 0usize;
        for (i, frame) in expectation.frames().enumerate() {
            if i < MAX_STACK_FRAMES {
                self.write(&format!("{}\n", frame), true)?;
            } else {
                omitted += 1;
            }
        }
        if omitted > 0 {
            self.write(&format!("{} more...\n", omitted), true)?;
        }
        self.write("\n\n", false)?;
        Ok(())
    }

    fn write(&mut self, message: &str, indent: bool) -> HarnessResult<()> {
        if indent {
            self.out.write_all(INDENT.repeat(self.indent).as_bytes())?;
        }
        self.out.write_all(message.as_bytes())?;
        self.out.flush()?;
        Ok(())
    }

    pub fn num_tests(&self) -> usize {
        self.num_tests
    }

    pub fn num_passed(&self) -> usize {
        self.num_passed
    }

    pub fn indent(&self) -> usize {
        self.indent
    }

    pub fn failures(&self) -> &[SpecResult] {
        &self.failures
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Compact JSON with every non-ASCII character escaped as `\uXXXX`
/// (surrogate pairs above the BMP), so values print the same on any terminal.
fn ascii_json(value: &serde_json::Value) -> HarnessResult<String> {
    let json = serde_json::to_string(value)?;
    let mut out = String::with_capacity(json.len());
    let mut units = [0u16; 2];
    for c in json.chars() {
        if c.is_ascii() {
            out.push(c);
        } else {
            for unit in c.encode_utf16(&mut units) {
                out.push_str(&format!("\\u{:04x}", unit));
            }
        }
    }
    Ok(out)
}
