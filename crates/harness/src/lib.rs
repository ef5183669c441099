//! specbridge harness
//!
//! Runs an in-browser Jasmine suite under WebDriver and turns its recorded
//! lifecycle events into a console report:
//! - Smoke-checks the application's named routes over plain HTTP
//! - Starts a virtual display and a local (or remote) WebDriver session
//! - Waits for the page-side reporter to flag completion
//! - Replays the suite's events into a colorized report and a pass/fail verdict
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     specbridge harness                      │
//! ├─────────────────────────────────────────────────────────────┤
//! │  SmokeChecker                                               │
//! │    └── check(route) -> 200 | UnexpectedStatus               │
//! ├─────────────────────────────────────────────────────────────┤
//! │  BrowserSession::scope(config, body)                        │
//! │    ├── VirtualDisplay (unless SHOW_SELENIUM)                │
//! │    ├── DriverProcess  (unless REMOTE_SELENIUM)              │
//! │    └── WebDriver                                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  SuiteRunner::run(session) -> bool                          │
//! │    ├── goto(suite_url)                                      │
//! │    ├── wait_until_expr(window.<reporter>)                   │
//! │    └── Reporter::run()                                      │
//! │          ├── wait_until_expr(<reporter>.isFinished())       │
//! │          ├── <reporter>.getAllEvents()                      │
//! │          ├── replay: Event -> progress lines                │
//! │          └── summary + failure detail                       │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod bridge;
pub mod config;
pub mod display;
pub mod driver;
pub mod error;
pub mod event;
pub mod reporter;
pub mod runner;
pub mod session;
pub mod smoke;
pub mod style;

pub use bridge::{wait_until_expr, ScriptBridge, WaitOptions};
pub use config::HarnessConfig;
pub use error::{HarnessError, HarnessResult};
pub use event::{Event, Expectation, RawEvent, SpecResult, SpecStatus};
pub use reporter::{Reporter, ReporterOptions};
pub use runner::SuiteRunner;
pub use session::BrowserSession;
pub use smoke::{Route, SmokeChecker};
