//! Lifecycle events recorded by the in-browser suite
//!
//! The page hands back a JSON array of `{name, data}` records. Each record is
//! decoded on its own so that an unrecognised tag fails exactly where it
//! appears in the replay, after everything before it has been reported.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{HarnessError, HarnessResult};

/// An undecoded event as it arrives over the scripting bridge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawEvent {
    pub name: String,
    #[serde(default)]
    pub data: Value,
}

/// A decoded suite lifecycle event.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    JasmineStarted,
    SuiteStarted(SuiteInfo),
    SpecStarted(SpecInfo),
    SpecDone(SpecResult),
    SuiteDone,
    JasmineDone,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuiteInfo {
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecInfo {
    pub description: String,
}

/// Outcome of a single spec.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecResult {
    #[serde(default)]
    pub description: String,
    pub status: SpecStatus,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub failed_expectations: Vec<Expectation>,
}

/// One failed assertion of a spec.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expectation {
    /// Empty string when the matcher has nothing to diff against.
    #[serde(default = "empty_expected")]
    pub expected: Value,
    #[serde(default)]
    pub actual: Value,
    #[serde(default)]
    pub stack: String,
}

fn empty_expected() -> Value {
    Value::String(String::new())
}

impl Expectation {
    pub fn has_diff(&self) -> bool {
        self.expected.as_str() != Some("")
    }

    /// First line of the stack, the failure message.
    pub fn message(&self) -> &str {
        self.stack.split('\n').next().unwrap_or_default()
    }

    /// Stack frames following the message line.
    pub fn frames(&self) -> impl Iterator<Item = &str> {
        self.stack.split('\n').skip(1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SpecStatus {
    Passed,
    Failed,
    /// `pending`, `disabled`, `excluded` and anything else the suite reports.
    Other(String),
}

impl SpecStatus {
    pub fn is_passed(&self) -> bool {
        matches!(self, SpecStatus::Passed)
    }

    pub fn as_str(&self) -> &str {
        match self {
            SpecStatus::Passed => "passed",
            SpecStatus::Failed => "failed",
            SpecStatus::Other(s) => s,
        }
    }
}

impl From<String> for SpecStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "passed" => SpecStatus::Passed,
            "failed" => SpecStatus::Failed,
            _ => SpecStatus::Other(s),
        }
    }
}

impl From<SpecStatus> for String {
    fn from(status: SpecStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for SpecStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Event {
    /// Decode a raw record, failing on tags this reporter has no handler for.
    pub fn decode(raw: RawEvent) -> HarnessResult<Self> {
        let RawEvent { name, data } = raw;
        match name.as_str() {
            "jasmine_started" => Ok(Event::JasmineStarted),
            "suite_started" => payload(&name, data).map(Event::SuiteStarted),
            "spec_started" => payload(&name, data).map(Event::SpecStarted),
            "spec_done" => payload(&name, data).map(Event::SpecDone),
            "suite_done" => Ok(Event::SuiteDone),
            "jasmine_done" => Ok(Event::JasmineDone),
            _ => Err(HarnessError::UnknownEvent(name)),
        }
    }

    /// Split the value returned by the page into raw records.
    pub fn parse_list(value: Value) -> HarnessResult<Vec<RawEvent>> {
        match value {
            Value::Array(_) => serde_json::from_value(value)
                .map_err(|e| HarnessError::MalformedEventList(e.to_string())),
            Value::Null => Ok(Vec::new()),
            other => Err(HarnessError::MalformedEventList(format!(
                "expected an array, got {}",
                other
            ))),
        }
    }
}

fn payload<T: serde::de::DeserializeOwned>(name: &str, data: Value) -> HarnessResult<T> {
    serde_json::from_value(data).map_err(|e| HarnessError::MalformedEvent {
        name: name.to_string(),
        reason: e.to_string(),
    })
}
