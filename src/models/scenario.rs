//! Scenario documents: the expectation list plus the job input it was recorded from.
//!
//! Only the parts of the input this crate touches are typed. Everything else
//! is carried through untouched so a regenerated scenario keeps the original
//! job definition.

use std::collections::BTreeMap;
use std::path::Path;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::Result;
use crate::models::event::{Event, EventKind};
use crate::models::ObservedCall;

/// A pre-declared event the run is expected to produce, in call order.
#[derive(Debug, Clone, PartialEq)]
pub struct Expectation {
    pub event: Event,
}

impl Expectation {
    pub fn new(event: Event) -> Self {
        Self { event }
    }

    pub fn kind(&self) -> EventKind {
        self.event.kind()
    }
}

impl From<Event> for Expectation {
    fn from(event: Event) -> Self {
        Self::new(event)
    }
}

#[derive(Serialize)]
struct ExpectationRef<'a> {
    #[serde(rename = "type")]
    kind: EventKind,
    expect: ExpectBody<'a>,
}

#[derive(Serialize)]
struct ExpectBody<'a> {
    data: &'a Event,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawExpectation {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    expect: serde_yaml::Value,
}

impl Serialize for Expectation {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        ExpectationRef {
            kind: self.kind(),
            expect: ExpectBody { data: &self.event },
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Expectation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = RawExpectation::deserialize(deserializer)?;
        let kind: EventKind = raw.kind.parse().map_err(D::Error::custom)?;
        let event = Event::from_value(kind, raw.expect).map_err(D::Error::custom)?;
        Ok(Self { event })
    }
}

/// Source location of the job. Only `commit` is interpreted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Source {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Job {
    #[serde(default)]
    pub source: Source,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioInput {
    #[serde(default)]
    pub job: Job,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

/// A scenario file: job input and the ordered expectations for the run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub input: ScenarioInput,
    #[serde(default)]
    pub output: Vec<Expectation>,
}

impl Scenario {
    /// Parse a scenario from YAML. Every expectation is decoded strictly.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load a scenario file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_yaml()?)?;
        Ok(())
    }

    /// Build a fresh scenario from the calls observed during a run.
    ///
    /// Calls that failed to decode have nothing to expect and are dropped.
    /// The recorded commit, if any, replaces the input's commit.
    pub fn from_run(mut input: ScenarioInput, observed: &[ObservedCall], commit: Option<&str>) -> Self {
        if let Some(commit) = commit {
            input.job.source.commit = Some(commit.to_string());
        }
        let output = observed
            .iter()
            .filter_map(|call| call.event.clone())
            .map(Expectation::new)
            .collect();
        Self { input, output }
    }

    /// The expectation kinds, in order.
    pub fn kinds(&self) -> Vec<EventKind> {
        self.output.iter().map(Expectation::kind).collect()
    }
}
