//! Test data fixtures for the fake API.
//!
//! Provides factory functions for realistic update events.

use serde_json::{Map, Value};

use crate::models::{
    ClosePullRequest, CreatePullRequest, Dependency, DependencyFile, Event, Expectation,
    MarkAsProcessed, RecordPackageManagerVersion, RecordUpdateJobError, Requirement,
    UpdateDependencyList, UpdatePullRequest,
};

/// Collection of fixture factories for test data.
pub struct Fixtures;

impl Fixtures {
    // =========================================================================
    // Building Blocks
    // =========================================================================

    /// A Gemfile dependency pinned to `version`.
    pub fn dependency(name: &str, version: &str) -> Dependency {
        Dependency {
            name: name.to_string(),
            version: Some(version.to_string()),
            requirements: vec![Requirement {
                file: "Gemfile".to_string(),
                groups: vec![Value::String("default".to_string())],
                metadata: None,
                requirement: Some(format!("~> {version}")),
                source: None,
            }],
            ..Default::default()
        }
    }

    /// A dependency bumped from `previous` to `version`.
    pub fn updated_dependency(name: &str, previous: &str, version: &str) -> Dependency {
        let mut dep = Self::dependency(name, version);
        dep.previous_version = Some(previous.to_string());
        dep.previous_requirements = Some(Self::dependency(name, previous).requirements);
        dep
    }

    /// An updated file at the repository root.
    pub fn dependency_file(name: &str, content: &str) -> DependencyFile {
        DependencyFile {
            content: content.to_string(),
            content_encoding: "utf-8".to_string(),
            directory: "/".to_string(),
            name: name.to_string(),
            operation: "update".to_string(),
            file_type: "file".to_string(),
            ..Default::default()
        }
    }

    // =========================================================================
    // Events
    // =========================================================================

    pub fn update_dependency_list(deps: &[(&str, &str)]) -> Event {
        Event::UpdateDependencyList(UpdateDependencyList {
            dependencies: deps
                .iter()
                .map(|(name, version)| Self::dependency(name, version))
                .collect(),
            dependency_files: vec!["/Gemfile".to_string(), "/Gemfile.lock".to_string()],
        })
    }

    /// A pull request updating each `(name, version)` from `0.0.1`.
    pub fn create_pull_request(base_commit_sha: &str, deps: &[(&str, &str)]) -> Event {
        Event::CreatePullRequest(CreatePullRequest {
            base_commit_sha: base_commit_sha.to_string(),
            dependencies: deps
                .iter()
                .map(|(name, version)| Self::updated_dependency(name, "0.0.1", version))
                .collect(),
            updated_dependency_files: vec![Self::dependency_file(
                "Gemfile.lock",
                "GEM\n  specs:\n",
            )],
            pr_title: format!(
                "Bump {}",
                deps.iter().map(|(n, _)| *n).collect::<Vec<_>>().join(", ")
            ),
            pr_body: "Bumps dependencies.".to_string(),
            commit_message: "Bump dependencies".to_string(),
            dependency_group: None,
        })
    }

    pub fn update_pull_request(base_commit_sha: &str, names: &[&str]) -> Event {
        Event::UpdatePullRequest(UpdatePullRequest {
            base_commit_sha: base_commit_sha.to_string(),
            dependency_names: names.iter().map(|n| n.to_string()).collect(),
            updated_dependency_files: vec![Self::dependency_file(
                "Gemfile.lock",
                "GEM\n  specs:\n",
            )],
            ..Default::default()
        })
    }

    pub fn close_pull_request(names: &[&str], reason: &str) -> Event {
        Event::ClosePullRequest(ClosePullRequest {
            dependency_names: names.iter().map(|n| n.to_string()).collect(),
            reason: reason.to_string(),
        })
    }

    pub fn mark_as_processed(base_commit_sha: &str) -> Event {
        Event::MarkAsProcessed(MarkAsProcessed {
            base_commit_sha: base_commit_sha.to_string(),
        })
    }

    pub fn record_package_manager_version(ecosystem: &str, managers: &[(&str, &str)]) -> Event {
        let package_managers: Map<String, Value> = managers
            .iter()
            .map(|(name, version)| (name.to_string(), Value::String(version.to_string())))
            .collect();
        Event::RecordPackageManagerVersion(RecordPackageManagerVersion {
            ecosystem: ecosystem.to_string(),
            package_managers,
        })
    }

    pub fn record_update_job_error(error_type: &str, message: &str) -> Event {
        let mut error_details = Map::new();
        error_details.insert("message".to_string(), Value::String(message.to_string()));
        Event::RecordUpdateJobError(RecordUpdateJobError {
            error_type: error_type.to_string(),
            error_details,
        })
    }

    // =========================================================================
    // Sequences
    // =========================================================================

    /// One event of every kind, in a plausible call order.
    pub fn one_of_each() -> Vec<Event> {
        vec![
            Self::record_package_manager_version("bundler", &[("bundler", "2.5.3")]),
            Self::update_dependency_list(&[("rack", "2.2.3"), ("rails", "7.1.0")]),
            Self::create_pull_request("1a2b3c", &[("rack", "2.2.4")]),
            Self::update_pull_request("1a2b3c", &["rails"]),
            Self::close_pull_request(&["sinatra"], "up_to_date"),
            Self::record_update_job_error("unknown_error", "boom"),
            Self::mark_as_processed("1a2b3c"),
        ]
    }

    /// Wrap events as an expectation list.
    pub fn expectations(events: &[Event]) -> Vec<Expectation> {
        events.iter().cloned().map(Expectation::new).collect()
    }
}
