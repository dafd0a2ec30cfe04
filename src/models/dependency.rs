//! Dependency and file types shared by several update events.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A dependency reported by the update job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Dependency {
    /// Package name.
    pub name: String,

    /// Requirements before the update, if the dependency changed.
    #[serde(
        rename = "previous-requirements",
        skip_serializing_if = "Option::is_none"
    )]
    pub previous_requirements: Option<Vec<Requirement>>,

    /// Version before the update.
    #[serde(rename = "previous-version", skip_serializing_if = "Option::is_none")]
    pub previous_version: Option<String>,

    /// Current requirements.
    pub requirements: Vec<Requirement>,

    /// Resolved version. Null when the version is not pinned.
    pub version: Option<String>,

    /// Whether the dependency was removed by the update.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub removed: bool,

    /// Directory the dependency was found in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory: Option<String>,
}

/// A single requirement line for a dependency.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Requirement {
    /// Manifest file declaring the requirement.
    pub file: String,

    /// Dependency groups, e.g. `dependencies` or `devDependencies`.
    pub groups: Vec<Value>,

    /// Ecosystem-specific metadata.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,

    /// Requirement string. Null when unconstrained.
    pub requirement: Option<String>,

    /// Where the dependency is fetched from. Null for the default registry.
    pub source: Option<Value>,
}

/// A file written by a pull request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DependencyFile {
    pub content: String,
    pub content_encoding: String,
    pub deleted: bool,
    pub directory: String,
    pub name: String,
    pub operation: String,
    pub support_file: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symlink_target: Option<String>,
    #[serde(rename = "type")]
    pub file_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dependency_deserialize_minimal() {
        let yaml = "name: lodash\nversion: 4.17.21\n";
        let dep: Dependency = serde_yaml::from_str(yaml).expect("Failed to deserialize");
        assert_eq!(dep.name, "lodash");
        assert_eq!(dep.version.as_deref(), Some("4.17.21"));
        assert!(dep.requirements.is_empty());
        assert!(!dep.removed);
    }

    #[test]
    fn test_dependency_null_version() {
        let json = r#"{"name": "rails", "version": null, "requirements": []}"#;
        let dep: Dependency = serde_yaml::from_str(json).expect("Failed to deserialize");
        assert!(dep.version.is_none());
    }

    #[test]
    fn test_dependency_rejects_unknown_field() {
        let yaml = "name: lodash\nversoin: 1.0.0\n";
        let result: Result<Dependency, _> = serde_yaml::from_str(yaml);
        assert!(result.is_err());
    }

    #[test]
    fn test_requirement_with_source_and_metadata() {
        let yaml = r#"
file: Gemfile
groups: [default, development]
metadata:
  declaration_string: "gem 'rack'"
requirement: "~> 2.0"
source:
  type: git
  url: https://github.com/rack/rack
"#;
        let req: Requirement = serde_yaml::from_str(yaml).expect("Failed to deserialize");
        assert_eq!(req.file, "Gemfile");
        assert_eq!(req.groups.len(), 2);
        assert_eq!(req.requirement.as_deref(), Some("~> 2.0"));
        assert_eq!(req.source.as_ref().unwrap()["type"], "git");
        assert!(req.metadata.unwrap().contains_key("declaration_string"));
    }

    #[test]
    fn test_dependency_file_type_field() {
        let yaml = r#"
name: package.json
directory: /
type: file
content: "{}"
content_encoding: utf-8
operation: update
"#;
        let file: DependencyFile = serde_yaml::from_str(yaml).expect("Failed to deserialize");
        assert_eq!(file.file_type, "file");
        assert_eq!(file.operation, "update");
        assert!(!file.deleted);
        assert!(file.mode.is_none());
    }
}
