//! Deep structural comparison of expected and actual events.

use serde_json::Value;

use crate::error::{single_line, MismatchError};
use crate::models::Event;

/// Compare two events of the same kind.
///
/// Equality is full structural equality of every field. On mismatch the
/// error names the kind and the path of the first field that differs.
///
/// # Panics
///
/// Panics if the events are of different kinds. Callers check the kind first.
pub fn compare(expected: &Event, actual: &Event) -> Result<(), MismatchError> {
    assert_eq!(
        expected.kind(),
        actual.kind(),
        "compare called with events of different kinds"
    );

    if expected == actual {
        return Ok(());
    }

    Err(MismatchError {
        kind: expected.kind(),
        // Map keys come from the payload and may carry line breaks.
        path: first_difference(&expected.to_json(), &actual.to_json(), String::new())
            .map(|path| single_line(&path)),
    })
}

/// Walk two JSON values in lockstep and return the path of the first difference.
fn first_difference(expected: &Value, actual: &Value, path: String) -> Option<String> {
    match (expected, actual) {
        (Value::Object(e), Value::Object(a)) => {
            for (key, e_val) in e {
                let child = join_key(&path, key);
                match a.get(key) {
                    Some(a_val) => {
                        if let Some(found) = first_difference(e_val, a_val, child) {
                            return Some(found);
                        }
                    }
                    None => return Some(child),
                }
            }
            a.keys()
                .find(|key| !e.contains_key(*key))
                .map(|key| join_key(&path, key))
        }
        (Value::Array(e), Value::Array(a)) => {
            for (i, (e_val, a_val)) in e.iter().zip(a).enumerate() {
                if let Some(found) = first_difference(e_val, a_val, format!("{path}[{i}]")) {
                    return Some(found);
                }
            }
            if e.len() != a.len() {
                return Some(format!("{path}[{}]", e.len().min(a.len())));
            }
            None
        }
        _ if expected == actual => None,
        _ => Some(path),
    }
}

fn join_key(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock_server::Fixtures;
    use crate::models::{ClosePullRequest, EventKind, MarkAsProcessed, RecordUpdateJobError};

    #[test]
    fn test_equal_events_match() {
        for event in Fixtures::one_of_each() {
            assert!(compare(&event, &event.clone()).is_ok());
        }
    }

    #[test]
    fn test_top_level_field_difference() {
        let expected = Fixtures::close_pull_request(&["rack"], "up_to_date");
        let actual = Fixtures::close_pull_request(&["rack"], "dependency_removed");

        let err = compare(&expected, &actual).unwrap_err();

        assert_eq!(err.kind, EventKind::ClosePullRequest);
        assert_eq!(err.path.as_deref(), Some("reason"));
    }

    #[test]
    fn test_nested_field_difference() {
        let expected = Fixtures::update_dependency_list(&[("rack", "2.2.3"), ("rails", "7.1.0")]);
        let actual = Fixtures::update_dependency_list(&[("rack", "2.2.3"), ("rails", "7.1.1")]);

        let err = compare(&expected, &actual).unwrap_err();

        assert_eq!(err.path.as_deref(), Some("dependencies[1].version"));
        assert_eq!(
            err.to_string(),
            "dependency list was unexpected (first difference at dependencies[1].version)"
        );
    }

    #[test]
    fn test_sequence_length_difference() {
        let expected = Event::ClosePullRequest(ClosePullRequest {
            dependency_names: vec!["a".into(), "b".into()],
            reason: "up_to_date".into(),
        });
        let actual = Event::ClosePullRequest(ClosePullRequest {
            dependency_names: vec!["a".into()],
            reason: "up_to_date".into(),
        });

        let err = compare(&expected, &actual).unwrap_err();

        assert_eq!(err.path.as_deref(), Some("dependency-names[1]"));
    }

    #[test]
    fn test_path_with_line_break_in_key_is_single_line() {
        let expected = job_error_with_detail("line\nbreak", "one");
        let actual = job_error_with_detail("line\nbreak", "two");

        let err = compare(&expected, &actual).unwrap_err();

        assert_eq!(err.path.as_deref(), Some("error-details.linebreak"));
        assert!(!err.to_string().contains('\n'));
    }

    fn job_error_with_detail(key: &str, value: &str) -> Event {
        let mut error_details = serde_json::Map::new();
        error_details.insert(key.to_string(), Value::String(value.to_string()));
        Event::RecordUpdateJobError(RecordUpdateJobError {
            error_type: "unknown_error".into(),
            error_details,
        })
    }

    #[test]
    fn test_order_matters_in_sequences() {
        let expected = Fixtures::close_pull_request(&["a", "b"], "up_to_date");
        let actual = Fixtures::close_pull_request(&["b", "a"], "up_to_date");

        assert!(compare(&expected, &actual).is_err());
    }

    #[test]
    #[should_panic(expected = "different kinds")]
    fn test_different_kinds_panics() {
        let expected = Event::MarkAsProcessed(MarkAsProcessed::default());
        let actual = Event::ClosePullRequest(ClosePullRequest::default());
        let _ = compare(&expected, &actual);
    }
}
