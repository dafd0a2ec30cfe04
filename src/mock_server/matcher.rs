//! Ordered expectation matching.
//!
//! The cursor walks the expectation list in lockstep with inbound calls. Each
//! checked call consumes exactly one expectation, whether or not it matches,
//! so a single bad call never makes the rest of the run misalign.

use crate::compare::compare;
use crate::error::RecordedError;
use crate::models::{Event, Expectation};

/// Cursor over an immutable, ordered expectation list.
#[derive(Debug, Default)]
pub struct ExpectationCursor {
    expectations: Vec<Expectation>,
    cursor: usize,
}

impl ExpectationCursor {
    pub fn new(expectations: Vec<Expectation>) -> Self {
        Self {
            expectations,
            cursor: 0,
        }
    }

    /// Matching is disabled when no expectations were supplied (update mode).
    pub fn is_enabled(&self) -> bool {
        !self.expectations.is_empty()
    }

    /// True once every expectation has been consumed.
    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.expectations.len()
    }

    /// Index of the next expectation to be consumed.
    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn expectations(&self) -> &[Expectation] {
        &self.expectations
    }

    /// Check one inbound call against the next expectation.
    ///
    /// `actual` is `None` when the payload failed to decode. The decode
    /// failure is already recorded, so the slot is consumed and only the kind
    /// is checked.
    pub fn check(&mut self, kind: &str, actual: Option<&Event>) -> Result<(), RecordedError> {
        let Some(expected) = self.expectations.get(self.cursor) else {
            return Err(RecordedError::MissingExpectation {
                kind: kind.to_string(),
            });
        };
        self.cursor += 1;

        if kind != expected.kind().as_str() {
            return Err(RecordedError::KindMismatch {
                expected: expected.kind(),
                actual: kind.to_string(),
            });
        }

        match actual {
            Some(actual) => compare(&expected.event, actual).map_err(RecordedError::from),
            None => Ok(()),
        }
    }

    /// Consume every remaining expectation, one "not met" error each.
    pub fn complete(&mut self) -> Vec<RecordedError> {
        let remaining = self.expectations[self.cursor.min(self.expectations.len())..]
            .iter()
            .map(|exp| RecordedError::ExpectationNotMet {
                kind: exp.kind(),
                expected: exp.event.to_json(),
            })
            .collect();
        self.cursor = self.expectations.len();
        remaining
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock_server::Fixtures;
    use crate::models::EventKind;

    fn cursor_for(events: &[Event]) -> ExpectationCursor {
        ExpectationCursor::new(events.iter().cloned().map(Expectation::new).collect())
    }

    fn check(cursor: &mut ExpectationCursor, event: &Event) -> Result<(), RecordedError> {
        cursor.check(event.kind().as_str(), Some(event))
    }

    #[test]
    fn test_empty_list_is_disabled() {
        let cursor = ExpectationCursor::new(vec![]);
        assert!(!cursor.is_enabled());
        assert!(cursor.is_exhausted());
    }

    #[test]
    fn test_all_expectations_met() {
        let e0 = Fixtures::update_dependency_list(&[("rack", "2.2.3")]);
        let e1 = Fixtures::mark_as_processed("abc123");
        let mut cursor = cursor_for(&[e0.clone(), e1.clone()]);

        assert!(check(&mut cursor, &e0).is_ok());
        assert!(check(&mut cursor, &e1).is_ok());

        assert!(cursor.complete().is_empty());
        assert!(cursor.is_exhausted());
    }

    #[test]
    fn test_unconsumed_expectation_reported_at_completion() {
        let e0 = Fixtures::update_dependency_list(&[("rack", "2.2.3")]);
        let e1 = Fixtures::mark_as_processed("abc123");
        let mut cursor = cursor_for(&[e0.clone(), e1]);

        assert!(check(&mut cursor, &e0).is_ok());
        let errors = cursor.complete();

        assert_eq!(errors.len(), 1);
        assert!(matches!(
            errors[0],
            RecordedError::ExpectationNotMet { kind: EventKind::MarkAsProcessed, .. }
        ));
        assert!(!errors[0].to_string().contains('\n'));
    }

    #[test]
    fn test_complete_twice_reports_once() {
        let mut cursor = cursor_for(&[Fixtures::mark_as_processed("abc")]);
        assert_eq!(cursor.complete().len(), 1);
        assert!(cursor.complete().is_empty());
    }

    #[test]
    fn test_extra_call_is_missing_expectation() {
        let e0 = Fixtures::update_dependency_list(&[("rack", "2.2.3")]);
        let e1 = Fixtures::mark_as_processed("abc123");
        let mut cursor = cursor_for(&[e0.clone()]);

        assert!(check(&mut cursor, &e0).is_ok());
        let err = check(&mut cursor, &e1).unwrap_err();

        assert_eq!(
            err,
            RecordedError::MissingExpectation {
                kind: "mark_as_processed".to_string()
            }
        );
        assert_eq!(cursor.position(), 1);
        assert!(cursor.complete().is_empty());
    }

    #[test]
    fn test_kind_mismatch_consumes_slot() {
        let expected = Fixtures::create_pull_request("abc123", &[("rack", "2.2.4")]);
        let actual = Fixtures::close_pull_request(&["rack"], "up_to_date");
        let mut cursor = cursor_for(&[expected]);

        let err = check(&mut cursor, &actual).unwrap_err();

        assert_eq!(
            err,
            RecordedError::KindMismatch {
                expected: EventKind::CreatePullRequest,
                actual: "close_pull_request".to_string(),
            }
        );
        assert_eq!(
            err.to_string(),
            "type was unexpected: expected create_pull_request got close_pull_request"
        );
        assert_eq!(cursor.position(), 1);
        assert!(cursor.complete().is_empty());
    }

    #[test]
    fn test_value_mismatch_does_not_resynchronize() {
        let e0 = Fixtures::mark_as_processed("aaa");
        let e1 = Fixtures::mark_as_processed("bbb");
        let mut cursor = cursor_for(&[e0, e1.clone()]);

        // The first call carries the second expectation's value.
        assert!(matches!(
            check(&mut cursor, &e1),
            Err(RecordedError::Mismatch(_))
        ));
        assert!(check(&mut cursor, &e1).is_ok());
        assert_eq!(cursor.position(), 2);
    }

    #[test]
    fn test_undecoded_call_with_matching_kind_consumes_slot_silently() {
        let mut cursor = cursor_for(&[Fixtures::mark_as_processed("abc")]);

        assert!(cursor.check("mark_as_processed", None).is_ok());
        assert_eq!(cursor.position(), 1);
    }

    #[test]
    fn test_unknown_kind_is_kind_mismatch() {
        let mut cursor = cursor_for(&[Fixtures::mark_as_processed("abc")]);

        let err = cursor.check("bogus", None).unwrap_err();

        assert!(matches!(err, RecordedError::KindMismatch { ref actual, .. } if actual == "bogus"));
    }
}
