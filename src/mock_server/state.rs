//! Run state for the fake API.
//!
//! Holds everything a run accumulates. The server keeps a single instance
//! behind one lock so the cursor, the observed sequence and the error list
//! always move together.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::error::{single_line, RecordedError};
use crate::mock_server::matcher::ExpectationCursor;
use crate::models::{Event, EventKind, Expectation, ObservedCall};
use crate::output::RunReport;

/// Shared, lockable run state.
pub type SharedRunState = Arc<RwLock<RunState>>;

#[derive(Debug, Default)]
pub struct RunState {
    matcher: ExpectationCursor,
    observed: Vec<ObservedCall>,
    errors: Vec<RecordedError>,
    commit: Option<String>,
}

impl RunState {
    /// Create state for a run. An empty list selects update mode.
    pub fn new(expectations: Vec<Expectation>) -> Self {
        Self {
            matcher: ExpectationCursor::new(expectations),
            ..Default::default()
        }
    }

    /// Create state wrapped in Arc<RwLock> for sharing.
    pub fn shared(self) -> SharedRunState {
        Arc::new(RwLock::new(self))
    }

    /// Record one inbound call whose body was read successfully.
    ///
    /// `path` is the request path; its last segment is the kind.
    pub fn handle_call(&mut self, path: &str, body: &[u8]) {
        let kind = kind_from_path(path);

        let event = match Event::decode(kind, body) {
            Ok(event) => Some(event),
            Err(err) => {
                self.push_error(err.into());
                None
            }
        };

        self.push_result(kind, event.clone());

        if !self.matcher.is_enabled() {
            // An update run has nothing to check this against, so the log is
            // the only place it shows up.
            if let Some(Event::RecordUpdateJobError(job_error)) = &event {
                tracing::info!(
                    error_type = %job_error.error_type,
                    details = %serde_json::Value::Object(job_error.error_details.clone()),
                    "update-job error"
                );
            }
            return;
        }

        if let Err(err) = self.matcher.check(kind, event.as_ref()) {
            self.push_error(err);
        }
    }

    /// Record an error, logging its single-line form.
    pub fn push_error(&mut self, err: RecordedError) {
        tracing::warn!("{}", single_line(&err.to_string()));
        self.errors.push(err);
    }

    fn push_result(&mut self, kind: &str, event: Option<Event>) {
        if let Some(Event::MarkAsProcessed(processed)) = &event {
            tracing::debug!(commit = %processed.base_commit_sha, "recorded processed commit");
            self.commit = Some(processed.base_commit_sha.clone());
        }
        self.observed.push(ObservedCall {
            kind: kind.to_string(),
            event,
        });
    }

    /// Flush every unconsumed expectation into the error list.
    pub fn complete(&mut self) {
        for err in self.matcher.complete() {
            self.push_error(err);
        }
    }

    pub fn observed(&self) -> &[ObservedCall] {
        &self.observed
    }

    pub fn errors(&self) -> &[RecordedError] {
        &self.errors
    }

    /// The commit from the latest `mark_as_processed` call.
    pub fn commit(&self) -> Option<&str> {
        self.commit.as_deref()
    }

    pub fn cursor(&self) -> usize {
        self.matcher.position()
    }

    /// Kinds still waiting to be called.
    pub fn pending(&self) -> Vec<EventKind> {
        self.matcher.expectations()[self.matcher.position().min(self.matcher.expectations().len())..]
            .iter()
            .map(Expectation::kind)
            .collect()
    }

    /// Snapshot the run for reporting.
    pub fn report(&self) -> RunReport {
        RunReport {
            observed: self.observed.clone(),
            errors: self.errors.clone(),
            commit: self.commit.clone(),
        }
    }
}

/// The last path segment, ignoring any query string.
fn kind_from_path(path: &str) -> &str {
    let path = path.split(['?', '#']).next().unwrap_or(path);
    path.rsplit('/').next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock_server::Fixtures;
    use crate::models::RecordUpdateJobError;
    use crate::output::PrettyPrint;

    fn call(state: &mut RunState, event: &Event) {
        let body = event.encode().unwrap();
        state.handle_call(&format!("/update_jobs/1/{}", event.kind()), &body);
    }

    #[test]
    fn test_kind_from_path() {
        assert_eq!(kind_from_path("/update_jobs/1/mark_as_processed"), "mark_as_processed");
        assert_eq!(kind_from_path("mark_as_processed"), "mark_as_processed");
        assert_eq!(kind_from_path("/a/close_pull_request?x=1"), "close_pull_request");
        assert_eq!(kind_from_path("/a/"), "");
    }

    #[test]
    fn test_update_mode_records_without_errors() {
        let mut state = RunState::new(vec![]);
        let events = Fixtures::one_of_each();

        for event in &events {
            call(&mut state, event);
        }
        state.complete();

        assert!(state.errors().is_empty());
        let observed: Vec<_> = state.observed().iter().map(|c| c.event.clone().unwrap()).collect();
        assert_eq!(observed, events);
    }

    #[test]
    fn test_matching_run_has_no_errors() {
        let e0 = Fixtures::update_dependency_list(&[("rack", "2.2.3")]);
        let e1 = Fixtures::mark_as_processed("abc123");
        let mut state = RunState::new(Fixtures::expectations(&[e0.clone(), e1.clone()]));

        call(&mut state, &e0);
        call(&mut state, &e1);
        state.complete();

        assert!(state.errors().is_empty());
        assert_eq!(state.cursor(), 2);
    }

    #[test]
    fn test_decode_failure_is_recorded_and_call_kept() {
        let mut state = RunState::new(vec![]);

        state.handle_call("/update_jobs/1/mark_as_processed", br#"{"data": {"sha": "x"}}"#);

        assert_eq!(state.errors().len(), 1);
        assert!(matches!(state.errors()[0], RecordedError::Decode(_)));
        assert_eq!(state.observed().len(), 1);
        assert_eq!(state.observed()[0].kind, "mark_as_processed");
        assert!(state.observed()[0].event.is_none());
    }

    #[test]
    fn test_empty_body_does_not_overwrite_commit() {
        let mut state = RunState::new(vec![]);
        call(&mut state, &Fixtures::mark_as_processed("abc123"));

        state.handle_call("/update_jobs/1/mark_as_processed", b"");

        assert_eq!(state.commit(), Some("abc123"));
        assert_eq!(state.errors().len(), 1);
        assert!(matches!(state.errors()[0], RecordedError::Decode(_)));
        assert!(state.observed()[1].event.is_none());
    }

    #[test]
    fn test_mismatch_on_key_with_line_break_is_recorded_on_one_line() {
        let mut expected_details = serde_json::Map::new();
        expected_details.insert("line\nbreak".to_string(), "one".into());
        let expected = Event::RecordUpdateJobError(RecordUpdateJobError {
            error_type: "unknown_error".to_string(),
            error_details: expected_details,
        });
        let mut state = RunState::new(Fixtures::expectations(&[expected]));

        state.handle_call(
            "/update_jobs/1/record_update_job_error",
            br#"{"data": {"error-type": "unknown_error", "error-details": {"line\nbreak": "two"}}}"#,
        );

        assert_eq!(state.errors().len(), 1);
        assert!(matches!(state.errors()[0], RecordedError::Mismatch(_)));
        let report = state.report();
        assert!(report.errors.iter().all(|err| !err.to_string().contains('\n')));
        assert!(!report.pretty_print().contains("line\nbreak"));
    }

    #[test]
    fn test_unknown_kind_recorded_with_kind_in_message() {
        let mut state = RunState::new(vec![]);

        state.handle_call("/update_jobs/1/increment_metric", b"{}");

        assert_eq!(state.errors().len(), 1);
        assert!(state.errors()[0].to_string().contains("increment_metric"));
        assert_eq!(state.observed()[0].kind, "increment_metric");
    }

    #[test]
    fn test_commit_tracks_latest_mark_as_processed() {
        let mut state = RunState::new(vec![]);

        call(&mut state, &Fixtures::mark_as_processed("first"));
        assert_eq!(state.commit(), Some("first"));

        call(&mut state, &Fixtures::mark_as_processed("second"));
        assert_eq!(state.commit(), Some("second"));
    }

    #[test]
    fn test_pending_shrinks_as_calls_arrive() {
        let e0 = Fixtures::update_dependency_list(&[("rack", "2.2.3")]);
        let e1 = Fixtures::mark_as_processed("abc123");
        let mut state = RunState::new(Fixtures::expectations(&[e0.clone(), e1]));

        assert_eq!(state.pending().len(), 2);
        call(&mut state, &e0);
        assert_eq!(state.pending(), vec![EventKind::MarkAsProcessed]);
    }

    #[test]
    fn test_report_snapshot() {
        let mut state = RunState::new(Fixtures::expectations(&[Fixtures::mark_as_processed("a")]));
        state.complete();

        let report = state.report();

        assert!(!report.passed());
        assert_eq!(report.errors.len(), 1);
        assert!(report.observed.is_empty());
    }
}
