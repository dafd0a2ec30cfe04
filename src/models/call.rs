//! A single call received by the fake API.

use serde::Serialize;

use crate::models::event::Event;

/// One entry of the observed sequence, in call-arrival order.
///
/// `kind` is the raw last path segment, so it may name a kind that does not
/// exist. `event` is `None` when the payload failed to decode.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObservedCall {
    pub kind: String,
    pub event: Option<Event>,
}

impl ObservedCall {
    pub fn is_decoded(&self) -> bool {
        self.event.is_some()
    }
}
