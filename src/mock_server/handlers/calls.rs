//! Update call handler.

use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    extract::State,
    http::{StatusCode, Uri},
};

use crate::error::RecordedError;
use crate::mock_server::state::SharedRunState;

/// State handed to every request.
#[derive(Clone)]
pub struct HandlerState {
    pub run: SharedRunState,
    pub body_read_timeout: Duration,
}

/// ANY /.../{kind}
///
/// Always answers 200 with an empty body. Problems with the call are
/// recorded in the run state, not reported to the caller.
pub async fn record_call(
    State(state): State<HandlerState>,
    uri: Uri,
    body: Body,
) -> StatusCode {
    let bytes = match tokio::time::timeout(state.body_read_timeout, to_bytes(body, usize::MAX)).await
    {
        Ok(Ok(bytes)) => bytes,
        Ok(Err(err)) => {
            state.run.write().await.push_error(RecordedError::read_body(err));
            return StatusCode::OK;
        }
        Err(_) => {
            state.run.write().await.push_error(RecordedError::read_body(format!(
                "timed out after {:?}",
                state.body_read_timeout
            )));
            return StatusCode::OK;
        }
    };

    state.run.write().await.handle_call(uri.path(), &bytes);

    StatusCode::OK
}
