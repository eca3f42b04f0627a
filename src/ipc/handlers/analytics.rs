use serde_json::json;

use crate::analytics;
use crate::error::Result;
use crate::ipc::error::{fail, ok};
use crate::ipc::helpers::session_ref;
use crate::ipc::types::{AppState, Request};

/// The three dashboard charts, recomputed lazily from the current mirrors.
fn analytics_snapshot(state: &mut AppState) -> Result<serde_json::Value> {
    let session = session_ref(state)?;
    let snapshot = session.state.analytics_snapshot();
    Ok(json!({
        "homeworkCompletion": snapshot.homework_completion,
        "studentWorkload": snapshot.student_workload,
        "averageMarks": snapshot.average_marks,
    }))
}

fn home_summary(state: &mut AppState) -> Result<serde_json::Value> {
    let session = session_ref(state)?;
    let summary = analytics::home_summary(session.state.students(), session.state.homework());
    Ok(serde_json::to_value(summary).expect("summary serialize"))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "analytics.snapshot" => analytics_snapshot(state),
        "home.summary" => home_summary(state),
        _ => return None,
    };
    Some(match result {
        Ok(value) => ok(&req.id, value),
        Err(e) => fail(&req.id, &e),
    })
}
