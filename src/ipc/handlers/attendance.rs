use std::collections::BTreeMap;

use serde_json::json;

use crate::auth;
use crate::error::{Result, ValidationError};
use crate::ipc::error::{fail, ok};
use crate::ipc::helpers::{drain_pushes, log_activity, opt_str, parts, require_str, session_ref, with_notices};
use crate::ipc::types::{AppState, Request};
use crate::models::{AttendanceSheet, AttendanceStatus};
use crate::state::Collection;

fn parse_status(raw: &str) -> Result<AttendanceStatus> {
    match raw {
        "Present" => Ok(AttendanceStatus::Present),
        "Absent" => Ok(AttendanceStatus::Absent),
        other => {
            Err(ValidationError::BadParams(format!("unknown attendance status: {other}")).into())
        }
    }
}

/// Roster for marking today's attendance.
fn attendance_sheet(state: &mut AppState, req: &Request) -> Result<serde_json::Value> {
    let class_id = require_str(&req.params, "classId")?;
    let session = session_ref(state)?;
    let rows: Vec<serde_json::Value> = session
        .state
        .students()
        .iter()
        .filter(|s| s.class_id == class_id)
        .map(|s| json!({ "studentId": s.id, "name": s.name, "rollNumber": s.roll_number }))
        .collect();
    let no_records = rows.is_empty();
    Ok(json!({ "rows": rows, "noRecords": no_records }))
}

fn attendance_save(state: &mut AppState, req: &Request) -> Result<serde_json::Value> {
    let class_id = require_str(&req.params, "classId")?.to_string();
    let entries_raw = req
        .params
        .get("entries")
        .and_then(|v| v.as_object())
        .ok_or(ValidationError::MissingField("entries"))?;
    let mut entries: BTreeMap<String, AttendanceStatus> = BTreeMap::new();
    for (student_id, status) in entries_raw {
        let raw = status
            .as_str()
            .ok_or_else(|| ValidationError::BadParams("entries values must be strings".to_string()))?;
        entries.insert(student_id.clone(), parse_status(raw)?);
    }
    let date = match opt_str(&req.params, "date") {
        Some(d) if !d.is_empty() => d.to_string(),
        _ => chrono::Local::now().date_naive().to_string(),
    };
    let (store, session) = parts(state)?;

    auth::refresh_token(store, &mut session.identity)?;
    let owner_id = session.identity.owner_id.clone();

    // One document per class; the (class, date) node is overwritten
    // wholesale, never merged with a previous save for the same day.
    let mut sheet = store
        .read(&owner_id, Collection::Attendance.path(), &class_id)?
        .and_then(|raw| serde_json::from_value::<AttendanceSheet>(raw).ok())
        .unwrap_or(AttendanceSheet {
            id: String::new(),
            days: BTreeMap::new(),
        });
    let recorded = entries.len();
    sheet.days.insert(date.clone(), entries);
    sheet.id = String::new();
    let body = serde_json::to_value(&sheet).expect("attendance serialize");
    store.overwrite(&owner_id, Collection::Attendance.path(), &class_id, &body)?;

    log_activity(store, session, format!("Saved attendance for class ID: {class_id}"));
    let notices = drain_pushes(store, session);
    Ok(with_notices(
        json!({ "classId": class_id, "date": date, "recorded": recorded }),
        notices,
    ))
}

/// Read-back view for a previous day: one row per student in the class,
/// with "Not Recorded" for anyone absent from that day's map.
fn attendance_past(state: &mut AppState, req: &Request) -> Result<serde_json::Value> {
    let class_id = require_str(&req.params, "classId")?;
    let date = require_str(&req.params, "date")?;
    let session = session_ref(state)?;
    let view = &session.state;

    let day = view
        .attendance()
        .iter()
        .find(|sheet| sheet.id == class_id)
        .and_then(|sheet| sheet.days.get(date));

    let rows: Vec<serde_json::Value> = view
        .students()
        .iter()
        .filter(|s| s.class_id == class_id)
        .map(|s| {
            let status = day
                .and_then(|d| d.get(&s.id))
                .map(|st| serde_json::to_value(st).expect("status serialize"))
                .unwrap_or_else(|| json!("Not Recorded"));
            json!({
                "studentId": s.id,
                "name": s.name,
                "rollNumber": s.roll_number,
                "status": status,
            })
        })
        .collect();
    let no_records = rows.is_empty();
    Ok(json!({ "rows": rows, "noRecords": no_records }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "attendance.sheet" => attendance_sheet(state, req),
        "attendance.save" => attendance_save(state, req),
        "attendance.past" => attendance_past(state, req),
        _ => return None,
    };
    Some(match result {
        Ok(value) => ok(&req.id, value),
        Err(e) => fail(&req.id, &e),
    })
}
