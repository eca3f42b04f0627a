use serde_json::json;

use crate::error::{Result, ValidationError};
use crate::ipc::error::{fail, ok};
use crate::ipc::helpers::{
    delete_record, drain_pushes, log_activity, page_json, page_query, parts, require_str,
    save_record, session_ref, with_notices, FormMode,
};
use crate::ipc::types::{AppState, Request};
use crate::listview::{self, contains_ci, UNKNOWN};
use crate::models::Student;
use crate::sanitize::escape_html;
use crate::state::Collection;

fn students_save(state: &mut AppState, req: &Request) -> Result<serde_json::Value> {
    let name = escape_html(require_str(&req.params, "name")?);
    let roll_number = escape_html(require_str(&req.params, "rollNumber")?);
    let class_id = require_str(&req.params, "classId")?.to_string();
    let password = require_str(&req.params, "password")?.to_string();
    let mode = FormMode::from_params(&req.params);
    let (store, session) = parts(state)?;

    if session.state.classes().is_empty() {
        return Err(ValidationError::BadParams("please create a class first".to_string()).into());
    }

    let body = serde_json::to_value(Student {
        id: String::new(),
        name: name.clone(),
        roll_number,
        class_id,
        password,
    })
    .expect("student serialize");
    let student_id = save_record(store, session, Collection::Students, &mode, &body)?;

    let action = match mode {
        FormMode::Create => format!("Added student: {name}"),
        FormMode::Edit(_) => format!("Updated student: {name}"),
    };
    log_activity(store, session, action);
    let notices = drain_pushes(store, session);
    Ok(with_notices(
        json!({
            "studentId": student_id,
            "revision": session.state.revision(Collection::Students),
        }),
        notices,
    ))
}

fn students_page(state: &mut AppState, req: &Request) -> Result<serde_json::Value> {
    let query = page_query(&req.params, "classId");
    let session = session_ref(state)?;
    let view = &session.state;

    let page = listview::render_page(
        view.students(),
        &query,
        |s, needle| contains_ci(&s.name, needle) || contains_ci(&s.roll_number, needle),
        |s, class_id| s.class_id == class_id,
        |s| {
            json!({
                "id": s.id,
                "name": s.name,
                "rollNumber": s.roll_number,
                "className": view.class_name(&s.class_id).unwrap_or(UNKNOWN),
            })
        },
    );
    Ok(page_json(page))
}

fn students_delete(state: &mut AppState, req: &Request) -> Result<serde_json::Value> {
    let student_id = require_str(&req.params, "studentId")?.to_string();
    let (store, session) = parts(state)?;

    delete_record(store, session, Collection::Students, &student_id)?;
    log_activity(store, session, format!("Deleted student ID: {student_id}"));
    let notices = drain_pushes(store, session);
    Ok(with_notices(json!({ "ok": true }), notices))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "students.save" => students_save(state, req),
        "students.page" => students_page(state, req),
        "students.delete" => students_delete(state, req),
        _ => return None,
    };
    Some(match result {
        Ok(value) => ok(&req.id, value),
        Err(e) => fail(&req.id, &e),
    })
}
