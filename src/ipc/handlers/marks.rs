use serde_json::json;

use crate::error::Result;
use crate::ipc::error::{fail, ok};
use crate::ipc::helpers::{
    delete_record, drain_pushes, log_activity, page_json, page_query, parts, require_i64,
    require_str, save_record, session_ref, with_notices, FormMode,
};
use crate::ipc::types::{AppState, Request};
use crate::listview::{self, contains_ci, UNKNOWN};
use crate::models::SessionalMark;
use crate::sanitize::escape_html;
use crate::state::Collection;
use crate::validate;

fn marks_save(state: &mut AppState, req: &Request) -> Result<serde_json::Value> {
    let class_id = require_str(&req.params, "classId")?.to_string();
    let student_id = require_str(&req.params, "studentId")?.to_string();
    let subject = escape_html(require_str(&req.params, "subject")?);
    let exam_type = require_str(&req.params, "examType")?.to_string();
    let marks = require_i64(&req.params, "marks")?;
    let max_marks = require_i64(&req.params, "maxMarks")?;
    let date = require_str(&req.params, "date")?.to_string();
    let mode = FormMode::from_params(&req.params);

    // Rejected before any store call: an out-of-range mark never issues a
    // write.
    validate::check_marks(marks, max_marks)?;

    let (store, session) = parts(state)?;
    let body = serde_json::to_value(SessionalMark {
        id: String::new(),
        student_id,
        class_id,
        subject: subject.clone(),
        exam_type,
        marks,
        max_marks,
        date,
    })
    .expect("mark serialize");
    let mark_id = save_record(store, session, Collection::SessionalMarks, &mode, &body)?;

    let action = match mode {
        FormMode::Create => format!("Assigned marks for {subject}"),
        FormMode::Edit(_) => format!("Updated marks for {subject}"),
    };
    log_activity(store, session, action);
    let notices = drain_pushes(store, session);
    Ok(with_notices(
        json!({
            "markId": mark_id,
            "revision": session.state.revision(Collection::SessionalMarks),
        }),
        notices,
    ))
}

fn marks_page(state: &mut AppState, req: &Request) -> Result<serde_json::Value> {
    let query = page_query(&req.params, "classId");
    let session = session_ref(state)?;
    let view = &session.state;

    let page = listview::render_page(
        view.sessional_marks(),
        &query,
        |m, needle| {
            contains_ci(&m.subject, needle)
                || view
                    .student_name(&m.student_id)
                    .map(|name| contains_ci(name, needle))
                    .unwrap_or(false)
        },
        |m, class_id| m.class_id == class_id,
        |m| {
            json!({
                "id": m.id,
                "student": view.student_name(&m.student_id).unwrap_or(UNKNOWN),
                "className": view.class_name(&m.class_id).unwrap_or(UNKNOWN),
                "subject": m.subject,
                "examType": m.exam_type,
                "score": format!("{}/{}", m.marks, m.max_marks),
                "date": m.date,
            })
        },
    );
    Ok(page_json(page))
}

fn marks_delete(state: &mut AppState, req: &Request) -> Result<serde_json::Value> {
    let mark_id = require_str(&req.params, "markId")?.to_string();
    let (store, session) = parts(state)?;

    delete_record(store, session, Collection::SessionalMarks, &mark_id)?;
    log_activity(store, session, format!("Deleted marks ID: {mark_id}"));
    let notices = drain_pushes(store, session);
    Ok(with_notices(json!({ "ok": true }), notices))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "marks.save" => marks_save(state, req),
        "marks.page" => marks_page(state, req),
        "marks.delete" => marks_delete(state, req),
        _ => return None,
    };
    Some(match result {
        Ok(value) => ok(&req.id, value),
        Err(e) => fail(&req.id, &e),
    })
}
