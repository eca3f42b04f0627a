use serde_json::json;

use crate::error::{Result, ValidationError};
use crate::ipc::error::{fail, ok};
use crate::ipc::helpers::{
    delete_record, drain_pushes, log_activity, page_json, page_query, parts, require_str,
    save_record, session_ref, upload_attachment, with_notices, FormMode,
};
use crate::ipc::types::{AppState, Request};
use crate::listview::{self, contains_ci, UNKNOWN};
use crate::models::{Homework, HomeworkStatus, HomeworkTarget};
use crate::sanitize::escape_html;
use crate::state::Collection;
use crate::validate;

fn parse_target(raw: &str) -> Result<HomeworkTarget> {
    match raw {
        "all" => Ok(HomeworkTarget::All),
        "student" => Ok(HomeworkTarget::Student),
        "class" => Ok(HomeworkTarget::Class),
        other => {
            Err(ValidationError::BadParams(format!("unknown homework target: {other}")).into())
        }
    }
}

fn homework_save(state: &mut AppState, req: &Request) -> Result<serde_json::Value> {
    let title = escape_html(require_str(&req.params, "title")?);
    let description = escape_html(require_str(&req.params, "description")?);
    let due_date = require_str(&req.params, "dueDate")?.to_string();
    let target = parse_target(require_str(&req.params, "target")?)?;
    let target_specific = match target {
        HomeworkTarget::All => String::new(),
        _ => require_str(&req.params, "targetSpecific")?.to_string(),
    };
    let mode = FormMode::from_params(&req.params);
    let (store, session) = parts(state)?;

    // The attachment is uploaded before the record write; a failure here
    // aborts the submission with no record written.
    let owner_id = session.identity.owner_id.clone();
    let uploaded = upload_attachment(
        store,
        &owner_id,
        Collection::Homework,
        validate::HOMEWORK_ATTACHMENT,
        &req.params,
    )?;
    // Editing without a new attachment keeps the previously uploaded file.
    let file_url = match (&uploaded, &mode) {
        (Some(url), _) => url.clone(),
        (None, FormMode::Edit(id)) => session
            .state
            .homework()
            .iter()
            .find(|h| h.id == *id)
            .map(|h| h.file_url.clone())
            .unwrap_or_default(),
        (None, FormMode::Create) => String::new(),
    };

    // Assigned or re-assigned homework always starts out pending.
    let body = serde_json::to_value(Homework {
        id: String::new(),
        title: title.clone(),
        description,
        due_date,
        target,
        target_specific,
        file_url: file_url.clone(),
        status: HomeworkStatus::Pending,
    })
    .expect("homework serialize");
    let homework_id = save_record(store, session, Collection::Homework, &mode, &body)?;

    let action = match mode {
        FormMode::Create => format!("Assigned homework: {title}"),
        FormMode::Edit(_) => format!("Updated homework: {title}"),
    };
    log_activity(store, session, action);
    let notices = drain_pushes(store, session);
    Ok(with_notices(
        json!({
            "homeworkId": homework_id,
            "fileUrl": file_url,
            "revision": session.state.revision(Collection::Homework),
        }),
        notices,
    ))
}

fn homework_page(state: &mut AppState, req: &Request) -> Result<serde_json::Value> {
    let query = page_query(&req.params, "status");
    let session = session_ref(state)?;
    let view = &session.state;

    let page = listview::render_page(
        view.homework(),
        &query,
        |h, needle| contains_ci(&h.title, needle),
        |h, status| match h.status {
            HomeworkStatus::Pending => status == "Pending",
            HomeworkStatus::Submitted => status == "Submitted",
        },
        |h| {
            let assigned_to = match h.target {
                HomeworkTarget::All => "All Students",
                HomeworkTarget::Student => {
                    view.student_name(&h.target_specific).unwrap_or(UNKNOWN)
                }
                HomeworkTarget::Class => view.class_name(&h.target_specific).unwrap_or(UNKNOWN),
            };
            json!({
                "id": h.id,
                "title": h.title,
                "assignedTo": assigned_to,
                "dueDate": h.due_date,
                "status": h.status,
                "fileUrl": if h.file_url.is_empty() { None } else { Some(h.file_url.clone()) },
            })
        },
    );
    Ok(page_json(page))
}

fn homework_delete(state: &mut AppState, req: &Request) -> Result<serde_json::Value> {
    let homework_id = require_str(&req.params, "homeworkId")?.to_string();
    let (store, session) = parts(state)?;

    delete_record(store, session, Collection::Homework, &homework_id)?;
    log_activity(store, session, format!("Deleted homework ID: {homework_id}"));
    let notices = drain_pushes(store, session);
    Ok(with_notices(json!({ "ok": true }), notices))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "homework.save" => homework_save(state, req),
        "homework.page" => homework_page(state, req),
        "homework.delete" => homework_delete(state, req),
        _ => return None,
    };
    Some(match result {
        Ok(value) => ok(&req.id, value),
        Err(e) => fail(&req.id, &e),
    })
}
