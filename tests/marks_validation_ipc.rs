use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_edupaneld");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn edupaneld");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn request(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({
        "id": id,
        "method": method,
        "params": params,
    });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    assert!(!line.trim().is_empty(), "empty response for {}", method);
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    value
}

fn request_ok(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let value = request(stdin, reader, id, method, params);
    assert!(
        value.get("ok").and_then(|v| v.as_bool()).unwrap_or(false),
        "{} failed: {}",
        method,
        value
    );
    value.get("result").cloned().unwrap_or_else(|| json!({}))
}

/// Returns (class_id, student_id) for a freshly seeded roster.
fn seed_roster(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    workspace: &PathBuf,
) -> (String, String) {
    let _ = request_ok(
        stdin,
        reader,
        "seed-1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let _ = request_ok(
        stdin,
        reader,
        "seed-2",
        "auth.register",
        json!({
            "email": "teacher@example.com",
            "password": "Sunlit#Meadow9",
            "confirmPassword": "Sunlit#Meadow9"
        }),
    );
    let class = request_ok(stdin, reader, "seed-3", "classes.save", json!({ "name": "5A" }));
    let class_id = class.get("classId").and_then(|v| v.as_str()).expect("classId").to_string();
    let student = request_ok(
        stdin,
        reader,
        "seed-4",
        "students.save",
        json!({
            "name": "Asha Verma",
            "rollNumber": "12",
            "classId": class_id,
            "password": "pw-hash"
        }),
    );
    let student_id = student
        .get("studentId")
        .and_then(|v| v.as_str())
        .expect("studentId")
        .to_string();
    (class_id, student_id)
}

fn mark_params(class_id: &str, student_id: &str, marks: i64, max_marks: i64) -> serde_json::Value {
    json!({
        "classId": class_id,
        "studentId": student_id,
        "subject": "Maths",
        "examType": "Midterm",
        "marks": marks,
        "maxMarks": max_marks,
        "date": "2026-03-10"
    })
}

#[test]
fn out_of_range_marks_never_reach_the_store() {
    let workspace = temp_dir("edupanel-marks-range");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let (class_id, student_id) = seed_roster(&mut stdin, &mut reader, &workspace);

    let over = request(
        &mut stdin,
        &mut reader,
        "1",
        "marks.save",
        mark_params(&class_id, &student_id, 11, 10),
    );
    assert_eq!(
        over.pointer("/error/code").and_then(|v| v.as_str()),
        Some("marks_exceed_max")
    );

    let negative = request(
        &mut stdin,
        &mut reader,
        "2",
        "marks.save",
        mark_params(&class_id, &student_id, -1, 10),
    );
    assert_eq!(
        negative.pointer("/error/code").and_then(|v| v.as_str()),
        Some("marks_out_of_range")
    );

    let zero_max = request(
        &mut stdin,
        &mut reader,
        "3",
        "marks.save",
        mark_params(&class_id, &student_id, 0, 0),
    );
    assert_eq!(
        zero_max.pointer("/error/code").and_then(|v| v.as_str()),
        Some("marks_out_of_range")
    );

    let page = request_ok(&mut stdin, &mut reader, "4", "marks.page", json!({}));
    assert_eq!(page.get("noRecords"), Some(&json!(true)));

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn zero_and_full_marks_are_valid_scores() {
    let workspace = temp_dir("edupanel-marks-valid");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let (class_id, student_id) = seed_roster(&mut stdin, &mut reader, &workspace);

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "marks.save",
        mark_params(&class_id, &student_id, 0, 50),
    );
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "marks.save",
        mark_params(&class_id, &student_id, 50, 50),
    );

    let page = request_ok(&mut stdin, &mut reader, "3", "marks.page", json!({}));
    let scores: Vec<&str> = page
        .pointer("/rows")
        .and_then(|v| v.as_array())
        .map(|rows| {
            rows.iter()
                .filter_map(|r| r.get("score").and_then(|v| v.as_str()))
                .collect()
        })
        .unwrap_or_default();
    assert_eq!(scores, vec!["0/50", "50/50"]);
    assert_eq!(
        page.pointer("/rows/0/student").and_then(|v| v.as_str()),
        Some("Asha Verma")
    );
    assert_eq!(
        page.pointer("/rows/0/className").and_then(|v| v.as_str()),
        Some("5A")
    );

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn marks_page_matches_subject_or_student_name() {
    let workspace = temp_dir("edupanel-marks-search");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let (class_id, student_id) = seed_roster(&mut stdin, &mut reader, &workspace);

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "marks.save",
        mark_params(&class_id, &student_id, 42, 50),
    );

    let by_subject = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "marks.page",
        json!({ "search": "maths" }),
    );
    assert_eq!(
        by_subject.pointer("/rows").and_then(|v| v.as_array()).map(|a| a.len()),
        Some(1)
    );

    let by_student = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "marks.page",
        json!({ "search": "asha" }),
    );
    assert_eq!(
        by_student.pointer("/rows").and_then(|v| v.as_array()).map(|a| a.len()),
        Some(1)
    );

    let miss = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "marks.page",
        json!({ "search": "chemistry" }),
    );
    assert_eq!(miss.get("noRecords"), Some(&json!(true)));

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}
