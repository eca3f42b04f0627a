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

fn login(stdin: &mut ChildStdin, reader: &mut BufReader<ChildStdout>, workspace: &PathBuf) {
    let _ = request_ok(
        stdin,
        reader,
        "login-1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let _ = request_ok(
        stdin,
        reader,
        "login-2",
        "auth.register",
        json!({
            "email": "teacher@example.com",
            "password": "Sunlit#Meadow9",
            "confirmPassword": "Sunlit#Meadow9"
        }),
    );
}

fn homework_params(title: &str) -> serde_json::Value {
    json!({
        "title": title,
        "description": "Read chapter 4",
        "dueDate": "2026-04-01",
        "target": "all"
    })
}

#[test]
fn attachment_is_uploaded_and_embedded_in_the_record() {
    let workspace = temp_dir("edupanel-hw-attach");
    let pdf = workspace.join("worksheet.pdf");
    std::fs::write(&pdf, b"%PDF-1.4 stub").expect("write pdf");

    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    login(&mut stdin, &mut reader, &workspace);

    let mut params = homework_params("Fractions worksheet");
    params["attachment"] = json!({ "path": pdf.to_string_lossy() });
    let saved = request_ok(&mut stdin, &mut reader, "1", "homework.save", params);
    let file_url = saved
        .get("fileUrl")
        .and_then(|v| v.as_str())
        .expect("fileUrl")
        .to_string();
    assert!(file_url.starts_with("blob://"), "{file_url}");
    assert!(file_url.ends_with("worksheet.pdf"), "{file_url}");

    let page = request_ok(&mut stdin, &mut reader, "2", "homework.page", json!({}));
    assert_eq!(
        page.pointer("/rows/0/fileUrl").and_then(|v| v.as_str()),
        Some(file_url.as_str())
    );
    assert_eq!(
        page.pointer("/rows/0/status").and_then(|v| v.as_str()),
        Some("Pending")
    );
    assert_eq!(
        page.pointer("/rows/0/assignedTo").and_then(|v| v.as_str()),
        Some("All Students")
    );

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn rejected_attachment_aborts_the_whole_submission() {
    let workspace = temp_dir("edupanel-hw-reject");
    let big = workspace.join("big.pdf");
    std::fs::write(&big, vec![0u8; 5 * 1024 * 1024 + 1]).expect("write big file");
    let wrong_type = workspace.join("notes.txt");
    std::fs::write(&wrong_type, b"plain text").expect("write txt");

    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    login(&mut stdin, &mut reader, &workspace);

    let mut params = homework_params("Too big");
    params["attachment"] = json!({ "path": big.to_string_lossy() });
    let too_big = request(&mut stdin, &mut reader, "1", "homework.save", params);
    assert_eq!(
        too_big.pointer("/error/code").and_then(|v| v.as_str()),
        Some("file_too_large")
    );

    let mut params = homework_params("Wrong type");
    params["attachment"] = json!({ "path": wrong_type.to_string_lossy() });
    let bad_type = request(&mut stdin, &mut reader, "2", "homework.save", params);
    assert_eq!(
        bad_type.pointer("/error/code").and_then(|v| v.as_str()),
        Some("bad_file_type")
    );

    // Neither failed submission left a record behind.
    let page = request_ok(&mut stdin, &mut reader, "3", "homework.page", json!({}));
    assert_eq!(page.get("noRecords"), Some(&json!(true)));

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn editing_keeps_the_attachment_and_resets_the_status() {
    let workspace = temp_dir("edupanel-hw-edit");
    let pdf = workspace.join("worksheet.pdf");
    std::fs::write(&pdf, b"%PDF-1.4 stub").expect("write pdf");

    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    login(&mut stdin, &mut reader, &workspace);

    let mut params = homework_params("Fractions worksheet");
    params["attachment"] = json!({ "path": pdf.to_string_lossy() });
    let saved = request_ok(&mut stdin, &mut reader, "1", "homework.save", params);
    let homework_id = saved
        .get("homeworkId")
        .and_then(|v| v.as_str())
        .expect("homeworkId")
        .to_string();
    let file_url = saved
        .get("fileUrl")
        .and_then(|v| v.as_str())
        .expect("fileUrl")
        .to_string();

    // Edit without a new attachment: same id, same file, still pending.
    let mut edit = homework_params("Fractions worksheet v2");
    edit["editId"] = json!(homework_id);
    let edited = request_ok(&mut stdin, &mut reader, "2", "homework.save", edit);
    assert_eq!(
        edited.get("homeworkId").and_then(|v| v.as_str()),
        Some(homework_id.as_str())
    );
    assert_eq!(
        edited.get("fileUrl").and_then(|v| v.as_str()),
        Some(file_url.as_str())
    );

    let page = request_ok(&mut stdin, &mut reader, "3", "homework.page", json!({}));
    assert_eq!(
        page.pointer("/rows").and_then(|v| v.as_array()).map(|a| a.len()),
        Some(1)
    );
    assert_eq!(
        page.pointer("/rows/0/title").and_then(|v| v.as_str()),
        Some("Fractions worksheet v2")
    );
    assert_eq!(
        page.pointer("/rows/0/status").and_then(|v| v.as_str()),
        Some("Pending")
    );

    let pending = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "homework.page",
        json!({ "status": "Pending" }),
    );
    assert_eq!(
        pending.pointer("/rows").and_then(|v| v.as_array()).map(|a| a.len()),
        Some(1)
    );
    let submitted = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "homework.page",
        json!({ "status": "Submitted" }),
    );
    assert_eq!(submitted.get("noRecords"), Some(&json!(true)));

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "6",
        "homework.delete",
        json!({ "homeworkId": homework_id }),
    );
    let page = request_ok(&mut stdin, &mut reader, "7", "homework.page", json!({}));
    assert_eq!(page.get("noRecords"), Some(&json!(true)));

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn targeted_homework_resolves_the_assignee_name() {
    let workspace = temp_dir("edupanel-hw-target");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    login(&mut stdin, &mut reader, &workspace);

    let class = request_ok(&mut stdin, &mut reader, "1", "classes.save", json!({ "name": "5A" }));
    let class_id = class.get("classId").and_then(|v| v.as_str()).expect("classId").to_string();
    let student = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "students.save",
        json!({
            "name": "Asha Verma",
            "rollNumber": "12",
            "classId": class_id,
            "password": "pw-hash"
        }),
    );
    let student_id = student.get("studentId").and_then(|v| v.as_str()).expect("studentId").to_string();

    let mut for_student = homework_params("Personal reading");
    for_student["target"] = json!("student");
    for_student["targetSpecific"] = json!(student_id);
    let _ = request_ok(&mut stdin, &mut reader, "3", "homework.save", for_student);

    let mut for_class = homework_params("Class project");
    for_class["target"] = json!("class");
    for_class["targetSpecific"] = json!("gone-class-id");
    let _ = request_ok(&mut stdin, &mut reader, "4", "homework.save", for_class);

    let page = request_ok(&mut stdin, &mut reader, "5", "homework.page", json!({}));
    assert_eq!(
        page.pointer("/rows/0/assignedTo").and_then(|v| v.as_str()),
        Some("Asha Verma")
    );
    assert_eq!(
        page.pointer("/rows/1/assignedTo").and_then(|v| v.as_str()),
        Some("Unknown")
    );

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}
