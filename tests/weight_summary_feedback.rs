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
    let exe = env!("CARGO_BIN_EXE_gradebookd");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn gradebookd");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn request_ok(
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
    assert!(
        value.get("ok").and_then(|v| v.as_bool()).unwrap_or(false),
        "{} failed: {}",
        method,
        value
    );
    value.get("result").cloned().unwrap_or_else(|| json!({}))
}

#[test]
fn weight_totals_are_reported_never_enforced() {
    let workspace = temp_dir("gradebookd-weights");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let created = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "courses.create",
        json!({ "name": "Química" }),
    );
    let course_id = created
        .pointer("/course/id")
        .and_then(|v| v.as_str())
        .expect("course id")
        .to_string();
    let eval_id = created
        .pointer("/course/evaluations/0/id")
        .and_then(|v| v.as_str())
        .expect("evaluation id")
        .to_string();

    // The default scheme distributes 33/33/34 across evaluations, but the
    // seeded section only covers 60% of the first evaluation.
    let summary = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "scheme.weightSummary",
        json!({ "courseId": course_id }),
    );
    assert_eq!(
        summary.pointer("/evaluations/total").and_then(|v| v.as_f64()),
        Some(100.0)
    );
    assert_eq!(
        summary.pointer("/evaluations/isValid").and_then(|v| v.as_bool()),
        Some(true)
    );
    assert_eq!(
        summary
            .pointer("/perEvaluation/0/sections/total")
            .and_then(|v| v.as_f64()),
        Some(60.0)
    );
    assert_eq!(
        summary
            .pointer("/perEvaluation/0/sections/isValid")
            .and_then(|v| v.as_bool()),
        Some(false)
    );

    // Blanking an evaluation weight drops the reported total; the update
    // itself is never blocked by the invalid sum.
    let updated = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "evaluations.update",
        json!({
            "courseId": course_id,
            "evaluationId": eval_id,
            "weight": "",
        }),
    );
    assert_eq!(
        updated
            .pointer("/course/evaluations/0/weight")
            .and_then(|v| v.as_str()),
        Some("")
    );

    let summary = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "scheme.weightSummary",
        json!({ "courseId": course_id }),
    );
    assert_eq!(
        summary.pointer("/evaluations/total").and_then(|v| v.as_f64()),
        Some(67.0)
    );
    assert_eq!(
        summary.pointer("/evaluations/isValid").and_then(|v| v.as_bool()),
        Some(false)
    );

    // Computation still proceeds with the weights that are present.
    let course_summary = request_ok(
        &mut stdin,
        &mut reader,
        "6",
        "summary.course",
        json!({ "courseId": course_id }),
    );
    assert!(course_summary.get("stats").is_some());

    drop(stdin);
    let _ = child.wait();
}
