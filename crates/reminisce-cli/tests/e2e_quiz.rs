//! End-to-end quiz flow through the binary: import, generate, submit,
//! report, all against one state file.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

fn reminisce() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("reminisce").unwrap()
}

const PROFILE: &str = r#"[patient]
full_name = "Alice Johnson"
dob = "1948-03-14"

[[family]]
full_name = "Maria Johnson"
relationship = "daughter"

[[knowledge]]
category = "personal"
label = "favorite color"
value = "blue"
"#;

fn import(dir: &TempDir) {
    std::fs::write(dir.path().join("p.toml"), PROFILE).unwrap();
    reminisce()
        .current_dir(dir.path())
        .args(["import", "--profile", "p.toml", "--state", "state.json"])
        .assert()
        .success();
}

fn generate_quiz(dir: &TempDir) -> Value {
    let output = reminisce()
        .current_dir(dir.path())
        .args([
            "generate",
            "--state",
            "state.json",
            "--patient",
            "Alice Johnson",
            "--format",
            "json",
        ])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    serde_json::from_slice(&output).unwrap()
}

/// The fallback questions ask "Who/What is {label}?"; answer from the
/// seeded profile.
fn answer_for(prompt: &str) -> &'static str {
    if prompt.contains("favorite color") {
        "blue"
    } else {
        "Maria Johnson"
    }
}

#[test]
fn full_quiz_flow_scores_and_reports() {
    let dir = TempDir::new().unwrap();
    import(&dir);

    let quiz = generate_quiz(&dir);
    let questions = quiz["questions"].as_array().unwrap();
    assert_eq!(questions.len(), 2);
    for q in questions {
        // Answers are never revealed without --reveal-answers
        assert!(q.get("acceptable_answers").is_none() || q["acceptable_answers"].is_null());
        assert_eq!(q["question_type"], "mcq");
        let options = q["options"].as_array().unwrap();
        assert_eq!(options.len(), 2);
        assert_eq!(options[1], "Not sure");
    }

    let answers: Vec<Value> = questions
        .iter()
        .map(|q| {
            serde_json::json!({
                "question_id": q["question_id"],
                "answer": answer_for(q["prompt"].as_str().unwrap()),
                "response_time_ms": 2000,
            })
        })
        .collect();
    std::fs::write(
        dir.path().join("answers.json"),
        serde_json::to_string(&answers).unwrap(),
    )
    .unwrap();

    let output = reminisce()
        .current_dir(dir.path())
        .args([
            "submit",
            "--state",
            "state.json",
            "--session",
            quiz["session_id"].as_str().unwrap(),
            "--answers",
            "@answers.json",
            "--format",
            "json",
        ])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let outcome: Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(outcome["score"], 1.0);
    assert_eq!(outcome["correct"], 2);
    assert!(outcome["weak_items"].as_array().unwrap().is_empty());

    // Mastery lands in the state file: fast correct answer = 0.10 + 0.05
    let state: Value =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join("state.json")).unwrap())
            .unwrap();
    let mastery = state["mastery"].as_array().unwrap();
    assert_eq!(mastery.len(), 2);
    for record in mastery {
        let score = record["mastery_score"].as_f64().unwrap();
        assert!((score - 0.15).abs() < 1e-9, "unexpected mastery score {score}");
        assert!(record["next_due_at"].is_string());
    }

    reminisce()
        .current_dir(dir.path())
        .args([
            "report",
            "--state",
            "state.json",
            "--patient",
            "Alice Johnson",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Sessions completed: **1**"))
        .stdout(predicate::str::contains("100.0%"));
}

#[test]
fn logs_stay_off_stdout_in_json_mode() {
    let dir = TempDir::new().unwrap();
    import(&dir);

    // With logging forced on, stdout must still be exactly one JSON value.
    let output = reminisce()
        .current_dir(dir.path())
        .env("RUST_LOG", "reminisce=debug")
        .args([
            "generate",
            "--state",
            "state.json",
            "--patient",
            "Alice Johnson",
            "--format",
            "json",
        ])
        .assert()
        .success()
        .get_output()
        .clone();
    let quiz: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(quiz["session_id"].is_string());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("quiz session created"));
}

#[test]
fn resubmission_is_rejected() {
    let dir = TempDir::new().unwrap();
    import(&dir);

    let quiz = generate_quiz(&dir);
    let questions = quiz["questions"].as_array().unwrap();
    let answers: Vec<Value> = questions
        .iter()
        .map(|q| {
            serde_json::json!({
                "question_id": q["question_id"],
                "answer": "Not sure",
                "response_time_ms": 5000,
            })
        })
        .collect();
    let answers_json = serde_json::to_string(&answers).unwrap();
    let session_id = quiz["session_id"].as_str().unwrap();

    reminisce()
        .current_dir(dir.path())
        .args([
            "submit",
            "--state",
            "state.json",
            "--session",
            session_id,
            "--answers",
            &answers_json,
        ])
        .assert()
        .success();

    reminisce()
        .current_dir(dir.path())
        .args([
            "submit",
            "--state",
            "state.json",
            "--session",
            session_id,
            "--answers",
            &answers_json,
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already completed"));
}

#[test]
fn reveal_answers_includes_alternates() {
    let dir = TempDir::new().unwrap();
    import(&dir);

    let output = reminisce()
        .current_dir(dir.path())
        .args([
            "generate",
            "--state",
            "state.json",
            "--patient",
            "Alice Johnson",
            "--reveal-answers",
            "--format",
            "json",
        ])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let quiz: Value = serde_json::from_slice(&output).unwrap();
    for q in quiz["questions"].as_array().unwrap() {
        assert!(q["acceptable_answers"].is_array());
    }
}

#[test]
fn completed_item_leaves_the_due_set() {
    let dir = TempDir::new().unwrap();
    import(&dir);

    let quiz = generate_quiz(&dir);
    let questions = quiz["questions"].as_array().unwrap();
    let answers: Vec<Value> = questions
        .iter()
        .map(|q| {
            serde_json::json!({
                "question_id": q["question_id"],
                "answer": answer_for(q["prompt"].as_str().unwrap()),
                "response_time_ms": 2000,
            })
        })
        .collect();
    reminisce()
        .current_dir(dir.path())
        .args([
            "submit",
            "--state",
            "state.json",
            "--session",
            quiz["session_id"].as_str().unwrap(),
            "--answers",
            &serde_json::to_string(&answers).unwrap(),
        ])
        .assert()
        .success();

    reminisce()
        .current_dir(dir.path())
        .args([
            "due",
            "--state",
            "state.json",
            "--patient",
            "Alice Johnson",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("0 item(s) due"));
}
