//! The `reminisce submit` command.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};
use uuid::Uuid;

use reminisce_core::session::{SessionEngine, Submission};
use reminisce_store::{MemoryStore, Snapshot};

pub fn execute(
    state_path: PathBuf,
    session: String,
    answers: String,
    format: String,
) -> Result<()> {
    let session_id: Uuid = session
        .parse()
        .with_context(|| format!("invalid session id: {session}"))?;

    // `--answers @file.json` reads the batch from a file.
    let answers_json = match answers.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read answers file: {path}"))?,
        None => answers,
    };
    let submissions: Vec<Submission> =
        serde_json::from_str(&answers_json).context("failed to parse answers JSON")?;

    let store = Arc::new(MemoryStore::from_snapshot(Snapshot::load(&state_path)?));
    let engine = SessionEngine::new(store.clone(), None);
    let outcome = engine.submit(session_id, &submissions)?;

    store.snapshot().save(&state_path)?;

    match format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&outcome)?),
        _ => {
            let mut table = Table::new();
            table.set_header(vec!["Score", "Correct", "Questions", "Avg time"]);
            table.add_row(vec![
                Cell::new(format!("{:.0}%", outcome.score * 100.0)),
                Cell::new(outcome.correct),
                Cell::new(outcome.total_questions),
                Cell::new(format!("{:.0}ms", outcome.avg_response_time_ms)),
            ]);
            println!("{table}");
            if !outcome.weak_items.is_empty() {
                println!(
                    "{} question(s) missed; those items will come back sooner.",
                    outcome.weak_items.len()
                );
            }
        }
    }

    Ok(())
}
