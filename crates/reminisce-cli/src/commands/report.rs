//! The `reminisce report` command.

use std::path::PathBuf;

use anyhow::Result;

use reminisce_report::{analytics_summary, generate_markdown};
use reminisce_store::{MemoryStore, Snapshot};

use super::resolve_patient;

pub fn execute(state_path: PathBuf, patient: String, days: i64, format: String) -> Result<()> {
    anyhow::ensure!(days >= 0, "days must not be negative");

    let store = MemoryStore::from_snapshot(Snapshot::load(&state_path)?);
    let patient = resolve_patient(&store, &patient)?;

    let summary = analytics_summary(&store, patient.id, days)?;

    match format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&summary)?),
        _ => println!("{}", generate_markdown(&summary)),
    }

    Ok(())
}
