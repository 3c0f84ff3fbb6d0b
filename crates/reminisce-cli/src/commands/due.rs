//! The `reminisce due` command.

use std::path::PathBuf;

use anyhow::Result;
use chrono::Utc;
use comfy_table::{Cell, Table};
use serde_json::json;

use reminisce_core::due::{due_entries, DueEntry};
use reminisce_core::traits::{catalog, Store};
use reminisce_store::{MemoryStore, Snapshot};

use super::resolve_patient;

pub fn execute(state_path: PathBuf, patient: String, format: String) -> Result<()> {
    let store = MemoryStore::from_snapshot(Snapshot::load(&state_path)?);
    let patient = resolve_patient(&store, &patient)?;

    let mastery = store.mastery_for_patient(patient.id)?;
    let items = catalog(&store, patient.id)?;
    let entries = due_entries(patient.id, Utc::now(), &mastery, &items);

    // Labels for display
    let label_for = |entry: &DueEntry| -> String {
        let item_ref = entry.item_ref();
        items
            .iter()
            .find(|i| i.item_ref() == item_ref)
            .map(|i| i.label().to_string())
            .unwrap_or_else(|| item_ref.item_id.to_string())
    };

    match format.as_str() {
        "json" => {
            let payload: Vec<_> = entries
                .iter()
                .map(|e| {
                    let item_ref = e.item_ref();
                    match e {
                        DueEntry::Reviewed(record) => json!({
                            "item_type": item_ref.item_type.to_string(),
                            "item_id": item_ref.item_id,
                            "label": label_for(e),
                            "mastery_score": record.mastery_score,
                            "next_due_at": record.next_due_at,
                        }),
                        DueEntry::Unseen { .. } => json!({
                            "item_type": item_ref.item_type.to_string(),
                            "item_id": item_ref.item_id,
                            "label": label_for(e),
                            "mastery_score": 0.0,
                            "next_due_at": null,
                        }),
                    }
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
        _ => {
            let mut table = Table::new();
            table.set_header(vec!["Item", "Type", "Mastery", "Status"]);
            for entry in &entries {
                let item_ref = entry.item_ref();
                let (mastery, status) = match entry {
                    DueEntry::Reviewed(record) => {
                        (format!("{:.2}", record.mastery_score), "due".to_string())
                    }
                    DueEntry::Unseen { .. } => ("-".to_string(), "unseen".to_string()),
                };
                table.add_row(vec![
                    Cell::new(label_for(entry)),
                    Cell::new(item_ref.item_type.to_string()),
                    Cell::new(mastery),
                    Cell::new(status),
                ]);
            }
            println!("{} item(s) due for {}", entries.len(), patient.full_name);
            println!("{table}");
        }
    }

    Ok(())
}
