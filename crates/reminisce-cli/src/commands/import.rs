//! The `reminisce import` command.

use std::path::PathBuf;

use anyhow::Result;
use chrono::Utc;

use reminisce_core::parser;
use reminisce_store::{MemoryStore, Snapshot};

pub fn execute(profile_path: PathBuf, state_path: PathBuf) -> Result<()> {
    let profile = parser::parse_profile(&profile_path)?;

    let store = MemoryStore::from_snapshot(Snapshot::load(&state_path)?);
    if store.patient_by_name(&profile.patient.full_name).is_some() {
        anyhow::bail!(
            "patient '{}' already exists in {}",
            profile.patient.full_name,
            state_path.display()
        );
    }

    let (patient, family, knowledge) = profile.instantiate(Utc::now());
    let patient_id = patient.id;
    store.insert_patient(patient);
    for member in family {
        store.insert_family_member(member)?;
    }
    for item in knowledge {
        store.insert_knowledge_item(item)?;
    }

    store.snapshot().save(&state_path)?;
    println!(
        "Imported {} (id {patient_id}) into {}",
        profile.patient.full_name,
        state_path.display()
    );
    Ok(())
}
