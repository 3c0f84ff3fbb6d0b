pub mod due;
pub mod generate;
pub mod import;
pub mod init;
pub mod report;
pub mod submit;
pub mod validate;

use anyhow::Result;
use uuid::Uuid;

use reminisce_core::model::Patient;
use reminisce_store::MemoryStore;

/// Resolve a `--patient` argument: a uuid, or a (unique) full name.
pub fn resolve_patient(store: &MemoryStore, patient: &str) -> Result<Patient> {
    if let Ok(id) = patient.parse::<Uuid>() {
        if let Some(p) = store.patients().into_iter().find(|p| p.id == id) {
            return Ok(p);
        }
        anyhow::bail!("no patient with id {id}");
    }
    store
        .patient_by_name(patient)
        .ok_or_else(|| anyhow::anyhow!("no patient named '{patient}'"))
}
