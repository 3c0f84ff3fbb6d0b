//! In-memory `Store` implementation.
//!
//! All state lives behind one mutex, which also gives each submission
//! batch a simple serialization point. Mastery uniqueness (one record
//! per key) is enforced structurally by the map.

use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::Result;
use uuid::Uuid;

use reminisce_core::model::{
    FamilyMember, KnowledgeItem, MasteryKey, MasteryRecord, Patient, QuizQuestion, QuizResponse,
    QuizSession, SessionStatus, MAX_SENSITIVITY,
};
use reminisce_core::traits::Store;

use crate::snapshot::Snapshot;

#[derive(Debug, Default)]
pub(crate) struct Inner {
    pub patients: HashMap<Uuid, Patient>,
    pub family: HashMap<Uuid, FamilyMember>,
    pub knowledge: HashMap<Uuid, KnowledgeItem>,
    pub mastery: HashMap<MasteryKey, MasteryRecord>,
    pub sessions: HashMap<Uuid, QuizSession>,
    pub questions: Vec<QuizQuestion>,
    pub responses: Vec<QuizResponse>,
}

/// An in-memory store, cheap to construct and safe to share.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from a snapshot.
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Self {
            inner: Mutex::new(snapshot.into_inner()),
        }
    }

    /// Capture the full state for persistence.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::from_inner(&self.inner.lock().expect("store lock poisoned"))
    }

    // -- caregiver-facing CRUD (outside the core `Store` contract) --

    pub fn insert_patient(&self, patient: Patient) {
        let mut inner = self.inner.lock().expect("store lock poisoned");
        inner.patients.insert(patient.id, patient);
    }

    pub fn insert_family_member(&self, member: FamilyMember) -> Result<()> {
        let mut inner = self.inner.lock().expect("store lock poisoned");
        anyhow::ensure!(
            inner.patients.contains_key(&member.patient_id),
            "unknown patient: {}",
            member.patient_id
        );
        inner.family.insert(member.id, member);
        Ok(())
    }

    pub fn insert_knowledge_item(&self, item: KnowledgeItem) -> Result<()> {
        anyhow::ensure!(
            item.sensitivity_level <= MAX_SENSITIVITY,
            "sensitivity_level {} exceeds the allowed range 0..={MAX_SENSITIVITY}",
            item.sensitivity_level
        );
        let mut inner = self.inner.lock().expect("store lock poisoned");
        anyhow::ensure!(
            inner.patients.contains_key(&item.patient_id),
            "unknown patient: {}",
            item.patient_id
        );
        inner.knowledge.insert(item.id, item);
        Ok(())
    }

    pub fn patients(&self) -> Vec<Patient> {
        let inner = self.inner.lock().expect("store lock poisoned");
        let mut patients: Vec<Patient> = inner.patients.values().cloned().collect();
        patients.sort_by_key(|p| p.created_at);
        patients
    }

    /// Find a patient by exact full name, for CLI lookups.
    pub fn patient_by_name(&self, full_name: &str) -> Option<Patient> {
        let inner = self.inner.lock().expect("store lock poisoned");
        inner
            .patients
            .values()
            .find(|p| p.full_name == full_name)
            .cloned()
    }
}

impl Store for MemoryStore {
    fn patient(&self, patient_id: Uuid) -> Result<Option<Patient>> {
        let inner = self.inner.lock().expect("store lock poisoned");
        Ok(inner.patients.get(&patient_id).cloned())
    }

    fn family_members(&self, patient_id: Uuid) -> Result<Vec<FamilyMember>> {
        let inner = self.inner.lock().expect("store lock poisoned");
        let mut members: Vec<FamilyMember> = inner
            .family
            .values()
            .filter(|f| f.patient_id == patient_id)
            .cloned()
            .collect();
        members.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(members)
    }

    fn knowledge_items(&self, patient_id: Uuid) -> Result<Vec<KnowledgeItem>> {
        let inner = self.inner.lock().expect("store lock poisoned");
        let mut items: Vec<KnowledgeItem> = inner
            .knowledge
            .values()
            .filter(|k| k.patient_id == patient_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(items)
    }

    fn mastery(&self, key: &MasteryKey) -> Result<Option<MasteryRecord>> {
        let inner = self.inner.lock().expect("store lock poisoned");
        Ok(inner.mastery.get(key).cloned())
    }

    fn mastery_for_patient(&self, patient_id: Uuid) -> Result<Vec<MasteryRecord>> {
        let inner = self.inner.lock().expect("store lock poisoned");
        let mut records: Vec<MasteryRecord> = inner
            .mastery
            .values()
            .filter(|m| m.key.patient_id == patient_id)
            .cloned()
            .collect();
        records.sort_by_key(|m| m.key);
        Ok(records)
    }

    fn upsert_mastery(&self, record: MasteryRecord) -> Result<()> {
        let mut inner = self.inner.lock().expect("store lock poisoned");
        inner.mastery.insert(record.key, record);
        Ok(())
    }

    fn create_session(&self, session: QuizSession) -> Result<()> {
        let mut inner = self.inner.lock().expect("store lock poisoned");
        inner.sessions.insert(session.id, session);
        Ok(())
    }

    fn session(&self, session_id: Uuid) -> Result<Option<QuizSession>> {
        let inner = self.inner.lock().expect("store lock poisoned");
        Ok(inner.sessions.get(&session_id).cloned())
    }

    fn sessions_for_patient(&self, patient_id: Uuid) -> Result<Vec<QuizSession>> {
        let inner = self.inner.lock().expect("store lock poisoned");
        let mut sessions: Vec<QuizSession> = inner
            .sessions
            .values()
            .filter(|s| s.patient_id == patient_id)
            .cloned()
            .collect();
        sessions.sort_by_key(|s| s.created_at);
        Ok(sessions)
    }

    fn add_question(&self, question: QuizQuestion) -> Result<()> {
        let mut inner = self.inner.lock().expect("store lock poisoned");
        inner.questions.push(question);
        Ok(())
    }

    fn questions(&self, session_id: Uuid) -> Result<Vec<QuizQuestion>> {
        let inner = self.inner.lock().expect("store lock poisoned");
        Ok(inner
            .questions
            .iter()
            .filter(|q| q.session_id == session_id)
            .cloned()
            .collect())
    }

    fn add_response(&self, response: QuizResponse) -> Result<()> {
        let mut inner = self.inner.lock().expect("store lock poisoned");
        inner.responses.push(response);
        Ok(())
    }

    fn responses(&self, session_id: Uuid) -> Result<Vec<QuizResponse>> {
        let inner = self.inner.lock().expect("store lock poisoned");
        Ok(inner
            .responses
            .iter()
            .filter(|r| r.session_id == session_id)
            .cloned()
            .collect())
    }

    fn complete_session(
        &self,
        session_id: Uuid,
        score: f64,
        avg_response_time_ms: f64,
    ) -> Result<()> {
        let mut inner = self.inner.lock().expect("store lock poisoned");
        let session = inner
            .sessions
            .get_mut(&session_id)
            .ok_or_else(|| anyhow::anyhow!("session not found: {session_id}"))?;
        session.status = SessionStatus::Completed;
        session.score = Some(score);
        session.avg_response_time_ms = Some(avg_response_time_ms);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use reminisce_core::model::ItemType;

    fn patient() -> Patient {
        Patient {
            id: Uuid::new_v4(),
            full_name: "Alice".into(),
            dob: "1950-01-01".into(),
            phone: None,
            address: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn upsert_mastery_keeps_one_record_per_key() {
        let store = MemoryStore::new();
        let key = MasteryKey {
            patient_id: Uuid::new_v4(),
            item_type: ItemType::Knowledge,
            item_id: Uuid::new_v4(),
        };
        let mut record = MasteryRecord::baseline(key);
        store.upsert_mastery(record.clone()).unwrap();
        record.mastery_score = 0.5;
        store.upsert_mastery(record).unwrap();

        let records = store.mastery_for_patient(key.patient_id).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].mastery_score, 0.5);
    }

    #[test]
    fn knowledge_insert_validates_sensitivity_range() {
        let store = MemoryStore::new();
        let p = patient();
        store.insert_patient(p.clone());

        let item = KnowledgeItem {
            id: Uuid::new_v4(),
            patient_id: p.id,
            category: "personal".into(),
            label: "secret".into(),
            value: "x".into(),
            sensitivity_level: 6,
            is_active: true,
            created_at: Utc::now(),
        };
        assert!(store.insert_knowledge_item(item).is_err());
    }

    #[test]
    fn family_insert_requires_known_patient() {
        let store = MemoryStore::new();
        let member = FamilyMember {
            id: Uuid::new_v4(),
            patient_id: Uuid::new_v4(),
            full_name: "Maria".into(),
            relationship: "daughter".into(),
            photo_path: None,
            created_at: Utc::now(),
        };
        assert!(store.insert_family_member(member).is_err());
    }

    #[test]
    fn complete_session_sets_aggregates() {
        let store = MemoryStore::new();
        let p = patient();
        store.insert_patient(p.clone());
        let session = QuizSession::new(p.id, 2, Utc::now());
        let session_id = session.id;
        store.create_session(session).unwrap();

        store.complete_session(session_id, 0.5, 1200.0).unwrap();
        let reloaded = store.session(session_id).unwrap().unwrap();
        assert_eq!(reloaded.status, SessionStatus::Completed);
        assert_eq!(reloaded.score, Some(0.5));
        assert_eq!(reloaded.avg_response_time_ms, Some(1200.0));
    }

    #[test]
    fn patient_by_name_lookup() {
        let store = MemoryStore::new();
        let p = patient();
        store.insert_patient(p.clone());
        assert_eq!(store.patient_by_name("Alice").map(|p| p.id), Some(p.id));
        assert!(store.patient_by_name("Bob").is_none());
    }
}
