//! JSON snapshot of the whole store.
//!
//! This is the CLI's durable state: loaded at process start, saved after
//! every mutating command. Structured payloads (question payloads,
//! answer values) round-trip through this encoding unchanged.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use reminisce_core::model::{
    FamilyMember, KnowledgeItem, MasteryRecord, Patient, QuizQuestion, QuizResponse, QuizSession,
};

use crate::memory::Inner;

/// Everything the store holds, in a stable serialized form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub patients: Vec<Patient>,
    #[serde(default)]
    pub family: Vec<FamilyMember>,
    #[serde(default)]
    pub knowledge: Vec<KnowledgeItem>,
    #[serde(default)]
    pub mastery: Vec<MasteryRecord>,
    #[serde(default)]
    pub sessions: Vec<QuizSession>,
    #[serde(default)]
    pub questions: Vec<QuizQuestion>,
    #[serde(default)]
    pub responses: Vec<QuizResponse>,
}

impl Snapshot {
    pub(crate) fn from_inner(inner: &Inner) -> Self {
        Self {
            patients: inner.patients.values().cloned().collect(),
            family: inner.family.values().cloned().collect(),
            knowledge: inner.knowledge.values().cloned().collect(),
            mastery: inner.mastery.values().cloned().collect(),
            sessions: inner.sessions.values().cloned().collect(),
            questions: inner.questions.clone(),
            responses: inner.responses.clone(),
        }
    }

    pub(crate) fn into_inner(self) -> Inner {
        Inner {
            patients: self.patients.into_iter().map(|p| (p.id, p)).collect(),
            family: self.family.into_iter().map(|f| (f.id, f)).collect(),
            knowledge: self.knowledge.into_iter().map(|k| (k.id, k)).collect(),
            mastery: self.mastery.into_iter().map(|m| (m.key, m)).collect(),
            sessions: self.sessions.into_iter().map(|s| (s.id, s)).collect(),
            questions: self.questions,
            responses: self.responses,
        }
    }

    /// Load a snapshot from a JSON file. A missing file is an empty
    /// snapshot, so first runs need no setup step.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read state file: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse state file: {}", path.display()))
    }

    /// Save the snapshot as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize state")?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write state file: {}", path.display()))?;
        Ok(())
    }
}
