//! Patient profile TOML parser.
//!
//! Profiles are how caregivers feed a patient, their family members, and
//! their knowledge facts into the system from a single file.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::model::{FamilyMember, KnowledgeItem, Patient, MAX_SENSITIVITY};

/// A parsed, validated patient profile (ids not yet assigned).
#[derive(Debug, Clone, Deserialize)]
pub struct Profile {
    pub patient: PatientSpec,
    #[serde(default)]
    pub family: Vec<FamilySpec>,
    #[serde(default)]
    pub knowledge: Vec<KnowledgeSpec>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PatientSpec {
    pub full_name: String,
    pub dob: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FamilySpec {
    pub full_name: String,
    pub relationship: String,
    #[serde(default)]
    pub photo_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KnowledgeSpec {
    pub category: String,
    pub label: String,
    pub value: String,
    #[serde(default)]
    pub sensitivity_level: u8,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

/// Parse a profile from a TOML file.
pub fn parse_profile(path: &Path) -> Result<Profile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read profile: {}", path.display()))?;
    parse_profile_str(&content)
        .with_context(|| format!("invalid profile: {}", path.display()))
}

/// Parse a profile from a TOML string (useful for testing).
pub fn parse_profile_str(content: &str) -> Result<Profile> {
    let profile: Profile = toml::from_str(content).context("failed to parse profile TOML")?;
    validate_profile(&profile)?;
    Ok(profile)
}

fn validate_profile(profile: &Profile) -> Result<()> {
    anyhow::ensure!(
        !profile.patient.full_name.trim().is_empty(),
        "patient full_name must not be empty"
    );
    for (idx, member) in profile.family.iter().enumerate() {
        anyhow::ensure!(
            !member.full_name.trim().is_empty(),
            "family[{idx}]: full_name must not be empty"
        );
    }
    for (idx, item) in profile.knowledge.iter().enumerate() {
        anyhow::ensure!(
            !item.label.trim().is_empty(),
            "knowledge[{idx}]: label must not be empty"
        );
        anyhow::ensure!(
            item.sensitivity_level <= MAX_SENSITIVITY,
            "knowledge[{idx}] ({}): sensitivity_level {} exceeds the allowed range 0..={MAX_SENSITIVITY}",
            item.label,
            item.sensitivity_level
        );
    }
    Ok(())
}

impl Profile {
    /// Materialize the profile into model records with fresh ids.
    pub fn instantiate(
        &self,
        now: DateTime<Utc>,
    ) -> (Patient, Vec<FamilyMember>, Vec<KnowledgeItem>) {
        let patient = Patient {
            id: Uuid::new_v4(),
            full_name: self.patient.full_name.clone(),
            dob: self.patient.dob.clone(),
            phone: self.patient.phone.clone(),
            address: self.patient.address.clone(),
            created_at: now,
        };
        let family = self
            .family
            .iter()
            .map(|f| FamilyMember {
                id: Uuid::new_v4(),
                patient_id: patient.id,
                full_name: f.full_name.clone(),
                relationship: f.relationship.clone(),
                photo_path: f.photo_path.clone(),
                created_at: now,
            })
            .collect();
        let knowledge = self
            .knowledge
            .iter()
            .map(|k| KnowledgeItem {
                id: Uuid::new_v4(),
                patient_id: patient.id,
                category: k.category.clone(),
                label: k.label.clone(),
                value: k.value.clone(),
                sensitivity_level: k.sensitivity_level,
                is_active: k.is_active,
                created_at: now,
            })
            .collect();
        (patient, family, knowledge)
    }
}
