//! Progress analytics with JSON persistence.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use reminisce_core::error::CoreError;
use reminisce_core::traits::Store;

/// Progress summary for one patient over a trailing window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsSummary {
    pub patient_id: Uuid,
    /// When the summary was computed.
    pub generated_at: DateTime<Utc>,
    /// Trailing window length in days.
    pub window_days: i64,
    /// Fraction of answers correct per item type within the window.
    pub accuracy_by_category: BTreeMap<String, f64>,
    /// Most recent review per mastery key, formatted `item_type:item_id`.
    pub last_seen: BTreeMap<String, Option<DateTime<Utc>>>,
    /// Next scheduled review per mastery key.
    pub next_due: BTreeMap<String, Option<DateTime<Utc>>>,
    /// Completed sessions inside the window.
    pub sessions_completed: usize,
}

/// Compute a patient's progress summary from stored sessions, responses,
/// and mastery state.
///
/// Accuracy buckets come from each response's question payload: the
/// payload's item type when present, `"unknown"` otherwise. Only
/// responses recorded inside the window count.
pub fn analytics_summary(
    store: &dyn Store,
    patient_id: Uuid,
    days: i64,
) -> Result<AnalyticsSummary, CoreError> {
    let now = Utc::now();
    summary_at(store, patient_id, days, now)
}

/// Like [`analytics_summary`] but with an explicit clock, for tests.
pub fn summary_at(
    store: &dyn Store,
    patient_id: Uuid,
    days: i64,
    now: DateTime<Utc>,
) -> Result<AnalyticsSummary, CoreError> {
    store
        .patient(patient_id)?
        .ok_or(CoreError::PatientNotFound(patient_id))?;

    let cutoff = now - Duration::days(days);
    let mut correct_by_category: HashMap<String, (u64, u64)> = HashMap::new();
    let mut sessions_completed = 0usize;

    for session in store.sessions_for_patient(patient_id)? {
        let in_window = session.created_at >= cutoff;
        if in_window && session.score.is_some() {
            sessions_completed += 1;
        }

        let item_types: HashMap<Uuid, String> = store
            .questions(session.id)?
            .iter()
            .map(|q| {
                let category = q
                    .payload()
                    .ok()
                    .and_then(|p| p.item.map(|i| i.item_type.to_string()))
                    .unwrap_or_else(|| "unknown".to_string());
                (q.id, category)
            })
            .collect();

        for response in store.responses(session.id)? {
            if response.created_at < cutoff {
                continue;
            }
            let category = item_types
                .get(&response.question_id)
                .cloned()
                .unwrap_or_else(|| "unknown".to_string());
            let stat = correct_by_category.entry(category).or_insert((0, 0));
            stat.1 += 1;
            if response.correct {
                stat.0 += 1;
            }
        }
    }

    let accuracy_by_category = correct_by_category
        .into_iter()
        .map(|(category, (correct, total))| (category, correct as f64 / total.max(1) as f64))
        .collect();

    let mut last_seen = BTreeMap::new();
    let mut next_due = BTreeMap::new();
    for record in store.mastery_for_patient(patient_id)? {
        let key = format!("{}:{}", record.key.item_type, record.key.item_id);
        last_seen.insert(key.clone(), record.last_seen_at);
        next_due.insert(key, record.next_due_at);
    }

    Ok(AnalyticsSummary {
        patient_id,
        generated_at: now,
        window_days: days,
        accuracy_by_category,
        last_seen,
        next_due,
        sessions_completed,
    })
}

impl AnalyticsSummary {
    /// Save the summary as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize summary")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write summary to {}", path.display()))?;
        Ok(())
    }

    /// Load a summary from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read summary from {}", path.display()))?;
        let summary: AnalyticsSummary =
            serde_json::from_str(&content).context("failed to parse summary JSON")?;
        Ok(summary)
    }
}
