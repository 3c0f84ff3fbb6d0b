//! Markdown report generator.

use crate::summary::AnalyticsSummary;

/// Render a progress summary as a Markdown document.
pub fn generate_markdown(summary: &AnalyticsSummary) -> String {
    let mut md = String::new();

    md.push_str("# Progress report\n\n");
    md.push_str(&format!(
        "Patient `{}` | last {} days | generated {}\n\n",
        summary.patient_id,
        summary.window_days,
        summary.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    md.push_str(&format!(
        "Sessions completed: **{}**\n\n",
        summary.sessions_completed
    ));

    md.push_str("## Accuracy by category\n\n");
    if summary.accuracy_by_category.is_empty() {
        md.push_str("_No responses recorded in this window._\n\n");
    } else {
        md.push_str("| Category | Accuracy |\n|---|---|\n");
        for (category, accuracy) in &summary.accuracy_by_category {
            md.push_str(&format!("| {} | {:.1}% |\n", category, accuracy * 100.0));
        }
        md.push('\n');
    }

    md.push_str("## Review schedule\n\n");
    if summary.next_due.is_empty() {
        md.push_str("_No items reviewed yet._\n");
    } else {
        md.push_str("| Item | Last seen | Next due |\n|---|---|---|\n");
        for (key, due) in &summary.next_due {
            let seen = summary
                .last_seen
                .get(key)
                .copied()
                .flatten()
                .map(|t| t.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "never".to_string());
            let due = due
                .map(|t| t.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "unscheduled".to_string());
            md.push_str(&format!("| {key} | {seen} | {due} |\n"));
        }
    }

    md
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::collections::BTreeMap;
    use uuid::Uuid;

    #[test]
    fn renders_empty_summary() {
        let summary = AnalyticsSummary {
            patient_id: Uuid::new_v4(),
            generated_at: Utc.with_ymd_and_hms(2026, 8, 1, 12, 0, 0).unwrap(),
            window_days: 30,
            accuracy_by_category: BTreeMap::new(),
            last_seen: BTreeMap::new(),
            next_due: BTreeMap::new(),
            sessions_completed: 0,
        };
        let md = generate_markdown(&summary);
        assert!(md.contains("# Progress report"));
        assert!(md.contains("No responses recorded"));
        assert!(md.contains("No items reviewed"));
    }

    #[test]
    fn renders_accuracy_rows() {
        let mut accuracy = BTreeMap::new();
        accuracy.insert("knowledge".to_string(), 0.75);
        let mut next_due = BTreeMap::new();
        let key = format!("knowledge:{}", Uuid::new_v4());
        next_due.insert(
            key.clone(),
            Some(Utc.with_ymd_and_hms(2026, 8, 15, 0, 0, 0).unwrap()),
        );
        let summary = AnalyticsSummary {
            patient_id: Uuid::new_v4(),
            generated_at: Utc.with_ymd_and_hms(2026, 8, 1, 12, 0, 0).unwrap(),
            window_days: 30,
            accuracy_by_category: accuracy,
            last_seen: BTreeMap::new(),
            next_due,
            sessions_completed: 2,
        };
        let md = generate_markdown(&summary);
        assert!(md.contains("| knowledge | 75.0% |"));
        assert!(md.contains("2026-08-15"));
        assert!(md.contains("never"));
    }
}
