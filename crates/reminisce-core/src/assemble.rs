//! Quiz assembly.
//!
//! Selects a bounded set of reviewable items (due items first, then
//! catalog fill-in) and turns them into question drafts, delegating to a
//! generation collaborator when one is configured and always recovering
//! to deterministic fallback drafting when it fails.

use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use crate::due::DueEntry;
use crate::model::{
    AnswerValue, FamilyMember, ItemType, KnowledgeItem, Patient, QuestionDraft,
    QuestionType, ReviewableItem,
};
use crate::traits::{DraftRequest, QuestionGenerator};

/// Deterministic drafting used when no generator is configured or the
/// configured one fails: one multiple-choice identification question per
/// selected item.
pub fn fallback_drafts(items: &[ReviewableItem]) -> Vec<QuestionDraft> {
    items
        .iter()
        .map(|item| QuestionDraft {
            question_type: QuestionType::MultipleChoice,
            prompt: format!("Who/What is {}?", item.label()),
            options: Some(vec![item.value().to_string(), "Not sure".to_string()]),
            correct_answer: AnswerValue::String(item.value().to_string()),
            item: Some(item.item_ref()),
            difficulty: 1,
            acceptable_answers: Vec::new(),
        })
        .collect()
}

/// Select up to `n` items: due entries in order first, then the filtered
/// knowledge list, then family members, each item at most once.
pub fn select_items(
    knowledge: &[KnowledgeItem],
    family: &[FamilyMember],
    due: &[DueEntry],
    n: usize,
) -> Vec<ReviewableItem> {
    let knowledge_lookup: HashMap<Uuid, &KnowledgeItem> =
        knowledge.iter().map(|k| (k.id, k)).collect();
    let family_lookup: HashMap<Uuid, &FamilyMember> = family.iter().map(|f| (f.id, f)).collect();

    let mut selected: Vec<ReviewableItem> = Vec::new();
    let mut seen: HashSet<Uuid> = HashSet::new();

    // Due items take priority. Entries pointing at filtered-out or
    // unknown items are skipped.
    for entry in due {
        let item_ref = entry.item_ref();
        let item = match item_ref.item_type {
            ItemType::Knowledge => knowledge_lookup
                .get(&item_ref.item_id)
                .map(|k| ReviewableItem::Knowledge((*k).clone())),
            ItemType::Family => family_lookup
                .get(&item_ref.item_id)
                .map(|f| ReviewableItem::Family((*f).clone())),
        };
        if let Some(item) = item {
            if seen.insert(item.id()) {
                selected.push(item);
            }
        }
    }

    // Fill remaining slots from the catalog in fixed order.
    let fill = knowledge
        .iter()
        .map(|k| ReviewableItem::Knowledge(k.clone()))
        .chain(family.iter().map(|f| ReviewableItem::Family(f.clone())));
    for item in fill {
        if selected.len() >= n {
            break;
        }
        if seen.insert(item.id()) {
            selected.push(item);
        }
    }

    selected.truncate(n);
    selected
}

/// Assemble up to `n` question drafts for a patient.
///
/// Inactive knowledge facts are always excluded; facts with sensitivity
/// at or above the threshold are excluded unless `include_sensitive`.
/// Family members are never filtered. Generator failures are recovered
/// here and never surface: when items were selected the result is
/// non-empty.
pub async fn assemble(
    patient: &Patient,
    knowledge: &[KnowledgeItem],
    family: &[FamilyMember],
    due: &[DueEntry],
    n: usize,
    include_sensitive: bool,
    generator: Option<&dyn QuestionGenerator>,
) -> Vec<QuestionDraft> {
    let filtered: Vec<KnowledgeItem> = knowledge
        .iter()
        .filter(|k| k.is_active && (include_sensitive || !k.is_sensitive()))
        .cloned()
        .collect();

    let selected = select_items(&filtered, family, due, n);

    let Some(generator) = generator else {
        return fallback_drafts(&selected);
    };

    let request = DraftRequest {
        patient_name: patient.full_name.clone(),
        family: family.to_vec(),
        knowledge: filtered,
        due: due.iter().map(|d| d.item_ref()).collect(),
        selected: selected.clone(),
        n,
    };

    match generator.draft(&request).await {
        Ok(mut drafts) => {
            drafts.truncate(n);
            drafts
        }
        Err(e) => {
            tracing::warn!(
                generator = generator.name(),
                error = %e,
                "question generation failed, using fallback drafts"
            );
            fallback_drafts(&selected)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::due::due_entries;
    use crate::model::{MasteryKey, MasteryRecord};
    use async_trait::async_trait;
    use chrono::Utc;

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

    fn knowledge_item(patient_id: Uuid, label: &str, value: &str, sensitivity: u8) -> KnowledgeItem {
        KnowledgeItem {
            id: Uuid::new_v4(),
            patient_id,
            category: "personal".into(),
            label: label.into(),
            value: value.into(),
            sensitivity_level: sensitivity,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    fn family_member(patient_id: Uuid, name: &str) -> FamilyMember {
        FamilyMember {
            id: Uuid::new_v4(),
            patient_id,
            full_name: name.into(),
            relationship: "daughter".into(),
            photo_path: None,
            created_at: Utc::now(),
        }
    }

    struct FailingGenerator;

    #[async_trait]
    impl QuestionGenerator for FailingGenerator {
        fn name(&self) -> &str {
            "failing"
        }

        async fn draft(&self, _request: &DraftRequest) -> anyhow::Result<Vec<QuestionDraft>> {
            anyhow::bail!("boom")
        }
    }

    struct EchoGenerator {
        count: usize,
    }

    #[async_trait]
    impl QuestionGenerator for EchoGenerator {
        fn name(&self) -> &str {
            "echo"
        }

        async fn draft(&self, request: &DraftRequest) -> anyhow::Result<Vec<QuestionDraft>> {
            Ok((0..self.count)
                .map(|i| QuestionDraft {
                    question_type: QuestionType::Recall,
                    prompt: format!("q{i} for {}", request.patient_name),
                    options: None,
                    correct_answer: "x".into(),
                    item: request.selected.first().map(|s| s.item_ref()),
                    difficulty: 1,
                    acceptable_answers: Vec::new(),
                })
                .collect())
        }
    }

    #[tokio::test]
    async fn fallback_when_no_generator_configured() {
        let p = patient();
        let k = vec![knowledge_item(p.id, "favorite color", "blue", 0)];
        let drafts = assemble(&p, &k, &[], &[], 5, false, None).await;
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].question_type, QuestionType::MultipleChoice);
        assert_eq!(drafts[0].prompt, "Who/What is favorite color?");
        assert_eq!(
            drafts[0].options,
            Some(vec!["blue".to_string(), "Not sure".to_string()])
        );
        assert_eq!(drafts[0].correct_answer, AnswerValue::String("blue".into()));
        assert_eq!(drafts[0].difficulty, 1);
        assert!(drafts[0].acceptable_answers.is_empty());
    }

    #[tokio::test]
    async fn generator_failure_falls_back_silently() {
        let p = patient();
        let k = vec![knowledge_item(p.id, "hometown", "Oslo", 0)];
        let drafts = assemble(&p, &k, &[], &[], 3, false, Some(&FailingGenerator)).await;
        assert_eq!(drafts.len(), 1, "fallback must still produce drafts");
        assert_eq!(drafts[0].question_type, QuestionType::MultipleChoice);
    }

    #[tokio::test]
    async fn generator_output_is_capped_at_n() {
        let p = patient();
        let k = vec![knowledge_item(p.id, "hometown", "Oslo", 0)];
        let generator = EchoGenerator { count: 10 };
        let drafts = assemble(&p, &k, &[], &[], 3, false, Some(&generator)).await;
        assert_eq!(drafts.len(), 3);
    }

    #[tokio::test]
    async fn sensitive_items_excluded_by_default() {
        let p = patient();
        let k = vec![
            knowledge_item(p.id, "favorite color", "blue", 0),
            knowledge_item(p.id, "diagnosis", "private", 3),
            knowledge_item(p.id, "borderline", "level two", 2),
        ];
        let drafts = assemble(&p, &k, &[], &[], 10, false, None).await;
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].prompt, "Who/What is favorite color?");

        let drafts = assemble(&p, &k, &[], &[], 10, true, None).await;
        assert_eq!(drafts.len(), 3);
    }

    #[tokio::test]
    async fn inactive_items_never_quizzed() {
        let p = patient();
        let mut retired = knowledge_item(p.id, "old address", "Elm Street", 0);
        retired.is_active = false;
        let k = vec![knowledge_item(p.id, "favorite color", "blue", 0), retired];

        let drafts = assemble(&p, &k, &[], &[], 10, true, None).await;
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].prompt, "Who/What is favorite color?");
    }

    #[tokio::test]
    async fn family_members_never_sensitivity_filtered() {
        let p = patient();
        let f = vec![family_member(p.id, "Maria")];
        let drafts = assemble(&p, &[], &f, &[], 10, false, None).await;
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].prompt, "Who/What is Maria?");
    }

    #[test]
    fn due_items_selected_first() {
        let patient_id = Uuid::new_v4();
        let a = knowledge_item(patient_id, "a", "1", 0);
        let b = knowledge_item(patient_id, "b", "2", 0);
        let f = family_member(patient_id, "Maria");

        // Only the family member has been reviewed and is overdue.
        let record = MasteryRecord::baseline(MasteryKey {
            patient_id,
            item_type: ItemType::Family,
            item_id: f.id,
        });
        let items = vec![
            ReviewableItem::Knowledge(a.clone()),
            ReviewableItem::Knowledge(b.clone()),
            ReviewableItem::Family(f.clone()),
        ];
        let due = due_entries(patient_id, Utc::now(), &[record], &items);

        let selected = select_items(&[a, b], &[f.clone()], &due, 2);
        assert_eq!(selected.len(), 2);
        assert_eq!(selected[0].id(), f.id, "due item must come first");
    }

    #[test]
    fn due_entries_pointing_at_filtered_items_are_skipped() {
        let patient_id = Uuid::new_v4();
        let sensitive = knowledge_item(patient_id, "diagnosis", "private", 4);
        let due = vec![DueEntry::Unseen {
            item_type: ItemType::Knowledge,
            item_id: sensitive.id,
        }];
        // Filtered list does not contain the sensitive item.
        let selected = select_items(&[], &[], &due, 5);
        assert!(selected.is_empty());
    }

    #[test]
    fn selection_truncates_to_n() {
        let patient_id = Uuid::new_v4();
        let knowledge: Vec<KnowledgeItem> = (0..10)
            .map(|i| knowledge_item(patient_id, &format!("k{i}"), "v", 0))
            .collect();
        let selected = select_items(&knowledge, &[], &[], 4);
        assert_eq!(selected.len(), 4);
    }
}
