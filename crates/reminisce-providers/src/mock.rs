//! Mock generator for testing.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use reminisce_core::error::GeneratorError;
use reminisce_core::model::{AnswerValue, QuestionDraft, QuestionType};
use reminisce_core::traits::{DraftRequest, QuestionGenerator};

/// A mock question generator for exercising the quiz pipeline without
/// real API calls.
///
/// By default it drafts one recall question per selected item, using the
/// item's value as the correct answer. `failing()` and `malformed()`
/// variants drive the fallback path in tests.
pub struct MockGenerator {
    mode: Mode,
    call_count: AtomicU32,
    last_request: Mutex<Option<DraftRequest>>,
}

enum Mode {
    Echo,
    Fixed(Vec<QuestionDraft>),
    Failing,
    Malformed,
}

impl MockGenerator {
    /// A generator that drafts a recall question per selected item.
    pub fn new() -> Self {
        Self::with_mode(Mode::Echo)
    }

    /// A generator that always returns the given drafts.
    pub fn with_drafts(drafts: Vec<QuestionDraft>) -> Self {
        Self::with_mode(Mode::Fixed(drafts))
    }

    /// A generator whose every call fails with an API error.
    pub fn failing() -> Self {
        Self::with_mode(Mode::Failing)
    }

    /// A generator whose every call fails as malformed output.
    pub fn malformed() -> Self {
        Self::with_mode(Mode::Malformed)
    }

    fn with_mode(mode: Mode) -> Self {
        Self {
            mode,
            call_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Number of calls made to this generator.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// The last request received, if any.
    pub fn last_request(&self) -> Option<DraftRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QuestionGenerator for MockGenerator {
    fn name(&self) -> &str {
        "mock"
    }

    async fn draft(&self, request: &DraftRequest) -> anyhow::Result<Vec<QuestionDraft>> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        *self.last_request.lock().unwrap() = Some(request.clone());

        match &self.mode {
            Mode::Echo => Ok(request
                .selected
                .iter()
                .map(|item| QuestionDraft {
                    question_type: QuestionType::Recall,
                    prompt: format!("What do you remember about {}?", item.label()),
                    options: None,
                    correct_answer: AnswerValue::from(item.value()),
                    item: Some(item.item_ref()),
                    difficulty: 1,
                    acceptable_answers: vec![item.value().to_string()],
                })
                .collect()),
            Mode::Fixed(drafts) => Ok(drafts.clone()),
            Mode::Failing => Err(GeneratorError::ApiError {
                status: 500,
                message: "mock failure".into(),
            }
            .into()),
            Mode::Malformed => Err(GeneratorError::Malformed("mock garbage".into()).into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use reminisce_core::model::KnowledgeItem;
    use reminisce_core::model::ReviewableItem;
    use uuid::Uuid;

    fn request_with_one_item() -> DraftRequest {
        let item = KnowledgeItem {
            id: Uuid::new_v4(),
            patient_id: Uuid::new_v4(),
            category: "preferences".into(),
            label: "favorite color".into(),
            value: "blue".into(),
            sensitivity_level: 0,
            is_active: true,
            created_at: Utc::now(),
        };
        DraftRequest {
            patient_name: "Alice".into(),
            family: vec![],
            knowledge: vec![item.clone()],
            due: vec![],
            selected: vec![ReviewableItem::Knowledge(item)],
            n: 5,
        }
    }

    #[tokio::test]
    async fn echoes_selected_items() {
        let generator = MockGenerator::new();
        let drafts = generator.draft(&request_with_one_item()).await.unwrap();
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].question_type, QuestionType::Recall);
        assert!(drafts[0].prompt.contains("favorite color"));
        assert_eq!(generator.call_count(), 1);
    }

    #[tokio::test]
    async fn records_last_request() {
        let generator = MockGenerator::new();
        generator.draft(&request_with_one_item()).await.unwrap();
        let last = generator.last_request().unwrap();
        assert_eq!(last.patient_name, "Alice");
        assert_eq!(last.n, 5);
    }

    #[tokio::test]
    async fn failing_mode_returns_api_error() {
        let generator = MockGenerator::failing();
        let err = generator
            .draft(&request_with_one_item())
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<GeneratorError>(),
            Some(GeneratorError::ApiError { status: 500, .. })
        ));
        assert_eq!(generator.call_count(), 1);
    }
}
