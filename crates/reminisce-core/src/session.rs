//! Session orchestration.
//!
//! Ties the assembler, evaluator, and scheduler together: generates a
//! quiz session, scores a submission batch, and feeds outcomes back into
//! the mastery store.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::assemble::assemble;
use crate::due::due_entries;
use crate::error::CoreError;
use crate::evaluate::is_correct;
use crate::model::{
    AnswerValue, ItemRef, MasteryKey, QuestionPayload, QuestionType, QuizQuestion, QuizResponse,
    QuizSession, ReviewableItem, SessionStatus,
};
use crate::schedule;
use crate::traits::{QuestionGenerator, Store};

/// Default number of questions per quiz.
pub const DEFAULT_QUIZ_LEN: usize = 7;

/// Knobs for quiz generation.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Maximum number of questions.
    pub n: usize,
    /// Include knowledge items at or above the sensitivity threshold.
    pub include_sensitive: bool,
    /// Echo acceptable alternates back to the caller (useful for
    /// caregiver review; off for actual quiz delivery).
    pub reveal_answers: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            n: DEFAULT_QUIZ_LEN,
            include_sensitive: false,
            reveal_answers: false,
        }
    }
}

/// A question as handed to the quiz taker: the payload minus the answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuedQuestion {
    pub question_id: Uuid,
    pub question_type: QuestionType,
    pub prompt: String,
    #[serde(default)]
    pub options: Option<Vec<String>>,
    #[serde(flatten)]
    pub item: Option<ItemRef>,
    pub difficulty: u8,
    #[serde(default)]
    pub acceptable_answers: Option<Vec<String>>,
}

/// Result of quiz generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedQuiz {
    pub session_id: Uuid,
    pub questions: Vec<IssuedQuestion>,
}

/// One answer in a submission batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub question_id: Uuid,
    pub answer: AnswerValue,
    pub response_time_ms: u64,
}

/// Aggregates reported after scoring a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitOutcome {
    pub session_id: Uuid,
    pub score: f64,
    pub total_questions: usize,
    pub correct: usize,
    pub avg_response_time_ms: f64,
    /// Question ids answered incorrectly.
    pub weak_items: Vec<Uuid>,
}

/// The central orchestrator: one instance per process, collaborators
/// injected at construction. Whether a generator is present is decided
/// once here, not per call.
pub struct SessionEngine {
    store: Arc<dyn Store>,
    generator: Option<Arc<dyn QuestionGenerator>>,
}

impl SessionEngine {
    pub fn new(store: Arc<dyn Store>, generator: Option<Arc<dyn QuestionGenerator>>) -> Self {
        Self { store, generator }
    }

    /// Create a quiz session for a patient.
    ///
    /// Resolves the due set, assembles drafts (generator or fallback),
    /// persists the session and its questions, and returns the issued
    /// questions with answers stripped.
    pub async fn generate(
        &self,
        patient_id: Uuid,
        opts: &GenerateOptions,
    ) -> Result<GeneratedQuiz, CoreError> {
        let patient = self
            .store
            .patient(patient_id)?
            .ok_or(CoreError::PatientNotFound(patient_id))?;

        let family = self.store.family_members(patient_id)?;
        let knowledge = self.store.knowledge_items(patient_id)?;
        let mastery = self.store.mastery_for_patient(patient_id)?;
        let items: Vec<ReviewableItem> = knowledge
            .iter()
            .cloned()
            .map(ReviewableItem::Knowledge)
            .chain(family.iter().cloned().map(ReviewableItem::Family))
            .collect();

        let now = Utc::now();
        let due = due_entries(patient_id, now, &mastery, &items);
        let drafts = assemble(
            &patient,
            &knowledge,
            &family,
            &due,
            opts.n,
            opts.include_sensitive,
            self.generator.as_deref(),
        )
        .await;

        let session = QuizSession::new(patient_id, drafts.len(), now);
        let session_id = session.id;
        self.store.create_session(session)?;

        let mut questions = Vec::with_capacity(drafts.len());
        for draft in &drafts {
            let question = QuizQuestion::from_draft(session_id, draft, now);
            questions.push(IssuedQuestion {
                question_id: question.id,
                question_type: draft.question_type,
                prompt: draft.prompt.clone(),
                options: draft.options.clone(),
                item: draft.item,
                difficulty: draft.difficulty,
                acceptable_answers: opts
                    .reveal_answers
                    .then(|| draft.acceptable_answers.clone()),
            });
            self.store.add_question(question)?;
        }

        tracing::info!(
            %session_id,
            %patient_id,
            questions = questions.len(),
            "quiz session created"
        );

        Ok(GeneratedQuiz {
            session_id,
            questions,
        })
    }

    /// Score a submission batch for a session.
    ///
    /// The batch is validated as a whole before anything is written: an
    /// unknown question id, a duplicate id within the batch, or an
    /// undecodable payload rejects the entire request with no partial
    /// responses recorded. Mastery updates are keyed by each question's
    /// item reference and skipped when the payload has none.
    pub fn submit(
        &self,
        session_id: Uuid,
        submissions: &[Submission],
    ) -> Result<SubmitOutcome, CoreError> {
        let session = self
            .store
            .session(session_id)?
            .ok_or(CoreError::SessionNotFound(session_id))?;
        if session.status == SessionStatus::Completed {
            return Err(CoreError::SessionCompleted(session_id));
        }

        let questions: HashMap<Uuid, QuizQuestion> = self
            .store
            .questions(session_id)?
            .into_iter()
            .map(|q| (q.id, q))
            .collect();

        // Phase one: resolve and evaluate everything before writing.
        let mut batch: Vec<(&Submission, QuestionPayload, bool)> =
            Vec::with_capacity(submissions.len());
        let mut ids: HashSet<Uuid> = HashSet::new();
        for submission in submissions {
            if !ids.insert(submission.question_id) {
                return Err(CoreError::Validation(format!(
                    "duplicate question id in batch: {}",
                    submission.question_id
                )));
            }
            let question = questions
                .get(&submission.question_id)
                .ok_or(CoreError::QuestionNotFound(submission.question_id))?;
            let payload = question
                .payload()
                .map_err(|e| CoreError::Validation(format!("corrupt question payload: {e}")))?;
            let correct = is_correct(
                payload.question_type,
                &payload.correct_answer,
                &submission.answer,
                &payload.acceptable_answers,
            );
            batch.push((submission, payload, correct));
        }

        // Phase two: record responses and feed the scheduler.
        let now = Utc::now();
        let mut correct_count = 0usize;
        let mut total_time = 0u64;
        let mut weak_items = Vec::new();
        for (submission, payload, correct) in &batch {
            if *correct {
                correct_count += 1;
            } else {
                weak_items.push(submission.question_id);
            }
            total_time += submission.response_time_ms;

            self.store.add_response(QuizResponse {
                id: Uuid::new_v4(),
                session_id,
                question_id: submission.question_id,
                answer: submission.answer.clone(),
                correct: *correct,
                response_time_ms: submission.response_time_ms,
                created_at: now,
            })?;

            if let Some(item) = payload.item {
                let key = MasteryKey::new(session.patient_id, item);
                let existing = self.store.mastery(&key)?;
                let updated = schedule::update(
                    existing.as_ref(),
                    key,
                    *correct,
                    submission.response_time_ms,
                    now,
                );
                self.store.upsert_mastery(updated)?;
            }
        }

        // An empty batch scores 0, not a division error.
        let submitted = submissions.len();
        let score = correct_count as f64 / submitted.max(1) as f64;
        let avg_response_time_ms = total_time as f64 / submitted.max(1) as f64;

        self.store
            .complete_session(session_id, score, avg_response_time_ms)?;

        tracing::info!(
            %session_id,
            score,
            correct = correct_count,
            total = submitted,
            "quiz session completed"
        );

        Ok(SubmitOutcome {
            session_id,
            score,
            total_questions: submitted,
            correct: correct_count,
            avg_response_time_ms,
            weak_items,
        })
    }
}
