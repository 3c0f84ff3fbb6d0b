//! Core trait definitions for the persistence and question-generation
//! collaborators.
//!
//! `Store` is implemented by the `reminisce-store` crate; the async
//! `QuestionGenerator` trait is implemented by `reminisce-providers`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::GeneratorError;
use crate::model::{
    FamilyMember, ItemRef, KnowledgeItem, MasteryKey, MasteryRecord, Patient, QuestionDraft,
    QuizQuestion, QuizResponse, QuizSession, ReviewableItem,
};

// ---------------------------------------------------------------------------
// Persistence collaborator
// ---------------------------------------------------------------------------

/// The persistence collaborator the core engine runs against.
///
/// Implementations own any transactional discipline; the core touches a
/// bounded set of records per call and never performs I/O itself.
pub trait Store: Send + Sync {
    fn patient(&self, patient_id: Uuid) -> anyhow::Result<Option<Patient>>;

    fn family_members(&self, patient_id: Uuid) -> anyhow::Result<Vec<FamilyMember>>;

    fn knowledge_items(&self, patient_id: Uuid) -> anyhow::Result<Vec<KnowledgeItem>>;

    /// At most one record exists per key.
    fn mastery(&self, key: &MasteryKey) -> anyhow::Result<Option<MasteryRecord>>;

    fn mastery_for_patient(&self, patient_id: Uuid) -> anyhow::Result<Vec<MasteryRecord>>;

    fn upsert_mastery(&self, record: MasteryRecord) -> anyhow::Result<()>;

    fn create_session(&self, session: QuizSession) -> anyhow::Result<()>;

    fn session(&self, session_id: Uuid) -> anyhow::Result<Option<QuizSession>>;

    fn sessions_for_patient(&self, patient_id: Uuid) -> anyhow::Result<Vec<QuizSession>>;

    /// Questions are append-only.
    fn add_question(&self, question: QuizQuestion) -> anyhow::Result<()>;

    fn questions(&self, session_id: Uuid) -> anyhow::Result<Vec<QuizQuestion>>;

    /// Responses are append-only.
    fn add_response(&self, response: QuizResponse) -> anyhow::Result<()>;

    fn responses(&self, session_id: Uuid) -> anyhow::Result<Vec<QuizResponse>>;

    /// Mark a session completed with its aggregates. The Active ->
    /// Completed transition happens exactly once.
    fn complete_session(
        &self,
        session_id: Uuid,
        score: f64,
        avg_response_time_ms: f64,
    ) -> anyhow::Result<()>;
}

/// All reviewable items for a patient, knowledge facts first.
pub fn catalog(store: &dyn Store, patient_id: Uuid) -> anyhow::Result<Vec<ReviewableItem>> {
    let mut items: Vec<ReviewableItem> = store
        .knowledge_items(patient_id)?
        .into_iter()
        .map(ReviewableItem::Knowledge)
        .collect();
    items.extend(
        store
            .family_members(patient_id)?
            .into_iter()
            .map(ReviewableItem::Family),
    );
    Ok(items)
}

// ---------------------------------------------------------------------------
// Question-generation collaborator
// ---------------------------------------------------------------------------

/// Trait for backends that draft quiz questions from patient facts.
#[async_trait]
pub trait QuestionGenerator: Send + Sync {
    /// Human-readable generator name (e.g. "azure-openai").
    fn name(&self) -> &str;

    /// Draft up to `request.n` questions. Called at most once per quiz
    /// generation; any failure triggers the deterministic fallback.
    async fn draft(&self, request: &DraftRequest) -> anyhow::Result<Vec<QuestionDraft>>;
}

/// Everything a generator gets to work with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftRequest {
    /// The patient's display name.
    pub patient_name: String,
    /// The full family-member list.
    pub family: Vec<FamilyMember>,
    /// Knowledge facts, already sensitivity-filtered.
    pub knowledge: Vec<KnowledgeItem>,
    /// Items currently due for review.
    pub due: Vec<ItemRef>,
    /// The assembler's item selection, in priority order.
    pub selected: Vec<ReviewableItem>,
    /// Requested question count.
    pub n: usize,
}

/// System prompt shared by the hosted generation providers.
pub const DRAFT_SYSTEM_PROMPT: &str = "You are generating gentle quiz questions for dementia care. \
Use ONLY provided facts. Respond with JSON matching the schema: \
{\"questions\":[{\"question_type\":\"mcq|recall|photo_identity|true_false\",\
\"prompt\":\"string\",\"options\":[\"string\"...],\"correct_answer\":\"string|number|boolean\",\
\"item_type\":\"knowledge|family\",\"item_id\":\"uuid\",\"difficulty\":1,\
\"acceptable_answers\":[\"string\"...]}]}";

// ---------------------------------------------------------------------------
// Structured-output parsing
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct DraftEnvelope {
    #[serde(default)]
    questions: Vec<QuestionDraft>,
}

/// Extract a JSON document from a possibly markdown-fenced LLM response.
///
/// Handles ```json fences, bare ``` fences, and raw JSON. When no fence
/// is present the response is returned as-is.
pub fn extract_json_from_markdown(response: &str) -> &str {
    let trimmed = response.trim();
    let Some(start) = trimmed.find("```") else {
        return trimmed;
    };
    let after_fence = &trimmed[start + 3..];
    // Skip the language tag on the opening fence line
    let body = match after_fence.find('\n') {
        Some(newline) => &after_fence[newline + 1..],
        None => after_fence,
    };
    match body.rfind("```") {
        Some(end) => body[..end].trim(),
        None => body.trim(),
    }
}

/// Decode a generator's structured output into question drafts.
///
/// Any shape mismatch is a [`GeneratorError::Malformed`]; the caller
/// treats that as "no result" and falls back. A well-formed but empty
/// question list is returned as-is.
pub fn parse_draft_response(content: &str) -> Result<Vec<QuestionDraft>, GeneratorError> {
    let json = extract_json_from_markdown(content);
    let envelope: DraftEnvelope = serde_json::from_str(json)
        .map_err(|e| GeneratorError::Malformed(e.to_string()))?;
    for draft in &envelope.questions {
        if draft.difficulty == 0 {
            return Err(GeneratorError::Malformed(
                "difficulty must be at least 1".into(),
            ));
        }
    }
    Ok(envelope.questions)
}
