//! Core data model types for reminisce.
//!
//! These are the fundamental types the entire reminisce system uses to
//! represent patients, reviewable items, mastery state, and quiz sessions.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A patient profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    /// Unique identifier.
    pub id: Uuid,
    /// Full display name.
    pub full_name: String,
    /// Date of birth, as entered by the caregiver.
    pub dob: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A family member linked to a patient.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FamilyMember {
    pub id: Uuid,
    pub patient_id: Uuid,
    /// Full display name, doubles as the canonical answer.
    pub full_name: String,
    /// Relationship to the patient (e.g. "daughter").
    pub relationship: String,
    /// Path to an uploaded photo, if any.
    #[serde(default)]
    pub photo_path: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Maximum allowed sensitivity level for a knowledge item.
pub const MAX_SENSITIVITY: u8 = 5;

/// Knowledge items at or above this level are excluded from quizzes
/// unless the caller opts in.
pub const SENSITIVE_THRESHOLD: u8 = 2;

/// A personal fact about a patient.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeItem {
    pub id: Uuid,
    pub patient_id: Uuid,
    /// Grouping category (e.g. "personal", "places").
    pub category: String,
    /// What the fact is about (e.g. "favorite color").
    pub label: String,
    /// The canonical answer (e.g. "blue").
    pub value: String,
    /// 0..=5, higher means more sensitive.
    #[serde(default)]
    pub sensitivity_level: u8,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

fn default_true() -> bool {
    true
}

impl KnowledgeItem {
    /// Whether this item should be excluded when sensitive items are off.
    pub fn is_sensitive(&self) -> bool {
        self.sensitivity_level >= SENSITIVE_THRESHOLD
    }
}

/// The kind of thing a quiz question can be about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    Knowledge,
    Family,
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemType::Knowledge => write!(f, "knowledge"),
            ItemType::Family => write!(f, "family"),
        }
    }
}

impl FromStr for ItemType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "knowledge" => Ok(ItemType::Knowledge),
            "family" => Ok(ItemType::Family),
            other => Err(format!("unknown item type: {other}")),
        }
    }
}

/// Anything a quiz question can be generated from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReviewableItem {
    Knowledge(KnowledgeItem),
    Family(FamilyMember),
}

impl ReviewableItem {
    pub fn id(&self) -> Uuid {
        match self {
            ReviewableItem::Knowledge(k) => k.id,
            ReviewableItem::Family(f) => f.id,
        }
    }

    pub fn item_type(&self) -> ItemType {
        match self {
            ReviewableItem::Knowledge(_) => ItemType::Knowledge,
            ReviewableItem::Family(_) => ItemType::Family,
        }
    }

    pub fn patient_id(&self) -> Uuid {
        match self {
            ReviewableItem::Knowledge(k) => k.patient_id,
            ReviewableItem::Family(f) => f.patient_id,
        }
    }

    /// What the question asks about: the fact label or the person's name.
    pub fn label(&self) -> &str {
        match self {
            ReviewableItem::Knowledge(k) => &k.label,
            ReviewableItem::Family(f) => &f.full_name,
        }
    }

    /// The canonical answer: the fact value or the person's name.
    pub fn value(&self) -> &str {
        match self {
            ReviewableItem::Knowledge(k) => &k.value,
            ReviewableItem::Family(f) => &f.full_name,
        }
    }

    /// Whether the item is still eligible for review. Family members do
    /// not retire; knowledge facts can.
    pub fn is_active(&self) -> bool {
        match self {
            ReviewableItem::Knowledge(k) => k.is_active,
            ReviewableItem::Family(_) => true,
        }
    }

    /// The dedup/mastery key for this item.
    pub fn item_ref(&self) -> ItemRef {
        ItemRef {
            item_type: self.item_type(),
            item_id: self.id(),
        }
    }
}

/// Reference from a question back to the item it was generated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemRef {
    pub item_type: ItemType,
    pub item_id: Uuid,
}

/// Key identifying one mastery record: at most one record exists per key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MasteryKey {
    pub patient_id: Uuid,
    pub item_type: ItemType,
    pub item_id: Uuid,
}

impl MasteryKey {
    pub fn new(patient_id: Uuid, item: ItemRef) -> Self {
        Self {
            patient_id,
            item_type: item.item_type,
            item_id: item.item_id,
        }
    }
}

/// Per (patient, item) spaced-repetition state.
///
/// `consecutive_correct` and `consecutive_incorrect` are never both
/// positive: each outcome resets the opposite streak.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MasteryRecord {
    #[serde(flatten)]
    pub key: MasteryKey,
    /// Proficiency estimate, clamped to [0.0, 1.0].
    pub mastery_score: f64,
    pub consecutive_correct: u32,
    pub consecutive_incorrect: u32,
    pub last_seen_at: Option<DateTime<Utc>>,
    pub next_due_at: Option<DateTime<Utc>>,
}

impl MasteryRecord {
    /// A never-reviewed baseline for the given key.
    pub fn baseline(key: MasteryKey) -> Self {
        Self {
            key,
            mastery_score: 0.0,
            consecutive_correct: 0,
            consecutive_incorrect: 0,
            last_seen_at: None,
            next_due_at: None,
        }
    }

    /// Whether this record is due for review at `now`.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        match self.next_due_at {
            None => true,
            Some(due) => due <= now,
        }
    }
}

/// Supported question types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    /// Wire name "mcq".
    #[serde(rename = "mcq")]
    MultipleChoice,
    Recall,
    PhotoIdentity,
    TrueFalse,
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionType::MultipleChoice => write!(f, "mcq"),
            QuestionType::Recall => write!(f, "recall"),
            QuestionType::PhotoIdentity => write!(f, "photo_identity"),
            QuestionType::TrueFalse => write!(f, "true_false"),
        }
    }
}

impl FromStr for QuestionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mcq" => Ok(QuestionType::MultipleChoice),
            "recall" => Ok(QuestionType::Recall),
            "photo_identity" => Ok(QuestionType::PhotoIdentity),
            "true_false" => Ok(QuestionType::TrueFalse),
            other => Err(format!("unknown question type: {other}")),
        }
    }
}

/// A structured answer value as it crosses the persistence boundary.
///
/// Quiz answers can be plain strings, numbers, booleans, or nested
/// structures; this round-trips all of them through the store's textual
/// encoding without loss.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Bool(bool),
    Number(f64),
    String(String),
    Sequence(Vec<AnswerValue>),
    Object(serde_json::Map<String, serde_json::Value>),
}

impl AnswerValue {
    /// The string form used for answer comparison.
    ///
    /// Integral numbers render without a trailing `.0` so `42` submitted
    /// as a number matches the canonical string "42".
    pub fn canonical_text(&self) -> String {
        match self {
            AnswerValue::Bool(b) => b.to_string(),
            AnswerValue::Number(n) => {
                if n.fract() == 0.0 && n.is_finite() {
                    format!("{}", *n as i64)
                } else {
                    n.to_string()
                }
            }
            AnswerValue::String(s) => s.clone(),
            AnswerValue::Sequence(_) | AnswerValue::Object(_) => {
                serde_json::to_string(self).unwrap_or_default()
            }
        }
    }
}

impl From<&str> for AnswerValue {
    fn from(s: &str) -> Self {
        AnswerValue::String(s.to_string())
    }
}

/// An unpersisted candidate question produced by the assembler or a
/// generation collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionDraft {
    pub question_type: QuestionType,
    pub prompt: String,
    /// Multiple-choice options, if applicable.
    #[serde(default)]
    pub options: Option<Vec<String>>,
    pub correct_answer: AnswerValue,
    /// Which reviewable item this question was drawn from. Generators may
    /// omit it, in which case no mastery update is attributed.
    #[serde(flatten)]
    pub item: Option<ItemRef>,
    pub difficulty: u8,
    #[serde(default)]
    pub acceptable_answers: Vec<String>,
}

/// The draft fields a stored question carries, serialized as one unit.
pub type QuestionPayload = QuestionDraft;

/// A persisted quiz question. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub id: Uuid,
    pub session_id: Uuid,
    pub question_type: QuestionType,
    /// The full [`QuestionPayload`] serialized as JSON.
    pub payload_json: String,
    pub created_at: DateTime<Utc>,
}

impl QuizQuestion {
    /// Create a question from a draft, serializing the payload.
    pub fn from_draft(session_id: Uuid, draft: &QuestionDraft, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            session_id,
            question_type: draft.question_type,
            payload_json: serde_json::to_string(draft).unwrap_or_default(),
            created_at: now,
        }
    }

    /// Decode the payload back to its structured form.
    pub fn payload(&self) -> Result<QuestionPayload, serde_json::Error> {
        serde_json::from_str(&self.payload_json)
    }
}

/// Lifecycle of a quiz session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Active,
    Completed,
}

/// One quiz run for a patient. Transitions `Active -> Completed` exactly
/// once, when its submission batch is scored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizSession {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub status: SessionStatus,
    pub total_questions: usize,
    /// Fraction of answers correct; set on completion.
    pub score: Option<f64>,
    /// Mean response time in milliseconds; set on completion.
    pub avg_response_time_ms: Option<f64>,
}

impl QuizSession {
    pub fn new(patient_id: Uuid, total_questions: usize, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            patient_id,
            created_at: now,
            status: SessionStatus::Active,
            total_questions,
            score: None,
            avg_response_time_ms: None,
        }
    }
}

/// A recorded answer to one question. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizResponse {
    pub id: Uuid,
    pub session_id: Uuid,
    pub question_id: Uuid,
    pub answer: AnswerValue,
    pub correct: bool,
    pub response_time_ms: u64,
    pub created_at: DateTime<Utc>,
}
