use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

pub const MAX_TAG_CHARS: usize = 50;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Entry {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub mood: String,
    pub mood_score: i16,
    pub entry_type: EntryType,
    pub tags: Vec<String>,
    pub quick_answers: Option<serde_json::Value>,
    pub selected_emojis: Vec<String>,
    pub prompt_id: Option<Uuid>,
    pub is_draft: bool,
    pub is_private: bool,
    pub word_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "entry_type", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum EntryType {
    FreeWrite,
    QuickThoughts,
    Emojis,
    Voice,
}

impl Default for EntryType {
    fn default() -> Self {
        Self::FreeWrite
    }
}

impl EntryType {
    /// Wire name, also used as the key in per-day type counts.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FreeWrite => "free-write",
            Self::QuickThoughts => "quick-thoughts",
            Self::Emojis => "emojis",
            Self::Voice => "voice",
        }
    }
}

/// Number of whitespace-delimited non-empty tokens in `content`.
pub fn count_words(content: &str) -> i32 {
    content.split_whitespace().count() as i32
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateEntryRequest {
    #[validate(length(min = 1, max = 10000, message = "Content must be 1-10000 characters"))]
    pub content: String,

    #[validate(length(max = 200, message = "Title must be under 200 characters"))]
    pub title: Option<String>,

    #[validate(length(max = 50, message = "Mood must be under 50 characters"))]
    pub mood: Option<String>,

    #[validate(range(min = 1, max = 10, message = "Mood score must be 1-10"))]
    pub mood_score: Option<i16>,

    pub entry_type: Option<EntryType>,
    pub tags: Option<Vec<String>>,
    pub quick_answers: Option<serde_json::Value>,
    pub selected_emojis: Option<Vec<String>>,
    pub prompt_id: Option<Uuid>,
    pub is_draft: Option<bool>,
    pub is_private: Option<bool>,
}

/// PUT /api/entries/{id} — partial update, all fields optional
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateEntryRequest {
    #[validate(length(min = 1, max = 10000, message = "Content must be 1-10000 characters"))]
    pub content: Option<String>,

    #[validate(length(max = 200, message = "Title must be under 200 characters"))]
    pub title: Option<String>,

    #[validate(length(max = 50, message = "Mood must be under 50 characters"))]
    pub mood: Option<String>,

    #[validate(range(min = 1, max = 10, message = "Mood score must be 1-10"))]
    pub mood_score: Option<i16>,

    pub entry_type: Option<EntryType>,
    pub tags: Option<Vec<String>>,
    pub quick_answers: Option<serde_json::Value>,
    pub selected_emojis: Option<Vec<String>>,
    pub prompt_id: Option<Uuid>,
    pub is_draft: Option<bool>,
    pub is_private: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct EntryQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub entry_type: Option<EntryType>,
    pub mood: Option<String>,
    /// Comma-separated tag list; an entry matches if it carries any of them.
    pub tags: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

pub fn validate_tags(tags: &[String]) -> Result<(), String> {
    for tag in tags {
        if tag.is_empty() || tag.chars().count() > MAX_TAG_CHARS {
            return Err(format!("Tag '{}' must be 1-{} characters", tag, MAX_TAG_CHARS));
        }
    }
    Ok(())
}
