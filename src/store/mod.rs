//! Storage boundary of the engine. The Reflection Engine and the handlers
//! only see these traits; `postgres` and `memory` provide the two backends.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::models::daily_record::{DailyRecord, StreakState};
use crate::models::entry::{Entry, EntryType};
use crate::models::prompt::{Prompt, PromptFilter};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Clone, Default)]
pub struct EntryFilter {
    pub entry_type: Option<EntryType>,
    pub mood: Option<String>,
    pub tags: Vec<String>,
    /// Inclusive lower bound on creation time.
    pub created_from: Option<DateTime<Utc>>,
    /// Exclusive upper bound on creation time.
    pub created_before: Option<DateTime<Utc>>,
}

impl EntryFilter {
    pub fn matches(&self, entry: &Entry) -> bool {
        self.entry_type.map_or(true, |t| entry.entry_type == t)
            && self.mood.as_ref().map_or(true, |m| &entry.mood == m)
            && (self.tags.is_empty() || self.tags.iter().any(|t| entry.tags.contains(t)))
            && self.created_from.map_or(true, |t| entry.created_at >= t)
            && self.created_before.map_or(true, |t| entry.created_at < t)
    }
}

#[async_trait]
pub trait EntryStore: Send + Sync {
    async fn insert(&self, entry: &Entry) -> StoreResult<()>;
    async fn get(&self, id: Uuid) -> StoreResult<Option<Entry>>;
    async fn update(&self, entry: &Entry) -> StoreResult<()>;
    async fn delete(&self, id: Uuid) -> StoreResult<bool>;
    /// Page of entries ordered by creation time descending, plus the total
    /// match count for pagination.
    async fn list(
        &self,
        filter: &EntryFilter,
        page: u32,
        limit: u32,
    ) -> StoreResult<(Vec<Entry>, i64)>;
}

#[async_trait]
pub trait DailyRecordStore: Send + Sync {
    async fn get(&self, date: NaiveDate) -> StoreResult<Option<DailyRecord>>;
    async fn upsert(&self, record: &DailyRecord) -> StoreResult<()>;
    /// Every record, most recent date first. Input to the streak recompute.
    async fn list_desc(&self) -> StoreResult<Vec<DailyRecord>>;
    /// Records on or after `start`, date ascending.
    async fn list_since(&self, start: NaiveDate) -> StoreResult<Vec<DailyRecord>>;
    async fn list_week(&self, week: i32, year: i32) -> StoreResult<Vec<DailyRecord>>;
    async fn list_month(&self, month: i32, year: i32) -> StoreResult<Vec<DailyRecord>>;
    async fn streak_state(&self) -> StoreResult<StreakState>;
    async fn save_streak_state(&self, state: &StreakState) -> StoreResult<()>;
}

#[async_trait]
pub trait PromptStore: Send + Sync {
    async fn insert(&self, prompt: &Prompt) -> StoreResult<()>;
    async fn get(&self, id: Uuid) -> StoreResult<Option<Prompt>>;
    async fn update(&self, prompt: &Prompt) -> StoreResult<()>;
    /// Matching active prompts ordered by priority descending, then
    /// usage count ascending.
    async fn find_active(&self, filter: &PromptFilter) -> StoreResult<Vec<Prompt>>;
    /// Uniform random pick over the matching active set.
    async fn sample_random(&self, filter: &PromptFilter) -> StoreResult<Option<Prompt>>;
    /// Atomically applies `usage_count += 1, last_used = now` to one prompt
    /// and returns the updated row; `None` when the prompt no longer exists.
    async fn record_usage(&self, id: Uuid) -> StoreResult<Option<Prompt>>;
    async fn list(
        &self,
        filter: &PromptFilter,
        page: u32,
        limit: u32,
    ) -> StoreResult<(Vec<Prompt>, i64)>;
}
