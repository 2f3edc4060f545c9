use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::{
    DailyRecordStore, EntryFilter, EntryStore, PromptStore, StoreResult,
};
use crate::models::daily_record::{DailyRecord, StreakState, WritingTime};
use crate::models::entry::Entry;
use crate::models::prompt::{Prompt, PromptFilter};

pub async fn create_pool(database_url: &str) -> PgPool {
    PgPoolOptions::new()
        .max_connections(20)
        .acquire_timeout(std::time::Duration::from_secs(5))
        .connect(database_url)
        .await
        .expect("Failed to create database pool")
}

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn none_if_empty(tags: &[String]) -> Option<Vec<String>> {
    if tags.is_empty() {
        None
    } else {
        Some(tags.to_vec())
    }
}

#[async_trait]
impl EntryStore for PgStore {
    async fn insert(&self, entry: &Entry) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO entries (
                id, title, content, mood, mood_score, entry_type, tags,
                quick_answers, selected_emojis, prompt_id, is_draft, is_private,
                word_count, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            "#,
        )
        .bind(entry.id)
        .bind(&entry.title)
        .bind(&entry.content)
        .bind(&entry.mood)
        .bind(entry.mood_score)
        .bind(entry.entry_type)
        .bind(&entry.tags)
        .bind(&entry.quick_answers)
        .bind(&entry.selected_emojis)
        .bind(entry.prompt_id)
        .bind(entry.is_draft)
        .bind(entry.is_private)
        .bind(entry.word_count)
        .bind(entry.created_at)
        .bind(entry.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> StoreResult<Option<Entry>> {
        let entry = sqlx::query_as::<_, Entry>("SELECT * FROM entries WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(entry)
    }

    async fn update(&self, entry: &Entry) -> StoreResult<()> {
        sqlx::query(
            r#"
            UPDATE entries SET
                title = $2, content = $3, mood = $4, mood_score = $5,
                entry_type = $6, tags = $7, quick_answers = $8,
                selected_emojis = $9, prompt_id = $10, is_draft = $11,
                is_private = $12, word_count = $13, updated_at = $14
            WHERE id = $1
            "#,
        )
        .bind(entry.id)
        .bind(&entry.title)
        .bind(&entry.content)
        .bind(&entry.mood)
        .bind(entry.mood_score)
        .bind(entry.entry_type)
        .bind(&entry.tags)
        .bind(&entry.quick_answers)
        .bind(&entry.selected_emojis)
        .bind(entry.prompt_id)
        .bind(entry.is_draft)
        .bind(entry.is_private)
        .bind(entry.word_count)
        .bind(entry.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM entries WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list(
        &self,
        filter: &EntryFilter,
        page: u32,
        limit: u32,
    ) -> StoreResult<(Vec<Entry>, i64)> {
        let offset = (page.max(1) as i64 - 1) * limit as i64;
        let tags = none_if_empty(&filter.tags);

        let entries = sqlx::query_as::<_, Entry>(
            r#"
            SELECT * FROM entries
            WHERE ($1::entry_type IS NULL OR entry_type = $1)
              AND ($2::text IS NULL OR mood = $2)
              AND ($3::text[] IS NULL OR tags && $3)
              AND ($4::timestamptz IS NULL OR created_at >= $4)
              AND ($5::timestamptz IS NULL OR created_at < $5)
            ORDER BY created_at DESC
            LIMIT $6 OFFSET $7
            "#,
        )
        .bind(filter.entry_type)
        .bind(&filter.mood)
        .bind(&tags)
        .bind(filter.created_from)
        .bind(filter.created_before)
        .bind(limit as i64)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM entries
            WHERE ($1::entry_type IS NULL OR entry_type = $1)
              AND ($2::text IS NULL OR mood = $2)
              AND ($3::text[] IS NULL OR tags && $3)
              AND ($4::timestamptz IS NULL OR created_at >= $4)
              AND ($5::timestamptz IS NULL OR created_at < $5)
            "#,
        )
        .bind(filter.entry_type)
        .bind(&filter.mood)
        .bind(&tags)
        .bind(filter.created_from)
        .bind(filter.created_before)
        .fetch_one(&self.pool)
        .await?;

        Ok((entries, total))
    }
}

/// Row shape for `daily_records`; the type-count map travels as JSONB.
#[derive(FromRow)]
struct DailyRecordRow {
    date: NaiveDate,
    entries_count: i32,
    total_word_count: i64,
    average_word_count: i64,
    daily_mood: Option<String>,
    mood_score: Option<i16>,
    entry_type_counts: sqlx::types::Json<HashMap<String, i64>>,
    writing_time: Option<WritingTime>,
    week_number: i32,
    month: i32,
    year: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<DailyRecordRow> for DailyRecord {
    fn from(row: DailyRecordRow) -> Self {
        Self {
            date: row.date,
            entries_count: row.entries_count,
            total_word_count: row.total_word_count,
            average_word_count: row.average_word_count,
            daily_mood: row.daily_mood,
            mood_score: row.mood_score,
            entry_type_counts: row.entry_type_counts.0,
            writing_time: row.writing_time,
            week_number: row.week_number,
            month: row.month,
            year: row.year,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl DailyRecordStore for PgStore {
    async fn get(&self, date: NaiveDate) -> StoreResult<Option<DailyRecord>> {
        let row =
            sqlx::query_as::<_, DailyRecordRow>("SELECT * FROM daily_records WHERE date = $1")
                .bind(date)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(DailyRecord::from))
    }

    async fn upsert(&self, record: &DailyRecord) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO daily_records (
                date, entries_count, total_word_count, average_word_count,
                daily_mood, mood_score, entry_type_counts, writing_time,
                week_number, month, year, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            ON CONFLICT (date) DO UPDATE SET
                entries_count = EXCLUDED.entries_count,
                total_word_count = EXCLUDED.total_word_count,
                average_word_count = EXCLUDED.average_word_count,
                daily_mood = EXCLUDED.daily_mood,
                mood_score = EXCLUDED.mood_score,
                entry_type_counts = EXCLUDED.entry_type_counts,
                writing_time = EXCLUDED.writing_time,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(record.date)
        .bind(record.entries_count)
        .bind(record.total_word_count)
        .bind(record.average_word_count)
        .bind(&record.daily_mood)
        .bind(record.mood_score)
        .bind(sqlx::types::Json(&record.entry_type_counts))
        .bind(record.writing_time)
        .bind(record.week_number)
        .bind(record.month)
        .bind(record.year)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_desc(&self) -> StoreResult<Vec<DailyRecord>> {
        let rows =
            sqlx::query_as::<_, DailyRecordRow>("SELECT * FROM daily_records ORDER BY date DESC")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(DailyRecord::from).collect())
    }

    async fn list_since(&self, start: NaiveDate) -> StoreResult<Vec<DailyRecord>> {
        let rows = sqlx::query_as::<_, DailyRecordRow>(
            "SELECT * FROM daily_records WHERE date >= $1 ORDER BY date ASC",
        )
        .bind(start)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(DailyRecord::from).collect())
    }

    async fn list_week(&self, week: i32, year: i32) -> StoreResult<Vec<DailyRecord>> {
        let rows = sqlx::query_as::<_, DailyRecordRow>(
            "SELECT * FROM daily_records WHERE week_number = $1 AND year = $2 ORDER BY date ASC",
        )
        .bind(week)
        .bind(year)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(DailyRecord::from).collect())
    }

    async fn list_month(&self, month: i32, year: i32) -> StoreResult<Vec<DailyRecord>> {
        let rows = sqlx::query_as::<_, DailyRecordRow>(
            "SELECT * FROM daily_records WHERE month = $1 AND year = $2 ORDER BY date ASC",
        )
        .bind(month)
        .bind(year)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(DailyRecord::from).collect())
    }

    async fn streak_state(&self) -> StoreResult<StreakState> {
        let state = sqlx::query_as::<_, StreakState>(
            "SELECT current_streak, longest_streak, computed_at FROM journal_state WHERE id",
        )
        .fetch_optional(&self.pool)
        .await?;
        Ok(state.unwrap_or_else(|| StreakState::zero(Utc::now())))
    }

    async fn save_streak_state(&self, state: &StreakState) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO journal_state (id, current_streak, longest_streak, computed_at)
            VALUES (TRUE, $1, $2, $3)
            ON CONFLICT (id) DO UPDATE SET
                current_streak = EXCLUDED.current_streak,
                longest_streak = EXCLUDED.longest_streak,
                computed_at = EXCLUDED.computed_at
            "#,
        )
        .bind(state.current_streak)
        .bind(state.longest_streak)
        .bind(state.computed_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl PromptStore for PgStore {
    async fn insert(&self, prompt: &Prompt) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO prompts (
                id, question, title, description, category, difficulty,
                priority, usage_count, last_used, is_active, tags,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(prompt.id)
        .bind(&prompt.question)
        .bind(&prompt.title)
        .bind(&prompt.description)
        .bind(prompt.category)
        .bind(prompt.difficulty)
        .bind(prompt.priority)
        .bind(prompt.usage_count)
        .bind(prompt.last_used)
        .bind(prompt.is_active)
        .bind(&prompt.tags)
        .bind(prompt.created_at)
        .bind(prompt.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> StoreResult<Option<Prompt>> {
        let prompt = sqlx::query_as::<_, Prompt>("SELECT * FROM prompts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(prompt)
    }

    async fn update(&self, prompt: &Prompt) -> StoreResult<()> {
        sqlx::query(
            r#"
            UPDATE prompts SET
                question = $2, title = $3, description = $4, category = $5,
                difficulty = $6, priority = $7, is_active = $8, tags = $9,
                updated_at = $10
            WHERE id = $1
            "#,
        )
        .bind(prompt.id)
        .bind(&prompt.question)
        .bind(&prompt.title)
        .bind(&prompt.description)
        .bind(prompt.category)
        .bind(prompt.difficulty)
        .bind(prompt.priority)
        .bind(prompt.is_active)
        .bind(&prompt.tags)
        .bind(prompt.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_active(&self, filter: &PromptFilter) -> StoreResult<Vec<Prompt>> {
        let categories = if filter.categories.is_empty() {
            None
        } else {
            Some(filter.categories.clone())
        };
        let tags = none_if_empty(&filter.tags);

        let prompts = sqlx::query_as::<_, Prompt>(
            r#"
            SELECT * FROM prompts
            WHERE is_active = true
              AND ($1::prompt_category IS NULL OR category = $1)
              AND ($2::prompt_category[] IS NULL OR category = ANY($2))
              AND ($3::prompt_difficulty IS NULL OR difficulty = $3)
              AND ($4::text[] IS NULL OR tags && $4)
            ORDER BY priority DESC, usage_count ASC
            "#,
        )
        .bind(filter.category)
        .bind(&categories)
        .bind(filter.difficulty)
        .bind(&tags)
        .fetch_all(&self.pool)
        .await?;
        Ok(prompts)
    }

    async fn sample_random(&self, filter: &PromptFilter) -> StoreResult<Option<Prompt>> {
        let categories = if filter.categories.is_empty() {
            None
        } else {
            Some(filter.categories.clone())
        };
        let tags = none_if_empty(&filter.tags);

        let prompt = sqlx::query_as::<_, Prompt>(
            r#"
            SELECT * FROM prompts
            WHERE is_active = true
              AND ($1::prompt_category IS NULL OR category = $1)
              AND ($2::prompt_category[] IS NULL OR category = ANY($2))
              AND ($3::prompt_difficulty IS NULL OR difficulty = $3)
              AND ($4::text[] IS NULL OR tags && $4)
            ORDER BY random()
            LIMIT 1
            "#,
        )
        .bind(filter.category)
        .bind(&categories)
        .bind(filter.difficulty)
        .bind(&tags)
        .fetch_optional(&self.pool)
        .await?;
        Ok(prompt)
    }

    async fn record_usage(&self, id: Uuid) -> StoreResult<Option<Prompt>> {
        let prompt = sqlx::query_as::<_, Prompt>(
            r#"
            UPDATE prompts SET
                usage_count = usage_count + 1,
                last_used = NOW(),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(prompt)
    }

    async fn list(
        &self,
        filter: &PromptFilter,
        page: u32,
        limit: u32,
    ) -> StoreResult<(Vec<Prompt>, i64)> {
        let offset = (page.max(1) as i64 - 1) * limit as i64;
        let categories = if filter.categories.is_empty() {
            None
        } else {
            Some(filter.categories.clone())
        };
        let tags = none_if_empty(&filter.tags);

        let prompts = sqlx::query_as::<_, Prompt>(
            r#"
            SELECT * FROM prompts
            WHERE is_active = true
              AND ($1::prompt_category IS NULL OR category = $1)
              AND ($2::prompt_category[] IS NULL OR category = ANY($2))
              AND ($3::prompt_difficulty IS NULL OR difficulty = $3)
              AND ($4::text[] IS NULL OR tags && $4)
            ORDER BY priority DESC, usage_count ASC
            LIMIT $5 OFFSET $6
            "#,
        )
        .bind(filter.category)
        .bind(&categories)
        .bind(filter.difficulty)
        .bind(&tags)
        .bind(limit as i64)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM prompts
            WHERE is_active = true
              AND ($1::prompt_category IS NULL OR category = $1)
              AND ($2::prompt_category[] IS NULL OR category = ANY($2))
              AND ($3::prompt_difficulty IS NULL OR difficulty = $3)
              AND ($4::text[] IS NULL OR tags && $4)
            "#,
        )
        .bind(filter.category)
        .bind(&categories)
        .bind(filter.difficulty)
        .bind(&tags)
        .fetch_one(&self.pool)
        .await?;

        Ok((prompts, total))
    }
}
