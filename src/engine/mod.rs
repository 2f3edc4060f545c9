//! The Reflection Engine: per-day analytics rollups, the journaling streak,
//! and reflective prompt rotation, behind one façade the handlers call.

pub mod analytics;
pub mod prompts;
pub mod streak;

use std::sync::Arc;

use chrono::Utc;

use crate::error::AppResult;
use crate::models::daily_record::{DailyRecord, StreakState};
use crate::models::entry::Entry;
use crate::models::prompt::Prompt;
use crate::store::{DailyRecordStore, PromptStore};

use analytics::DailyAggregator;
use prompts::PromptSelector;
use streak::StreakCalculator;

pub use prompts::SelectionMode;

pub struct ReflectionEngine {
    aggregator: DailyAggregator,
    streaks: StreakCalculator,
    selector: PromptSelector,
    records: Arc<dyn DailyRecordStore>,
}

impl ReflectionEngine {
    pub fn new(records: Arc<dyn DailyRecordStore>, prompts: Arc<dyn PromptStore>) -> Self {
        Self {
            aggregator: DailyAggregator::new(records.clone()),
            streaks: StreakCalculator::new(records.clone()),
            selector: PromptSelector::new(prompts),
            records,
        }
    }

    /// Rolls the new entry into its day's record, then refreshes the streak.
    pub async fn on_entry_created(&self, entry: &Entry) -> AppResult<()> {
        self.aggregator.apply_create(entry).await?;
        self.streaks.recompute().await?;
        Ok(())
    }

    /// Unwinds a deleted entry from its day's record, then refreshes the
    /// streak.
    pub async fn on_entry_deleted(&self, entry: &Entry) -> AppResult<()> {
        self.aggregator.apply_delete(entry).await?;
        self.streaks.recompute().await?;
        Ok(())
    }

    pub async fn get_streak(&self) -> AppResult<StreakState> {
        Ok(self.records.streak_state().await?)
    }

    /// Daily records from `days` ago up to today, oldest first.
    pub async fn mood_timeline(&self, days: i64) -> AppResult<Vec<DailyRecord>> {
        let start = Utc::now().date_naive() - chrono::Duration::days(days);
        Ok(self.records.list_since(start).await?)
    }

    pub async fn select_prompt(&self, mode: SelectionMode) -> AppResult<Prompt> {
        self.selector.select(mode).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::entry::{count_words, EntryType};
    use crate::store::memory::MemoryStore;
    use chrono::{DateTime, Duration, TimeZone};
    use uuid::Uuid;

    fn entry_at(ts: DateTime<Utc>) -> Entry {
        let content = "a few words of reflection";
        Entry {
            id: Uuid::new_v4(),
            title: String::new(),
            content: content.to_string(),
            mood: "😌".to_string(),
            mood_score: 5,
            entry_type: EntryType::FreeWrite,
            tags: Vec::new(),
            quick_answers: None,
            selected_emojis: Vec::new(),
            prompt_id: None,
            is_draft: false,
            is_private: true,
            word_count: count_words(content),
            created_at: ts,
            updated_at: ts,
        }
    }

    fn engine_with_store() -> (ReflectionEngine, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (
            ReflectionEngine::new(store.clone(), store.clone()),
            store,
        )
    }

    #[tokio::test]
    async fn entry_events_keep_the_streak_current() {
        let (engine, _store) = engine_with_store();
        let today = Utc::now();

        engine.on_entry_created(&entry_at(today)).await.unwrap();
        engine
            .on_entry_created(&entry_at(today - Duration::days(1)))
            .await
            .unwrap();

        let streak = engine.get_streak().await.unwrap();
        assert_eq!(streak.current_streak, 2);
        assert_eq!(streak.longest_streak, 2);
    }

    #[tokio::test]
    async fn deleting_the_only_entry_resets_the_streak() {
        let (engine, _store) = engine_with_store();
        let entry = entry_at(Utc::now());

        engine.on_entry_created(&entry).await.unwrap();
        engine.on_entry_deleted(&entry).await.unwrap();

        let streak = engine.get_streak().await.unwrap();
        assert_eq!(streak.current_streak, 0);
        assert_eq!(streak.longest_streak, 0);
    }

    #[tokio::test]
    async fn mood_timeline_is_ordered_oldest_first() {
        let (engine, _store) = engine_with_store();
        let now = Utc::now();

        engine.on_entry_created(&entry_at(now)).await.unwrap();
        engine
            .on_entry_created(&entry_at(now - Duration::days(2)))
            .await
            .unwrap();

        let timeline = engine.mood_timeline(7).await.unwrap();
        assert_eq!(timeline.len(), 2);
        assert!(timeline[0].date < timeline[1].date);
        assert!(timeline.iter().all(|r| r.entries_count == 1));
    }

    #[tokio::test]
    async fn timeline_window_excludes_older_records() {
        let (engine, _store) = engine_with_store();
        let now = Utc::now();

        engine.on_entry_created(&entry_at(now)).await.unwrap();
        engine
            .on_entry_created(&entry_at(now - Duration::days(30)))
            .await
            .unwrap();

        let timeline = engine.mood_timeline(7).await.unwrap();
        assert_eq!(timeline.len(), 1);
        assert_eq!(timeline[0].date, now.date_naive());
    }

    #[tokio::test]
    async fn entry_at_midnight_utc_lands_on_its_calendar_day() {
        let (engine, store) = engine_with_store();
        let midnight = Utc.with_ymd_and_hms(2024, 2, 29, 0, 0, 0).unwrap();

        engine.on_entry_created(&entry_at(midnight)).await.unwrap();

        let record = DailyRecordStore::get(store.as_ref(), midnight.date_naive())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.entries_count, 1);
        assert_eq!(record.month, 2);
        assert_eq!(record.year, 2024);
    }
}
