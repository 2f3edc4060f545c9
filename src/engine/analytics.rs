use std::collections::HashMap;
use std::sync::Arc;

use chrono::{NaiveDate, Timelike, Utc};
use tokio::sync::Mutex;

use crate::error::AppResult;
use crate::models::daily_record::{DailyRecord, WritingTime};
use crate::models::entry::Entry;
use crate::store::DailyRecordStore;

/// Folds entry lifecycle events into the per-day rollup records.
///
/// Updates to one day's record are serialized through a per-date lock so
/// concurrent submissions on the same day cannot lose counts; different days
/// proceed independently.
pub struct DailyAggregator {
    records: Arc<dyn DailyRecordStore>,
    day_locks: Mutex<HashMap<NaiveDate, Arc<Mutex<()>>>>,
}

impl DailyAggregator {
    pub fn new(records: Arc<dyn DailyRecordStore>) -> Self {
        Self {
            records,
            day_locks: Mutex::new(HashMap::new()),
        }
    }

    async fn day_lock(&self, date: NaiveDate) -> Arc<Mutex<()>> {
        let mut locks = self.day_locks.lock().await;
        locks
            .entry(date)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    pub async fn apply_create(&self, entry: &Entry) -> AppResult<()> {
        let day = entry.created_at.date_naive();
        let lock = self.day_lock(day).await;
        let _guard = lock.lock().await;

        let now = Utc::now();
        let mut record = self
            .records
            .get(day)
            .await?
            .unwrap_or_else(|| DailyRecord::new(day, now));

        record.entries_count += 1;
        record.total_word_count += entry.word_count as i64;
        record.recompute_average();

        // Highest mood score seen so far wins the day; ties keep the
        // first-seen mood.
        if record.mood_score.map_or(true, |score| entry.mood_score > score) {
            record.daily_mood = Some(entry.mood.clone());
            record.mood_score = Some(entry.mood_score);
        }

        *record
            .entry_type_counts
            .entry(entry.entry_type.as_str().to_string())
            .or_insert(0) += 1;

        // Always the most recently processed entry's bucket, not a majority.
        record.writing_time = Some(WritingTime::from_hour(entry.created_at.hour()));
        record.updated_at = now;

        self.records.upsert(&record).await?;
        tracing::debug!(date = %day, entries = record.entries_count, "daily record updated");
        Ok(())
    }

    pub async fn apply_delete(&self, entry: &Entry) -> AppResult<()> {
        let day = entry.created_at.date_naive();
        let lock = self.day_lock(day).await;
        let _guard = lock.lock().await;

        let Some(mut record) = self.records.get(day).await? else {
            return Ok(());
        };

        record.entries_count = (record.entries_count - 1).max(0);
        record.total_word_count = (record.total_word_count - entry.word_count as i64).max(0);
        record.recompute_average();

        let key = entry.entry_type.as_str();
        if let Some(count) = record.entry_type_counts.get_mut(key) {
            *count -= 1;
            if *count <= 0 {
                record.entry_type_counts.remove(key);
            }
        }

        // Mood and writing time are left as-is: the day keeps the mood of the
        // highest-scoring entry it ever saw, even if that entry is gone.
        record.updated_at = Utc::now();

        self.records.upsert(&record).await?;
        tracing::debug!(date = %day, entries = record.entries_count, "daily record updated");
        Ok(())
    }
}
