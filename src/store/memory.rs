//! In-memory backend. Used by the test suite and as the fallback store when
//! no `DATABASE_URL` is configured.

use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rand::seq::SliceRandom;
use uuid::Uuid;

use super::{
    DailyRecordStore, EntryFilter, EntryStore, PromptStore, StoreError, StoreResult,
};
use crate::models::daily_record::{DailyRecord, StreakState};
use crate::models::entry::Entry;
use crate::models::prompt::{rank_prompts, Prompt, PromptFilter};

#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<Uuid, Entry>>,
    records: RwLock<BTreeMap<NaiveDate, DailyRecord>>,
    prompts: RwLock<HashMap<Uuid, Prompt>>,
    streak: RwLock<Option<StreakState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn read<T>(lock: &RwLock<T>) -> StoreResult<RwLockReadGuard<'_, T>> {
    lock.read()
        .map_err(|_| StoreError::Unavailable("lock poisoned".into()))
}

fn write<T>(lock: &RwLock<T>) -> StoreResult<RwLockWriteGuard<'_, T>> {
    lock.write()
        .map_err(|_| StoreError::Unavailable("lock poisoned".into()))
}

fn page_slice<T>(items: Vec<T>, page: u32, limit: u32) -> Vec<T> {
    let start = (page.max(1) as usize - 1) * limit as usize;
    items.into_iter().skip(start).take(limit as usize).collect()
}

#[async_trait]
impl EntryStore for MemoryStore {
    async fn insert(&self, entry: &Entry) -> StoreResult<()> {
        write(&self.entries)?.insert(entry.id, entry.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> StoreResult<Option<Entry>> {
        Ok(read(&self.entries)?.get(&id).cloned())
    }

    async fn update(&self, entry: &Entry) -> StoreResult<()> {
        write(&self.entries)?.insert(entry.id, entry.clone());
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        Ok(write(&self.entries)?.remove(&id).is_some())
    }

    async fn list(
        &self,
        filter: &EntryFilter,
        page: u32,
        limit: u32,
    ) -> StoreResult<(Vec<Entry>, i64)> {
        let mut matching: Vec<Entry> = read(&self.entries)?
            .values()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let total = matching.len() as i64;
        Ok((page_slice(matching, page, limit), total))
    }
}

#[async_trait]
impl DailyRecordStore for MemoryStore {
    async fn get(&self, date: NaiveDate) -> StoreResult<Option<DailyRecord>> {
        Ok(read(&self.records)?.get(&date).cloned())
    }

    async fn upsert(&self, record: &DailyRecord) -> StoreResult<()> {
        write(&self.records)?.insert(record.date, record.clone());
        Ok(())
    }

    async fn list_desc(&self) -> StoreResult<Vec<DailyRecord>> {
        Ok(read(&self.records)?.values().rev().cloned().collect())
    }

    async fn list_since(&self, start: NaiveDate) -> StoreResult<Vec<DailyRecord>> {
        Ok(read(&self.records)?
            .range(start..)
            .map(|(_, r)| r.clone())
            .collect())
    }

    async fn list_week(&self, week: i32, year: i32) -> StoreResult<Vec<DailyRecord>> {
        Ok(read(&self.records)?
            .values()
            .filter(|r| r.week_number == week && r.year == year)
            .cloned()
            .collect())
    }

    async fn list_month(&self, month: i32, year: i32) -> StoreResult<Vec<DailyRecord>> {
        Ok(read(&self.records)?
            .values()
            .filter(|r| r.month == month && r.year == year)
            .cloned()
            .collect())
    }

    async fn streak_state(&self) -> StoreResult<StreakState> {
        Ok((*read(&self.streak)?).unwrap_or_else(|| StreakState::zero(Utc::now())))
    }

    async fn save_streak_state(&self, state: &StreakState) -> StoreResult<()> {
        *write(&self.streak)? = Some(*state);
        Ok(())
    }
}

#[async_trait]
impl PromptStore for MemoryStore {
    async fn insert(&self, prompt: &Prompt) -> StoreResult<()> {
        write(&self.prompts)?.insert(prompt.id, prompt.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> StoreResult<Option<Prompt>> {
        Ok(read(&self.prompts)?.get(&id).cloned())
    }

    async fn update(&self, prompt: &Prompt) -> StoreResult<()> {
        write(&self.prompts)?.insert(prompt.id, prompt.clone());
        Ok(())
    }

    async fn find_active(&self, filter: &PromptFilter) -> StoreResult<Vec<Prompt>> {
        let mut matching: Vec<Prompt> = read(&self.prompts)?
            .values()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();
        rank_prompts(&mut matching);
        Ok(matching)
    }

    async fn sample_random(&self, filter: &PromptFilter) -> StoreResult<Option<Prompt>> {
        let matching: Vec<Prompt> = read(&self.prompts)?
            .values()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();
        Ok(matching.choose(&mut rand::thread_rng()).cloned())
    }

    async fn record_usage(&self, id: Uuid) -> StoreResult<Option<Prompt>> {
        let mut prompts = write(&self.prompts)?;
        Ok(prompts.get_mut(&id).map(|p| {
            p.usage_count += 1;
            p.last_used = Some(Utc::now());
            p.updated_at = Utc::now();
            p.clone()
        }))
    }

    async fn list(
        &self,
        filter: &PromptFilter,
        page: u32,
        limit: u32,
    ) -> StoreResult<(Vec<Prompt>, i64)> {
        let ranked = self.find_active(filter).await?;
        let total = ranked.len() as i64;
        Ok((page_slice(ranked, page, limit), total))
    }
}
