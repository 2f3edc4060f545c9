use std::collections::HashMap;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Per-calendar-day rollup of entry statistics. One row per date, created on
/// the first entry of a day and never deleted; all counters may decay back to
/// zero when entries are removed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyRecord {
    pub date: NaiveDate,
    pub entries_count: i32,
    pub total_word_count: i64,
    pub average_word_count: i64,
    pub daily_mood: Option<String>,
    pub mood_score: Option<i16>,
    pub entry_type_counts: HashMap<String, i64>,
    pub writing_time: Option<WritingTime>,
    pub week_number: i32,
    pub month: i32,
    pub year: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DailyRecord {
    pub fn new(date: NaiveDate, now: DateTime<Utc>) -> Self {
        Self {
            date,
            entries_count: 0,
            total_word_count: 0,
            average_word_count: 0,
            daily_mood: None,
            mood_score: None,
            entry_type_counts: HashMap::new(),
            writing_time: None,
            week_number: week_number(date),
            month: date.month() as i32,
            year: date.year(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn recompute_average(&mut self) {
        self.average_word_count = if self.entries_count > 0 {
            (self.total_word_count as f64 / self.entries_count as f64).round() as i64
        } else {
            0
        };
    }
}

/// Week-of-year: day-of-year plus the weekday offset of January 1st
/// (Sunday = 0), divided by 7, rounded up.
pub fn week_number(date: NaiveDate) -> i32 {
    let jan1 = NaiveDate::from_ymd_opt(date.year(), 1, 1).expect("day 1 of the year exists");
    let days = date.ordinal0() as i32;
    let offset = jan1.weekday().num_days_from_sunday() as i32;
    (days + offset + 1 + 6) / 7
}

/// Coarse time-of-day classification of an entry's creation hour.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "writing_time", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum WritingTime {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl WritingTime {
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            5..=11 => Self::Morning,
            12..=16 => Self::Afternoon,
            17..=21 => Self::Evening,
            _ => Self::Night,
        }
    }
}

/// Journal-wide streak counters, kept in a single state record and rewritten
/// after every recompute.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, FromRow)]
pub struct StreakState {
    pub current_streak: i32,
    pub longest_streak: i32,
    pub computed_at: DateTime<Utc>,
}

impl StreakState {
    pub fn zero(now: DateTime<Utc>) -> Self {
        Self {
            current_streak: 0,
            longest_streak: 0,
            computed_at: now,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TimelineQuery {
    pub days: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct WeeklyQuery {
    pub week: Option<i32>,
    pub year: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct MonthlyQuery {
    pub month: Option<i32>,
    pub year: Option<i32>,
}
