use std::collections::HashMap;

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{Datelike, Utc};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::models::daily_record::{
    week_number, DailyRecord, MonthlyQuery, TimelineQuery, WeeklyQuery,
};
use crate::store::DailyRecordStore;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct StreakResponse {
    pub current_streak: i32,
    pub longest_streak: i32,
}

pub async fn get_streak(State(state): State<AppState>) -> AppResult<Json<StreakResponse>> {
    let streak = state.engine.get_streak().await?;
    Ok(Json(StreakResponse {
        current_streak: streak.current_streak,
        longest_streak: streak.longest_streak,
    }))
}

pub async fn mood_timeline(
    State(state): State<AppState>,
    Query(query): Query<TimelineQuery>,
) -> AppResult<Json<Vec<DailyRecord>>> {
    let days = query.days.unwrap_or(7).clamp(1, 365);
    let timeline = state.engine.mood_timeline(days).await?;
    Ok(Json(timeline))
}

pub async fn weekly_summary(
    State(state): State<AppState>,
    Query(query): Query<WeeklyQuery>,
) -> AppResult<Json<Vec<DailyRecord>>> {
    let today = Utc::now().date_naive();
    let week = query.week.unwrap_or_else(|| week_number(today));
    let year = query.year.unwrap_or_else(|| today.year());
    if !(1..=54).contains(&week) {
        return Err(AppError::Validation("Week must be 1-54".into()));
    }

    let records = state.records.list_week(week, year).await?;
    Ok(Json(records))
}

pub async fn monthly_summary(
    State(state): State<AppState>,
    Query(query): Query<MonthlyQuery>,
) -> AppResult<Json<Vec<DailyRecord>>> {
    let today = Utc::now().date_naive();
    let month = query.month.unwrap_or_else(|| today.month() as i32);
    let year = query.year.unwrap_or_else(|| today.year());
    if !(1..=12).contains(&month) {
        return Err(AppError::Validation("Month must be 1-12".into()));
    }

    let records = state.records.list_month(month, year).await?;
    Ok(Json(records))
}

#[derive(Debug, Serialize)]
pub struct Insight {
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub data: serde_json::Value,
}

/// Derived reading of the rollup history: dominant writing time, dominant
/// mood, and overall writing consistency.
pub async fn get_insights(State(state): State<AppState>) -> AppResult<Json<Vec<Insight>>> {
    let records = state.records.list_desc().await?;
    let mut insights = Vec::new();

    let mut writing_times: HashMap<String, i64> = HashMap::new();
    let mut moods: HashMap<String, i64> = HashMap::new();
    for record in &records {
        if let Some(time) = record.writing_time {
            let key = serde_json::to_value(time)
                .map_err(anyhow::Error::from)?
                .as_str()
                .unwrap_or("unknown")
                .to_string();
            *writing_times.entry(key).or_insert(0) += 1;
        }
        if let Some(mood) = &record.daily_mood {
            *moods.entry(mood.clone()).or_insert(0) += 1;
        }
    }

    if let Some((time, _)) = writing_times.iter().max_by_key(|(_, count)| **count) {
        insights.push(Insight {
            title: "Your most reflective times".into(),
            description: format!("You tend to journal most during the {}", time),
            kind: "pattern".into(),
            data: serde_json::to_value(&writing_times).map_err(anyhow::Error::from)?,
        });
    }

    if let Some((mood, _)) = moods.iter().max_by_key(|(_, count)| **count) {
        insights.push(Insight {
            title: "Your emotional landscape".into(),
            description: format!("Your most common mood is {}", mood),
            kind: "emotion".into(),
            data: serde_json::to_value(&moods).map_err(anyhow::Error::from)?,
        });
    }

    let total_days = records.len() as i64;
    let active_days = records.iter().filter(|r| r.entries_count > 0).count() as i64;
    let consistency = if total_days > 0 {
        (active_days as f64 / total_days as f64 * 100.0).round() as i64
    } else {
        0
    };
    insights.push(Insight {
        title: "Your writing consistency".into(),
        description: format!("You've journaled on {}% of days", consistency),
        kind: "consistency".into(),
        data: serde_json::json!({
            "consistency_rate": consistency,
            "total_days": total_days,
            "active_days": active_days,
        }),
    });

    Ok(Json(insights))
}
