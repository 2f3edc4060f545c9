use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{NaiveTime, Utc};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::entry::{
    count_words, validate_tags, CreateEntryRequest, Entry, EntryQuery, UpdateEntryRequest,
};
use crate::models::Pagination;
use crate::store::{EntryFilter, EntryStore};
use crate::AppState;

#[derive(Debug, serde::Serialize)]
pub struct EntriesResponse {
    pub entries: Vec<Entry>,
    pub pagination: Pagination,
}

pub async fn create_entry(
    State(state): State<AppState>,
    Json(body): Json<CreateEntryRequest>,
) -> AppResult<(StatusCode, Json<Entry>)> {
    body.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    if let Some(tags) = &body.tags {
        validate_tags(tags).map_err(AppError::Validation)?;
    }

    let now = Utc::now();
    let entry = Entry {
        id: Uuid::new_v4(),
        title: body.title.unwrap_or_default(),
        word_count: count_words(&body.content),
        content: body.content,
        mood: body.mood.unwrap_or_else(|| "😌".into()),
        mood_score: body.mood_score.unwrap_or(5),
        entry_type: body.entry_type.unwrap_or_default(),
        tags: body.tags.unwrap_or_default(),
        quick_answers: body.quick_answers,
        selected_emojis: body.selected_emojis.unwrap_or_default(),
        prompt_id: body.prompt_id,
        is_draft: body.is_draft.unwrap_or(false),
        is_private: body.is_private.unwrap_or(true),
        created_at: now,
        updated_at: now,
    };

    state.entries.insert(&entry).await?;
    notify_created(&state, &entry).await;

    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn list_entries(
    State(state): State<AppState>,
    Query(query): Query<EntryQuery>,
) -> AppResult<Json<EntriesResponse>> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(10).clamp(1, 100);

    let filter = EntryFilter {
        entry_type: query.entry_type,
        mood: query.mood,
        tags: split_csv(query.tags.as_deref()),
        created_from: query
            .date_from
            .map(|d| d.and_time(NaiveTime::MIN).and_utc()),
        created_before: query
            .date_to
            .map(|d| (d + chrono::Duration::days(1)).and_time(NaiveTime::MIN).and_utc()),
    };

    let (entries, total) = state.entries.list(&filter, page, limit).await?;
    Ok(Json(EntriesResponse {
        entries,
        pagination: Pagination::new(page, limit, total),
    }))
}

pub async fn get_entry(
    State(state): State<AppState>,
    Path(entry_id): Path<Uuid>,
) -> AppResult<Json<Entry>> {
    let entry = state
        .entries
        .get(entry_id)
        .await?
        .ok_or(AppError::NotFound("Entry not found".into()))?;
    Ok(Json(entry))
}

pub async fn update_entry(
    State(state): State<AppState>,
    Path(entry_id): Path<Uuid>,
    Json(body): Json<UpdateEntryRequest>,
) -> AppResult<Json<Entry>> {
    body.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    if let Some(tags) = &body.tags {
        validate_tags(tags).map_err(AppError::Validation)?;
    }

    let old = state
        .entries
        .get(entry_id)
        .await?
        .ok_or(AppError::NotFound("Entry not found".into()))?;

    let mut entry = old.clone();
    if let Some(content) = body.content {
        entry.word_count = count_words(&content);
        entry.content = content;
    }
    if let Some(title) = body.title {
        entry.title = title;
    }
    if let Some(mood) = body.mood {
        entry.mood = mood;
    }
    if let Some(mood_score) = body.mood_score {
        entry.mood_score = mood_score;
    }
    if let Some(entry_type) = body.entry_type {
        entry.entry_type = entry_type;
    }
    if let Some(tags) = body.tags {
        entry.tags = tags;
    }
    if let Some(quick_answers) = body.quick_answers {
        entry.quick_answers = Some(quick_answers);
    }
    if let Some(selected_emojis) = body.selected_emojis {
        entry.selected_emojis = selected_emojis;
    }
    if let Some(prompt_id) = body.prompt_id {
        entry.prompt_id = Some(prompt_id);
    }
    if let Some(is_draft) = body.is_draft {
        entry.is_draft = is_draft;
    }
    if let Some(is_private) = body.is_private {
        entry.is_private = is_private;
    }
    entry.updated_at = Utc::now();

    state.entries.update(&entry).await?;

    // An edit that changes what the rollups are built from replays the day as
    // delete(old) + create(new); cosmetic edits leave analytics alone.
    let analytics_changed = entry.content != old.content
        || entry.mood != old.mood
        || entry.mood_score != old.mood_score
        || entry.entry_type != old.entry_type;
    if analytics_changed {
        notify_deleted(&state, &old).await;
        notify_created(&state, &entry).await;
    }

    Ok(Json(entry))
}

pub async fn delete_entry(
    State(state): State<AppState>,
    Path(entry_id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    let entry = state
        .entries
        .get(entry_id)
        .await?
        .ok_or(AppError::NotFound("Entry not found".into()))?;

    state.entries.delete(entry_id).await?;
    notify_deleted(&state, &entry).await;

    Ok(Json(serde_json::json!({ "deleted": true, "id": entry_id })))
}

fn split_csv(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from)
            .collect()
    })
    .unwrap_or_default()
}

/// Analytics failures never fail the entry write that triggered them.
async fn notify_created(state: &AppState, entry: &Entry) {
    if let Err(e) = state.engine.on_entry_created(entry).await {
        tracing::warn!(error = %e, entry_id = %entry.id, "analytics update failed after entry create");
    }
}

async fn notify_deleted(state: &AppState, entry: &Entry) {
    if let Err(e) = state.engine.on_entry_deleted(entry).await {
        tracing::warn!(error = %e, entry_id = %entry.id, "analytics update failed after entry delete");
    }
}
