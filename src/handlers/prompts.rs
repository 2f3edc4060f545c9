use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::engine::SelectionMode;
use crate::error::{AppError, AppResult};
use crate::models::prompt::{
    CreatePromptRequest, PersonalizedPromptQuery, Prompt, PromptCategory, PromptFilter,
    PromptQuery, RandomPromptQuery, UpdatePromptRequest,
};
use crate::models::Pagination;
use crate::store::PromptStore;
use crate::AppState;

#[derive(Debug, serde::Serialize)]
pub struct PromptsResponse {
    pub prompts: Vec<Prompt>,
    pub pagination: Pagination,
}

pub async fn create_prompt(
    State(state): State<AppState>,
    Json(body): Json<CreatePromptRequest>,
) -> AppResult<(StatusCode, Json<Prompt>)> {
    body.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let now = Utc::now();
    let prompt = Prompt {
        id: Uuid::new_v4(),
        question: body.question,
        title: body.title,
        description: body.description,
        category: body.category,
        difficulty: body.difficulty.unwrap_or_default(),
        priority: body.priority.unwrap_or(1),
        usage_count: 0,
        last_used: None,
        is_active: body.is_active.unwrap_or(true),
        tags: body.tags.unwrap_or_default(),
        created_at: now,
        updated_at: now,
    };

    state.prompts.insert(&prompt).await?;
    Ok((StatusCode::CREATED, Json(prompt)))
}

pub async fn list_prompts(
    State(state): State<AppState>,
    Query(query): Query<PromptQuery>,
) -> AppResult<Json<PromptsResponse>> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(10).clamp(1, 100);

    let filter = PromptFilter {
        category: query.category,
        difficulty: query.difficulty,
        tags: query
            .tags
            .as_deref()
            .map(|s| {
                s.split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default(),
        ..Default::default()
    };

    let (prompts, total) = state.prompts.list(&filter, page, limit).await?;
    Ok(Json(PromptsResponse {
        prompts,
        pagination: Pagination::new(page, limit, total),
    }))
}

pub async fn random_prompt(
    State(state): State<AppState>,
    Query(query): Query<RandomPromptQuery>,
) -> AppResult<Json<Prompt>> {
    let filter = PromptFilter {
        category: query.category,
        difficulty: query.difficulty,
        ..Default::default()
    };
    let prompt = state
        .engine
        .select_prompt(SelectionMode::Random(filter))
        .await?;
    Ok(Json(prompt))
}

pub async fn daily_prompt(State(state): State<AppState>) -> AppResult<Json<Prompt>> {
    let prompt = state.engine.select_prompt(SelectionMode::Daily).await?;
    Ok(Json(prompt))
}

pub async fn personalized_prompt(
    State(state): State<AppState>,
    Query(query): Query<PersonalizedPromptQuery>,
) -> AppResult<Json<Prompt>> {
    let topics = parse_topics(query.topics.as_deref())?;
    let prompt = state
        .engine
        .select_prompt(SelectionMode::Personalized {
            experience: query.experience,
            topics,
        })
        .await?;
    Ok(Json(prompt))
}

pub async fn get_prompt(
    State(state): State<AppState>,
    Path(prompt_id): Path<Uuid>,
) -> AppResult<Json<Prompt>> {
    let prompt = state
        .prompts
        .get(prompt_id)
        .await?
        .ok_or(AppError::NotFound("Prompt not found".into()))?;
    Ok(Json(prompt))
}

pub async fn update_prompt(
    State(state): State<AppState>,
    Path(prompt_id): Path<Uuid>,
    Json(body): Json<UpdatePromptRequest>,
) -> AppResult<Json<Prompt>> {
    body.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let mut prompt = state
        .prompts
        .get(prompt_id)
        .await?
        .ok_or(AppError::NotFound("Prompt not found".into()))?;

    if let Some(question) = body.question {
        prompt.question = question;
    }
    if let Some(title) = body.title {
        prompt.title = title;
    }
    if let Some(description) = body.description {
        prompt.description = Some(description);
    }
    if let Some(category) = body.category {
        prompt.category = category;
    }
    if let Some(difficulty) = body.difficulty {
        prompt.difficulty = difficulty;
    }
    if let Some(priority) = body.priority {
        prompt.priority = priority;
    }
    if let Some(tags) = body.tags {
        prompt.tags = tags;
    }
    if let Some(is_active) = body.is_active {
        prompt.is_active = is_active;
    }
    prompt.updated_at = Utc::now();

    state.prompts.update(&prompt).await?;
    Ok(Json(prompt))
}

/// Soft delete: retired prompts stay on past entries but leave the
/// selectable pool.
pub async fn delete_prompt(
    State(state): State<AppState>,
    Path(prompt_id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    let mut prompt = state
        .prompts
        .get(prompt_id)
        .await?
        .ok_or(AppError::NotFound("Prompt not found".into()))?;

    prompt.is_active = false;
    prompt.updated_at = Utc::now();
    state.prompts.update(&prompt).await?;

    Ok(Json(
        serde_json::json!({ "deactivated": true, "id": prompt_id }),
    ))
}

fn parse_topics(raw: Option<&str>) -> AppResult<Vec<PromptCategory>> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(|t| t.parse::<PromptCategory>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(AppError::Validation)
    })
    .unwrap_or_else(|| Ok(Vec::new()))
}
