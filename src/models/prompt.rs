use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Prompt {
    pub id: Uuid,
    pub question: String,
    pub title: String,
    pub description: Option<String>,
    pub category: PromptCategory,
    pub difficulty: Difficulty,
    pub priority: i16,
    pub usage_count: i64,
    pub last_used: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "prompt_category", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum PromptCategory {
    Reflection,
    Gratitude,
    Goals,
    Emotions,
    Creativity,
    Relationships,
    Growth,
    Mindfulness,
    DailyLife,
    Future,
}

impl sqlx::postgres::PgHasArrayType for PromptCategory {
    fn array_type_info() -> sqlx::postgres::PgTypeInfo {
        sqlx::postgres::PgTypeInfo::with_name("_prompt_category")
    }
}

impl std::str::FromStr for PromptCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "reflection" => Ok(Self::Reflection),
            "gratitude" => Ok(Self::Gratitude),
            "goals" => Ok(Self::Goals),
            "emotions" => Ok(Self::Emotions),
            "creativity" => Ok(Self::Creativity),
            "relationships" => Ok(Self::Relationships),
            "growth" => Ok(Self::Growth),
            "mindfulness" => Ok(Self::Mindfulness),
            "daily-life" => Ok(Self::DailyLife),
            "future" => Ok(Self::Future),
            other => Err(format!("Unknown prompt category '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "prompt_difficulty", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Default for Difficulty {
    fn default() -> Self {
        Self::Beginner
    }
}

/// Maps the onboarding "how often do you journal" answer to a difficulty
/// tier. Unknown or missing answers fall back to beginner.
pub fn experience_to_difficulty(experience: Option<&str>) -> Difficulty {
    match experience {
        Some("Beginner") => Difficulty::Beginner,
        Some("Sometimes") => Difficulty::Intermediate,
        Some("Regular") => Difficulty::Advanced,
        _ => Difficulty::Beginner,
    }
}

/// Selection filter over the active prompt pool.
#[derive(Debug, Clone, Default)]
pub struct PromptFilter {
    pub category: Option<PromptCategory>,
    pub categories: Vec<PromptCategory>,
    pub difficulty: Option<Difficulty>,
    pub tags: Vec<String>,
}

impl PromptFilter {
    pub fn matches(&self, prompt: &Prompt) -> bool {
        prompt.is_active
            && self.category.map_or(true, |c| prompt.category == c)
            && (self.categories.is_empty() || self.categories.contains(&prompt.category))
            && self.difficulty.map_or(true, |d| prompt.difficulty == d)
            && (self.tags.is_empty() || self.tags.iter().any(|t| prompt.tags.contains(t)))
    }
}

/// Ordering used everywhere a "best first" prompt is taken: highest priority
/// first, least-used breaking ties.
pub fn rank_prompts(prompts: &mut [Prompt]) {
    prompts.sort_by(|a, b| {
        b.priority
            .cmp(&a.priority)
            .then(a.usage_count.cmp(&b.usage_count))
    });
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePromptRequest {
    #[validate(length(min = 1, max = 500, message = "Question must be 1-500 characters"))]
    pub question: String,

    #[validate(length(min = 1, max = 100, message = "Title must be 1-100 characters"))]
    pub title: String,

    #[validate(length(max = 200, message = "Description must be under 200 characters"))]
    pub description: Option<String>,

    pub category: PromptCategory,
    pub difficulty: Option<Difficulty>,

    #[validate(range(min = 1, max = 10, message = "Priority must be 1-10"))]
    pub priority: Option<i16>,

    pub tags: Option<Vec<String>>,
    pub is_active: Option<bool>,
}

/// PUT /api/prompts/{id} — partial update, all fields optional
#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePromptRequest {
    #[validate(length(min = 1, max = 500, message = "Question must be 1-500 characters"))]
    pub question: Option<String>,

    #[validate(length(min = 1, max = 100, message = "Title must be 1-100 characters"))]
    pub title: Option<String>,

    #[validate(length(max = 200, message = "Description must be under 200 characters"))]
    pub description: Option<String>,

    pub category: Option<PromptCategory>,
    pub difficulty: Option<Difficulty>,

    #[validate(range(min = 1, max = 10, message = "Priority must be 1-10"))]
    pub priority: Option<i16>,

    pub tags: Option<Vec<String>>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct PromptQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub category: Option<PromptCategory>,
    pub difficulty: Option<Difficulty>,
    /// Comma-separated tag list; a prompt matches if it carries any of them.
    pub tags: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RandomPromptQuery {
    pub category: Option<PromptCategory>,
    pub difficulty: Option<Difficulty>,
}

#[derive(Debug, Deserialize)]
pub struct PersonalizedPromptQuery {
    /// Onboarding answer: "Beginner", "Sometimes" or "Regular".
    pub experience: Option<String>,
    /// Comma-separated preferred categories.
    pub topics: Option<String>,
}
