use std::sync::Arc;

use chrono::{Duration, Utc};

use crate::error::{AppError, AppResult};
use crate::models::prompt::{
    experience_to_difficulty, Prompt, PromptCategory, PromptFilter,
};
use crate::store::PromptStore;

/// Daily mode skips anything surfaced within this trailing window, which
/// spreads selection across the pool instead of hammering one favorite.
const ROTATION_WINDOW_DAYS: i64 = 7;

#[derive(Debug, Clone)]
pub enum SelectionMode {
    Random(PromptFilter),
    Daily,
    Personalized {
        experience: Option<String>,
        topics: Vec<PromptCategory>,
    },
}

/// Picks the next reflective prompt and records its usage.
pub struct PromptSelector {
    prompts: Arc<dyn PromptStore>,
}

impl PromptSelector {
    pub fn new(prompts: Arc<dyn PromptStore>) -> Self {
        Self { prompts }
    }

    pub async fn select(&self, mode: SelectionMode) -> AppResult<Prompt> {
        match mode {
            SelectionMode::Random(filter) => self.random(&filter).await,
            SelectionMode::Daily => {
                let active = self.prompts.find_active(&PromptFilter::default()).await?;
                let cutoff = Utc::now() - Duration::days(ROTATION_WINDOW_DAYS);
                let fresh = active
                    .into_iter()
                    .find(|p| p.last_used.map_or(true, |used| used < cutoff));
                match fresh {
                    Some(prompt) => self.commit(prompt).await,
                    None => self.random(&PromptFilter::default()).await,
                }
            }
            SelectionMode::Personalized { experience, topics } => {
                let filter = PromptFilter {
                    difficulty: Some(experience_to_difficulty(experience.as_deref())),
                    categories: topics,
                    ..Default::default()
                };
                let mut matching = self.prompts.find_active(&filter).await?;
                if matching.is_empty() {
                    self.random(&PromptFilter::default()).await
                } else {
                    self.commit(matching.remove(0)).await
                }
            }
        }
    }

    async fn random(&self, filter: &PromptFilter) -> AppResult<Prompt> {
        let prompt = self
            .prompts
            .sample_random(filter)
            .await?
            .ok_or_else(|| AppError::NotFound("No prompts found".into()))?;
        self.commit(prompt).await
    }

    /// Applies the usage side effect to the exact prompt being returned.
    async fn commit(&self, prompt: Prompt) -> AppResult<Prompt> {
        self.prompts
            .record_usage(prompt.id)
            .await?
            .ok_or_else(|| AppError::NotFound("Prompt no longer available".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::prompt::Difficulty;
    use crate::store::memory::MemoryStore;
    use uuid::Uuid;

    struct TestPrompt {
        category: PromptCategory,
        difficulty: Difficulty,
        priority: i16,
        usage_count: i64,
        last_used_days_ago: Option<i64>,
        is_active: bool,
    }

    impl Default for TestPrompt {
        fn default() -> Self {
            Self {
                category: PromptCategory::Reflection,
                difficulty: Difficulty::Beginner,
                priority: 5,
                usage_count: 0,
                last_used_days_ago: None,
                is_active: true,
            }
        }
    }

    async fn seed(store: &MemoryStore, title: &str, opts: TestPrompt) -> Prompt {
        let now = Utc::now();
        let prompt = Prompt {
            id: Uuid::new_v4(),
            question: format!("{}?", title),
            title: title.to_string(),
            description: None,
            category: opts.category,
            difficulty: opts.difficulty,
            priority: opts.priority,
            usage_count: opts.usage_count,
            last_used: opts.last_used_days_ago.map(|d| now - Duration::days(d)),
            is_active: opts.is_active,
            tags: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        store.insert(&prompt).await.unwrap();
        prompt
    }

    fn selector(store: &Arc<MemoryStore>) -> PromptSelector {
        PromptSelector::new(store.clone())
    }

    #[tokio::test]
    async fn daily_mode_skips_recently_used_prompts() {
        let store = Arc::new(MemoryStore::new());
        seed(
            &store,
            "recent",
            TestPrompt {
                priority: 10,
                last_used_days_ago: Some(2),
                ..Default::default()
            },
        )
        .await;
        let stale = seed(
            &store,
            "stale",
            TestPrompt {
                priority: 1,
                last_used_days_ago: Some(10),
                ..Default::default()
            },
        )
        .await;

        let picked = selector(&store).select(SelectionMode::Daily).await.unwrap();
        assert_eq!(picked.id, stale.id);
        assert_eq!(picked.usage_count, stale.usage_count + 1);
        assert!(picked.last_used.unwrap() > stale.last_used.unwrap());
    }

    #[tokio::test]
    async fn daily_mode_prefers_priority_then_least_used() {
        let store = Arc::new(MemoryStore::new());
        seed(
            &store,
            "low-priority",
            TestPrompt {
                priority: 3,
                ..Default::default()
            },
        )
        .await;
        let expected = seed(
            &store,
            "high-priority-least-used",
            TestPrompt {
                priority: 8,
                usage_count: 1,
                ..Default::default()
            },
        )
        .await;
        seed(
            &store,
            "high-priority-well-used",
            TestPrompt {
                priority: 8,
                usage_count: 9,
                ..Default::default()
            },
        )
        .await;

        let picked = selector(&store).select(SelectionMode::Daily).await.unwrap();
        assert_eq!(picked.id, expected.id);
    }

    #[tokio::test]
    async fn daily_mode_falls_back_to_random_when_everything_is_recent() {
        let store = Arc::new(MemoryStore::new());
        let only = seed(
            &store,
            "only",
            TestPrompt {
                last_used_days_ago: Some(1),
                ..Default::default()
            },
        )
        .await;

        let picked = selector(&store).select(SelectionMode::Daily).await.unwrap();
        assert_eq!(picked.id, only.id);
        assert_eq!(picked.usage_count, 1);
    }

    #[tokio::test]
    async fn inactive_prompts_are_never_selected() {
        let store = Arc::new(MemoryStore::new());
        seed(
            &store,
            "retired",
            TestPrompt {
                is_active: false,
                ..Default::default()
            },
        )
        .await;

        let selector = selector(&store);
        for mode in [
            SelectionMode::Random(PromptFilter::default()),
            SelectionMode::Daily,
            SelectionMode::Personalized {
                experience: None,
                topics: Vec::new(),
            },
        ] {
            let err = selector.select(mode).await.unwrap_err();
            assert!(matches!(err, AppError::NotFound(_)));
        }
    }

    #[tokio::test]
    async fn random_mode_honors_category_and_difficulty_filters() {
        let store = Arc::new(MemoryStore::new());
        seed(
            &store,
            "gratitude-beginner",
            TestPrompt {
                category: PromptCategory::Gratitude,
                ..Default::default()
            },
        )
        .await;
        let wanted = seed(
            &store,
            "goals-advanced",
            TestPrompt {
                category: PromptCategory::Goals,
                difficulty: Difficulty::Advanced,
                ..Default::default()
            },
        )
        .await;

        let picked = selector(&store)
            .select(SelectionMode::Random(PromptFilter {
                category: Some(PromptCategory::Goals),
                difficulty: Some(Difficulty::Advanced),
                ..Default::default()
            }))
            .await
            .unwrap();
        assert_eq!(picked.id, wanted.id);
    }

    #[tokio::test]
    async fn personalized_mode_maps_experience_to_difficulty() {
        let store = Arc::new(MemoryStore::new());
        seed(&store, "beginner", TestPrompt::default()).await;
        let advanced = seed(
            &store,
            "advanced",
            TestPrompt {
                difficulty: Difficulty::Advanced,
                ..Default::default()
            },
        )
        .await;

        let picked = selector(&store)
            .select(SelectionMode::Personalized {
                experience: Some("Regular".into()),
                topics: Vec::new(),
            })
            .await
            .unwrap();
        assert_eq!(picked.id, advanced.id);
    }

    #[tokio::test]
    async fn personalized_mode_filters_by_preferred_topics() {
        let store = Arc::new(MemoryStore::new());
        seed(
            &store,
            "reflection",
            TestPrompt {
                priority: 10,
                ..Default::default()
            },
        )
        .await;
        let mindful = seed(
            &store,
            "mindfulness",
            TestPrompt {
                category: PromptCategory::Mindfulness,
                priority: 2,
                ..Default::default()
            },
        )
        .await;

        let picked = selector(&store)
            .select(SelectionMode::Personalized {
                experience: None,
                topics: vec![PromptCategory::Mindfulness],
            })
            .await
            .unwrap();
        assert_eq!(picked.id, mindful.id);
    }

    #[tokio::test]
    async fn personalized_mode_falls_back_to_random_when_nothing_matches() {
        let store = Arc::new(MemoryStore::new());
        let only = seed(
            &store,
            "only",
            TestPrompt {
                category: PromptCategory::Creativity,
                difficulty: Difficulty::Intermediate,
                ..Default::default()
            },
        )
        .await;

        let picked = selector(&store)
            .select(SelectionMode::Personalized {
                experience: Some("Regular".into()),
                topics: vec![PromptCategory::Future],
            })
            .await
            .unwrap();
        assert_eq!(picked.id, only.id);
        assert_eq!(picked.usage_count, 1);
    }

    #[tokio::test]
    async fn selection_applies_the_usage_side_effect_once() {
        let store = Arc::new(MemoryStore::new());
        let prompt = seed(&store, "single", TestPrompt::default()).await;

        let picked = selector(&store)
            .select(SelectionMode::Random(PromptFilter::default()))
            .await
            .unwrap();
        assert_eq!(picked.usage_count, 1);
        assert!(picked.last_used.is_some());

        let stored = store.get(prompt.id).await.unwrap().unwrap();
        assert_eq!(stored.usage_count, 1);
        assert_eq!(stored.last_used, picked.last_used);
    }
}
