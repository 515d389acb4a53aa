use axum::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use thiserror::Error;

/// The user's active dietary goal, fetched fresh per decision and never
/// cached across sessions. An empty goal means "no goal information
/// available", not an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct GoalContext {
    pub goal: String,
    /// ISO `YYYY-MM-DD`, validated on write.
    pub target_date: Option<String>,
}

#[derive(Debug, Error)]
pub enum GoalStoreError {
    #[error("goal read failed: {0}")]
    Read(#[source] sqlx::Error),
    #[error("goal write failed: {0}")]
    Write(#[source] sqlx::Error),
}

#[async_trait]
pub trait GoalStore: Send + Sync {
    /// Active goal context for the user; the zero-valued context when none
    /// has been set.
    async fn fetch(&self, email: &str) -> Result<GoalContext, GoalStoreError>;

    async fn upsert(&self, email: &str, context: &GoalContext) -> Result<(), GoalStoreError>;
}

pub struct PgGoalStore {
    db: PgPool,
}

impl PgGoalStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl GoalStore for PgGoalStore {
    async fn fetch(&self, email: &str) -> Result<GoalContext, GoalStoreError> {
        let row = sqlx::query_as::<_, GoalContext>(
            r#"SELECT goal, target_date FROM fitness_goals WHERE user_email = $1"#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await
        .map_err(GoalStoreError::Read)?;
        Ok(row.unwrap_or_default())
    }

    async fn upsert(&self, email: &str, context: &GoalContext) -> Result<(), GoalStoreError> {
        sqlx::query(
            r#"
            INSERT INTO fitness_goals (user_email, goal, target_date, updated_at)
            VALUES ($1, $2, $3, now())
            ON CONFLICT (user_email)
            DO UPDATE SET goal = EXCLUDED.goal,
                          target_date = EXCLUDED.target_date,
                          updated_at = now()
            "#,
        )
        .bind(email)
        .bind(&context.goal)
        .bind(&context.target_date)
        .execute(&self.db)
        .await
        .map_err(GoalStoreError::Write)?;
        Ok(())
    }
}
