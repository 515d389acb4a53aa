use axum::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::nutrition::types::{DailyIntakeTotal, NormalizedMacros};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntakeSource {
    Barcode,
    Manual,
}

impl IntakeSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Barcode => "barcode",
            Self::Manual => "manual",
        }
    }
}

/// One confirmed intake event. Created when the user confirms "consumed",
/// immutable afterwards; never deleted by this service (retention is an
/// external concern).
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct IntakeRecord {
    pub id: Uuid,
    pub user_email: String,
    pub food_name: String,
    pub source: String,
    #[sqlx(flatten)]
    pub macros: NormalizedMacros,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Input for one append; the id and timestamp are assigned by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewIntakeRecord {
    pub user_email: String,
    pub food_name: String,
    pub source: IntakeSource,
    pub macros: NormalizedMacros,
}

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("ledger read failed: {0}")]
    Read(#[source] sqlx::Error),
    #[error("ledger write failed: {0}")]
    Write(#[source] sqlx::Error),
}

#[async_trait]
pub trait IntakeLedger: Send + Sync {
    /// Sum of everything the user consumed today; the zero-valued total
    /// when the day has no entries.
    async fn today_total(&self, email: &str) -> Result<DailyIntakeTotal, LedgerError>;

    /// Appends one confirmed intake event, atomically. Exactly one call
    /// per user confirmation; a failure surfaces to the caller and is
    /// never retried here.
    async fn append(&self, record: NewIntakeRecord) -> Result<IntakeRecord, LedgerError>;
}

pub struct PgIntakeLedger {
    db: PgPool,
}

impl PgIntakeLedger {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl IntakeLedger for PgIntakeLedger {
    async fn today_total(&self, email: &str) -> Result<DailyIntakeTotal, LedgerError> {
        let total = sqlx::query_as::<_, NormalizedMacros>(
            r#"
            SELECT COALESCE(SUM(calories), 0) AS calories,
                   COALESCE(SUM(sugar), 0)    AS sugar,
                   COALESCE(SUM(protein), 0)  AS protein,
                   COALESCE(SUM(fat), 0)      AS fat,
                   COALESCE(SUM(carbs), 0)    AS carbs,
                   COALESCE(SUM(fiber), 0)    AS fiber,
                   COALESCE(SUM(sodium), 0)   AS sodium
            FROM intake_records
            WHERE user_email = $1
              AND created_at >= CURRENT_DATE
              AND created_at < CURRENT_DATE + INTERVAL '1 day'
            "#,
        )
        .bind(email)
        .fetch_one(&self.db)
        .await
        .map_err(LedgerError::Read)?;
        Ok(total)
    }

    async fn append(&self, record: NewIntakeRecord) -> Result<IntakeRecord, LedgerError> {
        let row = sqlx::query_as::<_, IntakeRecord>(
            r#"
            INSERT INTO intake_records
                (id, user_email, food_name, source,
                 calories, sugar, protein, fat, carbs, fiber, sodium)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING id, user_email, food_name, source,
                      calories, sugar, protein, fat, carbs, fiber, sodium, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&record.user_email)
        .bind(&record.food_name)
        .bind(record.source.as_str())
        .bind(record.macros.calories)
        .bind(record.macros.sugar)
        .bind(record.macros.protein)
        .bind(record.macros.fat)
        .bind(record.macros.carbs)
        .bind(record.macros.fiber)
        .bind(record.macros.sodium)
        .fetch_one(&self.db)
        .await
        .map_err(LedgerError::Write)?;
        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intake_source_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&IntakeSource::Barcode).unwrap(), r#""barcode""#);
        assert_eq!(IntakeSource::Manual.as_str(), "manual");
        let parsed: IntakeSource = serde_json::from_str(r#""manual""#).unwrap();
        assert_eq!(parsed, IntakeSource::Manual);
    }
}
