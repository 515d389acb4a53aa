use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;

use crate::config::AppConfig;
use crate::goals::{GoalStore, PgGoalStore};
use crate::intake::{IntakeLedger, PgIntakeLedger};
use crate::lookup::{OpenFoodFactsClient, ProductLookup};
use crate::oracle::{DecisionOracle, GroqOracle};

/// Shared application state: the pool plus the four external-collaborator
/// seams the pipeline talks through.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<AppConfig>,
    pub lookup: Arc<dyn ProductLookup>,
    pub oracle: Arc<dyn DecisionOracle>,
    pub ledger: Arc<dyn IntakeLedger>,
    pub goals: Arc<dyn GoalStore>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let db = sqlx::postgres::PgPoolOptions::new()
            .max_connections(10)
            .connect(&config.database_url)
            .await?;

        let timeout = Duration::from_secs(config.http_timeout_secs);
        let lookup = Arc::new(OpenFoodFactsClient::new(&config.lookup.base_url, timeout)?)
            as Arc<dyn ProductLookup>;
        let oracle = Arc::new(GroqOracle::new(
            &config.oracle.base_url,
            &config.oracle.api_key,
            &config.oracle.model,
            timeout,
        )?) as Arc<dyn DecisionOracle>;
        let ledger = Arc::new(PgIntakeLedger::new(db.clone())) as Arc<dyn IntakeLedger>;
        let goals = Arc::new(PgGoalStore::new(db.clone())) as Arc<dyn GoalStore>;

        Ok(Self {
            db,
            config,
            lookup,
            oracle,
            ledger,
            goals,
        })
    }

    pub fn from_parts(
        db: PgPool,
        config: Arc<AppConfig>,
        lookup: Arc<dyn ProductLookup>,
        oracle: Arc<dyn DecisionOracle>,
        ledger: Arc<dyn IntakeLedger>,
        goals: Arc<dyn GoalStore>,
    ) -> Self {
        Self {
            db,
            config,
            lookup,
            oracle,
            ledger,
            goals,
        }
    }
}
