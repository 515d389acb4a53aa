use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct OracleConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LookupConfig {
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub http_timeout_secs: u64,
    pub oracle: OracleConfig,
    pub lookup: LookupConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let oracle = OracleConfig {
            base_url: std::env::var("ORACLE_BASE_URL")
                .unwrap_or_else(|_| "https://api.groq.com/openai/v1".into()),
            api_key: std::env::var("ORACLE_API_KEY").unwrap_or_default(),
            model: std::env::var("ORACLE_MODEL")
                .unwrap_or_else(|_| "llama-3.3-70b-versatile".into()),
        };
        let lookup = LookupConfig {
            base_url: std::env::var("LOOKUP_BASE_URL")
                .unwrap_or_else(|_| "https://world.openfoodfacts.org".into()),
        };
        let http_timeout_secs = std::env::var("HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(30);
        Ok(Self {
            database_url,
            http_timeout_secs,
            oracle,
            lookup,
        })
    }
}
