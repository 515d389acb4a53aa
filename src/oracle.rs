use std::time::Duration;

use axum::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::debug;

use crate::nutrition::types::{DailyIntakeTotal, NormalizedMacros};

/// Everything the decision service needs to judge one candidate food: the
/// food itself, the day's intake *before* it, and the user's goal context.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionRequest {
    pub food_macros: NormalizedMacros,
    pub daily_intake: DailyIntakeTotal,
    /// Empty string means "no goal information available", not an error.
    pub user_goal: String,
    pub target_date: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Yes,
    No,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionResult {
    pub decision: Decision,
    pub reason: String,
}

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("decision service returned HTTP {0}")]
    Status(StatusCode),
    #[error("malformed decision response: {0}")]
    Malformed(String),
}

impl DecisionResult {
    /// Fail-closed fallback: an ambiguous answer about dietary advice is
    /// never treated as a recommendation. The reason names the failure
    /// class so the caller can tell transport trouble from bad data.
    pub fn fail_closed(err: &OracleError) -> Self {
        let reason = match err {
            OracleError::Network(_) => "decision service unreachable (network error)",
            OracleError::Status(s) if s.is_server_error() => "decision service error (server failure)",
            OracleError::Status(_) => "decision service rejected the request",
            OracleError::Malformed(_) => "decision service returned malformed data",
        };
        Self {
            decision: Decision::No,
            reason: reason.to_string(),
        }
    }
}

#[async_trait]
pub trait DecisionOracle: Send + Sync {
    /// Judges one candidate food against the day so far and the user's
    /// goal. One attempt per call; the pipeline maps errors to the
    /// fail-closed result.
    async fn decide(&self, request: &DecisionRequest) -> Result<DecisionResult, OracleError>;

    /// Estimates a macro profile from a free-text food description.
    async fn describe(&self, description: &str) -> Result<NormalizedMacros, OracleError>;
}

const DECIDE_SYSTEM_PROMPT: &str = "You are a dietary advisor. Given a candidate food's macros, \
the user's intake so far today and their fitness goal with its target date, judge whether eating \
the food now is recommended. Reply with a JSON object {\"decision\":\"yes\"|\"no\",\"reason\":\"...\"} \
and nothing else.";

const DESCRIBE_SYSTEM_PROMPT: &str = "You are a nutrition estimator. Given a free-text description \
of a meal, estimate its nutrition for the described portion. Reply with a JSON object with numeric \
fields calories (kcal), sugar, protein, fat, carbs, fiber and sodium (grams) and nothing else.";

/// Groq-style chat-completions client behind the `DecisionOracle` seam.
pub struct GroqOracle {
    http: Client,
    base_url: String,
    api_key: String,
    model: String,
}

#[derive(Deserialize)]
struct ChatCompletion {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: String,
}

impl GroqOracle {
    pub fn new(base_url: &str, api_key: &str, model: &str, timeout: Duration) -> anyhow::Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        })
    }

    /// One chat-completion round trip; the model's reply must be a single
    /// JSON object.
    async fn chat(&self, system: &str, user: String) -> Result<serde_json::Value, OracleError> {
        let body = json!({
            "model": self.model,
            "temperature": 0.2,
            "response_format": { "type": "json_object" },
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user },
            ],
        });

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(OracleError::Status(status));
        }

        let completion: ChatCompletion = response
            .json()
            .await
            .map_err(|e| OracleError::Malformed(e.to_string()))?;
        let content = completion
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| OracleError::Malformed("completion has no choices".into()))?;

        serde_json::from_str(&content)
            .map_err(|e| OracleError::Malformed(format!("choice content is not JSON: {e}")))
    }
}

#[async_trait]
impl DecisionOracle for GroqOracle {
    async fn decide(&self, request: &DecisionRequest) -> Result<DecisionResult, OracleError> {
        let payload =
            serde_json::to_string(request).map_err(|e| OracleError::Malformed(e.to_string()))?;
        let value = self.chat(DECIDE_SYSTEM_PROMPT, payload).await?;
        let result: DecisionResult = serde_json::from_value(value)
            .map_err(|e| OracleError::Malformed(format!("decision fields missing or invalid: {e}")))?;
        debug!(decision = ?result.decision, "oracle decision received");
        Ok(result)
    }

    async fn describe(&self, description: &str) -> Result<NormalizedMacros, OracleError> {
        let value = self.chat(DESCRIBE_SYSTEM_PROMPT, description.to_string()).await?;
        let macros: NormalizedMacros = serde_json::from_value(value)
            .map_err(|e| OracleError::Malformed(format!("macro fields invalid: {e}")))?;
        Ok(macros.sanitized())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sample_request() -> DecisionRequest {
        DecisionRequest {
            food_macros: NormalizedMacros {
                calories: 286.0,
                sugar: 15.0,
                protein: 7.5,
                ..Default::default()
            },
            daily_intake: NormalizedMacros {
                calories: 1200.0,
                ..Default::default()
            },
            user_goal: "Lose".into(),
            target_date: Some("2026-12-01".into()),
        }
    }

    fn oracle_for(server: &MockServer) -> GroqOracle {
        GroqOracle::new(&server.uri(), "test-key", "test-model", Duration::from_secs(5)).unwrap()
    }

    fn completion_with(content: &str) -> serde_json::Value {
        json!({ "choices": [ { "message": { "content": content } } ] })
    }

    #[tokio::test]
    async fn well_formed_decision_passes_through_unchanged() {
        let server = MockServer::start().await;
        let content = json!({ "decision": "yes", "reason": "fits your remaining budget" });
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_with(&content.to_string())))
            .mount(&server)
            .await;

        let result = oracle_for(&server).decide(&sample_request()).await.unwrap();
        assert_eq!(result.decision, Decision::Yes);
        assert_eq!(result.reason, "fits your remaining budget");
    }

    #[tokio::test]
    async fn server_error_maps_to_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = oracle_for(&server).decide(&sample_request()).await.unwrap_err();
        assert!(matches!(err, OracleError::Status(s) if s.as_u16() == 500));

        let fallback = DecisionResult::fail_closed(&err);
        assert_eq!(fallback.decision, Decision::No);
        assert!(!fallback.reason.is_empty());
    }

    #[tokio::test]
    async fn non_json_body_maps_to_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = oracle_for(&server).decide(&sample_request()).await.unwrap_err();
        assert!(matches!(err, OracleError::Malformed(_)));
    }

    #[tokio::test]
    async fn unexpected_decision_value_maps_to_malformed() {
        let server = MockServer::start().await;
        let content = json!({ "decision": "maybe", "reason": "unsure" });
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_with(&content.to_string())))
            .mount(&server)
            .await;

        let err = oracle_for(&server).decide(&sample_request()).await.unwrap_err();
        assert!(matches!(err, OracleError::Malformed(_)));
    }

    #[tokio::test]
    async fn unreachable_service_maps_to_network_error() {
        // Nothing listens on the discard port.
        let oracle =
            GroqOracle::new("http://127.0.0.1:9", "test-key", "test-model", Duration::from_secs(1))
                .unwrap();
        let err = oracle.decide(&sample_request()).await.unwrap_err();
        assert!(matches!(err, OracleError::Network(_)));

        let fallback = DecisionResult::fail_closed(&err);
        assert_eq!(fallback.decision, Decision::No);
        assert!(fallback.reason.contains("network"));
    }

    #[tokio::test]
    async fn describe_sanitizes_model_output() {
        let server = MockServer::start().await;
        let content = json!({ "calories": 512.4, "sugar": -2.0, "protein": 21.46, "carbs": 60.0 });
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_with(&content.to_string())))
            .mount(&server)
            .await;

        let macros = oracle_for(&server).describe("2 slices of pizza").await.unwrap();
        assert_eq!(macros.calories, 512.0);
        assert_eq!(macros.sugar, 0.0);
        assert_eq!(macros.protein, 21.5);
        assert_eq!(macros.carbs, 60.0);
        assert_eq!(macros.fiber, 0.0);
    }
}
