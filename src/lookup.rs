use std::time::Duration;

use axum::async_trait;
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::nutrition::types::RawNutrientRecord;

/// One product as returned by the nutrition database: a display name plus
/// the raw, unnormalized nutrient record.
#[derive(Debug, Clone, PartialEq)]
pub struct RawProductRecord {
    pub name: String,
    pub nutrients: RawNutrientRecord,
}

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("product database returned HTTP {0}")]
    Status(reqwest::StatusCode),
    #[error("malformed product payload: {0}")]
    Malformed(String),
}

#[async_trait]
pub trait ProductLookup: Send + Sync {
    /// Looks a barcode up in the external nutrition database.
    /// `Ok(None)` means the barcode is unknown there.
    async fn product(&self, barcode: &str) -> Result<Option<RawProductRecord>, LookupError>;
}

/// OpenFoodFacts v0 product API client.
pub struct OpenFoodFactsClient {
    http: Client,
    base_url: String,
}

impl OpenFoodFactsClient {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ProductLookup for OpenFoodFactsClient {
    async fn product(&self, barcode: &str) -> Result<Option<RawProductRecord>, LookupError> {
        let url = format!("{}/api/v0/product/{}.json", self.base_url, barcode);
        let response = self.http.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status(status));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| LookupError::Malformed(e.to_string()))?;
        if payload.get("status").and_then(Value::as_i64) != Some(1) {
            debug!(barcode, "product not found");
            return Ok(None);
        }
        let Some(product) = payload.get("product") else {
            return Ok(None);
        };
        Ok(Some(parse_product(product)))
    }
}

/// Nutriment values arrive as JSON numbers or numeric strings depending on
/// the source record; both parse, anything else reads as absent.
fn lenient_number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn parse_product(product: &Value) -> RawProductRecord {
    static EMPTY: Value = Value::Null;
    let nutriments = product.get("nutriments").unwrap_or(&EMPTY);
    let number = |key: &str| lenient_number(nutriments.get(key));

    RawProductRecord {
        name: product
            .get("product_name")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or("Unknown Food")
            .to_string(),
        nutrients: RawNutrientRecord {
            serving_size: product
                .get("serving_size")
                .and_then(Value::as_str)
                .map(str::to_string),
            energy_value: number("energy_value"),
            energy_unit: nutriments
                .get("energy_value_unit")
                .and_then(Value::as_str)
                .map(str::to_string),
            sugars: number("sugars"),
            sodium: number("sodium"),
            fiber: number("fiber"),
            proteins: number("proteins"),
            carbohydrates: number("carbohydrates"),
            saturated_fat: number("saturated-fat"),
            trans_fat: number("trans-fat"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> OpenFoodFactsClient {
        OpenFoodFactsClient::new(&server.uri(), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn parses_product_with_mixed_value_types() {
        let server = MockServer::start().await;
        let body = json!({
            "status": 1,
            "product": {
                "product_name": "Crunchy Granola",
                "serving_size": "45 g",
                "nutriments": {
                    "energy_value": "1890",
                    "energy_value_unit": "kJ",
                    "sugars": 21.0,
                    "proteins": "8.1",
                    "saturated-fat": 2.5,
                    "sodium": 0.02,
                    "fiber": "7",
                    "carbohydrates": 62.0
                }
            }
        });
        Mock::given(method("GET"))
            .and(path("/api/v0/product/5000000000001.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let record = client_for(&server)
            .product("5000000000001")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.name, "Crunchy Granola");
        assert_eq!(record.nutrients.serving_size.as_deref(), Some("45 g"));
        assert_eq!(record.nutrients.energy_value, Some(1890.0));
        assert_eq!(record.nutrients.energy_unit.as_deref(), Some("kJ"));
        assert_eq!(record.nutrients.proteins, Some(8.1));
        assert_eq!(record.nutrients.fiber, Some(7.0));
        assert_eq!(record.nutrients.saturated_fat, Some(2.5));
    }

    #[tokio::test]
    async fn unknown_barcode_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v0/product/404404404.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": 0 })))
            .mount(&server)
            .await;

        let found = client_for(&server).product("404404404").await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn nameless_product_defaults_to_unknown_food() {
        let server = MockServer::start().await;
        let body = json!({ "status": 1, "product": { "nutriments": { "sugars": 3.0 } } });
        Mock::given(method("GET"))
            .and(path("/api/v0/product/1.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let record = client_for(&server).product("1").await.unwrap().unwrap();
        assert_eq!(record.name, "Unknown Food");
        assert_eq!(record.nutrients.sugars, Some(3.0));
    }

    #[tokio::test]
    async fn http_error_surfaces_as_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let err = client_for(&server).product("1").await.unwrap_err();
        assert!(matches!(err, LookupError::Status(s) if s.as_u16() == 502));
    }
}
