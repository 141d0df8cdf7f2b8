//! HTTP client for the analysis backend
//!
//! Typed wire structs replace loose JSON at the boundary; everything past
//! this module works with domain types. The `AnalysisApi` trait is the seam
//! the orchestrator polls through, so tests can drive the poll loop with a
//! scripted fake instead of a live server.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::models::{ChemicalSubstance, MealType, SubstanceCategory};

/// Transport failure, split by whether the poll loop may keep going
#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    /// Transient: timeouts, connection failures, 5xx responses
    #[error("{0}")]
    Retryable(String),
    /// Permanent: 4xx responses, undecodable payloads
    #[error("{0}")]
    Fatal(String),
}

// ===== Wire types =====

/// One food in the submission payload
#[derive(Debug, Clone, Serialize)]
pub struct FoodSubmission {
    pub name: String,
    pub meal_type: String,
    pub portion: String,
    pub quantity: f64,
    pub unit: String,
}

#[derive(Debug, Serialize)]
struct SubmitJobRequest<'a> {
    foods: &'a [FoodSubmission],
}

#[derive(Debug, Deserialize)]
struct SubmitJobResponse {
    job_id: String,
}

/// Remote job lifecycle state. The backend historically reported `queued`
/// for jobs not yet picked up; it means the same thing as `pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    #[serde(alias = "queued")]
    Pending,
    Processing,
    Completed,
    Failed,
}

#[derive(Debug, Deserialize)]
pub struct JobStatusResponse {
    pub status: JobStatus,
    #[serde(default)]
    pub result: Option<Vec<FoodAnalysisWire>>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubstanceWire {
    pub name: String,
    pub amount: f64,
    pub unit: String,
    #[serde(default)]
    pub health_impact: Option<String>,
    #[serde(default)]
    pub standard_consumption: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FoodAnalysisWire {
    pub food_name: String,
    #[serde(default)]
    pub ingredients: Vec<String>,
    pub substances: Vec<SubstanceWire>,
}

// ===== Domain conversion =====

/// Analysis of one food, converted off the wire
#[derive(Debug, Clone)]
pub struct FoodAnalysis {
    pub food_name: String,
    pub ingredients: Vec<String>,
    pub substances: Vec<ChemicalSubstance>,
}

/// The analyzer tags substances with a coarse health impact; it stands in
/// for a category when the local substance table has no entry.
fn category_from_health_impact(health_impact: Option<&str>) -> SubstanceCategory {
    match health_impact {
        Some("negative") => SubstanceCategory::Harmful,
        Some("positive") => SubstanceCategory::Micronutrient,
        _ => SubstanceCategory::Unknown,
    }
}

impl FoodAnalysisWire {
    pub fn into_analysis(self, meal_type: Option<MealType>) -> FoodAnalysis {
        let substances = self
            .substances
            .into_iter()
            .map(|wire| ChemicalSubstance {
                category: category_from_health_impact(wire.health_impact.as_deref()),
                name: wire.name,
                amount: wire.amount,
                unit: wire.unit,
                meal_type,
                standard_consumption: wire.standard_consumption,
            })
            .collect();

        FoodAnalysis {
            food_name: self.food_name,
            ingredients: self.ingredients,
            substances,
        }
    }
}

// ===== API seam =====

#[async_trait]
pub trait AnalysisApi: Send + Sync {
    async fn submit(&self, foods: &[FoodSubmission]) -> Result<String, ApiError>;
    async fn fetch_status(&self, job_id: &str) -> Result<JobStatusResponse, ApiError>;
}

/// reqwest-backed production client
pub struct HttpAnalysisClient {
    base_url: String,
    client: reqwest::Client,
}

impl HttpAnalysisClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }
}

fn classify_reqwest(err: reqwest::Error) -> ApiError {
    if err.is_timeout() || err.is_connect() {
        return ApiError::Retryable(err.to_string());
    }
    if err.is_decode() {
        return ApiError::Fatal(err.to_string());
    }
    match err.status() {
        Some(status) if status.is_server_error() => ApiError::Retryable(err.to_string()),
        _ => ApiError::Fatal(err.to_string()),
    }
}

fn classify_status(status: reqwest::StatusCode, body: String) -> ApiError {
    let message = format!("HTTP {}: {}", status.as_u16(), body);
    if status.is_server_error() {
        ApiError::Retryable(message)
    } else {
        ApiError::Fatal(message)
    }
}

#[async_trait]
impl AnalysisApi for HttpAnalysisClient {
    async fn submit(&self, foods: &[FoodSubmission]) -> Result<String, ApiError> {
        let url = format!("{}/analyze/foods", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&SubmitJobRequest { foods })
            .send()
            .await
            .map_err(classify_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status, body));
        }

        let parsed: SubmitJobResponse = response.json().await.map_err(classify_reqwest)?;
        Ok(parsed.job_id)
    }

    async fn fetch_status(&self, job_id: &str) -> Result<JobStatusResponse, ApiError> {
        let url = format!("{}/jobs/{}", self.base_url, job_id);
        let response = self.client.get(&url).send().await.map_err(classify_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status, body));
        }

        response.json().await.map_err(classify_reqwest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queued_is_an_alias_of_pending() {
        let parsed: JobStatusResponse =
            serde_json::from_str(r#"{"status": "queued"}"#).unwrap();
        assert_eq!(parsed.status, JobStatus::Pending);

        let parsed: JobStatusResponse =
            serde_json::from_str(r#"{"status": "pending"}"#).unwrap();
        assert_eq!(parsed.status, JobStatus::Pending);
    }

    #[test]
    fn test_status_response_with_result() {
        let json = r#"{
            "status": "completed",
            "result": [{
                "food_name": "Oatmeal",
                "ingredients": ["oats", "water"],
                "substances": [{
                    "name": "Protein",
                    "amount": 6.0,
                    "unit": "g",
                    "health_impact": "positive",
                    "standard_consumption": 50.0
                }]
            }]
        }"#;

        let parsed: JobStatusResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.status, JobStatus::Completed);

        let result = parsed.result.unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].ingredients, vec!["oats", "water"]);

        let analysis = result[0].clone().into_analysis(Some(MealType::Breakfast));
        assert_eq!(analysis.substances.len(), 1);
        assert_eq!(analysis.substances[0].category, SubstanceCategory::Micronutrient);
        assert_eq!(analysis.substances[0].meal_type, Some(MealType::Breakfast));
        assert_eq!(analysis.substances[0].standard_consumption, Some(50.0));
    }

    #[test]
    fn test_health_impact_mapping() {
        assert_eq!(
            category_from_health_impact(Some("negative")),
            SubstanceCategory::Harmful
        );
        assert_eq!(
            category_from_health_impact(Some("positive")),
            SubstanceCategory::Micronutrient
        );
        assert_eq!(
            category_from_health_impact(Some("neutral")),
            SubstanceCategory::Unknown
        );
        assert_eq!(category_from_health_impact(None), SubstanceCategory::Unknown);
    }

    #[test]
    fn test_http_status_classification() {
        let retryable = classify_status(
            reqwest::StatusCode::SERVICE_UNAVAILABLE,
            "overloaded".to_string(),
        );
        assert!(matches!(retryable, ApiError::Retryable(_)));

        let fatal = classify_status(reqwest::StatusCode::NOT_FOUND, "no such job".to_string());
        assert!(matches!(fatal, ApiError::Fatal(_)));
    }

    #[test]
    fn test_submission_payload_shape() {
        let foods = vec![FoodSubmission {
            name: "Oatmeal".to_string(),
            meal_type: "breakfast".to_string(),
            portion: "1 bowl".to_string(),
            quantity: 1.0,
            unit: "serving".to_string(),
        }];

        let json = serde_json::to_value(SubmitJobRequest { foods: &foods }).unwrap();
        assert_eq!(json["foods"][0]["name"], "Oatmeal");
        assert_eq!(json["foods"][0]["meal_type"], "breakfast");
    }
}
