//! Job orchestration
//!
//! Drives a submitted analysis job through its lifecycle with fixed-cadence
//! polling: pending/processing responses consume an attempt and wait,
//! completed returns the typed result, failed aborts, and an exhausted
//! attempt budget times out. There is no backoff; the cadence is constant.
//! Cancellation is dropping the future, every wait is an await point.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::models::{AnalysisResultCreate, FoodEntry};

use super::client::{AnalysisApi, ApiError, FoodAnalysis, FoodSubmission, JobStatus};
use super::AnalysisError;

/// Polling cadence and attempt budget. Defaults give roughly five minutes
/// of patience.
#[derive(Debug, Clone, Copy)]
pub struct PollConfig {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(2000),
            max_attempts: 150,
        }
    }
}

/// Submits food batches and polls the resulting job to completion
pub struct JobOrchestrator<A: AnalysisApi> {
    api: A,
    config: PollConfig,
}

impl<A: AnalysisApi> JobOrchestrator<A> {
    pub fn new(api: A) -> Self {
        Self::with_config(api, PollConfig::default())
    }

    pub fn with_config(api: A, config: PollConfig) -> Self {
        Self { api, config }
    }

    /// Submit a batch of foods for analysis, returning the remote job id.
    ///
    /// Food names are validated locally first; an invalid name fails the
    /// submission before any network call.
    pub async fn submit_job(&self, foods: &[FoodEntry]) -> Result<String, AnalysisError> {
        for entry in foods {
            validate_food_name(&entry.name)?;
        }

        let submissions: Vec<FoodSubmission> = foods
            .iter()
            .map(|entry| FoodSubmission {
                name: entry.name.clone(),
                meal_type: entry.meal_type.as_str().to_string(),
                portion: entry.portion.clone(),
                quantity: entry.quantity,
                unit: entry.unit.clone(),
            })
            .collect();

        let job_id = self
            .api
            .submit(&submissions)
            .await
            .map_err(|e| AnalysisError::Submission(e.to_string()))?;

        info!(job_id = %job_id, foods = foods.len(), "submitted analysis job");
        Ok(job_id)
    }

    /// Poll the job at the configured cadence until it reaches a terminal
    /// state or the attempt budget is exhausted.
    ///
    /// Retryable transport errors (timeouts, connection failures, 5xx)
    /// consume their attempt and polling continues; non-retryable errors
    /// abort immediately.
    pub async fn poll_until_done(&self, job_id: &str) -> Result<Vec<FoodAnalysis>, AnalysisError> {
        for attempt in 1..=self.config.max_attempts {
            match self.api.fetch_status(job_id).await {
                Ok(response) => match response.status {
                    JobStatus::Completed => {
                        info!(job_id = %job_id, attempt, "analysis job completed");
                        let wires = response.result.unwrap_or_default();
                        return Ok(wires
                            .into_iter()
                            .map(|wire| wire.into_analysis(None))
                            .collect());
                    }
                    JobStatus::Failed => {
                        let message = response
                            .error
                            .unwrap_or_else(|| "no error reported".to_string());
                        return Err(AnalysisError::JobFailed(message));
                    }
                    JobStatus::Pending | JobStatus::Processing => {
                        debug!(job_id = %job_id, attempt, status = ?response.status, "job not ready");
                    }
                },
                Err(ApiError::Retryable(message)) => {
                    warn!(job_id = %job_id, attempt, %message, "transient poll failure");
                }
                Err(ApiError::Fatal(message)) => {
                    return Err(AnalysisError::Transport(message));
                }
            }

            if attempt < self.config.max_attempts {
                tokio::time::sleep(self.config.interval).await;
            }
        }

        Err(AnalysisError::PollingTimeout {
            attempts: self.config.max_attempts,
        })
    }

    /// Submit, poll to completion, and pair the results back with their
    /// entries as rows ready to persist.
    pub async fn analyze(
        &self,
        foods: &[FoodEntry],
    ) -> Result<Vec<AnalysisResultCreate>, AnalysisError> {
        if foods.is_empty() {
            return Ok(Vec::new());
        }

        let job_id = self.submit_job(foods).await?;
        let analyses = self.poll_until_done(&job_id).await?;

        if analyses.len() != foods.len() {
            return Err(AnalysisError::Transport(format!(
                "result count mismatch: submitted {} foods, received {} analyses",
                foods.len(),
                analyses.len()
            )));
        }

        Ok(foods
            .iter()
            .zip(analyses)
            .map(|(entry, analysis)| {
                let substances = analysis
                    .substances
                    .into_iter()
                    .map(|mut substance| {
                        substance.meal_type = Some(entry.meal_type);
                        substance
                    })
                    .collect();
                AnalysisResultCreate {
                    food_entry_id: entry.id,
                    day_id: entry.day_id,
                    food_name: analysis.food_name,
                    ingredients: analysis.ingredients,
                    substances,
                }
            })
            .collect())
    }
}

/// Local validation applied before submission. Names must be non-empty,
/// at most 100 characters, and contain at least one letter.
fn validate_food_name(name: &str) -> Result<(), AnalysisError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AnalysisError::Submission(
            "food name cannot be empty".to_string(),
        ));
    }
    if trimmed.chars().count() > 100 {
        return Err(AnalysisError::Submission(format!(
            "food name exceeds 100 characters: '{}'",
            trimmed
        )));
    }
    if !trimmed.chars().any(char::is_alphabetic) {
        return Err(AnalysisError::Submission(format!(
            "food name must contain at least one letter: '{}'",
            trimmed
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::client::JobStatusResponse;
    use crate::models::MealType;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    /// Scripted API: pops queued responses, then reports pending forever.
    struct MockApi {
        responses: Mutex<VecDeque<Result<JobStatusResponse, ApiError>>>,
        submissions: AtomicU32,
        fetches: AtomicU32,
    }

    impl MockApi {
        fn new(responses: Vec<Result<JobStatusResponse, ApiError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                submissions: AtomicU32::new(0),
                fetches: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl AnalysisApi for &MockApi {
        async fn submit(&self, _foods: &[FoodSubmission]) -> Result<String, ApiError> {
            self.submissions.fetch_add(1, Ordering::SeqCst);
            Ok("job-1".to_string())
        }

        async fn fetch_status(&self, _job_id: &str) -> Result<JobStatusResponse, ApiError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.responses.lock().unwrap().pop_front().unwrap_or(Ok(JobStatusResponse {
                status: JobStatus::Pending,
                result: None,
                error: None,
            }))
        }
    }

    fn pending() -> Result<JobStatusResponse, ApiError> {
        Ok(JobStatusResponse {
            status: JobStatus::Pending,
            result: None,
            error: None,
        })
    }

    fn completed() -> Result<JobStatusResponse, ApiError> {
        let result = serde_json::from_str(
            r#"[{
                "food_name": "Oatmeal",
                "ingredients": ["oats"],
                "substances": [{"name": "protein", "amount": 6.0, "unit": "g"}]
            }]"#,
        )
        .unwrap();
        Ok(JobStatusResponse {
            status: JobStatus::Completed,
            result: Some(result),
            error: None,
        })
    }

    fn entry(name: &str) -> FoodEntry {
        FoodEntry {
            id: 1,
            day_id: 10,
            name: name.to_string(),
            meal_type: MealType::Breakfast,
            portion: "1 bowl".to_string(),
            quantity: 1.0,
            unit: "serving".to_string(),
            created_at: "2025-01-06T08:00:00".to_string(),
        }
    }

    #[test]
    fn test_food_name_validation() {
        assert!(validate_food_name("Oatmeal").is_ok());
        assert!(validate_food_name("   ").is_err());
        assert!(validate_food_name("12345").is_err());
        assert!(validate_food_name(&"x".repeat(101)).is_err());
        assert!(validate_food_name(&"x".repeat(100)).is_ok());
    }

    #[tokio::test]
    async fn test_invalid_name_fails_before_any_network_call() {
        let api = MockApi::new(vec![]);
        let orchestrator = JobOrchestrator::new(&api);

        let err = orchestrator.submit_job(&[entry("12345")]).await.unwrap_err();
        assert!(matches!(err, AnalysisError::Submission(_)));
        assert_eq!(api.submissions.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_completion_on_fifth_poll_takes_five_fetches() {
        let api = MockApi::new(vec![pending(), pending(), pending(), pending(), completed()]);
        let orchestrator = JobOrchestrator::new(&api);

        let started = tokio::time::Instant::now();
        let analyses = orchestrator.poll_until_done("job-1").await.unwrap();

        assert_eq!(api.fetches.load(Ordering::SeqCst), 5);
        assert_eq!(analyses.len(), 1);
        assert_eq!(analyses[0].food_name, "Oatmeal");
        // four sleeps between five attempts at the 2s cadence
        assert_eq!(started.elapsed(), Duration::from_secs(8));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_after_exactly_150_attempts() {
        let api = MockApi::new(vec![]);
        let orchestrator = JobOrchestrator::new(&api);

        let err = orchestrator.poll_until_done("job-1").await.unwrap_err();
        assert!(matches!(err, AnalysisError::PollingTimeout { attempts: 150 }));
        assert_eq!(api.fetches.load(Ordering::SeqCst), 150);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_job_reports_remote_error() {
        let api = MockApi::new(vec![
            pending(),
            Ok(JobStatusResponse {
                status: JobStatus::Failed,
                result: None,
                error: Some("analyzer crashed".to_string()),
            }),
        ]);
        let orchestrator = JobOrchestrator::new(&api);

        let err = orchestrator.poll_until_done("job-1").await.unwrap_err();
        match err {
            AnalysisError::JobFailed(message) => assert_eq!(message, "analyzer crashed"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_retryable_error_consumes_attempt_and_continues() {
        let api = MockApi::new(vec![
            Err(ApiError::Retryable("connection reset".to_string())),
            completed(),
        ]);
        let orchestrator = JobOrchestrator::new(&api);

        let analyses = orchestrator.poll_until_done("job-1").await.unwrap();
        assert_eq!(analyses.len(), 1);
        assert_eq!(api.fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fatal_error_aborts_immediately() {
        let api = MockApi::new(vec![
            Err(ApiError::Fatal("HTTP 404: no such job".to_string())),
            completed(),
        ]);
        let orchestrator = JobOrchestrator::new(&api);

        let err = orchestrator.poll_until_done("job-1").await.unwrap_err();
        assert!(matches!(err, AnalysisError::Transport(_)));
        assert_eq!(api.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_analyze_pairs_results_with_entries() {
        let api = MockApi::new(vec![completed()]);
        let orchestrator = JobOrchestrator::new(&api);

        let rows = orchestrator.analyze(&[entry("Oatmeal")]).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].food_entry_id, 1);
        assert_eq!(rows[0].day_id, 10);
        assert_eq!(rows[0].substances[0].meal_type, Some(MealType::Breakfast));
    }

    #[tokio::test]
    async fn test_analyze_empty_batch_skips_submission() {
        let api = MockApi::new(vec![]);
        let orchestrator = JobOrchestrator::new(&api);

        let rows = orchestrator.analyze(&[]).await.unwrap();
        assert!(rows.is_empty());
        assert_eq!(api.submissions.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_analyze_rejects_count_mismatch() {
        let api = MockApi::new(vec![completed()]);
        let orchestrator = JobOrchestrator::new(&api);

        let err = orchestrator
            .analyze(&[entry("Oatmeal"), entry("Salad")])
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Transport(_)));
    }
}
