//! Remote food analysis
//!
//! Talks to the analysis backend's asynchronous job protocol: submit a batch
//! of foods, then poll the job at a fixed cadence until it completes, fails
//! or the attempt budget runs out.

mod client;
mod orchestrator;

use thiserror::Error;

pub use client::{
    AnalysisApi, ApiError, FoodAnalysis, FoodSubmission, HttpAnalysisClient, JobStatus,
    JobStatusResponse,
};
pub use orchestrator::{JobOrchestrator, PollConfig};

/// Failures of the analysis job protocol
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Analysis submission failed: {0}")]
    Submission(String),

    #[error("Analysis job failed: {0}")]
    JobFailed(String),

    #[error("Analysis polling timed out after {attempts} attempts")]
    PollingTimeout { attempts: u32 },

    #[error("Analysis transport error: {0}")]
    Transport(String),
}
