//! Recognizer-service client
//!
//! The entity-recognition engine is an external managed service. This
//! seam covers the three calls the lifecycle controller needs: submit a
//! training job, describe its status, and delete a recognizer resource.
//! The job identifier returned by submission doubles as the identifier
//! of the recognizer the job produces.

use async_trait::async_trait;
use entrain_common::{Error, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::models::JobStatus;

/// Inputs for one recognizer training job
#[derive(Debug, Clone, Serialize)]
pub struct TrainingRequest {
    /// Recognizer name, unique per submission
    pub name: String,
    /// Distinct entity types covered by the entity list
    pub entity_types: Vec<String>,
    /// Object-store location of the entity list to train on
    pub entity_list_location: String,
    /// Object-store location of the training document corpus
    pub documents_location: String,
    /// Role identifier the service trains under
    pub execution_role: String,
}

impl TrainingRequest {
    /// Generate a unique recognizer name
    pub fn generate_name() -> String {
        let suffix: u32 = rand::thread_rng().gen_range(100000..=999999);
        format!("entity-recognizer-{suffix}")
    }
}

/// External recognizer service collaborator
#[async_trait]
pub trait RecognizerClient: Send + Sync {
    /// Submit a training job; returns the job identifier
    async fn submit_training(&self, request: &TrainingRequest) -> Result<String>;

    /// Report the current status of a training job
    async fn describe(&self, job_id: &str) -> Result<JobStatus>;

    /// Delete a recognizer resource (trained or failed)
    async fn delete(&self, recognizer_id: &str) -> Result<()>;
}

/// HTTP/JSON client for a recognizer service endpoint
pub struct HttpRecognizerClient {
    base_url: String,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    job_id: String,
}

#[derive(Debug, Deserialize)]
struct DescribeResponse {
    status: JobStatus,
}

impl HttpRecognizerClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| Error::Recognizer(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.into(),
            http,
        })
    }
}

#[async_trait]
impl RecognizerClient for HttpRecognizerClient {
    async fn submit_training(&self, request: &TrainingRequest) -> Result<String> {
        let url = format!("{}/recognizers", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| Error::Recognizer(format!("Submit request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::Recognizer(format!(
                "Submit rejected with HTTP {}",
                response.status()
            )));
        }

        let body: SubmitResponse = response
            .json()
            .await
            .map_err(|e| Error::Recognizer(format!("Malformed submit response: {e}")))?;

        Ok(body.job_id)
    }

    async fn describe(&self, job_id: &str) -> Result<JobStatus> {
        let url = format!("{}/recognizers/{}", self.base_url, job_id);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Recognizer(format!("Describe request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::Recognizer(format!(
                "Describe rejected with HTTP {}",
                response.status()
            )));
        }

        let body: DescribeResponse = response
            .json()
            .await
            .map_err(|e| Error::Recognizer(format!("Malformed describe response: {e}")))?;

        Ok(body.status)
    }

    async fn delete(&self, recognizer_id: &str) -> Result<()> {
        let url = format!("{}/recognizers/{}", self.base_url, recognizer_id);
        let response = self
            .http
            .delete(&url)
            .send()
            .await
            .map_err(|e| Error::Recognizer(format!("Delete request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::Recognizer(format!(
                "Delete rejected with HTTP {}",
                response.status()
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_names_carry_random_suffix() {
        let name = TrainingRequest::generate_name();
        assert!(name.starts_with("entity-recognizer-"));
        let suffix = name.rsplit('-').next().unwrap();
        assert_eq!(suffix.len(), 6);
        assert!(suffix.chars().all(|c| c.is_ascii_digit()));
    }
}
