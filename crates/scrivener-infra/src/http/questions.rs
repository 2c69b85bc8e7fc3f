//! HttpQuestionGenerator -- concrete [`QuestionGenerator`] over the
//! external generation service.
//!
//! Asks `POST /v1/questions` for clarification questions on a topic. Any
//! failure here is soft: the dialog skips the answering phase, so this
//! adapter just reports what happened and lets the machine degrade.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use scrivener_core::collaborator::QuestionGenerator;
use scrivener_types::catalog::Language;
use scrivener_types::config::GeneratorConfig;
use scrivener_types::error::QuestionError;

/// Questions are cheap compared to full generation; don't let a hung call
/// stall the coordination loop for the full generation timeout.
const QUESTION_TIMEOUT: Duration = Duration::from_secs(15);

/// HTTP client for clarification question generation.
pub struct HttpQuestionGenerator {
    client: reqwest::Client,
    base_url: String,
    api_key: SecretString,
}

#[derive(Serialize)]
struct QuestionRequest<'a> {
    topic: &'a str,
    language: Language,
}

#[derive(Deserialize)]
struct QuestionResponse {
    questions: Vec<String>,
}

impl HttpQuestionGenerator {
    pub fn new(config: &GeneratorConfig, api_key: SecretString) -> Self {
        let client = reqwest::Client::builder()
            .timeout(QUESTION_TIMEOUT)
            .build()
            .expect("failed to create reqwest client");

        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl QuestionGenerator for HttpQuestionGenerator {
    async fn ask(&self, topic: &str, language: Language) -> Result<Vec<String>, QuestionError> {
        let response = self
            .client
            .post(self.url("/v1/questions"))
            .bearer_auth(self.api_key.expose_secret())
            .json(&QuestionRequest { topic, language })
            .send()
            .await
            .map_err(|err| QuestionError::Upstream(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(QuestionError::Upstream(format!(
                "question service returned {status}"
            )));
        }

        let payload: QuestionResponse = response
            .json()
            .await
            .map_err(|err| QuestionError::Upstream(err.to_string()))?;

        if payload.questions.is_empty() {
            return Err(QuestionError::Empty);
        }
        Ok(payload.questions)
    }
}
