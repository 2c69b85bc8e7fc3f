//! HttpReportGenerator -- concrete [`ReportGenerator`] over the external
//! generation service.
//!
//! Sends the finalized configuration to `POST /v1/reports` and expects the
//! rendered artifact back base64-encoded. A 422 from the service means the
//! model output could not be shaped into the report structure; that maps
//! to [`GenerationError::MalformedContent`], the one transient failure the
//! worker pool retries.
//!
//! The API key is wrapped in [`secrecy::SecretString`] and only exposed
//! when building request headers; it never appears in Debug output or
//! logs.

use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use scrivener_core::collaborator::ReportGenerator;
use scrivener_types::catalog::OutputFormat;
use scrivener_types::config::GeneratorConfig;
use scrivener_types::error::GenerationError;
use scrivener_types::job::{GeneratedReport, ReportConfiguration};

/// HTTP client for the external report generation service.
pub struct HttpReportGenerator {
    client: reqwest::Client,
    base_url: String,
    api_key: SecretString,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    configuration: &'a ReportConfiguration,
}

#[derive(Deserialize)]
struct GenerateResponse {
    title: String,
    /// Base64-encoded artifact bytes.
    artifact: String,
    #[serde(default)]
    format: Option<OutputFormat>,
}

impl HttpReportGenerator {
    pub fn new(config: &GeneratorConfig, api_key: SecretString) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
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

impl ReportGenerator for HttpReportGenerator {
    async fn generate(
        &self,
        configuration: &ReportConfiguration,
    ) -> Result<GeneratedReport, GenerationError> {
        let response = self
            .client
            .post(self.url("/v1/reports"))
            .bearer_auth(self.api_key.expose_secret())
            .json(&GenerateRequest { configuration })
            .send()
            .await
            .map_err(|err| GenerationError::Upstream(err.to_string()))?;

        let status = response.status();
        if status == StatusCode::UNPROCESSABLE_ENTITY {
            let detail = response
                .text()
                .await
                .unwrap_or_else(|_| "unreadable error body".to_string());
            return Err(GenerationError::MalformedContent(detail));
        }
        if !status.is_success() {
            return Err(GenerationError::Upstream(format!(
                "generation service returned {status}"
            )));
        }

        let payload: GenerateResponse = response
            .json()
            .await
            .map_err(|err| GenerationError::InvalidResponse(err.to_string()))?;

        let artifact = BASE64.decode(&payload.artifact).map_err(|err| {
            GenerationError::InvalidResponse(format!("artifact is not valid base64: {err}"))
        })?;

        tracing::debug!(
            title = payload.title.as_str(),
            bytes = artifact.len(),
            "report generated"
        );

        Ok(GeneratedReport {
            title: payload.title,
            artifact,
            format: payload.format.unwrap_or(configuration.format),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use scrivener_types::catalog::{Depth, Language, TemplateId};
    use scrivener_types::job::VisualStyle;

    fn generator() -> HttpReportGenerator {
        HttpReportGenerator::new(
            &GeneratorConfig {
                base_url: "https://generate.internal/".to_string(),
                timeout_secs: 5,
            },
            SecretString::from("test-key"),
        )
    }

    #[test]
    fn test_url_joining_strips_trailing_slash() {
        assert_eq!(
            generator().url("/v1/reports"),
            "https://generate.internal/v1/reports"
        );
    }

    #[test]
    fn test_request_payload_shape() {
        let configuration = ReportConfiguration {
            topic: "Tides".to_string(),
            title: Some("On tides".to_string()),
            answers: vec!["coastal".to_string()],
            language: Language::English,
            depth: Depth::Short,
            style: VisualStyle::Template {
                template: TemplateId::Minimal,
            },
            format: OutputFormat::Pdf,
            comparison: None,
        };
        let json = serde_json::to_value(GenerateRequest {
            configuration: &configuration,
        })
        .unwrap();
        assert_eq!(json["configuration"]["topic"], "Tides");
        assert_eq!(json["configuration"]["format"], "pdf");
        assert_eq!(json["configuration"]["style"]["kind"], "template");
    }

    #[test]
    fn test_response_parsing_with_and_without_format() {
        let payload: GenerateResponse = serde_json::from_str(
            r#"{"title": "On tides", "artifact": "AAEC", "format": "docx"}"#,
        )
        .unwrap();
        assert_eq!(payload.format, Some(OutputFormat::Docx));
        assert_eq!(BASE64.decode(&payload.artifact).unwrap(), vec![0, 1, 2]);

        let payload: GenerateResponse =
            serde_json::from_str(r#"{"title": "On tides", "artifact": ""}"#).unwrap();
        assert!(payload.format.is_none());
    }
}
