//! WebhookNotifier -- concrete [`Notifier`] posting results to a callback
//! endpoint.
//!
//! Deliveries go to `POST /v1/deliveries`, failures to
//! `POST /v1/delivery-failures`. When a signing secret is configured every
//! payload carries an HMAC-SHA256 signature header so the receiver can
//! authenticate it. Delivery is best effort by contract: callers log
//! failures and move on.

use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use sha2::Sha256;

use scrivener_core::collaborator::Notifier;
use scrivener_types::config::NotifierConfig;
use scrivener_types::error::DeliveryError;
use scrivener_types::job::{GeneratedReport, StatusHandle};
use scrivener_types::session::ClientId;

/// Header carrying the payload signature.
pub const SIGNATURE_HEADER: &str = "x-scrivener-signature";

/// Webhook-based result delivery.
pub struct WebhookNotifier {
    client: reqwest::Client,
    base_url: String,
    signing_key: Option<SecretString>,
}

#[derive(Serialize)]
struct DeliveryPayload<'a> {
    client_id: &'a str,
    title: &'a str,
    format: &'static str,
    /// Base64-encoded artifact bytes.
    artifact: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    status_handle: Option<&'a str>,
}

#[derive(Serialize)]
struct FailurePayload<'a> {
    client_id: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    status_handle: Option<&'a str>,
}

impl WebhookNotifier {
    pub fn new(config: &NotifierConfig, signing_key: Option<SecretString>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("failed to create reqwest client");

        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            signing_key,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post_signed<T: Serialize>(&self, path: &str, payload: &T) -> Result<(), DeliveryError> {
        let body = serde_json::to_vec(payload)
            .map_err(|err| DeliveryError::Upstream(format!("payload serialization: {err}")))?;

        let mut request = self
            .client
            .post(self.url(path))
            .header(reqwest::header::CONTENT_TYPE, "application/json");
        if let Some(key) = &self.signing_key {
            request = request.header(SIGNATURE_HEADER, sign(key, &body));
        }

        let response = request
            .body(body)
            .send()
            .await
            .map_err(|err| DeliveryError::Upstream(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DeliveryError::Rejected {
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}

impl Notifier for WebhookNotifier {
    async fn send_result(
        &self,
        client_id: &ClientId,
        report: &GeneratedReport,
        status_handle: Option<&StatusHandle>,
    ) -> Result<(), DeliveryError> {
        let payload = DeliveryPayload {
            client_id: client_id.as_str(),
            title: &report.title,
            format: report.format.id(),
            artifact: BASE64.encode(&report.artifact),
            status_handle: status_handle.map(StatusHandle::as_str),
        };
        self.post_signed("/v1/deliveries", &payload).await
    }

    async fn send_error(
        &self,
        client_id: &ClientId,
        message: &str,
        status_handle: Option<&StatusHandle>,
    ) -> Result<(), DeliveryError> {
        let payload = FailurePayload {
            client_id: client_id.as_str(),
            message,
            status_handle: status_handle.map(StatusHandle::as_str),
        };
        self.post_signed("/v1/delivery-failures", &payload).await
    }
}

/// `sha256=<hex>` over the exact request body.
fn sign(key: &SecretString, body: &[u8]) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(key.expose_secret().as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(body);
    let digest = mac.finalize().into_bytes();
    let hex: String = digest.iter().map(|b| format!("{b:02x}")).collect();
    format!("sha256={hex}")
}
