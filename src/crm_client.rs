use std::time::Duration;

use crate::config::Config;
use crate::models::{DeliveryOutcome, Lead};

/// Best-effort forwarder delivering normalized leads to the CRM webhook.
///
/// Every failure mode is converted into a [`DeliveryOutcome`]; forwarding
/// never fails the surrounding request. An undelivered lead has to be
/// picked up manually, so the unconfigured path logs the full payload.
#[derive(Clone)]
pub struct CrmForwarder {
    client: reqwest::Client,
    webhook_url: Option<String>,
    token: Option<String>,
}

impl CrmForwarder {
    pub fn new(config: &Config) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Falling back to default HTTP client: {}", e);
                reqwest::Client::new()
            });

        Self {
            client,
            webhook_url: config.crm_webhook_url.clone(),
            token: config.crm_webhook_token.clone(),
        }
    }

    /// Forwards the lead to the configured webhook.
    ///
    /// Without a configured target the payload is logged and the outcome is
    /// `mocked`; no network call is made. Non-2xx responses and transport
    /// errors both come back as `failed` with a short reason.
    pub async fn forward(&self, lead: &Lead) -> DeliveryOutcome {
        let Some(ref webhook_url) = self.webhook_url else {
            tracing::info!(
                lead_id = %lead.lead_id,
                "CRM webhook not configured; payload logged for manual follow-up"
            );
            tracing::info!(
                "{}",
                serde_json::to_string_pretty(lead).unwrap_or_else(|_| lead.lead_id.clone())
            );
            return DeliveryOutcome::Mocked;
        };

        let mut request = self.client.post(webhook_url).json(lead);
        if let Some(ref token) = self.token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(lead_id = %lead.lead_id, "CRM webhook request failed: {}", e);
                return DeliveryOutcome::Failed {
                    error: format!("CRM webhook request failed: {}", e),
                };
            }
        };

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::error!(
                lead_id = %lead.lead_id,
                "CRM webhook returned {}: {}",
                status,
                error_text
            );
            return DeliveryOutcome::Failed {
                error: format!("CRM webhook failed: {} {}", status.as_u16(), error_text),
            };
        }

        tracing::info!(lead_id = %lead.lead_id, "Lead forwarded to CRM");
        DeliveryOutcome::Forwarded
    }
}
