use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Inbound lead form payload, as posted by the marketing site.
///
/// The site has shipped two form revisions with different field names, so
/// every logical field carries its aliases here. Nothing is required at the
/// type level; presence rules live in the validator.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadSubmission {
    pub full_name: Option<String>,

    /// Older form revision sends `name` instead of `fullName`.
    pub name: Option<String>,

    pub email: Option<String>,

    /// Alias for `email` used by embedded landing-page widgets.
    pub contact_email: Option<String>,

    pub vehicle_category: Option<String>,

    /// Older form revision sends `vehicle` instead of `vehicleCategory`.
    pub vehicle: Option<String>,

    pub budget_range: Option<String>,
    pub timeline: Option<String>,
    pub notes: Option<String>,

    /// Explicit marketing-consent flag.
    pub opt_in: Option<bool>,

    pub lead_source: Option<String>,
    pub pipeline_stage: Option<String>,

    /// Raw data for any additional fields the form may send.
    #[serde(flatten)]
    pub raw: Value,
}

/// Canonical lead record produced by normalization.
///
/// Created once per request, forwarded to the CRM and the mailer, and
/// discarded after the response is sent.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    /// Unique per submission, immutable once assigned.
    pub lead_id: String,

    /// RFC 3339 submission timestamp, doubles as the consent timestamp.
    pub submitted_at: String,

    pub full_name: String,

    /// First whitespace token of `full_name`, used in email salutations.
    pub first_name: String,

    pub email: String,
    pub vehicle_category: String,
    pub budget_range: String,
    pub timeline: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    pub lead_source: String,
    pub pipeline_stage: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub opted_in: Option<bool>,
}

/// Result of one best-effort downstream delivery (CRM webhook or email).
///
/// Reported back to the caller in the response body; never fails the
/// overall request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum DeliveryOutcome {
    /// Lead delivered to the CRM webhook.
    Forwarded,
    /// Email accepted by the provider.
    Sent,
    /// Target not configured; nothing attempted.
    Skipped,
    /// No CRM target configured; payload logged for manual follow-up.
    Mocked,
    /// Attempted and errored.
    Failed { error: String },
}

impl DeliveryOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, DeliveryOutcome::Failed { .. })
    }
}

/// Per-message email outcomes reported in the intake response.
#[derive(Debug, Clone, Serialize)]
pub struct EmailOutcomes {
    pub internal: DeliveryOutcome,
    pub acknowledgment: DeliveryOutcome,
}

/// Response for a successfully processed lead submission.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadResponse {
    pub ok: bool,
    pub lead_id: String,
    pub crm: DeliveryOutcome,
    pub email: EmailOutcomes,
}
