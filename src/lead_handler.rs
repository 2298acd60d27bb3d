use axum::{
    body::Bytes,
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::json;
use std::sync::Arc;

use crate::errors::AppError;
use crate::handlers::AppState;
use crate::models::{LeadResponse, LeadSubmission};
use crate::normalize::{normalize, LeadContext};
use crate::validation::{validate_submission, Validation};

/// Lead intake handler for `POST /api/leads`.
///
/// Pipeline: parse body, validate, normalize, forward to the CRM, dispatch
/// the notification emails, respond. The two downstream deliveries are
/// best-effort; once validation passes the caller gets a 200 with a tagged
/// outcome per downstream system.
///
/// The raw body is read here instead of through the `Json` extractor so a
/// malformed payload falls into the generic server-error path rather than
/// an extractor rejection; the body size cap is enforced by the request
/// limit layer in `main`.
pub async fn submit_lead(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<(StatusCode, Json<LeadResponse>), AppError> {
    tracing::info!("Received lead submission ({} bytes)", body.len());

    let submission: LeadSubmission = if body.is_empty() {
        LeadSubmission::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| AppError::InternalError(format!("Invalid JSON payload: {}", e)))?
    };

    if let Validation::Invalid(reason) = validate_submission(&submission) {
        tracing::info!("Rejected lead submission: {}", reason);
        return Err(AppError::BadRequest(reason));
    }

    let context = LeadContext::generate();
    let lead = normalize(&submission, &context);
    tracing::info!(lead_id = %lead.lead_id, "Lead normalized: {}", lead.full_name);

    let crm = state.crm.forward(&lead).await;
    let email = state.mailer.dispatch(&lead).await;

    if crm.is_failure() || email.internal.is_failure() || email.acknowledgment.is_failure() {
        tracing::warn!(
            lead_id = %lead.lead_id,
            "Lead accepted with degraded delivery: crm={:?}, email=({:?}, {:?})",
            crm,
            email.internal,
            email.acknowledgment
        );
    }

    Ok((
        StatusCode::OK,
        Json(LeadResponse {
            ok: true,
            lead_id: lead.lead_id,
            crm,
            email,
        }),
    ))
}

/// Fallback for non-POST requests to the lead endpoint.
pub async fn method_not_allowed() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(header::ALLOW, "POST")],
        Json(json!({ "error": "Method Not Allowed" })),
    )
}
