use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;

use crate::models::{Lead, LeadSubmission};

/// Sentinel for optional business fields left blank on the form.
pub const NOT_SPECIFIED: &str = "Not specified";

/// Site identifier recorded when the form does not send a source.
pub const DEFAULT_LEAD_SOURCE: &str = "edmonton-cars.ca";

/// Initial CRM pipeline stage for fresh submissions.
pub const DEFAULT_PIPELINE_STAGE: &str = "new";

/// Salutation fallback when a first name cannot be derived.
const FALLBACK_FIRST_NAME: &str = "there";

/// Identity assigned to a submission before normalization.
///
/// Generated once per request by the handler and passed in explicitly, so
/// normalization itself stays a pure function.
#[derive(Debug, Clone)]
pub struct LeadContext {
    pub lead_id: Uuid,
    pub submitted_at: DateTime<Utc>,
}

impl LeadContext {
    pub fn generate() -> Self {
        Self {
            lead_id: Uuid::new_v4(),
            submitted_at: Utc::now(),
        }
    }
}

/// Maps a validated submission to the canonical [`Lead`] record.
///
/// Alias priority is fixed: the canonical field name wins over its legacy
/// alias. Business fields degrade to "Not specified"; `notes` and the
/// consent flag are carried only when present. Deterministic given the same
/// submission and context.
pub fn normalize(submission: &LeadSubmission, context: &LeadContext) -> Lead {
    let full_name = first_non_empty(&[&submission.full_name, &submission.name])
        .unwrap_or_default();
    let email = first_non_empty(&[&submission.email, &submission.contact_email])
        .unwrap_or_default();

    Lead {
        lead_id: context.lead_id.to_string(),
        submitted_at: context
            .submitted_at
            .to_rfc3339_opts(SecondsFormat::Millis, true),
        first_name: derive_first_name(&full_name),
        full_name,
        email,
        vehicle_category: first_non_empty(&[&submission.vehicle_category, &submission.vehicle])
            .unwrap_or_else(|| NOT_SPECIFIED.to_string()),
        budget_range: first_non_empty(&[&submission.budget_range])
            .unwrap_or_else(|| NOT_SPECIFIED.to_string()),
        timeline: first_non_empty(&[&submission.timeline])
            .unwrap_or_else(|| NOT_SPECIFIED.to_string()),
        notes: first_non_empty(&[&submission.notes]),
        lead_source: first_non_empty(&[&submission.lead_source])
            .unwrap_or_else(|| DEFAULT_LEAD_SOURCE.to_string()),
        pipeline_stage: first_non_empty(&[&submission.pipeline_stage])
            .unwrap_or_else(|| DEFAULT_PIPELINE_STAGE.to_string()),
        opted_in: submission.opt_in,
    }
}

/// First alias whose trimmed value is non-empty, in priority order.
fn first_non_empty(aliases: &[&Option<String>]) -> Option<String> {
    aliases
        .iter()
        .filter_map(|alias| alias.as_deref())
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

/// First whitespace-delimited token of the full name, for salutations.
fn derive_first_name(full_name: &str) -> String {
    full_name
        .split_whitespace()
        .next()
        .unwrap_or(FALLBACK_FIRST_NAME)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission(json: serde_json::Value) -> LeadSubmission {
        serde_json::from_value(json).unwrap()
    }

    fn context() -> LeadContext {
        LeadContext::generate()
    }

    #[test]
    fn test_canonical_fields_pass_through_trimmed() {
        let sub = submission(serde_json::json!({
            "fullName": "  Alex Taylor ",
            "email": " alex@example.com ",
            "vehicleCategory": "SUV",
            "budgetRange": "30-40k",
            "timeline": "1 month"
        }));
        let lead = normalize(&sub, &context());

        assert_eq!(lead.full_name, "Alex Taylor");
        assert_eq!(lead.first_name, "Alex");
        assert_eq!(lead.email, "alex@example.com");
        assert_eq!(lead.vehicle_category, "SUV");
        assert_eq!(lead.budget_range, "30-40k");
        assert_eq!(lead.timeline, "1 month");
    }

    #[test]
    fn test_canonical_name_wins_over_alias() {
        let sub = submission(serde_json::json!({
            "fullName": "Alex Taylor",
            "name": "A. N. Other",
            "email": "alex@example.com",
            "contactEmail": "other@example.com",
            "vehicleCategory": "SUV",
            "vehicle": "Truck"
        }));
        let lead = normalize(&sub, &context());

        assert_eq!(lead.full_name, "Alex Taylor");
        assert_eq!(lead.email, "alex@example.com");
        assert_eq!(lead.vehicle_category, "SUV");
    }

    #[test]
    fn test_alias_fills_blank_canonical() {
        let sub = submission(serde_json::json!({
            "fullName": "  ",
            "name": "Alex Taylor",
            "contactEmail": "alex@example.com"
        }));
        let lead = normalize(&sub, &context());

        assert_eq!(lead.full_name, "Alex Taylor");
        assert_eq!(lead.email, "alex@example.com");
    }

    #[test]
    fn test_business_fields_default_to_not_specified() {
        let sub = submission(serde_json::json!({
            "fullName": "Alex Taylor",
            "email": "alex@example.com"
        }));
        let lead = normalize(&sub, &context());

        assert_eq!(lead.vehicle_category, NOT_SPECIFIED);
        assert_eq!(lead.budget_range, NOT_SPECIFIED);
        assert_eq!(lead.timeline, NOT_SPECIFIED);
        assert_eq!(lead.notes, None);
        assert_eq!(lead.opted_in, None);
        assert_eq!(lead.lead_source, DEFAULT_LEAD_SOURCE);
        assert_eq!(lead.pipeline_stage, DEFAULT_PIPELINE_STAGE);
    }

    #[test]
    fn test_first_name_fallback() {
        let sub = submission(serde_json::json!({
            "fullName": "",
            "name": "",
            "email": "alex@example.com"
        }));
        let lead = normalize(&sub, &context());

        // Validator would have rejected this, but normalization still
        // degrades instead of panicking.
        assert_eq!(lead.first_name, "there");
    }

    #[test]
    fn test_deterministic_given_same_context() {
        let sub = submission(serde_json::json!({
            "fullName": "Alex Taylor",
            "email": "alex@example.com",
            "optIn": true
        }));
        let ctx = context();

        let a = normalize(&sub, &ctx);
        let b = normalize(&sub, &ctx);
        assert_eq!(serde_json::to_value(&a).unwrap(), serde_json::to_value(&b).unwrap());
        assert_eq!(a.lead_id, ctx.lead_id.to_string());
        assert_eq!(a.opted_in, Some(true));
    }
}
