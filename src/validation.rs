use crate::models::LeadSubmission;

/// Structured validation result. Validation never panics and never returns
/// an `Err`; an invalid payload is an expected request-level condition.
#[derive(Debug, Clone, PartialEq)]
pub enum Validation {
    Valid,
    Invalid(String),
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        matches!(self, Validation::Valid)
    }
}

/// Checks that the mandatory identity fields are present.
///
/// A logical field is satisfied when at least one of its aliases is a
/// non-empty string after trimming. The rejection message enumerates the
/// missing logical field names so the form can point at them.
///
/// Consent: a submission that explicitly declines (`optIn: false`) is
/// rejected with its own message, distinct from missing fields. An absent
/// flag is tolerated; the form only sends it when the checkbox is rendered.
pub fn validate_submission(submission: &LeadSubmission) -> Validation {
    let mut missing = Vec::new();

    if !any_present(&[&submission.full_name, &submission.name]) {
        missing.push("fullName");
    }
    if !any_present(&[&submission.email, &submission.contact_email]) {
        missing.push("email");
    }

    if !missing.is_empty() {
        return Validation::Invalid(format!("Missing required fields: {}", missing.join(", ")));
    }

    if submission.opt_in == Some(false) {
        return Validation::Invalid(
            "Consent (optIn) is required to deliver the concierge plan.".to_string(),
        );
    }

    Validation::Valid
}

fn any_present(aliases: &[&Option<String>]) -> bool {
    aliases
        .iter()
        .any(|alias| alias.as_deref().is_some_and(|s| !s.trim().is_empty()))
}
