use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use serde_json::json;

use crate::config::Config;
use crate::errors::AppError;
use crate::models::{DeliveryOutcome, EmailOutcomes, Lead};

const SMTP_RELAY: &str = "smtp.gmail.com";

/// Best-effort dispatcher for the two transactional emails per lead:
/// an internal notification to the concierge inbox and an acknowledgment
/// to the lead. Transport is chosen once from configuration: the hosted
/// email API when a key is present, SMTP submission otherwise. With
/// neither configured, both messages are skipped.
#[derive(Clone)]
pub struct NotificationDispatcher {
    client: reqwest::Client,
    transport: Transport,
    inbox: String,
}

#[derive(Clone)]
enum Transport {
    /// Resend-compatible HTTP email API.
    Api {
        api_key: String,
        base_url: String,
        from: String,
    },
    /// App-password SMTP submission; the account doubles as the sender.
    Smtp {
        account: String,
        mailer: AsyncSmtpTransport<Tokio1Executor>,
    },
    Unconfigured,
}

/// One rendered message, addressed and ready for either transport.
struct Envelope {
    to: String,
    reply_to: String,
    subject: String,
    html: String,
}

impl NotificationDispatcher {
    pub fn new(config: &Config) -> Self {
        let transport = if let Some(ref api_key) = config.resend_api_key {
            Transport::Api {
                api_key: api_key.clone(),
                base_url: config.email_api_base_url.trim_end_matches('/').to_string(),
                from: config.resend_from_email.clone(),
            }
        } else if let (Some(account), Some(password)) =
            (config.smtp_account.clone(), config.smtp_password.clone())
        {
            match AsyncSmtpTransport::<Tokio1Executor>::relay(SMTP_RELAY) {
                Ok(builder) => Transport::Smtp {
                    mailer: builder
                        .credentials(Credentials::new(account.clone(), password))
                        .build(),
                    account,
                },
                Err(e) => {
                    tracing::error!("Failed to build SMTP transport: {}", e);
                    Transport::Unconfigured
                }
            }
        } else {
            Transport::Unconfigured
        };

        Self {
            client: reqwest::Client::new(),
            transport,
            inbox: config.concierge_inbox.clone(),
        }
    }

    /// Sends the internal notification, then the customer acknowledgment.
    ///
    /// Messages go out sequentially and each yields its own outcome; a
    /// failed send is reported, never propagated. Without a configured
    /// provider both outcomes are `skipped` and no network call is made.
    pub async fn dispatch(&self, lead: &Lead) -> EmailOutcomes {
        if matches!(self.transport, Transport::Unconfigured) {
            tracing::info!(
                lead_id = %lead.lead_id,
                "No email provider configured; skipping transactional email"
            );
            return EmailOutcomes {
                internal: DeliveryOutcome::Skipped,
                acknowledgment: DeliveryOutcome::Skipped,
            };
        }

        let internal = self
            .send(Envelope {
                to: self.inbox.clone(),
                reply_to: lead.email.clone(),
                subject: format!("New concierge lead: {}", lead.full_name),
                html: render_internal(lead),
            })
            .await;

        let acknowledgment = self
            .send(Envelope {
                to: lead.email.clone(),
                reply_to: self.inbox.clone(),
                subject: "Your Edmonton Concierge Vehicle Plan".to_string(),
                html: render_acknowledgment(lead),
            })
            .await;

        EmailOutcomes {
            internal: outcome_for(lead, "internal notification", internal),
            acknowledgment: outcome_for(lead, "acknowledgment", acknowledgment),
        }
    }

    async fn send(&self, envelope: Envelope) -> Result<(), AppError> {
        match &self.transport {
            Transport::Api {
                api_key,
                base_url,
                from,
            } => self.send_via_api(api_key, base_url, from, &envelope).await,
            Transport::Smtp { account, mailer } => {
                send_via_smtp(mailer, account, &envelope).await
            }
            Transport::Unconfigured => Ok(()),
        }
    }

    async fn send_via_api(
        &self,
        api_key: &str,
        base_url: &str,
        from: &str,
        envelope: &Envelope,
    ) -> Result<(), AppError> {
        let body = json!({
            "from": from,
            "to": envelope.to,
            "reply_to": envelope.reply_to,
            "subject": envelope.subject,
            "html": envelope.html,
        });

        let response = self
            .client
            .post(format!("{}/emails", base_url))
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::ExternalApiError(format!("Email API request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::ExternalApiError(format!(
                "Email API failure: {} {}",
                status.as_u16(),
                error_text
            )));
        }

        Ok(())
    }
}

async fn send_via_smtp(
    mailer: &AsyncSmtpTransport<Tokio1Executor>,
    account: &str,
    envelope: &Envelope,
) -> Result<(), AppError> {
    let message = build_smtp_message(account, envelope)?;

    mailer
        .send(message)
        .await
        .map_err(|e| AppError::ExternalApiError(format!("SMTP send failed: {}", e)))?;

    Ok(())
}

fn build_smtp_message(account: &str, envelope: &Envelope) -> Result<Message, AppError> {
    let parse = |addr: &str| {
        addr.parse()
            .map_err(|e| AppError::ExternalApiError(format!("Invalid email address {}: {}", addr, e)))
    };

    Message::builder()
        .from(parse(account)?)
        .to(parse(&envelope.to)?)
        .reply_to(parse(&envelope.reply_to)?)
        .subject(&envelope.subject)
        .header(ContentType::TEXT_HTML)
        .body(envelope.html.clone())
        .map_err(|e| AppError::ExternalApiError(format!("Failed to build message: {}", e)))
}

fn outcome_for(lead: &Lead, label: &str, result: Result<(), AppError>) -> DeliveryOutcome {
    match result {
        Ok(()) => {
            tracing::info!(lead_id = %lead.lead_id, "Sent {}", label);
            DeliveryOutcome::Sent
        }
        Err(e) => {
            tracing::error!(lead_id = %lead.lead_id, "Failed to send {}: {}", label, e);
            DeliveryOutcome::Failed {
                error: e.to_string(),
            }
        }
    }
}

/// Internal notification listing every lead field, addressed to the
/// operator with reply-to pointed at the lead.
fn render_internal(lead: &Lead) -> String {
    let notes = lead.notes.as_deref().unwrap_or("—");
    let consent = match lead.opted_in {
        Some(true) => "yes",
        Some(false) => "no",
        None => "not recorded",
    };

    format!(
        r#"<div style="font-family: Inter, Arial, sans-serif; color: #0f172a;">
  <h2 style="margin-bottom: 12px;">New concierge lead</h2>
  <ul>
    <li><strong>Name:</strong> {full_name}</li>
    <li><strong>Email:</strong> {email}</li>
    <li><strong>Vehicle focus:</strong> {vehicle}</li>
    <li><strong>Budget band:</strong> {budget}</li>
    <li><strong>Timeline:</strong> {timeline}</li>
    <li><strong>Notes:</strong> {notes}</li>
    <li><strong>Consent:</strong> {consent}</li>
    <li><strong>Source:</strong> {source}</li>
    <li><strong>Stage:</strong> {stage}</li>
  </ul>
  <p style="font-size: 12px; color: #64748b;">Submitted: {submitted_at}<br/>Lead ID: {lead_id}</p>
</div>"#,
        full_name = lead.full_name,
        email = lead.email,
        vehicle = lead.vehicle_category,
        budget = lead.budget_range,
        timeline = lead.timeline,
        notes = notes,
        consent = consent,
        source = lead.lead_source,
        stage = lead.pipeline_stage,
        submitted_at = lead.submitted_at,
        lead_id = lead.lead_id,
    )
}

/// Customer acknowledgment with the vehicle/budget/timeline callouts and
/// the lead id for traceability.
fn render_acknowledgment(lead: &Lead) -> String {
    format!(
        r#"<div style="font-family: Inter, Arial, sans-serif; color: #0f172a;">
  <h2 style="margin-bottom: 12px;">Your Concierge Vehicle Plan Is In Motion</h2>
  <p>Hi {first_name},</p>
  <p>Thanks for sharing what you're looking for. Our Edmonton concierge team is already curating vehicles that match:</p>
  <ul>
    <li><strong>Vehicle focus:</strong> {vehicle}</li>
    <li><strong>Budget band:</strong> {budget}</li>
    <li><strong>Timeline:</strong> {timeline}</li>
  </ul>
  <p>Expect your personalized shortlist in the next few minutes. Want to accelerate things? Reply to this email with any trade-in details or must-have features.</p>
  <p style="margin-top: 18px;">Best,<br/>Edmonton Cars Concierge Team</p>
  <hr style="margin: 28px 0; border: none; border-top: 1px solid #e2e8f0;" />
  <p style="font-size: 12px; color: #64748b;">Consent timestamp: {submitted_at}<br/>Lead ID: {lead_id}</p>
</div>"#,
        first_name = lead.first_name,
        vehicle = lead.vehicle_category,
        budget = lead.budget_range,
        timeline = lead.timeline,
        submitted_at = lead.submitted_at,
        lead_id = lead.lead_id,
    )
}
