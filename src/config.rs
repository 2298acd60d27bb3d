/// Default sender when RESEND_FROM_EMAIL is not set.
pub const DEFAULT_FROM_EMAIL: &str = "concierge@edmonton-cars.ca";

/// Operator inbox for internal lead notifications.
pub const DEFAULT_CONCIERGE_INBOX: &str = "leads@edmonton-cars.ca";

/// Default Resend-compatible email API endpoint.
pub const DEFAULT_EMAIL_API_BASE_URL: &str = "https://api.resend.com";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// CRM webhook target. When absent, leads are logged for manual follow-up.
    pub crm_webhook_url: Option<String>,
    /// Optional bearer token for the CRM webhook.
    pub crm_webhook_token: Option<String>,
    /// Hosted email API key. When absent, SMTP is tried next.
    pub resend_api_key: Option<String>,
    pub resend_from_email: String,
    /// Base URL of the email API, overridable for tests.
    pub email_api_base_url: String,
    /// SMTP account address (app-password based submission).
    pub smtp_account: Option<String>,
    pub smtp_password: Option<String>,
    /// Operator inbox receiving the internal notification.
    pub concierge_inbox: String,
}

impl Config {
    /// Loads configuration from the environment once at startup.
    ///
    /// Every lead-pipeline setting is optional: a missing CRM or email
    /// credential downgrades the corresponding delivery to a logged/skipped
    /// outcome instead of failing requests.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            crm_webhook_url: optional_env("CRM_WEBHOOK_URL")
                .map(|url| {
                    if !url.starts_with("http://") && !url.starts_with("https://") {
                        anyhow::bail!("CRM_WEBHOOK_URL must start with http:// or https://");
                    }
                    Ok(url)
                })
                .transpose()?,
            crm_webhook_token: optional_env("CRM_WEBHOOK_TOKEN"),
            resend_api_key: optional_env("RESEND_API_KEY"),
            resend_from_email: optional_env("RESEND_FROM_EMAIL")
                .unwrap_or_else(|| DEFAULT_FROM_EMAIL.to_string()),
            email_api_base_url: optional_env("EMAIL_API_BASE_URL")
                .unwrap_or_else(|| DEFAULT_EMAIL_API_BASE_URL.to_string()),
            smtp_account: optional_env("SMTP_ACCOUNT"),
            // App passwords are often pasted with spaces; strip all whitespace.
            smtp_password: optional_env("SMTP_PASSWORD")
                .map(|p| p.chars().filter(|c| !c.is_whitespace()).collect()),
            concierge_inbox: optional_env("CONCIERGE_INBOX")
                .unwrap_or_else(|| DEFAULT_CONCIERGE_INBOX.to_string()),
        };

        // Log the delivery posture at startup (without sensitive values)
        tracing::info!("Configuration loaded successfully");
        match config.crm_webhook_url {
            Some(ref url) => tracing::info!("CRM webhook configured: {}", url),
            None => tracing::warn!("CRM webhook not configured; leads will be logged only"),
        }
        if config.resend_api_key.is_some() {
            tracing::info!("Email API configured (from: {})", config.resend_from_email);
        } else if config.smtp_account.is_some() {
            tracing::info!("SMTP submission configured");
        } else {
            tracing::warn!("No email provider configured; notifications will be skipped");
        }
        tracing::debug!("Server port: {}", config.port);

        Ok(config)
    }
}

/// Reads an environment variable, treating blank values as absent.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|s| !s.trim().is_empty())
}
