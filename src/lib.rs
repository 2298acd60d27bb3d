//! Lead intake API for the Edmonton Cars concierge site.
//!
//! Backs the marketing site's lead-capture form and comparison table:
//! submissions are validated, normalized into a canonical lead record,
//! forwarded best-effort to a CRM webhook, and acknowledged over
//! transactional email; a read-only vehicle catalog parsed from an
//! embedded CSV dataset serves the comparison table.
//!
//! # Modules
//!
//! - `catalog`: vehicle dataset parsing and lookups.
//! - `config`: environment-driven configuration.
//! - `crm_client`: best-effort CRM webhook forwarder.
//! - `errors`: error handling types.
//! - `handlers`: shared state, health and catalog handlers.
//! - `lead_handler`: lead intake orchestration.
//! - `mailer`: notification email rendering and delivery.
//! - `models`: lead data models and delivery outcomes.
//! - `normalize`: payload normalization.
//! - `validation`: payload validation.

pub mod catalog;
pub mod config;
pub mod crm_client;
pub mod errors;
pub mod handlers;
pub mod lead_handler;
pub mod mailer;
pub mod models;
pub mod normalize;
pub mod validation;
