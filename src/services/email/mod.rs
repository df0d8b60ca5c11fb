// Email Service Module - coordinates builders and sender

pub mod builders;
pub mod sender;
pub mod types;

use self::types::EmailBuilder;
use crate::app_config::EmailConfig;
use anyhow::Result;
use builders::{AffiliateApprovedEmailBuilder, PayoutProcessedEmailBuilder};
use handlebars::Handlebars;
use sender::EmailSender;
use std::sync::Arc;
use tracing::{info, instrument};

/// Transactional email service for affiliate notifications
#[derive(Clone)]
pub struct EmailService {
    sender: EmailSender,
    config: EmailConfig,
    templates: Arc<Handlebars<'static>>,
}

impl EmailService {
    pub fn new(config: EmailConfig) -> Result<Self> {
        let mut templates = Handlebars::new();
        Self::register_templates(&mut templates)?;

        let sender = EmailSender::new(config.api_url.clone(), config.api_key.clone());

        Ok(Self {
            sender,
            config,
            templates: Arc::new(templates),
        })
    }

    fn register_templates(templates: &mut Handlebars) -> Result<(), types::EmailError> {
        let payout_processed = include_str!("../../templates/email/payout_processed.html");
        templates
            .register_template_string("payout_processed", payout_processed)
            .map_err(|e| types::EmailError::TemplateError(e.to_string()))?;

        let affiliate_approved = include_str!("../../templates/email/affiliate_approved.html");
        templates
            .register_template_string("affiliate_approved", affiliate_approved)
            .map_err(|e| types::EmailError::TemplateError(e.to_string()))?;

        Ok(())
    }

    /// Notify an affiliate that their payout went out.
    #[instrument(skip(self))]
    pub async fn send_payout_processed(
        &self,
        to_email: &str,
        user_name: &str,
        amount: f64,
        paypal_email: &str,
    ) -> Result<(), types::EmailError> {
        info!("Sending payout notification to {}", to_email);

        let builder = PayoutProcessedEmailBuilder::new(
            to_email,
            user_name,
            amount,
            paypal_email,
            &self.config,
            &self.templates,
        );

        let message = builder.build()?;
        self.sender.send_with_retry(message).await
    }

    /// Notify an affiliate that their account was approved.
    #[instrument(skip(self))]
    pub async fn send_affiliate_approved(
        &self,
        to_email: &str,
        user_name: &str,
        referral_code: &str,
    ) -> Result<(), types::EmailError> {
        info!("Sending approval notification to {}", to_email);

        let builder = AffiliateApprovedEmailBuilder::new(
            to_email,
            user_name,
            referral_code,
            &self.config,
            &self.templates,
        );

        let message = builder.build()?;
        self.sender.send_with_retry(message).await
    }
}

// Re-export commonly used types for convenience
pub use types::{EmailError, EmailMessage};
