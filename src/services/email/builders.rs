// Email Builders - one per notification type

use super::types::{
    AffiliateApprovedEmailData, EmailBuilder, EmailError, EmailMessage, PayoutProcessedEmailData,
};
use crate::app_config::EmailConfig;
use crate::utils::format_usd;
use handlebars::Handlebars;

/// Builder for the "your payout was sent" notification
pub struct PayoutProcessedEmailBuilder<'a> {
    to_email: &'a str,
    user_name: &'a str,
    amount: f64,
    paypal_email: &'a str,
    config: &'a EmailConfig,
    templates: &'a Handlebars<'a>,
}

impl<'a> PayoutProcessedEmailBuilder<'a> {
    pub fn new(
        to_email: &'a str,
        user_name: &'a str,
        amount: f64,
        paypal_email: &'a str,
        config: &'a EmailConfig,
        templates: &'a Handlebars<'a>,
    ) -> Self {
        Self {
            to_email,
            user_name,
            amount,
            paypal_email,
            config,
            templates,
        }
    }
}

impl<'a> EmailBuilder for PayoutProcessedEmailBuilder<'a> {
    fn build(&self) -> Result<EmailMessage, EmailError> {
        let data = PayoutProcessedEmailData {
            user_name: self.user_name.to_string(),
            amount: format_usd(self.amount),
            paypal_email: self.paypal_email.to_string(),
            app_name: self.config.from_name.clone(),
            dashboard_url: self.config.dashboard_url.clone(),
        };

        let html = self
            .templates
            .render("payout_processed", &data)
            .map_err(|e| EmailError::TemplateError(e.to_string()))?;

        let text = format!(
            "Hi {},\n\n\
            Your payout of {} has been sent to {}.\n\n\
            You can review your payout history any time at {}.\n\n\
            The {} Team",
            self.user_name, data.amount, self.paypal_email, self.config.dashboard_url,
            self.config.from_name
        );

        Ok(EmailMessage::new(
            format!("{} <{}>", self.config.from_name, self.config.from_email),
            vec![self.to_email.to_string()],
            format!("Your {} payout of {} is on its way", self.config.from_name, data.amount),
            html,
        )
        .with_text(text))
    }
}

/// Builder for the "your affiliate account was approved" notification
pub struct AffiliateApprovedEmailBuilder<'a> {
    to_email: &'a str,
    user_name: &'a str,
    referral_code: &'a str,
    config: &'a EmailConfig,
    templates: &'a Handlebars<'a>,
}

impl<'a> AffiliateApprovedEmailBuilder<'a> {
    pub fn new(
        to_email: &'a str,
        user_name: &'a str,
        referral_code: &'a str,
        config: &'a EmailConfig,
        templates: &'a Handlebars<'a>,
    ) -> Self {
        Self {
            to_email,
            user_name,
            referral_code,
            config,
            templates,
        }
    }
}

impl<'a> EmailBuilder for AffiliateApprovedEmailBuilder<'a> {
    fn build(&self) -> Result<EmailMessage, EmailError> {
        let data = AffiliateApprovedEmailData {
            user_name: self.user_name.to_string(),
            referral_code: self.referral_code.to_string(),
            app_name: self.config.from_name.clone(),
            dashboard_url: self.config.dashboard_url.clone(),
        };

        let html = self
            .templates
            .render("affiliate_approved", &data)
            .map_err(|e| EmailError::TemplateError(e.to_string()))?;

        let text = format!(
            "Hi {},\n\n\
            Your {} affiliate account has been approved. Your referral code is {}.\n\n\
            Start sharing it today: {}\n\n\
            The {} Team",
            self.user_name,
            self.config.from_name,
            self.referral_code,
            self.config.dashboard_url,
            self.config.from_name
        );

        Ok(EmailMessage::new(
            format!("{} <{}>", self.config.from_name, self.config.from_email),
            vec![self.to_email.to_string()],
            format!("Your {} affiliate account is live", self.config.from_name),
            html,
        )
        .with_text(text))
    }
}
