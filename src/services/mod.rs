// Services module for Hostly Backend
// Business logic layer for the application

pub mod balance;
pub mod cloudflare;
pub mod commission;
pub mod email;
pub mod opensrs;
pub mod payout;
pub mod paypal;
pub mod referral_code;

// Re-export commonly used services
pub use balance::adjust_balance;
pub use cloudflare::{CloudflareClient, DnsProvider};
pub use commission::{
    commission_rate, compute_commission, AttributedSale, CommissionEngine, SaleEvent,
};
pub use email::{EmailError, EmailService};
pub use opensrs::{DomainRegistrar, OpenSrsClient};
pub use payout::{PayoutService, SweepReport};
pub use paypal::{GatewayCapture, GatewayOrder, PayPalClient, PaymentGateway};
pub use referral_code::ReferralCodeGenerator;
