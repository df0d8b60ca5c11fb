// Utility modules for Hostly Backend

pub mod money;
pub mod service_error;

pub use money::{format_usd, round_cents};
pub use service_error::{ServiceError, ServiceResult};
