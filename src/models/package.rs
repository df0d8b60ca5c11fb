// Hosting package catalog model. Admin-only writes; read-only everywhere else.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::utils::round_cents;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostingPackage {
    pub name: String,
    /// Upfront price in USD.
    pub price: f64,
    /// Promised daily payout once an affiliate unlocks recurring income.
    pub daily_payout: f64,
    pub daily_price: f64,
    pub monthly_price: f64,
    /// Informational; the commission engine's per-channel table governs the
    /// actual math.
    pub commission_rate: f64,
    pub recurring_commission: bool,
    pub is_active: bool,
    pub sort_order: i64,
}

impl HostingPackage {
    pub const COLLECTION: &'static str = "packages";
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreatePackageRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    #[validate(range(min = 0.0, message = "Price must be non-negative"))]
    pub price: f64,

    #[validate(range(min = 0.0, message = "Daily payout must be non-negative"))]
    pub daily_payout: f64,

    pub daily_price: Option<f64>,
    pub monthly_price: Option<f64>,

    #[validate(range(min = 0.0, max = 100.0, message = "Commission rate must be 0-100"))]
    pub commission_rate: f64,

    #[serde(default)]
    pub recurring_commission: bool,

    #[serde(default = "default_active")]
    pub is_active: bool,

    #[serde(default)]
    pub sort_order: i64,
}

fn default_active() -> bool {
    true
}

impl CreatePackageRequest {
    /// Backfill derived pricing when the admin leaves it out: a monthly
    /// price equal to the upfront price, and a daily price of 1/30th.
    pub fn into_package(self) -> HostingPackage {
        let monthly_price = self.monthly_price.unwrap_or(self.price);
        let daily_price = self
            .daily_price
            .unwrap_or_else(|| round_cents(self.price / 30.0));

        HostingPackage {
            name: self.name,
            price: self.price,
            daily_payout: self.daily_payout,
            daily_price,
            monthly_price,
            commission_rate: self.commission_rate,
            recurring_commission: self.recurring_commission,
            is_active: self.is_active,
            sort_order: self.sort_order,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdatePackageRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,
    pub price: Option<f64>,
    pub daily_payout: Option<f64>,
    pub daily_price: Option<f64>,
    pub monthly_price: Option<f64>,
    pub commission_rate: Option<f64>,
    pub recurring_commission: Option<bool>,
    pub is_active: Option<bool>,
    pub sort_order: Option<i64>,
}

impl UpdatePackageRequest {
    /// Build the partial-update document, skipping absent fields.
    pub fn to_patch(&self) -> serde_json::Value {
        let mut patch = serde_json::Map::new();
        macro_rules! set {
            ($field:ident) => {
                if let Some(ref value) = self.$field {
                    patch.insert(
                        stringify!($field).to_string(),
                        serde_json::to_value(value).expect("primitive field"),
                    );
                }
            };
        }
        set!(name);
        set!(price);
        set!(daily_payout);
        set!(daily_price);
        set!(monthly_price);
        set!(commission_rate);
        set!(recurring_commission);
        set!(is_active);
        set!(sort_order);
        serde_json::Value::Object(patch)
    }
}
