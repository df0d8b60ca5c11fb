pub mod affiliate;
pub mod domain;
pub mod lead;
pub mod package;
pub mod payout;
pub mod referral;

// Re-export common types
pub use affiliate::{
    Affiliate, AffiliateStatus, AffiliateTier, SignupRequest, TestPurchaseRequest,
    UpdateAffiliateStatusRequest,
};
pub use domain::{CreateDnsRecordRequest, Domain, DomainStatus, RegisterDomainRequest};
pub use lead::Lead;
pub use package::{CreatePackageRequest, HostingPackage, UpdatePackageRequest};
pub use payout::{
    Payout, PayoutAction, PayoutSource, PayoutStatus, ProcessPayoutRequest, RequestPayoutRequest,
    MIN_PAYOUT_AMOUNT,
};
pub use referral::{
    PayoutRecipient, Referral, ReferralStatus, SaleChannel, UpdateReferralStatusRequest,
    HOUSE_SENTINEL,
};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::store::{Document, StoreError};

/// A typed entity together with its store envelope. Flattened on the wire so
/// API responses read `{id, created_at, updated_at, ...fields}`.
#[derive(Debug, Clone, Serialize)]
pub struct Stored<T> {
    pub id: String,
    #[serde(skip)]
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub entity: T,
}

impl<T: serde::de::DeserializeOwned> Stored<T> {
    pub fn from_document(doc: &Document) -> Result<Self, StoreError> {
        Ok(Self {
            id: doc.id.clone(),
            version: doc.version,
            created_at: doc.created_at,
            updated_at: doc.updated_at,
            entity: doc.parse()?,
        })
    }

    pub fn from_documents(docs: &[Document]) -> Result<Vec<Self>, StoreError> {
        docs.iter().map(Self::from_document).collect()
    }
}
