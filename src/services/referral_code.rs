// Referral code generation.
//
// Eight characters from an unambiguous uppercase alphabet, checked for
// uniqueness against the affiliate collection with a bounded retry loop.

use std::sync::Arc;

use rand::{thread_rng, Rng};
use serde_json::json;

use crate::{
    models::Affiliate,
    store::EntityStore,
    utils::{ServiceError, ServiceResult},
};

const CODE_LENGTH: usize = 8;
// 0/O and 1/I/L are excluded; codes end up on printed flyers.
const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";
const MAX_GENERATION_ATTEMPTS: u32 = 10;

pub struct ReferralCodeGenerator {
    store: Arc<dyn EntityStore>,
}

impl ReferralCodeGenerator {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    pub fn generate_random_code() -> String {
        let mut rng = thread_rng();
        (0..CODE_LENGTH)
            .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
            .collect()
    }

    pub async fn is_code_unique(&self, code: &str) -> ServiceResult<bool> {
        let existing = self
            .store
            .filter(
                Affiliate::COLLECTION,
                json!({ "referral_code": code }),
                None,
                Some(1),
            )
            .await?;
        Ok(existing.is_empty())
    }

    /// Generate a code no other affiliate holds.
    pub async fn generate_unique(&self) -> ServiceResult<String> {
        for _ in 0..MAX_GENERATION_ATTEMPTS {
            let code = Self::generate_random_code();
            if self.is_code_unique(&code).await? {
                return Ok(code);
            }
        }
        Err(ServiceError::InternalError)
    }
}
