// Authenticated-user collaborator.
//
// Authentication mechanics live outside this service: a bearer token is
// resolved to a `CurrentUser` through the `AuthProvider` seam, and every
// core operation receives the caller's identity as an explicit argument.

use std::collections::HashMap;

use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts, RequestPartsExt};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use serde::{Deserialize, Serialize};

use crate::{app::AppState, utils::ServiceError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    pub email: String,
    pub full_name: String,
    pub role: Role,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn require_admin(&self) -> Result<(), ServiceError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(ServiceError::Forbidden("Admin access required".to_string()))
        }
    }
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Resolve a bearer token to a user, or `None` for an unknown token.
    async fn resolve(&self, token: &str) -> Option<CurrentUser>;
}

/// Token-table provider: a fixed mapping from bearer tokens to users.
/// Production deployments sit behind the platform's identity service; this
/// covers local runs (an admin token from the environment) and tests.
#[derive(Default)]
pub struct StaticAuthProvider {
    tokens: HashMap<String, CurrentUser>,
}

impl StaticAuthProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, token: &str, user: CurrentUser) -> Self {
        self.tokens.insert(token.to_string(), user);
        self
    }

    /// Build from `ADMIN_API_TOKEN` when set.
    pub fn from_env() -> Self {
        let mut provider = Self::new();
        if let Ok(token) = std::env::var("ADMIN_API_TOKEN") {
            if !token.is_empty() {
                provider = provider.with_user(
                    &token,
                    CurrentUser {
                        email: "ops@hostly.sh".to_string(),
                        full_name: "Hostly Operations".to_string(),
                        role: Role::Admin,
                    },
                );
            }
        }
        provider
    }
}

#[async_trait]
impl AuthProvider for StaticAuthProvider {
    async fn resolve(&self, token: &str) -> Option<CurrentUser> {
        self.tokens.get(token).cloned()
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ServiceError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| ServiceError::Unauthorized)?;

        state
            .auth
            .resolve(bearer.token())
            .await
            .ok_or(ServiceError::Unauthorized)
    }
}
