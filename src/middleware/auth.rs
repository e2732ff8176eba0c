use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, AppResult},
    models::{Collection, Role},
    store::{Filter, Store},
};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Claims {
    pub email: String,
    pub iat: usize,
    pub exp: usize,
}

/// Identity decoded from a verified bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub email: String,
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Populated by the access policy layer; a handler mounted without one has no identity.
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or(AppError::MissingCredential)
    }
}

/// Issues and verifies the HS256 tokens handed out at login.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, ttl_days: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::days(ttl_days),
        }
    }

    pub fn issue(&self, email: &str) -> AppResult<String> {
        let now = Utc::now();
        let expiration = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

        let claims = Claims {
            email: email.to_string(),
            iat: now.timestamp() as usize,
            exp: expiration.timestamp() as usize,
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
    }

    pub fn verify(&self, token: &str) -> AppResult<Claims> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|err| {
                tracing::debug!(error = %err, "token rejected");
                AppError::InvalidCredential
            })
    }

    /// No header is a missing credential; anything unusable after that is invalid.
    pub fn authenticate(&self, headers: &HeaderMap) -> AppResult<AuthUser> {
        let auth_header = headers
            .get(header::AUTHORIZATION)
            .ok_or(AppError::MissingCredential)?;

        let token = auth_header
            .to_str()
            .ok()
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .ok_or(AppError::InvalidCredential)?;

        let claims = self.verify(token)?;
        Ok(AuthUser {
            email: claims.email,
        })
    }
}

/// Capability to read the persisted role of an identity.
#[async_trait]
pub trait RoleLookup: Send + Sync {
    async fn role_of(&self, email: &str) -> AppResult<Option<Role>>;
}

#[async_trait]
impl<S> RoleLookup for S
where
    S: Store + ?Sized,
{
    async fn role_of(&self, email: &str) -> AppResult<Option<Role>> {
        let user = self
            .find_one(Collection::Users, &Filter::email(email))
            .await?;
        Ok(user.as_ref().map(Role::of))
    }
}

/// Role gate. Reads the role from storage on every call so changes apply immediately.
#[derive(Clone)]
pub struct Authorizer {
    roles: Arc<dyn RoleLookup>,
}

impl Authorizer {
    pub fn new(roles: Arc<dyn RoleLookup>) -> Self {
        Self { roles }
    }

    pub async fn has_role(&self, email: &str, role: Role) -> AppResult<bool> {
        Ok(self.roles.role_of(email).await? == Some(role))
    }

    pub async fn require_role(&self, user: &AuthUser, role: Role) -> AppResult<()> {
        if !self.has_role(&user.email, role).await? {
            tracing::debug!(email = %user.email, required = role.as_str(), "role check failed");
            return Err(AppError::AccessDenied);
        }
        Ok(())
    }
}

pub fn ensure_self(user: &AuthUser, email: &str) -> Result<(), AppError> {
    if user.email != email {
        tracing::debug!(token_email = %user.email, path_email = %email, "ownership check failed");
        return Err(AppError::AccessDenied);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, Update, into_document};
    use axum::http::HeaderValue;
    use serde_json::json;

    #[test]
    fn issued_token_verifies_with_same_secret() {
        let tokens = TokenService::new("secret", 10);
        let token = tokens.issue("rider@moto.dev").unwrap();

        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.email, "rider@moto.dev");
        assert_eq!(claims.exp - claims.iat, 10 * 24 * 60 * 60);
    }

    #[test]
    fn token_from_other_secret_is_invalid() {
        let token = TokenService::new("one", 10).issue("rider@moto.dev").unwrap();
        let err = TokenService::new("two", 10).verify(&token).unwrap_err();
        assert!(matches!(err, AppError::InvalidCredential));
    }

    #[test]
    fn authenticate_distinguishes_missing_from_invalid() {
        let tokens = TokenService::new("secret", 10);

        let err = tokens.authenticate(&HeaderMap::new()).unwrap_err();
        assert!(matches!(err, AppError::MissingCredential));

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Token abc"));
        let err = tokens.authenticate(&headers).unwrap_err();
        assert!(matches!(err, AppError::InvalidCredential));

        let token = tokens.issue("rider@moto.dev").unwrap();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        );
        let user = tokens.authenticate(&headers).unwrap();
        assert_eq!(user.email, "rider@moto.dev");
    }

    #[tokio::test]
    async fn authorizer_reads_role_from_store() {
        let store = Arc::new(MemoryStore::new());
        store
            .update_one(
                Collection::Users,
                &Filter::email("boss@moto.dev"),
                Update::set(into_document(json!({ "role": "admin" }))),
                true,
            )
            .await
            .unwrap();
        let authorizer = Authorizer::new(store.clone());

        let boss = AuthUser {
            email: "boss@moto.dev".into(),
        };
        let stranger = AuthUser {
            email: "nobody@moto.dev".into(),
        };
        assert!(authorizer.require_role(&boss, Role::Admin).await.is_ok());
        assert!(matches!(
            authorizer.require_role(&stranger, Role::Admin).await,
            Err(AppError::AccessDenied)
        ));
    }

    #[test]
    fn ensure_self_rejects_other_identity() {
        let user = AuthUser {
            email: "a@moto.dev".into(),
        };
        assert!(ensure_self(&user, "a@moto.dev").is_ok());
        assert!(matches!(
            ensure_self(&user, "b@moto.dev"),
            Err(AppError::AccessDenied)
        ));
    }
}
