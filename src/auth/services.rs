//! Account linking, actor resolution and session tokens

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use super::extractors::Session;
use super::models::{Claims, OpenIdClaims, User, UserRole};
use crate::common::{generate_session_id, safe_email_log, ApiError, AppConfig};
use crate::storage::{Store, UnitOfWork};

pub const GOOGLE_PROVIDER: &str = "google";

const GOOGLE_TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";

/// Resolves the session's user inside an open unit of work.
///
/// Sessions for unknown or non-active users resolve to no actor at all.
pub async fn load_actor(uow: &mut UnitOfWork, session: &Session) -> Result<Option<User>, ApiError> {
    let Some(user_id) = session.user_id() else {
        return Ok(None);
    };

    match uow.get_user_for_id(user_id).await? {
        Some(user) if user.is_active() => Ok(Some(user)),
        Some(user) => {
            warn!(user_id = %user.id, status = ?user.status, "Session belongs to an inactive user");
            Ok(None)
        }
        None => {
            warn!(user_id = %user_id, "Session belongs to an unknown user");
            Ok(None)
        }
    }
}

pub fn issue_session_token(config: &AppConfig, user_id: &str) -> Result<String, ApiError> {
    let expiration = Utc::now() + Duration::hours(config.session_ttl_hours);
    let claims = Claims {
        sub: user_id.to_string(),
        exp: expiration.timestamp() as usize,
        jti: generate_session_id(),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| {
        error!(error = %e, user_id = %user_id, "Failed to sign session token");
        ApiError::InternalServer("failed to create session".to_string())
    })
}

pub fn decode_session_token(
    token: &str,
    jwt_secret: &str,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map(|data| data.claims)
}

/// Verifies a Google ID token with the tokeninfo endpoint
pub async fn verify_google_id_token(
    http: &reqwest::Client,
    client_id: Option<&str>,
    id_token: &str,
) -> Result<OpenIdClaims, ApiError> {
    debug!("Initiating Google token validation with tokeninfo endpoint");

    let response = http
        .get(GOOGLE_TOKENINFO_URL)
        .query(&[("id_token", id_token)])
        .send()
        .await
        .map_err(|e| {
            error!(error = %e, "HTTP error contacting Google tokeninfo endpoint");
            ApiError::InternalServer("google token validation service unavailable".to_string())
        })?;

    let status = response.status();
    if !status.is_success() {
        warn!(http_status = %status, "Google tokeninfo rejected the token");
        return Err(ApiError::Unauthenticated(
            "invalid or expired id_token".to_string(),
        ));
    }

    let body = response.json::<Value>().await.map_err(|e| {
        error!(error = %e, "Failed to parse Google tokeninfo JSON response");
        ApiError::BadRequest("malformed id_token".to_string())
    })?;

    claims_from_tokeninfo(&body, client_id, Utc::now().timestamp())
}

/// Extracts OpenID claims from a tokeninfo response, checking expiry and
/// audience
pub fn claims_from_tokeninfo(
    body: &Value,
    client_id: Option<&str>,
    now: i64,
) -> Result<OpenIdClaims, ApiError> {
    let text = |key: &str| body.get(key).and_then(|v| v.as_str()).map(str::to_string);

    let (Some(sub), Some(email)) = (text("sub"), text("email")) else {
        warn!("Google token missing required fields (email/sub)");
        return Err(ApiError::BadRequest(
            "token missing required fields".to_string(),
        ));
    };

    // tokeninfo encodes numbers and booleans as strings
    let exp = body.get("exp").and_then(|v| {
        v.as_i64()
            .or_else(|| v.as_str().and_then(|s| s.parse::<i64>().ok()))
    });
    if let Some(exp) = exp {
        if exp < now {
            warn!(token_exp = exp, current_time = now, "Google token has expired");
            return Err(ApiError::Unauthenticated("token has expired".to_string()));
        }
    }

    if let Some(client_id) = client_id {
        if text("aud").as_deref() != Some(client_id) {
            warn!(expected_client_id = %client_id, "Google token audience validation failed");
            return Err(ApiError::Unauthenticated(
                "token audience mismatch".to_string(),
            ));
        }
    }

    let email_verified = body
        .get("email_verified")
        .map(|v| v.as_bool().unwrap_or_else(|| v.as_str() == Some("true")))
        .unwrap_or(false);

    let name = text("name").unwrap_or_else(|| email.clone());

    Ok(OpenIdClaims {
        sub,
        email,
        name,
        email_verified,
    })
}

pub struct AccountService {
    store: Store,
    config: AppConfig,
}

impl AccountService {
    pub fn new(store: Store, config: AppConfig) -> Self {
        Self { store, config }
    }

    /// Stores verified claims and returns the linked user, creating the user
    /// (with this account as primary) on first login.
    pub async fn save_account(&self, provider: &str, claims: &OpenIdClaims) -> Result<User, ApiError> {
        let mut uow = self.store.begin().await?;

        uow.save_openid_account(provider, claims).await?;

        let user_id = match uow.get_linked_user_id(provider, &claims.sub).await? {
            Some(user_id) => user_id,
            None => {
                let user_id = uow.create_user().await?;
                uow.link_openid_account(provider, &claims.sub, &user_id, true)
                    .await?;
                info!(
                    user_id = %user_id,
                    email = %safe_email_log(&claims.email),
                    provider,
                    "Created user for new account"
                );
                user_id
            }
        };

        self.grant_configured_roles(&mut uow, &user_id, claims).await?;

        let user = uow
            .get_user_for_id(&user_id)
            .await?
            .ok_or_else(|| ApiError::InternalServer("linked user vanished".to_string()))?;

        uow.commit().await?;
        Ok(user)
    }

    /// Links another external account to the session's user
    pub async fn link_account(
        &self,
        session: &Session,
        provider: &str,
        claims: &OpenIdClaims,
    ) -> Result<User, ApiError> {
        let mut uow = self.store.begin().await?;
        let actor = load_actor(&mut uow, session)
            .await?
            .ok_or_else(ApiError::unauthenticated)?;

        uow.save_openid_account(provider, claims).await?;

        match uow.get_linked_user_id(provider, &claims.sub).await? {
            Some(linked) if linked == actor.id => {
                debug!(user_id = %actor.id, provider, "Account already linked");
            }
            Some(_) => {
                warn!(user_id = %actor.id, provider, "Account is linked to another user");
                return Err(ApiError::Conflict(
                    "account is already linked to another user".to_string(),
                ));
            }
            None => {
                uow.link_openid_account(provider, &claims.sub, &actor.id, false)
                    .await?;
                info!(user_id = %actor.id, provider, "Linked account");
            }
        }

        self.grant_configured_roles(&mut uow, &actor.id, claims).await?;

        let user = uow
            .get_user_for_id(&actor.id)
            .await?
            .ok_or_else(|| ApiError::InternalServer("linked user vanished".to_string()))?;

        uow.commit().await?;
        Ok(user)
    }

    pub async fn get_linked_user(
        &self,
        provider: &str,
        account_id: &str,
    ) -> Result<Option<String>, ApiError> {
        let mut uow = self.store.begin().await?;
        let user_id = uow.get_linked_user_id(provider, account_id).await?;
        uow.commit().await?;
        Ok(user_id)
    }

    /// The session's user, for `/api/me`
    pub async fn current_user(&self, session: &Session) -> Result<User, ApiError> {
        let mut uow = self.store.begin().await?;
        let actor = load_actor(&mut uow, session)
            .await?
            .ok_or_else(ApiError::unauthenticated)?;
        uow.commit().await?;
        Ok(actor)
    }

    async fn grant_configured_roles(
        &self,
        uow: &mut UnitOfWork,
        user_id: &str,
        claims: &OpenIdClaims,
    ) -> Result<(), ApiError> {
        if claims.email_verified && self.config.is_admin_email(&claims.email) {
            uow.add_user_role(user_id, UserRole::Admin).await?;
            info!(
                user_id = %user_id,
                email = %safe_email_log(&claims.email),
                "Granted admin role from ADMIN_EMAILS"
            );
        }
        Ok(())
    }
}
