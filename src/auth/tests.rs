//! Tests for auth module
//!
//! These tests verify core authentication functionality including:
//! - Session token issue and validation
//! - Google tokeninfo claim extraction
//! - Account linking and the admin bootstrap

#[cfg(test)]
mod tests {
    use super::super::models::{OpenIdClaims, UserRole, UserStatus};
    use super::super::services::*;
    use super::super::Session;
    use crate::common::config::test_config;
    use crate::common::ApiError;
    use crate::test_support::*;
    use serde_json::json;

    const NOW: i64 = 1_700_000_000;

    fn claims(sub: &str, email: &str, verified: bool) -> OpenIdClaims {
        OpenIdClaims {
            sub: sub.to_string(),
            email: email.to_string(),
            name: "Test Person".to_string(),
            email_verified: verified,
        }
    }

    #[test]
    fn test_session_token_round_trip() {
        let config = test_config();
        let token = issue_session_token(&config, "U_STUDNT01").unwrap();

        let decoded = decode_session_token(&token, &config.jwt_secret).unwrap();
        assert_eq!(decoded.sub, "U_STUDNT01");
        assert!(!decoded.jti.is_empty());

        // a fresh id per token
        let second = issue_session_token(&config, "U_STUDNT01").unwrap();
        let second = decode_session_token(&second, &config.jwt_secret).unwrap();
        assert_ne!(decoded.jti, second.jti);
    }

    #[test]
    fn test_session_token_rejects_wrong_secret() {
        let config = test_config();
        let token = issue_session_token(&config, "U_STUDNT01").unwrap();
        assert!(decode_session_token(&token, "wrong_secret").is_err());
        assert!(decode_session_token("not.a.token", &config.jwt_secret).is_err());
    }

    #[test]
    fn test_claims_from_tokeninfo() {
        let body = json!({
            "sub": "1234567890",
            "email": "student@state.edu",
            "email_verified": "true",
            "name": "Sam Student",
            "aud": "client-id",
            "exp": (NOW + 600).to_string(),
        });

        let claims = claims_from_tokeninfo(&body, Some("client-id"), NOW).unwrap();
        assert_eq!(claims.sub, "1234567890");
        assert_eq!(claims.email, "student@state.edu");
        assert_eq!(claims.name, "Sam Student");
        assert!(claims.email_verified);
    }

    #[test]
    fn test_claims_from_tokeninfo_rejections() {
        let expired = json!({
            "sub": "1", "email": "a@example.com", "exp": (NOW - 1).to_string(),
        });
        assert!(matches!(
            claims_from_tokeninfo(&expired, None, NOW),
            Err(ApiError::Unauthenticated(_))
        ));

        let wrong_audience = json!({
            "sub": "1", "email": "a@example.com", "aud": "someone-else",
        });
        assert!(matches!(
            claims_from_tokeninfo(&wrong_audience, Some("client-id"), NOW),
            Err(ApiError::Unauthenticated(_))
        ));

        let missing_email = json!({ "sub": "1" });
        assert!(matches!(
            claims_from_tokeninfo(&missing_email, None, NOW),
            Err(ApiError::BadRequest(_))
        ));

        // name falls back to the email, unverified by default
        let minimal = json!({ "sub": "1", "email": "a@example.com" });
        let claims = claims_from_tokeninfo(&minimal, None, NOW).unwrap();
        assert_eq!(claims.name, "a@example.com");
        assert!(!claims.email_verified);
    }

    #[tokio::test]
    async fn test_save_account_creates_then_reuses_user() {
        let store = setup_test_store().await;
        let service = AccountService::new(store.clone(), test_config());

        let first = service
            .save_account(GOOGLE_PROVIDER, &claims("g-1", "Student@State.edu", true))
            .await
            .unwrap();
        assert!(first.has_role(UserRole::User));
        assert!(!first.is_admin());
        assert_eq!(first.email, "student@state.edu");
        assert!(first.is_student());

        let again = service
            .save_account(GOOGLE_PROVIDER, &claims("g-1", "student@state.edu", true))
            .await
            .unwrap();
        assert_eq!(again.id, first.id);

        let linked = service.get_linked_user(GOOGLE_PROVIDER, "g-1").await.unwrap();
        assert_eq!(linked.as_deref(), Some(first.id.as_str()));
        assert!(service
            .get_linked_user(GOOGLE_PROVIDER, "g-unknown")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_admin_bootstrap_requires_verified_email() {
        let store = setup_test_store().await;
        let service = AccountService::new(store.clone(), test_config());

        let unverified = service
            .save_account(GOOGLE_PROVIDER, &claims("g-admin", "admin@example.com", false))
            .await
            .unwrap();
        assert!(!unverified.is_admin());

        let verified = service
            .save_account(GOOGLE_PROVIDER, &claims("g-admin", "admin@example.com", true))
            .await
            .unwrap();
        assert_eq!(verified.id, unverified.id);
        assert!(verified.is_admin());
    }

    #[tokio::test]
    async fn test_link_account() {
        let store = setup_test_store().await;
        let service = AccountService::new(store.clone(), test_config());

        let student = service
            .save_account(GOOGLE_PROVIDER, &claims("g-school", "student@state.edu", true))
            .await
            .unwrap();
        let other = service
            .save_account(GOOGLE_PROVIDER, &claims("g-other", "other@example.com", true))
            .await
            .unwrap();

        let session = Session::for_user(&student.id);
        let linked = service
            .link_account(&session, GOOGLE_PROVIDER, &claims("g-personal", "sam@example.com", true))
            .await
            .unwrap();
        assert_eq!(linked.accounts.len(), 2);
        // the primary account still names the user
        assert_eq!(linked.email, "student@state.edu");

        let taken = service
            .link_account(&session, GOOGLE_PROVIDER, &claims("g-other", "other@example.com", true))
            .await;
        assert!(matches!(taken, Err(ApiError::Conflict(_))));

        let unchanged = service
            .get_linked_user(GOOGLE_PROVIDER, "g-other")
            .await
            .unwrap();
        assert_eq!(unchanged.as_deref(), Some(other.id.as_str()));

        let anonymous = service
            .link_account(
                &Session::anonymous(),
                GOOGLE_PROVIDER,
                &claims("g-new", "new@example.com", true),
            )
            .await;
        assert!(matches!(anonymous, Err(ApiError::Unauthenticated(_))));
    }

    #[tokio::test]
    async fn test_load_actor_ignores_inactive_and_unknown_users() {
        let store = setup_test_store().await;
        let seed = seed_marketplace(&store).await;
        let mut uow = store.begin().await.unwrap();

        let actor = load_actor(&mut uow, &Session::for_user(&seed.student_id))
            .await
            .unwrap();
        assert_eq!(actor.map(|u| u.id), Some(seed.student_id.clone()));

        uow.set_user_status(&seed.student_id, UserStatus::Disabled)
            .await
            .unwrap();
        let disabled = load_actor(&mut uow, &Session::for_user(&seed.student_id))
            .await
            .unwrap();
        assert!(disabled.is_none());

        let unknown = load_actor(&mut uow, &Session::for_user("U_MISSING1"))
            .await
            .unwrap();
        assert!(unknown.is_none());

        assert!(load_actor(&mut uow, &Session::anonymous())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_current_user() {
        let store = setup_test_store().await;
        let seed = seed_marketplace(&store).await;
        let service = AccountService::new(store.clone(), test_config());

        let me = service
            .current_user(&Session::for_user(&seed.owner_id))
            .await
            .unwrap();
        assert_eq!(me.email, "owner@example.com");

        assert!(matches!(
            service.current_user(&Session::anonymous()).await,
            Err(ApiError::Unauthenticated(_))
        ));
    }
}
