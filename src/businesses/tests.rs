//! Tests for businesses module
//!
//! These tests verify:
//! - Request validation
//! - Business requests and the admin notification fan-out
//! - Approval and status changes, including the denial shapes

#[cfg(test)]
mod tests {
    use super::super::models::{BusinessQuery, BusinessStatus, UpdateBusinessRequest};
    use super::super::services::BusinessService;
    use crate::auth::Session;
    use crate::common::{ApiError, Validator};
    use crate::test_support::*;

    #[test]
    fn test_create_business_validation() {
        let valid = business_request("Acme Testing");
        assert!(valid.validate(&valid).is_valid);

        let mut invalid = business_request("AB");
        invalid.website = "acme.example".to_string();
        invalid.description = "short".to_string();
        let result = invalid.validate(&invalid);
        assert!(!result.is_valid);
        assert_eq!(result.errors.len(), 3);
    }

    #[tokio::test]
    async fn test_create_business_is_pending_and_notifies_admins() {
        let (state, mut receiver) = setup_test_state().await;
        let seed = seed_marketplace(&state.store).await;
        let service = BusinessService::new(state.store.clone(), state.notifications.clone());

        let business = service
            .create_business(
                &Session::for_user(&seed.outsider_id),
                business_request("Outsider Labs"),
            )
            .await
            .unwrap();

        assert_eq!(business.status, BusinessStatus::Pending);
        assert_eq!(business.user_id, seed.outsider_id);

        let queued = drain(&mut receiver);
        assert_eq!(queued.len(), 1);
        assert_eq!(queued[0].kind(), "business_requested");
        assert_eq!(queued[0].recipient().user_id, seed.admin_id);
    }

    #[tokio::test]
    async fn test_duplicate_business_name_conflicts() {
        let (state, _receiver) = setup_test_state().await;
        let seed = seed_marketplace(&state.store).await;
        let service = BusinessService::new(state.store.clone(), state.notifications.clone());

        let result = service
            .create_business(
                &Session::for_user(&seed.outsider_id),
                business_request("Acme Testing"),
            )
            .await;
        assert!(matches!(result, Err(ApiError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_anonymous_update_is_unauthenticated() {
        let (state, _receiver) = setup_test_state().await;
        let seed = seed_marketplace(&state.store).await;
        let service = BusinessService::new(state.store.clone(), state.notifications.clone());

        let request = UpdateBusinessRequest {
            name: "Acme Renamed".to_string(),
            website: "https://acme.example".to_string(),
            description: "Still testing things".to_string(),
        };
        let result = service
            .update_business(&Session::anonymous(), &seed.business_id, request)
            .await;
        assert!(matches!(result, Err(ApiError::Unauthenticated(_))));
    }

    #[tokio::test]
    async fn test_owner_updates_but_stranger_cannot() {
        let (state, _receiver) = setup_test_state().await;
        let seed = seed_marketplace(&state.store).await;
        let service = BusinessService::new(state.store.clone(), state.notifications.clone());

        let request = UpdateBusinessRequest {
            name: "Acme Renamed".to_string(),
            website: "https://acme.example".to_string(),
            description: "Still testing things".to_string(),
        };

        let denied = service
            .update_business(
                &Session::for_user(&seed.outsider_id),
                &seed.business_id,
                request.clone(),
            )
            .await;
        assert!(matches!(denied, Err(ApiError::Unauthorized(_))));

        let updated = service
            .update_business(&Session::for_user(&seed.owner_id), &seed.business_id, request)
            .await
            .unwrap();
        assert_eq!(updated.name, "Acme Renamed");
        assert_eq!(updated.status, BusinessStatus::Active);
    }

    #[tokio::test]
    async fn test_non_owner_approve_is_unauthorized() {
        let (state, _receiver) = setup_test_state().await;
        let seed = seed_marketplace(&state.store).await;
        let service = BusinessService::new(state.store.clone(), state.notifications.clone());

        let pending = service
            .create_business(&Session::for_user(&seed.owner_id), business_request("Beta Labs"))
            .await
            .unwrap();

        // owning the business is not enough to approve it
        for user_id in [&seed.owner_id, &seed.outsider_id] {
            let result = service
                .approve_business(&Session::for_user(user_id), &pending.id)
                .await;
            assert!(matches!(result, Err(ApiError::Unauthorized(_))));
        }
    }

    #[tokio::test]
    async fn test_admin_approves_pending_once() {
        let (state, _receiver) = setup_test_state().await;
        let seed = seed_marketplace(&state.store).await;
        let service = BusinessService::new(state.store.clone(), state.notifications.clone());
        let admin = Session::for_user(&seed.admin_id);

        let pending = service
            .create_business(&Session::for_user(&seed.owner_id), business_request("Beta Labs"))
            .await
            .unwrap();

        let approved = service.approve_business(&admin, &pending.id).await.unwrap();
        assert_eq!(approved.status, BusinessStatus::Active);

        let again = service.approve_business(&admin, &pending.id).await;
        assert!(matches!(again, Err(ApiError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_set_business_status() {
        let (state, _receiver) = setup_test_state().await;
        let seed = seed_marketplace(&state.store).await;
        let service = BusinessService::new(state.store.clone(), state.notifications.clone());
        let admin = Session::for_user(&seed.admin_id);

        let back_to_pending = service
            .set_business_status(&admin, &seed.business_id, BusinessStatus::Pending)
            .await;
        assert!(matches!(back_to_pending, Err(ApiError::BadRequest(_))));

        let same = service
            .set_business_status(&admin, &seed.business_id, BusinessStatus::Active)
            .await;
        assert!(matches!(same, Err(ApiError::Conflict(_))));

        let disabled = service
            .set_business_status(&admin, &seed.business_id, BusinessStatus::Disabled)
            .await
            .unwrap();
        assert_eq!(disabled.status, BusinessStatus::Disabled);

        let owner_attempt = service
            .set_business_status(
                &Session::for_user(&seed.owner_id),
                &seed.business_id,
                BusinessStatus::Active,
            )
            .await;
        assert!(matches!(owner_attempt, Err(ApiError::Unauthorized(_))));

        // pending only leaves through approve
        let pending = service
            .create_business(&Session::for_user(&seed.owner_id), business_request("Gamma Works"))
            .await
            .unwrap();
        for status in [BusinessStatus::Active, BusinessStatus::Disabled] {
            let skipped = service.set_business_status(&admin, &pending.id, status).await;
            assert!(matches!(skipped, Err(ApiError::Conflict(_))));
        }
        let still_pending = service.get_business(&admin, &pending.id).await.unwrap();
        assert_eq!(still_pending.status, BusinessStatus::Pending);
    }

    #[tokio::test]
    async fn test_missing_business_denial_shapes() {
        let (state, _receiver) = setup_test_state().await;
        let seed = seed_marketplace(&state.store).await;
        let service = BusinessService::new(state.store.clone(), state.notifications.clone());

        let as_admin = service
            .get_business(&Session::for_user(&seed.admin_id), "B_MISSING1")
            .await;
        assert!(matches!(as_admin, Err(ApiError::NotFound(_))));

        let as_user = service
            .get_business(&Session::for_user(&seed.outsider_id), "B_MISSING1")
            .await;
        assert!(matches!(as_user, Err(ApiError::Unauthorized(_))));

        let anonymous = service.get_business(&Session::anonymous(), "B_MISSING1").await;
        assert!(matches!(anonymous, Err(ApiError::Unauthenticated(_))));
    }

    #[tokio::test]
    async fn test_listing_requires_a_permitted_filter() {
        let (state, _receiver) = setup_test_state().await;
        let seed = seed_marketplace(&state.store).await;
        let service = BusinessService::new(state.store.clone(), state.notifications.clone());
        let outsider = Session::for_user(&seed.outsider_id);

        let unfiltered = service
            .get_businesses(&outsider, &BusinessQuery::default())
            .await;
        assert!(matches!(unfiltered, Err(ApiError::Unauthorized(_))));

        let active = service
            .get_businesses(
                &outsider,
                &BusinessQuery {
                    status: Some(BusinessStatus::Active),
                    user_id: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, seed.business_id);

        let own = service
            .get_businesses(
                &Session::for_user(&seed.owner_id),
                &BusinessQuery {
                    status: None,
                    user_id: Some(seed.owner_id.clone()),
                },
            )
            .await
            .unwrap();
        assert_eq!(own.len(), 1);

        let everything = service
            .get_businesses(&Session::for_user(&seed.admin_id), &BusinessQuery::default())
            .await
            .unwrap();
        assert_eq!(everything.len(), 1);
    }
}
