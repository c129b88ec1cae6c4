use super::{evaluate, owns, Rule};
use crate::auth::models::{User, UserRole};
use crate::businesses::models::Business;
use crate::common::ApiError;
use crate::posts::models::{Post, PostQuery, PostStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostAction {
    Create,
    Read,
    /// Content edits and status changes
    Update,
}

impl PostAction {
    pub const ALL: [PostAction; 3] = [PostAction::Create, PostAction::Read, PostAction::Update];
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PostContext<'a> {
    pub business: Option<&'a Business>,
    pub post: Option<&'a Post>,
    pub query: Option<&'a PostQuery>,
}

pub type PostCheck = fn(&User, &PostContext<'_>) -> bool;

fn always(_: &User, _: &PostContext<'_>) -> bool {
    true
}

fn owns_business(user: &User, ctx: &PostContext<'_>) -> bool {
    ctx.business.is_some_and(|b| owns(user, &b.user_id))
}

fn owns_post(user: &User, ctx: &PostContext<'_>) -> bool {
    match (ctx.business, ctx.post) {
        (Some(business), Some(post)) => {
            owns(user, &business.user_id) && post.business_id == business.id
        }
        _ => false,
    }
}

fn can_read(user: &User, ctx: &PostContext<'_>) -> bool {
    let Some(query) = ctx.query else {
        return false;
    };
    let owns_filtered_business = match (ctx.business, query.business_id.as_deref()) {
        (Some(business), Some(business_id)) => {
            business.id == business_id && owns(user, &business.user_id)
        }
        _ => false,
    };
    query.status == Some(PostStatus::Active)
        || query.user_id.as_deref() == Some(user.id.as_str())
        || owns_filtered_business
}

pub static POST_RULES: &[Rule<PostAction, PostCheck>] = &[
    Rule {
        role: UserRole::Admin,
        actions: &PostAction::ALL,
        allows: always,
    },
    Rule {
        role: UserRole::User,
        actions: &[PostAction::Create],
        allows: owns_business,
    },
    Rule {
        role: UserRole::User,
        actions: &[PostAction::Update],
        allows: owns_post,
    },
    Rule {
        role: UserRole::User,
        actions: &[PostAction::Read],
        allows: can_read,
    },
];

pub fn authorize_post(
    actor: Option<&User>,
    action: PostAction,
    ctx: &PostContext<'_>,
) -> Result<(), ApiError> {
    evaluate("post", actor, POST_RULES, action, |user, allows| allows(user, ctx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::businesses::models::BusinessStatus;
    use crate::policy::test_users::*;

    fn business(id: &str, owner: &User) -> Business {
        Business {
            id: id.to_string(),
            user_id: owner.id.clone(),
            name: format!("Business {}", id),
            website: "https://acme.example".to_string(),
            description: "We test things".to_string(),
            status: BusinessStatus::Active,
            logo: None,
            created_at: "2024-01-01T00:00:00Z".to_string(),
        }
    }

    fn post(business_id: &str) -> Post {
        Post {
            id: 1,
            business_id: business_id.to_string(),
            title: "Usability test".to_string(),
            description: "Try our app for an hour".to_string(),
            pay: 25.0,
            time_est: 60,
            status: PostStatus::Active,
            created_at: "2024-01-01T00:00:00Z".to_string(),
            updated_at: "2024-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_admin_allows_every_action() {
        let admin = admin();
        for action in PostAction::ALL {
            assert!(authorize_post(Some(&admin), action, &PostContext::default()).is_ok());
        }
    }

    #[test]
    fn test_anonymous_is_unauthenticated() {
        for action in PostAction::ALL {
            assert!(matches!(
                authorize_post(None, action, &PostContext::default()),
                Err(ApiError::Unauthenticated(_))
            ));
        }
    }

    #[test]
    fn test_create_requires_business_ownership() {
        let owner = owner();
        let stranger = stranger();
        let target = business("B_TEST0001", &owner);
        let ctx = PostContext {
            business: Some(&target),
            ..Default::default()
        };

        assert!(authorize_post(Some(&owner), PostAction::Create, &ctx).is_ok());
        assert!(matches!(
            authorize_post(Some(&stranger), PostAction::Create, &ctx),
            Err(ApiError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_update_requires_post_of_owned_business() {
        let owner = owner();
        let stranger = stranger();
        let own_business = business("B_TEST0001", &owner);
        let own_post = post("B_TEST0001");
        let foreign_post = post("B_TEST0002");

        let ctx = PostContext {
            business: Some(&own_business),
            post: Some(&own_post),
            query: None,
        };
        assert!(authorize_post(Some(&owner), PostAction::Update, &ctx).is_ok());
        assert!(authorize_post(Some(&stranger), PostAction::Update, &ctx).is_err());

        let mismatched = PostContext {
            business: Some(&own_business),
            post: Some(&foreign_post),
            query: None,
        };
        assert!(authorize_post(Some(&owner), PostAction::Update, &mismatched).is_err());
    }

    #[test]
    fn test_read_rules() {
        let owner = owner();
        let stranger = stranger();
        let target = business("B_TEST0001", &owner);

        let active = PostQuery {
            status: Some(PostStatus::Active),
            ..Default::default()
        };
        let by_business = PostQuery {
            business_id: Some("B_TEST0001".to_string()),
            ..Default::default()
        };
        let unfiltered = PostQuery::default();

        let allowed = |actor: &User, query: &PostQuery| {
            let ctx = PostContext {
                business: Some(&target),
                post: None,
                query: Some(query),
            };
            authorize_post(Some(actor), PostAction::Read, &ctx).is_ok()
        };

        assert!(allowed(&stranger, &active));
        assert!(allowed(&owner, &by_business));
        assert!(!allowed(&stranger, &by_business));
        assert!(!allowed(&stranger, &unfiltered));
    }
}
