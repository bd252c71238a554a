use std::sync::Arc;
use std::time::Duration;

use galley_core::AppError;

use crate::test_support::{FakeAccessStore, key, subject};
use crate::{PermissionCache, RoleAdminRepository};

use super::PermissionResolver;

fn resolver_over(store: &Arc<FakeAccessStore>, ttl: Option<Duration>) -> PermissionResolver {
    PermissionResolver::new(store.clone(), Arc::new(PermissionCache::new(ttl)))
}

async fn manager_alice(store: &FakeAccessStore) -> uuid::Uuid {
    store.seed_permission("purchase_order", "approve").await;
    let manager = store.seed_role(None, "manager").await;
    let granted = store
        .grant_permission(manager, &key("purchase_order", "approve"), None)
        .await;
    assert!(granted.is_ok());
    let assigned = store.assign_role(&subject("alice"), manager, None).await;
    assert!(assigned.is_ok());
    manager
}

#[tokio::test]
async fn manager_can_approve_but_not_delete() {
    let store = Arc::new(FakeAccessStore::default());
    manager_alice(&store).await;
    let resolver = resolver_over(&store, None);
    let alice = subject("alice");

    let approve = resolver
        .has_permission(&alice, &key("purchase_order", "approve"))
        .await;
    let delete = resolver
        .has_permission(&alice, &key("purchase_order", "delete"))
        .await;

    assert!(matches!(approve, Ok(true)));
    assert!(matches!(delete, Ok(false)));
}

#[tokio::test]
async fn admin_role_bypasses_every_permission_check() {
    let store = Arc::new(FakeAccessStore::default());
    manager_alice(&store).await;
    let admin = store.seed_role(None, "admin").await;
    assert!(store.assign_role(&subject("alice"), admin, None).await.is_ok());
    let resolver = resolver_over(&store, None);
    let alice = subject("alice");

    assert!(matches!(
        resolver
            .has_permission(&alice, &key("anything", "anything"))
            .await,
        Ok(true)
    ));
    assert!(matches!(
        resolver
            .has_any_permission(&alice, &[key("location", "delete")])
            .await,
        Ok(true)
    ));
    assert!(matches!(
        resolver
            .has_all_permissions(&alice, &[key("a", "b"), key("c", "d")])
            .await,
        Ok(true)
    ));
    assert!(matches!(resolver.is_super_user(&alice).await, Ok(true)));
    assert!(matches!(
        resolver.has_role(&alice, "kitchen_lead").await,
        Ok(false)
    ));
}

#[tokio::test]
async fn removing_roles_with_invalidation_revokes_access() {
    let store = Arc::new(FakeAccessStore::default());
    let manager = manager_alice(&store).await;
    let admin = store.seed_role(None, "admin").await;
    let alice = subject("alice");
    assert!(store.assign_role(&alice, admin, None).await.is_ok());
    let resolver = resolver_over(&store, None);
    let approve = key("purchase_order", "approve");

    assert!(matches!(resolver.has_role(&alice, "manager").await, Ok(true)));

    assert!(store.unassign_role(&alice, manager).await.is_ok());
    resolver.invalidate(&alice).await;
    assert!(matches!(
        resolver.has_role(&alice, "manager").await,
        Ok(false)
    ));
    assert!(matches!(
        resolver.has_permission(&alice, &approve).await,
        Ok(true)
    ));

    assert!(store.unassign_role(&alice, admin).await.is_ok());
    resolver.invalidate(&alice).await;
    assert!(matches!(
        resolver.has_permission(&alice, &approve).await,
        Ok(false)
    ));
}

#[tokio::test]
async fn resolve_unions_permissions_across_roles_without_duplicates() {
    let store = Arc::new(FakeAccessStore::default());
    store.seed_permission("inventory", "read").await;
    store.seed_permission("recipe", "edit").await;
    let cook = store.seed_role(None, "cook").await;
    let baker = store.seed_role(None, "baker").await;
    for (role_id, permission) in [
        (cook, key("inventory", "read")),
        (baker, key("inventory", "read")),
        (baker, key("recipe", "edit")),
    ] {
        assert!(store.grant_permission(role_id, &permission, None).await.is_ok());
    }
    let bob = subject("bob");
    assert!(store.assign_role(&bob, cook, None).await.is_ok());
    assert!(store.assign_role(&bob, baker, None).await.is_ok());

    let resolved = match resolver_over(&store, None).resolve("bob").await {
        Ok(resolved) => resolved,
        Err(error) => panic!("resolve failed: {error}"),
    };

    let permissions: Vec<String> = resolved
        .permissions()
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(permissions, vec!["inventory:read", "recipe:edit"]);
    assert!(!resolved.is_super_user());
}

#[tokio::test]
async fn inactive_roles_grant_nothing() {
    let store = Arc::new(FakeAccessStore::default());
    let manager = manager_alice(&store).await;
    assert!(store.set_role_active(manager, false).await.is_ok());
    let resolver = resolver_over(&store, None);
    let alice = subject("alice");

    assert!(matches!(
        resolver
            .has_permission(&alice, &key("purchase_order", "approve"))
            .await,
        Ok(false)
    ));
    assert!(matches!(
        resolver.has_role(&alice, "manager").await,
        Ok(false)
    ));
}

#[tokio::test]
async fn inactive_admin_role_is_not_super_user() {
    let store = Arc::new(FakeAccessStore::default());
    let admin = store.seed_role(None, "admin").await;
    assert!(store.assign_role(&subject("carol"), admin, None).await.is_ok());
    assert!(store.set_role_active(admin, false).await.is_ok());

    let result = resolver_over(&store, None)
        .is_super_user(&subject("carol"))
        .await;
    assert!(matches!(result, Ok(false)));
}

#[tokio::test]
async fn second_resolve_performs_no_store_queries() {
    let store = Arc::new(FakeAccessStore::default());
    manager_alice(&store).await;
    let resolver = resolver_over(&store, None);

    assert!(resolver.resolve("alice").await.is_ok());
    assert_eq!(store.role_queries(), 1);
    assert_eq!(store.permission_queries(), 1);

    assert!(resolver.resolve("alice").await.is_ok());
    assert!(resolver.clone().resolve(" alice ").await.is_ok());
    assert_eq!(store.role_queries(), 1);
    assert_eq!(store.permission_queries(), 1);
}

#[tokio::test]
async fn subject_without_roles_skips_permission_query() {
    let store = Arc::new(FakeAccessStore::default());
    let resolver = resolver_over(&store, None);

    let resolved = resolver.resolve("nobody").await;
    assert!(resolved.is_ok_and(|set| set.permissions().is_empty() && !set.is_super_user()));
    assert_eq!(store.role_queries(), 1);
    assert_eq!(store.permission_queries(), 0);
}

#[tokio::test]
async fn new_grant_is_visible_after_invalidate_all() {
    let store = Arc::new(FakeAccessStore::default());
    let manager = manager_alice(&store).await;
    let resolver = resolver_over(&store, None);
    let alice = subject("alice");
    let receive = key("goods_receipt", "create");

    assert!(matches!(
        resolver.has_permission(&alice, &receive).await,
        Ok(false)
    ));

    store.seed_permission("goods_receipt", "create").await;
    assert!(store.grant_permission(manager, &receive, None).await.is_ok());
    assert!(matches!(
        resolver.has_permission(&alice, &receive).await,
        Ok(false)
    ));

    resolver.invalidate_all().await;
    assert!(matches!(
        resolver.has_permission(&alice, &receive).await,
        Ok(true)
    ));
}

#[tokio::test]
async fn vacuous_checks_follow_quantifier_semantics() {
    let store = Arc::new(FakeAccessStore::default());
    manager_alice(&store).await;
    let resolver = resolver_over(&store, None);
    let alice = subject("alice");

    assert!(matches!(resolver.has_any_permission(&alice, &[]).await, Ok(false)));
    assert!(matches!(resolver.has_all_permissions(&alice, &[]).await, Ok(true)));
    assert!(matches!(
        resolver.has_any_role::<&str>(&alice, &[]).await,
        Ok(false)
    ));
    assert!(matches!(
        resolver.has_all_roles::<&str>(&alice, &[]).await,
        Ok(true)
    ));
}

#[tokio::test]
async fn role_predicates_match_held_slugs() {
    let store = Arc::new(FakeAccessStore::default());
    manager_alice(&store).await;
    let resolver = resolver_over(&store, None);
    let alice = subject("alice");

    assert!(matches!(
        resolver.has_any_role(&alice, &["cook", "manager"]).await,
        Ok(true)
    ));
    assert!(matches!(
        resolver.has_all_roles(&alice, &["cook", "manager"]).await,
        Ok(false)
    ));
}

#[tokio::test]
async fn malformed_subject_is_rejected_without_store_io() {
    let store = Arc::new(FakeAccessStore::default());
    let resolver = resolver_over(&store, None);

    assert!(matches!(
        resolver.resolve("   ").await,
        Err(AppError::Validation(_))
    ));
    assert!(matches!(
        resolver.check_access("", "location", "delete").await,
        Err(AppError::Validation(_))
    ));
    assert_eq!(store.role_queries(), 0);
}

#[tokio::test]
async fn check_access_parses_open_vocabulary_pairs() {
    let store = Arc::new(FakeAccessStore::default());
    manager_alice(&store).await;
    let resolver = resolver_over(&store, None);

    assert!(matches!(
        resolver
            .check_access("alice", "purchase_order", "approve")
            .await,
        Ok(true)
    ));
    assert!(matches!(
        resolver.check_access("alice", "Purchase Order", "approve").await,
        Err(AppError::Validation(_))
    ));
}

#[tokio::test]
async fn store_failures_propagate_and_are_not_cached() {
    let store = Arc::new(FakeAccessStore::default());
    manager_alice(&store).await;
    let resolver = resolver_over(&store, None);

    store.fail_reads(true);
    assert!(matches!(
        resolver.resolve("alice").await,
        Err(AppError::Unavailable(_))
    ));

    store.fail_reads(false);
    assert!(resolver.resolve("alice").await.is_ok());
    assert_eq!(store.role_queries(), 2);
}

#[tokio::test(start_paused = true)]
async fn cached_sets_are_reloaded_after_ttl() {
    let store = Arc::new(FakeAccessStore::default());
    manager_alice(&store).await;
    let resolver = resolver_over(&store, Some(Duration::from_secs(60)));

    assert!(resolver.resolve("alice").await.is_ok());
    tokio::time::advance(Duration::from_secs(61)).await;
    assert!(resolver.resolve("alice").await.is_ok());

    assert_eq!(store.role_queries(), 2);
}

#[tokio::test]
async fn concurrent_resolves_share_one_store_load() {
    let store = Arc::new(FakeAccessStore::default());
    manager_alice(&store).await;
    let resolver = resolver_over(&store, None);

    let (first, second, third) = tokio::join!(
        resolver.resolve("alice"),
        resolver.resolve("alice"),
        resolver.resolve("alice"),
    );

    assert!(first.is_ok() && second.is_ok() && third.is_ok());
    assert_eq!(store.role_queries(), 1);
}

#[tokio::test(start_paused = true)]
async fn concurrent_resolves_share_one_failed_load() {
    let store = Arc::new(FakeAccessStore::default());
    manager_alice(&store).await;
    store.slow_reads(Duration::from_millis(200));
    store.fail_reads(true);
    let resolver = resolver_over(&store, None);

    let outcomes = tokio::join!(
        resolver.resolve("alice"),
        resolver.resolve("alice"),
        resolver.resolve("alice"),
        resolver.resolve("alice"),
        resolver.resolve("alice"),
    );

    for outcome in [outcomes.0, outcomes.1, outcomes.2, outcomes.3, outcomes.4] {
        assert!(matches!(outcome, Err(AppError::Unavailable(_))));
    }
    assert_eq!(store.role_queries(), 1);

    store.fail_reads(false);
    assert!(resolver.resolve("alice").await.is_ok());
    assert_eq!(store.role_queries(), 2);
}
