use std::sync::Arc;

use galley_core::{AppError, UserIdentity};

use crate::test_support::{FakeAccessStore, key, slug, subject};
use crate::{
    CreatePermissionInput, CreateRoleInput, PermissionCache, PermissionResolver,
    RoleAdminRepository, RoleListQuery,
};

use super::RoleAdminService;

struct Harness {
    store: Arc<FakeAccessStore>,
    resolver: PermissionResolver,
    service: RoleAdminService,
    actor: UserIdentity,
}

fn harness() -> Harness {
    let store = Arc::new(FakeAccessStore::default());
    let resolver = PermissionResolver::new(store.clone(), Arc::new(PermissionCache::new(None)));
    let service = RoleAdminService::new(store.clone(), resolver.clone());

    Harness {
        store,
        resolver,
        service,
        actor: UserIdentity::new("root", "Root", None),
    }
}

fn role_input(value: &str) -> CreateRoleInput {
    CreateRoleInput {
        tenant_id: None,
        name: value.to_owned(),
        slug: slug(value),
        description: None,
    }
}

#[tokio::test]
async fn create_role_rejects_duplicate_slug_in_same_scope() {
    let harness = harness();

    let first = harness
        .service
        .create_role(&harness.actor, role_input("manager"))
        .await;
    let second = harness
        .service
        .create_role(&harness.actor, role_input("manager"))
        .await;

    assert!(first.is_ok());
    assert!(matches!(second, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn create_role_requires_a_name() {
    let harness = harness();
    let mut input = role_input("manager");
    input.name = "  ".to_owned();

    let result = harness.service.create_role(&harness.actor, input).await;
    assert!(matches!(result, Err(AppError::Validation(_))));
    assert_eq!(harness.store.role_count().await, 0);
}

#[tokio::test]
async fn assign_role_invalidates_the_subject_and_records_grantor() {
    let harness = harness();
    let manager = harness.store.seed_role(None, "manager").await;
    let alice = subject("alice");

    assert!(matches!(
        harness.resolver.has_role(&alice, "manager").await,
        Ok(false)
    ));

    let assigned = harness
        .service
        .assign_role(&harness.actor, &alice, manager)
        .await;
    assert!(assigned.is_ok());
    assert!(matches!(
        harness.resolver.has_role(&alice, "manager").await,
        Ok(true)
    ));

    let assignments = harness.service.list_user_roles(&alice).await;
    assert!(assignments.is_ok_and(|assignments| {
        assignments.len() == 1
            && assignments[0].granted_by.as_ref().map(|by| by.as_str()) == Some("root")
    }));
}

#[tokio::test]
async fn unassign_role_invalidates_the_subject() {
    let harness = harness();
    let manager = harness.store.seed_role(None, "manager").await;
    let alice = subject("alice");
    assert!(
        harness
            .service
            .assign_role(&harness.actor, &alice, manager)
            .await
            .is_ok()
    );
    assert!(matches!(
        harness.resolver.has_role(&alice, "manager").await,
        Ok(true)
    ));

    let removed = harness
        .service
        .unassign_role(&harness.actor, &alice, manager)
        .await;
    assert!(removed.is_ok());
    assert!(matches!(
        harness.resolver.has_role(&alice, "manager").await,
        Ok(false)
    ));

    let again = harness
        .service
        .unassign_role(&harness.actor, &alice, manager)
        .await;
    assert!(matches!(again, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn grant_and_revoke_invalidate_every_cached_subject() {
    let harness = harness();
    harness.store.seed_permission("location", "manage").await;
    let manager = harness.store.seed_role(None, "manager").await;
    let alice = subject("alice");
    let bob = subject("bob");
    for holder in [&alice, &bob] {
        assert!(harness.store.assign_role(holder, manager, None).await.is_ok());
    }
    let manage = key("location", "manage");

    for holder in [&alice, &bob] {
        assert!(matches!(
            harness.resolver.has_permission(holder, &manage).await,
            Ok(false)
        ));
    }

    let granted = harness
        .service
        .grant_permission(&harness.actor, manager, &manage)
        .await;
    assert!(granted.is_ok());
    for holder in [&alice, &bob] {
        assert!(matches!(
            harness.resolver.has_permission(holder, &manage).await,
            Ok(true)
        ));
    }

    let revoked = harness
        .service
        .revoke_permission(&harness.actor, manager, &manage)
        .await;
    assert!(revoked.is_ok());
    assert!(matches!(
        harness.resolver.has_permission(&bob, &manage).await,
        Ok(false)
    ));
}

#[tokio::test]
async fn grant_of_unknown_permission_is_not_found() {
    let harness = harness();
    let manager = harness.store.seed_role(None, "manager").await;

    let result = harness
        .service
        .grant_permission(&harness.actor, manager, &key("ghost", "haunt"))
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn deactivating_a_role_removes_its_permissions_from_cached_sets() {
    let harness = harness();
    harness.store.seed_permission("stock", "count").await;
    let counter = harness.store.seed_role(None, "stock_counter").await;
    let carol = subject("carol");
    let count = key("stock", "count");
    assert!(
        harness
            .store
            .grant_permission(counter, &count, None)
            .await
            .is_ok()
    );
    assert!(harness.store.assign_role(&carol, counter, None).await.is_ok());
    assert!(matches!(
        harness.resolver.has_permission(&carol, &count).await,
        Ok(true)
    ));

    let updated = harness
        .service
        .set_role_active(&harness.actor, counter, false)
        .await;
    assert!(updated.is_ok_and(|role| !role.is_active));
    assert!(matches!(
        harness.resolver.has_permission(&carol, &count).await,
        Ok(false)
    ));
}

#[tokio::test]
async fn delete_role_drops_assignments_and_cached_sets() {
    let harness = harness();
    let admin = harness.store.seed_role(None, "admin").await;
    let dave = subject("dave");
    assert!(harness.store.assign_role(&dave, admin, None).await.is_ok());
    assert!(matches!(harness.resolver.is_super_user(&dave).await, Ok(true)));

    assert!(harness.service.delete_role(&harness.actor, admin).await.is_ok());
    assert!(matches!(harness.resolver.is_super_user(&dave).await, Ok(false)));
    assert!(matches!(
        harness.service.get_role(admin).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn list_roles_filters_by_tenant_and_global_scope() {
    let harness = harness();
    let kitchen = galley_core::TenantId::new();
    let bistro = galley_core::TenantId::new();
    harness.store.seed_role(None, "admin").await;
    harness.store.seed_role(Some(kitchen), "chef").await;
    harness.store.seed_role(Some(bistro), "waiter").await;

    let scoped = harness
        .service
        .list_roles(RoleListQuery {
            tenant_id: Some(kitchen),
            include_global: true,
        })
        .await;
    let slugs: Vec<String> = scoped
        .unwrap_or_default()
        .into_iter()
        .map(|role| role.slug.to_string())
        .collect();

    assert_eq!(slugs, vec!["admin".to_owned(), "chef".to_owned()]);
}

#[tokio::test]
async fn create_permission_rejects_duplicates() {
    let harness = harness();
    let input = CreatePermissionInput {
        key: key("purchase_order", "approve"),
        description: Some("Approve purchase orders".to_owned()),
    };

    let first = harness
        .service
        .create_permission(&harness.actor, input.clone())
        .await;
    let second = harness.service.create_permission(&harness.actor, input).await;

    assert!(first.is_ok());
    assert!(matches!(second, Err(AppError::Conflict(_))));
    assert_eq!(harness.service.list_permissions().await.unwrap_or_default().len(), 1);
}

#[tokio::test]
async fn invalidate_access_cache_clears_the_resolver_cache() {
    let harness = harness();
    assert!(harness.resolver.resolve("alice").await.is_ok());
    assert_eq!(harness.resolver.cache().len().await, 1);

    harness.service.invalidate_access_cache(&harness.actor).await;
    assert!(harness.resolver.cache().is_empty().await);
}
