//! Permission store - Per-server grants and revocations of bot actions.
//!
//! An explicit row always wins. Without one, users may act on their own roleplays and
//! characters and nothing else.

use crate::{
    entities::{Permission, PermissionGrant, PermissionTarget, permission_grant},
    errors::Result,
};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::{debug, info};

async fn set_grant(
    db: &DatabaseConnection,
    server_id: &str,
    user_id: &str,
    permission: Permission,
    target: PermissionTarget,
    is_granted: bool,
) -> Result<permission_grant::Model> {
    let existing = PermissionGrant::find()
        .filter(permission_grant::Column::ServerId.eq(server_id))
        .filter(permission_grant::Column::UserId.eq(user_id))
        .filter(permission_grant::Column::Permission.eq(permission))
        .filter(permission_grant::Column::Target.eq(target))
        .one(db)
        .await?;

    let saved = match existing {
        Some(existing) if existing.is_granted == is_granted => existing,
        Some(existing) => {
            let mut active: permission_grant::ActiveModel = existing.into();
            active.is_granted = Set(is_granted);
            active.update(db).await?
        }
        None => {
            permission_grant::ActiveModel {
                server_id: Set(server_id.to_string()),
                user_id: Set(user_id.to_string()),
                permission: Set(permission),
                target: Set(target),
                is_granted: Set(is_granted),
                ..Default::default()
            }
            .insert(db)
            .await?
        }
    };

    info!(server_id, user_id, %permission, %target, is_granted, "Permission updated");
    Ok(saved)
}

/// Grants a permission. Granting twice is a no-op.
pub async fn grant_permission(
    db: &DatabaseConnection,
    server_id: &str,
    user_id: &str,
    permission: Permission,
    target: PermissionTarget,
) -> Result<permission_grant::Model> {
    set_grant(db, server_id, user_id, permission, target, true).await
}

/// Revokes a permission, including one held by default. Revoking twice is a no-op.
pub async fn revoke_permission(
    db: &DatabaseConnection,
    server_id: &str,
    user_id: &str,
    permission: Permission,
    target: PermissionTarget,
) -> Result<permission_grant::Model> {
    set_grant(db, server_id, user_id, permission, target, false).await
}

/// Whether a user holds a permission on a server.
pub async fn has_permission(
    db: &DatabaseConnection,
    server_id: &str,
    user_id: &str,
    permission: Permission,
    target: PermissionTarget,
) -> Result<bool> {
    let explicit = PermissionGrant::find()
        .filter(permission_grant::Column::ServerId.eq(server_id))
        .filter(permission_grant::Column::UserId.eq(user_id))
        .filter(permission_grant::Column::Permission.eq(permission))
        .filter(permission_grant::Column::Target.eq(target))
        .one(db)
        .await?;

    let granted = explicit.map_or_else(
        || target == PermissionTarget::Own && permission.is_granted_on_self_by_default(),
        |row| row.is_granted,
    );
    debug!(server_id, user_id, %permission, %target, granted, "Permission check");
    Ok(granted)
}

/// Lists the explicit grants and revocations of a user on a server.
pub async fn list_permissions(
    db: &DatabaseConnection,
    server_id: &str,
    user_id: &str,
) -> Result<Vec<permission_grant::Model>> {
    PermissionGrant::find()
        .filter(permission_grant::Column::ServerId.eq(server_id))
        .filter(permission_grant::Column::UserId.eq(user_id))
        .order_by_asc(permission_grant::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_defaults() -> Result<()> {
        let db = setup_test_db().await?;
        let check = |permission, target| {
            has_permission(&db, TEST_SERVER, TEST_USER, permission, target)
        };

        assert!(check(Permission::Transform, PermissionTarget::Own).await?);
        assert!(!check(Permission::Transform, PermissionTarget::Other).await?);
        assert!(!check(Permission::ManageBans, PermissionTarget::Own).await?);
        assert!(!check(Permission::ManageServer, PermissionTarget::Other).await?);
        Ok(())
    }

    #[tokio::test]
    async fn test_grant_and_revoke_are_idempotent() -> Result<()> {
        let db = setup_test_db().await?;
        let (permission, target) = (Permission::ManageBans, PermissionTarget::Other);

        grant_permission(&db, TEST_SERVER, TEST_USER, permission, target).await?;
        grant_permission(&db, TEST_SERVER, TEST_USER, permission, target).await?;
        assert!(has_permission(&db, TEST_SERVER, TEST_USER, permission, target).await?);
        assert_eq!(list_permissions(&db, TEST_SERVER, TEST_USER).await?.len(), 1);

        revoke_permission(&db, TEST_SERVER, TEST_USER, permission, target).await?;
        revoke_permission(&db, TEST_SERVER, TEST_USER, permission, target).await?;
        assert!(!has_permission(&db, TEST_SERVER, TEST_USER, permission, target).await?);

        let rows = list_permissions(&db, TEST_SERVER, TEST_USER).await?;
        assert_eq!(rows.len(), 1);
        assert!(!rows[0].is_granted);
        Ok(())
    }

    #[tokio::test]
    async fn test_revoking_a_default() -> Result<()> {
        let db = setup_test_db().await?;
        let (permission, target) = (Permission::CreateCharacter, PermissionTarget::Own);

        revoke_permission(&db, TEST_SERVER, TEST_USER, permission, target).await?;
        assert!(!has_permission(&db, TEST_SERVER, TEST_USER, permission, target).await?);

        // Grants are per server
        assert!(has_permission(&db, "elsewhere", TEST_USER, permission, target).await?);
        Ok(())
    }
}
