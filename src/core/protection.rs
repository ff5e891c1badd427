//! Transformation consent.
//!
//! Every user has global defaults and, per server, a protection row seeded from those
//! defaults. Users must opt in on a server before anyone else can transform their
//! characters there. In whitelist mode only users on their list may do so; in blacklist
//! mode everyone except listed users may.

use crate::{
    entities::{
        GlobalUserProtection, ProtectionEntry, ProtectionType, ServerUserProtection,
        global_user_protection, protection_entry, server_user_protection,
    },
    errors::{Error, Result},
};
use sea_orm::{Set, prelude::*};
use tracing::{debug, info};

/// Fetches a user's global defaults, creating them (blacklist, opted out) on first use.
pub async fn get_or_create_global_protection<C>(
    db: &C,
    user_id: &str,
) -> Result<global_user_protection::Model>
where
    C: ConnectionTrait,
{
    if let Some(existing) = GlobalUserProtection::find()
        .filter(global_user_protection::Column::UserId.eq(user_id))
        .one(db)
        .await?
    {
        return Ok(existing);
    }

    global_user_protection::ActiveModel {
        user_id: Set(user_id.to_string()),
        default_type: Set(ProtectionType::Blacklist),
        default_opt_in: Set(false),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Fetches a user's settings on a server, seeding them from the global defaults.
pub async fn get_or_create_server_protection<C>(
    db: &C,
    server_id: &str,
    user_id: &str,
) -> Result<server_user_protection::Model>
where
    C: ConnectionTrait,
{
    if let Some(existing) = ServerUserProtection::find()
        .filter(server_user_protection::Column::ServerId.eq(server_id))
        .filter(server_user_protection::Column::UserId.eq(user_id))
        .one(db)
        .await?
    {
        return Ok(existing);
    }

    let global = get_or_create_global_protection(db, user_id).await?;
    debug!(server_id, user_id, "Seeding server protection from global defaults");
    server_user_protection::ActiveModel {
        server_id: Set(server_id.to_string()),
        user_id: Set(user_id.to_string()),
        protection_type: Set(global.default_type),
        has_opted_in: Set(global.default_opt_in),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Sets the protection type new servers start with.
pub async fn set_default_type(
    db: &DatabaseConnection,
    user_id: &str,
    protection_type: ProtectionType,
) -> Result<global_user_protection::Model> {
    let mut active: global_user_protection::ActiveModel =
        get_or_create_global_protection(db, user_id).await?.into();
    active.default_type = Set(protection_type);
    active.update(db).await.map_err(Into::into)
}

/// Sets whether new servers start opted in.
pub async fn set_default_opt_in(
    db: &DatabaseConnection,
    user_id: &str,
    opt_in: bool,
) -> Result<global_user_protection::Model> {
    let mut active: global_user_protection::ActiveModel =
        get_or_create_global_protection(db, user_id).await?.into();
    active.default_opt_in = Set(opt_in);
    active.update(db).await.map_err(Into::into)
}

/// Sets the protection type on one server.
pub async fn set_protection_type(
    db: &DatabaseConnection,
    server_id: &str,
    user_id: &str,
    protection_type: ProtectionType,
) -> Result<server_user_protection::Model> {
    let mut active: server_user_protection::ActiveModel =
        get_or_create_server_protection(db, server_id, user_id).await?.into();
    active.protection_type = Set(protection_type);
    let updated = active.update(db).await?;
    info!(server_id, user_id, %protection_type, "Protection type changed");
    Ok(updated)
}

async fn set_opt_in(
    db: &DatabaseConnection,
    server_id: &str,
    user_id: &str,
    has_opted_in: bool,
) -> Result<server_user_protection::Model> {
    let mut active: server_user_protection::ActiveModel =
        get_or_create_server_protection(db, server_id, user_id).await?.into();
    active.has_opted_in = Set(has_opted_in);
    let updated = active.update(db).await?;
    info!(server_id, user_id, has_opted_in, "Transformation consent changed");
    Ok(updated)
}

/// Allows others to transform the user's characters on a server.
pub async fn opt_in(
    db: &DatabaseConnection,
    server_id: &str,
    user_id: &str,
) -> Result<server_user_protection::Model> {
    set_opt_in(db, server_id, user_id, true).await
}

/// Forbids others from transforming the user's characters on a server.
pub async fn opt_out(
    db: &DatabaseConnection,
    server_id: &str,
    user_id: &str,
) -> Result<server_user_protection::Model> {
    set_opt_in(db, server_id, user_id, false).await
}

async fn set_entry(
    db: &DatabaseConnection,
    owner_id: &str,
    target_id: &str,
    entry_type: ProtectionType,
) -> Result<protection_entry::Model> {
    if owner_id == target_id {
        return Err(Error::validation("You can't add yourself to your own lists"));
    }

    let existing = ProtectionEntry::find()
        .filter(protection_entry::Column::OwnerId.eq(owner_id))
        .filter(protection_entry::Column::TargetId.eq(target_id))
        .one(db)
        .await?;

    let saved = match existing {
        Some(existing) => {
            let mut active: protection_entry::ActiveModel = existing.into();
            active.entry_type = Set(entry_type);
            active.update(db).await?
        }
        None => {
            protection_entry::ActiveModel {
                owner_id: Set(owner_id.to_string()),
                target_id: Set(target_id.to_string()),
                entry_type: Set(entry_type),
                ..Default::default()
            }
            .insert(db)
            .await?
        }
    };
    info!(owner_id, target_id, %entry_type, "Protection entry saved");
    Ok(saved)
}

/// Puts a user on the whitelist, moving them off the blacklist if needed.
pub async fn whitelist_user(
    db: &DatabaseConnection,
    owner_id: &str,
    target_id: &str,
) -> Result<protection_entry::Model> {
    set_entry(db, owner_id, target_id, ProtectionType::Whitelist).await
}

/// Puts a user on the blacklist, moving them off the whitelist if needed.
pub async fn blacklist_user(
    db: &DatabaseConnection,
    owner_id: &str,
    target_id: &str,
) -> Result<protection_entry::Model> {
    set_entry(db, owner_id, target_id, ProtectionType::Blacklist).await
}

/// Removes a user from whichever list they are on. Returns whether they were listed.
pub async fn remove_entry(
    db: &DatabaseConnection,
    owner_id: &str,
    target_id: &str,
) -> Result<bool> {
    let result = ProtectionEntry::delete_many()
        .filter(protection_entry::Column::OwnerId.eq(owner_id))
        .filter(protection_entry::Column::TargetId.eq(target_id))
        .exec(db)
        .await?;
    Ok(result.rows_affected > 0)
}

/// Lists a user's whitelist and blacklist entries.
pub async fn list_entries(
    db: &DatabaseConnection,
    owner_id: &str,
) -> Result<Vec<protection_entry::Model>> {
    ProtectionEntry::find()
        .filter(protection_entry::Column::OwnerId.eq(owner_id))
        .all(db)
        .await
        .map_err(Into::into)
}

/// Checks whether `invoker_id` may transform characters owned by `target_owner_id`.
///
/// # Errors
/// Returns [`Error::TransformationDenied`] with the reason when consent is missing.
pub async fn can_transform(
    db: &DatabaseConnection,
    server_id: &str,
    invoker_id: &str,
    target_owner_id: &str,
) -> Result<()> {
    if invoker_id == target_owner_id {
        return Ok(());
    }

    let protection = get_or_create_server_protection(db, server_id, target_owner_id).await?;
    if !protection.has_opted_in {
        return Err(Error::TransformationDenied {
            reason: "they have not opted in to transformations on this server".to_string(),
        });
    }

    let entry = ProtectionEntry::find()
        .filter(protection_entry::Column::OwnerId.eq(target_owner_id))
        .filter(protection_entry::Column::TargetId.eq(invoker_id))
        .one(db)
        .await?
        .map(|e| e.entry_type);

    match (protection.protection_type, entry) {
        (ProtectionType::Whitelist, Some(ProtectionType::Whitelist))
        | (ProtectionType::Blacklist, None | Some(ProtectionType::Whitelist)) => Ok(()),
        (ProtectionType::Whitelist, _) => Err(Error::TransformationDenied {
            reason: "you are not on their whitelist".to_string(),
        }),
        (ProtectionType::Blacklist, Some(ProtectionType::Blacklist)) => {
            Err(Error::TransformationDenied {
                reason: "you are on their blacklist".to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    const OTHER: &str = "42";

    #[tokio::test]
    async fn test_server_protection_is_seeded_from_global() -> Result<()> {
        let db = setup_test_db().await?;

        set_default_type(&db, TEST_USER, ProtectionType::Whitelist).await?;
        set_default_opt_in(&db, TEST_USER, true).await?;

        let server = get_or_create_server_protection(&db, TEST_SERVER, TEST_USER).await?;
        assert_eq!(server.protection_type, ProtectionType::Whitelist);
        assert!(server.has_opted_in);

        // Later changes to the defaults don't touch existing servers
        set_default_opt_in(&db, TEST_USER, false).await?;
        let server = get_or_create_server_protection(&db, TEST_SERVER, TEST_USER).await?;
        assert!(server.has_opted_in);
        Ok(())
    }

    #[tokio::test]
    async fn test_self_transformation_is_always_allowed() -> Result<()> {
        let db = setup_test_db().await?;
        can_transform(&db, TEST_SERVER, TEST_USER, TEST_USER).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_opt_in_is_required() -> Result<()> {
        let db = setup_test_db().await?;

        let denied = can_transform(&db, TEST_SERVER, OTHER, TEST_USER).await;
        assert!(matches!(denied, Err(Error::TransformationDenied { .. })));

        opt_in(&db, TEST_SERVER, TEST_USER).await?;
        can_transform(&db, TEST_SERVER, OTHER, TEST_USER).await?;

        // Consent is per server
        assert!(can_transform(&db, "elsewhere", OTHER, TEST_USER).await.is_err());

        opt_out(&db, TEST_SERVER, TEST_USER).await?;
        assert!(can_transform(&db, TEST_SERVER, OTHER, TEST_USER).await.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn test_blacklist_mode() -> Result<()> {
        let db = setup_test_db().await?;
        opt_in(&db, TEST_SERVER, TEST_USER).await?;

        blacklist_user(&db, TEST_USER, OTHER).await?;
        assert!(can_transform(&db, TEST_SERVER, OTHER, TEST_USER).await.is_err());
        can_transform(&db, TEST_SERVER, "43", TEST_USER).await?;

        assert!(remove_entry(&db, TEST_USER, OTHER).await?);
        assert!(!remove_entry(&db, TEST_USER, OTHER).await?);
        can_transform(&db, TEST_SERVER, OTHER, TEST_USER).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_whitelist_mode() -> Result<()> {
        let db = setup_test_db().await?;
        opt_in(&db, TEST_SERVER, TEST_USER).await?;
        set_protection_type(&db, TEST_SERVER, TEST_USER, ProtectionType::Whitelist).await?;

        assert!(can_transform(&db, TEST_SERVER, OTHER, TEST_USER).await.is_err());

        whitelist_user(&db, TEST_USER, OTHER).await?;
        can_transform(&db, TEST_SERVER, OTHER, TEST_USER).await?;

        // Moving a user to the blacklist replaces the whitelist entry
        blacklist_user(&db, TEST_USER, OTHER).await?;
        assert_eq!(list_entries(&db, TEST_USER).await?.len(), 1);
        assert!(can_transform(&db, TEST_SERVER, OTHER, TEST_USER).await.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn test_cannot_list_yourself() -> Result<()> {
        let db = setup_test_db().await?;
        let result = whitelist_user(&db, TEST_USER, TEST_USER).await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        Ok(())
    }
}
