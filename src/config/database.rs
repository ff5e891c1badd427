//! Database configuration module for Ambassador.
//!
//! This module handles the `SQLite` connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with `Schema::create_table_from_entity`,
//! so the schema always matches the Rust structs. Composite uniqueness rules that the
//! entity attributes cannot express are added as explicit unique indexes.

use crate::entities::{
    Appearance, AppearanceComponent, Ban, Character, GlobalUserProtection, Note, PermissionGrant,
    ProtectionEntry, Roleplay, RoleplayMessage, RoleplayParticipant, Server, ServerUserProtection,
    Species, Transformation, Warning, appearance, appearance_component, character,
    permission_grant, protection_entry, roleplay, roleplay_message, roleplay_participant,
    server_user_protection, transformation,
};
use crate::errors::Result;
use sea_orm::sea_query::{Index, IndexCreateStatement};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};
use tracing::{debug, info, instrument};

/// Database used when `DATABASE_URL` is not set.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/ambassador.sqlite?mode=rwc";

/// Establishes a connection to the database at `database_url`.
///
/// # Errors
/// Returns an error if the connection cannot be opened.
#[instrument]
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    debug!("Connecting to database");
    Database::connect(database_url).await.map_err(Into::into)
}

/// Creates all tables and unique indexes that do not exist yet.
///
/// Parents are created before children so foreign keys always resolve.
///
/// # Errors
/// Returns an error if any statement fails.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let tables = [
        schema.create_table_from_entity(Server).if_not_exists().to_owned(),
        schema.create_table_from_entity(Ban).if_not_exists().to_owned(),
        schema.create_table_from_entity(Warning).if_not_exists().to_owned(),
        schema.create_table_from_entity(Note).if_not_exists().to_owned(),
        schema.create_table_from_entity(Roleplay).if_not_exists().to_owned(),
        schema
            .create_table_from_entity(RoleplayParticipant)
            .if_not_exists()
            .to_owned(),
        schema
            .create_table_from_entity(RoleplayMessage)
            .if_not_exists()
            .to_owned(),
        schema.create_table_from_entity(Species).if_not_exists().to_owned(),
        schema
            .create_table_from_entity(Transformation)
            .if_not_exists()
            .to_owned(),
        schema.create_table_from_entity(Character).if_not_exists().to_owned(),
        schema.create_table_from_entity(Appearance).if_not_exists().to_owned(),
        schema
            .create_table_from_entity(AppearanceComponent)
            .if_not_exists()
            .to_owned(),
        schema
            .create_table_from_entity(GlobalUserProtection)
            .if_not_exists()
            .to_owned(),
        schema
            .create_table_from_entity(ServerUserProtection)
            .if_not_exists()
            .to_owned(),
        schema
            .create_table_from_entity(ProtectionEntry)
            .if_not_exists()
            .to_owned(),
        schema
            .create_table_from_entity(PermissionGrant)
            .if_not_exists()
            .to_owned(),
    ];

    for table in &tables {
        db.execute(builder.build(table)).await?;
    }

    for index in &unique_indexes() {
        db.execute(builder.build(index)).await?;
    }

    info!("Database tables ensured");
    Ok(())
}

/// Unique indexes backing the composite uniqueness invariants.
fn unique_indexes() -> Vec<IndexCreateStatement> {
    vec![
        Index::create()
            .name("idx_roleplays_owner_name")
            .table(Roleplay)
            .col(roleplay::Column::ServerId)
            .col(roleplay::Column::OwnerId)
            .col(roleplay::Column::Name)
            .unique()
            .if_not_exists()
            .to_owned(),
        Index::create()
            .name("idx_roleplay_participants_user")
            .table(RoleplayParticipant)
            .col(roleplay_participant::Column::RoleplayId)
            .col(roleplay_participant::Column::UserId)
            .unique()
            .if_not_exists()
            .to_owned(),
        Index::create()
            .name("idx_roleplay_messages_discord_id")
            .table(RoleplayMessage)
            .col(roleplay_message::Column::RoleplayId)
            .col(roleplay_message::Column::DiscordMessageId)
            .unique()
            .if_not_exists()
            .to_owned(),
        Index::create()
            .name("idx_characters_owner_name")
            .table(Character)
            .col(character::Column::ServerId)
            .col(character::Column::OwnerId)
            .col(character::Column::Name)
            .unique()
            .if_not_exists()
            .to_owned(),
        Index::create()
            .name("idx_appearances_character_kind")
            .table(Appearance)
            .col(appearance::Column::CharacterId)
            .col(appearance::Column::Kind)
            .unique()
            .if_not_exists()
            .to_owned(),
        Index::create()
            .name("idx_appearance_components_slot")
            .table(AppearanceComponent)
            .col(appearance_component::Column::AppearanceId)
            .col(appearance_component::Column::Bodypart)
            .col(appearance_component::Column::Chirality)
            .unique()
            .if_not_exists()
            .to_owned(),
        Index::create()
            .name("idx_transformations_species_bodypart")
            .table(Transformation)
            .col(transformation::Column::SpeciesId)
            .col(transformation::Column::Bodypart)
            .unique()
            .if_not_exists()
            .to_owned(),
        Index::create()
            .name("idx_server_user_protections_user")
            .table(ServerUserProtection)
            .col(server_user_protection::Column::ServerId)
            .col(server_user_protection::Column::UserId)
            .unique()
            .if_not_exists()
            .to_owned(),
        Index::create()
            .name("idx_protection_entries_pair")
            .table(ProtectionEntry)
            .col(protection_entry::Column::OwnerId)
            .col(protection_entry::Column::TargetId)
            .unique()
            .if_not_exists()
            .to_owned(),
        Index::create()
            .name("idx_permission_grants_key")
            .table(PermissionGrant)
            .col(permission_grant::Column::ServerId)
            .col(permission_grant::Column::UserId)
            .col(permission_grant::Column::Permission)
            .col(permission_grant::Column::Target)
            .unique()
            .if_not_exists()
            .to_owned(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{BanModel, CharacterModel, RoleplayModel, TransformationModel};
    use sea_orm::{EntityTrait, QuerySelect};

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        // Test that tables exist by querying them
        let _: Vec<BanModel> = Ban::find().limit(1).all(&db).await?;
        let _: Vec<RoleplayModel> = Roleplay::find().limit(1).all(&db).await?;
        let _: Vec<CharacterModel> = Character::find().limit(1).all(&db).await?;
        let _: Vec<TransformationModel> = Transformation::find().limit(1).all(&db).await?;

        Ok(())
    }

    #[tokio::test]
    async fn test_create_tables_is_repeatable() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;
        create_tables(&db).await?;
        Ok(())
    }
}
