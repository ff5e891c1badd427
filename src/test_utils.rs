//! Shared test utilities for Ambassador.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    config::transformations::{parse_catalog, seed_catalog},
    core::{
        character::{self, NewCharacter},
        roleplay,
    },
    entities,
    errors::Result,
};
use sea_orm::DatabaseConnection;

/// Server snowflake used by tests.
pub const TEST_SERVER: &str = "100000000000000001";

/// User snowflake used by tests; owns the test characters and roleplays.
pub const TEST_USER: &str = "200000000000000001";

/// A small catalog: wolves with ears and a tail, sharks with a tail.
pub const TEST_CATALOG: &str = r#"
[[species]]
name = "wolf"
description = "A large wild canine."

[[species.transformations]]
bodypart = "ear"
description = "Pointed wolf ears."
default_base_colour = "grey"
shift_message = "{@target}'s {@part} stretches into a pointed {@species} {@bodypart}."
uniform_shift_message = "{@target}'s {@part} stretch into pointed {@species} {@bodypart}."
grow_message = "A pointed {@species} {@bodypart} grows on the {@side} of {@target}'s head."
uniform_grow_message = "A pair of pointed {@colour} {@species} {@bodypart} grows on {@target}'s head."
single_description = "{@f|their} {@side} {@bodypart} is a pointed {@colour} {@species} {@bodypart}."
uniform_description = "{@f|they} {@f|have} pointed {@colour} {@species} {@bodypart}."

[[species.transformations]]
bodypart = "tail"
description = "A bushy wolf tail."
default_base_colour = "grey"
shift_message = "{@target}'s {@part} bristles into a bushy {@species} {@bodypart}."
grow_message = "A bushy {@colour} {@species} {@bodypart} sprouts from {@target}'s lower back."
single_description = "{@f|they} {@f|have} a bushy {@colour} {@species} {@bodypart}."

[[species]]
name = "shark"
description = "A cartilaginous fish."

[[species.transformations]]
bodypart = "tail"
description = "A powerful shark tail."
default_base_colour = "slate blue"
default_pattern = "countershading"
default_pattern_colour = "white"
shift_message = "{@target}'s {@part} thickens and stiffens into a powerful {@species} {@bodypart}."
grow_message = "A powerful {@species} {@bodypart} grows from {@target}'s lower back."
single_description = "{@f|they} {@f|have} a powerful {@colour} {@species} {@bodypart}."
"#;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Like [`setup_test_db`], with [`TEST_CATALOG`] seeded.
pub async fn setup_with_catalog() -> Result<DatabaseConnection> {
    let db = setup_test_db().await?;
    seed_catalog(&db, &parse_catalog(TEST_CATALOG)?).await?;
    Ok(db)
}

/// Installs a tracing subscriber that writes through the test harness.
///
/// Safe to call from several tests; only the first call installs anything.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}

/// Creates a test character with sensible defaults.
///
/// # Defaults
/// * owner: [`TEST_USER`] on [`TEST_SERVER`]
/// * pronouns: Feminine
/// * description: `"A curious traveller."`
pub async fn create_test_character(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::character::Model> {
    character::create_character(
        db,
        TEST_SERVER,
        TEST_USER,
        NewCharacter {
            pronoun_family: Some("Feminine".to_string()),
            description: "A curious traveller.".to_string(),
            ..NewCharacter::named(name)
        },
    )
    .await
}

/// Creates a public, SFW test roleplay owned by [`TEST_USER`].
pub async fn create_test_roleplay(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::roleplay::Model> {
    roleplay::create_roleplay(
        db,
        TEST_SERVER,
        TEST_USER,
        name,
        "A test roleplay",
        false,
        true,
    )
    .await
}
