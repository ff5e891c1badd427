//! Server entity - Per-guild settings for the bot.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Server settings database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "servers")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Discord guild ID
    #[sea_orm(unique)]
    pub server_id: String,
    /// Whether the server as a whole allows NSFW content
    pub is_nsfw: bool,
    /// Category that dedicated roleplay channels are created under
    pub roleplay_category_id: Option<String>,
    /// Channel that finished roleplay logs are posted to
    pub archive_channel_id: Option<String>,
    /// Channel that moderation actions are reported to
    pub moderation_log_channel_id: Option<String>,
}

/// Servers are keyed by Discord ID; other tables reference them by that ID
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
