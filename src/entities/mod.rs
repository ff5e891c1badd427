//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod appearance;
pub mod appearance_component;
pub mod ban;
pub mod character;
pub mod enums;
pub mod global_user_protection;
pub mod note;
pub mod permission_grant;
pub mod protection_entry;
pub mod roleplay;
pub mod roleplay_message;
pub mod roleplay_participant;
pub mod server;
pub mod server_user_protection;
pub mod species;
pub mod transformation;
pub mod warning;

// Re-export specific types to avoid conflicts
pub use appearance::{Entity as Appearance, Model as AppearanceModel};
pub use appearance_component::{Entity as AppearanceComponent, Model as AppearanceComponentModel};
pub use ban::{Entity as Ban, Model as BanModel};
pub use character::{Entity as Character, Model as CharacterModel};
pub use enums::{
    AppearanceKind, Bodypart, Chirality, ParticipantStatus, Permission, PermissionTarget,
    ProtectionType,
};
pub use global_user_protection::{
    Entity as GlobalUserProtection, Model as GlobalUserProtectionModel,
};
pub use note::{Entity as Note, Model as NoteModel};
pub use permission_grant::{Entity as PermissionGrant, Model as PermissionGrantModel};
pub use protection_entry::{Entity as ProtectionEntry, Model as ProtectionEntryModel};
pub use roleplay::{Entity as Roleplay, Model as RoleplayModel};
pub use roleplay_message::{Entity as RoleplayMessage, Model as RoleplayMessageModel};
pub use roleplay_participant::{
    Entity as RoleplayParticipant, Model as RoleplayParticipantModel,
};
pub use server::{Entity as Server, Model as ServerModel};
pub use server_user_protection::{
    Entity as ServerUserProtection, Model as ServerUserProtectionModel,
};
pub use species::{Entity as Species, Model as SpeciesModel};
pub use transformation::{Entity as Transformation, Model as TransformationModel};
pub use warning::{Entity as Warning, Model as WarningModel};
