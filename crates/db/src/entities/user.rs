//! User entity (account records).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Unique username as chosen by the user.
    pub username: String,

    /// Lowercased username used as the lookup key.
    pub username_lower: String,

    /// Display name.
    #[sea_orm(nullable)]
    pub full_name: Option<String>,

    /// Profile bio.
    #[sea_orm(nullable)]
    pub bio: Option<String>,

    /// Avatar image URL.
    #[sea_orm(nullable)]
    pub avatar_url: Option<String>,

    /// Private accounts require follow-request approval.
    #[sea_orm(default_value = false)]
    pub is_private: bool,

    /// Verified badge.
    #[sea_orm(default_value = false)]
    pub is_verified: bool,

    /// Inactive accounts are excluded from all lookups; toggled by moderation.
    #[sea_orm(default_value = true)]
    pub is_active: bool,

    /// Opaque API token.
    #[sea_orm(nullable)]
    pub token: Option<String>,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
