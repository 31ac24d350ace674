//! OAuth client entity - machine clients using the client-credentials grant.

use sea_orm::entity::prelude::*;
use time::OffsetDateTime;

/// Owner recorded when registration does not name one.
pub const SYSTEM_OWNER: &str = "system";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "oauth_client")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Public identifier presented at the token endpoint
    #[sea_orm(unique)]
    pub client_id: String,
    /// Argon2id PHC string of the secret; the plaintext is never stored
    pub client_secret_hash: String,
    pub name: String,
    /// Inactive clients cannot obtain tokens
    pub is_active: bool,
    pub owner_id: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::oauth_client_scope::Entity")]
    ClientScopes,
}

impl Related<super::oauth_client_scope::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ClientScopes.def()
    }
}

impl Related<super::oauth_scope::Entity> for Entity {
    fn to() -> RelationDef {
        super::oauth_client_scope::Relation::Scope.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::oauth_client_scope::Relation::Client.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
