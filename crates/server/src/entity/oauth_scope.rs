//! OAuth scope entity - named permissions, seeded out-of-band.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "oauth_scope")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Permission name, e.g. `tasks:read`
    #[sea_orm(unique)]
    pub name: String,
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

impl Related<super::oauth_client::Entity> for Entity {
    fn to() -> RelationDef {
        super::oauth_client_scope::Relation::Client.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::oauth_client_scope::Relation::Scope.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
