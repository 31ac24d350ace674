//! Join table granting scopes to OAuth clients.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "oauth_client_scope")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub oauth_client_id: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub oauth_scope_id: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::oauth_client::Entity",
        from = "Column::OauthClientId",
        to = "super::oauth_client::Column::Id",
        on_delete = "Cascade"
    )]
    Client,
    #[sea_orm(
        belongs_to = "super::oauth_scope::Entity",
        from = "Column::OauthScopeId",
        to = "super::oauth_scope::Column::Id",
        on_delete = "Cascade"
    )]
    Scope,
}

impl Related<super::oauth_client::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Client.def()
    }
}

impl Related<super::oauth_scope::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Scope.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
