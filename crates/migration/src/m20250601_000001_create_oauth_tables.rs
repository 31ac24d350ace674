//! OAuth2 client-credentials tables.
//!
//! - oauth_client: registered machine clients (secret stored as a hash)
//! - oauth_scope: named permissions, seeded separately
//! - oauth_client_scope: scopes granted to each client

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(OauthClient::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OauthClient::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(OauthClient::ClientId)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(OauthClient::ClientSecretHash)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(OauthClient::Name).string().not_null())
                    .col(
                        ColumnDef::new(OauthClient::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(OauthClient::OwnerId)
                            .string()
                            .not_null()
                            .default("system"),
                    )
                    .col(
                        ColumnDef::new(OauthClient::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(OauthClient::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(OauthScope::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OauthScope::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(OauthScope::Name)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(OauthClientScope::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OauthClientScope::OauthClientId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(OauthClientScope::OauthScopeId)
                            .string()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(OauthClientScope::OauthClientId)
                            .col(OauthClientScope::OauthScopeId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_oauth_client_scope_client")
                            .from(OauthClientScope::Table, OauthClientScope::OauthClientId)
                            .to(OauthClient::Table, OauthClient::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_oauth_client_scope_scope")
                            .from(OauthClientScope::Table, OauthClientScope::OauthScopeId)
                            .to(OauthScope::Table, OauthScope::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(OauthClientScope::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(OauthScope::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(OauthClient::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub(crate) enum OauthClient {
    Table,
    Id,
    ClientId,
    ClientSecretHash,
    Name,
    IsActive,
    OwnerId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub(crate) enum OauthScope {
    Table,
    Id,
    Name,
}

#[derive(DeriveIden)]
enum OauthClientScope {
    Table,
    OauthClientId,
    OauthScopeId,
}
