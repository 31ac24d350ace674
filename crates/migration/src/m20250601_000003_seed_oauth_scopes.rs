//! Seed the scopes clients may be granted.

use crate::m20250601_000001_create_oauth_tables::OauthScope;
use sea_orm_migration::prelude::*;

/// Fixed ids keep the seed idempotent across environments.
const SCOPES: &[(&str, &str)] = &[
    ("6f1c2a0e-4b1d-4c55-9a37-2f0d6f3b8a11", "tasks:read"),
    ("0b8e7d52-91a4-4f0e-8c6b-5d2e3a7f9c22", "tasks:write"),
    ("c3a95e17-7d28-4b6a-b1f4-8e0c2d9a6b33", "projects:read"),
];

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let mut insert = Query::insert();
        insert
            .into_table(OauthScope::Table)
            .columns([OauthScope::Id, OauthScope::Name])
            .on_conflict(OnConflict::column(OauthScope::Name).do_nothing().to_owned());
        for (id, name) in SCOPES {
            insert.values_panic([(*id).into(), (*name).into()]);
        }
        manager.exec_stmt(insert).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let delete = Query::delete()
            .from_table(OauthScope::Table)
            .and_where(Expr::col(OauthScope::Name).is_in(SCOPES.iter().map(|(_, name)| *name)))
            .to_owned();
        manager.exec_stmt(delete).await
    }
}
