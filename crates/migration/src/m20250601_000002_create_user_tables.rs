//! Accounts and their devices.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AppUser::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AppUser::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AppUser::Email)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    // HUMAN or SERVICE
                    .col(ColumnDef::new(AppUser::UserType).string().not_null())
                    .col(ColumnDef::new(AppUser::Name).string().null())
                    .col(ColumnDef::new(AppUser::PhoneNumber).string().null())
                    .col(ColumnDef::new(AppUser::HashedPassword).string().null())
                    .col(
                        ColumnDef::new(AppUser::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AppUser::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Device::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Device::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Device::UserId).string().not_null())
                    .col(
                        ColumnDef::new(Device::DeviceId)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Device::Os).string().not_null())
                    // desktop, mobile or web
                    .col(ColumnDef::new(Device::Platform).string().not_null())
                    .col(ColumnDef::new(Device::Endpoint).text().not_null())
                    .col(ColumnDef::new(Device::Token).text().null())
                    .col(ColumnDef::new(Device::UserAgent).string().null())
                    .col(
                        ColumnDef::new(Device::LastSeenAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Device::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_device_user")
                            .from(Device::Table, Device::UserId)
                            .to(AppUser::Table, AppUser::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_device_user_id")
                    .table(Device::Table)
                    .col(Device::UserId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Device::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AppUser::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum AppUser {
    Table,
    Id,
    Email,
    UserType,
    Name,
    PhoneNumber,
    HashedPassword,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Device {
    Table,
    Id,
    UserId,
    DeviceId,
    Os,
    Platform,
    Endpoint,
    Token,
    UserAgent,
    LastSeenAt,
    CreatedAt,
}
