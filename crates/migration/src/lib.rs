pub use sea_orm_migration::prelude::*;

mod m20250601_000001_create_oauth_tables;
mod m20250601_000002_create_user_tables;
mod m20250601_000003_seed_oauth_scopes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250601_000001_create_oauth_tables::Migration),
            Box::new(m20250601_000002_create_user_tables::Migration),
            Box::new(m20250601_000003_seed_oauth_scopes::Migration),
        ]
    }
}
