//! Credential and account persistence on top of SeaORM.
//!
//! Handlers never see raw database error codes: unique-constraint violations
//! are decoded here into [`StoreError::Conflict`] naming the offending column,
//! and every other database failure stays opaque.

use crate::entity::user::UserType;
use crate::entity::{device, oauth_client, oauth_client_scope, oauth_scope, user};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr,
    EntityTrait, ModelTrait, QueryFilter, QueryOrder, SqlErr, TransactionTrait,
};
use std::collections::BTreeSet;
use thiserror::Error;
use time::OffsetDateTime;

/// Columns carrying unique constraints, most specific first.
const UNIQUE_COLUMNS: &[&str] = &["client_id", "device_id", "email", "name", "id"];

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unique constraint violated on `{field}`")]
    Conflict { field: String },
    #[error("unknown scope(s): {}", .0.join(", "))]
    UnknownScopes(Vec<String>),
    #[error(transparent)]
    Database(DbErr),
}

impl From<DbErr> for StoreError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => StoreError::Conflict {
                field: conflicting_field(&detail),
            },
            _ => StoreError::Database(err),
        }
    }
}

/// Guess the violated column from a driver message.
///
/// SQLite reports `UNIQUE constraint failed: app_user.email`, Postgres names the
/// index (`app_user_email_key`); both contain the column name.
pub fn conflicting_field(detail: &str) -> String {
    UNIQUE_COLUMNS
        .iter()
        .find(|column| detail.contains(*column))
        .map(|column| column.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// A client row together with its granted scope names in canonical
/// (ascending) order.
#[derive(Clone, Debug)]
pub struct ClientRecord {
    pub client: oauth_client::Model,
    pub scopes: Vec<String>,
}

/// Everything needed to persist a freshly registered client.
///
/// Only the hash of the secret travels this far.
pub struct NewClient {
    pub name: String,
    pub client_id: String,
    pub client_secret_hash: String,
    pub owner_id: String,
    pub scopes: Vec<String>,
}

/// Insert a client and link it to its scopes in one transaction.
///
/// Every requested scope must already exist; otherwise nothing is written and
/// [`StoreError::UnknownScopes`] lists the missing names.
pub async fn insert_client(
    db: &DatabaseConnection,
    new: NewClient,
) -> Result<ClientRecord, StoreError> {
    let requested: BTreeSet<String> = new.scopes.into_iter().collect();

    let txn = db.begin().await?;

    let scopes = if requested.is_empty() {
        Vec::new()
    } else {
        oauth_scope::Entity::find()
            .filter(oauth_scope::Column::Name.is_in(requested.iter().cloned()))
            .order_by_asc(oauth_scope::Column::Name)
            .all(&txn)
            .await?
    };

    if scopes.len() != requested.len() {
        let missing = requested
            .iter()
            .filter(|name| !scopes.iter().any(|s| &s.name == *name))
            .cloned()
            .collect();
        return Err(StoreError::UnknownScopes(missing));
    }

    let now = OffsetDateTime::now_utc();
    let client = oauth_client::ActiveModel {
        id: Set(uuid::Uuid::new_v4().to_string()),
        client_id: Set(new.client_id),
        client_secret_hash: Set(new.client_secret_hash),
        name: Set(new.name),
        is_active: Set(true),
        owner_id: Set(new.owner_id),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&txn)
    .await?;

    if !scopes.is_empty() {
        let links = scopes.iter().map(|scope| oauth_client_scope::ActiveModel {
            oauth_client_id: Set(client.id.clone()),
            oauth_scope_id: Set(scope.id.clone()),
        });
        oauth_client_scope::Entity::insert_many(links)
            .exec_without_returning(&txn)
            .await?;
    }

    txn.commit().await?;

    Ok(ClientRecord {
        client,
        scopes: scopes.into_iter().map(|s| s.name).collect(),
    })
}

/// Look up a client by its public identifier, with its granted scopes.
pub async fn find_client_by_client_id(
    db: &DatabaseConnection,
    client_id: &str,
) -> Result<Option<ClientRecord>, StoreError> {
    let Some(client) = oauth_client::Entity::find()
        .filter(oauth_client::Column::ClientId.eq(client_id))
        .one(db)
        .await?
    else {
        return Ok(None);
    };

    let scopes = client
        .find_related(oauth_scope::Entity)
        .order_by_asc(oauth_scope::Column::Name)
        .all(db)
        .await?
        .into_iter()
        .map(|s| s.name)
        .collect();

    Ok(Some(ClientRecord { client, scopes }))
}

pub struct NewUser {
    pub email: String,
    pub user_type: UserType,
    pub name: Option<String>,
    pub phone_number: Option<String>,
    pub hashed_password: Option<String>,
}

pub struct NewDevice {
    pub device_id: String,
    pub os: String,
    pub platform: device::Platform,
    pub endpoint: String,
    pub token: Option<String>,
    pub user_agent: Option<String>,
}

/// Insert a user and, optionally, their first device in one transaction.
pub async fn insert_user(
    db: &DatabaseConnection,
    new: NewUser,
    new_device: Option<NewDevice>,
) -> Result<(user::Model, Vec<device::Model>), StoreError> {
    let txn = db.begin().await?;
    let now = OffsetDateTime::now_utc();

    let user = user::ActiveModel {
        id: Set(uuid::Uuid::new_v4().to_string()),
        email: Set(new.email),
        user_type: Set(new.user_type),
        name: Set(new.name),
        phone_number: Set(new.phone_number),
        hashed_password: Set(new.hashed_password),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&txn)
    .await?;

    let mut devices = Vec::new();
    if let Some(d) = new_device {
        devices.push(insert_device(&txn, &user.id, d, now).await?);
    }

    txn.commit().await?;
    Ok((user, devices))
}

async fn insert_device<C: ConnectionTrait>(
    conn: &C,
    user_id: &str,
    d: NewDevice,
    now: OffsetDateTime,
) -> Result<device::Model, DbErr> {
    device::ActiveModel {
        id: Set(uuid::Uuid::new_v4().to_string()),
        user_id: Set(user_id.to_string()),
        device_id: Set(d.device_id),
        os: Set(d.os),
        platform: Set(d.platform),
        endpoint: Set(d.endpoint),
        token: Set(d.token),
        user_agent: Set(d.user_agent),
        last_seen_at: Set(now),
        created_at: Set(now),
    }
    .insert(conn)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflicting_field_sqlite_message() {
        assert_eq!(
            conflicting_field("UNIQUE constraint failed: app_user.email"),
            "email"
        );
        assert_eq!(
            conflicting_field("UNIQUE constraint failed: oauth_client.client_id"),
            "client_id"
        );
        assert_eq!(
            conflicting_field("UNIQUE constraint failed: device.device_id"),
            "device_id"
        );
    }

    #[test]
    fn test_conflicting_field_postgres_message() {
        assert_eq!(
            conflicting_field(
                r#"duplicate key value violates unique constraint "app_user_email_key""#
            ),
            "email"
        );
    }

    #[test]
    fn test_conflicting_field_unknown() {
        assert_eq!(conflicting_field("something else entirely"), "unknown");
    }

    #[test]
    fn test_non_constraint_errors_stay_opaque() {
        let err: StoreError = DbErr::Custom("pool timed out".into()).into();
        assert!(matches!(err, StoreError::Database(_)));
    }
}
