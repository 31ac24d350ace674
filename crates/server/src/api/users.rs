//! Account signup.
//!
//! `POST /users` creates either a human account (with a password) or a service
//! account (without one), optionally registering the caller's first device in
//! the same transaction.

use crate::AppResources;
use crate::api::extract::ValidatedJson;
use crate::entity::device::{self, Platform};
use crate::entity::user::{self, UserType};
use crate::error::{ApiError, ErrorResponse};
use crate::oauth2::password::hash_secret_blocking;
use crate::store::{self, NewDevice, NewUser, StoreError};
use crate::validation;
use axum::{Extension, Json, http::StatusCode};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};
use validator::{Validate, ValidationErrors};

pub const USERS_TAG: &str = "Users";

pub fn router() -> OpenApiRouter {
    OpenApiRouter::new().routes(routes!(signup))
}

/// Signup payload, discriminated by `userType`.
#[derive(Deserialize, ToSchema)]
#[serde(tag = "userType")]
pub enum SignupRequest {
    #[serde(rename = "HUMAN")]
    Human(HumanSignup),
    #[serde(rename = "SERVICE")]
    Service(ServiceSignup),
}

#[derive(Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct HumanSignup {
    #[schema(example = "ada@example.com")]
    #[validate(email(message = "email must be a valid email address"))]
    pub email: String,
    #[schema(min_length = 8)]
    #[validate(length(min = 8, message = "password must be at least 8 characters long"))]
    pub password: String,
    #[validate(custom(function = "validation::not_blank", message = "name must not be empty"))]
    pub name: Option<String>,
    #[validate(custom(
        function = "validation::not_blank",
        message = "phoneNumber must not be empty"
    ))]
    pub phone_number: Option<String>,
    #[validate(nested)]
    pub device: Option<DeviceInput>,
}

/// Service accounts never carry a password; one supplied anyway is ignored.
#[derive(Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ServiceSignup {
    #[schema(example = "build-bot@example.com")]
    #[validate(email(message = "email must be a valid email address"))]
    pub email: String,
    #[validate(custom(function = "validation::not_blank", message = "name must not be empty"))]
    pub name: Option<String>,
    #[validate(custom(
        function = "validation::not_blank",
        message = "phoneNumber must not be empty"
    ))]
    pub phone_number: Option<String>,
    #[validate(nested)]
    pub device: Option<DeviceInput>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInput {
    #[validate(custom(
        function = "validation::not_blank",
        message = "device.deviceId must not be empty"
    ))]
    pub device_id: String,
    #[validate(custom(function = "validation::not_blank", message = "device.os must not be empty"))]
    pub os: String,
    pub platform: Platform,
    /// Absolute push endpoint URL
    #[schema(example = "https://push.example.com/v1/abc")]
    #[validate(url(message = "device.endpoint must be an absolute URL"))]
    pub endpoint: String,
    pub token: Option<String>,
    pub user_agent: Option<String>,
}

impl Validate for SignupRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        match self {
            SignupRequest::Human(h) => h.validate(),
            SignupRequest::Service(s) => s.validate(),
        }
    }
}

impl From<DeviceInput> for NewDevice {
    fn from(d: DeviceInput) -> Self {
        NewDevice {
            device_id: d.device_id,
            os: d.os,
            platform: d.platform,
            endpoint: d.endpoint,
            token: d.token,
            user_agent: d.user_agent,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeviceResponse {
    pub id: String,
    pub device_id: String,
    pub os: String,
    pub platform: Platform,
    pub endpoint: String,
    pub token: Option<String>,
    pub user_agent: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub last_seen_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<device::Model> for DeviceResponse {
    fn from(d: device::Model) -> Self {
        DeviceResponse {
            id: d.id,
            device_id: d.device_id,
            os: d.os,
            platform: d.platform,
            endpoint: d.endpoint,
            token: d.token,
            user_agent: d.user_agent,
            last_seen_at: d.last_seen_at,
            created_at: d.created_at,
        }
    }
}

/// A created account. The password hash is never part of it.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub user_type: UserType,
    pub name: Option<String>,
    pub phone_number: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub devices: Vec<DeviceResponse>,
}

impl UserResponse {
    fn new(user: user::Model, devices: Vec<device::Model>) -> Self {
        UserResponse {
            id: user.id,
            email: user.email,
            user_type: user.user_type,
            name: user.name,
            phone_number: user.phone_number,
            created_at: user.created_at,
            devices: devices.into_iter().map(DeviceResponse::from).collect(),
        }
    }
}

#[utoipa::path(
    post,
    path = "/users",
    tag = USERS_TAG,
    operation_id = "Create User",
    summary = "Sign up a human or service account",
    description = "Creates an account. `userType` selects the shape:\n\n\
                   - `HUMAN`: `email`, `password` (min. 8 characters), optional `name`, `phoneNumber`, `device`\n\
                   - `SERVICE`: `email`, optional `name`, `phoneNumber`, `device`; no password\n\n\
                   An optional `device` registers the first push endpoint in the same transaction.",
    request_body(
        content = SignupRequest,
        content_type = "application/json",
        description = "Account to create"
    ),
    responses(
        (status = 201, description = "Account created", body = UserResponse),
        (status = 400, description = "Validation failure", body = ErrorResponse),
        (status = 409, description = "Email or device id already registered", body = ErrorResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn signup(
    Extension(resources): Extension<AppResources>,
    ValidatedJson(request): ValidatedJson<SignupRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let (new_user, device, password) = match request {
        SignupRequest::Human(h) => (
            NewUser {
                email: h.email,
                user_type: UserType::Human,
                name: h.name,
                phone_number: h.phone_number,
                hashed_password: None,
            },
            h.device,
            Some(h.password),
        ),
        SignupRequest::Service(s) => (
            NewUser {
                email: s.email,
                user_type: UserType::Service,
                name: s.name,
                phone_number: s.phone_number,
                hashed_password: None,
            },
            s.device,
            None,
        ),
    };

    let hashed_password = match password {
        Some(password) => Some(
            hash_secret_blocking(password)
                .await
                .map_err(ApiError::internal)?,
        ),
        None => None,
    };

    let (user, devices) = store::insert_user(
        &resources.db,
        NewUser {
            hashed_password,
            ..new_user
        },
        device.map(NewDevice::from),
    )
    .await
    .map_err(|e| match e {
        StoreError::Conflict { field } if field == "device_id" => ApiError::Conflict {
            resource: "device",
            field: "deviceId".to_string(),
        },
        StoreError::Conflict { field } => ApiError::Conflict {
            resource: "user",
            field,
        },
        other => ApiError::internal(other),
    })?;

    tracing::info!(
        user_id = %user.id,
        user_type = ?user.user_type,
        devices = devices.len(),
        "Created user"
    );

    Ok((StatusCode::CREATED, Json(UserResponse::new(user, devices))))
}
