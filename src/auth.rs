use std::ops::Deref;

use actix_web::{body, dev, http::StatusCode, web, FromRequest, HttpRequest, HttpResponse};
use chrono::{Duration, Utc};
use futures_util::future::LocalBoxFuture;
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use sea_orm::{DatabaseConnection, EntityTrait};
use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};
use thiserror::Error;
use uuid::Uuid;

use crate::{
    consts,
    entity::{prelude::*, sea_orm_active_enums::RoleType, user},
    error::ApiError,
};

/// Issues and validates the HS256 bearer tokens the dashboard front-end
/// carries around.
pub struct Authority {
    jwt_key: (EncodingKey, DecodingKey),
}

impl Authority {
    pub fn new(jwt_key: &[u8]) -> Self {
        Self {
            jwt_key: (EncodingKey::from_secret(jwt_key), DecodingKey::from_secret(jwt_key)),
        }
    }

    /// Issue a token for the given operator account, valid for 24 hours.
    pub fn issue_for(&self, user: &user::Model) -> String {
        let claims = Claims {
            sub: user.id,
            username: user.username.clone(),
            role: user.role.clone(),
            exp: (Utc::now() + Duration::hours(consts::TOKEN_TTL_HOURS)).timestamp(),
        };

        encode(&Header::default(), &claims, &self.jwt_key.0).unwrap()
    }

    pub fn authorize(&self, token: impl AsRef<str>) -> Result<Claims, AuthError> {
        let payload = decode::<Claims>(token.as_ref(), &self.jwt_key.1, &Validation::default())
            .map_err(|err| match err.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => AuthError::Malformed,
            })?;

        Ok(payload.claims)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    pub role: RoleType,
    pub exp: i64,
}

pub fn hash_password(password: &str) -> Vec<u8> {
    Sha256::digest(password).to_vec()
}

/// The front-end keys off the exact `jwt expired` / `jwt malformed`
/// wording to decide between re-login and a hard error.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("jwt malformed")]
    Missing,
    #[error("jwt malformed")]
    Malformed,
    #[error("jwt expired")]
    Expired,
    #[error("jwt malformed")]
    UnknownUser,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("user is inactive")]
    Inactive,
    #[error("insufficient permissions")]
    Forbidden,
}

impl actix_web::error::ResponseError for AuthError {
    fn error_response(&self) -> HttpResponse<body::BoxBody> {
        HttpResponse::build(self.status_code())
            .json(serde_json::json!({ "success": false, "error": self.to_string() }))
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AuthError::Missing
            | AuthError::Malformed
            | AuthError::Expired
            | AuthError::UnknownUser
            | AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthError::Inactive | AuthError::Forbidden => StatusCode::FORBIDDEN,
        }
    }
}

impl RoleType {
    /// Coarse role-in-set check; the only permission model this API needs.
    pub fn permits(&self, allowed: &[RoleType]) -> bool {
        allowed.contains(self)
    }
}

/// Roles allowed to run the scanner station: record entries/exits and
/// manage employee records.
pub const RECORDING_ROLES: [RoleType; 3] = [RoleType::SuperAdmin, RoleType::Admin, RoleType::Scanner];

/// Operator identity resolved from the bearer token, re-checked against the
/// user table so deactivated accounts lose access before their token expires.
#[derive(Debug, Clone, Serialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub username: String,
    pub role: RoleType,
}

impl FromRequest for AuthUser {
    type Error = ApiError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut dev::Payload) -> Self::Future {
        let req = req.clone();

        Box::pin(async move {
            // Grabs the value after the space in the `Authorization` header
            // Example: Bearer sometoken
            //                 ^ grabs this value
            let Some(Ok(Some((_, token)))) = req.headers()
                .get("Authorization")
                .map(|v|
                    v.to_str()
                        .map(|str| str.split_once(" "))
                )
            else {
                return Err(AuthError::Missing.into())
            };

            let authority = req.app_data::<web::Data<Authority>>().expect("Authority must be attached");
            let claims = authority.authorize(token)?;

            let db = req.app_data::<web::Data<DatabaseConnection>>().expect("DatabaseConnection must be attached");

            let Some(user) = User::find_by_id(claims.sub).one(db.as_ref()).await? else {
                return Err(AuthError::UnknownUser.into())
            };

            if !user.is_active {
                return Err(AuthError::Inactive.into())
            }

            Ok(Self {
                id: user.id,
                username: user.username,
                role: user.role,
            })
        })
    }
}

/// Gate for the scanner station endpoints.
pub struct Recorder(pub AuthUser);

impl Deref for Recorder {
    type Target = AuthUser;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequest for Recorder {
    type Error = ApiError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut dev::Payload) -> Self::Future {
        let req = req.clone();

        Box::pin(async move {
            let user = AuthUser::from_request(&req, &mut dev::Payload::None).await?;

            if !user.role.permits(&RECORDING_ROLES) {
                return Err(AuthError::Forbidden.into())
            }

            Ok(Self(user))
        })
    }
}

/// Gate for account management and payroll reports.
pub struct SuperAdmin(pub AuthUser);

impl Deref for SuperAdmin {
    type Target = AuthUser;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequest for SuperAdmin {
    type Error = ApiError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut dev::Payload) -> Self::Future {
        let req = req.clone();

        Box::pin(async move {
            let user = AuthUser::from_request(&req, &mut dev::Payload::None).await?;

            if !user.role.permits(&[RoleType::SuperAdmin]) {
                return Err(AuthError::Forbidden.into())
            }

            Ok(Self(user))
        })
    }
}

#[cfg(test)]
pub(crate) fn test_user(role: RoleType) -> user::Model {
    use chrono::Local;

    user::Model {
        id: Uuid::new_v4(),
        created_at: Local::now().into(),
        updated_at: Local::now().into(),
        username: "bob".to_string(),
        password: hash_password("secret"),
        role,
        is_active: true,
    }
}
