use actix_web::{post, put, web, HttpResponse, Responder};
use chrono::Local;
use sea_orm::{ActiveValue::{Set, Unchanged}, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    auth::{hash_password, AuthError, AuthUser, Authority},
    consts::MIN_PASSWORD_LEN,
    entity::{prelude::*, sea_orm_active_enums::RoleType, user},
    error::ApiError,
};

use super::users::UserPublic;

pub(super) fn config(cfg: &mut web::ServiceConfig) {
    cfg
        .service(login)
        .service(verify)
        .service(update_profile);
}

#[derive(Debug, Serialize, Deserialize)]
struct Login {
    username: String,
    password: String,
}

#[derive(Debug, Serialize)]
struct SessionUser {
    id: Uuid,
    username: String,
    role: RoleType,
}

#[post("/login")]
async fn login(db: web::Data<DatabaseConnection>, authority: web::Data<Authority>, credentials: web::Json<Login>) -> Result<HttpResponse, ApiError> {
    // Front-end inputs arrive with stray whitespace more often than not.
    let username = credentials.username.trim();
    let password = credentials.password.trim();

    if username.is_empty() || password.is_empty() {
        return Err(ApiError::validation("username and password are required"));
    }

    let Some(user) = User::find()
        .filter(user::Column::Username.eq(username))
        .filter(user::Column::Password.eq(hash_password(password)))
        .filter(user::Column::IsActive.eq(true))
        .one(db.get_ref()).await?
    else {
        return Err(AuthError::InvalidCredentials.into());
    };

    let token = authority.issue_for(&user);

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "token": token,
        "user": SessionUser {
            id: user.id,
            username: user.username,
            role: user.role,
        },
    })))
}

#[post("/verify")]
async fn verify(user: AuthUser) -> impl Responder {
    web::Json(serde_json::json!({
        "success": true,
        "user": user,
    }))
}

#[derive(Debug, Deserialize)]
struct UpdateProfile {
    username: String,
    current_password: Option<String>,
    new_password: Option<String>,
}

#[put("/update-profile")]
async fn update_profile(db: web::Data<DatabaseConnection>, user: AuthUser, payload: web::Json<UpdateProfile>) -> Result<HttpResponse, ApiError> {
    let username = payload.username.trim();

    if username.is_empty() {
        return Err(ApiError::validation("username is required"));
    }
    if username.contains(char::is_whitespace) {
        return Err(ApiError::validation("username cannot contain whitespace"));
    }

    let Some(current) = User::find_by_id(user.id)
        .filter(user::Column::IsActive.eq(true))
        .one(db.get_ref()).await?
    else {
        return Err(ApiError::not_found("user not found"));
    };

    let duplicate = User::find()
        .filter(user::Column::Username.eq(username))
        .filter(user::Column::Id.ne(user.id))
        .filter(user::Column::IsActive.eq(true))
        .one(db.get_ref()).await?;

    if duplicate.is_some() {
        return Err(ApiError::conflict("another user already has this username"));
    }

    let mut model = user::ActiveModel {
        id: Unchanged(user.id),
        username: Set(username.to_string()),
        updated_at: Set(Local::now().fixed_offset()),
        ..Default::default()
    };

    if let Some(new_password) = payload.new_password.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
        let Some(current_password) = payload.current_password.as_deref() else {
            return Err(ApiError::validation("current password is required to change the password"));
        };

        if hash_password(current_password) != current.password {
            return Err(ApiError::validation("current password is incorrect"));
        }

        if new_password.len() < MIN_PASSWORD_LEN {
            return Err(ApiError::validation(format!("password must be at least {MIN_PASSWORD_LEN} characters")));
        }

        model.password = Set(hash_password(new_password));
    }

    let updated = User::update(model).exec(db.get_ref()).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "profile updated",
        "data": UserPublic::from(updated),
    })))
}
