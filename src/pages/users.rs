use actix_web::{delete, get, post, put, web, HttpResponse};
use chrono::Local;
use sea_orm::{ActiveValue::{Set, Unchanged}, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    auth::{hash_password, SuperAdmin},
    consts::MIN_PASSWORD_LEN,
    entity::{prelude::*, sea_orm_active_enums::RoleType, user},
    error::ApiError,
};

pub(super) fn config(cfg: &mut web::ServiceConfig) {
    cfg
        .service(list_users)
        .service(get_user)
        .service(create_user)
        .service(update_user)
        .service(delete_user);
}

/// Operator account without the password digest.
#[derive(Debug, Serialize)]
pub(super) struct UserPublic {
    pub id: Uuid,
    pub username: String,
    pub role: RoleType,
    pub created_at: sea_orm::prelude::DateTimeWithTimeZone,
    pub updated_at: sea_orm::prelude::DateTimeWithTimeZone,
}

impl From<user::Model> for UserPublic {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            username: user.username,
            role: user.role,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

fn validate_username(username: &str) -> Result<(), ApiError> {
    if username.is_empty() {
        return Err(ApiError::validation("username is required"));
    }
    if username.contains(char::is_whitespace) {
        return Err(ApiError::validation("username cannot contain whitespace"));
    }

    Ok(())
}

fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::validation(format!("password must be at least {MIN_PASSWORD_LEN} characters")));
    }

    Ok(())
}

async fn find_duplicate_username(
    db: &DatabaseConnection,
    username: &str,
    excluding: Option<Uuid>,
) -> Result<bool, ApiError> {
    let mut query = User::find()
        .filter(user::Column::Username.eq(username))
        .filter(user::Column::IsActive.eq(true));

    if let Some(id) = excluding {
        query = query.filter(user::Column::Id.ne(id));
    }

    Ok(query.one(db).await?.is_some())
}

#[get("")]
async fn list_users(db: web::Data<DatabaseConnection>, _admin: SuperAdmin) -> Result<HttpResponse, ApiError> {
    let users = User::find()
        .filter(user::Column::IsActive.eq(true))
        .order_by_desc(user::Column::CreatedAt)
        .all(db.get_ref()).await?;

    let data: Vec<UserPublic> = users.into_iter().map(UserPublic::from).collect();

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "count": data.len(),
        "data": data,
    })))
}

#[get("/{user_id}")]
async fn get_user(db: web::Data<DatabaseConnection>, _admin: SuperAdmin, user_id: web::Path<Uuid>) -> Result<HttpResponse, ApiError> {
    let Some(user) = User::find_by_id(*user_id)
        .filter(user::Column::IsActive.eq(true))
        .one(db.get_ref()).await?
    else {
        return Err(ApiError::not_found("user not found"));
    };

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "data": UserPublic::from(user),
    })))
}

#[derive(Debug, Deserialize)]
struct CreateUser {
    username: String,
    password: String,
    role: RoleType,
}

#[post("")]
async fn create_user(db: web::Data<DatabaseConnection>, _admin: SuperAdmin, payload: web::Json<CreateUser>) -> Result<HttpResponse, ApiError> {
    let username = payload.username.trim();

    validate_username(username)?;
    validate_password(&payload.password)?;

    if find_duplicate_username(db.get_ref(), username, None).await? {
        return Err(ApiError::conflict("a user with this username already exists"));
    }

    let model = user::ActiveModel {
        created_at: Set(Local::now().fixed_offset()),
        updated_at: Set(Local::now().fixed_offset()),
        username: Set(username.to_string()),
        password: Set(hash_password(&payload.password)),
        role: Set(payload.role.clone()),
        is_active: Set(true),
        ..Default::default()
    };

    let user = User::insert(model)
        .exec_with_returning(db.get_ref()).await?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "success": true,
        "message": "user created",
        "data": UserPublic::from(user),
    })))
}

#[derive(Debug, Deserialize)]
struct UpdateUser {
    username: String,
    role: RoleType,
    password: Option<String>,
}

#[put("/{user_id}")]
async fn update_user(db: web::Data<DatabaseConnection>, _admin: SuperAdmin, user_id: web::Path<Uuid>, payload: web::Json<UpdateUser>) -> Result<HttpResponse, ApiError> {
    let username = payload.username.trim();

    validate_username(username)?;

    let Some(_) = User::find_by_id(*user_id)
        .filter(user::Column::IsActive.eq(true))
        .one(db.get_ref()).await?
    else {
        return Err(ApiError::not_found("user not found"));
    };

    if find_duplicate_username(db.get_ref(), username, Some(*user_id)).await? {
        return Err(ApiError::conflict("another user already has this username"));
    }

    let mut model = user::ActiveModel {
        id: Unchanged(*user_id),
        username: Set(username.to_string()),
        role: Set(payload.role.clone()),
        updated_at: Set(Local::now().fixed_offset()),
        ..Default::default()
    };

    if let Some(password) = payload.password.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
        validate_password(password)?;
        model.password = Set(hash_password(password));
    }

    let updated = User::update(model).exec(db.get_ref()).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "user updated",
        "data": UserPublic::from(updated),
    })))
}

#[delete("/{user_id}")]
async fn delete_user(db: web::Data<DatabaseConnection>, _admin: SuperAdmin, user_id: web::Path<Uuid>) -> Result<HttpResponse, ApiError> {
    let Some(existing) = User::find_by_id(*user_id)
        .filter(user::Column::IsActive.eq(true))
        .one(db.get_ref()).await?
    else {
        return Err(ApiError::not_found("user not found"));
    };

    if existing.role == RoleType::SuperAdmin {
        return Err(ApiError::validation("a super_admin account cannot be deleted"));
    }

    User::update(user::ActiveModel {
        id: Unchanged(existing.id),
        is_active: Set(false),
        updated_at: Set(Local::now().fixed_offset()),
        ..Default::default()
    }).exec(db.get_ref()).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "user deleted",
    })))
}

#[cfg(test)]
mod tests {
    use actix_web::{http::{Method, StatusCode}, test, App};
    use sea_orm::{DatabaseBackend, MockDatabase};

    use crate::auth::{test_user, Authority};

    use super::*;

    const SECRET: &[u8] = b"secret";

    fn authed(method: Method, uri: &str, token: &str) -> test::TestRequest {
        test::TestRequest::default()
            .uri(uri)
            .method(method)
            .insert_header(("Authorization", format!("Bearer {token}")))
    }

    #[actix_web::test]
    async fn test_list_users_requires_super_admin() {
        let viewer = test_user(RoleType::Viewer);
        let token = Authority::new(SECRET).issue_for(&viewer);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([
                vec![ viewer ],
            ]);

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(Authority::new(SECRET)))
                .app_data(web::Data::new(db.into_connection()))
                .service(web::scope("/users").configure(config))
        ).await;

        let response = test::call_service(&app, authed(Method::GET, "/users", &token).to_request()).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn test_create_user_validations() {
        let admin = test_user(RoleType::SuperAdmin);
        let token = Authority::new(SECRET).issue_for(&admin);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([
                vec![ admin.clone() ],
                vec![ admin.clone() ],
            ]);

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(Authority::new(SECRET)))
                .app_data(web::Data::new(db.into_connection()))
                .service(web::scope("/users").service(create_user))
        ).await;

        {
            let req = authed(Method::POST, "/users", &token)
                .set_json(serde_json::json!({
                    "username": "has space",
                    "password": "longenough",
                    "role": "viewer",
                }))
                .to_request();

            let response = test::call_service(&app, req).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        }

        {
            let req = authed(Method::POST, "/users", &token)
                .set_json(serde_json::json!({
                    "username": "carla",
                    "password": "short",
                    "role": "viewer",
                }))
                .to_request();

            let response = test::call_service(&app, req).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        }
    }

    #[actix_web::test]
    async fn test_create_user_rejects_duplicate_username() {
        let admin = test_user(RoleType::SuperAdmin);
        let existing = test_user(RoleType::Viewer);
        let token = Authority::new(SECRET).issue_for(&admin);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([
                vec![ admin ],
                vec![ existing ],
            ]);

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(Authority::new(SECRET)))
                .app_data(web::Data::new(db.into_connection()))
                .service(web::scope("/users").service(create_user))
        ).await;

        let req = authed(Method::POST, "/users", &token)
            .set_json(serde_json::json!({
                "username": "bob",
                "password": "longenough",
                "role": "scanner",
            }))
            .to_request();

        let response = test::call_service(&app, req).await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[actix_web::test]
    async fn test_create_user_success() {
        let admin = test_user(RoleType::SuperAdmin);
        let token = Authority::new(SECRET).issue_for(&admin);

        let mut created = test_user(RoleType::Scanner);
        created.username = "carla".to_string();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([
                vec![ admin ],
                Vec::new(),
                vec![ created.clone() ],
            ]);

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(Authority::new(SECRET)))
                .app_data(web::Data::new(db.into_connection()))
                .service(web::scope("/users").service(create_user))
        ).await;

        let req = authed(Method::POST, "/users", &token)
            .set_json(serde_json::json!({
                "username": "carla",
                "password": "longenough",
                "role": "scanner",
            }))
            .to_request();

        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["username"], "carla");
        assert_eq!(body["data"]["role"], "scanner");
        assert!(body["data"].get("password").is_none());
    }

    #[actix_web::test]
    async fn test_delete_super_admin_is_rejected() {
        let admin = test_user(RoleType::SuperAdmin);
        let target = test_user(RoleType::SuperAdmin);
        let token = Authority::new(SECRET).issue_for(&admin);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([
                vec![ admin ],
                vec![ target.clone() ],
            ]);

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(Authority::new(SECRET)))
                .app_data(web::Data::new(db.into_connection()))
                .service(web::scope("/users").service(delete_user))
        ).await;

        let req = authed(Method::DELETE, &format!("/users/{}", target.id), &token).to_request();

        let response = test::call_service(&app, req).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
