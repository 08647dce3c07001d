use actix_web::{delete, web, HttpResponse};
use sea_orm::{DatabaseConnection, EntityTrait};

use crate::{auth::SuperAdmin, entity::prelude::*, error::ApiError};

pub(super) fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(reset_database);
}

/// Wipes operational data so a trial run can start over; operator accounts
/// survive. Attendance goes first, it references employees.
#[delete("/reset-database")]
async fn reset_database(db: web::Data<DatabaseConnection>, _admin: SuperAdmin) -> Result<HttpResponse, ApiError> {
    Attendance::delete_many().exec(db.get_ref()).await?;
    Employee::delete_many().exec(db.get_ref()).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "database reset, user accounts kept",
    })))
}
