use std::collections::{HashMap, HashSet};

use actix_web::{get, web, HttpResponse, Responder};
use chrono::Utc;
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter};
use uuid::Uuid;

use crate::entity::{employee, prelude::Employee};

mod auth;
mod users;
mod employees;
mod attendance;
mod reports;
mod dashboard;
mod dev;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg
        .service(web::scope("/api/auth")
            .configure(auth::config))
        .service(web::scope("/api/users")
            .configure(users::config))
        .service(web::scope("/api/employees")
            .configure(employees::config))
        .service(web::scope("/api/attendance")
            .configure(attendance::config))
        .service(web::scope("/api/reports")
            .configure(reports::config))
        .service(web::scope("/api/dashboard")
            .configure(dashboard::config))
        .service(web::scope("/api/dev")
            .configure(dev::config))
        .service(health);
}

#[get("/api/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "OK",
        "message": "service running",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

/// Attach each attendance row to its employee. Rows whose employee vanished
/// from under the foreign key are dropped rather than failing the request.
pub(crate) async fn with_employees(
    db: &DatabaseConnection,
    records: Vec<crate::entity::attendance::Model>,
) -> Result<Vec<(crate::entity::attendance::Model, employee::Model)>, DbErr> {
    if records.is_empty() {
        return Ok(Vec::new());
    }

    let ids: HashSet<Uuid> = records.iter().map(|record| record.employee_id).collect();

    let employees: HashMap<Uuid, employee::Model> = Employee::find()
        .filter(employee::Column::Id.is_in(ids))
        .all(db).await?
        .into_iter()
        .map(|employee| (employee.id, employee))
        .collect();

    Ok(records
        .into_iter()
        .filter_map(|record| {
            employees
                .get(&record.employee_id)
                .cloned()
                .map(|employee| (record, employee))
        })
        .collect())
}
