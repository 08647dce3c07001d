use actix_web::{delete, dev, get, post, put, web, FromRequest, HttpRequest, HttpResponse};
use chrono::{Days, Local};
use futures_util::future::LocalBoxFuture;
use sea_orm::{ActiveValue::{Set, Unchanged}, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    assets::AssetStore,
    auth::{AuthUser, Recorder},
    clock::WorkClock,
    consts::DNI_LEN,
    entity::{attendance, employee, prelude::*, sea_orm_active_enums::EmployeeType},
    error::ApiError,
    payroll::{production_pay, salaried_pay, ProductionTally, SalariedTally},
};

use model::*;

mod extractor;
mod model;

pub(super) fn config(cfg: &mut web::ServiceConfig) {
    cfg
        .service(list_employees)
        .service(create_employee)
        .service(update_employee)
        .service(delete_employee)
        .service(employee_stats);
}

fn validate_dni(dni: &str) -> Result<(), ApiError> {
    if dni.len() != DNI_LEN || !dni.chars().all(|c| c.is_ascii_digit()) {
        return Err(ApiError::validation(format!("dni must be exactly {DNI_LEN} digits")));
    }

    Ok(())
}

#[get("")]
async fn list_employees(db: web::Data<DatabaseConnection>, _user: AuthUser) -> Result<HttpResponse, ApiError> {
    let employees = Employee::find()
        .filter(employee::Column::IsActive.eq(true))
        .order_by_desc(employee::Column::CreatedAt)
        .all(db.get_ref()).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "count": employees.len(),
        "data": employees,
    })))
}

#[post("")]
async fn create_employee(
    db: web::Data<DatabaseConnection>,
    assets: web::Data<dyn AssetStore>,
    _recorder: Recorder,
    payload: web::Json<CreateEmployee>,
) -> Result<HttpResponse, ApiError> {
    let dni = payload.dni.trim();
    validate_dni(dni)?;

    let name = payload.name.trim();
    if name.is_empty() {
        return Err(ApiError::validation("name is required"));
    }

    let duplicate = Employee::find()
        .filter(employee::Column::Dni.eq(dni))
        .filter(employee::Column::IsActive.eq(true))
        .one(db.get_ref()).await?;

    if duplicate.is_some() {
        return Err(ApiError::conflict("an employee with this dni already exists"));
    }

    let model = employee::ActiveModel {
        created_at: Set(Local::now().fixed_offset()),
        updated_at: Set(Local::now().fixed_offset()),
        dni: Set(dni.to_string()),
        name: Set(name.to_string()),
        r#type: Set(payload.r#type.clone()),
        monthly_salary: Set(payload.monthly_salary.unwrap_or(0.0)),
        photo: Set(payload.photo.clone()),
        is_active: Set(true),
        ..Default::default()
    };

    let employee = Employee::insert(model)
        .exec_with_returning(db.get_ref()).await?;

    // The QR encodes nothing but the employee id; the scanner station
    // looks everything else up itself.
    let qr_url = assets.publish_qr(&employee.id.to_string()).await;

    if let Some(qr_url) = &qr_url {
        Employee::update(employee::ActiveModel {
            id: Unchanged(employee.id),
            qr_code: Set(Some(qr_url.clone())),
            updated_at: Set(Local::now().fixed_offset()),
            ..Default::default()
        }).exec(db.get_ref()).await?;
    }

    Ok(HttpResponse::Created().json(serde_json::json!({
        "success": true,
        "message": "employee created",
        "employee_id": employee.id,
        "qr_url": qr_url,
    })))
}

#[put("/{employee_id}")]
async fn update_employee(
    db: web::Data<DatabaseConnection>,
    assets: web::Data<dyn AssetStore>,
    _recorder: Recorder,
    employee: employee::Model,
    payload: web::Json<UpdateEmployee>,
) -> Result<HttpResponse, ApiError> {
    let mut model = employee::ActiveModel {
        id: Unchanged(employee.id),
        updated_at: Set(Local::now().fixed_offset()),
        ..Default::default()
    };

    let mut dni_changed = false;

    if let Some(dni) = payload.dni.as_deref().map(str::trim) {
        validate_dni(dni)?;

        if dni != employee.dni {
            let duplicate = Employee::find()
                .filter(employee::Column::Dni.eq(dni))
                .filter(employee::Column::Id.ne(employee.id))
                .filter(employee::Column::IsActive.eq(true))
                .one(db.get_ref()).await?;

            if duplicate.is_some() {
                return Err(ApiError::conflict("an employee with this dni already exists"));
            }

            dni_changed = true;
        }

        model.dni = Set(dni.to_string());
    }

    if let Some(name) = payload.name.as_deref().map(str::trim) {
        if name.is_empty() {
            return Err(ApiError::validation("name cannot be empty"));
        }

        model.name = Set(name.to_string());
    }

    if let Some(r#type) = &payload.r#type {
        model.r#type = Set(r#type.clone());
    }

    if let Some(monthly_salary) = payload.monthly_salary {
        model.monthly_salary = Set(monthly_salary);
    }

    if payload.remove_photo == Some(true) {
        model.photo = Set(None);
    } else if let Some(photo) = &payload.photo {
        model.photo = Set(Some(photo.clone()));
    }

    // The QR payload is the id, which never changes, but a new dni means a
    // new badge gets printed, so refresh the stored image alongside it.
    if dni_changed {
        if let Some(qr_url) = assets.publish_qr(&employee.id.to_string()).await {
            model.qr_code = Set(Some(qr_url));
        }
    }

    let updated = Employee::update(model).exec(db.get_ref()).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "employee updated",
        "data": updated,
    })))
}

#[delete("/{employee_id}")]
async fn delete_employee(
    db: web::Data<DatabaseConnection>,
    _recorder: Recorder,
    employee: employee::Model,
) -> Result<HttpResponse, ApiError> {
    Employee::update(employee::ActiveModel {
        id: Unchanged(employee.id),
        is_active: Set(false),
        updated_at: Set(Local::now().fixed_offset()),
        ..Default::default()
    }).exec(db.get_ref()).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "employee deleted",
    })))
}

/// Running payroll stats for one employee: the current calendar month for
/// piece-rate workers, the current Monday-based week for day-rate workers.
/// Only closed sessions count.
#[get("/{employee_id}/stats")]
async fn employee_stats(
    db: web::Data<DatabaseConnection>,
    clock: web::Data<WorkClock>,
    _user: AuthUser,
    employee: employee::Model,
) -> Result<HttpResponse, ApiError> {
    let data = match employee.r#type {
        EmployeeType::Produccion => {
            let (start, end) = clock.month_range();

            let records = Attendance::find()
                .filter(attendance::Column::EmployeeId.eq(employee.id))
                .filter(attendance::Column::Date.gte(start))
                .filter(attendance::Column::Date.lt(end))
                .filter(attendance::Column::ExitTime.is_not_null())
                .all(db.get_ref()).await?;

            let mut tally = ProductionTally::default();
            for record in &records {
                tally.add_record(record);
            }

            let pay = production_pay(&tally);

            StatsData::Production(ProductionStats {
                r#type: EmployeeType::Produccion,
                days_worked: tally.days_worked,
                despalillo: tally.despalillo,
                escogida: tally.escogida,
                monado: tally.monado,
                total_despalillo: pay.total_despalillo,
                total_escogida: pay.total_escogida,
                total_monado: pay.total_monado,
                saturday_bonus: pay.saturday_bonus,
                seventh_day: pay.seventh_day,
                net_pay: pay.net_pay,
            })
        }
        EmployeeType::AlDia => {
            let week_start = clock.week_start();
            let week_end = week_start.checked_add_days(Days::new(7)).expect("date in range");

            let records = Attendance::find()
                .filter(attendance::Column::EmployeeId.eq(employee.id))
                .filter(attendance::Column::Date.gte(week_start))
                .filter(attendance::Column::Date.lt(week_end))
                .filter(attendance::Column::ExitTime.is_not_null())
                .all(db.get_ref()).await?;

            let mut tally = SalariedTally::default();
            for record in &records {
                tally.add_record(record);
            }

            let pay = salaried_pay(employee.monthly_salary, &tally);

            StatsData::Salaried(SalariedStats {
                r#type: EmployeeType::AlDia,
                days_worked: tally.days_worked,
                hours_extra: tally.hours_extra,
                hours_extra_money: pay.hours_extra_money,
                daily_salary: pay.daily_salary,
                seventh_day: pay.seventh_day,
                net_pay: pay.net_pay,
            })
        }
    };

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "data": data,
    })))
}
