use std::collections::HashSet;

use actix_web::{get, web, HttpResponse};
use sea_orm::{
    prelude::{Date, DateTimeWithTimeZone},
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
};
use serde::Serialize;

use crate::{
    auth::AuthUser,
    clock::WorkClock,
    entity::{attendance, employee, prelude::*, sea_orm_active_enums::EmployeeType},
    error::ApiError,
};

pub(super) fn config(cfg: &mut web::ServiceConfig) {
    cfg
        .service(stats)
        .service(attendance_today);
}

#[derive(Debug, Serialize)]
struct RecentActivity {
    employee_name: String,
    date: Date,
    entry_time: DateTimeWithTimeZone,
    exit_time: Option<DateTimeWithTimeZone>,
    action_type: &'static str,
}

#[derive(Debug, Serialize)]
struct TodaySummary {
    name: String,
    r#type: EmployeeType,
    photo: Option<String>,
    entry_time: DateTimeWithTimeZone,
    exit_time: Option<DateTimeWithTimeZone>,
    hours_extra: f64,
    status: &'static str,
}

/// Hours between entry and exit, summed over closed records.
fn worked_hours(records: &[attendance::Model]) -> f64 {
    records
        .iter()
        .filter_map(|record| {
            record
                .exit_time
                .map(|exit| (exit - record.entry_time).num_seconds() as f64 / 3600.0)
        })
        .sum()
}

#[get("/stats")]
async fn stats(
    db: web::Data<DatabaseConnection>,
    clock: web::Data<WorkClock>,
    _user: AuthUser,
) -> Result<HttpResponse, ApiError> {
    let today = clock.today();

    let total_employees = Employee::find()
        .filter(employee::Column::IsActive.eq(true))
        .count(db.get_ref()).await?;

    let today_records = Attendance::find()
        .filter(attendance::Column::Date.eq(today))
        .order_by_desc(attendance::Column::EntryTime)
        .all(db.get_ref()).await?;

    let today_attendance = today_records.len();
    let pending_exits = today_records.iter().filter(|record| record.exit_time.is_none()).count();

    let week_records = Attendance::find()
        .filter(attendance::Column::Date.between(clock.rolling_week_start(), today))
        .all(db.get_ref()).await?;

    let weekly_employees = week_records
        .iter()
        .map(|record| record.employee_id)
        .collect::<HashSet<_>>()
        .len();
    let weekly_hours = (worked_hours(&week_records) * 10.0).round() / 10.0;

    let recent = super::with_employees(db.get_ref(), today_records.into_iter().take(5).collect()).await?;

    let recent_activity: Vec<RecentActivity> = recent
        .into_iter()
        .map(|(record, employee)| RecentActivity {
            employee_name: employee.name,
            date: record.date,
            action_type: if record.exit_time.is_none() { "entry" } else { "exit" },
            entry_time: record.entry_time,
            exit_time: record.exit_time,
        })
        .collect();

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "data": {
            "total_employees": total_employees,
            "today_attendance": today_attendance,
            "pending_exits": pending_exits,
            "weekly_hours": weekly_hours,
            "weekly_employees": weekly_employees,
            "recent_activity": recent_activity,
        },
        "last_updated": clock.now_local().to_rfc3339(),
    })))
}

#[get("/attendance-today")]
async fn attendance_today(
    db: web::Data<DatabaseConnection>,
    clock: web::Data<WorkClock>,
    _user: AuthUser,
) -> Result<HttpResponse, ApiError> {
    let today = clock.today();

    let records = Attendance::find()
        .filter(attendance::Column::Date.eq(today))
        .order_by_desc(attendance::Column::EntryTime)
        .all(db.get_ref()).await?;

    let rows = super::with_employees(db.get_ref(), records).await?;

    let data: Vec<TodaySummary> = rows
        .into_iter()
        .map(|(record, employee)| TodaySummary {
            name: employee.name,
            r#type: employee.r#type,
            photo: employee.photo,
            entry_time: record.entry_time,
            exit_time: record.exit_time,
            hours_extra: record.hours_extra,
            status: if record.exit_time.is_none() { "working" } else { "completed" },
        })
        .collect();

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "count": data.len(),
        "date": today,
        "data": data,
    })))
}
