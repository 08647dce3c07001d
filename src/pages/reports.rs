use std::collections::{BTreeMap, HashSet};

use actix_web::{get, web, HttpResponse};
use sea_orm::{
    prelude::{Date, DateTimeWithTimeZone},
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    auth::{AuthUser, SuperAdmin},
    entity::{attendance, employee, prelude::*, sea_orm_active_enums::EmployeeType},
    error::ApiError,
    payroll::{coerce_quantity, production_pay, salaried_pay, tally_by_employee, EmployeeTally},
};

use model::*;

mod model;

pub(super) fn config(cfg: &mut web::ServiceConfig) {
    cfg
        .service(weekly_report)
        .service(daily_report)
        .service(dashboard_daily);
}

/// Fold one range of attendance rows into the full weekly payroll payload.
/// Everything derives from the same row set, so the per-day counts, the
/// range totals and the payroll lists always agree with each other.
fn build_weekly_report(rows: Vec<(attendance::Model, employee::Model)>) -> WeeklyData {
    let mut by_day: BTreeMap<Date, HashSet<Uuid>> = BTreeMap::new();
    let mut production_totals = ProductionTotals::default();
    let mut al_dia_totals = AlDiaTotals::default();

    for (record, employee) in &rows {
        by_day.entry(record.date).or_default().insert(employee.id);

        match employee.r#type {
            EmployeeType::Produccion => {
                production_totals.total_despalillo += coerce_quantity(record.despalillo);
                production_totals.total_escogida += coerce_quantity(record.escogida);
                production_totals.total_monado += coerce_quantity(record.monado);
            }
            EmployeeType::AlDia => {
                al_dia_totals.total_hours_extra += coerce_quantity(record.hours_extra);
                al_dia_totals.total_days_worked += 1;
            }
        }
    }

    let mut production = Vec::new();
    let mut al_dia = Vec::new();

    for (employee, tally) in tally_by_employee(rows) {
        match tally {
            EmployeeTally::Production(tally) => {
                let pay = production_pay(&tally);

                production.push(ProductionEntry {
                    employee_id: employee.id,
                    employee: employee.name,
                    dni: employee.dni,
                    r#type: EmployeeType::Produccion,
                    despalillo: tally.despalillo,
                    escogida: tally.escogida,
                    monado: tally.monado,
                    production_money: pay.production_money,
                    saturday_bonus: pay.saturday_bonus,
                    seventh_day: pay.seventh_day,
                    net_pay: pay.net_pay,
                });
            }
            EmployeeTally::Salaried(tally) => {
                let pay = salaried_pay(employee.monthly_salary, &tally);

                al_dia.push(AlDiaEntry {
                    employee_id: employee.id,
                    employee: employee.name,
                    dni: employee.dni,
                    r#type: EmployeeType::AlDia,
                    days_worked: tally.days_worked,
                    hours_extra: tally.hours_extra,
                    hours_extra_money: pay.hours_extra_money,
                    seventh_day: pay.seventh_day,
                    daily_salary: pay.daily_salary,
                    net_pay: pay.net_pay,
                });
            }
        }
    }

    let total_production_payroll: f64 = production.iter().map(|entry| entry.net_pay).sum();
    let total_aldia_payroll: f64 = al_dia.iter().map(|entry| entry.net_pay).sum();

    WeeklyData {
        summary_by_day: by_day
            .into_iter()
            .map(|(date, present)| DayPresence { date, present_count: present.len() as u64 })
            .collect(),
        production_totals,
        al_dia_totals,
        summary: PayrollSummary {
            total_employees: production.len() + al_dia.len(),
            total_production_payroll,
            total_aldia_payroll,
            total_payroll: total_production_payroll + total_aldia_payroll,
        },
        production,
        al_dia,
    }
}

#[get("/weekly")]
async fn weekly_report(
    db: web::Data<DatabaseConnection>,
    _admin: SuperAdmin,
    query: web::Query<RangeQuery>,
) -> Result<HttpResponse, ApiError> {
    if query.end_date < query.start_date {
        return Err(ApiError::validation("end_date is lower than start_date"));
    }

    let records = Attendance::find()
        .filter(attendance::Column::Date.between(query.start_date, query.end_date))
        .all(db.get_ref()).await?;

    let rows = super::with_employees(db.get_ref(), records).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "data": build_weekly_report(rows),
    })))
}

#[get("/daily")]
async fn daily_report(
    db: web::Data<DatabaseConnection>,
    _admin: SuperAdmin,
    query: web::Query<DateQuery>,
) -> Result<HttpResponse, ApiError> {
    let records = Attendance::find()
        .filter(attendance::Column::Date.eq(query.date))
        .all(db.get_ref()).await?;

    let mut rows = super::with_employees(db.get_ref(), records).await?;
    rows.sort_by(|(_, a), (_, b)| a.name.cmp(&b.name));

    let data: Vec<DailyRow> = rows
        .into_iter()
        .map(|(record, employee)| DailyRow {
            id: record.id,
            employee_id: employee.id,
            employee_name: employee.name,
            employee_type: employee.r#type,
            monthly_salary: employee.monthly_salary,
            date: record.date,
            hours_extra: record.hours_extra,
            exit_time: record.exit_time,
        })
        .collect();

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "data": data,
    })))
}

/// Same-day detail for the dashboard: who clocked in, who is still missing
/// an entry or an exit, and the day's raw totals.
#[get("/dashboard-daily")]
async fn dashboard_daily(
    db: web::Data<DatabaseConnection>,
    _user: AuthUser,
    query: web::Query<DateQuery>,
) -> Result<HttpResponse, ApiError> {
    let records = Attendance::find()
        .filter(attendance::Column::Date.eq(query.date))
        .all(db.get_ref()).await?;

    let mut rows = super::with_employees(db.get_ref(), records).await?;
    rows.sort_by(|(_, a), (_, b)| a.name.cmp(&b.name));

    let all_employees = Employee::find()
        .filter(employee::Column::IsActive.eq(true))
        .order_by_asc(employee::Column::Name)
        .all(db.get_ref()).await?;

    let present: HashSet<Uuid> = rows.iter().map(|(_, employee)| employee.id).collect();

    let pending_entry: Vec<PendingEntry> = all_employees
        .into_iter()
        .filter(|employee| !present.contains(&employee.id))
        .map(|employee| PendingEntry {
            employee_id: employee.id,
            employee_name: employee.name,
            employee_type: employee.r#type,
            photo: employee.photo,
        })
        .collect();

    let pending_exit: Vec<PendingExit> = rows
        .iter()
        .filter(|(record, _)| record.exit_time.is_none())
        .map(|(record, employee)| PendingExit {
            employee_id: employee.id,
            employee_name: employee.name.clone(),
            employee_type: employee.r#type.clone(),
            entry_time: record.entry_time,
            photo: employee.photo.clone(),
        })
        .collect();

    let mut prod_totals = DailyProductionTotals::default();
    let mut extra_totals = 0.0;
    for (record, _) in &rows {
        prod_totals.despalillo += coerce_quantity(record.despalillo);
        prod_totals.escogida += coerce_quantity(record.escogida);
        prod_totals.monado += coerce_quantity(record.monado);
        extra_totals += coerce_quantity(record.hours_extra);
    }

    let attendance: Vec<DashboardDailyRow> = rows
        .into_iter()
        .map(|(record, employee)| DashboardDailyRow {
            employee_id: employee.id,
            employee: employee.name,
            employee_type: employee.r#type,
            despalillo: record.despalillo,
            escogida: record.escogida,
            monado: record.monado,
            hours_extra: record.hours_extra,
            entry_time: record.entry_time,
            exit_time: record.exit_time,
        })
        .collect();

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "data": {
            "attendance": attendance,
            "prod_totals": prod_totals,
            "extra_totals": extra_totals,
            "pending_entry": pending_entry,
            "pending_exit": pending_exit,
        },
    })))
}
