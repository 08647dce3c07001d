use actix_web::{get, post, web, HttpResponse};
use sea_orm::{
    prelude::{Date, DateTimeWithTimeZone},
    ActiveValue::{Set, Unchanged},
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, SqlErr,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    auth::{AuthUser, Recorder},
    clock::WorkClock,
    entity::{attendance, employee, prelude::*, sea_orm_active_enums::EmployeeType},
    error::ApiError,
    payroll::coerce_quantity,
};

use model::*;

mod model;

pub(super) fn config(cfg: &mut web::ServiceConfig) {
    cfg
        .service(record_entry)
        .service(record_exit)
        .service(today_attendance);
}

#[post("/entry")]
async fn record_entry(
    db: web::Data<DatabaseConnection>,
    clock: web::Data<WorkClock>,
    _recorder: Recorder,
    payload: web::Json<RecordEntry>,
) -> Result<HttpResponse, ApiError> {
    let today = clock.today();

    let Some(employee) = Employee::find_by_id(payload.employee_id)
        .filter(employee::Column::IsActive.eq(true))
        .one(db.get_ref()).await?
    else {
        return Err(ApiError::not_found("employee not found or inactive"));
    };

    let existing = Attendance::find()
        .filter(attendance::Column::EmployeeId.eq(employee.id))
        .filter(attendance::Column::Date.eq(today))
        .one(db.get_ref()).await?;

    if let Some(existing) = existing {
        return Err(if existing.exit_time.is_none() {
            ApiError::conflict("an entry is already open for today, record the exit first")
        } else {
            ApiError::conflict("the employee already completed a session today")
        });
    }

    let now = clock.now_local();

    let model = attendance::ActiveModel {
        created_at: Set(now),
        updated_at: Set(now),
        employee_id: Set(employee.id),
        date: Set(today),
        entry_time: Set(now),
        exit_time: Set(None),
        hours_extra: Set(0.0),
        despalillo: Set(0.0),
        escogida: Set(0.0),
        monado: Set(0.0),
        ..Default::default()
    };

    let record = match Attendance::insert(model).exec_with_returning(db.get_ref()).await {
        Ok(record) => record,
        // A concurrent entry for the same employee lost the race against
        // the (employee_id, date) unique index.
        Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            return Err(ApiError::conflict("an entry is already open for today, record the exit first"));
        }
        Err(err) => return Err(err.into()),
    };

    Ok(HttpResponse::Created().json(EntryResponse {
        success: true,
        message: format!("Entry recorded for {}", employee.name),
        data: EntryData {
            id: record.id,
            employee_id: employee.id,
            employee_name: employee.name,
            employee_type: employee.r#type,
            date: record.date,
            entry_time: record.entry_time,
            status: "active",
        },
    }))
}

#[post("/exit")]
async fn record_exit(
    db: web::Data<DatabaseConnection>,
    clock: web::Data<WorkClock>,
    _recorder: Recorder,
    payload: web::Json<RecordExit>,
) -> Result<HttpResponse, ApiError> {
    let Some(employee) = Employee::find_by_id(payload.employee_id)
        .filter(employee::Column::IsActive.eq(true))
        .one(db.get_ref()).await?
    else {
        return Err(ApiError::not_found("employee not found or inactive"));
    };

    // Exits only close today's session; yesterday's forgotten exits stay
    // open and surface on the dashboard as pending.
    let Some(open) = Attendance::find()
        .filter(attendance::Column::EmployeeId.eq(employee.id))
        .filter(attendance::Column::Date.eq(clock.today()))
        .filter(attendance::Column::ExitTime.is_null())
        .one(db.get_ref()).await?
    else {
        return Err(ApiError::not_found("no open entry for today"));
    };

    let now = clock.now_local();
    let (hours_extra, despalillo, escogida, monado) = payload.quantities_for(&employee.r#type);

    Attendance::update(attendance::ActiveModel {
        id: Unchanged(open.id),
        updated_at: Set(now),
        exit_time: Set(Some(now)),
        hours_extra: Set(hours_extra),
        despalillo: Set(despalillo),
        escogida: Set(escogida),
        monado: Set(monado),
        ..Default::default()
    }).exec(db.get_ref()).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": format!("Exit recorded for {}", employee.name),
        "exit_time": now,
    })))
}

#[get("/today")]
async fn today_attendance(
    db: web::Data<DatabaseConnection>,
    clock: web::Data<WorkClock>,
    _user: AuthUser,
) -> Result<HttpResponse, ApiError> {
    let records = Attendance::find()
        .filter(attendance::Column::Date.eq(clock.today()))
        .order_by_desc(attendance::Column::EntryTime)
        .all(db.get_ref()).await?;

    let rows = super::with_employees(db.get_ref(), records).await?;

    let data: Vec<TodayRecord> = rows
        .into_iter()
        .map(|(record, employee)| TodayRecord {
            id: record.id,
            employee_id: employee.id,
            employee_name: employee.name,
            employee_dni: employee.dni,
            employee_type: employee.r#type,
            photo: employee.photo,
            entry_time: record.entry_time,
            exit_time: record.exit_time,
            entry_time_display: clock.display_time(Some(record.entry_time)),
            exit_time_display: clock.display_time(record.exit_time),
            date: record.date,
            is_working: record.exit_time.is_none(),
            status: if record.exit_time.is_none() { "active" } else { "completed" },
            hours_extra: coerce_quantity(record.hours_extra),
            despalillo: coerce_quantity(record.despalillo),
            escogida: coerce_quantity(record.escogida),
            monado: coerce_quantity(record.monado),
        })
        .collect();

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "count": data.len(),
        "data": data,
    })))
}

#[cfg(test)]
mod tests {
    use actix_web::{http::{Method, StatusCode}, test, App};
    use chrono::{FixedOffset, TimeZone as _, Utc};
    use sea_orm::{DatabaseBackend, MockDatabase};

    use crate::{
        auth::{test_user, Authority},
        entity::sea_orm_active_enums::RoleType,
        payroll::{test_employee, test_record},
    };

    use super::*;

    const SECRET: &[u8] = b"secret";

    fn frozen_clock() -> web::Data<WorkClock> {
        // 18:00 UTC on 2025-08-05 is noon in UTC-6.
        web::Data::new(WorkClock::frozen_at(Utc.with_ymd_and_hms(2025, 8, 5, 18, 0, 0).unwrap()))
    }

    #[core::prelude::v1::test]
    fn test_exit_quantities_follow_employee_type() {
        let payload = RecordExit {
            employee_id: Uuid::new_v4(),
            hours_extra: 3.0,
            despalillo: 10.0,
            escogida: -5.0,
            monado: 2.0,
        };

        assert_eq!(payload.quantities_for(&EmployeeType::AlDia), (3.0, 0.0, 0.0, 0.0));
        assert_eq!(payload.quantities_for(&EmployeeType::Produccion), (0.0, 10.0, 0.0, 2.0));
    }

    #[actix_web::test]
    async fn test_record_entry_creates_open_session() {
        let recorder = test_user(RoleType::Scanner);
        let token = Authority::new(SECRET).issue_for(&recorder);
        let maria = test_employee("Maria", EmployeeType::Produccion, 0.0);

        let mut created = test_record(&maria, (0.0, 0.0, 0.0, 0.0));
        created.exit_time = None;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([
                vec![ recorder ],
            ])
            .append_query_results([
                vec![ maria.clone() ],
            ])
            .append_query_results([
                Vec::new(),
                vec![ created ],
            ]);

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(Authority::new(SECRET)))
                .app_data(web::Data::new(db.into_connection()))
                .app_data(frozen_clock())
                .service(record_entry)
        ).await;

        let req = test::TestRequest::default()
            .uri("/entry")
            .method(Method::POST)
            .insert_header(("Authorization", format!("Bearer {token}")))
            .set_json(serde_json::json!({ "employee_id": maria.id }))
            .to_request();

        let response = test::call_service(&app, req).await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let body: serde_json::Value = test::read_body_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Entry recorded for Maria");
        assert_eq!(body["data"]["status"], "active");
        assert_eq!(body["data"]["employee_id"], maria.id.to_string());
    }

    #[actix_web::test]
    async fn test_record_entry_conflicts_with_open_session() {
        let recorder = test_user(RoleType::Scanner);
        let token = Authority::new(SECRET).issue_for(&recorder);
        let maria = test_employee("Maria", EmployeeType::Produccion, 0.0);

        let mut open = test_record(&maria, (0.0, 0.0, 0.0, 0.0));
        open.exit_time = None;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([
                vec![ recorder ],
            ])
            .append_query_results([
                vec![ maria.clone() ],
            ])
            .append_query_results([
                vec![ open ],
            ]);

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(Authority::new(SECRET)))
                .app_data(web::Data::new(db.into_connection()))
                .app_data(frozen_clock())
                .service(record_entry)
        ).await;

        let req = test::TestRequest::default()
            .uri("/entry")
            .method(Method::POST)
            .insert_header(("Authorization", format!("Bearer {token}")))
            .set_json(serde_json::json!({ "employee_id": maria.id }))
            .to_request();

        let response = test::call_service(&app, req).await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[actix_web::test]
    async fn test_record_entry_conflicts_with_completed_session() {
        let recorder = test_user(RoleType::Admin);
        let token = Authority::new(SECRET).issue_for(&recorder);
        let maria = test_employee("Maria", EmployeeType::Produccion, 0.0);

        let closed = test_record(&maria, (10.0, 0.0, 0.0, 0.0));

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([
                vec![ recorder ],
            ])
            .append_query_results([
                vec![ maria.clone() ],
            ])
            .append_query_results([
                vec![ closed ],
            ]);

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(Authority::new(SECRET)))
                .app_data(web::Data::new(db.into_connection()))
                .app_data(frozen_clock())
                .service(record_entry)
        ).await;

        let req = test::TestRequest::default()
            .uri("/entry")
            .method(Method::POST)
            .insert_header(("Authorization", format!("Bearer {token}")))
            .set_json(serde_json::json!({ "employee_id": maria.id }))
            .to_request();

        let response = test::call_service(&app, req).await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[actix_web::test]
    async fn test_record_entry_unknown_employee() {
        let recorder = test_user(RoleType::Scanner);
        let token = Authority::new(SECRET).issue_for(&recorder);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([
                vec![ recorder ],
            ])
            .append_query_results([
                Vec::<crate::entity::employee::Model>::new(),
            ]);

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(Authority::new(SECRET)))
                .app_data(web::Data::new(db.into_connection()))
                .app_data(frozen_clock())
                .service(record_entry)
        ).await;

        let req = test::TestRequest::default()
            .uri("/entry")
            .method(Method::POST)
            .insert_header(("Authorization", format!("Bearer {token}")))
            .set_json(serde_json::json!({ "employee_id": Uuid::new_v4() }))
            .to_request();

        let response = test::call_service(&app, req).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_record_exit_closes_open_session() {
        let recorder = test_user(RoleType::Scanner);
        let token = Authority::new(SECRET).issue_for(&recorder);
        let pedro = test_employee("Pedro", EmployeeType::AlDia, 9000.0);

        let mut open = test_record(&pedro, (0.0, 0.0, 0.0, 0.0));
        open.exit_time = None;

        let closed = test_record(&pedro, (0.0, 0.0, 0.0, 2.0));

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([
                vec![ recorder ],
            ])
            .append_query_results([
                vec![ pedro.clone() ],
            ])
            .append_query_results([
                vec![ open ],
                vec![ closed ],
            ]);

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(Authority::new(SECRET)))
                .app_data(web::Data::new(db.into_connection()))
                .app_data(frozen_clock())
                .service(record_exit)
        ).await;

        let req = test::TestRequest::default()
            .uri("/exit")
            .method(Method::POST)
            .insert_header(("Authorization", format!("Bearer {token}")))
            .set_json(serde_json::json!({ "employee_id": pedro.id, "hours_extra": 2.0 }))
            .to_request();

        let response = test::call_service(&app, req).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body: serde_json::Value = test::read_body_json(response).await;
        assert_eq!(body["success"], true);
        assert!(body["exit_time"].is_string());
    }

    #[actix_web::test]
    async fn test_record_exit_without_open_session() {
        let recorder = test_user(RoleType::Scanner);
        let token = Authority::new(SECRET).issue_for(&recorder);
        let pedro = test_employee("Pedro", EmployeeType::AlDia, 9000.0);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([
                vec![ recorder ],
            ])
            .append_query_results([
                vec![ pedro.clone() ],
            ])
            .append_query_results([
                Vec::<crate::entity::attendance::Model>::new(),
            ]);

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(Authority::new(SECRET)))
                .app_data(web::Data::new(db.into_connection()))
                .app_data(frozen_clock())
                .service(record_exit)
        ).await;

        let req = test::TestRequest::default()
            .uri("/exit")
            .method(Method::POST)
            .insert_header(("Authorization", format!("Bearer {token}")))
            .set_json(serde_json::json!({ "employee_id": pedro.id }))
            .to_request();

        let response = test::call_service(&app, req).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_today_attendance_derives_display_fields() {
        let user = test_user(RoleType::Viewer);
        let token = Authority::new(SECRET).issue_for(&user);
        let maria = test_employee("Maria", EmployeeType::Produccion, 0.0);

        let tz = FixedOffset::west_opt(6 * 3600).unwrap();
        let mut working = test_record(&maria, (0.0, 0.0, 0.0, 0.0));
        working.entry_time = tz.with_ymd_and_hms(2025, 8, 5, 7, 30, 0).unwrap();
        working.exit_time = None;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([
                vec![ user ],
            ])
            .append_query_results([
                vec![ working ],
            ])
            .append_query_results([
                vec![ maria.clone() ],
            ]);

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(Authority::new(SECRET)))
                .app_data(web::Data::new(db.into_connection()))
                .app_data(frozen_clock())
                .service(today_attendance)
        ).await;

        let req = test::TestRequest::default()
            .uri("/today")
            .insert_header(("Authorization", format!("Bearer {token}")))
            .to_request();

        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["count"], 1);

        let record = &body["data"][0];
        assert_eq!(record["employee_name"], "Maria");
        assert_eq!(record["is_working"], true);
        assert_eq!(record["status"], "active");
        assert_eq!(record["entry_time_display"], "07:30");
        assert_eq!(record["exit_time_display"], "-");
    }
}
