use std::str::FromStr;

use super::*;

impl FromRequest for employee::Model {
    type Error = ApiError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut dev::Payload) -> Self::Future {
        let req = req.clone();

        Box::pin(async move {
            let employee_id = req.match_info().get("employee_id").expect("This extractor must be used under `employee_id` path");
            let Ok(employee_id) = Uuid::from_str(employee_id) else {
                return Err(ApiError::validation("invalid `employee_id`"))
            };

            let db = req.app_data::<web::Data<DatabaseConnection>>().expect("DatabaseConnection must be attached");

            let Some(employee) = Employee::find_by_id(employee_id)
                .filter(employee::Column::IsActive.eq(true))
                .one(db.as_ref()).await?
            else {
                return Err(ApiError::not_found("employee not found or inactive"))
            };

            Ok(employee)
        })
    }
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test, App, Responder};
    use sea_orm::{DatabaseBackend, MockDatabase};

    use crate::payroll::test_employee;

    use super::*;

    #[actix_web::test]
    async fn test_employee_extractor() {
        #[get("/{employee_id}")]
        async fn test_handler(employee: employee::Model) -> impl Responder {
            web::Json(employee)
        }

        let employee = test_employee("Maria", EmployeeType::Produccion, 0.0);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([
                vec![ employee.clone() ],
            ]);

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(db.into_connection()))
                .service(test_handler)
        ).await;

        let req = test::TestRequest::default()
            .uri(&format!("/{}", employee.id))
            .to_request();

        let returned: employee::Model = test::call_and_read_body_json(&app, req).await;
        assert_eq!(returned, employee);
    }

    #[actix_web::test]
    async fn test_employee_extractor_rejects_unknown_and_garbled_ids() {
        #[get("/{employee_id}")]
        async fn test_handler(employee: employee::Model) -> impl Responder {
            web::Json(employee)
        }

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([
                Vec::<employee::Model>::new(),
            ]);

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(db.into_connection()))
                .service(test_handler)
        ).await;

        {
            let req = test::TestRequest::default()
                .uri(&format!("/{}", Uuid::new_v4()))
                .to_request();

            let response = test::call_service(&app, req).await;
            assert_eq!(response.status(), StatusCode::NOT_FOUND);
        }

        {
            let req = test::TestRequest::default()
                .uri("/not-a-uuid")
                .to_request();

            let response = test::call_service(&app, req).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        }
    }
}
