use sea_orm_migration::{prelude::{extension::postgres::TypeDropStatement, *}, sea_orm::{ActiveEnum, DbBackend, DeriveActiveEnum, EnumIter, Schema}};

use crate::util::{default_table_statement, DefaultColumn};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let schema = Schema::new(DbBackend::Postgres);

        manager
            .create_type(
                schema.create_enum_from_active_enum::<RoleType>()
            ).await?;

        manager
            .create_type(
                schema.create_enum_from_active_enum::<EmployeeType>()
            ).await?;

        // Usernames and dni values are only unique among active rows
        // (soft-deleted ones may be re-registered), so those checks live in
        // the application layer rather than as indexes here.
        manager
            .create_table(default_table_statement()
                .table(User::Table)
                .col(ColumnDef::new(User::Username)
                    .text()
                    .not_null())
                .col(ColumnDef::new(User::Password)
                    .binary()
                    .not_null()) // Password should be in a hashed format
                .col(ColumnDef::new(User::Role)
                    .custom(RoleType::name())
                    .not_null())
                .col(ColumnDef::new(User::IsActive)
                    .boolean()
                    .not_null()
                    .default(true))
                .take()
            ).await?;

        manager
            .create_table(default_table_statement()
                .table(Employee::Table)
                .col(ColumnDef::new(Employee::Dni)
                    .text()
                    .not_null())
                .col(ColumnDef::new(Employee::Name)
                    .text()
                    .not_null())
                .col(ColumnDef::new(Employee::Type)
                    .custom(EmployeeType::name())
                    .not_null())
                .col(ColumnDef::new(Employee::MonthlySalary)
                    .double()
                    .not_null()
                    .default(0))
                .col(ColumnDef::new(Employee::Photo)
                    .text())
                .col(ColumnDef::new(Employee::QrCode)
                    .text())
                .col(ColumnDef::new(Employee::IsActive)
                    .boolean()
                    .not_null()
                    .default(true))
                .take()
            ).await?;

        manager
            .create_table(default_table_statement()
                .table(Attendance::Table)
                .col(ColumnDef::new(Attendance::EmployeeId)
                    .uuid()
                    .not_null())
                .col(ColumnDef::new(Attendance::Date)
                    .date()
                    .not_null())
                .col(ColumnDef::new(Attendance::EntryTime)
                    .timestamp_with_time_zone()
                    .not_null())
                .col(ColumnDef::new(Attendance::ExitTime)
                    .timestamp_with_time_zone())
                .col(ColumnDef::new(Attendance::HoursExtra)
                    .double()
                    .not_null()
                    .default(0))
                .col(ColumnDef::new(Attendance::Despalillo)
                    .double()
                    .not_null()
                    .default(0))
                .col(ColumnDef::new(Attendance::Escogida)
                    .double()
                    .not_null()
                    .default(0))
                .col(ColumnDef::new(Attendance::Monado)
                    .double()
                    .not_null()
                    .default(0))
                .take()
            ).await?;

        manager.create_foreign_key(ForeignKeyCreateStatement::new()
            .from(Attendance::Table, Attendance::EmployeeId)
            .to(Employee::Table, DefaultColumn::Id)
            .take()
        ).await?;

        // One session per employee per civil day; concurrent double entries
        // die here no matter how the request handlers interleave.
        manager.create_index(Index::create()
            .name("idx_attendance_employee_date")
            .table(Attendance::Table)
            .col(Attendance::EmployeeId)
            .col(Attendance::Date)
            .unique()
            .take()
        ).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(
            TableDropStatement::new()
                .table(Attendance::Table)
                .take()
        ).await?;

        manager.drop_table(
            TableDropStatement::new()
                .table(Employee::Table)
                .take()
        ).await?;

        manager.drop_table(
            TableDropStatement::new()
                .table(User::Table)
                .take()
        ).await?;

        manager.drop_type(
            TypeDropStatement::new()
                .name(EmployeeType::name())
                .to_owned()
        ).await?;

        manager.drop_type(
            TypeDropStatement::new()
                .name(RoleType::name())
                .to_owned()
        ).await?;

        Ok(())
    }
}

#[derive(Iden)]
pub(crate) enum User {
    Table,
    Username,
    Password,
    Role,
    IsActive,
}

#[derive(Iden)]
enum Employee {
    Table,
    Dni,
    Name,
    Type,
    MonthlySalary,
    Photo,
    QrCode,
    IsActive,
}

#[derive(Iden)]
enum Attendance {
    Table,
    EmployeeId,
    Date,
    EntryTime,
    ExitTime,
    HoursExtra,
    Despalillo,
    Escogida,
    Monado,
}

#[derive(EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "role_type")]
enum RoleType {
    #[sea_orm(string_value = "super_admin")]
    SuperAdmin,
    #[sea_orm(string_value = "admin")]
    Admin,
    #[sea_orm(string_value = "scanner")]
    Scanner,
    #[sea_orm(string_value = "viewer")]
    Viewer,
}

#[derive(EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "employee_type")]
enum EmployeeType {
    #[sea_orm(string_value = "produccion")]
    Produccion,
    #[sea_orm(string_value = "al_dia")]
    AlDia,
}
