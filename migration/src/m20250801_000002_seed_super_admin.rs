use sea_orm_migration::prelude::*;
use sha2::Digest as _;

use crate::m20250801_000001_init::User;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let time = Expr::val("2025-08-01T00:00:00.000Z").cast_as("timestamptz");

        // Bootstrap operator account; the password is expected to be
        // changed right after the first login.
        let hashed_password = &sha2::Sha256::digest("admin")[..];

        manager
            .exec_stmt(Query::insert()
                .into_table(User::Table)
                .columns(["id", "created_at", "updated_at", "username", "password", "role", "is_active"])
                .values_panic([
                    Expr::val(format!("{:032x}", 1_u128)).cast_as("uuid"),
                    time.clone(),
                    time.clone(),
                    "admin".into(),
                    hashed_password.into(),
                    Expr::val("super_admin").cast_as("role_type"),
                    true.into(),
                ])
                .to_owned()
        ).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .exec_stmt(Query::delete()
                .from_table(User::Table)
                .and_where(Expr::col("id").eq(Expr::val(format!("{:032x}", 1_u128)).cast_as("uuid")))
                .to_owned()
        ).await?;

        Ok(())
    }
}
