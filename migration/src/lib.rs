pub use sea_orm_migration::prelude::*;

mod util;
mod m20250801_000001_init;
mod m20250801_000002_seed_super_admin;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250801_000001_init::Migration),
            Box::new(m20250801_000002_seed_super_admin::Migration),
        ]
    }
}
