use sea_orm_migration::prelude::*;

mod m20260201_000001_create_profiles_and_regions;
mod m20260201_000002_create_families_and_assistances;
mod m20260201_000003_create_inventory_tasks_deliveries;
mod m20260201_000004_create_operation_logs;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260201_000001_create_profiles_and_regions::Migration),
            Box::new(m20260201_000002_create_families_and_assistances::Migration),
            Box::new(m20260201_000003_create_inventory_tasks_deliveries::Migration),
            Box::new(m20260201_000004_create_operation_logs::Migration),
        ]
    }
}
