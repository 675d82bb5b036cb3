pub use sea_orm_migration::prelude::*;

mod m20250801_000001_create_users_table;
mod m20250801_000002_create_products_table;
mod m20250801_000003_create_product_variants_table;
mod m20250801_000004_create_sales_table;
mod m20250801_000005_create_sale_items_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250801_000001_create_users_table::Migration),
            Box::new(m20250801_000002_create_products_table::Migration),
            Box::new(m20250801_000003_create_product_variants_table::Migration),
            Box::new(m20250801_000004_create_sales_table::Migration),
            Box::new(m20250801_000005_create_sale_items_table::Migration),
        ]
    }
}
