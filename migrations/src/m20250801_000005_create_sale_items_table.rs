use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20250801_000005_create_sale_items_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SaleItems::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(SaleItems::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(SaleItems::SaleId).uuid().not_null())
                    .col(
                        ColumnDef::new(SaleItems::ProductVariantId)
                            .uuid()
                            .not_null(),
                    )
                    .col(ColumnDef::new(SaleItems::Quantity).integer().not_null())
                    .col(
                        ColumnDef::new(SaleItems::Price)
                            .decimal_len(16, 4)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SaleItems::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sale_items_sale_id")
                            .from(SaleItems::Table, SaleItems::SaleId)
                            .to(
                                super::m20250801_000004_create_sales_table::Sales::Table,
                                super::m20250801_000004_create_sales_table::Sales::Id,
                            )
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sale_items_product_variant_id")
                            .from(SaleItems::Table, SaleItems::ProductVariantId)
                            .to(
                                super::m20250801_000003_create_product_variants_table::ProductVariants::Table,
                                super::m20250801_000003_create_product_variants_table::ProductVariants::Id,
                            )
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_sale_items_sale_id")
                    .table(SaleItems::Table)
                    .col(SaleItems::SaleId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SaleItems::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum SaleItems {
    Table,
    Id,
    SaleId,
    ProductVariantId,
    Quantity,
    Price,
    CreatedAt,
}
