use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    DatabaseConnection, EntityTrait, ModelTrait, PaginatorTrait, QueryOrder, QuerySelect,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::entities::{
    product_variant, sale, Product, ProductVariant, Sale, SaleItem, SaleItemModel, SaleModel,
};
use crate::errors::ServiceError;

/// Read side of the sales history and the dashboard counters.
#[derive(Clone)]
pub struct SalesService {
    db: Arc<DatabaseConnection>,
}

impl SalesService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Sales newest-first, paginated.
    #[instrument(skip(self))]
    pub async fn list_sales(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<SaleModel>, u64), ServiceError> {
        let paginator = Sale::find()
            .order_by_desc(sale::Column::SaleDate)
            .paginate(&*self.db, per_page.max(1));

        let total = paginator.num_items().await?;
        let data = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok((data, total))
    }

    /// One sale with its items.
    pub async fn get_sale(&self, id: Uuid) -> Result<SaleWithItems, ServiceError> {
        let sale = Sale::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Sale {} not found", id)))?;

        let items = sale.find_related(SaleItem).all(&*self.db).await?;

        Ok(SaleWithItems { sale, items })
    }

    /// Counters shown on the dashboard landing page.
    #[instrument(skip(self))]
    pub async fn dashboard_summary(&self) -> Result<DashboardSummary, ServiceError> {
        let product_count = Product::find().count(&*self.db).await?;
        let sale_count = Sale::find().count(&*self.db).await?;

        let total_stock: Option<i64> = ProductVariant::find()
            .select_only()
            .column_as(
                Expr::col(product_variant::Column::Quantity).sum(),
                "total_stock",
            )
            .into_tuple()
            .one(&*self.db)
            .await?
            .flatten();

        let total_revenue: Option<Decimal> = Sale::find()
            .select_only()
            .column_as(Expr::col(sale::Column::TotalAmount).sum(), "total_revenue")
            .into_tuple()
            .one(&*self.db)
            .await?
            .flatten();

        Ok(DashboardSummary {
            product_count,
            sale_count,
            total_stock: total_stock.unwrap_or(0),
            total_revenue: total_revenue.unwrap_or(Decimal::ZERO),
        })
    }
}

/// Sale with its line items
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct SaleWithItems {
    #[serde(flatten)]
    pub sale: SaleModel,
    pub items: Vec<SaleItemModel>,
}

/// Aggregate counters for the dashboard
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct DashboardSummary {
    pub product_count: u64,
    pub sale_count: u64,
    pub total_stock: i64,
    pub total_revenue: Decimal,
}
