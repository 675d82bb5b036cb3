//! Checkout: turns a cart into one sale, its items, and stock decrements.
//!
//! The whole write sequence runs in a single database transaction, and each
//! stock decrement is a conditional update (`quantity >= requested`), so a
//! checkout that loses a race for the last units fails cleanly instead of
//! driving stock negative. A failed checkout persists nothing.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::currency::format_brl;
use crate::entities::{
    product_variant, sale, sale_item, Product, ProductVariant, SaleItemModel, SaleModel,
};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::services::cart::Cart;

#[derive(Clone)]
pub struct CheckoutService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

impl CheckoutService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Builds a cart from the requested lines against a fresh stock snapshot.
    ///
    /// Lines that name the same variant are merged by summing their
    /// quantities, preserving first-seen order. Each merged line passes
    /// through the cart engine's guards: unknown variants are a 404,
    /// zero-stock variants and quantities above the snapshot are rejected,
    /// and the unit price is the product's current price.
    #[instrument(skip(self, lines))]
    pub async fn build_cart(&self, lines: &[CheckoutLineInput]) -> Result<Cart, ServiceError> {
        let mut merged: Vec<(Uuid, i32)> = Vec::with_capacity(lines.len());
        for line in lines {
            line.validate()?;
            match merged.iter_mut().find(|(id, _)| *id == line.variant_id) {
                Some((_, quantity)) => {
                    *quantity = quantity.checked_add(line.quantity).ok_or_else(|| {
                        ServiceError::InvalidInput(format!(
                            "Requested quantity for variant {} is too large",
                            line.variant_id
                        ))
                    })?;
                }
                None => merged.push((line.variant_id, line.quantity)),
            }
        }

        let mut cart = Cart::new();
        for (variant_id, quantity) in merged {
            let variant = ProductVariant::find_by_id(variant_id)
                .one(&*self.db)
                .await?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!("Variant {} not found", variant_id))
                })?;
            let product = Product::find_by_id(variant.product_id)
                .one(&*self.db)
                .await?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!("Product {} not found", variant.product_id))
                })?;

            cart.add_item(variant, product)?;
            cart.set_quantity(variant_id, quantity)?;
        }

        Ok(cart)
    }

    /// Runs the checkout for a cart.
    ///
    /// Empty carts are refused before any database statement is issued. On
    /// success the caller discards the cart; on failure the cart is left
    /// untouched for the user to retry.
    #[instrument(skip(self, cart), fields(lines = cart.len()))]
    pub async fn checkout(&self, cart: &Cart) -> Result<CheckoutReceipt, ServiceError> {
        if cart.is_empty() {
            return Err(ServiceError::InvalidOperation("Cart is empty".to_string()));
        }

        let checkout_id = Uuid::new_v4();
        self.event_sender
            .send_or_log(Event::CheckoutStarted {
                checkout_id,
                line_count: cart.len(),
            })
            .await;

        let txn = self.db.begin().await?;
        match self.persist_sale(&txn, cart).await {
            Ok((sale, items)) => {
                txn.commit().await?;

                self.event_sender
                    .send_or_log(Event::CheckoutCompleted {
                        checkout_id,
                        sale_id: sale.id,
                        total_amount: sale.total_amount,
                    })
                    .await;

                let message = format!(
                    "Venda finalizada com sucesso! Total: {}",
                    format_brl(sale.total_amount)
                );
                info!("Checkout {} completed: sale {}", checkout_id, sale.id);
                Ok(CheckoutReceipt {
                    sale,
                    items,
                    message,
                })
            }
            Err(err) => {
                if let Err(rollback_err) = txn.rollback().await {
                    warn!("Rollback after failed checkout also failed: {}", rollback_err);
                }
                self.event_sender
                    .send_or_log(Event::CheckoutFailed {
                        checkout_id,
                        reason: err.to_string(),
                    })
                    .await;
                Err(err)
            }
        }
    }

    /// Writes the sale header, its items, and the stock decrements.
    ///
    /// The decrement filter `quantity >= requested` is the authoritative
    /// stock check; the cart's snapshot check only catches the obvious cases
    /// early.
    async fn persist_sale(
        &self,
        txn: &DatabaseTransaction,
        cart: &Cart,
    ) -> Result<(SaleModel, Vec<SaleItemModel>), ServiceError> {
        let total: Decimal = cart.total();
        let now = Utc::now();

        let sale = sale::ActiveModel {
            id: Set(Uuid::new_v4()),
            total_amount: Set(total),
            sale_date: Set(now),
            created_at: Set(now),
        };
        let sale = sale.insert(txn).await?;

        let mut items = Vec::with_capacity(cart.len());
        for line in cart.lines() {
            let item = sale_item::ActiveModel {
                id: Set(Uuid::new_v4()),
                sale_id: Set(sale.id),
                product_variant_id: Set(line.variant.id),
                quantity: Set(line.quantity),
                price: Set(line.price),
                created_at: Set(now),
            };
            items.push(item.insert(txn).await?);

            let result = ProductVariant::update_many()
                .col_expr(
                    product_variant::Column::Quantity,
                    Expr::col(product_variant::Column::Quantity).sub(line.quantity),
                )
                .col_expr(product_variant::Column::UpdatedAt, Expr::value(now))
                .filter(product_variant::Column::Id.eq(line.variant.id))
                .filter(product_variant::Column::Quantity.gte(line.quantity))
                .exec(txn)
                .await?;

            if result.rows_affected == 0 {
                return Err(ServiceError::InsufficientStock(format!(
                    "Variant {} no longer has {} units in stock",
                    line.variant.id, line.quantity
                )));
            }
        }

        Ok((sale, items))
    }
}

/// One requested sale line: a variant and how many units
#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct CheckoutLineInput {
    pub variant_id: Uuid,
    #[validate(range(min = 1))]
    pub quantity: i32,
}

/// Result of a completed checkout
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct CheckoutReceipt {
    pub sale: SaleModel,
    pub items: Vec<SaleItemModel>,
    /// User-facing confirmation, total formatted in BRL
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn empty_cart_is_refused_before_any_database_call() {
        // A disconnected handle: any query would error, so an
        // InvalidOperation result proves the guard fires first.
        let db = Arc::new(DatabaseConnection::default());
        let (tx, _rx) = mpsc::channel(4);
        let service = CheckoutService::new(db, Arc::new(EventSender::new(tx)));

        let err = service.checkout(&Cart::new()).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidOperation(_)));
    }
}
