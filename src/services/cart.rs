//! In-memory sale cart.
//!
//! The cart is a plain value object owned by the caller: no database handle,
//! no shared state. Every stock check uses the variant snapshot captured
//! when the line was added, so a cart built from stale data can still pass
//! its own checks; the checkout transaction re-validates against live stock.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::entities::{ProductModel, ProductVariantModel};
use crate::errors::ServiceError;

/// One cart entry: a variant snapshot, its product snapshot, the requested
/// quantity, and the unit price captured at add time.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    pub variant: ProductVariantModel,
    pub product: ProductModel,
    pub quantity: i32,
    pub price: Decimal,
}

impl CartLine {
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    #[error("Variant {variant_id} is out of stock")]
    OutOfStock { variant_id: Uuid },

    #[error("Requested quantity {requested} exceeds available stock {available} for variant {variant_id}")]
    InsufficientStock {
        variant_id: Uuid,
        requested: i32,
        available: i32,
    },
}

impl From<CartError> for ServiceError {
    fn from(err: CartError) -> Self {
        ServiceError::InsufficientStock(err.to_string())
    }
}

/// Session-scoped shopping cart for one checkout attempt.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Adds one unit of a variant to the cart.
    ///
    /// Rejects variants with no stock. When the variant is already in the
    /// cart, increments the line by one unless that would exceed the
    /// snapshot quantity. New lines start at quantity 1 with the product's
    /// current price. On rejection the cart is left unchanged.
    pub fn add_item(
        &mut self,
        variant: ProductVariantModel,
        product: ProductModel,
    ) -> Result<(), CartError> {
        if variant.quantity <= 0 {
            return Err(CartError::OutOfStock {
                variant_id: variant.id,
            });
        }

        if let Some(line) = self.lines.iter_mut().find(|l| l.variant.id == variant.id) {
            if line.quantity >= line.variant.quantity {
                return Err(CartError::InsufficientStock {
                    variant_id: variant.id,
                    requested: line.quantity + 1,
                    available: line.variant.quantity,
                });
            }
            line.quantity += 1;
            return Ok(());
        }

        let price = product.price;
        self.lines.push(CartLine {
            variant,
            product,
            quantity: 1,
            price,
        });
        Ok(())
    }

    /// Removes the line for a variant. Absent ids are a no-op.
    pub fn remove_item(&mut self, variant_id: Uuid) {
        self.lines.retain(|l| l.variant.id != variant_id);
    }

    /// Overwrites a line's quantity.
    ///
    /// A quantity of zero or less removes the line. A quantity above the
    /// snapshot stock is rejected and the line is left unchanged. Absent
    /// variant ids are a no-op.
    pub fn set_quantity(&mut self, variant_id: Uuid, quantity: i32) -> Result<(), CartError> {
        if quantity <= 0 {
            self.remove_item(variant_id);
            return Ok(());
        }

        let Some(line) = self.lines.iter_mut().find(|l| l.variant.id == variant_id) else {
            return Ok(());
        };

        if quantity > line.variant.quantity {
            return Err(CartError::InsufficientStock {
                variant_id,
                requested: quantity,
                available: line.variant.quantity,
            });
        }

        line.quantity = quantity;
        Ok(())
    }

    /// Sum of `price * quantity` over all lines, recomputed on every call.
    pub fn total(&self) -> Decimal {
        self.lines.iter().map(CartLine::line_total).sum()
    }
}
