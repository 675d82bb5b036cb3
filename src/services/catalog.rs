use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, ModelTrait,
    QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::entities::{
    product, product_variant, Product, ProductModel, ProductVariant, ProductVariantModel,
};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};

/// Catalog service: product and variant management plus the joined
/// product-with-variants view the point of sale loads.
#[derive(Clone)]
pub struct CatalogService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

impl CatalogService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// All products with their variants, loaded in one query.
    ///
    /// An optional search term filters case-insensitively on product name or
    /// reference, matching the point-of-sale search box.
    #[instrument(skip(self))]
    pub async fn list_catalog(
        &self,
        search: Option<&str>,
    ) -> Result<Vec<ProductWithVariants>, ServiceError> {
        let mut query = Product::find().order_by_asc(product::Column::Name);

        if let Some(term) = search.map(str::trim).filter(|t| !t.is_empty()) {
            query = query.filter(
                Condition::any()
                    .add(product::Column::Name.contains(term))
                    .add(product::Column::Reference.contains(term)),
            );
        }

        let rows = query
            .find_with_related(ProductVariant)
            .all(&*self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(product, variants)| ProductWithVariants { product, variants })
            .collect())
    }

    #[instrument(skip(self))]
    pub async fn list_products(
        &self,
        search: Option<&str>,
    ) -> Result<Vec<ProductModel>, ServiceError> {
        let mut query = Product::find().order_by_asc(product::Column::Name);

        if let Some(term) = search.map(str::trim).filter(|t| !t.is_empty()) {
            query = query.filter(
                Condition::any()
                    .add(product::Column::Name.contains(term))
                    .add(product::Column::Reference.contains(term)),
            );
        }

        Ok(query.all(&*self.db).await?)
    }

    #[instrument(skip(self, input))]
    pub async fn create_product(
        &self,
        input: CreateProductInput,
    ) -> Result<ProductModel, ServiceError> {
        input.validate()?;

        let existing = Product::find()
            .filter(product::Column::Reference.eq(input.reference.clone()))
            .one(&*self.db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(format!(
                "Reference {} is already in use",
                input.reference
            )));
        }

        let now = Utc::now();
        let product = product::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            reference: Set(input.reference),
            price: Set(input.price),
            cost_price: Set(input.cost_price),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let product = product.insert(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::ProductCreated(product.id))
            .await;

        info!("Created product {} ({})", product.id, product.reference);
        Ok(product)
    }

    /// One product with all its variants.
    pub async fn get_product(&self, id: Uuid) -> Result<ProductWithVariants, ServiceError> {
        let product = Product::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", id)))?;

        let variants = product
            .find_related(ProductVariant)
            .order_by_asc(product_variant::Column::Size)
            .all(&*self.db)
            .await?;

        Ok(ProductWithVariants { product, variants })
    }

    #[instrument(skip(self, input))]
    pub async fn update_product(
        &self,
        id: Uuid,
        input: UpdateProductInput,
    ) -> Result<ProductModel, ServiceError> {
        input.validate()?;

        let product = Product::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", id)))?;

        let mut active: product::ActiveModel = product.into();
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(reference) = input.reference {
            active.reference = Set(reference);
        }
        if let Some(price) = input.price {
            active.price = Set(price);
        }
        if let Some(cost_price) = input.cost_price {
            active.cost_price = Set(cost_price);
        }
        active.updated_at = Set(Utc::now());

        let updated = active.update(&*self.db).await?;
        self.event_sender
            .send_or_log(Event::ProductUpdated(updated.id))
            .await;

        Ok(updated)
    }

    /// Deletes a product. Variants go with it (cascading foreign key).
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: Uuid) -> Result<(), ServiceError> {
        let result = Product::delete_by_id(id).exec(&*self.db).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!("Product {} not found", id)));
        }

        self.event_sender
            .send_or_log(Event::ProductDeleted(id))
            .await;

        info!("Deleted product {}", id);
        Ok(())
    }

    /// Adds a size/color variant to a product.
    #[instrument(skip(self, input))]
    pub async fn add_variant(
        &self,
        product_id: Uuid,
        input: CreateVariantInput,
    ) -> Result<ProductVariantModel, ServiceError> {
        input.validate()?;

        // The product must exist; the FK would catch this, but a 404 reads
        // better than a constraint violation.
        Product::find_by_id(product_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", product_id)))?;

        let now = Utc::now();
        let variant = product_variant::ActiveModel {
            id: Set(Uuid::new_v4()),
            product_id: Set(product_id),
            size: Set(input.size.trim().to_string()),
            color: Set(input.color.trim().to_string()),
            quantity: Set(input.quantity),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let variant = variant.insert(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::VariantAdded {
                product_id,
                variant_id: variant.id,
            })
            .await;

        Ok(variant)
    }

    /// Overwrites a variant's stock count (the restock form).
    #[instrument(skip(self))]
    pub async fn set_variant_quantity(
        &self,
        variant_id: Uuid,
        quantity: i32,
    ) -> Result<ProductVariantModel, ServiceError> {
        if quantity < 0 {
            return Err(ServiceError::InvalidInput(
                "Quantity cannot be negative".to_string(),
            ));
        }

        let variant = ProductVariant::find_by_id(variant_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Variant {} not found", variant_id)))?;

        let old_quantity = variant.quantity;
        let mut active: product_variant::ActiveModel = variant.into();
        active.quantity = Set(quantity);
        active.updated_at = Set(Utc::now());
        let updated = active.update(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::StockAdjusted {
                variant_id,
                old_quantity,
                new_quantity: quantity,
            })
            .await;

        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete_variant(&self, variant_id: Uuid) -> Result<(), ServiceError> {
        let result = ProductVariant::delete_by_id(variant_id)
            .exec(&*self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!(
                "Variant {} not found",
                variant_id
            )));
        }

        self.event_sender
            .send_or_log(Event::VariantDeleted(variant_id))
            .await;

        Ok(())
    }
}

/// Input for creating a product
#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct CreateProductInput {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(min = 1, max = 100))]
    pub reference: String,
    pub price: Decimal,
    pub cost_price: Decimal,
}

/// Input for updating a product; absent fields are left untouched
#[derive(Debug, Default, Deserialize, Validate, utoipa::ToSchema)]
pub struct UpdateProductInput {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub reference: Option<String>,
    pub price: Option<Decimal>,
    pub cost_price: Option<Decimal>,
}

/// Input for creating a variant
#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct CreateVariantInput {
    #[validate(length(min = 1, max = 50))]
    pub size: String,
    #[validate(length(min = 1, max = 50))]
    pub color: String,
    #[validate(range(min = 0))]
    pub quantity: i32,
}

/// Product joined with its variants
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct ProductWithVariants {
    #[serde(flatten)]
    pub product: ProductModel,
    pub variants: Vec<ProductVariantModel>,
}

impl ProductWithVariants {
    /// Units in stock across every variant.
    pub fn total_stock(&self) -> i64 {
        self.variants.iter().map(|v| i64::from(v.quantity)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    #[test]
    fn create_product_input_rejects_empty_name() {
        let input = CreateProductInput {
            name: String::new(),
            reference: "REF-001".to_string(),
            price: dec!(10.00),
            cost_price: dec!(5.00),
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn create_variant_input_rejects_negative_quantity() {
        let input = CreateVariantInput {
            size: "M".to_string(),
            color: "Azul".to_string(),
            quantity: -1,
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn total_stock_sums_variants() {
        let now = Utc::now();
        let product = ProductModel {
            id: Uuid::new_v4(),
            name: "Camiseta".to_string(),
            reference: "REF-001".to_string(),
            price: dec!(10.00),
            cost_price: dec!(5.00),
            created_at: now,
            updated_at: now,
        };
        let variants = vec![
            ProductVariantModel {
                id: Uuid::new_v4(),
                product_id: product.id,
                size: "P".to_string(),
                color: "Azul".to_string(),
                quantity: 3,
                created_at: now,
                updated_at: now,
            },
            ProductVariantModel {
                id: Uuid::new_v4(),
                product_id: product.id,
                size: "M".to_string(),
                color: "Preto".to_string(),
                quantity: 7,
                created_at: now,
                updated_at: now,
            },
        ];

        let view = ProductWithVariants { product, variants };
        assert_eq!(view.total_stock(), 10);
    }
}
