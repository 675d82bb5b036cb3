//! Sea-ORM entities for the catalog and sales tables.

pub mod product;
pub mod product_variant;
pub mod sale;
pub mod sale_item;

pub use product::{Entity as Product, Model as ProductModel};
pub use product_variant::{Entity as ProductVariant, Model as ProductVariantModel};
pub use sale::{Entity as Sale, Model as SaleModel};
pub use sale_item::{Entity as SaleItem, Model as SaleItemModel};
