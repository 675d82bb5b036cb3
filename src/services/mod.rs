//! Domain services: the catalog, the in-memory cart, checkout, and the
//! sales history read side.

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod sales;

pub use cart::{Cart, CartError, CartLine};
pub use catalog::{CatalogService, ProductWithVariants};
pub use checkout::{CheckoutReceipt, CheckoutService};
pub use sales::{DashboardSummary, SalesService, SaleWithItems};
