use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "PDV API",
        version = "0.1.0",
        description = r#"
# PDV Point-of-Sale API

Backend for a small retail store: product catalog with size/color variants,
stock control, atomic checkout and sales history.

## Authentication

Sign up or log in to obtain a JWT, then include it on every other request:

```
Authorization: Bearer <your-jwt-token>
```

## Error Handling

Errors use a consistent shape with appropriate HTTP status codes:

```json
{
  "error": "Unprocessable Entity",
  "message": "Insufficient stock for variant ...",
  "timestamp": "2026-01-01T00:00:00Z"
}
```
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "Auth", description = "Account registration and sessions"),
        (name = "Products", description = "Product catalog management"),
        (name = "Variants", description = "Variant stock management"),
        (name = "POS", description = "Point-of-sale catalog and checkout"),
        (name = "Sales", description = "Sales history and dashboard")
    ),
    paths(
        // Auth
        crate::handlers::auth::signup,
        crate::handlers::auth::login,
        crate::handlers::auth::me,
        crate::handlers::auth::logout,

        // Products and variants
        crate::handlers::products::list_products,
        crate::handlers::products::create_product,
        crate::handlers::products::get_product,
        crate::handlers::products::update_product,
        crate::handlers::products::delete_product,
        crate::handlers::products::add_variant,
        crate::handlers::products::set_variant_quantity,
        crate::handlers::products::delete_variant,

        // Point of sale
        crate::handlers::pos::pos_catalog,
        crate::handlers::pos::checkout,

        // Sales history
        crate::handlers::sales::list_sales,
        crate::handlers::sales::get_sale,
        crate::handlers::sales::dashboard_summary,
    ),
    components(
        schemas(
            crate::ListQuery,
            crate::errors::ErrorResponse,

            crate::auth::SignupInput,
            crate::auth::LoginInput,
            crate::auth::AuthResponse,

            crate::services::catalog::CreateProductInput,
            crate::services::catalog::UpdateProductInput,
            crate::services::catalog::CreateVariantInput,
            crate::services::catalog::ProductWithVariants,
            crate::handlers::products::SetQuantityRequest,

            crate::handlers::pos::CheckoutRequest,
            crate::services::checkout::CheckoutLineInput,
            crate::services::checkout::CheckoutReceipt,

            crate::services::sales::SaleWithItems,
            crate::services::sales::DashboardSummary,
        )
    )
)]
pub struct ApiDoc;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_auth_endpoint_is_documented() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/v1/auth/signup",
            "/api/v1/auth/login",
            "/api/v1/auth/me",
            "/api/v1/auth/logout",
        ] {
            assert!(
                doc.paths.paths.contains_key(path),
                "missing path {path} in the OpenAPI document"
            );
        }
    }
}
