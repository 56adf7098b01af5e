use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Print Shop API",
        version = "1.0.0",
        description = r#"
# Print Shop Back-Office API

Back-office service for a commercial print shop: the customer directory,
per-customer product definitions, price quotes and the order ledger with
payments and a full status history.

## Error Handling

Errors use a consistent response format with appropriate HTTP status codes:

```json
{
  "error": "Bad Request",
  "message": "Quantity must be greater than 0",
  "timestamp": "2024-01-01T00:00:00Z"
}
```
        "#
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "Customers", description = "Customer directory endpoints"),
        (name = "Products", description = "Per-customer product definitions"),
        (name = "Configuration", description = "Shared configuration lists"),
        (name = "Quotes", description = "Price quote endpoints"),
        (name = "Orders", description = "Order ledger, payments and status history")
    ),
    paths(
        // Customers
        crate::handlers::customers::list_customers,
        crate::handlers::customers::get_customer,
        crate::handlers::customers::create_customer,
        crate::handlers::customers::update_customer,

        // Products
        crate::handlers::products::list_products,
        crate::handlers::products::create_product,

        // Configuration lists
        crate::handlers::lookups::list_paper_types,
        crate::handlers::lookups::create_paper_type,
        crate::handlers::lookups::delete_paper_type,
        crate::handlers::lookups::list_matrix_sizes,
        crate::handlers::lookups::create_matrix_size,
        crate::handlers::lookups::delete_matrix_size,

        // Quotes
        crate::handlers::quotes::list_quotes,
        crate::handlers::quotes::create_quote,
        crate::handlers::quotes::get_quote,
        crate::handlers::quotes::update_quote,
        crate::handlers::quotes::convert_quote,

        // Orders
        crate::handlers::orders::list_orders,
        crate::handlers::orders::create_order,
        crate::handlers::orders::get_order,
        crate::handlers::orders::update_order,
        crate::handlers::orders::record_payment,
        crate::handlers::orders::debt_summary,
    ),
    components(
        schemas(
            // Common types
            crate::ApiResponse<serde_json::Value>,
            crate::errors::ErrorResponse,

            // Entities
            crate::entities::customer::Model,
            crate::entities::paper_type::Model,
            crate::entities::matrix_size::Model,
            crate::entities::custom_product::Model,
            crate::entities::quote::Model,
            crate::entities::order::Model,
            crate::entities::order_item::Model,
            crate::entities::payment::Model,
            crate::entities::order_status_history::Model,

            // Requests and responses
            crate::services::customers::CustomerPayload,
            crate::services::lookups::CreateLookupOptionRequest,
            crate::services::products::CreateProductRequest,
            crate::services::products::ProductResponse,
            crate::services::quotes::CreateQuoteRequest,
            crate::services::quotes::UpdateQuoteRequest,
            crate::services::quotes::QuoteProduct,
            crate::services::quotes::QuoteResponse,
            crate::services::orders::OrderItemInput,
            crate::services::orders::CreateOrderRequest,
            crate::services::orders::UpdateOrderRequest,
            crate::services::orders::RecordPaymentRequest,
            crate::services::orders::OrderSummary,
            crate::services::orders::OrderItemDetail,
            crate::services::orders::OrderDetail,
            crate::services::orders::CustomerDebt,
        )
    )
)]
pub struct ApiDocV1;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/docs")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}
