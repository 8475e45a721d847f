use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::order_service::OrderService;
use crate::domain::order::{LineItem, Order, OrderPlacement, RequestedItem};
use crate::errors::AppError;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct OrderedProductRequest {
    pub product_id: String,
    /// Omitted or zero means the product is not actually ordered.
    #[serde(default)]
    pub quantity: u32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PostOrderRequest {
    pub account_id: String,
    pub products: Vec<OrderedProductRequest>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderProductResponse {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Price frozen when the order was placed, as a decimal string.
    pub price: String,
    pub quantity: u32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub created_at: String,
    pub account_id: String,
    pub total_price: String,
    pub products: Vec<OrderProductResponse>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PostOrderResponse {
    pub order: OrderResponse,
    /// Requested products the catalog no longer offers; left out of the order.
    pub unavailable_product_ids: Vec<String>,
}

impl From<OrderedProductRequest> for RequestedItem {
    fn from(p: OrderedProductRequest) -> Self {
        RequestedItem {
            product_id: p.product_id,
            quantity: p.quantity,
        }
    }
}

impl From<LineItem> for OrderProductResponse {
    fn from(l: LineItem) -> Self {
        OrderProductResponse {
            id: l.product_id,
            name: l.name,
            description: l.description,
            price: l.price.to_string(),
            quantity: l.quantity,
        }
    }
}

impl From<Order> for OrderResponse {
    fn from(o: Order) -> Self {
        OrderResponse {
            id: o.id,
            created_at: o.created_at.to_rfc3339(),
            account_id: o.account_id,
            total_price: o.total_price.to_string(),
            products: o.line_items.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<OrderPlacement> for PostOrderResponse {
    fn from(p: OrderPlacement) -> Self {
        PostOrderResponse {
            order: p.order.into(),
            unavailable_product_ids: p.unavailable_product_ids,
        }
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /orders
///
/// Places an order for an existing account. Prices are taken from the
/// catalog at this moment and never change afterwards. Products the catalog
/// does not know are left out and listed in `unavailable_product_ids`.
#[utoipa::path(
    post,
    path = "/orders",
    request_body = PostOrderRequest,
    responses(
        (status = 201, description = "Order created successfully", body = PostOrderResponse),
        (status = 422, description = "Unknown account, oversized quantity or nothing orderable"),
        (status = 503, description = "Account or catalog service unavailable"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn post_order(
    service: web::Data<OrderService>,
    body: web::Json<PostOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let items: Vec<RequestedItem> = body.products.into_iter().map(Into::into).collect();

    let placement = service.post_order(&body.account_id, &items).await?;

    Ok(HttpResponse::Created().json(PostOrderResponse::from(placement)))
}

/// GET /orders/{id}
///
/// Returns the order with frozen prices and current product names.
#[utoipa::path(
    get,
    path = "/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
    ),
    responses(
        (status = 200, description = "Order found", body = OrderResponse),
        (status = 400, description = "Malformed order id"),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn get_order(
    service: web::Data<OrderService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let order = service.get_order(path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

/// GET /accounts/{account_id}/orders
#[utoipa::path(
    get,
    path = "/accounts/{account_id}/orders",
    params(
        ("account_id" = String, Path, description = "Account identifier"),
    ),
    responses(
        (status = 200, description = "Orders of the account, oldest first", body = [OrderResponse]),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn get_account_orders(
    service: web::Data<OrderService>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let orders = service.get_account_orders(&path.into_inner()).await?;

    let body: Vec<OrderResponse> = orders.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(body))
}
