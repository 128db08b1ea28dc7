//! Handlers for order creation and lookup.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use threadmark_core::customization::CustomizationRecord;
use threadmark_core::error::CoreError;
use threadmark_core::measurement::{print_specification, PrintSpecification};
use threadmark_core::orders::{generate_order_number, order_total_cents, validate_quantity};
use threadmark_core::screenshots::AssetStatus;
use threadmark_core::types::DbId;
use threadmark_db::models::order::{
    CreateOrder, NewOrder, NewOrderItem, Order, OrderItem, OrderWithItems,
};
use threadmark_db::models::status::OrderStatus;
use threadmark_db::repositories::{OrderRepo, ProductRepo};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// An order item as staff and clients see it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemDetail {
    #[serde(flatten)]
    pub item: OrderItem,
    pub asset_status: AssetStatus,
    /// Derived from the frozen record; absent for plain items.
    pub print_spec: Option<PrintSpecification>,
}

impl From<OrderItem> for OrderItemDetail {
    fn from(item: OrderItem) -> Self {
        let print_spec = item
            .customization()
            .filter(|record| !record.is_empty())
            .map(print_specification);
        Self {
            asset_status: item.asset_status(),
            print_spec,
            item,
        }
    }
}

/// An order with its item details.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    /// Status name, e.g. `pending`.
    pub status: Option<&'static str>,
    pub items: Vec<OrderItemDetail>,
}

impl From<OrderWithItems> for OrderDetail {
    fn from(value: OrderWithItems) -> Self {
        Self {
            status: value.order.status().map(OrderStatus::name),
            order: value.order,
            items: value.items.into_iter().map(OrderItemDetail::from).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/orders
///
/// Validates every line, resolves products, then writes the order and all
/// items in one transaction. An unknown product fails the whole request
/// before anything is written. Malformed bodies are 400s.
pub async fn create_order(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> AppResult<impl IntoResponse> {
    let input: CreateOrder = serde_json::from_value(body)
        .map_err(|e| AppError::BadRequest(format!("Malformed order: {e}")))?;
    input.validate()?;

    let mut items = Vec::with_capacity(input.items.len());
    for (index, line) in input.items.iter().enumerate() {
        line.validate()?;
        validate_quantity(line.quantity).map_err(|e| prefix_validation(e, index))?;
        let customization = line
            .customization
            .clone()
            .map(CustomizationRecord::from_json)
            .transpose()
            .map_err(|e| prefix_validation(e, index))?;

        let product = ProductRepo::find_by_ref(&state.pool, &line.product)
            .await?
            .ok_or_else(|| line.product.not_found())?;

        items.push(NewOrderItem {
            product_id: product.id,
            color: line.color.clone(),
            size: line.size.clone(),
            quantity: line.quantity,
            unit_price_cents: product.base_price_cents,
            line_key: line.line_key,
            customization: customization.filter(|record| !record.is_empty()),
        });
    }

    let new_order = NewOrder {
        order_number: generate_order_number(Utc::now()),
        status: OrderStatus::Pending,
        customer_email: input.customer_email.trim().to_string(),
        total_cents: order_total_cents(items.iter().map(|i| (i.unit_price_cents, i.quantity))),
        items,
    };

    let created = OrderRepo::create(&state.pool, &new_order).await?;

    tracing::info!(
        order_id = created.order.id,
        order_number = %created.order.order_number,
        item_count = created.items.len(),
        customized = created.items.iter().filter(|i| i.is_customized()).count(),
        "Order created",
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: OrderDetail::from(created),
        }),
    ))
}

/// GET /api/v1/orders/{id}
pub async fn get_order(
    State(state): State<AppState>,
    Path(order_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let order = OrderRepo::find_with_items(&state.pool, order_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Order",
            id: order_id,
        }))?;

    Ok(Json(DataResponse {
        data: OrderDetail::from(order),
    }))
}

/// GET /api/v1/orders/by-number/{order_number}
pub async fn get_order_by_number(
    State(state): State<AppState>,
    Path(order_number): Path<String>,
) -> AppResult<impl IntoResponse> {
    let not_found = || {
        AppError::Core(CoreError::NotFoundByKey {
            entity: "Order",
            key: order_number.clone(),
        })
    };
    let order = OrderRepo::find_by_number(&state.pool, &order_number)
        .await?
        .ok_or_else(not_found)?;
    let order = OrderRepo::find_with_items(&state.pool, order.id)
        .await?
        .ok_or_else(not_found)?;

    Ok(Json(DataResponse {
        data: OrderDetail::from(order),
    }))
}

fn prefix_validation(err: CoreError, index: usize) -> AppError {
    match err {
        CoreError::Validation(msg) => {
            AppError::Core(CoreError::Validation(format!("items[{index}]: {msg}")))
        }
        other => AppError::Core(other),
    }
}
