//! Order API Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use shared::models::{
    Order, OrderCreate, OrderDetail, OrderStatus, OrderStatusUpdate, PaymentMethod,
};
use shared::money::MAX_QUANTITY;
use shared::{AppError, AppResult, ErrorCode, Page};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{RepoError, order};
use crate::db::repository::order::NewOrder;
use crate::security_log;
use crate::utils::QueryParams;
use crate::utils::validation::{
    MAX_NOTE_LEN, MAX_PHONE_LEN, MAX_SHORT_TEXT_LEN, validate_optional_text,
    validate_required_text,
};

fn order_not_found(id: i64) -> AppError {
    AppError::with_message(ErrorCode::OrderNotFound, format!("Order {id} not found"))
}

async fn detail(state: &ServerState, order: Order) -> AppResult<OrderDetail> {
    let items = order::items(&state.pool, order.id).await?;
    Ok(OrderDetail::from_parts(order, items))
}

/// Load an order visible to the caller
///
/// Other users' orders are reported as missing; staff see every order.
async fn load_visible(state: &ServerState, user: &CurrentUser, id: i64) -> AppResult<Order> {
    match order::find_by_id(&state.pool, id).await? {
        Some(order) if order.user_id == user.id() || user.is_staff() => Ok(order),
        _ => Err(order_not_found(id)),
    }
}

fn invalid_transition(from: OrderStatus, to: OrderStatus) -> AppError {
    AppError::with_message(
        ErrorCode::OrderInvalidTransition,
        format!("Cannot change order status from {from} to {to}"),
    )
}

async fn apply_transition(
    state: &ServerState,
    order: Order,
    to: OrderStatus,
    estimated_delivery: Option<i64>,
) -> AppResult<Order> {
    if !order.status.can_transition_to(to) {
        return Err(invalid_transition(order.status, to));
    }
    order::transition(&state.pool, order.id, order.status, to, estimated_delivery)
        .await
        .map_err(|err| match err {
            // Status changed underneath us
            RepoError::Validation(_) => invalid_transition(order.status, to),
            other => other.into(),
        })
}

/// POST /api/orders
pub async fn create(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Json(payload): Json<OrderCreate>,
) -> AppResult<(StatusCode, Json<OrderDetail>)> {
    let payment_method = payload
        .payment_method
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .ok_or_else(|| {
            AppError::field(
                ErrorCode::RequiredField,
                "payment_method",
                "This field is required.",
            )
        })?
        .parse::<PaymentMethod>()
        .map_err(|e| AppError::field(ErrorCode::PaymentInvalidMethod, "payment_method", e))?;
    validate_required_text(&payload.delivery_address, "delivery_address", MAX_SHORT_TEXT_LEN)?;
    validate_required_text(&payload.delivery_phone, "delivery_phone", MAX_PHONE_LEN)?;
    validate_optional_text(Some(payload.delivery_notes.as_str()), "delivery_notes", MAX_NOTE_LEN)?;

    if payload.items.is_empty() {
        return Err(AppError::field(
            ErrorCode::OrderEmpty,
            "items",
            "Order must contain at least one item",
        ));
    }
    if let Some(item) = payload.items.iter().find(|i| i.quantity <= 0) {
        return Err(AppError::field(
            ErrorCode::OrderInvalidQuantity,
            "items",
            format!("Quantity for product {} must be greater than zero", item.product),
        ));
    }
    if let Some(item) = payload.items.iter().find(|i| i.quantity > MAX_QUANTITY) {
        return Err(AppError::field(
            ErrorCode::ValidationFailed,
            "items",
            format!(
                "Quantity for product {} must not exceed {MAX_QUANTITY}",
                item.product
            ),
        ));
    }

    let new_order = NewOrder {
        user_id: current_user.id(),
        payment_method,
        delivery_address: payload.delivery_address.trim(),
        delivery_phone: payload.delivery_phone.trim(),
        delivery_notes: payload.delivery_notes.trim(),
        items: &payload.items,
        delivery_fee: state.delivery_fee(),
    };
    let id = order::create(&state.pool, &new_order)
        .await
        .map_err(|err| match err {
            RepoError::NotFound(msg) => {
                AppError::field(ErrorCode::OrderProductUnavailable, "items", msg)
            }
            RepoError::Validation(msg) => AppError::field(ErrorCode::ValidationFailed, "items", msg),
            other => other.into(),
        })?;

    let order = order::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| order_not_found(id))?;
    tracing::info!(
        order_id = id,
        order_number = %order.order_number,
        user_id = current_user.id(),
        total = %order.total_amount,
        "Order created"
    );
    Ok((StatusCode::CREATED, Json(detail(&state, order).await?)))
}

/// GET /api/orders
pub async fn list(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    params: QueryParams,
) -> AppResult<Json<Page<OrderDetail>>> {
    let page = params.page();
    let (orders, count) = order::find_page_for_user(&state.pool, current_user.id(), page).await?;
    let mut details = Vec::with_capacity(orders.len());
    for order in orders {
        details.push(detail(&state, order).await?);
    }
    Ok(Json(Page::new(details, count, page)))
}

/// GET /api/orders/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<OrderDetail>> {
    let order = load_visible(&state, &current_user, id).await?;
    Ok(Json(detail(&state, order).await?))
}

/// POST /api/orders/{id}/cancel
pub async fn cancel(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<OrderDetail>> {
    let order = match order::find_by_id(&state.pool, id).await? {
        Some(order) if order.user_id == current_user.id() => order,
        _ => return Err(order_not_found(id)),
    };
    let order = apply_transition(&state, order, OrderStatus::Cancelled, None).await?;
    tracing::info!(order_id = id, user_id = current_user.id(), "Order cancelled");
    Ok(Json(detail(&state, order).await?))
}

/// PUT /api/orders/{id}/status
pub async fn update_status(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<OrderStatusUpdate>,
) -> AppResult<Json<OrderDetail>> {
    if !current_user.is_staff() {
        security_log!(
            "WARN",
            "order_status_denied",
            user_id = current_user.id(),
            order_id = id
        );
        return Err(AppError::with_message(
            ErrorCode::StaffRequired,
            "Staff account required",
        ));
    }
    let status = payload
        .status
        .trim()
        .parse::<OrderStatus>()
        .map_err(|e| AppError::field(ErrorCode::ValidationFailed, "status", e))?;

    let order = load_visible(&state, &current_user, id).await?;
    let from = order.status;
    let order = apply_transition(&state, order, status, payload.estimated_delivery).await?;
    tracing::info!(
        order_id = id,
        from = %from,
        to = %status,
        staff_id = current_user.id(),
        "Order status changed"
    );
    Ok(Json(detail(&state, order).await?))
}
