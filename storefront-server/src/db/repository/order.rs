//! Order Repository
//!
//! An order and its items are written in one transaction. Item prices are
//! copied from the product at that moment and never follow later changes.

use super::{RepoError, RepoResult};
use rust_decimal::Decimal;
use shared::PageRequest;
use shared::models::{Order, OrderItem, OrderItemInput, OrderStatus, PaymentMethod};
use shared::money::{MAX_QUANTITY, checked_line_total, from_cents, line_total, to_cents};
use shared::util::now_millis;
use sqlx::SqlitePool;

const ORDER_SELECT: &str = "SELECT id, order_number, user_id, status, payment_method, subtotal_cents, delivery_fee_cents, total_cents, delivery_address, delivery_phone, delivery_notes, estimated_delivery, created_at, updated_at FROM customer_order";

/// Attempts at drawing an unused order number
const ORDER_NUMBER_ATTEMPTS: usize = 5;

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i64,
    order_number: String,
    user_id: i64,
    status: String,
    payment_method: String,
    subtotal_cents: i64,
    delivery_fee_cents: i64,
    total_cents: i64,
    delivery_address: String,
    delivery_phone: String,
    delivery_notes: String,
    estimated_delivery: Option<i64>,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepoError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        Ok(Order {
            id: row.id,
            order_number: row.order_number,
            user_id: row.user_id,
            status: row.status.parse().map_err(RepoError::Database)?,
            payment_method: row.payment_method.parse().map_err(RepoError::Database)?,
            subtotal: from_cents(row.subtotal_cents),
            delivery_fee: from_cents(row.delivery_fee_cents),
            total_amount: from_cents(row.total_cents),
            delivery_address: row.delivery_address,
            delivery_phone: row.delivery_phone,
            delivery_notes: row.delivery_notes,
            estimated_delivery: row.estimated_delivery,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OrderItemRow {
    id: i64,
    product_id: i64,
    product_title: String,
    quantity: i64,
    price_cents: i64,
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        let price = from_cents(row.price_cents);
        OrderItem {
            id: row.id,
            product: row.product_id,
            product_title: row.product_title,
            quantity: row.quantity,
            price,
            total_price: line_total(price, row.quantity),
        }
    }
}

/// Validated order header plus requested lines
#[derive(Debug, Clone)]
pub struct NewOrder<'a> {
    pub user_id: i64,
    pub payment_method: PaymentMethod,
    pub delivery_address: &'a str,
    pub delivery_phone: &'a str,
    pub delivery_notes: &'a str,
    pub items: &'a [OrderItemInput],
    pub delivery_fee: Decimal,
}

/// `ORD-` followed by 8 uppercase hex characters
pub fn generate_order_number() -> String {
    let hex = uuid::Uuid::new_v4().simple().to_string().to_uppercase();
    format!("ORD-{}", &hex[..8])
}

fn out_of_range() -> RepoError {
    RepoError::Validation("Order total is out of range".into())
}

fn cents(amount: Decimal) -> RepoResult<i64> {
    to_cents(amount).ok_or_else(|| RepoError::Validation(format!("Amount {amount} is out of range")))
}

/// Create an order with its items; returns the new order id
///
/// Every item must reference an active product and a positive quantity.
/// Nothing is persisted when any line is rejected.
pub async fn create(pool: &SqlitePool, order: &NewOrder<'_>) -> RepoResult<i64> {
    if order.items.is_empty() {
        return Err(RepoError::Validation("Order must contain at least one item".into()));
    }

    let mut tx = pool.begin().await?;

    let mut lines = Vec::with_capacity(order.items.len());
    let mut subtotal = Decimal::ZERO;
    for item in order.items {
        if item.quantity <= 0 {
            return Err(RepoError::Validation(format!(
                "Quantity for product {} must be greater than zero",
                item.product
            )));
        }
        if item.quantity > MAX_QUANTITY {
            return Err(RepoError::Validation(format!(
                "Quantity for product {} must not exceed {MAX_QUANTITY}",
                item.product
            )));
        }
        let price_cents: Option<i64> =
            sqlx::query_scalar("SELECT price_cents FROM product WHERE id = ? AND is_active = 1")
                .bind(item.product)
                .fetch_optional(&mut *tx)
                .await?;
        let price_cents = price_cents.ok_or_else(|| {
            RepoError::NotFound(format!("Product {} is not available", item.product))
        })?;
        subtotal = checked_line_total(from_cents(price_cents), item.quantity)
            .and_then(|line| subtotal.checked_add(line))
            .ok_or_else(out_of_range)?;
        lines.push((item.product, item.quantity, price_cents));
    }
    let total = subtotal
        .checked_add(order.delivery_fee)
        .ok_or_else(out_of_range)?;
    let now = now_millis();

    let mut order_id = None;
    for _ in 0..ORDER_NUMBER_ATTEMPTS {
        let inserted: Result<i64, RepoError> = sqlx::query_scalar(
            "INSERT INTO customer_order (order_number, user_id, status, payment_method, subtotal_cents, delivery_fee_cents, total_cents, delivery_address, delivery_phone, delivery_notes, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING id",
        )
        .bind(generate_order_number())
        .bind(order.user_id)
        .bind(OrderStatus::Pending.as_str())
        .bind(order.payment_method.as_str())
        .bind(cents(subtotal)?)
        .bind(cents(order.delivery_fee)?)
        .bind(cents(total)?)
        .bind(order.delivery_address)
        .bind(order.delivery_phone)
        .bind(order.delivery_notes)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(RepoError::from);
        match inserted {
            Ok(id) => {
                order_id = Some(id);
                break;
            }
            Err(RepoError::Duplicate(_)) => continue,
            Err(e) => return Err(e),
        }
    }
    let order_id = order_id
        .ok_or_else(|| RepoError::Database("Could not allocate a unique order number".into()))?;

    for (product_id, quantity, price_cents) in lines {
        sqlx::query(
            "INSERT INTO order_item (order_id, product_id, quantity, price_cents) VALUES (?, ?, ?, ?)",
        )
        .bind(order_id)
        .bind(product_id)
        .bind(quantity)
        .bind(price_cents)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;
    Ok(order_id)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Order>> {
    let sql = format!("{ORDER_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, OrderRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    row.map(Order::try_from).transpose()
}

/// A user's orders, newest first
pub async fn find_page_for_user(
    pool: &SqlitePool,
    user_id: i64,
    page: PageRequest,
) -> RepoResult<(Vec<Order>, i64)> {
    let sql = format!("{ORDER_SELECT} WHERE user_id = ? ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?");
    let rows = sqlx::query_as::<_, OrderRow>(&sql)
        .bind(user_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(pool)
        .await?;
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customer_order WHERE user_id = ?")
        .bind(user_id)
        .fetch_one(pool)
        .await?;
    let orders = rows
        .into_iter()
        .map(Order::try_from)
        .collect::<RepoResult<Vec<_>>>()?;
    Ok((orders, count))
}

pub async fn items(pool: &SqlitePool, order_id: i64) -> RepoResult<Vec<OrderItem>> {
    let rows = sqlx::query_as::<_, OrderItemRow>(
        "SELECT oi.id, oi.product_id, p.title AS product_title, oi.quantity, oi.price_cents \
         FROM order_item oi JOIN product p ON p.id = oi.product_id WHERE oi.order_id = ? ORDER BY oi.id",
    )
    .bind(order_id)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(OrderItem::from).collect())
}

/// Move an order from `from` to `to`
///
/// The write only applies while the stored status is still `from`, so two
/// concurrent transitions cannot both succeed.
pub async fn transition(
    pool: &SqlitePool,
    id: i64,
    from: OrderStatus,
    to: OrderStatus,
    estimated_delivery: Option<i64>,
) -> RepoResult<Order> {
    let rows = sqlx::query(
        "UPDATE customer_order SET status = ?1, estimated_delivery = COALESCE(?2, estimated_delivery), updated_at = ?3 WHERE id = ?4 AND status = ?5",
    )
    .bind(to.as_str())
    .bind(estimated_delivery)
    .bind(now_millis())
    .bind(id)
    .bind(from.as_str())
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::Validation(format!(
            "Order {id} is no longer {from}"
        )));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Order {id} not found")))
}
