use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{postgres::PgPoolOptions, PgPool};
use sqlx::postgres::PgRow;
use sqlx::Row;
use std::collections::HashMap;
use uuid::Uuid;

pub mod seed;

pub const ENV_DB_URL: &str = "OMS_DATABASE_URL";

/// Connect to Postgres using OMS_DATABASE_URL.
pub async fn connect_from_env() -> Result<PgPool> {
    let url = std::env::var(ENV_DB_URL)
        .with_context(|| format!("missing env var {ENV_DB_URL}"))?;

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&url)
        .await
        .context("failed to connect to Postgres")?;

    Ok(pool)
}

/// Run embedded SQLx migrations.
pub async fn migrate(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("db migrate failed")?;
    Ok(())
}

/// Simple status query (connectivity + schema presence).
pub async fn status(pool: &PgPool) -> Result<DbStatus> {
    let (one,): (i32,) = sqlx::query_as::<_, (i32,)>("select 1")
        .fetch_one(pool)
        .await
        .context("status connectivity query failed")?;
    let ok = one == 1;

    let (exists,): (bool,) = sqlx::query_as::<_, (bool,)>(
        r#"
        select exists (
            select 1
            from information_schema.tables
            where table_schema='public' and table_name='orders'
        )
        "#,
    )
    .fetch_one(pool)
    .await
    .context("status table-exists query failed")?;

    Ok(DbStatus { ok, has_orders_table: exists })
}

#[derive(Debug, Clone)]
pub struct DbStatus {
    pub ok: bool,
    pub has_orders_table: bool,
}

// ---------------------------------------------------------------------------
// OrderStatus
// ---------------------------------------------------------------------------

/// Order lifecycle status. All transitions are legal — the application does
/// not enforce a state machine, only membership in this set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Processing,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Processing => "PROCESSING",
            OrderStatus::Completed => "COMPLETED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "PENDING" => Ok(OrderStatus::Pending),
            "PROCESSING" => Ok(OrderStatus::Processing),
            "COMPLETED" => Ok(OrderStatus::Completed),
            "CANCELLED" => Ok(OrderStatus::Cancelled),
            other => Err(anyhow!("invalid order status: {}", other)),
        }
    }
}

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// One row of the `orders` table. Wire form is camelCase to match the
/// frontend's order shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRow {
    pub id: Uuid,
    pub customer_name: String,
    pub address: String,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One row of the `order_line_items` table. Immutable after creation —
/// there is no update/delete path for individual items.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineItemRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_name: String,
    pub quantity: i64,
    pub price: f64,
}

/// An order with its line items eagerly loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: OrderRow,
    pub order_line_items: Vec<OrderLineItemRow>,
}

impl OrderWithItems {
    /// Derived order value: Σ(quantity × price). Never stored.
    pub fn total(&self) -> f64 {
        self.order_line_items
            .iter()
            .map(|li| li.quantity as f64 * li.price)
            .sum()
    }
}

/// One page of the order list plus the totals the list view renders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderPage {
    pub orders: Vec<OrderWithItems>,
    pub total: i64,
    pub pages: i64,
}

// ---------------------------------------------------------------------------
// Insert shapes
// ---------------------------------------------------------------------------

/// Insert shape for a new order. Status is intentionally absent: every
/// created order starts as PENDING with no override path.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub customer_name: String,
    pub address: String,
    pub line_items: Vec<NewLineItem>,
}

#[derive(Debug, Clone)]
pub struct NewLineItem {
    pub product_name: String,
    pub quantity: i64,
    pub price: f64,
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Create an order and all of its line items in one explicit transaction.
/// Any failure (constraint violation, connection loss) rolls back the whole
/// create — no partial order is ever visible.
pub async fn create_order(pool: &PgPool, new: &NewOrder) -> Result<OrderWithItems> {
    let mut tx = pool.begin().await.context("create_order begin failed")?;

    let order_id = Uuid::new_v4();
    let row = sqlx::query(
        r#"
        insert into orders (order_id, customer_name, address)
        values ($1, $2, $3)
        returning order_id, customer_name, address, status, created_at_utc, updated_at_utc
        "#,
    )
    .bind(order_id)
    .bind(&new.customer_name)
    .bind(&new.address)
    .fetch_one(&mut *tx)
    .await
    .context("create_order insert order failed")?;
    let order = order_from_row(&row)?;

    let mut items = Vec::with_capacity(new.line_items.len());
    for li in &new.line_items {
        let line_item_id = Uuid::new_v4();
        sqlx::query(
            r#"
            insert into order_line_items (line_item_id, order_id, product_name, quantity, price)
            values ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(line_item_id)
        .bind(order_id)
        .bind(&li.product_name)
        .bind(li.quantity)
        .bind(li.price)
        .execute(&mut *tx)
        .await
        .context("create_order insert line item failed")?;

        items.push(OrderLineItemRow {
            id: line_item_id,
            order_id,
            product_name: li.product_name.clone(),
            quantity: li.quantity,
            price: li.price,
        });
    }

    tx.commit().await.context("create_order commit failed")?;

    Ok(OrderWithItems { order, order_line_items: items })
}

/// Fetch a single order with its line items. `Ok(None)` if the id matches
/// no row.
pub async fn fetch_order(pool: &PgPool, order_id: Uuid) -> Result<Option<OrderWithItems>> {
    let row = sqlx::query(
        r#"
        select order_id, customer_name, address, status, created_at_utc, updated_at_utc
        from orders
        where order_id = $1
        "#,
    )
    .bind(order_id)
    .fetch_optional(pool)
    .await
    .context("fetch_order failed")?;

    let Some(row) = row else {
        return Ok(None);
    };
    let order = order_from_row(&row)?;

    let items = fetch_line_items(pool, &[order_id]).await?;
    let order_line_items = items.into_values().next().unwrap_or_default();

    Ok(Some(OrderWithItems { order, order_line_items }))
}

/// Fetch one page of orders, newest first, with line items eagerly loaded.
///
/// `page` is 1-based. The page fetch and the total count are independent
/// reads — no snapshot guarantee across them (acceptable for this domain).
pub async fn fetch_orders_page(pool: &PgPool, page: i64, limit: i64) -> Result<OrderPage> {
    if page < 1 {
        bail!("page must be >= 1, got {}", page);
    }
    if limit < 1 {
        bail!("limit must be >= 1, got {}", limit);
    }
    let offset = (page - 1) * limit;

    let rows = sqlx::query(
        r#"
        select order_id, customer_name, address, status, created_at_utc, updated_at_utc
        from orders
        order by created_at_utc desc
        offset $1
        limit $2
        "#,
    )
    .bind(offset)
    .bind(limit)
    .fetch_all(pool)
    .await
    .context("fetch_orders_page page query failed")?;

    let orders: Vec<OrderRow> = rows
        .iter()
        .map(order_from_row)
        .collect::<Result<_>>()?;

    let ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
    let mut items_by_order = fetch_line_items(pool, &ids).await?;

    let orders = orders
        .into_iter()
        .map(|order| {
            let order_line_items = items_by_order.remove(&order.id).unwrap_or_default();
            OrderWithItems { order, order_line_items }
        })
        .collect();

    let total = count_orders(pool).await?;

    Ok(OrderPage {
        orders,
        total,
        pages: total_pages(total, limit),
    })
}

/// Total number of orders in the store.
pub async fn count_orders(pool: &PgPool) -> Result<i64> {
    let (n,): (i64,) = sqlx::query_as::<_, (i64,)>("select count(*)::bigint from orders")
        .fetch_one(pool)
        .await
        .context("count_orders failed")?;
    Ok(n)
}

/// Overwrite the status of an order (any → any; no transition check) and
/// bump `updated_at_utc`. `Ok(None)` if the id matches no row; nothing is
/// mutated in that case.
pub async fn update_order_status(
    pool: &PgPool,
    order_id: Uuid,
    status: OrderStatus,
) -> Result<Option<OrderRow>> {
    let row = sqlx::query(
        r#"
        update orders
        set status = $2,
            updated_at_utc = now()
        where order_id = $1
        returning order_id, customer_name, address, status, created_at_utc, updated_at_utc
        "#,
    )
    .bind(order_id)
    .bind(status.as_str())
    .fetch_optional(pool)
    .await
    .context("update_order_status failed")?;

    row.as_ref().map(order_from_row).transpose()
}

// ---------------------------------------------------------------------------
// Row mapping
// ---------------------------------------------------------------------------

fn order_from_row(row: &PgRow) -> Result<OrderRow> {
    Ok(OrderRow {
        id: row.try_get("order_id")?,
        customer_name: row.try_get("customer_name")?,
        address: row.try_get("address")?,
        status: OrderStatus::parse(&row.try_get::<String, _>("status")?)?,
        created_at: row.try_get("created_at_utc")?,
        updated_at: row.try_get("updated_at_utc")?,
    })
}

/// Load line items for a set of orders in one query, grouped by order id.
async fn fetch_line_items(
    pool: &PgPool,
    order_ids: &[Uuid],
) -> Result<HashMap<Uuid, Vec<OrderLineItemRow>>> {
    if order_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = sqlx::query(
        r#"
        select line_item_id, order_id, product_name, quantity, price
        from order_line_items
        where order_id = any($1)
        "#,
    )
    .bind(order_ids)
    .fetch_all(pool)
    .await
    .context("fetch_line_items failed")?;

    let mut by_order: HashMap<Uuid, Vec<OrderLineItemRow>> = HashMap::new();
    for row in &rows {
        let item = OrderLineItemRow {
            id: row.try_get("line_item_id")?,
            order_id: row.try_get("order_id")?,
            product_name: row.try_get("product_name")?,
            quantity: row.try_get("quantity")?,
            price: row.try_get("price")?,
        };
        by_order.entry(item.order_id).or_default().push(item);
    }

    Ok(by_order)
}

/// Ceiling of total/limit. Zero rows means zero pages.
pub fn total_pages(total: i64, limit: i64) -> i64 {
    if limit < 1 {
        return 0;
    }
    (total + limit - 1) / limit
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_status_round_trips() {
        for s in ["PENDING", "PROCESSING", "COMPLETED", "CANCELLED"] {
            let parsed = OrderStatus::parse(s).unwrap();
            assert_eq!(parsed.as_str(), s);
        }
    }

    #[test]
    fn order_status_rejects_unknown_values() {
        assert!(OrderStatus::parse("SHIPPED").is_err());
        assert!(OrderStatus::parse("pending").is_err());
        assert!(OrderStatus::parse("").is_err());
    }

    #[test]
    fn order_status_serde_uses_screaming_case() {
        let json = serde_json::to_string(&OrderStatus::Processing).unwrap();
        assert_eq!(json, "\"PROCESSING\"");
        let back: OrderStatus = serde_json::from_str("\"CANCELLED\"").unwrap();
        assert_eq!(back, OrderStatus::Cancelled);
    }

    #[test]
    fn total_pages_is_ceiling_of_total_over_limit() {
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(1, 10), 1);
        assert_eq!(total_pages(4, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(4, 2), 2);
        assert_eq!(total_pages(5, 2), 3);
    }

    fn sample_order(items: Vec<(i64, f64)>) -> OrderWithItems {
        let order_id = Uuid::new_v4();
        let now = Utc::now();
        OrderWithItems {
            order: OrderRow {
                id: order_id,
                customer_name: "Test".to_string(),
                address: "1 Rd".to_string(),
                status: OrderStatus::Pending,
                created_at: now,
                updated_at: now,
            },
            order_line_items: items
                .into_iter()
                .map(|(quantity, price)| OrderLineItemRow {
                    id: Uuid::new_v4(),
                    order_id,
                    product_name: "X".to_string(),
                    quantity,
                    price,
                })
                .collect(),
        }
    }

    #[test]
    fn total_is_sum_of_quantity_times_price() {
        assert_eq!(sample_order(vec![(2, 10.0)]).total(), 20.0);
        let mixed = sample_order(vec![(2, 29.99), (1, 49.99)]).total();
        assert!((mixed - 109.97).abs() < 1e-9, "got {mixed}");
        assert_eq!(sample_order(vec![]).total(), 0.0);
    }

    #[test]
    fn order_with_items_serializes_camel_case_wire_shape() {
        let order = sample_order(vec![(2, 10.0)]);
        let v = serde_json::to_value(&order).unwrap();

        assert!(v.get("customerName").is_some());
        assert!(v.get("createdAt").is_some());
        assert!(v.get("updatedAt").is_some());
        assert_eq!(v["status"], "PENDING");

        let items = v["orderLineItems"].as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert!(items[0].get("productName").is_some());
        assert!(items[0].get("orderId").is_some());
        assert_eq!(items[0]["quantity"], 2);
    }
}
