//! Seed/reset routine: wipes the store and inserts a fixed set of four
//! sample orders. This is the only deletion path in the system — the
//! application API never deletes orders or line items.

use anyhow::{Context, Result};
use sqlx::PgPool;

use crate::{create_order, update_order_status, NewLineItem, NewOrder, OrderStatus, OrderWithItems};

/// Delete everything, then insert the four sample orders.
///
/// Orders are created sequentially so `created_at_utc` strictly increases;
/// the list view is newest-first, so the last seeded order ("Alice Brown")
/// renders at the top. Returns the seeded orders in creation order.
pub async fn reset_and_seed(pool: &PgPool) -> Result<Vec<OrderWithItems>> {
    // Line items first: cascade would cover them, but an explicit wipe keeps
    // the reset independent of the FK definition.
    sqlx::query("delete from order_line_items")
        .execute(pool)
        .await
        .context("seed: wipe order_line_items failed")?;
    sqlx::query("delete from orders")
        .execute(pool)
        .await
        .context("seed: wipe orders failed")?;

    let mut seeded = Vec::with_capacity(4);
    for (new, status) in sample_orders() {
        let mut created = create_order(pool, &new).await?;

        // create_order always starts orders as PENDING; seeds with another
        // lifecycle status go through the normal status-update path.
        if status != OrderStatus::Pending {
            let updated = update_order_status(pool, created.order.id, status)
                .await?
                .context("seed: just-created order missing on status update")?;
            created.order = updated;
        }

        seeded.push(created);
    }

    Ok(seeded)
}

/// The fixed demonstration data set: four orders with their line items and
/// target statuses.
fn sample_orders() -> Vec<(NewOrder, OrderStatus)> {
    vec![
        (
            NewOrder {
                customer_name: "John Doe".to_string(),
                address: "123 Main St, City, Country".to_string(),
                line_items: vec![
                    NewLineItem {
                        product_name: "Widget A".to_string(),
                        quantity: 2,
                        price: 29.99,
                    },
                    NewLineItem {
                        product_name: "Widget B".to_string(),
                        quantity: 1,
                        price: 49.99,
                    },
                ],
            },
            OrderStatus::Pending,
        ),
        (
            NewOrder {
                customer_name: "Jane Smith".to_string(),
                address: "456 Oak Ave, Town, Country".to_string(),
                line_items: vec![NewLineItem {
                    product_name: "Widget C".to_string(),
                    quantity: 3,
                    price: 19.99,
                }],
            },
            OrderStatus::Processing,
        ),
        (
            NewOrder {
                customer_name: "Bob Johnson".to_string(),
                address: "789 Pine Rd, Village, Country".to_string(),
                line_items: vec![
                    NewLineItem {
                        product_name: "Widget D".to_string(),
                        quantity: 1,
                        price: 39.99,
                    },
                    NewLineItem {
                        product_name: "Widget E".to_string(),
                        quantity: 4,
                        price: 15.99,
                    },
                ],
            },
            OrderStatus::Completed,
        ),
        (
            NewOrder {
                customer_name: "Alice Brown".to_string(),
                address: "321 Elm St, City, Country".to_string(),
                line_items: vec![NewLineItem {
                    product_name: "Widget F".to_string(),
                    quantity: 2,
                    price: 25.99,
                }],
            },
            OrderStatus::Completed,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_set_has_four_orders_each_with_items() {
        let set = sample_orders();
        assert_eq!(set.len(), 4);
        for (new, _) in &set {
            assert!(!new.line_items.is_empty());
            assert!(!new.customer_name.is_empty());
            assert!(!new.address.is_empty());
        }
    }

    #[test]
    fn sample_statuses_match_demo_fixture() {
        let statuses: Vec<OrderStatus> = sample_orders().into_iter().map(|(_, s)| s).collect();
        assert_eq!(
            statuses,
            vec![
                OrderStatus::Pending,
                OrderStatus::Processing,
                OrderStatus::Completed,
                OrderStatus::Completed,
            ]
        );
    }
}
