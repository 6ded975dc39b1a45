//! Request and response types for all oms-daemon HTTP endpoints, plus the
//! shape validation applied before any database work.
//!
//! Wire field names are camelCase to match the order-table frontend.
//! Successful responses reuse the `oms_db` row types directly (`OrderWithItems`,
//! `OrderPage`), which already serialize in the same wire form.

use oms_db::{NewLineItem, NewOrder, OrderStatus};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Hard cap on page size. The caller is otherwise trusted to supply sane
/// values, but an unbounded limit would let one request drag the whole
/// table through the pool.
pub const MAX_PAGE_SIZE: i64 = 100;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 10;

// ---------------------------------------------------------------------------
// GET /v1/health
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub service: &'static str,
    pub version: &'static str,
}

// ---------------------------------------------------------------------------
// GET /v1/orders
// ---------------------------------------------------------------------------

/// Query parameters of the paginated list. Both optional; both 1-based /
/// positive once resolved.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListOrdersParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl ListOrdersParams {
    /// Resolve defaults and validate. Zero or negative values are rejected;
    /// oversized limits are clamped to [`MAX_PAGE_SIZE`].
    pub fn resolve(&self) -> Result<(i64, i64), ApiError> {
        let page = self.page.unwrap_or(DEFAULT_PAGE);
        let limit = self.limit.unwrap_or(DEFAULT_PAGE_SIZE);

        if page < 1 {
            return Err(ApiError::validation("page", format!("must be >= 1, got {page}")));
        }
        if limit < 1 {
            return Err(ApiError::validation("limit", format!("must be >= 1, got {limit}")));
        }

        Ok((page, limit.min(MAX_PAGE_SIZE)))
    }
}

// ---------------------------------------------------------------------------
// POST /v1/orders
// ---------------------------------------------------------------------------

/// Create-order input. There is deliberately no status field: every order
/// starts as PENDING and no caller value can override that.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub customer_name: String,
    pub address: String,
    pub order_line_items: Vec<LineItemInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemInput {
    pub product_name: String,
    pub quantity: i64,
    pub price: f64,
}

impl CreateOrderRequest {
    /// Shape validation: non-empty customer name and address. The whole
    /// request is rejected on the first failing field. An empty item array
    /// is accepted here — "at least one line item" is a UI rule, not a
    /// schema rule. Quantity/price bounds are enforced by the DB CHECKs.
    pub fn validate(self) -> Result<NewOrder, ApiError> {
        if self.customer_name.is_empty() {
            return Err(ApiError::validation("customerName", "must not be empty"));
        }
        if self.address.is_empty() {
            return Err(ApiError::validation("address", "must not be empty"));
        }

        Ok(NewOrder {
            customer_name: self.customer_name,
            address: self.address,
            line_items: self
                .order_line_items
                .into_iter()
                .map(|li| NewLineItem {
                    product_name: li.product_name,
                    quantity: li.quantity,
                    price: li.price,
                })
                .collect(),
        })
    }
}

// ---------------------------------------------------------------------------
// POST /v1/orders/:id/status
// ---------------------------------------------------------------------------

/// Status-update input. The status arrives as a string and is parsed against
/// the closed enum so an unknown value is a validation failure (400), not a
/// deserialization rejection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

impl UpdateStatusRequest {
    pub fn parse_status(&self) -> Result<OrderStatus, ApiError> {
        OrderStatus::parse(&self.status).map_err(|_| {
            ApiError::validation(
                "status",
                format!(
                    "must be one of PENDING, PROCESSING, COMPLETED, CANCELLED; got `{}`",
                    self.status
                ),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_params_default_to_page_1_limit_10() {
        let (page, limit) = ListOrdersParams::default().resolve().unwrap();
        assert_eq!(page, 1);
        assert_eq!(limit, 10);
    }

    #[test]
    fn list_params_reject_non_positive_values() {
        assert!(ListOrdersParams { page: Some(0), limit: None }.resolve().is_err());
        assert!(ListOrdersParams { page: None, limit: Some(-1) }.resolve().is_err());
    }

    #[test]
    fn list_params_clamp_oversized_limit() {
        let (_, limit) = ListOrdersParams { page: Some(1), limit: Some(10_000) }
            .resolve()
            .unwrap();
        assert_eq!(limit, MAX_PAGE_SIZE);
    }

    #[test]
    fn create_request_rejects_empty_required_fields() {
        let req = CreateOrderRequest {
            customer_name: String::new(),
            address: "1 Rd".to_string(),
            order_line_items: vec![],
        };
        assert!(req.validate().is_err());

        let req = CreateOrderRequest {
            customer_name: "Test".to_string(),
            address: String::new(),
            order_line_items: vec![],
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn create_request_accepts_empty_item_array() {
        // At-least-one-item is enforced by the UI, not the API schema.
        let req = CreateOrderRequest {
            customer_name: "Test".to_string(),
            address: "1 Rd".to_string(),
            order_line_items: vec![],
        };
        let new = req.validate().unwrap();
        assert!(new.line_items.is_empty());
    }

    #[test]
    fn create_request_deserializes_camel_case() {
        let req: CreateOrderRequest = serde_json::from_str(
            r#"{"customerName":"Test","address":"1 Rd","orderLineItems":[{"productName":"X","quantity":2,"price":10.0}]}"#,
        )
        .unwrap();
        assert_eq!(req.customer_name, "Test");
        assert_eq!(req.order_line_items[0].product_name, "X");
    }

    #[test]
    fn update_status_parses_enum_and_rejects_unknown() {
        let ok = UpdateStatusRequest { status: "PROCESSING".to_string() };
        assert_eq!(ok.parse_status().unwrap(), OrderStatus::Processing);

        let bad = UpdateStatusRequest { status: "SHIPPED".to_string() };
        assert!(bad.parse_status().is_err());
    }
}
