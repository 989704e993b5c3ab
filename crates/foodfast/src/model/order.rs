//! Orders and their pricing.
//!
//! # Actor Framework
//! [`Order`] implements [`ActorEntity`](actor_framework::ActorEntity) in
//! [`order_actor`](crate::order_actor). Creation parameters are [`OrderCreate`], field
//! updates are [`OrderUpdate`] and lifecycle moves are
//! [`OrderAction`](crate::order_actor::OrderAction).
use crate::model::ProductRef;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

entity_id!(
    /// Identifier of an order. Also the name of the room its tracking page joins.
    OrderId,
    "order"
);

pub const GUEST_USER: &str = "guest";
pub const DEFAULT_PAYMENT_METHOD: &str = "COD";
pub const DEFAULT_COUNTRY: &str = "Vietnam";

/// Lifecycle label of an order. The wire strings are matched literally by clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    PendingPayment,
    PaidWaitingProcess,
    Preparing,
    ReadyToShip,
    DroneAssigned,
    Delivering,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Pipeline order, with the side state last.
    pub const ALL: [OrderStatus; 8] = [
        Self::PendingPayment,
        Self::PaidWaitingProcess,
        Self::Preparing,
        Self::ReadyToShip,
        Self::DroneAssigned,
        Self::Delivering,
        Self::Delivered,
        Self::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::PendingPayment => "PENDING_PAYMENT",
            Self::PaidWaitingProcess => "PAID_WAITING_PROCESS",
            Self::Preparing => "PREPARING",
            Self::ReadyToShip => "READY_TO_SHIP",
            Self::DroneAssigned => "DRONE_ASSIGNED",
            Self::Delivering => "DELIVERING",
            Self::Delivered => "DELIVERED",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Next stage of the pipeline. `None` for the terminal states.
    pub fn successor(self) -> Option<Self> {
        match self {
            Self::PendingPayment => Some(Self::PaidWaitingProcess),
            Self::PaidWaitingProcess => Some(Self::Preparing),
            Self::Preparing => Some(Self::ReadyToShip),
            Self::ReadyToShip => Some(Self::DroneAssigned),
            Self::DroneAssigned => Some(Self::Delivering),
            Self::Delivering => Some(Self::Delivered),
            Self::Delivered | Self::Cancelled => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("unknown order status: {0:?}")]
pub struct UnknownStatus(pub String);

impl FromStr for OrderStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

/// A priced line. `name`, `image` and `price` are copied from the product when the
/// order is created and never re-read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub product: ProductRef,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub qty: u32,
    pub price: u64,
    #[serde(default)]
    pub selected_options: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl LineItem {
    /// `None` when price times quantity does not fit in a `u64`.
    pub fn subtotal(&self) -> Option<u64> {
        self.price.checked_mul(u64::from(self.qty))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShippingAddress {
    pub full_name: String,
    pub email: String,
    pub address: String,
    pub city: String,
    pub phone: String,
    pub country: String,
}

impl Default for ShippingAddress {
    fn default() -> Self {
        Self {
            full_name: String::new(),
            email: String::new(),
            address: String::new(),
            city: String::new(),
            phone: String::new(),
            country: DEFAULT_COUNTRY.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: OrderId,
    pub user_id: String,
    pub branch_id: String,
    pub order_items: Vec<LineItem>,
    pub shipping_address: ShippingAddress,
    pub payment_method: String,
    pub items_price: u64,
    pub shipping_price: u64,
    pub total_price: u64,
    pub is_paid: bool,
    pub paid_at: Option<DateTime<Utc>>,
    pub is_delivered: bool,
    pub delivered_at: Option<DateTime<Utc>>,
    pub status: OrderStatus,
    pub drone_id: Option<String>,
    /// Products that could not be looked up at creation and were left out.
    #[serde(default)]
    pub unresolved_items: Vec<ProductRef>,
    /// When the line snapshots were taken.
    pub priced_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Lines as submitted; consumed when the order is priced.
    #[serde(skip)]
    pub requested_items: Vec<OrderItemRequest>,
}

impl Order {
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

fn one() -> u32 {
    1
}

/// A line as submitted by the client. Older clients send `productId` and `quantity`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRequest {
    #[serde(alias = "productId")]
    pub product: ProductRef,
    #[serde(default = "one", alias = "quantity")]
    pub qty: u32,
    #[serde(default)]
    pub selected_options: Vec<Value>,
    #[serde(default)]
    pub note: Option<String>,
}

impl OrderItemRequest {
    pub fn new(product: impl Into<ProductRef>, qty: u32) -> Self {
        Self {
            product: product.into(),
            qty,
            selected_options: Vec::new(),
            note: None,
        }
    }
}

/// Checkout payload. Missing user and payment method fall back to guest / cash on
/// delivery; the branch is required but not checked for existence.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreate {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub branch_id: Option<String>,
    #[serde(default)]
    pub order_items: Vec<OrderItemRequest>,
    #[serde(default)]
    pub shipping_address: Option<ShippingAddress>,
    #[serde(default)]
    pub payment_method: Option<String>,
}

/// Contact details that may change before the order ships.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderUpdate {
    pub shipping_address: Option<ShippingAddress>,
    pub payment_method: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricingRules {
    /// Subtotals at or above this ship free.
    pub free_shipping_threshold: u64,
    pub shipping_fee: u64,
}

impl Default for PricingRules {
    fn default() -> Self {
        Self {
            free_shipping_threshold: 100_000,
            shipping_fee: 30_000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceBreakdown {
    pub items: u64,
    pub shipping: u64,
    pub total: u64,
}

impl PricingRules {
    /// `None` if any subtotal or sum overflows.
    pub fn quote(&self, items: &[LineItem]) -> Option<PriceBreakdown> {
        let items = items
            .iter()
            .try_fold(0u64, |sum, line| sum.checked_add(line.subtotal()?))?;
        let shipping = if items >= self.free_shipping_threshold {
            0
        } else {
            self.shipping_fee
        };
        Some(PriceBreakdown {
            items,
            shipping,
            total: items.checked_add(shipping)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ProductId;

    fn line(price: u64, qty: u32) -> LineItem {
        LineItem {
            product: ProductId(1).into(),
            name: "Com tam".into(),
            image: None,
            qty,
            price,
            selected_options: vec![],
            note: None,
        }
    }

    #[test]
    fn subtotal_at_threshold_ships_free() {
        let quote = PricingRules::default().quote(&[line(60_000, 1), line(50_000, 1)]);
        assert_eq!(quote, Some(PriceBreakdown { items: 110_000, shipping: 0, total: 110_000 }));

        let exact = PricingRules::default().quote(&[line(50_000, 2)]).unwrap();
        assert_eq!(exact.shipping, 0);
    }

    #[test]
    fn small_basket_pays_the_flat_fee() {
        let quote = PricingRules::default().quote(&[line(20_000, 1)]);
        assert_eq!(quote, Some(PriceBreakdown { items: 20_000, shipping: 30_000, total: 50_000 }));
    }

    #[test]
    fn overflowing_totals_have_no_quote() {
        let rules = PricingRules::default();
        assert_eq!(rules.quote(&[line(u64::MAX / 2 + 1, 2)]), None);
        assert_eq!(rules.quote(&[line(u64::MAX - 1, 1), line(2, 1)]), None);
        // the flat fee can tip a subtotal just under the limit over it
        let tight = PricingRules { free_shipping_threshold: u64::MAX, shipping_fee: 30_000 };
        assert_eq!(tight.quote(&[line(u64::MAX - 1, 1)]), None);
    }

    #[test]
    fn status_strings_round_trip_literally() {
        for status in OrderStatus::ALL {
            assert_eq!(status.as_str().parse::<OrderStatus>(), Ok(status));
            assert_eq!(
                serde_json::to_value(status).unwrap(),
                Value::String(status.as_str().into())
            );
        }
        assert!("delivered".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn legacy_item_fields_are_accepted() {
        let create: OrderCreate = serde_json::from_value(serde_json::json!({
            "branchId": "branch_q1",
            "orderItems": [
                { "productId": "product_2", "quantity": 3 },
                { "product": "5" }
            ]
        }))
        .unwrap();

        assert_eq!(create.order_items[0], OrderItemRequest::new(ProductId(2), 3));
        assert_eq!(create.order_items[1].qty, 1);
        assert!(create.user_id.is_none());
    }
}
