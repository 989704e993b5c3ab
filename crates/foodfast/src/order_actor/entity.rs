//! [`ActorEntity`] implementation for [`Order`].
//!
//! Creation is two-phase: [`from_create_params`](ActorEntity::from_create_params)
//! validates the payload synchronously, then [`on_create`](ActorEntity::on_create) prices
//! each requested line against the product catalog.

use crate::clients::ProductCatalog;
use crate::model::{
    LineItem, Order, OrderCreate, OrderId, OrderStatus, OrderUpdate, PricingRules,
    DEFAULT_COUNTRY, DEFAULT_PAYMENT_METHOD, GUEST_USER,
};
use crate::order_actor::{OrderAction, OrderError, TransitionPolicy};
use actor_framework::ActorEntity;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

/// Dependencies injected into the order actor at `run` time.
#[derive(Clone)]
pub struct OrderContext {
    pub catalog: Arc<dyn ProductCatalog>,
    pub pricing: PricingRules,
    pub policy: TransitionPolicy,
}

#[async_trait]
impl ActorEntity for Order {
    type Id = OrderId;
    type Create = OrderCreate;
    type Update = OrderUpdate;
    type Action = OrderAction;
    type ActionResult = Order;
    type Context = OrderContext;
    type Error = OrderError;

    fn from_create_params(id: OrderId, params: OrderCreate) -> Result<Self, Self::Error> {
        if params.order_items.is_empty() {
            return Err(OrderError::ValidationError(
                "orderItems must contain at least one item".into(),
            ));
        }
        let branch_id = params
            .branch_id
            .filter(|branch| !branch.trim().is_empty())
            .ok_or_else(|| OrderError::ValidationError("branchId is required".into()))?;

        let mut shipping_address = params.shipping_address.unwrap_or_default();
        shipping_address.country = DEFAULT_COUNTRY.to_string();

        let now = Utc::now();
        Ok(Self {
            id,
            user_id: params
                .user_id
                .filter(|user| !user.is_empty())
                .unwrap_or_else(|| GUEST_USER.to_string()),
            branch_id,
            order_items: Vec::new(),
            shipping_address,
            payment_method: params
                .payment_method
                .filter(|method| !method.is_empty())
                .unwrap_or_else(|| DEFAULT_PAYMENT_METHOD.to_string()),
            items_price: 0,
            shipping_price: 0,
            total_price: 0,
            is_paid: false,
            paid_at: None,
            is_delivered: false,
            delivered_at: None,
            status: OrderStatus::PendingPayment,
            drone_id: None,
            unresolved_items: Vec::new(),
            priced_at: None,
            created_at: now,
            updated_at: now,
            requested_items: params.order_items,
        })
    }

    /// Snapshots name, image and price of every resolvable line, then prices the order.
    ///
    /// Lines whose product is missing or whose lookup fails are left out and listed in
    /// `unresolved_items`. The order is refused only when nothing resolves.
    async fn on_create(&mut self, ctx: &OrderContext) -> Result<(), Self::Error> {
        let requested = std::mem::take(&mut self.requested_items);
        let requested_count = requested.len();

        for item in requested {
            match ctx.catalog.lookup(&item.product).await {
                Ok(Some(snapshot)) => self.order_items.push(LineItem {
                    product: snapshot.product,
                    name: snapshot.name,
                    image: snapshot.image,
                    qty: item.qty.max(1),
                    price: snapshot.price,
                    selected_options: item.selected_options,
                    note: item.note,
                }),
                Ok(None) => {
                    warn!(order_id = %self.id, product = %item.product, "Product not found, line dropped");
                    self.unresolved_items.push(item.product);
                }
                Err(e) => {
                    warn!(order_id = %self.id, product = %item.product, error = %e, "Product lookup failed, line dropped");
                    self.unresolved_items.push(item.product);
                }
            }
        }

        if self.order_items.is_empty() {
            return Err(OrderError::NoResolvableItems {
                requested: requested_count,
            });
        }

        let quote = ctx.pricing.quote(&self.order_items).ok_or_else(|| {
            OrderError::ValidationError("order total exceeds the supported amount".into())
        })?;
        self.items_price = quote.items;
        self.shipping_price = quote.shipping;
        self.total_price = quote.total;
        self.priced_at = Some(Utc::now());

        info!(
            order_id = %self.id,
            branch = %self.branch_id,
            lines = self.order_items.len(),
            dropped = self.unresolved_items.len(),
            total = self.total_price,
            "Order priced"
        );
        Ok(())
    }

    async fn on_update(&mut self, update: OrderUpdate, _ctx: &OrderContext) -> Result<(), Self::Error> {
        if let Some(mut address) = update.shipping_address {
            address.country = DEFAULT_COUNTRY.to_string();
            self.shipping_address = address;
        }
        if let Some(method) = update.payment_method {
            self.payment_method = method;
        }
        self.touch();
        Ok(())
    }

    async fn handle_action(&mut self, action: OrderAction, ctx: &OrderContext) -> Result<Order, Self::Error> {
        match action {
            OrderAction::ConfirmPayment => {
                ctx.policy.check_payment(self.status)?;
                self.is_paid = true;
                self.paid_at.get_or_insert_with(Utc::now);
                self.status = OrderStatus::PaidWaitingProcess;
            }
            OrderAction::SetStatus(status) => {
                ctx.policy.check(self.status, status)?;
                self.status = status;
                if status == OrderStatus::Delivered {
                    self.is_delivered = true;
                    self.delivered_at.get_or_insert_with(Utc::now);
                }
            }
            OrderAction::AssignDrone(drone) => {
                self.drone_id = Some(drone);
                if self.status == OrderStatus::ReadyToShip {
                    self.status = OrderStatus::DroneAssigned;
                }
            }
        }
        self.touch();
        Ok(self.clone())
    }
}
