//! # Order Client
//!
//! Every mutation goes to the order actor first. Once the actor has committed the change,
//! the follow-up events are emitted and their outcomes returned next to the order. A
//! failed emit is reported, never rolled back.
//!
//! | mutation | room event | broadcast |
//! |----------|-----------|-----------|
//! | create | `new_order` to the branch | `admin_data_update` |
//! | pay | `status_update` to the order | `admin_data_update` |
//! | set status | `status_update` to the order | `admin_data_update` |
//! | assign drone | `status_update` to the order | |
//! | update details | | `admin_data_update` |
//! | delete | | `admin_data_update` |
use crate::model::{Order, OrderCreate, OrderId, OrderStatus, OrderUpdate};
use crate::notify::{emit_all, Event, Notified, Notifier, ADMIN_DATA_UPDATE, NEW_ORDER, STATUS_UPDATE};
use crate::order_actor::{OrderAction, OrderError};
use actor_framework::{ActorClient, FrameworkError, ResourceClient};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// How the delivery loop writes back to orders, in process or over HTTP.
#[async_trait]
pub trait OrderStatusCallback: Send + Sync {
    async fn attach_drone(&self, id: OrderId, drone: String) -> Result<(), OrderError>;
    async fn write_status(&self, id: OrderId, status: OrderStatus) -> Result<(), OrderError>;

    /// Where the order stands now; `Ok(None)` if it no longer exists.
    async fn progress(&self, id: OrderId) -> Result<Option<OrderProgress>, OrderError>;
}

/// The part of an order a flight depends on. Deserializes from a full order body.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderProgress {
    pub status: OrderStatus,
    #[serde(default)]
    pub drone_id: Option<String>,
}

impl OrderProgress {
    /// True while the order is still handed to `drone` and not yet delivered.
    pub fn awaits_flight(&self, drone: &str) -> bool {
        matches!(self.status, OrderStatus::DroneAssigned | OrderStatus::Delivering)
            && self.drone_id.as_deref() == Some(drone)
    }
}

impl From<&Order> for OrderProgress {
    fn from(order: &Order) -> Self {
        Self {
            status: order.status,
            drone_id: order.drone_id.clone(),
        }
    }
}

#[derive(Clone)]
pub struct OrderClient {
    inner: ResourceClient<Order>,
    notifier: Arc<dyn Notifier>,
}

fn status_payload(order: &Order) -> Value {
    json!({
        "status": order.status,
        "droneId": order.drone_id,
        "_id": order.id,
    })
}

impl OrderClient {
    pub fn new(inner: ResourceClient<Order>, notifier: Arc<dyn Notifier>) -> Self {
        Self { inner, notifier }
    }

    async fn notify<T>(&self, value: T, events: Vec<Event>) -> Notified<T> {
        let notifications = emit_all(self.notifier.as_ref(), events).await;
        Notified {
            value,
            notifications,
        }
    }

    async fn act(&self, id: OrderId, action: OrderAction) -> Result<Order, OrderError> {
        self.inner
            .perform_action(id, action)
            .await
            .map_err(OrderError::from_framework)
    }

    /// Prices and stores the order, then announces it to the branch.
    #[instrument(skip(self, params), fields(branch = ?params.branch_id))]
    pub async fn create_order(&self, params: OrderCreate) -> Result<Notified<Order>, OrderError> {
        debug!(lines = params.order_items.len(), "Sending create_order to actor");
        let id = self
            .inner
            .create(params)
            .await
            .map_err(OrderError::from_framework)?;
        let order = self.get_order(id).await?;
        info!(order_id = %id, total = order.total_price, "Order created");

        let events = vec![
            Event::to_room(
                NEW_ORDER,
                order.branch_id.clone(),
                serde_json::to_value(&order).unwrap_or_default(),
            ),
            Event::broadcast(ADMIN_DATA_UPDATE, Value::Null),
        ];
        Ok(self.notify(order, events).await)
    }

    #[instrument(skip(self))]
    pub async fn confirm_payment(&self, id: OrderId) -> Result<Notified<Order>, OrderError> {
        let order = self.act(id, OrderAction::ConfirmPayment).await?;
        let events = vec![
            Event::to_room(
                STATUS_UPDATE,
                id.to_string(),
                json!({ "status": order.status, "isPaid": order.is_paid, "_id": id }),
            ),
            Event::broadcast(ADMIN_DATA_UPDATE, Value::Null),
        ];
        Ok(self.notify(order, events).await)
    }

    #[instrument(skip(self))]
    pub async fn set_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Notified<Order>, OrderError> {
        let order = self.act(id, OrderAction::SetStatus(status)).await?;
        let events = vec![
            Event::to_room(STATUS_UPDATE, id.to_string(), status_payload(&order)),
            Event::broadcast(ADMIN_DATA_UPDATE, Value::Null),
        ];
        Ok(self.notify(order, events).await)
    }

    #[instrument(skip(self))]
    pub async fn assign_drone(
        &self,
        id: OrderId,
        drone: String,
    ) -> Result<Notified<Order>, OrderError> {
        let order = self.act(id, OrderAction::AssignDrone(drone)).await?;
        let events = vec![Event::to_room(
            STATUS_UPDATE,
            id.to_string(),
            status_payload(&order),
        )];
        Ok(self.notify(order, events).await)
    }

    #[instrument(skip(self, update))]
    pub async fn update_details(
        &self,
        id: OrderId,
        update: OrderUpdate,
    ) -> Result<Notified<Order>, OrderError> {
        let order = self
            .inner
            .update(id, update)
            .await
            .map_err(OrderError::from_framework)?;
        let events = vec![Event::broadcast(ADMIN_DATA_UPDATE, Value::Null)];
        Ok(self.notify(order, events).await)
    }

    /// Hard delete. The id is not reused.
    #[instrument(skip(self))]
    pub async fn delete_order(&self, id: OrderId) -> Result<Notified<OrderId>, OrderError> {
        self.delete(id).await?;
        let events = vec![Event::broadcast(
            ADMIN_DATA_UPDATE,
            json!({ "message": "Order deleted", "id": id }),
        )];
        Ok(self.notify(id, events).await)
    }

    pub async fn get_order(&self, id: OrderId) -> Result<Order, OrderError> {
        self.get(id)
            .await?
            .ok_or_else(|| OrderError::NotFound(id.to_string()))
    }

    /// Every order, optionally limited to one branch, newest first.
    pub async fn list_all(&self, branch_id: Option<&str>) -> Result<Vec<Order>, OrderError> {
        let mut orders = self.list().await?;
        if let Some(branch) = branch_id {
            orders.retain(|order| order.branch_id == branch);
        }
        newest_first(&mut orders);
        Ok(orders)
    }

    /// A customer's orders, newest first.
    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<Order>, OrderError> {
        let mut orders = self.list().await?;
        orders.retain(|order| order.user_id == user_id);
        newest_first(&mut orders);
        Ok(orders)
    }
}

fn newest_first(orders: &mut [Order]) {
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
}

#[async_trait]
impl ActorClient<Order> for OrderClient {
    type Error = OrderError;

    fn inner(&self) -> &ResourceClient<Order> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        OrderError::from_framework(e)
    }
}

#[async_trait]
impl OrderStatusCallback for OrderClient {
    async fn attach_drone(&self, id: OrderId, drone: String) -> Result<(), OrderError> {
        self.assign_drone(id, drone).await.map(|_| ())
    }

    async fn write_status(&self, id: OrderId, status: OrderStatus) -> Result<(), OrderError> {
        self.set_status(id, status).await.map(|_| ())
    }

    async fn progress(&self, id: OrderId) -> Result<Option<OrderProgress>, OrderError> {
        Ok(self.get(id).await?.as_ref().map(OrderProgress::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::{EmitReceipt, NotificationOutcome, NotifyError};
    use actor_framework::mock::{create_mock_client, expect_action, MockClient};
    use chrono::Utc;
    use std::sync::Mutex;

    /// Records every event and answers with a fixed result.
    #[derive(Default)]
    struct RecordingNotifier {
        events: Mutex<Vec<Event>>,
        fail: bool,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn emit(&self, event: Event) -> Result<EmitReceipt, NotifyError> {
            self.events.lock().unwrap().push(event);
            if self.fail {
                Err(NotifyError::Rejected(502))
            } else {
                Ok(EmitReceipt { recipients: Some(1) })
            }
        }
    }

    fn order(id: u32, status: OrderStatus) -> Order {
        let now = Utc::now();
        Order {
            id: OrderId(id),
            user_id: "user_7".into(),
            branch_id: "branch_q1".into(),
            order_items: vec![],
            shipping_address: Default::default(),
            payment_method: "COD".into(),
            items_price: 20_000,
            shipping_price: 30_000,
            total_price: 50_000,
            is_paid: false,
            paid_at: None,
            is_delivered: false,
            delivered_at: None,
            status,
            drone_id: None,
            unresolved_items: vec![],
            priced_at: Some(now),
            created_at: now,
            updated_at: now,
            requested_items: vec![],
        }
    }

    #[tokio::test]
    async fn set_status_notifies_the_order_room_and_dashboards() {
        let (client, mut requests) = create_mock_client::<Order>(4);
        let notifier = Arc::new(RecordingNotifier::default());
        let orders = OrderClient::new(client, notifier.clone());

        let task = tokio::spawn(async move { orders.set_status(OrderId(3), OrderStatus::Preparing).await });

        let (id, action, reply) = expect_action(&mut requests).await.expect("action request");
        assert_eq!(id, OrderId(3));
        assert_eq!(action, OrderAction::SetStatus(OrderStatus::Preparing));
        reply.send(Ok(order(3, OrderStatus::Preparing))).unwrap();

        let result = task.await.unwrap().unwrap();
        assert!(result.all_delivered());

        let events = notifier.events.lock().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event, STATUS_UPDATE);
        assert_eq!(events[0].room.as_deref(), Some("order_3"));
        assert_eq!(events[0].data["status"], "PREPARING");
        assert_eq!(events[0].data["_id"], "order_3");
        assert_eq!(events[1].event, ADMIN_DATA_UPDATE);
        assert!(events[1].room.is_none());
    }

    #[tokio::test]
    async fn relay_failure_keeps_the_committed_change() {
        let mut mock = MockClient::<Order>::new();
        let mut paid = order(5, OrderStatus::PaidWaitingProcess);
        paid.is_paid = true;
        mock.expect_action(OrderId(5)).return_ok(paid);

        let notifier = Arc::new(RecordingNotifier {
            fail: true,
            ..Default::default()
        });
        let result = OrderClient::new(mock.client(), notifier)
            .confirm_payment(OrderId(5))
            .await
            .unwrap();

        assert!(result.value.is_paid);
        assert_eq!(result.notifications.len(), 2);
        assert!(matches!(
            &result.notifications[0],
            NotificationOutcome::Failed { event, .. } if event == STATUS_UPDATE
        ));
        mock.verify();
    }

    #[tokio::test]
    async fn entity_errors_reach_the_caller_unchanged() {
        let mut mock = MockClient::<Order>::new();
        let illegal = OrderError::IllegalTransition {
            from: OrderStatus::Delivered,
            to: OrderStatus::Preparing,
        };
        mock.expect_action(OrderId(1))
            .return_err(FrameworkError::EntityError(Box::new(illegal.clone())));

        let notifier = Arc::new(RecordingNotifier::default());
        let result = OrderClient::new(mock.client(), notifier.clone())
            .set_status(OrderId(1), OrderStatus::Preparing)
            .await;

        assert_eq!(result, Err(illegal));
        assert!(notifier.events.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn lists_filter_and_sort_newest_first() {
        let mut mock = MockClient::<Order>::new();
        let older = order(1, OrderStatus::PendingPayment);
        let mut newer = order(2, OrderStatus::Preparing);
        newer.created_at = older.created_at + chrono::Duration::seconds(5);
        let mut elsewhere = order(3, OrderStatus::Preparing);
        elsewhere.branch_id = "branch_q7".into();
        elsewhere.user_id = "user_8".into();
        let all = vec![older, newer, elsewhere];
        mock.expect_list().return_ok(all.clone());
        mock.expect_list().return_ok(all);

        let orders = OrderClient::new(mock.client(), Arc::new(RecordingNotifier::default()));
        let branch: Vec<OrderId> = orders
            .list_all(Some("branch_q1"))
            .await
            .unwrap()
            .into_iter()
            .map(|o| o.id)
            .collect();
        assert_eq!(branch, vec![OrderId(2), OrderId(1)]);

        let mine = orders.list_for_user("user_8").await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].id, OrderId(3));
    }

    #[tokio::test]
    async fn progress_reports_what_a_flight_needs() {
        let mut mock = MockClient::<Order>::new();
        let mut flying = order(4, OrderStatus::Delivering);
        flying.drone_id = Some("Drone Alpha 01".into());
        mock.expect_get(OrderId(4)).return_ok(Some(flying));
        mock.expect_get(OrderId(5)).return_ok(None);

        let orders = OrderClient::new(mock.client(), Arc::new(RecordingNotifier::default()));
        let progress = orders.progress(OrderId(4)).await.unwrap().unwrap();
        assert!(progress.awaits_flight("Drone Alpha 01"));
        assert!(!progress.awaits_flight("Drone Beta 02"));
        assert_eq!(orders.progress(OrderId(5)).await.unwrap(), None);
        mock.verify();

        let unpaid = OrderProgress::from(&order(6, OrderStatus::PendingPayment));
        assert!(!unpaid.awaits_flight("Drone Alpha 01"));
    }
}
