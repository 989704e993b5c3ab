//! Drives the whole system through its HTTP surface on an ephemeral port.

use foodfast::clients::{OrderStatusCallback, ProductCatalog};
use foodfast::config::Config;
use foodfast::http::{router, AppState};
use foodfast::lifecycle::FoodFastSystem;
use foodfast::model::{OrderId, OrderStatus, ProductId, ProductRef};
use foodfast::notify::{Event, Notifier};
use foodfast::order_actor::OrderError;
use foodfast::remote::{http_client, HttpNotifier, HttpOrderStatus, HttpProductCatalog};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::time::{sleep, timeout};

struct Gateway {
    base: String,
    http: Client,
    system: FoodFastSystem,
    _store: TempDir,
}

async fn serve(state: AppState) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router(state)).await.unwrap();
    });
    format!("http://{addr}")
}

async fn start(tick_ms: &str) -> Gateway {
    let store = tempfile::tempdir().unwrap();
    let store_path = store.path().to_string_lossy().into_owned();
    let tick = tick_ms.to_string();
    let config = Config::from_lookup(move |key| match key {
        "FOODFAST_DELIVERY_STORE" => Some(store_path.clone()),
        "FOODFAST_FLIGHT_TICK_MS" => Some(tick.clone()),
        "FOODFAST_FLIGHT_STEP_PERCENT" => Some("25".into()),
        _ => None,
    })
    .unwrap();

    let system = FoodFastSystem::start(&config).await.unwrap();
    let base = serve(system.state()).await;
    Gateway {
        base,
        http: Client::new(),
        system,
        _store: store,
    }
}

impl Gateway {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    async fn get(&self, path: &str) -> (StatusCode, Value) {
        let response = self.http.get(self.url(path)).send().await.unwrap();
        (response.status(), response.json().await.unwrap())
    }

    async fn send(&self, method: reqwest::Method, path: &str, body: Value) -> (StatusCode, Value) {
        let response = self
            .http
            .request(method, self.url(path))
            .json(&body)
            .send()
            .await
            .unwrap();
        (response.status(), response.json().await.unwrap())
    }

    async fn post(&self, path: &str, body: Value) -> (StatusCode, Value) {
        self.send(reqwest::Method::POST, path, body).await
    }

    async fn put(&self, path: &str, body: Value) -> (StatusCode, Value) {
        self.send(reqwest::Method::PUT, path, body).await
    }

    async fn product(&self, name: &str, price: u64) -> String {
        let (status, product) = self
            .post("/api/products", json!({ "name": name, "price": price }))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        product["_id"].as_str().unwrap().to_string()
    }

    async fn order(&self, user: &str, branch: &str, product: &str, qty: u32) -> Value {
        let (status, order) = self
            .post(
                "/api/orders",
                json!({
                    "userId": user,
                    "branchId": branch,
                    "orderItems": [{ "productId": product, "quantity": qty }],
                    "shippingAddress": { "fullName": "Nguyen Van A", "address": "1 Le Loi", "city": "HCMC" }
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{order}");
        order
    }

    async fn wait_for(&self, path: &str, done: impl Fn(&Value) -> bool) -> Value {
        timeout(Duration::from_secs(5), async {
            loop {
                let (_, body) = self.get(path).await;
                if done(&body) {
                    return body;
                }
                sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap_or_else(|_| panic!("{path} never reached the expected state"))
    }
}

#[tokio::test]
async fn order_travels_from_checkout_to_doorstep() {
    let gw = start("5").await;
    let product = gw.product("Com tam suon", 45_000).await;

    let created = gw.order("user_binh", "branch_q1", &product, 2).await;
    assert_eq!(created["status"], "PENDING_PAYMENT");
    assert_eq!(created["itemsPrice"], 90_000);
    assert_eq!(created["shippingPrice"], 30_000);
    assert_eq!(created["totalPrice"], 120_000);
    assert_eq!(created["shippingAddress"]["country"], "Vietnam");
    assert_eq!(created["notifications"].as_array().unwrap().len(), 2);
    let id = created["_id"].as_str().unwrap().to_string();

    let (status, paid) = gw.put(&format!("/api/orders/{id}/pay"), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(paid["isPaid"], true);
    for next in ["PREPARING", "READY_TO_SHIP"] {
        let (status, body) = gw
            .put(&format!("/api/orders/{id}/status"), json!({ "status": next }))
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
    }

    let (_, idle) = gw.get("/api/delivery/drones").await;
    let idle = idle.as_array().unwrap().clone();
    assert_eq!(idle.len(), 2);
    let drone_id = idle[0]["_id"].as_str().unwrap();

    let (status, started) = gw
        .post(
            "/api/delivery/start-delivery",
            json!({ "orderId": id, "droneId": drone_id }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{started}");
    assert_eq!(started["delivery"]["droneLabel"], "Drone Alpha 01");

    let delivered = gw
        .wait_for(&format!("/api/orders/{id}"), |o| o["status"] == "DELIVERED")
        .await;
    assert_eq!(delivered["isDelivered"], true);
    assert_eq!(delivered["droneId"], "Drone Alpha 01");

    gw.wait_for("/api/delivery/drones", |d| d.as_array().is_some_and(|d| d.len() == 2))
        .await;
}

#[tokio::test]
async fn failures_map_to_meaningful_statuses() {
    let gw = start("5").await;
    let product = gw.product("Bun bo", 50_000).await;
    let order = gw.order("user_chi", "branch_q3", &product, 1).await;
    let id = order["_id"].as_str().unwrap();

    let (status, body) = gw.get("/api/orders/order_404").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["message"].as_str().unwrap().contains("order_404"));

    let (status, _) = gw.get("/api/orders/not-an-id").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = gw
        .put(&format!("/api/orders/{id}/status"), json!({ "status": "SHIPPED" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = gw
        .put(&format!("/api/orders/{id}/status"), json!({ "status": "DELIVERING" }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = gw
        .post("/api/orders", json!({ "branchId": "branch_q3", "orderItems": [] }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = gw
        .post(
            "/api/orders",
            json!({ "branchId": "branch_q3", "orderItems": [{ "product": "product_77" }] }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn listings_filter_and_sort_newest_first() {
    let gw = start("5").await;
    let product = gw.product("Goi cuon", 20_000).await;
    let first = gw.order("user_dung", "branch_q1", &product, 1).await;
    let second = gw.order("user_dung", "branch_q7", &product, 1).await;
    gw.order("user_em", "branch_q1", &product, 1).await;

    let (_, mine) = gw.get("/api/orders/myorders/user_dung").await;
    let ids: Vec<&str> = mine.as_array().unwrap().iter().map(|o| o["_id"].as_str().unwrap()).collect();
    assert_eq!(ids, vec![second["_id"].as_str().unwrap(), first["_id"].as_str().unwrap()]);

    let (_, q1) = gw.get("/api/orders/all?branchId=branch_q1").await;
    assert_eq!(q1.as_array().unwrap().len(), 2);
    let (_, all) = gw.get("/api/orders/all").await;
    assert_eq!(all.as_array().unwrap().len(), 3);

    let response = gw
        .http
        .delete(gw.url(&format!("/api/orders/{}", first["_id"].as_str().unwrap())))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let (_, all) = gw.get("/api/orders/all").await;
    assert_eq!(all.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn flights_can_be_cancelled_but_not_doubled() {
    let gw = start("60000").await;
    let order = json!({ "orderId": "order_5" });

    let (status, _) = gw.post("/api/delivery/start-delivery", order.clone()).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = gw.post("/api/delivery/start-delivery", order).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, cancelled) = gw.post("/api/delivery/cancel-delivery/order_5", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cancelled["phase"], "CANCELLED");
    assert_eq!(cancelled["droneLabel"], "Drone auto");

    let (status, _) = gw.post("/api/delivery/cancel-delivery/order_5", json!({})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn drone_status_can_be_changed_by_operators() {
    let gw = start("5").await;
    let (status, drone) = gw
        .put("/api/delivery/drones/drone_2", json!({ "status": "MAINTENANCE", "battery": 40 }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(drone["status"], "MAINTENANCE");
    assert_eq!(drone["battery"], 40);

    let (_, idle) = gw.get("/api/delivery/drones").await;
    assert_eq!(idle.as_array().unwrap().len(), 1);

    let (status, _) = gw.put("/api/delivery/drones/drone_9", json!({ "battery": 10 })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn operators_can_register_drones() {
    let gw = start("5").await;
    let (status, drone) = gw
        .post("/api/delivery/drones", json!({ "name": "Drone Gamma 03" }))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{drone}");
    assert_eq!(drone["status"], "IDLE");
    assert_eq!(drone["battery"], 100);

    let (status, body) = gw
        .post("/api/delivery/drones", json!({ "name": "Drone Gamma 03" }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["message"].is_string());

    let (_, idle) = gw.get("/api/delivery/drones").await;
    assert_eq!(idle.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn lines_naming_foreign_products_are_dropped() {
    let gw = start("5").await;
    let product = gw.product("Banh xeo", 40_000).await;
    let numeric: u64 = product.trim_start_matches("product_").parse().unwrap();

    let (status, order) = gw
        .post(
            "/api/orders",
            json!({
                "branchId": "branch_q1",
                "orderItems": [
                    { "productId": product, "quantity": 1 },
                    { "productId": "64f1a2b3c4d5e6f7a8b9c0d1", "quantity": 2 },
                    { "product": numeric, "qty": 1 }
                ]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{order}");
    assert_eq!(order["orderItems"].as_array().unwrap().len(), 2);
    assert_eq!(order["orderItems"][1]["product"], product.as_str());
    assert_eq!(order["unresolvedItems"], json!(["64f1a2b3c4d5e6f7a8b9c0d1"]));
    assert_eq!(order["itemsPrice"], 80_000);
}

#[tokio::test]
async fn overflowing_totals_are_refused_and_orders_keep_working() {
    let gw = start("5").await;
    let costly = gw.product("Tom hum", u64::MAX / 2 + 1).await;

    let (status, body) = gw
        .post(
            "/api/orders",
            json!({ "branchId": "branch_q1", "orderItems": [{ "productId": costly, "quantity": 2 }] }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("exceeds"));

    let (status, body) = gw
        .post(
            "/api/orders",
            json!({ "branchId": "branch_q1", "orderItems": [{ "productId": costly, "quantity": 1 }] }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");

    let (status, _) = gw
        .post(
            "/api/orders",
            json!({ "branchId": "branch_q1", "orderItems": [{ "productId": costly, "quantity": 5_000_000_000u64 }] }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let cheap = gw.product("Tra da", 5_000).await;
    gw.order("user_hoa", "branch_q1", &cheap, 3).await;
}

#[tokio::test]
async fn malformed_bodies_get_a_json_message() {
    let gw = start("5").await;

    let (status, body) = gw
        .post("/api/orders", json!({ "branchId": 7, "orderItems": [] }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());

    let response = gw
        .http
        .post(gw.url("/api/delivery/start-delivery"))
        .header("content-type", "application/json")
        .body("{ not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert!(body["message"].is_string());

    let product = gw.product("Che ba mau", 25_000).await;
    let (status, body) = gw
        .put(&format!("/api/products/{product}/price"), json!({ "price": "cheap" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn socket_emit_reaches_room_members_only() {
    let gw = start("5").await;
    let mut tracker = gw.system.relay.connect().await.unwrap();
    tracker.join("order_12").await.unwrap();

    let (status, body) = gw
        .post(
            "/socket/emit",
            json!({ "event": "status_update", "room": "order_12", "data": { "status": "PREPARING" } }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true, "recipients": 1 }));

    let envelope = timeout(Duration::from_secs(1), tracker.recv()).await.unwrap().unwrap();
    assert_eq!(envelope.event, "status_update");
    assert_eq!(envelope.data["status"], "PREPARING");

    let (_, body) = gw
        .post("/socket/emit", json!({ "event": "status_update", "room": "order_99" }))
        .await;
    assert_eq!(body["recipients"], 0);
}

#[tokio::test]
async fn remote_adapters_speak_the_gateway_contract() {
    let gw = start("5").await;
    let http = http_client(Duration::from_secs(2)).unwrap();
    let product = gw.product("Ca phe sua da", 29_000).await;

    let catalog = HttpProductCatalog::new(http.clone(), &gw.url("/api/products/"));
    let snapshot = catalog.lookup(&ProductRef::new(product.clone())).await.unwrap().unwrap();
    assert_eq!(snapshot.name, "Ca phe sua da");
    assert_eq!(snapshot.price, 29_000);
    assert!(catalog.lookup(&ProductId(404).into()).await.unwrap().is_none());

    let order = gw.order("user_giang", "branch_q1", &product, 1).await;
    let order_id: OrderId = order["_id"].as_str().unwrap().parse().unwrap();
    let callback = HttpOrderStatus::new(http.clone(), &gw.url("/api/orders"));
    callback.write_status(order_id, OrderStatus::PaidWaitingProcess).await.unwrap();
    callback.attach_drone(order_id, "Drone Beta 02".into()).await.unwrap();
    let (_, reread) = gw.get(&format!("/api/orders/{order_id}")).await;
    assert_eq!(reread["status"], "PAID_WAITING_PROCESS");
    assert_eq!(reread["droneId"], "Drone Beta 02");

    let progress = callback.progress(order_id).await.unwrap().unwrap();
    assert_eq!(progress.status, OrderStatus::PaidWaitingProcess);
    assert_eq!(progress.drone_id.as_deref(), Some("Drone Beta 02"));
    assert_eq!(callback.progress(OrderId(404)).await.unwrap(), None);

    let missing = callback.write_status(OrderId(404), OrderStatus::Preparing).await;
    assert_eq!(missing, Err(OrderError::NotFound("order_404".into())));

    let notifier = HttpNotifier::new(http, &gw.base);
    let receipt = notifier
        .emit(Event::broadcast("admin_data_update", Value::Null))
        .await
        .unwrap();
    assert_eq!(receipt.recipients, Some(0));
}
