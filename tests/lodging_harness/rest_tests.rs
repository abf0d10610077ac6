//! REST integration test macro for lodging stores.
//!
//! The `rest_booking_tests!` macro drives the full HTTP surface against any
//! store: JSON request → handler → catalog / booking engine → store →
//! JSON response. Payments go through the in-memory gateway, whose
//! `set_status` stands in for the guest completing payment.
//!
//! # Generated Tests
//!
//! - `test_rest_health`
//! - `test_rest_search_filters_and_paginates`
//! - `test_rest_search_rejects_malformed_numbers`
//! - `test_rest_get_hotel`
//! - `test_rest_list_hotels_most_recent_first`
//! - `test_rest_booking_flow`
//! - `test_rest_booking_requires_identity`
//! - `test_rest_payment_intent_rejects_bad_nights`
//! - `test_rest_commit_mismatch_appends_nothing`
//! - `test_rest_commit_unfinished_payment`
//! - `test_rest_commit_unknown_intent`
//! - `test_rest_my_hotels`
#[macro_export]
macro_rules! rest_booking_tests {
    ($factory:expr) => {
        mod rest_booking_tests {
            use super::*;
            use axum::http::StatusCode;
            use axum_test::TestServer;
            use haven::core::payment::AuthorizationStatus;
            use haven::core::store::LodgingStore;
            use haven::gateway::InMemoryGateway;
            use serde_json::{Value, json};
            use std::sync::Arc;
            use uuid::Uuid;

            async fn make_server() -> (TestServer, InMemoryGateway, Arc<dyn LodgingStore>) {
                let store: Arc<dyn LodgingStore> = Arc::new($factory);
                let (server, gateway) = test_server(store.clone());
                (server, gateway, store)
            }

            async fn booked_count(store: &Arc<dyn LodgingStore>, id: &Uuid) -> usize {
                store.find_by_id(id).await.unwrap().unwrap().bookings.len()
            }

            fn commit_body(intent_id: &str, total_cost: f64) -> Value {
                json!({
                    "paymentIntentId": intent_id,
                    "firstName": "Ada",
                    "lastName": "Lovelace",
                    "email": "ada@example.com",
                    "adultCount": 2,
                    "childCount": 0,
                    "checkIn": "2030-06-01T00:00:00.000Z",
                    "checkOut": "2030-06-04T00:00:00.000Z",
                    "totalCost": total_cost
                })
            }

            async fn open_intent(server: &TestServer, hotel_id: Uuid, user: &str, nights: Value) -> Value {
                let (name, value) = as_user(user);
                let response = server
                    .post(&format!("/api/hotels/{}/bookings/payment-intent", hotel_id))
                    .add_header(name, value)
                    .json(&json!({ "numberOfNights": nights }))
                    .await;
                response.assert_status(StatusCode::OK);
                response.json()
            }

            // ==============================================================
            // Catalog
            // ==============================================================

            #[tokio::test]
            async fn test_rest_health() {
                let (server, _, _) = make_server().await;

                for path in ["/health", "/healthz", "/api/health"] {
                    let response = server.get(path).await;
                    response.assert_status_ok();
                    let body: Value = response.json();
                    assert_eq!(body["status"], "ok");
                    assert_eq!(body["gateway"], "in_memory");
                }
            }

            #[tokio::test]
            async fn test_rest_search_filters_and_paginates() {
                let (server, _, store) = make_server().await;
                let mut records: Vec<_> = (0..7)
                    .map(|i| priced(&format!("S{}", i), 50.0 + 10.0 * i as f64, 1 + (i % 5) as u8))
                    .collect();
                records[0].facilities.push("Spa".to_string());
                records[3].facilities.push("Spa".to_string());
                records[6].city = "Lisbon".to_string();
                records[6].country = "Portugal".to_string();
                seed(store.as_ref(), &records).await;

                let response = server
                    .get("/api/hotels/search?destination=LONDON&sortOption=pricePerNightDesc&page=2")
                    .await;
                response.assert_status_ok();
                let body: Value = response.json();
                assert_eq!(body["pagination"], json!({ "total": 6, "page": 2, "pages": 2 }));
                let names: Vec<&str> = body["data"]
                    .as_array()
                    .unwrap()
                    .iter()
                    .map(|h| h["name"].as_str().unwrap())
                    .collect();
                assert_eq!(names, vec!["S0"]);

                let response = server
                    .get("/api/hotels/search?facilities%5B%5D=Spa&facilities%5B%5D=Free%20WiFi&maxPrice=100")
                    .await;
                let body: Value = response.json();
                assert_eq!(body["pagination"]["total"], 2);

                let response = server
                    .get("/api/hotels/search?stars=1&stars=2&page=9")
                    .await;
                let body: Value = response.json();
                assert_eq!(body["pagination"]["total"], 4);
                assert_eq!(body["pagination"]["page"], 9);
                assert!(body["data"].as_array().unwrap().is_empty());
            }

            #[tokio::test]
            async fn test_rest_search_rejects_malformed_numbers() {
                let (server, _, _) = make_server().await;

                for query in ["adultCount=two", "maxPrice=", "page=-1", "stars=9x"] {
                    let response = server.get(&format!("/api/hotels/search?{}", query)).await;
                    response.assert_status(StatusCode::BAD_REQUEST);
                    let body: Value = response.json();
                    assert_eq!(body["code"], "VALIDATION_ERROR", "query: {}", query);
                }
            }

            #[tokio::test]
            async fn test_rest_get_hotel() {
                let (server, _, store) = make_server().await;
                let record = lodging("Harbour View");
                seed(store.as_ref(), &[record.clone()]).await;

                let response = server.get(&format!("/api/hotels/{}", record.id)).await;
                response.assert_status_ok();
                let body: Value = response.json();
                assert_eq!(body["_id"], record.id.to_string());
                assert_eq!(body["pricePerNight"], 100.0);
                assert_eq!(body["type"], "Hotel");

                let response = server.get(&format!("/api/hotels/{}", Uuid::new_v4())).await;
                response.assert_status(StatusCode::NOT_FOUND);
                let body: Value = response.json();
                assert_eq!(body["code"], "HOTEL_NOT_FOUND");

                let response = server.get("/api/hotels/not-a-uuid").await;
                response.assert_status(StatusCode::BAD_REQUEST);
            }

            #[tokio::test]
            async fn test_rest_list_hotels_most_recent_first() {
                let (server, _, store) = make_server().await;
                let mut older = lodging("Older");
                older.last_updated = chrono::Utc::now() - chrono::Duration::hours(1);
                let newer = lodging("Newer");
                seed(store.as_ref(), &[older, newer]).await;

                let body: Vec<Value> = server.get("/api/hotels").await.json();
                assert_eq!(body.len(), 2);
                assert_eq!(body[0]["name"], "Newer");
            }

            // ==============================================================
            // Booking
            // ==============================================================

            #[tokio::test]
            async fn test_rest_booking_flow() {
                let (server, gateway, store) = make_server().await;
                let record = lodging("Harbour View");
                seed(store.as_ref(), &[record.clone()]).await;

                let intent = open_intent(&server, record.id, "guest-1", json!("3")).await;
                assert_eq!(intent["totalCost"], 300.0);
                assert!(intent["clientSecret"].as_str().unwrap().contains("_secret_"));

                let intent_id = intent["paymentIntentId"].as_str().unwrap();
                gateway
                    .set_status(intent_id, AuthorizationStatus::Succeeded)
                    .unwrap();

                let (name, value) = as_user("guest-1");
                let response = server
                    .post(&format!("/api/hotels/{}/bookings", record.id))
                    .add_header(name, value)
                    .json(&commit_body(intent_id, 300.0))
                    .await;
                response.assert_status_ok();
                let receipt: Value = response.json();
                assert_eq!(receipt["message"], "Booking saved successfully");

                let stored = store.find_by_id(&record.id).await.unwrap().unwrap();
                assert_eq!(stored.bookings.len(), 1);
                assert_eq!(stored.bookings[0].id.to_string(), receipt["bookingId"]);
                assert_eq!(stored.bookings[0].total_cost, 300.0);

                let (name, value) = as_user("guest-1");
                let mine: Vec<Value> = server
                    .get("/api/my-bookings")
                    .add_header(name, value)
                    .await
                    .json();
                assert_eq!(mine.len(), 1);
                assert_eq!(mine[0]["bookings"].as_array().unwrap().len(), 1);
            }

            #[tokio::test]
            async fn test_rest_booking_requires_identity() {
                let (server, gateway, store) = make_server().await;
                let record = lodging("Harbour View");
                seed(store.as_ref(), &[record.clone()]).await;

                let response = server
                    .post(&format!("/api/hotels/{}/bookings/payment-intent", record.id))
                    .json(&json!({ "numberOfNights": 2 }))
                    .await;
                response.assert_status(StatusCode::UNAUTHORIZED);

                let response = server
                    .post(&format!("/api/hotels/{}/bookings", record.id))
                    .json(&commit_body("pi_x", 1.0))
                    .await;
                response.assert_status(StatusCode::UNAUTHORIZED);

                server
                    .get("/api/my-bookings")
                    .await
                    .assert_status(StatusCode::UNAUTHORIZED);
                assert!(gateway.is_empty());
            }

            #[tokio::test]
            async fn test_rest_payment_intent_rejects_bad_nights() {
                let (server, gateway, store) = make_server().await;
                let record = lodging("Harbour View");
                seed(store.as_ref(), &[record.clone()]).await;

                for nights in [json!(0), json!(-1), json!("abc"), json!(null)] {
                    let (name, value) = as_user("guest-1");
                    let response = server
                        .post(&format!("/api/hotels/{}/bookings/payment-intent", record.id))
                        .add_header(name, value)
                        .json(&json!({ "numberOfNights": nights }))
                        .await;
                    response.assert_status(StatusCode::BAD_REQUEST);
                }

                let (name, value) = as_user("guest-1");
                let response = server
                    .post(&format!("/api/hotels/{}/bookings/payment-intent", Uuid::new_v4()))
                    .add_header(name, value)
                    .json(&json!({ "numberOfNights": 2 }))
                    .await;
                response.assert_status(StatusCode::NOT_FOUND);

                assert!(gateway.is_empty());
            }

            #[tokio::test]
            async fn test_rest_commit_mismatch_appends_nothing() {
                let (server, gateway, store) = make_server().await;
                let record = lodging("Harbour View");
                let other = lodging("Elsewhere");
                seed(store.as_ref(), &[record.clone(), other.clone()]).await;

                let intent = open_intent(&server, record.id, "guest-1", json!(1)).await;
                let intent_id = intent["paymentIntentId"].as_str().unwrap();
                gateway
                    .set_status(intent_id, AuthorizationStatus::Succeeded)
                    .unwrap();

                // Someone else's identity
                let (name, value) = as_user("guest-2");
                let response = server
                    .post(&format!("/api/hotels/{}/bookings", record.id))
                    .add_header(name, value)
                    .json(&commit_body(intent_id, 100.0))
                    .await;
                response.assert_status(StatusCode::BAD_REQUEST);
                let body: Value = response.json();
                assert_eq!(body["message"], "Payment intent mismatch");

                // Right identity, wrong lodging
                let (name, value) = as_user("guest-1");
                let response = server
                    .post(&format!("/api/hotels/{}/bookings", other.id))
                    .add_header(name, value)
                    .json(&commit_body(intent_id, 100.0))
                    .await;
                response.assert_status(StatusCode::BAD_REQUEST);

                assert_eq!(booked_count(&store, &record.id).await, 0);
                assert_eq!(booked_count(&store, &other.id).await, 0);
            }

            #[tokio::test]
            async fn test_rest_commit_unfinished_payment() {
                let (server, _, store) = make_server().await;
                let record = lodging("Harbour View");
                seed(store.as_ref(), &[record.clone()]).await;

                let intent = open_intent(&server, record.id, "guest-1", json!(2)).await;

                let (name, value) = as_user("guest-1");
                let response = server
                    .post(&format!("/api/hotels/{}/bookings", record.id))
                    .add_header(name, value)
                    .json(&commit_body(intent["paymentIntentId"].as_str().unwrap(), 200.0))
                    .await;

                response.assert_status(StatusCode::BAD_REQUEST);
                let body: Value = response.json();
                assert_eq!(
                    body["message"],
                    "Payment not succeeded. Status: requires_payment_method"
                );
                assert_eq!(booked_count(&store, &record.id).await, 0);
            }

            #[tokio::test]
            async fn test_rest_commit_unknown_intent() {
                let (server, _, store) = make_server().await;
                let record = lodging("Harbour View");
                seed(store.as_ref(), &[record.clone()]).await;

                let (name, value) = as_user("guest-1");
                let response = server
                    .post(&format!("/api/hotels/{}/bookings", record.id))
                    .add_header(name, value)
                    .json(&commit_body("pi_does_not_exist", 100.0))
                    .await;

                response.assert_status(StatusCode::NOT_FOUND);
                assert_eq!(booked_count(&store, &record.id).await, 0);
            }

            // ==============================================================
            // Host listings
            // ==============================================================

            #[tokio::test]
            async fn test_rest_my_hotels() {
                let (server, _, store) = make_server().await;

                let listing = json!({
                    "name": "New Place",
                    "city": "Porto",
                    "country": "Portugal",
                    "description": "By the river",
                    "type": "Boutique",
                    "adultCount": 2,
                    "childCount": 1,
                    "facilities": ["Free WiFi"],
                    "pricePerNight": 85.5,
                    "starRating": 4
                });

                let (name, value) = as_user("host-9");
                let response = server
                    .post("/api/my-hotels")
                    .add_header(name, value)
                    .json(&listing)
                    .await;
                response.assert_status(StatusCode::CREATED);
                let body: Value = response.json();
                assert_eq!(body["userId"], "host-9");

                let id: Uuid = body["_id"].as_str().unwrap().parse().unwrap();
                assert!(store.find_by_id(&id).await.unwrap().is_some());

                let mut invalid = listing.clone();
                invalid["starRating"] = json!(0);
                let (name, value) = as_user("host-9");
                let response = server
                    .post("/api/my-hotels")
                    .add_header(name, value)
                    .json(&invalid)
                    .await;
                response.assert_status(StatusCode::BAD_REQUEST);
                let body: Value = response.json();
                assert_eq!(body["code"], "VALIDATION_ERROR");
            }
        }
    };
}
