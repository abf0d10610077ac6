//! Macro-generated conformance suite for `LodgingStore` implementations.
//!
//! # Usage
//!
//! ```rust,ignore
//! #[macro_use]
//! mod lodging_harness;
//!
//! use lodging_harness::*;
//! use haven::storage::InMemoryLodgingStore;
//!
//! lodging_store_tests!(InMemoryLodgingStore::new());
//! ```
//!
//! # Generated Tests
//!
//! ## Records
//! - `test_insert_and_find_by_id`
//! - `test_find_by_id_unknown`
//! - `test_list_recent_orders_by_last_updated`
//!
//! ## Search
//! - `test_find_matches_planner_predicate`: seeded random records and criteria,
//!   every returned record passes the filter and none is missing
//! - `test_sort_monotonic`
//! - `test_pagination_windows`
//! - `test_tied_sort_keys_page_without_gaps`: every record sharing a star
//!   rating or price appears on exactly one page
//! - `test_natural_order_is_insertion_order`
//! - `test_destination_is_literal_and_case_insensitive`
//!
//! ## Reservations
//! - `test_append_reservation`
//! - `test_append_reservation_unknown_id`
//! - `test_find_by_guest`
//! - `test_concurrent_appends_all_persist`

/// Generate a `LodgingStore` conformance test suite.
///
/// `$factory` is re-evaluated for each test and must produce a fresh, empty
/// store implementing `LodgingStore + 'static`.
#[macro_export]
macro_rules! lodging_store_tests {
    ($factory:expr) => {
        mod lodging_store_contract_tests {
            use super::*;
            use haven::core::query::{SearchCriteria, SortOption, SortSpec, plan, PAGE_SIZE};
            use haven::core::store::LodgingStore;
            use rand::SeedableRng;
            use rand::rngs::StdRng;
            use std::sync::Arc;
            use haven::core::lodging::LodgingRecord;
            use uuid::Uuid;

            async fn sorted<S: LodgingStore>(store: &S, option: SortOption) -> Vec<LodgingRecord> {
                let plan = plan(&SearchCriteria {
                    sort_option: Some(option),
                    ..Default::default()
                })
                .unwrap();
                store.find(&plan.filter, plan.sort, 0, 100).await.unwrap()
            }

            // ==============================================================
            // Records
            // ==============================================================

            #[tokio::test]
            async fn test_insert_and_find_by_id() {
                let store = $factory;
                let record = lodging("Harbour View");

                store.insert(record.clone()).await.unwrap();

                let found = store.find_by_id(&record.id).await.unwrap().unwrap();
                assert_eq!(found.id, record.id);
                assert_eq!(found.name, "Harbour View");
                assert_eq!(found.facilities, record.facilities);
                assert_eq!(found.price_per_night, 100.0);
                assert!(found.bookings.is_empty());
            }

            #[tokio::test]
            async fn test_find_by_id_unknown() {
                let store = $factory;
                assert!(store.find_by_id(&Uuid::new_v4()).await.unwrap().is_none());
            }

            #[tokio::test]
            async fn test_list_recent_orders_by_last_updated() {
                let store = $factory;
                let mut older = lodging("Older");
                older.last_updated = chrono::Utc::now() - chrono::Duration::minutes(5);
                let newer = lodging("Newer");
                seed(&store, &[older.clone(), newer.clone()]).await;

                let recent = store.list_recent().await.unwrap();
                assert_eq!(recent[0].id, newer.id);

                // A booking bumps lastUpdated
                store
                    .append_reservation(&older.id, reservation("guest-1", 100.0))
                    .await
                    .unwrap();
                let recent = store.list_recent().await.unwrap();
                assert_eq!(recent[0].id, older.id);
            }

            // ==============================================================
            // Search
            // ==============================================================

            #[tokio::test]
            async fn test_find_matches_planner_predicate() {
                let store = $factory;
                let mut rng = StdRng::seed_from_u64(0x5eed);
                let records: Vec<_> = (0..40).map(|i| random_lodging(&mut rng, i)).collect();
                seed(&store, &records).await;

                for _ in 0..60 {
                    let criteria = random_criteria(&mut rng);
                    let plan = plan(&criteria).unwrap();
                    let expected = expected_ids(&records, &criteria);

                    let found = store
                        .find(&plan.filter, plan.sort, 0, records.len())
                        .await
                        .unwrap();
                    let mut ids: Vec<Uuid> = found.iter().map(|r| r.id).collect();
                    ids.sort();

                    assert_eq!(ids, expected, "criteria: {:?}", criteria);
                    assert_eq!(store.count(&plan.filter).await.unwrap(), expected.len());
                }
            }

            #[tokio::test]
            async fn test_sort_monotonic() {
                let store = $factory;
                let mut rng = StdRng::seed_from_u64(7);
                let records: Vec<_> = (0..25).map(|i| random_lodging(&mut rng, i)).collect();
                seed(&store, &records).await;

                let by_stars = sorted(&store, SortOption::StarRating).await;
                assert!(by_stars.windows(2).all(|w| w[0].star_rating >= w[1].star_rating));

                let asc = sorted(&store, SortOption::PricePerNightAsc).await;
                assert!(asc.windows(2).all(|w| w[0].price_per_night <= w[1].price_per_night));

                let desc = sorted(&store, SortOption::PricePerNightDesc).await;
                assert!(desc.windows(2).all(|w| w[0].price_per_night >= w[1].price_per_night));
                assert_eq!(desc.len(), 25);
            }

            #[tokio::test]
            async fn test_pagination_windows() {
                let store = $factory;
                let records: Vec<_> = (0..12)
                    .map(|i| priced(&format!("P{}", i), 10.0 * (i + 1) as f64, 3))
                    .collect();
                seed(&store, &records).await;

                let filter = plan(&SearchCriteria::default()).unwrap().filter;
                let mut seen = Vec::new();
                for page in 1..=3 {
                    let skip = (page - 1) * PAGE_SIZE;
                    let window = store
                        .find(&filter, SortSpec::PriceAsc, skip, PAGE_SIZE)
                        .await
                        .unwrap();
                    assert_eq!(window.len(), if page < 3 { 5 } else { 2 });
                    seen.extend(window.into_iter().map(|r| r.price_per_night));
                }

                let all: Vec<f64> = (1..=12).map(|i| 10.0 * i as f64).collect();
                assert_eq!(seen, all);

                let beyond = store
                    .find(&filter, SortSpec::PriceAsc, 3 * PAGE_SIZE, PAGE_SIZE)
                    .await
                    .unwrap();
                assert!(beyond.is_empty());
            }

            #[tokio::test]
            async fn test_tied_sort_keys_page_without_gaps() {
                let store = $factory;
                let records: Vec<_> = (0..12).map(|i| lodging(&format!("T{}", i))).collect();
                seed(&store, &records).await;

                let mut seeded: Vec<Uuid> = records.iter().map(|r| r.id).collect();
                seeded.sort();

                let filter = plan(&SearchCriteria::default()).unwrap().filter;
                for sort in [SortSpec::StarRatingDesc, SortSpec::PriceAsc, SortSpec::PriceDesc] {
                    let mut seen = Vec::new();
                    for skip in [0, PAGE_SIZE, 2 * PAGE_SIZE] {
                        let window = store.find(&filter, sort, skip, PAGE_SIZE).await.unwrap();
                        seen.extend(window.into_iter().map(|r| r.id));
                    }

                    assert_eq!(seen.len(), records.len(), "{:?}", sort);
                    seen.sort();
                    assert_eq!(seen, seeded, "{:?}", sort);
                }
            }

            #[tokio::test]
            async fn test_natural_order_is_insertion_order() {
                let store = $factory;
                let records: Vec<_> = [300.0, 100.0, 200.0]
                    .iter()
                    .enumerate()
                    .map(|(i, p)| priced(&format!("N{}", i), *p, 3))
                    .collect();
                seed(&store, &records).await;

                let filter = plan(&SearchCriteria::default()).unwrap().filter;
                let found = store.find(&filter, SortSpec::Natural, 0, 10).await.unwrap();
                let names: Vec<&str> = found.iter().map(|r| r.name.as_str()).collect();
                assert_eq!(names, vec!["N0", "N1", "N2"]);
            }

            #[tokio::test]
            async fn test_destination_is_literal_and_case_insensitive() {
                let store = $factory;
                let mut st_ives = lodging("Cliffside");
                st_ives.city = "St. Ives".to_string();
                let mut stives = lodging("Lookalike");
                stives.city = "Stxives".to_string();
                seed(&store, &[st_ives.clone(), stives]).await;

                let filter = plan(&SearchCriteria {
                    destination: Some("ST. IVES".to_string()),
                    ..Default::default()
                })
                .unwrap()
                .filter;

                let found = store.find(&filter, SortSpec::Natural, 0, 10).await.unwrap();
                assert_eq!(found.len(), 1);
                assert_eq!(found[0].id, st_ives.id);

                let by_country = plan(&SearchCriteria {
                    destination: Some("kingdom".to_string()),
                    ..Default::default()
                })
                .unwrap()
                .filter;
                assert_eq!(store.count(&by_country).await.unwrap(), 2);
            }

            // ==============================================================
            // Reservations
            // ==============================================================

            #[tokio::test]
            async fn test_append_reservation() {
                let store = $factory;
                let record = lodging("Harbour View");
                seed(&store, &[record.clone()]).await;

                let booking = reservation("guest-1", 300.0);
                let updated = store
                    .append_reservation(&record.id, booking.clone())
                    .await
                    .unwrap()
                    .unwrap();

                assert_eq!(updated.bookings.len(), 1);
                assert_eq!(updated.bookings[0].id, booking.id);
                assert_eq!(updated.bookings[0].total_cost, 300.0);
                assert!(updated.last_updated >= record.last_updated);

                let stored = store.find_by_id(&record.id).await.unwrap().unwrap();
                assert_eq!(stored.bookings.len(), 1);
            }

            #[tokio::test]
            async fn test_append_reservation_unknown_id() {
                let store = $factory;
                let result = store
                    .append_reservation(&Uuid::new_v4(), reservation("guest-1", 1.0))
                    .await
                    .unwrap();
                assert!(result.is_none());
            }

            #[tokio::test]
            async fn test_find_by_guest() {
                let store = $factory;
                let booked = lodging("Booked");
                let other = lodging("Other");
                seed(&store, &[booked.clone(), other.clone()]).await;

                store
                    .append_reservation(&booked.id, reservation("guest-1", 100.0))
                    .await
                    .unwrap();
                store
                    .append_reservation(&other.id, reservation("guest-2", 100.0))
                    .await
                    .unwrap();

                let mine = store.find_by_guest("guest-1").await.unwrap();
                assert_eq!(mine.len(), 1);
                assert_eq!(mine[0].id, booked.id);
                assert!(store.find_by_guest("nobody").await.unwrap().is_empty());
            }

            #[tokio::test]
            async fn test_concurrent_appends_all_persist() {
                let store = Arc::new($factory);
                let record = lodging("Busy");
                seed(store.as_ref(), &[record.clone()]).await;

                let mut handles = Vec::new();
                for i in 0..10 {
                    let store = store.clone();
                    let id = record.id;
                    handles.push(tokio::spawn(async move {
                        store
                            .append_reservation(&id, reservation(&format!("guest-{}", i), 50.0))
                            .await
                    }));
                }
                for handle in handles {
                    assert!(handle.await.unwrap().unwrap().is_some());
                }

                let stored = store.find_by_id(&record.id).await.unwrap().unwrap();
                assert_eq!(stored.bookings.len(), 10);
            }
        }
    };
}
