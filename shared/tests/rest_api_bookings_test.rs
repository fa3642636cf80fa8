// ============================================================================
// Booking REST API Tests
// ============================================================================
//
// - POST /api/v1/bookings
// - PUT  /api/v1/bookings/:id/cancel
// - GET  /api/v1/bookings/mine, /api/v1/bookings/host
// - GET  /api/v1/listings/:id/taken-dates
//
// ============================================================================

use chrono::NaiveDate;
use serde_json::{Value, json};
use serial_test::serial;
use uuid::Uuid;

use test_utils::{TestApp, spawn_app};

fn booking(listing: Uuid, check_in: &str, check_out: &str) -> Value {
    json!({
        "listingId": listing,
        "checkIn": check_in,
        "checkOut": check_out,
        "totalPrice": 480.0
    })
}

async fn create(app: &TestApp, guest: Uuid, body: Value) -> reqwest::Response {
    app.post(guest, "/api/v1/bookings", &body).await
}

#[tokio::test]
#[serial]
async fn test_back_to_back_scenario() {
    let app = spawn_app().await;
    let host = app.seed_user("Hana").await;
    let listing = app.seed_listing(host, "Dune house").await;
    let first_guest = app.seed_user("Ana").await;
    let second_guest = app.seed_user("Ben").await;

    let response = create(&app, first_guest, booking(listing, "2024-06-01", "2024-06-05")).await;
    assert_eq!(response.status(), 201);
    let first: Value = response.json().await.unwrap();
    assert_eq!(first["status"], "confirmed");
    assert_eq!(first["userId"], first_guest.to_string());

    let overlapping = create(&app, second_guest, booking(listing, "2024-06-04", "2024-06-08")).await;
    assert_eq!(overlapping.status(), 409);
    let body: Value = overlapping.json().await.unwrap();
    assert_eq!(body["error"], "Selected dates are not available");

    let adjacent = create(&app, second_guest, booking(listing, "2024-06-05", "2024-06-08")).await;
    assert_eq!(adjacent.status(), 201);

    let taken: Vec<Value> = reqwest::get(app.url(&format!("/api/v1/listings/{}/taken-dates", listing)))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(taken.len(), 2);
    assert_eq!(taken[0]["checkIn"], "2024-06-01");
    assert_eq!(taken[1]["checkOut"], "2024-06-08");
}

#[tokio::test]
#[serial]
async fn test_concurrent_requests_for_the_same_nights() {
    let app = spawn_app().await;
    let host = app.seed_user("Hana").await;
    let listing = app.seed_listing(host, "Dune house").await;

    let mut handles = Vec::new();
    for i in 0..16u32 {
        let url = app.url("/api/v1/bookings");
        let day = 1 + (i % 4);
        let body = booking(
            listing,
            &format!("2024-09-{:02}", day),
            &format!("2024-09-{:02}", day + 3),
        );
        handles.push(tokio::spawn(async move {
            reqwest::Client::new()
                .post(url)
                .header("X-User-Id", Uuid::new_v4().to_string())
                .json(&body)
                .send()
                .await
                .unwrap()
                .status()
                .as_u16()
        }));
    }

    let mut created = 0;
    for handle in handles {
        match handle.await.unwrap() {
            201 => created += 1,
            409 => {}
            other => panic!("unexpected status {}", other),
        }
    }
    assert!(created >= 1);

    let taken: Vec<Value> = reqwest::get(app.url(&format!("/api/v1/listings/{}/taken-dates", listing)))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(taken.len(), created);

    let ranges: Vec<(NaiveDate, NaiveDate)> = taken
        .iter()
        .map(|r| {
            (
                r["checkIn"].as_str().unwrap().parse().unwrap(),
                r["checkOut"].as_str().unwrap().parse().unwrap(),
            )
        })
        .collect();
    for (i, (a, b)) in ranges.iter().enumerate() {
        for (c, d) in ranges.iter().skip(i + 1) {
            assert!(!(a < d && c < b), "[{}, {}) overlaps [{}, {})", a, b, c, d);
        }
    }
}

#[tokio::test]
#[serial]
async fn test_cancellation_authorization_scenario() {
    let app = spawn_app().await;
    let host = app.seed_user("Hana").await;
    let guest = app.seed_user("Gil").await;
    let stranger = app.seed_user("Sam").await;
    let listing = app.seed_listing(host, "Dune house").await;

    let created: Value = create(&app, guest, booking(listing, "2024-06-01", "2024-06-05"))
        .await
        .json()
        .await
        .unwrap();
    let cancel_path = format!("/api/v1/bookings/{}/cancel", created["id"].as_str().unwrap());

    assert_eq!(app.put(stranger, &cancel_path).await.status(), 403);

    let response = app.put(guest, &cancel_path).await;
    assert_eq!(response.status(), 200);
    let cancelled: Value = response.json().await.unwrap();
    assert_eq!(cancelled["status"], "cancelled");

    let feed: Vec<Value> = app
        .get(host, "/api/v1/notifications")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(feed[0]["title"], "Booking cancelled");
    assert_eq!(feed[0]["type"], "booking");

    // Cancelled nights are free again
    let again = create(&app, stranger, booking(listing, "2024-06-02", "2024-06-04")).await;
    assert_eq!(again.status(), 201);

    let missing = app
        .put(guest, &format!("/api/v1/bookings/{}/cancel", Uuid::new_v4()))
        .await;
    assert_eq!(missing.status(), 404);
}

#[tokio::test]
#[serial]
async fn test_create_validation() {
    let app = spawn_app().await;
    let host = app.seed_user("Hana").await;
    let guest = app.seed_user("Gil").await;
    let listing = app.seed_listing(host, "Dune house").await;

    let inverted = create(&app, guest, booking(listing, "2024-06-05", "2024-06-01")).await;
    assert_eq!(inverted.status(), 400);

    let own = create(&app, host, booking(listing, "2024-06-01", "2024-06-05")).await;
    assert_eq!(own.status(), 400);

    let missing = create(&app, guest, booking(Uuid::new_v4(), "2024-06-01", "2024-06-05")).await;
    assert_eq!(missing.status(), 404);

    let mut negative = booking(listing, "2024-06-01", "2024-06-05");
    negative["totalPrice"] = json!(-5.0);
    assert_eq!(create(&app, guest, negative).await.status(), 400);
}

#[tokio::test]
#[serial]
async fn test_guest_and_host_listings() {
    let app = spawn_app().await;
    let host = app.seed_user("Hana").await;
    let guest = app.seed_user("Gil").await;
    let cabin = app.seed_listing(host, "Cabin").await;
    let loft = app.seed_listing(host, "Loft").await;

    create(&app, guest, booking(cabin, "2024-06-01", "2024-06-05")).await;
    create(&app, guest, booking(loft, "2024-07-01", "2024-07-05")).await;
    create(&app, Uuid::new_v4(), booking(loft, "2024-08-01", "2024-08-03")).await;

    let mine: Vec<Value> = app
        .get(guest, "/api/v1/bookings/mine")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(mine.len(), 2);
    assert_eq!(mine[0]["listingId"], loft.to_string());

    let hosted: Vec<Value> = app
        .get(host, "/api/v1/bookings/host")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(hosted.len(), 3);

    let guest_as_host: Vec<Value> = app
        .get(guest, "/api/v1/bookings/host")
        .await
        .json()
        .await
        .unwrap();
    assert!(guest_as_host.is_empty());
}
