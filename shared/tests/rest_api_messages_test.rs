// ============================================================================
// Messaging REST API Tests
// ============================================================================
//
// - GET  /api/v1/inbox
// - POST /api/v1/messages
// - GET  /api/v1/messages/:listing_id/:guest_id
// - PUT  /api/v1/messages/:listing_id/:guest_id/read
//
// ============================================================================

use serde_json::{Value, json};
use serial_test::serial;
use uuid::Uuid;

use test_utils::{TestApp, spawn_app};

async fn send(app: &TestApp, sender: Uuid, listing: Uuid, guest: Uuid, content: &str) -> Value {
    let response = app
        .post(
            sender,
            "/api/v1/messages",
            &json!({ "listingId": listing, "guestId": guest, "content": content }),
        )
        .await;
    assert_eq!(response.status(), 201);
    response.json().await.unwrap()
}

async fn inbox(app: &TestApp, user: Uuid) -> Vec<Value> {
    let response = app.get(user, "/api/v1/inbox").await;
    assert_eq!(response.status(), 200);
    response.json().await.unwrap()
}

#[tokio::test]
#[serial]
async fn test_hi_hello_inbox_scenario() {
    let app = spawn_app().await;
    let host = app.seed_user("Hana").await;
    let guest = app.seed_user("Gil").await;
    let listing = app.seed_listing(host, "Cliff cottage").await;

    send(&app, guest, listing, guest, "Hi").await;
    send(&app, host, listing, guest, "Hello").await;

    let host_view = inbox(&app, host).await;
    assert_eq!(host_view.len(), 1);
    assert_eq!(host_view[0]["lastMessage"]["content"], "Hello");
    assert_eq!(host_view[0]["unreadCount"], 0);
    assert_eq!(host_view[0]["guest"]["name"], "Gil");
    assert_eq!(host_view[0]["listing"]["title"], "Cliff cottage");

    let guest_view = inbox(&app, guest).await;
    assert_eq!(guest_view[0]["unreadCount"], 1);

    let response = app
        .put(guest, &format!("/api/v1/messages/{}/{}/read", listing, guest))
        .await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["updated"], 1);

    assert_eq!(inbox(&app, guest).await[0]["unreadCount"], 0);
}

#[tokio::test]
#[serial]
async fn test_threads_on_one_listing_stay_isolated() {
    let app = spawn_app().await;
    let host = app.seed_user("Hana").await;
    let ana = app.seed_user("Ana").await;
    let ben = app.seed_user("Ben").await;
    let listing = app.seed_listing(host, "Lake house").await;

    send(&app, ana, listing, ana, "Is the dock usable?").await;
    send(&app, ben, listing, ben, "Pets allowed?").await;
    send(&app, ben, listing, ben, "We have a small dog").await;

    let threads = inbox(&app, host).await;
    assert_eq!(threads.len(), 2);
    assert_eq!(threads[0]["guestId"], ben.to_string());
    assert_eq!(threads[0]["lastMessage"]["content"], "We have a small dog");
    assert_eq!(threads[0]["unreadCount"], 2);
    assert_eq!(threads[1]["guestId"], ana.to_string());
    assert_eq!(threads[1]["unreadCount"], 1);

    // Ana only ever sees her own conversation
    let ana_view = inbox(&app, ana).await;
    assert_eq!(ana_view.len(), 1);
    assert_eq!(ana_view[0]["lastMessage"]["content"], "Is the dock usable?");

    // ...and cannot read Ben's history
    let response = app
        .get(ana, &format!("/api/v1/messages/{}/{}", listing, ben))
        .await;
    assert_eq!(response.status(), 403);
}

#[tokio::test]
#[serial]
async fn test_unread_count_per_side() {
    let app = spawn_app().await;
    let host = app.seed_user("Hana").await;
    let guest = app.seed_user("Gil").await;
    let listing = app.seed_listing(host, "Barn").await;

    for i in 0..4 {
        send(&app, guest, listing, guest, &format!("question {}", i)).await;
    }
    assert_eq!(inbox(&app, host).await[0]["unreadCount"], 4);

    app.put(host, &format!("/api/v1/messages/{}/{}/read", listing, guest))
        .await;
    assert_eq!(inbox(&app, host).await[0]["unreadCount"], 0);
    assert_eq!(inbox(&app, guest).await[0]["unreadCount"], 0);

    // Marking again is a no-op
    let body: Value = app
        .put(host, &format!("/api/v1/messages/{}/{}/read", listing, guest))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(body["updated"], 0);
}

#[tokio::test]
#[serial]
async fn test_history_is_chronological() {
    let app = spawn_app().await;
    let host = app.seed_user("Hana").await;
    let guest = app.seed_user("Gil").await;
    let listing = app.seed_listing(host, "Barn").await;

    for i in 0..6 {
        let sender = if i % 2 == 0 { guest } else { host };
        send(&app, sender, listing, guest, &format!("m{}", i)).await;
    }

    let history: Vec<Value> = app
        .get(host, &format!("/api/v1/messages/{}/{}", listing, guest))
        .await
        .json()
        .await
        .unwrap();
    let contents: Vec<&str> = history
        .iter()
        .map(|m| m["content"].as_str().unwrap())
        .collect();
    assert_eq!(contents, vec!["m0", "m1", "m2", "m3", "m4", "m5"]);

    let timestamps: Vec<chrono::DateTime<chrono::Utc>> = history
        .iter()
        .map(|m| m["timestamp"].as_str().unwrap().parse().unwrap())
        .collect();
    assert!(timestamps.windows(2).all(|w| w[0] <= w[1]));
}

#[tokio::test]
#[serial]
async fn test_send_validation_and_identity() {
    let app = spawn_app().await;
    let host = app.seed_user("Hana").await;
    let guest = app.seed_user("Gil").await;
    let listing = app.seed_listing(host, "Barn").await;

    let blank = app
        .post(
            guest,
            "/api/v1/messages",
            &json!({ "listingId": listing, "guestId": guest, "content": "   " }),
        )
        .await;
    assert_eq!(blank.status(), 400);
    let body: Value = blank.json().await.unwrap();
    assert_eq!(body["error_code"], "VALIDATION_ERROR");

    let unknown_listing = app
        .post(
            guest,
            "/api/v1/messages",
            &json!({ "listingId": Uuid::new_v4(), "guestId": guest, "content": "hi" }),
        )
        .await;
    assert_eq!(unknown_listing.status(), 404);

    let anonymous = reqwest::Client::new()
        .get(app.url("/api/v1/inbox"))
        .send()
        .await
        .unwrap();
    assert_eq!(anonymous.status(), 401);

    let sent = send(&app, guest, listing, guest, "  padded  ").await;
    assert_eq!(sent["content"], "padded");
    assert_eq!(sent["sender"]["name"], "Gil");
    assert!(sent["sender"].get("email").is_none());
}
