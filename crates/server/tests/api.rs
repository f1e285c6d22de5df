use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use db::DBService;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use server::{AppState, routes};
use tower::ServiceExt;

async fn app() -> Router {
    let db = DBService::new_in_memory().await.unwrap();
    routes::router(AppState::new(db))
}

fn post_json(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn put_json(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("PUT")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Register a user with the given role and return a session token.
async fn signup(app: &Router, email: &str, role: &str) -> String {
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/auth/register",
            None,
            json!({ "name": "Test User", "email": email, "password": "hunter22", "role": role }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/auth/login",
            None,
            json!({ "email": email, "password": "hunter22" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    body["data"]["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn register_login_and_me() {
    let app = app().await;
    let token = signup(&app, "dana@example.com", "donor").await;

    let response = app.clone().oneshot(get("/api/auth/me", Some(&token))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["email"], "dana@example.com");
    assert_eq!(body["data"]["role"], "donor");
    assert!(body["data"].get("password_hash").is_none());
}

#[tokio::test]
async fn login_with_wrong_password_is_unauthorized() {
    let app = app().await;
    signup(&app, "dana@example.com", "donor").await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/auth/login",
            None,
            json!({ "email": "dana@example.com", "password": "wrong" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn protected_routes_require_a_token() {
    let app = app().await;
    let response = app
        .clone()
        .oneshot(post_json("/api/food-items", None, json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn read_routes_require_a_token_too() {
    let app = app().await;
    for uri in [
        "/api/donors",
        "/api/ngos",
        "/api/food-items",
        "/api/requests",
        "/api/feedback",
        "/api/transactions",
    ] {
        let response = app.clone().oneshot(get(uri, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
    }
}

#[tokio::test]
async fn unrecognized_role_is_rejected_at_registration() {
    let app = app().await;
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/auth/register",
            None,
            json!({ "name": "V", "email": "v@example.com", "password": "x", "role": "volunteer" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn duplicate_email_is_a_bad_request() {
    let app = app().await;
    signup(&app, "dana@example.com", "donor").await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/auth/register",
            None,
            json!({ "name": "Other", "email": "dana@example.com", "password": "x", "role": "ngo" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

/// Full listing flow: donor profile, food item, then reserve it as an NGO.
#[tokio::test]
async fn donation_lifecycle() {
    let app = app().await;
    let donor_token = signup(&app, "dana@example.com", "donor").await;
    let ngo_token = signup(&app, "ngo@example.com", "ngo").await;

    // Donor needs a profile before listing food.
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/donors",
            Some(&donor_token),
            json!({ "user_id": uuid::Uuid::nil(), "organization": "Dana's Bakery",
                    "address": null, "latitude": null, "longitude": null, "phone": null }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/ngos",
            Some(&ngo_token),
            json!({ "user_id": uuid::Uuid::nil(), "organization": "Food Aid",
                    "address": null, "latitude": null, "longitude": null,
                    "phone": null, "capacity": 100 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let ngo = body_json(response).await;
    let ngo_id = ngo["data"]["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/food-items",
            Some(&donor_token),
            json!({ "donor_id": uuid::Uuid::nil(), "title": "Bread rolls",
                    "description": null, "category": "bread", "quantity": 5.0,
                    "unit": null, "expires_at": null }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let item = body_json(response).await;
    let item_id = item["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(item["data"]["status"], "available");

    // NGO reserves it.
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/transactions",
            Some(&ngo_token),
            json!({ "food_item_id": item_id, "ngo_id": ngo_id,
                    "quantity": 5.0, "scheduled_pickup": null }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let transaction = body_json(response).await;
    let transaction_id = transaction["data"]["id"].as_str().unwrap().to_string();

    // Item is now off the market.
    let response = app
        .clone()
        .oneshot(get("/api/food-items?status=available", Some(&donor_token)))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 0);

    // Reserving twice is rejected.
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/transactions",
            Some(&ngo_token),
            json!({ "food_item_id": item["data"]["id"], "ngo_id": ngo_id,
                    "quantity": 5.0, "scheduled_pickup": null }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Completing the handoff marks the item collected.
    let response = app
        .clone()
        .oneshot(put_json(
            &format!("/api/transactions/{transaction_id}/status"),
            Some(&ngo_token),
            json!({ "status": "completed" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Completed is terminal: a late cancellation must not put the already
    // collected item back on the market.
    let response = app
        .clone()
        .oneshot(put_json(
            &format!("/api/transactions/{transaction_id}/status"),
            Some(&ngo_token),
            json!({ "status": "cancelled" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(get(&format!("/api/food-items/{item_id}"), Some(&ngo_token)))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"]["status"], "collected");
}

#[tokio::test]
async fn feedback_rating_is_validated() {
    let app = app().await;
    let token = signup(&app, "dana@example.com", "donor").await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/feedback",
            Some(&token),
            json!({ "transaction_id": uuid::Uuid::new_v4(), "rating": 9, "comment": null }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn dashboard_redirects_anonymous_users_to_login() {
    let app = app().await;
    let response = app.clone().oneshot(get("/donor", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/login");
}

#[tokio::test]
async fn dashboard_redirects_wrong_role_to_its_own_home() {
    let app = app().await;
    let donor_token = signup(&app, "dana@example.com", "donor").await;

    let response = app
        .clone()
        .oneshot(get("/receiver", Some(&donor_token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/donor");
}

#[tokio::test]
async fn dashboard_renders_for_the_matching_role() {
    let app = app().await;
    let donor_token = signup(&app, "dana@example.com", "donor").await;

    let response = app
        .clone()
        .oneshot(get("/donor", Some(&donor_token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["role"], "donor");
}

#[tokio::test]
async fn unknown_resources_are_not_found() {
    let app = app().await;
    let token = signup(&app, "dana@example.com", "donor").await;
    let response = app
        .clone()
        .oneshot(get(
            &format!("/api/donors/{}", uuid::Uuid::new_v4()),
            Some(&token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["error"], "not found");
}
