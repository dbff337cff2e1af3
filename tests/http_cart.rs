mod common;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
    response::Response,
};
use course_shop_api::{middleware::session::session_layer, routes::create_api_router};
use serde_json::{Value, json};
use tower::ServiceExt;
use tower_sessions::MemoryStore;

async fn app() -> anyhow::Result<(Router, common::SeededIds)> {
    let state = common::setup_state().await?;
    let course = common::create_course(&state.orm, 199_000).await?;
    let app = Router::new()
        .nest("/api", create_api_router())
        .layer(session_layer(MemoryStore::default(), false))
        .with_state(state);
    Ok((app, common::SeededIds { course: course.id }))
}

fn session_cookie(response: &Response) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(str::to_string)
}

async fn body_json(response: Response) -> anyhow::Result<Value> {
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

fn request(method: &str, uri: &str, cookie: Option<&str>, body: Option<Value>) -> anyhow::Result<Request<Body>> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))?,
        None => builder.body(Body::empty())?,
    };
    Ok(request)
}

#[tokio::test]
async fn guest_cart_lives_in_the_session() -> anyhow::Result<()> {
    let (app, ids) = app().await?;

    let added = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/cart",
            None,
            Some(json!({ "item_kind": "course", "item_id": ids.course })),
        )?)
        .await?;
    assert_eq!(added.status(), StatusCode::OK);
    let cookie = session_cookie(&added).expect("session cookie");
    let body = body_json(added).await?;
    assert_eq!(body["data"]["added"], true);
    assert_eq!(body["data"]["cart_quantity"], 1);

    let count = app
        .clone()
        .oneshot(request("GET", "/api/cart/count", Some(&cookie), None)?)
        .await?;
    let body = body_json(count).await?;
    assert_eq!(body["data"]["cart_quantity"], 1);
    assert_eq!(body["data"]["cart_total"], 199_000);

    let uri = format!("/api/cart/course/{}", ids.course);
    let present = app
        .clone()
        .oneshot(request("GET", &uri, Some(&cookie), None)?)
        .await?;
    assert_eq!(body_json(present).await?["data"]["in_cart"], true);

    // A different visitor starts from an empty cart.
    let stranger = app
        .clone()
        .oneshot(request("GET", "/api/cart/count", None, None)?)
        .await?;
    assert_eq!(body_json(stranger).await?["data"]["cart_quantity"], 0);

    let removed = app
        .clone()
        .oneshot(request("DELETE", &uri, Some(&cookie), None)?)
        .await?;
    assert_eq!(removed.status(), StatusCode::OK);
    let after = app
        .oneshot(request("GET", "/api/cart", Some(&cookie), None)?)
        .await?;
    assert_eq!(body_json(after).await?["data"]["total_quantity"], 0);
    Ok(())
}

#[tokio::test]
async fn checkout_requires_a_logged_in_user() -> anyhow::Result<()> {
    let (app, _) = app().await?;
    let response = app
        .oneshot(request(
            "POST",
            "/api/orders/checkout",
            None,
            Some(json!({
                "first_name": "Sara",
                "last_name": "Ahmadi",
                "email": "sara@example.com",
                "phone": "09123456789",
                "terms_accepted": true
            })),
        )?)
        .await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn unknown_item_kind_is_a_bad_request() -> anyhow::Result<()> {
    let (app, ids) = app().await?;
    let uri = format!("/api/cart/ebook/{}", ids.course);
    let response = app.oneshot(request("GET", &uri, None, None)?).await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    Ok(())
}
