//! Router-level tests: the auth wall, response envelopes, and status codes.

mod common;

use axum::http::{Method, StatusCode};
use common::{response_json, TestApp};
use serde_json::json;

#[tokio::test]
async fn resource_routes_require_a_token() {
    let app = TestApp::new().await;

    for uri in [
        "/api/products",
        "/api/hpp",
        "/api/price-schemes",
        "/api/cost-components",
        "/api/expense-categories",
        "/api/operational-expenses",
        "/api/sales",
        "/api/stats",
    ] {
        let response = app.request(Method::GET, uri, None, None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{}", uri);
    }
}

#[tokio::test]
async fn register_login_and_me_round_trip() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/api/auth/register",
            Some(json!({
                "name": "Ana",
                "email": "ana@example.com",
                "password": "password123"
            })),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .request(
            Method::POST,
            "/api/auth/login",
            Some(json!({
                "email": "ana@example.com",
                "password": "password123"
            })),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["success"], json!(true));
    let token = body["data"]["token"].as_str().expect("token").to_string();

    let response = app
        .request(Method::GET, "/api/auth/me", None, Some(&token))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["data"]["email"], json!("ana@example.com"));
    // The password hash never leaves the server.
    assert!(body["data"].get("password_hash").is_none());
}

#[tokio::test]
async fn a_revoked_token_stops_working() {
    let app = TestApp::new().await;
    let (_, token) = app.register_user("Ana", "ana@example.com").await;

    let response = app
        .request(Method::POST, "/api/auth/logout", None, Some(&token))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .request(Method::GET, "/api/auth/me", None, Some(&token))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_with_wrong_password_is_rejected() {
    let app = TestApp::new().await;
    app.register_user("Ana", "ana@example.com").await;

    let response = app
        .request(
            Method::POST,
            "/api/auth/login",
            Some(json!({
                "email": "ana@example.com",
                "password": "wrong-password"
            })),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = response_json(response).await;
    assert_eq!(body["success"], json!(false));
}

#[tokio::test]
async fn hpp_listing_reports_no_products_as_informational_failure() {
    let app = TestApp::new().await;
    let (_, token) = app.register_user("Ana", "ana@example.com").await;

    let response = app.request(Method::GET, "/api/hpp", None, Some(&token)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["success"], json!(false));
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn absent_cost_line_answers_200_with_empty_data() {
    let app = TestApp::new().await;
    let (_, token) = app.register_user("Ana", "ana@example.com").await;

    let response = app
        .request(Method::GET, "/api/hpp/9999", None, Some(&token))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn product_money_fields_serialize_as_two_decimal_strings() {
    let app = TestApp::new().await;
    let (_, token) = app.register_user("Ana", "ana@example.com").await;

    let response = app
        .request(
            Method::POST,
            "/api/products",
            Some(json!({ "name": "Cake", "sku": "CAKE-1" })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response_json(response).await;
    let product_id = body["data"]["id"].as_i64().expect("id");

    let response = app
        .request(
            Method::POST,
            "/api/cost-components",
            Some(json!({ "name": "Flour", "component_type": "direct_material" })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response_json(response).await;
    let component_id = body["data"]["id"].as_i64().expect("id");

    let response = app
        .request(
            Method::POST,
            "/api/hpp",
            Some(json!({
                "product_id": product_id,
                "costs": [{
                    "cost_component_id": component_id,
                    "unit": "g",
                    "unit_price": 25000,
                    "quantity": 200,
                    "conversion_qty": 1000
                }]
            })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response_json(response).await;
    assert_eq!(body["data"]["hpp"], json!("5000.00"));
}

#[tokio::test]
async fn batch_validation_reports_dotted_field_errors() {
    let app = TestApp::new().await;
    let (_, token) = app.register_user("Ana", "ana@example.com").await;

    let response = app
        .request(
            Method::POST,
            "/api/hpp",
            Some(json!({
                "product_id": 1,
                "costs": [{
                    "cost_component_id": 1,
                    "unit": "g",
                    "unit_price": 100,
                    "quantity": 0,
                    "conversion_qty": 1000
                }]
            })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = response_json(response).await;
    assert_eq!(body["success"], json!(false));
    assert!(body["errors"]["costs.0.quantity"].is_array());
}

#[tokio::test]
async fn invalid_component_type_filter_is_a_bad_request() {
    let app = TestApp::new().await;
    let (_, token) = app.register_user("Ana", "ana@example.com").await;

    let response = app
        .request(
            Method::GET,
            "/api/cost-components?type=imaginary",
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .request(
            Method::GET,
            "/api/cost-components?keyword=%20",
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn stats_aggregates_are_numbers_not_strings() {
    let app = TestApp::new().await;
    let (_, token) = app.register_user("Ana", "ana@example.com").await;

    let response = app
        .request(Method::GET, "/api/stats?year=2024&month=3", None, Some(&token))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert!(body["data"]["total_sales"].is_number());
    assert!(body["data"]["net_profit"].is_number());
    assert_eq!(body["data"]["year"], json!(2024));
    assert_eq!(body["data"]["availableYears"], json!([]));
}

#[tokio::test]
async fn stats_rejects_an_out_of_range_year() {
    let app = TestApp::new().await;
    let (_, token) = app.register_user("Ana", "ana@example.com").await;

    let response = app
        .request(Method::GET, "/api/stats?year=1990", None, Some(&token))
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = response_json(response).await;
    assert!(body["errors"]["year"].is_array());
}

#[tokio::test]
async fn cross_tenant_product_reads_are_not_found() {
    let app = TestApp::new().await;
    let (_, owner_token) = app.register_user("Ana", "ana@example.com").await;
    let (_, intruder_token) = app.register_user("Bob", "bob@example.com").await;

    let response = app
        .request(
            Method::POST,
            "/api/products",
            Some(json!({ "name": "Cake", "sku": "CAKE-1" })),
            Some(&owner_token),
        )
        .await;
    let body = response_json(response).await;
    let product_id = body["data"]["id"].as_i64().expect("id");

    let response = app
        .request(
            Method::GET,
            &format!("/api/products/{}", product_id),
            None,
            Some(&intruder_token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn duplicate_sales_period_is_a_business_conflict() {
    let app = TestApp::new().await;
    let (_, token) = app.register_user("Ana", "ana@example.com").await;

    let response = app
        .request(
            Method::POST,
            "/api/products",
            Some(json!({ "name": "Cake", "sku": "CAKE-1" })),
            Some(&token),
        )
        .await;
    let body = response_json(response).await;
    let product_id = body["data"]["id"].as_i64().expect("id");

    let record = json!({
        "product_id": product_id,
        "year": 2024,
        "month": 3,
        "number_of_sales": 10,
        "hpp": 100,
        "selling_price": 150
    });

    let response = app
        .request(Method::POST, "/api/sales", Some(record.clone()), Some(&token))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .request(Method::POST, "/api/sales", Some(record), Some(&token))
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}
