//! Service-level tests for cost line management and HPP aggregation.

mod common;

use common::TestApp;
use costbook_api::entities::cost_component::ComponentType;
use costbook_api::errors::ServiceError;
use costbook_api::services::cost_components::NewCostComponent;
use costbook_api::services::product_costs::{CostLineChanges, CostListing, NewCostLine};
use costbook_api::services::products::NewProduct;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

async fn setup_product(app: &TestApp, user_id: i64, sku: &str) -> i64 {
    app.services
        .products
        .create(
            user_id,
            NewProduct {
                user_id: None,
                name: format!("Product {}", sku),
                sku: sku.to_string(),
                description: None,
            },
        )
        .await
        .expect("product")
        .id
}

async fn setup_component(app: &TestApp, user_id: i64, name: &str) -> i64 {
    app.services
        .cost_components
        .create(
            user_id,
            NewCostComponent {
                name: name.to_string(),
                description: None,
                component_type: ComponentType::DirectMaterial,
            },
        )
        .await
        .expect("component")
        .id
}

fn line(component_id: i64, unit_price: Decimal, quantity: Decimal, conversion: Decimal) -> NewCostLine {
    NewCostLine {
        cost_component_id: component_id,
        unit: "g".to_string(),
        unit_price,
        quantity,
        conversion_qty: conversion,
    }
}

#[tokio::test]
async fn hpp_is_the_sum_of_line_amounts() {
    let app = TestApp::new().await;
    let (user, _) = app.register_user("Ana", "ana@example.com").await;
    let product_id = setup_product(&app, user.id, "SKU-1").await;
    let flour = setup_component(&app, user.id, "Flour").await;
    let sugar = setup_component(&app, user.id, "Sugar").await;

    let product = app
        .services
        .product_costs
        .create_batch(
            user.id,
            product_id,
            vec![
                // 25000 per kg, 200 g used -> 5000
                line(flour, dec!(25000), dec!(200), dec!(1000)),
                // 12000 per kg, 100 g used -> 1200
                line(sugar, dec!(12000), dec!(100), dec!(1000)),
            ],
        )
        .await
        .expect("batch");

    assert_eq!(product.hpp, Some(dec!(6200.00)));
}

#[tokio::test]
async fn duplicate_component_in_one_batch_writes_nothing() {
    let app = TestApp::new().await;
    let (user, _) = app.register_user("Ana", "ana@example.com").await;
    let product_id = setup_product(&app, user.id, "SKU-1").await;
    let flour = setup_component(&app, user.id, "Flour").await;

    let result = app
        .services
        .product_costs
        .create_batch(
            user.id,
            product_id,
            vec![
                line(flour, dec!(100), dec!(1), dec!(1)),
                line(flour, dec!(200), dec!(1), dec!(1)),
            ],
        )
        .await;
    assert!(matches!(result, Err(ServiceError::Conflict(_))));

    let listing = app
        .services
        .product_costs
        .list(user.id, Some(product_id))
        .await
        .expect("list");
    assert!(matches!(listing, CostListing::Empty { .. }));

    let product = app
        .services
        .products
        .get(user.id, product_id)
        .await
        .expect("product");
    assert_eq!(product.hpp, None);
}

#[tokio::test]
async fn component_already_persisted_rejects_the_batch() {
    let app = TestApp::new().await;
    let (user, _) = app.register_user("Ana", "ana@example.com").await;
    let product_id = setup_product(&app, user.id, "SKU-1").await;
    let flour = setup_component(&app, user.id, "Flour").await;

    app.services
        .product_costs
        .create_batch(
            user.id,
            product_id,
            vec![line(flour, dec!(100), dec!(1), dec!(1))],
        )
        .await
        .expect("first batch");

    let result = app
        .services
        .product_costs
        .create_batch(
            user.id,
            product_id,
            vec![line(flour, dec!(200), dec!(1), dec!(1))],
        )
        .await;
    assert!(matches!(result, Err(ServiceError::Conflict(_))));
}

#[tokio::test]
async fn updating_a_line_refreshes_its_amount_and_the_hpp() {
    let app = TestApp::new().await;
    let (user, _) = app.register_user("Ana", "ana@example.com").await;
    let product_id = setup_product(&app, user.id, "SKU-1").await;
    let flour = setup_component(&app, user.id, "Flour").await;
    let sugar = setup_component(&app, user.id, "Sugar").await;

    app.services
        .product_costs
        .create_batch(
            user.id,
            product_id,
            vec![
                line(flour, dec!(100), dec!(2), dec!(1)),
                line(sugar, dec!(50), dec!(1), dec!(1)),
            ],
        )
        .await
        .expect("batch");

    let listing = app
        .services
        .product_costs
        .list(user.id, Some(product_id))
        .await
        .expect("list");
    let first_line_id = match listing {
        CostListing::Lines { lines, .. } => lines[0].id,
        _ => panic!("expected lines"),
    };

    let updated = app
        .services
        .product_costs
        .update_line(
            user.id,
            first_line_id,
            CostLineChanges {
                unit_price: Some(dec!(300)),
                ..Default::default()
            },
        )
        .await
        .expect("update");
    assert_eq!(updated.amount, dec!(600.00));

    let product = app
        .services
        .products
        .get(user.id, product_id)
        .await
        .expect("product");
    assert_eq!(product.hpp, Some(dec!(650.00)));
}

#[tokio::test]
async fn deleting_the_last_line_resets_hpp_to_zero() {
    let app = TestApp::new().await;
    let (user, _) = app.register_user("Ana", "ana@example.com").await;
    let product_id = setup_product(&app, user.id, "SKU-1").await;
    let flour = setup_component(&app, user.id, "Flour").await;

    app.services
        .product_costs
        .create_batch(
            user.id,
            product_id,
            vec![line(flour, dec!(100), dec!(1), dec!(1))],
        )
        .await
        .expect("batch");

    let listing = app
        .services
        .product_costs
        .list(user.id, Some(product_id))
        .await
        .expect("list");
    let line_id = match listing {
        CostListing::Lines { lines, .. } => lines[0].id,
        _ => panic!("expected lines"),
    };

    app.services
        .product_costs
        .delete_line(user.id, line_id)
        .await
        .expect("delete");

    let product = app
        .services
        .products
        .get(user.id, product_id)
        .await
        .expect("product");
    assert_eq!(product.hpp, Some(dec!(0.00)));
}

#[tokio::test]
async fn another_users_line_is_forbidden_not_hidden() {
    let app = TestApp::new().await;
    let (owner, _) = app.register_user("Ana", "ana@example.com").await;
    let (intruder, _) = app.register_user("Bob", "bob@example.com").await;
    let product_id = setup_product(&app, owner.id, "SKU-1").await;
    let flour = setup_component(&app, owner.id, "Flour").await;

    app.services
        .product_costs
        .create_batch(
            owner.id,
            product_id,
            vec![line(flour, dec!(100), dec!(1), dec!(1))],
        )
        .await
        .expect("batch");

    let listing = app
        .services
        .product_costs
        .list(owner.id, Some(product_id))
        .await
        .expect("list");
    let line_id = match listing {
        CostListing::Lines { lines, .. } => lines[0].id,
        _ => panic!("expected lines"),
    };

    let result = app
        .services
        .product_costs
        .update_line(intruder.id, line_id, CostLineChanges::default())
        .await;
    assert!(matches!(result, Err(ServiceError::Forbidden(_))));

    let result = app.services.product_costs.delete_line(intruder.id, line_id).await;
    assert!(matches!(result, Err(ServiceError::Forbidden(_))));
}

#[tokio::test]
async fn a_referenced_component_cannot_be_deleted() {
    let app = TestApp::new().await;
    let (user, _) = app.register_user("Ana", "ana@example.com").await;
    let product_id = setup_product(&app, user.id, "SKU-1").await;
    let flour = setup_component(&app, user.id, "Flour").await;

    app.services
        .product_costs
        .create_batch(
            user.id,
            product_id,
            vec![line(flour, dec!(100), dec!(1), dec!(1))],
        )
        .await
        .expect("batch");

    let result = app.services.cost_components.delete(user.id, flour).await;
    assert!(matches!(result, Err(ServiceError::Conflict(_))));
}
