//! Service-level tests for the tiered price chain: anchoring, cascades,
//! re-sequencing, and the product's denormalized selling price.

mod common;

use common::TestApp;
use costbook_api::entities::cost_component::ComponentType;
use costbook_api::errors::ServiceError;
use costbook_api::services::cost_components::NewCostComponent;
use costbook_api::services::price_schemes::{
    NewPriceLevel, PriceLevelChanges, SchemeListing,
};
use costbook_api::services::product_costs::NewCostLine;
use costbook_api::services::products::NewProduct;
use rust_decimal_macros::dec;

/// Creates a product whose HPP is materialized at 100.00 through one cost
/// line.
async fn product_with_hpp_100(app: &TestApp, user_id: i64, sku: &str) -> i64 {
    let product_id = app
        .services
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
        .id;

    let component_id = app
        .services
        .cost_components
        .create(
            user_id,
            NewCostComponent {
                name: format!("Material {}", sku),
                description: None,
                component_type: ComponentType::DirectMaterial,
            },
        )
        .await
        .expect("component")
        .id;

    app.services
        .product_costs
        .create_batch(
            user_id,
            product_id,
            vec![NewCostLine {
                cost_component_id: component_id,
                unit: "pcs".to_string(),
                unit_price: dec!(100),
                quantity: dec!(1),
                conversion_qty: dec!(1),
            }],
        )
        .await
        .expect("cost line");

    product_id
}

fn level(product_id: i64, name: &str) -> NewPriceLevel {
    NewPriceLevel {
        product_id,
        level_name: name.to_string(),
        discount_percentage: None,
        selling_price: None,
        purchase_price: None,
        notes: None,
    }
}

async fn chain(app: &TestApp, user_id: i64, product_id: i64) -> Vec<costbook_api::entities::price_scheme::Model> {
    match app
        .services
        .price_schemes
        .list(user_id, Some(product_id))
        .await
        .expect("list")
    {
        SchemeListing::Chain { levels, .. } => levels,
        SchemeListing::NoProducts => panic!("expected a chain"),
    }
}

#[tokio::test]
async fn first_level_anchors_to_hpp_with_a_ten_percent_margin() {
    let app = TestApp::new().await;
    let (user, _) = app.register_user("Ana", "ana@example.com").await;
    let product_id = product_with_hpp_100(&app, user.id, "SKU-1").await;

    let created = app
        .services
        .price_schemes
        .create(
            user.id,
            NewPriceLevel {
                discount_percentage: Some(dec!(10)),
                ..level(product_id, "Wholesale")
            },
        )
        .await
        .expect("create");

    assert_eq!(created.level_order, 1);
    assert_eq!(created.purchase_price, dec!(100.00));
    assert_eq!(created.selling_price, dec!(111.11));
    assert_eq!(created.profit_amount, dec!(11.11));

    let product = app
        .services
        .products
        .get(user.id, product_id)
        .await
        .expect("product");
    assert_eq!(product.selling_price, Some(dec!(111.11)));
}

#[tokio::test]
async fn second_level_buys_at_the_first_levels_selling_price() {
    let app = TestApp::new().await;
    let (user, _) = app.register_user("Ana", "ana@example.com").await;
    let product_id = product_with_hpp_100(&app, user.id, "SKU-1").await;

    app.services
        .price_schemes
        .create(
            user.id,
            NewPriceLevel {
                selling_price: Some(dec!(120)),
                ..level(product_id, "Wholesale")
            },
        )
        .await
        .expect("level 1");

    let second = app
        .services
        .price_schemes
        .create(
            user.id,
            NewPriceLevel {
                discount_percentage: Some(dec!(5)),
                ..level(product_id, "Reseller")
            },
        )
        .await
        .expect("level 2");

    assert_eq!(second.level_order, 2);
    assert_eq!(second.purchase_price, dec!(120.00));
    assert_eq!(second.selling_price, dec!(126.32));

    let product = app
        .services
        .products
        .get(user.id, product_id)
        .await
        .expect("product");
    assert_eq!(product.selling_price, Some(dec!(126.32)));
}

#[tokio::test]
async fn explicit_selling_price_back_derives_the_discount() {
    let app = TestApp::new().await;
    let (user, _) = app.register_user("Ana", "ana@example.com").await;
    let product_id = product_with_hpp_100(&app, user.id, "SKU-1").await;

    app.services
        .price_schemes
        .create(
            user.id,
            NewPriceLevel {
                selling_price: Some(dec!(120)),
                ..level(product_id, "Wholesale")
            },
        )
        .await
        .expect("level 1");

    let second = app
        .services
        .price_schemes
        .create(
            user.id,
            NewPriceLevel {
                selling_price: Some(dec!(150)),
                ..level(product_id, "Reseller")
            },
        )
        .await
        .expect("level 2");

    assert_eq!(second.discount_percentage, dec!(20.00));
    assert_eq!(second.profit_amount, dec!(30.00));
}

#[tokio::test]
async fn first_level_without_hpp_requires_a_purchase_price() {
    let app = TestApp::new().await;
    let (user, _) = app.register_user("Ana", "ana@example.com").await;
    let product_id = app
        .services
        .products
        .create(
            user.id,
            NewProduct {
                user_id: None,
                name: "Bare product".to_string(),
                sku: "SKU-BARE".to_string(),
                description: None,
            },
        )
        .await
        .expect("product")
        .id;

    let result = app
        .services
        .price_schemes
        .create(user.id, level(product_id, "Wholesale"))
        .await;
    assert!(matches!(result, Err(ServiceError::ValidationFailed(_))));

    let created = app
        .services
        .price_schemes
        .create(
            user.id,
            NewPriceLevel {
                purchase_price: Some(dec!(80)),
                discount_percentage: Some(dec!(10)),
                ..level(product_id, "Wholesale")
            },
        )
        .await
        .expect("explicit anchor");
    assert_eq!(created.purchase_price, dec!(80.00));
    assert_eq!(created.selling_price, dec!(88.89));
}

#[tokio::test]
async fn updating_a_level_cascades_through_its_successors() {
    let app = TestApp::new().await;
    let (user, _) = app.register_user("Ana", "ana@example.com").await;
    let product_id = product_with_hpp_100(&app, user.id, "SKU-1").await;

    for (name, discount) in [("Wholesale", dec!(10)), ("Reseller", dec!(5)), ("Retail", dec!(20))] {
        app.services
            .price_schemes
            .create(
                user.id,
                NewPriceLevel {
                    discount_percentage: Some(discount),
                    ..level(product_id, name)
                },
            )
            .await
            .expect("level");
    }

    let levels = chain(&app, user.id, product_id).await;
    let first_id = levels[0].id;

    app.services
        .price_schemes
        .update(
            user.id,
            first_id,
            PriceLevelChanges {
                discount_percentage: Some(dec!(50)),
                ..Default::default()
            },
        )
        .await
        .expect("update");

    let levels = chain(&app, user.id, product_id).await;
    assert_eq!(levels[0].selling_price, dec!(200.00));
    assert_eq!(levels[1].purchase_price, dec!(200.00));
    // Discounts stay sticky through the cascade.
    assert_eq!(levels[1].discount_percentage, dec!(5.00));
    assert_eq!(levels[2].purchase_price, levels[1].selling_price);
    for l in &levels {
        assert_eq!(l.profit_amount, l.selling_price - l.purchase_price);
    }

    let product = app
        .services
        .products
        .get(user.id, product_id)
        .await
        .expect("product");
    assert_eq!(product.selling_price, Some(levels[2].selling_price));
}

#[tokio::test]
async fn deleting_a_middle_level_renumbers_and_reanchors() {
    let app = TestApp::new().await;
    let (user, _) = app.register_user("Ana", "ana@example.com").await;
    let product_id = product_with_hpp_100(&app, user.id, "SKU-1").await;

    for (name, discount) in [("Wholesale", dec!(10)), ("Reseller", dec!(5)), ("Retail", dec!(20))] {
        app.services
            .price_schemes
            .create(
                user.id,
                NewPriceLevel {
                    discount_percentage: Some(discount),
                    ..level(product_id, name)
                },
            )
            .await
            .expect("level");
    }

    let levels = chain(&app, user.id, product_id).await;
    let middle_id = levels[1].id;

    app.services
        .price_schemes
        .delete(user.id, middle_id)
        .await
        .expect("delete");

    let levels = chain(&app, user.id, product_id).await;
    assert_eq!(levels.len(), 2);
    assert_eq!(
        levels.iter().map(|l| l.level_order).collect::<Vec<_>>(),
        vec![1, 2]
    );
    assert_eq!(levels[1].purchase_price, levels[0].selling_price);
    assert_eq!(levels[0].purchase_price, dec!(100.00));
}

#[tokio::test]
async fn deleting_the_last_level_resets_the_product_to_cost() {
    let app = TestApp::new().await;
    let (user, _) = app.register_user("Ana", "ana@example.com").await;
    let product_id = product_with_hpp_100(&app, user.id, "SKU-1").await;

    let created = app
        .services
        .price_schemes
        .create(
            user.id,
            NewPriceLevel {
                discount_percentage: Some(dec!(10)),
                ..level(product_id, "Wholesale")
            },
        )
        .await
        .expect("level");

    app.services
        .price_schemes
        .delete(user.id, created.id)
        .await
        .expect("delete");

    let product = app
        .services
        .products
        .get(user.id, product_id)
        .await
        .expect("product");
    assert_eq!(product.selling_price, product.hpp);
    assert_eq!(product.hpp, Some(dec!(100.00)));
}

#[tokio::test]
async fn another_users_chain_is_invisible() {
    let app = TestApp::new().await;
    let (owner, _) = app.register_user("Ana", "ana@example.com").await;
    let (intruder, _) = app.register_user("Bob", "bob@example.com").await;
    let product_id = product_with_hpp_100(&app, owner.id, "SKU-1").await;

    let created = app
        .services
        .price_schemes
        .create(
            owner.id,
            NewPriceLevel {
                discount_percentage: Some(dec!(10)),
                ..level(product_id, "Wholesale")
            },
        )
        .await
        .expect("level");

    let result = app
        .services
        .price_schemes
        .create(
            intruder.id,
            NewPriceLevel {
                discount_percentage: Some(dec!(10)),
                ..level(product_id, "Theft")
            },
        )
        .await;
    assert!(matches!(result, Err(ServiceError::NotFound(_))));

    let result = app.services.price_schemes.get(intruder.id, created.id).await;
    assert!(matches!(result, Err(ServiceError::NotFound(_))));

    let result = app.services.price_schemes.delete(intruder.id, created.id).await;
    assert!(matches!(result, Err(ServiceError::NotFound(_))));
}
