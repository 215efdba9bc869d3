mod helpers;

use helpers::{create_test_server, seed_organization, seed_transaction, system_ctx};
use saas_server::entities::billing::transaction_entity::TransactionDbService;
use saas_server::middleware::utils::db_utils::{Pagination, QryOrder};
use serial_test::serial;

#[tokio::test]
#[serial]
async fn list_for_organization_pages_through_entries() {
    let (_server, ctx_state) = create_test_server().await;

    let cowork = seed_organization(&ctx_state, "cowork", vec![]).await;
    let xia = seed_organization(&ctx_state, "xia", vec![]).await;
    for n in 0..3 {
        seed_transaction(
            &ctx_state,
            &cowork,
            &xia,
            &format!("Manual adjustment {n}"),
            None,
            None,
        )
        .await;
    }

    let ctx = system_ctx();
    let service = TransactionDbService {
        db: &ctx_state.db.client,
        ctx: &ctx,
    };

    let first_page = service
        .list_for_organization(
            &xia,
            Some(Pagination {
                order_by: None,
                order_dir: Some(QryOrder::ASC),
                count: 2,
                start: 0,
            }),
        )
        .await
        .unwrap();
    assert_eq!(first_page.len(), 2);

    let second_page = service
        .list_for_organization(
            &xia,
            Some(Pagination {
                order_by: None,
                order_dir: Some(QryOrder::ASC),
                count: 2,
                start: 2,
            }),
        )
        .await
        .unwrap();
    assert_eq!(second_page.len(), 1);

    let defaults = service.list_for_organization(&xia, None).await.unwrap();
    assert_eq!(defaults.len(), 3);
}

#[tokio::test]
#[serial]
async fn list_by_charge_is_scoped_to_the_subscriber() {
    let (_server, ctx_state) = create_test_server().await;

    let cowork = seed_organization(&ctx_state, "cowork", vec![]).await;
    let xia = seed_organization(&ctx_state, "xia", vec![]).await;
    let other = seed_organization(&ctx_state, "other", vec![]).await;
    seed_transaction(
        &ctx_state,
        &cowork,
        &xia,
        "Charge ch_123 failed",
        None,
        Some("ch_123".to_string()),
    )
    .await;

    let ctx = system_ctx();
    let service = TransactionDbService {
        db: &ctx_state.db.client,
        ctx: &ctx,
    };

    let found = service.list_by_charge(&xia, "ch_123").await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].charge.as_deref(), Some("ch_123"));

    let foreign = service.list_by_charge(&other, "ch_123").await.unwrap();
    assert!(foreign.is_empty());
}
