//! Approval workflow integration tests.

mod common;

use backoffice_core::error::AppError;
use common::{date, seed_customer, spawn_backoffice};
use delivery_service::store::collections;

#[tokio::test]
async fn approval_moves_quantities_and_clears_the_queue() {
    let (mut backoffice, store) = spawn_backoffice();
    let anil = seed_customer(&mut backoffice, "Anil", 90.0, 1.0).await;
    let beth = seed_customer(&mut backoffice, "Beth", 80.0, 1.0).await;
    let day = date(2024, 3, 1);

    backoffice
        .submit_batch(day, &[(anil.id, 1.5), (beth.id, 0.5)])
        .await
        .unwrap();

    let approved = backoffice.approve_date(day).await.unwrap();
    assert_eq!(approved, 2);

    assert_eq!(backoffice.delivery_quantity(anil.id, day), Some(1.5));
    assert_eq!(backoffice.delivery_quantity(beth.id, day), Some(0.5));
    assert!(backoffice.pending_for_date(day).is_empty());
    assert!(store.rows(collections::PENDING_DELIVERIES).is_empty());
    assert_eq!(store.rows(collections::DELIVERIES).len(), 2);
}

#[tokio::test]
async fn reapproval_overwrites_a_prior_delivery_for_the_same_key() {
    let (mut backoffice, store) = spawn_backoffice();
    let anil = seed_customer(&mut backoffice, "Anil", 90.0, 1.0).await;
    let day = date(2024, 3, 1);

    // Manual entry first, then a corrected staff submission gets approved.
    backoffice.record_delivery(anil.id, day, 1.0).await.unwrap();
    backoffice
        .submit_batch(day, &[(anil.id, 2.0)])
        .await
        .unwrap();
    backoffice.approve_date(day).await.unwrap();

    assert_eq!(backoffice.delivery_quantity(anil.id, day), Some(2.0));
    assert_eq!(
        store.rows(collections::DELIVERIES).len(),
        1,
        "still one billable row per (customer, date)"
    );
}

#[tokio::test]
async fn approving_an_empty_date_is_a_no_op() {
    let (mut backoffice, _store) = spawn_backoffice();
    seed_customer(&mut backoffice, "Anil", 90.0, 1.0).await;

    let approved = backoffice.approve_date(date(2024, 3, 1)).await.unwrap();
    assert_eq!(approved, 0);
    assert!(backoffice.deliveries().is_empty());
}

#[tokio::test]
async fn approval_only_touches_its_own_date() {
    let (mut backoffice, store) = spawn_backoffice();
    let anil = seed_customer(&mut backoffice, "Anil", 90.0, 1.0).await;
    let d1 = date(2024, 3, 1);
    let d2 = date(2024, 3, 2);

    backoffice.submit_batch(d1, &[(anil.id, 1.0)]).await.unwrap();
    backoffice.submit_batch(d2, &[(anil.id, 2.0)]).await.unwrap();

    assert_eq!(backoffice.approve_date(d1).await.unwrap(), 1);

    assert_eq!(backoffice.pending_quantity(anil.id, d2), Some(2.0));
    assert_eq!(store.rows(collections::PENDING_DELIVERIES).len(), 1);
    assert_eq!(backoffice.delivery_quantity(anil.id, d2), None);
}

#[tokio::test]
async fn failed_delivery_write_aborts_without_touching_the_queue() {
    let (mut backoffice, store) = spawn_backoffice();
    let anil = seed_customer(&mut backoffice, "Anil", 90.0, 1.0).await;
    let day = date(2024, 3, 1);

    backoffice.submit_batch(day, &[(anil.id, 1.5)]).await.unwrap();
    store.fail_next("upsert");

    let err = backoffice.approve_date(day).await.unwrap_err();
    assert!(matches!(err, AppError::Transient(_)), "got {:?}", err);

    assert!(store.rows(collections::DELIVERIES).is_empty());
    assert_eq!(store.rows(collections::PENDING_DELIVERIES).len(), 1);
    assert!(backoffice.deliveries().is_empty());
}

#[tokio::test]
async fn failed_cleanup_reports_but_keeps_deliveries_and_rerun_repairs() {
    let (mut backoffice, store) = spawn_backoffice();
    let anil = seed_customer(&mut backoffice, "Anil", 90.0, 1.0).await;
    let day = date(2024, 3, 1);

    backoffice.submit_batch(day, &[(anil.id, 1.5)]).await.unwrap();
    store.fail_next("delete");

    let err = backoffice.approve_date(day).await.unwrap_err();
    assert!(matches!(err, AppError::Transient(_)), "got {:?}", err);

    // The billable fact is durable even though the cleanup failed.
    assert_eq!(backoffice.delivery_quantity(anil.id, day), Some(1.5));
    assert_eq!(store.rows(collections::DELIVERIES).len(), 1);
    assert_eq!(store.rows(collections::PENDING_DELIVERIES).len(), 1);

    // Approval is idempotent per date, so re-running finishes the job.
    let approved = backoffice.approve_date(day).await.unwrap();
    assert_eq!(approved, 1);
    assert!(store.rows(collections::PENDING_DELIVERIES).is_empty());
    assert_eq!(store.rows(collections::DELIVERIES).len(), 1);
}

#[tokio::test]
async fn approval_requires_an_authenticated_principal() {
    let (mut backoffice, _store) = spawn_backoffice();
    backoffice.set_principal(None);

    let err = backoffice.approve_date(date(2024, 3, 1)).await.unwrap_err();
    assert!(matches!(err, AppError::Unauthorized(_)), "got {:?}", err);
}
