//! Pending delivery queue integration tests.

mod common;

use backoffice_core::error::AppError;
use common::{date, seed_customer, spawn_backoffice, staff};
use delivery_service::store::collections;

#[tokio::test]
async fn resubmission_overwrites_included_customers_only() {
    let (mut backoffice, store) = spawn_backoffice();
    let anil = seed_customer(&mut backoffice, "Anil", 90.0, 1.0).await;
    let beth = seed_customer(&mut backoffice, "Beth", 80.0, 1.0).await;
    let day = date(2024, 3, 1);

    backoffice
        .submit_batch(day, &[(anil.id, 1.0), (beth.id, 2.0)])
        .await
        .unwrap();
    backoffice
        .submit_batch(day, &[(anil.id, 1.5)])
        .await
        .unwrap();

    assert_eq!(backoffice.pending_quantity(anil.id, day), Some(1.5));
    assert_eq!(
        backoffice.pending_quantity(beth.id, day),
        Some(2.0),
        "customers left out of the batch keep their value"
    );
    // still one row per (customer, date)
    assert_eq!(store.rows(collections::PENDING_DELIVERIES).len(), 2);
}

#[tokio::test]
async fn pending_dates_report_counts_oldest_first() {
    let (mut backoffice, _store) = spawn_backoffice();
    let anil = seed_customer(&mut backoffice, "Anil", 90.0, 1.0).await;
    let beth = seed_customer(&mut backoffice, "Beth", 80.0, 1.0).await;

    backoffice
        .submit_batch(date(2024, 3, 2), &[(anil.id, 1.0), (beth.id, 0.5)])
        .await
        .unwrap();
    backoffice
        .submit_batch(date(2024, 3, 1), &[(anil.id, 1.0)])
        .await
        .unwrap();

    assert_eq!(
        backoffice.pending_dates(),
        vec![(date(2024, 3, 1), 1), (date(2024, 3, 2), 2)]
    );
    assert_eq!(backoffice.pending_for_date(date(2024, 3, 2)).len(), 2);
}

#[tokio::test]
async fn submissions_are_attributed_to_the_acting_staff() {
    let (mut backoffice, _store) = spawn_backoffice();
    let anil = seed_customer(&mut backoffice, "Anil", 90.0, 1.0).await;

    let submitter = staff();
    let submitter_id = submitter.user_id;
    backoffice.set_principal(Some(submitter));
    backoffice
        .submit_batch(date(2024, 3, 1), &[(anil.id, 1.0)])
        .await
        .unwrap();

    assert_eq!(backoffice.pending()[0].created_by, Some(submitter_id));
}

#[tokio::test]
async fn negative_quantity_rejects_the_batch_untouched() {
    let (mut backoffice, store) = spawn_backoffice();
    let anil = seed_customer(&mut backoffice, "Anil", 90.0, 1.0).await;
    let beth = seed_customer(&mut backoffice, "Beth", 80.0, 1.0).await;
    let day = date(2024, 3, 1);

    let err = backoffice
        .submit_batch(day, &[(anil.id, 1.0), (beth.id, -0.5)])
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::BadRequest(_)), "got {:?}", err);
    assert!(backoffice.pending().is_empty());
    assert!(store.rows(collections::PENDING_DELIVERIES).is_empty());
}

#[tokio::test]
async fn empty_batch_is_a_no_op() {
    let (mut backoffice, store) = spawn_backoffice();

    let submitted = backoffice
        .submit_batch(date(2024, 3, 1), &[])
        .await
        .unwrap();

    assert_eq!(submitted, 0);
    assert!(store.rows(collections::PENDING_DELIVERIES).is_empty());
}
