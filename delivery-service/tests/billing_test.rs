//! Billing reconciliation integration tests.

mod common;

use backoffice_core::error::AppError;
use common::{assert_close, date, seed_customer, spawn_backoffice};
use delivery_service::models::UpdateCustomer;
use delivery_service::services::{BillStatus, DateRange};
use uuid::Uuid;

#[tokio::test]
async fn month_with_two_deliveries_bills_quantity_times_current_price() {
    let (mut backoffice, _store) = spawn_backoffice();
    let anil = seed_customer(&mut backoffice, "Anil", 90.0, 1.0).await;

    backoffice
        .record_delivery(anil.id, date(2024, 1, 5), 1.0)
        .await
        .unwrap();
    backoffice
        .record_delivery(anil.id, date(2024, 1, 20), 0.5)
        .await
        .unwrap();

    let balance = backoffice
        .customer_monthly_balance(anil.id, 2024, 1)
        .unwrap();
    assert_close(balance.billed, 135.0, "billed");
    assert_close(balance.paid, 0.0, "paid");
    assert_close(balance.outstanding, 135.0, "outstanding");
    assert_eq!(balance.status, BillStatus::Pending);
}

#[tokio::test]
async fn status_classification_follows_payments() {
    let (mut backoffice, _store) = spawn_backoffice();
    let anil = seed_customer(&mut backoffice, "Anil", 90.0, 1.0).await;
    backoffice
        .record_delivery(anil.id, date(2024, 1, 5), 1.0)
        .await
        .unwrap();
    backoffice
        .record_delivery(anil.id, date(2024, 1, 20), 0.5)
        .await
        .unwrap();

    // Partial payment
    backoffice
        .record_payment(anil.id, date(2024, 1, 25), 100.0)
        .await
        .unwrap();
    let balance = backoffice
        .customer_monthly_balance(anil.id, 2024, 1)
        .unwrap();
    assert_eq!(balance.status, BillStatus::PartiallyPaid);
    assert_close(balance.outstanding, 35.0, "outstanding after 100");

    // Settle the rest; several payments in a month (or a day) are legal.
    backoffice
        .record_payment(anil.id, date(2024, 1, 25), 35.0)
        .await
        .unwrap();
    let balance = backoffice
        .customer_monthly_balance(anil.id, 2024, 1)
        .unwrap();
    assert_eq!(balance.status, BillStatus::Paid);

    // Anything on top is an overpayment.
    backoffice
        .record_payment(anil.id, date(2024, 1, 28), 20.0)
        .await
        .unwrap();
    let balance = backoffice
        .customer_monthly_balance(anil.id, 2024, 1)
        .unwrap();
    assert_eq!(balance.status, BillStatus::Overpaid);
}

#[tokio::test]
async fn no_deliveries_means_no_bill_regardless_of_payments() {
    let (mut backoffice, _store) = spawn_backoffice();
    let anil = seed_customer(&mut backoffice, "Anil", 90.0, 1.0).await;

    backoffice
        .record_payment(anil.id, date(2024, 2, 10), 500.0)
        .await
        .unwrap();

    let balance = backoffice
        .customer_monthly_balance(anil.id, 2024, 2)
        .unwrap();
    assert_eq!(balance.status, BillStatus::NoBill);
    assert_close(balance.billed, 0.0, "billed");
}

#[tokio::test]
async fn billed_is_additive_across_disjoint_ranges() {
    let (mut backoffice, _store) = spawn_backoffice();
    let anil = seed_customer(&mut backoffice, "Anil", 90.0, 1.0).await;

    backoffice
        .record_delivery(anil.id, date(2024, 1, 10), 1.0)
        .await
        .unwrap();
    backoffice
        .record_delivery(anil.id, date(2024, 1, 31), 0.5)
        .await
        .unwrap();
    backoffice
        .record_delivery(anil.id, date(2024, 2, 1), 2.0)
        .await
        .unwrap();

    let jan = backoffice
        .customer_monthly_balance(anil.id, 2024, 1)
        .unwrap();
    let feb = backoffice
        .customer_monthly_balance(anil.id, 2024, 2)
        .unwrap();
    let both = backoffice
        .customer_balance(
            anil.id,
            DateRange::new(date(2024, 1, 1), date(2024, 2, 29)),
        )
        .unwrap();

    assert_close(jan.billed + feb.billed, both.billed, "billed additivity");
}

#[tokio::test]
async fn billing_uses_the_current_price_not_a_historical_one() {
    let (mut backoffice, _store) = spawn_backoffice();
    let anil = seed_customer(&mut backoffice, "Anil", 90.0, 1.0).await;
    backoffice
        .record_delivery(anil.id, date(2024, 1, 5), 1.0)
        .await
        .unwrap();

    backoffice
        .update_customer(
            anil.id,
            UpdateCustomer {
                milk_price: Some(100.0),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let balance = backoffice
        .customer_monthly_balance(anil.id, 2024, 1)
        .unwrap();
    assert_close(balance.billed, 100.0, "repriced retroactively");
}

#[tokio::test]
async fn total_outstanding_ignores_carried_forward_balances() {
    let (mut backoffice, _store) = spawn_backoffice();
    let anil = seed_customer(&mut backoffice, "Anil", 90.0, 1.0).await;
    let beth = seed_customer(&mut backoffice, "Beth", 80.0, 1.0).await;

    backoffice
        .update_customer(
            anil.id,
            UpdateCustomer {
                previous_balance: Some(999.0),
                balance_as_of_date: Some(Some(date(2023, 12, 31))),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    backoffice
        .record_delivery(anil.id, date(2024, 1, 5), 1.0)
        .await
        .unwrap();
    backoffice
        .record_delivery(beth.id, date(2024, 1, 5), 2.0)
        .await
        .unwrap();
    backoffice
        .record_payment(beth.id, date(2024, 1, 6), 60.0)
        .await
        .unwrap();

    // 90 + 160 - 60; the 999 carried balance is display-only.
    assert_close(backoffice.total_outstanding(), 190.0, "global outstanding");

    let balance = backoffice
        .customer_monthly_balance(anil.id, 2024, 1)
        .unwrap();
    assert_close(balance.previous_balance, 999.0, "carried for display");
    assert_close(balance.outstanding, 90.0, "not folded in");
}

#[tokio::test]
async fn daily_summary_reports_distinct_customers_and_quantity() {
    let (mut backoffice, _store) = spawn_backoffice();
    let anil = seed_customer(&mut backoffice, "Anil", 90.0, 1.0).await;
    let beth = seed_customer(&mut backoffice, "Beth", 80.0, 1.0).await;
    let day = date(2024, 3, 1);

    backoffice.record_delivery(anil.id, day, 1.5).await.unwrap();
    backoffice.record_delivery(beth.id, day, 0.5).await.unwrap();
    backoffice
        .record_delivery(anil.id, date(2024, 3, 2), 1.0)
        .await
        .unwrap();
    backoffice.record_payment(anil.id, day, 50.0).await.unwrap();

    let summary = backoffice.daily_summary(day);
    assert_eq!(summary.customers_served, 2);
    assert_close(summary.total_quantity, 2.0, "quantity for the day");
    assert_close(summary.billed, 1.5 * 90.0 + 0.5 * 80.0, "billed for the day");
    assert_close(summary.paid, 50.0, "paid for the day");
}

#[tokio::test]
async fn monthly_summary_restricts_to_the_month() {
    let (mut backoffice, _store) = spawn_backoffice();
    let anil = seed_customer(&mut backoffice, "Anil", 90.0, 1.0).await;

    backoffice
        .record_delivery(anil.id, date(2024, 3, 10), 1.0)
        .await
        .unwrap();
    backoffice
        .record_delivery(anil.id, date(2024, 4, 1), 1.0)
        .await
        .unwrap();

    let summary = backoffice.monthly_summary(2024, 3).unwrap();
    assert_eq!(summary.customers_served, 1);
    assert_close(summary.total_quantity, 1.0, "march only");
    assert_close(summary.billed, 90.0, "march billed");

    assert!(matches!(
        backoffice.monthly_summary(2024, 13),
        Err(AppError::BadRequest(_))
    ));
}

#[tokio::test]
async fn balance_for_unknown_customer_is_not_found() {
    let (backoffice, _store) = spawn_backoffice();
    let err = backoffice
        .customer_balance(
            Uuid::new_v4(),
            DateRange::new(date(2024, 1, 1), date(2024, 1, 31)),
        )
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)), "got {:?}", err);
}
