use chrono::NaiveDate;
use engine::{
    EngineError, ExpenseShare, ExpenseType, MoneyCents, NewExpenseCmd, PayShareCmd,
    PaymentMethod, SplitMethod,
};
use uuid::Uuid;

mod common;
use common::*;

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2030, 1, d).unwrap()
}

fn share_of(shares: &[ExpenseShare], user_id: Uuid) -> &ExpenseShare {
    shares.iter().find(|s| s.user_id == user_id).unwrap()
}

#[tokio::test]
async fn check_in_and_out_record_the_trip() {
    let (engine, _db) = engine_with_db().await;
    let owner = co_owner(&engine, "owner").await;
    let anna = co_owner(&engine, "anna").await;
    let bruno = co_owner(&engine, "bruno").await;
    let outsider = co_owner(&engine, "outsider").await;
    let sam = staff(&engine, "sam").await;

    let group = group_with(&engine, &owner, "Family", &[(&anna, 0.5), (&bruno, 0.5)]).await;
    let car = vehicle_in(&engine, &owner, &group, "VIN0001").await;
    let booking = engine
        .create_booking(&anna, car.id, at(1, 0), at(1, 2))
        .await
        .unwrap();

    assert!(matches!(
        engine.check_in(&anna, booking.id, 12_000).await,
        Err(EngineError::Forbidden(_))
    ));
    assert!(matches!(
        engine.check_in(&sam, booking.id, -1).await,
        Err(EngineError::InvalidInput(_))
    ));

    let history = engine.check_in(&sam, booking.id, 12_000).await.unwrap();
    assert_eq!(history.user_id, anna.user_id);
    assert_eq!(history.vehicle_id, car.id);
    assert_eq!(history.start_time, booking.start_time);
    assert_eq!(history.checked_in_by, sam.user_id);
    assert!(!history.check_in_qr.is_empty());
    assert_eq!(history.distance, None);

    assert!(matches!(
        engine.check_in(&sam, booking.id, 12_000).await,
        Err(EngineError::Conflict(_))
    ));
    assert!(matches!(
        engine.check_out(&sam, history.id, 11_999, None).await,
        Err(EngineError::InvalidInput(_))
    ));

    let done = engine
        .check_out(&sam, history.id, 12_085, Some("  charged to 80% "))
        .await
        .unwrap();
    assert_eq!(done.end_odometer, Some(12_085));
    assert_eq!(done.distance, Some(85));
    assert_eq!(done.notes.as_deref(), Some("charged to 80%"));
    assert_eq!(done.checked_out_by, Some(sam.user_id));
    assert!(done.check_out_qr.is_some());
    assert!(matches!(
        engine.check_out(&sam, history.id, 12_100, None).await,
        Err(EngineError::Conflict(_))
    ));

    // The driver, group members and staff can read it.
    assert_eq!(engine.get_history(&anna, history.id).await.unwrap(), done);
    assert!(engine.get_history(&bruno, history.id).await.is_ok());
    assert!(matches!(
        engine.get_history(&outsider, history.id).await,
        Err(EngineError::Forbidden(_))
    ));
    assert_eq!(engine.list_my_history(&anna).await.unwrap(), vec![done.clone()]);
    assert_eq!(engine.list_vehicle_history(&owner, car.id).await.unwrap(), vec![done]);
    assert!(matches!(
        engine.list_user_history(&bruno, anna.user_id).await,
        Err(EngineError::Forbidden(_))
    ));
    assert_eq!(
        engine
            .list_user_history(&sam, anna.user_id)
            .await
            .unwrap()
            .len(),
        1
    );
}

#[tokio::test]
async fn cancelled_bookings_cannot_be_checked_in() {
    let (engine, _db) = engine_with_db().await;
    let owner = co_owner(&engine, "owner").await;
    let anna = co_owner(&engine, "anna").await;
    let sam = staff(&engine, "sam").await;

    let group = group_with(&engine, &owner, "Family", &[(&anna, 1.0)]).await;
    let car = vehicle_in(&engine, &owner, &group, "VIN0001").await;
    let booking = engine
        .create_booking(&anna, car.id, at(1, 0), at(1, 2))
        .await
        .unwrap();
    engine.cancel_booking(&anna, booking.id).await.unwrap();

    assert!(matches!(
        engine.check_in(&sam, booking.id, 100).await,
        Err(EngineError::Conflict(_))
    ));
    assert!(matches!(
        engine.check_in(&sam, Uuid::new_v4(), 100).await,
        Err(EngineError::KeyNotFound(_))
    ));
}

#[tokio::test]
async fn group_financial_report_sums_the_range() {
    let (engine, _db) = engine_with_db().await;
    let owner = co_owner(&engine, "owner").await;
    let anna = co_owner(&engine, "anna").await;
    let outsider = co_owner(&engine, "outsider").await;
    let sam = staff(&engine, "sam").await;

    let group = group_with(&engine, &owner, "Family", &[(&anna, 1.0)]).await;
    for (kind, cents, date) in [
        (ExpenseType::Charging, 10_000, day(3)),
        (ExpenseType::Maintenance, 5_000, day(5)),
        (ExpenseType::Charging, 2_500, day(9)),
        (ExpenseType::Other, 1_000, day(20)),
    ] {
        engine
            .create_expense(
                &anna,
                NewExpenseCmd::new(group.id, kind, MoneyCents::new(cents), date, SplitMethod::Equal),
            )
            .await
            .unwrap();
    }

    let report = engine
        .group_financial_report(&anna, group.id, day(1), day(10))
        .await
        .unwrap();
    assert_eq!(report.group_name, "Family");
    assert_eq!(report.total, MoneyCents::new(17_500));
    assert_eq!(
        report.by_type,
        vec![
            (ExpenseType::Charging, MoneyCents::new(12_500)),
            (ExpenseType::Maintenance, MoneyCents::new(5_000)),
        ]
    );
    assert_eq!(report.expense_count, 3);
    assert_eq!(report.pending_count, 3);
    assert_eq!(report.paid_count, 0);

    // Both bounds are inclusive.
    let single = engine
        .group_financial_report(&sam, group.id, day(20), day(20))
        .await
        .unwrap();
    assert_eq!(single.total, MoneyCents::new(1_000));

    assert!(matches!(
        engine
            .group_financial_report(&anna, group.id, day(10), day(1))
            .await,
        Err(EngineError::InvalidRange(_))
    ));
    assert!(matches!(
        engine
            .group_financial_report(&outsider, group.id, day(1), day(10))
            .await,
        Err(EngineError::Forbidden(_))
    ));
}

#[tokio::test]
async fn user_expense_report_tracks_owed_and_paid() {
    let (engine, _db) = engine_with_db().await;
    let owner = co_owner(&engine, "owner").await;
    let anna = co_owner(&engine, "anna").await;
    let bruno = co_owner(&engine, "bruno").await;
    let sam = staff(&engine, "sam").await;

    let group = group_with(&engine, &owner, "Family", &[(&anna, 0.6), (&bruno, 0.4)]).await;
    let mut first_share = None;
    for (cents, date) in [(10_000, day(3)), (5_000, day(5)), (1_000, day(20))] {
        let created = engine
            .create_expense(
                &anna,
                NewExpenseCmd::new(
                    group.id,
                    ExpenseType::Charging,
                    MoneyCents::new(cents),
                    date,
                    SplitMethod::ByOwnership,
                ),
            )
            .await
            .unwrap();
        first_share.get_or_insert(share_of(&created.shares, anna.user_id).id);
    }
    engine
        .pay_share(
            &anna,
            PayShareCmd::new(first_share.unwrap(), MoneyCents::new(6_000), PaymentMethod::Cash),
        )
        .await
        .unwrap();

    let all = engine
        .user_expense_report(&anna, anna.user_id, None, None)
        .await
        .unwrap();
    assert_eq!(all.total_owed, MoneyCents::new(9_600));
    assert_eq!(all.total_paid, MoneyCents::new(6_000));
    assert_eq!(all.total_pending, MoneyCents::new(3_600));
    assert_eq!(all.share_count, 3);
    assert_eq!(all.paid_count, 1);
    assert_eq!(all.pending_count, 2);

    let january_start = engine
        .user_expense_report(&sam, anna.user_id, Some(day(1)), Some(day(10)))
        .await
        .unwrap();
    assert_eq!(january_start.total_owed, MoneyCents::new(9_000));
    assert_eq!(january_start.share_count, 2);

    let from_only = engine
        .user_expense_report(&anna, anna.user_id, Some(day(4)), None)
        .await
        .unwrap();
    assert_eq!(from_only.total_owed, MoneyCents::new(3_600));

    assert!(matches!(
        engine
            .user_expense_report(&bruno, anna.user_id, None, None)
            .await,
        Err(EngineError::Forbidden(_))
    ));
    assert!(matches!(
        engine
            .user_expense_report(&anna, anna.user_id, Some(day(10)), Some(day(1)))
            .await,
        Err(EngineError::InvalidRange(_))
    ));
}

#[tokio::test]
async fn usage_report_flags_unfair_members() {
    let (engine, db) = engine_with_db().await;
    let owner = co_owner(&engine, "owner").await;
    let anna = co_owner(&engine, "anna").await;
    let bruno = co_owner(&engine, "bruno").await;
    let carla = co_owner(&engine, "carla").await;
    let sam = staff(&engine, "sam").await;

    let group = group_with(
        &engine,
        &owner,
        "Family",
        &[(&anna, 0.5), (&bruno, 0.3), (&carla, 0.2)],
    )
    .await;
    let car = vehicle_in(&engine, &owner, &group, "VIN0001").await;

    // Anna drives 3h and Bruno 1h. Carla books 8h but never picks the car up.
    let anna_trip = engine
        .create_booking(&anna, car.id, at(1, 0), at(1, 3))
        .await
        .unwrap();
    let bruno_trip = engine
        .create_booking(&bruno, car.id, at(2, 0), at(2, 1))
        .await
        .unwrap();
    engine
        .create_booking(&carla, car.id, at(3, 0), at(3, 8))
        .await
        .unwrap();
    engine.check_in(&sam, anna_trip.id, 1_000).await.unwrap();
    engine.check_in(&sam, bruno_trip.id, 1_200).await.unwrap();

    let later = engine_at(&db, || at(6, 0)).await;
    let report = later.usage_vs_ownership(&owner, group.id).await.unwrap();
    assert_eq!(report.group_usage_minutes, 240);
    assert_eq!(report.members.len(), 3);

    let member = |id: Uuid| report.members.iter().find(|m| m.user_id == id).unwrap();

    let anna_row = member(anna.user_id);
    assert_eq!(anna_row.usage_minutes, 180);
    assert!((anna_row.ownership_pct - 50.0).abs() < 1e-9);
    assert!((anna_row.usage_pct - 75.0).abs() < 1e-9);
    assert!((anna_row.difference + 25.0).abs() < 1e-9);
    assert!(!anna_row.is_fair);

    let bruno_row = member(bruno.user_id);
    assert!((bruno_row.difference - 5.0).abs() < 1e-9);
    assert!(bruno_row.is_fair);

    let carla_row = member(carla.user_id);
    assert_eq!(carla_row.usage_minutes, 0);
    assert!((carla_row.difference - 20.0).abs() < 1e-9);
    assert!(!carla_row.is_fair);

    // Booking priority still looks at confirmed bookings, Carla's included.
    let carla_prio = later.booking_priority(&carla, group.id).await.unwrap();
    assert_eq!(carla_prio.user_usage_minutes, 480);

    // Recorded trips older than 30 days drop out of the report.
    let much_later = engine_at(&db, || at(40, 0)).await;
    let stale = much_later.usage_vs_ownership(&owner, group.id).await.unwrap();
    assert_eq!(stale.group_usage_minutes, 0);
}

#[tokio::test]
async fn usage_report_without_usage_is_all_zero() {
    let (engine, _db) = engine_with_db().await;
    let owner = co_owner(&engine, "owner").await;
    let anna = co_owner(&engine, "anna").await;
    let outsider = co_owner(&engine, "outsider").await;

    let group = group_with(&engine, &owner, "Family", &[(&anna, 1.0)]).await;
    let report = engine.usage_vs_ownership(&anna, group.id).await.unwrap();
    assert_eq!(report.group_usage_minutes, 0);
    assert_eq!(report.members[0].usage_pct, 0.0);
    assert!((report.members[0].difference - 100.0).abs() < 1e-9);

    assert!(matches!(
        engine.usage_vs_ownership(&outsider, group.id).await,
        Err(EngineError::Forbidden(_))
    ));
}
