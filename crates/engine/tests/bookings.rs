use chrono::Duration;
use engine::{BookingStatus, EngineError, PriorityLevel};

mod common;
use common::*;

#[tokio::test]
async fn overlapping_bookings_conflict() {
    let (engine, _db) = engine_with_db().await;
    let owner = co_owner(&engine, "owner").await;
    let anna = co_owner(&engine, "anna").await;
    let bruno = co_owner(&engine, "bruno").await;

    let group = group_with(&engine, &owner, "Family", &[(&anna, 0.5), (&bruno, 0.5)]).await;
    let car = vehicle_in(&engine, &owner, &group, "VIN0001").await;

    let first = engine
        .create_booking(&anna, car.id, at(1, 0), at(1, 3))
        .await
        .unwrap();
    assert_eq!(first.status, BookingStatus::Confirmed);
    assert_eq!(first.group_id, group.id);

    assert!(matches!(
        engine.create_booking(&bruno, car.id, at(1, 2), at(1, 4)).await,
        Err(EngineError::Conflict(_))
    ));
    // Touching intervals do not overlap.
    engine
        .create_booking(&bruno, car.id, at(1, 3), at(1, 5))
        .await
        .unwrap();

    engine.cancel_booking(&anna, first.id).await.unwrap();
    engine
        .create_booking(&bruno, car.id, at(1, 0), at(1, 2))
        .await
        .unwrap();

    let schedule = engine.list_vehicle_bookings(&anna, car.id).await.unwrap();
    assert_eq!(schedule.len(), 3);
    assert!(schedule.windows(2).all(|w| w[0].start_time <= w[1].start_time));
}

#[tokio::test]
async fn bookings_must_be_valid_future_ranges() {
    let (engine, _db) = engine_with_db().await;
    let owner = co_owner(&engine, "owner").await;
    let anna = co_owner(&engine, "anna").await;
    let outsider = co_owner(&engine, "outsider").await;

    let group = group_with(&engine, &owner, "Family", &[(&anna, 1.0)]).await;
    let car = vehicle_in(&engine, &owner, &group, "VIN0001").await;

    assert!(matches!(
        engine.create_booking(&anna, car.id, at(1, 3), at(1, 1)).await,
        Err(EngineError::InvalidRange(_))
    ));
    assert!(matches!(
        engine.create_booking(&anna, car.id, at(1, 1), at(1, 1)).await,
        Err(EngineError::InvalidRange(_))
    ));
    assert!(matches!(
        engine
            .create_booking(&anna, car.id, t0() - Duration::hours(1), at(0, 1))
            .await,
        Err(EngineError::InvalidInput(_))
    ));
    assert!(matches!(
        engine.create_booking(&outsider, car.id, at(1, 0), at(1, 1)).await,
        Err(EngineError::Forbidden(_))
    ));
}

#[tokio::test]
async fn cancel_rules() {
    let (engine, db) = engine_with_db().await;
    let owner = co_owner(&engine, "owner").await;
    let anna = co_owner(&engine, "anna").await;
    let bruno = co_owner(&engine, "bruno").await;

    let group = group_with(&engine, &owner, "Family", &[(&anna, 0.5), (&bruno, 0.5)]).await;
    let car = vehicle_in(&engine, &owner, &group, "VIN0001").await;
    let booking = engine
        .create_booking(&anna, car.id, at(1, 0), at(1, 2))
        .await
        .unwrap();

    assert!(matches!(
        engine.cancel_booking(&bruno, booking.id).await,
        Err(EngineError::Forbidden(_))
    ));

    let later = engine_at(&db, || at(1, 1)).await;
    assert!(matches!(
        later.cancel_booking(&anna, booking.id).await,
        Err(EngineError::Conflict(_))
    ));

    let cancelled = engine.cancel_booking(&anna, booking.id).await.unwrap();
    assert_eq!(cancelled.status, BookingStatus::Cancelled);
    assert!(matches!(
        engine.cancel_booking(&anna, booking.id).await,
        Err(EngineError::Conflict(_))
    ));
}

#[tokio::test]
async fn staff_moves_bookings_along_the_lifecycle() {
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

    assert!(matches!(
        engine
            .update_booking_status(&anna, booking.id, BookingStatus::Cancelled)
            .await,
        Err(EngineError::Forbidden(_))
    ));
    assert!(matches!(
        engine
            .update_booking_status(&sam, booking.id, BookingStatus::Pending)
            .await,
        Err(EngineError::Conflict(_))
    ));
    let booking = engine
        .update_booking_status(&sam, booking.id, BookingStatus::Cancelled)
        .await
        .unwrap();
    assert_eq!(booking.status, BookingStatus::Cancelled);
}

#[tokio::test]
async fn booking_reads_follow_group_access() {
    let (engine, _db) = engine_with_db().await;
    let owner = co_owner(&engine, "owner").await;
    let anna = co_owner(&engine, "anna").await;
    let outsider = co_owner(&engine, "outsider").await;
    let root = admin(&engine, "root").await;

    let group = group_with(&engine, &owner, "Family", &[(&anna, 1.0)]).await;
    let car = vehicle_in(&engine, &owner, &group, "VIN0001").await;
    let booking = engine
        .create_booking(&anna, car.id, at(1, 0), at(1, 2))
        .await
        .unwrap();

    assert_eq!(engine.get_booking(&owner, booking.id).await.unwrap(), booking);
    assert!(matches!(
        engine.get_booking(&outsider, booking.id).await,
        Err(EngineError::Forbidden(_))
    ));
    assert_eq!(engine.list_my_bookings(&anna).await.unwrap(), vec![booking]);
    assert!(engine.list_my_bookings(&owner).await.unwrap().is_empty());

    assert!(matches!(
        engine.list_all_bookings(&anna).await,
        Err(EngineError::Forbidden(_))
    ));
    assert_eq!(engine.list_all_bookings(&root).await.unwrap().len(), 1);
}

#[tokio::test]
async fn priority_compares_ownership_with_recent_usage() {
    let (engine, db) = engine_with_db().await;
    let owner = co_owner(&engine, "owner").await;
    let anna = co_owner(&engine, "anna").await;
    let bruno = co_owner(&engine, "bruno").await;

    let group = group_with(&engine, &owner, "Family", &[(&anna, 0.5), (&bruno, 0.5)]).await;
    let car = vehicle_in(&engine, &owner, &group, "VIN0001").await;

    // Without usage the score is the ownership share.
    let fresh = engine.booking_priority(&anna, group.id).await.unwrap();
    assert!((fresh.score - 0.5).abs() < 1e-9);
    assert_eq!(fresh.level, PriorityLevel::High);

    // Anna drives 3 hours, Bruno 1 hour.
    engine
        .create_booking(&anna, car.id, at(1, 0), at(1, 3))
        .await
        .unwrap();
    engine
        .create_booking(&bruno, car.id, at(2, 0), at(2, 1))
        .await
        .unwrap();

    let later = engine_at(&db, || at(5, 0)).await;
    let anna_prio = later.booking_priority(&anna, group.id).await.unwrap();
    assert_eq!(anna_prio.user_usage_minutes, 180);
    assert_eq!(anna_prio.group_usage_minutes, 240);
    assert!((anna_prio.score - (0.5 - 0.75)).abs() < 1e-9);
    assert_eq!(anna_prio.level, PriorityLevel::Low);

    let bruno_prio = later.booking_priority(&bruno, group.id).await.unwrap();
    assert!((bruno_prio.score - 0.25).abs() < 1e-9);
    assert_eq!(bruno_prio.level, PriorityLevel::High);

    // The owner holds no share and has not driven.
    let owner_prio = later.booking_priority(&owner, group.id).await.unwrap();
    assert_eq!(owner_prio.ownership_pct, 0.0);
    assert_eq!(owner_prio.level, PriorityLevel::Medium);

    // Past the 30 day window the usage no longer counts.
    let much_later = engine_at(&db, || at(40, 0)).await;
    let anna_prio = much_later.booking_priority(&anna, group.id).await.unwrap();
    assert_eq!(anna_prio.group_usage_minutes, 0);
}
