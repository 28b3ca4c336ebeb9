use chrono::NaiveDate;
use engine::{
    EngineError, ExpenseShare, ExpenseStatus, ExpenseType, FundMovementCmd, FundTransactionKind,
    FundType, MoneyCents, NewExpenseCmd, NewFundCmd, PayShareCmd, PaymentMethod, PaymentStatus,
    ShareStatus, SplitMethod,
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
async fn expense_is_split_by_ownership() {
    let (engine, _db) = engine_with_db().await;
    let owner = co_owner(&engine, "owner").await;
    let anna = co_owner(&engine, "anna").await;
    let bruno = co_owner(&engine, "bruno").await;

    let group = group_with(&engine, &owner, "Family", &[(&anna, 0.6), (&bruno, 0.4)]).await;
    let car = vehicle_in(&engine, &owner, &group, "VIN0001").await;

    let created = engine
        .create_expense(
            &anna,
            NewExpenseCmd::new(
                group.id,
                ExpenseType::Charging,
                MoneyCents::new(10_000),
                day(5),
                SplitMethod::ByOwnership,
            )
            .vehicle_id(car.id)
            .description("  Fast charger  "),
        )
        .await
        .unwrap();

    assert_eq!(created.expense.status, ExpenseStatus::Pending);
    assert_eq!(created.expense.description.as_deref(), Some("Fast charger"));
    assert_eq!(created.shares.len(), 2);
    assert_eq!(share_of(&created.shares, anna.user_id).amount, MoneyCents::new(6_000));
    assert_eq!(share_of(&created.shares, bruno.user_id).amount, MoneyCents::new(4_000));
    assert!(
        created
            .shares
            .iter()
            .all(|s| s.status == ShareStatus::Pending && s.paid == MoneyCents::ZERO)
    );

    let stored = engine
        .list_expense_shares(&owner, created.expense.id)
        .await
        .unwrap();
    let total: i64 = stored.iter().map(|s| s.amount.cents()).sum();
    assert_eq!(total, 10_000);
}

#[tokio::test]
async fn equal_split_gives_everyone_the_rounded_amount() {
    let (engine, _db) = engine_with_db().await;
    let owner = co_owner(&engine, "owner").await;
    let anna = co_owner(&engine, "anna").await;
    let bruno = co_owner(&engine, "bruno").await;
    let carla = co_owner(&engine, "carla").await;

    let group = group_with(
        &engine,
        &owner,
        "Family",
        &[(&anna, 0.5), (&bruno, 0.3), (&carla, 0.2)],
    )
    .await;

    let created = engine
        .create_expense(
            &bruno,
            NewExpenseCmd::new(
                group.id,
                ExpenseType::Cleaning,
                MoneyCents::new(10_000),
                day(5),
                SplitMethod::Equal,
            ),
        )
        .await
        .unwrap();

    assert!(
        created
            .shares
            .iter()
            .all(|s| s.amount == MoneyCents::new(3_333))
    );
}

#[tokio::test]
async fn partially_owned_group_splits_by_ownership() {
    let (engine, _db) = engine_with_db().await;
    let owner = co_owner(&engine, "owner").await;
    let anna = co_owner(&engine, "anna").await;
    let bruno = co_owner(&engine, "bruno").await;

    let group = group_with(&engine, &owner, "Family", &[(&anna, 0.5), (&bruno, 0.3)]).await;
    let created = engine
        .create_expense(
            &anna,
            NewExpenseCmd::new(
                group.id,
                ExpenseType::Maintenance,
                MoneyCents::new(10_000),
                day(5),
                SplitMethod::ByOwnership,
            ),
        )
        .await
        .unwrap();

    assert_eq!(share_of(&created.shares, anna.user_id).amount, MoneyCents::new(5_000));
    assert_eq!(share_of(&created.shares, bruno.user_id).amount, MoneyCents::new(3_000));
    assert_eq!(created.expense.amount, MoneyCents::new(10_000));
}

#[tokio::test]
async fn expense_preconditions() {
    let (engine, _db) = engine_with_db().await;
    let owner = co_owner(&engine, "owner").await;
    let anna = co_owner(&engine, "anna").await;
    let outsider = co_owner(&engine, "outsider").await;

    let empty = engine.create_group(&owner, "Empty").await.unwrap();
    let cmd = |group_id: Uuid, method: SplitMethod| {
        NewExpenseCmd::new(
            group_id,
            ExpenseType::Insurance,
            MoneyCents::new(50_000),
            day(2),
            method,
        )
    };

    // Nobody to split with.
    assert!(matches!(
        engine.create_expense(&owner, cmd(empty.id, SplitMethod::Equal)).await,
        Err(EngineError::InvalidInput(_))
    ));

    let half = group_with(&engine, &owner, "Half", &[(&anna, 0.5)]).await;
    engine
        .create_expense(&anna, cmd(half.id, SplitMethod::Equal))
        .await
        .unwrap();

    assert!(matches!(
        engine
            .create_expense(&outsider, cmd(half.id, SplitMethod::Equal))
            .await,
        Err(EngineError::Forbidden(_))
    ));

    let mut zero = cmd(half.id, SplitMethod::Equal);
    zero.amount = MoneyCents::ZERO;
    assert!(matches!(
        engine.create_expense(&anna, zero).await,
        Err(EngineError::InvalidAmount(_))
    ));

    let other = group_with(&engine, &outsider, "Other", &[(&outsider, 1.0)]).await;
    let foreign_car = vehicle_in(&engine, &outsider, &other, "VIN0009").await;
    assert!(matches!(
        engine
            .create_expense(
                &anna,
                cmd(half.id, SplitMethod::Equal).vehicle_id(foreign_car.id)
            )
            .await,
        Err(EngineError::InvalidInput(_))
    ));
}

#[tokio::test]
async fn paying_every_share_settles_an_approved_expense() {
    let (engine, _db) = engine_with_db().await;
    let owner = co_owner(&engine, "owner").await;
    let anna = co_owner(&engine, "anna").await;
    let bruno = co_owner(&engine, "bruno").await;

    let group = group_with(&engine, &owner, "Family", &[(&anna, 0.6), (&bruno, 0.4)]).await;
    let created = engine
        .create_expense(
            &anna,
            NewExpenseCmd::new(
                group.id,
                ExpenseType::Maintenance,
                MoneyCents::new(10_000),
                day(5),
                SplitMethod::ByOwnership,
            ),
        )
        .await
        .unwrap();
    let expense_id = created.expense.id;
    let anna_share = share_of(&created.shares, anna.user_id).id;
    let bruno_share = share_of(&created.shares, bruno.user_id).id;

    // Only the share holder pays, and never more than what is left.
    assert!(matches!(
        engine
            .pay_share(
                &anna,
                PayShareCmd::new(bruno_share, MoneyCents::new(100), PaymentMethod::Cash)
            )
            .await,
        Err(EngineError::Forbidden(_))
    ));
    assert!(matches!(
        engine
            .pay_share(
                &bruno,
                PayShareCmd::new(bruno_share, MoneyCents::new(4_001), PaymentMethod::Cash)
            )
            .await,
        Err(EngineError::InvalidAmount(_))
    ));

    let payment = engine
        .pay_share(
            &bruno,
            PayShareCmd::new(bruno_share, MoneyCents::new(1_500), PaymentMethod::Banking)
                .notes("first half"),
        )
        .await
        .unwrap();
    assert_eq!(payment.status, PaymentStatus::Completed);
    assert!(payment.completed_at.is_some());
    assert!(!payment.transaction_ref.is_empty());

    let shares = engine.list_my_shares(&bruno).await.unwrap();
    assert_eq!(shares[0].status, ShareStatus::Partial);
    assert_eq!(shares[0].remaining(), MoneyCents::new(2_500));

    engine
        .pay_share(
            &bruno,
            PayShareCmd::new(bruno_share, MoneyCents::new(2_500), PaymentMethod::EWallet),
        )
        .await
        .unwrap();
    engine
        .pay_share(
            &anna,
            PayShareCmd::new(anna_share, MoneyCents::new(6_000), PaymentMethod::Cash),
        )
        .await
        .unwrap();

    // Fully paid but not yet approved.
    let expense = engine.get_expense(&owner, expense_id).await.unwrap();
    assert_eq!(expense.status, ExpenseStatus::Pending);

    let expense = engine.approve_expense(&bruno, expense_id).await.unwrap();
    assert_eq!(expense.status, ExpenseStatus::Paid);

    assert_eq!(engine.list_my_payments(&bruno).await.unwrap().len(), 2);
    assert!(matches!(
        engine.delete_expense(&anna, expense_id).await,
        Err(EngineError::Conflict(_))
    ));
}

#[tokio::test]
async fn share_payments_are_visible_to_the_group() {
    let (engine, _db) = engine_with_db().await;
    let owner = co_owner(&engine, "owner").await;
    let anna = co_owner(&engine, "anna").await;
    let bruno = co_owner(&engine, "bruno").await;
    let outsider = co_owner(&engine, "outsider").await;
    let sam = staff(&engine, "sam").await;

    let group = group_with(&engine, &owner, "Family", &[(&anna, 0.6), (&bruno, 0.4)]).await;
    let created = engine
        .create_expense(
            &anna,
            NewExpenseCmd::new(
                group.id,
                ExpenseType::Inspection,
                MoneyCents::new(10_000),
                day(5),
                SplitMethod::ByOwnership,
            ),
        )
        .await
        .unwrap();
    let bruno_share = share_of(&created.shares, bruno.user_id).id;
    let anna_share = share_of(&created.shares, anna.user_id).id;

    let mut paid = Vec::new();
    for cents in [1_000, 500] {
        let payment = engine
            .pay_share(
                &bruno,
                PayShareCmd::new(bruno_share, MoneyCents::new(cents), PaymentMethod::Cash),
            )
            .await
            .unwrap();
        paid.push(payment.id);
    }

    let mut listed: Vec<Uuid> = engine
        .list_share_payments(&bruno, bruno_share)
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.id)
        .collect();
    listed.sort();
    paid.sort();
    assert_eq!(listed, paid);

    assert_eq!(engine.list_share_payments(&anna, bruno_share).await.unwrap().len(), 2);
    assert_eq!(engine.list_share_payments(&sam, bruno_share).await.unwrap().len(), 2);
    assert!(engine.list_share_payments(&anna, anna_share).await.unwrap().is_empty());
    assert!(matches!(
        engine.list_share_payments(&outsider, bruno_share).await,
        Err(EngineError::Forbidden(_))
    ));
    assert!(matches!(
        engine.list_share_payments(&anna, Uuid::new_v4()).await,
        Err(EngineError::KeyNotFound(_))
    ));
}

#[tokio::test]
async fn expense_decisions_and_deletion() {
    let (engine, _db) = engine_with_db().await;
    let owner = co_owner(&engine, "owner").await;
    let anna = co_owner(&engine, "anna").await;
    let bruno = co_owner(&engine, "bruno").await;
    let outsider = co_owner(&engine, "outsider").await;

    let group = group_with(&engine, &owner, "Family", &[(&anna, 0.5), (&bruno, 0.5)]).await;
    let new_expense = || {
        NewExpenseCmd::new(
            group.id,
            ExpenseType::Other,
            MoneyCents::new(2_000),
            day(3),
            SplitMethod::ByUsage,
        )
    };

    let first = engine.create_expense(&anna, new_expense()).await.unwrap();
    assert!(matches!(
        engine.reject_expense(&outsider, first.expense.id).await,
        Err(EngineError::Forbidden(_))
    ));
    let rejected = engine.reject_expense(&bruno, first.expense.id).await.unwrap();
    assert_eq!(rejected.status, ExpenseStatus::Rejected);
    assert!(matches!(
        engine.approve_expense(&bruno, first.expense.id).await,
        Err(EngineError::Conflict(_))
    ));

    let second = engine.create_expense(&anna, new_expense()).await.unwrap();
    assert!(matches!(
        engine.delete_expense(&bruno, second.expense.id).await,
        Err(EngineError::Forbidden(_))
    ));
    engine.delete_expense(&anna, second.expense.id).await.unwrap();
    assert!(matches!(
        engine.get_expense(&anna, second.expense.id).await,
        Err(EngineError::KeyNotFound(_))
    ));
    assert_eq!(engine.list_my_shares(&anna).await.unwrap().len(), 1);
}

#[tokio::test]
async fn staff_overrides_payment_status() {
    let (engine, _db) = engine_with_db().await;
    let owner = co_owner(&engine, "owner").await;
    let anna = co_owner(&engine, "anna").await;
    let bruno = co_owner(&engine, "bruno").await;
    let sam = staff(&engine, "sam").await;

    let group = group_with(&engine, &owner, "Family", &[(&anna, 1.0)]).await;
    let created = engine
        .create_expense(
            &anna,
            NewExpenseCmd::new(
                group.id,
                ExpenseType::Inspection,
                MoneyCents::new(900),
                day(4),
                SplitMethod::Equal,
            ),
        )
        .await
        .unwrap();
    let payment = engine
        .pay_share(
            &anna,
            PayShareCmd::new(created.shares[0].id, MoneyCents::new(900), PaymentMethod::Cash),
        )
        .await
        .unwrap();

    assert!(matches!(
        engine.get_payment(&bruno, payment.id).await,
        Err(EngineError::Forbidden(_))
    ));
    assert!(matches!(
        engine
            .update_payment_status(&anna, payment.id, PaymentStatus::Failed)
            .await,
        Err(EngineError::Forbidden(_))
    ));
    let failed = engine
        .update_payment_status(&sam, payment.id, PaymentStatus::Failed)
        .await
        .unwrap();
    assert_eq!(failed.status, PaymentStatus::Failed);
    assert_eq!(engine.get_payment(&anna, payment.id).await.unwrap(), failed);
}

#[tokio::test]
async fn fund_deposits_and_withdrawals() {
    let (engine, _db) = engine_with_db().await;
    let owner = co_owner(&engine, "owner").await;
    let anna = co_owner(&engine, "anna").await;
    let outsider = co_owner(&engine, "outsider").await;
    let sam = staff(&engine, "sam").await;
    let root = admin(&engine, "root").await;

    let group = group_with(&engine, &owner, "Family", &[(&anna, 1.0)]).await;
    let fund = engine
        .create_fund(
            &anna,
            NewFundCmd {
                group_id: group.id,
                fund_type: FundType::MaintenanceReserve,
                description: Some("tyres".to_string()),
            },
        )
        .await
        .unwrap();
    assert_eq!(fund.balance, MoneyCents::ZERO);

    let fund_after = engine
        .deposit(
            &anna,
            FundMovementCmd::new(fund.id, MoneyCents::new(50_000)).reference("TX-1"),
        )
        .await
        .unwrap();
    assert_eq!(fund_after.balance, MoneyCents::new(50_000));

    assert!(matches!(
        engine
            .withdraw(&owner, FundMovementCmd::new(fund.id, MoneyCents::new(50_001)))
            .await,
        Err(EngineError::InsufficientFunds(_))
    ));
    let fund_after = engine
        .withdraw(
            &owner,
            FundMovementCmd::new(fund.id, MoneyCents::new(20_000)).description("new tyres"),
        )
        .await
        .unwrap();
    assert_eq!(fund_after.balance, MoneyCents::new(30_000));

    assert!(matches!(
        engine
            .deposit(&outsider, FundMovementCmd::new(fund.id, MoneyCents::new(1)))
            .await,
        Err(EngineError::Forbidden(_))
    ));
    assert!(matches!(
        engine
            .deposit(&anna, FundMovementCmd::new(fund.id, MoneyCents::ZERO))
            .await,
        Err(EngineError::InvalidAmount(_))
    ));

    let ledger = engine.list_fund_transactions(&root, fund.id).await.unwrap();
    assert_eq!(ledger.len(), 2);
    let deposits: i64 = ledger
        .iter()
        .filter(|t| t.kind == FundTransactionKind::Deposit)
        .map(|t| t.amount.cents())
        .sum();
    assert_eq!(deposits, 50_000);

    // Staff without membership cannot read funds; admins can.
    assert!(matches!(
        engine.get_fund(&sam, fund.id).await,
        Err(EngineError::Forbidden(_))
    ));
    assert_eq!(
        engine.get_fund(&root, fund.id).await.unwrap().balance,
        MoneyCents::new(30_000)
    );
    assert_eq!(engine.list_group_funds(&anna, group.id).await.unwrap().len(), 1);
}
