#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use sea_orm::{Database, DatabaseConnection};

use engine::{Actor, Engine, Group, NewVehicleCmd, Role, Vehicle};
use migration::MigratorTrait;

/// Monday 2030-01-07 09:00 UTC, the "now" of most tests.
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2030, 1, 7, 9, 0, 0).unwrap()
}

pub fn at(days: i64, hours: i64) -> DateTime<Utc> {
    t0() + Duration::days(days) + Duration::hours(hours)
}

pub async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = engine_at(&db, t0).await;
    (engine, db)
}

/// A second engine on the same database whose clock reads `clock`.
pub async fn engine_at(db: &DatabaseConnection, clock: fn() -> DateTime<Utc>) -> Engine {
    Engine::builder()
        .database(db.clone())
        .clock(clock)
        .build()
        .await
        .unwrap()
}

pub async fn user_with(engine: &Engine, name: &str, roles: &[Role]) -> Actor {
    engine
        .create_user(name, &format!("{name}@example.com"), "secret12", roles)
        .await
        .unwrap()
        .actor()
}

pub async fn co_owner(engine: &Engine, name: &str) -> Actor {
    user_with(engine, name, &[Role::CoOwner]).await
}

pub async fn staff(engine: &Engine, name: &str) -> Actor {
    user_with(engine, name, &[Role::Staff]).await
}

pub async fn admin(engine: &Engine, name: &str) -> Actor {
    user_with(engine, name, &[Role::Admin]).await
}

/// A group owned by `owner` with the given members and percentages.
pub async fn group_with(
    engine: &Engine,
    owner: &Actor,
    name: &str,
    members: &[(&Actor, f64)],
) -> Group {
    let group = engine.create_group(owner, name).await.unwrap();
    for (member, pct) in members {
        engine
            .add_member(owner, group.id, member.user_id, *pct)
            .await
            .unwrap();
    }
    group
}

pub async fn vehicle_in(engine: &Engine, owner: &Actor, group: &Group, vin: &str) -> Vehicle {
    engine
        .create_vehicle(
            owner,
            NewVehicleCmd::new(group.id, vin, format!("51G-{vin}"), "VinFast VF8"),
        )
        .await
        .unwrap()
}
