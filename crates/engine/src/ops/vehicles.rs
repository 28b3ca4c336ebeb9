use sea_orm::{
    ActiveValue, Condition, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    Action, Actor, EngineError, NewVehicleCmd, ResultEngine, Vehicle, bookings, expenses,
    util::{normalize_code, normalize_required},
    vehicles,
};

use super::{Engine, with_tx};

impl Engine {
    /// Registers a vehicle (group owner or staff). VIN and plate are unique
    /// across the whole system.
    pub async fn create_vehicle(&self, actor: &Actor, cmd: NewVehicleCmd) -> ResultEngine<Vehicle> {
        let vin = normalize_code(&cmd.vin, "vin")?;
        let plate = normalize_code(&cmd.plate, "plate")?;
        let model_name = normalize_required(&cmd.model, "model")?;

        with_tx!(self, |db_tx| {
            let group = self.require_group(&db_tx, cmd.group_id).await?;
            if group.created_by != actor.user_id {
                actor.require(Action::ManageAnyVehicle)?;
            }

            let clash = vehicles::Entity::find()
                .filter(
                    Condition::any()
                        .add(vehicles::Column::Vin.eq(vin.clone()))
                        .add(vehicles::Column::Plate.eq(plate.clone())),
                )
                .one(&db_tx)
                .await?;
            if let Some(clash) = clash {
                let taken = if clash.vin == vin { vin } else { plate };
                return Err(EngineError::ExistingKey(taken));
            }

            let model = vehicles::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                group_id: ActiveValue::Set(group.id),
                vin: ActiveValue::Set(vin),
                plate: ActiveValue::Set(plate),
                model_name: ActiveValue::Set(model_name),
                created_at: ActiveValue::Set(self.now()),
            }
            .insert(&db_tx)
            .await?;
            Ok(Vehicle::from(model))
        })
    }

    pub async fn list_vehicles(&self, actor: &Actor, group_id: Uuid) -> ResultEngine<Vec<Vehicle>> {
        with_tx!(self, |db_tx| {
            self.require_group_access(&db_tx, group_id, actor).await?;
            let models = vehicles::Entity::find()
                .filter(vehicles::Column::GroupId.eq(group_id))
                .order_by_asc(vehicles::Column::CreatedAt)
                .all(&db_tx)
                .await?;
            Ok(models.into_iter().map(Vehicle::from).collect())
        })
    }

    pub async fn get_vehicle(&self, actor: &Actor, vehicle_id: Uuid) -> ResultEngine<Vehicle> {
        with_tx!(self, |db_tx| {
            let vehicle = self.require_vehicle(&db_tx, vehicle_id).await?;
            self.require_group_access(&db_tx, vehicle.group_id, actor)
                .await?;
            Ok(Vehicle::from(vehicle))
        })
    }

    /// Every vehicle in the system (admin only).
    pub async fn list_all_vehicles(&self, actor: &Actor) -> ResultEngine<Vec<Vehicle>> {
        actor.require(Action::AdminListing)?;
        with_tx!(self, |db_tx| {
            let models = vehicles::Entity::find()
                .order_by_asc(vehicles::Column::CreatedAt)
                .all(&db_tx)
                .await?;
            Ok(models.into_iter().map(Vehicle::from).collect())
        })
    }

    /// Deletes a vehicle no booking or expense refers to.
    pub async fn delete_vehicle(&self, actor: &Actor, vehicle_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let vehicle = self.require_vehicle(&db_tx, vehicle_id).await?;
            let group = self.require_group(&db_tx, vehicle.group_id).await?;
            if group.created_by != actor.user_id {
                actor.require(Action::ManageAnyVehicle)?;
            }

            let booking_count = bookings::Entity::find()
                .filter(bookings::Column::VehicleId.eq(vehicle_id))
                .count(&db_tx)
                .await?;
            if booking_count > 0 {
                return Err(EngineError::Conflict("vehicle has bookings".to_string()));
            }
            let expense_count = expenses::Entity::find()
                .filter(expenses::Column::VehicleId.eq(vehicle_id))
                .count(&db_tx)
                .await?;
            if expense_count > 0 {
                return Err(EngineError::Conflict("vehicle has expenses".to_string()));
            }

            vehicles::Entity::delete_by_id(vehicle_id)
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }
}
