use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Action, Actor, EngineError, ResultEngine, Role, User,
    password::{hash_password, validate_password, verify_password},
    user_roles, users,
    util::normalize_username,
};

use super::{Engine, with_tx};

fn normalize_email(email: &str) -> ResultEngine<String> {
    let email = email.trim().to_lowercase();
    let valid = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if !valid {
        return Err(EngineError::InvalidInput("invalid email address".to_string()));
    }
    Ok(email)
}

impl Engine {
    /// Self-service registration. New accounts get the CO_OWNER role.
    pub async fn register_user(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> ResultEngine<User> {
        self.create_user(username, email, password, &[Role::CoOwner])
            .await
    }

    /// Creates a user with an explicit role list (bootstrap and admin tooling).
    pub async fn create_user(
        &self,
        username: &str,
        email: &str,
        password: &str,
        roles: &[Role],
    ) -> ResultEngine<User> {
        let username = normalize_username(username)?;
        let email = normalize_email(email)?;
        validate_password(password)?;
        if roles.is_empty() {
            return Err(EngineError::InvalidInput(
                "a user needs at least one role".to_string(),
            ));
        }

        let password_hash = hash_password(password)?;

        with_tx!(self, |db_tx| {
            let existing = users::Entity::find()
                .filter(users::Column::Email.eq(email.clone()))
                .one(&db_tx)
                .await?;
            if existing.is_some() {
                return Err(EngineError::ExistingKey(email));
            }

            let model = users::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                username: ActiveValue::Set(username),
                email: ActiveValue::Set(email),
                password_hash: ActiveValue::Set(password_hash),
                created_at: ActiveValue::Set(self.now()),
            }
            .insert(&db_tx)
            .await?;

            for role in roles {
                user_roles::ActiveModel {
                    user_id: ActiveValue::Set(model.id),
                    role: ActiveValue::Set(role.as_str().to_string()),
                }
                .insert(&db_tx)
                .await?;
            }

            Ok(User::from_model(model, roles.iter().copied().collect()))
        })
    }

    /// Adds a role to an existing account. Granting a held role is a no-op.
    pub async fn grant_role(&self, email: &str, role: Role) -> ResultEngine<User> {
        let email = normalize_email(email)?;
        with_tx!(self, |db_tx| {
            let model = users::Entity::find()
                .filter(users::Column::Email.eq(email.clone()))
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))?;
            let mut roles = self.load_roles(&db_tx, model.id).await?;
            if roles.insert(role) {
                user_roles::ActiveModel {
                    user_id: ActiveValue::Set(model.id),
                    role: ActiveValue::Set(role.as_str().to_string()),
                }
                .insert(&db_tx)
                .await?;
            }
            Ok(User::from_model(model, roles))
        })
    }

    /// Checks credentials. Unknown email and wrong password are indistinguishable.
    pub async fn authenticate(&self, email: &str, password: &str) -> ResultEngine<User> {
        let email = email.trim().to_lowercase();
        with_tx!(self, |db_tx| {
            let Some(model) = users::Entity::find()
                .filter(users::Column::Email.eq(email))
                .one(&db_tx)
                .await?
            else {
                return Err(EngineError::InvalidCredentials);
            };
            if !verify_password(password, &model.password_hash) {
                return Err(EngineError::InvalidCredentials);
            }
            let roles = self.load_roles(&db_tx, model.id).await?;
            Ok(User::from_model(model, roles))
        })
    }

    /// Resolves the subject of a bearer token.
    pub async fn user_by_email(&self, email: &str) -> ResultEngine<User> {
        let email = email.trim().to_lowercase();
        with_tx!(self, |db_tx| {
            let model = users::Entity::find()
                .filter(users::Column::Email.eq(email))
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))?;
            let roles = self.load_roles(&db_tx, model.id).await?;
            Ok(User::from_model(model, roles))
        })
    }

    /// A user can read their own profile; staff can read anyone's.
    pub async fn get_user(&self, actor: &Actor, user_id: Uuid) -> ResultEngine<User> {
        if actor.user_id != user_id {
            actor.require(Action::ViewAnyUser)?;
        }
        with_tx!(self, |db_tx| {
            let model = self.require_user(&db_tx, user_id).await?;
            let roles = self.load_roles(&db_tx, model.id).await?;
            Ok(User::from_model(model, roles))
        })
    }

    pub async fn list_users(&self, actor: &Actor) -> ResultEngine<Vec<User>> {
        actor.require(Action::AdminListing)?;
        with_tx!(self, |db_tx| {
            let models = users::Entity::find()
                .order_by_asc(users::Column::CreatedAt)
                .all(&db_tx)
                .await?;
            let mut out = Vec::with_capacity(models.len());
            for model in models {
                let roles = self.load_roles(&db_tx, model.id).await?;
                out.push(User::from_model(model, roles));
            }
            Ok(out)
        })
    }
}
