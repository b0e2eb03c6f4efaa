//! Registration, login and the cart hand-over that goes with them.

use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    sea_query::Expr,
    ActiveModelTrait, ActiveValue::Unchanged, ColumnTrait, DatabaseConnection, EntityTrait,
    QueryFilter, Set, TransactionTrait,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{hash_password, verify_password},
    entities::{cart, cart_meal, contact, user},
    errors::ServiceError,
    forms::{RegistrationForm, USERNAME_TAKEN},
};

#[derive(Clone)]
pub struct AccountService {
    db: Arc<DatabaseConnection>,
}

impl AccountService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<user::Model>, ServiceError> {
        Ok(user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(&*self.db)
            .await?)
    }

    /// Creates the account and its contact row. The form must already be
    /// checked; a taken username is a `ValidationError` carrying
    /// [`USERNAME_TAKEN`].
    #[instrument(skip(self, form), fields(username = %form.username))]
    pub async fn register(&self, form: &RegistrationForm) -> Result<user::Model, ServiceError> {
        if self.find_by_username(&form.username).await?.is_some() {
            return Err(ServiceError::ValidationError(USERNAME_TAKEN.to_string()));
        }

        let password_hash = hash_password(&form.password)?;
        let txn = self.db.begin().await?;

        let user = user::ActiveModel {
            username: Set(form.username.clone()),
            email: Set(form.email.clone()),
            password_hash: Set(password_hash),
            is_active: Set(true),
            date_joined: Set(Utc::now()),
            last_login: Set(None),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        contact::ActiveModel {
            phone: Set(form.phone.trim().to_string()),
            user_id: Set(Some(user.id)),
            cart_id: Set(None),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        info!(user_id = user.id, "Registered account");
        Ok(user)
    }

    /// The active account matching the credentials, with `last_login`
    /// stamped. `None` on any mismatch.
    #[instrument(skip(self, password))]
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<user::Model>, ServiceError> {
        let Some(user) = self.find_by_username(username).await? else {
            return Ok(None);
        };

        if !user.is_active || !verify_password(password, &user.password_hash) {
            warn!(user_id = user.id, "Rejected login");
            return Ok(None);
        }

        let user = user::ActiveModel {
            id: Unchanged(user.id),
            last_login: Set(Some(Utc::now())),
            ..Default::default()
        }
        .update(&*self.db)
        .await?;

        Ok(Some(user))
    }

    /// Hands the session's open cart to `user_id`. Carts owned by someone
    /// else and archived carts are left alone. Returns whether a cart moved.
    #[instrument(skip(self, token))]
    pub async fn claim_cart(&self, token: Option<&str>, user_id: i32) -> Result<bool, ServiceError> {
        let Some(token) = token.filter(|t| !t.is_empty()) else {
            return Ok(false);
        };

        let claimed = cart::Entity::update_many()
            .col_expr(cart::Column::OwnerId, Expr::value(user_id))
            .col_expr(cart::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(cart::Column::Token.eq(token))
            .filter(cart::Column::Archive.eq(false))
            .filter(cart::Column::OwnerId.is_null())
            .exec(&*self.db)
            .await?
            .rows_affected;

        if claimed > 0 {
            info!(user_id, "Claimed anonymous cart");
        }
        Ok(claimed > 0)
    }

    /// Deletes the caller's open cart behind `token` together with its lines
    #[instrument(skip(self, token))]
    pub async fn discard_open_cart(
        &self,
        token: Option<&str>,
        user_id: Option<i32>,
    ) -> Result<u64, ServiceError> {
        let Some(token) = token.filter(|t| !t.is_empty()) else {
            return Ok(0);
        };

        let txn = self.db.begin().await?;
        let mut query = cart::Entity::find()
            .filter(cart::Column::Token.eq(token))
            .filter(cart::Column::Archive.eq(false));
        query = match user_id {
            Some(id) => query.filter(cart::Column::OwnerId.eq(id)),
            None => query.filter(cart::Column::OwnerId.is_null()),
        };

        let ids: Vec<i32> = query.all(&txn).await?.into_iter().map(|c| c.id).collect();
        if ids.is_empty() {
            txn.commit().await?;
            return Ok(0);
        }

        cart_meal::Entity::delete_many()
            .filter(cart_meal::Column::CartId.is_in(ids.clone()))
            .exec(&txn)
            .await?;
        let removed = cart::Entity::delete_many()
            .filter(cart::Column::Id.is_in(ids))
            .exec(&txn)
            .await?
            .rows_affected;
        txn.commit().await?;

        info!(removed, "Discarded open cart on logout");
        Ok(removed)
    }
}
