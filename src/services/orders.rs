use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use tracing::{info, instrument, warn};

use crate::{
    entities::cart,
    errors::ServiceError,
    models::{OrderStatus, StateRegistry},
    services::cart::{load_lines, CartLine, CartSummary},
};

/// An archived cart as shown in the order history
#[derive(Debug, Clone)]
pub struct OrderView {
    pub cart: cart::Model,
    pub status: OrderStatus,
    pub lines: Vec<CartLine>,
    pub summary: CartSummary,
}

impl OrderView {
    pub fn is_payable(&self) -> bool {
        self.status == OrderStatus::Unpaid
    }
}

#[derive(Clone)]
pub struct OrderService {
    db: Arc<DatabaseConnection>,
    states: Arc<StateRegistry>,
}

impl OrderService {
    pub fn new(db: Arc<DatabaseConnection>, states: Arc<StateRegistry>) -> Self {
        Self { db, states }
    }

    /// Turns the caller's open cart into an unpaid order.
    ///
    /// Only the newest open cart owned by `user_id` and carrying the session
    /// token qualifies. Returns `None` when there is no such cart.
    #[instrument(skip(self, token))]
    pub async fn checkout(
        &self,
        token: Option<&str>,
        user_id: i32,
    ) -> Result<Option<cart::Model>, ServiceError> {
        let Some(token) = token.filter(|t| !t.is_empty()) else {
            return Ok(None);
        };

        let txn = self.db.begin().await?;

        let Some(open) = cart::Entity::find()
            .filter(cart::Column::OwnerId.eq(user_id))
            .filter(cart::Column::Token.eq(token))
            .filter(cart::Column::Archive.eq(false))
            .order_by_desc(cart::Column::CreatedAt)
            .order_by_desc(cart::Column::Id)
            .one(&txn)
            .await?
        else {
            info!(user_id, "Checkout without an open cart");
            return Ok(None);
        };

        let current = self.status_of(&open)?;
        if !current.can_transition_to(OrderStatus::Unpaid) {
            return Err(ServiceError::InvalidOperation(format!(
                "cart {} cannot be ordered from status '{}'",
                open.id,
                current.code()
            )));
        }

        let cart_id = open.id;
        let mut active: cart::ActiveModel = open.into();
        active.archive = Set(true);
        active.status_id = Set(self.states.id(OrderStatus::Unpaid)?);
        active.updated_at = Set(Utc::now());
        let ordered = active.update(&txn).await?;

        txn.commit().await?;

        info!(cart_id, user_id, "Cart checked out, awaiting payment");
        Ok(Some(ordered))
    }

    /// Records a confirmed payment. Repeating it on a paid order is a no-op.
    /// A stated `paid_amount` must equal the order total.
    #[instrument(skip(self))]
    pub async fn mark_paid(
        &self,
        cart_id: i32,
        paid_amount: Option<i64>,
    ) -> Result<cart::Model, ServiceError> {
        let txn = self.db.begin().await?;

        let order = cart::Entity::find_by_id(cart_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("order {}", cart_id)))?;

        if !order.archive {
            warn!(cart_id, "Payment confirmation for a cart that was never ordered");
            return Err(ServiceError::InvalidOperation(format!(
                "cart {} has not been checked out",
                cart_id
            )));
        }

        if let Some(paid) = paid_amount {
            let total = CartSummary::of(&load_lines(&txn, cart_id).await?).total;
            if paid != total {
                warn!(cart_id, paid, total, "Payment amount does not match the order");
                return Err(ServiceError::BadRequest(format!(
                    "paid {} for order {} totalling {}",
                    paid, cart_id, total
                )));
            }
        }

        let current = self.status_of(&order)?;
        if current == OrderStatus::Paid {
            info!(cart_id, "Order already paid");
            return Ok(order);
        }
        if !current.can_transition_to(OrderStatus::Paid) {
            return Err(ServiceError::InvalidOperation(format!(
                "order {} cannot be paid from status '{}'",
                cart_id,
                current.code()
            )));
        }

        let mut active: cart::ActiveModel = order.into();
        active.status_id = Set(self.states.id(OrderStatus::Paid)?);
        active.updated_at = Set(Utc::now());
        let paid = active.update(&txn).await?;

        txn.commit().await?;

        info!(cart_id, "Order paid");
        Ok(paid)
    }

    /// Archived carts of the user, newest first
    #[instrument(skip(self))]
    pub async fn history(&self, user_id: i32) -> Result<Vec<OrderView>, ServiceError> {
        let carts = cart::Entity::find()
            .filter(cart::Column::OwnerId.eq(user_id))
            .filter(cart::Column::Archive.eq(true))
            .order_by_desc(cart::Column::UpdatedAt)
            .order_by_desc(cart::Column::Id)
            .all(&*self.db)
            .await?;

        let mut orders = Vec::with_capacity(carts.len());
        for cart in carts {
            orders.push(self.view(cart).await?);
        }
        Ok(orders)
    }

    /// The user's archived cart with that id
    pub async fn order_for(
        &self,
        cart_id: i32,
        user_id: i32,
    ) -> Result<Option<OrderView>, ServiceError> {
        let cart = cart::Entity::find_by_id(cart_id)
            .filter(cart::Column::OwnerId.eq(user_id))
            .filter(cart::Column::Archive.eq(true))
            .one(&*self.db)
            .await?;

        match cart {
            Some(cart) => Ok(Some(self.view(cart).await?)),
            None => Ok(None),
        }
    }

    async fn view(&self, cart: cart::Model) -> Result<OrderView, ServiceError> {
        let status = self.status_of(&cart)?;
        let lines = load_lines(&*self.db, cart.id).await?;
        let summary = CartSummary::of(&lines);
        Ok(OrderView {
            cart,
            status,
            lines,
            summary,
        })
    }

    fn status_of(&self, cart: &cart::Model) -> Result<OrderStatus, ServiceError> {
        self.states.status_of(cart.status_id).ok_or_else(|| {
            ServiceError::InternalError(format!(
                "cart {} has unknown status id {}",
                cart.id, cart.status_id
            ))
        })
    }
}
