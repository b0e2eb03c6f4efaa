//! Order statuses.
//!
//! The `states` table is a lookup that the templates read text from, so the
//! rows are seeded once at startup and their ids are cached in a
//! [`StateRegistry`]. Code only ever talks in terms of [`OrderStatus`].

use std::collections::HashMap;

use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};
use tracing::info;

use crate::{entities::state, errors::ServiceError};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OrderStatus {
    /// Open cart, not yet ordered
    Pending,
    /// Checked out, waiting for the payment provider
    Unpaid,
    Paid,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 3] = [OrderStatus::Pending, OrderStatus::Unpaid, OrderStatus::Paid];

    pub fn code(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Unpaid => "unpaid",
            OrderStatus::Paid => "paid",
        }
    }

    pub fn text(self) -> &'static str {
        match self {
            OrderStatus::Pending => "Ожидается",
            OrderStatus::Unpaid => "Не оплачен",
            OrderStatus::Paid => "Оплачено",
        }
    }

    pub fn details(self) -> &'static str {
        match self {
            OrderStatus::Pending => "Заказ не оформлен",
            OrderStatus::Unpaid => "Оплатите заказ",
            OrderStatus::Paid => "Спасибо за покупку",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.code() == code)
    }

    /// Forward-only lifecycle. Re-applying the current status is allowed so
    /// that repeated provider callbacks are harmless.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (OrderStatus::Pending, OrderStatus::Unpaid)
                | (OrderStatus::Unpaid, OrderStatus::Paid)
                | (OrderStatus::Paid, OrderStatus::Paid)
        )
    }
}

/// Cached mapping between [`OrderStatus`] and `states.id`
#[derive(Clone, Debug, Default)]
pub struct StateRegistry {
    ids: HashMap<OrderStatus, i32>,
}

impl StateRegistry {
    pub fn id(&self, status: OrderStatus) -> Result<i32, ServiceError> {
        self.ids.get(&status).copied().ok_or_else(|| {
            ServiceError::InternalError(format!("state '{}' was not seeded", status.code()))
        })
    }

    pub fn status_of(&self, state_id: i32) -> Option<OrderStatus> {
        self.ids
            .iter()
            .find(|(_, id)| **id == state_id)
            .map(|(status, _)| *status)
    }
}

/// Inserts any missing `states` rows and returns the id registry
pub async fn seed_states<C>(db: &C) -> Result<StateRegistry, ServiceError>
where
    C: ConnectionTrait,
{
    let mut ids = HashMap::new();

    for status in OrderStatus::ALL {
        let existing = state::Entity::find()
            .filter(state::Column::Code.eq(status.code()))
            .one(db)
            .await?;

        let row = match existing {
            Some(row) => row,
            None => {
                let row = state::ActiveModel {
                    code: Set(status.code().to_string()),
                    text: Set(status.text().to_string()),
                    details: Set(status.details().to_string()),
                    ..Default::default()
                }
                .insert(db)
                .await?;
                info!(code = status.code(), id = row.id, "seeded order state");
                row
            }
        };

        ids.insert(status, row.id);
    }

    Ok(StateRegistry { ids })
}
