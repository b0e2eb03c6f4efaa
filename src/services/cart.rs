//! Cart identity resolution and ajax cart mutations.

use std::sync::Arc;

use chrono::Utc;
use rand::{distributions::Uniform, Rng};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Unchanged, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::{debug, info, instrument};

use crate::{
    entities::{cart, cart_meal, meal},
    errors::ServiceError,
    models::{OrderStatus, StateRegistry},
    services::catalog::{cards, MealCard},
};

pub const TOKEN_LENGTH: usize = 40;
const TOKEN_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Opaque cart token: 40 characters of `[A-Z0-9]`
pub fn generate_token() -> String {
    let mut rng = rand::thread_rng();
    let dist = Uniform::from(0..TOKEN_ALPHABET.len());
    (0..TOKEN_LENGTH)
        .map(|_| TOKEN_ALPHABET[rng.sample(dist)] as char)
        .collect()
}

/// Count and price totals shown in the header and under the cart
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CartSummary {
    /// Sum of quantities
    pub count: i64,
    /// Sum of quantity x price
    pub total: i64,
}

impl CartSummary {
    pub fn of(lines: &[CartLine]) -> Self {
        lines.iter().fold(CartSummary::default(), |acc, line| CartSummary {
            count: acc.count + i64::from(line.amount),
            total: acc.total + line.sum(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    pub card: MealCard,
    pub amount: i32,
}

impl CartLine {
    pub fn sum(&self) -> i64 {
        i64::from(self.amount) * i64::from(self.card.meal.price)
    }
}

/// What became of the session's cart token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenLookup {
    /// The session has no token
    Absent,
    /// No cart carries the token
    Missing,
    /// Newest cart carrying the token
    Found(cart::Model),
}

/// Outcome of [`plan_resolution`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionPlan {
    UseToken(cart::Model),
    /// Newest open cart of the user, else a fresh owned one
    UseNewestOwned(i32),
    CreateFresh { owner: Option<i32> },
}

/// Token validity wins over ownership, which wins over creation. A token that
/// points at an archived, missing or foreign cart is dropped silently.
pub fn plan_resolution(token: TokenLookup, user_id: Option<i32>) -> ResolutionPlan {
    match token {
        TokenLookup::Found(cart) if cart.is_open() && cart.visible_to(user_id) => {
            ResolutionPlan::UseToken(cart)
        }
        TokenLookup::Found(_) | TokenLookup::Missing => {
            ResolutionPlan::CreateFresh { owner: user_id }
        }
        TokenLookup::Absent => match user_id {
            Some(id) => ResolutionPlan::UseNewestOwned(id),
            None => ResolutionPlan::CreateFresh { owner: None },
        },
    }
}

/// Parses the `amount` of a `set` request; anything but an integer is ignored
pub fn parse_amount(raw: Option<&str>) -> Option<i32> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<i32>().ok())
}

/// Line state after a mutation, for the ajax fragment
#[derive(Debug, Clone)]
pub struct LineUpdate {
    pub card: MealCard,
    /// Zero when the cart holds no line for the meal
    pub amount: i32,
    pub summary: CartSummary,
}

#[derive(Clone)]
pub struct CartService {
    db: Arc<DatabaseConnection>,
    states: Arc<StateRegistry>,
}

impl CartService {
    pub fn new(db: Arc<DatabaseConnection>, states: Arc<StateRegistry>) -> Self {
        Self { db, states }
    }

    /// Newest cart created with `token`, archived or not
    pub async fn find_by_token(&self, token: &str) -> Result<Option<cart::Model>, ServiceError> {
        Ok(cart::Entity::find()
            .filter(cart::Column::Token.eq(token))
            .order_by_desc(cart::Column::CreatedAt)
            .order_by_desc(cart::Column::Id)
            .one(&*self.db)
            .await?)
    }

    pub async fn newest_open_owned(&self, user_id: i32) -> Result<Option<cart::Model>, ServiceError> {
        Ok(cart::Entity::find()
            .filter(cart::Column::OwnerId.eq(user_id))
            .filter(cart::Column::Archive.eq(false))
            .order_by_desc(cart::Column::CreatedAt)
            .order_by_desc(cart::Column::Id)
            .one(&*self.db)
            .await?)
    }

    /// Maps the caller to exactly one open cart, creating it if needed.
    /// The caller stores the returned cart's token back into the session.
    #[instrument(skip(self, token), fields(has_token = token.is_some()))]
    pub async fn resolve(
        &self,
        token: Option<&str>,
        user_id: Option<i32>,
    ) -> Result<cart::Model, ServiceError> {
        let lookup = match token.filter(|t| !t.is_empty()) {
            None => TokenLookup::Absent,
            Some(token) => match self.find_by_token(token).await? {
                Some(cart) => TokenLookup::Found(cart),
                None => TokenLookup::Missing,
            },
        };

        match plan_resolution(lookup, user_id) {
            ResolutionPlan::UseToken(cart) => Ok(cart),
            ResolutionPlan::UseNewestOwned(owner) => match self.newest_open_owned(owner).await? {
                Some(cart) => Ok(cart),
                None => self.create_cart(Some(owner)).await,
            },
            ResolutionPlan::CreateFresh { owner } => self.create_cart(owner).await,
        }
    }

    pub async fn create_cart(&self, owner: Option<i32>) -> Result<cart::Model, ServiceError> {
        let now = Utc::now();
        let cart = cart::ActiveModel {
            token: Set(generate_token()),
            owner_id: Set(owner),
            status_id: Set(self.states.id(OrderStatus::Pending)?),
            archive: Set(false),
            contact: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&*self.db)
        .await?;

        info!(cart_id = cart.id, owner = ?owner, "Created cart");
        Ok(cart)
    }

    /// Adds one of the meal. `None` when the meal does not exist or the line
    /// cannot grow any further.
    #[instrument(skip(self))]
    pub async fn add_meal(
        &self,
        cart_id: i32,
        meal_slug: &str,
    ) -> Result<Option<LineUpdate>, ServiceError> {
        let txn = self.db.begin().await?;

        let Some(meal) = meal::Entity::find_by_id(meal_slug.to_string()).one(&txn).await? else {
            return Ok(None);
        };

        let amount = match find_line(&txn, cart_id, meal_slug).await? {
            Some(line) => {
                let Some(amount) = line.amount.checked_add(1) else {
                    debug!(cart_id, meal = meal_slug, "cart line at maximum quantity");
                    return Ok(None);
                };
                let mut line: cart_meal::ActiveModel = line.into();
                line.amount = Set(amount);
                line.update(&txn).await?;
                amount
            }
            None => {
                cart_meal::ActiveModel {
                    cart_id: Set(cart_id),
                    meal_slug: Set(meal.slug.clone()),
                    amount: Set(1),
                    ..Default::default()
                }
                .insert(&txn)
                .await?;
                1
            }
        };

        touch(&txn, cart_id).await?;
        let update = line_update(&txn, cart_id, meal, amount).await?;
        txn.commit().await?;

        info!(cart_id, meal = meal_slug, amount, "Added meal to cart");
        Ok(Some(update))
    }

    /// Overwrites the quantity. A missing or non-numeric amount leaves the
    /// cart as it is. `None` when the meal does not exist.
    #[instrument(skip(self))]
    pub async fn set_amount(
        &self,
        cart_id: i32,
        meal_slug: &str,
        amount: Option<&str>,
    ) -> Result<Option<LineUpdate>, ServiceError> {
        let txn = self.db.begin().await?;

        let Some(meal) = meal::Entity::find_by_id(meal_slug.to_string()).one(&txn).await? else {
            return Ok(None);
        };

        let existing = find_line(&txn, cart_id, meal_slug).await?;
        let current = existing.as_ref().map(|l| l.amount).unwrap_or(0);

        let amount = match parse_amount(amount) {
            None => {
                debug!(cart_id, meal = meal_slug, "ignoring unparseable amount");
                current
            }
            Some(amount) => {
                match existing {
                    Some(line) => {
                        let mut line: cart_meal::ActiveModel = line.into();
                        line.amount = Set(amount);
                        line.update(&txn).await?;
                    }
                    None => {
                        cart_meal::ActiveModel {
                            cart_id: Set(cart_id),
                            meal_slug: Set(meal.slug.clone()),
                            amount: Set(amount),
                            ..Default::default()
                        }
                        .insert(&txn)
                        .await?;
                    }
                }
                touch(&txn, cart_id).await?;
                info!(cart_id, meal = meal_slug, amount, "Set cart amount");
                amount
            }
        };

        let update = line_update(&txn, cart_id, meal, amount).await?;
        txn.commit().await?;
        Ok(Some(update))
    }

    /// Removes the meal's line; absent meals and lines are a no-op
    #[instrument(skip(self))]
    pub async fn remove_meal(&self, cart_id: i32, meal_slug: &str) -> Result<(), ServiceError> {
        let txn = self.db.begin().await?;

        let removed = cart_meal::Entity::delete_many()
            .filter(cart_meal::Column::CartId.eq(cart_id))
            .filter(cart_meal::Column::MealSlug.eq(meal_slug))
            .exec(&txn)
            .await?
            .rows_affected;

        if removed > 0 {
            touch(&txn, cart_id).await?;
            info!(cart_id, meal = meal_slug, "Removed meal from cart");
        }

        txn.commit().await?;
        Ok(())
    }

    pub async fn lines(&self, cart_id: i32) -> Result<Vec<CartLine>, ServiceError> {
        load_lines(&*self.db, cart_id).await
    }

    pub async fn summary(&self, cart_id: i32) -> Result<CartSummary, ServiceError> {
        Ok(CartSummary::of(&self.lines(cart_id).await?))
    }

    /// Quantity of the meal in the cart, zero if none
    pub async fn amount_of(&self, cart_id: i32, meal_slug: &str) -> Result<i32, ServiceError> {
        Ok(find_line(&*self.db, cart_id, meal_slug)
            .await?
            .map(|l| l.amount)
            .unwrap_or(0))
    }
}

async fn find_line<C>(
    db: &C,
    cart_id: i32,
    meal_slug: &str,
) -> Result<Option<cart_meal::Model>, ServiceError>
where
    C: ConnectionTrait,
{
    Ok(cart_meal::Entity::find()
        .filter(cart_meal::Column::CartId.eq(cart_id))
        .filter(cart_meal::Column::MealSlug.eq(meal_slug))
        .one(db)
        .await?)
}

async fn touch<C>(db: &C, cart_id: i32) -> Result<(), ServiceError>
where
    C: ConnectionTrait,
{
    cart::ActiveModel {
        id: Unchanged(cart_id),
        updated_at: Set(Utc::now()),
        ..Default::default()
    }
    .update(db)
    .await?;
    Ok(())
}

async fn line_update<C>(
    db: &C,
    cart_id: i32,
    meal: meal::Model,
    amount: i32,
) -> Result<LineUpdate, ServiceError>
where
    C: ConnectionTrait,
{
    let summary = CartSummary::of(&load_lines(db, cart_id).await?);
    let card = cards(db, vec![meal])
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| ServiceError::InternalError("meal card vanished".into()))?;
    Ok(LineUpdate {
        card,
        amount,
        summary,
    })
}

/// Cart lines with their meals, in insertion order
pub(crate) async fn load_lines<C>(db: &C, cart_id: i32) -> Result<Vec<CartLine>, ServiceError>
where
    C: ConnectionTrait,
{
    let rows = cart_meal::Entity::find()
        .filter(cart_meal::Column::CartId.eq(cart_id))
        .find_also_related(meal::Entity)
        .order_by_asc(cart_meal::Column::Id)
        .all(db)
        .await?;

    let mut amounts = Vec::with_capacity(rows.len());
    let mut meals = Vec::with_capacity(rows.len());
    for (line, meal) in rows {
        if let Some(meal) = meal {
            amounts.push(line.amount);
            meals.push(meal);
        }
    }

    Ok(cards(db, meals)
        .await?
        .into_iter()
        .zip(amounts)
        .map(|(card, amount)| CartLine { card, amount })
        .collect())
}
