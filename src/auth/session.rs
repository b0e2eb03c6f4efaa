//! Request extractors over the server-side session.

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use sea_orm::EntityTrait;
use tower_sessions::Session;
use tracing::{debug, warn};

use crate::{entities::user, errors::ServiceError, views::encode_query, AppState};

pub const SESSION_USER_ID_KEY: &str = "user_id";
pub const SESSION_CART_TOKEN_KEY: &str = "cart_token";

pub const LOGIN_PATH: &str = "/accounts/login/";

/// Anyone hitting the site, logged in or not
#[derive(Clone, Debug)]
pub struct Visitor {
    pub session: Session,
    pub user: Option<user::Model>,
}

impl Visitor {
    pub fn user_id(&self) -> Option<i32> {
        self.user.as_ref().map(|u| u.id)
    }

    pub async fn cart_token(&self) -> Result<Option<String>, ServiceError> {
        Ok(self.session.get::<String>(SESSION_CART_TOKEN_KEY).await?)
    }

    pub async fn set_cart_token(&self, token: &str) -> Result<(), ServiceError> {
        Ok(self
            .session
            .insert(SESSION_CART_TOKEN_KEY, token.to_string())
            .await?)
    }

    pub async fn clear_cart_token(&self) -> Result<(), ServiceError> {
        self.session.remove::<String>(SESSION_CART_TOKEN_KEY).await?;
        Ok(())
    }

    /// Binds the session to `user`. The session id is cycled to defeat
    /// fixation; the cart token survives.
    pub async fn login(&mut self, user: user::Model) -> Result<(), ServiceError> {
        self.session.cycle_id().await?;
        self.session.insert(SESSION_USER_ID_KEY, user.id).await?;
        debug!(user_id = user.id, "session logged in");
        self.user = Some(user);
        Ok(())
    }

    /// Drops every session value and the session itself
    pub async fn logout(&mut self) -> Result<(), ServiceError> {
        self.session.flush().await?;
        self.user = None;
        Ok(())
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for Visitor {
    type Rejection = ServiceError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|(_, msg)| ServiceError::SessionError(msg.to_string()))?;

        let user = match session.get::<i32>(SESSION_USER_ID_KEY).await? {
            Some(id) => {
                let user = user::Entity::find_by_id(id)
                    .one(&*state.db)
                    .await?
                    .filter(|u| u.is_active);
                if user.is_none() {
                    warn!(user_id = id, "session refers to an unknown or inactive user");
                    session.remove::<i32>(SESSION_USER_ID_KEY).await?;
                }
                user
            }
            None => None,
        };

        Ok(Self { session, user })
    }
}

/// A logged-in visitor. Anonymous requests are sent to the login page with
/// the current path as `next`.
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub visitor: Visitor,
    pub user: user::Model,
}

pub fn login_redirect(parts: &Parts) -> Redirect {
    let next = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    Redirect::to(&format!("{}?next={}", LOGIN_PATH, encode_query(next)))
}

#[axum::async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let visitor = Visitor::from_request_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?;

        match visitor.user.clone() {
            Some(user) => Ok(Self { visitor, user }),
            None => Err(login_redirect(parts).into_response()),
        }
    }
}
