//! Session-based authentication.
//!
//! Visitors are identified by a server-side session (cookie `sessionid`). The
//! session stores the logged-in user's id and the token of the cart the
//! visitor is filling. Passwords are argon2 hashes.

pub mod password;
pub mod redirect;
pub mod session;

pub use password::{hash_password, verify_password};
pub use redirect::{is_safe_redirect, safe_next};
pub use session::{CurrentUser, Visitor, SESSION_CART_TOKEN_KEY, SESSION_USER_ID_KEY};
