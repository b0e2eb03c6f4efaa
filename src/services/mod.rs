//! Domain services. Each holds a shared connection pool and is cheap to
//! clone; handlers build them from [`crate::AppState`].

pub mod accounts;
pub mod cart;
pub mod catalog;
pub mod orders;
pub mod payments;

pub use accounts::AccountService;
pub use cart::CartService;
pub use catalog::CatalogService;
pub use orders::OrderService;
