//! sea-orm entities for the catalog, accounts and orders.

pub mod cart;
pub mod cart_meal;
pub mod contact;
pub mod info_type;
pub mod ingredient;
pub mod ingredient_type;
pub mod meal;
pub mod meal_image;
pub mod meal_info;
pub mod meal_ingredient;
pub mod section;
pub mod state;
pub mod sub_section;
pub mod user;
