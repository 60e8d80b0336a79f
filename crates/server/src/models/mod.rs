//! Domain models shared between repositories and route handlers.

pub mod cart;
pub mod category;
pub mod product;
pub mod user;

pub use cart::{CartLine, CartSnapshot};
pub use category::Category;
pub use product::{NewProduct, Product, ProductFilter};
pub use user::User;
