//! Storefront tables. Each REST resource pairs its Sea-ORM entity with a
//! unit type implementing [`CrudResource`](crate::core::CrudResource).

pub mod cart_items;
pub mod carts;
pub mod categories;
pub mod order_items;
pub mod orders;
pub mod products;
pub mod users;

pub use cart_items::CartItems;
pub use categories::Categories;
pub use order_items::OrderItems;
pub use products::Products;
pub use users::Users;

pub type User = users::Model;
pub type Category = categories::Model;
pub type Product = products::Model;
pub type CartItem = cart_items::Model;
pub type OrderItem = order_items::Model;
