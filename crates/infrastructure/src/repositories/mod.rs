pub mod memory;
pub mod sqlite_menu_item_repository;
pub mod sqlite_order_repository;
pub mod sqlite_payment_repository;
pub mod sqlite_restaurant_repository;
pub mod sqlite_user_repository;

pub use memory::*;
pub use sqlite_menu_item_repository::*;
pub use sqlite_order_repository::*;
pub use sqlite_payment_repository::*;
pub use sqlite_restaurant_repository::*;
pub use sqlite_user_repository::*;
