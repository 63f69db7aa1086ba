pub mod menu_item_repository;
pub mod order_repository;
pub mod payment_repository;
pub mod restaurant_repository;
pub mod user_repository;

pub use menu_item_repository::*;
pub use order_repository::*;
pub use payment_repository::*;
pub use restaurant_repository::*;
pub use user_repository::*;
