pub mod menu_item;
pub mod order;
pub mod payment;
pub mod restaurant;
pub mod user;

pub use menu_item::*;
pub use order::*;
pub use payment::*;
pub use restaurant::*;
pub use user::*;
