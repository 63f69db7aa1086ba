pub mod bus;
pub mod database;
pub mod repositories;

pub use bus::*;
pub use database::*;
pub use repositories::*;
