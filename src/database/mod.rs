pub mod manager;
pub mod memory;
pub mod migrations;
pub mod models;
pub mod store;

pub use manager::{DatabaseError, DatabaseManager};
pub use memory::InMemoryFarmStore;
pub use store::{FarmSession, FarmStore, PgFarmStore};
