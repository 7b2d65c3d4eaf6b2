pub mod farm;

pub use farm::{Farm, FarmCreate, FarmOut, FarmUpdate, FarmsOut, Message};
