pub mod contract;
pub mod deal;
pub mod product;
pub mod snapshot;
pub mod stage;
pub mod user;
