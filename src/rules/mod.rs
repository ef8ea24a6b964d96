pub mod types;
pub mod config;
pub mod sampling;
pub mod picker;

pub use types::{ConfigRecord, Field, SwapOutcome, SwapPlan, BOX_CAPACITY, MAX_PARTY_SIZE};
pub use config::FaultyTech;
