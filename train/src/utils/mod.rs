//! Misc utilities.

mod rate_counter;
mod weights;

pub use rate_counter::*;
pub use weights::*;

pub const FILE_STRFTIME: &str = "%Y-%m-%d-%H-%M-%S.%3f%z";
