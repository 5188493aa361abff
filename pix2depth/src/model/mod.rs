//! Generator and discriminator modules.

mod blocks;
mod discriminator;
mod generator;

pub use blocks::*;
pub use discriminator::*;
pub use generator::*;
