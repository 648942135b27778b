pub mod cycle;
pub mod prediction;
pub mod time;

pub use cycle::*;
pub use prediction::*;
pub use time::*;
