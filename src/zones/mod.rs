pub mod classifier;
pub mod zone;

pub use classifier::classify;
pub use zone::{Zone, ZoneSet};
