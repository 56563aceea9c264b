mod activity;
mod detection;

pub use activity::ActivityState;
pub use detection::Detection;
