pub mod controller;
pub mod loop_worker;
pub mod source;
pub mod state;

pub use controller::SensingController;
pub use loop_worker::{run_tick, sampling_loop, SamplingContext};
pub use source::{decode_events, DetectionSource, EventApiSource};
pub use state::{LoopStatus, TickOutcome, TickStats};
