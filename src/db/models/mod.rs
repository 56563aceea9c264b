pub mod sample;
pub mod summary;

pub use sample::{Sample, SAMPLE_RECORD_VERSION};
pub use summary::{HourlyBucket, Summary};
