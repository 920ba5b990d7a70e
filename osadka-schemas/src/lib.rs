pub mod cycle_state;
pub mod file_formats;
pub mod measurement;
pub mod project;
pub mod units;
