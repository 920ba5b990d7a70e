pub mod extremum;
pub mod general;
pub mod relative;

pub use extremum::Extremum;
pub use general::{GeneralReport, GeneralReportData};
pub use relative::{RelativeReport, RelativeRow};
