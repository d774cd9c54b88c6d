//! API endpoint groups.

pub mod estimate;
pub mod trace;

pub use estimate::EstimateApi;
pub use trace::TraceApi;
