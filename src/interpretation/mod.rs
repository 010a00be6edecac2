//! Clinical interpretation of entered values.
//!
//! Both halves are pure: classification against a test's reference range,
//! and the directional trend against the patient's earlier results.

mod range;
mod trend;

pub use range::{classify, classify_raw, parse_value, Classification};
pub use trend::{
    PriorResult, TrendAnalyzer, TrendReport, TrendSignal, DEFAULT_EPSILON, DEFAULT_WINDOW,
};
