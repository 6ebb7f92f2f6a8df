//! Heart-disease risk assessment: form intake, interchangeable scoring
//! strategies, result rendering with stale-completion protection, and report
//! export.

pub mod assessment;
pub mod config;
pub mod error;
pub mod telemetry;
