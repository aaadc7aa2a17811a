//! Report assembly and rendering.

pub mod builder;
pub mod generator;

pub use builder::{build_report, collect_feedback, ReportInput};
pub use generator::*;
