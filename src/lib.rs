//! Trace-driven evaluation of conditional branch predictors.

pub mod branch;
pub mod config;
pub mod error;
pub mod history;
pub mod output;
pub mod predictor;
pub mod sim;
pub mod sizing;
pub mod stats;
pub mod trace;

pub use branch::*;
pub use config::*;
pub use error::*;
pub use history::*;
pub use output::*;
pub use predictor::*;
pub use sim::*;
pub use stats::*;
pub use trace::*;
